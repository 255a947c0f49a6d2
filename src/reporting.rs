// src/reporting.rs
use crate::pipeline::RunSummary;
use colored::Colorize;

/// Prints the end-of-run summary to stdout.
pub fn print_summary(summary: &RunSummary) {
    println!("{}", "Near-duplicate scan".bold());
    if !summary.empty_removed.is_empty() {
        println!(
            "  {} empty {} deleted",
            summary.empty_removed.len(),
            pluralize("file", summary.empty_removed.len())
        );
    }

    let c = &summary.candidates;
    if c.documents > 0 {
        println!(
            "  {} documents scanned, {} indexed, {} too short",
            c.documents, c.indexed, c.too_short
        );
        println!(
            "  {} candidate {}, {} confirmed",
            summary.candidate_pairs,
            pluralize("pair", summary.candidate_pairs),
            summary.verify.confirmed
        );
    }

    let r = &summary.resolution;
    let verb = if summary.dry_run { "would remove" } else { "removed" };
    let line = format!(
        "  {} {} across {} {}, {} kept",
        verb,
        r.removed.len(),
        r.clusters,
        pluralize("cluster", r.clusters),
        r.kept.len()
    );
    if r.removed.is_empty() {
        println!("{}", line.green());
    } else {
        println!("{}", line.yellow());
    }
    if summary.dry_run {
        for id in &r.removed {
            println!("    {}", id.dimmed());
        }
    }

    if !r.failed.is_empty() {
        println!(
            "  {}",
            format!("{} could not be deleted", r.failed.len()).red()
        );
        for id in &r.failed {
            println!("    {}", id.dimmed());
        }
    }

    let skipped = summary.skipped_or_missing();
    if skipped > 0 {
        println!(
            "  {}",
            format!("{skipped} skipped or missing {}", pluralize("document", skipped)).yellow()
        );
    }
    if let Some(path) = &summary.results_path {
        println!("  results written to {}", path.display());
    }
    println!("  {}", duration(summary.duration_ms).dimmed());
}

fn pluralize(word: &str, n: usize) -> String {
    if n == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

#[allow(clippy::cast_precision_loss)]
fn duration(ms: u128) -> String {
    if ms < 1000 {
        format!("finished in {ms}ms")
    } else {
        format!("finished in {:.2}s", ms as f64 / 1000.0)
    }
}
