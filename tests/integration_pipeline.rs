// tests/integration_pipeline.rs - end-to-end runs over temp corpora
use neardup_core::audit_log::read_entries;
use neardup_core::config::DedupConfig;
use neardup_core::pipeline::{self, Source};
use neardup_core::{find_candidates, Corpus, DedupError};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn words(range: std::ops::Range<usize>) -> String {
    range
        .map(|i| format!("word{i}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn config_for(out: &Path) -> DedupConfig {
    DedupConfig {
        minhash_threshold: 0.5,
        fuzzy_threshold: 60,
        dedup_threshold: 80,
        output_dir: out.to_path_buf(),
        ..DedupConfig::default()
    }
}

/// base (60 words), longer (65 words), shorter (55 words), plus an unrelated file.
fn write_cluster(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join("base.txt"), words(0..60)).unwrap();
    fs::write(dir.join("longer.txt"), words(0..65)).unwrap();
    fs::write(dir.join("shorter.txt"), words(0..55)).unwrap();
    fs::write(dir.join("other.txt"), words(500..580)).unwrap();
}

fn remaining(dir: &Path) -> BTreeSet<String> {
    Corpus::open(dir)
        .unwrap()
        .document_ids()
        .unwrap()
        .into_iter()
        .collect()
}

#[test]
fn three_file_scenario() {
    let d = TempDir::new().unwrap();
    let corpus_dir = d.path().join("corpus");
    fs::create_dir(&corpus_dir).unwrap();
    let fox = "The quick brown fox jumps ".repeat(5);
    fs::write(corpus_dir.join("doc1.txt"), &fox).unwrap();
    fs::write(corpus_dir.join("doc2.txt"), &fox).unwrap();
    fs::write(
        corpus_dir.join("doc3.txt"),
        "Completely unrelated content about weather patterns.",
    )
    .unwrap();
    let config = DedupConfig {
        save_results: true,
        ..config_for(&d.path().join("out"))
    };

    let corpus = Corpus::open(&corpus_dir).unwrap();
    let run = find_candidates(&corpus, &config).unwrap();
    assert_eq!(run.candidates.len(), 2);
    assert_eq!(
        run.candidates["doc1.txt"],
        BTreeSet::from(["doc2.txt".to_string()])
    );
    assert_eq!(
        run.candidates["doc2.txt"],
        BTreeSet::from(["doc1.txt".to_string()])
    );
    assert!(run.candidates.values().all(|c| !c.contains("doc3.txt")));

    let summary = pipeline::run(&corpus_dir, &config, &Source::Detect).unwrap();
    let score = summary.confirmed["doc1.txt"][0].1;
    assert!((score - 100.0).abs() < 1e-9);

    let left = remaining(&corpus_dir);
    assert!(left.contains("doc3.txt"));
    assert_eq!(
        usize::from(left.contains("doc1.txt")) + usize::from(left.contains("doc2.txt")),
        1
    );
    assert_eq!(summary.resolution.removed.len(), 1);
    assert_eq!(
        read_entries(&config.track_path()).unwrap(),
        summary.resolution.removed
    );
}

#[test]
fn largest_member_of_cluster_survives() {
    let d = TempDir::new().unwrap();
    let corpus_dir = d.path().join("corpus");
    write_cluster(&corpus_dir);
    let config = config_for(&d.path().join("out"));

    let summary = pipeline::run(&corpus_dir, &config, &Source::Detect).unwrap();

    assert_eq!(summary.resolution.removed, vec!["base.txt", "shorter.txt"]);
    assert_eq!(
        remaining(&corpus_dir),
        BTreeSet::from(["longer.txt".to_string(), "other.txt".to_string()])
    );
    assert_eq!(
        read_entries(&config.track_path()).unwrap(),
        vec!["base.txt", "shorter.txt"]
    );
}

#[test]
fn rerun_on_reduced_corpus_removes_nothing() {
    let d = TempDir::new().unwrap();
    let corpus_dir = d.path().join("corpus");
    write_cluster(&corpus_dir);
    let config = DedupConfig {
        save_results: true,
        ..config_for(&d.path().join("out"))
    };

    pipeline::run(&corpus_dir, &config, &Source::Detect).unwrap();
    let after_first = remaining(&corpus_dir);

    let config = DedupConfig {
        save_results: false,
        ..config
    };
    let again = pipeline::run(&corpus_dir, &config, &Source::Detect).unwrap();
    assert!(again.resolution.removed.is_empty());

    let from_saved = pipeline::run(
        &corpus_dir,
        &config,
        &Source::SavedResults(config.results_path()),
    )
    .unwrap();
    assert!(from_saved.resolution.removed.is_empty());
    assert_eq!(remaining(&corpus_dir), after_first);
    assert_eq!(read_entries(&config.track_path()).unwrap().len(), 2);
}

#[test]
fn saved_results_reproduce_direct_resolution() {
    let d = TempDir::new().unwrap();
    let direct_dir = d.path().join("direct");
    let replay_dir = d.path().join("replay");
    write_cluster(&direct_dir);
    write_cluster(&replay_dir);

    let direct_config = DedupConfig {
        save_results: true,
        ..config_for(&d.path().join("out-direct"))
    };
    let direct = pipeline::run(&direct_dir, &direct_config, &Source::Detect).unwrap();

    let replay_config = config_for(&d.path().join("out-replay"));
    let replay = pipeline::run(
        &replay_dir,
        &replay_config,
        &Source::SavedResults(direct_config.results_path()),
    )
    .unwrap();

    assert!(!direct.resolution.removed.is_empty());
    assert_eq!(direct.resolution.removed, replay.resolution.removed);
    assert_eq!(remaining(&direct_dir), remaining(&replay_dir));
}

#[test]
fn empty_files_are_removed_before_scanning() {
    let d = TempDir::new().unwrap();
    let corpus_dir = d.path().join("corpus");
    write_cluster(&corpus_dir);
    fs::write(corpus_dir.join("blank.txt"), "").unwrap();
    let config = config_for(&d.path().join("out"));

    let summary = pipeline::run(&corpus_dir, &config, &Source::Detect).unwrap();
    assert_eq!(summary.empty_removed, vec!["blank.txt"]);
    assert_eq!(
        read_entries(&config.empty_log_path()).unwrap(),
        vec!["blank.txt"]
    );
    assert!(!remaining(&corpus_dir).contains("blank.txt"));
}

#[test]
fn non_text_files_are_skipped_not_fatal() {
    let d = TempDir::new().unwrap();
    let corpus_dir = d.path().join("corpus");
    write_cluster(&corpus_dir);
    fs::write(corpus_dir.join("image.bin"), [0x89_u8, 0x50, 0x4e, 0x47, 0xff, 0xfe]).unwrap();
    let config = config_for(&d.path().join("out"));

    let summary = pipeline::run(&corpus_dir, &config, &Source::Detect).unwrap();
    assert_eq!(summary.candidates.skipped, 1);
    assert!(summary.skipped_or_missing() >= 1);
    assert!(remaining(&corpus_dir).contains("image.bin"));
}

#[test]
fn identical_short_documents_are_deduplicated() {
    let d = TempDir::new().unwrap();
    let corpus_dir = d.path().join("corpus");
    fs::create_dir(&corpus_dir).unwrap();
    let note = "please call me back when you get this message";
    fs::write(corpus_dir.join("note1.txt"), note).unwrap();
    fs::write(corpus_dir.join("note2.txt"), note).unwrap();
    fs::write(corpus_dir.join("fruit.txt"), "red apples on the table").unwrap();
    fs::write(corpus_dir.join("tax.txt"), "quarterly tax filing deadline").unwrap();
    let config = config_for(&d.path().join("out"));

    let summary = pipeline::run(&corpus_dir, &config, &Source::Detect).unwrap();

    assert_eq!(summary.candidates.too_short, 4);
    assert_eq!(summary.verify.pairs, 6);
    assert_eq!(summary.verify.confirmed, 1);
    assert_eq!(summary.resolution.removed, vec!["note2.txt"]);
    assert_eq!(
        remaining(&corpus_dir),
        BTreeSet::from([
            "fruit.txt".to_string(),
            "note1.txt".to_string(),
            "tax.txt".to_string()
        ])
    );
}

#[test]
fn saved_results_cannot_reach_outside_the_corpus() {
    let d = TempDir::new().unwrap();
    let corpus_dir = d.path().join("corpus");
    fs::create_dir(&corpus_dir).unwrap();
    fs::write(corpus_dir.join("a.txt"), words(0..100)).unwrap();
    fs::write(d.path().join("victim.txt"), "small").unwrap();
    let saved = d.path().join("dap.json");
    fs::write(&saved, r#"{"a.txt": [["../victim.txt", 100]]}"#).unwrap();
    let config = config_for(&d.path().join("out"));

    let err = pipeline::run(&corpus_dir, &config, &Source::SavedResults(saved)).unwrap_err();

    assert!(matches!(err, DedupError::Json { .. }));
    assert!(d.path().join("victim.txt").exists());
    assert!(read_entries(&config.track_path()).unwrap().is_empty());
}
