use clap::Parser;
use neardup_core::cli::{self, Cli};
use neardup_core::exit::DedupExit;
use tracing_subscriber::EnvFilter;

fn main() -> DedupExit {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    cli::run(&cli).into()
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
