use clap::Parser;
use tradejournal::cli::{init_tracing, run, Cli};

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    run(cli)
}
