use clap::Parser;
use iac_scan::{
    Cli, reporter_for,
    run::{EXIT_ERROR, EXIT_NO_FILES, run_scan},
};
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run_scan(&cli) {
        Ok(report) => {
            println!("{}", reporter_for(cli.format, cli.verbose).report(&report));
            ExitCode::from(report.exit_code())
        }
        Err(e) if e.is_no_files() => {
            eprintln!("{}", e);
            ExitCode::from(EXIT_NO_FILES)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
