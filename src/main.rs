use std::process::ExitCode;

use anyhow::anyhow;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use sirene_client::config::{Cli, Settings};
use sirene_client::error::{ConfigError, RunError};
use sirene_client::run::run;

fn init_logging() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("cannot install log subscriber: {e}"))
}

fn main() -> ExitCode {
    // A missing .env file is the common case.
    let _ = dotenvy::dotenv();

    if let Err(e) = init_logging() {
        eprintln!("{:#}", e);
    }

    let cli = Cli::parse();

    let settings = match Settings::from_cli(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            if matches!(e, ConfigError::MissingCredentials) {
                println!("{}", cli.setup_guidance());
            }
            let e = RunError::from(e);
            let code = e.exit_code();
            eprintln!("error: {:#}", anyhow::Error::from(e));
            return ExitCode::from(code);
        }
    };

    match run(&settings) {
        Ok(summary) => {
            debug!(succeeded = summary.succeeded(), "run complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            let code = e.exit_code();
            eprintln!("error: {:#}", anyhow::Error::from(e));
            ExitCode::from(code)
        }
    }
}
