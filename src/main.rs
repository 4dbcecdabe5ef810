use clap::Parser;
use shareit_booking::cli::{self, Cli};
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match EnvFilter::try_new(&cli.config.log_filter) {
        Ok(filter) => filter,
        Err(e) => {
            eprintln!("invalid log filter {:?}: {e}; using \"info\"", cli.config.log_filter);
            EnvFilter::new("info")
        }
    };
    if let Err(e) = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("tracing init failed: {e}");
    }

    match cli::run(&cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(status = e.status_code(), error = %e, "command failed");
            eprintln!("{} {e}", e.status_code());
            ExitCode::FAILURE
        }
    }
}
