use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use davy::cli::Args;
use davy::ExitStatus;

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitStatus::InvalidInput.into()
            } else {
                ExitStatus::Success.into()
            };
        }
    };

    // Initialize tracing; stdout is reserved for command output
    let default_filter = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let status = tokio::select! {
        result = davy::commands::run(args) => match result {
            Ok(()) => ExitStatus::Success,
            Err(e) => {
                eprintln!("[ERROR] {e}");
                ExitStatus::for_error(&e)
            }
        },
        Ok(()) = tokio::signal::ctrl_c() => {
            eprintln!("\nAborted.");
            ExitStatus::Interrupted
        }
    };

    status.into()
}
