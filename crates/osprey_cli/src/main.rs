//! # osprey
//!
//! Runs a SageMaker training job as a pipeline step.
//!
//! ```sh
//! osprey train --role "$ROLE" --image 123456789012.dkr.ecr.us-west-2.amazonaws.com/my-image:1 \
//!     --channels '[{"ChannelName":"train","DataSource":{"S3DataSource":{"S3Uri":"s3://bucket/train","S3DataType":"S3Prefix"}}}]' \
//!     --model-artifact-path s3://bucket/models --output-dir /tmp/outputs
//! ```
//!
//! The exit status tells the pipeline how the job ended (see `osprey_core::constants::exit_codes`).

mod output;
mod train;

use clap::{Parser, Subcommand};
use osprey_core::constants::exit_codes;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "osprey", version, about = "Launch and follow SageMaker training jobs")]
struct Cli {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a training job and wait for it to finish
    Train(Box<train::TrainArgs>),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr; stdout is reserved for --dry-run output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Command::Train(args) => train::run(*args).await,
    };

    ExitCode::from(status(result))
}

/// Setup errors get their own code so a pipeline can tell them from a failed job.
fn status(result: anyhow::Result<u8>) -> u8 {
    result.unwrap_or_else(|e| {
        error!("{e:#}");
        exit_codes::SETUP
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn setup_errors_do_not_look_like_failed_jobs() {
        let code = status(Err(anyhow::anyhow!("Failed to read algorithm catalog")));

        assert_eq!(code, exit_codes::SETUP);
        assert_ne!(code, exit_codes::JOB_FAILED);
        assert_eq!(status(Ok(exit_codes::CANCELLED)), exit_codes::CANCELLED);
    }
}
