//! CLI for the receipt uploader.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use receiptdrop::{ProcessingMethod, RetryOn, Submission, Submitter, UploadRequest, UploaderConfig};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "receiptdrop", version)]
#[command(about = "Upload receipt images for processing", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Upload one receipt image.
    Upload {
        /// Image file to upload (jpg, png, gif, webp, bmp, tiff, heic).
        file: PathBuf,

        /// Server base URL. Overrides RECEIPTDROP_BASE_URL.
        #[arg(long, value_name = "URL")]
        server: Option<String>,

        /// Retries after the first attempt. Overrides RECEIPTDROP_MAX_RETRIES.
        #[arg(long, value_name = "N")]
        retries: Option<u32>,

        /// Per-attempt timeout in seconds. Overrides RECEIPTDROP_TIMEOUT.
        #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
        timeout: Option<u64>,

        /// How the server should read the receipt: combined, veryfi or tesseract.
        #[arg(long, value_name = "METHOD", default_value_t = ProcessingMethod::Combined)]
        processing_method: ProcessingMethod,

        /// Only retry failures that may go away on their own (timeouts, 5xx, 408, 429).
        #[arg(long)]
        transient_only: bool,
    },
}

impl Cli {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        match cli.command {
            command @ CliCommand::Upload { .. } => run_upload(command).await,
        }
    }
}

/// Environment configuration with command-line overrides applied.
fn upload_config(command: &CliCommand) -> Result<UploaderConfig> {
    let CliCommand::Upload {
        server,
        retries,
        timeout,
        transient_only,
        ..
    } = command;

    let mut config = UploaderConfig::from_env().context("invalid RECEIPTDROP_* environment")?;
    if let Some(server) = server {
        config.base_url = server.clone();
    }
    if let Some(retries) = retries {
        config.max_retries = *retries;
    }
    if let Some(timeout) = timeout {
        config.attempt_timeout = Duration::from_secs(*timeout);
    }
    if *transient_only {
        config.retry_on = RetryOn::Transient;
    }
    config.validate()?;
    Ok(config)
}

async fn run_upload(command: CliCommand) -> Result<()> {
    let config = upload_config(&command)?;
    let CliCommand::Upload {
        file,
        processing_method,
        ..
    } = command;

    let request = UploadRequest::from_path(&file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?
        .with_processing_method(processing_method);

    let base_url = config.base_url.trim_end_matches('/').to_string();
    tracing::debug!(?config, "uploading {}", file.display());
    let submitter = Submitter::new(config)?;

    match submitter.submit(&request).await.context("upload failed")? {
        Submission::Accepted { receipt, location } => {
            println!("Receipt {} uploaded: {base_url}{location}", receipt.receipt_id);
            Ok(())
        }
        Submission::Rejected { message } => bail!("server could not process the receipt: {message}"),
    }
}
