use tracing_subscriber::EnvFilter;

mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    // Pick up RECEIPTDROP_* settings from a local .env before anything reads them.
    receiptdrop::config::load_dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = Cli::run_from_args().await {
        eprintln!("receiptdrop error: {err:#}");
        std::process::exit(1);
    }
}
