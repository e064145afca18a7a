//! Ledger audit binary
//!
//! Loads the persisted chain, runs whole-chain validation, and reports the
//! outcome. Exits non-zero when the chain is broken, so the check can gate
//! cron jobs and deploy pipelines.

use ballot_ledger::{ChainStatus, Config, Ledger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;

    tracing::info!(
        service = %config.service_name,
        data_dir = ?config.data_dir,
        "Starting ledger audit"
    );

    let ledger = Ledger::open(config).await?;
    let status = ledger.validate().await?;
    let entries = ledger.entries().await?;

    match status {
        ChainStatus::Valid => {
            tracing::info!(entries = entries.len(), "Chain is valid");
            ledger.shutdown().await?;
            Ok(())
        }
        ChainStatus::Broken { index, fault } => {
            tracing::error!(entries = entries.len(), index, %fault, "Chain is BROKEN");
            ledger.shutdown().await?;
            std::process::exit(1);
        }
    }
}
