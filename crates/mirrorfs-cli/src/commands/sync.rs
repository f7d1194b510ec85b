//! `mirrorfs sync` — manual reconciliation from the remote store.

use clap::Args;

use mirrorfs_core::config::AppConfig;
use mirrorfs_core::error::AppError;
use mirrorfs_service::RequestContext;

use crate::output::{self, OutputFormat};

use super::build_app;

/// Arguments for the sync command
#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Restrict the sync to keys under this prefix
    #[arg(long)]
    pub prefix: Option<String>,
}

/// Execute the sync command
pub async fn execute(
    args: &SyncArgs,
    config: &AppConfig,
    ctx: &RequestContext,
    format: OutputFormat,
) -> Result<(), AppError> {
    let app = build_app(config).await?;
    let outcome = app
        .services
        .sync
        .sync_from_remote(args.prefix.as_deref(), true, ctx)
        .await?;

    match format {
        OutputFormat::Json => output::print_envelope(&outcome),
        OutputFormat::Table => output::print_success(&format!(
            "Synced {} object(s): {} upserted, {} skipped",
            outcome.scanned, outcome.upserted, outcome.skipped
        )),
    }
    Ok(())
}
