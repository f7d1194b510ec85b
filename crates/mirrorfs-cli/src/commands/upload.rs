//! `mirrorfs upload-intent` — request an upload slot for a new key.

use std::sync::Arc;

use clap::Args;

use mirrorfs_core::config::AppConfig;
use mirrorfs_core::error::AppError;
use mirrorfs_core::path;
use mirrorfs_core::traits::remote::RemoteStore;
use mirrorfs_remote::RemoteClient;

use crate::output::{self, OutputFormat};

/// Arguments for the upload-intent command
#[derive(Debug, Args)]
pub struct UploadIntentArgs {
    /// Display path the new object should appear at
    pub path: String,
}

/// Execute the upload-intent command
pub async fn execute(
    args: &UploadIntentArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let parsed = path::split_display_path(&args.path)?;
    let key = path::display_key(&parsed.root, &parsed.relative_path);

    let remote: Arc<dyn RemoteStore> = Arc::new(RemoteClient::new(config.remote.clone())?);
    let intent = remote.create_upload_intent(&key).await?;

    match format {
        OutputFormat::Json => output::print_envelope(&intent),
        OutputFormat::Table => {
            output::print_success(&format!("Upload slot granted for '{}'", intent.key));
            println!("  PUT the object body to: {}", intent.upload_url);
            println!("  Run `mirrorfs sync` afterwards to mirror the metadata.");
        }
    }
    Ok(())
}
