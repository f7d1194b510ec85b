//! `mirrorfs mkdir` / `mirrorfs rmdir` — virtual folder management.

use clap::Args;

use mirrorfs_core::config::AppConfig;
use mirrorfs_core::error::AppError;
use mirrorfs_service::RequestContext;

use crate::output::{self, OutputFormat};

use super::build_app;

/// Arguments for mkdir
#[derive(Debug, Args)]
pub struct MkdirArgs {
    /// Folder display path (`root` creates just the root)
    pub path: String,
}

/// Arguments for rmdir
#[derive(Debug, Args)]
pub struct RmdirArgs {
    /// Folder display path (`root` deletes the root, if empty of real objects)
    pub path: String,
}

/// Execute mkdir
pub async fn execute_mkdir(
    args: &MkdirArgs,
    config: &AppConfig,
    ctx: &RequestContext,
    format: OutputFormat,
) -> Result<(), AppError> {
    let app = build_app(config).await?;
    let outcome = app
        .services
        .folder
        .create_virtual_folder(&args.path, ctx)
        .await?;

    match format {
        OutputFormat::Json => output::print_envelope(&outcome),
        OutputFormat::Table => {
            if outcome.path.is_empty() {
                output::print_success(&format!("Root '{}' ready", outcome.root));
            } else {
                output::print_success(&format!(
                    "Created '{}/{}' ({} marker rows)",
                    outcome.root, outcome.path, outcome.markers_created
                ));
            }
        }
    }
    Ok(())
}

/// Execute rmdir
pub async fn execute_rmdir(
    args: &RmdirArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let app = build_app(config).await?;
    let outcome = app.services.folder.delete_virtual_folder(&args.path).await?;

    match format {
        OutputFormat::Json => output::print_envelope(&outcome),
        OutputFormat::Table => output::print_success(&format!(
            "Removed '{}' ({} markers{})",
            args.path,
            outcome.markers_removed,
            if outcome.root_removed {
                ", root row included"
            } else {
                ""
            }
        )),
    }
    Ok(())
}
