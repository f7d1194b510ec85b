//! `mirrorfs delete` — file, folder-cascade, and root deletion.

use clap::{Args, ValueEnum};
use dialoguer::Confirm;

use mirrorfs_core::config::AppConfig;
use mirrorfs_core::error::AppError;

use crate::output::{self, OutputFormat};

use super::build_app;

/// What the delete addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DeleteKind {
    /// A single object, addressed by its remote key
    File,
    /// A folder subtree, addressed by display path
    Folder,
    /// A whole root (refused while real objects remain)
    Root,
}

/// Arguments for the delete command
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Remote key (file) or display path (folder/root)
    pub target: String,

    /// What the target addresses
    #[arg(long, value_enum, default_value = "file")]
    pub kind: DeleteKind,

    /// Report what would be deleted without deleting anything
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Execute the delete command
pub async fn execute(
    args: &DeleteArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    if !args.dry_run && !args.yes && format == OutputFormat::Table {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete '{}'?", args.target))
            .default(false)
            .interact()
            .map_err(|e| AppError::internal(format!("Confirmation prompt failed: {e}")))?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    let app = build_app(config).await?;

    match args.kind {
        DeleteKind::File => {
            let outcome = app.services.delete.delete_file(&args.target).await?;
            match format {
                OutputFormat::Json => output::print_envelope(&outcome),
                OutputFormat::Table => output::print_success(&format!(
                    "Deleted '{}' (remote: {}, mirror: {})",
                    outcome.key, outcome.remote_removed, outcome.mirror_removed
                )),
            }
        }
        DeleteKind::Folder => {
            let outcome = app
                .services
                .delete
                .delete_folder(&args.target, args.dry_run)
                .await?;
            match format {
                OutputFormat::Json => output::print_envelope(&outcome),
                OutputFormat::Table => {
                    if outcome.dry_run {
                        println!(
                            "Would delete {} object(s) under '{}':",
                            outcome.matched, args.target
                        );
                        for key in &outcome.sample {
                            println!("  {key}");
                        }
                        if outcome.matched > outcome.sample.len() {
                            println!("  … and {} more", outcome.matched - outcome.sample.len());
                        }
                    } else if outcome.ok {
                        output::print_success(&format!(
                            "Deleted {} object(s) under '{}' ({} mirror rows, {} markers)",
                            outcome.remote_removed,
                            args.target,
                            outcome.mirror_removed,
                            outcome.markers_removed
                        ));
                    } else {
                        println!(
                            "Partial delete: {} ok, {} failed (failed keys stay mirrored)",
                            outcome.remote_removed,
                            outcome.failed.len()
                        );
                        for failure in &outcome.failed {
                            println!("  {}: {}", failure.key, failure.message);
                        }
                    }
                }
            }
        }
        DeleteKind::Root => {
            let outcome = app.services.delete.delete_root(&args.target).await?;
            match format {
                OutputFormat::Json => output::print_envelope(&outcome),
                OutputFormat::Table => output::print_success(&format!(
                    "Deleted root '{}' ({} markers removed)",
                    args.target, outcome.markers_removed
                )),
            }
        }
    }
    Ok(())
}
