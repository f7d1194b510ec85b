//! `mirrorfs rename` — file and folder renames.

use clap::{Args, ValueEnum};

use mirrorfs_core::config::AppConfig;
use mirrorfs_core::error::AppError;
use mirrorfs_service::RequestContext;

use crate::output::{self, OutputFormat};

use super::build_app;

/// What kind of path the rename addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RenameKind {
    /// A single file
    File,
    /// A folder subtree (or a whole root)
    Folder,
}

/// Arguments for the rename command
#[derive(Debug, Args)]
pub struct RenameArgs {
    /// Source display path
    pub from: String,

    /// Destination display path
    pub to: String,

    /// Rename a single file or a whole folder subtree
    #[arg(long, value_enum, default_value = "file")]
    pub kind: RenameKind,
}

/// Execute the rename command
pub async fn execute(
    args: &RenameArgs,
    config: &AppConfig,
    ctx: &RequestContext,
    format: OutputFormat,
) -> Result<(), AppError> {
    let app = build_app(config).await?;

    match args.kind {
        RenameKind::File => {
            let outcome = app
                .services
                .rename
                .rename_file(&args.from, &args.to, ctx)
                .await?;
            match format {
                OutputFormat::Json => output::print_envelope(&outcome),
                OutputFormat::Table => output::print_success(&format!(
                    "Renamed '{}' -> '{}'",
                    outcome.old_key, outcome.new_key
                )),
            }
        }
        RenameKind::Folder => {
            let outcome = app
                .services
                .rename
                .rename_folder(&args.from, &args.to, ctx)
                .await?;
            match format {
                OutputFormat::Json => output::print_envelope(&outcome),
                OutputFormat::Table => {
                    if outcome.root_renamed {
                        output::print_success(&format!(
                            "Renamed empty root '{}' -> '{}'",
                            args.from, args.to
                        ));
                    } else {
                        output::print_success(&format!(
                            "Renamed '{}' -> '{}' ({} rows)",
                            args.from, args.to, outcome.renamed
                        ));
                    }
                }
            }
        }
    }
    Ok(())
}
