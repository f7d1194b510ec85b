//! `mirrorfs list` — folder listing.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use mirrorfs_core::config::AppConfig;
use mirrorfs_core::error::AppError;
use mirrorfs_core::path;
use mirrorfs_entity::listing::{EntryKind, FsEntry};
use mirrorfs_service::listing::ListOptions;
use mirrorfs_service::RequestContext;

use crate::output::{self, OutputFormat};

use super::build_app;

/// Arguments for the list command
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Folder path to list (`root` or `root/sub/folder`)
    pub path: String,

    /// Include every intermediate ancestor folder, not just direct children
    #[arg(long)]
    pub deep: bool,

    /// List files only, without synthesized folder entries
    #[arg(long)]
    pub no_folders: bool,
}

/// One listing row for table output
#[derive(Debug, Serialize, Tabled)]
struct EntryRow {
    kind: String,
    name: String,
    path: String,
    size: String,
    mime: String,
}

impl From<&FsEntry> for EntryRow {
    fn from(entry: &FsEntry) -> Self {
        Self {
            kind: match entry.kind {
                EntryKind::Folder => "dir".to_string(),
                EntryKind::File => "file".to_string(),
            },
            name: entry.name.clone(),
            path: entry.path.clone(),
            size: entry
                .size_bytes
                .map(|b| b.to_string())
                .unwrap_or_else(|| "-".to_string()),
            mime: entry.mime_type.clone().unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Execute the list command
pub async fn execute(
    args: &ListArgs,
    config: &AppConfig,
    ctx: &RequestContext,
    format: OutputFormat,
) -> Result<(), AppError> {
    let folder = path::split_folder_path(&args.path)?;
    let opts = ListOptions {
        prefix: (!folder.relative_prefix.is_empty()).then(|| folder.relative_prefix.clone()),
        deep: args.deep,
        include_folders: !args.no_folders,
    };

    let app = build_app(config).await?;
    let result = app.services.listing.browse(&folder.root, opts, ctx).await?;

    match format {
        OutputFormat::Json => output::print_envelope(&result),
        OutputFormat::Table => {
            let rows: Vec<EntryRow> = result.entries.iter().map(EntryRow::from).collect();
            output::print_list(&rows);
            for diagnostic in &result.diagnostics {
                eprintln!("warning: {diagnostic}");
            }
        }
    }
    Ok(())
}
