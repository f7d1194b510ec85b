//! `mirrorfs stats` — mirror statistics.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use mirrorfs_core::config::AppConfig;
use mirrorfs_core::error::AppError;
use mirrorfs_database::repositories::{AssetRepository, RootRepository};

use crate::output::{self, OutputFormat};

use super::build_app;

/// Arguments for the stats command
#[derive(Debug, Args)]
pub struct StatsArgs {}

/// Mirror-wide counters
#[derive(Debug, Serialize, Tabled)]
struct StatsRow {
    roots: usize,
    objects: i64,
    virtual_markers: i64,
    total_bytes: i64,
}

/// Execute the stats command
pub async fn execute(
    _args: &StatsArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let app = build_app(config).await?;
    let assets = AssetRepository::new(app.pool.pool().clone());
    let roots = RootRepository::new(app.pool.pool().clone());

    let row = StatsRow {
        roots: roots.list_slugs().await?.len(),
        objects: assets.count_real().await?,
        virtual_markers: assets.count_markers().await?,
        total_bytes: assets.total_size_bytes().await?,
    };

    match format {
        OutputFormat::Json => output::print_envelope(&row),
        OutputFormat::Table => output::print_list(&[row]),
    }
    Ok(())
}
