//! CLI command definitions and dispatch.

pub mod delete;
pub mod folder;
pub mod list;
pub mod migrate;
pub mod rename;
pub mod stats;
pub mod sync;
pub mod upload;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mirrorfs_core::config::AppConfig;
use mirrorfs_core::error::AppError;
use mirrorfs_core::traits::remote::RemoteStore;
use mirrorfs_core::types::Envelope;
use mirrorfs_database::DatabasePool;
use mirrorfs_remote::RemoteClient;
use mirrorfs_service::{RequestContext, Services};

use crate::output::OutputFormat;

/// MirrorFS — hierarchical view over a flat remote object store
#[derive(Debug, Parser)]
#[command(name = "mirrorfs", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment (merges config/default.toml + config/<env>.toml)
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Acting identity recorded on lazily created rows
    #[arg(long, default_value = "cli")]
    pub actor: String,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List a folder (folders first, then files)
    List(list::ListArgs),
    /// Rename a file or folder
    Rename(rename::RenameArgs),
    /// Delete a file, folder subtree, or root
    Delete(delete::DeleteArgs),
    /// Create a virtual folder
    Mkdir(folder::MkdirArgs),
    /// Delete a virtual folder
    Rmdir(folder::RmdirArgs),
    /// Reconcile the mirror from the remote store
    Sync(sync::SyncArgs),
    /// Request an upload slot for a new object key
    UploadIntent(upload::UploadIntentArgs),
    /// Mirror statistics
    Stats(stats::StatsArgs),
    /// Run database migrations
    Migrate(migrate::MigrateArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = AppConfig::load(&self.env)?;
        init_logging(&config);

        let result = self.dispatch(&config).await;

        if let Err(err) = &result {
            if self.format == OutputFormat::Json {
                let envelope = Envelope::<serde_json::Value>::failure(err);
                let json =
                    serde_json::to_string_pretty(&envelope).unwrap_or_else(|_| "{}".to_string());
                println!("{}", json);
            }
        }
        result
    }

    async fn dispatch(&self, config: &AppConfig) -> Result<(), AppError> {
        let ctx = RequestContext::new(self.actor.as_str());
        match &self.command {
            Commands::List(args) => list::execute(args, config, &ctx, self.format).await,
            Commands::Rename(args) => rename::execute(args, config, &ctx, self.format).await,
            Commands::Delete(args) => delete::execute(args, config, self.format).await,
            Commands::Mkdir(args) => folder::execute_mkdir(args, config, &ctx, self.format).await,
            Commands::Rmdir(args) => folder::execute_rmdir(args, config, self.format).await,
            Commands::Sync(args) => sync::execute(args, config, &ctx, self.format).await,
            Commands::UploadIntent(args) => upload::execute(args, config, self.format).await,
            Commands::Stats(args) => stats::execute(args, config, self.format).await,
            Commands::Migrate(args) => migrate::execute(args, config).await,
        }
    }
}

/// Initialize tracing from configuration (RUST_LOG wins when set)
fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match config.logging.format.as_str() {
        "json" => builder.json().try_init(),
        _ => builder.try_init(),
    };
    // A second init in the same process (tests) is fine to ignore.
    let _ = result;
}

/// Everything a command needs to run against live backends.
pub(crate) struct App {
    /// Wired services.
    pub services: Services,
    /// The database pool, for commands that query repositories directly.
    pub pool: DatabasePool,
}

/// Connect the pool and remote client and wire the services.
pub(crate) async fn build_app(config: &AppConfig) -> Result<App, AppError> {
    let pool = DatabasePool::connect(&config.database).await?;
    let remote: Arc<dyn RemoteStore> = Arc::new(RemoteClient::new(config.remote.clone())?);
    let services = Services::new(pool.pool().clone(), remote, config);
    Ok(App { services, pool })
}
