//! Galleria operator CLI.
//!
//! Configuration comes from the same environment as the API server
//! (DATABASE_URL, S3_*, UPLOAD_DIR).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use galleria_cli::{MigrationOptions, Migrator};
use galleria_core::Config;
use galleria_db::PgMediaStore;
use galleria_storage::StorageRouter;
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "galleria", about = "Galleria operator CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Move local media files to remote object storage with per-file
    /// verification. Never deletes local files.
    Migrate {
        /// Report candidates without writing anything
        #[arg(long)]
        dry_run: bool,
        /// Only verify remote existence of already-migrated records
        #[arg(long)]
        verify_only: bool,
        /// Directory for the pre-migration record snapshot
        #[arg(long, default_value = "backups")]
        backup_dir: PathBuf,
    },
}

fn print_json(value: &impl Serialize) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize report")?;
    println!("{}", out);
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "galleria=info".into()),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Migrate {
            dry_run,
            verify_only,
            backup_dir,
        } => {
            let config = Config::from_env().context("Failed to load configuration")?;

            if !config.remote_storage_configured() {
                anyhow::bail!(
                    "Remote storage is not configured. Set S3_BUCKET, S3_ACCESS_KEY_ID, and S3_SECRET_ACCESS_KEY."
                );
            }

            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(&config.database_url)
                .await
                .context("Failed to connect to database")?;

            let store = PgMediaStore::new(pool);
            store
                .ensure_schema()
                .await
                .context("Failed to ensure database schema")?;

            let router = StorageRouter::from_config(&config)
                .await
                .context("Failed to initialize storage backends")?;

            let migrator = Migrator::new(
                Arc::new(store),
                router.local().clone(),
                router
                    .remote()
                    .context("Remote storage backend unavailable")?
                    .clone(),
            );

            let options = MigrationOptions {
                dry_run,
                verify_only,
                backup_dir,
            };

            let report = migrator.run(&options).await?;
            print_json(&report)?;

            if report.failed > 0 {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
