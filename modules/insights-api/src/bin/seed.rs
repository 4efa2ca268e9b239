//! Replaces the record table with the contents of a JSON seed file.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

use insights_api::seed::import_file;
use insights_store::{migrate, PgRecordStore};

#[derive(Parser)]
#[command(name = "seed", about = "Import dashboard records from a JSON array")]
struct Args {
    /// Path to the JSON seed file.
    #[arg(long, default_value = "seed/jsondata.json")]
    file: PathBuf,

    /// Postgres connection string.
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Append instead of clearing existing records first.
    #[arg(long)]
    keep_existing: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("insights=info".parse()?))
        .init();

    let args = Args::parse();
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&args.database_url)
        .await?;
    migrate(&pool).await?;

    let store = PgRecordStore::new(pool);
    let summary = import_file(&store, &args.file, args.keep_existing).await?;
    info!(
        cleared = summary.cleared,
        imported = summary.imported,
        "{} records imported successfully",
        summary.imported
    );

    Ok(())
}
