//! Schema bootstrap command

use anyhow::{Context, Result};
use clap::Parser;

use vetclinic_server::db::{create_pool, schema};

use crate::config::DatabaseArgs;

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub db: DatabaseArgs,
}

/// Create tables, indexes and the slot index for the chosen policy, then exit
pub async fn run_migrate(args: MigrateArgs) -> Result<()> {
    let database_url = args
        .db
        .database_url
        .as_deref()
        .context("DATABASE_URL not set. Set via --database-url, DATABASE_URL env, or .env")?;

    let pool = create_pool(database_url, args.db.pool_settings())
        .await
        .context("Failed to create database pool")?;

    schema::bootstrap(&pool, args.db.slot_policy)
        .await
        .context("Schema bootstrap failed")?;

    tracing::info!(slot_policy = %args.db.slot_policy, "schema ready");
    pool.close().await;
    Ok(())
}
