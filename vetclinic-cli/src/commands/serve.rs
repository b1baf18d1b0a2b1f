//! HTTP server command

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use vetclinic_server::db::{MemoryRecordStore, PgRecordStore, RecordStore};
use vetclinic_server::http::{run_server, ServerConfig};
use vetclinic_server::QueryGateway;

use crate::config::DatabaseArgs;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Interface to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, short = 'p', env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Allowed CORS origin (repeatable). Any origin when none is given
    #[arg(long = "cors-origin", value_name = "ORIGIN")]
    pub cors_origins: Vec<String>,

    /// Keep records in process memory instead of PostgreSQL
    #[arg(long)]
    pub in_memory: bool,

    #[command(flatten)]
    pub db: DatabaseArgs,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let policy = args.db.slot_policy;

    let store: Arc<dyn RecordStore> = if args.in_memory {
        tracing::warn!("Using in-memory store; records are lost on shutdown");
        Arc::new(MemoryRecordStore::new(policy))
    } else {
        let database_url = args
            .db
            .database_url
            .as_deref()
            .context("DATABASE_URL not set. Set via --database-url, DATABASE_URL env, or .env")?;
        let store = PgRecordStore::connect(database_url, args.db.pool_settings(), policy)
            .await
            .context("Failed to connect to database")?;
        Arc::new(store)
    };

    let config = ServerConfig {
        bind_addr: SocketAddr::new(args.host, args.port),
        allowed_origins: args.cors_origins,
    };

    run_server(QueryGateway::new(store), config)
        .await
        .context("Server error")?;

    Ok(())
}
