//! Backend entry-point: configuration, migrations, and server bootstrap.

mod server;

use std::path::PathBuf;

use actix_web::cookie::Key;
use actix_web::web;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::inbound::http::health::HealthState;
use backend::outbound::persistence::{DbPool, PoolConfig};
use diesel::Connection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use server::{ServerConfig, create_server};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Command line and environment configuration.
#[derive(Debug, Parser)]
#[command(name = "backend", about = "Therapy-booking platform backend")]
struct Cli {
    /// Address to bind the HTTP listener to.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    bind_addr: std::net::SocketAddr,

    /// PostgreSQL connection string. When absent, records are held in memory.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// File holding the session key material (at least 64 bytes).
    #[arg(long, env = "SESSION_KEY_FILE")]
    session_key_file: Option<PathBuf>,

    /// Issue session cookies without the Secure attribute (local dev only).
    #[arg(long, env = "SESSION_COOKIE_INSECURE")]
    insecure_cookies: bool,
}

fn load_session_key(path: Option<&PathBuf>) -> std::io::Result<Key> {
    match path {
        Some(path) => {
            let bytes = std::fs::read(path).map_err(|err| {
                std::io::Error::other(format!(
                    "failed to read session key at {}: {err}",
                    path.display()
                ))
            })?;
            Ok(Key::derive_from(&bytes))
        }
        None => {
            warn!("no session key file configured; using an ephemeral key, sessions reset on restart");
            Ok(Key::generate())
        }
    }
}

fn run_migrations(database_url: &str) -> std::io::Result<()> {
    let mut conn = diesel::pg::PgConnection::establish(database_url)
        .map_err(|err| std::io::Error::other(format!("database connection failed: {err}")))?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| std::io::Error::other(format!("migrations failed: {err}")))?;
    if !applied.is_empty() {
        info!(count = applied.len(), "applied pending migrations");
    }
    Ok(())
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let cli = Cli::parse();
    let key = load_session_key(cli.session_key_file.as_ref())?;

    let db_pool = match &cli.database_url {
        Some(url) => {
            run_migrations(url)?;
            let pool = DbPool::new(PoolConfig::new(url.clone()))
                .await
                .map_err(|err| std::io::Error::other(err.to_string()))?;
            Some(pool)
        }
        None => None,
    };

    let health_state = web::Data::new(HealthState::new());
    let config = ServerConfig::new(key, !cli.insecure_cookies, cli.bind_addr).with_db_pool(db_pool);

    info!(addr = %cli.bind_addr, "starting server");
    create_server(health_state, config)?.await
}
