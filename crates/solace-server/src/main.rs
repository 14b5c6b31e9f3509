mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use solace_api::AppStateInner;
use solace_crypto::RecordCodec;
use solace_db::Database;

use crate::config::{Config, DEV_ENCRYPTION_KEY};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "solace=debug,solace_api=debug,solace_db=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    if config.encryption_key.is_none() {
        warn!("SOLACE_ENCRYPTION_KEY is not set; using the development key");
    }
    let codec = RecordCodec::from_config(config.encryption_key.as_deref(), Some(DEV_ENCRYPTION_KEY))?;

    // Init database
    let db = Database::open(&config.db_path, codec)?;

    let app = solace_api::router(Arc::new(AppStateInner { db }))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Solace store listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
