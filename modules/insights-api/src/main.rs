use std::sync::Arc;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

use insights_api::jwt::{JwtService, ISSUER};
use insights_api::{build_router, AppState};
use insights_common::{Config, StoreBackend};
use insights_store::{
    migrate, MemoryRecordStore, MemoryUserStore, PgRecordStore, PgUserStore, RecordStore,
    UserStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("insights=info".parse()?))
        .init();

    let config = Config::from_env()?;

    let (records, users): (Arc<dyn RecordStore>, Arc<dyn UserStore>) = match config.store {
        StoreBackend::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(&config.database_url)
                .await?;
            migrate(&pool).await?;
            info!("Connected to Postgres");
            (
                Arc::new(PgRecordStore::new(pool.clone())),
                Arc::new(PgUserStore::new(pool)),
            )
        }
        StoreBackend::Memory => {
            info!("Using in-memory store; data is lost on restart");
            (
                Arc::new(MemoryRecordStore::new()),
                Arc::new(MemoryUserStore::new()),
            )
        }
    };

    let state = Arc::new(AppState {
        records,
        users,
        jwt: JwtService::new(&config.jwt_secret, ISSUER.to_string(), config.jwt_ttl_hours),
        require_auth: config.require_auth,
    });

    let app = build_router(state, &config.cors_origins);

    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!(require_auth = config.require_auth, "Insights API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
