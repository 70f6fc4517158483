//! Demo server: registers the demo record variants, prepares a backend and
//! serves the dynamic CRUD surface.
//!
//! With `DATABASE_URL` set, records persist to PostgreSQL; otherwise an
//! in-memory backend is used.

mod records;

use dynrest::{
    app_router, ensure_database_exists, AppState, EntityRegistry, MemoryBackend, PostgresBackend,
    Settings, StorageBackend,
};
use records::{DemoRecord, SecondRecord};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("dynrest=info,demo_server=info")),
        )
        .init();

    let settings = Settings::from_env();

    let registry = Arc::new(
        EntityRegistry::builder()
            .register::<DemoRecord>()
            .register::<SecondRecord>()
            .build()?,
    );

    let backend: Arc<dyn StorageBackend> = match &settings.database_url {
        Some(url) => {
            ensure_database_exists(url).await?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(5)
                .connect(url)
                .await?;
            tracing::info!(schema = %settings.pg_schema, "using PostgreSQL backend");
            Arc::new(PostgresBackend::new(pool, settings.pg_schema.clone()))
        }
        None => {
            tracing::info!("no DATABASE_URL; using in-memory backend");
            Arc::new(MemoryBackend::new())
        }
    };
    backend.prepare(&registry.metas()).await?;

    let state = AppState::new(registry, backend);
    let app = app_router(state, settings.max_body_bytes);

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
