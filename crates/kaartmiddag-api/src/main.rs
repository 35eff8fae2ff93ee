//! Kaartmiddag API server entry point.

use std::error::Error;
use std::sync::Arc;

use kaartmiddag_api::config::ApiConfig;
use kaartmiddag_api::routes;
use kaartmiddag_api::state::AppState;
use kaartmiddag_core::clock::SystemClock;
use kaartmiddag_core::ids::RandomIds;
use kaartmiddag_core::repository::DocumentRepository;
use kaartmiddag_event_store::memory::InMemoryDocumentRepository;
use kaartmiddag_event_store::pg_document_repository::PgDocumentRepository;
use kaartmiddag_event_store::schema;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Kaartmiddag API server");

    let config = ApiConfig::from_env()?;

    let repository: Arc<dyn DocumentRepository> = if let Some(url) = &config.database_url {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await?;
        schema::migrate(&pool).await?;
        let repository = PgDocumentRepository::new(pool);
        let _listener = repository.start_listener().await?;
        Arc::new(repository)
    } else {
        tracing::warn!("DATABASE_URL not set; events are kept in memory only");
        Arc::new(InMemoryDocumentRepository::new())
    };

    let app_state = AppState::new(
        Arc::new(SystemClock),
        Arc::new(RandomIds),
        repository,
        config.settings,
    );

    app_state.catalog.refresh().await?;
    let _watcher = Arc::clone(&app_state.catalog).watch();

    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = routes::app(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.socket_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
