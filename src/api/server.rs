//! HTTP server implementation

use std::sync::Arc;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing::warn;

use crate::api::handlers::AppState;
use crate::api::routes;
use crate::config::AppConfig;
use crate::embeddings::EmbeddingClient;
use crate::embeddings::EmbeddingConfig;
use crate::llm::LlmService;
use crate::rag::bootstrap;
use crate::rag::AnalysisPipeline;
use crate::rag::SimilarityIndex;
use crate::Result;

/// Open the similarity index described by the config
///
/// Loads the snapshot when persistence is enabled, otherwise starts empty.
pub async fn open_index(config: &AppConfig) -> Result<Arc<SimilarityIndex>> {
    let embedder = Arc::new(EmbeddingClient::from_config(
        EmbeddingConfig::from_app_config(config)?,
    )?);

    let index = match config.index_path() {
        Some(path) => SimilarityIndex::open(path, embedder).await?,
        None => SimilarityIndex::new(embedder),
    };
    Ok(Arc::new(index))
}

/// Build the shared pipeline and seed its index
///
/// Fails when the seed cannot be embedded, so the server never binds
/// without a populated index.
pub async fn build_pipeline(config: &AppConfig) -> Result<Arc<AnalysisPipeline>> {
    let index = open_index(config).await?;

    let inserted = bootstrap(&index).await?;
    info!(
        "Index ready: {} incidents ({} seeded)",
        index.len().await,
        inserted
    );

    let model = Arc::new(LlmService::new(config)?);
    Ok(Arc::new(AnalysisPipeline::new(index, model, config.top_k())))
}

/// Wrap the routes in the HTTP middleware stack
pub fn build_app(state: AppState, enable_cors: bool) -> Router {
    let mut app = routes::app_routes(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new()),
    );

    if enable_cors {
        info!("CORS enabled");
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// Start the API server
pub async fn serve_api(config: &AppConfig, host: String, port: u16, enable_cors: bool) -> Result<()> {
    info!("Starting root cause analyzer...");

    let pipeline = build_pipeline(config).await?;
    let app = build_app(AppState::new(pipeline), enable_cors);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("API server listening on http://{}", addr);
    info!("Available endpoints:");
    info!("  GET  /               - Liveness");
    info!("  POST /analyze_ticket - Analyze a support ticket");
    info!("  GET  /stats          - Index statistics");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
