pub mod handlers;
pub mod types;

use crate::{
    Result,
    config::Config,
    flows::{FlowRunner, TracingObserver},
    llm::OpenAiModelClient,
};
use axum::{
    Router,
    http::{HeaderValue, header},
    routing::post,
};
use handlers::AppState;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::info;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/relevance",
            post(handlers::relevance).options(handlers::preflight),
        )
        .route(
            "/scene-description",
            post(handlers::scene_description).options(handlers::preflight),
        )
        .route(
            "/assistant",
            post(handlers::assistant).options(handlers::preflight),
        )
        // Paths used by the first mobile release
        .route(
            "/api/content-relevance",
            post(handlers::relevance).options(handlers::preflight),
        )
        .route(
            "/api/described-detailes-scene",
            post(handlers::scene_description).options(handlers::preflight),
        )
        .route(
            "/api/personal-assistant",
            post(handlers::assistant).options(handlers::preflight),
        )
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(config: Config) -> Result<()> {
    let model = OpenAiModelClient::new(config.llm.clone());
    info!(
        "Using {} model '{}' for all flows",
        config.llm.provider, config.llm.model
    );

    let app_state = AppState {
        flows: FlowRunner::new(Arc::new(model), Arc::new(TracingObserver)),
    };
    let app = router(app_state);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
