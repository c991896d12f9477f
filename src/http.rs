//! HTTP transport module for topic-unraveler
//!
//! Exposes the four research operations as JSON POST endpoints with permissive CORS.
//! Success bodies are the validated result; failures are `{"error": "..."}` with status 429,
//! 402 or 500 depending on the classified kind.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{HeaderName, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};

use crate::classify::{ClassifiedError, ErrorKind};
use crate::pipeline::Pipeline;
use crate::request::FeatureRequest;

/// Shared state for HTTP server
#[derive(Clone)]
pub struct HttpState {
    pub pipeline: Pipeline,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TopicBody {
    topic: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CitationBody {
    topic: String,
    style: String,
    file_content: Option<String>,
    file_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ContextBody {
    context: String,
}

impl IntoResponse for ClassifiedError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.kind.response_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(json!({ "error": self.message }))).into_response()
    }
}

async fn health_handler() -> &'static str {
    "ok"
}

/// Plain OPTIONS without CORS request headers still succeeds with no body.
async fn preflight_handler() -> StatusCode {
    StatusCode::OK
}

async fn generate_subtopics(
    State(state): State<HttpState>,
    body: Result<Json<TopicBody>, JsonRejection>,
) -> Response {
    run(&state, body, |b| FeatureRequest::Planning { topic: b.topic }).await
}

async fn analyze_research(
    State(state): State<HttpState>,
    body: Result<Json<TopicBody>, JsonRejection>,
) -> Response {
    run(&state, body, |b| FeatureRequest::Analysis { topic: b.topic }).await
}

async fn generate_citations(
    State(state): State<HttpState>,
    body: Result<Json<CitationBody>, JsonRejection>,
) -> Response {
    run(&state, body, |b| FeatureRequest::Citation {
        topic: b.topic,
        style: b.style,
        file_content: b.file_content,
        file_name: b.file_name,
    })
    .await
}

async fn synthesize_research(
    State(state): State<HttpState>,
    body: Result<Json<ContextBody>, JsonRejection>,
) -> Response {
    run(&state, body, |b| FeatureRequest::Synthesis { context: b.context }).await
}

async fn run<T>(
    state: &HttpState,
    body: Result<Json<T>, JsonRejection>,
    to_request: impl FnOnce(T) -> FeatureRequest,
) -> Response {
    let request = match body {
        Ok(Json(b)) => to_request(b),
        Err(rejection) => {
            tracing::warn!("Rejected request body: {}", rejection.body_text());
            return ClassifiedError::new(
                ErrorKind::InputMissing,
                format!("Invalid request body: {}", rejection.body_text()),
            )
            .into_response();
        }
    };

    match state.pipeline.run(&request).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => err.into_response(),
    }
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            header::CONTENT_TYPE,
        ])
}

pub fn router(pipeline: Pipeline) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/generate-subtopics",
            post(generate_subtopics).options(preflight_handler),
        )
        .route(
            "/analyze-research",
            post(analyze_research).options(preflight_handler),
        )
        .route(
            "/generate-citations",
            post(generate_citations).options(preflight_handler),
        )
        .route(
            "/synthesize-research",
            post(synthesize_research).options(preflight_handler),
        )
        .layer(cors_layer())
        .with_state(HttpState { pipeline })
}

/// Start the HTTP server
pub async fn start_http_server(pipeline: Pipeline, bind: SocketAddr) -> anyhow::Result<()> {
    let app = router(pipeline);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind HTTP listener: {}", e))?;

    tracing::info!("Starting HTTP server on {}", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await
        .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))?;

    Ok(())
}
