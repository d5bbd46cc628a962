//! HTTP surface: submit a query, receive the final answer.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use tuber_core::agent::AgentLoop;
use tuber_core::config::Config;

struct AppState {
    agent: Arc<AgentLoop>,
}

pub async fn run_serve(host: &str, port: u16, config: Config) -> anyhow::Result<()> {
    let agent = crate::build_agent(&config)?;
    let state = Arc::new(AppState { agent });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/query", post(query))
        .layer(cors)
        .with_state(state);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("listening on http://{addr}");
    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(Deserialize)]
struct QueryRequest {
    query: String,
}

#[derive(Serialize)]
struct QueryResponse {
    result: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

/// Each request runs its own session; only the agent stack is shared.
async fn query(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QueryRequest>,
) -> impl IntoResponse {
    info!("processing query over HTTP");
    match state.agent.run(&request.query).await {
        Ok(result) => (StatusCode::OK, Json(QueryResponse { result })).into_response(),
        Err(e) => {
            error!("query failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}
