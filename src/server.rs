use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::error::{AppError, AppResult};
use crate::workflow::changelog_page::{ChangelogService, PageRequest};

#[derive(Debug, Default, Deserialize)]
struct ChangelogParams {
    window: Option<String>,
    limit: Option<String>,
    cursor: Option<String>,
}

pub fn router(service: Arc<ChangelogService>, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/changelog", get(changelog))
        .route("/health", get(health))
        .layer(cors_layer(allowed_origins))
        .with_state(service)
}

pub async fn serve(
    service: Arc<ChangelogService>,
    allowed_origins: &[String],
    addr: SocketAddr,
) -> AppResult<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, origins = allowed_origins.len(), "changelog service listening");
    axum::serve(listener, router(service, allowed_origins))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}

/// Only listed origins get `Access-Control-Allow-Origin`; everyone else
/// gets no CORS headers at all.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter(|origin| origin.as_str() != "*")
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET])
}

async fn changelog(
    State(service): State<Arc<ChangelogService>>,
    Query(params): Query<ChangelogParams>,
) -> Response {
    let request = PageRequest::new(
        parse_count(params.window.as_deref(), true),
        parse_count(params.limit.as_deref(), false),
        params.cursor,
    );

    match service.page(&request).await {
        Ok(payload) => (
            [
                (header::CONTENT_TYPE, "application/json"),
                (header::CACHE_CONTROL, "no-store"),
            ],
            payload,
        )
            .into_response(),
        Err(err) => ApiError(err).into_response(),
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

/// Parses `30`, or `30d` for windows. Negative values saturate to zero so the
/// page request clamps them; anything unparseable falls back to the default.
fn parse_count(raw: Option<&str>, allow_day_suffix: bool) -> Option<u32> {
    let raw = raw?.trim();
    let digits = if allow_day_suffix {
        raw.strip_suffix(['d', 'D']).unwrap_or(raw)
    } else {
        raw
    };
    let value = digits.parse::<i64>().ok()?;
    u32::try_from(value.clamp(0, i64::from(u32::MAX))).ok()
}

struct ApiError(AppError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Configuration(_) | AppError::Serialization(_) | AppError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        tracing::error!(error = %self.0, %status, "changelog request failed");
        (
            status,
            [(header::CACHE_CONTROL, "no-store")],
            Json(json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}
