use crate::error::PreviewError;
use crate::links::{CachedPreview, PreviewOutcome, parse_target};
use axum::{
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

use super::{AppState, PreviewQuery};

pub(super) const BOT_BLOCKED_MESSAGE: &str = "Access denied by bot protection";

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let err = serde_json::json!({ "error": message.into() });
    (status, Json(err)).into_response()
}

/// GET /health
pub(super) async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "cache_entries": state.cache.len(),
    }))
}

/// GET /api/preview?url=… — fetch a page and return its preview metadata
pub(super) async fn handle_preview(
    State(state): State<AppState>,
    query: Result<Query<PreviewQuery>, QueryRejection>,
) -> Response {
    let raw_url = match query {
        Ok(Query(PreviewQuery { url: Some(url) })) if !url.trim().is_empty() => url,
        Ok(_) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "Missing required query parameter: url",
            );
        }
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.body_text()),
    };

    let target = match parse_target(&raw_url) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(url = %raw_url, error = %e, "rejected preview target");
            return error_response(StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    if let Some(cached) = state.cache.get(target.as_str()) {
        tracing::debug!(url = %target, "preview cache hit");
        return (StatusCode::OK, Json(cached.into_body(raw_url.trim()))).into_response();
    }

    let preview = match state.fetcher.fetch(&target).await {
        Ok(PreviewOutcome::Html(meta)) => CachedPreview::Page(meta.into()),
        Ok(PreviewOutcome::NotHtml) => CachedPreview::NotHtml,
        Ok(PreviewOutcome::BotBlocked) => {
            tracing::warn!(url = %target, "upstream response classified as bot traffic");
            return error_response(StatusCode::FORBIDDEN, BOT_BLOCKED_MESSAGE);
        }
        Err(e) => {
            log_preview_failure(&target, &e);
            return error_response(StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    if let Some(evicted) = state.cache.insert(target.as_str(), preview.clone()) {
        tracing::debug!(evicted = %evicted, "preview cache full, evicted oldest entry");
    }
    (StatusCode::OK, Json(preview.into_body(raw_url.trim()))).into_response()
}

fn log_preview_failure(target: &url::Url, error: &PreviewError) {
    match error {
        PreviewError::UpstreamStatus { status } => {
            tracing::warn!(url = %target, status, "preview upstream returned error status");
        }
        other => tracing::warn!(url = %target, error = %other, "preview fetch failed"),
    }
}
