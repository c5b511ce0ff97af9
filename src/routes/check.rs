use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::{BatchSummary, CheckResult};
use crate::services::batch_checker::{normalize_lines, split_input, summarize};
use crate::services::export::working_links_text;
use crate::AppState;

/// Request body: explicit URL list and/or free text with one URL per line
#[derive(Debug, Default, Deserialize)]
pub struct CheckRequest {
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl CheckRequest {
    /// All candidate lines, URLs first, then text lines
    fn lines(&self) -> Vec<&str> {
        let mut lines: Vec<&str> = self.urls.iter().map(String::as_str).collect();
        if let Some(text) = &self.text {
            lines.extend(split_input(text));
        }
        lines
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
    pub results: Vec<CheckResult>,
    pub summary: BatchSummary,
}

type ApiError = (StatusCode, Json<serde_json::Value>);

/// Validate batch size and run the checker
pub(crate) async fn run_batch(state: &AppState, lines: &[&str]) -> Result<Vec<CheckResult>, ApiError> {
    let urls = normalize_lines(lines);

    if urls.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "Please enter at least one URL" })),
        ));
    }

    if urls.len() > state.config.max_batch_size {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": format!(
                    "Too many URLs: {} (limit {})",
                    urls.len(),
                    state.config.max_batch_size
                )
            })),
        ));
    }

    Ok(state.checker.check_many(&urls).await)
}

/// POST /api/check - Probe every unique URL and return per-URL results
pub async fn check_links(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CheckRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let results = run_batch(&state, &payload.lines()).await?;
    let summary = summarize(&results);

    Ok(Json(CheckResponse { results, summary }))
}

/// POST /api/check/working - Probe and return working links as a text file
pub async fn download_working_links(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CheckRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let results = run_batch(&state, &payload.lines()).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"working-links.txt\"",
            ),
        ],
        working_links_text(&results),
    ))
}
