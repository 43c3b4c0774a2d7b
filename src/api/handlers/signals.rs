use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use super::ApiResponse;
use crate::models::MirrorSignal;
use crate::AppState;

const DEFAULT_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<usize>,
}

/// Most recent mirror signals, newest first.
pub async fn recent(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> Json<ApiResponse<Vec<MirrorSignal>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    let signals: Vec<MirrorSignal> = state
        .recent_signals
        .read()
        .await
        .iter()
        .rev()
        .take(limit)
        .cloned()
        .collect();

    Json(ApiResponse::ok(signals))
}
