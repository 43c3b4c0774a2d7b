use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::AppState;

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let last_ranking = state
        .latest_report
        .read()
        .await
        .as_ref()
        .map(|r| r.completed_at);
    let tracked_whales = state.whale_scores.read().await.len();

    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "last_ranking": last_ranking,
            "tracked_whales": tracked_whales,
        })),
    )
}
