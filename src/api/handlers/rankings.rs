use alloy::primitives::Address;
use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::ApiResponse;
use crate::errors::AppError;
use crate::intelligence::RankedWhale;
use crate::services::ranking::{WalletAnalysis, WalletFailure};
use crate::AppState;

#[derive(Serialize)]
pub struct RankingSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub min_score: u32,
    pub qualified: usize,
    pub ranked: Vec<RankedWhale>,
    pub failures: Vec<WalletFailure>,
}

#[derive(Serialize)]
pub struct WalletDetail {
    pub score: Option<u32>,
    pub qualified: bool,
    #[serde(flatten)]
    pub analysis: WalletAnalysis,
}

pub async fn latest(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<RankingSummary>>, AppError> {
    let guard = state.latest_report.read().await;
    let report = guard
        .as_ref()
        .ok_or_else(|| AppError::NotFound("no ranking pass has completed yet".into()))?;

    let min_score = state.config.min_efficiency_score;

    Ok(Json(ApiResponse::ok(RankingSummary {
        run_id: report.run_id,
        started_at: report.started_at,
        completed_at: report.completed_at,
        min_score,
        qualified: report.qualified(min_score).len(),
        ranked: report.ranked.clone(),
        failures: report.failures.clone(),
    })))
}

pub async fn wallet(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<ApiResponse<WalletDetail>>, AppError> {
    let wallet: Address = address
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid address: {address}")))?;

    let guard = state.latest_report.read().await;
    let report = guard
        .as_ref()
        .ok_or_else(|| AppError::NotFound("no ranking pass has completed yet".into()))?;

    let analysis = report
        .analyses
        .get(&wallet)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("wallet {wallet} was not ranked")))?;

    let score = report.score_of(&wallet);

    Ok(Json(ApiResponse::ok(WalletDetail {
        score,
        qualified: score.is_some_and(|s| s >= state.config.min_efficiency_score),
        analysis,
    })))
}
