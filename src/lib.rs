pub mod api;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod ingestion;
pub mod intelligence;
pub mod providers;
pub mod services;

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use alloy::primitives::Address;
use tokio::sync::RwLock;

use crate::config::AppConfig;
use crate::models::MirrorSignal;
use crate::services::ranking::RankingReport;

/// Efficiency scores of the whales currently worth mirroring, keyed by wallet.
pub type WhaleScores = Arc<RwLock<HashMap<Address, u32>>>;

/// Most recent mirror signals, newest last.
pub type SignalLog = Arc<RwLock<VecDeque<MirrorSignal>>>;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
    pub latest_report: Arc<RwLock<Option<RankingReport>>>,
    pub whale_scores: WhaleScores,
    pub recent_signals: SignalLog,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
    ) -> Self {
        Self {
            config,
            metrics_handle,
            latest_report: Arc::new(RwLock::new(None)),
            whale_scores: Arc::new(RwLock::new(HashMap::new())),
            recent_signals: Arc::new(RwLock::new(VecDeque::new())),
        }
    }
}
