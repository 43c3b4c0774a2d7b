use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use metrics::gauge;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tokio::time::interval;

use crate::config::AppConfig;
use crate::errors::AnalysisError;
use crate::intelligence::detect_whales;
use crate::providers::{with_timeout, WhaleSource};
use crate::services::ranking::{run_ranking_pass, RankingConfig, RankingProviders, RankingReport};
use crate::WhaleScores;

const DEFAULT_DISCOVERY_WINDOW_DAYS: i64 = 30;

/// Discovers whale candidates, ranks them and publishes the result.
#[derive(Clone)]
pub struct RankingService {
    providers: RankingProviders,
    whale_source: Arc<dyn WhaleSource>,
    ranking: RankingConfig,
    discovery_window_days: i64,
    discovery_min_amount: Decimal,
    min_efficiency_score: u32,
    latest_report: Arc<RwLock<Option<RankingReport>>>,
    whale_scores: WhaleScores,
}

/// Discovery lookback. Windows that are not positive or do not fit a
/// `TimeDelta` fall back to the default 30 days.
fn discovery_window(days: i64) -> TimeDelta {
    match TimeDelta::try_days(days) {
        Some(window) if days > 0 => window,
        _ => {
            tracing::warn!(days, "Discovery window out of range, using 30 days");
            TimeDelta::days(DEFAULT_DISCOVERY_WINDOW_DAYS)
        }
    }
}

impl RankingService {
    pub fn new(
        providers: RankingProviders,
        whale_source: Arc<dyn WhaleSource>,
        config: &AppConfig,
        latest_report: Arc<RwLock<Option<RankingReport>>>,
        whale_scores: WhaleScores,
    ) -> Self {
        Self {
            providers,
            whale_source,
            ranking: RankingConfig::from(config),
            discovery_window_days: config.discovery_window_days,
            discovery_min_amount: config.discovery_min_amount,
            min_efficiency_score: config.min_efficiency_score,
            latest_report,
            whale_scores,
        }
    }

    /// Run discovery and a full ranking pass, then replace the published
    /// report and the set of whales worth mirroring.
    pub async fn refresh(&self) -> Result<RankingReport, AnalysisError> {
        let since = Utc::now()
            .checked_sub_signed(discovery_window(self.discovery_window_days))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let transfers = with_timeout(
            self.ranking.provider_timeout,
            self.whale_source.large_transfers(since),
        )
        .await?;

        let detections = detect_whales(&transfers, self.discovery_min_amount);
        tracing::info!(
            transfers = transfers.len(),
            candidates = detections.len(),
            min_amount = %self.discovery_min_amount,
            "Whale discovery complete"
        );

        let wallets: Vec<_> = detections.iter().map(|d| d.address).collect();
        let report = run_ranking_pass(&self.providers, &wallets, &self.ranking).await;

        let qualified: HashMap<_, _> = report
            .qualified(self.min_efficiency_score)
            .into_iter()
            .map(|r| (r.wallet, r.score))
            .collect();

        gauge!("tracked_whales").set(qualified.len() as f64);
        tracing::info!(
            qualified = qualified.len(),
            min_score = self.min_efficiency_score,
            "Tracked whales updated"
        );

        *self.whale_scores.write().await = qualified;
        *self.latest_report.write().await = Some(report.clone());

        Ok(report)
    }
}

/// Refresh the rankings every `period`. The first refresh happens one period
/// from now; callers run the initial pass themselves.
pub async fn run_ranking_loop(service: RankingService, period: Duration) {
    tracing::info!(interval_secs = period.as_secs(), "Ranking loop started");

    let mut ticker = interval(period);
    // interval() completes its first tick immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;

        if let Err(e) = service.refresh().await {
            tracing::error!(error = %e, "Ranking refresh failed");
        }
    }
}
