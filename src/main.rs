use std::sync::Arc;

use whaleseek::api::create_router;
use whaleseek::config::AppConfig;
use whaleseek::ingestion::ActivityPipeline;
use whaleseek::intelligence::{RouterRegistry, SwapDetector};
use whaleseek::metrics::init_metrics;
use whaleseek::models::MirrorSignal;
use whaleseek::providers::SnapshotProvider;
use whaleseek::services::{run_ranking_loop, RankingProviders, RankingService};
use whaleseek::AppState;

/// Signals kept for `/api/signals/recent`.
const SIGNAL_LOG_CAPACITY: usize = 100;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);

    let metrics_handle = init_metrics();

    tracing::info!(path = %config.snapshot_path, "Loading provider snapshot...");
    let provider = Arc::new(SnapshotProvider::load(&config.snapshot_path)?);

    let state = AppState::new(config.clone(), metrics_handle);

    // --- Ranking: discovery → analysis → efficiency ranking ---
    let providers = RankingProviders {
        chain: provider.clone(),
        prices: provider.clone(),
    };
    let service = RankingService::new(
        providers,
        provider.clone(),
        &config,
        state.latest_report.clone(),
        state.whale_scores.clone(),
    );

    // First pass up front so mirroring starts with a whale set
    if let Err(e) = service.refresh().await {
        tracing::error!(error = %e, "Initial ranking pass failed");
    }

    let ranking_interval = config.ranking_interval();
    tokio::spawn(async move {
        run_ranking_loop(service, ranking_interval).await;
    });

    // --- Mirror pipeline: activity → swap detection → MirrorSignal ---
    if config.mirror_enabled {
        let (signal_tx, mut signal_rx) = tokio::sync::mpsc::channel::<MirrorSignal>(500);

        let pipeline = ActivityPipeline::new(
            provider.clone(),
            SwapDetector::new(RouterRegistry::base_mainnet()),
            state.whale_scores.clone(),
            config.min_efficiency_score,
            config.provider_timeout(),
        )
        .with_signal_channel(signal_tx);

        let activity_source = provider.clone();
        tokio::spawn(async move {
            let activities = activity_source.activities();
            let emitted = pipeline.replay(activities).await;
            tracing::info!(
                activities = activities.len(),
                emitted = emitted,
                "Activity replay complete"
            );
        });

        let signal_log = state.recent_signals.clone();
        tokio::spawn(async move {
            while let Some(signal) = signal_rx.recv().await {
                let mut log = signal_log.write().await;
                if log.len() == SIGNAL_LOG_CAPACITY {
                    log.pop_front();
                }
                log.push_back(signal);
            }
            tracing::warn!("MirrorSignal channel closed");
        });

        tracing::info!("Mirror pipeline spawned");
    } else {
        tracing::info!("Mirror pipeline disabled (MIRROR_ENABLED=false)");
    }

    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}
