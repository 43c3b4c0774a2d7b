use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus exporter and register all application metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload.
pub fn init_metrics() -> PrometheusHandle {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    register_metrics();
    handle
}

/// Pre-register every series so scrapes show them before the first update.
pub fn register_metrics() {
    counter!("ranking_passes_total").absolute(0);
    counter!("wallets_analyzed_total").absolute(0);
    counter!("wallets_failed_total").absolute(0);
    counter!("tokens_skipped_total").absolute(0);
    counter!("ledger_desync_total").absolute(0);
    counter!("swaps_detected_total").absolute(0);
    counter!("mirror_signals_emitted").absolute(0);

    gauge!("tracked_whales").set(0.0);

    // Histogram is lazily created on first record; force creation.
    histogram!("ranking_pass_seconds").record(0.0);
}
