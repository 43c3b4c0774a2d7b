use rust_decimal::Decimal;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,

    /// JSON snapshot serving every provider.
    pub snapshot_path: String,

    // Ranking
    pub ranking_interval_secs: u64,
    pub min_efficiency_score: u32,
    pub max_concurrent_wallets: usize,
    pub provider_timeout_secs: u64,

    // Discovery
    pub discovery_window_days: i64,
    pub discovery_min_amount: Decimal,

    // Mirroring
    pub mirror_enabled: bool,

    /// Bearer token for `/api/*`. Unset disables auth.
    pub api_token: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,

            snapshot_path: env::var("SNAPSHOT_PATH")
                .map_err(|_| anyhow::anyhow!("SNAPSHOT_PATH must be set"))?,

            ranking_interval_secs: env::var("RANKING_INTERVAL_SECS")
                .unwrap_or_else(|_| "3600".into())
                .parse()
                .unwrap_or(3600),
            min_efficiency_score: env::var("MIN_EFFICIENCY_SCORE")
                .unwrap_or_else(|_| "60".into())
                .parse()
                .unwrap_or(60),
            max_concurrent_wallets: env::var("MAX_CONCURRENT_WALLETS")
                .unwrap_or_else(|_| "8".into())
                .parse()
                .unwrap_or(8),
            provider_timeout_secs: env::var("PROVIDER_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".into())
                .parse()
                .unwrap_or(30),

            discovery_window_days: env::var("DISCOVERY_WINDOW_DAYS")
                .unwrap_or_else(|_| "30".into())
                .parse()
                .unwrap_or(30),
            discovery_min_amount: env::var("DISCOVERY_MIN_AMOUNT")
                .unwrap_or_else(|_| "50".into())
                .parse()
                .unwrap_or(Decimal::from(50)),

            mirror_enabled: env::var("MIRROR_ENABLED")
                .unwrap_or_else(|_| "false".into())
                .parse()
                .unwrap_or(false),

            api_token: env::var("API_TOKEN").ok().filter(|t| !t.is_empty()),
        })
    }

    /// Defaults for everything except the snapshot location.
    pub fn with_snapshot(snapshot_path: impl Into<String>) -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            snapshot_path: snapshot_path.into(),
            ranking_interval_secs: 3600,
            min_efficiency_score: 60,
            max_concurrent_wallets: 8,
            provider_timeout_secs: 30,
            discovery_window_days: 30,
            discovery_min_amount: Decimal::from(50),
            mirror_enabled: false,
            api_token: None,
        }
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    pub fn ranking_interval(&self) -> Duration {
        Duration::from_secs(self.ranking_interval_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_snapshot_defaults() {
        let config = AppConfig::with_snapshot("data/snapshot.json");
        assert_eq!(config.snapshot_path, "data/snapshot.json");
        assert_eq!(config.min_efficiency_score, 60);
        assert_eq!(config.provider_timeout(), Duration::from_secs(30));
        assert_eq!(config.ranking_interval(), Duration::from_secs(3600));
        assert_eq!(config.discovery_min_amount, Decimal::from(50));
        assert!(config.api_token.is_none());
    }
}
