pub mod ranking;
pub mod runner;

pub use ranking::{analyze_wallet, run_ranking_pass, RankingConfig, RankingProviders, RankingReport};
pub use runner::{run_ranking_loop, RankingService};
