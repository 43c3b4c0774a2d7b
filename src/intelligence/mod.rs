pub mod composition;
pub mod cost_basis;
pub mod discovery;
pub mod efficiency;
pub mod portfolio;
pub mod price_series;
pub mod routers;
pub mod swap_detector;

pub use composition::CompositionScore;
pub use cost_basis::{compute_profit_loss, run_ledger, CostBasisLedger, CostLot, LedgerDesync, ProfitLossResult};
pub use discovery::detect_whales;
pub use efficiency::{rank, trader_efficiency, RankedWhale};
pub use portfolio::{aggregate, PortfolioPerformance, TokenPerformanceMetrics, MERGED_ETH_KEY};
pub use price_series::PriceSeries;
pub use routers::RouterRegistry;
pub use swap_detector::SwapDetector;
