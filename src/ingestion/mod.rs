pub mod pipeline;
pub mod transfers;

pub use pipeline::ActivityPipeline;
pub use transfers::normalize_transfers;
