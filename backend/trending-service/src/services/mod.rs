pub mod ranking;
pub mod sources;

pub use ranking::{BatchRankingComputation, RankingService, RefreshOutcome};
pub use sources::{ContentSource, PopularitySource};
