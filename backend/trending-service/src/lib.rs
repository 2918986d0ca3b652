pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod jobs;
pub mod metrics;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{RankingError, Result};
pub use services::{BatchRankingComputation, RankingService};
