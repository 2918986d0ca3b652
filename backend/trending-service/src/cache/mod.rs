//! Two-tier cache for the hot list
//!
//! - `local`: in-process slot with its own deadline
//! - `shared`: Redis value with native expiry
//! - `composite`: read-through / write-through over both

pub mod composite;
pub mod local;
pub mod shared;

pub use composite::CompositeRankingCache;
pub use local::LocalRankingCache;
pub use shared::{RedisRankingCache, SharedRankingStore};
