use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Gravity exponent of the age penalty
const GRAVITY: f64 = 1.5;

/// Offset (seconds) keeping the denominator away from zero
const AGE_OFFSET_SECS: f64 = 2.0;

/// Pluggable score function: (like_cnt, utime, now) -> score
pub type ScoreFn = Arc<dyn Fn(i64, DateTime<Utc>, DateTime<Utc>) -> f64 + Send + Sync>;

/// 熱度分數: (like_cnt - 1) / (age_secs + 2)^1.5
///
/// Zero likes produce a negative score on purpose; it only reorders the tail.
/// An `utime` ahead of `now` counts as age zero.
pub fn hot_score(like_cnt: i64, utime: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let age_secs = (now - utime).num_milliseconds().max(0) as f64 / 1000.0;
    (like_cnt - 1) as f64 / (age_secs + AGE_OFFSET_SECS).powf(GRAVITY)
}

pub fn default_score_fn() -> ScoreFn {
    Arc::new(hot_score)
}
