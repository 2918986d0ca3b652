use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use crate::error::{RankingError, Result};
use crate::models::{RankedItem, TopList};

#[derive(Clone)]
struct LocalEntry {
    items: Arc<TopList>,
    stored_at: Instant,
    deadline: Instant,
}

/// In-process tier holding the last hot list with its own expiry deadline.
///
/// The snapshot is built before the write lock is taken, so the lock only
/// guards a pointer swap. Reads never extend the deadline.
pub struct LocalRankingCache {
    slot: RwLock<LocalSlot>,
    ttl: Duration,
    abstract_len: usize,
}

#[derive(Default)]
struct LocalSlot {
    entry: Option<LocalEntry>,
    /// Bumped on every write
    generation: u64,
}

impl LocalSlot {
    fn lookup(&self) -> Result<Arc<TopList>> {
        match self.entry.as_ref() {
            Some(entry) if Instant::now() <= entry.deadline => Ok(entry.items.clone()),
            Some(_) => Err(RankingError::CacheMiss("local tier expired")),
            None => Err(RankingError::CacheMiss("local tier empty")),
        }
    }
}

impl LocalRankingCache {
    pub fn new(ttl: Duration, abstract_len: usize) -> Self {
        Self {
            slot: RwLock::new(LocalSlot::default()),
            ttl,
            abstract_len,
        }
    }

    /// Store an abstracted copy of `items`; the caller's list is left untouched.
    /// Returns the snapshot that was stored.
    pub async fn set(&self, items: &[RankedItem]) -> Result<Arc<TopList>> {
        let entry = self.build_entry(items)?;
        let snapshot = entry.items.clone();

        let mut slot = self.slot.write().await;
        slot.entry = Some(entry);
        slot.generation += 1;
        drop(slot);

        debug!(items = snapshot.len(), ttl_secs = self.ttl.as_secs(), "Local ranking tier replaced");
        Ok(snapshot)
    }

    /// Backfill write: stores `items` only if nothing was written since
    /// `seen_generation` was read. Otherwise the newer list is kept and
    /// returned when still fresh.
    pub async fn set_if_unchanged(
        &self,
        items: &[RankedItem],
        seen_generation: u64,
    ) -> Result<Arc<TopList>> {
        let entry = self.build_entry(items)?;
        let snapshot = entry.items.clone();

        let mut slot = self.slot.write().await;
        if slot.generation != seen_generation {
            debug!(
                seen_generation,
                current_generation = slot.generation,
                "Local ranking tier written concurrently, skipping backfill"
            );
            return Ok(slot.lookup().unwrap_or(snapshot));
        }
        slot.entry = Some(entry);
        slot.generation += 1;

        Ok(snapshot)
    }

    pub async fn get(&self) -> Result<Arc<TopList>> {
        self.slot.read().await.lookup()
    }

    /// Current list together with the write generation it was read at.
    pub async fn get_with_generation(&self) -> (Result<Arc<TopList>>, u64) {
        let slot = self.slot.read().await;
        (slot.lookup(), slot.generation)
    }

    /// Age of the stored list, if any.
    pub async fn age(&self) -> Option<Duration> {
        self.slot
            .read()
            .await
            .entry
            .as_ref()
            .map(|entry| entry.stored_at.elapsed())
    }

    fn build_entry(&self, items: &[RankedItem]) -> Result<LocalEntry> {
        validate_top_list(items)?;

        let snapshot: Arc<TopList> = Arc::new(
            items
                .iter()
                .map(|item| item.abstracted(self.abstract_len))
                .collect(),
        );

        let now = Instant::now();
        Ok(LocalEntry {
            items: snapshot,
            stored_at: now,
            deadline: now + self.ttl,
        })
    }
}

/// Reject lists that break the hot list invariants before they reach a tier.
fn validate_top_list(items: &[RankedItem]) -> Result<()> {
    let mut ids = HashSet::with_capacity(items.len());
    for item in items {
        if !ids.insert(item.id) {
            return Err(RankingError::CacheWrite(format!(
                "duplicate article id {} in hot list",
                item.id
            )));
        }
    }

    if items.windows(2).any(|pair| pair[0].score < pair[1].score) {
        return Err(RankingError::CacheWrite(
            "hot list is not ordered by score".to_string(),
        ));
    }

    Ok(())
}
