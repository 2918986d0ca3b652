use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::models::RankedItem;

/// Heap entry ordered by rank: higher score first, lower id on equal score.
#[derive(Debug)]
struct ByRank(RankedItem);

impl Ord for ByRank {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .score
            .total_cmp(&other.0.score)
            .then_with(|| other.0.id.cmp(&self.0.id))
    }
}

impl PartialOrd for ByRank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ByRank {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ByRank {}

/// Fixed-capacity min-heap keeping the best `capacity` items of a stream.
///
/// The heap root is the worst retained item, so each offer costs O(log N)
/// and the full candidate set never has to be sorted.
#[derive(Debug)]
pub struct BoundedTopK {
    capacity: usize,
    heap: BinaryHeap<Reverse<ByRank>>,
}

impl BoundedTopK {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            heap: BinaryHeap::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Offer an item; returns whether it is currently retained.
    pub fn offer(&mut self, item: RankedItem) -> bool {
        if self.capacity == 0 {
            return false;
        }

        let candidate = ByRank(item);
        if self.heap.len() < self.capacity {
            self.heap.push(Reverse(candidate));
            return true;
        }

        match self.heap.peek_mut() {
            Some(mut worst) if candidate > worst.0 => {
                *worst = Reverse(candidate);
                true
            }
            _ => false,
        }
    }

    /// Consume the selector, returning the retained items best first.
    pub fn drain(mut self) -> Vec<RankedItem> {
        let size = self.heap.len();
        let mut slots: Vec<Option<RankedItem>> = (0..size).map(|_| None).collect();
        for slot in (0..size).rev() {
            if let Some(Reverse(ByRank(item))) = self.heap.pop() {
                slots[slot] = Some(item);
            }
        }
        slots.into_iter().flatten().collect()
    }
}
