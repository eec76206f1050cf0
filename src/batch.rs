//! Producer-declared production lots.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Index of a batch within the registry's ordered sequence. Futures
/// contracts reference batches only through this id (lookup, no
/// ownership).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
)]
pub struct BatchId(usize);

impl From<usize> for BatchId {
    fn from(value: usize) -> Self {
        BatchId(value)
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "batch#{}", self.0)
    }
}

/// An immutable inventory record declared by a producer.
#[derive(Debug, Clone)]
pub struct Batch {
    pub producer: String,
    /// Head count; positive (caller pre-validated).
    pub quantity: u32,
    pub breed: String,
    pub location: String,
    pub recorded_at: DateTime<Utc>,
}

/// Ordered registry of declared batches. Records are append-only and
/// immutable once recorded.
#[derive(Debug, Default)]
pub struct BatchRegistry {
    batches: Vec<Batch>,
}

impl BatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new lot and returns its id. Always succeeds.
    pub fn record(
        &mut self,
        producer: impl Into<String>,
        quantity: u32,
        breed: impl Into<String>,
        location: impl Into<String>,
    ) -> BatchId {
        self.batches.push(Batch {
            producer: producer.into(),
            quantity,
            breed: breed.into(),
            location: location.into(),
            recorded_at: Utc::now(),
        });

        BatchId(self.batches.len() - 1)
    }

    pub fn get(&self, id: BatchId) -> Option<&Batch> {
        self.batches.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Batches with their ids, in recording order.
    pub fn iter(&self) -> impl Iterator<Item = (BatchId, &Batch)> {
        self.batches
            .iter()
            .enumerate()
            .map(|(i, batch)| (BatchId(i), batch))
    }
}

#[cfg(test)]
mod tests {
    use super::{BatchId, BatchRegistry};

    #[test]
    fn record_assigns_sequential_ids() {
        let mut batches = BatchRegistry::new();
        let first = batches.record("ana", 100, "Angus", "north field");
        let second = batches.record("bruno", 40, "Hereford", "river lot");

        assert_eq!(first, BatchId::from(0));
        assert_eq!(second, BatchId::from(1));
        assert_eq!(batches.len(), 2);
    }

    #[test]
    fn get_resolves_recorded_lots() {
        let mut batches = BatchRegistry::new();
        let id = batches.record("ana", 100, "Angus", "north field");

        let batch = batches.get(id).unwrap();
        assert_eq!(batch.producer, "ana");
        assert_eq!(batch.quantity, 100);
        assert!(batches.get(BatchId::from(7)).is_none());
    }
}
