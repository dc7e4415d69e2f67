//! Record types and identifier generation
//!
//! A [`Record`] is only ever built from a [`NewRecord`] (which in turn only
//! comes out of [`validation::validate`]) plus an id issued by
//! [`IdGenerator`], so every stored record has passed validation.

pub mod store;
pub mod validation;

pub use store::{LoadPolicy, RecordStore};
pub use validation::{Field, RawRecordInput, ValidationErrors, validate};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Record identifier
///
/// Milliseconds since the UNIX epoch at creation time, bumped forward when
/// two records are created within the same millisecond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(u64);

impl RecordId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(Self)
    }
}

/// A validated record that has not been assigned an id yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    first: String,
    last: String,
    age: u32,
}

impl NewRecord {
    /// Only validation constructs these; fields are already trimmed.
    pub(crate) fn new(first: String, last: String, age: u32) -> Self {
        Self { first, last, age }
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn last(&self) -> &str {
        &self.last
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    /// Attach an identifier, producing a storable record
    pub fn with_id(self, id: RecordId) -> Record {
        Record {
            id,
            first: self.first,
            last: self.last,
            age: self.age,
        }
    }
}

/// A stored record, as persisted in the snapshot file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub first: String,
    pub last: String,
    pub age: u32,
}

/// Issues strictly increasing, time-derived record ids
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicU64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start issuing ids above `floor` (the largest id already persisted)
    pub fn seeded(floor: RecordId) -> Self {
        Self {
            last: AtomicU64::new(floor.get()),
        }
    }

    /// Next id: the current time in milliseconds, or one past the last
    /// issued id if the clock hasn't moved forward since.
    pub fn next_id(&self) -> RecordId {
        let now = now_millis();
        let previous = self
            .last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(now.max(last.saturating_add(1)))
            })
            // the closure never returns None
            .unwrap_or_else(|last| last);
        RecordId(now.max(previous.saturating_add(1)))
    }

    /// Make sure future ids land above `id`
    pub fn observe(&self, id: RecordId) {
        self.last.fetch_max(id.get(), Ordering::AcqRel);
    }
}

fn now_millis() -> u64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(elapsed) => u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        Err(e) => {
            tracing::warn!(
                error = %e,
                "System clock is before UNIX epoch; record ids fall back to the sequence counter"
            );
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_record_id_parses_with_surrounding_whitespace() {
        let id: RecordId = " 1700000000000 ".parse().unwrap();
        assert_eq!(id, RecordId::new(1_700_000_000_000));
    }

    #[test]
    fn test_record_id_rejects_non_numeric() {
        assert!("abc".parse::<RecordId>().is_err());
        assert!("-5".parse::<RecordId>().is_err());
        assert!("".parse::<RecordId>().is_err());
    }

    #[test]
    fn test_record_serializes_with_expected_field_names() {
        let record = NewRecord::new("Ana".into(), "Lee".into(), 25).with_id(RecordId::new(42));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 42, "first": "Ana", "last": "Lee", "age": 25})
        );
    }

    #[test]
    fn test_id_generator_is_strictly_increasing() {
        let ids = IdGenerator::new();
        let mut previous = ids.next_id();
        for _ in 0..10_000 {
            let next = ids.next_id();
            assert!(next > previous, "{} should be above {}", next, previous);
            previous = next;
        }
    }

    #[test]
    fn test_id_generator_respects_seed_in_the_future() {
        let far_future = RecordId::new(u64::MAX / 2);
        let ids = IdGenerator::seeded(far_future);
        assert_eq!(ids.next_id(), RecordId::new(u64::MAX / 2 + 1));
        assert_eq!(ids.next_id(), RecordId::new(u64::MAX / 2 + 2));
    }

    #[test]
    fn test_id_generator_unique_across_threads() {
        let ids = Arc::new(IdGenerator::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ids = Arc::clone(&ids);
                std::thread::spawn(move || (0..1_000).map(|_| ids.next_id()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {}", id);
            }
        }
        assert_eq!(seen.len(), 8_000);
    }
}
