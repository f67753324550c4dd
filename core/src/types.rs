//! Shared primitive types used across the entire engine.

use chrono::{DateTime, Utc};

/// A point in time. Persisted as an RFC 3339 string.
pub type Timestamp = DateTime<Utc>;

/// A stable, unique identifier for any entity in the game state.
pub type EntityId = String;

/// Diamonds, minutes and experience are all whole, non-negative amounts.
pub type Amount = u64;

/// Fresh opaque id for a building or focus session.
pub fn new_entity_id() -> EntityId {
    uuid::Uuid::new_v4().to_string()
}
