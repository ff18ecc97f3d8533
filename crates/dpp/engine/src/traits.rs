//! Collaborator boundaries the engine relies on but does not implement itself.

use chrono::{DateTime, FixedOffset};
use dpp_types::DppError;

/// Keyed byte store holding one encoded record per key.
///
/// Load-then-store sequencing is the store's concern (key-level optimistic concurrency);
/// the engine performs no locking of its own.
pub trait RecordStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, DppError>;

    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), DppError>;
}

/// Resolves the organization on whose behalf the current call is made.
pub trait IdentityProvider: Send + Sync {
    fn current_organization(&self) -> Result<String, DppError>;
}

/// Fire-and-forget side channel. Delivery is neither guaranteed nor awaited.
pub trait NotificationSink: Send + Sync {
    fn emit(&self, topic: &str, payload: Vec<u8>);
}

/// Source of "now" for event times and defaulted timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Source of unique event identifiers.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self, prefix: &str) -> String;
}
