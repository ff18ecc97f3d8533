use std::collections::HashMap;
use std::sync::RwLock;

use dpp_types::DppError;
use tracing::warn;

use crate::traits::{IdentityProvider, NotificationSink, RecordStore};

/// In-memory record store used for tests, local demos, and embedding.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, DppError> {
        let map = self
            .inner
            .read()
            .map_err(|_| DppError::Store("in-memory store lock poisoned".into()))?;
        Ok(map.get(key).cloned())
    }

    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), DppError> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| DppError::Store("in-memory store lock poisoned".into()))?;
        map.insert(key.to_string(), value);
        Ok(())
    }
}

/// Identity fixed at construction, e.g. from configuration or a CLI flag.
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    organization: String,
}

impl StaticIdentity {
    pub fn new(organization: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
        }
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_organization(&self) -> Result<String, DppError> {
        if self.organization.is_empty() {
            return Err(DppError::Identity("no organization configured".into()));
        }
        Ok(self.organization.clone())
    }
}

/// Captured notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub topic: String,
    pub payload: Vec<u8>,
}

impl Notification {
    pub fn json(&self) -> Option<serde_json::Value> {
        serde_json::from_slice(&self.payload).ok()
    }
}

/// Sink that keeps every notification in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    emitted: RwLock<Vec<Notification>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emitted(&self) -> Vec<Notification> {
        self.emitted
            .read()
            .map(|list| list.clone())
            .unwrap_or_default()
    }
}

impl NotificationSink for MemorySink {
    fn emit(&self, topic: &str, payload: Vec<u8>) {
        if let Ok(mut list) = self.emitted.write() {
            list.push(Notification {
                topic: topic.to_string(),
                payload,
            });
        }
    }
}

/// Sink that only logs; the default when no event bus is wired.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn emit(&self, topic: &str, payload: Vec<u8>) {
        warn!(
            topic,
            payload = %String::from_utf8_lossy(&payload),
            "notification emitted"
        );
    }
}
