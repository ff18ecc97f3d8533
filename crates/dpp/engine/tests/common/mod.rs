//! Shared fixtures: several organizations acting on one store.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dpp_engine::{
    DppLedger, FixedClock, InMemoryStore, LedgerConfig, MemorySink, RecordStore, SequentialIds,
    StaticIdentity,
};
use dpp_types::{Dpp, DppError, DppStatus, NewDpp, QualitySpecification, QualitySubmission};

pub const SITE_A: &str = "4012345000009";
pub const SITE_C: &str = "4012345000030";
pub const SITE_D: &str = "4012345000047";

/// One shared world state seen by several organizations.
pub struct Network {
    pub store: Arc<dyn RecordStore>,
    pub sink: Arc<MemorySink>,
    ids: Arc<SequentialIds>,
    config: LedgerConfig,
}

impl Network {
    pub fn new() -> Self {
        Self::with_store(Arc::new(InMemoryStore::new()), LedgerConfig::default())
    }

    pub fn with_config(config: LedgerConfig) -> Self {
        Self::with_store(Arc::new(InMemoryStore::new()), config)
    }

    pub fn with_store(store: Arc<dyn RecordStore>, config: LedgerConfig) -> Self {
        Self {
            store,
            sink: Arc::new(MemorySink::new()),
            ids: Arc::new(SequentialIds::new()),
            config,
        }
    }

    /// Ledger acting on behalf of `org`.
    pub fn as_org(&self, org: &str) -> DppLedger {
        DppLedger::new(
            self.config.clone(),
            self.store.clone(),
            Arc::new(StaticIdentity::new(org)),
        )
        .with_notifications(self.sink.clone())
        .with_clock(Arc::new(
            FixedClock::parse("2025-05-06T12:00:00+02:00").expect("valid timestamp"),
        ))
        .with_ids(self.ids.clone())
    }

    pub fn raw(&self, record_id: &str) -> Option<Vec<u8>> {
        self.store
            .get(&self.config.record_key(record_id))
            .expect("store read")
    }
}

pub fn new_dpp(id: &str, specifications: Vec<QualitySpecification>) -> NewDpp {
    NewDpp {
        id: id.to_string(),
        product_identifier: format!("urn:epc:id:sgtin:4012345.011111.{}", id),
        product_type_id: "gear-housing".to_string(),
        manufacturer_site_id: SITE_A.to_string(),
        batch: "B-17".to_string(),
        production_date: "2025-05-06".to_string(),
        specifications,
    }
}

pub fn weight_spec() -> QualitySpecification {
    QualitySpecification::numeric("Weight", 10.0, 20.0)
        .with_unit("kg")
        .mandatory()
}

pub fn weight(result: &str) -> QualitySubmission {
    QualitySubmission::new("Weight", result).with_unit("kg")
}

/// A record of `org` in `Released` status.
pub fn released(net: &Network, org: &str, id: &str) -> Dpp {
    let ledger = net.as_org(org);
    ledger
        .create_record(new_dpp(id, vec![weight_spec()]))
        .expect("create");
    let dpp = ledger
        .record_quality(id, weight("15"), SITE_A)
        .expect("quality");
    assert_eq!(dpp.status(), &DppStatus::Released);
    dpp
}

/// Store that starts failing writes after a number of successful ones.
pub struct FailingStore {
    inner: InMemoryStore,
    remaining_puts: AtomicUsize,
}

impl FailingStore {
    pub fn new() -> Self {
        Self {
            inner: InMemoryStore::new(),
            remaining_puts: AtomicUsize::new(usize::MAX),
        }
    }

    /// Allow `n` more writes, then fail every further one.
    pub fn fail_after(&self, n: usize) {
        self.remaining_puts.store(n, Ordering::SeqCst);
    }
}

impl RecordStore for FailingStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, DppError> {
        self.inner.get(key)
    }

    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), DppError> {
        let allowed = self
            .remaining_puts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if !allowed {
            return Err(DppError::Store(format!("write to {} refused", key)));
        }
        self.inner.put(key, value)
    }
}
