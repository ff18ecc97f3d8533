//! Decision logic for Digital Product Passports.
//!
//! - [`matcher`] classifies one result against one specification
//! - [`quality`] turns submissions into finalized quality entries
//! - [`reconcile`] derives the status from accumulated evidence
//! - [`transform`] and [`transfer`] guard provenance and custody changes
//! - [`ledger::DppLedger`] ties them together over injected collaborators
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use dpp_engine::{DppLedger, InMemoryStore, LedgerConfig, StaticIdentity};
//! use dpp_types::{NewDpp, QualitySpecification, QualitySubmission};
//!
//! let ledger = DppLedger::new(
//!     LedgerConfig::default(),
//!     Arc::new(InMemoryStore::new()),
//!     Arc::new(StaticIdentity::new("Org1MSP")),
//! );
//!
//! ledger.create_record(NewDpp {
//!     id: "dpp-1".into(),
//!     product_identifier: "urn:epc:id:sgtin:4012345.011111.1001".into(),
//!     product_type_id: "gear-housing".into(),
//!     manufacturer_site_id: "4012345000009".into(),
//!     batch: "B-17".into(),
//!     production_date: "2025-05-06".into(),
//!     specifications: vec![QualitySpecification::numeric("Weight", 10.0, 20.0)
//!         .with_unit("kg")
//!         .mandatory()],
//! })?;
//!
//! let dpp = ledger.record_quality(
//!     "dpp-1",
//!     QualitySubmission::new("Weight", "15").with_unit("kg"),
//!     "4012345000009",
//! )?;
//! assert_eq!(dpp.status().to_string(), "Released");
//! # Ok::<(), dpp_types::DppError>(())
//! ```

#![deny(unsafe_code)]

pub mod clock;
pub mod config;
pub mod events;
pub mod ledger;
pub mod matcher;
pub mod memory;
pub mod quality;
pub mod reconcile;
pub mod traits;
pub mod transfer;
pub mod transform;

pub use clock::{FixedClock, SequentialIds, SystemClock, UuidIds};
pub use config::{InputEligibility, LedgerConfig};
pub use events::EventBuilder;
pub use ledger::DppLedger;
pub use matcher::{resolve_outcome, Assessment, Evaluation, EvaluationPhase};
pub use memory::{InMemoryStore, MemorySink, Notification, StaticIdentity, TracingSink};
pub use quality::QualityAlert;
pub use reconcile::{reconcile, Findings};
pub use traits::{Clock, IdGenerator, IdentityProvider, NotificationSink, RecordStore};
pub use transform::{RecordTransformation, TransformationResult};
