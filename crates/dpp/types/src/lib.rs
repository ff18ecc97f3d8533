//! Data model for Digital Product Passports (DPPs).
//!
//! A passport tracks one manufactured item or batch through a multi-party supply chain. This
//! crate holds the aggregate (`Dpp`), its append-only histories, the status tagged union, the
//! evaluation outcome vocabulary and the EPCIS/CBV event shape. Decision logic lives in
//! `dpp-engine`.

#![deny(unsafe_code)]

pub mod error;
pub mod event;
pub mod key;
pub mod outcome;
pub mod records;
pub mod status;

pub use error::DppError;
pub use event::{BizStep, Disposition, EventAction, EventType, TraceabilityEvent};
pub use key::{sgln, validate_product_identifier};
pub use outcome::OutcomeCode;
pub use records::{
    validate_specifications, Dpp, NewDpp, QualityEntry, QualitySpecification, QualitySubmission,
    TransportConditionLogEntry, TransportLogAnchor, TransportSubmission,
};
pub use status::{DeviationKind, DppStatus, TRANSPORT_ALERT_SUFFIX};
