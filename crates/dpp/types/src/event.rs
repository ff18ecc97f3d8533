//! Traceability events in the EPCIS shape, with the CBV business-step and disposition
//! vocabularies used by the passport lifecycle.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DppError;

const BIZSTEP_PREFIX: &str = "urn:epcglobal:cbv:bizstep:";
const DISPOSITION_PREFIX: &str = "urn:epcglobal:cbv:disp:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    ObjectEvent,
    TransformationEvent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventAction {
    Add,
    Observe,
    Delete,
}

macro_rules! cbv_vocabulary {
    ($(#[$meta:meta])* $name:ident, $prefix:expr, { $($variant:ident => $term:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn term(self) -> &'static str {
                match self {
                    $(Self::$variant => $term),+
                }
            }

            pub fn urn(self) -> String {
                format!("{}{}", $prefix, self.term())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.urn()
            }
        }

        impl TryFrom<String> for $name {
            type Error = DppError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                match value.strip_prefix($prefix) {
                    $(Some($term) => Ok(Self::$variant),)+
                    _ => Err(DppError::Serialization(format!(
                        "unknown {} '{}'",
                        stringify!($name),
                        value
                    ))),
                }
            }
        }
    };
}

cbv_vocabulary!(
    /// Business activity that produced an event.
    BizStep, BIZSTEP_PREFIX, {
        Commissioning => "commissioning",
        Inspecting => "inspecting",
        Transporting => "transporting",
        Transforming => "transforming",
        Shipping => "shipping",
        Receiving => "receiving",
        Storing => "storing",
    }
);

cbv_vocabulary!(
    /// Conformance or custody state of the objects after an event.
    Disposition, DISPOSITION_PREFIX, {
        Active => "active",
        Conformant => "conformant",
        NonConformant => "non_conformant",
        InTransit => "in_transit",
        NonConformantInTransit => "non_conformant_in_transit",
        InPossession => "in_possession",
        InPossessionNonConformant => "in_possession_non_conformant",
    }
);

/// One immutable entry of a record's traceability log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceabilityEvent {
    pub event_id: String,
    pub event_type: EventType,
    pub event_time: DateTime<Utc>,
    pub time_zone_offset: String,
    pub biz_step: BizStep,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<EventAction>,
    #[serde(default)]
    pub epc_list: Vec<String>,
    #[serde(default)]
    pub input_epc_list: Vec<String>,
    #[serde(default)]
    pub output_epc_list: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disposition: Option<Disposition>,
    #[serde(default)]
    pub read_point: String,
    #[serde(default)]
    pub biz_location: String,
    #[serde(default)]
    pub extensions: BTreeMap<String, Value>,
}

impl TraceabilityEvent {
    pub fn extension(&self, key: &str) -> Option<&Value> {
        self.extensions.get(key)
    }
}
