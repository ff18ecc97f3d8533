//! Construction of traceability events.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, Utc};
use dpp_types::{
    sgln, BizStep, Disposition, DppError, EventAction, EventType, TraceabilityEvent,
};
use serde::Serialize;

/// Event id prefixes, one per business activity.
pub mod prefix {
    pub const CREATE: &str = "evt-create";
    pub const QUALITY: &str = "evt-qc";
    pub const TRANSPORT: &str = "evt-transport";
    pub const ANCHOR: &str = "evt-anchor";
    pub const TRANSFORM: &str = "evt-tf";
    pub const SHIP: &str = "evt-ship";
    pub const RECEIVE: &str = "evt-recv";
    pub const INSPECT: &str = "evt-insp";
    pub const REJECT: &str = "evt-reject";
}

/// Builder for one [`TraceabilityEvent`].
///
/// The event time is stored in UTC; the offset of `at` is kept in `timeZoneOffset`.
#[derive(Debug, Clone)]
pub struct EventBuilder {
    event: TraceabilityEvent,
}

impl EventBuilder {
    /// ObjectEvent about a single product.
    pub fn object(
        event_id: String,
        at: DateTime<FixedOffset>,
        biz_step: BizStep,
        action: EventAction,
        product_identifier: &str,
    ) -> Self {
        let mut builder = Self::new(event_id, at, EventType::ObjectEvent, biz_step);
        builder.event.action = Some(action);
        builder.event.epc_list = vec![product_identifier.to_string()];
        builder
    }

    /// TransformationEvent from consumed inputs to one output.
    pub fn transformation(
        event_id: String,
        at: DateTime<FixedOffset>,
        input_epcs: Vec<String>,
        output_epc: &str,
    ) -> Self {
        let mut builder = Self::new(
            event_id,
            at,
            EventType::TransformationEvent,
            BizStep::Transforming,
        );
        builder.event.input_epc_list = input_epcs;
        builder.event.output_epc_list = vec![output_epc.to_string()];
        builder
    }

    fn new(
        event_id: String,
        at: DateTime<FixedOffset>,
        event_type: EventType,
        biz_step: BizStep,
    ) -> Self {
        Self {
            event: TraceabilityEvent {
                event_id,
                event_type,
                event_time: at.with_timezone(&Utc),
                time_zone_offset: at.offset().to_string(),
                biz_step,
                action: None,
                epc_list: Vec::new(),
                input_epc_list: Vec::new(),
                output_epc_list: Vec::new(),
                disposition: None,
                read_point: String::new(),
                biz_location: String::new(),
                extensions: BTreeMap::new(),
            },
        }
    }

    /// Override the event time, e.g. with the moment a sensor reading was taken.
    pub fn occurred_at(mut self, event_time: DateTime<Utc>) -> Self {
        self.event.event_time = event_time;
        self
    }

    pub fn disposition(mut self, disposition: Disposition) -> Self {
        self.event.disposition = Some(disposition);
        self
    }

    /// Read point and business location at the same site.
    pub fn at_site(mut self, site_id: &str) -> Self {
        self.event.read_point = sgln(site_id);
        self.event.biz_location = sgln(site_id);
        self
    }

    /// Read point only; the business location stays empty while goods are moving.
    pub fn read_point(mut self, site_id: &str) -> Self {
        self.event.read_point = sgln(site_id);
        self
    }

    pub fn extension<T: Serialize + ?Sized>(
        mut self,
        key: &str,
        value: &T,
    ) -> Result<Self, DppError> {
        self.event
            .extensions
            .insert(key.to_string(), serde_json::to_value(value)?);
        Ok(self)
    }

    pub fn build(self) -> TraceabilityEvent {
        self.event
    }
}
