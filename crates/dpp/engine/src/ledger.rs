//! Passport ledger: the public operation surface.
//!
//! Every operation loads its own snapshot, mutates it in memory and writes it back in a single
//! `put`. Only [`DppLedger::record_transformation`] touches more than one key.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use dpp_types::{
    validate_product_identifier, validate_specifications, BizStep, Disposition, Dpp, DppError,
    DppStatus, EventAction, NewDpp, QualityEntry, QualitySubmission, TransportConditionLogEntry,
    TransportLogAnchor, TransportSubmission,
};
use tracing::{debug, info, warn};

use crate::clock::{SystemClock, UuidIds};
use crate::config::LedgerConfig;
use crate::events::{prefix, EventBuilder};
use crate::matcher::EvaluationPhase;
use crate::memory::TracingSink;
use crate::quality::{apply_entry, build_entry, build_inspection_entry, disposition_for, QualityAlert};
use crate::reconcile::reconcile;
use crate::traits::{Clock, IdGenerator, IdentityProvider, NotificationSink, RecordStore};
use crate::transfer;
use crate::transform::{admit_input, consume, RecordTransformation, TransformationResult};

const LOG_FILE: &str = "LOG_FILE";

/// Digital Product Passport ledger over injected collaborators.
pub struct DppLedger {
    config: LedgerConfig,
    store: Arc<dyn RecordStore>,
    identity: Arc<dyn IdentityProvider>,
    notifications: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl DppLedger {
    /// Ledger with the wall clock, uuid event ids and a logging-only notification sink.
    pub fn new(
        config: LedgerConfig,
        store: Arc<dyn RecordStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            config,
            store,
            identity,
            notifications: Arc::new(TracingSink),
            clock: Arc::new(SystemClock),
            ids: Arc::new(UuidIds),
        }
    }

    pub fn with_notifications(mut self, notifications: Arc<dyn NotificationSink>) -> Self {
        self.notifications = notifications;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Create a `Draft` passport owned by the caller.
    pub fn create_record(&self, params: NewDpp) -> Result<Dpp, DppError> {
        debug!(record_id = %params.id, "create_record");

        validate_new_record(&params)?;
        if self.exists(&params.id)? {
            return Err(DppError::already_exists(&params.id));
        }

        let owner = self.identity.current_organization()?;
        let dpp = self.commission(params, owner, Vec::new(), self.clock.now());
        self.save(&dpp)?;

        info!(
            record_id = %dpp.id(),
            owner = %dpp.owner_org(),
            open_checks = dpp.open_mandatory_checks().len(),
            "passport created"
        );
        Ok(dpp)
    }

    /// Evaluate and append a quality result, then reconcile the status.
    pub fn record_quality(
        &self,
        record_id: &str,
        submission: QualitySubmission,
        site_id: &str,
    ) -> Result<Dpp, DppError> {
        debug!(record_id, test = %submission.test_name, "record_quality");

        let mut dpp = self.load(record_id)?;
        let caller = self.identity.current_organization()?;
        let now = self.clock.now();

        let entry = build_entry(
            &dpp,
            submission,
            EvaluationPhase::Standard,
            now.with_timezone(&Utc),
            &caller,
        )?;

        let event = EventBuilder::object(
            self.ids.next_id(prefix::QUALITY),
            now,
            BizStep::Inspecting,
            EventAction::Observe,
            dpp.product_identifier(),
        )
        .disposition(disposition_for(&entry.evaluation_outcome))
        .at_site(site_id)
        .extension("recordedQualityData", &entry)?
        .build();

        let closed = apply_entry(&mut dpp, entry.clone());
        dpp.push_event(event);
        self.reconcile_status(&mut dpp);
        self.save(&dpp)?;

        info!(
            record_id,
            test = %entry.test_name,
            outcome = %entry.evaluation_outcome,
            closed_check = closed,
            status = %dpp.status(),
            "quality recorded"
        );
        self.raise_alert(&dpp, &entry);
        Ok(dpp)
    }

    /// Append a transport condition entry. In transit, an alert flags the status; nothing
    /// else about the status changes.
    pub fn add_transport_update(
        &self,
        record_id: &str,
        submission: TransportSubmission,
        site_id: &str,
    ) -> Result<Dpp, DppError> {
        debug!(record_id, log_type = %submission.log_type, "add_transport_update");

        if submission.log_type.trim().is_empty() {
            return Err(DppError::validation("transport entry has no log type"));
        }

        let mut dpp = self.load(record_id)?;
        let now = self.clock.now();
        let entry = submission.into_entry(now.with_timezone(&Utc));
        let alert = entry.is_alert();

        let event = EventBuilder::object(
            self.ids.next_id(prefix::TRANSPORT),
            now,
            BizStep::Transporting,
            EventAction::Observe,
            dpp.product_identifier(),
        )
        .occurred_at(entry.timestamp)
        .disposition(transport_disposition(alert))
        .at_site(site_id)
        .extension("transportConditionUpdate", &entry)?
        .build();

        dpp.push_transport(entry);
        dpp.push_event(event);
        if alert {
            self.flag_transport_alert(&mut dpp);
        }
        self.save(&dpp)?;

        Ok(dpp)
    }

    /// Anchor a reference to an off-chain transport log file on the record.
    pub fn anchor_transport_log(
        &self,
        record_id: &str,
        anchor: TransportLogAnchor,
        site_id: &str,
    ) -> Result<Dpp, DppError> {
        debug!(record_id, log_ref = %anchor.off_chain_log_ref, "anchor_transport_log");

        if anchor.off_chain_log_ref.trim().is_empty() {
            return Err(DppError::validation("transport log reference is empty"));
        }

        let mut dpp = self.load(record_id)?;
        let now = self.clock.now();

        let entry = TransportConditionLogEntry {
            log_type: LOG_FILE.to_string(),
            value: anchor.off_chain_log_ref.clone(),
            unit: String::new(),
            timestamp: now.with_timezone(&Utc),
            status: if anchor.alarm_summary { "ALERT" } else { "OK" }.to_string(),
            off_chain_log_ref: Some(anchor.off_chain_log_ref.clone()),
            responsible_system: anchor.responsible_system.clone(),
        };

        let event = EventBuilder::object(
            self.ids.next_id(prefix::ANCHOR),
            now,
            BizStep::Storing,
            EventAction::Add,
            dpp.product_identifier(),
        )
        .disposition(transport_disposition(anchor.alarm_summary))
        .at_site(site_id)
        .extension("transportLogAnchor", &anchor)?
        .build();

        dpp.push_transport(entry);
        dpp.push_event(event);
        if dpp.status().is_in_flight() {
            if anchor.alarm_summary {
                self.flag_transport_alert(&mut dpp);
            }
        } else {
            self.reconcile_status(&mut dpp);
        }
        self.save(&dpp)?;

        info!(
            record_id,
            alarm = anchor.alarm_summary,
            status = %dpp.status(),
            "transport log anchored"
        );
        Ok(dpp)
    }

    /// Consume the inputs into a new output record.
    ///
    /// Everything is validated and staged before the first write. A store failure while
    /// committing leaves the inputs written so far consumed and is reported as
    /// [`DppError::TransformationAborted`].
    pub fn record_transformation(
        &self,
        request: RecordTransformation,
    ) -> Result<TransformationResult, DppError> {
        debug!(
            output_id = %request.output.id,
            inputs = ?request.input_record_ids,
            "record_transformation"
        );

        request.validate()?;
        let output_id = request.output.id.clone();
        if self.exists(&output_id)? {
            return Err(DppError::already_exists(&output_id));
        }

        let caller = self.identity.current_organization()?;
        let now = self.clock.now();

        let mut inputs = Vec::with_capacity(request.input_record_ids.len());
        let mut ineligible_inputs = Vec::new();
        for input_id in &request.input_record_ids {
            let mut input = self.load(input_id)?;
            if !admit_input(&input, self.config.input_eligibility)? {
                warn!(
                    input_id = %input_id,
                    status = %input.status(),
                    output_id = %output_id,
                    "consuming ineligible input"
                );
                ineligible_inputs.push(input_id.clone());
            }
            consume(&mut input, &output_id);
            inputs.push(input);
        }

        let input_epcs = inputs
            .iter()
            .map(|input| input.product_identifier().to_string())
            .collect();
        let site_id = request.output.manufacturer_site_id.clone();
        let mut output = self.commission(
            request.output,
            caller.clone(),
            request.input_record_ids.clone(),
            now,
        );

        let mut event = EventBuilder::transformation(
            self.ids.next_id(prefix::TRANSFORM),
            now,
            input_epcs,
            output.product_identifier(),
        )
        .at_site(&site_id);
        if !ineligible_inputs.is_empty() {
            event = event.extension("ineligibleInputs", &ineligible_inputs)?;
        }

        let initial_entry = match request.initial_quality {
            Some(submission) => {
                let entry = build_entry(
                    &output,
                    submission,
                    EvaluationPhase::Initial,
                    now.with_timezone(&Utc),
                    &caller,
                )?;
                event = event.extension("initialCompoundQuality", &entry)?;
                apply_entry(&mut output, entry.clone());
                Some(entry)
            }
            None => None,
        };

        output.push_event(event.build());
        self.reconcile_status(&mut output);

        let staged_inputs = inputs
            .iter()
            .map(|input| Ok((input.id().to_string(), input.to_bytes()?)))
            .collect::<Result<Vec<_>, DppError>>()?;
        let staged_output = output.to_bytes()?;

        let mut committed = Vec::with_capacity(staged_inputs.len());
        for (input_id, bytes) in staged_inputs {
            if let Err(err) = self.store.put(&self.config.record_key(&input_id), bytes) {
                return Err(self.aborted(&output_id, committed, err));
            }
            committed.push(input_id);
        }
        if let Err(err) = self
            .store
            .put(&self.config.record_key(&output_id), staged_output)
        {
            return Err(self.aborted(&output_id, committed, err));
        }

        info!(
            output_id = %output_id,
            consumed = ?committed,
            ineligible = ?ineligible_inputs,
            status = %output.status(),
            "transformation recorded"
        );
        if let Some(entry) = &initial_entry {
            self.raise_alert(&output, entry);
        }

        Ok(TransformationResult {
            output,
            consumed_inputs: committed,
            ineligible_inputs,
        })
    }

    /// Ship the record to `new_owner`.
    pub fn transfer_record(
        &self,
        record_id: &str,
        new_owner: &str,
        shipper_site_id: &str,
    ) -> Result<Dpp, DppError> {
        debug!(record_id, new_owner, "transfer_record");

        let mut dpp = self.load(record_id)?;
        let caller = self.identity.current_organization()?;
        transfer::ensure_can_ship(&dpp, &caller, new_owner)?;

        let original_status = dpp.status().to_string();
        let event = EventBuilder::object(
            self.ids.next_id(prefix::SHIP),
            self.clock.now(),
            BizStep::Shipping,
            EventAction::Observe,
            dpp.product_identifier(),
        )
        .disposition(Disposition::InTransit)
        .read_point(shipper_site_id)
        .extension("intendedRecipient", new_owner)?
        .extension("originalStatus", &original_status)?
        .build();

        dpp.push_event(event);
        transfer::ship(&mut dpp, new_owner);
        self.save(&dpp)?;

        info!(
            record_id,
            from = %caller,
            to = new_owner,
            status = %dpp.status(),
            "passport shipped"
        );
        Ok(dpp)
    }

    /// Accept delivery as the designated recipient, optionally with an incoming inspection.
    pub fn acknowledge_receipt(
        &self,
        record_id: &str,
        recipient_site_id: &str,
        inspection: Option<QualitySubmission>,
    ) -> Result<Dpp, DppError> {
        debug!(record_id, inspected = inspection.is_some(), "acknowledge_receipt");

        let mut dpp = self.load(record_id)?;
        let caller = self.identity.current_organization()?;
        transfer::ensure_recipient(&dpp, &caller)?;

        let accepted = transfer::accepted_status(&dpp);
        let disposition = if accepted.carries_transport_alert() {
            Disposition::InPossessionNonConformant
        } else {
            Disposition::InPossession
        };
        let now = self.clock.now();

        let event = EventBuilder::object(
            self.ids.next_id(prefix::RECEIVE),
            now,
            BizStep::Receiving,
            EventAction::Add,
            dpp.product_identifier(),
        )
        .disposition(disposition)
        .at_site(recipient_site_id)
        .build();
        dpp.push_event(event);
        dpp.set_status(accepted);

        let inspection_entry = match inspection {
            Some(submission) => {
                let entry = build_inspection_entry(submission, now.with_timezone(&Utc), &caller);
                let event = EventBuilder::object(
                    self.ids.next_id(prefix::INSPECT),
                    now,
                    BizStep::Inspecting,
                    EventAction::Observe,
                    dpp.product_identifier(),
                )
                .disposition(disposition_for(&entry.evaluation_outcome))
                .at_site(recipient_site_id)
                .extension("inspectionDataByRecipient", &entry)?
                .build();
                dpp.push_quality(entry.clone());
                dpp.push_event(event);
                self.reconcile_status(&mut dpp);
                Some(entry)
            }
            None => None,
        };
        self.save(&dpp)?;

        info!(record_id, recipient = %caller, status = %dpp.status(), "receipt acknowledged");
        if let Some(entry) = &inspection_entry {
            self.raise_alert(&dpp, entry);
        }
        Ok(dpp)
    }

    /// Refuse delivery as the designated recipient. The record is retired for good.
    pub fn reject_delivery(
        &self,
        record_id: &str,
        recipient_site_id: &str,
        reason: &str,
    ) -> Result<Dpp, DppError> {
        debug!(record_id, "reject_delivery");

        if reason.trim().is_empty() {
            return Err(DppError::validation("rejection reason is empty"));
        }

        let mut dpp = self.load(record_id)?;
        let caller = self.identity.current_organization()?;
        transfer::ensure_recipient(&dpp, &caller)?;

        let event = EventBuilder::object(
            self.ids.next_id(prefix::REJECT),
            self.clock.now(),
            BizStep::Receiving,
            EventAction::Observe,
            dpp.product_identifier(),
        )
        .disposition(Disposition::NonConformant)
        .at_site(recipient_site_id)
        .extension("rejectionReason", reason)?
        .build();

        dpp.push_event(event);
        dpp.set_status(DppStatus::RejectedBy {
            organization: caller.clone(),
        });
        self.save(&dpp)?;

        info!(record_id, recipient = %caller, reason, "delivery rejected");
        Ok(dpp)
    }

    pub fn query_record(&self, record_id: &str) -> Result<Dpp, DppError> {
        debug!(record_id, "query_record");
        self.load(record_id)
    }

    fn commission(
        &self,
        params: NewDpp,
        owner: String,
        input_record_ids: Vec<String>,
        now: DateTime<FixedOffset>,
    ) -> Dpp {
        let site_id = params.manufacturer_site_id.clone();
        let mut dpp = Dpp::new(params, owner, input_record_ids);

        let event = EventBuilder::object(
            self.ids.next_id(prefix::CREATE),
            now,
            BizStep::Commissioning,
            EventAction::Add,
            dpp.product_identifier(),
        )
        .disposition(Disposition::Active)
        .at_site(&site_id)
        .build();
        dpp.push_event(event);
        dpp
    }

    fn reconcile_status(&self, dpp: &mut Dpp) {
        let next = reconcile(dpp);
        if &next != dpp.status() {
            info!(
                record_id = %dpp.id(),
                from = %dpp.status(),
                to = %next,
                "status changed"
            );
            dpp.set_status(next);
        }
    }

    fn flag_transport_alert(&self, dpp: &mut Dpp) {
        if let Some(next) = transfer::with_transport_alert(dpp.status()) {
            info!(record_id = %dpp.id(), to = %next, "transport alert flagged");
            dpp.set_status(next);
        }
    }

    fn raise_alert(&self, dpp: &Dpp, entry: &QualityEntry) {
        let Some(alert) = QualityAlert::for_entry(dpp, entry) else {
            return;
        };
        match alert.to_bytes() {
            Ok(payload) => self
                .notifications
                .emit(&self.config.quality_alert_topic, payload),
            Err(err) => warn!(record_id = %dpp.id(), error = %err, "quality alert not encoded"),
        }
    }

    fn aborted(&self, output_id: &str, committed_inputs: Vec<String>, err: DppError) -> DppError {
        warn!(
            output_id,
            committed = ?committed_inputs,
            error = %err,
            "transformation aborted mid-commit"
        );
        DppError::TransformationAborted {
            output_id: output_id.to_string(),
            committed_inputs,
            reason: err.to_string(),
        }
    }

    fn exists(&self, record_id: &str) -> Result<bool, DppError> {
        Ok(self
            .store
            .get(&self.config.record_key(record_id))?
            .is_some())
    }

    fn load(&self, record_id: &str) -> Result<Dpp, DppError> {
        let bytes = self
            .store
            .get(&self.config.record_key(record_id))?
            .ok_or_else(|| DppError::NotFound(record_id.to_string()))?;
        Dpp::from_bytes(&bytes)
    }

    fn save(&self, dpp: &Dpp) -> Result<(), DppError> {
        self.store
            .put(&self.config.record_key(dpp.id()), dpp.to_bytes()?)
    }
}

fn validate_new_record(params: &NewDpp) -> Result<(), DppError> {
    if params.id.trim().is_empty() {
        return Err(DppError::validation("record id is empty"));
    }
    validate_product_identifier(&params.product_identifier)?;
    validate_specifications(&params.specifications)
}

fn transport_disposition(alert: bool) -> Disposition {
    if alert {
        Disposition::NonConformantInTransit
    } else {
        Disposition::InTransit
    }
}
