use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DppError;
use crate::event::TraceabilityEvent;
use crate::outcome::OutcomeCode;
use crate::status::DppStatus;

/// Admissible-value contract for one named test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualitySpecification {
    pub test_name: String,
    #[serde(default)]
    pub is_numeric: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_limit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_limit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default)]
    pub is_mandatory: bool,
}

impl QualitySpecification {
    pub fn numeric(test_name: impl Into<String>, lower_limit: f64, upper_limit: f64) -> Self {
        Self {
            test_name: test_name.into(),
            is_numeric: true,
            lower_limit: Some(lower_limit),
            upper_limit: Some(upper_limit),
            expected_value: None,
            unit: None,
            is_mandatory: false,
        }
    }

    pub fn textual(test_name: impl Into<String>, expected_value: impl Into<String>) -> Self {
        Self {
            test_name: test_name.into(),
            is_numeric: false,
            lower_limit: None,
            upper_limit: None,
            expected_value: Some(expected_value.into()),
            unit: None,
            is_mandatory: false,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn mandatory(mut self) -> Self {
        self.is_mandatory = true;
        self
    }

    pub fn validate(&self) -> Result<(), DppError> {
        if self.test_name.trim().is_empty() {
            return Err(DppError::validation("specification test name is empty"));
        }
        if self.is_numeric {
            if let (Some(lower), Some(upper)) = (self.lower_limit, self.upper_limit) {
                if lower > upper {
                    return Err(DppError::validation(format!(
                        "specification '{}' has lower limit {} above upper limit {}",
                        self.test_name, lower, upper
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Validates a full specification set: each spec individually, names unique.
pub fn validate_specifications(specs: &[QualitySpecification]) -> Result<(), DppError> {
    let mut seen = HashSet::new();
    for spec in specs {
        spec.validate()?;
        if !seen.insert(spec.test_name.as_str()) {
            return Err(DppError::validation(format!(
                "duplicate specification '{}'",
                spec.test_name
            )));
        }
    }
    Ok(())
}

/// Raw quality observation as submitted by a lab system, oracle or inspector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualitySubmission {
    pub test_name: String,
    pub result: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub system_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub responsible: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performing_org: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub off_chain_data_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_outcome: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_comment: Option<String>,
}

impl QualitySubmission {
    pub fn new(test_name: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            test_name: test_name.into(),
            result: result.into(),
            ..Self::default()
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_system(mut self, system_id: impl Into<String>, responsible: impl Into<String>) -> Self {
        self.system_id = system_id.into();
        self.responsible = responsible.into();
        self
    }

    /// Supply an outcome decided elsewhere (lab system, oracle).
    pub fn asserting(mut self, outcome: impl Into<String>, comment: impl Into<String>) -> Self {
        self.evaluation_outcome = Some(outcome.into());
        self.evaluation_comment = Some(comment.into());
        self
    }
}

/// Finalized, append-only quality record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityEntry {
    pub test_name: String,
    pub result: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub system_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub responsible: String,
    pub performing_org: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub off_chain_data_ref: Option<String>,
    pub evaluation_outcome: OutcomeCode,
    #[serde(default)]
    pub evaluation_comment: String,
}

/// Transport condition report as submitted by a carrier or telemetry oracle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportSubmission {
    pub log_type: String,
    pub value: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub off_chain_log_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible_system: Option<String>,
}

impl TransportSubmission {
    pub fn new(
        log_type: impl Into<String>,
        value: impl Into<String>,
        unit: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            log_type: log_type.into(),
            value: value.into(),
            unit: unit.into(),
            status: status.into(),
            ..Self::default()
        }
    }

    pub fn into_entry(self, now: DateTime<Utc>) -> TransportConditionLogEntry {
        TransportConditionLogEntry {
            log_type: self.log_type,
            value: self.value,
            unit: self.unit,
            timestamp: self.timestamp.unwrap_or(now),
            status: self.status,
            off_chain_log_ref: self.off_chain_log_ref,
            responsible_system: self.responsible_system,
        }
    }
}

/// Reference to an off-chain transport log file being anchored on the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportLogAnchor {
    pub off_chain_log_ref: String,
    #[serde(default)]
    pub alarm_summary: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible_system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Append-only transport telemetry entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportConditionLogEntry {
    pub log_type: String,
    pub value: String,
    #[serde(default)]
    pub unit: String,
    pub timestamp: DateTime<Utc>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub off_chain_log_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible_system: Option<String>,
}

impl TransportConditionLogEntry {
    /// `ALERT` anywhere in the free-form status marks the entry as an alert.
    pub fn is_alert(&self) -> bool {
        self.status.contains("ALERT")
    }
}

/// Creation parameters shared by plain creation and transformation outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDpp {
    pub id: String,
    pub product_identifier: String,
    #[serde(default)]
    pub product_type_id: String,
    pub manufacturer_site_id: String,
    #[serde(default)]
    pub batch: String,
    #[serde(default)]
    pub production_date: String,
    #[serde(default)]
    pub specifications: Vec<QualitySpecification>,
}

/// Digital Product Passport: the aggregate root.
///
/// History collections are private and only grow through the `push_*` methods; nothing is
/// ever edited or removed once appended. `input_record_ids` is fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dpp {
    id: String,
    product_identifier: String,
    #[serde(default)]
    product_type_id: String,
    manufacturer_site_id: String,
    #[serde(default)]
    batch: String,
    #[serde(default)]
    production_date: String,
    owner_org: String,
    status: DppStatus,
    #[serde(default)]
    specifications: Vec<QualitySpecification>,
    #[serde(default)]
    open_mandatory_checks: BTreeSet<String>,
    #[serde(default)]
    quality: Vec<QualityEntry>,
    #[serde(default)]
    transport_log: Vec<TransportConditionLogEntry>,
    #[serde(default)]
    input_record_ids: Vec<String>,
    #[serde(default)]
    events: Vec<TraceabilityEvent>,
}

impl Dpp {
    /// Build a `Draft` record. Open checks are every mandatory specification.
    pub fn new(params: NewDpp, owner_org: impl Into<String>, input_record_ids: Vec<String>) -> Self {
        let open_mandatory_checks = params
            .specifications
            .iter()
            .filter(|spec| spec.is_mandatory)
            .map(|spec| spec.test_name.clone())
            .collect();

        Self {
            id: params.id,
            product_identifier: params.product_identifier,
            product_type_id: params.product_type_id,
            manufacturer_site_id: params.manufacturer_site_id,
            batch: params.batch,
            production_date: params.production_date,
            owner_org: owner_org.into(),
            status: DppStatus::Draft,
            specifications: params.specifications,
            open_mandatory_checks,
            quality: Vec::new(),
            transport_log: Vec::new(),
            input_record_ids,
            events: Vec::new(),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DppError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, DppError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn product_identifier(&self) -> &str {
        &self.product_identifier
    }

    pub fn product_type_id(&self) -> &str {
        &self.product_type_id
    }

    pub fn manufacturer_site_id(&self) -> &str {
        &self.manufacturer_site_id
    }

    pub fn batch(&self) -> &str {
        &self.batch
    }

    pub fn production_date(&self) -> &str {
        &self.production_date
    }

    pub fn owner_org(&self) -> &str {
        &self.owner_org
    }

    pub fn status(&self) -> &DppStatus {
        &self.status
    }

    pub fn specifications(&self) -> &[QualitySpecification] {
        &self.specifications
    }

    pub fn specification(&self, test_name: &str) -> Option<&QualitySpecification> {
        self.specifications
            .iter()
            .find(|spec| spec.test_name == test_name)
    }

    pub fn open_mandatory_checks(&self) -> &BTreeSet<String> {
        &self.open_mandatory_checks
    }

    pub fn quality(&self) -> &[QualityEntry] {
        &self.quality
    }

    pub fn transport_log(&self) -> &[TransportConditionLogEntry] {
        &self.transport_log
    }

    pub fn input_record_ids(&self) -> &[String] {
        &self.input_record_ids
    }

    pub fn events(&self) -> &[TraceabilityEvent] {
        &self.events
    }

    pub fn set_status(&mut self, status: DppStatus) {
        self.status = status;
    }

    pub fn set_owner(&mut self, owner_org: impl Into<String>) {
        self.owner_org = owner_org.into();
    }

    /// Marks a mandatory check as satisfied. Returns whether it was still open.
    pub fn satisfy_mandatory_check(&mut self, test_name: &str) -> bool {
        self.open_mandatory_checks.remove(test_name)
    }

    pub fn push_quality(&mut self, entry: QualityEntry) {
        self.quality.push(entry);
    }

    pub fn push_transport(&mut self, entry: TransportConditionLogEntry) {
        self.transport_log.push(entry);
    }

    pub fn push_event(&mut self, event: TraceabilityEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> NewDpp {
        NewDpp {
            id: "dpp-1".into(),
            product_identifier: "urn:epc:id:sgtin:4012345.011111.1001".into(),
            product_type_id: "gear-housing".into(),
            manufacturer_site_id: "4012345000009".into(),
            batch: "B-17".into(),
            production_date: "2025-05-06".into(),
            specifications: vec![
                QualitySpecification::numeric("Weight", 10.0, 20.0)
                    .with_unit("kg")
                    .mandatory(),
                QualitySpecification::textual("Colour", "blue"),
            ],
        }
    }

    #[test]
    fn new_record_opens_mandatory_checks_only() {
        let dpp = Dpp::new(params(), "Org1MSP", Vec::new());
        assert_eq!(dpp.status(), &DppStatus::Draft);
        assert_eq!(dpp.open_mandatory_checks().len(), 1);
        assert!(dpp.open_mandatory_checks().contains("Weight"));
        assert_eq!(dpp.owner_org(), "Org1MSP");
    }

    #[test]
    fn encoded_record_always_carries_collections() {
        let mut p = params();
        p.specifications.clear();
        let dpp = Dpp::new(p, "Org1MSP", Vec::new());
        let json: serde_json::Value = serde_json::from_slice(&dpp.to_bytes().unwrap()).unwrap();
        for field in [
            "specifications",
            "openMandatoryChecks",
            "quality",
            "transportLog",
            "inputRecordIds",
            "events",
        ] {
            assert_eq!(json[field], serde_json::json!([]), "field {field}");
        }
        assert_eq!(json["status"], "Draft");
    }

    #[test]
    fn decodes_what_it_encodes() {
        let dpp = Dpp::new(params(), "Org1MSP", vec!["dpp-a".into()]);
        let decoded = Dpp::from_bytes(&dpp.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, dpp);
    }

    #[test]
    fn malformed_bytes_are_serialization_errors() {
        assert!(matches!(
            Dpp::from_bytes(b"{not json"),
            Err(DppError::Serialization(_))
        ));
    }

    #[test]
    fn specification_set_validation() {
        let inverted = QualitySpecification::numeric("Torque", 5.0, 1.0);
        assert!(validate_specifications(&[inverted]).is_err());

        let dup = vec![
            QualitySpecification::textual("Colour", "blue"),
            QualitySpecification::textual("Colour", "red"),
        ];
        assert!(validate_specifications(&dup).is_err());

        assert!(validate_specifications(&params().specifications).is_ok());
    }

    #[test]
    fn satisfying_a_check_only_removes_it_once() {
        let mut dpp = Dpp::new(params(), "Org1MSP", Vec::new());
        assert!(dpp.satisfy_mandatory_check("Weight"));
        assert!(!dpp.satisfy_mandatory_check("Weight"));
        assert!(dpp.open_mandatory_checks().is_empty());
    }
}
