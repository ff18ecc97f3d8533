//! Quality ledger entry builder.

use chrono::{DateTime, Utc};
use dpp_types::{Disposition, Dpp, DppError, OutcomeCode, QualityEntry, QualitySubmission};
use serde::Serialize;

use crate::matcher::{resolve_outcome, EvaluationPhase};

/// Turn a raw submission into a finalized entry evaluated against the record's specifications.
///
/// `timestamp` defaults to `now` and `performingOrg` to the caller's organization.
pub fn build_entry(
    dpp: &Dpp,
    submission: QualitySubmission,
    phase: EvaluationPhase,
    now: DateTime<Utc>,
    caller_org: &str,
) -> Result<QualityEntry, DppError> {
    if submission.test_name.trim().is_empty() {
        return Err(DppError::validation("quality entry has no test name"));
    }

    let evaluation = resolve_outcome(
        &submission,
        dpp.specification(&submission.test_name),
        phase,
    );

    Ok(QualityEntry {
        timestamp: submission.timestamp.unwrap_or(now),
        performing_org: submission
            .performing_org
            .filter(|org| !org.is_empty())
            .unwrap_or_else(|| caller_org.to_string()),
        test_name: submission.test_name,
        result: submission.result,
        unit: submission.unit,
        system_id: submission.system_id,
        responsible: submission.responsible,
        off_chain_data_ref: submission.off_chain_data_ref,
        evaluation_outcome: evaluation.outcome,
        evaluation_comment: evaluation.comment,
    })
}

/// Build an incoming-inspection entry. The recipient's outcome is kept verbatim, not evaluated.
pub fn build_inspection_entry(
    submission: QualitySubmission,
    now: DateTime<Utc>,
    recipient_org: &str,
) -> QualityEntry {
    let evaluation_outcome = submission
        .evaluation_outcome
        .as_deref()
        .filter(|code| !code.is_empty())
        .map(OutcomeCode::from_code)
        .unwrap_or(OutcomeCode::IncomingInspectionData);

    QualityEntry {
        timestamp: submission.timestamp.unwrap_or(now),
        performing_org: submission
            .performing_org
            .filter(|org| !org.is_empty())
            .unwrap_or_else(|| recipient_org.to_string()),
        test_name: submission.test_name,
        result: submission.result,
        unit: submission.unit,
        system_id: submission.system_id,
        responsible: submission.responsible,
        off_chain_data_ref: submission.off_chain_data_ref,
        evaluation_outcome,
        evaluation_comment: submission.evaluation_comment.unwrap_or_default(),
    }
}

/// Append an entry and close its mandatory check on `PASS`. Returns whether a check closed.
pub fn apply_entry(dpp: &mut Dpp, entry: QualityEntry) -> bool {
    let closes_check = entry.evaluation_outcome.is_pass()
        && dpp
            .specification(&entry.test_name)
            .is_some_and(|spec| spec.is_mandatory);

    let closed = closes_check && dpp.satisfy_mandatory_check(&entry.test_name);
    dpp.push_quality(entry);
    closed
}

pub fn disposition_for(outcome: &OutcomeCode) -> Disposition {
    if outcome.is_pass() {
        Disposition::Conformant
    } else if outcome.raises_alert() {
        Disposition::NonConformant
    } else {
        Disposition::Active
    }
}

/// Payload published on the quality-alert topic.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityAlert<'a> {
    pub dpp_id: &'a str,
    pub product_identifier: &'a str,
    pub batch: &'a str,
    pub product_type_id: &'a str,
    pub test_name: &'a str,
    pub result: &'a str,
    pub evaluation_outcome: &'a str,
    pub evaluation_comment: &'a str,
    pub timestamp: DateTime<Utc>,
    pub system_id: &'a str,
    pub performing_org: &'a str,
}

impl<'a> QualityAlert<'a> {
    /// `None` when the outcome does not warrant an alert.
    pub fn for_entry(dpp: &'a Dpp, entry: &'a QualityEntry) -> Option<Self> {
        if !entry.evaluation_outcome.raises_alert() {
            return None;
        }
        Some(Self {
            dpp_id: dpp.id(),
            product_identifier: dpp.product_identifier(),
            batch: dpp.batch(),
            product_type_id: dpp.product_type_id(),
            test_name: &entry.test_name,
            result: &entry.result,
            evaluation_outcome: entry.evaluation_outcome.as_str(),
            evaluation_comment: &entry.evaluation_comment,
            timestamp: entry.timestamp,
            system_id: &entry.system_id,
            performing_org: &entry.performing_org,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, DppError> {
        Ok(serde_json::to_vec(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dpp_types::{NewDpp, QualitySpecification};

    fn record() -> Dpp {
        Dpp::new(
            NewDpp {
                id: "dpp-1".into(),
                product_identifier: "urn:epc:id:sgtin:4012345.011111.1001".into(),
                product_type_id: "housing".into(),
                manufacturer_site_id: "4012345000009".into(),
                batch: "B-1".into(),
                production_date: "2025-05-06".into(),
                specifications: vec![QualitySpecification::numeric("Weight", 10.0, 20.0)
                    .with_unit("kg")
                    .mandatory()],
            },
            "Org1MSP",
            Vec::new(),
        )
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-05-06T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn fills_defaults_from_caller_and_clock() {
        let dpp = record();
        let entry = build_entry(
            &dpp,
            QualitySubmission::new("Weight", "15").with_unit("kg"),
            EvaluationPhase::Standard,
            now(),
            "Org1MSP",
        )
        .unwrap();

        assert_eq!(entry.timestamp, now());
        assert_eq!(entry.performing_org, "Org1MSP");
        assert!(entry.evaluation_outcome.is_pass());
    }

    #[test]
    fn keeps_supplied_performer() {
        let dpp = record();
        let mut submission = QualitySubmission::new("Weight", "15");
        submission.performing_org = Some("LabMSP".into());
        let entry =
            build_entry(&dpp, submission, EvaluationPhase::Standard, now(), "Org1MSP").unwrap();
        assert_eq!(entry.performing_org, "LabMSP");
    }

    #[test]
    fn empty_test_name_is_rejected() {
        let dpp = record();
        let result = build_entry(
            &dpp,
            QualitySubmission::new(" ", "15"),
            EvaluationPhase::Standard,
            now(),
            "Org1MSP",
        );
        assert!(matches!(result, Err(DppError::Validation(_))));
    }

    #[test]
    fn only_pass_closes_a_mandatory_check() {
        let mut dpp = record();
        let deviation = build_entry(
            &dpp,
            QualitySubmission::new("Weight", "25"),
            EvaluationPhase::Standard,
            now(),
            "Org1MSP",
        )
        .unwrap();
        assert!(!apply_entry(&mut dpp, deviation));
        assert_eq!(dpp.open_mandatory_checks().len(), 1);

        let pass = build_entry(
            &dpp,
            QualitySubmission::new("Weight", "12"),
            EvaluationPhase::Standard,
            now(),
            "Org1MSP",
        )
        .unwrap();
        assert!(apply_entry(&mut dpp, pass));
        assert!(dpp.open_mandatory_checks().is_empty());
        assert_eq!(dpp.quality().len(), 2);
    }

    #[test]
    fn inspection_outcome_defaults_and_is_kept_verbatim() {
        let entry = build_inspection_entry(QualitySubmission::new("Visual", "ok"), now(), "Org2MSP");
        assert_eq!(entry.evaluation_outcome, OutcomeCode::IncomingInspectionData);
        assert_eq!(entry.performing_org, "Org2MSP");

        let asserted = QualitySubmission::new("Visual", "dented").asserting("TEMP_ALERT", "");
        let entry = build_inspection_entry(asserted, now(), "Org2MSP");
        assert_eq!(entry.evaluation_outcome.as_str(), "TEMP_ALERT");
    }

    #[test]
    fn disposition_follows_outcome() {
        assert_eq!(disposition_for(&OutcomeCode::Pass), Disposition::Conformant);
        assert_eq!(
            disposition_for(&OutcomeCode::InvalidFormat),
            Disposition::NonConformant
        );
        assert_eq!(
            disposition_for(&OutcomeCode::deviation("DEVIATION_LOW")),
            Disposition::NonConformant
        );
        assert_eq!(disposition_for(&OutcomeCode::InfoNoSpec), Disposition::Active);
    }

    #[test]
    fn alert_payload_only_for_alerting_outcomes() {
        let dpp = record();
        let entry = build_entry(
            &dpp,
            QualitySubmission::new("Weight", "abc"),
            EvaluationPhase::Standard,
            now(),
            "Org1MSP",
        )
        .unwrap();
        let alert = QualityAlert::for_entry(&dpp, &entry).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&alert.to_bytes().unwrap()).unwrap();
        assert_eq!(json["dppId"], "dpp-1");
        assert_eq!(json["evaluationOutcome"], "INVALID_FORMAT");
        assert_eq!(json["performingOrg"], "Org1MSP");

        let pass = build_entry(
            &dpp,
            QualitySubmission::new("Weight", "15"),
            EvaluationPhase::Standard,
            now(),
            "Org1MSP",
        )
        .unwrap();
        assert!(QualityAlert::for_entry(&dpp, &pass).is_none());
    }
}
