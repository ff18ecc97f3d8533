//! Status reconciliation.
//!
//! Evaluation order:
//! 1. frozen statuses (`Blocked`, consumed, rejected) never change;
//! 2. in flight, only a critical failure with every mandatory check closed may block;
//! 3. otherwise a critical failure blocks, open checks withhold release, and deviations
//!    qualify the release.

use dpp_types::{DeviationKind, Dpp, DppStatus};

/// Evidence gathered from the record's histories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Findings {
    pub critical_failure: bool,
    pub quality_deviation: bool,
    pub other_deviation: bool,
    pub transport_alert: bool,
}

impl Findings {
    pub fn scan(dpp: &Dpp) -> Self {
        let mut findings = Self::default();
        for entry in dpp.quality() {
            let outcome = &entry.evaluation_outcome;
            if outcome.is_critical() {
                findings.critical_failure = true;
            } else if outcome.is_quality_deviation() {
                findings.quality_deviation = true;
            } else if outcome.is_deviation() {
                findings.other_deviation = true;
            }
        }
        findings.transport_alert = dpp.transport_log().iter().any(|entry| entry.is_alert());
        findings
    }

    pub fn has_deviations(&self) -> bool {
        self.quality_deviation || self.other_deviation || self.transport_alert
    }

    fn deviation_kind(&self) -> DeviationKind {
        match (self.quality_deviation, self.transport_alert) {
            (true, true) => DeviationKind::Multiple,
            (true, false) => DeviationKind::Quality,
            (false, true) => DeviationKind::Transport,
            (false, false) => DeviationKind::General,
        }
    }
}

/// Derive the status the record should have now. Pure and idempotent.
pub fn reconcile(dpp: &Dpp) -> DppStatus {
    let current = dpp.status();
    if current.is_frozen() {
        return current.clone();
    }

    let open = dpp.open_mandatory_checks().len();

    if current.is_in_flight() {
        if open == 0 && Findings::scan(dpp).critical_failure {
            return DppStatus::Blocked;
        }
        return current.clone();
    }

    let findings = Findings::scan(dpp);
    if findings.critical_failure {
        DppStatus::Blocked
    } else if open > 0 {
        DppStatus::AwaitingMandatoryChecks { open }
    } else if findings.has_deviations() {
        DppStatus::ReleasedWith(findings.deviation_kind())
    } else {
        DppStatus::Released
    }
}
