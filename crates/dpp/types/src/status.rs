//! Passport status as an explicit tagged union.
//!
//! The stored representation stays the historical string form (`InTransitTo_Org2MSP`,
//! `ConsumedInTransformation_dpp-7`, ...) so records written by older tooling still decode,
//! but all decisions are made on the variants, never on substrings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DppError;

const AWAITING_PREFIX: &str = "AwaitingMandatoryChecks (";
const AWAITING_SUFFIX: &str = " open)";
const IN_TRANSIT_PREFIX: &str = "InTransitTo_";
const ACCEPTED: &str = "AcceptedAtRecipient";
const CONSUMED_PREFIX: &str = "ConsumedInTransformation_";
const REJECTED_PREFIX: &str = "RejectedBy_";
/// Marks a status that carries a transport alert.
pub const TRANSPORT_ALERT_SUFFIX: &str = "_TransportAlert";

/// Which kind of non-blocking issue a released record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviationKind {
    /// Deviations present but not attributable to a specific category.
    General,
    Quality,
    Transport,
    /// Quality deviation and transport alert together.
    Multiple,
}

impl DeviationKind {
    fn label(self) -> &'static str {
        match self {
            Self::General => "ReleasedWithDeviations",
            Self::Quality => "ReleasedWithQualityDeviations",
            Self::Transport => "ReleasedWithTransportAlert",
            Self::Multiple => "ReleasedWithMultipleIssues",
        }
    }
}

/// Aggregate lifecycle status of a passport.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DppStatus {
    Draft,
    AwaitingMandatoryChecks {
        open: usize,
    },
    Released,
    ReleasedWith(DeviationKind),
    Blocked,
    InTransit {
        recipient: String,
        transport_alert: bool,
    },
    AcceptedAtRecipient {
        transport_alert: bool,
    },
    ConsumedInTransformation {
        output_id: String,
    },
    RejectedBy {
        organization: String,
    },
}

impl DppStatus {
    pub fn in_transit(recipient: impl Into<String>, transport_alert: bool) -> Self {
        Self::InTransit {
            recipient: recipient.into(),
            transport_alert,
        }
    }

    /// Statuses that reconciliation never touches again.
    pub fn is_frozen(&self) -> bool {
        matches!(
            self,
            Self::Blocked | Self::ConsumedInTransformation { .. } | Self::RejectedBy { .. }
        )
    }

    /// Lineage statuses that retire the record for good.
    pub fn is_retired(&self) -> bool {
        matches!(
            self,
            Self::ConsumedInTransformation { .. } | Self::RejectedBy { .. }
        )
    }

    /// Shipping window in which only critical failures may change the status.
    ///
    /// A plain `AcceptedAtRecipient` is outside the window and is evaluated normally; only the
    /// alert-carrying acceptance stays frozen until it is shipped on or blocked.
    pub fn is_in_flight(&self) -> bool {
        match self {
            Self::InTransit { .. } => true,
            Self::AcceptedAtRecipient { transport_alert } => *transport_alert,
            _ => false,
        }
    }

    pub fn carries_transport_alert(&self) -> bool {
        match self {
            Self::InTransit {
                transport_alert, ..
            }
            | Self::AcceptedAtRecipient { transport_alert } => *transport_alert,
            _ => false,
        }
    }

    pub fn is_released_family(&self) -> bool {
        matches!(self, Self::Released | Self::ReleasedWith(_))
    }

    /// Statuses from which the owner may ship the record to another organization.
    pub fn is_transferable(&self) -> bool {
        match self {
            Self::Released
            | Self::ReleasedWith(DeviationKind::General)
            | Self::ReleasedWith(DeviationKind::Transport) => true,
            other => other.carries_transport_alert(),
        }
    }

    /// Statuses an input record must have to be consumed by a transformation.
    pub fn is_transformation_eligible(&self) -> bool {
        match self {
            Self::AcceptedAtRecipient { transport_alert } => !transport_alert,
            other => other.is_released_family(),
        }
    }

    /// Designated recipient while the record is in transit.
    pub fn recipient(&self) -> Option<&str> {
        match self {
            Self::InTransit { recipient, .. } => Some(recipient),
            _ => None,
        }
    }
}

impl fmt::Display for DppStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => f.write_str("Draft"),
            Self::AwaitingMandatoryChecks { open } => {
                write!(f, "{}{}{}", AWAITING_PREFIX, open, AWAITING_SUFFIX)
            }
            Self::Released => f.write_str("Released"),
            Self::ReleasedWith(kind) => f.write_str(kind.label()),
            Self::Blocked => f.write_str("Blocked"),
            Self::InTransit {
                recipient,
                transport_alert,
            } => {
                write!(f, "{}{}", IN_TRANSIT_PREFIX, recipient)?;
                if *transport_alert {
                    f.write_str(TRANSPORT_ALERT_SUFFIX)?;
                }
                Ok(())
            }
            Self::AcceptedAtRecipient { transport_alert } => {
                f.write_str(ACCEPTED)?;
                if *transport_alert {
                    f.write_str(TRANSPORT_ALERT_SUFFIX)?;
                }
                Ok(())
            }
            Self::ConsumedInTransformation { output_id } => {
                write!(f, "{}{}", CONSUMED_PREFIX, output_id)
            }
            Self::RejectedBy { organization } => write!(f, "{}{}", REJECTED_PREFIX, organization),
        }
    }
}

impl FromStr for DppStatus {
    type Err = DppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let unknown = || DppError::Serialization(format!("unknown passport status '{}'", value));

        let status = match value {
            "Draft" => Self::Draft,
            "Released" => Self::Released,
            "Blocked" => Self::Blocked,
            "AcceptedAtRecipient" => Self::AcceptedAtRecipient {
                transport_alert: false,
            },
            "AcceptedAtRecipient_TransportAlert" => Self::AcceptedAtRecipient {
                transport_alert: true,
            },
            other => {
                if let Some(kind) = [
                    DeviationKind::General,
                    DeviationKind::Quality,
                    DeviationKind::Transport,
                    DeviationKind::Multiple,
                ]
                .into_iter()
                .find(|kind| kind.label() == other)
                {
                    Self::ReleasedWith(kind)
                } else if let Some(count) = other
                    .strip_prefix(AWAITING_PREFIX)
                    .and_then(|rest| rest.strip_suffix(AWAITING_SUFFIX))
                {
                    Self::AwaitingMandatoryChecks {
                        open: count.parse().map_err(|_| unknown())?,
                    }
                } else if let Some(rest) = other.strip_prefix(IN_TRANSIT_PREFIX) {
                    let (recipient, transport_alert) = match rest.strip_suffix(TRANSPORT_ALERT_SUFFIX)
                    {
                        Some(recipient) => (recipient, true),
                        None => (rest, false),
                    };
                    if recipient.is_empty() {
                        return Err(unknown());
                    }
                    Self::in_transit(recipient, transport_alert)
                } else if let Some(output_id) = non_empty_suffix(other, CONSUMED_PREFIX) {
                    Self::ConsumedInTransformation {
                        output_id: output_id.to_string(),
                    }
                } else if let Some(organization) = non_empty_suffix(other, REJECTED_PREFIX) {
                    Self::RejectedBy {
                        organization: organization.to_string(),
                    }
                } else {
                    return Err(unknown());
                }
            }
        };

        Ok(status)
    }
}

fn non_empty_suffix<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    value.strip_prefix(prefix).filter(|rest| !rest.is_empty())
}

impl From<DppStatus> for String {
    fn from(status: DppStatus) -> Self {
        status.to_string()
    }
}

impl TryFrom<String> for DppStatus {
    type Error = DppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_historical_strings() {
        assert_eq!(
            DppStatus::AwaitingMandatoryChecks { open: 2 }.to_string(),
            "AwaitingMandatoryChecks (2 open)"
        );
        assert_eq!(
            DppStatus::in_transit("Org4MSP", true).to_string(),
            "InTransitTo_Org4MSP_TransportAlert"
        );
        assert_eq!(
            DppStatus::AcceptedAtRecipient {
                transport_alert: false
            }
            .to_string(),
            "AcceptedAtRecipient"
        );
        assert_eq!(
            DppStatus::ReleasedWith(DeviationKind::Multiple).to_string(),
            "ReleasedWithMultipleIssues"
        );
    }

    #[test]
    fn decodes_every_variant_it_encodes() {
        let statuses = [
            DppStatus::Draft,
            DppStatus::AwaitingMandatoryChecks { open: 3 },
            DppStatus::Released,
            DppStatus::ReleasedWith(DeviationKind::General),
            DppStatus::ReleasedWith(DeviationKind::Quality),
            DppStatus::ReleasedWith(DeviationKind::Transport),
            DppStatus::ReleasedWith(DeviationKind::Multiple),
            DppStatus::Blocked,
            DppStatus::in_transit("Org2MSP", false),
            DppStatus::in_transit("Org2MSP", true),
            DppStatus::AcceptedAtRecipient {
                transport_alert: true,
            },
            DppStatus::ConsumedInTransformation {
                output_id: "dpp-c".into(),
            },
            DppStatus::RejectedBy {
                organization: "Org3MSP".into(),
            },
        ];

        for status in statuses {
            let parsed: DppStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn rejects_unknown_and_truncated_strings() {
        assert!("Shipped".parse::<DppStatus>().is_err());
        assert!("InTransitTo_".parse::<DppStatus>().is_err());
        assert!("ConsumedInTransformation_".parse::<DppStatus>().is_err());
        assert!("AwaitingMandatoryChecks (x open)"
            .parse::<DppStatus>()
            .is_err());
    }

    #[test]
    fn transfer_and_transformation_eligibility() {
        assert!(DppStatus::Released.is_transferable());
        assert!(DppStatus::ReleasedWith(DeviationKind::Transport).is_transferable());
        assert!(!DppStatus::ReleasedWith(DeviationKind::Quality).is_transferable());
        assert!(DppStatus::AcceptedAtRecipient {
            transport_alert: true
        }
        .is_transferable());
        assert!(!DppStatus::Blocked.is_transferable());

        assert!(DppStatus::ReleasedWith(DeviationKind::Quality).is_transformation_eligible());
        assert!(DppStatus::AcceptedAtRecipient {
            transport_alert: false
        }
        .is_transformation_eligible());
        assert!(!DppStatus::Draft.is_transformation_eligible());
        assert!(!DppStatus::in_transit("Org2MSP", false).is_transformation_eligible());
    }

    #[test]
    fn serde_uses_string_form() {
        let json = serde_json::to_string(&DppStatus::in_transit("Org2MSP", false)).unwrap();
        assert_eq!(json, "\"InTransitTo_Org2MSP\"");
        let back: DppStatus = serde_json::from_str("\"RejectedBy_Org3MSP\"").unwrap();
        assert!(back.is_frozen());
    }
}
