use std::fmt;

use serde::{Deserialize, Serialize};

pub const PASS: &str = "PASS";
pub const FAIL: &str = "FAIL";
pub const DEVIATION: &str = "DEVIATION";
pub const INVALID_FORMAT: &str = "INVALID_FORMAT";
pub const INFO_NO_SPEC: &str = "INFO_NO_SPEC";
pub const INFO_SENSOR_DATA: &str = "INFO_SENSOR_DATA";
pub const INCOMING_INSPECTION_DATA: &str = "INCOMING_INSPECTION_DATA";

/// Evaluation outcome of one quality entry, stored as its string code.
///
/// `Fail` and `Deviation` keep the full code because external systems may assert qualified
/// values such as `FAIL_VISUAL` or `DEVIATION_HIGH_INITIAL`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OutcomeCode {
    Pass,
    Fail(String),
    Deviation(String),
    InvalidFormat,
    InfoNoSpec,
    InfoSensorData,
    IncomingInspectionData,
    /// A value outside the controlled vocabulary, kept verbatim.
    Unclassified(String),
}

impl OutcomeCode {
    pub fn fail() -> Self {
        Self::Fail(FAIL.to_string())
    }

    pub fn deviation(code: impl Into<String>) -> Self {
        Self::Deviation(code.into())
    }

    /// Maps a code string onto the vocabulary. Never fails.
    pub fn from_code(code: &str) -> Self {
        match code {
            PASS => Self::Pass,
            INVALID_FORMAT => Self::InvalidFormat,
            INFO_NO_SPEC => Self::InfoNoSpec,
            INFO_SENSOR_DATA => Self::InfoSensorData,
            INCOMING_INSPECTION_DATA => Self::IncomingInspectionData,
            other if other.starts_with(FAIL) => Self::Fail(other.to_string()),
            other if other.starts_with(DEVIATION) => Self::Deviation(other.to_string()),
            other => Self::Unclassified(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pass => PASS,
            Self::Fail(code) | Self::Deviation(code) | Self::Unclassified(code) => code,
            Self::InvalidFormat => INVALID_FORMAT,
            Self::InfoNoSpec => INFO_NO_SPEC,
            Self::InfoSensorData => INFO_SENSOR_DATA,
            Self::IncomingInspectionData => INCOMING_INSPECTION_DATA,
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Hard failures that block the record.
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::Fail(_) | Self::InvalidFormat)
    }

    /// Non-fatal quality signal: any deviation code, or any code carrying an `ALERT` marker.
    pub fn is_deviation(&self) -> bool {
        matches!(self, Self::Deviation(_)) || self.as_str().contains("ALERT")
    }

    /// Deviation attributable to a measured quality value (`DEVIATION` or `DEVIATION_*`).
    pub fn is_quality_deviation(&self) -> bool {
        matches!(self, Self::Deviation(_))
    }

    /// Outcomes that raise the quality-alert side channel.
    pub fn raises_alert(&self) -> bool {
        matches!(self, Self::Fail(_) | Self::Deviation(_) | Self::InvalidFormat)
    }

    /// Outcomes an external system may assert as authoritative.
    pub fn is_assertable(&self) -> bool {
        matches!(
            self,
            Self::Pass
                | Self::Fail(_)
                | Self::Deviation(_)
                | Self::InvalidFormat
                | Self::InfoSensorData
                | Self::InfoNoSpec
        )
    }

    /// Outcomes that do not need an explanatory comment.
    pub fn is_self_explanatory(&self) -> bool {
        matches!(self, Self::Pass | Self::InfoSensorData | Self::InfoNoSpec)
    }
}

impl fmt::Display for OutcomeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for OutcomeCode {
    fn from(code: String) -> Self {
        Self::from_code(&code)
    }
}

impl From<OutcomeCode> for String {
    fn from(outcome: OutcomeCode) -> Self {
        outcome.as_str().to_string()
    }
}
