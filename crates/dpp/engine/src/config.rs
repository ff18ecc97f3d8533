//! Engine configuration

use serde::{Deserialize, Serialize};

/// How a transformation treats an input whose status is not eligible for consumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputEligibility {
    /// Abort the transformation before anything is written.
    #[default]
    Reject,
    /// Consume the input anyway and list it in the transformation event.
    AllowWithAudit,
}

/// Ledger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Prefix prepended to record ids to form store keys
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Topic for the quality-alert side channel
    #[serde(default = "default_alert_topic")]
    pub quality_alert_topic: String,

    /// Policy for ineligible transformation inputs
    #[serde(default)]
    pub input_eligibility: InputEligibility,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            key_prefix: default_key_prefix(),
            quality_alert_topic: default_alert_topic(),
            input_eligibility: InputEligibility::default(),
        }
    }
}

impl LedgerConfig {
    pub fn record_key(&self, record_id: &str) -> String {
        format!("{}{}", self.key_prefix, record_id)
    }
}

fn default_key_prefix() -> String {
    "DPP-".to_string()
}

fn default_alert_topic() -> String {
    "QualityAlert".to_string()
}
