//! Provenance: many input records consumed into one output record.

use std::collections::HashSet;

use dpp_types::{
    validate_product_identifier, validate_specifications, Dpp, DppError, DppStatus, NewDpp,
    QualitySubmission,
};
use serde::{Deserialize, Serialize};

use crate::config::InputEligibility;

/// Parameters of one transformation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordTransformation {
    /// The record to create. `manufacturer_site_id` is the site where the transformation happens.
    pub output: NewDpp,
    /// Consumed records, in the order their product identifiers appear in the event.
    pub input_record_ids: Vec<String>,
    /// First assessment of the output, evaluated with the `_INITIAL` vocabulary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_quality: Option<QualitySubmission>,
}

impl RecordTransformation {
    /// Checks that need no store access.
    pub fn validate(&self) -> Result<(), DppError> {
        if self.output.id.trim().is_empty() {
            return Err(DppError::validation("output record id is empty"));
        }
        validate_product_identifier(&self.output.product_identifier)?;
        validate_specifications(&self.output.specifications)?;

        if self.input_record_ids.is_empty() {
            return Err(DppError::validation(
                "a transformation needs at least one input record",
            ));
        }
        let mut seen = HashSet::new();
        for input_id in &self.input_record_ids {
            if input_id == &self.output.id {
                return Err(DppError::validation(format!(
                    "record {} cannot be both input and output",
                    input_id
                )));
            }
            if !seen.insert(input_id.as_str()) {
                return Err(DppError::validation(format!(
                    "input record {} is listed twice",
                    input_id
                )));
            }
        }
        Ok(())
    }
}

/// Outcome of a committed transformation.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformationResult {
    pub output: Dpp,
    /// Input ids marked consumed, in commit order.
    pub consumed_inputs: Vec<String>,
    /// Inputs consumed although their status was not eligible.
    pub ineligible_inputs: Vec<String>,
}

/// Decide whether an input may be consumed.
///
/// Frozen inputs are refused under every policy since their status must never change again.
/// Returns `Ok(true)` when the input is eligible and `Ok(false)` when it is accepted for audit.
pub fn admit_input(input: &Dpp, policy: InputEligibility) -> Result<bool, DppError> {
    let status = input.status();
    if status.is_frozen() {
        return Err(DppError::invalid_transition(
            input.id(),
            format!("status {} is final and cannot be consumed", status),
        ));
    }
    if status.is_transformation_eligible() {
        return Ok(true);
    }
    match policy {
        InputEligibility::Reject => Err(DppError::invalid_transition(
            input.id(),
            format!("status {} is not eligible for transformation", status),
        )),
        InputEligibility::AllowWithAudit => Ok(false),
    }
}

pub fn consume(input: &mut Dpp, output_id: &str) {
    input.set_status(DppStatus::ConsumedInTransformation {
        output_id: output_id.to_string(),
    });
}
