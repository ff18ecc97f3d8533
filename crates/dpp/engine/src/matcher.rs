//! Specification matcher: classifies one reported result against one test specification.

use dpp_types::{OutcomeCode, QualitySpecification, QualitySubmission};

/// Comment used when an asserted non-trivial outcome arrives without one.
pub const ASSERTED_OUTCOME_COMMENT: &str =
    "Outcome asserted by an integration layer, oracle or external system.";

/// Which outcome vocabulary a computed evaluation uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvaluationPhase {
    /// Regular post-release assessment.
    #[default]
    Standard,
    /// Pre-release assessment of a freshly transformed record; failure codes carry `_INITIAL`.
    Initial,
}

impl EvaluationPhase {
    fn code(self, base: &str) -> String {
        match self {
            Self::Standard => base.to_string(),
            Self::Initial => format!("{}_INITIAL", base),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Standard => "",
            Self::Initial => "initial ",
        }
    }
}

/// Outcome and explanation for one quality entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub outcome: OutcomeCode,
    pub comment: String,
}

/// Where the outcome of a submission comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assessment {
    /// Derive the outcome from the matching specification.
    Computed,
    /// Use an authoritative outcome supplied by the caller verbatim.
    Asserted { outcome: OutcomeCode, comment: String },
}

impl Assessment {
    /// Only values from the assertable vocabulary pre-empt evaluation; anything else
    /// submitted as an outcome is discarded and recomputed.
    pub fn of(submission: &QualitySubmission) -> Self {
        let asserted = submission
            .evaluation_outcome
            .as_deref()
            .map(OutcomeCode::from_code)
            .filter(OutcomeCode::is_assertable);

        match asserted {
            Some(outcome) => Self::Asserted {
                outcome,
                comment: submission.evaluation_comment.clone().unwrap_or_default(),
            },
            None => Self::Computed,
        }
    }
}

/// Resolve the final outcome of a submission.
pub fn resolve_outcome(
    submission: &QualitySubmission,
    spec: Option<&QualitySpecification>,
    phase: EvaluationPhase,
) -> Evaluation {
    match Assessment::of(submission) {
        Assessment::Asserted { outcome, comment } => {
            let comment = if comment.is_empty() && !outcome.is_self_explanatory() {
                ASSERTED_OUTCOME_COMMENT.to_string()
            } else {
                comment
            };
            Evaluation { outcome, comment }
        }
        Assessment::Computed => match_specification(submission, spec, phase),
    }
}

/// Classify a result against its specification, or as informative when none matches.
pub fn match_specification(
    submission: &QualitySubmission,
    spec: Option<&QualitySpecification>,
    phase: EvaluationPhase,
) -> Evaluation {
    let test_name = &submission.test_name;
    let result = &submission.result;

    let Some(spec) = spec else {
        return Evaluation {
            outcome: OutcomeCode::InfoNoSpec,
            comment: format!(
                "No specification for {}test '{}' on this record; stored as informative data.",
                phase.label(),
                test_name
            ),
        };
    };

    let mut evaluation = if spec.is_numeric {
        evaluate_numeric(spec, test_name, result, phase)
    } else {
        evaluate_textual(spec, result, phase)
    };

    if let (Some(spec_unit), entry_unit) = (spec.unit.as_deref(), submission.unit.as_str()) {
        if !spec_unit.is_empty()
            && !entry_unit.is_empty()
            && !spec_unit.eq_ignore_ascii_case(entry_unit)
            && evaluation.outcome != OutcomeCode::InvalidFormat
        {
            if !evaluation.comment.is_empty() {
                evaluation.comment.push(' ');
            }
            evaluation.comment.push_str(&format!(
                "Unit mismatch for {}test '{}': specification '{}', entry '{}'.",
                phase.label(),
                test_name,
                spec_unit,
                entry_unit
            ));
        }
    }

    evaluation
}

fn evaluate_numeric(
    spec: &QualitySpecification,
    test_name: &str,
    result: &str,
    phase: EvaluationPhase,
) -> Evaluation {
    let value = match result.parse::<f64>() {
        Ok(value) if !value.is_nan() => value,
        _ => {
            return Evaluation {
                outcome: OutcomeCode::InvalidFormat,
                comment: format!(
                    "The {}result '{}' for test '{}' is not numeric.",
                    phase.label(),
                    result,
                    test_name
                ),
            }
        }
    };

    let unit = match spec.unit.as_deref() {
        Some(unit) if !unit.is_empty() => format!(" {}", unit),
        _ => String::new(),
    };
    if let Some(lower) = spec.lower_limit.filter(|lower| value < *lower) {
        return Evaluation {
            outcome: OutcomeCode::deviation(phase.code("DEVIATION_LOW")),
            comment: format!("Value {:.4} below lower limit {:.4}{}.", value, lower, unit),
        };
    }
    if let Some(upper) = spec.upper_limit.filter(|upper| value > *upper) {
        return Evaluation {
            outcome: OutcomeCode::deviation(phase.code("DEVIATION_HIGH")),
            comment: format!("Value {:.4} above upper limit {:.4}{}.", value, upper, unit),
        };
    }

    Evaluation {
        outcome: OutcomeCode::Pass,
        comment: String::new(),
    }
}

fn evaluate_textual(spec: &QualitySpecification, result: &str, phase: EvaluationPhase) -> Evaluation {
    let expected = spec.expected_value.as_deref().unwrap_or_default();
    if result.to_lowercase() == expected.to_lowercase() {
        Evaluation {
            outcome: OutcomeCode::Pass,
            comment: String::new(),
        }
    } else {
        Evaluation {
            outcome: OutcomeCode::Fail(phase.code("FAIL")),
            comment: format!("Expected '{}', got '{}'.", expected, result),
        }
    }
}
