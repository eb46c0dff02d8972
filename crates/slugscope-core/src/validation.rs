//! Aggregation of field validator results into a single error.
//!
//! ## Summary
//! A validator inspects a set of items stored under one field and reports the
//! sub-fields it found missing. Several validator results are folded into one
//! `FieldValidationError` whose message lists every failing validator on its
//! own line.

use serde_json::{Map, Value};
use thiserror::Error;

/// Outcome of validating one item.
pub trait ValidatorOutcome {
    /// Names of the fields found missing or empty.
    fn invalid_fields(&self) -> &[String];

    /// Human readable description of the outcome.
    fn message(&self) -> String;

    fn is_valid(&self) -> bool {
        self.invalid_fields().is_empty()
    }
}

/// Checks that a set of required fields are present and non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequiredFields {
    missing: Vec<String>,
}

impl RequiredFields {
    /// ## Summary
    /// Validates `data` against `required`, recording every field that is
    /// absent, `null`, or an empty string.
    #[must_use]
    pub fn check(required: &[&str], data: &Map<String, Value>) -> Self {
        let missing = required
            .iter()
            .filter(|field| match data.get(**field) {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => s.is_empty(),
                Some(_) => false,
            })
            .map(|field| (*field).to_string())
            .collect();

        Self { missing }
    }
}

impl ValidatorOutcome for RequiredFields {
    fn invalid_fields(&self) -> &[String] {
        &self.missing
    }

    fn message(&self) -> String {
        if self.missing.is_empty() {
            String::new()
        } else {
            format!("Missing required fields: {}", self.missing.join(", "))
        }
    }
}

/// Validation failure for the items held by a single field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct FieldValidationError {
    field: String,
    message: String,
}

impl FieldValidationError {
    /// ## Summary
    /// Builds the error from several validator outcomes.
    ///
    /// Each failing outcome contributes one line naming `field` and the
    /// missing sub-fields. Outcomes with nothing missing contribute nothing.
    #[must_use]
    pub fn from_outcomes<V: ValidatorOutcome>(field: &str, outcomes: &[V]) -> Self {
        let message = outcomes
            .iter()
            .map(|outcome| {
                if outcome.is_valid() {
                    String::new()
                } else {
                    format!(
                        "Items contained within the {field} field are missing the following fields: {}",
                        outcome.invalid_fields().join(", ")
                    )
                }
            })
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            field: field.to_string(),
            message,
        }
    }

    /// Builds the error from a single outcome, keeping its own message.
    #[must_use]
    pub fn from_outcome<V: ValidatorOutcome>(field: &str, outcome: &V) -> Self {
        Self {
            field: field.to_string(),
            message: outcome.message(),
        }
    }

    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}
