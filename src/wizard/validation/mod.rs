//! Field- and step-level validation for the entry wizard.
//!
//! Every semantic rule is defined exactly once, in the [`fields`] rule table;
//! the per-edit validator and the step validators both read that table.
//! Validators never panic and never short-circuit: a step reports every
//! violation it finds.

pub mod fields;
pub mod reference;
pub mod steps;

use serde::{Deserialize, Serialize};

/// A single validation failure, keyed by the offending field. Returned as
/// data, never thrown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A non-blocking advisory (e.g. a passport expiring soon). Never prevents
/// advancing or submitting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Outcome of validating one step (or the whole form).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl StepReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn push_error(&mut self, error: ValidationError) {
        if !self.errors.contains(&error) {
            self.errors.push(error);
        }
    }

    pub fn push_warning(&mut self, warning: ValidationWarning) {
        if !self.warnings.contains(&warning) {
            self.warnings.push(warning);
        }
    }

    pub fn extend_error(&mut self, error: Option<ValidationError>) {
        if let Some(error) = error {
            self.push_error(error);
        }
    }

    /// Union with another report, dropping exact duplicates so re-checked
    /// rules (family vs. final review) surface once.
    pub fn merge(&mut self, other: StepReport) {
        for error in other.errors {
            self.push_error(error);
        }
        for warning in other.warnings {
            self.push_warning(warning);
        }
    }
}
