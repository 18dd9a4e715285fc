//! The central validator that runs every validation rule over a model.
use super::error::{ValidationError, ValidationErrorType};
use super::rules::{conditions, cycles, states};
use crate::config::ValidationMode;
use crate::graph::Model;
use crate::store::Entity;
use log::debug;

/// Findings of one validation pass, split by severity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    /// Advisory findings, such as ambiguous state updates.
    pub warnings: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool { self.errors.is_empty() }

    fn push(&mut self, finding: ValidationError) {
        if finding.error_type.is_fatal() {
            self.errors.push(finding);
        } else {
            self.warnings.push(finding);
        }
    }

    /// `Ok(warnings)` if nothing fatal was found, `Err(errors)` otherwise.
    pub fn into_result(self) -> Result<Vec<ValidationError>, Vec<ValidationError>> {
        if self.errors.is_empty() {
            Ok(self.warnings)
        } else {
            Err(self.errors)
        }
    }
}

/// Structural linter for a decoded or hand-built model.
///
/// Rules are local to one graph, so graphs are checked independently and in
/// declaration order. Every finding is collected; nothing stops at the first.
/// Edge wiring is not re-checked here: `Graph::add_edge` refuses dangling
/// edges on insertion.
pub struct Validator<'a> {
    model: &'a Model,
    mode: ValidationMode,
}

impl<'a> Validator<'a> {
    pub fn new(model: &'a Model, mode: ValidationMode) -> Self {
        Self { model, mode }
    }

    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();

        if self.model.id().is_empty() {
            report.push(ValidationError {
                graph: String::new(),
                subject: String::new(),
                error_type: ValidationErrorType::EmptyIdentifier,
                message: "Model identifier must be non-empty".to_string(),
            });
        }

        for graph in self.model.graphs().iter() {
            if let Some(finding) = cycles::validate_acyclic(graph) {
                report.push(finding);
            }
            states::validate_states(graph).into_iter().for_each(|f| report.push(f));
            if self.mode == ValidationMode::Strict {
                conditions::validate_condition_targets(graph).into_iter().for_each(|f| report.push(f));
            }
        }

        debug!(
            model = self.model.id(),
            errors = report.errors.len(),
            warnings = report.warnings.len();
            "Validated model"
        );
        report
    }
}
