//! Validation rule for state update ambiguity.

use crate::graph::{Graph, StateUpdate};
use crate::store::Entity;
use crate::validation::error::{ValidationError, ValidationErrorType};
use log::warn;

/// Flags states that carry both an update expression and a time derivative.
///
/// The document is still legal. Which of the two wins is the evaluator's
/// call, so this is reported as a warning only.
pub(crate) fn validate_states(graph: &Graph) -> Vec<ValidationError> {
    let mut findings = Vec::new();
    for node in graph.nodes().iter() {
        for state in node.states().iter() {
            if let StateUpdate::Ambiguous { value, time_derivative } = state.update_rule() {
                warn!(graph = graph.id(), node = node.id(), state = state.id(); "State sets both value and time_derivative");
                findings.push(ValidationError {
                    graph: graph.id().to_string(),
                    subject: format!("{}.{}", node.id(), state.id()),
                    error_type: ValidationErrorType::AmbiguousStateUpdate,
                    message: format!(
                        "State '{}' on node '{}' defines both value ({}) and time_derivative ({})",
                        state.id(),
                        node.id(),
                        value,
                        time_derivative
                    ),
                });
            }
        }
    }
    findings
}
