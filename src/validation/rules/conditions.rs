//! Validation rule for condition targets. Only run in strict mode.

use crate::graph::Graph;
use crate::store::Entity;
use crate::validation::error::{ValidationError, ValidationErrorType};
use indexmap::IndexSet;

/// Every node identifier a graph's condition set mentions, as a
/// `node_specific` key or inside a condition's dependencies, must name a
/// node of that graph. Each unknown identifier is reported once.
pub(crate) fn validate_condition_targets(graph: &Graph) -> Vec<ValidationError> {
    // Malformed sets never get this far: assignment decodes them.
    let Ok(Some(conditions)) = graph.conditions() else {
        return Vec::new();
    };
    let unknown: IndexSet<&str> = conditions
        .node_references()
        .into_iter()
        .filter(|id| graph.get_node(id).is_none())
        .collect();

    unknown
        .into_iter()
        .map(|id| ValidationError {
            graph: graph.id().to_string(),
            subject: id.to_string(),
            error_type: ValidationErrorType::UnknownConditionTarget,
            message: format!("Condition refers to node '{}', which is not in graph '{}'", id, graph.id()),
        })
        .collect()
}
