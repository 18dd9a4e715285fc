//! Validation rule for acyclicity.

use crate::analysis::topology;
use crate::error::MdfError;
use crate::graph::Graph;
use crate::store::Entity;
use crate::validation::error::{ValidationError, ValidationErrorType};

/// Reports one node on a cycle, if the graph's edges close one.
pub(crate) fn validate_acyclic(graph: &Graph) -> Option<ValidationError> {
    let err = topology::topological_order(graph).err()?;
    let subject = match &err {
        MdfError::CyclicGraph { node, .. } => node.clone(),
        _ => graph.id().to_string(),
    };
    Some(ValidationError {
        graph: graph.id().to_string(),
        subject,
        error_type: ValidationErrorType::CyclicGraph,
        message: err.to_string(),
    })
}
