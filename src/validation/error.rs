//! Defines the finding types reported by the model validation pass.

/// The specific category of a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorType {
    /// The edges of a graph close a cycle.
    CyclicGraph,
    /// A condition names a node the graph does not contain. Strict mode only.
    UnknownConditionTarget,
    /// A state sets both `value` and `time_derivative`.
    AmbiguousStateUpdate,
    EmptyIdentifier,
}

impl ValidationErrorType {
    /// Fatal findings make a model unusable; the rest are advisory.
    pub fn is_fatal(self) -> bool {
        !matches!(self, ValidationErrorType::AmbiguousStateUpdate)
    }
}

/// A structured finding from the validation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The graph the finding belongs to. Empty for model-level findings.
    pub graph: String,
    /// Identifier of the offending entity: an edge, node, state or condition key.
    pub subject: String,
    pub error_type: ValidationErrorType,
    /// A human-readable message explaining the finding.
    pub message: String,
}
