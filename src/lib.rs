// Crate root: an interchange representation for computational graphs.
// Models hold graphs of nodes wired by edges, plus an optional condition
// set that says when each node may run. Everything round-trips through
// JSON and YAML documents.

pub mod analysis;
pub mod condition;
pub mod config;
pub mod document;
pub mod error;
pub mod graph;
pub mod store;
pub mod validation;

// --- Public surface ---
pub use condition::{Condition, ConditionKind, ConditionSet, Dependency};
pub use config::{Provenance, ValidationMode, WriteOptions, FORMAT_VERSION};
pub use error::{MdfError, Result};
pub use graph::{Edge, Function, Graph, InputPort, Model, Node, OutputPort, State, StateUpdate};
pub use store::{Entity, EntityKind};
pub use validation::{ValidationError, ValidationErrorType, ValidationReport, Validator};
