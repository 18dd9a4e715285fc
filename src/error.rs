//! Crate-wide error type for registry, topology and document operations.
//!
//! Every variant is a deterministic rejection of malformed structure; nothing
//! here is transient or worth retrying.

use crate::store::EntityKind;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MdfError>;

#[derive(Error, Debug)]
pub enum MdfError {
    /// An undeclared attribute or collection was assigned, or a value did not
    /// match the declared type.
    #[error("Schema violation on {entity} field '{field}': {reason}")]
    SchemaViolation {
        entity: EntityKind,
        field: String,
        reason: String,
    },

    #[error("Duplicate identifier '{id}' in {entity} collection '{collection}'")]
    DuplicateIdentifier {
        entity: EntityKind,
        collection: &'static str,
        id: String,
    },

    /// A read of an attribute or collection the entity type never declared.
    #[error("{entity} has no declared field '{field}'")]
    UnknownField { entity: EntityKind, field: String },

    #[error("{entity} '{id}': {field} '{target}' does not resolve in the enclosing graph")]
    DanglingReference {
        entity: EntityKind,
        id: String,
        field: &'static str,
        target: String,
    },

    #[error("Cycle detected in graph '{graph}' involving node '{node}'")]
    CyclicGraph { graph: String, node: String },

    #[error("Unsupported document format for '{}'", .path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("I/O error on '{}': {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl MdfError {
    pub(crate) fn schema(entity: EntityKind, field: impl Into<String>, reason: impl Into<String>) -> Self {
        MdfError::SchemaViolation {
            entity,
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unknown(entity: EntityKind, field: impl Into<String>) -> Self {
        MdfError::UnknownField {
            entity,
            field: field.into(),
        }
    }
}
