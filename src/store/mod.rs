//! The entity registry: static schemas, attribute storage and child collections.
pub mod registry;
pub mod types;

pub use registry::{Attributes, Collection, Entity};
pub use types::{AttributeSpec, ChildSpec, EntityKind, FieldType, Schema};
