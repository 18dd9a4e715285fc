//! Static schema tables: what each entity type may carry.

use crate::error::{MdfError, Result};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Model,
    Graph,
    Node,
    InputPort,
    OutputPort,
    Function,
    State,
    Edge,
    ConditionSet,
    Condition,
}

impl EntityKind {
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Model => "Model",
            EntityKind::Graph => "Graph",
            EntityKind::Node => "Node",
            EntityKind::InputPort => "InputPort",
            EntityKind::OutputPort => "OutputPort",
            EntityKind::Function => "Function",
            EntityKind::State => "State",
            EntityKind::Edge => "Edge",
            EntityKind::ConditionSet => "ConditionSet",
            EntityKind::Condition => "Condition",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The declared type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    /// A symbolic expression, kept verbatim. Never parsed here.
    Expression,
    /// A name -> value mapping (literals or expressions).
    Mapping,
    /// A serialized `ConditionSet`. The shape is checked here, the contents by the owner.
    ConditionSet,
    Any,
}

impl FieldType {
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Expression => "expression",
            FieldType::Mapping => "mapping",
            FieldType::ConditionSet => "condition set",
            FieldType::Any => "any",
        }
    }

    pub fn admits(&self, value: &Value) -> bool {
        match self {
            FieldType::String | FieldType::Expression => value.is_string(),
            FieldType::Mapping | FieldType::ConditionSet => value.is_object(),
            FieldType::Any => true,
        }
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub ty: FieldType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: EntityKind,
}

/// The fixed attribute and child-collection table of one entity type.
///
/// Tables are declared once per type as constants; the declaration order is
/// also the order fields are emitted in documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    pub kind: EntityKind,
    pub attributes: &'static [AttributeSpec],
    pub children: &'static [ChildSpec],
}

impl Schema {
    pub fn attribute(&self, name: &str) -> Option<&'static AttributeSpec> {
        self.attributes.iter().find(|spec| spec.name == name)
    }

    pub fn child(&self, name: &str) -> Option<&'static ChildSpec> {
        self.children.iter().find(|spec| spec.name == name)
    }

    pub fn declares(&self, name: &str) -> bool {
        self.attribute(name).is_some() || self.child(name).is_some()
    }

    /// Checks an assignment of `value` to `name` against the table.
    /// `null` always passes: it clears the attribute.
    pub fn check_assignment(&self, name: &str, value: &Value) -> Result<&'static AttributeSpec> {
        let spec = self.attribute(name).ok_or_else(|| {
            let reason = if self.child(name).is_some() {
                "is a child collection, not an attribute"
            } else {
                "is not a declared attribute"
            };
            MdfError::schema(self.kind, name, reason)
        })?;

        if value.is_null() || spec.ty.admits(value) {
            Ok(spec)
        } else {
            Err(MdfError::schema(
                self.kind,
                name,
                format!("expected {}, found {}", spec.ty.name(), json_type_name(value)),
            ))
        }
    }

    /// Resolves a collection name for reading.
    pub fn collection(&self, name: &str) -> Result<&'static ChildSpec> {
        self.child(name).ok_or_else(|| MdfError::unknown(self.kind, name))
    }
}
