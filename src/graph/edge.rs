//! Defines the `Edge` type, a connection from one node's output port to
//! another node's input port.

use crate::error::{MdfError, Result};
use crate::store::{Attributes, AttributeSpec, Entity, EntityKind, FieldType, Schema};
use serde_json::{Map, Value};

const WIRING: [&str; 4] = ["sender", "receiver", "sender_port", "receiver_port"];

/// Transmits the value of `sender.sender_port` to `receiver.receiver_port`.
///
/// The four wiring attributes hold identifiers, not links: they are resolved
/// by name against the enclosing graph whenever they are needed.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    id: String,
    attributes: Attributes,
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        sender: impl Into<String>,
        sender_port: impl Into<String>,
        receiver: impl Into<String>,
        receiver_port: impl Into<String>,
    ) -> Self {
        let mut edge = Self::create(id.into());
        edge.attributes.insert("sender", Value::String(sender.into()));
        edge.attributes.insert("receiver", Value::String(receiver.into()));
        edge.attributes.insert("sender_port", Value::String(sender_port.into()));
        edge.attributes.insert("receiver_port", Value::String(receiver_port.into()));
        edge
    }

    /// Fails if a parameter reuses a wiring attribute's name.
    pub fn with_parameters(mut self, parameters: Map<String, Value>) -> Result<Self> {
        self.set_attribute("parameters", Value::Object(parameters))?;
        Ok(self)
    }

    pub fn parameters(&self) -> Option<&Map<String, Value>> { self.attributes.get_map("parameters") }

    pub fn sender(&self) -> Option<&str> { self.attributes.get_str("sender") }

    pub fn receiver(&self) -> Option<&str> { self.attributes.get_str("receiver") }

    pub fn sender_port(&self) -> Option<&str> { self.attributes.get_str("sender_port") }

    pub fn receiver_port(&self) -> Option<&str> { self.attributes.get_str("receiver_port") }
}

impl Entity for Edge {
    const SCHEMA: &'static Schema = &Schema {
        kind: EntityKind::Edge,
        attributes: &[
            AttributeSpec {
                name: "parameters",
                description: "Dict of parameters for the Edge",
                ty: FieldType::Mapping,
            },
            AttributeSpec {
                name: "sender",
                description: "The id of the Node which is the source of the Edge",
                ty: FieldType::String,
            },
            AttributeSpec {
                name: "receiver",
                description: "The id of the Node which is the target of the Edge",
                ty: FieldType::String,
            },
            AttributeSpec {
                name: "sender_port",
                description: "The id of the OutputPort on the sender Node, whose value should be sent to the receiver_port",
                ty: FieldType::String,
            },
            AttributeSpec {
                name: "receiver_port",
                description: "The id of the InputPort on the receiver Node",
                ty: FieldType::String,
            },
        ],
        children: &[],
    };

    fn create(id: String) -> Self {
        Self { id, attributes: Attributes::new() }
    }

    fn id(&self) -> &str { &self.id }

    fn attributes(&self) -> &Attributes { &self.attributes }

    fn attributes_mut(&mut self) -> &mut Attributes { &mut self.attributes }

    /// Parameters may not shadow the wiring attributes.
    fn check_attribute(&self, name: &'static str, value: &Value) -> Result<()> {
        if name != "parameters" {
            return Ok(());
        }
        let shadowed = value
            .as_object()
            .and_then(|parameters| WIRING.iter().find(|key| parameters.contains_key(**key)));
        match shadowed {
            Some(key) => Err(MdfError::schema(
                EntityKind::Edge,
                name,
                format!("parameter '{}' shadows a wiring attribute", key),
            )),
            None => Ok(()),
        }
    }
}
