//! Defines the `InputPort` and `OutputPort` attachment points of a node.

use crate::store::{Attributes, AttributeSpec, Entity, EntityKind, FieldType, Schema};
use serde_json::Value;

const SHAPE: AttributeSpec = AttributeSpec {
    name: "shape",
    description: "The shape of the variable, in numpy ndarray shape syntax",
    ty: FieldType::String,
};

const TYPE: AttributeSpec = AttributeSpec {
    name: "type",
    description: "The scalar type of the variable",
    ty: FieldType::String,
};

/// Receives a value from another node, or from the caller if no edge feeds it.
#[derive(Debug, Clone, PartialEq)]
pub struct InputPort {
    id: String,
    attributes: Attributes,
}

impl InputPort {
    pub fn new(id: impl Into<String>) -> Self {
        Self::create(id.into())
    }

    pub fn with_shape(mut self, shape: impl Into<String>) -> Self {
        self.attributes.insert(SHAPE.name, Value::String(shape.into()));
        self
    }

    pub fn with_type(mut self, ty: impl Into<String>) -> Self {
        self.attributes.insert(TYPE.name, Value::String(ty.into()));
        self
    }

    pub fn shape(&self) -> Option<&str> { self.attributes.get_str(SHAPE.name) }

    pub fn port_type(&self) -> Option<&str> { self.attributes.get_str(TYPE.name) }
}

impl Entity for InputPort {
    const SCHEMA: &'static Schema = &Schema {
        kind: EntityKind::InputPort,
        attributes: &[SHAPE, TYPE],
        children: &[],
    };

    fn create(id: String) -> Self {
        Self { id, attributes: Attributes::new() }
    }

    fn id(&self) -> &str { &self.id }

    fn attributes(&self) -> &Attributes { &self.attributes }

    fn attributes_mut(&mut self) -> &mut Attributes { &mut self.attributes }
}

/// Exposes a value computed inside the node.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPort {
    id: String,
    attributes: Attributes,
}

impl OutputPort {
    const VALUE: AttributeSpec = AttributeSpec {
        name: "value",
        description: "The value of the OutputPort in terms of the InputPort, Function and State values",
        ty: FieldType::Expression,
    };

    pub fn new(id: impl Into<String>) -> Self {
        Self::create(id.into())
    }

    /// The expression is stored verbatim; it may name sibling ports,
    /// functions and states of the same node.
    pub fn with_value(mut self, expression: impl Into<String>) -> Self {
        self.attributes.insert(Self::VALUE.name, Value::String(expression.into()));
        self
    }

    pub fn with_shape(mut self, shape: impl Into<String>) -> Self {
        self.attributes.insert(SHAPE.name, Value::String(shape.into()));
        self
    }

    pub fn with_type(mut self, ty: impl Into<String>) -> Self {
        self.attributes.insert(TYPE.name, Value::String(ty.into()));
        self
    }

    pub fn value(&self) -> Option<&str> { self.attributes.get_str(Self::VALUE.name) }

    pub fn shape(&self) -> Option<&str> { self.attributes.get_str(SHAPE.name) }

    pub fn port_type(&self) -> Option<&str> { self.attributes.get_str(TYPE.name) }
}

impl Entity for OutputPort {
    const SCHEMA: &'static Schema = &Schema {
        kind: EntityKind::OutputPort,
        attributes: &[SHAPE, TYPE, OutputPort::VALUE],
        children: &[],
    };

    fn create(id: String) -> Self {
        Self { id, attributes: Attributes::new() }
    }

    fn id(&self) -> &str { &self.id }

    fn attributes(&self) -> &Attributes { &self.attributes }

    fn attributes_mut(&mut self) -> &mut Attributes { &mut self.attributes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MdfError;
    use serde_json::json;

    #[test]
    fn test_output_port_document() {
        let port = OutputPort::new("out0").with_value("2*in0").with_shape("(1,)");
        assert_eq!(port.to_document(), json!({"out0": {"shape": "(1,)", "value": "2*in0"}}));
    }

    #[test]
    fn test_expression_must_be_a_string() {
        let mut port = OutputPort::new("out0");
        let err = port.set_attribute("value", json!(2)).unwrap_err();
        assert!(matches!(err, MdfError::SchemaViolation { entity: EntityKind::OutputPort, .. }));
    }

    #[test]
    fn test_input_port_has_no_value() {
        let mut port = InputPort::new("in0");
        assert!(port.set_attribute("value", json!("x")).is_err());
        assert!(matches!(port.attribute("value"), Err(MdfError::UnknownField { .. })));
        port.set_attribute("type", json!("float")).unwrap();
        assert_eq!(port.port_type(), Some("float"));
    }
}
