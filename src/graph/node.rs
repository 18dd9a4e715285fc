//! Defines `Node`, a self-contained unit of evaluation.

use super::function::Function;
use super::port::{InputPort, OutputPort};
use super::state::State;
use crate::error::{MdfError, Result};
use crate::store::{Attributes, AttributeSpec, ChildSpec, Collection, Entity, EntityKind, FieldType, Schema};
use serde_json::{Map, Value};

const INPUT_PORTS: ChildSpec = ChildSpec {
    name: "input_ports",
    description: "The InputPorts into the Node",
    kind: EntityKind::InputPort,
};
const FUNCTIONS: ChildSpec = ChildSpec {
    name: "functions",
    description: "The Functions for the Node",
    kind: EntityKind::Function,
};
const STATES: ChildSpec = ChildSpec {
    name: "states",
    description: "The States of the Node",
    kind: EntityKind::State,
};
const OUTPUT_PORTS: ChildSpec = ChildSpec {
    name: "output_ports",
    description: "The OutputPorts containing evaluated quantities from the Node",
    kind: EntityKind::OutputPort,
};

/// Receives values on its input ports, processes them through functions and
/// states, and exposes results on its output ports.
///
/// Expressions inside a node refer to ports, functions and states by
/// identifier, so those identifiers share one namespace: they are unique
/// across all four collections, not only within each.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: String,
    attributes: Attributes,
    input_ports: Collection<InputPort>,
    functions: Collection<Function>,
    states: Collection<State>,
    output_ports: Collection<OutputPort>,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Self::create(id.into())
    }

    pub fn with_parameters(mut self, parameters: Map<String, Value>) -> Self {
        self.attributes.insert("parameters", Value::Object(parameters));
        self
    }

    pub fn parameters(&self) -> Option<&Map<String, Value>> { self.attributes.get_map("parameters") }

    pub fn add_input_port(&mut self, port: InputPort) -> Result<()> {
        self.ensure_unused(INPUT_PORTS.name, port.id())?;
        self.input_ports.push(port)
    }

    pub fn add_function(&mut self, function: Function) -> Result<()> {
        self.ensure_unused(FUNCTIONS.name, function.id())?;
        self.functions.push(function)
    }

    pub fn add_state(&mut self, state: State) -> Result<()> {
        self.ensure_unused(STATES.name, state.id())?;
        self.states.push(state)
    }

    pub fn add_output_port(&mut self, port: OutputPort) -> Result<()> {
        self.ensure_unused(OUTPUT_PORTS.name, port.id())?;
        self.output_ports.push(port)
    }

    pub fn input_ports(&self) -> &Collection<InputPort> { &self.input_ports }

    pub fn functions(&self) -> &Collection<Function> { &self.functions }

    pub fn states(&self) -> &Collection<State> { &self.states }

    pub fn output_ports(&self) -> &Collection<OutputPort> { &self.output_ports }

    pub fn input_port(&self, id: &str) -> Option<&InputPort> { self.input_ports.get(id) }

    pub fn output_port(&self, id: &str) -> Option<&OutputPort> { self.output_ports.get(id) }

    /// True if any port, function or state of this node uses `id`.
    pub fn has_member(&self, id: &str) -> bool {
        self.input_ports.contains(id)
            || self.functions.contains(id)
            || self.states.contains(id)
            || self.output_ports.contains(id)
    }

    fn ensure_unused(&self, collection: &'static str, id: &str) -> Result<()> {
        if self.has_member(id) {
            return Err(MdfError::DuplicateIdentifier {
                entity: EntityKind::Node,
                collection,
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

impl Entity for Node {
    const SCHEMA: &'static Schema = &Schema {
        kind: EntityKind::Node,
        attributes: &[AttributeSpec {
            name: "parameters",
            description: "Dict of parameters for the Node",
            ty: FieldType::Mapping,
        }],
        children: &[INPUT_PORTS, FUNCTIONS, STATES, OUTPUT_PORTS],
    };

    fn create(id: String) -> Self {
        Self {
            id,
            attributes: Attributes::new(),
            input_ports: Collection::new(EntityKind::Node, INPUT_PORTS.name),
            functions: Collection::new(EntityKind::Node, FUNCTIONS.name),
            states: Collection::new(EntityKind::Node, STATES.name),
            output_ports: Collection::new(EntityKind::Node, OUTPUT_PORTS.name),
        }
    }

    fn id(&self) -> &str { &self.id }

    fn attributes(&self) -> &Attributes { &self.attributes }

    fn attributes_mut(&mut self) -> &mut Attributes { &mut self.attributes }

    fn members(&self, collection: &'static ChildSpec) -> Vec<&str> {
        match collection.name {
            "input_ports" => self.input_ports.ids().collect(),
            "functions" => self.functions.ids().collect(),
            "states" => self.states.ids().collect(),
            "output_ports" => self.output_ports.ids().collect(),
            _ => Vec::new(),
        }
    }

    fn encode_members(&self, body: &mut Map<String, Value>) {
        self.input_ports.encode_into(body);
        self.functions.encode_into(body);
        self.states.encode_into(body);
        self.output_ports.encode_into(body);
    }

    fn decode_member(&mut self, collection: &'static ChildSpec, id: &str, body: &Map<String, Value>) -> Result<()> {
        match collection.name {
            "input_ports" => self.add_input_port(InputPort::from_body(id, body)?),
            "functions" => self.add_function(Function::from_body(id, body)?),
            "states" => self.add_state(State::from_body(id, body)?),
            "output_ports" => self.add_output_port(OutputPort::from_body(id, body)?),
            other => Err(MdfError::schema(EntityKind::Node, other, "no such child collection")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Node {
        let mut node = Node::new("N0").with_parameters(json!({"rate": 5}).as_object().unwrap().clone());
        node.add_input_port(InputPort::new("in0")).unwrap();
        node.add_function(Function::new("f0", "linear").with_arg("slope", "rate")).unwrap();
        node.add_output_port(OutputPort::new("out0").with_value("f0 * in0")).unwrap();
        node
    }

    #[test]
    fn test_document_shape() {
        assert_eq!(
            sample().to_document(),
            json!({"N0": {
                "parameters": {"rate": 5},
                "input_ports": {"in0": {}},
                "functions": {"f0": {"function": "linear", "args": {"slope": "rate"}}},
                "output_ports": {"out0": {"value": "f0 * in0"}}
            }})
        );
    }

    #[test]
    fn test_member_ids_share_one_namespace() {
        let mut node = sample();
        let err = node.add_state(State::new("in0")).unwrap_err();
        assert!(matches!(err, MdfError::DuplicateIdentifier { collection: "states", .. }));
        let err = node.add_input_port(InputPort::new("in0")).unwrap_err();
        assert!(matches!(err, MdfError::DuplicateIdentifier { collection: "input_ports", .. }));
    }

    #[test]
    fn test_collection_reads() {
        let node = sample();
        assert_eq!(node.collection("output_ports").unwrap(), vec!["out0"]);
        assert!(node.collection("states").unwrap().is_empty());
        assert!(matches!(node.collection("edges"), Err(MdfError::UnknownField { .. })));
    }

    #[test]
    fn test_append_child_document() {
        let mut node = sample();
        node.append_child("states", &json!({"s": {"value": "s + in0"}})).unwrap();
        assert_eq!(node.states().get("s").unwrap().value(), Some("s + in0"));

        let err = node.append_child("nodes", &json!({"x": {}})).unwrap_err();
        assert!(matches!(err, MdfError::SchemaViolation { .. }));
    }

    #[test]
    fn test_decode_round_trip() {
        let node = sample();
        let decoded = Node::from_document(&node.to_document()).unwrap();
        assert_eq!(decoded, node);
    }
}
