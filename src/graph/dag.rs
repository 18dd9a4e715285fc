//! dag.rs
//! Defines `Graph`: nodes, the edges wiring them, and the optional condition set.
//! Node and edge storage is arena-like: edges refer to nodes and ports by
//! identifier only, resolved through `get_node`.

use super::edge::Edge;
use super::node::Node;
use crate::analysis::topology::{self, DependencyMap};
use crate::condition::ConditionSet;
use crate::error::{MdfError, Result};
use crate::store::{Attributes, AttributeSpec, ChildSpec, Collection, Entity, EntityKind, FieldType, Schema};
use serde_json::{Map, Value};

const NODES: ChildSpec = ChildSpec {
    name: "nodes",
    description: "The Nodes present in the Graph",
    kind: EntityKind::Node,
};
const EDGES: ChildSpec = ChildSpec {
    name: "edges",
    description: "The Edges between Nodes in the Graph",
    kind: EntityKind::Edge,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    id: String,
    attributes: Attributes,
    nodes: Collection<Node>,
    edges: Collection<Edge>,
}

impl Graph {
    pub fn new(id: impl Into<String>) -> Self {
        Self::create(id.into())
    }

    pub fn with_parameters(mut self, parameters: Map<String, Value>) -> Self {
        self.attributes.insert("parameters", Value::Object(parameters));
        self
    }

    pub fn with_conditions(mut self, conditions: ConditionSet) -> Self {
        self.set_conditions(conditions);
        self
    }

    pub fn parameters(&self) -> Option<&Map<String, Value>> { self.attributes.get_map("parameters") }

    /// Stores the set in its wire form.
    pub fn set_conditions(&mut self, conditions: ConditionSet) {
        self.attributes.insert("conditions", conditions.to_value());
    }

    pub fn conditions(&self) -> Result<Option<ConditionSet>> {
        self.attributes.get("conditions").map(ConditionSet::from_value).transpose()
    }

    pub fn add_node(&mut self, node: Node) -> Result<()> {
        self.nodes.push(node)
    }

    /// Appends an edge after checking that its endpoints exist in this graph.
    pub fn add_edge(&mut self, edge: Edge) -> Result<()> {
        self.check_edge(&edge)?;
        self.edges.push(edge)
    }

    pub fn nodes(&self) -> &Collection<Node> { &self.nodes }

    pub fn edges(&self) -> &Collection<Edge> { &self.edges }

    /// Finds a node by identifier. Identifiers are unique, so there is at most one.
    pub fn get_node(&self, id: &str) -> Option<&Node> {
        topology::get_node(self, id)
    }

    pub fn dependency_dict(&self) -> DependencyMap<'_> {
        topology::dependency_dict(self)
    }

    pub fn inputs(&self) -> Vec<(&str, &str)> {
        topology::inputs(self)
    }

    /// Resolves an edge's sender, receiver and both ports against this graph.
    pub fn check_edge(&self, edge: &Edge) -> Result<()> {
        let dangling = |field: &'static str, target: &str| MdfError::DanglingReference {
            entity: EntityKind::Edge,
            id: edge.id().to_string(),
            field,
            target: target.to_string(),
        };
        let required = |field: &'static str, value: Option<&str>| {
            value.map(str::to_string).ok_or_else(|| MdfError::schema(EntityKind::Edge, field, "is required"))
        };

        let sender_id = required("sender", edge.sender())?;
        let receiver_id = required("receiver", edge.receiver())?;
        let sender_port = required("sender_port", edge.sender_port())?;
        let receiver_port = required("receiver_port", edge.receiver_port())?;

        let sender = self.get_node(&sender_id).ok_or_else(|| dangling("sender", &sender_id))?;
        let receiver = self.get_node(&receiver_id).ok_or_else(|| dangling("receiver", &receiver_id))?;
        if sender.output_port(&sender_port).is_none() {
            return Err(dangling("sender_port", &sender_port));
        }
        if receiver.input_port(&receiver_port).is_none() {
            return Err(dangling("receiver_port", &receiver_port));
        }
        Ok(())
    }
}

impl Entity for Graph {
    const SCHEMA: &'static Schema = &Schema {
        kind: EntityKind::Graph,
        attributes: &[
            AttributeSpec {
                name: "parameters",
                description: "Dict of global parameters for the Graph",
                ty: FieldType::Mapping,
            },
            AttributeSpec {
                name: "conditions",
                description: "The ConditionSet for scheduling of the Graph",
                ty: FieldType::ConditionSet,
            },
        ],
        children: &[NODES, EDGES],
    };

    fn create(id: String) -> Self {
        Self {
            id,
            attributes: Attributes::new(),
            nodes: Collection::new(EntityKind::Graph, NODES.name),
            edges: Collection::new(EntityKind::Graph, EDGES.name),
        }
    }

    fn id(&self) -> &str { &self.id }

    fn attributes(&self) -> &Attributes { &self.attributes }

    fn attributes_mut(&mut self) -> &mut Attributes { &mut self.attributes }

    fn members(&self, collection: &'static ChildSpec) -> Vec<&str> {
        match collection.name {
            "nodes" => self.nodes.ids().collect(),
            "edges" => self.edges.ids().collect(),
            _ => Vec::new(),
        }
    }

    fn encode_members(&self, body: &mut Map<String, Value>) {
        self.nodes.encode_into(body);
        self.edges.encode_into(body);
    }

    fn decode_member(&mut self, collection: &'static ChildSpec, id: &str, body: &Map<String, Value>) -> Result<()> {
        match collection.name {
            "nodes" => self.add_node(Node::from_body(id, body)?),
            "edges" => self.add_edge(Edge::from_body(id, body)?),
            other => Err(MdfError::schema(EntityKind::Graph, other, "no such child collection")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;
    use crate::graph::{InputPort, OutputPort};
    use serde_json::json;

    fn node(id: &str, inputs: &[&str], outputs: &[&str]) -> Node {
        let mut node = Node::new(id);
        for port in inputs {
            node.add_input_port(InputPort::new(*port)).unwrap();
        }
        for port in outputs {
            node.add_output_port(OutputPort::new(*port).with_value("in0")).unwrap();
        }
        node
    }

    fn two_nodes() -> Graph {
        let mut graph = Graph::new("G");
        graph.add_node(node("A", &["in0"], &["out0"])).unwrap();
        graph.add_node(node("B", &["in0"], &[])).unwrap();
        graph
    }

    #[test]
    fn test_edges_are_checked_eagerly() {
        let mut graph = two_nodes();
        graph.add_edge(Edge::new("e0", "A", "out0", "B", "in0")).unwrap();

        let cases = [
            (Edge::new("e1", "X", "out0", "B", "in0"), "sender"),
            (Edge::new("e2", "A", "out0", "Y", "in0"), "receiver"),
            (Edge::new("e3", "A", "out9", "B", "in0"), "sender_port"),
            (Edge::new("e4", "A", "out0", "B", "in9"), "receiver_port"),
            // Ports must have the right direction.
            (Edge::new("e5", "A", "in0", "B", "in0"), "sender_port"),
        ];
        for (edge, expected) in cases {
            match graph.add_edge(edge) {
                Err(MdfError::DanglingReference { field, .. }) => assert_eq!(field, expected),
                other => panic!("expected a dangling reference on {}, got {:?}", expected, other),
            }
        }
        assert_eq!(graph.edges().len(), 1);
    }

    #[test]
    fn test_duplicate_node_identifier() {
        let mut graph = two_nodes();
        let err = graph.add_node(Node::new("A")).unwrap_err();
        assert!(matches!(err, MdfError::DuplicateIdentifier { entity: EntityKind::Graph, collection: "nodes", .. }));
    }

    #[test]
    fn test_duplicate_edge_identifier() {
        let mut graph = two_nodes();
        graph.add_edge(Edge::new("e0", "A", "out0", "B", "in0")).unwrap();
        let err = graph.add_edge(Edge::new("e0", "A", "out0", "B", "in0")).unwrap_err();
        assert!(matches!(err, MdfError::DuplicateIdentifier { entity: EntityKind::Graph, collection: "edges", .. }));
        assert_eq!(graph.edges().len(), 1);
    }

    #[test]
    fn test_decoded_conditions_are_stored_canonically() {
        let document = json!({"G": {"conditions": {
            "termination": {"t": {"args": {"n": 2}, "type": "AfterPass"}},
            "node_specific": {"A": {"type": "Always"}, "B": {"type": "Never", "args": null}}
        }}});
        let graph = Graph::from_document(&document).unwrap();
        let conditions = &graph.to_document()["G"]["conditions"];
        assert_eq!(
            conditions,
            &json!({
                "node_specific": {"A": {"type": "Always", "args": {}}, "B": {"type": "Never", "args": {}}},
                "termination": {"t": {"type": "AfterPass", "args": {"n": 2}}}
            })
        );

        let keys = |value: &Value| value.as_object().unwrap().keys().cloned().collect::<Vec<_>>();
        assert_eq!(keys(conditions), ["node_specific", "termination"]);
        assert_eq!(keys(&conditions["termination"]["t"]), ["type", "args"]);
    }

    #[test]
    fn test_conditions_attribute() {
        let conditions = ConditionSet::new().with_node_condition("B", Condition::every_n_calls("A", 1));
        let graph = two_nodes().with_conditions(conditions.clone());
        assert_eq!(graph.conditions().unwrap(), Some(conditions));
        assert_eq!(Graph::new("empty").conditions().unwrap(), None);
    }

    #[test]
    fn test_malformed_conditions_are_rejected_on_assignment() {
        let mut graph = two_nodes();
        let err = graph
            .set_attribute("conditions", json!({"node_specific": {"B": {"type": "Sometimes"}}}))
            .unwrap_err();
        assert!(matches!(err, MdfError::SchemaViolation { entity: EntityKind::Condition, .. }));
        assert!(graph.attribute("conditions").unwrap().is_none());
    }

    #[test]
    fn test_decode_resolves_edges_after_nodes() {
        // Edges listed before nodes in the document still resolve.
        let document = json!({"G": {
            "edges": {"e0": {"sender": "A", "receiver": "B", "sender_port": "out0", "receiver_port": "in0"}},
            "nodes": {
                "A": {"output_ports": {"out0": {"value": "1"}}},
                "B": {"input_ports": {"in0": {}}}
            }
        }});
        let graph = Graph::from_document(&document).unwrap();
        assert_eq!(graph.nodes().len(), 2);
        assert_eq!(graph.edges().len(), 1);
    }

    #[test]
    fn test_decode_rejects_missing_wiring() {
        let document = json!({"G": {
            "nodes": {"A": {"output_ports": {"out0": {}}}},
            "edges": {"e0": {"sender": "A", "sender_port": "out0"}}
        }});
        let err = Graph::from_document(&document).unwrap_err();
        assert!(matches!(err, MdfError::SchemaViolation { entity: EntityKind::Edge, .. }));
    }
}
