//! Property tests: decoding an encoded model gives the same model back.

use mdf_core::analysis::topology;
use mdf_core::{Condition, ConditionSet, Edge, Entity, Function, Graph, InputPort, Model, Node, OutputPort, State, WriteOptions};
use proptest::prelude::*;
use serde_json::{Map, Value};

// ===================
// Strategies
// ===================

#[derive(Debug, Clone)]
struct NodeShape {
    inputs: usize,
    outputs: usize,
    functions: usize,
    states: usize,
    parameters: Vec<(String, i64)>,
}

fn identifier() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,6}"
}

fn node_shape() -> impl Strategy<Value = NodeShape> {
    (0..3usize, 1..3usize, 0..2usize, 0..2usize, prop::collection::vec((identifier(), -1000i64..1000), 0..3)).prop_map(
        |(inputs, outputs, functions, states, parameters)| NodeShape { inputs, outputs, functions, states, parameters },
    )
}

fn build_node(id: String, shape: &NodeShape) -> Node {
    let parameters: Map<String, Value> = shape.parameters.iter().map(|(k, v)| (k.clone(), Value::from(*v))).collect();
    let mut node = Node::new(id);
    if !parameters.is_empty() {
        node = node.with_parameters(parameters);
    }
    for i in 0..shape.inputs {
        node.add_input_port(InputPort::new(format!("in{}", i)).with_shape("(1,)")).unwrap();
    }
    for i in 0..shape.functions {
        node.add_function(Function::new(format!("f{}", i), "linear").with_arg("slope", i as i64)).unwrap();
    }
    for i in 0..shape.states {
        node.add_state(State::new(format!("s{}", i)).with_default_initial_value("0").with_value("s0 + 1")).unwrap();
    }
    for i in 0..shape.outputs {
        node.add_output_port(OutputPort::new(format!("out{}", i)).with_value("1")).unwrap();
    }
    node
}

fn model_strategy() -> impl Strategy<Value = Model> {
    (
        prop::collection::vec(node_shape(), 1..5),
        prop::collection::vec((any::<prop::sample::Index>(), any::<prop::sample::Index>()), 0..6),
        any::<bool>(),
    )
        .prop_map(|(shapes, links, with_conditions)| {
            let mut graph = Graph::new("G");
            for (i, shape) in shapes.iter().enumerate() {
                graph.add_node(build_node(format!("N{}", i), shape)).unwrap();
            }
            for (j, (from, to)) in links.iter().enumerate() {
                let sender = from.index(shapes.len());
                let receiver = to.index(shapes.len());
                if shapes[receiver].inputs == 0 {
                    continue;
                }
                let edge = Edge::new(format!("e{}", j), format!("N{}", sender), "out0", format!("N{}", receiver), "in0");
                graph.add_edge(edge).unwrap();
            }
            if with_conditions {
                let conditions = ConditionSet::new()
                    .with_node_condition("N0", Condition::always())
                    .with_termination("trial", Condition::all([Condition::after_pass(2), Condition::not(Condition::never())]));
                graph = graph.with_conditions(conditions);
            }
            let mut model = Model::new("M");
            model.add_graph(graph).unwrap();
            model
        })
}

// ===================
// Properties
// ===================

proptest! {
    #[test]
    fn json_round_trip(model in model_strategy()) {
        let text = model.to_json_string(&WriteOptions::verbatim()).unwrap();
        prop_assert_eq!(Model::from_json_str(&text).unwrap(), model);
    }

    #[test]
    fn yaml_round_trip(model in model_strategy()) {
        let text = model.to_yaml_string(&WriteOptions::verbatim()).unwrap();
        prop_assert_eq!(Model::from_yaml_str(&text).unwrap(), model);
    }

    #[test]
    fn dependency_dict_covers_every_node(model in model_strategy()) {
        let graph = model.graph("G").unwrap();
        let deps = topology::dependency_dict(graph);
        prop_assert_eq!(deps.len(), graph.nodes().len());
        for (node, senders) in &deps {
            prop_assert!(graph.get_node(node).is_some());
            for sender in senders {
                prop_assert!(graph.get_node(sender).is_some());
            }
        }
    }

    #[test]
    fn free_inputs_are_unfed_ports(model in model_strategy()) {
        let graph = model.graph("G").unwrap();
        let free = graph.inputs();
        for edge in graph.edges().iter() {
            let fed = (edge.receiver().unwrap(), edge.receiver_port().unwrap());
            prop_assert!(!free.contains(&fed));
        }
        let ports: usize = graph.nodes().iter().map(|node| node.input_ports().len()).sum();
        prop_assert!(free.len() <= ports);
        prop_assert!(free.iter().all(|(node, _)| graph.get_node(node).map(Node::id).is_some()));
    }
}
