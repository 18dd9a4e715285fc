//! Graph topology queries: node lookup, dependency sets, free inputs and
//! evaluation order.
//!
//! Edges refer to nodes by identifier, so every query here resolves those
//! identifiers against the graph's node collection on the fly.

use crate::error::{MdfError, Result};
use crate::graph::{Graph, Node};
use crate::store::Entity;
use indexmap::{IndexMap, IndexSet};
use log::warn;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashSet, VecDeque};

/// Node identifier to the identifiers of the nodes it receives from.
pub type DependencyMap<'g> = IndexMap<&'g str, IndexSet<&'g str>>;

/// Linear scan of the graph's nodes. Identifiers are unique, so the first
/// match is the only one.
pub fn get_node<'g>(graph: &'g Graph, id: &str) -> Option<&'g Node> {
    graph.nodes().iter().find(|node| node.id() == id)
}

/// Every node maps to the distinct senders of the edges it receives.
///
/// Nodes without incoming edges map to an empty set. Cycles are not
/// detected here; see [`topological_order`].
pub fn dependency_dict(graph: &Graph) -> DependencyMap<'_> {
    let mut dependencies: DependencyMap<'_> =
        graph.nodes().iter().map(|node| (node.id(), IndexSet::new())).collect();

    for edge in graph.edges().iter() {
        let sender = edge.sender().and_then(|id| get_node(graph, id));
        let receiver = edge.receiver().and_then(|id| get_node(graph, id));
        match (sender, receiver) {
            (Some(sender), Some(receiver)) => {
                if let Some(senders) = dependencies.get_mut(receiver.id()) {
                    senders.insert(sender.id());
                }
            }
            _ => warn!(graph = graph.id(), edge = edge.id(); "Skipping edge with unresolved endpoint"),
        }
    }
    dependencies
}

/// The (node, input port) pairs no edge feeds, in node then port order.
pub fn inputs(graph: &Graph) -> Vec<(&str, &str)> {
    let fed: HashSet<(&str, &str)> = graph
        .edges()
        .iter()
        .filter_map(|edge| Some((edge.receiver()?, edge.receiver_port()?)))
        .collect();

    graph
        .nodes()
        .iter()
        .flat_map(|node| node.input_ports().ids().map(move |port| (node.id(), port)))
        .filter(|pair| !fed.contains(pair))
        .collect()
}

/// Orders the nodes so that every sender precedes its receivers.
///
/// # Errors
/// `CyclicGraph` if the edges close a cycle, naming one node on it.
pub fn topological_order(graph: &Graph) -> Result<Vec<&str>> {
    let dependencies = dependency_dict(graph);
    let mut dag: DiGraph<&str, ()> = DiGraph::with_capacity(dependencies.len(), graph.edges().len());
    let indices: IndexMap<&str, NodeIndex> = dependencies.keys().map(|&id| (id, dag.add_node(id))).collect();

    for (receiver, senders) in &dependencies {
        for sender in senders {
            dag.add_edge(indices[sender], indices[receiver], ());
        }
    }

    let order = toposort(&dag, None).map_err(|cycle| MdfError::CyclicGraph {
        graph: graph.id().to_string(),
        node: dag[cycle.node_id()].to_string(),
    })?;
    Ok(order.into_iter().map(|index| dag[index]).collect())
}

/// The start nodes plus every node reachable from them along edges, in
/// breadth-first order. Unknown start identifiers are ignored.
pub fn downstream_from<'g>(graph: &'g Graph, start: &[&str]) -> IndexSet<&'g str> {
    let mut receivers: IndexMap<&str, Vec<&str>> = IndexMap::new();
    for (receiver, senders) in dependency_dict(graph) {
        for sender in senders {
            receivers.entry(sender).or_default().push(receiver);
        }
    }

    let mut visited = IndexSet::new();
    let mut queue: VecDeque<&str> = start.iter().filter_map(|id| get_node(graph, id)).map(Node::id).collect();
    while let Some(node) = queue.pop_front() {
        if visited.insert(node) {
            if let Some(next) = receivers.get(node) {
                queue.extend(next.iter().copied());
            }
        }
    }
    visited
}
