//! Static queries over a graph's wiring.
pub mod topology;

pub use topology::{dependency_dict, downstream_from, get_node, inputs, topological_order, DependencyMap};
