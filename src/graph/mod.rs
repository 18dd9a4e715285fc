//! Defines the model hierarchy: model, graphs, nodes, ports, functions, states and edges.
pub mod dag;
pub mod edge;
pub mod function;
pub mod model;
pub mod node;
pub mod port;
pub mod state;

// Re-export key types for convenient access
pub use dag::Graph;
pub use edge::Edge;
pub use function::Function;
pub use model::Model;
pub use node::Node;
pub use port::{InputPort, OutputPort};
pub use state::{State, StateUpdate};
