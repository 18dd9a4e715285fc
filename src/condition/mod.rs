//! The condition grammar: per-node run conditions and termination conditions.
pub mod rule;
pub mod set;

pub use rule::{Condition, ConditionKind, Dependencies, Dependency};
pub use set::ConditionSet;
