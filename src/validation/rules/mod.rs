//! Individual validation rules, each run once per graph.
pub(crate) mod conditions;
pub(crate) mod cycles;
pub(crate) mod states;
