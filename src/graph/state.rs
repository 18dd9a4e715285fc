//! Defines `State`, a node-local value that persists between evaluations.

use crate::store::{Attributes, AttributeSpec, Entity, EntityKind, FieldType, Schema};
use serde_json::Value;

/// How a state advances, as far as the document says.
///
/// Both `value` and `time_derivative` may be present at once. No precedence
/// is chosen here: the pair is handed to the evaluator as `Ambiguous`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateUpdate<'a> {
    Unspecified,
    /// Next value in terms of inputs, functions and the *previous* state values.
    Value(&'a str),
    /// ds/dt, with time in seconds.
    TimeDerivative(&'a str),
    Ambiguous { value: &'a str, time_derivative: &'a str },
}

#[derive(Debug, Clone, PartialEq)]
pub struct State {
    id: String,
    attributes: Attributes,
}

impl State {
    pub fn new(id: impl Into<String>) -> Self {
        Self::create(id.into())
    }

    pub fn with_default_initial_value(mut self, expression: impl Into<String>) -> Self {
        self.attributes.insert("default_initial_value", Value::String(expression.into()));
        self
    }

    pub fn with_value(mut self, expression: impl Into<String>) -> Self {
        self.attributes.insert("value", Value::String(expression.into()));
        self
    }

    pub fn with_time_derivative(mut self, expression: impl Into<String>) -> Self {
        self.attributes.insert("time_derivative", Value::String(expression.into()));
        self
    }

    pub fn default_initial_value(&self) -> Option<&str> { self.attributes.get_str("default_initial_value") }

    pub fn value(&self) -> Option<&str> { self.attributes.get_str("value") }

    pub fn time_derivative(&self) -> Option<&str> { self.attributes.get_str("time_derivative") }

    pub fn update_rule(&self) -> StateUpdate<'_> {
        match (self.value(), self.time_derivative()) {
            (None, None) => StateUpdate::Unspecified,
            (Some(value), None) => StateUpdate::Value(value),
            (None, Some(derivative)) => StateUpdate::TimeDerivative(derivative),
            (Some(value), Some(time_derivative)) => StateUpdate::Ambiguous { value, time_derivative },
        }
    }
}

impl Entity for State {
    const SCHEMA: &'static Schema = &Schema {
        kind: EntityKind::State,
        attributes: &[
            AttributeSpec {
                name: "default_initial_value",
                description: "The initial value of the state variable",
                ty: FieldType::Expression,
            },
            AttributeSpec {
                name: "value",
                description: "The next value of the state variable, in terms of the inputs, functions and PREVIOUS state values",
                ty: FieldType::Expression,
            },
            AttributeSpec {
                name: "time_derivative",
                description: "How the state varies with time, i.e. ds/dt. Units of time are seconds.",
                ty: FieldType::Expression,
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, None, StateUpdate::Unspecified)]
    #[case(Some("s + 1"), None, StateUpdate::Value("s + 1"))]
    #[case(None, Some("-s"), StateUpdate::TimeDerivative("-s"))]
    #[case(Some("s + 1"), Some("-s"), StateUpdate::Ambiguous { value: "s + 1", time_derivative: "-s" })]
    fn test_update_rule(
        #[case] value: Option<&str>,
        #[case] derivative: Option<&str>,
        #[case] expected: StateUpdate<'static>,
    ) {
        let mut state = State::new("s").with_default_initial_value("0");
        if let Some(value) = value {
            state = state.with_value(value);
        }
        if let Some(derivative) = derivative {
            state = state.with_time_derivative(derivative);
        }
        assert_eq!(state.update_rule(), expected);
    }
}
