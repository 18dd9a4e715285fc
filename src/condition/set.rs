//! Defines `ConditionSet`, the per-graph bundle of node and termination conditions.

use super::rule::Condition;
use crate::error::{MdfError, Result};
use crate::store::{AttributeSpec, EntityKind, FieldType, Schema};
use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Non-default execution pattern of a graph.
///
/// Holds at most one condition per node identifier and at most one per
/// time scale. Node keys are *not* checked against any graph here; that is
/// left to the consumer (or to the strict validation mode).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionSet {
    node_specific: IndexMap<String, Condition>,
    termination: IndexMap<String, Condition>,
}

impl ConditionSet {
    pub const SCHEMA: &'static Schema = &Schema {
        kind: EntityKind::ConditionSet,
        attributes: &[
            AttributeSpec {
                name: "node_specific",
                description: "The Conditions corresponding to each Node",
                ty: FieldType::Mapping,
            },
            AttributeSpec {
                name: "termination",
                description: "The Conditions that indicate when model execution ends",
                ty: FieldType::Mapping,
            },
        ],
        children: &[],
    };

    pub fn new() -> Self { Self::default() }

    pub fn with_node_condition(mut self, node: impl Into<String>, condition: Condition) -> Self {
        self.set_node_condition(node, condition);
        self
    }

    pub fn with_termination(mut self, time_scale: impl Into<String>, condition: Condition) -> Self {
        self.set_termination(time_scale, condition);
        self
    }

    /// Attaches a condition to a node, returning the one it replaces.
    pub fn set_node_condition(&mut self, node: impl Into<String>, condition: Condition) -> Option<Condition> {
        self.node_specific.insert(node.into(), condition)
    }

    pub fn set_termination(&mut self, time_scale: impl Into<String>, condition: Condition) -> Option<Condition> {
        self.termination.insert(time_scale.into(), condition)
    }

    pub fn node_condition(&self, node: &str) -> Option<&Condition> {
        self.node_specific.get(node)
    }

    pub fn termination(&self, time_scale: &str) -> Option<&Condition> {
        self.termination.get(time_scale)
    }

    pub fn node_specific(&self) -> &IndexMap<String, Condition> { &self.node_specific }

    pub fn terminations(&self) -> &IndexMap<String, Condition> { &self.termination }

    pub fn is_empty(&self) -> bool {
        self.node_specific.is_empty() && self.termination.is_empty()
    }

    /// Node identifiers used as keys or referenced inside any condition.
    pub fn node_references(&self) -> Vec<&str> {
        let mut refs: Vec<&str> = self.node_specific.keys().map(String::as_str).collect();
        for condition in self.node_specific.values().chain(self.termination.values()) {
            refs.extend(condition.node_references());
        }
        refs
    }

    pub fn to_value(&self) -> Value {
        let mut wire = Map::new();
        if !self.node_specific.is_empty() {
            wire.insert("node_specific".to_string(), encode_map(&self.node_specific));
        }
        if !self.termination.is_empty() {
            wire.insert("termination".to_string(), encode_map(&self.termination));
        }
        Value::Object(wire)
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let wire = value
            .as_object()
            .ok_or_else(|| MdfError::schema(EntityKind::ConditionSet, "conditions", "expected a mapping"))?;
        let mut set = ConditionSet::new();
        for (name, field) in wire {
            set.set_attribute(name, field.clone())?;
        }
        Ok(set)
    }

    pub fn attribute(&self, name: &str) -> Result<Value> {
        match name {
            "node_specific" => Ok(encode_map(&self.node_specific)),
            "termination" => Ok(encode_map(&self.termination)),
            other => Err(MdfError::unknown(EntityKind::ConditionSet, other)),
        }
    }

    pub fn set_attribute(&mut self, name: &str, value: Value) -> Result<()> {
        let spec = Self::SCHEMA.check_assignment(name, &value)?;
        let decoded = match &value {
            Value::Object(entries) => decode_map(entries)?,
            _ => IndexMap::new(),
        };
        match spec.name {
            "node_specific" => self.node_specific = decoded,
            _ => self.termination = decoded,
        }
        Ok(())
    }
}

fn encode_map(conditions: &IndexMap<String, Condition>) -> Value {
    Value::Object(
        conditions
            .iter()
            .map(|(key, condition)| (key.clone(), condition.to_value()))
            .collect(),
    )
}

fn decode_map(entries: &Map<String, Value>) -> Result<IndexMap<String, Condition>> {
    entries
        .iter()
        .map(|(key, wire)| Ok((key.clone(), Condition::from_value(wire)?)))
        .collect()
}

impl Serialize for ConditionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ConditionSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        ConditionSet::from_value(&value).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> ConditionSet {
        ConditionSet::new()
            .with_node_condition("B", Condition::every_n_calls("A", 2))
            .with_termination("environment_state_update", Condition::after_n_calls("B", 4))
    }

    #[test]
    fn test_wire_shape() {
        assert_eq!(
            sample().to_value(),
            json!({
                "node_specific": {"B": {"type": "EveryNCalls", "args": {"dependency": "A", "n": 2}}},
                "termination": {"environment_state_update": {"type": "AfterNCalls", "args": {"dependency": "B", "n": 4}}}
            })
        );
    }

    #[test]
    fn test_round_trip() {
        let set = sample();
        assert_eq!(ConditionSet::from_value(&set.to_value()).unwrap(), set);
    }

    #[test]
    fn test_one_condition_per_node() {
        let mut set = sample();
        let replaced = set.set_node_condition("B", Condition::always());
        assert_eq!(replaced, Some(Condition::every_n_calls("A", 2)));
        assert_eq!(set.node_specific().len(), 1);
        assert_eq!(set.node_condition("B"), Some(&Condition::always()));
    }

    #[test]
    fn test_unknown_node_keys_are_not_checked() {
        let set = ConditionSet::new().with_node_condition("nowhere", Condition::never());
        assert!(ConditionSet::from_value(&set.to_value()).is_ok());
    }

    #[test]
    fn test_undeclared_field_is_schema_violation() {
        let err = ConditionSet::from_value(&json!({"per_node": {}})).unwrap_err();
        assert!(matches!(err, MdfError::SchemaViolation { entity: EntityKind::ConditionSet, .. }));
        assert!(matches!(sample().attribute("per_node"), Err(MdfError::UnknownField { .. })));
    }

    #[test]
    fn test_node_references_include_nested_dependencies() {
        let set = sample();
        let refs = set.node_references();
        assert_eq!(refs, vec!["B", "A", "B"]);
    }
}
