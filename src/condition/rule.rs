//! Defines `Condition`, a declarative rule for when a node may run or when a
//! time scale ends.
//!
//! Internally a condition is a variant per kind, with typed composition
//! fields. On the wire every condition is exactly `{ "type": ..., "args": ... }`:
//! the composition fields `dependency`, `n` and `dependencies` are folded into
//! `args` under those names, so `type` + `args` alone carry the full meaning.

use crate::error::{MdfError, Result};
use crate::store::types::json_type_name;
use crate::store::{AttributeSpec, EntityKind, FieldType, Schema};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use smallvec::SmallVec;

pub(crate) const DEPENDENCY: &str = "dependency";
pub(crate) const N: &str = "n";
pub(crate) const DEPENDENCIES: &str = "dependencies";

const COMPOSITION_KEYS: [&str; 3] = [DEPENDENCY, N, DEPENDENCIES];

/// A reference from a composite condition: either a node, by identifier, or
/// another condition nested in place.
#[derive(Debug, Clone, PartialEq)]
pub enum Dependency {
    Node(String),
    Condition(Box<Condition>),
}

impl Dependency {
    pub fn node(id: impl Into<String>) -> Self {
        Dependency::Node(id.into())
    }

    pub fn to_value(&self) -> Value {
        match self {
            Dependency::Node(id) => Value::String(id.clone()),
            Dependency::Condition(condition) => condition.to_value(),
        }
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(id) => Ok(Dependency::Node(id.clone())),
            Value::Object(_) => Ok(Dependency::Condition(Box::new(Condition::from_value(value)?))),
            other => Err(MdfError::schema(
                EntityKind::Condition,
                DEPENDENCY,
                format!("expected a node identifier or a condition, found {}", json_type_name(other)),
            )),
        }
    }
}

impl From<Condition> for Dependency {
    fn from(condition: Condition) -> Self {
        Dependency::Condition(Box::new(condition))
    }
}

impl From<&str> for Dependency {
    fn from(id: &str) -> Self {
        Dependency::Node(id.to_string())
    }
}

pub type Dependencies = SmallVec<[Dependency; 4]>;

/// The fixed condition vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionKind {
    Always,
    Never,

    /// Satisfied on every `n`th call of `dependency`.
    EveryNCalls { dependency: Dependency, n: u64 },
    BeforeNCalls { dependency: Dependency, n: u64 },
    AtNCalls { dependency: Dependency, n: u64 },
    AfterNCalls { dependency: Dependency, n: u64 },

    EveryNPasses { n: u64 },
    BeforePass { n: u64 },
    AtPass { n: u64 },
    AfterPass { n: u64 },
    AfterNPasses { n: u64 },
    BeforeTrial { n: u64 },
    AtTrial { n: u64 },
    AfterTrial { n: u64 },
    AfterNTrials { n: u64 },

    /// Satisfied if `dependency` ran in the previous step.
    JustRan { dependency: Dependency },
    WhenFinished { dependency: Dependency },
    Not { dependency: Dependency },

    AllHaveRun { dependencies: Dependencies },
    WhenFinishedAny { dependencies: Dependencies },
    WhenFinishedAll { dependencies: Dependencies },
    /// Conjunction of the nested conditions.
    All { dependencies: Dependencies },
    /// Disjunction of the nested conditions.
    Any { dependencies: Dependencies },
}

impl ConditionKind {
    pub fn type_name(&self) -> &'static str {
        use ConditionKind::*;
        match self {
            Always => "Always",
            Never => "Never",
            EveryNCalls { .. } => "EveryNCalls",
            BeforeNCalls { .. } => "BeforeNCalls",
            AtNCalls { .. } => "AtNCalls",
            AfterNCalls { .. } => "AfterNCalls",
            EveryNPasses { .. } => "EveryNPasses",
            BeforePass { .. } => "BeforePass",
            AtPass { .. } => "AtPass",
            AfterPass { .. } => "AfterPass",
            AfterNPasses { .. } => "AfterNPasses",
            BeforeTrial { .. } => "BeforeTrial",
            AtTrial { .. } => "AtTrial",
            AfterTrial { .. } => "AfterTrial",
            AfterNTrials { .. } => "AfterNTrials",
            JustRan { .. } => "JustRan",
            WhenFinished { .. } => "WhenFinished",
            Not { .. } => "Not",
            AllHaveRun { .. } => "AllHaveRun",
            WhenFinishedAny { .. } => "WhenFinishedAny",
            WhenFinishedAll { .. } => "WhenFinishedAll",
            All { .. } => "All",
            Any { .. } => "Any",
        }
    }

    pub fn dependency(&self) -> Option<&Dependency> {
        use ConditionKind::*;
        match self {
            EveryNCalls { dependency, .. }
            | BeforeNCalls { dependency, .. }
            | AtNCalls { dependency, .. }
            | AfterNCalls { dependency, .. }
            | JustRan { dependency }
            | WhenFinished { dependency }
            | Not { dependency } => Some(dependency),
            _ => None,
        }
    }

    pub fn n(&self) -> Option<u64> {
        use ConditionKind::*;
        match self {
            EveryNCalls { n, .. }
            | BeforeNCalls { n, .. }
            | AtNCalls { n, .. }
            | AfterNCalls { n, .. }
            | EveryNPasses { n }
            | BeforePass { n }
            | AtPass { n }
            | AfterPass { n }
            | AfterNPasses { n }
            | BeforeTrial { n }
            | AtTrial { n }
            | AfterTrial { n }
            | AfterNTrials { n } => Some(*n),
            _ => None,
        }
    }

    pub fn dependencies(&self) -> Option<&[Dependency]> {
        use ConditionKind::*;
        match self {
            AllHaveRun { dependencies }
            | WhenFinishedAny { dependencies }
            | WhenFinishedAll { dependencies }
            | All { dependencies }
            | Any { dependencies } => Some(dependencies),
            _ => None,
        }
    }

    /// Builds a kind from its wire name, consuming the composition fields it uses.
    fn from_parts(type_name: &str, parts: &mut Parts) -> Result<Self> {
        use ConditionKind::*;
        let kind = match type_name {
            "Always" => Always,
            "Never" => Never,
            "EveryNCalls" => EveryNCalls { dependency: parts.dependency(type_name)?, n: parts.n(type_name)? },
            "BeforeNCalls" => BeforeNCalls { dependency: parts.dependency(type_name)?, n: parts.n(type_name)? },
            "AtNCalls" => AtNCalls { dependency: parts.dependency(type_name)?, n: parts.n(type_name)? },
            "AfterNCalls" => AfterNCalls { dependency: parts.dependency(type_name)?, n: parts.n(type_name)? },
            "EveryNPasses" => EveryNPasses { n: parts.n(type_name)? },
            "BeforePass" => BeforePass { n: parts.n(type_name)? },
            "AtPass" => AtPass { n: parts.n(type_name)? },
            "AfterPass" => AfterPass { n: parts.n(type_name)? },
            "AfterNPasses" => AfterNPasses { n: parts.n(type_name)? },
            "BeforeTrial" => BeforeTrial { n: parts.n(type_name)? },
            "AtTrial" => AtTrial { n: parts.n(type_name)? },
            "AfterTrial" => AfterTrial { n: parts.n(type_name)? },
            "AfterNTrials" => AfterNTrials { n: parts.n(type_name)? },
            "JustRan" => JustRan { dependency: parts.dependency(type_name)? },
            "WhenFinished" => WhenFinished { dependency: parts.dependency(type_name)? },
            "Not" => Not { dependency: parts.dependency(type_name)? },
            "AllHaveRun" => AllHaveRun { dependencies: parts.dependencies(type_name)? },
            "WhenFinishedAny" => WhenFinishedAny { dependencies: parts.dependencies(type_name)? },
            "WhenFinishedAll" => WhenFinishedAll { dependencies: parts.dependencies(type_name)? },
            "All" => All { dependencies: parts.dependencies(type_name)? },
            "Any" => Any { dependencies: parts.dependencies(type_name)? },
            other => {
                return Err(MdfError::schema(
                    EntityKind::Condition,
                    "type",
                    format!("'{}' is not in the condition vocabulary", other),
                ))
            }
        };
        parts.finish(type_name)?;
        Ok(kind)
    }
}

/// Composition fields awaiting a kind to claim them.
#[derive(Default)]
struct Parts {
    dependency: Option<Dependency>,
    n: Option<u64>,
    dependencies: Option<Dependencies>,
}

impl Parts {
    fn missing(type_name: &str, field: &'static str) -> MdfError {
        MdfError::schema(EntityKind::Condition, field, format!("required by '{}'", type_name))
    }

    fn dependency(&mut self, type_name: &str) -> Result<Dependency> {
        self.dependency.take().ok_or_else(|| Self::missing(type_name, DEPENDENCY))
    }

    fn n(&mut self, type_name: &str) -> Result<u64> {
        self.n.take().ok_or_else(|| Self::missing(type_name, N))
    }

    fn dependencies(&mut self, type_name: &str) -> Result<Dependencies> {
        self.dependencies.take().ok_or_else(|| Self::missing(type_name, DEPENDENCIES))
    }

    /// Anything left over was supplied to a kind that does not use it.
    fn finish(&self, type_name: &str) -> Result<()> {
        let unused = [
            (DEPENDENCY, self.dependency.is_some()),
            (N, self.n.is_some()),
            (DEPENDENCIES, self.dependencies.is_some()),
        ];
        match unused.iter().find(|(_, present)| *present) {
            Some((field, _)) => Err(MdfError::schema(
                EntityKind::Condition,
                *field,
                format!("not accepted by '{}'", type_name),
            )),
            None => Ok(()),
        }
    }

    fn take_from(args: &mut Map<String, Value>) -> Result<Self> {
        let mut parts = Parts::default();
        if let Some(value) = present(args.shift_remove(DEPENDENCY)) {
            parts.dependency = Some(Dependency::from_value(&value)?);
        }
        if let Some(value) = present(args.shift_remove(N)) {
            parts.n = Some(value.as_u64().ok_or_else(|| {
                MdfError::schema(EntityKind::Condition, N, "must be a non-negative integer")
            })?);
        }
        if let Some(value) = present(args.shift_remove(DEPENDENCIES)) {
            let items = value.as_array().ok_or_else(|| {
                MdfError::schema(EntityKind::Condition, DEPENDENCIES, "expected a sequence")
            })?;
            parts.dependencies = Some(items.iter().map(Dependency::from_value).collect::<Result<_>>()?);
        }
        Ok(parts)
    }
}

/// A `null` composition field counts as absent.
fn present(value: Option<Value>) -> Option<Value> {
    value.filter(|value| !value.is_null())
}

/// A condition: a kind from the vocabulary plus any kind-specific arguments
/// beyond the composition fields (for example `time_scale`).
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    kind: ConditionKind,
    extra_args: Map<String, Value>,
}

impl Condition {
    pub const SCHEMA: &'static Schema = &Schema {
        kind: EntityKind::Condition,
        attributes: &[
            AttributeSpec {
                name: "type",
                description: "The type of Condition from the library",
                ty: FieldType::String,
            },
            AttributeSpec {
                name: "args",
                description: "The dictionary of arguments needed to evaluate the Condition",
                ty: FieldType::Mapping,
            },
        ],
        children: &[],
    };

    pub fn new(kind: ConditionKind) -> Self {
        Self { kind, extra_args: Map::new() }
    }

    /// Builds a condition the way a document author writes one: a type name,
    /// free-form args, and the optional composition fields, which are folded
    /// into the args.
    pub fn compose(
        type_name: &str,
        args: Map<String, Value>,
        dependency: Option<Dependency>,
        n: Option<u64>,
        dependencies: Option<Vec<Dependency>>,
    ) -> Result<Self> {
        if let Some(key) = COMPOSITION_KEYS.iter().find(|key| args.contains_key(**key)) {
            return Err(MdfError::schema(
                EntityKind::Condition,
                *key,
                "composition fields must be passed separately, not inside args",
            ));
        }
        let mut parts = Parts {
            dependency,
            n,
            dependencies: dependencies.map(SmallVec::from_vec),
        };
        let kind = ConditionKind::from_parts(type_name, &mut parts)?;
        Ok(Self { kind, extra_args: args })
    }

    pub fn always() -> Self { Self::new(ConditionKind::Always) }

    pub fn never() -> Self { Self::new(ConditionKind::Never) }

    pub fn every_n_calls(dependency: impl Into<Dependency>, n: u64) -> Self {
        Self::new(ConditionKind::EveryNCalls { dependency: dependency.into(), n })
    }

    pub fn after_n_calls(dependency: impl Into<Dependency>, n: u64) -> Self {
        Self::new(ConditionKind::AfterNCalls { dependency: dependency.into(), n })
    }

    pub fn after_pass(n: u64) -> Self {
        Self::new(ConditionKind::AfterPass { n })
    }

    pub fn all_have_run<I, D>(nodes: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<Dependency>,
    {
        Self::new(ConditionKind::AllHaveRun { dependencies: nodes.into_iter().map(Into::into).collect() })
    }

    pub fn all<I: IntoIterator<Item = Condition>>(conditions: I) -> Self {
        Self::new(ConditionKind::All { dependencies: conditions.into_iter().map(Dependency::from).collect() })
    }

    pub fn any<I: IntoIterator<Item = Condition>>(conditions: I) -> Self {
        Self::new(ConditionKind::Any { dependencies: conditions.into_iter().map(Dependency::from).collect() })
    }

    pub fn not(condition: Condition) -> Self {
        Self::new(ConditionKind::Not { dependency: condition.into() })
    }

    /// Adds a kind-specific argument. Composition fields are rejected here;
    /// they belong to the kind.
    pub fn with_arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Result<Self> {
        let name = name.into();
        if COMPOSITION_KEYS.contains(&name.as_str()) {
            return Err(MdfError::schema(
                EntityKind::Condition,
                name,
                format!("is a composition field of '{}'", self.type_name()),
            ));
        }
        self.extra_args.insert(name, value.into());
        Ok(self)
    }

    pub fn kind(&self) -> &ConditionKind { &self.kind }

    pub fn type_name(&self) -> &'static str { self.kind.type_name() }

    /// Arguments other than the composition fields.
    pub fn extra_args(&self) -> &Map<String, Value> { &self.extra_args }

    /// The flattened `args`: composition fields first, then the rest.
    pub fn args(&self) -> Map<String, Value> {
        let mut args = Map::new();
        if let Some(dependency) = self.kind.dependency() {
            args.insert(DEPENDENCY.to_string(), dependency.to_value());
        }
        if let Some(n) = self.kind.n() {
            args.insert(N.to_string(), Value::from(n));
        }
        if let Some(dependencies) = self.kind.dependencies() {
            args.insert(
                DEPENDENCIES.to_string(),
                Value::Array(dependencies.iter().map(Dependency::to_value).collect()),
            );
        }
        for (name, value) in &self.extra_args {
            args.insert(name.clone(), value.clone());
        }
        args
    }

    pub fn to_value(&self) -> Value {
        let mut wire = Map::new();
        wire.insert("type".to_string(), Value::String(self.type_name().to_string()));
        wire.insert("args".to_string(), Value::Object(self.args()));
        Value::Object(wire)
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let wire = value
            .as_object()
            .ok_or_else(|| MdfError::schema(EntityKind::Condition, "condition", "expected a mapping"))?;
        if let Some(key) = wire.keys().find(|key| Self::SCHEMA.attribute(key).is_none()) {
            return Err(MdfError::schema(EntityKind::Condition, key.as_str(), "is not a declared attribute"));
        }
        for (name, field) in wire {
            Self::SCHEMA.check_assignment(name, field)?;
        }

        let type_name = wire
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| MdfError::schema(EntityKind::Condition, "type", "is required"))?;
        let args = wire.get("args").and_then(Value::as_object).cloned().unwrap_or_default();
        Self::from_wire(type_name, args)
    }

    fn from_wire(type_name: &str, mut args: Map<String, Value>) -> Result<Self> {
        let mut parts = Parts::take_from(&mut args)?;
        let kind = ConditionKind::from_parts(type_name, &mut parts)?;
        Ok(Self { kind, extra_args: args })
    }

    pub fn attribute(&self, name: &str) -> Result<Value> {
        match name {
            "type" => Ok(Value::String(self.type_name().to_string())),
            "args" => Ok(Value::Object(self.args())),
            other => Err(MdfError::unknown(EntityKind::Condition, other)),
        }
    }

    /// Reassigns `type` or `args`; the condition is rebuilt from the new wire
    /// pair and left untouched if that fails.
    pub fn set_attribute(&mut self, name: &str, value: Value) -> Result<()> {
        let spec = Self::SCHEMA.check_assignment(name, &value)?;
        let (type_name, args) = match (spec.name, value) {
            ("type", Value::String(type_name)) => (type_name, self.args()),
            ("args", Value::Object(args)) => (self.type_name().to_string(), args),
            ("args", Value::Null) => (self.type_name().to_string(), Map::new()),
            (field, _) => return Err(MdfError::schema(EntityKind::Condition, field, "cannot be cleared")),
        };
        *self = Self::from_wire(&type_name, args)?;
        Ok(())
    }

    /// Every node identifier this condition refers to, depth first.
    pub fn node_references(&self) -> Vec<&str> {
        let mut refs = Vec::new();
        self.collect_node_references(&mut refs);
        refs
    }

    fn collect_node_references<'a>(&'a self, refs: &mut Vec<&'a str>) {
        let single = self.kind.dependency().into_iter();
        let many = self.kind.dependencies().unwrap_or_default().iter();
        for dependency in single.chain(many) {
            match dependency {
                Dependency::Node(id) => refs.push(id.as_str()),
                Dependency::Condition(nested) => nested.collect_node_references(refs),
            }
        }
    }
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Condition::from_value(&value).map_err(D::Error::custom)
    }
}
