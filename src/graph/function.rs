//! Defines `Function`, a named call into the external function library.

use crate::store::{Attributes, AttributeSpec, Entity, EntityKind, FieldType, Schema};
use serde_json::{Map, Value};

/// A single value evaluated from input ports and earlier functions.
///
/// `function` names a computation the evaluation engine has registered
/// (`linear`, ...); `args` maps its parameter names to literals or to
/// expressions over sibling identifiers, e.g. `{"slope": 3}` or
/// `{"slope": "input_port_0 + 2"}`. Neither is interpreted here.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    id: String,
    attributes: Attributes,
}

impl Function {
    pub fn new(id: impl Into<String>, function: impl Into<String>) -> Self {
        let mut f = Self::create(id.into());
        f.attributes.insert("function", Value::String(function.into()));
        f
    }

    pub fn with_args(mut self, args: Map<String, Value>) -> Self {
        self.attributes.insert("args", Value::Object(args));
        self
    }

    pub fn with_arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut args = self.args().cloned().unwrap_or_default();
        args.insert(name.into(), value.into());
        self.attributes.insert("args", Value::Object(args));
        self
    }

    pub fn function(&self) -> Option<&str> { self.attributes.get_str("function") }

    pub fn args(&self) -> Option<&Map<String, Value>> { self.attributes.get_map("args") }
}

impl Entity for Function {
    const SCHEMA: &'static Schema = &Schema {
        kind: EntityKind::Function,
        attributes: &[
            AttributeSpec {
                name: "function",
                description: "Which of the built-in functions (linear etc.) this uses",
                ty: FieldType::String,
            },
            AttributeSpec {
                name: "args",
                description: "Values for each of the arguments of the function",
                ty: FieldType::Mapping,
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
