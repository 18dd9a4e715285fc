//! The declared-field machinery shared by every identified entity.
//!
//! Concrete entities keep their attribute values in an [`Attributes`] bag and
//! their children in typed [`Collection`]s. The [`Entity`] trait ties both to
//! the type's static [`Schema`] so that assignment, reads, appends and
//! document decoding are all validated in one place.

use super::types::{ChildSpec, EntityKind, FieldType, Schema};
use crate::condition::ConditionSet;
use crate::error::{MdfError, Result};
use indexmap::IndexMap;
use log::trace;
use serde_json::{Map, Value};

/// Attribute values of one entity, keyed by declared name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    values: IndexMap<&'static str, Value>,
}

impl Attributes {
    pub fn new() -> Self { Self::default() }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn get_map(&self, name: &str) -> Option<&Map<String, Value>> {
        self.get(name).and_then(Value::as_object)
    }

    pub fn len(&self) -> usize { self.values.len() }

    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    /// Stores a value without consulting the schema. `null` clears the slot.
    /// Callers are the typed builders and `Entity::set_attribute`, both of
    /// which only pass declared names.
    pub(crate) fn insert(&mut self, name: &'static str, value: Value) {
        if value.is_null() {
            self.values.shift_remove(name);
        } else {
            self.values.insert(name, value);
        }
    }
}

/// An ordered, identifier-indexed child collection.
///
/// Identifiers are unique within the collection; uniqueness is enforced here,
/// at append time, rather than by the entity being appended.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    owner: EntityKind,
    name: &'static str,
    items: IndexMap<String, T>,
}

impl<T: Entity> Collection<T> {
    pub fn new(owner: EntityKind, name: &'static str) -> Self {
        Self { owner, name, items: IndexMap::new() }
    }

    pub fn name(&self) -> &'static str { self.name }

    pub fn push(&mut self, item: T) -> Result<()> {
        let id = item.id().to_string();
        if id.is_empty() {
            return Err(MdfError::schema(
                T::SCHEMA.kind,
                "id",
                format!("identifiers in '{}' must be non-empty", self.name),
            ));
        }
        if self.items.contains_key(&id) {
            return Err(MdfError::DuplicateIdentifier {
                entity: self.owner,
                collection: self.name,
                id,
            });
        }
        self.items.insert(id, item);
        Ok(())
    }

    pub fn contains(&self, id: &str) -> bool { self.items.contains_key(id) }

    pub fn get(&self, id: &str) -> Option<&T> { self.items.get(id) }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ { self.items.values() }

    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ { self.items.keys().map(String::as_str) }

    pub fn len(&self) -> usize { self.items.len() }

    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    /// Renders the collection under its own name, or nothing when empty.
    pub(crate) fn encode_into(&self, body: &mut Map<String, Value>) {
        if self.items.is_empty() {
            return;
        }
        let members: Map<String, Value> = self
            .items
            .iter()
            .map(|(id, item)| (id.clone(), Value::Object(item.to_body())))
            .collect();
        body.insert(self.name.to_string(), Value::Object(members));
    }
}

// Order is part of a collection's identity, unlike plain `IndexMap` equality.
impl<T: PartialEq> PartialEq for Collection<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.items.len() == other.items.len() && self.items.iter().eq(other.items.iter())
    }
}

/// An identified entity with a static attribute/child schema.
pub trait Entity: Sized {
    const SCHEMA: &'static Schema;

    /// A fresh entity with no attributes and empty collections.
    fn create(id: String) -> Self;

    fn id(&self) -> &str;

    fn attributes(&self) -> &Attributes;

    fn attributes_mut(&mut self) -> &mut Attributes;

    /// Identifiers of the members of a declared collection, in order.
    fn members(&self, _collection: &'static ChildSpec) -> Vec<&str> {
        Vec::new()
    }

    fn encode_members(&self, _body: &mut Map<String, Value>) {}

    /// Decodes one member document and appends it to the named collection.
    fn decode_member(&mut self, collection: &'static ChildSpec, _id: &str, _body: &Map<String, Value>) -> Result<()> {
        Err(MdfError::schema(Self::SCHEMA.kind, collection.name, "no such child collection"))
    }

    /// Type-specific constraint on an assignment that already passed the schema.
    fn check_attribute(&self, _name: &'static str, _value: &Value) -> Result<()> {
        Ok(())
    }

    fn kind(&self) -> EntityKind { Self::SCHEMA.kind }

    /// Reads a declared attribute. `Ok(None)` means declared but unset.
    fn attribute(&self, name: &str) -> Result<Option<&Value>> {
        let spec = Self::SCHEMA
            .attribute(name)
            .ok_or_else(|| MdfError::unknown(Self::SCHEMA.kind, name))?;
        Ok(self.attributes().get(spec.name))
    }

    fn set_attribute(&mut self, name: &str, value: Value) -> Result<()> {
        let spec = Self::SCHEMA.check_assignment(name, &value)?;
        // Condition sets are kept in their canonical `{type, args}` form.
        let value = if spec.ty == FieldType::ConditionSet && !value.is_null() {
            ConditionSet::from_value(&value)?.to_value()
        } else {
            value
        };
        self.check_attribute(spec.name, &value)?;
        self.attributes_mut().insert(spec.name, value);
        Ok(())
    }

    fn collection(&self, name: &str) -> Result<Vec<&str>> {
        let spec = Self::SCHEMA.collection(name)?;
        Ok(self.members(spec))
    }

    /// Appends a `{ "<id>": { ... } }` document to a declared collection.
    fn append_child(&mut self, collection: &str, document: &Value) -> Result<()> {
        let spec = Self::SCHEMA
            .child(collection)
            .ok_or_else(|| MdfError::schema(Self::SCHEMA.kind, collection, "is not a declared child collection"))?;
        let (id, body) = single_entry(spec.kind, document)?;
        self.decode_member(spec, id, body)
    }

    /// The entity's fields without its identifier: attributes in declaration
    /// order, then non-empty collections in declaration order.
    fn to_body(&self) -> Map<String, Value> {
        let mut body = Map::new();
        for spec in Self::SCHEMA.attributes {
            if let Some(value) = self.attributes().get(spec.name) {
                body.insert(spec.name.to_string(), value.clone());
            }
        }
        self.encode_members(&mut body);
        body
    }

    fn to_document(&self) -> Value {
        let mut document = Map::new();
        document.insert(self.id().to_string(), Value::Object(self.to_body()));
        Value::Object(document)
    }

    fn from_body(id: &str, body: &Map<String, Value>) -> Result<Self> {
        let schema = Self::SCHEMA;
        if id.is_empty() {
            return Err(MdfError::schema(schema.kind, "id", "identifiers must be non-empty"));
        }
        if let Some(key) = body.keys().find(|key| !schema.declares(key)) {
            return Err(MdfError::schema(schema.kind, key.as_str(), "is not a declared attribute or collection"));
        }

        let mut entity = Self::create(id.to_string());
        for spec in schema.attributes {
            if let Some(value) = body.get(spec.name) {
                entity.set_attribute(spec.name, value.clone())?;
            }
        }

        // Declaration order, not document order: edges resolve against nodes.
        for spec in schema.children {
            let Some(members) = body.get(spec.name) else { continue };
            let members = members.as_object().ok_or_else(|| {
                MdfError::schema(schema.kind, spec.name, "expected a mapping of identifier to entity")
            })?;
            for (member_id, member_body) in members {
                let member_body = member_body.as_object().ok_or_else(|| {
                    MdfError::schema(spec.kind, member_id.as_str(), "expected an entity mapping")
                })?;
                trace!(parent = id, collection = spec.name, member = member_id.as_str(); "Decoding member");
                entity.decode_member(spec, member_id, member_body)?;
            }
        }
        Ok(entity)
    }

    fn from_document(document: &Value) -> Result<Self> {
        let (id, body) = single_entry(Self::SCHEMA.kind, document)?;
        Self::from_body(id, body)
    }
}

fn single_entry(kind: EntityKind, document: &Value) -> Result<(&str, &Map<String, Value>)> {
    let entries = document
        .as_object()
        .ok_or_else(|| MdfError::schema(kind, "document", "expected a mapping"))?;
    let mut iter = entries.iter();
    match (iter.next(), iter.next()) {
        (Some((id, Value::Object(body))), None) => Ok((id.as_str(), body)),
        (Some((id, _)), None) => Err(MdfError::schema(kind, id.as_str(), "expected an entity mapping")),
        _ => Err(MdfError::schema(kind, "document", "expected exactly one entity keyed by its identifier")),
    }
}
