//! Defines `Model`, the root of a document: graphs plus provenance metadata.

use super::dag::Graph;
use crate::config::{Provenance, WriteOptions};
use crate::document::{self, DocumentFormat};
use crate::error::{MdfError, Result};
use crate::store::{Attributes, AttributeSpec, ChildSpec, Collection, Entity, EntityKind, FieldType, Schema};
use log::debug;
use serde_json::{Map, Value};
use std::path::Path;

const GRAPHS: ChildSpec = ChildSpec {
    name: "graphs",
    description: "The list of Graphs in this Model",
    kind: EntityKind::Graph,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    id: String,
    attributes: Attributes,
    graphs: Collection<Graph>,
}

impl Model {
    pub fn new(id: impl Into<String>) -> Self {
        Self::create(id.into())
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.attributes.insert("format", Value::String(format.into()));
        self
    }

    pub fn with_generating_application(mut self, application: impl Into<String>) -> Self {
        self.attributes.insert("generating_application", Value::String(application.into()));
        self
    }

    pub fn format(&self) -> Option<&str> { self.attributes.get_str("format") }

    pub fn generating_application(&self) -> Option<&str> { self.attributes.get_str("generating_application") }

    pub fn add_graph(&mut self, graph: Graph) -> Result<()> {
        self.graphs.push(graph)
    }

    pub fn graphs(&self) -> &Collection<Graph> { &self.graphs }

    pub fn graph(&self, id: &str) -> Option<&Graph> { self.graphs.get(id) }

    /// Overwrites `format` and `generating_application`, replacing any values
    /// set by hand.
    pub fn include_metadata(&mut self, provenance: &Provenance) {
        self.attributes.insert("format", Value::String(provenance.format.clone()));
        self.attributes
            .insert("generating_application", Value::String(provenance.generating_application.clone()));
    }

    /// The model's document, stamped with provenance if the options ask for
    /// it. The model itself is left as it is.
    pub fn to_document_with(&self, options: &WriteOptions) -> Value {
        if !options.include_metadata {
            return self.to_document();
        }
        let mut body = Map::new();
        body.insert("format".to_string(), Value::String(options.provenance.format.clone()));
        body.insert(
            "generating_application".to_string(),
            Value::String(options.provenance.generating_application.clone()),
        );
        for (key, value) in self.to_body() {
            if !body.contains_key(&key) {
                body.insert(key, value);
            }
        }
        let mut document = Map::new();
        document.insert(self.id.clone(), Value::Object(body));
        Value::Object(document)
    }

    pub fn to_json_string(&self, options: &WriteOptions) -> Result<String> {
        document::render(&self.to_document_with(options), DocumentFormat::Json, options.pretty)
    }

    pub fn to_yaml_string(&self, options: &WriteOptions) -> Result<String> {
        document::render(&self.to_document_with(options), DocumentFormat::Yaml, options.pretty)
    }

    pub fn to_json_file(&self, path: impl AsRef<Path>, options: &WriteOptions) -> Result<()> {
        self.write_file(path.as_ref(), DocumentFormat::Json, options)
    }

    pub fn to_yaml_file(&self, path: impl AsRef<Path>, options: &WriteOptions) -> Result<()> {
        self.write_file(path.as_ref(), DocumentFormat::Yaml, options)
    }

    fn write_file(&self, path: &Path, expected: DocumentFormat, options: &WriteOptions) -> Result<()> {
        if DocumentFormat::from_path(path)? != expected {
            return Err(MdfError::UnsupportedFormat { path: path.to_path_buf() });
        }
        document::write_file(path, &self.to_document_with(options), options.pretty)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Self::from_text(text, DocumentFormat::Json)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Self::from_text(text, DocumentFormat::Yaml)
    }

    /// Reads a `.json`, `.yaml` or `.yml` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let document = document::read_file(path.as_ref())?;
        Self::decode(&document)
    }

    fn from_text(text: &str, format: DocumentFormat) -> Result<Self> {
        let document = document::parse(text, format)?;
        Self::decode(&document)
    }

    fn decode(document: &Value) -> Result<Self> {
        let model = Self::from_document(document)?;
        debug!(model = model.id.as_str(), graphs = model.graphs.len(); "Decoded model");
        Ok(model)
    }
}

impl Entity for Model {
    const SCHEMA: &'static Schema = &Schema {
        kind: EntityKind::Model,
        attributes: &[
            AttributeSpec {
                name: "format",
                description: "Information on the version of MDF used in this file",
                ty: FieldType::String,
            },
            AttributeSpec {
                name: "generating_application",
                description: "Information on what application generated/saved this file",
                ty: FieldType::String,
            },
        ],
        children: &[GRAPHS],
    };

    fn create(id: String) -> Self {
        Self {
            id,
            attributes: Attributes::new(),
            graphs: Collection::new(EntityKind::Model, GRAPHS.name),
        }
    }

    fn id(&self) -> &str { &self.id }

    fn attributes(&self) -> &Attributes { &self.attributes }

    fn attributes_mut(&mut self) -> &mut Attributes { &mut self.attributes }

    fn members(&self, collection: &'static ChildSpec) -> Vec<&str> {
        match collection.name {
            "graphs" => self.graphs.ids().collect(),
            _ => Vec::new(),
        }
    }

    fn encode_members(&self, body: &mut Map<String, Value>) {
        self.graphs.encode_into(body);
    }

    fn decode_member(&mut self, collection: &'static ChildSpec, id: &str, body: &Map<String, Value>) -> Result<()> {
        match collection.name {
            "graphs" => self.add_graph(Graph::from_body(id, body)?),
            other => Err(MdfError::schema(EntityKind::Model, other, "no such child collection")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metadata_is_stamped_only_into_the_output() {
        let model = Model::new("M").with_format("hand written").with_generating_application("notepad");
        let options = WriteOptions {
            provenance: Provenance { format: "F".into(), generating_application: "A".into() },
            ..WriteOptions::default()
        };
        assert_eq!(
            model.to_document_with(&options),
            json!({"M": {"format": "F", "generating_application": "A"}})
        );
        assert_eq!(model.format(), Some("hand written"));
        assert_eq!(
            model.to_document_with(&WriteOptions::verbatim()),
            json!({"M": {"format": "hand written", "generating_application": "notepad"}})
        );
    }

    #[test]
    fn test_include_metadata_replaces_fields() {
        let mut model = Model::new("M").with_format("old");
        model.include_metadata(&Provenance::default());
        assert_eq!(model.format(), Some(Provenance::default().format.as_str()));
        assert!(model.generating_application().is_some());
    }

    #[test]
    fn test_stamped_fields_lead_the_document() {
        let mut model = Model::new("M");
        model.add_graph(Graph::new("G")).unwrap();
        let document = model.to_document_with(&WriteOptions::default());
        let keys: Vec<&str> = document["M"].as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["format", "generating_application", "graphs"]);
    }

    #[test]
    fn test_duplicate_graph() {
        let mut model = Model::new("M");
        model.add_graph(Graph::new("G")).unwrap();
        let err = model.add_graph(Graph::new("G")).unwrap_err();
        assert!(matches!(err, MdfError::DuplicateIdentifier { entity: EntityKind::Model, collection: "graphs", .. }));
    }

    #[test]
    fn test_top_level_must_be_a_single_model() {
        let err = Model::from_json_str(r#"{"A": {}, "B": {}}"#).unwrap_err();
        assert!(matches!(err, MdfError::SchemaViolation { entity: EntityKind::Model, .. }));
        let err = Model::from_json_str(r#"{"A": {"graphs": {}, "version": 2}}"#).unwrap_err();
        assert!(matches!(err, MdfError::SchemaViolation { entity: EntityKind::Model, .. }));
    }
}
