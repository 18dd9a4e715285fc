//! Text encodings of entity documents.
//!
//! Entities convert to and from a `serde_json::Value` tree themselves (see
//! `Entity::to_document`). This module only moves such trees in and out of
//! JSON and YAML text and files. Map order is preserved both ways.

use crate::error::{MdfError, Result};
use log::debug;
use serde_json::Value;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Picks the format from a file extension: `.json`, `.yaml` or `.yml`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("json") => Ok(DocumentFormat::Json),
            Some("yaml") | Some("yml") => Ok(DocumentFormat::Yaml),
            _ => Err(MdfError::UnsupportedFormat { path: path.to_path_buf() }),
        }
    }
}

pub fn parse(text: &str, format: DocumentFormat) -> Result<Value> {
    let value = match format {
        DocumentFormat::Json => serde_json::from_str(text)?,
        DocumentFormat::Yaml => serde_yaml::from_str(text)?,
    };
    Ok(value)
}

pub fn render(document: &Value, format: DocumentFormat, pretty: bool) -> Result<String> {
    let text = match (format, pretty) {
        (DocumentFormat::Json, true) => serde_json::to_string_pretty(document)?,
        (DocumentFormat::Json, false) => serde_json::to_string(document)?,
        (DocumentFormat::Yaml, _) => serde_yaml::to_string(document)?,
    };
    Ok(text)
}

pub fn read_file(path: &Path) -> Result<Value> {
    let format = DocumentFormat::from_path(path)?;
    let text = fs::read_to_string(path).map_err(|source| MdfError::Io { path: path.to_path_buf(), source })?;
    debug!(path:? = path, format:? = format; "Reading document");
    parse(&text, format)
}

pub fn write_file(path: &Path, document: &Value, pretty: bool) -> Result<()> {
    let format = DocumentFormat::from_path(path)?;
    let text = render(document, format, pretty)?;
    debug!(path:? = path, format:? = format; "Writing document");
    fs::write(path, text).map_err(|source| MdfError::Io { path: path.to_path_buf(), source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("model.json", Some(DocumentFormat::Json))]
    #[case("model.YAML", Some(DocumentFormat::Yaml))]
    #[case("dir/model.yml", Some(DocumentFormat::Yaml))]
    #[case("model.mdf", None)]
    #[case("model", None)]
    fn test_format_from_path(#[case] path: &str, #[case] expected: Option<DocumentFormat>) {
        assert_eq!(DocumentFormat::from_path(Path::new(path)).ok(), expected);
    }

    #[test]
    fn test_json_and_yaml_agree() {
        let document = json!({"M": {"graphs": {"G": {"nodes": {"N0": {"parameters": {"rate": 5, "gain": 0.5}}}}}}});
        let yaml = render(&document, DocumentFormat::Yaml, true).unwrap();
        assert_eq!(parse(&yaml, DocumentFormat::Yaml).unwrap(), document);
        let json = render(&document, DocumentFormat::Json, false).unwrap();
        assert_eq!(parse(&json, DocumentFormat::Json).unwrap(), document);
    }

    #[test]
    fn test_key_order_is_kept() {
        let text = r#"{"z": 1, "a": 2, "m": 3}"#;
        let value = parse(text, DocumentFormat::Json).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["z", "a", "m"]);
        assert_eq!(render(&value, DocumentFormat::Json, false).unwrap(), r#"{"z":1,"a":2,"m":3}"#);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = write_file(Path::new("model.txt"), &json!({}), true).unwrap_err();
        assert!(matches!(err, MdfError::UnsupportedFormat { .. }));
    }
}
