//! Configuration values threaded explicitly into serialization and validation.
//!
//! Nothing in this crate reads version strings or settings from process-wide
//! state; callers build these values (or take the defaults) and pass them in.

use serde::{Deserialize, Serialize};

/// Version of the document format this crate reads and writes.
pub const FORMAT_VERSION: &str = "0.4";

/// Provenance strings stamped into a model's `format` and
/// `generating_application` attributes when metadata is included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub format: String,
    pub generating_application: String,
}

impl Default for Provenance {
    fn default() -> Self {
        Self {
            format: format!("ModECI MDF v{}", FORMAT_VERSION),
            generating_application: format!("Rust {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteOptions {
    /// Overwrite `format` and `generating_application` in the emitted
    /// document with `provenance`, whatever the model holds.
    pub include_metadata: bool,
    pub provenance: Provenance,
    /// Indented output. Only affects JSON; YAML is always block style.
    pub pretty: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            include_metadata: true,
            provenance: Provenance::default(),
            pretty: true,
        }
    }
}

impl WriteOptions {
    /// Writes the model exactly as it is, without stamping.
    pub fn verbatim() -> Self {
        Self { include_metadata: false, ..Self::default() }
    }
}

/// How far validation reaches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationMode {
    /// Condition node references are left to the consuming engine.
    #[default]
    Lenient,
    /// Condition node references must name nodes of the enclosing graph.
    Strict,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_provenance() {
        let provenance = Provenance::default();
        assert_eq!(provenance.format, "ModECI MDF v0.4");
        assert!(provenance.generating_application.starts_with("Rust mdf_core v"));
    }

    #[test]
    fn test_partial_options_fill_defaults() {
        let options: WriteOptions = serde_json::from_str(r#"{"include_metadata": false}"#).unwrap();
        assert_eq!(options, WriteOptions::verbatim());
    }
}
