//! Ranking document codec.
//!
//! `load` turns a parsed document into a [`Specification`], defaulting what
//! it can and failing only on unparseable level ranges. `save` merges a
//! specification back into a document, leaving every key it does not own
//! untouched. Findings that do not stop either direction are returned as
//! [`CodecWarning`]s and logged through `tracing`.

pub mod document;
pub mod keys;
pub mod reader;
pub mod shape;
pub mod writer;

pub use document::{
    DocumentFormat, DocumentStore, FileStore, MemoryStore, load_from_store, parse_document,
    render_document, save_to_store,
};
pub use reader::load;
pub use shape::validate_document_shape;
pub use writer::save;

use crate::spec::{DifferenceBucket, LevelRange, Specification};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
/// Non-fatal finding raised while loading or saving a document.
pub enum CodecWarning {
    /// A top-level section is absent; it loads as empty.
    MissingSection { section: String },
    /// A section exists but its payload has the wrong shape; it loads as empty.
    MalformedSection { section: String, reason: String },
    /// The colors section exists but lacks one of the three bucket entries.
    MissingLevelColor { name: String },
    /// A bucket's range matches no canonical range, so it was not written.
    DroppedLevelColor {
        bucket: DifferenceBucket,
        range: LevelRange,
    },
    /// A color entry's `rgb` is not an `r,g,b` triple; the text is kept as written.
    InvalidColor { name: String, raw: String },
    /// Two buckets resolved to the same reserved name; the later one was not written.
    CollidingLevelColor {
        bucket: DifferenceBucket,
        name: String,
    },
}

impl fmt::Display for CodecWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecWarning::MissingSection { section } => {
                write!(f, "ranking document is missing the '{section}' section")
            }
            CodecWarning::MissingLevelColor { name } => {
                write!(f, "level color '{name}' is not configured")
            }
            CodecWarning::MalformedSection { section, reason } => {
                write!(f, "section '{section}' ignored: {reason}")
            }
            CodecWarning::InvalidColor { name, raw } => {
                write!(f, "level color '{name}' has invalid rgb '{raw}'")
            }
            CodecWarning::DroppedLevelColor { bucket, range } => write!(
                f,
                "level color {bucket:?} with range '{range}' matches no reserved range and was not written"
            ),
            CodecWarning::CollidingLevelColor { bucket, name } => write!(
                f,
                "level color {bucket:?} would overwrite '{name}' and was not written"
            ),
        }
    }
}

#[derive(Clone, Debug)]
pub struct LoadOutcome {
    pub specification: Specification,
    pub warnings: Vec<CodecWarning>,
}

#[derive(Clone, Debug)]
pub struct SaveOutcome {
    pub document: Value,
    pub warnings: Vec<CodecWarning>,
}

/// Accumulates warnings and logs each one as it is raised.
#[derive(Default)]
pub(crate) struct Warnings(Vec<CodecWarning>);

impl Warnings {
    pub(crate) fn push(&mut self, warning: CodecWarning) {
        tracing::warn!(warning = %warning, "ranking document");
        self.0.push(warning);
    }

    pub(crate) fn into_inner(self) -> Vec<CodecWarning> {
        self.0
    }
}

/// Returns true when the document looks like a ranking specification.
///
/// Either the wrapper key holds a mapping, or the root itself carries at
/// least one recognized section key.
pub fn is_ranking_document(document: &Value) -> bool {
    let Some(root) = document.as_object() else {
        return false;
    };
    if root.get(keys::WRAPPER).is_some_and(Value::is_object) {
        return true;
    }
    keys::SECTIONS.iter().any(|section| root.contains_key(*section))
}

/// The mapping holding the sections: the wrapper value when it is a mapping,
/// else the root.
pub(crate) fn sections(document: &Value) -> Option<&Map<String, Value>> {
    let root = document.as_object()?;
    match root.get(keys::WRAPPER) {
        Some(Value::Object(inner)) => Some(inner),
        _ => Some(root),
    }
}

/// Text form of a scalar; mappings, sequences, and null have none.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
