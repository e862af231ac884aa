//! Structural check of a ranking document against an embedded JSON Schema.
//!
//! Loading is lenient and defaults most problems away; this check reports
//! what the loader would have papered over so a caller can surface it.

use crate::codec::keys;
use crate::codec::sections;
use crate::error::{RankingError, Result};
use jsonschema::JSONSchema;
use serde_json::{Value, json};

fn entries_of(entry: Value) -> Value {
    json!({
        "type": ["object", "null"],
        "additionalProperties": { "type": ["object", "null"], "properties": entry }
    })
}

fn section_schema(payload_key: &str, payload: Value) -> Value {
    json!({
        "type": ["object", "null"],
        "properties": { payload_key: payload }
    })
}

fn document_schema() -> Value {
    let scalar = json!({ "type": ["string", "number", "boolean"] });
    let headers = section_schema(
        keys::FIELDS,
        json!({ "type": ["array", "null"], "items": scalar }),
    );
    let columns = section_schema(
        keys::FIELDS,
        entries_of(json!({
            keys::COLUMN_TYPE: { "enum": ["Text", "RichText", "Levels"] }
        })),
    );
    let levels = section_schema(
        keys::FIELDS,
        entries_of(json!({
            keys::LEVEL_RANK: { "type": "integer" },
            keys::LEVEL_LABEL: scalar
        })),
    );
    let colors = section_schema(
        keys::FIELDS,
        entries_of(json!({
            keys::COLOR_RGB: {
                "type": "string",
                "pattern": r"^\s*\d{1,3}\s*,\s*\d{1,3}\s*,\s*\d{1,3}\s*$"
            },
            keys::COLOR_EXPLANATION: scalar,
            keys::COLOR_RANGE: {
                "type": ["string", "integer"],
                "pattern": r"^\s*-?\d+\s*(;\s*-?\d+\s*)?$"
            }
        })),
    );
    let guidelines = section_schema(
        keys::GUIDELINE_ENTRIES,
        entries_of(json!({
            keys::GUIDELINE_DESCRIPTION: scalar,
            keys::GUIDELINE_LEVELS: {
                "type": ["object", "null"],
                "additionalProperties": scalar
            }
        })),
    );
    json!({
        "type": "object",
        "properties": {
            keys::HEADERS: headers,
            keys::ADEQUACY_COLUMNS: columns,
            keys::LEVELS: levels,
            keys::LEVEL_COLORS: colors,
            keys::GUIDELINES: guidelines
        }
    })
}

/// Structural problems in `document`, one line each; empty when clean.
///
/// The sections are checked where the loader finds them (inside the wrapper
/// when present). A non-mapping document yields a single finding.
pub fn validate_document_shape(document: &Value) -> Result<Vec<String>> {
    let schema = document_schema();
    let compiled =
        JSONSchema::compile(&schema).map_err(|err| RankingError::Schema(err.to_string()))?;

    let Some(root) = sections(document) else {
        return Ok(vec!["document root is not a mapping".to_string()]);
    };
    let target = Value::Object(root.clone());

    let findings = match compiled.validate(&target) {
        Ok(()) => Vec::new(),
        Err(errors) => errors
            .map(|err| {
                let at = err.instance_path.to_string();
                if at.is_empty() {
                    err.to_string()
                } else {
                    format!("{at}: {err}")
                }
            })
            .collect(),
    };
    Ok(findings)
}
