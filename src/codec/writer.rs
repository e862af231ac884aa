//! [`Specification`] → document.
//!
//! The writer owns exactly five sections. When merging into an existing
//! document every other key, including keys inside the wrapper, survives.

use crate::codec::keys;
use crate::codec::{CodecWarning, SaveOutcome, Warnings};
use crate::spec::Specification;
use serde_json::{Map, Value, json};

/// Merge `specification` into `existing`, or build a fresh document.
///
/// A fresh document is unwrapped. An existing document that uses the wrapper
/// is written inside the wrapper. Non-mapping documents are replaced.
pub fn save(existing: Option<&Value>, specification: &Specification) -> SaveOutcome {
    let mut warnings = Warnings::default();

    let mut root = match existing {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    };
    let wrapped = root.get(keys::WRAPPER).is_some_and(Value::is_object);
    if wrapped {
        if let Some(Value::Object(inner)) = root.get_mut(keys::WRAPPER) {
            write_sections(inner, specification, &mut warnings);
        }
    } else {
        write_sections(&mut root, specification, &mut warnings);
    }

    tracing::debug!(
        wrapped,
        levels = specification.levels.len(),
        columns = specification.adequacy_columns.len(),
        "ranking specification written"
    );

    SaveOutcome {
        document: Value::Object(root),
        warnings: warnings.into_inner(),
    }
}

fn write_sections(
    target: &mut Map<String, Value>,
    specification: &Specification,
    warnings: &mut Warnings,
) {
    target.insert(keys::HEADERS.to_string(), headers_section(specification));
    target.insert(
        keys::ADEQUACY_COLUMNS.to_string(),
        columns_section(specification),
    );
    target.insert(keys::LEVELS.to_string(), levels_section(specification));
    target.insert(
        keys::LEVEL_COLORS.to_string(),
        colors_section(specification, warnings),
    );
    target.insert(
        keys::GUIDELINES.to_string(),
        guidelines_section(specification),
    );
}

fn headers_section(specification: &Specification) -> Value {
    json!({ keys::FIELDS: specification.header_names() })
}

fn columns_section(specification: &Specification) -> Value {
    let fields: Map<String, Value> = specification
        .adequacy_columns
        .iter()
        .map(|column| {
            (
                column.name.clone(),
                json!({ keys::COLUMN_TYPE: column.kind.as_str() }),
            )
        })
        .collect();
    json!({ keys::FIELDS: fields })
}

fn levels_section(specification: &Specification) -> Value {
    let fields: Map<String, Value> = specification
        .levels_by_rank_desc()
        .into_iter()
        .map(|level| {
            (
                level.name.clone(),
                json!({ keys::LEVEL_RANK: level.rank, keys::LEVEL_LABEL: level.label }),
            )
        })
        .collect();
    json!({ keys::FIELDS: fields })
}

fn colors_section(specification: &Specification, warnings: &mut Warnings) -> Value {
    let mut fields = Map::new();

    for color in specification.level_difference_colors.values() {
        let Some(name) = keys::name_for_range(&color.range) else {
            warnings.push(CodecWarning::DroppedLevelColor {
                bucket: color.bucket,
                range: color.range,
            });
            continue;
        };
        if fields.contains_key(name) {
            warnings.push(CodecWarning::CollidingLevelColor {
                bucket: color.bucket,
                name: name.to_string(),
            });
            continue;
        }
        fields.insert(
            name.to_string(),
            json!({ keys::COLOR_RGB: color.color, keys::COLOR_EXPLANATION: color.explanation }),
        );
    }

    for level in specification.levels.values() {
        if let Some(color) = &level.fixed_color {
            fields.insert(
                level.name.clone(),
                json!({
                    keys::COLOR_RGB: color,
                    keys::COLOR_EXPLANATION: level.fixed_color_description.clone().unwrap_or_default(),
                }),
            );
        }
    }

    json!({ keys::FIELDS: fields })
}

fn guidelines_section(specification: &Specification) -> Value {
    let entries: Map<String, Value> = specification
        .guidelines
        .iter()
        .map(|guideline| {
            let mut content = Map::new();
            content.insert(
                keys::GUIDELINE_DESCRIPTION.to_string(),
                Value::String(guideline.description.clone()),
            );
            if !guideline.per_level.is_empty() {
                content.insert(keys::GUIDELINE_LEVELS.to_string(), json!(guideline.per_level));
            }
            (guideline.name.clone(), Value::Object(content))
        })
        .collect();
    json!({ keys::GUIDELINE_ENTRIES: entries })
}
