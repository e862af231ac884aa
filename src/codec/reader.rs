//! Document → [`Specification`].
//!
//! Each section is read independently. Absent or misshapen sections load as
//! empty with a warning, absent fields take documented defaults, and the
//! only hard failure is a declared `range` that cannot be parsed.

use crate::codec::keys;
use crate::codec::{CodecWarning, LoadOutcome, Warnings, scalar_text, sections};
use crate::error::{RankingError, Result};
use crate::spec::{
    AdequacyColumn, AdequacyColumnGuideline, ColumnKind, DescriptionHeader, DifferenceBucket,
    LevelDifferenceColor, LevelImportance, LevelKey, LevelRange, Rgb, Specification,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Read a ranking specification out of a parsed document.
///
/// Documents that are not mappings, or that carry none of the sections,
/// produce an empty specification with one warning per section.
pub fn load(document: &Value) -> Result<LoadOutcome> {
    let mut warnings = Warnings::default();
    let empty = Map::new();
    let root = sections(document).unwrap_or(&empty);

    let mut specification = Specification::default();

    if let Some(fields) = section_payload(root, keys::HEADERS, keys::FIELDS, &mut warnings) {
        specification.headers = read_headers(keys::HEADERS, fields, &mut warnings);
    }
    if let Some(fields) =
        section_payload(root, keys::ADEQUACY_COLUMNS, keys::FIELDS, &mut warnings)
    {
        specification.adequacy_columns = read_columns(keys::ADEQUACY_COLUMNS, fields, &mut warnings);
    }
    if let Some(fields) = section_payload(root, keys::LEVELS, keys::FIELDS, &mut warnings) {
        specification.levels = read_levels(keys::LEVELS, fields, &mut warnings);
    }
    // Colors run after levels: the fixed-color entries patch existing levels.
    if let Some(fields) = section_payload(root, keys::LEVEL_COLORS, keys::FIELDS, &mut warnings) {
        if let Some(entries) = expect_mapping(keys::LEVEL_COLORS, fields, &mut warnings) {
            specification.level_difference_colors =
                read_difference_colors(entries, &mut warnings)?;
            apply_fixed_colors(entries, &mut specification.levels, &mut warnings);
        }
    }
    if let Some(entries) =
        section_payload(root, keys::GUIDELINES, keys::GUIDELINE_ENTRIES, &mut warnings)
    {
        specification.guidelines = read_guidelines(keys::GUIDELINES, entries, &mut warnings);
    }

    Ok(LoadOutcome {
        specification,
        warnings: warnings.into_inner(),
    })
}

/// Payload under `section.payload_key`, or `None` after recording why not.
///
/// A present section whose payload key is missing or null is an empty
/// section, not a malformed one.
fn section_payload<'a>(
    root: &'a Map<String, Value>,
    section: &str,
    payload_key: &str,
    warnings: &mut Warnings,
) -> Option<&'a Value> {
    let Some(value) = root.get(section) else {
        warnings.push(CodecWarning::MissingSection {
            section: section.to_string(),
        });
        return None;
    };
    match value {
        Value::Object(map) => match map.get(payload_key) {
            None | Some(Value::Null) => None,
            Some(payload) => Some(payload),
        },
        Value::Null => None,
        _ => {
            warnings.push(CodecWarning::MalformedSection {
                section: section.to_string(),
                reason: "expected a mapping".to_string(),
            });
            None
        }
    }
}

fn expect_mapping<'a>(
    section: &str,
    value: &'a Value,
    warnings: &mut Warnings,
) -> Option<&'a Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        _ => {
            warnings.push(CodecWarning::MalformedSection {
                section: section.to_string(),
                reason: "expected named entries".to_string(),
            });
            None
        }
    }
}

fn read_headers(section: &str, fields: &Value, warnings: &mut Warnings) -> Vec<DescriptionHeader> {
    let Some(items) = fields.as_array() else {
        warnings.push(CodecWarning::MalformedSection {
            section: section.to_string(),
            reason: "expected a list of header names".to_string(),
        });
        return Vec::new();
    };
    items
        .iter()
        .filter_map(scalar_text)
        .map(|name| DescriptionHeader { name })
        .collect()
}

fn read_columns(section: &str, fields: &Value, warnings: &mut Warnings) -> Vec<AdequacyColumn> {
    let Some(entries) = expect_mapping(section, fields, warnings) else {
        return Vec::new();
    };
    entries
        .iter()
        .map(|(name, props)| AdequacyColumn {
            name: name.clone(),
            kind: props
                .get(keys::COLUMN_TYPE)
                .and_then(Value::as_str)
                .map(ColumnKind::from_str_lenient)
                .unwrap_or_default(),
        })
        .collect()
}

fn read_levels(
    section: &str,
    fields: &Value,
    warnings: &mut Warnings,
) -> BTreeMap<LevelKey, LevelImportance> {
    let Some(entries) = expect_mapping(section, fields, warnings) else {
        return BTreeMap::new();
    };
    entries
        .iter()
        .map(|(name, props)| {
            let key = LevelKey::new(name.clone());
            let level = LevelImportance {
                key: key.clone(),
                name: name.clone(),
                rank: props.get(keys::LEVEL_RANK).map(rank_or_zero).unwrap_or(0),
                label: props
                    .get(keys::LEVEL_LABEL)
                    .and_then(scalar_text)
                    .unwrap_or_else(|| keys::UNKNOWN_LABEL.to_string()),
                fixed_color: None,
                fixed_color_description: None,
            };
            (key, level)
        })
        .collect()
}

fn rank_or_zero(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n.as_i64().unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn read_difference_colors(
    entries: &Map<String, Value>,
    warnings: &mut Warnings,
) -> Result<BTreeMap<DifferenceBucket, LevelDifferenceColor>> {
    let mut colors = BTreeMap::new();
    for bucket in DifferenceBucket::ALL {
        let name = keys::bucket_name(bucket);
        let Some(props) = entries.get(name) else {
            warnings.push(CodecWarning::MissingLevelColor {
                name: name.to_string(),
            });
            continue;
        };
        let range = match props.get(keys::COLOR_RANGE).and_then(scalar_text) {
            Some(raw) => LevelRange::parse(&raw).map_err(|err| RankingError::MalformedRange {
                entry: name.to_string(),
                raw: raw.clone(),
                reason: err.to_string(),
            })?,
            None => keys::canonical_range(bucket),
        };
        let (color, explanation) = color_fields(name, props, warnings);
        colors.insert(
            bucket,
            LevelDifferenceColor {
                bucket,
                color,
                explanation,
                range,
            },
        );
    }
    Ok(colors)
}

/// `NotAddressed` / `NA` entries color the level with that exact key. Both
/// the entry and the level must exist; nothing is filled in for a missing
/// entry.
fn apply_fixed_colors(
    entries: &Map<String, Value>,
    levels: &mut BTreeMap<LevelKey, LevelImportance>,
    warnings: &mut Warnings,
) {
    for reserved in [keys::NOT_ADDRESSED, keys::NOT_APPLICABLE] {
        let Some(props) = entries.get(reserved) else {
            continue;
        };
        let Some(level) = levels.get_mut(&LevelKey::from(reserved)) else {
            continue;
        };
        let (color, explanation) = color_fields(reserved, props, warnings);
        level.fixed_color = Some(color);
        level.fixed_color_description = Some(explanation);
    }
}

fn color_fields(name: &str, props: &Value, warnings: &mut Warnings) -> (String, String) {
    let color = props
        .get(keys::COLOR_RGB)
        .and_then(scalar_text)
        .unwrap_or_else(|| keys::DEFAULT_RGB.to_string());
    if color.parse::<Rgb>().is_err() {
        warnings.push(CodecWarning::InvalidColor {
            name: name.to_string(),
            raw: color.clone(),
        });
    }
    let explanation = props
        .get(keys::COLOR_EXPLANATION)
        .and_then(scalar_text)
        .unwrap_or_default();
    (color, explanation)
}

fn read_guidelines(
    section: &str,
    entries: &Value,
    warnings: &mut Warnings,
) -> Vec<AdequacyColumnGuideline> {
    let Some(entries) = expect_mapping(section, entries, warnings) else {
        return Vec::new();
    };
    entries
        .iter()
        .filter(|(name, _)| !name.is_empty())
        .map(|(name, props)| AdequacyColumnGuideline {
            name: name.clone(),
            description: props
                .get(keys::GUIDELINE_DESCRIPTION)
                .and_then(scalar_text)
                .unwrap_or_else(|| keys::UNKNOWN_LABEL.to_string()),
            per_level: props
                .get(keys::GUIDELINE_LEVELS)
                .and_then(Value::as_object)
                .map(|levels| {
                    levels
                        .iter()
                        .filter_map(|(level, text)| Some((level.clone(), scalar_text(text)?)))
                        .collect()
                })
                .unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "Headers": {"fields": ["Model", "Scenario"]},
            "Adequacy Columns": {"fields": {
                "Code": {"type": "Levels"},
                "Notes": {"type": "RichText"},
                "Comment": {}
            }},
            "Levels": {"fields": {
                "High": {"level": 3, "label": "H"},
                "Med": {"level": "2", "label": "M"},
                "Low": {"level": 1},
                "NA": {"level": "n/a", "label": "Not applicable"}
            }},
            "Level Colors": {"fields": {
                "PosOrZero": {"rgb": "0,255,0", "explanation": "ok"},
                "OneLevel": {"rgb": "255,255,0"},
                "TwoLevelsOrMore": {"explanation": "gap"},
                "NA": {"rgb": "128,128,128", "explanation": "skipped"},
                "NotAddressed": {"rgb": "1,1,1"}
            }},
            "Guidelines": {"guidelines": {
                "Code": {"description": "Code maturity", "levels": {"High": "tested", "Low": "none"}},
                "Notes": {}
            }}
        })
    }

    #[test]
    fn reads_every_section_with_defaults() {
        let outcome = load(&sample()).unwrap();
        assert!(outcome.warnings.is_empty(), "{:?}", outcome.warnings);
        let spec = outcome.specification;

        assert_eq!(spec.header_names(), vec!["Model", "Scenario"]);

        let kinds: Vec<(&str, ColumnKind)> = spec
            .adequacy_columns
            .iter()
            .map(|c| (c.name.as_str(), c.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("Code", ColumnKind::LevelRef),
                ("Notes", ColumnKind::RichText),
                ("Comment", ColumnKind::Text)
            ]
        );

        let med = spec.level(&LevelKey::from("Med")).unwrap();
        assert_eq!(med.rank, 2);
        let low = spec.level(&LevelKey::from("Low")).unwrap();
        assert_eq!(low.label, "Unknown");
        let na = spec.level(&LevelKey::from("NA")).unwrap();
        assert_eq!(na.rank, 0);
        assert_eq!(na.fixed_color.as_deref(), Some("128,128,128"));
        assert_eq!(na.fixed_color_description.as_deref(), Some("skipped"));

        let two = spec.bucket(DifferenceBucket::TwoOrMoreLevelsBelow).unwrap();
        assert_eq!(two.color, "255,255,255");
        assert_eq!(two.explanation, "gap");
        let one = spec.bucket(DifferenceBucket::OneLevelBelow).unwrap();
        assert_eq!(one.explanation, "");
        assert_eq!(one.range, LevelRange::new(-1, -1));

        assert_eq!(spec.guidelines.len(), 2);
        assert_eq!(spec.guidelines[0].per_level.get("High").map(String::as_str), Some("tested"));
        assert_eq!(spec.guidelines[1].description, "Unknown");
        assert!(spec.guidelines[1].per_level.is_empty());
    }

    #[test]
    fn not_addressed_ignored_without_matching_level() {
        let spec = load(&sample()).unwrap().specification;
        assert!(spec.level(&LevelKey::from("NotAddressed")).is_none());
        assert!(spec.levels.values().filter(|l| l.fixed_color.is_some()).count() == 1);
    }

    #[test]
    fn reserved_level_without_color_entry_stays_unfixed() {
        let mut doc = sample();
        doc["Level Colors"]["fields"]
            .as_object_mut()
            .unwrap()
            .remove("NA");
        let spec = load(&doc).unwrap().specification;
        let na = spec.level(&LevelKey::from("NA")).unwrap();
        assert_eq!(na.fixed_color, None);
        assert_eq!(na.fixed_color_description, None);

        let bare = json!({"Levels": {"fields": {"High": {"level": 3}, "NA": {"level": 0}}}});
        let spec = load(&bare).unwrap().specification;
        assert!(spec.levels.values().all(|l| l.fixed_color.is_none()));
    }

    #[test]
    fn unparseable_rgb_is_kept_and_reported() {
        let mut doc = sample();
        doc["Level Colors"]["fields"]["OneLevel"]["rgb"] = json!("yellow");
        let outcome = load(&doc).unwrap();
        assert_eq!(
            outcome.warnings,
            vec![CodecWarning::InvalidColor {
                name: "OneLevel".to_string(),
                raw: "yellow".to_string(),
            }]
        );
        let one = outcome
            .specification
            .bucket(DifferenceBucket::OneLevelBelow)
            .unwrap();
        assert_eq!(one.color, "yellow");
        assert_eq!(one.rgb(), None);
        let na = outcome.specification.level(&LevelKey::from("NA")).unwrap();
        assert_eq!(na.fixed_rgb(), Some(Rgb { r: 128, g: 128, b: 128 }));
    }

    #[test]
    fn missing_sections_warn_and_default() {
        let outcome = load(&json!({"Levels": {"fields": {"Low": {"level": 1}}}})).unwrap();
        assert_eq!(outcome.specification.levels.len(), 1);
        let missing: Vec<&CodecWarning> = outcome
            .warnings
            .iter()
            .filter(|w| matches!(w, CodecWarning::MissingSection { .. }))
            .collect();
        assert_eq!(missing.len(), 4);
        assert!(outcome.specification.level_difference_colors.is_empty());
    }

    #[test]
    fn wrapped_layout_is_read() {
        let doc = json!({"PIRT": sample(), "Decision": {"fields": {}}});
        let spec = load(&doc).unwrap().specification;
        assert_eq!(spec.levels.len(), 4);
    }

    #[test]
    fn declared_range_is_parsed_or_rejected() {
        let mut doc = sample();
        doc["Level Colors"]["fields"]["PosOrZero"]["range"] = json!("0;0");
        let spec = load(&doc).unwrap().specification;
        assert_eq!(
            spec.bucket(DifferenceBucket::NonNegativeOrZero).unwrap().range,
            LevelRange::new(0, 0)
        );

        doc["Level Colors"]["fields"]["OneLevel"]["range"] = json!("1,2");
        let err = load(&doc).unwrap_err();
        assert!(matches!(err, RankingError::MalformedRange { ref entry, .. } if entry == "OneLevel"));
    }

    #[test]
    fn misshapen_sections_default_with_warning() {
        let doc = json!({
            "Headers": {"fields": {"not": "a list"}},
            "Adequacy Columns": "oops",
            "Levels": {"fields": null},
            "Level Colors": {"fields": {"PosOrZero": {"rgb": "0,0,0"}}},
            "Guidelines": {}
        });
        let outcome = load(&doc).unwrap();
        assert!(outcome.specification.headers.is_empty());
        assert!(outcome.specification.adequacy_columns.is_empty());
        assert!(outcome.specification.levels.is_empty());
        assert_eq!(outcome.specification.level_difference_colors.len(), 1);
        let malformed = outcome
            .warnings
            .iter()
            .filter(|w| matches!(w, CodecWarning::MalformedSection { .. }))
            .count();
        assert_eq!(malformed, 2);
        let missing_colors = outcome
            .warnings
            .iter()
            .filter(|w| matches!(w, CodecWarning::MissingLevelColor { .. }))
            .count();
        assert_eq!(missing_colors, 2);
    }

    #[test]
    fn non_mapping_document_loads_empty() {
        let outcome = load(&json!("just text")).unwrap();
        assert!(outcome.specification.is_empty());
        assert_eq!(outcome.warnings.len(), 5);
    }
}
