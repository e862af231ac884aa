//! Ranking color resolution.
//!
//! Compares an expected importance level with the level actually reached and
//! picks the display color. A level with a fixed color short-circuits the
//! comparison; otherwise the rank delta selects one of three buckets.

use crate::hierarchy::Leaf;
use crate::spec::{ColumnKind, DifferenceBucket, LevelImportance, LevelKey, Rgb, Specification};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColorResult {
    /// The current level carries its own color.
    Fixed {
        color: String,
        description: Option<String>,
    },
    Bucket {
        bucket: DifferenceBucket,
        color: String,
        explanation: String,
    },
    /// The selected bucket has no color in this specification. Distinct from
    /// any configured color, including a neutral one.
    Unconfigured { bucket: DifferenceBucket },
}

impl ColorResult {
    pub fn color(&self) -> Option<&str> {
        match self {
            ColorResult::Fixed { color, .. } | ColorResult::Bucket { color, .. } => Some(color),
            ColorResult::Unconfigured { .. } => None,
        }
    }

    /// Parsed channels of [`ColorResult::color`].
    pub fn rgb(&self) -> Option<Rgb> {
        self.color()?.parse().ok()
    }
}

/// Color for `current` measured against `expected`.
pub fn resolve_color(
    specification: &Specification,
    expected: &LevelImportance,
    current: &LevelImportance,
) -> ColorResult {
    if let Some(color) = &current.fixed_color {
        return ColorResult::Fixed {
            color: color.clone(),
            description: current.fixed_color_description.clone(),
        };
    }

    let bucket = DifferenceBucket::for_delta(current.rank.saturating_sub(expected.rank));
    match specification.bucket(bucket) {
        Some(entry) => ColorResult::Bucket {
            bucket,
            color: entry.color.clone(),
            explanation: entry.explanation.clone(),
        },
        None => ColorResult::Unconfigured { bucket },
    }
}

/// Key-based form of [`resolve_color`]; `None` when either key is unknown.
pub fn resolve_levels(
    specification: &Specification,
    expected: &LevelKey,
    current: &LevelKey,
) -> Option<ColorResult> {
    let expected = specification.level(expected)?;
    let current = specification.level(current)?;
    Some(resolve_color(specification, expected, current))
}

/// Color of a leaf's criterion cell in a `Levels` column.
///
/// The leaf's importance is the expectation and the level key stored in the
/// cell is what was reached. `None` when the column is not a level column or
/// either side is missing.
pub fn resolve_leaf_color(
    specification: &Specification,
    leaf: &Leaf,
    column: &str,
) -> Option<ColorResult> {
    let kind = specification.column(column)?.kind;
    if kind != ColumnKind::LevelRef {
        return None;
    }
    let expected = leaf.importance.as_ref()?;
    let current = leaf.criteria.get(column)?;
    resolve_levels(specification, expected, &LevelKey::from(current.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::load;
    use crate::hierarchy::{GroupId, LeafId};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn spec() -> Specification {
        load(&json!({
            "Adequacy Columns": {"fields": {
                "Code": {"type": "Levels"},
                "Notes": {"type": "Text"}
            }},
            "Levels": {"fields": {
                "Low": {"level": 1},
                "Med": {"level": 2},
                "High": {"level": 3},
                "NA": {"level": 0}
            }},
            "Level Colors": {"fields": {
                "PosOrZero": {"rgb": "0,255,0", "explanation": "met"},
                "OneLevel": {"rgb": "255,255,0", "explanation": "close"},
                "TwoLevelsOrMore": {"rgb": "255,0,0", "explanation": "gap"},
                "NA": {"rgb": "128,128,128", "explanation": "not applicable"}
            }}
        }))
        .unwrap()
        .specification
    }

    fn key(name: &str) -> LevelKey {
        LevelKey::from(name)
    }

    fn bucket_of(result: Option<ColorResult>) -> DifferenceBucket {
        match result {
            Some(ColorResult::Bucket { bucket, .. }) => bucket,
            other => panic!("expected a bucket, got {other:?}"),
        }
    }

    #[test]
    fn two_levels_below_picks_gap_color() {
        let spec = spec();
        let result = resolve_levels(&spec, &key("High"), &key("Low")).unwrap();
        assert_eq!(
            result,
            ColorResult::Bucket {
                bucket: DifferenceBucket::TwoOrMoreLevelsBelow,
                color: "255,0,0".to_string(),
                explanation: "gap".to_string(),
            }
        );
    }

    #[test]
    fn exceeding_expectation_is_non_negative() {
        let spec = spec();
        let result = resolve_levels(&spec, &key("Med"), &key("High")).unwrap();
        assert_eq!(result.color(), Some("0,255,0"));
        assert_eq!(
            bucket_of(resolve_levels(&spec, &key("Med"), &key("Med"))),
            DifferenceBucket::NonNegativeOrZero
        );
        assert_eq!(
            bucket_of(resolve_levels(&spec, &key("Med"), &key("Low"))),
            DifferenceBucket::OneLevelBelow
        );
    }

    #[test]
    fn fixed_color_wins_for_every_expectation() {
        let spec = spec();
        for expected in ["Low", "Med", "High", "NA"] {
            let result = resolve_levels(&spec, &key(expected), &key("NA")).unwrap();
            assert_eq!(
                result,
                ColorResult::Fixed {
                    color: "128,128,128".to_string(),
                    description: Some("not applicable".to_string()),
                }
            );
        }
    }

    #[test]
    fn missing_bucket_is_unconfigured_not_neutral() {
        let mut spec = spec();
        spec.level_difference_colors
            .remove(&DifferenceBucket::OneLevelBelow);
        let result = resolve_levels(&spec, &key("High"), &key("Med")).unwrap();
        assert_eq!(
            result,
            ColorResult::Unconfigured {
                bucket: DifferenceBucket::OneLevelBelow
            }
        );
        assert_eq!(result.color(), None);
        assert_eq!(result.rgb(), None);
    }

    #[test]
    fn reserved_level_without_entry_uses_buckets() {
        let mut document = json!({
            "Levels": {"fields": {"High": {"level": 3}, "NA": {"level": 0}}},
            "Level Colors": {"fields": {
                "PosOrZero": {"rgb": "0,255,0"},
                "OneLevel": {"rgb": "255,255,0"},
                "TwoLevelsOrMore": {"rgb": "255,0,0"}
            }}
        });
        let spec = load(&document).unwrap().specification;
        assert_eq!(
            bucket_of(resolve_levels(&spec, &key("High"), &key("NA"))),
            DifferenceBucket::TwoOrMoreLevelsBelow
        );

        document.as_object_mut().unwrap().remove("Level Colors");
        let spec = load(&document).unwrap().specification;
        assert_eq!(
            resolve_levels(&spec, &key("High"), &key("NA")),
            Some(ColorResult::Unconfigured {
                bucket: DifferenceBucket::TwoOrMoreLevelsBelow
            })
        );
    }

    #[test]
    fn rgb_channels_of_resolved_color() {
        let spec = spec();
        let result = resolve_levels(&spec, &key("High"), &key("Low")).unwrap();
        assert_eq!(result.rgb(), Some(Rgb { r: 255, g: 0, b: 0 }));
    }

    #[test]
    fn unknown_keys_resolve_to_none() {
        let spec = spec();
        assert!(resolve_levels(&spec, &key("Missing"), &key("Low")).is_none());
        assert!(resolve_levels(&spec, &key("Low"), &key("Missing")).is_none());
    }

    #[test]
    fn leaf_cells_resolve_only_in_level_columns() {
        let spec = spec();
        let leaf = Leaf {
            id: LeafId(1),
            name: "Mesh".to_string(),
            group: GroupId(1),
            position: 0,
            importance: Some(key("High")),
            criteria: BTreeMap::from([
                ("Code".to_string(), "Med".to_string()),
                ("Notes".to_string(), "Low".to_string()),
            ]),
        };
        assert_eq!(
            bucket_of(resolve_leaf_color(&spec, &leaf, "Code")),
            DifferenceBucket::OneLevelBelow
        );
        assert!(resolve_leaf_color(&spec, &leaf, "Notes").is_none());
        assert!(resolve_leaf_color(&spec, &leaf, "Absent").is_none());

        let unranked = Leaf {
            importance: None,
            ..leaf
        };
        assert!(resolve_leaf_color(&spec, &unranked, "Code").is_none());
    }
}
