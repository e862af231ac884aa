//! In-memory ranking specification.
//!
//! Plain data mirroring the document sections. The codec builds these;
//! everything else reads them. Levels and guidelines are keyed by strings
//! because their names come from the document, not from code.

use crate::spec::identity::{ColumnKind, DifferenceBucket, LevelKey};
use crate::spec::range::LevelRange;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Full ranking specification loaded from one document.
pub struct Specification {
    pub headers: Vec<DescriptionHeader>,
    pub adequacy_columns: Vec<AdequacyColumn>,
    pub levels: BTreeMap<LevelKey, LevelImportance>,
    pub level_difference_colors: BTreeMap<DifferenceBucket, LevelDifferenceColor>,
    pub guidelines: Vec<AdequacyColumnGuideline>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// Named description row shown for every interest item.
pub struct DescriptionHeader {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdequacyColumn {
    pub name: String,
    pub kind: ColumnKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// Ranked importance level.
///
/// `rank` orders levels (higher is more important) and need not be
/// contiguous. A `fixed_color` overrides any rank comparison.
pub struct LevelImportance {
    pub key: LevelKey,
    pub name: String,
    pub rank: i64,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_color_description: Option<String>,
}

impl LevelImportance {
    pub fn fixed_rgb(&self) -> Option<Rgb> {
        self.fixed_color.as_deref()?.parse().ok()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDifferenceColor {
    pub bucket: DifferenceBucket,
    pub color: String,
    pub explanation: String,
    pub range: LevelRange,
}

impl LevelDifferenceColor {
    /// `None` when the stored color is not a valid `r,g,b` triple.
    pub fn rgb(&self) -> Option<Rgb> {
        self.color.parse().ok()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// Guidance text for one adequacy column, optionally per level name.
pub struct AdequacyColumnGuideline {
    pub name: String,
    pub description: String,
    pub per_level: BTreeMap<String, String>,
}

impl Specification {
    pub fn level(&self, key: &LevelKey) -> Option<&LevelImportance> {
        self.levels.get(key)
    }

    /// Levels ordered most important first; equal ranks fall back to key order.
    pub fn levels_by_rank_desc(&self) -> Vec<&LevelImportance> {
        let mut levels: Vec<&LevelImportance> = self.levels.values().collect();
        levels.sort_by(|a, b| b.rank.cmp(&a.rank).then_with(|| a.key.cmp(&b.key)));
        levels
    }

    pub fn bucket(&self, bucket: DifferenceBucket) -> Option<&LevelDifferenceColor> {
        self.level_difference_colors.get(&bucket)
    }

    pub fn header_names(&self) -> Vec<String> {
        self.headers.iter().map(|h| h.name.clone()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&AdequacyColumn> {
        self.adequacy_columns.iter().find(|c| c.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
            && self.adequacy_columns.is_empty()
            && self.levels.is_empty()
            && self.level_difference_colors.is_empty()
            && self.guidelines.is_empty()
    }
}

/// An `r,g,b` color as written in documents.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl FromStr for Rgb {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
        let [r, g, b] = parts.as_slice() else {
            return Err(format!("expected 'r,g,b', got '{raw}'"));
        };
        let channel = |value: &str| {
            value
                .parse::<u8>()
                .map_err(|_| format!("invalid color channel '{value}' in '{raw}'"))
        };
        Ok(Rgb {
            r: channel(r)?,
            g: channel(g)?,
            b: channel(b)?,
        })
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(key: &str, rank: i64) -> LevelImportance {
        LevelImportance {
            key: LevelKey::from(key),
            name: key.to_string(),
            rank,
            label: key.to_string(),
            fixed_color: None,
            fixed_color_description: None,
        }
    }

    #[test]
    fn levels_sorted_by_rank_descending_with_gaps() {
        let mut spec = Specification::default();
        for (key, rank) in [("Low", 1), ("High", 10), ("Med", 5), ("Also Low", 1)] {
            spec.levels.insert(LevelKey::from(key), level(key, rank));
        }
        let keys: Vec<&str> = spec
            .levels_by_rank_desc()
            .iter()
            .map(|l| l.key.as_str())
            .collect();
        assert_eq!(keys, vec!["High", "Med", "Also Low", "Low"]);
    }

    #[test]
    fn rgb_parses_and_renders() {
        let rgb: Rgb = "255, 0,12".parse().unwrap();
        assert_eq!(rgb, Rgb { r: 255, g: 0, b: 12 });
        assert_eq!(rgb.to_string(), "255,0,12");
        assert!("255,0".parse::<Rgb>().is_err());
        assert!("256,0,0".parse::<Rgb>().is_err());
    }
}
