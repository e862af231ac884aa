use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Key of an importance level as declared in the `Levels` section.
///
/// Keys are data, not compile-time names: documents define as many levels as
/// they like and leaves reference them by this key.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelKey(pub String);

impl LevelKey {
    pub fn new(key: impl Into<String>) -> Self {
        LevelKey(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LevelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LevelKey {
    fn from(value: &str) -> Self {
        LevelKey(value.to_string())
    }
}

/// Content kind of an adequacy column.
///
/// The set is closed: unknown or missing kinds read as `Text`, so a
/// document written by a newer tool still loads.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum ColumnKind {
    #[default]
    Text,
    RichText,
    /// Cell values are level keys and can be colored against the leaf importance.
    LevelRef,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Text => "Text",
            ColumnKind::RichText => "RichText",
            ColumnKind::LevelRef => "Levels",
        }
    }

    pub fn from_str_lenient(value: &str) -> Self {
        match value.trim() {
            "RichText" => ColumnKind::RichText,
            "Levels" => ColumnKind::LevelRef,
            _ => ColumnKind::Text,
        }
    }
}

impl Serialize for ColumnKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ColumnKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_str_lenient(&value))
    }
}

/// The three level-difference buckets a specification can color.
///
/// Ordering follows severity: `NonNegativeOrZero` is the best outcome.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum DifferenceBucket {
    NonNegativeOrZero,
    OneLevelBelow,
    TwoOrMoreLevelsBelow,
}

impl DifferenceBucket {
    pub const ALL: [DifferenceBucket; 3] = [
        DifferenceBucket::NonNegativeOrZero,
        DifferenceBucket::OneLevelBelow,
        DifferenceBucket::TwoOrMoreLevelsBelow,
    ];

    /// Bucket for `current.rank - expected.rank`.
    pub fn for_delta(delta: i64) -> Self {
        match delta {
            d if d >= 0 => DifferenceBucket::NonNegativeOrZero,
            -1 => DifferenceBucket::OneLevelBelow,
            _ => DifferenceBucket::TwoOrMoreLevelsBelow,
        }
    }
}
