//! Ranking specification model.
//!
//! Types here mirror the sections of a ranking document: description headers,
//! adequacy columns, importance levels, level-difference colors, and
//! guidelines. The codec in [`crate::codec`] produces and consumes them.

pub mod identity;
pub mod model;
pub mod range;

pub use identity::{ColumnKind, DifferenceBucket, LevelKey};
pub use model::{
    AdequacyColumn, AdequacyColumnGuideline, DescriptionHeader, LevelDifferenceColor,
    LevelImportance, Rgb, Specification,
};
pub use range::{LevelRange, RangeParseError};
