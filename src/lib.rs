//! Ranking configuration and assessment hierarchy engine.
//!
//! Three pieces sit on top of one shared model:
//!
//! - [`codec`] reads a ranking document (importance levels, adequacy columns,
//!   level-difference colors, guidelines) into a [`Specification`] and merges
//!   it back without disturbing keys it does not own.
//! - [`color`] turns an expected/current level pair into a display color.
//! - [`hierarchy`] keeps interest items, groups, and leaves in dense
//!   alphabetic order and takes immutable tagged snapshots of them.
//!
//! The functions re-exported at the crate root are the surface external
//! front ends call; the `ranking-spec` binary is one such front end.

pub mod codec;
pub mod color;
pub mod error;
pub mod hierarchy;
pub mod settings;
pub mod spec;

use serde_json::Value;

pub use codec::{
    CodecWarning, DocumentFormat, DocumentStore, FileStore, LoadOutcome, MemoryStore,
    SaveOutcome, is_ranking_document, load_from_store, parse_document, render_document,
    save_to_store, validate_document_shape,
};
pub use color::{ColorResult, resolve_color, resolve_leaf_color, resolve_levels};
pub use error::{RankingError, Result};
pub use hierarchy::{
    Group, GroupId, Hierarchy, InterestItem, ItemId, Leaf, LeafId, NewGroup, NewItem, NewLeaf,
    NewNode, NodeRef, PositionLabel, Scope,
};
pub use settings::Settings;
pub use spec::{
    AdequacyColumn, ColumnKind, DifferenceBucket, LevelImportance, LevelKey, LevelRange,
    Specification,
};

/// Read a specification out of a parsed document.
///
/// Missing or misshapen sections load empty and are reported in the
/// outcome's warnings; an unparseable level-color range fails the load.
pub fn load_specification(document: &Value) -> Result<LoadOutcome> {
    codec::load(document)
}

/// Merge `specification` into `existing` (or a fresh document).
pub fn save_specification(existing: Option<&Value>, specification: &Specification) -> SaveOutcome {
    codec::save(existing, specification)
}
