//! Nodes of the interest-item hierarchy and the handles used to address them.

use crate::hierarchy::label::PositionLabel;
use crate::spec::LevelKey;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

macro_rules! node_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

node_id!(ItemId, "item");
node_id!(GroupId, "group");
node_id!(LeafId, "leaf");

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// Marks an interest item as a frozen snapshot.
pub struct Tag {
    pub tagged_at: DateTime<Utc>,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HeaderValue {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// Top-level unit of assessment.
///
/// `parent` is set on tagged snapshots and points at the live item they were
/// taken from. It is a lookup handle only; the source may since have been
/// deleted.
pub struct InterestItem {
    pub id: ItemId,
    pub symbol: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub parent: Option<ItemId>,
    pub position: usize,
    pub tag: Option<Tag>,
    pub headers: Vec<HeaderValue>,
    pub groups: Vec<GroupId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub item: ItemId,
    pub position: usize,
    pub leaves: Vec<LeafId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// Finest-grained ranked entry. `criteria` maps adequacy column names to
/// cell values; for level columns the value is a level key.
pub struct Leaf {
    pub id: LeafId,
    pub name: String,
    pub group: GroupId,
    pub position: usize,
    pub importance: Option<LevelKey>,
    pub criteria: BTreeMap<String, String>,
}

impl InterestItem {
    pub fn label(&self) -> PositionLabel {
        PositionLabel::from_index(self.position)
    }

    pub fn is_tagged(&self) -> bool {
        self.tag.is_some()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name == name)
            .map(|h| h.value.as_str())
    }
}

impl Group {
    pub fn label(&self) -> PositionLabel {
        PositionLabel::from_index(self.position)
    }
}

impl Leaf {
    pub fn label(&self) -> PositionLabel {
        PositionLabel::from_index(self.position)
    }
}

/// One sibling list.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Scope {
    Roots,
    /// Groups of an item.
    Item(ItemId),
    /// Leaves of a group.
    Group(GroupId),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Roots => f.write_str("roots"),
            Scope::Item(id) => write!(f, "groups of {id}"),
            Scope::Group(id) => write!(f, "leaves of {id}"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum NodeRef {
    Item(ItemId),
    Group(GroupId),
    Leaf(LeafId),
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRef::Item(id) => write!(f, "{id}"),
            NodeRef::Group(id) => write!(f, "{id}"),
            NodeRef::Leaf(id) => write!(f, "{id}"),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct NewItem {
    pub symbol: String,
    pub description: String,
    /// Header names; each gets an empty value.
    pub headers: Vec<String>,
}

#[derive(Clone, Debug, Default)]
pub struct NewGroup {
    pub name: String,
}

#[derive(Clone, Debug, Default)]
pub struct NewLeaf {
    pub name: String,
    pub importance: Option<LevelKey>,
    pub criteria: BTreeMap<String, String>,
}

#[derive(Clone, Debug)]
pub enum NewNode {
    Item(NewItem),
    Group(NewGroup),
    Leaf(NewLeaf),
}

/// Fields of an item that `update_item` may change; `None` leaves a field as is.
#[derive(Clone, Debug, Default)]
pub struct ItemUpdate {
    pub symbol: Option<String>,
    pub description: Option<String>,
}
