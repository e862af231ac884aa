//! Interest items, their groups and leaves, and the operations that order
//! and snapshot them.
//!
//! The hierarchy never reads the specification except to report leaves
//! whose level keys it does not define.

pub mod clock;
pub mod label;
pub mod node;
pub mod service;

pub use clock::{Clock, FixedClock, IdSource, SequentialIds, SystemClock};
pub use label::PositionLabel;
pub use node::{
    Group, GroupId, HeaderValue, InterestItem, ItemId, ItemUpdate, Leaf, LeafId, NewGroup,
    NewItem, NewLeaf, NewNode, NodeRef, Scope, Tag,
};
pub use service::{COPY_SUFFIX, Hierarchy};
