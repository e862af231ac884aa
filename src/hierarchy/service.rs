//! Ordering and tagging over the interest-item hierarchy.
//!
//! Live nodes and tagged snapshots sit in two separate arenas. Every
//! mutating call validates all of its references before touching either
//! arena, then renumbers the affected sibling lists so positions stay dense.

use crate::error::{RankingError, Result};
use crate::hierarchy::clock::{Clock, IdSource, SequentialIds, SystemClock};
use crate::hierarchy::label::PositionLabel;
use crate::hierarchy::node::{
    Group, GroupId, HeaderValue, InterestItem, ItemId, ItemUpdate, Leaf, LeafId, NewGroup,
    NewItem, NewLeaf, NewNode, NodeRef, Scope, Tag,
};
use crate::spec::{ColumnKind, LevelKey, Specification};
use std::collections::{BTreeMap, BTreeSet};

/// Appended to the symbol of a duplicated item.
pub const COPY_SUFFIX: &str = " (copy)";

#[derive(Clone, Debug, Default)]
struct Forest {
    items: BTreeMap<ItemId, InterestItem>,
    groups: BTreeMap<GroupId, Group>,
    leaves: BTreeMap<LeafId, Leaf>,
}

impl Forest {
    fn remove_item(&mut self, id: ItemId) -> Option<InterestItem> {
        let item = self.items.remove(&id)?;
        for group in &item.groups {
            self.remove_group(*group);
        }
        Some(item)
    }

    fn remove_group(&mut self, id: GroupId) -> Option<Group> {
        let group = self.groups.remove(&id)?;
        for leaf in &group.leaves {
            self.leaves.remove(leaf);
        }
        Some(group)
    }

    fn absorb(&mut self, subtree: Subtree) {
        for group in subtree.groups {
            self.groups.insert(group.id, group);
        }
        for leaf in subtree.leaves {
            self.leaves.insert(leaf.id, leaf);
        }
        self.items.insert(subtree.item.id, subtree.item);
    }
}

/// An item with its groups and leaves, detached from any arena.
struct Subtree {
    item: InterestItem,
    groups: Vec<Group>,
    leaves: Vec<Leaf>,
}

enum MovePlan {
    Item(ItemId),
    Group(GroupId, ItemId, ItemId),
    Leaf(LeafId, GroupId, GroupId),
}

pub struct Hierarchy {
    live: Forest,
    tagged: Forest,
    roots: Vec<ItemId>,
    tags: Vec<ItemId>,
    clock: Box<dyn Clock>,
    ids: Box<dyn IdSource>,
}

impl Default for Hierarchy {
    fn default() -> Self {
        Self::new()
    }
}

impl Hierarchy {
    pub fn new() -> Self {
        Self::with_sources(Box::new(SystemClock), Box::new(SequentialIds::default()))
    }

    pub fn with_sources(clock: Box<dyn Clock>, ids: Box<dyn IdSource>) -> Self {
        Self {
            live: Forest::default(),
            tagged: Forest::default(),
            roots: Vec::new(),
            tags: Vec::new(),
            clock,
            ids,
        }
    }

    // --- ordering -------------------------------------------------------

    /// Insert a new node into `scope` at `index`, clamped to the scope length.
    ///
    /// Items go into [`Scope::Roots`], groups into [`Scope::Item`], leaves
    /// into [`Scope::Group`]; any other pairing is an invalid reference.
    pub fn insert(&mut self, scope: Scope, node: NewNode, index: usize) -> Result<NodeRef> {
        let created = match (scope, node) {
            (Scope::Roots, NewNode::Item(new)) => NodeRef::Item(self.insert_item(new, index)?),
            (Scope::Item(item), NewNode::Group(new)) => {
                NodeRef::Group(self.insert_group(item, new, index)?)
            }
            (Scope::Group(group), NewNode::Leaf(new)) => {
                NodeRef::Leaf(self.insert_leaf(group, new, index)?)
            }
            (scope, _) => {
                return Err(RankingError::invalid(format!(
                    "{scope} cannot hold that kind of node"
                )));
            }
        };
        tracing::debug!(scope = %scope, node = %created, index, "hierarchy insert");
        Ok(created)
    }

    /// Append a new root item.
    pub fn add_item(&mut self, new: NewItem) -> Result<ItemId> {
        let index = self.roots.len();
        self.insert_item(new, index)
    }

    pub fn add_group(&mut self, item: ItemId, new: NewGroup) -> Result<GroupId> {
        let index = self.live_item(item)?.groups.len();
        self.insert_group(item, new, index)
    }

    pub fn add_leaf(&mut self, group: GroupId, new: NewLeaf) -> Result<LeafId> {
        let index = self.live_group(group)?.leaves.len();
        self.insert_leaf(group, new, index)
    }

    fn insert_item(&mut self, new: NewItem, index: usize) -> Result<ItemId> {
        self.ensure_symbol_free(&new.symbol, None)?;
        let index = index.min(self.roots.len());
        let id = ItemId(self.ids.next_id());
        let item = InterestItem {
            id,
            symbol: new.symbol,
            description: new.description,
            created_at: self.clock.now(),
            parent: None,
            position: index,
            tag: None,
            headers: new
                .headers
                .into_iter()
                .map(|name| HeaderValue {
                    name,
                    value: String::new(),
                })
                .collect(),
            groups: Vec::new(),
        };
        self.live.items.insert(id, item);
        self.roots.insert(index, id);
        self.renumber(Scope::Roots);
        Ok(id)
    }

    fn insert_group(&mut self, item: ItemId, new: NewGroup, index: usize) -> Result<GroupId> {
        let index = index.min(self.live_item(item)?.groups.len());
        let id = GroupId(self.ids.next_id());
        self.live.groups.insert(
            id,
            Group {
                id,
                name: new.name,
                item,
                position: index,
                leaves: Vec::new(),
            },
        );
        if let Some(owner) = self.live.items.get_mut(&item) {
            owner.groups.insert(index, id);
        }
        self.renumber(Scope::Item(item));
        Ok(id)
    }

    fn insert_leaf(&mut self, group: GroupId, new: NewLeaf, index: usize) -> Result<LeafId> {
        let index = index.min(self.live_group(group)?.leaves.len());
        let id = LeafId(self.ids.next_id());
        self.live.leaves.insert(
            id,
            Leaf {
                id,
                name: new.name,
                group,
                position: index,
                importance: new.importance,
                criteria: new.criteria,
            },
        );
        if let Some(owner) = self.live.groups.get_mut(&group) {
            owner.leaves.insert(index, id);
        }
        self.renumber(Scope::Group(group));
        Ok(id)
    }

    /// Move `node` from `from` to the slot next to `target_index` in `to`.
    ///
    /// `target_index` addresses the drop target as the scope looks before
    /// the move; an empty destination accepts only `0`. With `before` the
    /// node lands in front of the target, otherwise right after it. When
    /// both scopes are the same and the node sat ahead of the target, the
    /// index is shifted down by one for the slot its removal frees. Dropping
    /// a node onto itself changes nothing.
    pub fn move_node(
        &mut self,
        node: NodeRef,
        from: Scope,
        to: Scope,
        target_index: usize,
        before: bool,
    ) -> Result<()> {
        let plan = match (node, from, to) {
            (NodeRef::Item(id), Scope::Roots, Scope::Roots) => MovePlan::Item(id),
            (NodeRef::Group(id), Scope::Item(a), Scope::Item(b)) => MovePlan::Group(id, a, b),
            (NodeRef::Leaf(id), Scope::Group(a), Scope::Group(b)) => MovePlan::Leaf(id, a, b),
            _ => {
                return Err(RankingError::invalid(format!(
                    "{node} cannot move from {from} to {to}"
                )));
            }
        };

        let (scope, source) = self.locate(node)?;
        if scope != from {
            return Err(RankingError::invalid(format!("{node} is not in {from}")));
        }
        let target_len = self.scope_len(to)?;
        let target_ok = if target_len == 0 {
            target_index == 0
        } else {
            target_index < target_len
        };
        if !target_ok {
            return Err(RankingError::invalid(format!(
                "target index {target_index} is outside {to} ({target_len} entries)"
            )));
        }

        let same = from == to;
        if same && source == target_index {
            return Ok(());
        }
        let mut index = if before {
            target_index
        } else {
            target_index + 1
        };
        if same && source < target_index {
            index -= 1;
        }
        let room = if same { target_len - 1 } else { target_len };
        let index = index.min(room);

        match plan {
            MovePlan::Item(id) => {
                self.roots.remove(source);
                self.roots.insert(index, id);
            }
            MovePlan::Group(id, old, new) => {
                if let Some(owner) = self.live.items.get_mut(&old) {
                    owner.groups.remove(source);
                }
                if let Some(owner) = self.live.items.get_mut(&new) {
                    owner.groups.insert(index, id);
                }
                if let Some(group) = self.live.groups.get_mut(&id) {
                    group.item = new;
                }
            }
            MovePlan::Leaf(id, old, new) => {
                if let Some(owner) = self.live.groups.get_mut(&old) {
                    owner.leaves.remove(source);
                }
                if let Some(owner) = self.live.groups.get_mut(&new) {
                    owner.leaves.insert(index, id);
                }
                if let Some(leaf) = self.live.leaves.get_mut(&id) {
                    leaf.group = new;
                }
            }
        }
        self.renumber(from);
        if !same {
            self.renumber(to);
        }
        tracing::debug!(node = %node, from = %from, to = %to, index, "hierarchy move");
        Ok(())
    }

    /// Rewrite every position in `scope` from its sibling order.
    pub fn reorder_children(&mut self, scope: Scope) -> Result<()> {
        self.scope_len(scope)?;
        self.renumber(scope);
        Ok(())
    }

    /// Renumber every live scope.
    pub fn reorder_all(&mut self) {
        self.renumber(Scope::Roots);
        let items: Vec<ItemId> = self.roots.clone();
        for item in items {
            self.renumber(Scope::Item(item));
            let groups = self
                .live
                .items
                .get(&item)
                .map(|i| i.groups.clone())
                .unwrap_or_default();
            for group in groups {
                self.renumber(Scope::Group(group));
            }
        }
    }

    fn renumber(&mut self, scope: Scope) {
        match scope {
            Scope::Roots => {
                for (position, id) in self.roots.iter().enumerate() {
                    if let Some(item) = self.live.items.get_mut(id) {
                        item.position = position;
                    }
                }
            }
            Scope::Item(item) => {
                let Some(owner) = self.live.items.get(&item) else {
                    return;
                };
                for (position, id) in owner.groups.iter().enumerate() {
                    if let Some(group) = self.live.groups.get_mut(id) {
                        group.position = position;
                    }
                }
            }
            Scope::Group(group) => {
                let Some(owner) = self.live.groups.get(&group) else {
                    return;
                };
                for (position, id) in owner.leaves.iter().enumerate() {
                    if let Some(leaf) = self.live.leaves.get_mut(id) {
                        leaf.position = position;
                    }
                }
            }
        }
    }

    // --- lifecycle ------------------------------------------------------

    /// Freeze a deep copy of a live item and its groups and leaves.
    ///
    /// The source keeps its place and contents. The snapshot gets fresh ids,
    /// points back at the source through `parent`, and is never touched by
    /// ordering or edit calls afterwards.
    pub fn tag(&mut self, item: ItemId, description: impl Into<String>) -> Result<ItemId> {
        let mut subtree = self.copy_subtree(item)?;
        subtree.item.parent = Some(item);
        subtree.item.tag = Some(Tag {
            tagged_at: self.clock.now(),
            description: description.into(),
        });
        let id = subtree.item.id;
        self.tagged.absorb(subtree);
        self.tags.push(id);
        tracing::debug!(source = %item, snapshot = %id, "hierarchy tag");
        Ok(id)
    }

    /// Deep copy a live item into a new root appended at the end.
    pub fn duplicate(&mut self, item: ItemId) -> Result<ItemId> {
        let mut subtree = self.copy_subtree(item)?;
        let mut symbol = format!("{}{COPY_SUFFIX}", subtree.item.symbol);
        while self.symbol_taken(&symbol, None) {
            symbol.push_str(COPY_SUFFIX);
        }
        subtree.item.symbol = symbol;
        subtree.item.created_at = self.clock.now();
        subtree.item.position = self.roots.len();
        let id = subtree.item.id;
        self.live.absorb(subtree);
        self.roots.push(id);
        self.renumber(Scope::Roots);
        tracing::debug!(source = %item, copy = %id, "hierarchy duplicate");
        Ok(id)
    }

    /// Clear an item's description and header values and drop its groups.
    /// Id, position, and parent stay as they are.
    pub fn reset(&mut self, item: ItemId) -> Result<()> {
        let groups = self.live_item(item)?.groups.clone();
        for group in groups {
            self.live.remove_group(group);
        }
        if let Some(target) = self.live.items.get_mut(&item) {
            target.description.clear();
            target.groups.clear();
            for header in &mut target.headers {
                header.value.clear();
            }
        }
        tracing::debug!(item = %item, "hierarchy reset");
        Ok(())
    }

    /// Remove a node and everything it owns.
    ///
    /// A tagged snapshot is simply dropped; its source is untouched. Deleting
    /// a live item leaves its snapshots in place.
    pub fn delete(&mut self, node: NodeRef) -> Result<()> {
        match node {
            NodeRef::Item(id) if self.tagged.items.contains_key(&id) => {
                self.tagged.remove_item(id);
                self.tags.retain(|tag| *tag != id);
            }
            NodeRef::Item(id) => {
                self.live_item(id)?;
                self.live.remove_item(id);
                self.roots.retain(|root| *root != id);
                self.renumber(Scope::Roots);
            }
            NodeRef::Group(id) => {
                let owner = self.live_group(id)?.item;
                self.live.remove_group(id);
                if let Some(item) = self.live.items.get_mut(&owner) {
                    item.groups.retain(|group| *group != id);
                }
                self.renumber(Scope::Item(owner));
            }
            NodeRef::Leaf(id) => {
                let owner = self.live_leaf(id)?.group;
                self.live.leaves.remove(&id);
                if let Some(group) = self.live.groups.get_mut(&owner) {
                    group.leaves.retain(|leaf| *leaf != id);
                }
                self.renumber(Scope::Group(owner));
            }
        }
        tracing::debug!(node = %node, "hierarchy delete");
        Ok(())
    }

    fn copy_subtree(&mut self, source: ItemId) -> Result<Subtree> {
        let mut item = self.live_item(source)?.clone();
        item.id = ItemId(self.ids.next_id());
        let source_groups = std::mem::take(&mut item.groups);

        let mut groups = Vec::with_capacity(source_groups.len());
        let mut leaves = Vec::new();
        for group_id in source_groups {
            let Some(group) = self.live.groups.get(&group_id) else {
                continue;
            };
            let mut group = group.clone();
            group.id = GroupId(self.ids.next_id());
            group.item = item.id;
            let source_leaves = std::mem::take(&mut group.leaves);
            for leaf_id in source_leaves {
                let Some(leaf) = self.live.leaves.get(&leaf_id) else {
                    continue;
                };
                let mut leaf = leaf.clone();
                leaf.id = LeafId(self.ids.next_id());
                leaf.group = group.id;
                group.leaves.push(leaf.id);
                leaves.push(leaf);
            }
            item.groups.push(group.id);
            groups.push(group);
        }
        Ok(Subtree {
            item,
            groups,
            leaves,
        })
    }

    // --- edits ----------------------------------------------------------

    pub fn update_item(&mut self, item: ItemId, update: ItemUpdate) -> Result<()> {
        self.live_item(item)?;
        if let Some(symbol) = &update.symbol {
            self.ensure_symbol_free(symbol, Some(item))?;
        }
        if let Some(target) = self.live.items.get_mut(&item) {
            if let Some(symbol) = update.symbol {
                target.symbol = symbol;
            }
            if let Some(description) = update.description {
                target.description = description;
            }
        }
        Ok(())
    }

    /// Set the value of an existing header on a live item.
    pub fn set_header_value(
        &mut self,
        item: ItemId,
        name: &str,
        value: impl Into<String>,
    ) -> Result<()> {
        let target = self.live_item_mut(item)?;
        let header = target
            .headers
            .iter_mut()
            .find(|h| h.name == name)
            .ok_or_else(|| RankingError::invalid(format!("{item} has no header '{name}'")))?;
        header.value = value.into();
        Ok(())
    }

    pub fn rename_group(&mut self, group: GroupId, name: impl Into<String>) -> Result<()> {
        let target = self
            .live
            .groups
            .get_mut(&group)
            .ok_or_else(|| not_live(NodeRef::Group(group)))?;
        target.name = name.into();
        Ok(())
    }

    pub fn set_leaf_importance(&mut self, leaf: LeafId, importance: Option<LevelKey>) -> Result<()> {
        self.live_leaf_mut(leaf)?.importance = importance;
        Ok(())
    }

    /// Set one criterion cell; `None` clears it.
    pub fn set_criterion(
        &mut self,
        leaf: LeafId,
        column: impl Into<String>,
        value: Option<String>,
    ) -> Result<()> {
        let target = self.live_leaf_mut(leaf)?;
        let column = column.into();
        match value {
            Some(value) => {
                target.criteria.insert(column, value);
            }
            None => {
                target.criteria.remove(&column);
            }
        }
        Ok(())
    }

    // --- queries --------------------------------------------------------

    /// Live root items in order.
    pub fn roots(&self) -> Vec<&InterestItem> {
        self.roots
            .iter()
            .filter_map(|id| self.live.items.get(id))
            .collect()
    }

    /// Live or tagged item.
    pub fn item(&self, id: ItemId) -> Option<&InterestItem> {
        self.live
            .items
            .get(&id)
            .or_else(|| self.tagged.items.get(&id))
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.live
            .groups
            .get(&id)
            .or_else(|| self.tagged.groups.get(&id))
    }

    pub fn leaf(&self, id: LeafId) -> Option<&Leaf> {
        self.live
            .leaves
            .get(&id)
            .or_else(|| self.tagged.leaves.get(&id))
    }

    pub fn groups_of(&self, item: ItemId) -> Vec<&Group> {
        self.item(item)
            .map(|i| i.groups.iter().filter_map(|g| self.group(*g)).collect())
            .unwrap_or_default()
    }

    pub fn leaves_of(&self, group: GroupId) -> Vec<&Leaf> {
        self.group(group)
            .map(|g| g.leaves.iter().filter_map(|l| self.leaf(*l)).collect())
            .unwrap_or_default()
    }

    /// Snapshots taken from `item`, oldest first.
    pub fn tags_of(&self, item: ItemId) -> Vec<&InterestItem> {
        self.tagged()
            .into_iter()
            .filter(|tag| tag.parent == Some(item))
            .collect()
    }

    pub fn tagged(&self) -> Vec<&InterestItem> {
        self.tags
            .iter()
            .filter_map(|id| self.tagged.items.get(id))
            .collect()
    }

    /// Labels of a live scope in sibling order.
    pub fn labels(&self, scope: Scope) -> Result<Vec<PositionLabel>> {
        let labels = match scope {
            Scope::Roots => self.roots().iter().map(|i| i.label()).collect(),
            Scope::Item(item) => {
                self.live_item(item)?;
                self.groups_of(item).iter().map(|g| g.label()).collect()
            }
            Scope::Group(group) => {
                self.live_group(group)?;
                self.leaves_of(group).iter().map(|l| l.label()).collect()
            }
        };
        Ok(labels)
    }

    /// Live leaves referring to a level key `specification` does not define,
    /// either as importance or in a level column.
    pub fn unknown_level_refs(&self, specification: &Specification) -> Vec<LeafId> {
        let level_columns: BTreeSet<&str> = specification
            .adequacy_columns
            .iter()
            .filter(|c| c.kind == ColumnKind::LevelRef)
            .map(|c| c.name.as_str())
            .collect();
        let known = |key: &str| specification.level(&LevelKey::from(key)).is_some();

        self.live
            .leaves
            .values()
            .filter(|leaf| {
                let bad_importance = leaf
                    .importance
                    .as_ref()
                    .is_some_and(|key| !known(key.as_str()));
                let bad_cell = leaf
                    .criteria
                    .iter()
                    .any(|(column, value)| level_columns.contains(column.as_str()) && !known(value));
                bad_importance || bad_cell
            })
            .map(|leaf| leaf.id)
            .collect()
    }

    // --- lookups --------------------------------------------------------

    fn live_item(&self, id: ItemId) -> Result<&InterestItem> {
        self.live
            .items
            .get(&id)
            .ok_or_else(|| not_live(NodeRef::Item(id)))
    }

    fn live_item_mut(&mut self, id: ItemId) -> Result<&mut InterestItem> {
        self.live
            .items
            .get_mut(&id)
            .ok_or_else(|| not_live(NodeRef::Item(id)))
    }

    fn live_group(&self, id: GroupId) -> Result<&Group> {
        self.live
            .groups
            .get(&id)
            .ok_or_else(|| not_live(NodeRef::Group(id)))
    }

    fn live_leaf(&self, id: LeafId) -> Result<&Leaf> {
        self.live
            .leaves
            .get(&id)
            .ok_or_else(|| not_live(NodeRef::Leaf(id)))
    }

    fn live_leaf_mut(&mut self, id: LeafId) -> Result<&mut Leaf> {
        self.live
            .leaves
            .get_mut(&id)
            .ok_or_else(|| not_live(NodeRef::Leaf(id)))
    }

    fn scope_len(&self, scope: Scope) -> Result<usize> {
        match scope {
            Scope::Roots => Ok(self.roots.len()),
            Scope::Item(id) => Ok(self.live_item(id)?.groups.len()),
            Scope::Group(id) => Ok(self.live_group(id)?.leaves.len()),
        }
    }

    /// Scope holding a live node and its index among its siblings.
    fn locate(&self, node: NodeRef) -> Result<(Scope, usize)> {
        let found = match node {
            NodeRef::Item(id) => {
                self.live_item(id)?;
                self.roots
                    .iter()
                    .position(|root| *root == id)
                    .map(|index| (Scope::Roots, index))
            }
            NodeRef::Group(id) => {
                let owner = self.live_group(id)?.item;
                self.live_item(owner)?
                    .groups
                    .iter()
                    .position(|group| *group == id)
                    .map(|index| (Scope::Item(owner), index))
            }
            NodeRef::Leaf(id) => {
                let owner = self.live_leaf(id)?.group;
                self.live_group(owner)?
                    .leaves
                    .iter()
                    .position(|leaf| *leaf == id)
                    .map(|index| (Scope::Group(owner), index))
            }
        };
        found.ok_or_else(|| RankingError::invalid(format!("{node} is not attached to a scope")))
    }

    /// Empty symbols never collide.
    fn symbol_taken(&self, symbol: &str, except: Option<ItemId>) -> bool {
        !symbol.is_empty()
            && self.roots().iter().any(|item| Some(item.id) != except && item.symbol == symbol)
    }

    fn ensure_symbol_free(&self, symbol: &str, except: Option<ItemId>) -> Result<()> {
        if self.symbol_taken(symbol, except) {
            return Err(RankingError::DuplicateSymbol(symbol.to_string()));
        }
        Ok(())
    }
}

fn not_live(node: NodeRef) -> RankingError {
    RankingError::invalid(format!("{node} is not a live node"))
}
