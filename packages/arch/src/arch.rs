//! # Arch tree
//!
//! Arena-backed ownership tree. The arena owns every node; a parent owns its
//! children through their ids, and `parent` is a plain back-index.
//!
//! ## Failure semantics
//!
//! Structural violations (adding into a void node, mutating a non editable
//! region, removing the root, creating a cycle...) are refused: the method
//! logs a warning, leaves the tree untouched and returns
//! [`ArchError::Violation`] so callers can see why.

use crate::changes::{Change, ChangeLog};
use crate::errors::{ArchError, ArchResult, Violation, ViolationKind};
use crate::kind::{CustomKind, CustomKindId, KindRegistry};
use crate::node::{ArchNode, NodeId, NodeKind};
use crate::predicates::NodeRef;
use crate::{ArchConfig, ArchHooks, Attributes, Tag};
use slotmap::SlotMap;
use tracing::{debug, warn};

#[derive(Debug)]
pub struct Arch {
    pub(crate) nodes: SlotMap<NodeId, ArchNode>,
    root: NodeId,
    pub(crate) config: ArchConfig,
    pub(crate) hooks: ArchHooks,
    pub(crate) kinds: KindRegistry,
    pub(crate) changes: ChangeLog,
}

impl Default for Arch {
    fn default() -> Self {
        Self::new(ArchConfig::default())
    }
}

impl Arch {
    pub fn new(config: ArchConfig) -> Self {
        Self::with_hooks(config, ArchHooks::default())
    }

    pub fn with_hooks(config: ArchConfig, hooks: ArchHooks) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(ArchNode::new(NodeKind::Root, Attributes::default()));
        let kinds = KindRegistry::with_defaults(&config);
        Self {
            nodes,
            root,
            config,
            hooks,
            kinds,
            changes: ChangeLog::default(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn config(&self) -> &ArchConfig {
        &self.config
    }

    pub fn register_kind(&mut self, kind: Box<dyn CustomKind>) -> ArchResult<CustomKindId> {
        self.kinds.register(kind)
    }

    pub fn kinds(&self) -> &KindRegistry {
        &self.kinds
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// Raw node data, attached or not
    pub fn data(&self, id: NodeId) -> ArchResult<&ArchNode> {
        self.nodes.get(id).ok_or(ArchError::NodeNotFound(id))
    }

    pub(crate) fn data_mut(&mut self, id: NodeId) -> ArchResult<&mut ArchNode> {
        self.nodes.get_mut(id).ok_or(ArchError::NodeNotFound(id))
    }

    /// Predicate view over a node
    pub fn node(&self, id: NodeId) -> ArchResult<NodeRef<'_>> {
        Ok(NodeRef::new(self, id, self.data(id)?))
    }

    /// A node reachable from the root; removed or detached ids fail
    pub fn get_node(&self, id: NodeId) -> ArchResult<NodeRef<'_>> {
        if self.is_attached(id) {
            self.node(id)
        } else {
            Err(ArchError::NodeNotFound(id))
        }
    }

    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if node_id == self.root {
                return true;
            }
            match self.nodes.get(node_id) {
                Some(node) if !node.removed => current = node.parent,
                _ => return false,
            }
        }
        false
    }

    pub fn contains_id(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn is_removed(&self, id: NodeId) -> bool {
        self.nodes.get(id).map_or(true, |node| node.removed)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map_or(&[], |node| node.children.as_slice())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of nodes reachable from the root (root included)
    pub fn attached_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            count += 1;
            stack.extend_from_slice(self.children(id));
        }
        count
    }

    // ------------------------------------------------------------------
    // Change tracking
    // ------------------------------------------------------------------

    pub fn changes(&self) -> &[Change] {
        self.changes.changes()
    }

    pub fn last_change(&self) -> Option<(NodeId, usize)> {
        self.changes.last_change()
    }

    pub fn drain_changes(&mut self) -> Vec<Change> {
        self.changes.drain()
    }

    // ------------------------------------------------------------------
    // Factory
    // ------------------------------------------------------------------

    fn insert_node(&mut self, kind: NodeKind, attributes: Attributes) -> NodeId {
        let length = match &kind {
            NodeKind::Text(value) => value.chars().count(),
            _ => 0,
        };
        let id = self.nodes.insert(ArchNode::new(kind, attributes));
        self.changes.change(id, Some(length));
        id
    }

    /// Create an unattached node; no tag means a virtual text placeholder
    pub fn create<N: AsRef<str>, V: AsRef<str>>(
        &mut self,
        node_name: Option<&str>,
        attributes: impl IntoIterator<Item = (N, V)>,
    ) -> NodeId {
        match node_name {
            None => self.create_virtual(),
            Some(name) => self.create_element(Tag::from_name(name), Attributes::from_pairs(attributes)),
        }
    }

    pub fn create_element(&mut self, tag: Tag, attributes: Attributes) -> NodeId {
        let kind = if tag == Tag::Br {
            NodeKind::LineBreak
        } else if let Some(kind) = self.kinds.lookup(&tag, &attributes) {
            NodeKind::Custom { kind, tag }
        } else {
            NodeKind::Element(tag)
        };
        self.insert_node(kind, attributes)
    }

    pub fn create_tag(&mut self, name: &str) -> NodeId {
        self.create_element(Tag::from_name(name), Attributes::default())
    }

    pub fn create_text(&mut self, value: impl Into<String>) -> NodeId {
        self.insert_node(NodeKind::Text(value.into()), Attributes::default())
    }

    pub fn create_virtual(&mut self) -> NodeId {
        self.insert_node(NodeKind::VirtualText, Attributes::default())
    }

    pub fn create_line_break(&mut self) -> NodeId {
        self.insert_node(NodeKind::LineBreak, Attributes::default())
    }

    pub fn create_fragment(&mut self) -> NodeId {
        self.insert_node(NodeKind::Fragment, Attributes::default())
    }

    pub(crate) fn create_architectural_space(&mut self, value: impl Into<String>) -> NodeId {
        self.insert_node(NodeKind::ArchitecturalSpace(value.into()), Attributes::default())
    }

    /// Same kind and attributes, no children
    pub(crate) fn create_like(&mut self, id: NodeId) -> ArchResult<NodeId> {
        let data = self.data(id)?;
        let kind = match &data.kind {
            NodeKind::Text(_) => NodeKind::Text(String::new()),
            other => other.clone(),
        };
        let attributes = data.attributes.clone();
        Ok(self.insert_node(kind, attributes))
    }

    /// Detached deep copy flagged as a clone of `id`
    pub fn clone_node(&mut self, id: NodeId, keep_virtual: bool) -> ArchResult<NodeId> {
        let data = self.data(id)?;
        let kind = data.kind.clone();
        let attributes = data.attributes.clone();
        let children = data.children.clone();

        let clone = self.nodes.insert(ArchNode::new(kind, attributes));
        self.data_mut(clone)?.clone_of = Some(id);
        for child in children {
            let node = self.node(child)?;
            if node.is_architectural_space() || (node.is_virtual() && !keep_virtual) {
                continue;
            }
            let cloned_child = self.clone_node(child, keep_virtual)?;
            self.data_mut(cloned_child)?.parent = Some(clone);
            self.data_mut(clone)?.children.push(cloned_child);
        }
        Ok(clone)
    }

    /// Free removed subtrees from the arena; their ids stop resolving
    pub fn purge_removed(&mut self) -> usize {
        let removed: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.removed)
            .map(|(id, _)| id)
            .collect();
        let mut purged = 0;
        let mut stack = removed;
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.remove(id) {
                purged += 1;
                stack.extend(node.children);
            }
        }
        debug!(purged, "Purged removed nodes");
        purged
    }

    // ------------------------------------------------------------------
    // Violations
    // ------------------------------------------------------------------

    pub(crate) fn refuse(&self, node: NodeId, kind: ViolationKind) -> ArchError {
        warn!(node = %node, violation = %kind, "Structural operation refused");
        ArchError::Violation(Violation { node, kind })
    }

    pub(crate) fn ensure_live(&self, id: NodeId) -> ArchResult<()> {
        if self.data(id)?.removed {
            return Err(self.refuse(id, ViolationKind::Removed));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    /// Index inside the parent; `None` for the root and detached nodes
    pub fn index(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|child| *child == id)
    }

    pub fn length(&self, id: NodeId) -> usize {
        self.nodes.get(id).map_or(0, ArchNode::length)
    }

    /// Refuse nodes that cannot hold children
    pub fn check_container(&self, id: NodeId) -> ArchResult<()> {
        let node = self.node(id)?;
        if node.is_void() {
            return Err(self.refuse(id, ViolationKind::VoidContainer));
        }
        if node.data().kind.is_text_like() {
            return Err(self.refuse(id, ViolationKind::NotAContainer));
        }
        Ok(())
    }

    /// Move `node` under `parent` at `index` (detach + attach in one step)
    pub(crate) fn change_parent(&mut self, parent: NodeId, node: NodeId, index: usize) -> ArchResult<()> {
        self.ensure_live(parent)?;
        self.ensure_live(node)?;
        if node == self.root {
            return Err(self.refuse(node, ViolationKind::Root));
        }

        self.check_container(parent)?;
        let target = self.node(parent)?;
        if !target.is_editable() {
            return Err(self.refuse(parent, ViolationKind::NotEditable));
        }
        if let Some(source) = self.parent(node) {
            if !self.node(source)?.is_editable() {
                return Err(self.refuse(node, ViolationKind::SourceNotEditable));
            }
        }
        if target.ancestor(|n| n.id() == node).is_some() {
            return Err(self.refuse(parent, ViolationKind::Cycle));
        }

        if matches!(self.data(node)?.kind, NodeKind::Fragment) {
            let children = self.data(node)?.children.clone();
            let mut index = index;
            for child in children {
                self.change_parent(parent, child, index)?;
                index += 1;
            }
            return self.remove(node);
        }

        let mut index = index;
        if let Some(source) = self.parent(node) {
            let position = self.index(node).ok_or(ArchError::NodeNotFound(node))?;
            if source == parent && position < index {
                index -= 1;
            }
            self.changes.change(source, Some(position));
            self.data_mut(source)?.children.remove(position);
        }

        let target = self.data_mut(parent)?;
        let index = index.min(target.children.len());
        target.children.insert(index, node);
        self.data_mut(node)?.parent = Some(parent);

        self.changes.add(node);
        self.changes.change(parent, Some(index));
        Ok(())
    }

    pub fn append(&mut self, parent: NodeId, node: NodeId) -> ArchResult<()> {
        let index = self.data(parent)?.children.len();
        self.change_parent(parent, node, index)
    }

    pub fn prepend(&mut self, parent: NodeId, node: NodeId) -> ArchResult<()> {
        self.change_parent(parent, node, 0)
    }

    pub fn insert_before(&mut self, parent: NodeId, node: NodeId, reference: NodeId) -> ArchResult<()> {
        let index = self.child_index(parent, reference)?;
        self.change_parent(parent, node, index)
    }

    pub fn insert_after(&mut self, parent: NodeId, node: NodeId, reference: NodeId) -> ArchResult<()> {
        let index = self.child_index(parent, reference)?;
        self.change_parent(parent, node, index + 1)
    }

    fn child_index(&self, parent: NodeId, child: NodeId) -> ArchResult<usize> {
        match self.index(child) {
            Some(index) if self.parent(child) == Some(parent) => Ok(index),
            _ => Err(self.refuse(child, ViolationKind::Detached)),
        }
    }

    /// Attach without editing policy; used while building detached subtrees
    pub(crate) fn attach(&mut self, parent: NodeId, node: NodeId) -> ArchResult<()> {
        self.data_mut(parent)?.children.push(node);
        self.data_mut(node)?.parent = Some(parent);
        Ok(())
    }

    /// Insert `node` as the previous sibling of `reference`
    pub fn before(&mut self, reference: NodeId, node: NodeId) -> ArchResult<()> {
        let parent = self.parent(reference).ok_or_else(|| self.refuse(reference, ViolationKind::Detached))?;
        self.insert_before(parent, node, reference)
    }

    /// Insert `node` as the next sibling of `reference`
    pub fn after(&mut self, reference: NodeId, node: NodeId) -> ArchResult<()> {
        let parent = self.parent(reference).ok_or_else(|| self.refuse(reference, ViolationKind::Detached))?;
        self.insert_after(parent, node, reference)
    }

    pub fn append_each(&mut self, parent: NodeId, nodes: &[NodeId]) -> ArchResult<()> {
        nodes.iter().try_for_each(|node| self.append(parent, *node))
    }

    pub fn prepend_each(&mut self, parent: NodeId, nodes: &[NodeId]) -> ArchResult<()> {
        nodes.iter().try_for_each(|node| self.prepend(parent, *node))
    }

    pub fn before_each(&mut self, reference: NodeId, nodes: &[NodeId]) -> ArchResult<()> {
        nodes.iter().try_for_each(|node| self.before(reference, *node))
    }

    pub fn after_each(&mut self, reference: NodeId, nodes: &[NodeId]) -> ArchResult<()> {
        nodes.iter().try_for_each(|node| self.after(reference, *node))
    }

    /// Detach and mark removed. Removal is terminal.
    pub fn remove(&mut self, id: NodeId) -> ArchResult<()> {
        self.check_removable(id)?;
        if let Some(parent) = self.parent(id) {
            if let Some(offset) = self.index(id) {
                self.data_mut(parent)?.children.remove(offset);
                self.changes.change(parent, Some(offset));
            }
        }
        self.changes.remove(id);
        let data = self.data_mut(id)?;
        data.parent = None;
        data.removed = true;
        debug!(node = %id, "Removed node");
        Ok(())
    }

    pub(crate) fn check_removable(&self, id: NodeId) -> ArchResult<()> {
        if id == self.root {
            return Err(self.refuse(id, ViolationKind::Root));
        }
        self.ensure_live(id)?;
        let node = self.node(id)?;
        if let Some(parent) = node.parent() {
            if !parent.is_editable() {
                return Err(self.refuse(id, ViolationKind::NotEditable));
            }
            if node.is_unbreakable() {
                return Err(self.refuse(id, ViolationKind::Unbreakable));
            }
        }
        Ok(())
    }

    /// Remove every child (text nodes are cleared instead)
    pub fn empty(&mut self, id: NodeId) -> ArchResult<()> {
        self.ensure_live(id)?;
        if !self.node(id)?.is_editable() {
            return Err(self.refuse(id, ViolationKind::NotEditable));
        }
        if let NodeKind::Text(value) = &mut self.data_mut(id)?.kind {
            value.clear();
        } else {
            for child in self.data(id)?.children.clone() {
                match self.remove(child) {
                    // Unbreakable children (eg. table cells) stay in place
                    Err(ArchError::Violation(Violation {
                        kind: ViolationKind::Unbreakable,
                        ..
                    })) => {}
                    result => result?,
                }
            }
        }
        self.changes.change(id, Some(0));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    fn update_attributes(&mut self, id: NodeId, update: impl FnOnce(&mut Attributes) -> bool) -> ArchResult<bool> {
        self.ensure_live(id)?;
        if !self.node(id)?.is_editable() {
            return Err(self.refuse(id, ViolationKind::NotEditable));
        }
        let changed = update(&mut self.data_mut(id)?.attributes);
        if changed {
            self.changes.change(id, None);
        }
        Ok(changed)
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> ArchResult<bool> {
        self.update_attributes(id, |attributes| attributes.add(name, value))
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> ArchResult<bool> {
        self.update_attributes(id, |attributes| attributes.remove(name))
    }

    pub fn add_class(&mut self, id: NodeId, class_names: &str) -> ArchResult<bool> {
        self.update_attributes(id, |attributes| attributes.add_class(class_names))
    }

    pub fn remove_class(&mut self, id: NodeId, class_names: &str) -> ArchResult<bool> {
        self.update_attributes(id, |attributes| attributes.remove_class(class_names))
    }

    pub fn set_style(&mut self, id: NodeId, name: &str, value: &str) -> ArchResult<bool> {
        self.update_attributes(id, |attributes| attributes.set_style(name, value))
    }

    pub fn remove_style(&mut self, id: NodeId, name: &str) -> ArchResult<bool> {
        self.update_attributes(id, |attributes| attributes.remove_style(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChangeKind;

    fn paragraph(arch: &mut Arch, text: &str) -> (NodeId, NodeId) {
        let p = arch.create_tag("p");
        let t = arch.create_text(text);
        arch.append(p, t).unwrap();
        arch.append(arch.root(), p).unwrap();
        (p, t)
    }

    #[test]
    fn test_parent_child_symmetry() {
        let mut arch = Arch::default();
        let (p, t) = paragraph(&mut arch, "a");
        let (p2, _) = paragraph(&mut arch, "b");

        for id in [p, t, p2] {
            let parent = arch.parent(id).unwrap();
            assert_eq!(arch.children(parent)[arch.index(id).unwrap()], id);
        }
        assert_eq!(arch.index(arch.root()), None);
    }

    #[test]
    fn test_moves_keep_ids() {
        let mut arch = Arch::default();
        let (p1, t1) = paragraph(&mut arch, "a");
        let (p2, t2) = paragraph(&mut arch, "b");

        arch.append(p2, t1).unwrap();
        arch.insert_before(p2, t2, t1).unwrap();
        arch.prepend(p1, t1).unwrap();
        arch.insert_after(p1, t2, t1).unwrap();

        assert_eq!(arch.children(p1), &[t1, t2]);
        assert!(arch.children(p2).is_empty());
        assert_eq!(arch.node(t1).unwrap().text(), Some("a"));
    }

    #[test]
    fn test_move_within_same_parent() {
        let mut arch = Arch::default();
        let p = arch.create_tag("p");
        let ids: Vec<_> = ["a", "b", "c"].iter().map(|t| arch.create_text(*t)).collect();
        arch.append_each(p, &ids).unwrap();

        arch.after(ids[2], ids[0]).unwrap();
        assert_eq!(arch.children(p), &[ids[1], ids[2], ids[0]]);
    }

    #[test]
    fn test_empty_keeps_unbreakable_children() {
        let mut arch = Arch::default();
        let div = arch.create_tag("div");
        let p = arch.create_tag("p");
        let td = arch.create_tag("td");
        arch.append_each(div, &[p, td]).unwrap();
        arch.append(arch.root(), div).unwrap();

        arch.empty(div).unwrap();
        assert_eq!(arch.children(div), &[td]);
        assert!(arch.is_removed(p));

        let err = arch.empty(p).unwrap_err();
        assert_eq!(err.violation(), Some(ViolationKind::Removed));
    }

    #[test]
    fn test_void_refuses_children() {
        let mut arch = Arch::default();
        let img = arch.create_tag("img");
        let t = arch.create_text("x");

        let err = arch.append(img, t).unwrap_err();
        assert_eq!(err.violation(), Some(ViolationKind::VoidContainer));
        assert!(arch.children(img).is_empty());
    }

    #[test]
    fn test_cycles_are_refused() {
        let mut arch = Arch::default();
        let (p, _) = paragraph(&mut arch, "a");
        let b = arch.create_tag("b");
        arch.append(p, b).unwrap();

        let err = arch.append(b, p).unwrap_err();
        assert_eq!(err.violation(), Some(ViolationKind::Cycle));
        assert_eq!(arch.parent(b), Some(p));
    }

    #[test]
    fn test_non_editable_regions() {
        let mut arch = Arch::default();
        let locked = arch.create_element(
            Tag::Div,
            Attributes::from_pairs([("contenteditable", "false")]),
        );
        arch.append(arch.root(), locked).unwrap();
        let t = arch.create_text("x");

        let err = arch.append(locked, t).unwrap_err();
        assert_eq!(err.violation(), Some(ViolationKind::NotEditable));
    }

    #[test]
    fn test_root_cannot_be_removed() {
        let mut arch = Arch::default();
        let root = arch.root();
        assert_eq!(arch.remove(root).unwrap_err().violation(), Some(ViolationKind::Root));
    }

    #[test]
    fn test_remove_is_terminal() {
        let mut arch = Arch::default();
        let (p, t) = paragraph(&mut arch, "a");
        arch.remove(t).unwrap();

        assert!(arch.is_removed(t));
        assert!(arch.children(p).is_empty());
        assert_eq!(arch.get_node(t).unwrap_err(), ArchError::NodeNotFound(t));
        assert_eq!(arch.append(p, t).unwrap_err().violation(), Some(ViolationKind::Removed));
    }

    #[test]
    fn test_fragment_children_are_spliced() {
        let mut arch = Arch::default();
        let (p, t) = paragraph(&mut arch, "a");
        let fragment = arch.create_fragment();
        let b = arch.create_text("b");
        let c = arch.create_text("c");
        arch.append_each(fragment, &[b, c]).unwrap();

        arch.append(p, fragment).unwrap();
        assert_eq!(arch.children(p), &[t, b, c]);
        assert!(arch.is_removed(fragment));
    }

    #[test]
    fn test_attribute_changes_are_tracked_once() {
        let mut arch = Arch::default();
        let (p, _) = paragraph(&mut arch, "a");
        arch.drain_changes();

        assert!(arch.set_attribute(p, "title", "x").unwrap());
        assert!(!arch.set_attribute(p, "title", "x").unwrap());
        assert!(!arch.remove_attribute(p, "missing").unwrap());
        assert!(arch.add_class(p, "lead").unwrap());

        let changes = arch.drain_changes();
        assert_eq!(changes.len(), 2);
        assert!(changes.iter().all(|c| c.kind == ChangeKind::Change && c.node == p));
    }

    #[test]
    fn test_purge_frees_removed_nodes() {
        let mut arch = Arch::default();
        let (p, t) = paragraph(&mut arch, "a");
        arch.remove(p).unwrap();

        assert_eq!(arch.purge_removed(), 2);
        assert!(!arch.contains_id(t));
        assert_eq!(arch.data(t).unwrap_err(), ArchError::NodeNotFound(t));
    }

    #[test]
    fn test_clone_node_skips_virtual() {
        let mut arch = Arch::default();
        let (p, _) = paragraph(&mut arch, "a");
        let v = arch.create_virtual();
        arch.append(p, v).unwrap();

        let clone = arch.clone_node(p, false).unwrap();
        assert!(arch.node(clone).unwrap().is_clone());
        assert_eq!(arch.children(clone).len(), 1);
        assert_eq!(arch.parent(clone), None);
    }
}
