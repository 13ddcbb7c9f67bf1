//! Edit algorithms built on the tree primitives: insertion, splitting,
//! wrapping, boundary merges (`delete_edge`), line insertion and the
//! backspace/delete entry points.
//!
//! Each algorithm dispatches on the node kind of its target. Refusals come
//! back as [`ArchError::Violation`] and leave the tree as it was before the
//! refused step.

use crate::errors::{ArchResult, ViolationKind};
use crate::kind::Capability;
use crate::node::{NodeId, NodeKind};
use crate::{Arch, EqualityOptions};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const NBSP: char = '\u{a0}';

/// Knobs for [`Arch::delete_edge`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEdgeOptions {
    /// Stop collecting edges at the first block
    #[serde(default)]
    pub do_not_break_blocks: bool,
    /// Never remove or unwrap empty nodes
    #[serde(default)]
    pub do_not_remove_empty: bool,
    /// Only merge nodes with the same tag and attributes
    #[serde(default)]
    pub merge_only_if_same_type: bool,
}

fn byte_offset(value: &str, offset: usize) -> usize {
    value.char_indices().nth(offset).map_or(value.len(), |(index, _)| index)
}

fn split_chars(value: &str, offset: usize) -> (&str, &str) {
    value.split_at(byte_offset(value, offset))
}

/// Plain spaces never sit at the edges of a text or next to each other;
/// they become no-break spaces there
fn normalize_spaces(text: &str) -> String {
    let text = text.replace(NBSP, " ").replace("  ", " \u{a0}");
    nbsp_edges(&text, true, true)
}

fn nbsp_edges(text: &str, leading: bool, trailing: bool) -> String {
    let mut result = text.to_string();
    if trailing && result.ends_with(' ') {
        result.pop();
        result.push(NBSP);
    }
    if leading && result.starts_with(' ') {
        result.replace_range(..1, "\u{a0}");
    }
    result
}

impl Arch {
    fn text_value(&self, id: NodeId) -> ArchResult<String> {
        Ok(self.data(id)?.kind.text().unwrap_or_default().to_string())
    }

    /// Replace the value of a text node; virtual text becomes real text
    pub(crate) fn set_text(&mut self, id: NodeId, value: String) -> ArchResult<()> {
        if !matches!(self.data(id)?.kind, NodeKind::Text(_) | NodeKind::VirtualText) {
            return Err(self.refuse(id, ViolationKind::NotAContainer));
        }
        self.data_mut(id)?.kind = NodeKind::Text(value);
        Ok(())
    }

    fn in_pre(&self, id: NodeId) -> ArchResult<bool> {
        Ok(self.node(id)?.is_in(Capability::Pre))
    }

    fn require_editable(&self, id: NodeId) -> ArchResult<()> {
        self.ensure_live(id)?;
        if !self.node(id)?.is_editable() {
            return Err(self.refuse(id, ViolationKind::NotEditable));
        }
        Ok(())
    }

    fn require_parent(&self, id: NodeId) -> ArchResult<NodeId> {
        self.parent(id)
            .ok_or_else(|| self.refuse(id, ViolationKind::Detached))
    }

    fn require_index(&self, id: NodeId) -> ArchResult<usize> {
        self.index(id)
            .ok_or_else(|| self.refuse(id, ViolationKind::Detached))
    }

    // ------------------------------------------------------------------
    // Insertion
    // ------------------------------------------------------------------

    /// Kind-aware insertion of `node` at `offset` inside `target`
    #[instrument(level = "debug", skip(self))]
    pub fn insert(&mut self, target: NodeId, node: NodeId, offset: usize) -> ArchResult<()> {
        self.require_editable(target)?;
        let kind = self.data(target)?.kind.clone();
        let target_is_void = self.node(target)?.is_void();
        let visible_text = self.node(node)?.is_visible_text();

        match kind {
            NodeKind::Text(_) | NodeKind::VirtualText if visible_text => {
                if node == target {
                    return Err(self.refuse(node, ViolationKind::Cycle));
                }
                // The carrier node is consumed by the merge
                self.check_removable(node)?;
                let value = self.text_value(node)?;
                self.remove(node)?;
                self.insert_text(target, offset, &value)
            }
            NodeKind::Text(_) => {
                let next = self.split(target, offset)?;
                let parent = self.require_parent(next)?;
                let index = self.require_index(next)?;
                self.insert(parent, node, index)
            }
            NodeKind::VirtualText | NodeKind::ArchitecturalSpace(_) => {
                let parent = self.require_parent(target)?;
                let index = self.require_index(target)?;
                self.insert(parent, node, index)
            }
            NodeKind::LineBreak => self.insert_at_line_break(target, node),
            _ if target_is_void => {
                let parent = self.require_parent(target)?;
                let index = self.require_index(target)?;
                self.insert(parent, node, index)
            }
            _ => {
                let length = self.length(node);
                self.changes.change(node, Some(length));
                match self.children(target).get(offset).copied() {
                    Some(reference) => self.insert_before(target, node, reference),
                    None => self.append(target, node),
                }
            }
        }
    }

    /// A line break is replaced by leading text when nothing visible
    /// precedes it
    fn insert_at_line_break(&mut self, br: NodeId, node: NodeId) -> ArchResult<()> {
        let inserted = self.node(node)?;
        if inserted.is_br() {
            self.changes.change(node, Some(0));
            return self.after(br, node);
        }
        let replaces_br = inserted.is_text()
            && !inserted.is_virtual()
            && self.node(br)?.previous_sibling().map_or(true, |prev| {
                prev.is_empty() && (!prev.is_text() || prev.is_virtual())
            });
        if replaces_br {
            let length = self.length(node);
            self.changes.change(node, Some(length));
            self.before(br, node)?;
            return self.remove(br);
        }
        let parent = self.require_parent(br)?;
        let index = self.require_index(br)?;
        self.insert(parent, node, index + 1)
    }

    /// Typing: insert `text` at a char offset, normalizing spaces outside `pre`
    #[instrument(level = "debug", skip(self))]
    pub fn insert_text(&mut self, target: NodeId, offset: usize, text: &str) -> ArchResult<()> {
        self.require_editable(target)?;
        let is_text = matches!(self.data(target)?.kind, NodeKind::Text(_) | NodeKind::VirtualText);
        if !is_text {
            let node = self.create_text(text);
            return self.insert(target, node, offset);
        }

        let value = self.text_value(target)?;
        let offset = offset.min(value.chars().count());
        let (start, end) = split_chars(&value, offset);
        let joined = format!("{}{}{}", start, text, end);
        let joined = if self.in_pre(target)? {
            joined
        } else {
            normalize_spaces(&joined)
        };
        self.set_text(target, joined)?;
        self.changes
            .change(target, Some(offset + text.chars().count()));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Split / wrap
    // ------------------------------------------------------------------

    /// Split at `offset`, returning the right-hand node
    #[instrument(level = "debug", skip(self))]
    pub fn split(&mut self, id: NodeId, offset: usize) -> ArchResult<NodeId> {
        self.ensure_live(id)?;
        let node = self.node(id)?;
        let can_split = node.custom_kind().map_or(true, |kind| kind.can_split());
        match node.kind().clone() {
            NodeKind::Root => {
                let reference = self
                    .children(id)
                    .get(offset)
                    .copied()
                    .ok_or_else(|| self.refuse(id, ViolationKind::OutOfBounds))?;
                let virtual_text = self.create_virtual();
                self.after(reference, virtual_text)?;
                Ok(virtual_text)
            }
            NodeKind::Text(_) | NodeKind::VirtualText => self.split_text(id, offset),
            NodeKind::LineBreak | NodeKind::ArchitecturalSpace(_) | NodeKind::Fragment => {
                Err(self.refuse(id, ViolationKind::NotSplittable))
            }
            NodeKind::Custom { .. } if !can_split => {
                Err(self.refuse(id, ViolationKind::NotSplittable))
            }
            _ => self.split_element(id, offset),
        }
    }

    fn split_element(&mut self, id: NodeId, offset: usize) -> ArchResult<NodeId> {
        let node = self.node(id)?;
        if node.is_unbreakable() {
            return Err(self.refuse(id, ViolationKind::Unbreakable));
        }
        if !node.is_editable() {
            return Err(self.refuse(id, ViolationKind::NotEditable));
        }
        self.require_parent(id)?;

        let sibling = self.create_like(id)?;
        self.changes.change(sibling, Some(0));

        let children = self.children(id);
        let moved = children[offset.min(children.len())..].to_vec();
        for child in moved.into_iter().rev() {
            self.prepend(sibling, child)?;
        }
        self.after(id, sibling)?;
        debug!(node = %id, sibling = %sibling, offset, "Split element");
        Ok(sibling)
    }

    fn split_text(&mut self, id: NodeId, offset: usize) -> ArchResult<NodeId> {
        if !self.node(id)?.is_editable() {
            return Err(self.refuse(id, ViolationKind::NotEditable));
        }
        self.require_parent(id)?;
        let value = self.text_value(id)?;
        if offset > value.chars().count() {
            return Err(self.refuse(id, ViolationKind::OutOfBounds));
        }

        if offset == 0 {
            self.changes.change(id, Some(0));
            let virtual_text = self.create_virtual();
            self.before(id, virtual_text)?;
            return Ok(id);
        }

        let (prefix, suffix) = split_chars(&value, offset);
        let (prefix, suffix) = if self.in_pre(id)? {
            (prefix.to_string(), suffix.to_string())
        } else {
            (nbsp_edges(prefix, false, true), nbsp_edges(suffix, true, true))
        };

        let right = if suffix.is_empty() {
            self.create_virtual()
        } else {
            self.create_text(suffix)
        };
        self.changes.change(right, Some(0));

        self.set_text(id, prefix)?;
        self.changes.change(id, Some(offset));
        self.after(id, right)?;
        Ok(right)
    }

    /// Split upward until `ancestor` or an unbreakable node; returns the
    /// node the walk stopped at (`ancestor` or that unbreakable node)
    #[instrument(level = "debug", skip(self))]
    pub fn split_until(&mut self, id: NodeId, ancestor: NodeId, offset: usize) -> ArchResult<NodeId> {
        let mut current = id;
        let mut offset = offset;
        loop {
            if current == ancestor || self.node(current)?.is_unbreakable() {
                return Ok(current);
            }
            let right = self.split(current, offset)?;
            offset = self.require_index(right)?;
            current = self.require_parent(right)?;
        }
    }

    /// Put `id` inside a new `tag` element that takes its place
    #[instrument(level = "debug", skip(self))]
    pub fn wrap(&mut self, id: NodeId, tag: &str) -> ArchResult<NodeId> {
        let wrapper = self.create_tag(tag);
        self.wrap_in(id, wrapper)?;
        Ok(wrapper)
    }

    /// Put `id` inside the detached `wrapper`, which takes its place
    pub fn wrap_in(&mut self, id: NodeId, wrapper: NodeId) -> ArchResult<()> {
        self.check_container(wrapper)?;
        self.before(id, wrapper)?;
        if let Err(error) = self.append(wrapper, id) {
            self.remove(wrapper)?;
            return Err(error);
        }
        Ok(())
    }

    /// Replace `id` by its children
    #[instrument(level = "debug", skip(self))]
    pub fn unwrap(&mut self, id: NodeId) -> ArchResult<()> {
        self.check_removable(id)?;
        let children = self.children(id).to_vec();
        if !children.is_empty() {
            self.before_each(id, &children)?;
        }
        self.remove(id)
    }

    // ------------------------------------------------------------------
    // Merging
    // ------------------------------------------------------------------

    /// Same tag and equal attributes (classes compared as sets)
    pub fn is_mergeable_with(&self, a: NodeId, b: NodeId) -> ArchResult<bool> {
        let (a, b) = (self.node(a)?, self.node(b)?);
        Ok(a.is_element()
            && b.is_element()
            && a.tag() == b.tag()
            && a.attributes().is_equal(b.attributes(), &EqualityOptions::default()))
    }

    /// Move the children of `id` into `next` (appended when `is_left`,
    /// prepended otherwise), then remove `id`. The join point becomes the
    /// last change.
    fn merge_into(&mut self, id: NodeId, next: NodeId, is_left: bool) -> ArchResult<()> {
        let target = self.node(next)?;
        if target.is_unbreakable() || self.node(id)?.is_unbreakable() {
            return Err(self.refuse(next, ViolationKind::Unbreakable));
        }
        if target.is_text() || target.is_void() {
            return Err(self.refuse(next, ViolationKind::NotAContainer));
        }
        self.check_removable(id)?;

        let children = self.children(id).to_vec();
        let join = if is_left {
            let join = self.children(next).len();
            self.append_each(next, &children)?;
            join
        } else {
            let reversed: Vec<_> = children.iter().rev().copied().collect();
            self.prepend_each(next, &reversed)?;
            children.len()
        };
        self.remove(id)?;
        self.changes.change(next, Some(join));
        debug!(node = %id, into = %next, join, "Merged node");
        Ok(())
    }

    /// Merge the boundary between `id` and its neighbour in the deletion
    /// direction, from the outermost edge down
    #[instrument(level = "debug", skip(self))]
    pub fn delete_edge(&mut self, id: NodeId, is_left: bool, options: DeleteEdgeOptions) -> ArchResult<()> {
        let mut options = options;
        let edges = self.collect_edges(id, is_left, &options)?;

        for edge in edges.into_iter().rev() {
            if self.is_removed(edge) {
                continue;
            }
            let node = self.node(edge)?;
            if node.is_unbreakable() {
                continue;
            }
            let next = if is_left {
                node.previous_sibling()
            } else {
                node.next_sibling()
            };
            let Some(next) = next else {
                continue;
            };
            if next.is_unbreakable() {
                continue;
            }

            if !options.do_not_remove_empty && node.is_deep_empty() {
                if next.is_void() || next.is_text() {
                    self.unwrap(edge)?;
                } else {
                    let next = next.id();
                    self.merge_into(edge, next, is_left)?;
                }
                continue;
            }

            let mut next = next.id();
            let node = self.node(edge)?;
            if node.is_format_node() && self.node(next)?.is_list() {
                match self.relocate_into_list(edge, next, is_left)? {
                    Some(item) => next = item,
                    None => continue,
                }
                options.merge_only_if_same_type = true;
            }

            let neighbour = self.node(next)?;
            let only_br = !neighbour.is_text()
                && !neighbour.is_void()
                && neighbour.child_count() == 1
                && neighbour.first_child().is_some_and(|child| child.is_br());
            if only_br {
                self.empty(next)?;
            }

            let node = self.node(edge)?;
            let different_types =
                !options.merge_only_if_same_type && node.is_block() && self.node(next)?.is_format_node();
            if different_types || self.is_mergeable_with(edge, next)? {
                let next_is_after = node.next_sibling().map(|n| n.id()) == Some(next);
                if different_types && next_is_after {
                    // Mixed merges always pull the right node into the left one
                    self.merge_into(next, edge, true)?;
                } else {
                    self.merge_into(edge, next, is_left)?;
                }
            }
        }
        Ok(())
    }

    /// Non-text nodes from `id` up, while each one is on the deletion edge
    /// of its parent
    fn collect_edges(&self, id: NodeId, is_left: bool, options: &DeleteEdgeOptions) -> ArchResult<Vec<NodeId>> {
        let mut edges = Vec::new();
        let mut current = self.node(id)?;
        loop {
            if current.is_root() || (options.do_not_break_blocks && current.is_block()) {
                break;
            }
            if !current.is_text() {
                edges.push(current.id());
            }
            let Some(parent) = current.parent() else {
                break;
            };
            let on_edge = if is_left {
                current.is_left_edge_of(parent.id())
            } else {
                current.is_right_edge_of(parent.id())
            };
            if !on_edge {
                break;
            }
            current = parent;
        }
        Ok(edges)
    }

    /// Move a format node next to the closest list item content on the
    /// list's facing side. Bare text in the item is wrapped in a paragraph.
    fn relocate_into_list(&mut self, id: NodeId, list: NodeId, is_left: bool) -> ArchResult<Option<NodeId>> {
        let list_ref = self.node(list)?;
        let in_item = |node: crate::NodeRef<'_>| node.parent().is_some_and(|parent| parent.is_li());
        let item = if is_left {
            list_ref.last_child_by(in_item)
        } else {
            list_ref.first_child_by(in_item)
        };
        let Some(item) = item else {
            return Ok(None);
        };
        let mut item_id = item.id();
        if item.is_text() {
            item_id = self.wrap(item_id, "p")?;
        }
        if is_left {
            self.after(item_id, id)?;
        } else {
            self.before(item_id, id)?;
        }
        Ok(Some(item_id))
    }

    // ------------------------------------------------------------------
    // Line insertion
    // ------------------------------------------------------------------

    /// Insert a line at `offset` (Enter key)
    #[instrument(level = "debug", skip(self))]
    pub fn add_line(&mut self, id: NodeId, offset: usize) -> ArchResult<()> {
        self.ensure_live(id)?;
        match self.data(id)?.kind.clone() {
            NodeKind::Text(_) | NodeKind::VirtualText => self.add_line_in_text(id, offset),
            NodeKind::LineBreak => {
                let parent = self.require_parent(id)?;
                let index = self.require_index(id)?;
                self.add_line(parent, index + 1)
            }
            _ => self.add_line_in_element(id, offset),
        }
    }

    fn add_line_in_text(&mut self, id: NodeId, offset: usize) -> ArchResult<()> {
        self.require_editable(id)?;
        let parent = self.require_parent(id)?;
        let next = match self.split(id, offset) {
            Ok(next) => next,
            Err(_) => self
                .node(id)?
                .next_sibling()
                .map_or(id, |sibling| sibling.id()),
        };
        if self.node(next)?.is_right_edge() {
            self.changes.change(next, Some(0));
        }
        let index = self.require_index(next)?;
        self.add_line(parent, index)
    }

    fn add_line_in_element(&mut self, id: NodeId, offset: usize) -> ArchResult<()> {
        let node = self.node(id)?;
        if node.ancestor(|n| n.is_para()).is_none() {
            return Ok(());
        }
        if !node.is_editable() {
            return Err(self.refuse(id, ViolationKind::NotEditable));
        }

        // A trailing placeholder leaves its formatting container when the
        // line continues in an enclosing paragraph
        let trailing_virtual = node
            .child(offset)
            .filter(|child| child.is_right_edge() && child.is_virtual())
            .map(|child| child.id());
        let escapes = !node.is_unbreakable()
            && (node.is_format_node() || node.is_para())
            && node.parent().is_some_and(|parent| parent.is_in(Capability::Para));
        if let (Some(virtual_text), true) = (trailing_virtual, escapes) {
            self.after(id, virtual_text)?;
            if self.node(id)?.is_empty() {
                let placeholder = self.create_virtual();
                self.append(id, placeholder)?;
            }
            let parent = self.require_parent(virtual_text)?;
            let index = self.require_index(virtual_text)?;
            return self.add_line(parent, index);
        }

        let node = self.node(id)?;
        let splittable = !node.is_unbreakable()
            && node.custom_kind().map_or(true, |kind| kind.can_split())
            && node.parent().is_some();
        if splittable {
            if let Ok(next) = self.split(id, offset) {
                let parent = self.require_parent(next)?;
                let index = self.require_index(next)?;
                return self.add_line(parent, index);
            }
        }

        let child_is_block = self
            .node(id)?
            .child(offset)
            .is_some_and(|child| child.is_block());
        if !child_is_block {
            let br = self.create_line_break();
            self.insert(id, br, offset)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Backspace / delete
    // ------------------------------------------------------------------

    /// Backspace at `offset` inside `id`
    #[instrument(level = "debug", skip(self))]
    pub fn remove_left(&mut self, id: NodeId, offset: usize) -> ArchResult<()> {
        self.remove_side(id, offset, true)
    }

    /// Delete at `offset` inside `id`
    #[instrument(level = "debug", skip(self))]
    pub fn remove_right(&mut self, id: NodeId, offset: usize) -> ArchResult<()> {
        self.remove_side(id, offset, false)
    }

    fn remove_side(&mut self, id: NodeId, offset: usize, is_left: bool) -> ArchResult<()> {
        self.ensure_live(id)?;
        let node = self.node(id)?;
        let removes_whole = node.custom_kind().is_some_and(|kind| kind.removes_whole());
        match node.kind().clone() {
            NodeKind::Text(_) | NodeKind::VirtualText => self.remove_side_in_text(id, offset, is_left),
            NodeKind::LineBreak => self.remove_side_at_line_break(id, is_left),
            NodeKind::Custom { .. } if removes_whole => {
                self.remove(id)
            }
            NodeKind::ArchitecturalSpace(_) => {
                let parent = self.require_parent(id)?;
                let index = self.require_index(id)?;
                let offset = if is_left { index } else { index + 1 };
                self.remove_side(parent, offset, is_left)
            }
            _ => {
                let children = self.children(id).to_vec();
                if children.is_empty() {
                    return self.remove(id);
                }
                if is_left && offset == 0 {
                    return self.delete_edge(id, true, DeleteEdgeOptions::default());
                }
                if !is_left && offset >= children.len() {
                    return self.delete_edge(id, false, DeleteEdgeOptions::default());
                }
                if is_left {
                    let child = children[offset.min(children.len()) - 1];
                    let length = self.length(child);
                    self.remove_side(child, length, true)
                } else {
                    self.remove_side(children[offset], 0, false)
                }
            }
        }
    }

    fn remove_side_in_text(&mut self, id: NodeId, offset: usize, is_left: bool) -> ArchResult<()> {
        let node = self.node(id)?;
        let length = node.length();
        let at_edge = if is_left { offset == 0 } else { offset >= length };

        if at_edge {
            let sibling = if is_left {
                node.previous_sibling()
            } else {
                node.next_sibling()
            };
            if let Some(sibling) = sibling {
                let offset = if is_left { sibling.length() } else { 0 };
                let sibling = sibling.id();
                return self.remove_side(sibling, offset, is_left);
            }
            return self.remove_across_parent(id, is_left);
        }

        if length == 1 {
            let node = self.node(id)?;
            if node.previous_sibling().is_none() || node.next_sibling().is_none() {
                let placeholder = self.create_virtual();
                self.after(id, placeholder)?;
            }
            return self.remove(id);
        }

        let index = if is_left { offset - 1 } else { offset };
        let value: String = self
            .text_value(id)?
            .chars()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, c)| c)
            .collect();
        self.set_text(id, value)?;
        self.changes.change(id, Some(index));
        Ok(())
    }

    /// No sibling left in the deletion direction: look for inline content
    /// next to an ancestor before merging block edges
    fn remove_across_parent(&mut self, id: NodeId, is_left: bool) -> ArchResult<()> {
        let parent = self.require_parent(id)?;
        let mut ancestor = Some(parent);
        while let Some(current) = ancestor {
            let node = self.node(current)?;
            if node.is_root() {
                break;
            }
            let auntie = if is_left {
                node.previous_sibling()
            } else {
                node.next_sibling()
            };
            if auntie.is_some_and(|auntie| !auntie.is_block() || auntie.is_void()) {
                let placeholder = self.create_virtual();
                if is_left {
                    self.before(current, placeholder)?;
                } else {
                    self.after(current, placeholder)?;
                }
                self.remove_side(placeholder, 0, is_left)?;
                if !self.is_removed(placeholder) {
                    self.remove(placeholder)?;
                }
                let options = DeleteEdgeOptions {
                    do_not_break_blocks: true,
                    ..Default::default()
                };
                return self.delete_edge(parent, is_left, options);
            }
            ancestor = node.parent().map(|p| p.id());
        }
        self.delete_edge(parent, is_left, DeleteEdgeOptions::default())
    }

    fn remove_side_at_line_break(&mut self, id: NodeId, is_left: bool) -> ArchResult<()> {
        let node = self.node(id)?;
        let block = node
            .ancestor(|n| n.is_block())
            .filter(|block| !block.is_root() && block.is_deep_empty())
            .map(|block| block.id());
        if let Some(block) = block {
            return self.remove(block);
        }
        if let Some(prev) = node.previous_sibling() {
            let (prev, length) = (prev.id(), prev.length());
            self.changes.change(prev, Some(length));
            return self.remove(id);
        }
        let parent = self.require_parent(id)?;
        self.changes.change(id, None);
        self.delete_edge(parent, is_left, DeleteEdgeOptions::default())
    }
}
