//! Tree traversal: sibling and child queries, ancestor chains, and the
//! pre-order walk used to move the caret across nodes.

use crate::errors::ArchResult;
use crate::node::NodeId;
use crate::predicates::NodeRef;
use crate::Arch;
use tracing::trace;

impl<'a> NodeRef<'a> {
    /// Position inside the parent; `None` for the root and detached nodes
    pub fn index(&self) -> Option<usize> {
        self.arch().index(self.id())
    }

    pub fn children_ids(&self) -> Vec<NodeId> {
        self.data().children().to_vec()
    }

    pub fn next_sibling(&self) -> Option<NodeRef<'a>> {
        self.next_sibling_by(|_| true)
    }

    pub fn previous_sibling(&self) -> Option<NodeRef<'a>> {
        self.previous_sibling_by(|_| true)
    }

    /// First following editable sibling matching `pred`, skipping
    /// architectural space
    pub fn next_sibling_by(&self, pred: impl Fn(NodeRef<'a>) -> bool) -> Option<NodeRef<'a>> {
        let parent = self.parent()?;
        let index = self.index()?;
        parent
            .children()
            .skip(index + 1)
            .find(|sibling| Self::sibling_matches(sibling, &pred))
    }

    pub fn previous_sibling_by(&self, pred: impl Fn(NodeRef<'a>) -> bool) -> Option<NodeRef<'a>> {
        let parent = self.parent()?;
        let index = self.index()?;
        let arch = self.arch();
        parent.data().children[..index]
            .iter()
            .rev()
            .filter_map(|id| arch.node(*id).ok())
            .find(|sibling| Self::sibling_matches(sibling, &pred))
    }

    fn sibling_matches(sibling: &NodeRef<'a>, pred: &impl Fn(NodeRef<'a>) -> bool) -> bool {
        !sibling.is_architectural_space() && sibling.is_editable() && pred(*sibling)
    }

    pub fn first_child(&self) -> Option<NodeRef<'a>> {
        self.child(0)
    }

    pub fn last_child(&self) -> Option<NodeRef<'a>> {
        self.child_count().checked_sub(1).and_then(|last| self.child(last))
    }

    /// Follow first children downward until one matches `pred`
    pub fn first_child_by(&self, pred: impl Fn(NodeRef<'a>) -> bool) -> Option<NodeRef<'a>> {
        let mut current = self.first_child()?;
        while !pred(current) {
            current = current.first_child()?;
        }
        Some(current)
    }

    /// Follow last children downward until one matches `pred`
    pub fn last_child_by(&self, pred: impl Fn(NodeRef<'a>) -> bool) -> Option<NodeRef<'a>> {
        let mut current = self.last_child()?;
        while !pred(current) {
            current = current.last_child()?;
        }
        Some(current)
    }

    pub fn visible_children(&self) -> Vec<NodeRef<'a>> {
        self.children()
            .filter(|child| !child.is_architectural_space())
            .collect()
    }

    /// Child indices from `ancestor` (exclusive) down to this node
    pub fn path(&self, ancestor: Option<NodeId>) -> Vec<usize> {
        let mut path = Vec::new();
        let mut node = *self;
        while let Some(parent) = node.parent() {
            if Some(parent.id()) == ancestor {
                break;
            }
            if let Some(index) = node.index() {
                path.push(index);
            }
            node = parent;
        }
        path.reverse();
        path
    }

    /// Strict descendant check
    pub fn contains(&self, other: NodeId) -> bool {
        self.at(other)
            .and_then(|node| node.parent())
            .is_some_and(|parent| parent.is_descendent_of(self.id()))
    }

    /// Self-or-ancestor chain up to the root (root included)
    pub fn ancestors(&self) -> Vec<NodeRef<'a>> {
        let mut chain = vec![*self];
        let mut current = self.parent();
        while let Some(node) = current {
            chain.push(node);
            current = node.parent();
        }
        chain
    }

    /// Non content-editable ancestors (self first), stopping after the
    /// first one matching `pred`
    pub fn list_ancestor(&self, pred: impl Fn(NodeRef<'a>) -> bool) -> Vec<NodeRef<'a>> {
        let mut ancestors = Vec::new();
        let mut current = Some(*self);
        while let Some(node) = current {
            if !node.is_content_editable() {
                ancestors.push(node);
            }
            if pred(node) {
                break;
            }
            current = node.parent();
        }
        ancestors
    }

    /// Nearest node containing both `self` and `other`
    pub fn common_ancestor(&self, other: NodeId) -> Option<NodeRef<'a>> {
        let ancestors = self.ancestors();
        let other = self.at(other)?;
        other
            .ancestors()
            .into_iter()
            .find(|node| ancestors.iter().any(|a| a.id() == node.id()))
    }

    /// Next node in pre-order: first child, else next sibling, else the
    /// next sibling of the closest ancestor that has one
    pub fn walk_next(&self) -> Option<NodeRef<'a>> {
        if let Some(first) = self.first_child() {
            return Some(first);
        }
        let mut node = *self;
        while let Some(parent) = node.parent() {
            let index = node.index()?;
            if let Some(next) = parent.child(index + 1) {
                return Some(next);
            }
            node = parent;
        }
        None
    }

    /// Previous node in pre-order: the deepest last descendant of the
    /// previous sibling, else the parent
    pub fn walk_prev(&self) -> Option<NodeRef<'a>> {
        let parent = self.parent()?;
        let index = self.index()?;
        if index == 0 {
            return Some(parent);
        }
        let mut prev = parent.child(index - 1)?;
        while let Some(last) = prev.last_child() {
            prev = last;
        }
        Some(prev)
    }
}

enum Step {
    Found(NodeId),
    Continue(NodeId),
    Boundary { insert_virtual: bool },
}

impl Arch {
    pub fn next(&mut self, id: NodeId) -> ArchResult<NodeId> {
        self.prev_next_until(id, false, |_| true)
    }

    pub fn prev(&mut self, id: NodeId) -> ArchResult<NodeId> {
        self.prev_next_until(id, true, |_| true)
    }

    pub fn next_until(&mut self, id: NodeId, pred: impl Fn(NodeRef<'_>) -> bool) -> ArchResult<NodeId> {
        self.prev_next_until(id, false, pred)
    }

    pub fn prev_until(&mut self, id: NodeId, pred: impl Fn(NodeRef<'_>) -> bool) -> ArchResult<NodeId> {
        self.prev_next_until(id, true, pred)
    }

    /// Pre-order walk until `pred` matches. Architectural space is skipped.
    /// At the end of the tree or at an unbreakable boundary a virtual text
    /// is inserted next to the last legal node and returned; the root and
    /// clones stop on themselves instead.
    fn prev_next_until(
        &mut self,
        id: NodeId,
        is_prev: bool,
        pred: impl Fn(NodeRef<'_>) -> bool,
    ) -> ArchResult<NodeId> {
        let mut current = id;
        loop {
            let step = {
                let node = self.node(current)?;
                let next = if is_prev { node.walk_prev() } else { node.walk_next() };
                match next {
                    Some(next) if !next.is_unbreakable() => {
                        if next.is_architectural_space() || !pred(next) {
                            Step::Continue(next.id())
                        } else {
                            Step::Found(next.id())
                        }
                    }
                    _ => Step::Boundary {
                        insert_virtual: node.is_editable() && !node.is_root() && !node.is_clone(),
                    },
                }
            };

            match step {
                Step::Found(found) => return Ok(found),
                Step::Continue(next) => current = next,
                Step::Boundary { insert_virtual: true } => {
                    let virtual_text = self.create_virtual();
                    if is_prev {
                        self.before(current, virtual_text)?;
                    } else {
                        self.after(current, virtual_text)?;
                    }
                    trace!(node = %current, virtual_text = %virtual_text, "Walk stopped at boundary");
                    return Ok(virtual_text);
                }
                Step::Boundary { insert_virtual: false } => return Ok(current),
            }
        }
    }
}
