//! # Range
//!
//! Logical selection over the Arch tree: a start and end container id with
//! an offset in each (chars for text, child index for elements).
//!
//! A `Range` is a snapshot. Edits do not keep it up to date; resolve a new
//! one after every mutation before trusting its offsets.

use crate::errors::{EditorError, EditorResult};
use crate::selection::SelectionBridge;
use serde::{Deserialize, Serialize};
use wysiwyg_arch::{Arch, ArchError, NodeId, NodeRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub sc: NodeId,
    pub so: usize,
    pub ec: NodeId,
    pub eo: usize,
}

/// A partially specified range. Containers are given by id or by host
/// handle; missing pieces are filled in by [`Range::replace`].
#[derive(Debug, Clone, PartialEq)]
pub struct PartialRange<H> {
    pub sc_id: Option<NodeId>,
    pub sc: Option<H>,
    pub so: Option<usize>,
    pub ec_id: Option<NodeId>,
    pub ec: Option<H>,
    pub eo: Option<usize>,
}

impl<H> Default for PartialRange<H> {
    fn default() -> Self {
        Self {
            sc_id: None,
            sc: None,
            so: None,
            ec_id: None,
            ec: None,
            eo: None,
        }
    }
}

impl<H> PartialRange<H> {
    /// The whole of one node
    pub fn node(id: NodeId) -> Self {
        Self {
            sc_id: Some(id),
            ..Default::default()
        }
    }

    /// The whole of one host node
    pub fn handle(handle: H) -> Self {
        Self {
            sc: Some(handle),
            ..Default::default()
        }
    }

    /// Collapsed at `offset` inside `id`
    pub fn caret(id: NodeId, offset: usize) -> Self {
        Self {
            sc_id: Some(id),
            so: Some(offset),
            ..Default::default()
        }
    }

    pub fn between(sc: NodeId, so: usize, ec: NodeId, eo: usize) -> Self {
        Self {
            sc_id: Some(sc),
            so: Some(so),
            ec_id: Some(ec),
            ec: None,
            eo: Some(eo),
            sc: None,
        }
    }
}

impl From<Range> for PartialRange<NodeId> {
    fn from(range: Range) -> Self {
        PartialRange::between(range.sc, range.so, range.ec, range.eo)
    }
}

impl Range {
    /// Collapsed range at `offset` inside `id`, without validation
    pub fn caret(id: NodeId, offset: usize) -> Self {
        Self {
            sc: id,
            so: offset,
            ec: id,
            eo: offset,
        }
    }

    /// Collapsed range at the deepest leaf found at `offset` inside `id`.
    /// Void children and architectural space are not entered.
    pub fn leaf_caret(arch: &Arch, id: NodeId, offset: usize) -> Self {
        let (mut id, mut offset) = (id, offset);
        while let Ok(node) = arch.node(id) {
            if node.is_text() || node.is_void() {
                break;
            }
            let enterable = |child: &NodeRef<'_>| !child.is_void() && !child.is_architectural_space();
            if let Some(child) = node.child(offset).filter(enterable) {
                (id, offset) = (child.id(), 0);
            } else if let Some(child) = offset
                .checked_sub(1)
                .and_then(|before| node.child(before))
                .filter(enterable)
            {
                (id, offset) = (child.id(), child.length());
            } else {
                break;
            }
        }
        Range::caret(id, offset)
    }

    /// Resolve a range: explicit offsets are taken as given, a bare
    /// container selects that node, and nothing at all reads the host
    /// selection
    pub fn new<B: SelectionBridge>(
        arch: &Arch,
        bridge: &B,
        partial: Option<PartialRange<B::Handle>>,
    ) -> EditorResult<Range> {
        match partial {
            None => Self::from_selection(arch, bridge),
            Some(partial) if partial.so.is_some() => Self::replace(arch, bridge, partial),
            Some(partial) => match (partial.sc_id, &partial.sc) {
                (Some(id), _) => Self::from_node(arch, id),
                (None, Some(handle)) => {
                    let id = bridge.who_is_this_node(handle).ok_or(EditorError::UnknownHandle)?;
                    Self::from_node(arch, id)
                }
                (None, None) => Self::from_selection(arch, bridge),
            },
        }
    }

    /// Select the whole node: `0..length`, collapsed for empty leaves
    pub fn from_node(arch: &Arch, id: NodeId) -> EditorResult<Range> {
        let node = arch.get_node(id)?;
        Ok(Range {
            sc: id,
            so: 0,
            ec: id,
            eo: node.length(),
        })
    }

    /// Read the host's native selection
    pub fn from_selection<B: SelectionBridge>(arch: &Arch, bridge: &B) -> EditorResult<Range> {
        let selection = bridge.get_selection().ok_or(EditorError::NoSelection)?;
        Self::replace(
            arch,
            bridge,
            PartialRange {
                sc: Some(selection.start),
                so: Some(selection.start_offset),
                ec: Some(selection.end),
                eo: Some(selection.end_offset),
                ..Default::default()
            },
        )
    }

    /// Complete a partial range: handles resolve to ids through the bridge,
    /// the end container defaults to the start one and a missing end offset
    /// collapses on the start. Both containers must be attached.
    pub fn replace<B: SelectionBridge>(
        arch: &Arch,
        bridge: &B,
        partial: PartialRange<B::Handle>,
    ) -> EditorResult<Range> {
        let Some(so) = partial.so else {
            return match (partial.sc_id, &partial.sc) {
                (Some(id), _) => Self::from_node(arch, id),
                (None, Some(handle)) => {
                    let id = bridge.who_is_this_node(handle).ok_or(EditorError::UnknownHandle)?;
                    Self::from_node(arch, id)
                }
                (None, None) => Self::from_selection(arch, bridge),
            };
        };

        let resolve = |id: Option<NodeId>, handle: &Option<B::Handle>| -> EditorResult<Option<NodeId>> {
            match (id, handle) {
                (Some(id), _) => Ok(Some(id)),
                (None, Some(handle)) => bridge
                    .who_is_this_node(handle)
                    .map(Some)
                    .ok_or(EditorError::UnknownHandle),
                (None, None) => Ok(None),
            }
        };

        let sc = resolve(partial.sc_id, &partial.sc)?.ok_or(EditorError::NoSelection)?;
        let ec = resolve(partial.ec_id, &partial.ec)?.unwrap_or(sc);
        arch.get_node(sc)?;
        arch.get_node(ec)?;

        let range = Range {
            sc,
            so,
            ec,
            eo: partial.eo.unwrap_or(so),
        };
        Ok(match partial.eo {
            Some(_) => range,
            None => range.collapse(true),
        })
    }

    /// Collapse on the start point (or the end point)
    pub fn collapse(&self, to_start: bool) -> Range {
        if to_start {
            Range::caret(self.sc, self.so)
        } else {
            Range::caret(self.ec, self.eo)
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.sc == self.ec && self.so == self.eo
    }

    /// Nearest node containing both endpoints
    pub fn common_ancestor(&self, arch: &Arch) -> EditorResult<NodeId> {
        let start = arch.get_node(self.sc)?;
        arch.get_node(self.ec)?;
        start
            .common_ancestor(self.ec)
            .map(|node| node.id())
            .ok_or(EditorError::Arch(ArchError::NodeNotFound(self.ec)))
    }

    pub fn start_node<'a>(&self, arch: &'a Arch) -> EditorResult<NodeRef<'a>> {
        Ok(arch.get_node(self.sc)?)
    }

    pub fn end_node<'a>(&self, arch: &'a Arch) -> EditorResult<NodeRef<'a>> {
        Ok(arch.get_node(self.ec)?)
    }

    pub fn start_element<B: SelectionBridge>(&self, bridge: &B) -> Option<B::Handle> {
        bridge.get_element(self.sc)
    }

    pub fn end_element<B: SelectionBridge>(&self, bridge: &B) -> Option<B::Handle> {
        bridge.get_element(self.ec)
    }

    /// Selected text, as rendered by the host
    pub fn selected_text<B: SelectionBridge>(&self, bridge: &B) -> String {
        bridge.selected_text()
    }

    pub fn selected_nodes(
        &self,
        _arch: &Arch,
        _pred: impl Fn(NodeRef<'_>) -> bool,
    ) -> EditorResult<Vec<NodeId>> {
        Err(ArchError::NotImplemented("selected_nodes").into())
    }

    pub fn selected_text_nodes(
        &self,
        _arch: &Arch,
        _pred: impl Fn(NodeRef<'_>) -> bool,
    ) -> EditorResult<Vec<NodeId>> {
        Err(ArchError::NotImplemented("selected_text_nodes").into())
    }

    /// Both endpoints still attached to the document
    pub fn is_attached(&self, arch: &Arch) -> bool {
        arch.is_attached(self.sc) && arch.is_attached(self.ec)
    }
}
