use crate::kind::CustomKindId;
use crate::{Attributes, Tag};
use slotmap::{new_key_type, Key};
use std::fmt;

new_key_type! {
    /// Stable identity of a node inside one [`crate::Arch`]
    pub struct NodeId;
}

impl NodeId {
    /// Compact number used in debug markup and JSON snapshots
    pub fn arch_id(self) -> u64 {
        self.data().as_ffi() & 0xffff_ffff
    }

    pub fn to_raw(self) -> u64 {
        self.data().as_ffi()
    }

    pub fn from_raw(raw: u64) -> Self {
        slotmap::KeyData::from_ffi(raw).into()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.arch_id())
    }
}

/// Closed set of node variants
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The editable root of a document
    Root,
    Element(Tag),
    LineBreak,
    Text(String),
    /// Zero-length caret placeholder
    VirtualText,
    /// Whitespace-only formatting text between blocks
    ArchitecturalSpace(String),
    /// Parentless container spliced away on insertion
    Fragment,
    Custom { kind: CustomKindId, tag: Tag },
}

impl NodeKind {
    pub fn tag(&self) -> Option<&Tag> {
        match self {
            NodeKind::Element(tag) | NodeKind::Custom { tag, .. } => Some(tag),
            NodeKind::LineBreak => Some(&Tag::Br),
            _ => None,
        }
    }

    pub fn is_text_like(&self) -> bool {
        matches!(
            self,
            NodeKind::Text(_) | NodeKind::VirtualText | NodeKind::ArchitecturalSpace(_)
        )
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            NodeKind::Text(value) | NodeKind::ArchitecturalSpace(value) => Some(value),
            NodeKind::VirtualText => Some(""),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArchNode {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) attributes: Attributes,
    pub(crate) removed: bool,
    pub(crate) clone_of: Option<NodeId>,
}

impl ArchNode {
    pub(crate) fn new(kind: NodeKind, attributes: Attributes) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            attributes,
            removed: false,
            clone_of: None,
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Lowercase tag name; `None` for text, root and fragments
    pub fn node_name(&self) -> Option<&str> {
        self.kind.tag().map(Tag::as_str)
    }

    pub fn node_value(&self) -> Option<&str> {
        self.kind.text()
    }

    /// Child count, or character count for text
    pub fn length(&self) -> usize {
        match self.kind.text() {
            Some(value) => value.chars().count(),
            None => self.children.len(),
        }
    }
}
