//! # Selection Bridge
//!
//! The host renders the Arch tree and owns the native selection. The editor
//! only talks to it through [`SelectionBridge`], which maps host handles to
//! node ids and back.

use serde::{Deserialize, Serialize};
use wysiwyg_arch::NodeId;

/// A native selection expressed in host handles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeSelection<H> {
    pub start: H,
    pub start_offset: usize,
    pub end: H,
    pub end_offset: usize,
}

impl<H: Clone> NativeSelection<H> {
    pub fn caret(handle: H, offset: usize) -> Self {
        Self {
            start: handle.clone(),
            start_offset: offset,
            end: handle,
            end_offset: offset,
        }
    }
}

pub trait SelectionBridge {
    /// Host-side reference to a rendered node
    type Handle: Clone + PartialEq;

    /// Current native selection, if any
    fn get_selection(&self) -> Option<NativeSelection<Self::Handle>>;

    /// Node id rendered by `handle`
    fn who_is_this_node(&self, handle: &Self::Handle) -> Option<NodeId>;

    /// Rendered handle for `id`
    fn get_element(&self, id: NodeId) -> Option<Self::Handle>;

    /// Text of the native selection, as the host shows it
    fn selected_text(&self) -> String;
}

/// Bridge for hosts without a rendering: handles are node ids and the
/// selection is whatever was last set
#[derive(Debug, Clone, Default)]
pub struct HeadlessBridge {
    selection: Option<NativeSelection<NodeId>>,
    text: String,
}

impl HeadlessBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_selection(&mut self, selection: NativeSelection<NodeId>, text: impl Into<String>) {
        self.selection = Some(selection);
        self.text = text.into();
    }

    pub fn clear(&mut self) {
        self.selection = None;
        self.text.clear();
    }
}

impl SelectionBridge for HeadlessBridge {
    type Handle = NodeId;

    fn get_selection(&self) -> Option<NativeSelection<NodeId>> {
        self.selection.clone()
    }

    fn who_is_this_node(&self, handle: &NodeId) -> Option<NodeId> {
        Some(*handle)
    }

    fn get_element(&self, id: NodeId) -> Option<NodeId> {
        Some(id)
    }

    fn selected_text(&self) -> String {
        self.text.clone()
    }
}
