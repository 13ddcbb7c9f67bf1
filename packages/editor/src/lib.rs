//! # WYSIWYG Editor
//!
//! Host-facing editing layer over the Arch document tree.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ host: rendering + native selection          │
//! └─────────────────────────────────────────────┘
//!                     ↓  SelectionBridge
//! ┌─────────────────────────────────────────────┐
//! │ editor: Range + EditorDocument              │
//! │  - Resolve selections against the tree      │
//! │  - Apply serializable edit commands         │
//! │  - Re-resolve the caret from the change log │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ arch: tree, predicates, edit algorithms     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wysiwyg_editor::{EditCommand, EditorDocument, Range};
//!
//! let mut doc = EditorDocument::from_markup(Default::default(), "<p>Hello</p>")?;
//! let text = doc.arch().text_nodes(doc.root())[0];
//! doc.select_range(Range::caret(text, 5))?;
//!
//! let result = doc.apply(EditCommand::InsertText { text: " world".into() })?;
//! for change in result.changes {
//!     // re-render change.node
//! }
//! ```

mod commands;
mod document;
mod errors;
mod range;
mod selection;

pub use commands::{CommandResult, EditCommand};
pub use document::EditorDocument;
pub use errors::{EditorError, EditorResult};
pub use range::{PartialRange, Range};
pub use selection::{HeadlessBridge, NativeSelection, SelectionBridge};

// Re-export common types for convenience
pub use wysiwyg_arch::{Arch, ArchConfig, Change, ChangeKind, NodeId};
