//! # Arch
//!
//! Editable document tree behind the WYSIWYG editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ markup: HTML-like text → detached fragment  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ arch: arena tree + structural primitives    │
//! │  - kind registry and capability predicates  │
//! │  - edit algorithms (split, merge, lines)    │
//! │  - change log for the rendering layer       │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ serializer: markup, debug repr, JSON        │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The arena owns every node**: callers hold [`NodeId`]s, never references
//! 2. **Refuse, don't corrupt**: violations leave the tree untouched
//! 3. **Removed is terminal**: a removed node never comes back

pub mod arch;
pub mod attributes;
pub mod changes;
pub mod config;
pub mod edit;
pub mod errors;
pub mod kind;
pub mod lexer;
pub mod markup;
pub mod node;
pub mod predicates;
pub mod serializer;
pub mod tag;
pub mod traverse;
pub mod visitor;

pub use arch::Arch;
pub use attributes::{AttrValue, Attributes, ClassName, EqualityOptions, Style};
pub use changes::{Change, ChangeKind, ChangeLog};
pub use config::{ArchConfig, ArchHooks, NodePredicate, DEFAULT_CONFIG_NAME};
pub use edit::DeleteEdgeOptions;
pub use errors::{
    ArchError, ArchResult, ConfigError, MarkupError, MarkupResult, Violation, ViolationKind,
};
pub use kind::{Capability, CustomKind, CustomKindId, IconKind, KindRegistry};
pub use node::{ArchNode, NodeId, NodeKind};
pub use predicates::NodeRef;
pub use serializer::{ArchJson, JsonOptions, SerializeOptions};
pub use tag::Tag;
pub use visitor::Visitor;
