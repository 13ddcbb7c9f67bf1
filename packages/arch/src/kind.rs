//! Node kind registry.
//!
//! Built-in kinds are the variants of [`crate::NodeKind`]. Hosts may plug
//! extra element kinds (eg. icons) that override individual capabilities;
//! a custom kind is picked by the factory when its `matches` returns true.

use crate::errors::{ArchError, ArchResult};
use crate::{ArchConfig, Attributes, Tag};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Base capability predicates answered by every node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    Anchor,
    ArchitecturalSpace,
    BlankText,
    Block,
    Blockquote,
    Br,
    Cell,
    Clone,
    ContentEditable,
    Data,
    DeepEmpty,
    Editable,
    Element,
    Empty,
    FormatNode,
    Fragment,
    Hr,
    Icon,
    Img,
    Inline,
    InlineFormatNode,
    InvisibleBr,
    Li,
    List,
    Media,
    Para,
    Pre,
    Root,
    Span,
    Table,
    Text,
    Textarea,
    Unbreakable,
    Virtual,
    VisibleBr,
    VisibleText,
    Void,
    VoidBlock,
}

/// Index of a registered custom kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CustomKindId(pub(crate) usize);

/// Capability table for a pluggable element kind
pub trait CustomKind: fmt::Debug {
    fn name(&self) -> &str;

    /// Whether an element with this tag and these attributes is of this kind
    fn matches(&self, tag: &Tag, attributes: &Attributes) -> bool;

    /// Override for a base capability; `None` keeps the element default
    fn capability(&self, _capability: Capability) -> Option<bool> {
        None
    }

    fn can_split(&self) -> bool {
        true
    }

    /// Backspace/delete next to this node removes it whole
    fn removes_whole(&self) -> bool {
        false
    }
}

/// Font icons: any element carrying one of the icon classes
#[derive(Debug, Clone)]
pub struct IconKind {
    classes: Vec<String>,
}

impl IconKind {
    pub fn new(classes: Vec<String>) -> Self {
        Self { classes }
    }
}

impl CustomKind for IconKind {
    fn name(&self) -> &str {
        "FONTAWESOME"
    }

    fn matches(&self, _tag: &Tag, attributes: &Attributes) -> bool {
        self.classes.iter().any(|class| attributes.has_class(class))
    }

    fn capability(&self, capability: Capability) -> Option<bool> {
        match capability {
            Capability::FormatNode | Capability::InlineFormatNode => Some(false),
            Capability::Icon | Capability::Inline | Capability::Media | Capability::Void => {
                Some(true)
            }
            Capability::Block => Some(false),
            _ => None,
        }
    }

    fn can_split(&self) -> bool {
        false
    }

    fn removes_whole(&self) -> bool {
        true
    }
}

const SEALED_KINDS: [&str; 3] = ["ArchNode", "TEXT", "TEXT-VIRTUAL"];

#[derive(Debug, Default)]
pub struct KindRegistry {
    kinds: Vec<Box<dyn CustomKind>>,
}

impl KindRegistry {
    pub fn with_defaults(config: &ArchConfig) -> Self {
        Self {
            kinds: vec![Box::new(IconKind::new(config.icon_classes.clone()))],
        }
    }

    /// Register a custom kind. The base node and text kinds are sealed.
    pub fn register(&mut self, kind: Box<dyn CustomKind>) -> ArchResult<CustomKindId> {
        if SEALED_KINDS
            .iter()
            .any(|sealed| sealed.eq_ignore_ascii_case(kind.name()))
        {
            return Err(ArchError::SealedKind(kind.name().to_string()));
        }
        self.kinds.push(kind);
        Ok(CustomKindId(self.kinds.len() - 1))
    }

    pub fn get(&self, id: CustomKindId) -> Option<&dyn CustomKind> {
        self.kinds.get(id.0).map(Box::as_ref)
    }

    /// Last registered kind wins, so hosts can shadow the defaults
    pub fn lookup(&self, tag: &Tag, attributes: &Attributes) -> Option<CustomKindId> {
        self.kinds
            .iter()
            .rposition(|kind| kind.matches(tag, attributes))
            .map(CustomKindId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Named(&'static str);

    impl CustomKind for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn matches(&self, tag: &Tag, _attributes: &Attributes) -> bool {
            *tag == Tag::from_name("x-card")
        }
    }

    #[test]
    fn test_sealed_kinds_are_rejected() {
        let mut registry = KindRegistry::default();
        for name in ["ArchNode", "TEXT", "text-virtual"] {
            assert_eq!(
                registry.register(Box::new(Named(name))),
                Err(ArchError::SealedKind(name.to_string()))
            );
        }
        assert!(registry.register(Box::new(Named("CARD"))).is_ok());
    }

    #[test]
    fn test_icon_lookup() {
        let registry = KindRegistry::with_defaults(&ArchConfig::default());
        let icon = Attributes::from_pairs([("class", "fa fa-star")]);
        let plain = Attributes::from_pairs([("class", "text-muted")]);
        assert!(registry.lookup(&Tag::I, &icon).is_some());
        assert!(registry.lookup(&Tag::I, &plain).is_none());
    }
}
