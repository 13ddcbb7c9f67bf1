use crate::errors::ConfigError;
use crate::predicates::NodeRef;
use crate::Tag;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub const DEFAULT_CONFIG_NAME: &str = "arch.config.json";

/// Document-specific tag tables used by the capability predicates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchConfig {
    /// Blocks that carry text directly (paragraph-like)
    #[serde(default = "default_style_tags")]
    pub style_tags: Vec<Tag>,

    /// Inline elements that carry formatting
    #[serde(default = "default_format_tags")]
    pub format_tags: Vec<Tag>,

    /// Elements laid out inline; everything else is a block
    #[serde(default = "default_inline_tags")]
    pub inline_tags: Vec<Tag>,

    /// Self-closing elements that never gain children
    #[serde(default = "default_void_tags")]
    pub void_tags: Vec<Tag>,

    /// Table structure refusing split/remove/merge
    #[serde(default = "default_unbreakable_tags")]
    pub unbreakable_tags: Vec<Tag>,

    /// Classes making any element an anchor (eg. `btn`)
    #[serde(default = "default_anchor_classes")]
    pub anchor_classes: Vec<String>,

    /// Classes that disqualify an element from being an anchor
    #[serde(default = "default_non_anchor_classes")]
    pub non_anchor_classes: Vec<String>,

    /// Classes that turn an element into an icon node
    #[serde(default = "default_icon_classes")]
    pub icon_classes: Vec<String>,
}

fn tags(names: &[&str]) -> Vec<Tag> {
    names.iter().map(|name| Tag::from_name(name)).collect()
}

fn strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn default_style_tags() -> Vec<Tag> {
    tags(&[
        "p", "td", "th", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "pre",
    ])
}

fn default_format_tags() -> Vec<Tag> {
    tags(&[
        "abbr", "acronym", "b", "bdi", "bdo", "big", "blink", "cite", "code", "dfn", "em", "font",
        "i", "ins", "kbd", "mark", "nobr", "q", "s", "samp", "small", "span", "strike", "strong",
        "sub", "sup", "tt", "u", "var",
    ])
}

fn default_inline_tags() -> Vec<Tag> {
    tags(&[
        "a", "abbr", "acronym", "audio", "b", "bdi", "bdo", "big", "br", "button", "canvas",
        "cite", "code", "data", "datalist", "del", "dfn", "em", "embed", "font", "i", "iframe",
        "img", "input", "ins", "kbd", "label", "map", "mark", "meter", "noscript", "object",
        "output", "picture", "progress", "q", "ruby", "s", "samp", "script", "select", "slot",
        "small", "span", "strong", "sub", "sup", "svg", "template", "textarea", "time", "u", "tt",
        "var", "video", "wbr",
    ])
}

fn default_void_tags() -> Vec<Tag> {
    tags(&[
        "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
        "source", "track", "wbr",
    ])
}

fn default_unbreakable_tags() -> Vec<Tag> {
    tags(&["td", "tr", "tbody", "tfoot", "thead", "table"])
}

fn default_anchor_classes() -> Vec<String> {
    strings(&["btn"])
}

fn default_non_anchor_classes() -> Vec<String> {
    strings(&["fa", "o_image"])
}

fn default_icon_classes() -> Vec<String> {
    strings(&["fa"])
}

impl Default for ArchConfig {
    fn default() -> Self {
        Self {
            style_tags: default_style_tags(),
            format_tags: default_format_tags(),
            inline_tags: default_inline_tags(),
            void_tags: default_void_tags(),
            unbreakable_tags: default_unbreakable_tags(),
            anchor_classes: default_anchor_classes(),
            non_anchor_classes: default_non_anchor_classes(),
            icon_classes: default_icon_classes(),
        }
    }
}

impl ArchConfig {
    /// Load `arch.config.json` from a directory, or defaults if it is absent
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config_path = dir.as_ref().join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_json(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn is_style_tag(&self, tag: &Tag) -> bool {
        self.style_tags.contains(tag)
    }

    pub fn is_format_tag(&self, tag: &Tag) -> bool {
        self.format_tags.contains(tag)
    }

    pub fn is_inline_tag(&self, tag: &Tag) -> bool {
        *tag == Tag::Font || self.inline_tags.contains(tag)
    }

    pub fn is_void_tag(&self, tag: &Tag) -> bool {
        self.void_tags.contains(tag)
    }

    pub fn is_unbreakable_tag(&self, tag: &Tag) -> bool {
        self.unbreakable_tags.contains(tag)
    }
}

pub type NodePredicate = Box<dyn Fn(NodeRef<'_>) -> bool>;

/// Host-supplied policy callbacks refining the predicates for one document
#[derive(Default)]
pub struct ArchHooks {
    pub is_editable_node: Option<NodePredicate>,
    pub is_unbreakable_node: Option<NodePredicate>,
    pub is_void_block: Option<NodePredicate>,
}

impl ArchHooks {
    pub fn with_editable_node(mut self, hook: impl Fn(NodeRef<'_>) -> bool + 'static) -> Self {
        self.is_editable_node = Some(Box::new(hook));
        self
    }

    pub fn with_unbreakable_node(mut self, hook: impl Fn(NodeRef<'_>) -> bool + 'static) -> Self {
        self.is_unbreakable_node = Some(Box::new(hook));
        self
    }

    pub fn with_void_block(mut self, hook: impl Fn(NodeRef<'_>) -> bool + 'static) -> Self {
        self.is_void_block = Some(Box::new(hook));
        self
    }

    pub(crate) fn editable_node(&self, node: NodeRef<'_>) -> bool {
        self.is_editable_node.as_ref().is_some_and(|hook| hook(node))
    }

    pub(crate) fn unbreakable_node(&self, node: NodeRef<'_>) -> bool {
        self.is_unbreakable_node.as_ref().is_some_and(|hook| hook(node))
    }

    pub(crate) fn void_block(&self, node: NodeRef<'_>) -> bool {
        self.is_void_block.as_ref().is_some_and(|hook| hook(node))
    }
}

impl fmt::Debug for ArchHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchHooks")
            .field("is_editable_node", &self.is_editable_node.is_some())
            .field("is_unbreakable_node", &self.is_unbreakable_node.is_some())
            .field("is_void_block", &self.is_void_block.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "styleTags": ["p", "h1"],
            "voidTags": ["br", "img", "x-embed"],
            "anchorClasses": ["btn", "o_link"]
        }"#;

        let config = ArchConfig::from_json(json).unwrap();
        assert_eq!(config.style_tags, vec![Tag::P, Tag::H1]);
        assert!(config.is_void_tag(&Tag::from_name("x-embed")));
        assert_eq!(config.anchor_classes, vec!["btn", "o_link"]);
        // Omitted tables keep their defaults
        assert!(config.is_format_tag(&Tag::Strong));
        assert!(config.is_unbreakable_tag(&Tag::Td));
    }

    #[test]
    fn test_default_config() {
        let config = ArchConfig::default();
        assert!(config.is_style_tag(&Tag::P));
        assert!(config.is_inline_tag(&Tag::Font));
        assert!(config.is_inline_tag(&Tag::Br));
        assert!(!config.is_inline_tag(&Tag::Div));
        assert!(config.is_void_tag(&Tag::Img));
    }

    #[test]
    fn test_load_missing_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ArchConfig::load(dir.path()).unwrap();
        assert_eq!(config, ArchConfig::default());
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_NAME),
            r#"{ "unbreakableTags": ["table", "x-card"] }"#,
        )
        .unwrap();

        let config = ArchConfig::load(dir.path()).unwrap();
        assert!(config.is_unbreakable_tag(&Tag::from_name("x-card")));
        assert!(!config.is_unbreakable_tag(&Tag::Td));
    }
}
