//! Markup and JSON export.

use crate::errors::ArchResult;
use crate::lexer::escape_text;
use crate::node::{NodeId, NodeKind};
use crate::predicates::NodeRef;
use crate::{Arch, Attributes, Tag};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Render virtual text (only visible together with `show_ids`)
    pub keep_virtual: bool,
    /// Tag every node with its `archID`
    pub show_ids: bool,
    /// Drop element tags, keeping only text content
    pub only_text: bool,
    /// Render whitespace-only formatting text between blocks
    pub architectural_space: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonOptions {
    #[serde(default)]
    pub keep_virtual: bool,
}

/// Serializable snapshot of a subtree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_value: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<(String, String)>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub child_nodes: Vec<ArchJson>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_virtual: bool,
}

impl ArchJson {
    fn is_named(&self) -> bool {
        self.node_name.is_some() || self.node_value.is_some()
    }
}

impl Arch {
    pub fn to_markup(&self, id: NodeId, options: SerializeOptions) -> ArchResult<String> {
        let mut out = String::new();
        write_markup(self.node(id)?, &options, &mut out);
        Ok(out)
    }

    /// Text content of a subtree
    pub fn text_content(&self, id: NodeId) -> ArchResult<String> {
        self.to_markup(
            id,
            SerializeOptions {
                only_text: true,
                ..Default::default()
            },
        )
    }

    /// Debug markup of the whole document with ids and virtual text
    pub fn repr(&self) -> String {
        let options = SerializeOptions {
            keep_virtual: true,
            show_ids: true,
            only_text: false,
            architectural_space: true,
        };
        self.to_markup(self.root(), options)
            .map(|markup| markup.trim().to_string())
            .unwrap_or_default()
    }

    pub fn to_json(&self, id: NodeId, options: JsonOptions) -> ArchResult<ArchJson> {
        Ok(json_of(self.node(id)?, &options).unwrap_or_default())
    }

    /// Rebuild a detached subtree from a snapshot. Nameless, valueless
    /// snapshots (such as a root) come back as a fragment.
    pub fn import_json(&mut self, json: &ArchJson) -> ArchResult<NodeId> {
        let id = match (&json.node_name, &json.node_value) {
            (Some(name), _) => {
                let attributes = Attributes::from_pairs(
                    json.attributes.iter().map(|(name, value)| (name.as_str(), value.as_str())),
                );
                self.create_element(Tag::from_name(name), attributes)
            }
            (None, Some(value)) => self.create_text(value.clone()),
            (None, None) if json.is_virtual => self.create_virtual(),
            (None, None) => self.create_fragment(),
        };
        for child in &json.child_nodes {
            let child = self.import_json(child)?;
            self.attach(id, child)?;
        }
        Ok(id)
    }
}

fn write_markup(node: NodeRef<'_>, options: &SerializeOptions, out: &mut String) {
    match node.kind() {
        NodeKind::Root | NodeKind::Fragment => write_children(node, options, out),
        NodeKind::VirtualText => {
            if options.keep_virtual && options.show_ids {
                out.push_str(&format!("[virtual archID=\"{}\"/]", node.id()));
            }
        }
        NodeKind::ArchitecturalSpace(value) => {
            if options.architectural_space {
                out.push_str(value);
            }
        }
        NodeKind::Text(value) if options.show_ids => {
            out.push_str(&format!("[text archID=\"{}\"]{}[/text]", node.id(), escape_text(value)));
        }
        NodeKind::Text(value) => out.push_str(&escape_text(value)),
        NodeKind::Element(_) | NodeKind::LineBreak | NodeKind::Custom { .. } => {
            if options.only_text {
                write_children(node, options, out);
                return;
            }
            let name = node.node_name().unwrap_or_default();
            let self_closing = node.is_void() && node.child_count() == 0;

            out.push('<');
            out.push_str(name);
            if !node.attributes().is_empty() {
                let attributes = node.attributes().to_string();
                if !attributes.is_empty() {
                    out.push(' ');
                    out.push_str(&attributes);
                }
            }
            if options.show_ids {
                out.push_str(&format!(" archID=\"{}\"", node.id()));
            }
            if self_closing {
                out.push('/');
            }
            out.push('>');

            write_children(node, options, out);

            if !self_closing {
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
        }
    }
}

fn write_children(node: NodeRef<'_>, options: &SerializeOptions, out: &mut String) {
    for child in node.children() {
        write_markup(child, options, out);
    }
}

fn json_of(node: NodeRef<'_>, options: &JsonOptions) -> Option<ArchJson> {
    if node.is_architectural_space() {
        return None;
    }

    let mut child_nodes = Vec::new();
    for child in node.children() {
        let Some(json) = json_of(child, options) else {
            continue;
        };
        if json.is_named() || (json.is_virtual && options.keep_virtual) {
            child_nodes.push(json);
        } else {
            // Anonymous containers are spliced into their parent
            child_nodes.extend(json.child_nodes);
        }
    }

    let mut json = ArchJson {
        id: Some(node.id().to_raw()),
        child_nodes,
        ..Default::default()
    };
    if node.is_virtual() {
        json.is_virtual = true;
        if !options.keep_virtual {
            return Some(json);
        }
    }
    if !node.is_root() {
        json.node_name = node.node_name().map(str::to_string);
    }
    json.node_value = node.text().filter(|value| !value.is_empty()).map(str::to_string);
    json.attributes = node.attributes().to_pairs();
    Some(json)
}

impl fmt::Display for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        write_markup(*self, &SerializeOptions::default(), &mut out);
        f.write_str(&out)
    }
}
