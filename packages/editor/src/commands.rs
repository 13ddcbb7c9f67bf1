//! # Edit Commands
//!
//! Serializable editing intents sent by the host. Caret commands act on
//! the start of the current range; node commands name their target.

use crate::range::Range;
use serde::{Deserialize, Serialize};
use wysiwyg_arch::{Change, DeleteEdgeOptions, NodeId};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum EditCommand {
    /// Type text at the caret
    InsertText { text: String },

    /// Paste markup at the caret
    InsertMarkup { markup: String },

    /// Backspace
    RemoveLeft,

    /// Delete
    RemoveRight,

    /// Enter
    AddLine,

    /// Merge the edge at the caret with its neighbour
    DeleteEdge {
        is_left: bool,
        #[serde(default)]
        options: DeleteEdgeOptions,
    },

    /// Wrap the selected part of a single text node in `tag`
    WrapSelection { tag: String },

    /// Remove the closest `tag` ancestor of the caret, keeping its content
    UnwrapFormat { tag: String },

    SetAttribute {
        node_id: NodeId,
        name: String,
        value: String,
    },

    RemoveAttribute { node_id: NodeId, name: String },

    SetStyle {
        node_id: NodeId,
        property: String,
        value: String,
    },

    AddClass { node_id: NodeId, class_name: String },

    RemoveClass { node_id: NodeId, class_name: String },
}

impl EditCommand {
    /// Parse a command sent as JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn name(&self) -> &'static str {
        match self {
            EditCommand::InsertText { .. } => "insert_text",
            EditCommand::InsertMarkup { .. } => "insert_markup",
            EditCommand::RemoveLeft => "remove_left",
            EditCommand::RemoveRight => "remove_right",
            EditCommand::AddLine => "add_line",
            EditCommand::DeleteEdge { .. } => "delete_edge",
            EditCommand::WrapSelection { .. } => "wrap_selection",
            EditCommand::UnwrapFormat { .. } => "unwrap_format",
            EditCommand::SetAttribute { .. } => "set_attribute",
            EditCommand::RemoveAttribute { .. } => "remove_attribute",
            EditCommand::SetStyle { .. } => "set_style",
            EditCommand::AddClass { .. } => "add_class",
            EditCommand::RemoveClass { .. } => "remove_class",
        }
    }
}

/// What the host needs to re-render after a command
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandResult {
    /// Document version after the command
    pub version: u64,

    /// Change notifications, in order
    pub changes: Vec<Change>,

    /// Range resolved after the edit
    pub range: Range,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_parse_from_json() {
        let command = EditCommand::from_json(r#"{"type":"InsertText","text":"hi"}"#).unwrap();
        assert_eq!(command, EditCommand::InsertText { text: "hi".into() });

        let command = EditCommand::from_json(r#"{"type":"DeleteEdge","is_left":true}"#).unwrap();
        assert_eq!(
            command,
            EditCommand::DeleteEdge {
                is_left: true,
                options: DeleteEdgeOptions::default()
            }
        );

        let command = EditCommand::from_json(
            r#"{"type":"DeleteEdge","is_left":false,"options":{"doNotBreakBlocks":true}}"#,
        )
        .unwrap();
        match command {
            EditCommand::DeleteEdge { options, .. } => assert!(options.do_not_break_blocks),
            other => panic!("unexpected {other:?}"),
        }

        assert_eq!(EditCommand::from_json(r#"{"type":"AddLine"}"#).unwrap().name(), "add_line");
        assert!(EditCommand::from_json(r#"{"type":"Explode"}"#).is_err());
    }
}
