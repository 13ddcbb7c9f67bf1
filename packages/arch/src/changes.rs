use crate::NodeId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Content, attributes or children of the node changed
    Change,
    /// Node was attached (or re-attached) somewhere
    Add,
    /// Node was detached and marked removed
    Remove,
}

/// One notification for the host renderer.
///
/// For `Change`, `offset` is where the caret should land inside `node`
/// when this is the last change of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub kind: ChangeKind,
    pub node: NodeId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
}

/// Tree-level change tracker
#[derive(Debug, Clone, Default)]
pub struct ChangeLog {
    changes: Vec<Change>,
    last_change: Option<(NodeId, usize)>,
}

impl ChangeLog {
    pub fn change(&mut self, node: NodeId, offset: Option<usize>) {
        self.changes.push(Change {
            kind: ChangeKind::Change,
            node,
            offset,
        });
        if let Some(offset) = offset {
            self.last_change = Some((node, offset));
        }
    }

    pub fn add(&mut self, node: NodeId) {
        self.changes.push(Change {
            kind: ChangeKind::Add,
            node,
            offset: None,
        });
    }

    pub fn remove(&mut self, node: NodeId) {
        self.changes.push(Change {
            kind: ChangeKind::Remove,
            node,
            offset: None,
        });
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// Last `(node, offset)` that carried a caret offset
    pub fn last_change(&self) -> Option<(NodeId, usize)> {
        self.last_change
    }

    pub fn drain(&mut self) -> Vec<Change> {
        self.last_change = None;
        std::mem::take(&mut self.changes)
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}
