//! Error types for the editor

use thiserror::Error;
use wysiwyg_arch::{ArchError, MarkupError, NodeId};

pub type EditorResult<T> = Result<T, EditorError>;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error(transparent)]
    Arch(#[from] ArchError),

    #[error("Markup error: {0}")]
    Markup(#[from] MarkupError),

    #[error("Host node is unknown to the document")]
    UnknownHandle,

    #[error("No selection in the host")]
    NoSelection,

    #[error("Node {0} is not a text node")]
    NotText(NodeId),

    #[error("Unsupported selection: {0}")]
    UnsupportedSelection(&'static str),

    #[error("Invalid command: {0}")]
    InvalidCommand(#[from] serde_json::Error),
}
