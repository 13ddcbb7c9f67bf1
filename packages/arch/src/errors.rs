use crate::NodeId;
use thiserror::Error;

pub type ArchResult<T> = Result<T, ArchError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArchError {
    /// The operation would break a structural invariant. The tree is unchanged.
    #[error(transparent)]
    Violation(#[from] Violation),

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Node kind '{0}' is sealed and cannot be extended")]
    SealedKind(String),

    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),
}

impl ArchError {
    /// The refusal reason, if this error is a structural violation
    pub fn violation(&self) -> Option<ViolationKind> {
        match self {
            ArchError::Violation(v) => Some(v.kind),
            _ => None,
        }
    }
}

/// A refused structural operation
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{kind} (node {node})")]
pub struct Violation {
    pub node: NodeId,
    pub kind: ViolationKind,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    #[error("cannot add a node into a void node")]
    VoidContainer,

    #[error("node cannot hold children")]
    NotAContainer,

    #[error("node is not editable")]
    NotEditable,

    #[error("source parent is not editable")]
    SourceNotEditable,

    #[error("cannot add a node into itself")]
    Cycle,

    #[error("cannot remove or move the root")]
    Root,

    #[error("node is unbreakable")]
    Unbreakable,

    #[error("node cannot be split")]
    NotSplittable,

    #[error("node has been removed")]
    Removed,

    #[error("node has no parent")]
    Detached,

    #[error("offset is out of bounds")]
    OutOfBounds,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarkupError {
    #[error("Unexpected character at {pos}")]
    Lexer { pos: usize },

    #[error("Unexpected closing tag </{name}> at {pos}")]
    UnexpectedClose { name: String, pos: usize },

    #[error(transparent)]
    Arch(#[from] ArchError),
}

pub type MarkupResult<T> = Result<T, MarkupError>;
