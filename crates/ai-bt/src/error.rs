use thiserror::Error;

use crate::def::NodeType;

/// Failures while registering names or building a tree from a definition.
///
/// These are recoverable: nothing is allocated when one is returned, so the caller may fix the
/// definition and try again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BehaviorError {
    #[error("unknown node type '{0}'")]
    UnknownNodeType(String),

    #[error("node '{node}' references undefined prioritizer '{key}'")]
    UnknownPrioritizer { node: String, key: String },

    #[error("node '{node}' references undefined action '{key}'")]
    UnknownAction { node: String, key: String },

    #[error("leaf node '{0}' has no action")]
    MissingAction(String),

    #[error("leaf node '{0}' has no prioritizer")]
    MissingPrioritizer(String),

    #[error("{kind} node '{node}' expects {expected} children, found {found}")]
    ChildCount {
        node: String,
        kind: NodeType,
        expected: &'static str,
        found: usize,
    },

    #[error("name '{0}' is already registered")]
    DuplicateKey(String),

    #[error("a tree named '{0}' already exists")]
    DuplicateTree(String),
}

pub type Result<T> = std::result::Result<T, BehaviorError>;
