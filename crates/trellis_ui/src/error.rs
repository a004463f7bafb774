//! Error types for the scene graph.
//!
//! Only structural mistakes are errors. Resolution failures (unknown
//! property, wrong animator target, missing image) are logged and recovered
//! where they happen.

use thiserror::Error;

/// Structural scene errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// Attaching a node that already has a parent.
    #[error("Node '{child}' already has parent '{parent}'")]
    ObjectHasParent {
        /// Node being attached.
        child: String,
        /// Its current parent.
        parent: String,
    },

    /// Removing a node from something that is not its parent.
    #[error("Node '{child}' is not a child of '{parent}'")]
    ObjectNotChild {
        /// Node being removed.
        child: String,
        /// Node it was removed from.
        parent: String,
    },

    /// A node with this name already exists in the scene.
    #[error("Node name '{0}' already exists")]
    ObjectExists(String),

    /// Detaching a node that has no parent.
    #[error("Node '{0}' has no parent")]
    ObjectWithoutParent(String),

    /// Handle is stale or the name is unknown.
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// The child kind cannot be attached to this parent.
    #[error("Node '{child}' cannot be attached to '{parent}': {reason}")]
    InvalidChild {
        /// Node being attached.
        child: String,
        /// Intended parent.
        parent: String,
        /// Why the pairing is rejected.
        reason: &'static str,
    },

    /// The attachment would make a node its own ancestor.
    #[error("Attaching '{child}' to '{parent}' would create a cycle")]
    WouldCreateCycle {
        /// Node being attached.
        child: String,
        /// Intended parent.
        parent: String,
    },

    /// The factory has no constructor for this type name.
    #[error("Unknown node type: {0}")]
    UnknownType(String),

    /// Configuration could not be loaded.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;
