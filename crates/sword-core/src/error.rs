//! Error types for sword assembly

use crate::scene::{NodeId, SceneError};
use crate::types::{AnchorRole, PartKind};

/// Result type for assembly operations
pub type SwordResult<T> = Result<T, SwordError>;

/// Errors that can occur while building templates, pools and swords
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SwordError {
    /// Candidate root lacks a `Start` or `End` child
    #[error("Template '{name}' is missing its {missing} anchor")]
    InvalidTemplate {
        root: NodeId,
        name: String,
        missing: AnchorRole,
    },

    /// Candidate root is already stored in the pool
    #[error("Template {root} is already in the {kind} pool")]
    DuplicateTemplate { kind: PartKind, root: NodeId },

    /// No template available for a part kind
    #[error("No {0} templates available")]
    EmptyPool(PartKind),

    /// A configuration has no template for a part kind
    #[error("Configuration has no {0} template")]
    MissingPart(PartKind),

    /// An anchor node vanished between template validation and alignment
    #[error("{role} anchor of part {part} is not resolvable")]
    UnresolvedAnchor { part: NodeId, role: AnchorRole },

    #[error(transparent)]
    Scene(#[from] SceneError),
}
