#![forbid(unsafe_code)]

use rapid_core::GraphError;

/// Why an inspector edit could not be committed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PanelError {
    /// Hover previews are read-only.
    #[error("hover preview cannot commit edits")]
    ReadOnlyHover,
    #[error("no pending edits")]
    NothingToCommit,
    #[error("multi-selection tag editing is not supported")]
    MultiSelection,
    #[error(transparent)]
    Graph(#[from] GraphError),
}
