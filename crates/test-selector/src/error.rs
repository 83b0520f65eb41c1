use thiserror::Error;

use crate::buffer::BufferError;

/// Caller-visible failures of mutation and navigation.
///
/// Scanning is total and has no error type; a malformed filter pattern is
/// absorbed by [`crate::filter::FilterState`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// The name is not in the current declaration index.
    #[error("unknown test declaration '{0}'")]
    UnknownDeclaration(String),
    /// The name is indexed but no longer present in the live buffer.
    /// Re-populate before retrying.
    #[error("test declaration '{0}' is no longer present in the buffer")]
    StaleDeclaration(String),
    /// Applying or committing an edit failed; the buffer was rolled back.
    #[error("edit transaction failed: {0}")]
    MutationTransactionFailure(#[from] BufferError),
}
