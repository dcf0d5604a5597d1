//! Analysis error types.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// The ring rejected a lookup or membership change.
    #[error(transparent)]
    Ring(#[from] corelib::Error),

    /// Distribution requested over an empty node set.
    #[error("no nodes to analyze")]
    NoNodes,

    /// Modulo baseline with zero buckets.
    #[error("bucket count must be positive")]
    ZeroBuckets,
}
