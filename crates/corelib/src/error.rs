//! Error types for the core library.

use thiserror::Error;

/// Result type alias for the core library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the core library.
///
/// `CapacityExceeded`, `Collision` and `NotFound` are ordinary outcomes of a
/// membership change and leave the ring untouched. `EmptyRing` is a usage
/// error on lookup. `MalformedLabel` means the ring holds a label it could
/// never have produced itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Not enough free slots left for the requested insertion.
    #[error("ring capacity exceeded: {used} of {ring_size} slots in use, {requested} requested")]
    CapacityExceeded {
        ring_size: u64,
        used: usize,
        requested: usize,
    },

    /// A label hashed onto a slot that is already taken.
    #[error("slot {slot} collision: `{label}` hashes onto `{existing}`")]
    Collision {
        slot: u64,
        label: String,
        existing: String,
    },

    /// A node (or one of its virtual labels) is not on the ring.
    #[error("node not found: {0}")]
    NotFound(String),

    /// Lookup on a ring with no nodes.
    #[error("ring has no nodes")]
    EmptyRing,

    /// A virtual label without a valid `@index` suffix.
    #[error("malformed virtual node label: {0}")]
    MalformedLabel(String),

    /// Invalid ring construction parameters.
    #[error("invalid ring configuration: {0}")]
    InvalidConfig(String),
}
