//! Capability traits over ring variants.
//!
//! Collaborators that only route keys depend on [`NodeLookup`]; those that
//! also change membership depend on [`Membership`] or [`NodeRemoval`]. None
//! of them see the slot table itself.

use crate::error::Result;

/// Resolve a key to the physical node that owns it.
pub trait NodeLookup {
    /// Find the node responsible for `key`.
    ///
    /// Walks clockwise from the key's slot to the first occupied slot,
    /// wrapping to the start of the ring.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyRing`](crate::Error::EmptyRing) when no node has been
    /// added.
    fn find_node_for(&self, key: &str) -> Result<&str>;
}

/// A ring whose membership can grow.
pub trait Membership: NodeLookup {
    /// Place `node` on the ring.
    fn add_node(&mut self, node: &str) -> Result<()>;

    /// Number of distinct physical nodes currently on the ring.
    fn physical_node_count(&self) -> usize;
}

/// A ring that also supports removing a physical node.
pub trait NodeRemoval: Membership {
    /// Take `node` off the ring.
    fn remove_node(&mut self, node: &str) -> Result<()>;
}

impl<T: NodeLookup + ?Sized> NodeLookup for &T {
    fn find_node_for(&self, key: &str) -> Result<&str> {
        (**self).find_node_for(key)
    }
}

impl<T: NodeLookup + ?Sized> NodeLookup for &mut T {
    fn find_node_for(&self, key: &str) -> Result<&str> {
        (**self).find_node_for(key)
    }
}
