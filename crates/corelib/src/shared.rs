//! Thread-safe handle over a ring.
//!
//! Lookups binary-search the slot and label vectors together, so a reader
//! must never observe a half-applied membership change. [`SharedRing`] puts
//! the whole ring behind one `RwLock`: lookups share the read lock, add and
//! remove take the write lock for the full multi-label update.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::Result;
use crate::lookup::{Membership, NodeLookup, NodeRemoval};

/// Cloneable, lock-guarded ring handle.
///
/// # Example
///
/// ```rust
/// use corelib::{SharedRing, VNodeRing};
///
/// let ring = SharedRing::new(VNodeRing::new(1 << 32).unwrap());
/// ring.add_node("S0").unwrap();
///
/// let reader = ring.clone();
/// std::thread::spawn(move || reader.find_node_for("key").unwrap())
///     .join()
///     .unwrap();
/// ```
#[derive(Debug)]
pub struct SharedRing<R> {
    inner: Arc<RwLock<R>>,
}

impl<R> Clone for SharedRing<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R> SharedRing<R> {
    pub fn new(ring: R) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ring)),
        }
    }

    /// Stable read view. Membership cannot change while the guard lives.
    pub fn read(&self) -> RwLockReadGuard<'_, R> {
        self.inner.read()
    }

    /// Exclusive view, e.g. to measure a membership change against a
    /// before/after snapshot without interference.
    pub fn write(&self) -> RwLockWriteGuard<'_, R> {
        self.inner.write()
    }
}

impl<R: NodeLookup> SharedRing<R> {
    /// Owned lookup result; the read lock is released before returning.
    pub fn find_node_for(&self, key: &str) -> Result<String> {
        self.inner.read().find_node_for(key).map(str::to_owned)
    }
}

impl<R: Membership> SharedRing<R> {
    pub fn add_node(&self, node: &str) -> Result<()> {
        self.inner.write().add_node(node)
    }

    pub fn physical_node_count(&self) -> usize {
        self.inner.read().physical_node_count()
    }
}

impl<R: NodeRemoval> SharedRing<R> {
    pub fn remove_node(&self, node: &str) -> Result<()> {
        self.inner.write().remove_node(node)
    }
}
