//! Consistent hash ring with virtual nodes.
//!
//! # Performance Characteristics
//!
//! - **Memory**: O(n * v) labels for n physical nodes, v vnodes per node
//! - **Lookup**: O(log(n * v)) binary search plus a suffix strip
//! - **Add/remove**: O(v * n * v) worst case from shifting the sorted vectors
//!
//! # Atomicity
//!
//! A physical node's labels are one unit. `add_node` and `remove_node` stage
//! every label first and only touch the slot table once all of them are
//! known to succeed, so a failed call leaves the ring exactly as it was.

use std::collections::BTreeSet;

use tracing::debug;

use crate::error::{Error, Result};
use crate::hash::hash_item;
use crate::lookup::{Membership, NodeLookup, NodeRemoval};
use crate::ring::slots::SlotTable;
use crate::vnode::{physical_node, VirtualNode};

/// Virtual nodes per physical node when none is specified.
pub const DEFAULT_VNODES_PER_NODE: usize = 10;

/// Consistent hash ring where each physical node owns `vnodes_per_node`
/// slots, one per virtual label `"<node>@<index>"`.
///
/// # Example
///
/// ```rust
/// use corelib::VNodeRing;
///
/// let mut ring = VNodeRing::with_vnodes(1 << 32, 64).unwrap();
/// ring.add_node("S0").unwrap();
/// ring.add_node("S1").unwrap();
/// assert_eq!(ring.len(), 128);
///
/// // Lookups resolve to the physical node, never to a label.
/// let owner = ring.find_node_for("user:42").unwrap();
/// assert!(owner == "S0" || owner == "S1");
///
/// ring.remove_node("S0").unwrap();
/// assert_eq!(ring.find_node_for("user:42").unwrap(), "S1");
/// ```
#[derive(Debug, Clone)]
pub struct VNodeRing {
    table: SlotTable,
    ring_size: u64,
    vnodes_per_node: usize,
}

impl VNodeRing {
    /// Create an empty ring with [`DEFAULT_VNODES_PER_NODE`] vnodes per node.
    pub fn new(ring_size: u64) -> Result<Self> {
        Self::with_vnodes(ring_size, DEFAULT_VNODES_PER_NODE)
    }

    /// Create an empty ring with a custom vnode count.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`] if either argument is zero.
    pub fn with_vnodes(ring_size: u64, vnodes_per_node: usize) -> Result<Self> {
        if ring_size == 0 {
            return Err(Error::InvalidConfig("ring size must be positive".into()));
        }
        if vnodes_per_node == 0 {
            return Err(Error::InvalidConfig(
                "vnodes per node must be positive".into(),
            ));
        }
        Ok(Self {
            table: SlotTable::new(),
            ring_size,
            vnodes_per_node,
        })
    }

    /// Place all of `node`'s virtual labels on the ring.
    ///
    /// # Errors
    ///
    /// - [`Error::CapacityExceeded`] if the ring is within `vnodes_per_node`
    ///   slots of `ring_size`
    /// - [`Error::Collision`] if any label lands on an occupied slot, or two
    ///   of the node's own labels land on the same slot
    ///
    /// Nothing is inserted on error.
    pub fn add_node(&mut self, node: &str) -> Result<()> {
        let used = self.table.len();
        let limit = self.ring_size.saturating_sub(self.vnodes_per_node as u64);
        if used as u64 >= limit {
            return Err(Error::CapacityExceeded {
                ring_size: self.ring_size,
                used,
                requested: self.vnodes_per_node,
            });
        }

        let staged = self.stage(node);
        let mut seen = BTreeSet::new();
        for (slot, label) in &staged {
            if let Some(existing) = self.table.label_at(*slot) {
                return Err(Error::Collision {
                    slot: *slot,
                    label: label.clone(),
                    existing: existing.to_owned(),
                });
            }
            if !seen.insert(*slot) {
                let existing = staged
                    .iter()
                    .find(|(s, _)| s == slot)
                    .map(|(_, l)| l.clone())
                    .unwrap_or_default();
                return Err(Error::Collision {
                    slot: *slot,
                    label: label.clone(),
                    existing,
                });
            }
        }

        for (slot, label) in staged {
            self.table.insert(slot, label)?;
        }
        debug!(
            node,
            vnodes = self.vnodes_per_node,
            len = self.table.len(),
            "added node to ring"
        );
        Ok(())
    }

    /// Take all of `node`'s virtual labels off the ring.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] naming the first missing label if any of them is
    /// absent. Nothing is removed on error.
    pub fn remove_node(&mut self, node: &str) -> Result<()> {
        let staged = self.stage(node);
        if let Some((_, missing)) = staged
            .iter()
            .find(|(slot, label)| self.table.label_at(*slot) != Some(label.as_str()))
        {
            return Err(Error::NotFound(missing.clone()));
        }

        for (slot, label) in &staged {
            self.table.remove(*slot, label)?;
        }
        debug!(node, len = self.table.len(), "removed node from ring");
        Ok(())
    }

    /// Find the physical node responsible for `key`.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyRing`] if no node has been added
    /// - [`Error::MalformedLabel`] if the owning label has no `@index`
    ///   suffix, which means the ring is corrupted
    pub fn find_node_for(&self, key: &str) -> Result<&str> {
        let label = self
            .table
            .successor(hash_item(key, self.ring_size))
            .ok_or(Error::EmptyRing)?;
        physical_node(label)
    }

    /// Number of distinct physical nodes on the ring.
    pub fn physical_node_count(&self) -> usize {
        self.physical_nodes().len()
    }

    /// Distinct physical nodes, sorted by name.
    pub fn nodes(&self) -> Vec<&str> {
        self.physical_nodes().into_iter().collect()
    }

    pub fn contains_node(&self, node: &str) -> bool {
        let label = VirtualNode::new(node, 0).label();
        self.table.label_at(hash_item(&label, self.ring_size)) == Some(label.as_str())
    }

    pub fn ring_size(&self) -> u64 {
        self.ring_size
    }

    pub fn vnodes_per_node(&self) -> usize {
        self.vnodes_per_node
    }

    /// Total number of virtual labels on the ring.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// `(slot, label)` pairs in ring order.
    pub fn slots(&self) -> impl Iterator<Item = (u64, &str)> + '_ {
        self.table.iter()
    }

    /// Every `(slot, label)` pair `node` would occupy, in index order.
    fn stage(&self, node: &str) -> Vec<(u64, String)> {
        (0..self.vnodes_per_node)
            .map(|index| {
                let label = VirtualNode::new(node, index).label();
                (hash_item(&label, self.ring_size), label)
            })
            .collect()
    }

    fn physical_nodes(&self) -> BTreeSet<&str> {
        // Labels only enter the table through `stage`, so they always parse.
        // A label that does not is counted as its own node, never dropped.
        self.table
            .labels()
            .iter()
            .map(|label| {
                let node = physical_node(label);
                debug_assert!(node.is_ok(), "malformed label on ring: {label:?}");
                node.unwrap_or(label.as_str())
            })
            .collect()
    }
}

impl NodeLookup for VNodeRing {
    fn find_node_for(&self, key: &str) -> Result<&str> {
        VNodeRing::find_node_for(self, key)
    }
}

impl Membership for VNodeRing {
    fn add_node(&mut self, node: &str) -> Result<()> {
        VNodeRing::add_node(self, node)
    }

    fn physical_node_count(&self) -> usize {
        VNodeRing::physical_node_count(self)
    }
}

impl NodeRemoval for VNodeRing {
    fn remove_node(&mut self, node: &str) -> Result<()> {
        VNodeRing::remove_node(self, node)
    }
}
