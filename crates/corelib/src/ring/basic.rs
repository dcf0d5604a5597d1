//! Plain consistent hash ring: one slot per physical node.

use tracing::debug;

use crate::error::{Error, Result};
use crate::hash::hash_item;
use crate::lookup::{Membership, NodeLookup};
use crate::ring::slots::SlotTable;

/// Consistent hash ring with a single slot per node.
///
/// The node name itself is hashed onto the ring. Cheap, but the arc each
/// node owns has random length, so load is usually uneven for small
/// clusters. Use [`VNodeRing`](crate::VNodeRing) for smoother distribution.
///
/// # Example
///
/// ```rust
/// use corelib::BasicRing;
///
/// let mut ring = BasicRing::new(1 << 32).unwrap();
/// ring.add_node("S0").unwrap();
/// ring.add_node("S1").unwrap();
///
/// let owner = ring.find_node_for("user:42").unwrap();
/// assert!(owner == "S0" || owner == "S1");
/// ```
#[derive(Debug, Clone)]
pub struct BasicRing {
    table: SlotTable,
    ring_size: u64,
}

impl BasicRing {
    /// Create an empty ring over `[0, ring_size)`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`] if `ring_size` is zero.
    pub fn new(ring_size: u64) -> Result<Self> {
        if ring_size == 0 {
            return Err(Error::InvalidConfig("ring size must be positive".into()));
        }
        Ok(Self {
            table: SlotTable::new(),
            ring_size,
        })
    }

    /// Place `node` on the ring at `hash(node)`.
    ///
    /// # Errors
    ///
    /// - [`Error::CapacityExceeded`] if every slot is already taken
    /// - [`Error::Collision`] if another node hashes onto the same slot
    ///
    /// The ring is unchanged on error.
    pub fn add_node(&mut self, node: &str) -> Result<()> {
        let used = self.table.len();
        if used as u64 >= self.ring_size {
            return Err(Error::CapacityExceeded {
                ring_size: self.ring_size,
                used,
                requested: 1,
            });
        }

        let slot = hash_item(node, self.ring_size);
        self.table.insert(slot, node.to_owned())?;
        debug!(node, slot, len = self.table.len(), "added node to ring");
        Ok(())
    }

    /// Find the node responsible for `key`.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyRing`] if no node has been added.
    pub fn find_node_for(&self, key: &str) -> Result<&str> {
        self.table
            .successor(hash_item(key, self.ring_size))
            .ok_or(Error::EmptyRing)
    }

    /// Size of the hash space.
    pub fn ring_size(&self) -> u64 {
        self.ring_size
    }

    /// Number of nodes (equal to the number of occupied slots).
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Node names in ring order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> + '_ {
        self.table.iter().map(|(_, label)| label)
    }

    pub fn contains_node(&self, node: &str) -> bool {
        self.table.label_at(hash_item(node, self.ring_size)) == Some(node)
    }

    /// `(slot, node)` pairs in ring order.
    pub fn slots(&self) -> impl Iterator<Item = (u64, &str)> + '_ {
        self.table.iter()
    }
}

impl NodeLookup for BasicRing {
    fn find_node_for(&self, key: &str) -> Result<&str> {
        BasicRing::find_node_for(self, key)
    }
}

impl Membership for BasicRing {
    fn add_node(&mut self, node: &str) -> Result<()> {
        BasicRing::add_node(self, node)
    }

    fn physical_node_count(&self) -> usize {
        self.table.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A name distinct from `taken` that lands on the same slot.
    fn colliding_name(taken: &str, ring_size: u64) -> String {
        let target = hash_item(taken, ring_size);
        (0..)
            .map(|i| format!("probe-{i}"))
            .find(|name| name != taken && hash_item(name, ring_size) == target)
            .unwrap()
    }

    #[test]
    fn test_zero_ring_size_rejected() {
        assert!(matches!(BasicRing::new(0), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_empty_ring_lookup() {
        let ring = BasicRing::new(1 << 32).unwrap();
        assert_eq!(ring.find_node_for("key"), Err(Error::EmptyRing));
    }

    #[test]
    fn test_single_node_owns_everything() {
        let mut ring = BasicRing::new(1 << 32).unwrap();
        ring.add_node("only").unwrap();
        for i in 0..100 {
            assert_eq!(ring.find_node_for(&format!("k{i}")).unwrap(), "only");
        }
    }

    #[test]
    fn test_lookup_matches_clockwise_successor() {
        let mut ring = BasicRing::new(1 << 32).unwrap();
        for node in ["S0", "S1", "S2", "S3"] {
            ring.add_node(node).unwrap();
        }
        let slots: Vec<(u64, String)> = ring
            .slots()
            .map(|(slot, node)| (slot, node.to_owned()))
            .collect();

        for i in 0..500 {
            let key = format!("key-{i}");
            let h = hash_item(&key, ring.ring_size());
            let expected = slots
                .iter()
                .find(|(slot, _)| *slot >= h)
                .unwrap_or(&slots[0]);
            assert_eq!(ring.find_node_for(&key).unwrap(), expected.1);
        }
    }

    #[test]
    fn test_collision_rejected() {
        let ring_size = 8;
        let mut ring = BasicRing::new(ring_size).unwrap();
        ring.add_node("a").unwrap();

        let other = colliding_name("a", ring_size);
        let err = ring.add_node(&other).unwrap_err();
        assert!(matches!(err, Error::Collision { ref existing, .. } if existing == "a"));
        assert_eq!(ring.len(), 1);
        assert!(!ring.contains_node(&other));
    }

    #[test]
    fn test_duplicate_node_is_collision() {
        let mut ring = BasicRing::new(1 << 32).unwrap();
        ring.add_node("S0").unwrap();
        assert!(matches!(ring.add_node("S0"), Err(Error::Collision { .. })));
        assert_eq!(ring.len(), 1);
    }

    #[test]
    fn test_capacity_enforced() {
        let mut ring = BasicRing::new(1).unwrap();
        ring.add_node("a").unwrap();
        assert_eq!(
            ring.add_node("b"),
            Err(Error::CapacityExceeded {
                ring_size: 1,
                used: 1,
                requested: 1,
            })
        );
        assert_eq!(ring.len(), 1);
    }

    #[test]
    fn test_contains_node() {
        let mut ring = BasicRing::new(1 << 32).unwrap();
        ring.add_node("S0").unwrap();
        assert!(ring.contains_node("S0"));
        assert!(!ring.contains_node("S1"));
    }
}
