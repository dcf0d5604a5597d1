//! Builder for populated rings.

use crate::error::Result;
use crate::ring::{BasicRing, VNodeRing, DEFAULT_RING_SIZE, DEFAULT_VNODES_PER_NODE};

/// Builds a ring and adds an initial node set in one go.
///
/// # Example
///
/// ```rust
/// use corelib::RingBuilder;
///
/// let ring = RingBuilder::new()
///     .with_vnodes(32)
///     .add_nodes(["S0", "S1", "S2"])
///     .build_virtual()
///     .unwrap();
///
/// assert_eq!(ring.physical_node_count(), 3);
/// assert_eq!(ring.len(), 96);
/// ```
#[derive(Debug, Clone)]
pub struct RingBuilder {
    ring_size: u64,
    vnodes_per_node: usize,
    nodes: Vec<String>,
}

impl Default for RingBuilder {
    fn default() -> Self {
        Self {
            ring_size: DEFAULT_RING_SIZE,
            vnodes_per_node: DEFAULT_VNODES_PER_NODE,
            nodes: Vec::new(),
        }
    }
}

impl RingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Size of the hash space (default `2^32`).
    pub fn with_ring_size(mut self, ring_size: u64) -> Self {
        self.ring_size = ring_size;
        self
    }

    /// Virtual labels per node (default 10). Ignored by [`build_basic`](Self::build_basic).
    pub fn with_vnodes(mut self, vnodes_per_node: usize) -> Self {
        self.vnodes_per_node = vnodes_per_node;
        self
    }

    pub fn add_node(mut self, node: impl Into<String>) -> Self {
        self.nodes.push(node.into());
        self
    }

    pub fn add_nodes<I, S>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nodes.extend(nodes.into_iter().map(Into::into));
        self
    }

    /// Build a one-slot-per-node ring. Fails on the first node that cannot
    /// be added.
    pub fn build_basic(&self) -> Result<BasicRing> {
        let mut ring = BasicRing::new(self.ring_size)?;
        for node in &self.nodes {
            ring.add_node(node)?;
        }
        Ok(ring)
    }

    /// Build a virtual-node ring. Fails on the first node that cannot be
    /// added.
    pub fn build_virtual(&self) -> Result<VNodeRing> {
        let mut ring = VNodeRing::with_vnodes(self.ring_size, self.vnodes_per_node)?;
        for node in &self.nodes {
            ring.add_node(node)?;
        }
        Ok(ring)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_builder_defaults() {
        let ring = RingBuilder::new().add_node("S0").build_virtual().unwrap();
        assert_eq!(ring.ring_size(), DEFAULT_RING_SIZE);
        assert_eq!(ring.vnodes_per_node(), DEFAULT_VNODES_PER_NODE);
        assert_eq!(ring.len(), DEFAULT_VNODES_PER_NODE);
    }

    #[test]
    fn test_builder_basic() {
        let ring = RingBuilder::new()
            .add_nodes(["S0", "S1", "S2"])
            .build_basic()
            .unwrap();
        assert_eq!(ring.len(), 3);
    }

    #[test]
    fn test_builder_propagates_errors() {
        let result = RingBuilder::new()
            .add_nodes(["S0", "S0"])
            .build_basic();
        assert!(matches!(result, Err(Error::Collision { .. })));

        let result = RingBuilder::new().with_ring_size(0).build_virtual();
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }
}
