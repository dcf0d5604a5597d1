//! Virtual node labels.
//!
//! # Virtual Nodes (VNodes) Concept
//!
//! Instead of each physical node occupying a single slot on the ring, a node
//! occupies `vnodes_per_node` slots, one per virtual label. This provides:
//!
//! 1. **Better Load Distribution**: more slots per node means each node owns
//!    many small arcs instead of one arc of random length
//! 2. **Gradual Rebalancing**: a joining node takes a little from many
//!    neighbours instead of everything from one
//!
//! # Label Format
//!
//! A virtual label is `"<node>@<index>"`, e.g. `S3@7`. The label is what gets
//! hashed onto the ring; stripping the suffix recovers the physical node.
//! Parsing splits on the *last* `@`, so a physical name such as
//! `cache@eu-west` is still recovered intact from `cache@eu-west@0`.

use std::fmt;

use crate::error::{Error, Result};

/// Separator between the physical node name and the virtual index.
pub const SEPARATOR: char = '@';

/// A virtual label: one of several ring positions owned by a physical node.
///
/// # Example
///
/// ```rust
/// use corelib::VirtualNode;
///
/// let vnode = VirtualNode::new("S1", 4);
/// assert_eq!(vnode.to_string(), "S1@4");
///
/// let parsed = VirtualNode::parse("S1@4").unwrap();
/// assert_eq!(parsed, vnode);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtualNode<'a> {
    /// The physical node that owns this label.
    pub node: &'a str,
    /// Index of this label in `[0, vnodes_per_node)`.
    pub index: usize,
}

impl<'a> VirtualNode<'a> {
    #[inline]
    pub fn new(node: &'a str, index: usize) -> Self {
        Self { node, index }
    }

    /// Split a label back into physical node and index.
    ///
    /// Fails with [`Error::MalformedLabel`] when the separator is missing or
    /// the suffix is not a decimal index.
    pub fn parse(label: &'a str) -> Result<Self> {
        let malformed = || Error::MalformedLabel(label.to_owned());
        let (node, index) = label.rsplit_once(SEPARATOR).ok_or_else(malformed)?;
        // `usize::from_str` also takes a leading `+`, which `label` never writes.
        if !index.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        let index = index.parse().map_err(|_| malformed())?;
        Ok(Self { node, index })
    }

    /// Format the label as it appears on the ring.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for VirtualNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.node, SEPARATOR, self.index)
    }
}

/// Recover the physical node name from a virtual label.
#[inline]
pub fn physical_node(label: &str) -> Result<&str> {
    VirtualNode::parse(label).map(|vnode| vnode.node)
}
