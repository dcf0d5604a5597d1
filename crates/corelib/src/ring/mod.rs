//! Consistent hash ring implementations.
//!
//! Both variants keep their positions in a [`SlotTable`] and resolve keys by
//! walking clockwise to the next occupied slot, wrapping at the end.

pub mod basic;
pub mod builder;
pub mod slots;
pub mod virtual_ring;

pub use basic::BasicRing;
pub use builder::RingBuilder;
pub use slots::SlotTable;
pub use virtual_ring::{VNodeRing, DEFAULT_VNODES_PER_NODE};

/// Default hash space: `2^32` slots.
pub const DEFAULT_RING_SIZE: u64 = 1 << 32;
