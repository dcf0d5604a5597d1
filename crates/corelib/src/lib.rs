//! Core library for consistent hashing.
//!
//! This crate provides the routing ring itself:
//! - Key-to-slot hashing ([`hash`])
//! - Sorted slot storage shared by both ring variants
//! - [`BasicRing`]: one slot per physical node
//! - [`VNodeRing`]: many virtual labels per physical node
//! - Capability traits ([`NodeLookup`], [`Membership`], [`NodeRemoval`])
//!   consumed by analysis code
//! - [`SharedRing`] for concurrent readers and writers

pub mod error;
pub mod hash;
pub mod lookup;
pub mod ring;
pub mod shared;
pub mod vnode;

pub use error::{Error, Result};
pub use lookup::{Membership, NodeLookup, NodeRemoval};
pub use ring::{BasicRing, RingBuilder, VNodeRing, DEFAULT_RING_SIZE, DEFAULT_VNODES_PER_NODE};
pub use shared::SharedRing;
pub use vnode::VirtualNode;
