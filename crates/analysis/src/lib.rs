//! Load and rebalance analysis for consistent hash rings.
//!
//! Everything here talks to a ring through the capability traits in
//! `corelib::lookup`, so the same code measures a [`BasicRing`] and a
//! [`VNodeRing`]:
//! - How evenly keys spread over nodes ([`distribution`])
//! - How many keys change owner on a membership change ([`rebalance`])
//! - Random key samples to feed both ([`keys`])
//!
//! [`BasicRing`]: corelib::BasicRing
//! [`VNodeRing`]: corelib::VNodeRing

pub mod distribution;
pub mod error;
pub mod keys;
pub mod rebalance;

pub use distribution::{analyze, LoadDistribution};
pub use error::{AnalysisError, Result};
pub use keys::{random_keys, seeded_keys};
pub use rebalance::{measure_add, measure_remove, modulo_movement, RebalanceMetrics};
