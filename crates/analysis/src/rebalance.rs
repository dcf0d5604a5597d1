//! Key movement across a membership change.
//!
//! Consistent hashing promises that adding or removing one of `n` nodes moves
//! roughly `1/n` of the keys. [`measure_add`] and [`measure_remove`] check
//! that promise against a concrete sample: they record every key's owner,
//! apply the change, and count the keys whose owner differs afterwards.
//!
//! To measure a [`SharedRing`](corelib::SharedRing) without interference,
//! hold its write guard for the whole measurement:
//!
//! ```rust
//! use analysis::measure_add;
//! use corelib::{SharedRing, VNodeRing};
//!
//! let shared = SharedRing::new(VNodeRing::new(1 << 32).unwrap());
//! shared.add_node("S0").unwrap();
//!
//! let keys = ["a", "b", "c"];
//! let metrics = measure_add(&mut *shared.write(), "S1", &keys).unwrap();
//! assert_eq!(metrics.total_keys, 3);
//! ```

use std::fmt;

use corelib::{Error, Membership, NodeLookup, NodeRemoval};
use serde::Serialize;
use tracing::debug;

use crate::error::{AnalysisError, Result};

/// Outcome of one measured membership change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RebalanceMetrics {
    /// Keys whose owner changed.
    pub keys_moved: usize,
    /// Keys in the sample.
    pub total_keys: usize,
    /// `keys_moved / total_keys` (0 for an empty sample).
    pub fraction: f64,
    /// `1 / physical nodes after the change` (1 when no node is left).
    pub expected_fraction: f64,
}

impl RebalanceMetrics {
    fn new(keys_moved: usize, total_keys: usize, nodes_after: usize) -> Self {
        let fraction = if total_keys == 0 {
            0.0
        } else {
            keys_moved as f64 / total_keys as f64
        };
        let expected_fraction = if nodes_after == 0 {
            1.0
        } else {
            1.0 / nodes_after as f64
        };
        Self {
            keys_moved,
            total_keys,
            fraction,
            expected_fraction,
        }
    }
}

impl fmt::Display for RebalanceMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Moved: {}/{} ({:.2}%), Expected: ~{:.2}%",
            self.keys_moved,
            self.total_keys,
            self.fraction * 100.0,
            self.expected_fraction * 100.0
        )
    }
}

/// Owner of every key, `None` while the ring is empty.
fn owners<R, K>(ring: &R, keys: &[K]) -> Result<Vec<Option<String>>>
where
    R: NodeLookup + ?Sized,
    K: AsRef<str>,
{
    keys.iter()
        .map(|key| match ring.find_node_for(key.as_ref()) {
            Ok(owner) => Ok(Some(owner.to_owned())),
            Err(Error::EmptyRing) => Ok(None),
            Err(e) => Err(AnalysisError::from(e)),
        })
        .collect()
}

/// Add `node` and count how many sample keys change owner.
///
/// Adding to an empty ring counts every key as moved.
///
/// # Errors
///
/// Propagates the ring's error if the add fails; the ring is unchanged in
/// that case.
pub fn measure_add<R, K>(ring: &mut R, node: &str, keys: &[K]) -> Result<RebalanceMetrics>
where
    R: Membership + ?Sized,
    K: AsRef<str>,
{
    let before = owners(&*ring, keys)?;
    ring.add_node(node)?;
    let after = owners(&*ring, keys)?;

    let moved = before.iter().zip(&after).filter(|(b, a)| b != a).count();
    let metrics = RebalanceMetrics::new(moved, keys.len(), ring.physical_node_count());
    debug!(node, %metrics, "measured add");
    Ok(metrics)
}

/// Remove `node` and count how many sample keys change owner.
///
/// A key counts as moved if `node` owned it before the removal or if its
/// owner differs afterwards.
///
/// # Errors
///
/// Propagates the ring's error if the removal fails; the ring is unchanged
/// in that case.
pub fn measure_remove<R, K>(ring: &mut R, node: &str, keys: &[K]) -> Result<RebalanceMetrics>
where
    R: NodeRemoval + ?Sized,
    K: AsRef<str>,
{
    let before = owners(&*ring, keys)?;
    ring.remove_node(node)?;
    let after = owners(&*ring, keys)?;

    let moved = before
        .iter()
        .zip(&after)
        .filter(|(b, a)| b.as_deref() == Some(node) || b != a)
        .count();
    let metrics = RebalanceMetrics::new(moved, keys.len(), ring.physical_node_count());
    debug!(node, %metrics, "measured remove");
    Ok(metrics)
}

/// Fraction of keys that change bucket under naive `hash % n` sharding when
/// the bucket count goes from `before` to `after`.
///
/// This is the baseline consistent hashing is meant to beat: going from 6 to
/// 7 buckets moves about 6/7 of all keys.
///
/// # Errors
///
/// [`AnalysisError::ZeroBuckets`] if either count is zero.
pub fn modulo_movement<K: AsRef<str>>(keys: &[K], before: u64, after: u64) -> Result<f64> {
    if before == 0 || after == 0 {
        return Err(AnalysisError::ZeroBuckets);
    }
    if keys.is_empty() {
        return Ok(0.0);
    }
    let moved = keys
        .iter()
        .map(|key| corelib::hash::hash_item(key.as_ref(), u64::MAX))
        .filter(|h| h % before != h % after)
        .count();
    Ok(moved as f64 / keys.len() as f64)
}
