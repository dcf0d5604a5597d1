//! Per-node load statistics over a key sample.

use std::collections::BTreeMap;
use std::fmt;

use corelib::NodeLookup;
use serde::Serialize;
use tracing::debug;

use crate::error::{AnalysisError, Result};

/// How evenly a key sample spreads across nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadDistribution {
    /// Keys per known node if the spread were perfect.
    pub mean: f64,
    /// Population standard deviation of the per-node counts.
    pub std_dev: f64,
    /// Largest deviation of any node's count from the mean, in percent.
    pub max_dev_pct: f64,
    /// Keys resolved to each node.
    pub counts: BTreeMap<String, usize>,
}

impl fmt::Display for LoadDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Mean={:.1}, StdDev={:.2}, MaxDev={:.1}%",
            self.mean, self.std_dev, self.max_dev_pct
        )
    }
}

/// Resolve every key in `keys` and summarise the load per node.
///
/// Every node in `known_nodes` starts at zero, so a node that receives no
/// keys still counts against the spread. The mean is taken over
/// `known_nodes`; an owner outside that set is tallied as well and shows up
/// in `counts` and in the deviation figures. The ring is only read.
///
/// # Errors
///
/// - [`AnalysisError::NoNodes`] if `known_nodes` is empty
/// - [`AnalysisError::Ring`] if a lookup fails (e.g. empty ring)
///
/// # Example
///
/// ```rust
/// use analysis::analyze;
/// use corelib::RingBuilder;
///
/// let servers = ["S0", "S1", "S2"];
/// let ring = RingBuilder::new().with_vnodes(100).add_nodes(servers).build_virtual().unwrap();
/// let keys: Vec<String> = (0..3000).map(|i| format!("key-{i}")).collect();
///
/// let load = analyze(&ring, &keys, &servers).unwrap();
/// assert_eq!(load.mean, 1000.0);
/// assert_eq!(load.counts.values().sum::<usize>(), 3000);
/// ```
pub fn analyze<R, K, N>(ring: &R, keys: &[K], known_nodes: &[N]) -> Result<LoadDistribution>
where
    R: NodeLookup + ?Sized,
    K: AsRef<str>,
    N: AsRef<str>,
{
    if known_nodes.is_empty() {
        return Err(AnalysisError::NoNodes);
    }

    let mut counts: BTreeMap<String, usize> = known_nodes
        .iter()
        .map(|node| (node.as_ref().to_owned(), 0))
        .collect();
    for key in keys {
        let owner = ring.find_node_for(key.as_ref())?;
        match counts.get_mut(owner) {
            Some(count) => *count += 1,
            None => {
                counts.insert(owner.to_owned(), 1);
            }
        }
    }

    let node_count = known_nodes.len() as f64;
    let mean = keys.len() as f64 / node_count;
    let variance = counts
        .values()
        .map(|&count| {
            let diff = count as f64 - mean;
            diff * diff
        })
        .sum::<f64>()
        / node_count;
    let max_dev_pct = if mean > 0.0 {
        counts
            .values()
            .map(|&count| (count as f64 - mean).abs() / mean * 100.0)
            .fold(0.0, f64::max)
    } else {
        0.0
    };

    let load = LoadDistribution {
        mean,
        std_dev: variance.sqrt(),
        max_dev_pct,
        counts,
    };
    debug!(keys = keys.len(), nodes = known_nodes.len(), %load, "analyzed distribution");
    Ok(load)
}

#[cfg(test)]
mod tests {
    use super::*;
    use corelib::{BasicRing, Error, Result as RingResult, VNodeRing};

    /// Routes each key to the node named by its first character.
    struct FirstChar(Vec<String>);

    impl NodeLookup for FirstChar {
        fn find_node_for(&self, key: &str) -> RingResult<&str> {
            self.0
                .iter()
                .find(|node| key.starts_with(node.as_str()))
                .map(String::as_str)
                .ok_or(Error::EmptyRing)
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_statistics() {
        let ring = FirstChar(vec!["a".into(), "b".into(), "c".into()]);
        let keys = ["a1", "a2", "b1"];
        let load = analyze(&ring, &keys, &["a", "b", "c"]).unwrap();

        assert!(approx(load.mean, 1.0));
        // counts 2, 1, 0 around mean 1: variance 2/3.
        assert!(approx(load.std_dev, (2.0f64 / 3.0).sqrt()));
        assert!(approx(load.max_dev_pct, 100.0));
        assert_eq!(load.counts["a"], 2);
        assert_eq!(load.counts["b"], 1);
        assert_eq!(load.counts["c"], 0);
    }

    #[test]
    fn test_perfect_spread() {
        let ring = FirstChar(vec!["a".into(), "b".into()]);
        let load = analyze(&ring, &["a1", "b1", "a2", "b2"], &["a", "b"]).unwrap();
        assert!(approx(load.std_dev, 0.0));
        assert!(approx(load.max_dev_pct, 0.0));
    }

    #[test]
    fn test_owner_outside_known_nodes_is_tallied() {
        let ring = FirstChar(vec!["a".into(), "z".into()]);
        let load = analyze(&ring, &["a1", "z1"], &["a"]).unwrap();
        assert!(approx(load.mean, 2.0));
        assert_eq!(load.counts["z"], 1);
        assert!(approx(load.max_dev_pct, 50.0));
    }

    #[test]
    fn test_no_nodes() {
        let ring = FirstChar(vec![]);
        let nodes: [&str; 0] = [];
        assert_eq!(analyze(&ring, &["k"], &nodes), Err(AnalysisError::NoNodes));
    }

    #[test]
    fn test_no_keys() {
        let ring = FirstChar(vec!["a".into()]);
        let keys: [&str; 0] = [];
        let load = analyze(&ring, &keys, &["a"]).unwrap();
        assert_eq!(load.mean, 0.0);
        assert_eq!(load.std_dev, 0.0);
        assert_eq!(load.max_dev_pct, 0.0);
    }

    #[test]
    fn test_empty_ring_propagates() {
        let ring = VNodeRing::new(1 << 32).unwrap();
        assert_eq!(
            analyze(&ring, &["k"], &["S0"]),
            Err(AnalysisError::Ring(Error::EmptyRing))
        );
    }

    #[test]
    fn test_works_on_both_rings() {
        let servers = ["S0", "S1", "S2", "S3"];
        let keys: Vec<String> = (0..4000).map(|i| format!("key-{i}")).collect();

        let mut basic = BasicRing::new(1 << 32).unwrap();
        let mut virt = VNodeRing::with_vnodes(1 << 32, 50).unwrap();
        for s in servers {
            basic.add_node(s).unwrap();
            virt.add_node(s).unwrap();
        }

        for load in [
            analyze(&basic, &keys, &servers).unwrap(),
            analyze(&virt, &keys, &servers).unwrap(),
        ] {
            assert!(approx(load.mean, 1000.0));
            assert_eq!(load.counts.len(), 4);
            assert_eq!(load.counts.values().sum::<usize>(), 4000);
        }
    }

    #[test]
    fn test_display() {
        let load = LoadDistribution {
            mean: 1000.0,
            std_dev: 12.346,
            max_dev_pct: 3.21,
            counts: BTreeMap::new(),
        };
        assert_eq!(load.to_string(), "Mean=1000.0, StdDev=12.35, MaxDev=3.2%");
    }
}
