//! Subcommands and their reports.

use std::fmt;

use analysis::{analyze, measure_add, measure_remove, LoadDistribution, RebalanceMetrics};
use anyhow::{Context, Result};
use clap::Subcommand;
use corelib::{BasicRing, Membership, VNodeRing, DEFAULT_VNODES_PER_NODE};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::CliConfig;

#[derive(Debug, Clone, Default, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Compare load spread of the basic ring and the virtual-node ring.
    Distribution {
        /// Virtual labels per node.
        #[arg(long, default_value_t = DEFAULT_VNODES_PER_NODE)]
        vnodes: usize,
    },

    /// Add one node, then remove one, reporting how many keys move.
    Rebalance {
        /// Virtual labels per node.
        #[arg(long, default_value_t = DEFAULT_VNODES_PER_NODE)]
        vnodes: usize,

        /// Node to add.
        #[arg(long, default_value = "S6")]
        add: String,

        /// Node to remove afterwards.
        #[arg(long, default_value = "S2")]
        remove: String,
    },

    /// Report load standard deviation for several vnode counts.
    Sweep {
        /// Comma-separated vnode counts.
        #[arg(long, value_delimiter = ',', default_value = "1,10,100,500")]
        vnodes: Vec<usize>,
    },

    /// Run distribution, rebalance and sweep with their defaults. The
    /// rebalance step adds the first unused `S<i>` name and removes the
    /// third configured node (the last one if fewer are given).
    #[default]
    Demo,
}

/// Basic vs virtual ring over the same sample.
#[derive(Debug, Clone, Serialize)]
pub struct DistributionReport {
    pub vnodes: usize,
    pub basic: LoadDistribution,
    pub virtual_nodes: LoadDistribution,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Add,
    Remove,
}

/// One measured membership change. A rejected change carries the error
/// instead of metrics.
#[derive(Debug, Clone, Serialize)]
pub struct RebalanceReport {
    pub operation: Operation,
    pub node: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<RebalanceMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepRow {
    pub vnodes: usize,
    pub std_dev: f64,
}

/// Everything a command measured.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CommandResult {
    pub keys: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distribution: Option<DistributionReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rebalance: Vec<RebalanceReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sweep: Vec<SweepRow>,
}

impl Command {
    pub fn execute(&self, config: &CliConfig, keys: &[String]) -> Result<CommandResult> {
        let mut result = CommandResult {
            keys: keys.len(),
            ..CommandResult::default()
        };
        match self {
            Command::Distribution { vnodes } => {
                result.distribution = Some(distribution(config, keys, *vnodes)?);
            }
            Command::Rebalance {
                vnodes,
                add,
                remove,
            } => {
                result.rebalance = rebalance(config, keys, *vnodes, add, remove)?;
            }
            Command::Sweep { vnodes } => {
                result.sweep = sweep(config, keys, vnodes)?;
            }
            Command::Demo => {
                result.distribution = Some(distribution(config, keys, DEFAULT_VNODES_PER_NODE)?);
                let (add, remove) = demo_changes(&config.nodes);
                result.rebalance =
                    rebalance(config, keys, DEFAULT_VNODES_PER_NODE, &add, &remove)?;
                result.sweep = sweep(config, keys, &[1, 10, 100, 500])?;
            }
        }
        Ok(result)
    }
}

/// Node the demo adds and node it removes. With the default `S0..S5` this
/// is `S6` and `S2`. An empty node list removes the node just added.
fn demo_changes(nodes: &[String]) -> (String, String) {
    let add = (nodes.len()..)
        .map(|i| format!("S{i}"))
        .find(|name| !nodes.contains(name))
        .unwrap_or_default();
    let remove = nodes
        .get(2)
        .or(nodes.last())
        .cloned()
        .unwrap_or_else(|| add.clone());
    (add, remove)
}

/// Add every configured node, skipping the ones the ring rejects.
fn populate<R: Membership>(ring: &mut R, nodes: &[String]) {
    for node in nodes {
        if let Err(e) = ring.add_node(node) {
            warn!(%node, error = %e, "skipping node");
        }
    }
}

fn virtual_ring(config: &CliConfig, vnodes: usize) -> Result<VNodeRing> {
    let mut ring = VNodeRing::with_vnodes(config.ring_size, vnodes)
        .with_context(|| format!("failed to create ring with {vnodes} vnodes per node"))?;
    populate(&mut ring, &config.nodes);
    Ok(ring)
}

fn distribution(config: &CliConfig, keys: &[String], vnodes: usize) -> Result<DistributionReport> {
    let mut basic = BasicRing::new(config.ring_size).context("failed to create basic ring")?;
    populate(&mut basic, &config.nodes);
    let basic = analyze(&basic, keys, &config.nodes).context("basic ring analysis failed")?;

    let ring = virtual_ring(config, vnodes)?;
    let virtual_nodes =
        analyze(&ring, keys, &config.nodes).context("virtual ring analysis failed")?;

    info!(vnodes, basic = %basic, virtual_nodes = %virtual_nodes, "distribution");
    Ok(DistributionReport {
        vnodes,
        basic,
        virtual_nodes,
    })
}

fn rebalance(
    config: &CliConfig,
    keys: &[String],
    vnodes: usize,
    add: &str,
    remove: &str,
) -> Result<Vec<RebalanceReport>> {
    let mut ring = virtual_ring(config, vnodes)?;

    let added = measure_add(&mut ring, add, keys);
    let removed = measure_remove(&mut ring, remove, keys);

    let reports = [(Operation::Add, add, added), (Operation::Remove, remove, removed)]
        .into_iter()
        .map(|(operation, node, outcome)| {
            let (metrics, error) = match outcome {
                Ok(metrics) => {
                    info!(?operation, node, %metrics, "rebalance");
                    (Some(metrics), None)
                }
                Err(e) => {
                    warn!(?operation, node, error = %e, "membership change rejected");
                    (None, Some(e.to_string()))
                }
            };
            RebalanceReport {
                operation,
                node: node.to_owned(),
                metrics,
                error,
            }
        })
        .collect();
    Ok(reports)
}

fn sweep(config: &CliConfig, keys: &[String], vnode_counts: &[usize]) -> Result<Vec<SweepRow>> {
    vnode_counts
        .iter()
        .map(|&vnodes| {
            let ring = virtual_ring(config, vnodes)?;
            let load = analyze(&ring, keys, &config.nodes)
                .with_context(|| format!("analysis with {vnodes} vnodes failed"))?;
            info!(vnodes, std_dev = load.std_dev, "sweep");
            Ok(SweepRow {
                vnodes,
                std_dev: load.std_dev,
            })
        })
        .collect()
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(report) = &self.distribution {
            writeln!(f, "Without virtual nodes:")?;
            writeln!(f, "{}", report.basic)?;
            writeln!(f, "With virtual nodes ({} per server):", report.vnodes)?;
            writeln!(f, "{}", report.virtual_nodes)?;
        }
        for report in &self.rebalance {
            let verb = match report.operation {
                Operation::Add => "Adding",
                Operation::Remove => "Removing",
            };
            writeln!(f, "{verb} {}:", report.node)?;
            match (&report.metrics, &report.error) {
                (Some(metrics), _) => writeln!(f, "{metrics}")?,
                (None, Some(error)) => writeln!(f, "failed: {error}")?,
                (None, None) => {}
            }
        }
        if !self.sweep.is_empty() {
            let counts: Vec<String> = self.sweep.iter().map(|row| row.vnodes.to_string()).collect();
            writeln!(f, "Vnode comparison ({}):", counts.join(","))?;
            for row in &self.sweep {
                writeln!(f, "VNodes={} StdDev={:.2}", row.vnodes, row.std_dev)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn config(args: &[&str]) -> CliConfig {
        let mut argv = vec!["vnode-ring", "-n", "2000", "--seed", "11"];
        argv.extend_from_slice(args);
        CliConfig::try_parse_from(argv).unwrap()
    }

    fn run(config: &CliConfig) -> CommandResult {
        let keys = config.sample_keys();
        config
            .command
            .clone()
            .unwrap_or_default()
            .execute(config, &keys)
            .unwrap()
    }

    #[test]
    fn test_distribution() {
        let config = config(&["distribution", "--vnodes", "50"]);
        let result = run(&config);

        let report = result.distribution.as_ref().unwrap();
        assert_eq!(report.vnodes, 50);
        assert_eq!(report.basic.counts.values().sum::<usize>(), 2000);
        assert_eq!(report.virtual_nodes.counts.values().sum::<usize>(), 2000);
        assert!(result.rebalance.is_empty());

        let text = result.to_string();
        assert!(text.starts_with("Without virtual nodes:\nMean="));
        assert!(text.contains("With virtual nodes (50 per server):"));
    }

    #[test]
    fn test_rebalance_reports_both_changes() {
        let config = config(&["rebalance", "--add", "S9", "--remove", "S0"]);
        let result = run(&config);

        assert_eq!(result.rebalance.len(), 2);
        assert_eq!(result.rebalance[0].operation, Operation::Add);
        assert_eq!(result.rebalance[0].node, "S9");
        assert!(result.rebalance[0].metrics.is_some());
        assert_eq!(result.rebalance[1].operation, Operation::Remove);
        assert!(result.rebalance[1].metrics.is_some());
    }

    #[test]
    fn test_rejected_change_is_reported_not_fatal() {
        // S1 is already on the ring, and S7 was never added.
        let config = config(&["rebalance", "--add", "S1", "--remove", "S7"]);
        let result = run(&config);

        assert!(result.rebalance[0].metrics.is_none());
        assert!(result.rebalance[0].error.as_deref().unwrap().contains("collision"));
        assert!(result.rebalance[1].error.as_deref().unwrap().contains("S7@0"));

        let text = result.to_string();
        assert!(text.contains("Adding S1:\nfailed: "));
    }

    #[test]
    fn test_sweep() {
        let config = config(&["sweep", "--vnodes", "1,100"]);
        let result = run(&config);

        let counts: Vec<usize> = result.sweep.iter().map(|row| row.vnodes).collect();
        assert_eq!(counts, [1, 100]);
        assert!(result.to_string().starts_with("Vnode comparison (1,100):\nVNodes=1 StdDev="));
    }

    #[test]
    fn test_demo_runs_everything() {
        let config = config(&[]);
        let result = run(&config);
        assert!(result.distribution.is_some());
        assert_eq!(result.rebalance.len(), 2);
        assert_eq!(result.sweep.len(), 4);
    }

    #[test]
    fn test_demo_changes_follow_configured_nodes() {
        let defaults = config(&[]);
        assert_eq!(
            demo_changes(&defaults.nodes),
            ("S6".to_owned(), "S2".to_owned())
        );

        let nodes: Vec<String> = ["S1", "S2"].map(String::from).to_vec();
        assert_eq!(demo_changes(&nodes), ("S3".to_owned(), "S2".to_owned()));
        assert_eq!(demo_changes(&[]), ("S0".to_owned(), "S0".to_owned()));
    }

    #[test]
    fn test_demo_with_custom_nodes() {
        let config = config(&["--nodes", "a,b"]);
        let result = run(&config);

        assert_eq!(result.rebalance[0].node, "S2");
        assert_eq!(result.rebalance[1].node, "b");
        assert!(result.rebalance.iter().all(|r| r.error.is_none()));
        assert!(result.rebalance.iter().all(|r| r.metrics.is_some()));
    }

    #[test]
    fn test_json_report() {
        let config = config(&["sweep", "--vnodes", "10", "--format", "json"]);
        let result = run(&config);
        let json: serde_json::Value =
            serde_json::from_str(&config.format.render(&result).unwrap()).unwrap();

        assert_eq!(json["keys"], 2000);
        assert_eq!(json["sweep"][0]["vnodes"], 10);
        assert!(json.get("distribution").is_none());
        assert!(json.get("rebalance").is_none());
    }

    #[test]
    fn test_invalid_vnode_count() {
        let config = config(&["sweep", "--vnodes", "0"]);
        let keys = config.sample_keys();
        let err = config.command.clone().unwrap().execute(&config, &keys).unwrap_err();
        assert!(format!("{err:#}").contains("vnodes per node must be positive"));
    }
}
