//! Command-line configuration.
//!
//! Global options describe the experiment (ring size, node set, key sample);
//! the subcommand picks what to measure. With no subcommand the full demo
//! runs.

use analysis::keys::DEFAULT_KEY_LENGTH;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use corelib::DEFAULT_RING_SIZE;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::commands::{Command, CommandResult};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "vnode-ring",
    version,
    about = "Load distribution and rebalance explorer for consistent hash rings"
)]
pub struct CliConfig {
    /// Size of the hash space.
    #[arg(long, global = true, default_value_t = DEFAULT_RING_SIZE)]
    pub ring_size: u64,

    /// Comma-separated physical node names.
    #[arg(long, global = true, value_delimiter = ',', default_value = "S0,S1,S2,S3,S4,S5")]
    pub nodes: Vec<String>,

    /// Number of random keys in the sample.
    #[arg(short = 'n', long, global = true, default_value_t = 1_000_000)]
    pub keys: usize,

    /// Length of each random key.
    #[arg(long, global = true, default_value_t = DEFAULT_KEY_LENGTH)]
    pub key_length: usize,

    /// Seed for the key sample. Random if omitted.
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Log level filter; `RUST_LOG` takes precedence.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Report format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn render(self, result: &CommandResult) -> Result<String> {
        match self {
            OutputFormat::Text => Ok(result.to_string()),
            OutputFormat::Json => {
                serde_json::to_string_pretty(result).context("failed to serialize report")
            }
        }
    }
}

impl CliConfig {
    /// Set up logging, run the selected command and print its report.
    pub fn run(self) -> Result<()> {
        setup_tracing(&self.log_level);

        let keys = self.sample_keys();
        let command = self.command.clone().unwrap_or_default();
        let result = command.execute(&self, &keys)?;
        println!("{}", self.format.render(&result)?);
        Ok(())
    }

    /// Generate the key sample, seeded if `--seed` was given.
    pub fn sample_keys(&self) -> Vec<String> {
        info!(
            count = self.keys,
            length = self.key_length,
            seed = ?self.seed,
            "generating key sample"
        );
        match self.seed {
            Some(seed) => analysis::seeded_keys(seed, self.keys, self.key_length),
            None => {
                let mut rng = StdRng::from_entropy();
                analysis::random_keys(&mut rng, self.keys, self.key_length)
            }
        }
    }
}

/// Initialize the `tracing` subscriber with the given level filter.
///
/// Respects `RUST_LOG` if set. Logs go to stderr so JSON reports on stdout
/// stay machine-readable.
fn setup_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
