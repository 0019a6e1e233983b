//! Immutable configuration values for the deploy and simulate commands.
//!
//! Pure data only. Commands build these once from CLI flags merged over
//! the optional config file and pass them by reference; there is no
//! process-wide mutable configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::swarm::StakeBounds;

/// Default REST port for the first swarm node.
pub const DEFAULT_BASE_PORT: u16 = 8787;

/// Default database name prefix for swarm nodes.
pub const DEFAULT_DB_PREFIX: &str = "sim";

/// How long `terminate_all` waits for graceful exits before force-killing.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(10);

/// How many times a secret prompt may be retried before aborting.
pub const DEFAULT_SECRET_ATTEMPTS: usize = 3;

// ── Simulation backends ──────────────────────────────────────────────────────

/// Supported simulation node backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Geth,
    Pyevm,
}

impl Backend {
    pub const ALL: &'static [&'static str] = &["geth", "pyevm"];

    /// Parse a backend selector. Used as a clap value parser.
    ///
    /// # Errors
    ///
    /// Returns a message listing the supported backends when the selector
    /// is unknown.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "geth" => Ok(Backend::Geth),
            "pyevm" => Ok(Backend::Pyevm),
            other => Err(format!(
                "'{other}' is not a supported simulation backend (supported: {})",
                Self::ALL.join(", ")
            )),
        }
    }

    /// Provider endpoint for the backend's local development node.
    #[must_use]
    pub fn provider_uri(self) -> &'static str {
        match self {
            Backend::Geth => "http://127.0.0.1:8545",
            Backend::Pyevm => "http://127.0.0.1:8546",
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Geth => write!(f, "geth"),
            Backend::Pyevm => write!(f, "pyevm"),
        }
    }
}

// ── File configuration ───────────────────────────────────────────────────────

/// Operator defaults read from `~/.apiary/config.yaml`. Every field is
/// optional; CLI flags always win over file values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiaryConfig {
    /// Default ledger provider endpoint.
    pub provider_uri: Option<String>,
    /// Default deployer address.
    pub deployer_address: Option<String>,
    /// Default first REST port for simulations.
    pub base_port: Option<u16>,
    /// Default stake bounds for simulations.
    pub stake_bounds: Option<StakeBounds>,
}

// ── Deploy configuration ─────────────────────────────────────────────────────

/// Immutable configuration for a deployment run.
#[derive(Debug, Clone)]
pub struct DeployConfig {
    /// Ledger provider endpoint.
    pub provider_uri: String,
    /// Deployer address; when unset, the ledger's first account is used.
    pub deployer_address: Option<String>,
    /// Where the deployment record is committed after a full success.
    pub registry_path: PathBuf,
    /// Secret prompt retry budget.
    pub secret_attempts: usize,
}

// ── Simulate configuration ───────────────────────────────────────────────────

/// Immutable configuration for a swarm simulation run.
#[derive(Debug, Clone)]
pub struct SimulateConfig {
    /// Number of worker nodes to launch.
    pub nodes: usize,
    /// Simulation backend.
    pub backend: Backend,
    /// Federated mode: no ledger, no addresses, no stakes.
    pub federated: bool,
    /// REST port of the first node; subsequent nodes count up from here.
    pub base_port: u16,
    /// Database name prefix; node databases are `"{prefix}-{port}"`.
    pub db_prefix: String,
    /// Bounds for randomized stake assignment.
    pub stake_bounds: StakeBounds,
    /// Graceful-termination window for teardown.
    pub grace_period: Duration,
    /// Path of the on-demand simulation registry file.
    pub registry_path: PathBuf,
    /// Fixed RNG seed for reproducible stake assignment.
    pub seed: Option<u64>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn backend_parse_accepts_supported_selectors() {
        assert_eq!(Backend::parse("geth"), Ok(Backend::Geth));
        assert_eq!(Backend::parse("pyevm"), Ok(Backend::Pyevm));
    }

    #[test]
    fn backend_parse_lists_supported_backends_on_unknown() {
        let err = Backend::parse("besu").unwrap_err();
        assert!(err.contains("geth"), "supported set in message: {err}");
        assert!(err.contains("pyevm"), "supported set in message: {err}");
    }
}
