//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` — never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::Path;

use anyhow::Result;

use crate::domain::{ApiaryConfig, DeploymentRecord, LedgerError, SecretCommitment, TxEntry};

// ── Value Types ───────────────────────────────────────────────────────────────

/// Parameters for a single ledger resource creation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceParams {
    /// Whether the resource is deployed behind an upgrade dispatcher.
    pub upgradeable: bool,
    /// Secret commitment bytes for upgradeable resources.
    pub secret: Option<Vec<u8>>,
    /// Agent name of the dependency resource, if any.
    pub dependency_agent: Option<String>,
}

/// Signal kinds the process spawner can deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    /// Graceful stop request (SIGTERM on unix).
    Terminate,
    /// Forceful kill (SIGKILL on unix).
    Kill,
}

// ── Ledger Port ───────────────────────────────────────────────────────────────

/// The external distributed-ledger collaborator, specified only at its
/// boundary. Implementations live in `crate::infra`.
#[allow(async_fn_in_trait)]
pub trait LedgerClient {
    /// Create the on-chain resource for `unit`, returning the ordered
    /// (label, transaction id) pairs the creation produced.
    ///
    /// # Errors
    ///
    /// Returns an opaque [`LedgerError`]; the deployer wraps it as a
    /// deploy-transaction failure carrying the unit name.
    async fn create_resource(
        &self,
        unit: &str,
        deployer_address: &str,
        params: &ResourceParams,
    ) -> Result<Vec<TxEntry>, LedgerError>;

    /// List the accounts the ledger node controls. The first account is
    /// the default deployer; the rest seed simulation node addresses.
    async fn accounts(&self) -> Result<Vec<String>, LedgerError>;
}

// ── Process Spawner Port ──────────────────────────────────────────────────────

/// Abstracts worker-process spawning and signalling so the swarm services
/// can be tested without touching the real binary.
pub trait ProcessSpawner {
    /// Spawn a process without waiting for it to finish.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned.
    fn spawn(
        &self,
        executable: &Path,
        args: &[String],
        env: &[(String, String)],
    ) -> Result<tokio::process::Child>;

    /// Deliver a signal to a process by pid.
    ///
    /// # Errors
    ///
    /// Returns an error if the signal cannot be delivered (e.g. the
    /// process is already gone).
    fn signal(&self, pid: u32, kind: SignalKind) -> Result<()>;
}

// ── Secret Collection Port ────────────────────────────────────────────────────

/// Source of deployment secrets for upgradeable units. May prompt
/// interactively or generate material, depending on the implementation.
pub trait SecretSource {
    /// Collect one secret commitment candidate for the named unit.
    /// The orchestrator validates the result and retries within its
    /// attempt budget.
    ///
    /// # Errors
    ///
    /// Returns an error if collection itself fails (e.g. no TTY).
    fn collect(&self, unit_name: &str) -> Result<SecretCommitment>;
}

// ── Confirmation Port ─────────────────────────────────────────────────────────

/// Interactive go/no-go gate for irreversible steps. The `--force` flag
/// swaps in an always-yes implementation; it never bypasses validity or
/// dependency checks.
pub trait ConfirmationGate {
    /// Ask the operator to confirm `prompt`. Returns `false` to abort.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt fails.
    fn confirm(&self, prompt: &str) -> Result<bool>;
}

// ── Config Store Port ─────────────────────────────────────────────────────────

/// Reads the operator's optional defaults file. Missing files yield the
/// default configuration; flags always override file values.
pub trait ConfigStore {
    /// Load the configuration, or defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    fn load(&self) -> Result<ApiaryConfig>;
}

// ── Registry Persistence Port ─────────────────────────────────────────────────

/// Persists the deployment record, invoked once after a fully successful
/// `deploy_all`.
#[allow(async_fn_in_trait)]
pub trait RegistryStore {
    /// Commit the record to `path`, returning an identifier for the
    /// committed registry (its canonical path).
    async fn commit(&self, record: &DeploymentRecord, path: &Path) -> Result<String>;

    /// Load a previously committed record, returning `None` if no
    /// registry file exists at `path`.
    async fn load(&self, path: &Path) -> Result<Option<DeploymentRecord>>;

    /// Remove the registry file at `path`. Missing files are not an error.
    async fn remove(&self, path: &Path) -> Result<()>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait — no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}
