//! Swarm construction: node spec building and worker spawning.
//!
//! Spec building is pure and happens entirely before the first spawn, so
//! a structurally impossible swarm (port overflow, too few addresses)
//! fails without creating any process.

use std::path::{Path, PathBuf};

use rand::Rng;

use crate::application::ports::ProcessSpawner;
use crate::application::services::supervisor::{ProcessHandle, ProcessSupervisor};
use crate::domain::{NodeSpec, PortAllocator, SimulateConfig, StakeAssigner, SwarmError};

/// Build one immutable [`NodeSpec`] per requested node.
///
/// Ports count up from the configured base port and database names embed
/// the port, so specs are collision-free by construction. In federated
/// mode nodes get neither an address nor a stake; otherwise node `i`
/// receives `addresses[i]` and a stake drawn from `rng` within the
/// configured bounds.
///
/// # Errors
///
/// Returns `SwarmError::PortRangeOverflow` if the port range does not fit,
/// `SwarmError::InsufficientAddresses` if non-federated mode has fewer
/// addresses than nodes, or `SwarmError::InvalidRange` for inverted stake
/// bounds.
pub fn build_specs(
    config: &SimulateConfig,
    addresses: &[String],
    rng: &mut impl Rng,
) -> Result<Vec<NodeSpec>, SwarmError> {
    let ports = PortAllocator::allocate(config.nodes, config.base_port)?;

    if !config.federated && addresses.len() < config.nodes {
        return Err(SwarmError::InsufficientAddresses {
            needed: config.nodes,
            available: addresses.len(),
        });
    }

    let mut specs = Vec::with_capacity(config.nodes);
    for (index, port) in ports.into_iter().enumerate() {
        let (address, stake) = if config.federated {
            (None, None)
        } else {
            (
                Some(addresses[index].clone()),
                Some(StakeAssigner::assign(&config.stake_bounds, rng)?),
            )
        };
        specs.push(NodeSpec {
            index,
            address,
            rest_port: port,
            db_name: format!("{}-{port}", config.db_prefix),
            stake,
        });
    }
    Ok(specs)
}

/// Command-line arguments for one worker process, derived from its spec.
#[must_use]
pub fn worker_args(spec: &NodeSpec, federated: bool) -> Vec<String> {
    let mut args = vec![
        "_worker".to_string(),
        "--rest-port".to_string(),
        spec.rest_port.to_string(),
        "--db-name".to_string(),
        spec.db_name.clone(),
    ];
    if federated {
        args.push("--federated".to_string());
    }
    if let Some(address) = &spec.address {
        args.push("--checksum-address".to_string());
        args.push(address.clone());
    }
    if let Some(stake) = &spec.stake {
        args.push("--stake-value".to_string());
        args.push(stake.value.to_string());
        args.push("--stake-periods".to_string());
        args.push(stake.periods.to_string());
    }
    args
}

/// Outcome of a spawn pass over a spec list.
#[derive(Debug, Default)]
pub struct SpawnReport {
    /// Number of workers successfully spawned and adopted.
    pub spawned: usize,
    /// Per-node spawn failures as (node index, error description).
    pub failures: Vec<(usize, String)>,
}

impl SpawnReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Launches worker processes for a built spec list and hands each one to
/// the supervisor.
pub struct SwarmLauncher {
    executable: PathBuf,
    federated: bool,
}

impl SwarmLauncher {
    #[must_use]
    pub fn new(executable: &Path, federated: bool) -> Self {
        Self {
            executable: executable.to_path_buf(),
            federated,
        }
    }

    /// Spawn one worker per spec, adopting each into `supervisor` as soon
    /// as it exists so teardown covers partially spawned swarms.
    ///
    /// A spawn failure is isolated to its node: it is recorded in the
    /// report and the remaining nodes still launch. The caller decides
    /// whether a dirty report aborts the simulation.
    pub fn spawn_all(
        &self,
        specs: &[NodeSpec],
        spawner: &impl ProcessSpawner,
        supervisor: &mut ProcessSupervisor,
    ) -> SpawnReport {
        let mut report = SpawnReport::default();
        for spec in specs {
            let args = worker_args(spec, self.federated);
            match spawner.spawn(&self.executable, &args, &[]) {
                Ok(child) => match child.id() {
                    Some(pid) => {
                        supervisor.adopt(ProcessHandle {
                            pid,
                            spec: spec.clone(),
                            child,
                        });
                        report.spawned += 1;
                    }
                    None => report
                        .failures
                        .push((spec.index, "worker exited before adoption".to_string())),
                },
                Err(e) => report.failures.push((spec.index, e.to_string())),
            }
        }
        report
    }
}
