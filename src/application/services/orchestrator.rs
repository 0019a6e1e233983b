//! Dependency-ordered deployment orchestration.
//!
//! Drives a [`Deployer`] over the graph's resolved order, aggregates
//! transaction records and agent handles, and aborts the remaining plan
//! on the first per-unit failure. Deployment is strictly sequential:
//! a dependent unit is never armed before its dependency has deployed.

use anyhow::{Context, Result, anyhow};

use crate::application::ports::{ConfirmationGate, LedgerClient, ProgressReporter, SecretSource};
use crate::application::services::deployer::Deployer;
use crate::domain::{
    AgentHandle, AgentRegistry, DependencyGraph, DeploymentRecord, GraphError, SecretCommitment,
    SecretError, TxEntry, UnitDescriptor,
};

/// The first per-unit failure of a run, identifying the unit by name.
#[derive(Debug)]
pub struct DeployFailure {
    pub unit: String,
    pub error: anyhow::Error,
}

/// Aggregated outcome of `deploy_all`.
///
/// Prior units keep their records and handles even when a later unit
/// fails; deployment is externally irreversible and never rolled back.
#[derive(Debug)]
pub struct DeployRun {
    pub record: DeploymentRecord,
    pub agents: AgentRegistry,
    pub failure: Option<DeployFailure>,
}

impl DeployRun {
    /// True iff every planned unit deployed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// Orchestrates deployers over a dependency graph.
pub struct DeploymentOrchestrator<'a, L: LedgerClient> {
    ledger: &'a L,
    deployer_address: String,
    secret_attempts: usize,
}

impl<'a, L: LedgerClient> DeploymentOrchestrator<'a, L> {
    #[must_use]
    pub fn new(ledger: &'a L, deployer_address: String, secret_attempts: usize) -> Self {
        Self {
            ledger,
            deployer_address,
            secret_attempts,
        }
    }

    /// Deploy every unit in the graph, in resolved dependency order.
    ///
    /// The order is resolved once, before any side effect. The first
    /// arming or deployment failure aborts all remaining units; the
    /// returned [`DeployRun`] carries everything that completed plus the
    /// failure, so partial success is never silently dropped.
    ///
    /// # Errors
    ///
    /// Returns an error only for structural graph problems (duplicate,
    /// unknown, or cyclic dependencies), detected before any deployment
    /// is attempted.
    pub async fn deploy_all(
        &self,
        graph: &DependencyGraph,
        secrets: &impl SecretSource,
        gate: &impl ConfirmationGate,
        reporter: &impl ProgressReporter,
    ) -> Result<DeployRun> {
        let order = graph.resolve_order()?;

        let mut record = DeploymentRecord::new();
        let mut agents = AgentRegistry::new();
        let mut failure = None;

        for unit in order {
            // The resolved order guarantees the dependency's handle is
            // already registered.
            let dependency = match self.dependency_handle(graph, &unit, &agents) {
                Ok(handle) => handle,
                Err(e) => {
                    failure = Some(DeployFailure {
                        unit: unit.name.clone(),
                        error: e.into(),
                    });
                    break;
                }
            };

            match self
                .deploy_unit(unit.clone(), dependency, secrets, gate, reporter)
                .await
            {
                Ok((transactions, agent)) => {
                    record.append(&unit.name, transactions);
                    agents.register(agent);
                }
                Err(error) => {
                    failure = Some(DeployFailure {
                        unit: unit.name.clone(),
                        error,
                    });
                    break;
                }
            }
        }

        Ok(DeployRun {
            record,
            agents,
            failure,
        })
    }

    /// Deploy one named unit. The dependency's agent handle must already
    /// exist in `agents`; a missing handle is an unknown-dependency error,
    /// never a cascading deploy of the dependency.
    ///
    /// # Errors
    ///
    /// Returns an error if the unit is unknown, its dependency handle is
    /// missing, arming is disqualified, or the deploy transaction fails.
    pub async fn deploy_single(
        &self,
        name: &str,
        graph: &DependencyGraph,
        agents: &AgentRegistry,
        secrets: &impl SecretSource,
        gate: &impl ConfirmationGate,
        reporter: &impl ProgressReporter,
    ) -> Result<(Vec<TxEntry>, AgentHandle)> {
        let unit = graph
            .get(name)
            .ok_or_else(|| GraphError::UnknownUnit(name.to_string()))?
            .clone();
        let dependency = self.dependency_handle(graph, &unit, agents)?;
        self.deploy_unit(unit, dependency, secrets, gate, reporter)
            .await
    }

    /// Look up the dependency's agent handle in the registry.
    fn dependency_handle(
        &self,
        graph: &DependencyGraph,
        unit: &UnitDescriptor,
        agents: &AgentRegistry,
    ) -> Result<Option<AgentHandle>, GraphError> {
        let Some(dep_name) = &unit.depends_on else {
            return Ok(None);
        };
        let missing = || GraphError::UnknownDependency {
            unit: unit.name.clone(),
            dependency: dep_name.clone(),
        };
        let dep_unit = graph.get(dep_name).ok_or_else(missing)?;
        let handle = agents.lookup(&dep_unit.agent_name).ok_or_else(missing)?;
        Ok(Some(handle.clone()))
    }

    /// Arm, deploy, and produce the agent for one unit.
    async fn deploy_unit(
        &self,
        unit: UnitDescriptor,
        dependency: Option<AgentHandle>,
        secrets: &impl SecretSource,
        gate: &impl ConfirmationGate,
        reporter: &impl ProgressReporter,
    ) -> Result<(Vec<TxEntry>, AgentHandle)> {
        let name = unit.name.clone();

        if !gate.confirm(&format!("Arm {name}?"))? {
            return Err(anyhow!("aborted by operator before arming '{name}'"));
        }

        let secret = if unit.upgradeable {
            Some(self.collect_secret(&name, secrets, reporter)?)
        } else {
            None
        };

        let mut deployer = Deployer::new(
            unit,
            self.ledger,
            Some(self.deployer_address.clone()),
            dependency,
        );

        reporter.step(&format!("arming {name}"));
        let outcome = deployer.arm(secret)?;
        if !outcome.is_armed {
            return Err(crate::domain::DeployError::ArmDisqualified {
                unit: name,
                disqualifications: outcome.disqualifications,
            }
            .into());
        }

        if !gate.confirm(&format!("Deploy {name}?"))? {
            return Err(anyhow!("aborted by operator before deploying '{name}'"));
        }

        reporter.step(&format!("deploying {name}"));
        let transactions = deployer.deploy().await?;
        let agent = deployer.make_agent()?;
        reporter.success(&format!(
            "{name} deployed ({} transaction{})",
            transactions.len(),
            if transactions.len() == 1 { "" } else { "s" },
        ));

        Ok((transactions, agent))
    }

    /// Collect a valid secret commitment within the attempt budget.
    fn collect_secret(
        &self,
        unit_name: &str,
        secrets: &impl SecretSource,
        reporter: &impl ProgressReporter,
    ) -> Result<SecretCommitment> {
        for _ in 0..self.secret_attempts {
            let commitment = secrets
                .collect(unit_name)
                .with_context(|| format!("collecting secret for '{unit_name}'"))?;
            match commitment.validate() {
                Ok(()) => return Ok(commitment),
                Err(e) => reporter.warn(&format!("secret for '{unit_name}' rejected: {e}")),
            }
        }
        Err(SecretError::RetriesExhausted(self.secret_attempts).into())
    }
}

/// Rebuild an agent registry from a previously committed deployment
/// record, so single-unit deploys can satisfy dependency lookups across
/// runs.
#[must_use]
pub fn registry_from_record(record: &DeploymentRecord, graph: &DependencyGraph) -> AgentRegistry {
    let mut agents = AgentRegistry::new();
    for unit_record in record.units() {
        if let Some(unit) = graph.get(&unit_record.unit) {
            agents.register(AgentHandle {
                unit_name: unit.name.clone(),
                agent_name: unit.agent_name.clone(),
            });
        }
    }
    agents
}
