//! Per-unit deployment state machine: arm, deploy, make agent.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use crate::application::ports::{LedgerClient, ResourceParams};
use crate::domain::{AgentHandle, DeployError, SecretCommitment, TxEntry, UnitDescriptor};

/// Deployment phase of a single unit.
///
/// `Unarmed → Armed → Deployed` is the success path; `ArmFailed` admits a
/// corrected re-arm, `DeployFailed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployPhase {
    Unarmed,
    Armed,
    ArmFailed,
    Deployed,
    DeployFailed,
}

/// Result of an arming attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArmOutcome {
    /// True iff no precondition was violated.
    pub is_armed: bool,
    /// Human-readable precondition violations, in check order.
    pub disqualifications: Vec<String>,
}

/// Drives one unit through arm, deploy, and agent production against the
/// external ledger.
pub struct Deployer<'a, L: LedgerClient> {
    unit: UnitDescriptor,
    ledger: &'a L,
    deployer_address: Option<String>,
    dependency: Option<AgentHandle>,
    secret: Option<SecretCommitment>,
    phase: DeployPhase,
    agent: Option<AgentHandle>,
}

impl<'a, L: LedgerClient> Deployer<'a, L> {
    #[must_use]
    pub fn new(
        unit: UnitDescriptor,
        ledger: &'a L,
        deployer_address: Option<String>,
        dependency: Option<AgentHandle>,
    ) -> Self {
        Self {
            unit,
            ledger,
            deployer_address,
            dependency,
            secret: None,
            phase: DeployPhase::Unarmed,
            agent: None,
        }
    }

    #[must_use]
    pub fn phase(&self) -> DeployPhase {
        self.phase
    }

    #[must_use]
    pub fn unit(&self) -> &UnitDescriptor {
        &self.unit
    }

    /// Run pre-flight checks and transition to `Armed` or `ArmFailed`.
    ///
    /// Each violated precondition contributes one disqualification string;
    /// the unit is armed iff the list is empty. Arming is permitted from
    /// `Unarmed` and, for retries with corrected input, from `ArmFailed`.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::InvalidState` when called after the unit has
    /// already deployed or terminally failed to deploy.
    pub fn arm(&mut self, secret: Option<SecretCommitment>) -> Result<ArmOutcome, DeployError> {
        match self.phase {
            DeployPhase::Unarmed | DeployPhase::ArmFailed => {}
            DeployPhase::Armed | DeployPhase::Deployed | DeployPhase::DeployFailed => {
                return Err(DeployError::InvalidState {
                    unit: self.unit.name.clone(),
                    operation: "arm",
                    required: "an undeployed unit",
                });
            }
        }

        let mut disqualifications = Vec::new();

        if self.deployer_address.is_none() {
            disqualifications.push("deployer address is not set".to_string());
        }

        if self.unit.upgradeable {
            match &secret {
                None => disqualifications
                    .push("upgradeable unit requires a secret commitment".to_string()),
                Some(commitment) => {
                    if let Err(e) = commitment.validate() {
                        disqualifications.push(format!("secret commitment rejected: {e}"));
                    }
                }
            }
        }

        if let Some(dep) = &self.unit.depends_on {
            if self.dependency.is_none() {
                disqualifications.push(format!("dependency '{dep}' has no deployed agent"));
            }
        }

        let is_armed = disqualifications.is_empty();
        if is_armed {
            self.secret = secret;
            self.phase = DeployPhase::Armed;
        } else {
            self.phase = DeployPhase::ArmFailed;
        }
        Ok(ArmOutcome {
            is_armed,
            disqualifications,
        })
    }

    /// Invoke the external ledger-creation call. Irreversible.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::InvalidState` unless the unit is `Armed`, or
    /// `DeployError::Transaction` (and transitions to `DeployFailed`) when
    /// the ledger call fails. No retry is attempted.
    pub async fn deploy(&mut self) -> Result<Vec<TxEntry>, DeployError> {
        if self.phase != DeployPhase::Armed {
            return Err(DeployError::InvalidState {
                unit: self.unit.name.clone(),
                operation: "deploy",
                required: "an armed deployer",
            });
        }

        // Checked during arming; arming is the only path into Armed.
        let address = self.deployer_address.clone().unwrap_or_default();
        let params = ResourceParams {
            upgradeable: self.unit.upgradeable,
            secret: self.secret.as_ref().map(|s| s.reveal().to_vec()),
            dependency_agent: self.dependency.as_ref().map(|h| h.agent_name.clone()),
        };

        match self
            .ledger
            .create_resource(&self.unit.name, &address, &params)
            .await
        {
            Ok(transactions) => {
                self.phase = DeployPhase::Deployed;
                Ok(transactions)
            }
            Err(source) => {
                self.phase = DeployPhase::DeployFailed;
                Err(DeployError::Transaction {
                    unit: self.unit.name.clone(),
                    source,
                })
            }
        }
    }

    /// Produce the unit's agent handle. Idempotent: repeated calls return
    /// an equivalent handle without side effects.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::InvalidState` unless the unit is `Deployed`.
    pub fn make_agent(&mut self) -> Result<AgentHandle, DeployError> {
        if self.phase != DeployPhase::Deployed {
            return Err(DeployError::InvalidState {
                unit: self.unit.name.clone(),
                operation: "make_agent",
                required: "a deployed unit",
            });
        }
        let handle = self.agent.get_or_insert_with(|| AgentHandle {
            unit_name: self.unit.name.clone(),
            agent_name: self.unit.agent_name.clone(),
        });
        Ok(handle.clone())
    }
}
