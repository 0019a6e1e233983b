//! Deployable units, secret commitments, and deployment records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Required length of a deployment secret, in bytes.
pub const SECRET_LENGTH: usize = 32;

// ── Unit descriptors ─────────────────────────────────────────────────────────

/// Descriptor for a single deployable on-chain resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitDescriptor {
    /// Unique unit name, e.g. `"staking-escrow"`.
    pub name: String,
    /// Whether the unit requires a secret commitment to permit future upgrades.
    pub upgradeable: bool,
    /// Unique label under which the produced agent handle is registered.
    pub agent_name: String,
    /// Name of the unit this one depends on, if any.
    pub depends_on: Option<String>,
}

impl UnitDescriptor {
    /// Convenience constructor used by the built-in deployment plan and tests.
    #[must_use]
    pub fn new(
        name: &str,
        upgradeable: bool,
        agent_name: &str,
        depends_on: Option<&str>,
    ) -> Self {
        Self {
            name: name.to_string(),
            upgradeable,
            agent_name: agent_name.to_string(),
            depends_on: depends_on.map(String::from),
        }
    }
}

// ── Secret commitments ───────────────────────────────────────────────────────

/// Errors produced when validating a secret commitment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SecretError {
    #[error("secret must be exactly {SECRET_LENGTH} bytes, got {0}")]
    WrongLength(usize),

    #[error("secret and confirmation do not match")]
    Mismatch,

    #[error("no valid secret collected after {0} attempts")]
    RetriesExhausted(usize),
}

/// A deployment secret paired with its confirmation value.
///
/// Valid iff both values are exactly [`SECRET_LENGTH`] bytes and equal.
/// Construction never fails; callers decide whether an invalid commitment
/// is a hard error (prompt retry) or an arming disqualification.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretCommitment {
    secret: Vec<u8>,
    confirmation: Vec<u8>,
}

impl SecretCommitment {
    #[must_use]
    pub fn new(secret: Vec<u8>, confirmation: Vec<u8>) -> Self {
        Self {
            secret,
            confirmation,
        }
    }

    /// Check length and equality of secret and confirmation.
    ///
    /// # Errors
    ///
    /// Returns `SecretError::WrongLength` if either value is not exactly
    /// [`SECRET_LENGTH`] bytes, or `SecretError::Mismatch` if they differ.
    pub fn validate(&self) -> Result<(), SecretError> {
        if self.secret.len() != SECRET_LENGTH {
            return Err(SecretError::WrongLength(self.secret.len()));
        }
        if self.confirmation.len() != SECRET_LENGTH {
            return Err(SecretError::WrongLength(self.confirmation.len()));
        }
        if self.secret != self.confirmation {
            return Err(SecretError::Mismatch);
        }
        Ok(())
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// The secret bytes, for handing to the ledger as a commitment hash input.
    #[must_use]
    pub fn reveal(&self) -> &[u8] {
        &self.secret
    }
}

// Never derive or implement anything that would print the secret bytes.
impl std::fmt::Debug for SecretCommitment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretCommitment")
            .field("len", &self.secret.len())
            .field("valid", &self.is_valid())
            .finish()
    }
}

// ── Deployment records ───────────────────────────────────────────────────────

/// A single transaction produced while deploying a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxEntry {
    /// Human-readable transaction label, e.g. `"deploy"` or `"initialize"`.
    pub label: String,
    /// Ledger-assigned transaction identifier.
    pub tx_id: String,
}

impl TxEntry {
    #[must_use]
    pub fn new(label: &str, tx_id: &str) -> Self {
        Self {
            label: label.to_string(),
            tx_id: tx_id.to_string(),
        }
    }
}

/// Transactions recorded for one deployed unit, in execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRecord {
    pub unit: String,
    pub transactions: Vec<TxEntry>,
}

/// Record of completed unit deployments, in deployment order, with at
/// most one entry per unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    units: Vec<UnitRecord>,
}

impl DeploymentRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the finished unit's transactions. Within one run a unit
    /// finishes deploying at most once, so `deploy_all` never produces
    /// duplicate entries.
    pub fn append(&mut self, unit: &str, transactions: Vec<TxEntry>) {
        self.units.push(UnitRecord {
            unit: unit.to_string(),
            transactions,
        });
    }

    /// Record a unit's transactions, replacing an existing entry in
    /// place. Used when a unit is re-deployed against a registry that
    /// already carries it; the record keeps exactly one entry per unit.
    pub fn upsert(&mut self, unit: &str, transactions: Vec<TxEntry>) {
        if let Some(existing) = self.units.iter_mut().find(|r| r.unit == unit) {
            existing.transactions = transactions;
        } else {
            self.append(unit, transactions);
        }
    }

    #[must_use]
    pub fn get(&self, unit: &str) -> Option<&[TxEntry]> {
        self.units
            .iter()
            .find(|r| r.unit == unit)
            .map(|r| r.transactions.as_slice())
    }

    #[must_use]
    pub fn contains(&self, unit: &str) -> bool {
        self.get(unit).is_some()
    }

    pub fn units(&self) -> impl Iterator<Item = &UnitRecord> {
        self.units.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

// ── Agent handles ────────────────────────────────────────────────────────────

/// Opaque reference to a deployed unit's agent, produced by `make_agent`.
///
/// Created and owned by the orchestrator's registry; dependent deployers
/// receive read-only clones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentHandle {
    /// The unit this handle was produced from.
    pub unit_name: String,
    /// The label the handle is registered under.
    pub agent_name: String,
}

/// Registry mapping `agent_name` to the produced [`AgentHandle`].
///
/// Mutated only by the deployment orchestrator; everything else reads.
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    handles: BTreeMap<String, AgentHandle>,
}

impl AgentRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handle: AgentHandle) {
        self.handles.insert(handle.agent_name.clone(), handle);
    }

    #[must_use]
    pub fn lookup(&self, agent_name: &str) -> Option<&AgentHandle> {
        self.handles.get(agent_name)
    }

    #[must_use]
    pub fn contains(&self, agent_name: &str) -> bool {
        self.handles.contains_key(agent_name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn secret_valid_when_both_sides_are_32_equal_bytes() {
        let s = SecretCommitment::new(vec![7u8; 32], vec![7u8; 32]);
        assert!(s.is_valid());
        assert!(s.validate().is_ok());
    }

    #[test]
    fn secret_rejects_short_secret_with_length_error() {
        let s = SecretCommitment::new(vec![7u8; 31], vec![7u8; 31]);
        assert_eq!(s.validate(), Err(SecretError::WrongLength(31)));
        let msg = s.validate().expect_err("expected Err").to_string();
        assert!(msg.contains("32 bytes"), "length in message: {msg}");
    }

    #[test]
    fn secret_rejects_mismatched_confirmation() {
        let s = SecretCommitment::new(vec![7u8; 32], vec![8u8; 32]);
        assert_eq!(s.validate(), Err(SecretError::Mismatch));
    }

    #[test]
    fn record_preserves_append_order_and_lookup() {
        let mut record = DeploymentRecord::new();
        record.append("token", vec![TxEntry::new("deploy", "0x01")]);
        record.append(
            "staking-escrow",
            vec![TxEntry::new("deploy", "0x02"), TxEntry::new("init", "0x03")],
        );

        assert_eq!(record.len(), 2);
        let order: Vec<&str> = record.units().map(|r| r.unit.as_str()).collect();
        assert_eq!(order, vec!["token", "staking-escrow"]);
        assert_eq!(record.get("staking-escrow").unwrap().len(), 2);
        assert!(!record.contains("policy-manager"));
    }

    #[test]
    fn upsert_replaces_an_existing_unit_without_duplicating_it() {
        let mut record = DeploymentRecord::new();
        record.append("token", vec![TxEntry::new("deploy", "0x01")]);
        record.append("staking-escrow", vec![TxEntry::new("deploy", "0x02")]);

        // Re-deploying a recorded unit must not grow the record or leave
        // the stale entry winning lookups.
        record.upsert("token", vec![TxEntry::new("deploy", "0x09")]);
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("token").unwrap()[0].tx_id, "0x09");

        // Unknown units still append.
        record.upsert("policy-manager", vec![TxEntry::new("deploy", "0x03")]);
        assert_eq!(record.len(), 3);
        let order: Vec<&str> = record.units().map(|r| r.unit.as_str()).collect();
        assert_eq!(order, vec!["token", "staking-escrow", "policy-manager"]);
    }

    #[test]
    fn registry_lookup_by_agent_name() {
        let mut registry = AgentRegistry::new();
        registry.register(AgentHandle {
            unit_name: "token".into(),
            agent_name: "token_agent".into(),
        });
        assert!(registry.contains("token_agent"));
        assert_eq!(
            registry.lookup("token_agent").unwrap().unit_name,
            "token"
        );
        assert!(registry.lookup("staking_agent").is_none());
    }
}
