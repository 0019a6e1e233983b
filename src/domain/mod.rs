//! Domain layer: pure types and typed error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.

pub mod config;
pub mod error;
pub mod graph;
pub mod swarm;
pub mod unit;

pub use config::{
    ApiaryConfig, Backend, DEFAULT_BASE_PORT, DEFAULT_DB_PREFIX, DEFAULT_GRACE_PERIOD,
    DEFAULT_SECRET_ATTEMPTS, DeployConfig, SimulateConfig,
};
pub use error::{DeployError, LedgerError};
pub use graph::{DependencyGraph, GraphError};
pub use swarm::{
    NodeSpec, PortAllocator, StakeAssigner, StakeAssignment, StakeBounds, SwarmError,
};
pub use unit::{
    AgentHandle, AgentRegistry, DeploymentRecord, SECRET_LENGTH, SecretCommitment, SecretError,
    TxEntry, UnitDescriptor, UnitRecord,
};
