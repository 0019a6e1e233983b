//! Application services driving deployment and swarm orchestration.

pub mod deployer;
pub mod orchestrator;
pub mod supervisor;
pub mod swarm;
