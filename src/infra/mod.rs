//! Infrastructure layer: production implementations of the application
//! ports. Only this layer touches the network, the filesystem, and child
//! processes.

pub mod config;
pub mod ledger;
pub mod prompt;
pub mod registry;
pub mod spawner;

pub use config::YamlConfigStore;
pub use ledger::HttpLedgerClient;
pub use prompt::{DialoguerSecretSource, GeneratedSecretSource};
pub use registry::RegistryManager;
pub use spawner::TokioProcessSpawner;
