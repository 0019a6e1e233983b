//! Command implementations

pub mod deploy;
pub mod simulate;
pub mod version;
pub mod worker;
