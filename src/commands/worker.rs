//! `apiary _worker` — hidden entrypoint for spawned swarm nodes.
//!
//! A worker validates its launch parameters, announces itself, and parks
//! until the supervisor terminates it (or ctrl-c when run by hand).

use anyhow::{Result, bail};
use clap::Args;

use crate::app::AppContext;

/// Arguments for the hidden worker entrypoint.
#[derive(Args)]
pub struct WorkerArgs {
    /// REST port this node serves
    #[arg(long)]
    pub rest_port: u16,

    /// Node database name
    #[arg(long)]
    pub db_name: String,

    /// Federated mode: no ledger address, no stake
    #[arg(long)]
    pub federated: bool,

    /// Ledger address assigned to this node
    #[arg(long)]
    pub checksum_address: Option<String>,

    /// Stake value locked by this node
    #[arg(long)]
    pub stake_value: Option<u64>,

    /// Stake lock duration in periods
    #[arg(long)]
    pub stake_periods: Option<u32>,
}

impl WorkerArgs {
    /// Reject parameter combinations the launcher never produces.
    fn validate(&self) -> Result<()> {
        if self.federated {
            if self.checksum_address.is_some()
                || self.stake_value.is_some()
                || self.stake_periods.is_some()
            {
                bail!("federated workers take no address and no stake");
            }
            return Ok(());
        }
        if self.checksum_address.is_none() {
            bail!("non-federated workers require --checksum-address");
        }
        if self.stake_value.is_none() || self.stake_periods.is_none() {
            bail!("non-federated workers require --stake-value and --stake-periods");
        }
        Ok(())
    }
}

/// Run the worker until terminated.
///
/// # Errors
///
/// Returns an error for invalid parameter combinations or if signal
/// handlers cannot be installed.
pub async fn run(args: &WorkerArgs, app: &AppContext) -> Result<()> {
    args.validate()?;

    app.output.info(&format!(
        "worker up on port {} (db {})",
        args.rest_port, args.db_name
    ));
    if let Some(address) = &args.checksum_address {
        app.output.kv("Address", address);
    }

    wait_for_shutdown().await?;
    app.output.info("worker shutting down");
    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown() -> Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn base() -> WorkerArgs {
        WorkerArgs {
            rest_port: 8787,
            db_name: "sim-8787".into(),
            federated: false,
            checksum_address: Some("0xnode0".into()),
            stake_value: Some(20_000),
            stake_periods: Some(90),
        }
    }

    #[test]
    fn ledger_mode_requires_address_and_stake() {
        assert!(base().validate().is_ok());

        let mut missing_address = base();
        missing_address.checksum_address = None;
        assert!(missing_address.validate().is_err());

        let mut missing_stake = base();
        missing_stake.stake_periods = None;
        assert!(missing_stake.validate().is_err());
    }

    #[test]
    fn federated_mode_rejects_address_and_stake() {
        let mut federated = base();
        federated.federated = true;
        assert!(federated.validate().is_err());

        federated.checksum_address = None;
        federated.stake_value = None;
        federated.stake_periods = None;
        assert!(federated.validate().is_ok());
    }
}
