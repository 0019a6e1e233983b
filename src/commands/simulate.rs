//! `apiary simulate` — launch and supervise a local worker swarm.
//!
//! Teardown is unconditional: once workers exist they are terminated and
//! the on-demand registry is removed whether the run ended by ctrl-c or
//! by error, and teardown problems are reported as warnings rather than
//! masking the primary outcome.

use anyhow::{Context, Result};
use clap::Args;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::app::AppContext;
use crate::application::ports::{ConfigStore, LedgerClient, RegistryStore};
use crate::application::services::orchestrator::DeploymentOrchestrator;
use crate::application::services::supervisor::ProcessSupervisor;
use crate::application::services::swarm::{SwarmLauncher, build_specs};
use crate::domain::{
    Backend, DEFAULT_BASE_PORT, DEFAULT_DB_PREFIX, DEFAULT_GRACE_PERIOD, DEFAULT_SECRET_ATTEMPTS,
    DependencyGraph, SimulateConfig,
};
use crate::infra::{
    GeneratedSecretSource, HttpLedgerClient, RegistryManager, TokioProcessSpawner, YamlConfigStore,
};

/// Arguments for the simulate command.
#[derive(Args)]
pub struct SimulateArgs {
    /// Number of worker nodes to launch
    #[arg(long, default_value_t = 10)]
    pub nodes: usize,

    /// Simulation backend
    #[arg(long, default_value = "pyevm", value_parser = Backend::parse)]
    pub backend: Backend,

    /// Federated mode: no ledger, no addresses, no stakes
    #[arg(long)]
    pub federated: bool,

    /// REST port of the first node
    #[arg(long)]
    pub base_port: Option<u16>,

    /// Fixed seed for reproducible stake assignment
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Run `apiary simulate`.
///
/// # Errors
///
/// Returns an error if the bootstrap deployment fails, the swarm cannot
/// be built, or no worker spawns.
pub async fn run(args: &SimulateArgs, app: &AppContext) -> Result<()> {
    let file_config = YamlConfigStore::new().load()?;
    let config = SimulateConfig {
        nodes: args.nodes,
        backend: args.backend,
        federated: args.federated,
        base_port: args
            .base_port
            .or(file_config.base_port)
            .unwrap_or(DEFAULT_BASE_PORT),
        db_prefix: DEFAULT_DB_PREFIX.to_string(),
        stake_bounds: file_config.stake_bounds.unwrap_or_default(),
        grace_period: DEFAULT_GRACE_PERIOD,
        registry_path: RegistryManager::simulation_path()?,
        seed: args.seed,
    };

    app.output.header("Apiary swarm simulation");
    app.output.kv("Backend", &config.backend.to_string());
    app.output.kv("Nodes", &config.nodes.to_string());
    app.output.kv(
        "Ports",
        &format!(
            "{}..{}",
            config.base_port,
            usize::from(config.base_port) + config.nodes.saturating_sub(1)
        ),
    );

    let store = RegistryManager::new();
    let addresses = if config.federated {
        Vec::new()
    } else {
        bootstrap_ledger(app, &config, &store).await?
    };

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let specs = build_specs(&config, &addresses, &mut rng)?;

    let executable = std::env::current_exe().context("locating the apiary executable")?;
    let spawner = TokioProcessSpawner::new();
    let mut supervisor = ProcessSupervisor::new(config.grace_period);
    let launcher = SwarmLauncher::new(&executable, config.federated);

    let spawn_report = launcher.spawn_all(&specs, &spawner, &mut supervisor);
    for (index, error) in &spawn_report.failures {
        app.output.warn(&format!("node {index} failed to spawn: {error}"));
    }

    let outcome = if supervisor.is_empty() && config.nodes > 0 {
        Err(anyhow::anyhow!("no worker node could be spawned"))
    } else {
        app.output
            .success(&format!("{} worker(s) running", spawn_report.spawned));
        app.output.info("press ctrl-c to stop the swarm");
        match tokio::signal::ctrl_c().await {
            Ok(()) => Ok(()),
            Err(e) => Err(anyhow::Error::from(e).context("waiting for ctrl-c")),
        }
    };

    // Unconditional teardown, even when the wait itself failed.
    let termination = supervisor.terminate_all(&spawner).await;
    if termination.terminated + termination.forced > 0 {
        app.output.success(&format!(
            "stopped {} worker(s) ({} forced)",
            termination.terminated + termination.forced,
            termination.forced
        ));
    }
    for error in &termination.errors {
        app.output.warn(&format!("teardown: {error}"));
    }
    if !config.federated {
        if let Err(e) = store.remove(&config.registry_path).await {
            app.output.warn(&format!("removing simulation registry: {e}"));
        }
    }

    outcome
}

/// Deploy the built-in plan against the backend's development ledger and
/// commit the on-demand registry, returning the worker node addresses.
async fn bootstrap_ledger(
    app: &AppContext,
    config: &SimulateConfig,
    store: &RegistryManager,
) -> Result<Vec<String>> {
    let ledger = HttpLedgerClient::new(config.backend.provider_uri());
    let accounts = ledger
        .accounts()
        .await
        .with_context(|| format!("querying accounts from {}", config.backend.provider_uri()))?;
    let Some(deployer_address) = accounts.first().cloned() else {
        anyhow::bail!(
            "ledger at {} has no accounts to deploy from",
            config.backend.provider_uri()
        );
    };

    let orchestrator =
        DeploymentOrchestrator::new(&ledger, deployer_address, DEFAULT_SECRET_ATTEMPTS);
    let reporter = app.terminal_reporter();
    // Bootstrap is never interactive: secrets are generated and every
    // confirmation is answered yes.
    let run = orchestrator
        .deploy_all(
            &DependencyGraph::builtin_plan(),
            &GeneratedSecretSource::new(),
            &app.gate(true),
            &reporter,
        )
        .await?;
    if let Some(failure) = run.failure {
        return Err(failure
            .error
            .context(format!("bootstrap deployment stopped at '{}'", failure.unit)));
    }

    store.commit(&run.record, &config.registry_path).await?;

    // The first account funds deployments; the rest become node addresses.
    Ok(accounts.into_iter().skip(1).collect())
}
