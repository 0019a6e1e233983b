//! `apiary deploy` — dependency-ordered on-chain deployment.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::{ConfigStore, LedgerClient, RegistryStore, SecretSource};
use crate::application::services::orchestrator::{
    DeploymentOrchestrator, registry_from_record,
};
use crate::domain::{
    DEFAULT_SECRET_ATTEMPTS, DependencyGraph, DeployConfig, DeploymentRecord, GraphError,
};
use crate::infra::{
    DialoguerSecretSource, GeneratedSecretSource, HttpLedgerClient, RegistryManager,
    YamlConfigStore,
};

/// Arguments for the deploy command.
#[derive(Args)]
pub struct DeployArgs {
    /// Deploy a single named unit instead of the full plan
    #[arg(long)]
    pub unit: Option<String>,

    /// Answer yes to confirmations and generate secrets instead of prompting
    #[arg(long)]
    pub force: bool,

    /// Ledger provider endpoint
    #[arg(long, env = "APIARY_PROVIDER_URI")]
    pub provider_uri: Option<String>,

    /// Deployer account address (defaults to the ledger's first account)
    #[arg(long)]
    pub deployer_address: Option<String>,

    /// Deployment registry file path
    #[arg(long)]
    pub registry: Option<PathBuf>,
}

/// Run `apiary deploy`.
///
/// # Errors
///
/// Returns an error if no provider is configured, the named unit does not
/// exist, or any unit fails to arm or deploy.
pub async fn run(args: &DeployArgs, app: &AppContext) -> Result<()> {
    let file_config = YamlConfigStore::new().load()?;
    let graph = DependencyGraph::builtin_plan();

    // Validate the unit name before any network traffic.
    if let Some(name) = &args.unit {
        if graph.get(name).is_none() {
            return Err(GraphError::UnknownUnit(name.clone()).into());
        }
    }

    let Some(provider_uri) = args
        .provider_uri
        .clone()
        .or(file_config.provider_uri.clone())
    else {
        bail!("no ledger provider configured (pass --provider-uri or set provider_uri in the config file)");
    };
    let config = DeployConfig {
        provider_uri,
        deployer_address: args
            .deployer_address
            .clone()
            .or(file_config.deployer_address.clone()),
        registry_path: match &args.registry {
            Some(path) => path.clone(),
            None => RegistryManager::default_path()?,
        },
        secret_attempts: DEFAULT_SECRET_ATTEMPTS,
    };

    let ledger = HttpLedgerClient::new(&config.provider_uri);
    let deployer_address = match &config.deployer_address {
        Some(address) => address.clone(),
        None => {
            let accounts = ledger.accounts().await.context("querying ledger accounts")?;
            match accounts.into_iter().next() {
                Some(first) => first,
                None => bail!(
                    "ledger at {} has no accounts to deploy from",
                    config.provider_uri
                ),
            }
        }
    };

    app.output.header("Apiary deployment");
    let plan: Vec<&str> = graph.units().map(|u| u.name.as_str()).collect();
    app.output.kv("Units", &plan.join(", "));
    app.output.kv("Provider", &config.provider_uri);
    app.output.kv("Deployer", &deployer_address);
    app.output
        .kv("Registry", &config.registry_path.display().to_string());

    // --force implies non-interactive secrets: fresh random material
    // instead of terminal prompts.
    if args.force || app.non_interactive {
        execute(
            args,
            app,
            &config,
            &graph,
            &ledger,
            deployer_address,
            &GeneratedSecretSource::new(),
        )
        .await
    } else {
        execute(
            args,
            app,
            &config,
            &graph,
            &ledger,
            deployer_address,
            &DialoguerSecretSource::new(),
        )
        .await
    }
}

async fn execute(
    args: &DeployArgs,
    app: &AppContext,
    config: &DeployConfig,
    graph: &DependencyGraph,
    ledger: &HttpLedgerClient,
    deployer_address: String,
    secrets: &impl SecretSource,
) -> Result<()> {
    let registry_path = config.registry_path.clone();
    let orchestrator =
        DeploymentOrchestrator::new(ledger, deployer_address, config.secret_attempts);
    let gate = app.gate(args.force);
    let reporter = app.terminal_reporter();
    let store = RegistryManager::new();

    if let Some(name) = &args.unit {
        let mut record = store
            .load(&registry_path)
            .await?
            .unwrap_or_else(DeploymentRecord::new);
        let agents = registry_from_record(&record, graph);

        let (transactions, agent) = orchestrator
            .deploy_single(name, graph, &agents, secrets, &gate, &reporter)
            .await?;
        // A re-deploy replaces the unit's committed entry; the record
        // keeps one entry per unit.
        record.upsert(name, transactions);
        let committed = store.commit(&record, &registry_path).await?;

        app.output
            .success(&format!("{name} deployed as agent '{}'", agent.agent_name));
        app.output.kv("Registry", &committed);
        return Ok(());
    }

    let run = orchestrator
        .deploy_all(graph, secrets, &gate, &reporter)
        .await?;

    if let Some(failure) = run.failure {
        for unit in run.record.units() {
            app.output.warn(&format!(
                "'{}' already deployed and is not rolled back",
                unit.unit
            ));
        }
        app.output
            .error(&format!("deployment stopped at '{}'", failure.unit));
        return Err(failure.error.context(format!("deploying '{}'", failure.unit)));
    }

    let committed = store.commit(&run.record, &registry_path).await?;
    app.output.success(&format!(
        "all {} units deployed",
        run.record.len()
    ));
    for unit in run.record.units() {
        app.output.kv(
            &unit.unit,
            &format!("{} transaction(s)", unit.transactions.len()),
        );
    }
    app.output.kv("Registry", &committed);
    Ok(())
}
