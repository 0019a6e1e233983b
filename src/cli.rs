//! CLI argument parsing with clap derive

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags};
use crate::commands;

/// Deployment and swarm orchestration for apiary networks
#[derive(Parser)]
#[command(
    name = "apiary",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    ///
    /// `NO_COLOR` is honored by the output layer with any value; only the
    /// flag itself is parsed here.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Answer yes to all prompts
    #[arg(short, long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Deploy the on-chain units in dependency order
    Deploy(commands::deploy::DeployArgs),

    /// Launch and supervise a local worker swarm
    Simulate(commands::simulate::SimulateArgs),

    /// Show version
    Version,

    #[command(hide = true, name = "_worker")]
    Worker(commands::worker::WorkerArgs),
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<()> {
        let Cli {
            quiet,
            no_color,
            yes,
            command,
        } = self;
        let app = AppContext::new(&AppFlags {
            no_color,
            quiet,
            yes,
        });
        match command {
            Command::Deploy(args) => commands::deploy::run(&args, &app).await,
            Command::Simulate(args) => commands::simulate::run(&args, &app).await,
            Command::Worker(args) => commands::worker::run(&args, &app).await,
            Command::Version => {
                commands::version::run();
                Ok(())
            }
        }
    }
}
