//! Apiary CLI - deployment and swarm orchestration for apiary networks

#![cfg_attr(test, allow(clippy::expect_used))]

use clap::Parser;

use apiary_cli::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = cli.run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
