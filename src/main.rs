use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use trigger_swap::adapter::inbound::cli::command::{Cli, Commands, OrdersCommand};
use trigger_swap::adapter::inbound::cli::output::{self, OutputConfig};
use trigger_swap::adapter::inbound::cli::{check, orders, run};

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    output::configure(OutputConfig::new(cli.json, cli.quiet));

    match dispatch(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let path = cli.config.as_path();
    match cli.command {
        Commands::Run => run::execute(path)
            .await
            .context("scheduler stopped with an error"),
        Commands::CheckConfig => {
            check::execute(path).with_context(|| format!("invalid config {}", path.display()))
        }
        Commands::Orders(OrdersCommand::List) => {
            orders::list(path).await.context("failed to list orders")
        }
        Commands::Orders(OrdersCommand::Cancel { id }) => orders::cancel(path, &id)
            .await
            .with_context(|| format!("failed to cancel order {id}")),
    }
}
