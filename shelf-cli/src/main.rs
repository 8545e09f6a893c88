mod cli;
mod commands;
mod telemetry;

use clap::Parser;

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.log_json);

    let config = cli.rag.to_config()?;
    let embedder = commands::embedding_provider(&cli.embedding);

    match &cli.command {
        Command::Ingest { csv } => commands::ingest(config, embedder, csv).await,
        Command::Search { query } => commands::search(config, embedder, query).await,
        serve @ Command::Serve { .. } => {
            let server = serve.server_config().unwrap_or_default();
            commands::serve(config, embedder, server).await
        }
    }
}
