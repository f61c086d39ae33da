use anyhow::Result;
use clap::Parser;
use guinea_cli::{init_tracing, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is normal in deployments that export variables directly.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing();
    guinea_discord_runtime::run_discord_bot(cli.runtime_config()).await
}
