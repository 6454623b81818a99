mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

fn init_tracing() {
  use tracing_subscriber::{fmt, EnvFilter};

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
  init_tracing();
  let cli_args = Cli::parse();

  match cli_args.command {
    Commands::PubRouter(args) => commands::pub_router::run(args).await,
    Commands::Dealer(args) => commands::dealer::run(args).await,
    Commands::Sub(args) => commands::sub::run(args).await,
  }
}
