use crate::cli::DealerArgs;

use anyhow::{Context as AnyhowContext, Result};
use rzmq_pubrouter::config::DealerConfig;
use rzmq_pubrouter::{Dealer, Endpoint, Orchestrator};
use std::time::Duration;

pub async fn run(args: DealerArgs) -> Result<()> {
  let endpoint = Endpoint::new(&args.host, args.port).context("Invalid --host/--port")?;
  let config = DealerConfig::new(endpoint)
    .identity(args.identity.into_bytes())
    .command(args.message)
    .interval(Duration::from_millis(args.interval_ms))
    .grace_period(Duration::from_millis(args.grace_ms))
    .retry(args.retry.policy());
  let dealer = Dealer::new(config).context("Invalid DEALER configuration")?;

  let mut orchestrator = Orchestrator::new().context("Failed to create rzmq context")?;
  orchestrator.spawn(dealer);

  orchestrator
    .run_until(tokio::signal::ctrl_c())
    .await
    .context("DEALER terminated with an error")
}
