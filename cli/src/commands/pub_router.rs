use crate::cli::PubRouterArgs;

use anyhow::{Context as AnyhowContext, Result};
use rzmq_pubrouter::config::{PubRouterConfig, PublisherConfig, RouterConfig};
use rzmq_pubrouter::{Endpoint, Orchestrator};
use std::time::Duration;

pub async fn run(args: PubRouterArgs) -> Result<()> {
  let sub_endpoint = Endpoint::new(&args.sub_host, args.sub_port).context("Invalid --sub-host/--sub-port")?;
  let router_endpoint =
    Endpoint::new(&args.router_host, args.router_port).context("Invalid --router-host/--router-port")?;

  let config = PubRouterConfig {
    publisher: PublisherConfig::new(sub_endpoint)
      .topic(args.topic)
      .interval(Duration::from_millis(args.interval_ms))
      .grace_period(Duration::from_millis(args.grace_ms))
      .retry(args.retry.policy()),
    router: RouterConfig::new(router_endpoint).retry(args.retry.policy()),
  };

  let mut orchestrator = Orchestrator::new().context("Failed to create rzmq context")?;
  orchestrator
    .spawn_pub_router(config)
    .context("Failed to start PUB+ROUTER")?;
  tracing::info!("PUB+ROUTER running; press Ctrl-C to stop");

  orchestrator
    .run_until(tokio::signal::ctrl_c())
    .await
    .context("PUB+ROUTER terminated with an error")
}
