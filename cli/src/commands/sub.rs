use crate::cli::SubArgs;

use anyhow::{Context as AnyhowContext, Result};
use rzmq_pubrouter::config::SubscriberConfig;
use rzmq_pubrouter::{Endpoint, Orchestrator, SocketMode, Subscriber};

pub async fn run(args: SubArgs) -> Result<()> {
  let endpoint = Endpoint::new(&args.host, args.port).context("Invalid --host/--port")?;
  let mode = if args.connect { SocketMode::Connect } else { SocketMode::Bind };
  let config = SubscriberConfig::new(endpoint)
    .mode(mode)
    .topic(args.topic)
    .retry(args.retry.policy());
  let subscriber = Subscriber::logging(config).context("Invalid SUBSCRIBER configuration")?;

  let mut orchestrator = Orchestrator::new().context("Failed to create rzmq context")?;
  orchestrator.spawn(subscriber);

  orchestrator
    .run_until(tokio::signal::ctrl_c())
    .await
    .context("SUBSCRIBER terminated with an error")
}
