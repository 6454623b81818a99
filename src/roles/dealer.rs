// src/roles/dealer.rs

use super::{close_socket, open_socket, Role};
use crate::config::{DealerConfig, SocketMode};
use crate::error::{Error, Result};
use crate::message::lossy;
use crate::supervisor::{pause, supervise};
use async_trait::async_trait;
use rzmq::socket::options::ROUTING_ID;
use rzmq::{Context, Msg, Socket, SocketType};
use tokio_util::sync::CancellationToken;

/// Periodically signals the router with a fixed command. Fire-and-forget:
/// no reply is read.
pub struct Dealer {
  config: DealerConfig,
}

impl Dealer {
  pub fn new(config: DealerConfig) -> Result<Self> {
    config.validate()?;
    Ok(Self { config })
  }

  async fn run_once(&self, ctx: &Context, token: &CancellationToken) -> Result<()> {
    let url = self.config.endpoint.url();
    tracing::info!(endpoint = %url, identity = %lossy(&self.config.identity), "Connecting DEALER");
    // The identity has to be in place before the handshake, i.e. before connect.
    let options = [(ROUTING_ID, self.config.identity.as_slice())];
    let socket = open_socket(ctx, SocketType::Dealer, &self.config.endpoint, SocketMode::Connect, &options).await?;
    tracing::info!(endpoint = %url, "Command DEALER initialized");
    let result = self.command_loop(&socket, token).await;
    close_socket(socket, self.name()).await;
    result
  }

  async fn command_loop(&self, socket: &Socket, token: &CancellationToken) -> Result<()> {
    if !pause(token, self.config.grace_period).await {
      return Ok(());
    }
    loop {
      tracing::info!(message = %self.config.command, "Command DEALER sending");
      let msg = Msg::from_vec(self.config.command.as_bytes().to_vec());
      tokio::select! {
        _ = token.cancelled() => return Ok(()),
        sent = socket.send(msg) => sent.map_err(|e| Error::transport("send", e))?,
      }
      if !pause(token, self.config.interval).await {
        return Ok(());
      }
    }
  }
}

#[async_trait]
impl Role for Dealer {
  fn name(&self) -> &'static str {
    "dealer"
  }

  async fn run(&self, ctx: &Context, token: &CancellationToken) -> Result<()> {
    supervise(self.name(), token, self.config.retry, || self.run_once(ctx, token)).await
  }
}
