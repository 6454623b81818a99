// src/roles/mod.rs

//! The four socket roles. Each one owns its socket for the duration of one
//! supervised attempt and suspends only on the grace period, its send
//! interval, or a receive, all raced against the shutdown token.

pub mod dealer;
pub mod publisher;
pub mod router;
pub mod subscriber;

pub use dealer::Dealer;
pub use publisher::Publisher;
pub use router::Router;
pub use subscriber::{ChannelHandler, LogHandler, MessageHandler, Subscriber};

use crate::config::{Endpoint, SocketMode};
use crate::error::{Error, Result};
use async_trait::async_trait;
use rzmq::socket::options::LINGER;
use rzmq::{Context, Socket, SocketType};
use tokio_util::sync::CancellationToken;

/// A long-lived task the orchestrator can spawn.
#[async_trait]
pub trait Role: Send + Sync + 'static {
  fn name(&self) -> &'static str;

  /// Runs until cancelled or until the supervisor gives up.
  async fn run(&self, ctx: &Context, token: &CancellationToken) -> Result<()>;
}

/// Creates a socket, applies `options` and `LINGER = 0`, then binds or
/// connects it. Options go in before attaching so that identities and
/// subscriptions are part of the first handshake.
pub(crate) async fn open_socket(
  ctx: &Context,
  socket_type: SocketType,
  endpoint: &Endpoint,
  mode: SocketMode,
  options: &[(i32, &[u8])],
) -> Result<Socket> {
  let socket = ctx.socket(socket_type).map_err(|e| Error::transport("socket", e))?;
  let prepared = async {
    for &(option, value) in options {
      socket
        .set_option_raw(option, value)
        .await
        .map_err(|e| Error::transport("setsockopt", e))?;
    }
    if let Err(e) = socket.set_option_raw(LINGER, &0i32.to_ne_bytes()).await {
      tracing::debug!(?socket_type, error = %e, "could not set LINGER=0");
    }
    attach(&socket, endpoint, mode).await
  }
  .await;
  match prepared {
    Ok(()) => Ok(socket),
    Err(e) => {
      close_socket(socket, "setup").await;
      Err(e)
    }
  }
}

pub(crate) async fn attach(socket: &Socket, endpoint: &Endpoint, mode: SocketMode) -> Result<()> {
  let url = endpoint.url();
  match mode {
    SocketMode::Bind => socket.bind(&url).await.map_err(|e| Error::transport("bind", e)),
    SocketMode::Connect => socket.connect(&url).await.map_err(|e| Error::transport("connect", e)),
  }
}

/// Closes `socket`; failures are logged, not returned.
pub(crate) async fn close_socket(socket: Socket, role: &'static str) {
  if let Err(e) = socket.close().await {
    tracing::warn!(role, error = %e, "error closing socket");
  }
}
