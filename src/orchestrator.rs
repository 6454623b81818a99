// src/orchestrator.rs

use crate::config::{PubRouterConfig, DEFAULT_TEARDOWN_TIMEOUT};
use crate::error::{Error, Result};
use crate::peers::PeerRegistry;
use crate::roles::{Publisher, Role, Router};
use crate::state::MessageState;
use rzmq::Context;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Handles to the shared pieces of a running PUB+ROUTER pair.
#[derive(Debug, Clone)]
pub struct PubRouterHandle {
  pub state: Arc<MessageState>,
  pub peers: Arc<PeerRegistry>,
}

/// Owns the process-wide transport context and the role tasks running on it.
///
/// Roles share one [`CancellationToken`]. [`Orchestrator::shutdown`] cancels
/// it, waits for every task, then terminates the context within the teardown
/// timeout; a context that outlives the timeout is reported as
/// [`Error::ContextLeak`].
pub struct Orchestrator {
  ctx: Context,
  token: CancellationToken,
  tasks: JoinSet<(&'static str, Result<()>)>,
  teardown_timeout: Duration,
}

impl Orchestrator {
  pub fn new() -> Result<Self> {
    let ctx = Context::new().map_err(|e| Error::transport("context", e))?;
    Ok(Self::with_context(ctx))
  }

  pub fn with_context(ctx: Context) -> Self {
    Self {
      ctx,
      token: CancellationToken::new(),
      tasks: JoinSet::new(),
      teardown_timeout: DEFAULT_TEARDOWN_TIMEOUT,
    }
  }

  pub fn teardown_timeout(mut self, timeout: Duration) -> Self {
    self.teardown_timeout = timeout;
    self
  }

  pub fn len(&self) -> usize {
    self.tasks.len()
  }

  pub fn is_empty(&self) -> bool {
    self.tasks.is_empty()
  }

  /// Spawns `role` on the runtime against the shared context and token.
  pub fn spawn<R: Role>(&mut self, role: R) {
    let ctx = self.ctx.clone();
    let token = self.token.clone();
    let name = role.name();
    tracing::debug!(role = name, "spawning role");
    self.tasks.spawn(async move {
      let result = role.run(&ctx, &token).await;
      (name, result)
    });
  }

  /// Wires a publisher and a router around one fresh [`MessageState`].
  pub fn spawn_pub_router(&mut self, config: PubRouterConfig) -> Result<PubRouterHandle> {
    config.validate()?;
    let state = Arc::new(MessageState::new());
    let publisher = Publisher::new(config.publisher, state.clone())?;
    let router = Router::new(config.router, state.clone())?;
    let peers = router.peers();
    self.spawn(publisher);
    self.spawn(router);
    Ok(PubRouterHandle { state, peers })
  }

  /// Waits until every role has finished. The first failure cancels the
  /// remaining roles; that error is returned once they have stopped.
  pub async fn join_all(&mut self) -> Result<()> {
    let mut first_err = None;
    while let Some(joined) = self.tasks.join_next().await {
      let outcome = match joined {
        Ok((name, Ok(()))) => {
          tracing::info!(role = name, "role stopped");
          continue;
        }
        Ok((name, Err(e))) => {
          tracing::error!(role = name, error = %e, detail = ?e, "role stopped with error");
          e
        }
        Err(join_err) => {
          tracing::error!(error = %join_err, "role task panicked or was aborted");
          Error::from(join_err)
        }
      };
      if first_err.is_none() {
        tracing::debug!(remaining = self.tasks.len(), "cancelling remaining roles");
        self.token.cancel();
        first_err = Some(outcome);
      }
    }
    first_err.map_or(Ok(()), Err)
  }

  /// Runs every role until they all finish or `signal` resolves, then shuts down.
  pub async fn run_until<F>(mut self, signal: F) -> Result<()>
  where
    F: Future,
  {
    let joined = tokio::select! {
      _ = signal => {
        tracing::info!("shutdown signal received");
        Ok(())
      }
      joined = self.join_all() => joined,
    };
    let shutdown = self.shutdown().await;
    joined.and(shutdown)
  }

  /// Runs every role to completion, then tears the context down.
  pub async fn run(mut self) -> Result<()> {
    let joined = self.join_all().await;
    let shutdown = self.shutdown().await;
    joined.and(shutdown)
  }

  /// Cancels all roles, waits for them, and terminates the context.
  pub async fn shutdown(mut self) -> Result<()> {
    tracing::debug!(tasks = self.tasks.len(), "shutting down orchestrator");
    self.token.cancel();

    let deadline = self.teardown_timeout;
    if tokio::time::timeout(deadline, self.drain()).await.is_err() {
      tracing::warn!(remaining = self.tasks.len(), "roles did not stop in time; aborting");
      self.tasks.abort_all();
      while self.tasks.join_next().await.is_some() {}
    }

    match tokio::time::timeout(deadline, self.ctx.term()).await {
      Ok(Ok(())) => {
        tracing::info!("context terminated");
        Ok(())
      }
      Ok(Err(e)) => Err(Error::transport("term", e)),
      Err(_) => {
        tracing::error!(timeout = ?deadline, "context failed to terminate; open sockets likely remain");
        Err(Error::ContextLeak(deadline))
      }
    }
  }

  /// Collects role results during shutdown; errors were already logged by
  /// the supervisor.
  async fn drain(&mut self) {
    while let Some(joined) = self.tasks.join_next().await {
      match joined {
        Ok((name, Ok(()))) => tracing::debug!(role = name, "role stopped"),
        Ok((name, Err(e))) => tracing::debug!(role = name, error = %e, "role stopped with error"),
        Err(e) => tracing::warn!(error = %e, "role task panicked"),
      }
    }
  }
}

impl std::fmt::Debug for Orchestrator {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Orchestrator")
      .field("tasks", &self.tasks.len())
      .field("cancelled", &self.token.is_cancelled())
      .field("teardown_timeout", &self.teardown_timeout)
      .finish_non_exhaustive()
  }
}
