// src/error.rs

use rzmq::ZmqError;
use std::time::Duration;
use thiserror::Error;

/// Errors produced by the messaging roles and the orchestrator.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
  /// A call into the transport (bind, connect, send, recv, set option) failed.
  #[error("transport error during {op}: {source}")]
  Transport {
    op: &'static str,
    #[source]
    source: ZmqError,
  },

  /// An inbound multipart message did not have the expected shape or encoding.
  #[error("malformed message: {0}")]
  Decode(String),

  /// Invalid endpoint or timing configuration. Raised before any loop starts.
  #[error("invalid configuration: {0}")]
  Config(String),

  /// The transport context did not terminate within the teardown timeout.
  #[error("context failed to terminate within {0:?}; sockets or actors leaked")]
  ContextLeak(Duration),

  /// A role task panicked or was aborted.
  #[error("task failed to join: {0}")]
  TaskJoin(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Supervisor classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// Transient condition; the role may be restarted after a backoff.
  Recoverable,
  /// The role must stop and the error is propagated upward.
  Fatal,
}

impl Error {
  /// Wraps a transport error, tagging it with the operation that produced it.
  pub fn transport(op: &'static str, source: ZmqError) -> Self {
    Error::Transport { op, source }
  }

  pub fn kind(&self) -> ErrorKind {
    match self {
      Error::Transport { source, .. } => match source {
        ZmqError::Timeout
        | ZmqError::ConnectionClosed
        | ZmqError::ConnectionRefused(_)
        | ZmqError::HostUnreachable(_) => ErrorKind::Recoverable,
        _ => ErrorKind::Fatal,
      },
      Error::Decode(_) | Error::Config(_) | Error::ContextLeak(_) | Error::TaskJoin(_) => ErrorKind::Fatal,
    }
  }

  pub fn is_recoverable(&self) -> bool {
    self.kind() == ErrorKind::Recoverable
  }
}

impl From<tokio::task::JoinError> for Error {
  fn from(e: tokio::task::JoinError) -> Self {
    Error::TaskJoin(e.to_string())
  }
}
