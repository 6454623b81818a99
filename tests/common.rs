// tests/common.rs
#![allow(dead_code)]

use rzmq_pubrouter::{Endpoint, TopicMessage};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tokio::time::timeout;

static TRACING_INIT: Once = Once::new();

/// Installs a test-writer subscriber once per test binary.
pub fn setup_tracing() {
  TRACING_INIT.call_once(|| {
    let default_filter = "rzmq_pubrouter=debug,rzmq=info,warn";
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let subscriber = FmtSubscriber::builder()
      .with_env_filter(env_filter)
      .with_target(true)
      .with_line_number(true)
      .with_span_events(FmtSpan::CLOSE)
      .with_test_writer()
      .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set global tracing subscriber");
  });
}

pub fn local(port: u16) -> Endpoint {
  Endpoint::new("127.0.0.1", port).expect("valid test endpoint")
}

/// Receives from a handler channel, failing the test after `duration`.
pub async fn recv_timeout<T>(rx: &async_channel::Receiver<T>, duration: Duration) -> anyhow::Result<T> {
  match timeout(duration, rx.recv()).await {
    Ok(Ok(item)) => Ok(item),
    Ok(Err(_)) => anyhow::bail!("channel closed"),
    Err(_) => anyhow::bail!("timed out after {:?}", duration),
  }
}

pub fn payload(msg: &TopicMessage) -> String {
  String::from_utf8_lossy(&msg.payload).into_owned()
}

/// Polls `check` every 20ms until it holds or `duration` elapses.
pub async fn eventually<F, Fut>(duration: Duration, mut check: F) -> bool
where
  F: FnMut() -> Fut,
  Fut: Future<Output = bool>,
{
  let start = tokio::time::Instant::now();
  while start.elapsed() < duration {
    if check().await {
      return true;
    }
    tokio::time::sleep(Duration::from_millis(20)).await;
  }
  check().await
}
