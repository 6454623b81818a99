// tests/pub_sub.rs

use bytes::Bytes;
use rzmq::{Context, SocketType};
use rzmq_pubrouter::config::{PublisherConfig, SubscriberConfig};
use rzmq_pubrouter::message::send_frames;
use rzmq_pubrouter::{ChannelHandler, MessageState, Orchestrator, Publisher, SocketMode, Subscriber, TopicMessage};
use serial_test::serial;
use std::sync::Arc;
use std::time::Duration;
mod common;

const SHORT_TIMEOUT: Duration = Duration::from_millis(300);
const LONG_TIMEOUT: Duration = Duration::from_secs(3);
const SETTLE: Duration = Duration::from_millis(500);

/// Starts a `world` subscriber in its own orchestrator and returns its channel.
fn spawn_subscriber(
  port: u16,
  mode: SocketMode,
  topic: &str,
) -> anyhow::Result<(Orchestrator, async_channel::Receiver<TopicMessage>)> {
  let (handler, rx) = ChannelHandler::unbounded();
  let config = SubscriberConfig::new(common::local(port)).mode(mode).topic(topic);
  let mut orchestrator = Orchestrator::new()?;
  orchestrator.spawn(Subscriber::new(config, Arc::new(handler))?);
  Ok((orchestrator, rx))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[serial]
async fn test_publisher_round_trips_greeting_to_bound_subscriber() -> anyhow::Result<()> {
  common::setup_tracing();
  let (sub_orch, rx) = spawn_subscriber(5751, SocketMode::Bind, "world")?;
  tokio::time::sleep(Duration::from_millis(100)).await;

  let state = Arc::new(MessageState::new());
  let mut pub_orch = Orchestrator::new()?;
  pub_orch.spawn(Publisher::new(PublisherConfig::new(common::local(5751)), state.clone())?);

  let first = common::recv_timeout(&rx, LONG_TIMEOUT).await?;
  assert_eq!(first.topic, Bytes::from_static(b"world"));
  assert_eq!(common::payload(&first), "Hello World");

  state.toggle();
  // One stale broadcast may still be in flight after the toggle.
  let mut next = common::recv_timeout(&rx, LONG_TIMEOUT).await?;
  if common::payload(&next) == "Hello World" {
    next = common::recv_timeout(&rx, LONG_TIMEOUT).await?;
  }
  assert_eq!(common::payload(&next), "Hello Sekai");

  pub_orch.shutdown().await?;
  sub_orch.shutdown().await?;
  Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[serial]
async fn test_subscriber_receives_topic_and_payload_unmodified() -> anyhow::Result<()> {
  common::setup_tracing();
  let endpoint = common::local(5752);
  let ctx = Context::new()?;
  let pub_socket = ctx.socket(SocketType::Pub)?;
  pub_socket.bind(&endpoint.url()).await?;

  let (sub_orch, rx) = spawn_subscriber(5752, SocketMode::Connect, "world")?;
  tokio::time::sleep(SETTLE).await;

  let payloads = ["Hello World", "こんにちは世界", "", "a longer payload with spaces and punctuation!?"];
  for p in payloads {
    send_frames(&pub_socket, TopicMessage::new("world", p).into_frames()).await?;
  }
  for p in payloads {
    let msg = common::recv_timeout(&rx, LONG_TIMEOUT).await?;
    assert_eq!(msg, TopicMessage::new("world", p));
  }

  sub_orch.shutdown().await?;
  pub_socket.close().await?;
  ctx.term().await?;
  Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[serial]
async fn test_subscriber_never_sees_other_topics() -> anyhow::Result<()> {
  common::setup_tracing();
  let endpoint = common::local(5753);
  let ctx = Context::new()?;
  let pub_socket = ctx.socket(SocketType::Pub)?;
  pub_socket.bind(&endpoint.url()).await?;

  let (sub_orch, rx) = spawn_subscriber(5753, SocketMode::Connect, "world")?;
  tokio::time::sleep(SETTLE).await;

  send_frames(&pub_socket, TopicMessage::new("sekai", "not for you").into_frames()).await?;
  send_frames(&pub_socket, TopicMessage::new("lang", "nor this").into_frames()).await?;
  send_frames(&pub_socket, TopicMessage::new("world", "Hello World").into_frames()).await?;

  let msg = common::recv_timeout(&rx, LONG_TIMEOUT).await?;
  assert_eq!(msg, TopicMessage::new("world", "Hello World"));

  send_frames(&pub_socket, TopicMessage::new("sekai", "still not for you").into_frames()).await?;
  assert!(common::recv_timeout(&rx, SHORT_TIMEOUT).await.is_err());

  sub_orch.shutdown().await?;
  pub_socket.close().await?;
  ctx.term().await?;
  Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[serial]
async fn test_subscriber_bound_before_grace_gets_first_broadcast() -> anyhow::Result<()> {
  common::setup_tracing();
  let (handler, rx) = ChannelHandler::unbounded();
  let (ready_tx, ready_rx) = async_channel::unbounded();
  let subscriber = Subscriber::new(SubscriberConfig::new(common::local(5754)), Arc::new(handler))?.with_ready(ready_tx);
  let mut sub_orch = Orchestrator::new()?;
  sub_orch.spawn(subscriber);
  // The publisher may only start once the bind has completed.
  common::recv_timeout(&ready_rx, LONG_TIMEOUT).await?;

  // A long interval leaves exactly one broadcast inside the receive window.
  let (tap_tx, tap_rx) = async_channel::unbounded();
  let state = Arc::new(MessageState::new());
  let config = PublisherConfig::new(common::local(5754)).interval(Duration::from_secs(30));
  let mut pub_orch = Orchestrator::new()?;
  pub_orch.spawn(Publisher::new(config, state)?.with_tap(tap_tx));

  let sent = common::recv_timeout(&tap_rx, LONG_TIMEOUT).await?;
  let received = common::recv_timeout(&rx, LONG_TIMEOUT).await?;
  assert_eq!(common::payload(&received), sent.payload);
  assert_eq!(sent.toggles, 0);

  pub_orch.shutdown().await?;
  sub_orch.shutdown().await?;
  Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[serial]
async fn test_publisher_snapshots_never_go_backwards() -> anyhow::Result<()> {
  common::setup_tracing();
  let (sub_orch, rx) = spawn_subscriber(5755, SocketMode::Bind, "world")?;

  let (tap_tx, tap_rx) = async_channel::unbounded();
  let state = Arc::new(MessageState::new());
  let config = PublisherConfig::new(common::local(5755))
    .grace_period(Duration::from_millis(200))
    .interval(Duration::from_millis(20));
  let mut pub_orch = Orchestrator::new()?;
  pub_orch.spawn(Publisher::new(config, state.clone())?.with_tap(tap_tx));

  let toggler = {
    let state = state.clone();
    tokio::spawn(async move {
      for _ in 0..50 {
        state.toggle();
        tokio::time::sleep(Duration::from_millis(7)).await;
      }
    })
  };

  let mut last = 0;
  for _ in 0..20 {
    let snap = common::recv_timeout(&tap_rx, LONG_TIMEOUT).await?;
    assert!(snap.toggles >= last, "snapshot went backwards: {} < {}", snap.toggles, last);
    assert_eq!(snap.payload, snap.language.greeting());
    last = snap.toggles;
  }
  toggler.await?;
  drop(rx);

  pub_orch.shutdown().await?;
  sub_orch.shutdown().await?;
  Ok(())
}
