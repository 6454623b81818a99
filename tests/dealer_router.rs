// tests/dealer_router.rs

use bytes::Bytes;
use rzmq::socket::options::ROUTING_ID;
use rzmq::{Context, Msg, SocketType};
use rzmq_pubrouter::config::{DealerConfig, RouterConfig};
use rzmq_pubrouter::message::{frames_from_parts, recv_frames, RoutedCommand};
use rzmq_pubrouter::{Dealer, Error, Language, MessageState, Orchestrator, Role, Router};
use serial_test::serial;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
mod common;

const LONG_TIMEOUT: Duration = Duration::from_secs(3);

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[serial]
async fn test_router_toggles_once_per_command() -> anyhow::Result<()> {
  common::setup_tracing();
  let state = Arc::new(MessageState::new());
  let router = Router::new(RouterConfig::new(common::local(5761)), state.clone())?;
  let peers = router.peers();
  let mut router_orch = Orchestrator::new()?;
  router_orch.spawn(router);
  tokio::time::sleep(Duration::from_millis(100)).await;

  let ctx = Context::new()?;
  let dealer = ctx.socket(SocketType::Dealer)?;
  dealer.set_option_raw(ROUTING_ID, b"test_dealer").await?;
  dealer.connect(&common::local(5761).url()).await?;
  tokio::time::sleep(Duration::from_millis(200)).await;

  let expected = [Language::Japanese, Language::English, Language::Japanese];
  for (n, language) in expected.into_iter().enumerate() {
    // Payload content is irrelevant; every command toggles.
    dealer.send(Msg::from_vec(format!("command {}", n).into_bytes())).await?;
    let want = n as u64 + 1;
    let shared = &state;
    assert!(
      common::eventually(LONG_TIMEOUT, || async move { shared.snapshot().toggles == want }).await,
      "router did not apply command {}",
      n
    );
    let snap = state.snapshot();
    assert_eq!(snap.language, language);
    assert_eq!(snap.payload, language.greeting());
  }

  assert_eq!(peers.len(), 1);
  assert_eq!(peers.identities(), vec![Bytes::from_static(b"test_dealer")]);
  assert_eq!(peers.get(b"test_dealer").map(|r| r.commands), Some(3));

  dealer.close().await?;
  ctx.term().await?;
  router_orch.shutdown().await?;
  Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[serial]
async fn test_dealer_sends_fixed_command_repeatedly() -> anyhow::Result<()> {
  common::setup_tracing();
  let endpoint = common::local(5762);
  let ctx = Context::new()?;
  let router = ctx.socket(SocketType::Router)?;
  router.bind(&endpoint.url()).await?;

  let config = DealerConfig::new(endpoint)
    .grace_period(Duration::from_millis(200))
    .interval(Duration::from_millis(200));
  let mut dealer_orch = Orchestrator::new()?;
  dealer_orch.spawn(Dealer::new(config)?);

  for _ in 0..2 {
    let frames = tokio::time::timeout(LONG_TIMEOUT, recv_frames(&router)).await??;
    let command = RoutedCommand::from_frames(frames)?;
    assert_eq!(&command.identity[..], b"lang_dealer");
    assert_eq!(&command.payload[..], b"Change that language!");
  }

  dealer_orch.shutdown().await?;
  router.close().await?;
  ctx.term().await?;
  Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[serial]
async fn test_router_stops_on_malformed_command() -> anyhow::Result<()> {
  common::setup_tracing();
  let state = Arc::new(MessageState::new());
  let router = Router::new(RouterConfig::new(common::local(5763)), state.clone())?;

  let router_ctx = Context::new()?;
  let token = CancellationToken::new();
  let router_task = {
    let ctx = router_ctx.clone();
    let token = token.clone();
    tokio::spawn(async move { router.run(&ctx, &token).await })
  };
  tokio::time::sleep(Duration::from_millis(100)).await;

  let ctx = Context::new()?;
  let dealer = ctx.socket(SocketType::Dealer)?;
  dealer.connect(&common::local(5763).url()).await?;
  tokio::time::sleep(Duration::from_millis(200)).await;

  // Two payload frames arrive at the router as [identity, a, b].
  dealer
    .send_multipart(frames_from_parts([Bytes::from_static(b"part one"), Bytes::from_static(b"part two")]))
    .await?;

  let result = tokio::time::timeout(LONG_TIMEOUT, router_task).await??;
  assert!(matches!(result, Err(Error::Decode(_))), "unexpected result: {:?}", result);
  assert_eq!(state.snapshot().toggles, 0);

  dealer.close().await?;
  ctx.term().await?;
  router_ctx.term().await?;
  Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[serial]
async fn test_router_sees_configured_dealer_identity() -> anyhow::Result<()> {
  common::setup_tracing();
  let state = Arc::new(MessageState::new());
  let router = Router::new(RouterConfig::new(common::local(5764)), state.clone())?;
  let peers = router.peers();
  let mut orchestrator = Orchestrator::new()?;
  orchestrator.spawn(router);

  let config = DealerConfig::new(common::local(5764))
    .identity(b"dealer_7".to_vec())
    .grace_period(Duration::from_millis(300))
    .interval(Duration::from_millis(100));
  orchestrator.spawn(Dealer::new(config)?);

  let registry = &peers;
  assert!(
    common::eventually(LONG_TIMEOUT, || async move {
      registry.get(b"dealer_7").is_some_and(|r| r.commands >= 2)
    })
    .await,
    "router never recorded dealer_7"
  );
  assert_eq!(peers.identities(), vec![Bytes::from_static(b"dealer_7")]);
  assert!(state.snapshot().toggles >= 2);

  orchestrator.shutdown().await?;
  Ok(())
}
