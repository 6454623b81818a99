// src/lib.rs

//! rzmq_pubrouter - topic fan-out and dealer-driven state toggling on top of rzmq.
//!
//! A ROUTER receives commands from DEALER peers and flips a shared greeting
//! between "Hello World" and "Hello Sekai"; a PUB socket broadcasts the
//! current greeting on the `world` topic to SUB peers. The wire protocol,
//! framing and topic filtering all come from `rzmq`; this crate supplies the
//! roles, their loops, supervision and shutdown.
//!
//! # Example
//! ```no_run
//! use rzmq_pubrouter::{config::PubRouterConfig, Orchestrator};
//!
//! # async fn demo() -> rzmq_pubrouter::Result<()> {
//! let mut orchestrator = Orchestrator::new()?;
//! let handle = orchestrator.spawn_pub_router(PubRouterConfig::default())?;
//! println!("current greeting: {}", handle.state.snapshot().payload);
//! orchestrator.run_until(tokio::signal::ctrl_c()).await
//! # }
//! ```

/// Endpoints, per-role settings and their defaults.
pub mod config;
/// The crate error type and its recoverable/fatal classification.
pub mod error;
/// Two-frame messages and socket send/recv helpers.
pub mod message;
/// Process-level wiring of roles onto one transport context.
pub mod orchestrator;
/// Dealer identity bookkeeping for the router.
pub mod peers;
/// Publisher, Router, Dealer and Subscriber.
pub mod roles;
/// The toggled greeting shared by router and publisher.
pub mod state;
/// Retry policy and cancellable suspension.
pub mod supervisor;

pub use config::{Endpoint, SocketMode};
pub use error::{Error, ErrorKind, Result};
pub use message::TopicMessage;
pub use orchestrator::{Orchestrator, PubRouterHandle};
pub use peers::PeerRegistry;
pub use roles::{ChannelHandler, Dealer, LogHandler, MessageHandler, Publisher, Role, Router, Subscriber};
pub use state::{Language, MessageState, Snapshot};
pub use supervisor::RetryPolicy;
