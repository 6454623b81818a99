// src/config.rs

//! Endpoint and timing configuration for each role.
//!
//! Every config has a `Default` matching the stock topology (subscriber binds
//! `127.0.0.1:5555`, router binds `127.0.0.1:5556`) and is checked with
//! `validate()` before any socket is created.

use crate::error::{Error, Result};
use crate::supervisor::RetryPolicy;
use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PUB_PORT: u16 = 5555;
pub const DEFAULT_ROUTER_PORT: u16 = 5556;

pub const DEFAULT_TOPIC: &str = "world";
pub const DEFAULT_DEALER_IDENTITY: &[u8] = b"lang_dealer";
pub const DEFAULT_COMMAND: &str = "Change that language!";

pub const DEFAULT_PUBLISH_INTERVAL: Duration = Duration::from_millis(500);
pub const DEFAULT_COMMAND_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_millis(300);
/// Shortest grace period that still lets peer binds settle.
pub const MIN_GRACE_PERIOD: Duration = Duration::from_millis(200);
pub const DEFAULT_TEARDOWN_TIMEOUT: Duration = Duration::from_secs(2);
/// Dealer identities the router remembers before evicting the stalest.
pub const DEFAULT_MAX_PEERS: usize = 1024;

/// A TCP endpoint. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
  host: String,
  port: u16,
}

impl Endpoint {
  /// Builds an endpoint, rejecting an empty or malformed host and port 0.
  ///
  /// The host may be an IP literal, `*` (bind on all interfaces) or a DNS name.
  pub fn new(host: impl Into<String>, port: u16) -> Result<Self> {
    let host = host.into();
    if port == 0 {
      return Err(Error::Config(format!("port must be non-zero (host '{}')", host)));
    }
    if !is_valid_host(&host) {
      return Err(Error::Config(format!("invalid host '{}'", host)));
    }
    Ok(Self { host, port })
  }

  pub fn host(&self) -> &str {
    &self.host
  }

  pub fn port(&self) -> u16 {
    self.port
  }

  /// The transport URL, e.g. `tcp://127.0.0.1:5555`.
  pub fn url(&self) -> String {
    format!("tcp://{}:{}", self.host, self.port)
  }
}

impl fmt::Display for Endpoint {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "tcp://{}:{}", self.host, self.port)
  }
}

fn is_valid_host(host: &str) -> bool {
  if host == "*" || host.parse::<IpAddr>().is_ok() {
    return true;
  }
  !host.is_empty()
    && host.len() <= 253
    && host.split('.').all(|label| {
      !label.is_empty()
        && label.len() <= 63
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

/// Whether a role binds its endpoint or connects to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketMode {
  Bind,
  Connect,
}

fn check_interval(name: &str, value: Duration) -> Result<()> {
  if value.is_zero() {
    return Err(Error::Config(format!("{} must be greater than zero", name)));
  }
  Ok(())
}

fn check_grace(value: Duration) -> Result<()> {
  if value < MIN_GRACE_PERIOD {
    return Err(Error::Config(format!(
      "grace period {:?} is shorter than the minimum {:?}",
      value, MIN_GRACE_PERIOD
    )));
  }
  Ok(())
}

#[derive(Debug, Clone)]
pub struct PublisherConfig {
  pub endpoint: Endpoint,
  pub mode: SocketMode,
  pub topic: String,
  pub grace_period: Duration,
  pub interval: Duration,
  pub retry: RetryPolicy,
}

impl Default for PublisherConfig {
  fn default() -> Self {
    Self {
      endpoint: Endpoint {
        host: DEFAULT_HOST.to_string(),
        port: DEFAULT_PUB_PORT,
      },
      mode: SocketMode::Connect,
      topic: DEFAULT_TOPIC.to_string(),
      grace_period: DEFAULT_GRACE_PERIOD,
      interval: DEFAULT_PUBLISH_INTERVAL,
      retry: RetryPolicy::never(),
    }
  }
}

impl PublisherConfig {
  pub fn new(endpoint: Endpoint) -> Self {
    Self {
      endpoint,
      ..Default::default()
    }
  }

  pub fn mode(mut self, mode: SocketMode) -> Self {
    self.mode = mode;
    self
  }

  pub fn topic(mut self, topic: impl Into<String>) -> Self {
    self.topic = topic.into();
    self
  }

  pub fn grace_period(mut self, grace_period: Duration) -> Self {
    self.grace_period = grace_period;
    self
  }

  pub fn interval(mut self, interval: Duration) -> Self {
    self.interval = interval;
    self
  }

  pub fn retry(mut self, retry: RetryPolicy) -> Self {
    self.retry = retry;
    self
  }

  pub fn validate(&self) -> Result<()> {
    check_grace(self.grace_period)?;
    check_interval("publish interval", self.interval)
  }
}

#[derive(Debug, Clone)]
pub struct RouterConfig {
  pub endpoint: Endpoint,
  pub max_peers: usize,
  pub retry: RetryPolicy,
}

impl Default for RouterConfig {
  fn default() -> Self {
    Self {
      endpoint: Endpoint {
        host: DEFAULT_HOST.to_string(),
        port: DEFAULT_ROUTER_PORT,
      },
      max_peers: DEFAULT_MAX_PEERS,
      retry: RetryPolicy::never(),
    }
  }
}

impl RouterConfig {
  pub fn new(endpoint: Endpoint) -> Self {
    Self {
      endpoint,
      ..Default::default()
    }
  }

  pub fn max_peers(mut self, max_peers: usize) -> Self {
    self.max_peers = max_peers;
    self
  }

  pub fn retry(mut self, retry: RetryPolicy) -> Self {
    self.retry = retry;
    self
  }

  pub fn validate(&self) -> Result<()> {
    if self.max_peers == 0 {
      return Err(Error::Config("router max_peers must be at least 1".into()));
    }
    Ok(())
  }
}

#[derive(Debug, Clone)]
pub struct DealerConfig {
  pub endpoint: Endpoint,
  pub identity: Vec<u8>,
  pub command: String,
  pub grace_period: Duration,
  pub interval: Duration,
  pub retry: RetryPolicy,
}

impl Default for DealerConfig {
  fn default() -> Self {
    Self {
      endpoint: Endpoint {
        host: DEFAULT_HOST.to_string(),
        port: DEFAULT_ROUTER_PORT,
      },
      identity: DEFAULT_DEALER_IDENTITY.to_vec(),
      command: DEFAULT_COMMAND.to_string(),
      grace_period: DEFAULT_GRACE_PERIOD,
      interval: DEFAULT_COMMAND_INTERVAL,
      retry: RetryPolicy::never(),
    }
  }
}

impl DealerConfig {
  pub fn new(endpoint: Endpoint) -> Self {
    Self {
      endpoint,
      ..Default::default()
    }
  }

  pub fn identity(mut self, identity: impl Into<Vec<u8>>) -> Self {
    self.identity = identity.into();
    self
  }

  pub fn command(mut self, command: impl Into<String>) -> Self {
    self.command = command.into();
    self
  }

  pub fn grace_period(mut self, grace_period: Duration) -> Self {
    self.grace_period = grace_period;
    self
  }

  pub fn interval(mut self, interval: Duration) -> Self {
    self.interval = interval;
    self
  }

  pub fn retry(mut self, retry: RetryPolicy) -> Self {
    self.retry = retry;
    self
  }

  pub fn validate(&self) -> Result<()> {
    // ZMTP reserves identities starting with a zero byte, and caps them at 255 bytes.
    if self.identity.is_empty() || self.identity.len() > 255 || self.identity[0] == 0 {
      return Err(Error::Config(format!(
        "dealer identity must be 1..=255 bytes and not start with 0x00 (got {} bytes)",
        self.identity.len()
      )));
    }
    check_grace(self.grace_period)?;
    check_interval("command interval", self.interval)
  }
}

#[derive(Debug, Clone)]
pub struct SubscriberConfig {
  pub endpoint: Endpoint,
  pub mode: SocketMode,
  pub topic: String,
  pub retry: RetryPolicy,
}

impl Default for SubscriberConfig {
  fn default() -> Self {
    Self {
      endpoint: Endpoint {
        host: DEFAULT_HOST.to_string(),
        port: DEFAULT_PUB_PORT,
      },
      mode: SocketMode::Bind,
      topic: DEFAULT_TOPIC.to_string(),
      retry: RetryPolicy::never(),
    }
  }
}

impl SubscriberConfig {
  pub fn new(endpoint: Endpoint) -> Self {
    Self {
      endpoint,
      ..Default::default()
    }
  }

  pub fn mode(mut self, mode: SocketMode) -> Self {
    self.mode = mode;
    self
  }

  pub fn topic(mut self, topic: impl Into<String>) -> Self {
    self.topic = topic.into();
    self
  }

  pub fn retry(mut self, retry: RetryPolicy) -> Self {
    self.retry = retry;
    self
  }

  pub fn validate(&self) -> Result<()> {
    Ok(())
  }
}

/// The co-located router + publisher process.
#[derive(Debug, Clone, Default)]
pub struct PubRouterConfig {
  pub publisher: PublisherConfig,
  pub router: RouterConfig,
}

impl PubRouterConfig {
  pub fn new(sub_endpoint: Endpoint, router_endpoint: Endpoint) -> Self {
    Self {
      publisher: PublisherConfig::new(sub_endpoint),
      router: RouterConfig::new(router_endpoint),
    }
  }

  pub fn validate(&self) -> Result<()> {
    self.publisher.validate()?;
    self.router.validate()
  }
}
