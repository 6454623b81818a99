// src/peers.rs

use crate::config::DEFAULT_MAX_PEERS;
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;
use tokio::time::Instant;

/// What the router knows about one dealer identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerRecord {
  pub first_seen: Instant,
  pub last_seen: Instant,
  pub commands: u64,
}

/// Identity → last-seen lookup kept by the router for correlation.
///
/// Nothing here influences routing: every command toggles the same shared
/// state no matter which peer sent it. At most `capacity` identities are
/// kept; a new identity arriving at a full registry evicts the one seen
/// least recently.
#[derive(Debug)]
pub struct PeerRegistry {
  peers: RwLock<HashMap<Bytes, PeerRecord>>,
  capacity: usize,
}

impl Default for PeerRegistry {
  fn default() -> Self {
    Self::with_capacity(DEFAULT_MAX_PEERS)
  }
}

impl PeerRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      peers: RwLock::new(HashMap::new()),
      capacity: capacity.max(1),
    }
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  /// Records a command from `identity` and returns the updated record.
  pub fn record(&self, identity: &Bytes) -> PeerRecord {
    let now = Instant::now();
    let mut peers = self.peers.write();
    if peers.len() >= self.capacity && !peers.contains_key(identity) {
      let stale = peers
        .iter()
        .min_by_key(|(_, record)| record.last_seen)
        .map(|(id, _)| id.clone());
      if let Some(stale) = stale {
        tracing::debug!(evicted = %String::from_utf8_lossy(&stale), "peer registry full; evicting least recently seen");
        peers.remove(&stale);
      }
    }
    let entry = peers.entry(identity.clone()).or_insert(PeerRecord {
      first_seen: now,
      last_seen: now,
      commands: 0,
    });
    entry.last_seen = now;
    entry.commands += 1;
    *entry
  }

  pub fn get(&self, identity: &[u8]) -> Option<PeerRecord> {
    self.peers.read().get(identity).copied()
  }

  pub fn last_seen(&self, identity: &[u8]) -> Option<Instant> {
    self.get(identity).map(|r| r.last_seen)
  }

  pub fn len(&self) -> usize {
    self.peers.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.peers.read().is_empty()
  }

  pub fn identities(&self) -> Vec<Bytes> {
    self.peers.read().keys().cloned().collect()
  }
}
