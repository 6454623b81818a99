// src/state.rs

use parking_lot::Mutex;
use std::fmt;

/// Language variant of the broadcast greeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
  English,
  Japanese,
}

impl Language {
  /// The canonical payload for this variant.
  pub fn greeting(self) -> &'static str {
    match self {
      Language::English => "Hello World",
      Language::Japanese => "Hello Sekai",
    }
  }

  pub fn flipped(self) -> Self {
    match self {
      Language::English => Language::Japanese,
      Language::Japanese => Language::English,
    }
  }
}

impl fmt::Display for Language {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Language::English => f.write_str("eng"),
      Language::Japanese => f.write_str("jap"),
    }
  }
}

/// A consistent view of [`MessageState`] taken under its lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
  pub language: Language,
  pub payload: String,
  /// Number of toggles applied before this snapshot was taken.
  pub toggles: u64,
}

#[derive(Debug)]
struct Inner {
  language: Language,
  payload: String,
  toggles: u64,
}

/// The shared broadcast greeting, flipped by the router and read by the publisher.
///
/// Variant and payload only change together under one lock, so no reader can
/// observe a payload that disagrees with its language.
#[derive(Debug)]
pub struct MessageState {
  inner: Mutex<Inner>,
}

impl MessageState {
  pub fn new() -> Self {
    Self::with_language(Language::English)
  }

  pub fn with_language(language: Language) -> Self {
    Self {
      inner: Mutex::new(Inner {
        language,
        payload: language.greeting().to_string(),
        toggles: 0,
      }),
    }
  }

  pub fn snapshot(&self) -> Snapshot {
    let inner = self.inner.lock();
    Snapshot {
      language: inner.language,
      payload: inner.payload.clone(),
      toggles: inner.toggles,
    }
  }

  /// Flips the language and recomputes the payload. Returns the new state.
  pub fn toggle(&self) -> Snapshot {
    let mut inner = self.inner.lock();
    inner.language = inner.language.flipped();
    inner.payload = inner.language.greeting().to_string();
    inner.toggles += 1;
    Snapshot {
      language: inner.language,
      payload: inner.payload.clone(),
      toggles: inner.toggles,
    }
  }
}

impl Default for MessageState {
  fn default() -> Self {
    Self::new()
  }
}
