// src/message.rs

//! Two-frame application messages and the helpers that move them over an
//! `rzmq::Socket`.
//!
//! PUB/SUB traffic is `[topic, payload]`; ROUTER receives `[identity, payload]`
//! with the identity frame injected by the transport. Anything else is a
//! decode error.

use crate::error::{Error, Result};
use bytes::Bytes;
use rzmq::{Msg, MsgFlags, Socket};

/// A published `{topic, payload}` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicMessage {
  pub topic: Bytes,
  pub payload: Bytes,
}

impl TopicMessage {
  pub fn new(topic: impl Into<Bytes>, payload: impl Into<Bytes>) -> Self {
    Self {
      topic: topic.into(),
      payload: payload.into(),
    }
  }

  pub fn into_frames(self) -> Vec<Msg> {
    frames_from_parts([self.topic, self.payload])
  }

  pub fn from_frames(frames: Vec<Msg>) -> Result<Self> {
    let [topic, payload] = two_frames(frames, "topic")?;
    Ok(Self { topic, payload })
  }

  /// The payload as UTF-8 text.
  pub fn payload_str(&self) -> Result<&str> {
    std::str::from_utf8(&self.payload).map_err(|e| Error::Decode(format!("payload is not UTF-8: {}", e)))
  }
}

/// A command as seen by the ROUTER: the sending peer's identity and its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedCommand {
  pub identity: Bytes,
  pub payload: Bytes,
}

impl RoutedCommand {
  pub fn from_frames(frames: Vec<Msg>) -> Result<Self> {
    let [identity, payload] = two_frames(frames, "identity")?;
    Ok(Self { identity, payload })
  }
}

fn two_frames(frames: Vec<Msg>, first: &str) -> Result<[Bytes; 2]> {
  if frames.len() != 2 {
    return Err(Error::Decode(format!(
      "expected 2 frames [{}, payload], got {}",
      first,
      frames.len()
    )));
  }
  let mut parts = frames
    .iter()
    .map(|f| Bytes::copy_from_slice(f.data().unwrap_or_default()));
  match (parts.next(), parts.next()) {
    (Some(a), Some(b)) => Ok([a, b]),
    _ => Err(Error::Decode("frame list shrank while decoding".into())),
  }
}

/// Builds a multipart frame list, flagging every frame but the last with MORE.
pub fn frames_from_parts<I>(parts: I) -> Vec<Msg>
where
  I: IntoIterator<Item = Bytes>,
{
  let mut frames: Vec<Msg> = parts.into_iter().map(Msg::from_bytes).collect();
  let last = frames.len().saturating_sub(1);
  for frame in frames.iter_mut().take(last) {
    frame.set_flags(MsgFlags::MORE);
  }
  frames
}

/// Sends pre-flagged frames one by one. The transport treats the run as one
/// logical message because every frame but the last carries MORE.
pub async fn send_frames(socket: &Socket, frames: Vec<Msg>) -> Result<()> {
  for frame in frames {
    socket.send(frame).await.map_err(|e| Error::transport("send", e))?;
  }
  Ok(())
}

/// Receives frames until one arrives without the MORE flag.
pub async fn recv_frames(socket: &Socket) -> Result<Vec<Msg>> {
  let mut frames = Vec::with_capacity(2);
  loop {
    let frame = socket.recv().await.map_err(|e| Error::transport("recv", e))?;
    let more = frame.is_more();
    frames.push(frame);
    if !more {
      return Ok(frames);
    }
  }
}

/// Lossy UTF-8 rendering for log fields.
pub(crate) fn lossy(bytes: &[u8]) -> std::borrow::Cow<'_, str> {
  String::from_utf8_lossy(bytes)
}
