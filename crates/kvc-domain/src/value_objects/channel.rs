//! Pub/sub message

use serde::{Deserialize, Serialize};

/// A message received on a subscribed channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMessage {
    /// Channel the message was published on
    pub channel: String,
    /// Message payload
    pub payload: String,
}

impl ChannelMessage {
    /// Create a new channel message
    pub fn new<C: Into<String>, P: Into<String>>(channel: C, payload: P) -> Self {
        Self {
            channel: channel.into(),
            payload: payload.into(),
        }
    }
}
