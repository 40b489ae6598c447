//! Common types, result aliases, and payload structs used across scout-bot.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Boxed, type-erased error type used throughout the crate.
pub type Err = anyhow::Error;
/// Convenience result alias over [`Err`].
pub type Res<T> = Result<T, Err>;
/// Result alias for fallible operations that return no value.
pub type Void = Res<()>;

/// Top-level Slack Events API payload.
///
/// Deserialized leniently: every field is optional so that an unexpected
/// payload shape degrades to "no matching case" rather than an error.
#[derive(Debug, Default, Deserialize)]
pub struct EventEnvelope {
    /// The payload type (e.g. `url_verification` or `event_callback`).
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Challenge value echoed back during URL verification.
    pub challenge: Option<String>,
    /// The nested event object for `event_callback` payloads.
    pub event: Option<Value>,
}

/// The nested event object of an `event_callback` payload.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MessageEvent {
    /// The event type (e.g. `message`).
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Optional message subtype (e.g. `bot_message`, `message_changed`).
    pub subtype: Option<String>,
    /// ID of the channel the message was posted in.
    pub channel: Option<String>,
    /// ID of the user who posted the message.
    pub user: Option<String>,
    /// The message text.
    pub text: Option<String>,
    /// The message timestamp.
    pub ts: Option<String>,
    /// Bot ID, present when the message was sent by a bot.
    pub bot_id: Option<String>,
}

/// A message event that has passed every dispatcher gate.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// ID of the channel the message was posted in.
    pub channel_id: String,
    /// ID of the user who posted the message.
    pub user_id: String,
    /// The message text.
    pub text: String,
    /// The message timestamp.
    pub ts: String,
}

/// The analyzer's verdict on a single message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelevanceVerdict {
    /// Relevance score; zero means "not relevant".
    pub score: i64,
    /// Human-readable explanation for the score.
    pub reason: String,
    /// Suggested reply the operator could send.
    pub suggested_reply: String,
}

impl RelevanceVerdict {
    /// Safe default used whenever analysis fails for any reason.
    /// Callers treat a zero score as "not relevant".
    pub fn analysis_failed() -> Self {
        Self {
            score: 0,
            reason: "Analysis failed".to_string(),
            suggested_reply: String::new(),
        }
    }
}

/// Input to the relevance analyzer.
#[derive(Debug, Clone)]
pub struct RelevanceContext {
    /// The text of the message being analyzed.
    pub message_text: String,
    /// Display name of the channel the message was posted in.
    pub channel_name: String,
    /// Display name of the user who posted the message.
    pub user_name: String,
}

/// Everything the notification formatter needs to build and send a DM alert.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertContext {
    /// ID of the channel the message was posted in.
    pub channel_id: String,
    /// Display name of the channel the message was posted in.
    pub channel_name: String,
    /// Display name of the user who posted the message.
    pub user_name: String,
    /// The text of the message that triggered the alert.
    pub message_text: String,
    /// Timestamp of the message that triggered the alert.
    pub message_ts: String,
    /// The analyzer's verdict for the message.
    pub verdict: RelevanceVerdict,
}
