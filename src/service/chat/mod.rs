pub mod slack;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{AlertContext, Void};

// Traits.

/// Generic "chat" trait that clients must implement.
///
/// This trait defines the core functionality for interacting with chat platforms
/// like Slack. Implementing this trait allows different chat services to be used
/// with the scout-bot.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Resolve a user ID to a display name.
    ///
    /// Prefers the profile display name, falling back to the real name.
    /// Never fails: any lookup error resolves to a fixed placeholder.
    async fn user_display_name(&self, user_id: &str) -> String;

    /// Resolve a channel ID to its name.
    ///
    /// Never fails: any lookup error resolves to a fixed placeholder.
    async fn channel_name(&self, channel_id: &str) -> String;

    /// Send an opportunity alert as a direct message to the operator.
    ///
    /// Builds the rich Block Kit layout (priority header, message excerpt,
    /// reason, suggested reply, thread link) and posts it to the operator's
    /// DM channel.
    async fn send_opportunity_alert(&self, alert: &AlertContext) -> Void;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}
