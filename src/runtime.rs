//! Runtime services and shared state for the scout-bot.

use tracing::instrument;

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    interaction::state::RelayState,
    service::{chat::ChatClient, llm::LlmClient},
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the configuration, the chat and LLM clients, and the
/// relay's gate state. It is designed to be trivially cloneable, allowing it
/// to be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The chat client instance.
    pub chat: ChatClient,
    /// The LLM client instance.
    pub llm: LlmClient,
    /// Cooldown and dedup bookkeeping shared by all handlers.
    pub state: RelayState,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        // Initialize the LLM client.
        let llm = LlmClient::openai(&config);

        // Initialize the slack client.
        let chat = ChatClient::slack(&config).await?;

        // Initialize the gate state.
        let state = RelayState::new();

        Ok(Self { config, chat, llm, state })
    }

    pub async fn start(&self) -> Void {
        crate::server::serve(self.clone()).await
    }
}
