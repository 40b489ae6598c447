pub mod openai;

use crate::base::types::{RelevanceContext, RelevanceVerdict, Res};
use async_trait::async_trait;
use std::sync::Arc;
use std::ops::Deref;
use tracing::warn;

// Traits.

/// Generic LLM client trait that clients must implement.
///
/// This trait defines the core functionality for interacting with large language models.
/// Implementing this trait allows different LLM providers to be used with the scout-bot.
#[async_trait]
pub trait GenericLlmClient: Send + Sync + 'static {
    /// Score a message's relevance to the fixed professional profile.
    ///
    /// Sends a single request (no retry, no streaming) and parses the model's
    /// strict-JSON verdict. Errors here are recovered by the `LlmClient`
    /// wrapper, which substitutes the safe default verdict.
    async fn score_message_relevance(&self, context: &RelevanceContext) -> Res<RelevanceVerdict>;
}

// Structs.

/// LLM client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct LlmClient {
    inner: Arc<dyn GenericLlmClient>,
}

impl Deref for LlmClient {
    type Target = dyn GenericLlmClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl LlmClient {
    pub fn new(inner: Arc<dyn GenericLlmClient>) -> Self {
        Self { inner }
    }

    /// Analyze a message, shielding callers from every failure mode.
    ///
    /// Network errors, refusals, and malformed model output all map to the
    /// safe default verdict; callers treat its zero score as "not relevant".
    pub async fn analyze_relevance(&self, context: &RelevanceContext) -> RelevanceVerdict {
        match self.inner.score_message_relevance(context).await {
            Ok(verdict) => verdict,
            Err(err) => {
                warn!("Relevance analysis failed: {err}");
                RelevanceVerdict::analysis_failed()
            }
        }
    }
}

// Tests.
