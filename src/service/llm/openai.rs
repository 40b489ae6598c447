//! Integration with Large Language Model services.
//!
//! This module provides a thin wrapper around LLM clients (e.g., OpenAI)
//! for scoring message relevance against the fixed professional profile.
//!
//! The relevance call is deliberately a single request: no retry, no
//! streaming, no timeout beyond the underlying HTTP client's defaults.
//! Any failure is recovered upstream with the safe default verdict.

use std::sync::Arc;

use crate::base::{
    config::Config,
    prompts,
    types::{RelevanceContext, RelevanceVerdict, Res},
};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::responses::{Content, CreateResponseArgs, Input, InputItem, InputMessageArgs, OutputContent, Response, Role, TextConfig, TextResponseFormat},
};
use async_trait::async_trait;
use tracing::{info, instrument, warn};

use super::{GenericLlmClient, LlmClient};

// Extra methods on `LlmClient` applied by the openai implementation.

impl LlmClient {
    pub fn openai(config: &Config) -> Self {
        let client = OpenAiLlmClient::new(config);
        Self::new(Arc::new(client))
    }
}

// Specific implementations.

/// OpenAI LLM client implementation.
#[derive(Clone)]
pub struct OpenAiLlmClient {
    client: Client<OpenAIConfig>,
    config: Config,
}

impl OpenAiLlmClient {
    /// Create a new OpenAI LLM client.
    #[instrument(name = "OpenAiLlmClient::new", skip_all)]
    pub fn new(config: &Config) -> Self {
        let cfg = OpenAIConfig::new().with_api_key(config.openai_api_key.clone());

        Self {
            client: Client::with_config(cfg),
            config: config.clone(),
        }
    }

    /// Build the relevance agent input.
    #[instrument(name = "OpenAiLlmClient::build_relevance_input", skip_all)]
    fn build_relevance_input(&self, context: &RelevanceContext) -> Res<Input> {
        Ok(Input::Items(vec![InputItem::Message(
            InputMessageArgs::default()
                .role(Role::User)
                .content(format!(
                    "Channel: #{}\nFrom: {}\nMessage: \"{}\"\n",
                    context.channel_name, context.user_name, context.message_text
                ))
                .build()?,
        )]))
    }
}

#[async_trait]
impl GenericLlmClient for OpenAiLlmClient {
    #[instrument(name = "OpenAiLlmClient::score_message_relevance", skip_all)]
    async fn score_message_relevance(&self, context: &RelevanceContext) -> Res<RelevanceVerdict> {
        let input = self.build_relevance_input(context)?;

        // Text config for the relevance response.
        let text_config = TextConfig { format: TextResponseFormat::Text };

        // Create the request.
        let mut request = CreateResponseArgs::default();
        request
            .instructions(prompts::RELEVANCE_AGENT_SYSTEM_DIRECTIVE.to_string())
            .max_output_tokens(self.config.openai_max_tokens)
            .model(&self.config.openai_relevance_model)
            .text(text_config)
            .input(input);

        // Add the temperature for the non-reasoning models.
        if self.config.openai_relevance_model.starts_with("gpt") {
            request.temperature(self.config.openai_relevance_temperature);
        }

        let request = request.build()?;

        // One request; failures bubble up and become the safe default verdict.
        let response = self.client.responses().create(request).await?;

        let raw = collect_output_text(&response)?.join("\n");

        info!("Relevance agent returned {} characters", raw.len());

        parse_verdict(&raw)
    }
}

/// Collect the plain text outputs of an OpenAI response.
#[instrument(skip_all)]
fn collect_output_text(response: &Response) -> Res<Vec<String>> {
    let mut result = Vec::new();

    for output in &response.output {
        match output {
            OutputContent::Message(message) => {
                for message_content in &message.content {
                    match message_content {
                        Content::OutputText(text) => {
                            result.push(text.text.clone());
                        }
                        Content::Refusal(reason) => {
                            return Err(anyhow::anyhow!("Request refused: {reason:#?}"));
                        }
                    }
                }
            }
            _ => {
                warn!("Unknown output: {output:#?}");
            }
        }
    }

    Ok(result)
}

/// Strip an optional Markdown code fence from the model's raw text.
fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }

    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }

    text.trim()
}

/// Parse the model's strict-JSON verdict.
fn parse_verdict(raw: &str) -> Res<RelevanceVerdict> {
    let verdict = serde_json::from_str::<RelevanceVerdict>(strip_code_fences(raw))?;

    Ok(verdict)
}

// Tests.
