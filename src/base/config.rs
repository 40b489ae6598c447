//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use serde::Deserialize;

use super::types::{Res, Void};

/// Default OpenAI relevance agent model to use
fn default_openai_relevance_model() -> String {
    "gpt-4.1".to_string()
}

/// Default sampling temperature for the relevance agent
fn default_openai_relevance_temperature() -> f32 {
    0.2
}

/// Default max output tokens for the relevance agent
fn default_openai_max_tokens() -> u32 {
    500
}

/// Default operator user to notify when no override is configured
fn default_operator_user_id() -> String {
    "U02NX6HD7AS".to_string()
}

/// Default port for the webhook listener
fn default_port() -> u16 {
    10000
}

/// Default workspace hostname used to build thread permalinks
fn default_workspace_host() -> String {
    "stagedotin.slack.com".to_string()
}

/// Configuration for the scout-bot application.
#[derive(Debug, Clone)]
pub struct Config {
    /// Shared, reference-counted configuration data.
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Deserialized configuration values backing a [`Config`].
#[derive(Debug, Deserialize, Clone)]
pub struct ConfigInner {
    /// Slack bot token (`SLACK_BOT_TOKEN`).
    pub slack_bot_token: String,
    /// OpenAI API key (`OPENAI_API_KEY`).
    pub openai_api_key: String,
    /// OpenAI relevance agent model to use (`OPENAI_RELEVANCE_MODEL`).
    #[serde(default = "default_openai_relevance_model")]
    pub openai_relevance_model: String,
    /// Sampling temperature for the relevance agent model (`OPENAI_RELEVANCE_TEMPERATURE`).
    /// Value between 0 and 2. Higher values like 0.8 make output more random,
    /// while lower values like 0.2 make it more focused and deterministic.
    #[serde(default = "default_openai_relevance_temperature")]
    pub openai_relevance_temperature: f32,
    /// Max output tokens for the relevance agent model (`OPENAI_MAX_TOKENS`).
    #[serde(default = "default_openai_max_tokens")]
    pub openai_max_tokens: u32,
    /// User ID of the operator who receives opportunity DMs (`OPERATOR_USER_ID`).
    #[serde(default = "default_operator_user_id")]
    pub operator_user_id: String,
    /// Port the webhook listener binds to (`PORT`).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Workspace hostname used to build "View Thread" permalinks (`WORKSPACE_HOST`).
    #[serde(default = "default_workspace_host")]
    pub workspace_host: String,
}

impl Default for ConfigInner {
    fn default() -> Self {
        Self {
            slack_bot_token: String::new(),
            openai_api_key: String::new(),
            openai_relevance_model: default_openai_relevance_model(),
            openai_relevance_temperature: default_openai_relevance_temperature(),
            openai_max_tokens: default_openai_max_tokens(),
            operator_user_id: default_operator_user_id(),
            port: default_port(),
            workspace_host: default_workspace_host(),
        }
    }
}

impl Config {
    /// Load configuration from the environment and an optional config file, then validate it.
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("SCOUT_BOT"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        result.validate()?;

        Ok(result)
    }

    /// Validate configuration invariants, returning an error if any are violated.
    pub fn validate(&self) -> Void {
        if self.openai_relevance_temperature < 0.0 || self.openai_relevance_temperature > 2.0 {
            return Err(anyhow::anyhow!("OpenAI relevance agent temperature must be between 0 and 2."));
        }

        if self.openai_max_tokens < 1 || self.openai_max_tokens > 128000 {
            return Err(anyhow::anyhow!("OpenAI max tokens must be between 1 and 128000."));
        }

        if self.operator_user_id.is_empty() {
            return Err(anyhow::anyhow!("Operator user ID must not be empty."));
        }

        Ok(())
    }
}

// Tests.
