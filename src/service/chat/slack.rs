//! Chat service integration for scout-bot.
//!
//! This module provides functionality for interacting with chat platforms like Slack:
//! - Resolving user and channel identifiers to display names
//! - Building and sending opportunity alert DMs
//!
//! It implements the `GenericChatClient` trait defined in the parent module,
//! with a default implementation for Slack.

use crate::base::{
    config::Config,
    types::{AlertContext, Res, Void},
};
use async_trait::async_trait;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use slack_morphism::prelude::*;
use tracing::{info, instrument, warn};
use url::Url;

use std::{ops::Deref, sync::Arc};

use super::{ChatClient, GenericChatClient};

// Type aliases.

type FullClient = slack_morphism::SlackClient<SlackClientHyperConnector<HttpsConnector<HttpConnector>>>;

// Constants.

/// Placeholder returned when a user lookup fails.
const UNKNOWN_USER: &str = "Unknown User";

/// Placeholder returned when a channel lookup fails.
const UNKNOWN_CHANNEL: &str = "unknown-channel";

/// Message text is truncated to this many characters before embedding.
const EXCERPT_MAX_CHARS: usize = 500;

// Extra methods on `ChatClient` applied by the slack implementation.

impl ChatClient {
    /// Creates a new Slack chat client.
    pub async fn slack(config: &Config) -> Res<Self> {
        let client = SlackChatClient::new(config).await?;
        Ok(Self::new(Arc::new(client)))
    }
}

// Structs.

/// Slack client implementation.
#[derive(Clone)]
struct SlackChatClient {
    pub bot_token: SlackApiToken,
    pub operator_user_id: String,
    pub workspace_host: String,
    pub client: Arc<FullClient>,
}

impl Deref for SlackChatClient {
    type Target = FullClient;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

impl SlackChatClient {
    /// Create a new Slack chat client.
    #[instrument(name = "SlackChatClient::new", skip_all)]
    pub async fn new(config: &Config) -> Res<Self> {
        // Initialize the token.

        let bot_token = SlackApiToken::new(SlackApiTokenValue(config.slack_bot_token.clone()));

        // Initialize the Slack client.

        let https_connector = HttpsConnector::<HttpConnector>::builder().with_native_roots()?.https_only().enable_all_versions().build();
        let connector = SlackClientHyperConnector::with_connector(https_connector);
        let client = Arc::new(slack_morphism::SlackClient::new(connector));

        // Validate the token and report who we are posting as.

        let session = client.open_session(&bot_token);
        let bot_user = session.auth_test().await?;

        info!("Slack bot user ID: {}", bot_user.user_id.0);

        Ok(Self {
            bot_token,
            operator_user_id: config.operator_user_id.clone(),
            workspace_host: config.workspace_host.clone(),
            client,
        })
    }
}

#[async_trait]
impl GenericChatClient for SlackChatClient {
    #[instrument(skip(self))]
    async fn user_display_name(&self, user_id: &str) -> String {
        let request = SlackApiUsersInfoRequest::new(SlackUserId(user_id.to_string()));
        let session = self.client.open_session(&self.bot_token);

        let user = match session.users_info(&request).await {
            Ok(response) => response.user,
            Err(err) => {
                warn!("Failed to look up user {user_id}: {err}");
                return UNKNOWN_USER.to_string();
            }
        };

        let profile = user.profile.as_ref();
        let display_name = profile.and_then(|p| p.display_name.clone()).filter(|name| !name.is_empty());
        let real_name = profile.and_then(|p| p.real_name.clone()).filter(|name| !name.is_empty());

        display_name.or(real_name).unwrap_or_else(|| UNKNOWN_USER.to_string())
    }

    #[instrument(skip(self))]
    async fn channel_name(&self, channel_id: &str) -> String {
        let request = SlackApiConversationsInfoRequest::new(SlackChannelId(channel_id.to_string()));
        let session = self.client.open_session(&self.bot_token);

        match session.conversations_info(&request).await {
            Ok(response) => response.channel.name.unwrap_or_else(|| UNKNOWN_CHANNEL.to_string()),
            Err(err) => {
                warn!("Failed to look up channel {channel_id}: {err}");
                UNKNOWN_CHANNEL.to_string()
            }
        }
    }

    #[instrument(skip_all)]
    async fn send_opportunity_alert(&self, alert: &AlertContext) -> Void {
        let blocks = build_alert_blocks(alert, &self.workspace_host)?;
        let content = SlackMessageContent::new().with_text(alert_fallback_text(alert)).with_blocks(blocks);

        let request = SlackApiChatPostMessageRequest::new(SlackChannelId(self.operator_user_id.clone()), content);

        let session = self.client.open_session(&self.bot_token);

        let _ = session.chat_post_message(&request).await.map_err(|e| anyhow::anyhow!("Failed to send notification DM: {}", e))?;

        info!("Notification sent for message in #{}", alert.channel_name);

        Ok(())
    }
}

// Alert formatting.

/// Priority indicator for a relevance score.
///
/// Only the two top tiers are reachable through the notification threshold,
/// but the full mapping is part of the formatter contract.
fn priority_indicator(score: i64) -> &'static str {
    if score >= 80 {
        "\u{1F525}" // 🔥
    } else if score >= 60 {
        "\u{26A1}" // ⚡
    } else {
        "\u{1F4CC}" // 📌
    }
}

/// Permalink to the original message: workspace host + channel + timestamp
/// with its decimal point removed.
fn thread_permalink(workspace_host: &str, channel_id: &str, message_ts: &str) -> String {
    format!("https://{workspace_host}/archives/{channel_id}/p{}", message_ts.replace('.', ""))
}

/// First 500 characters of the message text, unmodified otherwise.
fn message_excerpt(text: &str) -> String {
    text.chars().take(EXCERPT_MAX_CHARS).collect()
}

/// Plain-text fallback shown in notification previews.
fn alert_fallback_text(alert: &AlertContext) -> String {
    format!("New opportunity in #{}", alert.channel_name)
}

/// Build the Block Kit layout for an opportunity alert.
fn build_alert_blocks(alert: &AlertContext, workspace_host: &str) -> Res<Vec<SlackBlock>> {
    let indicator = priority_indicator(alert.verdict.score);
    let link = Url::parse(&thread_permalink(workspace_host, &alert.channel_id, &alert.message_ts))?;

    // Slack's date token wants whole unix seconds.
    let unix_seconds = alert.message_ts.parse::<f64>().unwrap_or_default() as i64;

    let blocks: Vec<SlackBlock> = slack_blocks![
        some_into(SlackHeaderBlock::new(pt!("{} New Opportunity Detected", indicator))),
        some_into(SlackSectionBlock::new().with_text(md!(
            "*Channel:* <#{}|{}>\n*From:* {}\n*Priority Score:* {}/100\n*Time:* <!date^{}^{{time}}|just now>",
            alert.channel_id,
            alert.channel_name,
            alert.user_name,
            alert.verdict.score,
            unix_seconds
        ))),
        some_into(SlackSectionBlock::new().with_text(md!("*\u{1F4DD} Message:*\n{}", message_excerpt(&alert.message_text)))),
        some_into(SlackSectionBlock::new().with_text(md!("*\u{1F4A1} Reason:*\n{}", alert.verdict.reason))),
        some_into(SlackDividerBlock::new()),
        some_into(SlackSectionBlock::new().with_text(md!("*\u{2728} Suggested Reply:*\n```{}```", alert.verdict.suggested_reply))),
        some_into(SlackActionsBlock::new(slack_blocks![some_into(
            SlackBlockButtonElement::new("view-thread".into(), pt!("\u{1F4CB} View Thread")).with_url(link)
        )])),
        some_into(SlackContextBlock::new(slack_blocks![some(md!(
            "Copy the suggested reply and paste it in the thread, or write your own response."
        ))]))
    ];

    Ok(blocks)
}

// Tests.
