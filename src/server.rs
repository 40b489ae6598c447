//! HTTP surface for the scout-bot.
//!
//! Three routes: the Slack Events API webhook, a health check, and a static
//! landing page. The webhook path always answers 200 with a trivial body;
//! everything downstream of the gates runs in a background task the caller
//! never observes.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    response::Html,
    routing::{get, post},
};
use serde_json::{Value, json};
use tracing::{info, instrument, warn};

use crate::{
    base::types::{EventEnvelope, InboundMessage, MessageEvent, Void},
    interaction::{relay_event, state::message_identity},
    runtime::Runtime,
};

const LANDING_PAGE_HTML: &str = r#"
<h1>🤖 Scout-bot is running!</h1>
<p>Slack bot is active and monitoring channels.</p>
<p><a href="/health">Check Health Status</a></p>
"#;

/// Build the webhook router.
pub fn router(runtime: Runtime) -> Router {
    Router::new()
        .route("/slack/events", post(slack_events))
        .route("/health", get(health))
        .route("/", get(home))
        .with_state(runtime)
}

/// Bind the listener and serve until the process exits.
pub async fn serve(runtime: Runtime) -> Void {
    let addr = format!("0.0.0.0:{}", runtime.config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Listening on {addr}");
    info!("Monitoring for operator: {}", runtime.config.operator_user_id);

    axum::serve(listener, router(runtime)).await?;

    Ok(())
}

/// Slack Events API entry point.
///
/// The body is parsed leniently: any shape that doesn't match a known case
/// is acknowledged without action. Downstream errors never reach the caller.
#[instrument(skip_all)]
async fn slack_events(State(runtime): State<Runtime>, body: Bytes) -> Json<Value> {
    let envelope = serde_json::from_slice::<EventEnvelope>(&body).unwrap_or_default();

    match envelope.kind.as_deref() {
        // Handshake: echo the challenge back verbatim.
        Some("url_verification") => Json(json!({ "challenge": envelope.challenge })),
        Some("event_callback") => {
            dispatch_event(&runtime, envelope.event);
            Json(json!({ "status": "ok" }))
        }
        _ => Json(json!({ "status": "ok" })),
    }
}

/// Apply the dispatch gates, handing qualifying events to background processing.
fn dispatch_event(runtime: &Runtime, event: Option<Value>) {
    let Some(event) = event.and_then(|value| serde_json::from_value::<MessageEvent>(value).ok()) else {
        return;
    };

    // Only plain messages; edits, joins, and the like carry a subtype.
    if event.kind.as_deref() != Some("message") || event.subtype.is_some() {
        return;
    }

    // Never react to other bots.
    if event.bot_id.is_some() {
        return;
    }

    let (Some(channel_id), Some(user_id), Some(ts)) = (event.channel, event.user, event.ts) else {
        return;
    };

    // Never react to the operator's own messages.
    if user_id == runtime.config.operator_user_id {
        return;
    }

    // Dedup: one notification per message identity.
    if runtime.state.is_notified(&message_identity(&channel_id, &ts)) {
        return;
    }

    // Rate limit: at most one processed event per channel per cooldown window.
    if !runtime.state.try_acquire_channel(&channel_id) {
        warn!("Channel {channel_id} is on cooldown; skipping event.");
        return;
    }

    let message = InboundMessage {
        channel_id,
        user_id,
        text: event.text.unwrap_or_default(),
        ts,
    };

    relay_event::handle_message_event(message, runtime.chat.clone(), runtime.llm.clone(), runtime.state.clone());
}

/// Health check endpoint.
async fn health(State(runtime): State<Runtime>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "bot_user_id": runtime.config.operator_user_id,
    }))
}

/// Home endpoint.
async fn home() -> Html<&'static str> {
    Html(LANDING_PAGE_HTML)
}

// Tests.
