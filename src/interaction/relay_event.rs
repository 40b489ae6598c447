use tracing::{Instrument, error, info, instrument};

use crate::{
    base::types::{AlertContext, InboundMessage, RelevanceContext, Void},
    interaction::state::{RelayState, message_identity},
    service::{chat::ChatClient, llm::LlmClient},
};

/// Minimum relevance score that triggers an operator notification.
pub const NOTIFY_THRESHOLD: i64 = 60;

/// Hand a qualifying message to a detached background task.
///
/// The dispatcher never awaits this work; the webhook caller has already
/// been acknowledged by the time it runs.
#[instrument(skip_all)]
pub fn handle_message_event(message: InboundMessage, chat: ChatClient, llm: LlmClient, state: RelayState) {
    tokio::spawn(async move {
        // Process the event.
        let result = handle_message_event_internal(message, &chat, &llm, &state).in_current_span().await;

        // Log any errors.
        if let Err(err) = &result {
            error!("Error while handling: {}", err);
        }
    });
}

#[instrument(skip_all)]
async fn handle_message_event_internal(message: InboundMessage, chat: &ChatClient, llm: &LlmClient, state: &RelayState) -> Void {
    // Resolve display names for the prompt and the alert.

    let channel_name = chat.channel_name(&message.channel_id).await;
    let user_name = chat.user_display_name(&message.user_id).await;

    // Score the message against the fixed profile.

    let context = RelevanceContext {
        message_text: message.text.clone(),
        channel_name: channel_name.clone(),
        user_name: user_name.clone(),
    };

    let verdict = llm.analyze_relevance(&context).await;

    if verdict.score < NOTIFY_THRESHOLD {
        info!("Score {} below threshold; no notification for #{channel_name}.", verdict.score);
        return Ok(());
    }

    // Notify the operator, then record the identity so replays stay quiet.

    let identity = message_identity(&message.channel_id, &message.ts);

    let alert = AlertContext {
        channel_id: message.channel_id,
        channel_name,
        user_name,
        message_text: message.text,
        message_ts: message.ts,
        verdict,
    };

    if let Err(err) = chat.send_opportunity_alert(&alert).await {
        error!("Failed to send notification DM: {err}");
    }

    state.record_notified(&identity);

    Ok(())
}
