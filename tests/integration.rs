#![cfg(test)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use mockall::mock;
use scout_bot::{
    base::{
        config::{Config, ConfigInner},
        types::{AlertContext, RelevanceContext, RelevanceVerdict, Res, Void},
    },
    interaction::state::{RelayState, message_identity},
    runtime::Runtime,
    server,
    service::{
        chat::{ChatClient, GenericChatClient},
        llm::{GenericLlmClient, LlmClient},
    },
};
use serde_json::{Value, json};
use tower::ServiceExt;

// Mocks.

// Mock chat client for testing.

mock! {
    pub Chat {}

    #[async_trait]
    impl GenericChatClient for Chat {
        async fn user_display_name(&self, user_id: &str) -> String;
        async fn channel_name(&self, channel_id: &str) -> String;
        async fn send_opportunity_alert(&self, alert: &AlertContext) -> Void;
    }
}

// Mock LLM client for testing.

mock! {
    pub Llm {}

    #[async_trait]
    impl GenericLlmClient for Llm {
        async fn score_message_relevance(&self, context: &RelevanceContext) -> Res<RelevanceVerdict>;
    }
}

/// Chat mock that resolves fixed names and records every alert it is asked to send.
fn get_recording_chat(alerts: Arc<Mutex<Vec<AlertContext>>>) -> MockChat {
    let mut mock = MockChat::new();

    mock.expect_user_display_name().returning(|_| "Jane Doe".to_string());
    mock.expect_channel_name().returning(|_| "marketing".to_string());
    mock.expect_send_opportunity_alert().returning(move |alert| {
        alerts.lock().unwrap().push(alert.clone());
        Ok(())
    });

    mock
}

/// LLM mock that returns a fixed score and counts how many analyses ran.
fn get_scoring_llm(score: i64, analyzed: Arc<AtomicUsize>) -> MockLlm {
    let mut mock = MockLlm::new();

    mock.expect_score_message_relevance().returning(move |_| {
        analyzed.fetch_add(1, Ordering::SeqCst);
        Ok(RelevanceVerdict {
            score,
            reason: "Campaign talk".to_string(),
            suggested_reply: "Happy to take a look at the numbers.".to_string(),
        })
    });

    mock
}

/// LLM mock whose every call fails, as if the model API were down.
fn get_failing_llm(analyzed: Arc<AtomicUsize>) -> MockLlm {
    let mut mock = MockLlm::new();

    mock.expect_score_message_relevance().returning(move |_| {
        analyzed.fetch_add(1, Ordering::SeqCst);
        Err(anyhow::anyhow!("model unavailable"))
    });

    mock
}

/// Helper function to setup the test environment.
fn setup_test_environment(chat: MockChat, llm: MockLlm) -> Runtime {
    let config = Config {
        inner: Arc::new(ConfigInner {
            operator_user_id: "U123".to_string(),
            ..Default::default()
        }),
    };

    Runtime {
        config,
        chat: ChatClient::new(Arc::new(chat)),
        llm: LlmClient::new(Arc::new(llm)),
        state: RelayState::new(),
    }
}

fn message_event_body(channel: &str, user: &str, text: &str, ts: &str) -> String {
    json!({
        "type": "event_callback",
        "event": { "type": "message", "channel": channel, "user": user, "text": text, "ts": ts }
    })
    .to_string()
}

async fn post_events(app: &Router, body: String) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/slack/events")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap();

    (status, value)
}

/// Poll a counter until it reaches the expected value or attempts run out.
async fn wait_for_count(counter: &AtomicUsize, expected: usize, max_attempts: u32, delay_ms: u64) -> bool {
    for _ in 0..max_attempts {
        if counter.load(Ordering::SeqCst) >= expected {
            return true;
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    counter.load(Ordering::SeqCst) >= expected
}

/// Poll the alert log until it holds the expected number of entries.
async fn wait_for_alerts(alerts: &Mutex<Vec<AlertContext>>, expected: usize, max_attempts: u32, delay_ms: u64) -> bool {
    for _ in 0..max_attempts {
        if alerts.lock().unwrap().len() >= expected {
            return true;
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    alerts.lock().unwrap().len() >= expected
}

#[tokio::test]
async fn test_high_score_message_notifies_operator() {
    let alerts = Arc::new(Mutex::new(Vec::new()));
    let analyzed = Arc::new(AtomicUsize::new(0));
    let runtime = setup_test_environment(get_recording_chat(alerts.clone()), get_scoring_llm(85, analyzed.clone()));
    let app = server::router(runtime);

    let (status, response) = post_events(&app, message_event_body("C1", "U9", "Need help with our ad campaign ROI", "1700000000.000100")).await;

    // The webhook is acknowledged before the background task finishes.
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["status"], "ok");

    assert!(wait_for_alerts(&alerts, 1, 50, 20).await, "Timed out waiting for the alert DM");

    let sent = alerts.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].channel_id, "C1");
    assert_eq!(sent[0].channel_name, "marketing");
    assert_eq!(sent[0].user_name, "Jane Doe");
    assert_eq!(sent[0].message_ts, "1700000000.000100");
    assert_eq!(sent[0].verdict.score, 85);
}

#[tokio::test]
async fn test_low_score_message_stays_silent() {
    let alerts = Arc::new(Mutex::new(Vec::new()));
    let analyzed = Arc::new(AtomicUsize::new(0));
    let runtime = setup_test_environment(get_recording_chat(alerts.clone()), get_scoring_llm(40, analyzed.clone()));
    let app = server::router(runtime);

    let (status, _) = post_events(&app, message_event_body("C1", "U9", "lunch anyone?", "1700000000.000200")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(wait_for_count(&analyzed, 1, 50, 20).await, "Timed out waiting for analysis");

    // Analysis completed, but the score stayed under the threshold.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(alerts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_analysis_failure_stays_silent() {
    let alerts = Arc::new(Mutex::new(Vec::new()));
    let analyzed = Arc::new(AtomicUsize::new(0));
    let runtime = setup_test_environment(get_recording_chat(alerts.clone()), get_failing_llm(analyzed.clone()));
    let app = server::router(runtime);

    let (status, _) = post_events(&app, message_event_body("C1", "U9", "Need help with our ad campaign ROI", "1700000000.000300")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(wait_for_count(&analyzed, 1, 50, 20).await, "Timed out waiting for analysis");

    // The failed analysis maps to the zero-score default, so no DM goes out.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(alerts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_already_notified_message_is_not_reanalyzed() {
    let alerts = Arc::new(Mutex::new(Vec::new()));
    let analyzed = Arc::new(AtomicUsize::new(0));
    let runtime = setup_test_environment(get_recording_chat(alerts.clone()), get_scoring_llm(85, analyzed.clone()));

    // Seed the notified-set as if this message had already produced a DM.
    runtime.state.record_notified(&message_identity("C1", "1700000000.000400"));

    let app = server::router(runtime);

    let (status, _) = post_events(&app, message_event_body("C1", "U9", "Need help with our ad campaign ROI", "1700000000.000400")).await;

    assert_eq!(status, StatusCode::OK);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(analyzed.load(Ordering::SeqCst), 0);
    assert!(alerts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_replayed_event_produces_one_notification() {
    let alerts = Arc::new(Mutex::new(Vec::new()));
    let analyzed = Arc::new(AtomicUsize::new(0));
    let runtime = setup_test_environment(get_recording_chat(alerts.clone()), get_scoring_llm(85, analyzed.clone()));
    let app = server::router(runtime);

    let body = message_event_body("C1", "U9", "Need help with our ad campaign ROI", "1700000000.000500");

    let (status, _) = post_events(&app, body.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(wait_for_alerts(&alerts, 1, 50, 20).await, "Timed out waiting for the alert DM");

    // Replay the exact same event.
    let (status, _) = post_events(&app, body).await;
    assert_eq!(status, StatusCode::OK);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(alerts.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_same_channel_is_rate_limited() {
    let alerts = Arc::new(Mutex::new(Vec::new()));
    let analyzed = Arc::new(AtomicUsize::new(0));
    let runtime = setup_test_environment(get_recording_chat(alerts.clone()), get_scoring_llm(85, analyzed.clone()));
    let app = server::router(runtime);

    let (status, _) = post_events(&app, message_event_body("C1", "U9", "first message", "1700000000.000600")).await;
    assert_eq!(status, StatusCode::OK);

    // A different message from the same channel, well inside the cooldown window.
    let (status, _) = post_events(&app, message_event_body("C1", "U10", "second message", "1700000000.000700")).await;
    assert_eq!(status, StatusCode::OK);

    assert!(wait_for_alerts(&alerts, 1, 50, 20).await, "Timed out waiting for the alert DM");

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(analyzed.load(Ordering::SeqCst), 1);
    assert_eq!(alerts.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_distinct_channels_process_independently() {
    let alerts = Arc::new(Mutex::new(Vec::new()));
    let analyzed = Arc::new(AtomicUsize::new(0));
    let runtime = setup_test_environment(get_recording_chat(alerts.clone()), get_scoring_llm(85, analyzed.clone()));
    let app = server::router(runtime);

    let (status, _) = post_events(&app, message_event_body("C1", "U9", "campaign question", "1700000000.000800")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post_events(&app, message_event_body("C2", "U9", "another campaign question", "1700000000.000900")).await;
    assert_eq!(status, StatusCode::OK);

    assert!(wait_for_alerts(&alerts, 2, 50, 20).await, "Timed out waiting for both alert DMs");

    let sent = alerts.lock().unwrap();
    let mut channels: Vec<&str> = sent.iter().map(|alert| alert.channel_id.as_str()).collect();
    channels.sort();
    assert_eq!(channels, vec!["C1", "C2"]);
}

#[tokio::test]
async fn test_url_verification_round_trip() {
    let alerts = Arc::new(Mutex::new(Vec::new()));
    let analyzed = Arc::new(AtomicUsize::new(0));
    let runtime = setup_test_environment(get_recording_chat(alerts.clone()), get_scoring_llm(85, analyzed.clone()));
    let app = server::router(runtime);

    let body = json!({ "type": "url_verification", "challenge": "abc123" }).to_string();
    let (status, response) = post_events(&app, body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["challenge"], "abc123");

    // A handshake never starts background work.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(analyzed.load(Ordering::SeqCst), 0);
}
