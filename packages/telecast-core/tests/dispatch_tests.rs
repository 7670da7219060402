//! Integration tests for the dispatch engine.
//!
//! All tests run against the in-memory session store and the scripted
//! platform connector; batches use a shortened inter-send delay so the
//! sequential loop runs without wall-clock stalls.

use std::sync::Arc;
use std::time::{Duration, Instant};

use telecast_core::domains::dispatch::{send_bulk, DispatchOutcome};
use telecast_core::kernel::test_dependencies::{MemorySessionStore, MockPlatform};
use telecast_core::kernel::{BaseSessionStore, CoreDeps};

const SESSION: &str = "session-1";

async fn setup(platform: &MockPlatform) -> CoreDeps {
    let store = Arc::new(MemorySessionStore::new());
    store.put(SESSION, "auth-blob", None).await.unwrap();
    let mut deps = CoreDeps::new(store, Arc::new(platform.connector()));
    deps.send_delay = Duration::ZERO;
    deps
}

fn recipients(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[tokio::test]
async fn send_with_blank_token_is_not_authenticated() {
    let platform = MockPlatform::new();
    let deps = setup(&platform).await;

    let response = send_bulk(&deps, "  ", "hello", &recipients(&["alice"])).await;

    assert_eq!(response.error.as_deref(), Some("not authenticated"));
    assert_eq!(platform.open_count(), 0);
}

#[tokio::test]
async fn send_with_unknown_token_is_session_not_found() {
    let platform = MockPlatform::new();
    let deps = setup(&platform).await;

    let response = send_bulk(&deps, "no-such-session", "hello", &recipients(&["alice"])).await;

    assert_eq!(response.error.as_deref(), Some("session not found"));
    assert_eq!(platform.open_count(), 0);
}

#[tokio::test]
async fn send_with_expired_session_is_session_not_found() {
    let platform = MockPlatform::new();
    let store = Arc::new(MemorySessionStore::new());
    store.put(SESSION, "auth-blob", Some(0)).await.unwrap();
    let deps = CoreDeps::new(store, Arc::new(platform.connector()));

    let response = send_bulk(&deps, SESSION, "hello", &recipients(&["alice"])).await;

    assert_eq!(response.error.as_deref(), Some("session not found"));
}

#[tokio::test]
async fn send_with_only_blank_recipients_short_circuits() {
    let platform = MockPlatform::new();
    let deps = setup(&platform).await;

    let response = send_bulk(&deps, SESSION, "hello", &recipients(&["", "   ", "\t"])).await;

    assert_eq!(response.error.as_deref(), Some("no valid usernames provided"));
    assert_eq!(platform.open_count(), 0, "no connection for an empty batch");
}

#[tokio::test]
async fn send_trims_recipients_and_drops_blanks() {
    let platform = MockPlatform::new();
    let deps = setup(&platform).await;

    let response = send_bulk(
        &deps,
        SESSION,
        "hello",
        &recipients(&["  alice  ", "", "bob", "   "]),
    )
    .await;

    let outcomes = response.data.unwrap();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].recipient(), "alice");
    assert_eq!(outcomes[1].recipient(), "bob");
}

#[tokio::test]
async fn send_caps_the_batch_at_100_recipients() {
    let platform = MockPlatform::new();
    let deps = setup(&platform).await;

    let many: Vec<String> = (0..105).map(|i| format!("user{i}")).collect();
    let response = send_bulk(&deps, SESSION, "hello", &many).await;

    let outcomes = response.data.unwrap();
    assert_eq!(outcomes.len(), 100);
    assert_eq!(outcomes[0].recipient(), "user0");
    assert_eq!(outcomes[99].recipient(), "user99");
    assert_eq!(platform.sent_messages().len(), 100);
}

#[tokio::test]
async fn send_isolates_per_recipient_failures() {
    let platform = MockPlatform::new().with_failing_recipient("carol");
    let deps = setup(&platform).await;

    let response = send_bulk(
        &deps,
        SESSION,
        "hello",
        &recipients(&["alice", "bob", "carol", "dave", "erin"]),
    )
    .await;

    let outcomes = response.data.unwrap();
    assert_eq!(outcomes.len(), 5);
    for (i, outcome) in outcomes.iter().enumerate() {
        if i == 2 {
            match outcome {
                DispatchOutcome::Failed { recipient, error } => {
                    assert_eq!(recipient, "carol");
                    assert!(error.contains("USERNAME_NOT_OCCUPIED"));
                }
                other => panic!("expected failure for carol, got {other:?}"),
            }
        } else {
            assert!(outcome.is_sent(), "recipient #{i} should have been sent");
        }
    }
    // The failure did not stop the batch
    assert_eq!(platform.sent_messages().len(), 4);
}

#[tokio::test]
async fn send_returns_full_list_even_when_everything_fails() {
    let platform = MockPlatform::new()
        .with_failing_recipient("alice")
        .with_failing_recipient("bob");
    let deps = setup(&platform).await;

    let response = send_bulk(&deps, SESSION, "hello", &recipients(&["alice", "bob"])).await;

    let outcomes = response.data.unwrap();
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| !o.is_sent()));
    assert!(response.error.is_none(), "recipient failures are not batch failures");
}

#[tokio::test]
async fn send_truncates_the_message_to_4000_chars() {
    let platform = MockPlatform::new();
    let deps = setup(&platform).await;

    let long_message = "x".repeat(5000);
    send_bulk(&deps, SESSION, &long_message, &recipients(&["alice", "bob"])).await;

    for (_, message) in platform.sent_messages() {
        assert_eq!(message.chars().count(), 4000);
    }
}

#[tokio::test]
async fn send_preserves_input_order() {
    let platform = MockPlatform::new();
    let deps = setup(&platform).await;

    let names = ["dave", "alice", "carol", "bob"];
    let response = send_bulk(&deps, SESSION, "hello", &recipients(&names)).await;

    let outcomes = response.data.unwrap();
    let reported: Vec<&str> = outcomes.iter().map(|o| o.recipient()).collect();
    assert_eq!(reported, names);

    let sent: Vec<String> = platform
        .sent_messages()
        .into_iter()
        .map(|(recipient, _)| recipient)
        .collect();
    assert_eq!(sent, names);
}

#[tokio::test]
async fn send_uses_one_connection_and_closes_it() {
    let platform = MockPlatform::new().with_failing_recipient("bob");
    let deps = setup(&platform).await;

    send_bulk(&deps, SESSION, "hello", &recipients(&["alice", "bob", "carol"])).await;

    assert_eq!(platform.open_count(), 1, "one connection per batch");
    assert_eq!(platform.disconnect_count(), 1);
    assert_eq!(
        platform.opened_blobs()[0].as_deref(),
        Some("auth-blob"),
        "batch connection is rehydrated from the stored session"
    );
}

#[tokio::test]
async fn send_waits_between_consecutive_sends_but_not_before_the_first() {
    let platform = MockPlatform::new();
    let mut deps = setup(&platform).await;
    deps.send_delay = Duration::from_millis(50);

    let start = Instant::now();
    send_bulk(&deps, SESSION, "hello", &recipients(&["alice"])).await;
    assert!(
        start.elapsed() < Duration::from_millis(50),
        "single send must not wait"
    );

    let start = Instant::now();
    send_bulk(
        &deps,
        SESSION,
        "hello",
        &recipients(&["alice", "bob", "carol"]),
    )
    .await;
    assert!(
        start.elapsed() >= Duration::from_millis(100),
        "three sends include two inter-send delays"
    );
}
