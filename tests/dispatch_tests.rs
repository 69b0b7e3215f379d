//! Delivery verification and dispatch, exercised through `process_delivery`.

use axum::body::Bytes;
use github_webhook_app::config::WebhookSecret;
use github_webhook_app::github::webhooks::EventKind;
use github_webhook_app::webhooks::signature::sign;
use github_webhook_app::webhooks::{process_delivery, HandlerOutcome, WebhookEnvelope};
use github_webhook_app::WebhookError;
use proptest::prelude::*;

mod common;
use common::*;

fn envelope(event: &str, payload: &[u8], signature: String) -> WebhookEnvelope {
    WebhookEnvelope {
        event: event.to_string(),
        signature,
        delivery: Some("72d3162e-cc78-11e3-81ab-4c9367dc0958".to_string()),
        payload: Bytes::copy_from_slice(payload),
    }
}

fn signed(event: &str, payload: &[u8]) -> WebhookEnvelope {
    envelope(event, payload, sign(payload, SECRET))
}

#[tokio::test]
async fn test_each_kind_invokes_exactly_one_handler() {
    let secret = WebhookSecret::new(SECRET);

    for kind in EventKind::ALL {
        let spy = SpyHandlers::default();
        let payload = serde_json::to_vec(&sample_payload(kind)).unwrap();

        let outcome = process_delivery(&secret, &spy, &signed(kind.as_str(), &payload))
            .await
            .unwrap();

        assert_eq!(outcome, HandlerOutcome::Acknowledged(kind));
        assert_eq!(spy.count(kind), 1, "handler for {} should run once", kind);
        assert_eq!(spy.total(), 1, "only the {} handler should run", kind);
    }
}

#[tokio::test]
async fn test_bad_signature_runs_no_handler() {
    let secret = WebhookSecret::new(SECRET);
    let spy = SpyHandlers::default();
    let payload = serde_json::to_vec(&sample_payload(EventKind::Push)).unwrap();

    let wrong = envelope("push", &payload, sign(&payload, b"another secret"));
    let err = process_delivery(&secret, &spy, &wrong).await.unwrap_err();
    assert!(matches!(err, WebhookError::Unauthorized));

    let unsigned = envelope("push", &payload, String::new());
    let err = process_delivery(&secret, &spy, &unsigned).await.unwrap_err();
    assert!(matches!(err, WebhookError::Unauthorized));

    assert_eq!(spy.total(), 0);
}

#[tokio::test]
async fn test_signature_is_checked_before_event_type() {
    let secret = WebhookSecret::new(SECRET);
    let spy = SpyHandlers::default();

    let forged = envelope("issues", b"{}", "sha256=deadbeef".to_string());
    let err = process_delivery(&secret, &spy, &forged).await.unwrap_err();
    assert!(matches!(err, WebhookError::Unauthorized));
}

#[tokio::test]
async fn test_malformed_payload_runs_no_handler() {
    let secret = WebhookSecret::new(SECRET);
    let spy = SpyHandlers::default();

    let err = process_delivery(&secret, &spy, &signed("push", b"{\"ref\": 42"))
        .await
        .unwrap_err();
    assert!(matches!(err, WebhookError::Decode(_)));

    let err = process_delivery(&secret, &spy, &signed("push", br#"{"ref":"refs/heads/main"}"#))
        .await
        .unwrap_err();
    assert!(matches!(err, WebhookError::Decode(_)));

    assert_eq!(spy.total(), 0);
}

#[tokio::test]
async fn test_handler_error_is_surfaced() {
    let secret = WebhookSecret::new(SECRET);
    let spy = SpyHandlers::failing();
    let payload = serde_json::to_vec(&sample_payload(EventKind::Ping)).unwrap();

    let err = process_delivery(&secret, &spy, &signed("ping", &payload))
        .await
        .unwrap_err();

    assert!(matches!(err, WebhookError::Handler(_)));
    assert_eq!(err.to_string(), "ping handler failed");
    assert_eq!(spy.count(EventKind::Ping), 1);
}

proptest! {
    #[test]
    fn prop_unknown_event_names_are_rejected(name in "[a-z_]{0,24}") {
        prop_assume!(name.parse::<EventKind>().is_err());

        let secret = WebhookSecret::new(SECRET);
        let spy = SpyHandlers::default();
        let result = tokio_test::block_on(process_delivery(&secret, &spy, &signed(&name, b"{}")));

        match result {
            Err(WebhookError::UnsupportedEvent(reported)) => prop_assert_eq!(reported, name),
            other => prop_assert!(false, "expected UnsupportedEvent, got {:?}", other),
        }
        prop_assert_eq!(spy.total(), 0);
    }
}
