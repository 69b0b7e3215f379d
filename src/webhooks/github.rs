use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use tracing::{error, info, warn};

use crate::config::WebhookSecret;
use crate::error::WebhookError;
use crate::github::webhooks::{EventKind, WebhookEvent};
use crate::server::AppState;
use crate::webhooks::dispatch::{dispatch, EventHandlers, HandlerOutcome};
use crate::webhooks::signature::verify_signature;

pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";
pub const EVENT_HEADER: &str = "x-github-event";
pub const DELIVERY_HEADER: &str = "x-github-delivery";

/// One inbound delivery, as received.
#[derive(Debug, Clone)]
pub struct WebhookEnvelope {
    pub event: String,
    pub signature: String,
    pub delivery: Option<String>,
    pub payload: Bytes,
}

impl WebhookEnvelope {
    /// Missing headers are treated as empty values, which never verify or dispatch.
    pub fn from_parts(headers: &HeaderMap, payload: Bytes) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        Self {
            event: header(EVENT_HEADER).unwrap_or_default(),
            signature: header(SIGNATURE_HEADER).unwrap_or_default(),
            delivery: header(DELIVERY_HEADER),
            payload,
        }
    }
}

/// Verifies, decodes and dispatches one delivery.
///
/// Verification happens before anything is read from the payload.
pub async fn process_delivery<H>(
    secret: &WebhookSecret,
    handlers: &H,
    envelope: &WebhookEnvelope,
) -> Result<HandlerOutcome, WebhookError>
where
    H: EventHandlers + ?Sized,
{
    let delivery = envelope.delivery.as_deref().unwrap_or("-");

    if !verify_signature(&envelope.payload, &envelope.signature, secret.as_bytes()) {
        warn!("Signatures don't match for delivery {}", delivery);
        return Err(WebhookError::Unauthorized);
    }

    let kind: EventKind = envelope.event.parse().map_err(|_| {
        warn!("Unsupported event: {}", envelope.event);
        WebhookError::UnsupportedEvent(envelope.event.clone())
    })?;

    let event = WebhookEvent::decode(kind, &envelope.payload).map_err(|e| {
        warn!("Couldn't decode {} payload for delivery {}: {}", kind, delivery, e);
        WebhookError::from(e)
    })?;

    info!("Consuming event: {} (delivery {})", kind, delivery);
    match dispatch(handlers, &event).await {
        Ok(outcome) => {
            info!("Consumed event: {}", kind);
            Ok(outcome)
        }
        Err(e) => {
            error!("Couldn't consume event {}: {}", kind, e);
            Err(WebhookError::Handler(e))
        }
    }
}

pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, WebhookError> {
    let envelope = WebhookEnvelope::from_parts(&headers, body);
    process_delivery(&state.secret, state.handlers.as_ref(), &envelope).await?;
    Ok(StatusCode::NO_CONTENT)
}
