//! Webhook intake: request checks, signature verification, and decoding.
//!
//! [`Webhook::parse`] runs every delivery through the same fixed sequence:
//!
//! 1. Preconditions: at least one subscribed event, POST method, event header
//! 2. Match the delivered event against the subscriptions
//! 3. Read the whole body
//! 4. Verify the signature (only when a secret is configured)
//! 5. Decode the body into the event's payload record
//!
//! The first failing step ends the call with its [`WebhookError`]. Whatever
//! the outcome, the request body is read to the end before `parse` returns
//! so the connection can be reused.
//!
//! # Examples
//!
//! ```rust
//! use bytes::Bytes;
//! use http_body_util::Full;
//! use hyper::Request;
//! use nexus_webhook::{EventPayload, Webhook, WebhookConfig, WebhookEvent};
//!
//! # tokio_test::block_on(async {
//! let webhook = Webhook::new(WebhookConfig::default()).unwrap();
//!
//! let body = r#"{"timestamp":"2024-01-01T00:00:00Z","initiator":"u1","id":"e1",
//!     "applicationEvaluation":{"policyEvaluationId":"p1","stage":"build","ownerId":"o1",
//!     "evaluationDate":"2024-01-01T00:00:00Z","affectedComponentCount":3,
//!     "criticalComponentCount":1,"severeComponentCount":0,"moderateComponentCount":2,
//!     "outcome":"Failure"}}"#;
//! let request = Request::post("/webhook")
//!     .header("X-Nexus-Webhook-Id", "iq:applicationEvaluation")
//!     .body(Full::new(Bytes::from(body)))
//!     .unwrap();
//!
//! let payload = webhook
//!     .parse(request, &[WebhookEvent::ApplicationEvaluation])
//!     .await
//!     .unwrap();
//!
//! if let EventPayload::ApplicationEvaluation(evaluation) = payload {
//!     assert_eq!(evaluation.application_evaluation.outcome, "Failure");
//! }
//! # });
//! ```

use bytes::{BufMut, Bytes};
use http_body_util::{BodyExt, Full};
use hyper::body::Body;
use hyper::{HeaderMap, Method, Request};
use std::fmt;
use std::pin::{pin, Pin};
use tracing::{debug, instrument, Span};

use crate::config::{WebhookConfig, WebhookSecret};
use crate::error::{ConfigError, WebhookError};
use crate::events::{match_event, EventPayload, WebhookEvent};
use crate::webhook::validation;

/// Header carrying the event identifier.
pub const EVENT_HEADER: &str = "x-nexus-webhook-id";

/// Header carrying the HMAC signature of the body.
pub const SIGNATURE_HEADER: &str = "x-nexus-webhook-signature";

// ============================================================================
// Webhook
// ============================================================================

/// Verifies and decodes Nexus IQ webhook deliveries.
///
/// A `Webhook` holds nothing but its optional secret, so one instance can
/// serve any number of concurrent [`parse`](Self::parse) calls.
#[derive(Debug, Clone)]
pub struct Webhook {
    secret: Option<WebhookSecret>,
}

impl Webhook {
    /// Create a webhook from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptySecret`] if the configured secret is empty.
    pub fn new(config: WebhookConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            secret: config.secret,
        })
    }

    /// Whether deliveries must carry a valid `X-Nexus-Webhook-Signature`.
    pub fn verifies_signatures(&self) -> bool {
        self.secret.is_some()
    }

    /// Verify a delivery and decode it into the payload for its event.
    ///
    /// `events` lists the events the caller is prepared to handle; a
    /// delivery for any other event is rejected before its body is read.
    ///
    /// The body is drained on every exit path, including early rejections.
    ///
    /// # Errors
    ///
    /// Returns the [`WebhookError`] for the first check that fails, in the
    /// order described in the [module documentation](self).
    pub async fn parse<B>(
        &self,
        request: Request<B>,
        events: &[WebhookEvent],
    ) -> Result<EventPayload, WebhookError>
    where
        B: Body,
        B::Error: fmt::Display,
    {
        let (parts, body) = request.into_parts();
        let mut body = pin!(body);

        let result = self
            .process(&parts.method, &parts.headers, body.as_mut(), events)
            .await;

        drain(body).await;
        result
    }

    /// Same as [`parse`](Self::parse) for a body the framework already buffered.
    pub async fn parse_parts(
        &self,
        method: &Method,
        headers: &HeaderMap,
        body: Bytes,
        events: &[WebhookEvent],
    ) -> Result<EventPayload, WebhookError> {
        let body = pin!(Full::new(body));
        self.process(method, headers, body, events).await
    }

    #[instrument(skip_all, fields(method = %method, event = tracing::field::Empty))]
    async fn process<B>(
        &self,
        method: &Method,
        headers: &HeaderMap,
        body: Pin<&mut B>,
        events: &[WebhookEvent],
    ) -> Result<EventPayload, WebhookError>
    where
        B: Body,
        B::Error: fmt::Display,
    {
        if events.is_empty() {
            return Err(WebhookError::NoEventRequested);
        }

        if *method != Method::POST {
            return Err(WebhookError::InvalidMethod {
                method: method.to_string(),
            });
        }

        let event_id =
            header_value(headers, EVENT_HEADER).ok_or(WebhookError::MissingEventHeader)?;
        let event = match std::str::from_utf8(event_id) {
            Ok(event_id) => match_event(event_id, events)?,
            // No supported identifier is outside ASCII.
            Err(_) => {
                return Err(WebhookError::EventNotSubscribed {
                    event: String::from_utf8_lossy(event_id).into_owned(),
                })
            }
        };
        Span::current().record("event", event.as_str());

        let payload = read_body(body).await?;
        debug!(bytes = payload.len(), "Webhook payload read");

        if let Some(secret) = &self.secret {
            let signature = header_value(headers, SIGNATURE_HEADER)
                .ok_or(WebhookError::MissingSignatureHeader)?;

            if !validation::verify(secret, &payload, signature)? {
                return Err(WebhookError::SignatureMismatch);
            }
            debug!("Webhook signature validated");
        }

        let decoded = EventPayload::decode(event, &payload)?;
        debug!(delivery_id = %decoded.id(), "Webhook payload decoded");

        Ok(decoded)
    }
}

// ============================================================================
// Request Helpers
// ============================================================================

/// Raw bytes of a header; only a missing or empty header counts as absent.
fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a [u8]> {
    headers
        .get(name)
        .map(|value| value.as_bytes())
        .filter(|value| !value.is_empty())
}

/// Read the body to the end.
async fn read_body<B>(mut body: Pin<&mut B>) -> Result<Vec<u8>, WebhookError>
where
    B: Body,
    B::Error: fmt::Display,
{
    let mut payload = Vec::new();

    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(|e| WebhookError::PayloadReadFailure {
            reason: e.to_string(),
        })?;

        // Trailers carry nothing we need.
        if let Ok(data) = frame.into_data() {
            payload.put(data);
        }
    }

    if payload.is_empty() {
        return Err(WebhookError::PayloadReadFailure {
            reason: "empty body".to_string(),
        });
    }

    Ok(payload)
}

/// Consume whatever is left of the body, stopping at the first error.
async fn drain<B: Body>(mut body: Pin<&mut B>) {
    if body.is_end_stream() {
        return;
    }

    while let Some(frame) = body.frame().await {
        if frame.is_err() {
            break;
        }
    }
}

#[cfg(test)]
#[path = "receiver_tests.rs"]
mod tests;
