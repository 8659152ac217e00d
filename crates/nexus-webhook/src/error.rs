//! Error types for Nexus IQ webhook processing.
//!
//! Every way a delivery can be rejected maps to exactly one [`WebhookError`]
//! variant so that callers can tell them apart without inspecting messages.

use thiserror::Error;

use crate::events::WebhookEvent;

/// Reasons a webhook delivery could not be turned into an [`EventPayload`].
///
/// The variants follow the order in which [`Webhook::parse`] checks a
/// request, so the first failing precondition is the one reported.
///
/// [`EventPayload`]: crate::events::EventPayload
/// [`Webhook::parse`]: crate::webhook::Webhook::parse
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The caller asked to parse without naming any event.
    #[error("No event specified to parse")]
    NoEventRequested,

    /// The request did not use the POST method.
    #[error("Invalid HTTP method: {method}")]
    InvalidMethod { method: String },

    /// The `X-Nexus-Webhook-Id` header was absent or empty.
    #[error("Missing X-Nexus-Webhook-Id header")]
    MissingEventHeader,

    /// The delivered event is not one the caller subscribed to.
    #[error("Event not defined to be parsed: {event}")]
    EventNotSubscribed { event: String },

    /// The body could not be read, or was empty.
    #[error("Error parsing payload: {reason}")]
    PayloadReadFailure { reason: String },

    /// A secret is configured but the `X-Nexus-Webhook-Signature` header was absent or empty.
    #[error("Missing X-Nexus-Webhook-Signature header")]
    MissingSignatureHeader,

    /// The HMAC computed over the body does not match the delivered signature.
    #[error("HMAC verification failed")]
    SignatureMismatch,

    /// The identifier does not name a supported event.
    #[error("Unknown event: {event}")]
    UnknownEvent { event: String },

    /// The body does not have the shape expected for the event.
    #[error("Failed to decode {event} payload: {source}")]
    DecodeFailure {
        event: WebhookEvent,
        #[source]
        source: serde_json::Error,
    },
}

impl WebhookError {
    /// Suggested HTTP status code for a response to the sender.
    ///
    /// `NoEventRequested` is a programming error on the receiving side and
    /// therefore maps to 500.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NoEventRequested => 500,
            Self::InvalidMethod { .. } => 405,
            Self::MissingEventHeader => 400,
            Self::EventNotSubscribed { .. } => 400,
            Self::PayloadReadFailure { .. } => 400,
            Self::MissingSignatureHeader => 401,
            Self::SignatureMismatch => 401,
            Self::UnknownEvent { .. } => 400,
            Self::DecodeFailure { .. } => 400,
        }
    }

    /// Check whether the sender failed to prove it holds the shared secret.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, Self::MissingSignatureHeader | Self::SignatureMismatch)
    }
}

/// Errors raised while building a [`Webhook`] from its configuration.
///
/// [`Webhook`]: crate::webhook::Webhook
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A secret was supplied but contains no bytes.
    ///
    /// Omit the secret entirely to disable signature verification.
    #[error("Webhook secret must not be empty")]
    EmptySecret,
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
