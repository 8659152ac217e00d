//! # Nexus Webhook
//!
//! Verification and typed decoding of webhook deliveries sent by a Sonatype
//! Nexus IQ server.
//!
//! This crate provides:
//! - The closed set of supported IQ webhook events
//! - Subscription matching on the `X-Nexus-Webhook-Id` header
//! - HMAC-SHA1 signature verification with constant-time comparison
//! - One typed payload record per event
//!
//! Serving HTTP and acting on events are left to the caller.
//!
//! # Examples
//!
//! ```rust
//! use nexus_webhook::{Webhook, WebhookConfig, WebhookError, WebhookEvent};
//!
//! # tokio_test::block_on(async {
//! let webhook = Webhook::new(WebhookConfig::default().with_secret("s3cret")).unwrap();
//!
//! let request = hyper::Request::post("/hooks/iq")
//!     .header("X-Nexus-Webhook-Id", "iq:policyManagement")
//!     .body(http_body_util::Full::new(bytes::Bytes::from_static(b"{}")))
//!     .unwrap();
//!
//! // Not signed, so the delivery is refused.
//! let result = webhook.parse(request, &[WebhookEvent::PolicyManagement]).await;
//! assert!(matches!(result, Err(WebhookError::MissingSignatureHeader)));
//! # });
//! ```

// Public modules
pub mod config;
pub mod error;
pub mod events;
pub mod webhook;

// Re-export commonly used types at crate root for convenience
pub use config::{WebhookConfig, WebhookSecret};
pub use error::{ConfigError, WebhookError};
pub use events::{match_event, EventPayload, WebhookEvent};
pub use webhook::Webhook;
