//! Nexus IQ webhook intake and signature validation.
//!
//! # Core Components
//!
//! - [`Webhook`] - verifies and decodes one delivery per [`Webhook::parse`] call
//! - [`validation`] - HMAC-SHA1 signing and constant-time verification
//!
//! # Security
//!
//! When a secret is configured, every delivery must carry
//! `X-Nexus-Webhook-Signature`, and the digest is compared in constant time.
//! Secrets and signature values are never logged.
//!
//! # HTTP Server Integration (Axum Example)
//!
//! ```rust,ignore
//! use axum::{extract::{Request, State}, http::StatusCode, routing::post, Json, Router};
//! use nexus_webhook::{Webhook, WebhookEvent};
//! use std::sync::Arc;
//!
//! async fn handle_webhook(
//!     State(webhook): State<Arc<Webhook>>,
//!     request: Request,
//! ) -> Result<StatusCode, (StatusCode, String)> {
//!     match webhook.parse(request, &WebhookEvent::ALL).await {
//!         Ok(payload) => {
//!             // Hand the payload to the application here.
//!             Ok(StatusCode::NO_CONTENT)
//!         }
//!         Err(e) => Err((StatusCode::from_u16(e.status_code()).unwrap(), e.to_string())),
//!     }
//! }
//!
//! let app = Router::new()
//!     .route("/webhook", post(handle_webhook))
//!     .with_state(Arc::new(webhook));
//! ```

pub mod receiver;
pub mod validation;

// Re-export main types
pub use receiver::{Webhook, EVENT_HEADER, SIGNATURE_HEADER};
pub use validation::{sign, verify, SIGNATURE_PREFIX, SIGNATURE_PREFIX_LEN};
