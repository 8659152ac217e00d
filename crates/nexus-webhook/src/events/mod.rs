//! Nexus IQ webhook event identifiers, matching, and typed payloads.
//!
//! The IQ server names each delivery in the `X-Nexus-Webhook-Id` header.
//! This module defines the closed set of identifiers this crate understands,
//! the membership test against a caller's subscriptions, and the payload
//! record decoded for each identifier.
//!
//! # Overview
//!
//! - [`WebhookEvent`] - the supported event identifiers
//! - [`match_event`] - checks a delivered identifier against subscriptions
//! - [`EventPayload`] - one typed record per event, selected by identifier
//!
//! # Examples
//!
//! ```rust
//! use nexus_webhook::events::{match_event, WebhookEvent};
//!
//! let subscribed = [WebhookEvent::ApplicationEvaluation, WebhookEvent::PolicyManagement];
//! let event = match_event("iq:policyManagement", &subscribed).unwrap();
//! assert_eq!(event, WebhookEvent::PolicyManagement);
//!
//! assert!(match_event("iq:licenseOverrideManagement", &subscribed).is_err());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::WebhookError;

pub mod payloads;

pub use payloads::*;

// ============================================================================
// Event Identifiers
// ============================================================================

/// Webhook events emitted by a Nexus IQ server.
///
/// The serialized form is the exact identifier sent in the
/// `X-Nexus-Webhook-Id` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WebhookEvent {
    /// Changes to an organization's or application's policies.
    #[serde(rename = "iq:policyManagement")]
    PolicyManagement,

    /// Completion of a policy evaluation for an application.
    #[serde(rename = "iq:applicationEvaluation")]
    ApplicationEvaluation,

    /// Creation or change of a license override.
    #[serde(rename = "iq:licenseOverrideManagement")]
    LicenseOverrideManagement,

    /// Creation or change of a security vulnerability override.
    #[serde(rename = "iq:securityVulnerabilityOverrideManagement")]
    SecurityVulnerabilityOverrideManagement,
}

impl WebhookEvent {
    /// All supported events, in declaration order.
    pub const ALL: [WebhookEvent; 4] = [
        Self::PolicyManagement,
        Self::ApplicationEvaluation,
        Self::LicenseOverrideManagement,
        Self::SecurityVulnerabilityOverrideManagement,
    ];

    /// Identifier as it appears in the `X-Nexus-Webhook-Id` header.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PolicyManagement => "iq:policyManagement",
            Self::ApplicationEvaluation => "iq:applicationEvaluation",
            Self::LicenseOverrideManagement => "iq:licenseOverrideManagement",
            Self::SecurityVulnerabilityOverrideManagement => {
                "iq:securityVulnerabilityOverrideManagement"
            }
        }
    }

    /// Name of the payload record decoded for this event.
    pub fn schema_name(&self) -> &'static str {
        match self {
            Self::PolicyManagement => "PolicyManagementPayload",
            Self::ApplicationEvaluation => "ApplicationEvaluationPayload",
            Self::LicenseOverrideManagement => "LicenseOverrideManagementPayload",
            Self::SecurityVulnerabilityOverrideManagement => {
                "SecurityVulnerabilityOverrideManagementPayload"
            }
        }
    }
}

impl fmt::Display for WebhookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WebhookEvent {
    type Err = WebhookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| WebhookError::UnknownEvent {
                event: s.to_string(),
            })
    }
}

// ============================================================================
// Event Matching
// ============================================================================

/// Find the delivered event among the caller's subscriptions.
///
/// The comparison is an exact string match against each subscribed
/// identifier, so the order of `subscribed` does not matter.
///
/// # Errors
///
/// - [`WebhookError::NoEventRequested`] if `subscribed` is empty
/// - [`WebhookError::EventNotSubscribed`] if `event_id` is not subscribed
pub fn match_event(
    event_id: &str,
    subscribed: &[WebhookEvent],
) -> Result<WebhookEvent, WebhookError> {
    if subscribed.is_empty() {
        return Err(WebhookError::NoEventRequested);
    }

    subscribed
        .iter()
        .copied()
        .find(|event| event.as_str() == event_id)
        .ok_or_else(|| WebhookError::EventNotSubscribed {
            event: event_id.to_string(),
        })
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
