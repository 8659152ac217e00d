//! Typed payload records for Nexus IQ webhook events.
//!
//! Each supported [`WebhookEvent`] has exactly one record type here, and
//! [`EventPayload::decode`] is the only place where an event is bound to its
//! record. Field names follow the camelCase JSON sent by the IQ server.
//!
//! Scalar fields are required: a missing or mistyped value is a decode
//! error, never a zero value. Lists the server leaves out or sends as `null`
//! decode to an empty `Vec`, and free-text or nullable values are `Option`s.

use serde::{Deserialize, Deserializer, Serialize};

use super::WebhookEvent;
use crate::error::WebhookError;

// ============================================================================
// Event Payload
// ============================================================================

/// Decoded body of a webhook delivery, one variant per [`WebhookEvent`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "payload")]
pub enum EventPayload {
    #[serde(rename = "iq:policyManagement")]
    PolicyManagement(PolicyManagementPayload),

    #[serde(rename = "iq:applicationEvaluation")]
    ApplicationEvaluation(ApplicationEvaluationPayload),

    #[serde(rename = "iq:licenseOverrideManagement")]
    LicenseOverrideManagement(LicenseOverrideManagementPayload),

    #[serde(rename = "iq:securityVulnerabilityOverrideManagement")]
    SecurityVulnerabilityOverrideManagement(SecurityVulnerabilityOverrideManagementPayload),
}

impl EventPayload {
    /// Decode `body` into the record registered for `event`.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::DecodeFailure`] naming `event` when the body is
    /// not valid JSON or does not match the record's shape.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use nexus_webhook::events::{EventPayload, WebhookEvent};
    ///
    /// let body = br#"{
    ///     "timestamp": "2024-01-01T00:00:00Z",
    ///     "initiator": "admin",
    ///     "id": "e1",
    ///     "securityVulnerabilityOverride": {
    ///         "id": "o1", "ownerId": "app", "hash": "abc", "source": "nvd",
    ///         "referenceId": "CVE-2024-0001", "status": "ACKNOWLEDGED", "comment": null
    ///     }
    /// }"#;
    ///
    /// let payload =
    ///     EventPayload::decode(WebhookEvent::SecurityVulnerabilityOverrideManagement, body).unwrap();
    /// assert_eq!(payload.event(), WebhookEvent::SecurityVulnerabilityOverrideManagement);
    /// ```
    pub fn decode(event: WebhookEvent, body: &[u8]) -> Result<Self, WebhookError> {
        let decoded = match event {
            WebhookEvent::PolicyManagement => {
                serde_json::from_slice(body).map(Self::PolicyManagement)
            }
            WebhookEvent::ApplicationEvaluation => {
                serde_json::from_slice(body).map(Self::ApplicationEvaluation)
            }
            WebhookEvent::LicenseOverrideManagement => {
                serde_json::from_slice(body).map(Self::LicenseOverrideManagement)
            }
            WebhookEvent::SecurityVulnerabilityOverrideManagement => {
                serde_json::from_slice(body).map(Self::SecurityVulnerabilityOverrideManagement)
            }
        };

        decoded.map_err(|source| WebhookError::DecodeFailure { event, source })
    }

    /// Event this payload was decoded for.
    pub fn event(&self) -> WebhookEvent {
        match self {
            Self::PolicyManagement(_) => WebhookEvent::PolicyManagement,
            Self::ApplicationEvaluation(_) => WebhookEvent::ApplicationEvaluation,
            Self::LicenseOverrideManagement(_) => WebhookEvent::LicenseOverrideManagement,
            Self::SecurityVulnerabilityOverrideManagement(_) => {
                WebhookEvent::SecurityVulnerabilityOverrideManagement
            }
        }
    }

    /// Delivery identifier assigned by the IQ server.
    pub fn id(&self) -> &str {
        match self {
            Self::PolicyManagement(p) => &p.id,
            Self::ApplicationEvaluation(p) => &p.id,
            Self::LicenseOverrideManagement(p) => &p.id,
            Self::SecurityVulnerabilityOverrideManagement(p) => &p.id,
        }
    }

    /// User or process that caused the event.
    pub fn initiator(&self) -> &str {
        match self {
            Self::PolicyManagement(p) => &p.initiator,
            Self::ApplicationEvaluation(p) => &p.initiator,
            Self::LicenseOverrideManagement(p) => &p.initiator,
            Self::SecurityVulnerabilityOverrideManagement(p) => &p.initiator,
        }
    }

    /// Event timestamp exactly as sent (RFC 3339).
    pub fn timestamp(&self) -> &str {
        match self {
            Self::PolicyManagement(p) => &p.timestamp,
            Self::ApplicationEvaluation(p) => &p.timestamp,
            Self::LicenseOverrideManagement(p) => &p.timestamp,
            Self::SecurityVulnerabilityOverrideManagement(p) => &p.timestamp,
        }
    }
}

// ============================================================================
// Application Evaluation
// ============================================================================

/// Payload of `iq:applicationEvaluation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationEvaluationPayload {
    pub timestamp: String,
    pub initiator: String,
    pub id: String,
    pub application_evaluation: ApplicationEvaluation,
}

/// Outcome of a single policy evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationEvaluation {
    pub policy_evaluation_id: String,

    /// Evaluation stage, e.g. `build` or `release`
    pub stage: String,

    pub owner_id: String,
    pub evaluation_date: String,
    pub affected_component_count: i64,
    pub critical_component_count: i64,
    pub severe_component_count: i64,
    pub moderate_component_count: i64,

    /// Policy action taken, e.g. `None`, `Warning` or `Failure`
    pub outcome: String,
}

// ============================================================================
// Policy Management
// ============================================================================

/// Payload of `iq:policyManagement`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyManagementPayload {
    pub timestamp: String,
    pub initiator: String,
    pub id: String,
    pub owner: PolicyOwner,
}

/// Organization or application whose policy configuration changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyOwner {
    pub id: String,
    pub public_id: String,
    pub name: String,

    /// Absent for the root organization
    #[serde(default)]
    pub parent_owner_id: Option<String>,

    /// Owner kind, e.g. `organization` or `application`
    #[serde(rename = "type")]
    pub owner_type: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<Tag>,

    // Older IQ releases misspell the key.
    #[serde(default, deserialize_with = "null_as_empty", alias = "labes")]
    pub labels: Vec<Tag>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub license_threat_groups: Vec<LicenseThreatGroup>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub policies: Vec<PolicySummary>,

    /// Role assignments on the owner
    #[serde(default, deserialize_with = "null_as_empty", rename = "members")]
    pub access: Vec<AccessEntry>,
}

/// Application category tag or component label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseThreatGroup {
    pub id: String,
    pub name: String,
    pub threat_level: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicySummary {
    pub id: String,
    pub name: String,
    pub threat_level: i64,
}

/// A role on the owner and the users or groups holding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessEntry {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty", alias = "licenseThreatGroups")]
    pub members: Vec<AccessMember>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessMember {
    /// `USER` or `GROUP`
    #[serde(rename = "type")]
    pub member_type: String,
    pub name: String,
}

// ============================================================================
// Security Vulnerability Override Management
// ============================================================================

/// Payload of `iq:securityVulnerabilityOverrideManagement`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityVulnerabilityOverrideManagementPayload {
    pub timestamp: String,
    pub initiator: String,
    pub id: String,
    pub security_vulnerability_override: SecurityVulnerabilityOverride,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityVulnerabilityOverride {
    pub id: String,
    pub owner_id: String,

    /// Hash of the affected component
    pub hash: String,

    pub source: String,
    pub reference_id: String,
    pub status: String,
    #[serde(default)]
    pub comment: Option<String>,
}

// ============================================================================
// License Override Management
// ============================================================================

/// Payload of `iq:licenseOverrideManagement`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseOverrideManagementPayload {
    pub timestamp: String,
    pub initiator: String,
    pub id: String,
    pub license_override: LicenseOverride,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseOverride {
    pub id: String,
    pub owner_id: String,
    pub status: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub license_ids: Vec<String>,
    pub component_identifier: ComponentIdentifier,
}

/// Component the override applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentIdentifier {
    /// Package format, e.g. `maven`
    pub format: String,
    pub coordinates: ComponentCoordinates,
}

/// Format-specific coordinates; only the parts the format uses are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentCoordinates {
    #[serde(default)]
    pub artifact_id: Option<String>,
    #[serde(default)]
    pub classifier: Option<String>,
    #[serde(default)]
    pub extension: Option<String>,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

/// Decode a list that may be `null`.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
#[path = "payloads_tests.rs"]
mod tests;
