//! Common test utilities for serving Nexus IQ webhooks through axum
//!
//! This module provides:
//! - A router whose handler hands each request to [`Webhook::parse`]
//! - A recording sink for accepted payloads
//! - Request builders and sample delivery bodies

use axum::{
    body::Body,
    extract::{Request, State},
    http::{Response, StatusCode},
    routing::any,
    Json, Router,
};
use http_body_util::BodyExt;
use nexus_webhook::{
    webhook::sign, EventPayload, Webhook, WebhookConfig, WebhookEvent, WebhookSecret,
};
use std::sync::{Arc, Mutex};

pub const SECRET: &str = "integration-secret";

pub const APPLICATION_EVALUATION_BODY: &str = r#"{
    "timestamp": "2024-01-01T00:00:00Z",
    "initiator": "u1",
    "id": "e1",
    "applicationEvaluation": {
        "policyEvaluationId": "p1",
        "stage": "build",
        "ownerId": "o1",
        "evaluationDate": "2024-01-01T00:00:00Z",
        "affectedComponentCount": 3,
        "criticalComponentCount": 1,
        "severeComponentCount": 0,
        "moderateComponentCount": 2,
        "outcome": "Failure"
    }
}"#;

pub const POLICY_MANAGEMENT_BODY: &str = r#"{
    "timestamp": "2024-02-10T12:00:00Z",
    "initiator": "admin",
    "id": "pm-1",
    "owner": {
        "id": "ROOT_ORGANIZATION_ID",
        "publicId": "ROOT_ORGANIZATION_ID",
        "name": "Root Organization",
        "parentOwnerId": null,
        "type": "organization",
        "tags": [],
        "labels": [{"id": "l1", "name": "Architecture-Cleanup", "description": "cleanup", "color": "light-red"}],
        "licenseThreatGroups": [{"id": "ltg1", "name": "Banned", "threatLevel": 10}],
        "policies": [{"id": "pol1", "name": "Security-Critical", "threatLevel": 10}],
        "members": [{"id": "r1", "name": "Owner", "members": [{"type": "USER", "name": "admin"}]}]
    }
}"#;

pub const LICENSE_OVERRIDE_BODY: &str = r#"{
    "timestamp": "2024-02-11T09:30:00Z",
    "initiator": "legal",
    "id": "lo-1",
    "licenseOverride": {
        "id": "lov1",
        "ownerId": "app-1",
        "status": "ACKNOWLEDGED",
        "comment": "reviewed",
        "licenseIds": ["Apache-2.0", "MIT"],
        "componentIdentifier": {
            "format": "maven",
            "coordinates": {
                "artifactId": "commons-lang3",
                "groupId": "org.apache.commons",
                "version": "3.12.0",
                "extension": "jar",
                "classifier": ""
            }
        }
    }
}"#;

pub const SECURITY_OVERRIDE_BODY: &str = r#"{
    "timestamp": "2024-03-01T08:00:00Z",
    "initiator": "secops",
    "id": "s1",
    "securityVulnerabilityOverride": {
        "id": "ov1",
        "ownerId": "app-1",
        "hash": "8b7e1c3a",
        "source": "sonatype",
        "referenceId": "CVE-2021-44228",
        "status": "NOT_APPLICABLE",
        "comment": null
    }
}"#;

// ============================================================================
// Test Server
// ============================================================================

/// Shared state of the test server.
#[derive(Clone)]
pub struct AppState {
    pub webhook: Arc<Webhook>,
    pub events: Arc<Vec<WebhookEvent>>,
    pub accepted: Arc<Mutex<Vec<EventPayload>>>,
}

impl AppState {
    #[allow(dead_code)]
    pub fn accepted(&self) -> Vec<EventPayload> {
        self.accepted.lock().unwrap().clone()
    }
}

/// Handler mapping parse failures onto HTTP status codes.
async fn handle_webhook(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    match state.webhook.parse(request, &state.events).await {
        Ok(payload) => {
            let summary = serde_json::json!({
                "event": payload.event().as_str(),
                "id": payload.id(),
            });
            state.accepted.lock().unwrap().push(payload);
            Ok(Json(summary))
        }
        Err(e) => {
            let status =
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            Err((status, e.to_string()))
        }
    }
}

/// Build a router around a webhook with the given secret and subscriptions.
#[allow(dead_code)]
pub fn create_test_app(secret: Option<&str>, events: &[WebhookEvent]) -> (Router, AppState) {
    let mut config = WebhookConfig::default();
    if let Some(secret) = secret {
        config = config.with_secret(secret);
    }

    let state = AppState {
        webhook: Arc::new(Webhook::new(config).unwrap()),
        events: Arc::new(events.to_vec()),
        accepted: Arc::new(Mutex::new(Vec::new())),
    };

    let router = Router::new()
        .route("/webhook", any(handle_webhook))
        .with_state(state.clone());

    (router, state)
}

// ============================================================================
// Request Builders
// ============================================================================

/// Build a POST delivery; `signature` is the raw header value.
#[allow(dead_code)]
pub fn delivery(event: Option<&str>, signature: Option<&str>, body: &str) -> Request {
    build_request("POST", event, signature, body)
}

/// Build a delivery signed with [`SECRET`].
#[allow(dead_code)]
pub fn signed_delivery(event: &str, body: &str) -> Request {
    let signature = sign(&WebhookSecret::from(SECRET), body.as_bytes());
    delivery(Some(event), Some(&signature), body)
}

#[allow(dead_code)]
pub fn build_request(
    method: &str,
    event: Option<&str>,
    signature: Option<&str>,
    body: &str,
) -> Request {
    let mut builder = Request::builder()
        .method(method)
        .uri("/webhook")
        .header("content-type", "application/json");
    if let Some(event) = event {
        builder = builder.header("X-Nexus-Webhook-Id", event);
    }
    if let Some(signature) = signature {
        builder = builder.header("X-Nexus-Webhook-Signature", signature);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Collect a response body as text.
#[allow(dead_code)]
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
