//! Construction-time configuration for [`Webhook`].
//!
//! [`Webhook`]: crate::webhook::Webhook

use serde::{Deserialize, Deserializer};
use std::fmt;
use zeroize::Zeroizing;

use crate::error::ConfigError;

/// Shared secret used as the HMAC key for signature verification.
///
/// The bytes are zeroed when the last copy is dropped and never appear in
/// `Debug` output.
#[derive(Clone)]
pub struct WebhookSecret {
    inner: Zeroizing<Vec<u8>>,
}

impl WebhookSecret {
    /// Create a secret from raw key material.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            inner: Zeroizing::new(secret.into()),
        }
    }

    /// Get the key bytes (only for immediate use).
    pub fn expose(&self) -> &[u8] {
        &self.inner
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Get secret length without exposing content
    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

impl fmt::Debug for WebhookSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookSecret")
            .field("length", &self.len())
            .field("value", &"<REDACTED>")
            .finish()
    }
}

impl From<&str> for WebhookSecret {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for WebhookSecret {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for WebhookSecret {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Zeroizing::new(String::deserialize(deserializer)?);
        Ok(Self::new(value.as_bytes()))
    }
}

/// Options recognised when building a [`Webhook`].
///
/// Without a secret, deliveries are accepted unsigned and any signature
/// header is ignored.
///
/// # Examples
///
/// ```rust
/// use nexus_webhook::config::WebhookConfig;
///
/// let config = WebhookConfig::default().with_secret("s3cret");
/// assert!(config.validate().is_ok());
/// assert!(!format!("{:?}", config).contains("s3cret"));
/// ```
///
/// [`Webhook`]: crate::webhook::Webhook
#[derive(Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WebhookConfig {
    /// HMAC key for `X-Nexus-Webhook-Signature`; `None` disables verification
    pub secret: Option<WebhookSecret>,
}

impl WebhookConfig {
    /// Set the shared secret, enabling signature verification.
    pub fn with_secret(mut self, secret: impl Into<WebhookSecret>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    /// Check the configuration for values that cannot be used.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptySecret`] when a secret is present but empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.secret {
            Some(secret) if secret.is_empty() => Err(ConfigError::EmptySecret),
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("secret", &self.secret.as_ref().map(|_| "<REDACTED>"))
            .finish()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
