//! # Nexus Webhook CLI
//!
//! Command-line interface for working with Nexus IQ webhook deliveries.
//!
//! This module provides CLI commands for:
//! - Verifying and decoding a captured delivery body
//! - Signing a body the way the IQ server does
//! - Listing the supported events
//! - Showing the resolved configuration

use bytes::Bytes;
use clap::{Parser, Subcommand};
use hyper::header::HeaderValue;
use hyper::{HeaderMap, Method};
use nexus_webhook::webhook::{sign, EVENT_HEADER, SIGNATURE_HEADER};
use nexus_webhook::{
    EventPayload, Webhook, WebhookConfig, WebhookError, WebhookEvent, WebhookSecret,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

// ============================================================================
// CLI Structure
// ============================================================================

/// Nexus Webhook CLI - verify and decode Nexus IQ webhook deliveries
#[derive(Parser)]
#[command(name = "nexus-webhook")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Verify and decode Sonatype Nexus IQ webhook deliveries")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "NEXUS_WEBHOOK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logging level (overrides the configuration file)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long)]
    pub json_logs: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Verify and decode a captured delivery body
    Parse {
        /// File holding the raw request body
        file: PathBuf,

        /// Value of the X-Nexus-Webhook-Id header
        #[arg(short, long)]
        event: Option<String>,

        /// Event to accept (repeatable); defaults to the configured events, then all
        #[arg(short = 'S', long = "subscribe")]
        subscribe: Vec<String>,

        /// Value of the X-Nexus-Webhook-Signature header
        #[arg(long)]
        signature: Option<String>,

        /// Shared secret; enables signature verification
        #[arg(long, env = "NEXUS_WEBHOOK_SECRET", hide_env_values = true)]
        secret: Option<String>,

        /// HTTP method the delivery arrived with
        #[arg(short, long, default_value = "POST")]
        method: String,

        /// Output format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,
    },

    /// Print the X-Nexus-Webhook-Signature value for a body
    Sign {
        /// File holding the raw request body
        file: PathBuf,

        /// Shared secret used as the HMAC key
        #[arg(long, env = "NEXUS_WEBHOOK_SECRET", hide_env_values = true)]
        secret: Option<String>,
    },

    /// List supported events
    Events {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show the resolved configuration (secret redacted)
    Config {
        /// Output format for configuration
        #[arg(short = 'f', long, default_value = "yaml")]
        format: ConfigFormat,
    },
}

/// Output format options
#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON output
    Json,
}

/// Configuration format options
#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ConfigFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
    /// TOML format
    Toml,
}

// ============================================================================
// CLI Error Types
// ============================================================================

/// CLI-specific errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Webhook rejected: {0}")]
    Webhook(#[from] WebhookError),

    #[error("Invalid argument: {arg} - {message}")]
    InvalidArgument { arg: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Command failed: {message}")]
    CommandFailed { message: String },
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) => 1,
            Self::Webhook(_) => 2,
            Self::InvalidArgument { .. } => 3,
            Self::Io(_) => 4,
            Self::CommandFailed { .. } => 5,
        }
    }
}

impl From<nexus_webhook::ConfigError> for CliError {
    fn from(e: nexus_webhook::ConfigError) -> Self {
        Self::Configuration(ConfigError::Invalid(e))
    }
}

/// Configuration-related errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid configuration: {0}")]
    InvalidFormat(#[from] config::ConfigError),

    #[error("Invalid webhook configuration: {0}")]
    Invalid(#[from] nexus_webhook::ConfigError),
}

// ============================================================================
// Configuration Types
// ============================================================================

/// CLI configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Webhook verification settings
    pub webhook: WebhookSettings,

    /// Default logging configuration
    pub logging: LoggingConfig,
}

/// Webhook verification settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WebhookSettings {
    /// Shared secret; absent disables signature verification
    pub secret: Option<WebhookSecret>,

    /// Events accepted when `--subscribe` is not given
    pub events: Vec<WebhookEvent>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

/// Log format options
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub enum LogFormat {
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "json")]
    Json,
}

/// Printable view of [`CliConfig`] with the secret redacted.
#[derive(Debug, Serialize)]
struct ConfigView<'a> {
    webhook: WebhookSettingsView,
    logging: &'a LoggingConfig,
}

#[derive(Debug, Serialize)]
struct WebhookSettingsView {
    #[serde(skip_serializing_if = "Option::is_none")]
    secret: Option<&'static str>,
    events: Vec<&'static str>,
}

impl<'a> From<&'a CliConfig> for ConfigView<'a> {
    fn from(config: &'a CliConfig) -> Self {
        Self {
            webhook: WebhookSettingsView {
                secret: config.webhook.secret.as_ref().map(|_| "<REDACTED>"),
                events: config.webhook.events.iter().map(|e| e.as_str()).collect(),
            },
            logging: &config.logging,
        }
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

/// Main CLI entry point
pub async fn run_cli() -> Result<(), CliError> {
    run(Cli::parse()).await
}

/// Execute an already parsed command line.
pub async fn run(cli: Cli) -> Result<(), CliError> {
    // Load configuration
    let config = load_configuration(cli.config.as_deref())?;

    // Initialize logging
    let level = cli.log_level.as_deref().unwrap_or(&config.logging.level);
    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        config.logging.format.clone()
    };
    initialize_logging(level, &format)?;

    // Execute command
    match cli.command {
        Commands::Parse {
            file,
            event,
            subscribe,
            signature,
            secret,
            method,
            format,
        } => {
            let request = ParseRequest {
                file,
                event,
                subscribe,
                signature,
                secret,
                method,
            };
            let output = execute_parse_command(request, &config).await?;
            println!("{}", render_payload(&output, &format)?);
            Ok(())
        }
        Commands::Sign { file, secret } => {
            let signature = execute_sign_command(&file, secret, &config).await?;
            println!("{}", signature);
            Ok(())
        }
        Commands::Events { format } => {
            println!("{}", render_events(&format)?);
            Ok(())
        }
        Commands::Config { format } => {
            println!("{}", render_config(&config, &format)?);
            Ok(())
        }
    }
}

// ============================================================================
// Configuration and Logging
// ============================================================================

/// Load configuration from an optional file and the environment.
///
/// Environment variables prefixed `NEXUS_WEBHOOK__` override file values,
/// with `__` separating sections, e.g. `NEXUS_WEBHOOK__LOGGING__LEVEL=debug`.
pub fn load_configuration(config_path: Option<&Path>) -> Result<CliConfig, ConfigError> {
    let mut builder = config::Config::builder();

    if let Some(path) = config_path {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        builder = builder.add_source(config::File::from(path));
    }

    builder = builder.add_source(
        config::Environment::with_prefix("NEXUS_WEBHOOK")
            .prefix_separator("__")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("webhook.events"),
    );

    let config: CliConfig = builder.build()?.try_deserialize()?;
    WebhookConfig {
        secret: config.webhook.secret.clone(),
    }
    .validate()?;

    Ok(config)
}

/// Initialize logging to stderr; `RUST_LOG` takes precedence over `level`.
fn initialize_logging(level: &str, format: &LogFormat) -> Result<(), CliError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| CliError::InvalidArgument {
            arg: "log-level".to_string(),
            message: e.to_string(),
        })?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };

    result.map_err(|e| CliError::CommandFailed {
        message: format!("Failed to initialize logging: {}", e),
    })
}

// ============================================================================
// Command Implementations
// ============================================================================

/// Arguments of the parse command.
#[derive(Debug, Clone)]
pub struct ParseRequest {
    pub file: PathBuf,
    pub event: Option<String>,
    pub subscribe: Vec<String>,
    pub signature: Option<String>,
    pub secret: Option<String>,
    pub method: String,
}

/// Verify and decode a captured delivery.
pub async fn execute_parse_command(
    request: ParseRequest,
    config: &CliConfig,
) -> Result<EventPayload, CliError> {
    let body = tokio::fs::read(&request.file).await?;

    let secret = request
        .secret
        .map(WebhookSecret::from)
        .or_else(|| config.webhook.secret.clone());
    let webhook = Webhook::new(WebhookConfig { secret })?;

    let subscriptions = resolve_subscriptions(&request.subscribe, &config.webhook.events)?;

    let method =
        Method::from_bytes(request.method.as_bytes()).map_err(|e| CliError::InvalidArgument {
            arg: "method".to_string(),
            message: e.to_string(),
        })?;

    let mut headers = HeaderMap::new();
    if let Some(event) = &request.event {
        headers.insert(EVENT_HEADER, header_value("event", event)?);
    }
    if let Some(signature) = &request.signature {
        headers.insert(SIGNATURE_HEADER, header_value("signature", signature)?);
    }

    debug!(
        file = %request.file.display(),
        verifies_signatures = webhook.verifies_signatures(),
        subscriptions = subscriptions.len(),
        "Parsing webhook delivery"
    );

    let payload = webhook
        .parse_parts(&method, &headers, Bytes::from(body), &subscriptions)
        .await?;

    info!(
        event = %payload.event(),
        delivery_id = %payload.id(),
        "Webhook delivery accepted"
    );

    Ok(payload)
}

/// Compute the signature header value for a body file.
pub async fn execute_sign_command(
    file: &Path,
    secret: Option<String>,
    config: &CliConfig,
) -> Result<String, CliError> {
    let secret = secret
        .map(WebhookSecret::from)
        .or_else(|| config.webhook.secret.clone())
        .ok_or_else(|| CliError::InvalidArgument {
            arg: "secret".to_string(),
            message: "a secret is required to sign (--secret or NEXUS_WEBHOOK_SECRET)".to_string(),
        })?;
    WebhookConfig {
        secret: Some(secret.clone()),
    }
    .validate()?;

    let body = tokio::fs::read(file).await?;
    Ok(sign(&secret, &body))
}

/// Events to accept: the command line first, then configuration, then all.
pub fn resolve_subscriptions(
    requested: &[String],
    configured: &[WebhookEvent],
) -> Result<Vec<WebhookEvent>, CliError> {
    if !requested.is_empty() {
        return requested
            .iter()
            .map(|id| {
                id.parse::<WebhookEvent>()
                    .map_err(|e| CliError::InvalidArgument {
                        arg: "subscribe".to_string(),
                        message: e.to_string(),
                    })
            })
            .collect();
    }

    if !configured.is_empty() {
        return Ok(configured.to_vec());
    }

    Ok(WebhookEvent::ALL.to_vec())
}

fn header_value(arg: &str, value: &str) -> Result<HeaderValue, CliError> {
    HeaderValue::from_str(value).map_err(|e| CliError::InvalidArgument {
        arg: arg.to_string(),
        message: e.to_string(),
    })
}

// ============================================================================
// Output Rendering
// ============================================================================

/// Render a decoded payload for display.
pub fn render_payload(payload: &EventPayload, format: &OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => to_json(payload),
        OutputFormat::Text => {
            let detail = match payload {
                EventPayload::ApplicationEvaluation(p) => {
                    let eval = &p.application_evaluation;
                    format!(
                        "outcome: {} (stage {}, affected {}, critical {}, severe {}, moderate {})",
                        eval.outcome,
                        eval.stage,
                        eval.affected_component_count,
                        eval.critical_component_count,
                        eval.severe_component_count,
                        eval.moderate_component_count
                    )
                }
                EventPayload::PolicyManagement(p) => {
                    format!(
                        "owner: {} ({}, {} policies)",
                        p.owner.name,
                        p.owner.owner_type,
                        p.owner.policies.len()
                    )
                }
                EventPayload::LicenseOverrideManagement(p) => {
                    let ov = &p.license_override;
                    format!(
                        "license override: {} for {} component [{}]",
                        ov.status,
                        ov.component_identifier.format,
                        ov.license_ids.join(", ")
                    )
                }
                EventPayload::SecurityVulnerabilityOverrideManagement(p) => {
                    let ov = &p.security_vulnerability_override;
                    format!("vulnerability override: {} {}", ov.reference_id, ov.status)
                }
            };

            Ok(format!(
                "event: {}\nid: {}\ninitiator: {}\ntimestamp: {}\n{}",
                payload.event(),
                payload.id(),
                payload.initiator(),
                payload.timestamp(),
                detail
            ))
        }
    }
}

/// Render the supported events.
pub fn render_events(format: &OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => {
            let events: Vec<_> = WebhookEvent::ALL
                .iter()
                .map(|e| serde_json::json!({ "event": e.as_str(), "schema": e.schema_name() }))
                .collect();
            to_json(&events)
        }
        OutputFormat::Text => Ok(WebhookEvent::ALL
            .iter()
            .map(|e| format!("{}\t{}", e.as_str(), e.schema_name()))
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

/// Render the resolved configuration with the secret redacted.
pub fn render_config(config: &CliConfig, format: &ConfigFormat) -> Result<String, CliError> {
    let view = ConfigView::from(config);
    let rendered = match format {
        ConfigFormat::Yaml => serde_yaml::to_string(&view).map_err(|e| e.to_string()),
        ConfigFormat::Json => serde_json::to_string_pretty(&view).map_err(|e| e.to_string()),
        ConfigFormat::Toml => toml::to_string(&view).map_err(|e| e.to_string()),
    };

    rendered.map_err(|message| CliError::CommandFailed { message })
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value).map_err(|e| CliError::CommandFailed {
        message: format!("Failed to render JSON: {}", e),
    })
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
