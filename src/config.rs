//! Runtime configuration, read from environment variables.
//!
//! Every setting has a default suitable for an in-cluster deployment with
//! the TLS secret mounted at `/etc/webhook/certs/`.

use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

/// Default path to webhook TLS certificate
pub const WEBHOOK_CERT_PATH: &str = "/etc/webhook/certs/tls.crt";
/// Default path to webhook TLS private key
pub const WEBHOOK_KEY_PATH: &str = "/etc/webhook/certs/tls.key";
/// Default webhook server port
pub const WEBHOOK_PORT: u16 = 9443;
/// Default health server port
pub const HEALTH_PORT: u16 = 8080;
/// Default grace period for in-flight admission requests during shutdown
pub const SHUTDOWN_GRACE_PERIOD_SECS: u64 = 5;

/// Webhook process configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebhookConfig {
    pub cert_path: String,
    pub key_path: String,
    pub webhook_port: u16,
    pub health_port: u16,
    pub shutdown_grace_period: Duration,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            cert_path: WEBHOOK_CERT_PATH.to_string(),
            key_path: WEBHOOK_KEY_PATH.to_string(),
            webhook_port: WEBHOOK_PORT,
            health_port: HEALTH_PORT,
            shutdown_grace_period: Duration::from_secs(SHUTDOWN_GRACE_PERIOD_SECS),
        }
    }
}

impl WebhookConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Unset keys fall back to defaults. Keys that are set but can't be
    /// parsed also fall back, with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            cert_path: lookup("WEBHOOK_CERT_PATH").unwrap_or(defaults.cert_path),
            key_path: lookup("WEBHOOK_KEY_PATH").unwrap_or(defaults.key_path),
            webhook_port: parse_or(&lookup, "WEBHOOK_PORT", defaults.webhook_port),
            health_port: parse_or(&lookup, "HEALTH_PORT", defaults.health_port),
            shutdown_grace_period: Duration::from_secs(parse_or(
                &lookup,
                "SHUTDOWN_GRACE_PERIOD_SECS",
                SHUTDOWN_GRACE_PERIOD_SECS,
            )),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key = key, value = %raw, default = %default, "Invalid value, using default");
            default
        }),
        None => default,
    }
}
