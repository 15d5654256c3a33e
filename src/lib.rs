//! vpc-cluster-webhook library crate
//!
//! Admission webhooks for the IBMVPCCluster resource. The validating webhook
//! checks a cluster's control plane and network declaration for internal
//! consistency and denies it with every field error found; the defaulting
//! webhook passes requests through unchanged.

pub mod config;
pub mod crd;
pub mod error;
pub mod health;
pub mod webhooks;

pub use config::WebhookConfig;
pub use error::{Error, Result, WebhookError};
pub use health::HealthState;
pub use webhooks::{FieldError, FieldErrorKind, FieldPath, ValidationResult, run_webhook_server, validate};
