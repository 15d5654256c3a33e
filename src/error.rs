//! Error types for admission and for running the webhook server.

use thiserror::Error;

use crate::webhooks::field::FieldErrorList;

/// Error surfaced to the admission caller.
#[derive(Error, Debug)]
pub enum Error {
    /// The object failed validation. Carries every field error found.
    #[error("{kind}.{group} \"{name}\" is invalid: {}", format_errors(.errors))]
    Invalid {
        group: String,
        kind: String,
        name: String,
        errors: FieldErrorList,
    },

    /// The request could not be validated at all (wrong kind, no object).
    #[error("{0}")]
    BadRequest(String),
}

impl Error {
    /// Machine-readable reason for the admission response.
    pub fn reason(&self) -> &'static str {
        match self {
            Error::Invalid { .. } => "Invalid",
            Error::BadRequest(_) => "BadRequest",
        }
    }

    /// The field errors carried by an `Invalid` error.
    pub fn field_errors(&self) -> &[crate::webhooks::field::FieldError] {
        match self {
            Error::Invalid { errors, .. } => errors,
            Error::BadRequest(_) => &[],
        }
    }
}

fn format_errors(errors: &FieldErrorList) -> String {
    match errors.as_slice() {
        [single] => single.to_string(),
        many => format!(
            "[{}]",
            many.iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

/// Errors that can occur when running the webhook server
#[derive(Error, Debug)]
pub enum WebhookError {
    /// TLS configuration error
    #[error("TLS configuration error: {0}")]
    TlsConfig(String),

    /// Server error
    #[error("Webhook server error: {0}")]
    Server(#[from] std::io::Error),
}

/// Result type alias for admission operations
pub type Result<T> = std::result::Result<T, Error>;
