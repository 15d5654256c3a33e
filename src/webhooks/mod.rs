//! Webhook module for IBMVPCCluster admission requests.
//!
//! - Validating webhook: runs every policy and denies with all field errors
//! - Defaulting webhook: registered for the type, never changes anything

pub mod field;
pub mod policies;
mod server;

pub use field::{FieldError, FieldErrorKind, FieldErrorList, FieldPath, PathSegment};
pub use policies::{ValidationContext, ValidationResult, validate, validate_all};
pub use server::{
    MUTATE_PATH, VALIDATE_PATH, WebhookState, create_webhook_router, mark_ready_when_listening,
    run_webhook_server,
};

// Re-export kube-rs admission types for contract testing
pub use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview, Operation};
