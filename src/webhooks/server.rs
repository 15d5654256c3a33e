//! Admission webhook server.
//!
//! Provides HTTP endpoints for Kubernetes admission webhooks.
//!
//! To enable webhooks:
//! 1. Deploy cert-manager for TLS certificates
//! 2. Create a ValidatingWebhookConfiguration and a MutatingWebhookConfiguration
//!    pointing at the paths below
//! 3. Mount the TLS certificate secret to the webhook pod at /etc/webhook/certs/

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use axum_server::Handle;
use axum_server::tls_rustls::RustlsConfig;
use kube::core::DynamicObject;
use kube::core::admission::{
    AdmissionRequest, AdmissionResponse, AdmissionReview, ConvertAdmissionReviewError, Operation,
};
use tracing::{debug, error, info, warn};

use crate::config::WebhookConfig;
use crate::crd::{VPC_CLUSTER_KIND, IBMVPCCluster};
use crate::error::{Error, WebhookError};
use crate::health::{AdmissionOutcome, HealthState};
use crate::webhooks::policies::{ValidationContext, validate_all};

/// Path of the validating webhook
pub const VALIDATE_PATH: &str = "/validate-infrastructure-cluster-x-k8s-io-v1beta2-ibmvpccluster";
/// Path of the defaulting webhook
pub const MUTATE_PATH: &str = "/mutate-infrastructure-cluster-x-k8s-io-v1beta2-ibmvpccluster";

/// Shared state for webhook handlers
pub struct WebhookState {
    pub health: Arc<HealthState>,
}

impl WebhookState {
    pub fn new(health: Arc<HealthState>) -> Self {
        Self { health }
    }
}

/// Response to send back plus what to record about it.
struct Decision {
    status: StatusCode,
    outcome: AdmissionOutcome,
    review: AdmissionReview<DynamicObject>,
}

impl Decision {
    fn allow(request: &AdmissionRequest<DynamicObject>) -> Self {
        Self {
            status: StatusCode::OK,
            outcome: AdmissionOutcome::Allowed,
            review: AdmissionResponse::from(request).into_review(),
        }
    }

    fn deny(
        request: &AdmissionRequest<DynamicObject>,
        outcome: AdmissionOutcome,
        err: &Error,
    ) -> Self {
        Self {
            status: StatusCode::OK,
            outcome,
            review: deny_with_reason(request, &err.to_string(), err.reason()),
        }
    }

    fn malformed(message: String) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            outcome: AdmissionOutcome::BadRequest,
            review: AdmissionResponse::invalid(message).into_review(),
        }
    }
}

/// Create a denial response with reason embedded in message.
/// kube-rs deny() only sets status.message, so we format as "[reason] message"
fn deny_with_reason(
    request: &AdmissionRequest<DynamicObject>,
    message: &str,
    reason: &str,
) -> AdmissionReview<DynamicObject> {
    let full_message = format!("[{}] {}", reason, message);
    AdmissionResponse::from(request)
        .deny(full_message)
        .into_review()
}

fn operation_label(operation: &Operation) -> &'static str {
    match operation {
        Operation::Create => "CREATE",
        Operation::Update => "UPDATE",
        Operation::Delete => "DELETE",
        Operation::Connect => "CONNECT",
    }
}

/// Decode a request body into the admission request it carries.
///
/// Bodies that are not JSON, are not an AdmissionReview, or carry no request
/// all come back as the message for an HTTP 400 response.
fn parse_request(body: &[u8]) -> Result<AdmissionRequest<DynamicObject>, String> {
    let review: AdmissionReview<DynamicObject> =
        serde_json::from_slice(body).map_err(|e| format!("Invalid AdmissionReview: {}", e))?;
    review
        .try_into()
        .map_err(|e: ConvertAdmissionReviewError| format!("Invalid AdmissionReview: {}", e))
}

/// Convert the untyped admission object into a IBMVPCCluster.
fn cast_object(request: &AdmissionRequest<DynamicObject>) -> Result<IBMVPCCluster, Error> {
    if request.kind.kind != VPC_CLUSTER_KIND {
        return Err(Error::BadRequest(format!(
            "expected a {} but got a {}",
            VPC_CLUSTER_KIND, request.kind.kind
        )));
    }
    let object = request
        .object
        .as_ref()
        .ok_or_else(|| Error::BadRequest("missing object in request".to_string()))?;
    serde_json::to_value(object)
        .and_then(serde_json::from_value)
        .map_err(|e| Error::BadRequest(format!("cannot decode {}: {}", VPC_CLUSTER_KIND, e)))
}

/// Create the webhook router
pub fn create_webhook_router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route(VALIDATE_PATH, post(validate_vpc_cluster))
        .route(MUTATE_PATH, post(default_vpc_cluster))
        .with_state(state)
}

/// Validating admission handler for IBMVPCCluster
async fn validate_vpc_cluster(
    State(state): State<Arc<WebhookState>>,
    body: Bytes,
) -> impl IntoResponse {
    let started = Instant::now();
    let (operation, decision) = match parse_request(&body) {
        Ok(request) => (operation_label(&request.operation), admit(&state, &request)),
        Err(message) => {
            error!(error = %message, "Failed to extract admission request");
            ("UNKNOWN", Decision::malformed(message))
        }
    };

    state.health.metrics.record_admission(
        operation,
        decision.outcome,
        started.elapsed().as_secs_f64(),
    );
    (decision.status, Json(decision.review))
}

fn admit(state: &WebhookState, request: &AdmissionRequest<DynamicObject>) -> Decision {
    let uid = &request.uid;
    debug!(
        uid = %uid,
        operation = ?request.operation,
        namespace = ?request.namespace,
        name = %request.name,
        "Processing admission request"
    );

    // DELETE operations are always allowed
    if request.operation == Operation::Delete {
        info!(uid = %uid, "Admission request allowed (DELETE)");
        return Decision::allow(request);
    }

    let cluster = match cast_object(request) {
        Ok(cluster) => cluster,
        Err(e) => {
            warn!(uid = %uid, error = %e, "Admission request rejected as bad request");
            return Decision::deny(request, AdmissionOutcome::BadRequest, &e);
        }
    };

    let ctx = ValidationContext {
        resource: &cluster,
        operation: request.operation.clone(),
    };

    match validate_all(&ctx) {
        Ok(()) => {
            info!(uid = %uid, "Admission request allowed");
            Decision::allow(request)
        }
        Err(e) => {
            let kinds = e.field_errors().iter().map(|f| &f.kind);
            state.health.metrics.record_field_errors(kinds);
            warn!(
                uid = %uid,
                errors = e.field_errors().len(),
                message = %e,
                "Admission request denied"
            );
            Decision::deny(request, AdmissionOutcome::Denied, &e)
        }
    }
}

/// Defaulting admission handler for IBMVPCCluster.
///
/// IBMVPCCluster has no defaults to apply, so every request is allowed
/// without a patch.
async fn default_vpc_cluster(body: Bytes) -> impl IntoResponse {
    let decision = match parse_request(&body) {
        Ok(request) => {
            debug!(uid = %request.uid, operation = ?request.operation, "Defaulting request passed through");
            Decision::allow(&request)
        }
        Err(message) => {
            error!(error = %message, "Failed to extract admission request");
            Decision::malformed(message)
        }
    };
    (decision.status, Json(decision.review))
}

/// Mark the webhook ready once the server behind `handle` accepts connections.
///
/// A server that fails to bind leaves readiness untouched.
pub async fn mark_ready_when_listening(handle: Handle, health: Arc<HealthState>) {
    match handle.listening().await {
        Some(addr) => {
            info!(addr = %addr, "Webhook server listening with TLS");
            health.set_ready(true).await;
        }
        None => warn!("Webhook server stopped before listening"),
    }
}

/// Run the webhook server with TLS
///
/// Serves the validating and defaulting endpoints on the configured port.
/// The health state is marked ready only after the listener is bound.
pub async fn run_webhook_server(
    config: &WebhookConfig,
    health: Arc<HealthState>,
) -> Result<(), WebhookError> {
    let tls = RustlsConfig::from_pem_file(
        PathBuf::from(&config.cert_path),
        PathBuf::from(&config.key_path),
    )
    .await
    .map_err(|e| WebhookError::TlsConfig(e.to_string()))?;

    let state = Arc::new(WebhookState::new(health.clone()));
    let app = create_webhook_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.webhook_port));
    info!(port = config.webhook_port, "Starting webhook server");

    let handle = Handle::new();
    tokio::spawn(mark_ready_when_listening(handle.clone(), health));

    axum_server::bind_rustls(addr, tls)
        .handle(handle)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
