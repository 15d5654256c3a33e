//! Control plane reachability policy.
//!
//! Validates:
//! - Either a control plane endpoint host or a control plane load balancer
//!   is declared, otherwise nothing can reach the API server

use crate::crd::IBMVPCClusterSpec;
use crate::webhooks::field::{FieldError, FieldPath};

pub const UNREACHABLE_CONTROL_PLANE: &str =
    "one of control-plane endpoint or control-plane load balancer must be specified";

/// Validate that the control plane is reachable
pub fn validate(spec: &IBMVPCClusterSpec) -> Option<FieldError> {
    if spec.control_plane_endpoint.host.is_empty() && spec.control_plane_load_balancer.is_none() {
        // Attached to the object root, not to either field.
        return Some(FieldError::invalid(
            FieldPath::root(),
            "",
            UNREACHABLE_CONTROL_PLANE,
        ));
    }
    None
}
