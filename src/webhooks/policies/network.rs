//! Network layout policy.
//!
//! Only enforced when `spec.network` is set.
//!
//! Validates:
//! - At least one load balancer is declared
//! - Every control plane subnet has an ID or a zone
//! - Every worker subnet has an ID or a zone

use crate::crd::{Subnet, IBMVPCClusterSpec};
use crate::webhooks::field::{FieldError, FieldErrorList, FieldPath};

pub const LOAD_BALANCER_REQUIRED: &str =
    "at least one load balancer must be specified when network is set";
pub const CONTROL_PLANE_SUBNET_ZONE_REQUIRED: &str =
    "zone is required for each control plane subnet if ID is not provided";
pub const WORKER_SUBNET_ZONE_REQUIRED: &str =
    "zone is required for each worker subnet if ID is not provided";

/// Validate the network block
pub fn validate(spec: &IBMVPCClusterSpec) -> FieldErrorList {
    let mut errors = FieldErrorList::new();
    let Some(network) = &spec.network else {
        return errors;
    };
    let path = FieldPath::new("spec").child("network");

    if network.load_balancers.is_empty() {
        errors.push(FieldError::required(
            path.clone().child("loadBalancers"),
            LOAD_BALANCER_REQUIRED,
        ));
    }

    errors.extend(validate_subnets(
        &network.control_plane_subnets,
        path.clone().child("controlPlaneSubnets"),
        CONTROL_PLANE_SUBNET_ZONE_REQUIRED,
    ));
    errors.extend(validate_subnets(
        &network.worker_subnets,
        path.child("workerSubnets"),
        WORKER_SUBNET_ZONE_REQUIRED,
    ));

    errors
}

/// One error per subnet lacking both ID and zone, in index order.
fn validate_subnets<'a>(
    subnets: &'a [Subnet],
    path: FieldPath,
    detail: &'static str,
) -> impl Iterator<Item = FieldError> + 'a {
    subnets
        .iter()
        .enumerate()
        .filter(|(_, subnet)| !subnet.is_locatable())
        .map(move |(i, _)| FieldError::required(path.clone().index(i).child("zone"), detail))
}
