//! Validation policies for IBMVPCCluster admission webhooks.
//!
//! Every policy runs on every CREATE and UPDATE and all findings are
//! accumulated, so a rejected object reports all of its problems at once:
//! - Control plane: the API server must be reachable somehow
//! - Network: load balancers and subnets, only when a network is declared

pub mod control_plane;
pub mod network;

use kube::ResourceExt;
use kube::core::admission::Operation;

use crate::crd::{VPC_CLUSTER_GROUP, VPC_CLUSTER_KIND, IBMVPCCluster, IBMVPCClusterSpec};
use crate::error::{Error, Result};
use crate::webhooks::field::{FieldError, FieldErrorList};

/// Result of a validation run: the ordered list of field errors found.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub errors: FieldErrorList,
}

impl ValidationResult {
    /// Create an allowed result
    pub fn allowed() -> Self {
        Self::default()
    }

    /// Whether the object is admissible
    pub fn is_allowed(&self) -> bool {
        self.errors.is_empty()
    }

    /// Append the findings of one policy.
    pub fn extend(&mut self, errors: impl IntoIterator<Item = FieldError>) {
        self.errors.extend(errors);
    }

    /// Turn the findings into a single aggregate failure for the named object.
    pub fn into_result(self, name: &str) -> Result<()> {
        if self.errors.is_empty() {
            return Ok(());
        }
        Err(Error::Invalid {
            group: VPC_CLUSTER_GROUP.to_string(),
            kind: VPC_CLUSTER_KIND.to_string(),
            name: name.to_string(),
            errors: self.errors,
        })
    }
}

/// Context for validation
pub struct ValidationContext<'a> {
    /// The resource being validated (the new object on UPDATE)
    pub resource: &'a IBMVPCCluster,
    /// Admission operation
    pub operation: Operation,
}

/// Validate a cluster spec.
///
/// Pure and total: the same spec always yields the same errors in the same
/// order. Control-plane findings come first, then network findings.
pub fn validate(spec: &IBMVPCClusterSpec) -> ValidationResult {
    let mut result = ValidationResult::allowed();
    result.extend(control_plane::validate(spec));
    result.extend(network::validate(spec));
    result
}

/// Run all validation policies for an admission request
pub fn validate_all(ctx: &ValidationContext<'_>) -> Result<()> {
    match ctx.operation {
        Operation::Delete | Operation::Connect => Ok(()),
        Operation::Create | Operation::Update => {
            validate(&ctx.resource.spec).into_result(&ctx.resource.name_any())
        }
    }
}
