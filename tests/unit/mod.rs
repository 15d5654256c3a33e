// Test code is allowed to panic on failure
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

//! Unit tests for vpc-cluster-webhook.
//!
//! These tests run without a Kubernetes cluster and exercise the public
//! validation API with the scenarios an operator is most likely to hit.

#[path = "../common/fixtures.rs"]
mod fixtures;

mod scenario_tests {
    use super::fixtures::{NetworkBuilder, IBMVPCClusterBuilder, unlocated_subnet};
    use vpc_cluster_webhook::crd::Subnet;
    use vpc_cluster_webhook::{FieldErrorKind, validate};

    #[test]
    fn test_missing_endpoint_and_unlocated_subnet() {
        let spec = IBMVPCClusterBuilder::new("a")
            .network(
                NetworkBuilder::new()
                    .load_balancer("lb1")
                    .control_plane_subnet(unlocated_subnet())
                    .build(),
            )
            .spec();

        let result = validate(&spec);
        assert_eq!(result.errors.len(), 2);

        assert_eq!(result.errors[0].kind, FieldErrorKind::Invalid);
        assert!(result.errors[0].path.is_root());

        assert_eq!(result.errors[1].kind, FieldErrorKind::Required);
        assert_eq!(
            result.errors[1].path.to_string(),
            "spec.network.controlPlaneSubnets[0].zone"
        );
    }

    #[test]
    fn test_empty_load_balancers() {
        let spec = IBMVPCClusterBuilder::new("b")
            .control_plane_load_balancer("lb1")
            .network(
                NetworkBuilder::new()
                    .control_plane_subnet(Subnet::with_id("id"))
                    .worker_subnet(Subnet::with_id("id"))
                    .build(),
            )
            .spec();

        let result = validate(&spec);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, FieldErrorKind::Required);
        assert_eq!(
            result.errors[0].path.to_string(),
            "spec.network.loadBalancers"
        );
    }

    #[test]
    fn test_fully_specified_network() {
        let spec = IBMVPCClusterBuilder::new("c")
            .control_plane_load_balancer("lb1")
            .network(
                NetworkBuilder::new()
                    .load_balancer("lb1")
                    .control_plane_subnet(Subnet::with_id("id"))
                    .worker_subnet(Subnet::in_zone("z"))
                    .build(),
            )
            .spec();

        assert!(validate(&spec).is_allowed());
    }

    #[test]
    fn test_endpoint_without_network() {
        let spec = IBMVPCClusterBuilder::new("d").endpoint_host("host").spec();
        assert!(validate(&spec).is_allowed());
    }
}

mod aggregation_tests {
    use super::fixtures::{NetworkBuilder, IBMVPCClusterBuilder, unlocated_subnet, valid_cluster};
    use vpc_cluster_webhook::webhooks::{Operation, ValidationContext, validate_all};
    use vpc_cluster_webhook::{Error, validate};

    #[test]
    fn test_single_aggregate_failure() {
        let cluster = IBMVPCClusterBuilder::new("broken")
            .network(
                NetworkBuilder::new()
                    .control_plane_subnet(unlocated_subnet())
                    .worker_subnet(unlocated_subnet())
                    .worker_subnet(unlocated_subnet())
                    .build(),
            )
            .build();

        let ctx = ValidationContext {
            resource: &cluster,
            operation: Operation::Create,
        };
        let err = validate_all(&ctx).unwrap_err();
        match &err {
            Error::Invalid { name, errors, .. } => {
                assert_eq!(name, "broken");
                assert_eq!(errors.len(), 5);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let message = err.to_string();
        for path in [
            "spec.network.loadBalancers",
            "spec.network.controlPlaneSubnets[0].zone",
            "spec.network.workerSubnets[0].zone",
            "spec.network.workerSubnets[1].zone",
        ] {
            assert!(message.contains(path), "{path} missing from {message}");
        }
    }

    #[test]
    fn test_valid_cluster_admitted() {
        let cluster = valid_cluster("ok");
        for operation in [Operation::Create, Operation::Update, Operation::Delete] {
            let ctx = ValidationContext {
                resource: &cluster,
                operation,
            };
            assert!(validate_all(&ctx).is_ok());
        }
    }

    #[test]
    fn test_validation_is_idempotent() {
        let spec = IBMVPCClusterBuilder::new("again")
            .network(
                NetworkBuilder::new()
                    .control_plane_subnet(unlocated_subnet())
                    .build(),
            )
            .spec();
        assert_eq!(validate(&spec), validate(&spec));
    }
}

mod config_tests {
    use vpc_cluster_webhook::WebhookConfig;
    use vpc_cluster_webhook::config::{WEBHOOK_CERT_PATH, WEBHOOK_KEY_PATH};

    #[test]
    fn test_default_cert_paths() {
        let config = WebhookConfig::from_lookup(|_| None);
        assert_eq!(config.cert_path, WEBHOOK_CERT_PATH);
        assert_eq!(config.key_path, WEBHOOK_KEY_PATH);
    }
}
