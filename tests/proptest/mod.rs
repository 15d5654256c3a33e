// Test code is allowed to panic on failure
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

//! Property-based tests for vpc-cluster-webhook.
//!
//! Uses proptest to generate random cluster specs and verify the
//! validation invariants.

use proptest::prelude::*;

use vpc_cluster_webhook::crd::{
    APIEndpoint, Subnet, IBMVPCClusterSpec, VPCLoadBalancerSpec, VPCNetworkSpec,
};
use vpc_cluster_webhook::{FieldErrorKind, validate};

/// Strategy for optional strings, biased towards the "not provided" cases.
fn optional_string() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some(String::new())),
        "[a-z0-9-]{1,12}".prop_map(Some),
    ]
}

fn any_subnet() -> impl Strategy<Value = Subnet> {
    (optional_string(), optional_string(), optional_string()).prop_map(|(id, name, zone)| Subnet {
        id,
        name,
        cidr: None,
        zone,
    })
}

fn any_load_balancer() -> impl Strategy<Value = VPCLoadBalancerSpec> {
    "[a-z]{1,8}".prop_map(|name| VPCLoadBalancerSpec {
        name,
        ..Default::default()
    })
}

fn any_network() -> impl Strategy<Value = VPCNetworkSpec> {
    (
        prop::collection::vec(any_load_balancer(), 0..3),
        prop::collection::vec(any_subnet(), 0..6),
        prop::collection::vec(any_subnet(), 0..6),
    )
        .prop_map(
            |(load_balancers, control_plane_subnets, worker_subnets)| VPCNetworkSpec {
                load_balancers,
                control_plane_subnets,
                worker_subnets,
            },
        )
}

fn any_spec() -> impl Strategy<Value = IBMVPCClusterSpec> {
    (
        prop_oneof![Just(String::new()), "[a-z.]{1,16}"],
        prop::option::of(any_load_balancer()),
        prop::option::of(any_network()),
    )
        .prop_map(|(host, control_plane_load_balancer, network)| IBMVPCClusterSpec {
            control_plane_endpoint: APIEndpoint { host, port: 6443 },
            control_plane_load_balancer,
            network,
            ..Default::default()
        })
}

fn provided(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

/// Paths expected for the unlocatable subnets of one list.
fn expected_subnet_paths(subnets: &[Subnet], list: &str) -> Vec<String> {
    subnets
        .iter()
        .enumerate()
        .filter(|(_, s)| !provided(&s.id) && !provided(&s.zone))
        .map(|(i, _)| format!("spec.network.{list}[{i}].zone"))
        .collect()
}

proptest! {
    /// Property: Validation is deterministic.
    #[test]
    fn test_validation_deterministic(spec in any_spec()) {
        prop_assert_eq!(validate(&spec), validate(&spec));
    }

    /// Property: Unreachable control plane always yields the root Invalid
    /// error first, whatever the network holds.
    #[test]
    fn test_unreachable_control_plane(network in prop::option::of(any_network())) {
        let spec = IBMVPCClusterSpec { network, ..Default::default() };
        let result = validate(&spec);
        prop_assert!(!result.errors.is_empty());
        prop_assert_eq!(result.errors[0].kind, FieldErrorKind::Invalid);
        prop_assert!(result.errors[0].path.is_root());
    }

    /// Property: Without a network block there are no network errors.
    #[test]
    fn test_no_network_no_network_errors(spec in any_spec()) {
        let spec = IBMVPCClusterSpec { network: None, ..spec };
        let result = validate(&spec);
        prop_assert!(result.errors.iter().all(|e| e.path.is_root()));
        prop_assert!(result.errors.len() <= 1);
    }

    /// Property: The errors are exactly the reachability error, the load
    /// balancer error, then every unlocatable subnet in index order.
    #[test]
    fn test_errors_match_model(spec in any_spec()) {
        let mut expected = Vec::new();
        if spec.control_plane_endpoint.host.is_empty() && spec.control_plane_load_balancer.is_none() {
            expected.push(String::new());
        }
        if let Some(network) = &spec.network {
            if network.load_balancers.is_empty() {
                expected.push("spec.network.loadBalancers".to_string());
            }
            expected.extend(expected_subnet_paths(&network.control_plane_subnets, "controlPlaneSubnets"));
            expected.extend(expected_subnet_paths(&network.worker_subnets, "workerSubnets"));
        }

        let actual: Vec<String> = validate(&spec).errors.iter().map(|e| e.path.to_string()).collect();
        prop_assert_eq!(actual, expected);
    }

    /// Property: Every network-level error is Required.
    #[test]
    fn test_network_errors_are_required(network in any_network()) {
        let spec = IBMVPCClusterSpec {
            control_plane_endpoint: APIEndpoint { host: "api".to_string(), port: 6443 },
            network: Some(network),
            ..Default::default()
        };
        let result = validate(&spec);
        prop_assert!(result.errors.iter().all(|e| e.kind == FieldErrorKind::Required));
    }
}
