//! IBMVPCCluster Custom Resource Definition.
//!
//! Describes the infrastructure of a cluster running in a VPC: where the
//! control plane is reachable and, optionally, which subnets and load
//! balancers make up its network. The admission webhook only checks the
//! declaration for internal consistency; nothing here is provisioned.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// API group of the IBMVPCCluster resource.
pub const VPC_CLUSTER_GROUP: &str = "infrastructure.cluster.x-k8s.io";

/// API version of the IBMVPCCluster resource.
pub const VPC_CLUSTER_VERSION: &str = "v1beta2";

/// Kind of the IBMVPCCluster resource.
pub const VPC_CLUSTER_KIND: &str = "IBMVPCCluster";

/// IBMVPCCluster describes the VPC infrastructure backing a workload cluster.
///
/// Example:
/// ```yaml
/// apiVersion: infrastructure.cluster.x-k8s.io/v1beta2
/// kind: IBMVPCCluster
/// metadata:
///   name: my-cluster
/// spec:
///   region: us-south
///   controlPlaneLoadBalancer:
///     name: my-cluster-lb
///   network:
///     loadBalancers:
///       - name: my-cluster-lb
///     controlPlaneSubnets:
///       - zone: us-south-1
///     workerSubnets:
///       - id: 0717-a1b2c3d4
/// ```
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "infrastructure.cluster.x-k8s.io",
    version = "v1beta2",
    kind = "IBMVPCCluster",
    plural = "ibmvpcclusters",
    shortname = "ibmvpcc",
    status = "IBMVPCClusterStatus",
    namespaced,
    printcolumn = r#"{"name":"Ready", "type":"boolean", "jsonPath":".status.ready"}"#,
    printcolumn = r#"{"name":"Endpoint", "type":"string", "jsonPath":".spec.controlPlaneEndpoint.host"}"#,
    printcolumn = r#"{"name":"Region", "type":"string", "jsonPath":".spec.region"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct IBMVPCClusterSpec {
    /// Region the cluster is deployed in.
    #[serde(default)]
    pub region: String,

    /// Default zone for resources that don't name one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,

    /// Resource group owning the cluster's cloud resources.
    #[serde(default)]
    pub resource_group: String,

    /// Name of the VPC to place the cluster in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vpc: Option<String>,

    /// Endpoint used to reach the API server.
    /// An empty host means the endpoint is not known yet.
    #[serde(default)]
    pub control_plane_endpoint: APIEndpoint,

    /// Load balancer fronting the control plane.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_plane_load_balancer: Option<VPCLoadBalancerSpec>,

    /// Network layout. When set, subnets and load balancers are checked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<VPCNetworkSpec>,
}

/// Host and port of an API endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct APIEndpoint {
    /// Hostname or IP address.
    #[serde(default)]
    pub host: String,

    /// Port the API server listens on.
    #[serde(default)]
    pub port: i32,
}

/// Load balancer declaration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VPCLoadBalancerSpec {
    /// Name of the load balancer.
    #[serde(default)]
    pub name: String,

    /// ID of an existing load balancer to adopt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Whether the load balancer is reachable from the internet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,

    /// Listeners in addition to the API server listener.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_listeners: Vec<AdditionalListenerSpec>,
}

/// Extra load balancer listener.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalListenerSpec {
    /// Listener port.
    pub port: i64,

    /// Listener protocol (tcp, http, https).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

/// Network layout of the cluster.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VPCNetworkSpec {
    /// Load balancers to create or adopt.
    #[serde(default)]
    pub load_balancers: Vec<VPCLoadBalancerSpec>,

    /// Subnets for control plane machines.
    #[serde(default)]
    pub control_plane_subnets: Vec<Subnet>,

    /// Subnets for worker machines.
    #[serde(default)]
    pub worker_subnets: Vec<Subnet>,
}

/// Subnet reference. Either `id` (existing subnet) or `zone` (new subnet)
/// must be set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Subnet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// IPv4 CIDR block for a new subnet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cidr: Option<String>,

    /// Availability zone for a new subnet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
}

impl Subnet {
    /// Subnet referencing an existing subnet by ID.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    /// Subnet to be created in the given zone.
    pub fn in_zone(zone: impl Into<String>) -> Self {
        Self {
            zone: Some(zone.into()),
            ..Default::default()
        }
    }

    /// Whether the subnet can be located, i.e. it has a non-empty ID or zone.
    pub fn is_locatable(&self) -> bool {
        is_provided(self.id.as_deref()) || is_provided(self.zone.as_deref())
    }
}

/// Absent and empty strings both count as "not provided".
pub fn is_provided(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

/// Status of a IBMVPCCluster.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IBMVPCClusterStatus {
    /// Whether the infrastructure is ready.
    #[serde(default)]
    pub ready: bool,

    /// Provisioning state of the control plane load balancer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_plane_load_balancer_state: Option<String>,
}
