//! Custom Resource Definitions (CRDs) for vpc-cluster-webhook.
//!
//! - `IBMVPCCluster`: VPC infrastructure backing a workload cluster

mod vpc_cluster;

pub use vpc_cluster::*;
