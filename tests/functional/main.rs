// Test code is allowed to panic on failure
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

//! Functional tests for the admission endpoints.
//!
//! These drive the axum router in-process with real AdmissionReview
//! payloads, WITHOUT TLS or a Kubernetes cluster.
//!
//! ```bash
//! cargo test --test functional
//! ```

#[path = "../common/fixtures.rs"]
mod fixtures;


pub use admission::*;
