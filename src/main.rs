//! vpc-cluster-webhook - admission webhooks for IBMVPCCluster resources.
//!
//! This is the main entry point that:
//! - Initializes structured logging
//! - Loads configuration from the environment
//! - Starts the health server and the TLS webhook server
//!
//! `vpc-cluster-webhook crdgen` prints the CRD as YAML and exits.

use std::path::Path;
use std::sync::Arc;

use kube::CustomResourceExt;
use tokio::signal;
use tokio::task::JoinError;
use tracing::{error, info};

use vpc_cluster_webhook::crd::IBMVPCCluster;
use vpc_cluster_webhook::health::{HealthState, run_health_server};
use vpc_cluster_webhook::{WebhookConfig, WebhookError, run_webhook_server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::args().nth(1).as_deref() == Some("crdgen") {
        print!("{}", serde_yaml::to_string(&IBMVPCCluster::crd())?);
        return Ok(());
    }

    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vpc_cluster_webhook=info".parse()?),
        )
        .json()
        .init();

    info!("Starting vpc-cluster-webhook");

    let config = WebhookConfig::from_env();
    info!(
        webhook_port = config.webhook_port,
        health_port = config.health_port,
        cert_path = %config.cert_path,
        "Loaded configuration"
    );

    if !Path::new(&config.cert_path).exists() || !Path::new(&config.key_path).exists() {
        error!(
            cert_path = %config.cert_path,
            key_path = %config.key_path,
            "Webhook certificates not found"
        );
        return Err(WebhookError::TlsConfig("webhook certificates not found".to_string()).into());
    }

    // Create shared health state
    let health_state = Arc::new(HealthState::new());

    // Start health server immediately so liveness probes pass during TLS setup
    let health_handle = {
        let health_state = health_state.clone();
        let port = config.health_port;
        tokio::spawn(async move {
            run_health_server(health_state, port)
                .await
                .map_err(WebhookError::Server)
        })
    };

    let webhook_handle = {
        let health_state = health_state.clone();
        let config = config.clone();
        tokio::spawn(async move { run_webhook_server(&config, health_state).await })
    };

    // Either server stopping ends the process, with a non-zero exit on failure
    tokio::select! {
        result = webhook_handle => server_exit("webhook", result)?,
        result = health_handle => server_exit("health", result)?,
        // Handle graceful shutdown on SIGTERM or SIGINT
        _ = shutdown_signal() => {
            info!("Received shutdown signal, initiating graceful shutdown...");

            // Mark as not ready so the API server stops routing requests here
            health_state.set_ready(false).await;
            info!("Marked webhook as not ready");

            info!(
                "Waiting {}s for in-flight admission requests to complete...",
                config.shutdown_grace_period.as_secs()
            );
            tokio::time::sleep(config.shutdown_grace_period).await;

            info!("Grace period complete, shutting down");
        }
    }

    info!("Webhook stopped");
    Ok(())
}

/// Flatten the outcome of a server task, logging why it stopped.
fn server_exit(
    server: &str,
    result: Result<Result<(), WebhookError>, JoinError>,
) -> Result<(), Box<dyn std::error::Error>> {
    match result {
        Ok(Ok(())) => {
            info!(server, "Server exited");
            Ok(())
        }
        Ok(Err(e)) => {
            error!(server, error = %e, "Server failed");
            Err(e.into())
        }
        Err(e) => {
            error!(server, error = %e, "Server task panicked");
            Err(e.into())
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
///
/// Note: Signal handler setup failures are fatal - the webhook cannot shut down
/// gracefully without them. Using expect() here is intentional.
#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
