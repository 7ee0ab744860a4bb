// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cluster client creation and bounded transport calls

use crate::config::ClusterSource;
use crate::error::{GatewayError, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::Client;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, instrument};

/// Build the client configuration for one cluster from its kubeconfig file.
/// Connect and read timeouts are set to `timeout`.
#[instrument(skip(source, timeout), fields(cluster = %source.id))]
pub async fn load_cluster_config(source: &ClusterSource, timeout: Duration) -> Result<kube::Config> {
    debug!(
        "Reading kubeconfig for cluster '{}' from {}",
        source.id,
        source.kubeconfig_path.display()
    );

    let kubeconfig = Kubeconfig::read_from(&source.kubeconfig_path).map_err(|e| {
        GatewayError::Kubeconfig(format!(
            "Failed to read {}: {}",
            source.kubeconfig_path.display(),
            e
        ))
    })?;

    let mut client_config =
        kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
            .await
            .map_err(|e| GatewayError::Kubeconfig(format!("Failed to create config: {}", e)))?;
    client_config.connect_timeout = Some(timeout);
    client_config.read_timeout = Some(timeout);
    Ok(client_config)
}

/// Create a Kubernetes client from a loaded configuration
pub fn create_cluster_client(client_config: kube::Config) -> Result<Client> {
    Client::try_from(client_config)
        .map_err(|e| GatewayError::Kubeconfig(format!("Failed to create client: {}", e)))
}

/// Await a call against `cluster`, giving up after `timeout`.
/// Dropping the returned future aborts the in-flight request.
pub async fn bounded<T, F>(cluster: &str, timeout: Duration, call: F) -> Result<T>
where
    F: Future<Output = kube::Result<T>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(source)) => Err(GatewayError::Transport {
            cluster: cluster.to_string(),
            source,
        }),
        Err(_) => Err(GatewayError::Timeout {
            cluster: cluster.to_string(),
            after: timeout,
        }),
    }
}
