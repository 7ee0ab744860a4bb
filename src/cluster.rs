// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cluster connections and the registry built from configuration at startup.

use crate::config::{ClusterSource, Config};
use crate::error::{GatewayError, Result};
use crate::kubernetes::{create_cluster_client, load_cluster_config, DiscoveryScan};
use crate::resolver::KindResolver;
use crate::types::ResourceCoordinate;
use futures::future::join_all;
use kube::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// One reachable cluster: its client plus the kind cache that belongs to it
pub struct ClusterConnection {
    id: String,
    endpoint: String,
    client: Client,
    timeout: Duration,
    resolver: KindResolver,
}

impl ClusterConnection {
    pub fn new(id: impl Into<String>, endpoint: impl Into<String>, client: Client, timeout: Duration) -> Self {
        Self {
            id: id.into(),
            endpoint: endpoint.into(),
            client,
            timeout,
            resolver: KindResolver::new(),
        }
    }

    /// Connect to the cluster described by `source`
    pub async fn connect(source: &ClusterSource, timeout: Duration) -> Result<Self> {
        let client_config = load_cluster_config(source, timeout).await?;
        let endpoint = client_config.cluster_url.to_string();
        let client = create_cluster_client(client_config)?;
        Ok(Self::new(source.id.clone(), endpoint, client, timeout))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Upper bound applied to every call made to this cluster
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn discovery(&self) -> DiscoveryScan<'_> {
        DiscoveryScan::new(&self.client, &self.id, self.timeout)
    }

    /// Resolve a kind name against this cluster's API surface
    pub async fn resolve(&self, kind: &str) -> Result<ResourceCoordinate> {
        self.resolver.resolve(&self.discovery(), kind).await
    }

    /// Resolve the exact apiVersion/kind a manifest declares
    pub async fn resolve_declared(&self, api_version: &str, kind: &str) -> Result<ResourceCoordinate> {
        self.resolver
            .resolve_declared(&self.discovery(), api_version, kind)
            .await
    }
}

/// Read-only map of cluster id to connection, built once at startup
#[derive(Default)]
pub struct ClusterRegistry {
    entries: HashMap<String, ClusterConnection>,
}

impl ClusterRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_connections(connections: impl IntoIterator<Item = ClusterConnection>) -> Self {
        Self {
            entries: connections
                .into_iter()
                .map(|conn| (conn.id.clone(), conn))
                .collect(),
        }
    }

    /// Build the registry from configuration
    pub async fn from_config(config: &Config) -> Self {
        let sources = config.cluster_sources();
        Self::connect(&sources, config.request_timeout).await
    }

    /// Connect to every source concurrently. A cluster that cannot be
    /// connected is logged and left out.
    #[instrument(skip(sources, timeout), fields(clusters = sources.len()))]
    pub async fn connect(sources: &[ClusterSource], timeout: Duration) -> Self {
        if sources.is_empty() {
            warn!("No cluster was configured");
            return Self::empty();
        }

        let attempts = join_all(sources.iter().map(|source| async move {
            (source, ClusterConnection::connect(source, timeout).await)
        }))
        .await;

        let mut connections = Vec::new();
        for (source, attempt) in attempts {
            match attempt {
                Ok(conn) => {
                    info!("Loaded cluster '{}' ({})", conn.id(), conn.endpoint());
                    connections.push(conn);
                }
                Err(e) => warn!("Could not load cluster '{}': {}", source.id, e),
            }
        }

        Self::from_connections(connections)
    }

    pub fn lookup(&self, cluster: &str) -> Result<&ClusterConnection> {
        self.entries
            .get(cluster)
            .ok_or_else(|| GatewayError::ClusterNotFound(cluster.to_string()))
    }

    /// Registered cluster ids, sorted
    pub fn cluster_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
