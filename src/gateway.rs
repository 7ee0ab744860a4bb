// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The three entry points a request layer calls.
//!
//! Each call looks up the cluster, resolves the kind on that cluster, then
//! runs the operation. A failure at any step is returned as is; nothing is
//! retried here because Create is not idempotent.

use crate::cluster::ClusterRegistry;
use crate::config::Config;
use crate::constants::DEFAULT_LIST_LIMIT;
use crate::error::{GatewayError, Result};
use crate::kubernetes::decode_manifest;
use crate::resources::{ListQuery, ResourceClient};
use crate::types::{into_view, ResourceList, ResourceView};
use kube::ResourceExt;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

#[derive(Clone)]
pub struct Gateway {
    registry: Arc<ClusterRegistry>,
    list_limit: u32,
}

impl Gateway {
    pub fn new(registry: Arc<ClusterRegistry>) -> Self {
        Self {
            registry,
            list_limit: DEFAULT_LIST_LIMIT,
        }
    }

    /// Connect to every configured cluster and build a gateway over them
    pub async fn from_config(config: &Config) -> Self {
        let registry = ClusterRegistry::from_config(config).await;
        Self::new(Arc::new(registry)).with_list_limit(config.list_limit)
    }

    pub fn with_list_limit(mut self, list_limit: u32) -> Self {
        self.list_limit = list_limit;
        self
    }

    pub fn registry(&self) -> &ClusterRegistry {
        &self.registry
    }

    #[instrument(skip(self, query))]
    pub async fn list_resources(
        &self,
        cluster: &str,
        kind: &str,
        namespace: &str,
        query: &ListQuery,
    ) -> Result<ResourceList> {
        let conn = self.registry.lookup(cluster)?;
        let coord = conn.resolve(kind).await?;
        debug!("Listing {}", coord);

        let list = ResourceClient::new(conn, self.list_limit)
            .list(&coord, namespace, query)
            .await?;

        Ok(ResourceList {
            items: list
                .items
                .into_iter()
                .map(|obj| into_view(obj, &coord))
                .collect(),
            continue_token: list.continue_token,
        })
    }

    #[instrument(skip(self))]
    pub async fn get_resource(
        &self,
        cluster: &str,
        kind: &str,
        namespace: &str,
        name: &str,
    ) -> Result<ResourceView> {
        let conn = self.registry.lookup(cluster)?;
        let coord = conn.resolve(kind).await?;

        let obj = ResourceClient::new(conn, self.list_limit)
            .get(&coord, namespace, name)
            .await?;
        Ok(into_view(obj, &coord))
    }

    /// Create the object in `manifest` and return its name.
    ///
    /// The kind is taken from the manifest's apiVersion/kind; `kind` is only
    /// compared against it. If the caller drops this future before it
    /// completes, the object may or may not exist: Get it to find out.
    #[instrument(skip(self, manifest), fields(bytes = manifest.len()))]
    pub async fn create_resource(
        &self,
        cluster: &str,
        kind: &str,
        namespace: &str,
        manifest: &[u8],
    ) -> Result<String> {
        let conn = self.registry.lookup(cluster)?;
        let payload = decode_manifest(manifest)?;
        let Some(types) = payload.types.clone() else {
            return Err(GatewayError::decode("manifest must declare both apiVersion and kind"));
        };

        let coord = conn.resolve_declared(&types.api_version, &types.kind).await?;
        if !kind.is_empty()
            && !kind.eq_ignore_ascii_case(&coord.kind)
            && !kind.eq_ignore_ascii_case(&coord.resource)
        {
            warn!(
                "Requested kind '{}' differs from manifest kind '{}' for '{}', using the manifest",
                kind,
                coord.kind,
                payload.name_any()
            );
        }

        ResourceClient::new(conn, self.list_limit)
            .create(&coord, namespace, payload)
            .await
    }
}
