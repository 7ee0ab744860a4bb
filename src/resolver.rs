// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Per-cluster cache mapping kind names to resource coordinates.
//!
//! Only successful resolutions are cached, so a kind that was missing is
//! looked up again on the next request. Misses are handled one at a time per
//! cluster; whoever waited on a miss re-checks the cache before scanning, so
//! concurrent misses for the same kind collapse into one discovery scan.

use crate::constants::discovery::{ATTEMPTS, RETRY_DELAY_MS};
use crate::error::{GatewayError, Result};
use crate::kubernetes::DiscoveryScan;
use crate::types::{KindKey, ResourceCoordinate};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

#[derive(Default)]
pub struct KindResolver {
    cache: RwLock<HashMap<KindKey, ResourceCoordinate>>,
    miss: Mutex<()>,
}

impl KindResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a human-level kind name (kind, plural, singular or short name).
    pub async fn resolve(&self, scan: &DiscoveryScan<'_>, kind: &str) -> Result<ResourceCoordinate> {
        self.resolve_key(scan, KindKey::name(kind), kind).await
    }

    /// Resolve the exact apiVersion/kind declared by a manifest.
    pub async fn resolve_declared(
        &self,
        scan: &DiscoveryScan<'_>,
        api_version: &str,
        kind: &str,
    ) -> Result<ResourceCoordinate> {
        self.resolve_key(scan, KindKey::gvk(api_version, kind), kind)
            .await
    }

    pub async fn cached(&self, key: &KindKey) -> Option<ResourceCoordinate> {
        self.cache.read().await.get(key).cloned()
    }

    async fn resolve_key(
        &self,
        scan: &DiscoveryScan<'_>,
        key: KindKey,
        attempted: &str,
    ) -> Result<ResourceCoordinate> {
        if let Some(coord) = self.cached(&key).await {
            return Ok(coord);
        }

        let _miss = self.miss.lock().await;
        if let Some(coord) = self.cached(&key).await {
            debug!("'{}' was resolved while waiting", key);
            return Ok(coord);
        }

        match self.scan(scan, &key).await? {
            Some(coord) => {
                info!("Resolved '{}' to {} on cluster '{}'", key, coord, scan.cluster());
                self.cache.write().await.insert(key, coord.clone());
                Ok(coord)
            }
            None => {
                self.cache.write().await.remove(&key);
                Err(GatewayError::ResourceKindUnmappable {
                    cluster: scan.cluster().to_string(),
                    kind: attempted.to_string(),
                })
            }
        }
    }

    async fn scan(
        &self,
        scan: &DiscoveryScan<'_>,
        key: &KindKey,
    ) -> Result<Option<ResourceCoordinate>> {
        let mut attempt = 1;
        loop {
            let result = match key {
                KindKey::Name(name) => scan.find_by_name(name).await,
                KindKey::Gvk(gvk) => scan.find_by_gvk(gvk).await,
            };
            match result {
                // Timeouts are not retried.
                Err(e @ GatewayError::Transport { .. }) if attempt < ATTEMPTS => {
                    warn!(
                        "Discovery for '{}' failed (attempt {}/{}): {}, retrying in {} ms...",
                        key, attempt, ATTEMPTS, e, RETRY_DELAY_MS
                    );
                    tokio::time::sleep(Duration::from_millis(RETRY_DELAY_MS)).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}
