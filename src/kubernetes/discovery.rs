// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Scanning a cluster's discovery document for a resource kind.
//!
//! The core group is scanned first, then the named groups in lexicographic
//! order. Inside a group the preferred version is tried before the others.
//! The first match wins, which makes the choice deterministic when several
//! groups expose the same kind.

use super::client::bounded;
use crate::error::{GatewayError, Result};
use crate::types::ResourceCoordinate;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{APIGroup, APIResource, APIResourceList};
use kube::core::GroupVersionKind;
use kube::Client;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Discovery access to one cluster
pub struct DiscoveryScan<'a> {
    client: &'a Client,
    cluster: &'a str,
    timeout: Duration,
}

impl<'a> DiscoveryScan<'a> {
    pub fn new(client: &'a Client, cluster: &'a str, timeout: Duration) -> Self {
        Self {
            client,
            cluster,
            timeout,
        }
    }

    pub fn cluster(&self) -> &str {
        self.cluster
    }

    /// Find the resource whose kind, plural, singular or short name is `name`.
    #[instrument(skip(self), fields(cluster = %self.cluster))]
    pub async fn find_by_name(&self, name: &str) -> Result<Option<ResourceCoordinate>> {
        let wanted = name.trim().to_ascii_lowercase();

        let core = bounded(self.cluster, self.timeout, self.client.list_core_api_versions()).await?;
        for version in &core.versions {
            let resources = bounded(
                self.cluster,
                self.timeout,
                self.client.list_core_api_resources(version),
            )
            .await?;
            if let Some(coord) = find_in_list(&resources, |r| matches_name(r, &wanted)) {
                return Ok(Some(coord));
            }
        }

        let mut groups = bounded(self.cluster, self.timeout, self.client.list_api_groups())
            .await?
            .groups;
        groups.sort_by(|a, b| a.name.cmp(&b.name));

        // A group that fails to answer is skipped, but a miss is then not conclusive.
        let mut skipped: Option<GatewayError> = None;
        for group in &groups {
            for group_version in versions_by_preference(group) {
                let resources = match bounded(
                    self.cluster,
                    self.timeout,
                    self.client.list_api_group_resources(&group_version),
                )
                .await
                {
                    Ok(resources) => resources,
                    // A hung group would stall every group after it.
                    Err(e @ GatewayError::Timeout { .. }) => return Err(e),
                    Err(e) => {
                        warn!("Skipping {} during discovery: {}", group_version, e);
                        skipped = Some(e);
                        continue;
                    }
                };
                if let Some(coord) = find_in_list(&resources, |r| matches_name(r, &wanted)) {
                    return Ok(Some(coord));
                }
            }
        }

        match skipped {
            Some(e) => Err(e),
            None => {
                debug!("No resource named '{}' in {} groups", wanted, groups.len() + 1);
                Ok(None)
            }
        }
    }

    /// Find the resource for an exact apiVersion and kind.
    #[instrument(skip(self), fields(cluster = %self.cluster))]
    pub async fn find_by_gvk(&self, gvk: &GroupVersionKind) -> Result<Option<ResourceCoordinate>> {
        let group_version = gvk.api_version();
        let listed = if gvk.group.is_empty() {
            bounded(
                self.cluster,
                self.timeout,
                self.client.list_core_api_resources(&gvk.version),
            )
            .await
        } else {
            bounded(
                self.cluster,
                self.timeout,
                self.client.list_api_group_resources(&group_version),
            )
            .await
        };

        let resources = match listed {
            Ok(resources) => resources,
            Err(e) if e.api_code() == Some(404) => {
                debug!("Group version {} is not served", group_version);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        Ok(find_in_list(&resources, |r| {
            !is_subresource(r) && r.kind.eq_ignore_ascii_case(&gvk.kind)
        }))
    }
}

fn find_in_list(
    list: &APIResourceList,
    predicate: impl Fn(&APIResource) -> bool,
) -> Option<ResourceCoordinate> {
    list.resources
        .iter()
        .find(|r| predicate(r))
        .map(|r| ResourceCoordinate::from_discovery(&list.group_version, r))
}

fn is_subresource(resource: &APIResource) -> bool {
    resource.name.contains('/')
}

/// `wanted` must already be lower-case.
fn matches_name(resource: &APIResource, wanted: &str) -> bool {
    if is_subresource(resource) {
        return false;
    }
    resource.kind.eq_ignore_ascii_case(wanted)
        || resource.name.eq_ignore_ascii_case(wanted)
        || resource.singular_name.eq_ignore_ascii_case(wanted)
        || resource
            .short_names
            .as_ref()
            .is_some_and(|names| names.iter().any(|n| n.eq_ignore_ascii_case(wanted)))
}

/// Group versions with the preferred one first, the rest in server order.
fn versions_by_preference(group: &APIGroup) -> Vec<String> {
    let preferred = group
        .preferred_version
        .as_ref()
        .map(|v| v.group_version.clone());

    let mut ordered: Vec<String> = preferred.iter().cloned().collect();
    ordered.extend(
        group
            .versions
            .iter()
            .map(|v| v.group_version.clone())
            .filter(|gv| Some(gv) != preferred.as_ref()),
    );
    ordered
}
