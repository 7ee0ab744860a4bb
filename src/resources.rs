// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! List, Get and Create on resolved coordinates using generic objects.

use crate::cluster::ClusterConnection;
use crate::constants::DEFAULT_NAMESPACE;
use crate::error::{GatewayError, Result};
use crate::kubernetes::bounded;
use crate::types::view::with_type_meta;
use crate::types::ResourceCoordinate;
use kube::api::{DynamicObject, ListParams, PostParams};
use kube::{Api, ResourceExt};
use tracing::{debug, info, instrument};

/// Options for a List call
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    /// Passed to the cluster verbatim
    pub label_selector: Option<String>,
    /// Page size; the client default applies when unset
    pub limit: Option<u32>,
    /// Token returned by a previous List call
    pub continue_token: Option<String>,
}

impl ListQuery {
    pub fn with_labels(label_selector: &str) -> Self {
        Self {
            label_selector: Some(label_selector.to_string()),
            ..Default::default()
        }
    }
}

/// First page of generic objects
#[derive(Debug, Clone)]
pub struct GenericList {
    pub items: Vec<DynamicObject>,
    pub continue_token: Option<String>,
}

/// Generic resource operations against one cluster
pub struct ResourceClient<'a> {
    conn: &'a ClusterConnection,
    default_limit: u32,
}

impl<'a> ResourceClient<'a> {
    pub fn new(conn: &'a ClusterConnection, default_limit: u32) -> Self {
        Self {
            conn,
            default_limit,
        }
    }

    fn api(&self, coord: &ResourceCoordinate, namespace: &str) -> Api<DynamicObject> {
        let ar = coord.api_resource();
        let client = self.conn.client().clone();
        if coord.is_namespaced() {
            Api::namespaced_with(client, effective_namespace(namespace), &ar)
        } else {
            Api::all_with(client, &ar)
        }
    }

    /// Fetch the first page of objects. The namespace is ignored for cluster-wide kinds.
    #[instrument(skip(self, coord, query), fields(cluster = %self.conn.id(), resource = %coord))]
    pub async fn list(
        &self,
        coord: &ResourceCoordinate,
        namespace: &str,
        query: &ListQuery,
    ) -> Result<GenericList> {
        // A zero limit means "no limit" to the API server.
        let limit = query.limit.filter(|l| *l > 0).unwrap_or(self.default_limit);
        let mut params = ListParams::default().limit(limit);
        if let Some(selector) = query.label_selector.as_deref().filter(|s| !s.is_empty()) {
            params = params.labels(selector);
        }
        if let Some(token) = query.continue_token.as_deref().filter(|t| !t.is_empty()) {
            params = params.continue_token(token);
        }

        let list = bounded(
            self.conn.id(),
            self.conn.timeout(),
            self.api(coord, namespace).list(&params),
        )
        .await?;

        debug!("Listed {} {}", list.items.len(), coord.resource);
        Ok(GenericList {
            continue_token: list.metadata.continue_.filter(|t| !t.is_empty()),
            items: list
                .items
                .into_iter()
                .map(|obj| with_type_meta(obj, coord))
                .collect(),
        })
    }

    #[instrument(skip(self, coord), fields(cluster = %self.conn.id(), resource = %coord))]
    pub async fn get(
        &self,
        coord: &ResourceCoordinate,
        namespace: &str,
        name: &str,
    ) -> Result<DynamicObject> {
        match bounded(
            self.conn.id(),
            self.conn.timeout(),
            self.api(coord, namespace).get(name),
        )
        .await
        {
            Ok(obj) => Ok(with_type_meta(obj, coord)),
            Err(e) if e.api_code() == Some(404) => Err(GatewayError::NotFound {
                cluster: self.conn.id().to_string(),
                kind: coord.kind.clone(),
                name: name.to_string(),
            }),
            Err(e) => Err(e),
        }
    }

    /// Create `payload` and return the name the cluster gave it.
    ///
    /// For namespaced kinds the payload's own namespace wins over `namespace`.
    /// Server-populated metadata is dropped so that an object read back from
    /// the cluster can be created again.
    #[instrument(skip(self, coord, payload), fields(cluster = %self.conn.id(), resource = %coord))]
    pub async fn create(
        &self,
        coord: &ResourceCoordinate,
        namespace: &str,
        payload: DynamicObject,
    ) -> Result<String> {
        let mut obj = with_type_meta(payload, coord);
        clear_server_fields(&mut obj);

        let target_namespace = if coord.is_namespaced() {
            let declared = obj.metadata.namespace.clone().filter(|ns| !ns.is_empty());
            let target = declared.unwrap_or_else(|| effective_namespace(namespace).to_string());
            if !namespace.is_empty() && namespace != target {
                debug!(
                    "Manifest namespace '{}' overrides requested namespace '{}'",
                    target, namespace
                );
            }
            obj.metadata.namespace = Some(target.clone());
            target
        } else {
            obj.metadata.namespace = None;
            String::new()
        };

        let created = match bounded(
            self.conn.id(),
            self.conn.timeout(),
            self.api(coord, &target_namespace)
                .create(&PostParams::default(), &obj),
        )
        .await
        {
            Ok(created) => created,
            Err(GatewayError::Transport {
                cluster,
                source: kube::Error::Api(resp),
            }) if matches!(resp.code, 400 | 409 | 422) => {
                return Err(GatewayError::Validation {
                    cluster,
                    message: resp.message,
                })
            }
            Err(e) => return Err(e),
        };

        let name = created.name_any();
        info!("Created {} '{}'", coord.kind, name);
        Ok(name)
    }
}

/// Namespace to use when the caller gave none
pub fn effective_namespace(namespace: &str) -> &str {
    if namespace.is_empty() {
        DEFAULT_NAMESPACE
    } else {
        namespace
    }
}

fn clear_server_fields(obj: &mut DynamicObject) {
    let meta = &mut obj.metadata;
    meta.uid = None;
    meta.resource_version = None;
    meta.creation_timestamp = None;
    meta.managed_fields = None;
    meta.self_link = None;
    meta.generation = None;
}
