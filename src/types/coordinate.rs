// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use k8s_openapi::apimachinery::pkg::apis::meta::v1::APIResource;
use kube::core::GroupVersionKind;
use kube::discovery::ApiResource;
use serde::Serialize;
use std::fmt;

/// Whether instances of a resource live inside a namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ResourceScope {
    Namespaced,
    ClusterWide,
}

/// Fully qualified address of a resource kind on one cluster
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceCoordinate {
    /// API group, empty for the core group
    pub group: String,
    pub version: String,
    /// Plural, lower-case resource name as used in request paths
    pub resource: String,
    pub kind: String,
    pub scope: ResourceScope,
}

impl ResourceCoordinate {
    /// Build a coordinate from one entry of a discovery resource list
    pub fn from_discovery(group_version: &str, resource: &APIResource) -> Self {
        let (group, version) = split_api_version(group_version);
        ResourceCoordinate {
            group: group.to_string(),
            version: version.to_string(),
            resource: resource.name.clone(),
            kind: resource.kind.clone(),
            scope: if resource.namespaced {
                ResourceScope::Namespaced
            } else {
                ResourceScope::ClusterWide
            },
        }
    }

    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    pub fn is_namespaced(&self) -> bool {
        self.scope == ResourceScope::Namespaced
    }

    /// The dynamic type kube needs to address this resource
    pub fn api_resource(&self) -> ApiResource {
        ApiResource {
            group: self.group.clone(),
            version: self.version.clone(),
            api_version: self.api_version(),
            kind: self.kind.clone(),
            plural: self.resource.clone(),
        }
    }
}

impl fmt::Display for ResourceCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}.{}", self.resource, self.version)
        } else {
            write!(f, "{}.{}.{}", self.resource, self.version, self.group)
        }
    }
}

/// Split an apiVersion such as `apps/v1` or `v1` into group and version.
pub fn split_api_version(api_version: &str) -> (&str, &str) {
    match api_version.split_once('/') {
        Some((group, version)) => (group, version),
        None => ("", api_version),
    }
}

/// Cache key under which a resolved coordinate is stored
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KindKey {
    /// A human-level name: kind, plural, singular or short name, lower-cased
    Name(String),
    /// An exact apiVersion + kind pair, as declared by a manifest
    Gvk(GroupVersionKind),
}

impl KindKey {
    pub fn name(kind: &str) -> Self {
        KindKey::Name(kind.trim().to_ascii_lowercase())
    }

    pub fn gvk(api_version: &str, kind: &str) -> Self {
        let (group, version) = split_api_version(api_version);
        KindKey::Gvk(GroupVersionKind::gvk(group, version, kind))
    }
}

impl fmt::Display for KindKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KindKey::Name(name) => f.write_str(name),
            KindKey::Gvk(gvk) => write!(f, "{}/{}", gvk.api_version(), gvk.kind),
        }
    }
}
