// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Typed projections of generic objects.
//!
//! The generic object stays the source of truth. A typed view is only
//! produced for kinds on a small allow-list, and a failed conversion falls
//! back to the generic object.

use super::coordinate::ResourceCoordinate;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use kube::api::DynamicObject;
use kube::core::TypeMeta;
use kube::ResourceExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

/// Kinds with a known typed representation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypedKind {
    Deployment,
    StatefulSet,
    DaemonSet,
}

impl TypedKind {
    fn for_coordinate(coord: &ResourceCoordinate) -> Option<Self> {
        if coord.group != "apps" || coord.version != "v1" {
            return None;
        }
        match coord.kind.as_str() {
            "Deployment" => Some(TypedKind::Deployment),
            "StatefulSet" => Some(TypedKind::StatefulSet),
            "DaemonSet" => Some(TypedKind::DaemonSet),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum TypedResource {
    Deployment(Box<Deployment>),
    StatefulSet(Box<StatefulSet>),
    DaemonSet(Box<DaemonSet>),
}

/// One resource as handed back to the caller
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ResourceView {
    Typed(TypedResource),
    Generic(DynamicObject),
}

impl ResourceView {
    pub fn name(&self) -> Option<&str> {
        match self {
            ResourceView::Typed(TypedResource::Deployment(d)) => d.metadata.name.as_deref(),
            ResourceView::Typed(TypedResource::StatefulSet(s)) => s.metadata.name.as_deref(),
            ResourceView::Typed(TypedResource::DaemonSet(d)) => d.metadata.name.as_deref(),
            ResourceView::Generic(obj) => obj.metadata.name.as_deref(),
        }
    }

    pub fn as_generic(&self) -> Option<&DynamicObject> {
        match self {
            ResourceView::Generic(obj) => Some(obj),
            ResourceView::Typed(_) => None,
        }
    }
}

/// First page of a List call
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceList {
    pub items: Vec<ResourceView>,
    /// Continuation token from the cluster, passed through unchanged
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continue_token: Option<String>,
}

/// Stamp apiVersion/kind from the coordinate when the cluster left them out,
/// which it does for list items.
pub fn with_type_meta(mut obj: DynamicObject, coord: &ResourceCoordinate) -> DynamicObject {
    if obj.types.is_none() {
        obj.types = Some(TypeMeta {
            api_version: coord.api_version(),
            kind: coord.kind.clone(),
        });
    }
    obj
}

/// Project a generic object into its typed view when the kind is recognized.
pub fn into_view(obj: DynamicObject, coord: &ResourceCoordinate) -> ResourceView {
    let obj = with_type_meta(obj, coord);
    let Some(kind) = TypedKind::for_coordinate(coord) else {
        return ResourceView::Generic(obj);
    };

    let converted = match kind {
        TypedKind::Deployment => convert::<Deployment>(&obj).map(TypedResource::Deployment),
        TypedKind::StatefulSet => convert::<StatefulSet>(&obj).map(TypedResource::StatefulSet),
        TypedKind::DaemonSet => convert::<DaemonSet>(&obj).map(TypedResource::DaemonSet),
    };

    match converted {
        Ok(typed) => ResourceView::Typed(typed),
        Err(e) => {
            warn!(
                "Returning {} '{}' untyped, conversion failed: {}",
                coord.kind,
                obj.name_any(),
                e
            );
            ResourceView::Generic(obj)
        }
    }
}

fn convert<K: DeserializeOwned>(obj: &DynamicObject) -> serde_json::Result<Box<K>> {
    serde_json::to_value(obj)
        .and_then(serde_json::from_value)
        .map(Box::new)
}
