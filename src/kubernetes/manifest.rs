// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Decoding single-document manifests into generic objects

use crate::error::{GatewayError, Result};
use kube::api::DynamicObject;
use serde_json::Value;

/// Decode a YAML or JSON manifest. The manifest must declare apiVersion and kind.
pub fn decode_manifest(bytes: &[u8]) -> Result<DynamicObject> {
    let value = if looks_like_json(bytes) {
        serde_json::from_slice::<Value>(bytes).map_err(|e| GatewayError::Decode {
            message: e.to_string(),
            line: Some(e.line()),
            column: Some(e.column()),
        })?
    } else {
        serde_yaml::from_slice::<Value>(bytes).map_err(|e| {
            let location = e.location();
            GatewayError::Decode {
                message: e.to_string(),
                line: location.as_ref().map(|l| l.line()),
                column: location.as_ref().map(|l| l.column()),
            }
        })?
    };

    if !value.is_object() {
        return Err(GatewayError::decode("manifest must be a single object"));
    }

    let obj: DynamicObject =
        serde_json::from_value(value).map_err(|e| GatewayError::decode(e.to_string()))?;

    match &obj.types {
        Some(types) if !types.api_version.is_empty() && !types.kind.is_empty() => Ok(obj),
        _ => Err(GatewayError::decode(
            "manifest must declare both apiVersion and kind",
        )),
    }
}

fn looks_like_json(bytes: &[u8]) -> bool {
    bytes
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|b| *b == b'{')
}
