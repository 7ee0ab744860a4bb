// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for client creation, discovery scanning, and manifest decoding.

pub mod client;
pub mod discovery;
pub mod manifest;

pub use client::{bounded, create_cluster_client, load_cluster_config};
pub use discovery::DiscoveryScan;
pub use manifest::decode_manifest;
