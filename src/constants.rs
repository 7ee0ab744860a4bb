// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Environment variables read by [`crate::config::Config`]
pub mod env {
    /// Comma-separated list of cluster (datacenter) identifiers
    pub const DATACENTERS: &str = "KUBEGATE_DATACENTERS";
    /// Directory holding one kubeconfig file per cluster
    pub const KUBECONFIG_DIR: &str = "KUBEGATE_KUBECONFIG_DIR";
    /// Suffix appended to the cluster id to form the kubeconfig file name
    pub const KUBECONFIG_SUFFIX: &str = "KUBEGATE_KUBECONFIG_SUFFIX";
    pub const REQUEST_TIMEOUT_SECS: &str = "KUBEGATE_REQUEST_TIMEOUT_SECS";
    pub const LIST_LIMIT: &str = "KUBEGATE_LIST_LIMIT";
}

pub const DEFAULT_KUBECONFIG_DIR: &str = "/etc/kubegate";
pub const DEFAULT_KUBECONFIG_SUFFIX: &str = ".kubeconfig";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Page size used when a List call does not ask for one
pub const DEFAULT_LIST_LIMIT: u32 = 100;

/// Namespace used when the caller leaves it empty
pub const DEFAULT_NAMESPACE: &str = "default";

/// Discovery retry configuration
pub mod discovery {
    /// Total scan attempts before a transport failure is reported
    pub const ATTEMPTS: u32 = 2;
    /// Pause between scan attempts in milliseconds
    pub const RETRY_DELAY_MS: u64 = 250;
}
