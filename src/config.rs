// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{self, env as vars};
use anyhow::{Context, Result};
use std::env;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Where the connection material for one cluster lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterSource {
    pub id: String,
    pub kubeconfig_path: PathBuf,
}

/// Gateway configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Cluster identifiers to connect to; `None` means discover them from `kubeconfig_dir`
    pub datacenters: Option<Vec<String>>,
    pub kubeconfig_dir: PathBuf,
    pub kubeconfig_suffix: String,
    /// Upper bound for every call made to a cluster
    pub request_timeout: Duration,
    /// Page size for List when the caller gives none
    pub list_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            datacenters: None,
            kubeconfig_dir: PathBuf::from(constants::DEFAULT_KUBECONFIG_DIR),
            kubeconfig_suffix: constants::DEFAULT_KUBECONFIG_SUFFIX.to_string(),
            request_timeout: Duration::from_secs(constants::DEFAULT_REQUEST_TIMEOUT_SECS),
            list_limit: constants::DEFAULT_LIST_LIMIT,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();

        let datacenters = lookup(vars::DATACENTERS).map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect()
        });

        let kubeconfig_dir = lookup(vars::KUBECONFIG_DIR)
            .map(PathBuf::from)
            .unwrap_or(defaults.kubeconfig_dir);
        let kubeconfig_suffix = lookup(vars::KUBECONFIG_SUFFIX).unwrap_or(defaults.kubeconfig_suffix);

        let request_timeout = match lookup(vars::REQUEST_TIMEOUT_SECS) {
            Some(raw) => Duration::from_secs(
                raw.trim()
                    .parse()
                    .with_context(|| format!("{} must be a number of seconds, got '{}'", vars::REQUEST_TIMEOUT_SECS, raw))?,
            ),
            None => defaults.request_timeout,
        };

        let list_limit = match lookup(vars::LIST_LIMIT) {
            Some(raw) => raw
                .trim()
                .parse::<NonZeroU32>()
                .with_context(|| format!("{} must be a positive number, got '{}'", vars::LIST_LIMIT, raw))?
                .get(),
            None => defaults.list_limit,
        };

        Ok(Config {
            datacenters,
            kubeconfig_dir,
            kubeconfig_suffix,
            request_timeout,
            list_limit,
        })
    }

    /// Resolve the configured clusters to kubeconfig locations.
    /// An unreadable directory yields no clusters rather than an error.
    pub fn cluster_sources(&self) -> Vec<ClusterSource> {
        let ids = match &self.datacenters {
            Some(ids) => ids.clone(),
            None => match cluster_ids_in_dir(&self.kubeconfig_dir, &self.kubeconfig_suffix) {
                Ok(ids) => ids,
                Err(e) => {
                    warn!(
                        "Could not list kubeconfig directory {}: {}",
                        self.kubeconfig_dir.display(),
                        e
                    );
                    Vec::new()
                }
            },
        };

        ids.into_iter()
            .map(|id| ClusterSource {
                kubeconfig_path: self
                    .kubeconfig_dir
                    .join(format!("{}{}", id, self.kubeconfig_suffix)),
                id,
            })
            .collect()
    }
}

/// List the cluster ids for which `dir` holds a `<id><suffix>` file, sorted.
pub fn cluster_ids_in_dir(dir: &Path, suffix: &str) -> std::io::Result<Vec<String>> {
    let mut ids = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if let Some(id) = name.strip_suffix(suffix) {
            if !id.is_empty() {
                ids.push(id.to_string());
            }
        }
    }
    ids.sort();
    Ok(ids)
}
