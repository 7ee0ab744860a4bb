// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("the '{0}' cluster was not found")]
    ClusterNotFound(String),

    #[error("resource kind '{kind}' cannot be mapped on cluster '{cluster}'")]
    ResourceKindUnmappable { cluster: String, kind: String },

    #[error("{}", decode_message(.message, .line, .column))]
    Decode {
        message: String,
        line: Option<usize>,
        column: Option<usize>,
    },

    #[error("{kind} '{name}' not found in cluster '{cluster}'")]
    NotFound {
        cluster: String,
        kind: String,
        name: String,
    },

    #[error("cluster '{cluster}' rejected the object: {message}")]
    Validation { cluster: String, message: String },

    #[error("request to cluster '{cluster}' failed: {source}")]
    Transport {
        cluster: String,
        #[source]
        source: kube::Error,
    },

    #[error("request to cluster '{cluster}' timed out after {after:?}")]
    Timeout { cluster: String, after: Duration },

    #[error("Failed to load kubeconfig: {0}")]
    Kubeconfig(String),
}

fn decode_message(message: &str, line: &Option<usize>, column: &Option<usize>) -> String {
    match (line, column) {
        (Some(line), Some(column)) => {
            format!("invalid manifest at line {line} column {column}: {message}")
        }
        _ => format!("invalid manifest: {message}"),
    }
}

/// The caller-facing category of a [`GatewayError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ClusterNotFound,
    ResourceKindUnmappable,
    DecodeError,
    NotFound,
    ValidationError,
    TransportError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::ClusterNotFound => "ClusterNotFound",
            ErrorKind::ResourceKindUnmappable => "ResourceKindUnmappable",
            ErrorKind::DecodeError => "DecodeError",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::ValidationError => "ValidationError",
            ErrorKind::TransportError => "TransportError",
        };
        f.write_str(name)
    }
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::ClusterNotFound(_) => ErrorKind::ClusterNotFound,
            GatewayError::ResourceKindUnmappable { .. } => ErrorKind::ResourceKindUnmappable,
            GatewayError::Decode { .. } => ErrorKind::DecodeError,
            GatewayError::NotFound { .. } => ErrorKind::NotFound,
            GatewayError::Validation { .. } => ErrorKind::ValidationError,
            GatewayError::Transport { .. }
            | GatewayError::Timeout { .. }
            | GatewayError::Kubeconfig(_) => ErrorKind::TransportError,
        }
    }

    /// HTTP status code a request layer would answer with.
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::ClusterNotFound | ErrorKind::NotFound => 404,
            ErrorKind::ResourceKindUnmappable | ErrorKind::DecodeError => 400,
            ErrorKind::ValidationError => 422,
            ErrorKind::TransportError => 502,
        }
    }

    /// The API status code if the cluster answered with an error response.
    pub(crate) fn api_code(&self) -> Option<u16> {
        match self {
            GatewayError::Transport {
                source: kube::Error::Api(resp),
                ..
            } => Some(resp.code),
            _ => None,
        }
    }

    pub(crate) fn decode(message: impl Into<String>) -> Self {
        GatewayError::Decode {
            message: message.into(),
            line: None,
            column: None,
        }
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
