//! # Manifest Errors

use crate::provider::ClusterError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to read manifest template {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk manifest directory {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Invalid manifest template {path}: {source}")]
    Template {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{0} manifests contain no releases")]
    NoReleases(String),

    #[error("{manifest} manifests do not contain release '{release}'")]
    UnknownRelease { manifest: String, release: String },

    #[error("Invalid resource document: {0}")]
    Resource(#[from] serde_yaml::Error),

    #[error(transparent)]
    Cluster(#[from] ClusterError),
}

impl ManifestError {
    /// True when the failure is a retryable cluster API error
    pub fn is_transient(&self) -> bool {
        matches!(self, ManifestError::Cluster(e) if e.is_transient())
    }
}
