use std::time::Duration;
use thiserror::Error;

/// Failure of a single call against the cluster API.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: String,
        after: Duration,
    },
}

#[derive(Error, Debug)]
pub enum CleanerError {
    #[error("Failed to authenticate to the cluster (in-cluster: {in_cluster}; kubeconfig: {kubeconfig})")]
    Auth {
        in_cluster: String,
        kubeconfig: String,
    },

    #[error("Failed to list {scope}: {source}")]
    Enumeration {
        scope: String,
        #[source]
        source: ClientError,
    },

    #[error("No namespaces found in the cluster")]
    EmptyCluster,

    #[error("Failed to delete job {namespace}/{name}: {source}")]
    Deletion {
        namespace: String,
        name: String,
        #[source]
        source: ClientError,
    },

    #[error("Failed to list pods of job {namespace}/{job}: {source}")]
    PodList {
        namespace: String,
        job: String,
        #[source]
        source: ClientError,
    },

    #[error("Failed to delete pod {namespace}/{name}: {source}")]
    PodDeletion {
        namespace: String,
        name: String,
        #[source]
        source: ClientError,
    },

    #[error("Interrupted, run aborted")]
    Interrupted,

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CleanerError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CleanerError::Interrupted => 130,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, CleanerError>;
