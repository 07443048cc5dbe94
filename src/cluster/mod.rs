pub mod auth;
pub mod client;
pub mod types;

pub use auth::{authenticate, ClientTimeouts};
pub use client::{ClusterClient, KubeClusterClient};
pub use types::{JobInfo, NamespaceInfo, PodInfo, JOB_NAME_LABEL};

#[cfg(test)]
pub use client::MockClusterClient;
