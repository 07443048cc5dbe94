use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::{Namespace, Pod};
use kube::api::{Api, DeleteParams, ListParams};
use kube::Client;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

use crate::cluster::types::{JobInfo, NamespaceInfo, PodInfo};
use crate::error::ClientError;

/// Cluster operations the cleaner needs.
///
/// Implemented over `kube::Client` in production and mocked in tests.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// List every namespace in the cluster
    async fn list_namespaces(&self) -> Result<Vec<NamespaceInfo>, ClientError>;

    /// List every job in `namespace`
    async fn list_jobs(&self, namespace: &str) -> Result<Vec<JobInfo>, ClientError>;

    /// Delete the job `name` in `namespace`
    async fn delete_job(&self, namespace: &str, name: &str) -> Result<(), ClientError>;

    /// List pods in `namespace` matching `label_selector`
    async fn list_pods(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<PodInfo>, ClientError>;

    /// Delete the pod `name` in `namespace`
    async fn delete_pod(&self, namespace: &str, name: &str) -> Result<(), ClientError>;
}

/// `ClusterClient` backed by the Kubernetes API server.
///
/// Every call is bounded by `request_timeout`.
#[derive(Clone)]
pub struct KubeClusterClient {
    client: Client,
    request_timeout: Duration,
}

impl KubeClusterClient {
    pub fn new(client: Client, request_timeout: Duration) -> Self {
        Self {
            client,
            request_timeout,
        }
    }

    async fn bounded<T, F>(&self, operation: String, call: F) -> Result<T, ClientError>
    where
        F: Future<Output = Result<T, kube::Error>>,
    {
        match tokio::time::timeout(self.request_timeout, call).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(ClientError::Timeout {
                operation,
                after: self.request_timeout,
            }),
        }
    }
}

#[async_trait]
impl ClusterClient for KubeClusterClient {
    async fn list_namespaces(&self) -> Result<Vec<NamespaceInfo>, ClientError> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let list = self
            .bounded("list namespaces".to_string(), api.list(&ListParams::default()))
            .await?;

        Ok(list.items.iter().map(NamespaceInfo::from).collect())
    }

    async fn list_jobs(&self, namespace: &str) -> Result<Vec<JobInfo>, ClientError> {
        let api: Api<Job> = Api::namespaced(self.client.clone(), namespace);
        let list = self
            .bounded(
                format!("list jobs in {}", namespace),
                api.list(&ListParams::default()),
            )
            .await?;

        Ok(list
            .items
            .iter()
            .map(|job| JobInfo::from_job(job, namespace))
            .collect())
    }

    async fn delete_job(&self, namespace: &str, name: &str) -> Result<(), ClientError> {
        let api: Api<Job> = Api::namespaced(self.client.clone(), namespace);
        self.bounded(
            format!("delete job {}/{}", namespace, name),
            api.delete(name, &DeleteParams::default()),
        )
        .await?;

        debug!("Delete request accepted for job {}/{}", namespace, name);
        Ok(())
    }

    async fn list_pods(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<PodInfo>, ClientError> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let params = ListParams::default().labels(label_selector);
        let list = self
            .bounded(
                format!("list pods in {} ({})", namespace, label_selector),
                api.list(&params),
            )
            .await?;

        Ok(list
            .items
            .iter()
            .map(|pod| PodInfo::from_pod(pod, namespace))
            .collect())
    }

    async fn delete_pod(&self, namespace: &str, name: &str) -> Result<(), ClientError> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        self.bounded(
            format!("delete pod {}/{}", namespace, name),
            api.delete(name, &DeleteParams::default()),
        )
        .await?;

        debug!("Delete request accepted for pod {}/{}", namespace, name);
        Ok(())
    }
}
