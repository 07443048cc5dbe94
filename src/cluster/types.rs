use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::{Namespace, Pod};
use kube::ResourceExt;

/// Label the Job controller puts on every pod it creates.
pub const JOB_NAME_LABEL: &str = "job-name";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceInfo {
    pub name: String,
}

/// A batch Job as seen by the cleaner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobInfo {
    pub name: String,
    pub namespace: String,
    /// `status.succeeded`; a missing status counts as zero
    pub succeeded: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodInfo {
    pub name: String,
    pub namespace: String,
}

impl From<&Namespace> for NamespaceInfo {
    fn from(ns: &Namespace) -> Self {
        Self {
            name: ns.name_any(),
        }
    }
}

impl JobInfo {
    /// Build from an API object. `namespace` is the namespace the job was
    /// listed from, used when the object itself carries none.
    pub fn from_job(job: &Job, namespace: &str) -> Self {
        Self {
            name: job.name_any(),
            namespace: job.namespace().unwrap_or_else(|| namespace.to_string()),
            succeeded: job
                .status
                .as_ref()
                .and_then(|status| status.succeeded)
                .unwrap_or(0),
        }
    }

    /// Label selector matching the pods this job spawned
    pub fn pod_selector(&self) -> String {
        format!("{}={}", JOB_NAME_LABEL, self.name)
    }
}

impl PodInfo {
    pub fn from_pod(pod: &Pod, namespace: &str) -> Self {
        Self {
            name: pod.name_any(),
            namespace: pod.namespace().unwrap_or_else(|| namespace.to_string()),
        }
    }
}
