use std::sync::Arc;

use tracing::info;

use crate::{
    audit::{Action, AuditEvent, AuditSink, Outcome, ResourceKind},
    cluster::{ClusterClient, JobInfo, PodInfo},
    error::CleanerError,
};

/// What happened to one pod of a reclaimed job
#[derive(Debug)]
pub enum PodOutcome {
    Deleted,
    /// Dry run: would have been deleted
    Simulated,
    Failed(CleanerError),
}

#[derive(Debug)]
pub struct PodResult {
    pub pod: PodInfo,
    pub outcome: PodOutcome,
}

/// Terminal state of one eligible job
#[derive(Debug)]
pub enum JobOutcome {
    /// The job was deleted (or simulated) and its pods were attempted
    Reclaimed { pods: Vec<PodResult> },
    /// Deleting the job failed; its pods were left in place
    JobDeletionFailed(CleanerError),
    /// The job was deleted but its pods could not be listed
    PodListFailed(CleanerError),
}

/// Result of reclaiming one job
#[derive(Debug)]
pub struct ReclaimResult {
    pub job: JobInfo,
    pub dry_run: bool,
    pub outcome: JobOutcome,
}

impl ReclaimResult {
    /// Job removed (or simulated) and every pod handled without error
    pub fn is_complete(&self) -> bool {
        match &self.outcome {
            JobOutcome::Reclaimed { pods } => pods
                .iter()
                .all(|p| !matches!(p.outcome, PodOutcome::Failed(_))),
            _ => false,
        }
    }

    pub fn pods(&self) -> &[PodResult] {
        match &self.outcome {
            JobOutcome::Reclaimed { pods } => pods,
            _ => &[],
        }
    }

    pub fn error(&self) -> Option<&CleanerError> {
        match &self.outcome {
            JobOutcome::JobDeletionFailed(e) | JobOutcome::PodListFailed(e) => Some(e),
            JobOutcome::Reclaimed { .. } => None,
        }
    }
}

/// Deletes an eligible job and then the pods it spawned.
///
/// With `dry_run` set no delete call is issued, but pods are still listed so
/// the audit trail shows everything that would be removed.
pub struct ReclaimEngine {
    client: Arc<dyn ClusterClient>,
    sink: Arc<dyn AuditSink>,
    dry_run: bool,
}

impl ReclaimEngine {
    pub fn new(client: Arc<dyn ClusterClient>, sink: Arc<dyn AuditSink>, dry_run: bool) -> Self {
        Self {
            client,
            sink,
            dry_run,
        }
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Reclaim one job. Never fails as a whole: every failure is recorded
    /// in the returned outcome and the audit trail.
    pub async fn reclaim_job(&self, job: &JobInfo) -> ReclaimResult {
        info!(
            "Job {}/{} completed successfully, deleting it...",
            job.namespace, job.name
        );

        if let Err(e) = self.delete_job(job).await {
            return self.result(job, JobOutcome::JobDeletionFailed(e));
        }

        let outcome = match self.delete_job_pods(job).await {
            Ok(pods) => JobOutcome::Reclaimed { pods },
            Err(e) => JobOutcome::PodListFailed(e),
        };

        self.result(job, outcome)
    }

    /// Batch reclaim, one job at a time in the given order
    pub async fn reclaim_jobs(&self, jobs: &[JobInfo]) -> Vec<ReclaimResult> {
        let mut results = Vec::with_capacity(jobs.len());

        for job in jobs {
            results.push(self.reclaim_job(job).await);
        }

        results
    }

    fn result(&self, job: &JobInfo, outcome: JobOutcome) -> ReclaimResult {
        ReclaimResult {
            job: job.clone(),
            dry_run: self.dry_run,
            outcome,
        }
    }

    async fn delete_job(&self, job: &JobInfo) -> Result<(), CleanerError> {
        let event = |outcome| {
            AuditEvent::new(
                ResourceKind::Job,
                Some(&job.namespace),
                &job.name,
                Action::Delete,
                outcome,
            )
        };

        if self.dry_run {
            self.sink
                .record(&event(Outcome::Simulated).with_detail("dry run: would delete job"));
            return Ok(());
        }

        match self.client.delete_job(&job.namespace, &job.name).await {
            Ok(()) => {
                self.sink.record(&event(Outcome::Ok));
                Ok(())
            }
            Err(source) => {
                let err = CleanerError::Deletion {
                    namespace: job.namespace.clone(),
                    name: job.name.clone(),
                    source,
                };
                self.sink
                    .record(&event(Outcome::Failed).with_detail(err.to_string()));
                Err(err)
            }
        }
    }

    /// Delete all pods labelled with the job's name. Only a failure to list
    /// them is returned; individual pod failures are kept per pod.
    async fn delete_job_pods(&self, job: &JobInfo) -> Result<Vec<PodResult>, CleanerError> {
        info!("Listing pods of job {}/{}...", job.namespace, job.name);

        let selector = job.pod_selector();
        let pods = match self.client.list_pods(&job.namespace, &selector).await {
            Ok(pods) => pods,
            Err(source) => {
                let err = CleanerError::PodList {
                    namespace: job.namespace.clone(),
                    job: job.name.clone(),
                    source,
                };
                self.sink.record(
                    &AuditEvent::new(
                        ResourceKind::Pod,
                        Some(&job.namespace),
                        &selector,
                        Action::List,
                        Outcome::Failed,
                    )
                    .with_detail(err.to_string()),
                );
                return Err(err);
            }
        };

        if pods.is_empty() {
            self.sink.record(
                &AuditEvent::new(
                    ResourceKind::Pod,
                    Some(&job.namespace),
                    &selector,
                    Action::List,
                    Outcome::Empty,
                )
                .with_detail("no pods found, nothing to delete"),
            );
            return Ok(Vec::new());
        }

        self.sink.record(
            &AuditEvent::new(
                ResourceKind::Pod,
                Some(&job.namespace),
                &selector,
                Action::List,
                Outcome::Ok,
            )
            .with_detail(format!("{} pods", pods.len())),
        );

        let mut results = Vec::with_capacity(pods.len());
        for pod in pods {
            let outcome = self.delete_pod(&pod).await;
            results.push(PodResult { pod, outcome });
        }

        Ok(results)
    }

    async fn delete_pod(&self, pod: &PodInfo) -> PodOutcome {
        let event = |outcome| {
            AuditEvent::new(
                ResourceKind::Pod,
                Some(&pod.namespace),
                &pod.name,
                Action::Delete,
                outcome,
            )
        };

        if self.dry_run {
            self.sink
                .record(&event(Outcome::Simulated).with_detail("dry run: would delete pod"));
            return PodOutcome::Simulated;
        }

        match self.client.delete_pod(&pod.namespace, &pod.name).await {
            Ok(()) => {
                self.sink.record(&event(Outcome::Ok));
                PodOutcome::Deleted
            }
            Err(source) => {
                let err = CleanerError::PodDeletion {
                    namespace: pod.namespace.clone(),
                    name: pod.name.clone(),
                    source,
                };
                self.sink
                    .record(&event(Outcome::Failed).with_detail(err.to_string()));
                PodOutcome::Failed(err)
            }
        }
    }
}
