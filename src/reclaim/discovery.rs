use std::sync::Arc;

use tracing::info;

use crate::{
    audit::{Action, AuditEvent, AuditSink, Outcome, ResourceKind},
    cluster::{ClusterClient, JobInfo},
    error::{CleanerError, Result},
    reclaim::eligibility::EligibilityChecker,
};

/// Jobs found eligible during one sweep, with enumeration counters
#[derive(Debug, Default)]
pub struct Discovery {
    pub namespaces_scanned: usize,
    pub empty_namespaces: Vec<String>,
    pub jobs_scanned: usize,
    pub skipped: Vec<JobInfo>,
    pub eligible: Vec<JobInfo>,
}

/// Walks namespaces and their jobs, selecting the ones to clean up
pub struct JobDiscovery {
    client: Arc<dyn ClusterClient>,
    sink: Arc<dyn AuditSink>,
    checker: EligibilityChecker,
}

impl JobDiscovery {
    pub fn new(client: Arc<dyn ClusterClient>, sink: Arc<dyn AuditSink>) -> Self {
        Self {
            client,
            sink,
            checker: EligibilityChecker::new(),
        }
    }

    /// Enumerate every namespace and job, returning the eligible jobs in the
    /// order the API returned them.
    ///
    /// Any listing failure aborts the whole discovery, as does a cluster
    /// without namespaces.
    pub async fn discover_eligible_jobs(&self) -> Result<Discovery> {
        let namespaces = match self.client.list_namespaces().await {
            Ok(namespaces) => namespaces,
            Err(e) => {
                self.sink.record(
                    &AuditEvent::new(
                        ResourceKind::Namespace,
                        None,
                        "*",
                        Action::List,
                        Outcome::Failed,
                    )
                    .with_detail(e.to_string()),
                );
                return Err(CleanerError::Enumeration {
                    scope: "namespaces".to_string(),
                    source: e,
                });
            }
        };

        if namespaces.is_empty() {
            self.sink.record(
                &AuditEvent::new(
                    ResourceKind::Namespace,
                    None,
                    "*",
                    Action::List,
                    Outcome::Empty,
                )
                .with_detail("no namespaces found in the cluster"),
            );
            return Err(CleanerError::EmptyCluster);
        }

        info!("Found {} namespaces", namespaces.len());

        let mut discovery = Discovery::default();

        for namespace in &namespaces {
            discovery.namespaces_scanned += 1;

            let jobs = match self.client.list_jobs(&namespace.name).await {
                Ok(jobs) => jobs,
                Err(e) => {
                    self.sink.record(
                        &AuditEvent::new(
                            ResourceKind::Namespace,
                            None,
                            &namespace.name,
                            Action::List,
                            Outcome::Failed,
                        )
                        .with_detail(format!("listing jobs failed: {}", e)),
                    );
                    return Err(CleanerError::Enumeration {
                        scope: format!("jobs in namespace {}", namespace.name),
                        source: e,
                    });
                }
            };

            if jobs.is_empty() {
                self.sink.record(
                    &AuditEvent::new(
                        ResourceKind::Namespace,
                        None,
                        &namespace.name,
                        Action::List,
                        Outcome::Empty,
                    )
                    .with_detail("no jobs in namespace, nothing to delete"),
                );
                discovery.empty_namespaces.push(namespace.name.clone());
                continue;
            }

            self.sink.record(
                &AuditEvent::new(
                    ResourceKind::Namespace,
                    None,
                    &namespace.name,
                    Action::List,
                    Outcome::Ok,
                )
                .with_detail(format!("{} jobs", jobs.len())),
            );

            for job in jobs {
                discovery.jobs_scanned += 1;
                self.check(job, &mut discovery);
            }
        }

        info!(
            "Discovery complete: {} of {} jobs eligible for cleanup",
            discovery.eligible.len(),
            discovery.jobs_scanned
        );

        Ok(discovery)
    }

    fn check(&self, job: JobInfo, discovery: &mut Discovery) {
        let eligible = self.checker.is_eligible(&job);
        let outcome = if eligible {
            Outcome::Eligible
        } else {
            Outcome::NotEligible
        };

        self.sink.record(
            &AuditEvent::new(
                ResourceKind::Job,
                Some(&job.namespace),
                &job.name,
                Action::CheckEligibility,
                outcome,
            )
            .with_detail(self.checker.eligibility_reason(&job)),
        );

        if eligible {
            discovery.eligible.push(job);
        } else {
            discovery.skipped.push(job);
        }
    }
}
