use std::sync::Arc;

use chrono::{DateTime, Utc};
use colored::Colorize;
use tracing::info;

use crate::{
    audit::AuditSink,
    cluster::ClusterClient,
    error::Result,
    reclaim::{
        discovery::JobDiscovery,
        engine::{JobOutcome, PodOutcome, ReclaimEngine, ReclaimResult},
    },
    utils,
};

/// One full pass over the cluster: discover eligible jobs, then reclaim them
pub struct JobCleaner {
    discovery: JobDiscovery,
    engine: ReclaimEngine,
}

impl JobCleaner {
    pub fn new(client: Arc<dyn ClusterClient>, sink: Arc<dyn AuditSink>, dry_run: bool) -> Self {
        Self {
            discovery: JobDiscovery::new(client.clone(), sink.clone()),
            engine: ReclaimEngine::new(client, sink, dry_run),
        }
    }

    /// Delete every job with `status.succeeded == 1` in every namespace,
    /// together with its pods.
    ///
    /// Only enumeration failures are returned as errors; per-job failures
    /// end up in the summary.
    pub async fn run(&self) -> Result<SweepSummary> {
        let started_at = Utc::now();
        let discovery = self.discovery.discover_eligible_jobs().await?;

        if discovery.eligible.is_empty() {
            info!("No eligible jobs to clean up");
        } else {
            info!("Cleaning up {} eligible jobs", discovery.eligible.len());
        }

        let results = self.engine.reclaim_jobs(&discovery.eligible).await;

        let summary = SweepSummary {
            dry_run: self.engine.dry_run(),
            started_at,
            finished_at: Utc::now(),
            namespaces_scanned: discovery.namespaces_scanned,
            empty_namespaces: discovery.empty_namespaces.len(),
            jobs_scanned: discovery.jobs_scanned,
            jobs_skipped: discovery.skipped.len(),
            results,
        };

        info!(
            "Sweep complete: {} jobs reclaimed, {} failed, {} pods deleted, {} pods failed",
            summary.jobs_reclaimed(),
            summary.jobs_failed(),
            summary.pods_deleted(),
            summary.pods_failed()
        );

        Ok(summary)
    }
}

/// Outcome of one sweep
#[derive(Debug)]
pub struct SweepSummary {
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub namespaces_scanned: usize,
    pub empty_namespaces: usize,
    pub jobs_scanned: usize,
    pub jobs_skipped: usize,
    pub results: Vec<ReclaimResult>,
}

impl SweepSummary {
    pub fn jobs_eligible(&self) -> usize {
        self.results.len()
    }

    pub fn jobs_reclaimed(&self) -> usize {
        self.results.iter().filter(|r| r.is_complete()).count()
    }

    pub fn jobs_failed(&self) -> usize {
        self.results.iter().filter(|r| !r.is_complete()).count()
    }

    pub fn pods_deleted(&self) -> usize {
        self.count_pods(|o| matches!(o, PodOutcome::Deleted))
    }

    pub fn pods_simulated(&self) -> usize {
        self.count_pods(|o| matches!(o, PodOutcome::Simulated))
    }

    pub fn pods_failed(&self) -> usize {
        self.count_pods(|o| matches!(o, PodOutcome::Failed(_)))
    }

    fn count_pods(&self, pred: impl Fn(&PodOutcome) -> bool) -> usize {
        self.results
            .iter()
            .flat_map(|r| r.pods())
            .filter(|p| pred(&p.outcome))
            .count()
    }

    fn reclaimed_label(&self) -> &'static str {
        if self.dry_run {
            "Would Reclaim:"
        } else {
            "Reclaimed:"
        }
    }

    /// Print a formatted summary to console
    pub fn print_summary(&self, verbose: bool) {
        let title = if self.dry_run {
            "=== Job Cleanup Summary (DRY RUN) ==="
        } else {
            "=== Job Cleanup Summary ==="
        };
        println!("\n{}", title.cyan().bold());
        println!("Started:           {}", utils::format_timestamp(&self.started_at));
        println!(
            "Duration:          {}",
            utils::format_duration(self.finished_at - self.started_at)
        );
        println!(
            "Namespaces:        {} ({} without jobs)",
            self.namespaces_scanned, self.empty_namespaces
        );
        println!("Jobs Scanned:      {}", self.jobs_scanned);
        println!("Not Eligible:      {}", self.jobs_skipped);
        println!("Eligible:          {}", self.jobs_eligible());
        println!(
            "{:<19}{} ✓",
            self.reclaimed_label(),
            self.jobs_reclaimed().to_string().green()
        );
        println!("Failed:            {} ✗", self.jobs_failed().to_string().red());
        if self.dry_run {
            println!(
                "Pods To Delete:    {}",
                self.pods_simulated().to_string().yellow()
            );
        } else {
            println!("Pods Deleted:      {}", self.pods_deleted());
            println!("Pods Failed:       {}", self.pods_failed());
        }

        if verbose && !self.results.is_empty() {
            println!();
            utils::print_table_border(100);
            utils::print_table_row(&["Namespace", "Job", "Pods", "Status"], &[24, 36, 6, 28]);
            utils::print_table_border(100);
            for result in &self.results {
                let pods = result.pods().len().to_string();
                let status = status_label(result);
                utils::print_table_row(
                    &[
                        result.job.namespace.as_str(),
                        result.job.name.as_str(),
                        pods.as_str(),
                        status.as_str(),
                    ],
                    &[24, 36, 6, 28],
                );
            }
            utils::print_table_border(100);
        }

        for result in self.results.iter().filter(|r| !r.is_complete()) {
            if let Some(e) = result.error() {
                println!("{} {}", "✗".red(), e);
            }
            for pod in result.pods() {
                if let PodOutcome::Failed(e) = &pod.outcome {
                    println!("{} {}", "✗".red(), e);
                }
            }
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let jobs: Vec<serde_json::Value> = self
            .results
            .iter()
            .map(|result| {
                let pods: Vec<serde_json::Value> = result
                    .pods()
                    .iter()
                    .map(|p| {
                        let (status, error) = match &p.outcome {
                            PodOutcome::Deleted => ("deleted", None),
                            PodOutcome::Simulated => ("simulated", None),
                            PodOutcome::Failed(e) => ("failed", Some(e.to_string())),
                        };
                        serde_json::json!({
                            "name": p.pod.name,
                            "status": status,
                            "error": error,
                        })
                    })
                    .collect();

                serde_json::json!({
                    "namespace": result.job.namespace,
                    "name": result.job.name,
                    "status": status_label(result),
                    "error": result.error().map(|e| e.to_string()),
                    "pods": pods,
                })
            })
            .collect();

        serde_json::json!({
            "dry_run": self.dry_run,
            "started_at": self.started_at.to_rfc3339(),
            "finished_at": self.finished_at.to_rfc3339(),
            "namespaces_scanned": self.namespaces_scanned,
            "empty_namespaces": self.empty_namespaces,
            "jobs_scanned": self.jobs_scanned,
            "jobs_skipped": self.jobs_skipped,
            "jobs_eligible": self.jobs_eligible(),
            "jobs_reclaimed": self.jobs_reclaimed(),
            "jobs_failed": self.jobs_failed(),
            "pods_deleted": self.pods_deleted(),
            "pods_simulated": self.pods_simulated(),
            "pods_failed": self.pods_failed(),
            "jobs": jobs,
        })
    }
}

fn status_label(result: &ReclaimResult) -> String {
    match &result.outcome {
        JobOutcome::JobDeletionFailed(_) => "job deletion failed".to_string(),
        JobOutcome::PodListFailed(_) => "pod listing failed".to_string(),
        JobOutcome::Reclaimed { .. } if !result.is_complete() => "partially reclaimed".to_string(),
        JobOutcome::Reclaimed { .. } if result.dry_run => "would reclaim".to_string(),
        JobOutcome::Reclaimed { .. } => "reclaimed".to_string(),
    }
}
