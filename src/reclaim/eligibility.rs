use crate::cluster::JobInfo;

/// Number of successful completions a job must report to be cleaned up.
///
/// Jobs reporting more than one are left alone as well.
pub const REQUIRED_SUCCEEDED: i32 = 1;

#[derive(Debug, Clone, Copy, Default)]
pub struct EligibilityChecker;

impl EligibilityChecker {
    pub fn new() -> Self {
        Self
    }

    /// A job is eligible iff `status.succeeded == 1`
    pub fn is_eligible(&self, job: &JobInfo) -> bool {
        job.succeeded == REQUIRED_SUCCEEDED
    }

    /// Human readable explanation of the decision
    pub fn eligibility_reason(&self, job: &JobInfo) -> String {
        match job.succeeded {
            REQUIRED_SUCCEEDED => "Job completed successfully".to_string(),
            0 => "Job not completed (status.succeeded = 0)".to_string(),
            n => format!(
                "Job reports {} successful completions (status.succeeded != {})",
                n, REQUIRED_SUCCEEDED
            ),
        }
    }
}
