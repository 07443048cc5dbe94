pub mod discovery;
pub mod eligibility;
pub mod engine;
pub mod sweep;

pub use discovery::{Discovery, JobDiscovery};
pub use eligibility::EligibilityChecker;
pub use engine::{JobOutcome, PodOutcome, PodResult, ReclaimEngine, ReclaimResult};
pub use sweep::{JobCleaner, SweepSummary};
