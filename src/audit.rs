//! Audit trail of a sweep.
//!
//! Every enumeration step, eligibility decision and deletion attempt is
//! recorded as one [`AuditEvent`] before the sweep moves on. The process keeps
//! no other state, so this is what an operator reads to find out which jobs
//! and pods were left in place.

use std::fmt;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Namespace,
    Job,
    Pod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    CheckEligibility,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Empty,
    Eligible,
    NotEligible,
    /// Dry run: the delete call was not issued
    Simulated,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    pub kind: ResourceKind,
    pub namespace: Option<String>,
    pub name: String,
    pub action: Action,
    pub outcome: Outcome,
    pub detail: Option<String>,
}

impl AuditEvent {
    pub fn new(
        kind: ResourceKind,
        namespace: Option<&str>,
        name: &str,
        action: Action,
        outcome: Outcome,
    ) -> Self {
        Self {
            kind,
            namespace: namespace.map(str::to_string),
            name: name.to_string(),
            action,
            outcome,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Namespace => write!(f, "namespace"),
            ResourceKind::Job => write!(f, "job"),
            ResourceKind::Pod => write!(f, "pod"),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::List => write!(f, "list"),
            Action::CheckEligibility => write!(f, "check-eligibility"),
            Action::Delete => write!(f, "delete"),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Ok => write!(f, "ok"),
            Outcome::Empty => write!(f, "empty"),
            Outcome::Eligible => write!(f, "eligible"),
            Outcome::NotEligible => write!(f, "not-eligible"),
            Outcome::Simulated => write!(f, "simulated"),
            Outcome::Failed => write!(f, "failed"),
        }
    }
}

/// Append-only destination for audit events
pub trait AuditSink: Send + Sync {
    fn record(&self, event: &AuditEvent);
}

/// Writes each event as a structured `tracing` event
#[derive(Debug, Clone, Default)]
pub struct TracingSink;

impl AuditSink for TracingSink {
    fn record(&self, event: &AuditEvent) {
        let namespace = event.namespace.as_deref().unwrap_or("-");
        let detail = event.detail.as_deref().unwrap_or("");

        if event.outcome == Outcome::Failed {
            warn!(
                kind = %event.kind,
                namespace,
                name = %event.name,
                action = %event.action,
                outcome = %event.outcome,
                "{}",
                detail
            );
        } else {
            info!(
                kind = %event.kind,
                namespace,
                name = %event.name,
                action = %event.action,
                outcome = %event.outcome,
                "{}",
                detail
            );
        }
    }
}

/// Keeps events in memory, for asserting on the audit trail in tests
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemorySink {
    events: std::sync::Mutex<Vec<AuditEvent>>,
}

#[cfg(test)]
impl MemorySink {
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn find(&self, kind: ResourceKind, name: &str, action: Action) -> Vec<AuditEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.kind == kind && e.name == name && e.action == action)
            .collect()
    }
}

#[cfg(test)]
impl AuditSink for MemorySink {
    fn record(&self, event: &AuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_builder() {
        let event = AuditEvent::new(
            ResourceKind::Pod,
            Some("ns-a"),
            "p1",
            Action::Delete,
            Outcome::Simulated,
        )
        .with_detail("would delete pod");

        assert_eq!(event.namespace.as_deref(), Some("ns-a"));
        assert_eq!(event.detail.as_deref(), Some("would delete pod"));
    }

    #[test]
    fn test_display_labels() {
        assert_eq!(Outcome::NotEligible.to_string(), "not-eligible");
        assert_eq!(Action::CheckEligibility.to_string(), "check-eligibility");
        assert_eq!(ResourceKind::Namespace.to_string(), "namespace");
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Run `f` under a plain-text subscriber and return what it logged
    fn capture_logs(f: impl FnOnce()) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();

        tracing::subscriber::with_default(subscriber, f);

        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_tracing_sink_fields_and_levels() {
        let logs = capture_logs(|| {
            TracingSink.record(
                &AuditEvent::new(
                    ResourceKind::Job,
                    Some("ns-a"),
                    "j1",
                    Action::Delete,
                    Outcome::Ok,
                )
                .with_detail("job deleted"),
            );
            TracingSink.record(
                &AuditEvent::new(
                    ResourceKind::Pod,
                    Some("ns-a"),
                    "p3",
                    Action::Delete,
                    Outcome::Failed,
                )
                .with_detail("connection refused"),
            );
        });

        let lines: Vec<&str> = logs.lines().collect();
        assert_eq!(lines.len(), 2, "unexpected output: {}", logs);

        let ok = lines[0];
        assert!(ok.contains("INFO"));
        assert!(ok.contains("kind=job"));
        assert!(ok.contains("namespace=") && ok.contains("ns-a"));
        assert!(ok.contains("name=j1"));
        assert!(ok.contains("action=delete"));
        assert!(ok.contains("outcome=ok"));
        assert!(ok.contains("job deleted"));

        let failed = lines[1];
        assert!(failed.contains("WARN"));
        assert!(!failed.contains("INFO"));
        assert!(failed.contains("kind=pod"));
        assert!(failed.contains("name=p3"));
        assert!(failed.contains("outcome=failed"));
        assert!(failed.contains("connection refused"));
    }

    #[test]
    fn test_tracing_sink_without_namespace() {
        let logs = capture_logs(|| {
            TracingSink.record(&AuditEvent::new(
                ResourceKind::Namespace,
                None,
                "ns-b",
                Action::List,
                Outcome::Empty,
            ));
        });

        assert!(logs.contains("INFO"));
        assert!(logs.contains("kind=namespace"));
        assert!(logs.contains("outcome=empty"));
    }

    #[test]
    fn test_memory_sink_keeps_order() {
        let sink = MemorySink::default();
        sink.record(&AuditEvent::new(
            ResourceKind::Job,
            Some("ns-a"),
            "j1",
            Action::Delete,
            Outcome::Ok,
        ));
        sink.record(&AuditEvent::new(
            ResourceKind::Pod,
            Some("ns-a"),
            "p1",
            Action::Delete,
            Outcome::Ok,
        ));

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, ResourceKind::Job);
        assert_eq!(sink.find(ResourceKind::Pod, "p1", Action::Delete).len(), 1);
    }
}
