//! Structured mount events
//!
//! The mount service records what happened to which namespace as typed
//! entries, not printf-style text. Tests and embedders query the log by
//! event kind.

use fs_types::NamespaceId;

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Debug information
    Debug,
    /// Informational messages
    Info,
    /// Warnings
    Warn,
    /// Errors
    Error,
}

/// What kind of lifecycle step an event records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountEventKind {
    /// A filesystem type was registered
    TypeRegistered,
    /// A filesystem type was unregistered
    TypeUnregistered,
    /// A namespace was mounted
    Mounted,
    /// A mount attempt failed and was rolled back
    MountFailed,
    /// A namespace was unmounted and reclaimed
    Unmounted,
}

/// One structured event
#[derive(Debug, Clone)]
pub struct MountEvent {
    /// Severity
    pub level: LogLevel,
    /// Lifecycle step
    pub kind: MountEventKind,
    /// The namespace involved, if one existed at that point
    pub namespace: Option<NamespaceId>,
    /// Human-readable detail (type name, error text)
    pub detail: String,
}

impl MountEvent {
    /// Creates a new event
    pub fn new(level: LogLevel, kind: MountEventKind, detail: impl Into<String>) -> Self {
        Self {
            level,
            kind,
            namespace: None,
            detail: detail.into(),
        }
    }

    /// Attaches the namespace the event refers to
    pub fn with_namespace(mut self, namespace: NamespaceId) -> Self {
        self.namespace = Some(namespace);
        self
    }
}

/// In-memory, append-only event log
#[derive(Debug, Default)]
pub struct EventLog {
    entries: Vec<MountEvent>,
}

impl EventLog {
    /// Creates an empty log
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends an event
    pub fn record(&mut self, event: MountEvent) {
        self.entries.push(event);
    }

    /// All events, in the order they were recorded
    pub fn entries(&self) -> &[MountEvent] {
        &self.entries
    }

    /// Number of events of one kind
    pub fn count_of(&self, kind: MountEventKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    /// The most recent event, if any
    pub fn latest(&self) -> Option<&MountEvent> {
        self.entries.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn test_event_builder() {
        let ns = NamespaceId::new();
        let event = MountEvent::new(LogLevel::Info, MountEventKind::Mounted, "s2fs")
            .with_namespace(ns);
        assert_eq!(event.kind, MountEventKind::Mounted);
        assert_eq!(event.namespace, Some(ns));
        assert_eq!(event.detail, "s2fs");
    }

    #[test]
    fn test_log_preserves_order_and_counts() {
        let mut log = EventLog::new();
        log.record(MountEvent::new(
            LogLevel::Info,
            MountEventKind::TypeRegistered,
            "s2fs",
        ));
        log.record(MountEvent::new(LogLevel::Info, MountEventKind::Mounted, "s2fs"));
        log.record(MountEvent::new(
            LogLevel::Error,
            MountEventKind::MountFailed,
            "out of node slots",
        ));

        assert_eq!(log.entries().len(), 3);
        assert_eq!(log.count_of(MountEventKind::Mounted), 1);
        assert_eq!(log.count_of(MountEventKind::Unmounted), 0);
        assert_eq!(log.latest().unwrap().kind, MountEventKind::MountFailed);
    }
}
