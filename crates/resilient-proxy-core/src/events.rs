// crates/resilient-proxy-core/src/events.rs
// ============================================================================
// Module: Resilient Proxy Events
// Description: Event sink interface and reference sinks.
// Purpose: Report reactivations and generation outcomes without a global logger.
// Dependencies: serde, serde_json, std
// ============================================================================

//! ## Overview
//! Components that need to report warnings or failures take an injected
//! [`EventSink`]. The process owns the sink lifecycle; the core never installs
//! a global logger.
//! Invariants:
//! - Recording an event never fails the operation that emitted it.
//! - [`EventKind`] labels are stable for log consumers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::sync::Mutex;

use serde::Serialize;

// ============================================================================
// SECTION: Event Model
// ============================================================================

/// Severity attached to an [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    /// Informational progress record.
    Info,
    /// Recovered or degraded condition.
    Warn,
    /// Failure surfaced to the caller or counted at a batch boundary.
    Error,
}

impl Level {
    /// Returns a stable label for the level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Event classification.
///
/// # Invariants
/// - Variants are stable for log labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A transient failure triggered reactivation of the delegate.
    Reactivating,
    /// Discovery found no candidate instances for a contract.
    NoCandidates,
    /// A discovered candidate is about to be activated.
    Activating,
    /// A candidate failed to activate and was skipped.
    ActivationSkipped,
    /// A proxy source unit was generated for a contract.
    ContractGenerated,
    /// Generation failed for a contract.
    ContractFailed,
    /// On-disk output differs from freshly generated output.
    DriftDetected,
    /// A batch run finished.
    BatchCompleted,
}

impl EventKind {
    /// Returns a stable label for the event kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reactivating => "reactivating",
            Self::NoCandidates => "no_candidates",
            Self::Activating => "activating",
            Self::ActivationSkipped => "activation_skipped",
            Self::ContractGenerated => "contract_generated",
            Self::ContractFailed => "contract_failed",
            Self::DriftDetected => "drift_detected",
            Self::BatchCompleted => "batch_completed",
        }
    }
}

/// Single observable event.
///
/// # Invariants
/// - `contract` is `None` only for events not tied to one contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    /// Event severity.
    pub level: Level,
    /// Event classification.
    pub kind: EventKind,
    /// Contract the event concerns, when known.
    pub contract: Option<String>,
    /// Human-readable description.
    pub message: String,
}

impl Event {
    /// Creates an event without a contract.
    #[must_use]
    pub fn new(level: Level, kind: EventKind, message: impl Into<String>) -> Self {
        Self {
            level,
            kind,
            contract: None,
            message: message.into(),
        }
    }

    /// Creates an informational event.
    #[must_use]
    pub fn info(kind: EventKind, message: impl Into<String>) -> Self {
        Self::new(Level::Info, kind, message)
    }

    /// Creates a warning event.
    #[must_use]
    pub fn warn(kind: EventKind, message: impl Into<String>) -> Self {
        Self::new(Level::Warn, kind, message)
    }

    /// Creates an error event.
    #[must_use]
    pub fn error(kind: EventKind, message: impl Into<String>) -> Self {
        Self::new(Level::Error, kind, message)
    }

    /// Attaches the contract name to the event.
    #[must_use]
    pub fn with_contract(mut self, contract: impl Into<String>) -> Self {
        self.contract = Some(contract.into());
        self
    }
}

// ============================================================================
// SECTION: Sink Trait
// ============================================================================

/// Receives events from the retry engine, activation helpers, and generator.
pub trait EventSink: Send + Sync {
    /// Records an event. Implementations must not panic.
    fn record(&self, event: &Event);
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn record(&self, _event: &Event) {}
}

// ============================================================================
// SECTION: Log Sink
// ============================================================================

/// Writes one JSON object per event to the wrapped writer.
pub struct LogSink<W: Write + Send> {
    /// Output writer for log records.
    writer: Mutex<W>,
    /// Events below this level are dropped.
    min_level: Level,
}

impl<W: Write + Send> LogSink<W> {
    /// Creates a log sink that records every level.
    pub const fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
            min_level: Level::Info,
        }
    }

    /// Creates a log sink that drops events below `min_level`.
    pub const fn with_min_level(writer: W, min_level: Level) -> Self {
        Self {
            writer: Mutex::new(writer),
            min_level,
        }
    }

    /// Consumes the sink and returns the writer.
    ///
    /// # Errors
    ///
    /// Returns the writer wrapped in a poison error when a writer panicked.
    pub fn into_inner(self) -> Result<W, std::sync::PoisonError<W>> {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> EventSink for LogSink<W> {
    fn record(&self, event: &Event) {
        if event.level < self.min_level {
            return;
        }
        let Ok(mut guard) = self.writer.lock() else {
            return;
        };
        // Write failures are dropped.
        if serde_json::to_writer(&mut *guard, event).is_ok() {
            let _ = guard.write_all(b"\n");
        }
    }
}

// ============================================================================
// SECTION: Memory Sink
// ============================================================================

/// Collects events in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    /// Recorded events.
    events: Mutex<Vec<Event>>,
}

impl MemorySink {
    /// Creates an empty memory sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }

    /// Returns the recorded events of the given kind.
    #[must_use]
    pub fn events_of(&self, kind: EventKind) -> Vec<Event> {
        self.events().into_iter().filter(|event| event.kind == kind).collect()
    }
}

impl EventSink for MemorySink {
    fn record(&self, event: &Event) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
