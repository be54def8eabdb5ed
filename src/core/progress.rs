// ─── Progress & Cancellation ───
// The core only ever writes to a progress sink and polls a cancellation
// token; it never reads state back from the caller.

use std::sync::Mutex;

pub use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::core::error::{InstallerError, InstallerResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MessagePriority {
    Low,
    Normal,
    High,
}

/// Sink for human-readable install progress.
pub trait ProgressCallback: Send + Sync {
    fn start(&self, label: &str) {
        self.message(label, MessagePriority::Normal);
    }

    fn stage(&self, label: &str) {
        self.message(label, MessagePriority::Normal);
    }

    fn message(&self, text: &str, priority: MessagePriority);

    /// Fraction of the current phase, `0.0..=1.0`.
    fn progress(&self, _fraction: f64) {}

    fn info(&self, text: &str) {
        self.message(text, MessagePriority::Normal);
    }

    /// Emit a multi-line block one line at a time.
    fn lines(&self, text: &str) {
        for line in text.lines() {
            self.info(line);
        }
    }
}

/// Forwards every progress call to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressCallback for TracingProgress {
    fn start(&self, label: &str) {
        info!(target: "forge_wrapper_lib::progress", "== {}", label);
    }

    fn stage(&self, label: &str) {
        info!(target: "forge_wrapper_lib::progress", "-- {}", label);
    }

    fn message(&self, text: &str, priority: MessagePriority) {
        match priority {
            MessagePriority::Low => debug!(target: "forge_wrapper_lib::progress", "{}", text),
            MessagePriority::Normal => info!(target: "forge_wrapper_lib::progress", "{}", text),
            MessagePriority::High => warn!(target: "forge_wrapper_lib::progress", "{}", text),
        }
    }

    fn progress(&self, fraction: f64) {
        debug!(target: "forge_wrapper_lib::progress", progress = fraction);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Start(String),
    Stage(String),
    Message(String, MessagePriority),
    Progress(f64),
}

/// Keeps every event in memory, for front-ends that render the log later.
#[derive(Debug, Default)]
pub struct MemoryProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl MemoryProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Every textual event, in order.
    pub fn texts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ProgressEvent::Start(t) | ProgressEvent::Stage(t) => Some(t),
                ProgressEvent::Message(t, _) => Some(t),
                ProgressEvent::Progress(_) => None,
            })
            .collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.texts().iter().any(|t| t.contains(needle))
    }

    fn push(&self, event: ProgressEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl ProgressCallback for MemoryProgress {
    fn start(&self, label: &str) {
        self.push(ProgressEvent::Start(label.to_string()));
    }

    fn stage(&self, label: &str) {
        self.push(ProgressEvent::Stage(label.to_string()));
    }

    fn message(&self, text: &str, priority: MessagePriority) {
        self.push(ProgressEvent::Message(text.to_string(), priority));
    }

    fn progress(&self, fraction: f64) {
        self.push(ProgressEvent::Progress(fraction));
    }
}

/// Fail with [`InstallerError::Cancelled`] once `token` has been cancelled.
/// Polled between libraries and between processor steps.
pub fn check_cancelled(token: &CancellationToken) -> InstallerResult<()> {
    if token.is_cancelled() {
        return Err(InstallerError::Cancelled);
    }
    Ok(())
}
