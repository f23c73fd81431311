//! Progress events.

use serde::Serialize;
use std::fmt;

/// Stage of a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncPhase {
    /// The dependency graph is being built.
    Resolving,
    /// Items are being written.
    Syncing,
    /// The run has finished.
    Complete,
    /// The run could not start.
    Error,
}

impl SyncPhase {
    /// Returns the lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            SyncPhase::Resolving => "resolving",
            SyncPhase::Syncing => "syncing",
            SyncPhase::Complete => "complete",
            SyncPhase::Error => "error",
        }
    }
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One progress event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncProgress {
    /// Current stage.
    pub phase: SyncPhase,
    /// Items handled so far, 1-based while syncing.
    pub current: usize,
    /// Items planned.
    pub total: usize,
    /// Identifier of the item about to be written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_item: Option<String>,
    /// Human-readable status line.
    pub message: String,
}

impl SyncProgress {
    /// Creates an event with no current item.
    pub fn new(phase: SyncPhase, current: usize, total: usize, message: impl Into<String>) -> Self {
        Self {
            phase,
            current,
            total,
            current_item: None,
            message: message.into(),
        }
    }

    /// Sets the current item.
    pub fn with_item(mut self, id: impl Into<String>) -> Self {
        self.current_item = Some(id.into());
        self
    }
}

/// Receives progress events synchronously, in order.
pub trait ProgressSink {
    /// Called once per event.
    fn on_progress(&mut self, progress: &SyncProgress);
}

impl<F: FnMut(&SyncProgress)> ProgressSink for F {
    fn on_progress(&mut self, progress: &SyncProgress) {
        self(progress)
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&mut self, _progress: &SyncProgress) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_sinks() {
        let mut seen = Vec::new();
        let mut sink = |p: &SyncProgress| seen.push(p.phase);
        sink.on_progress(&SyncProgress::new(SyncPhase::Syncing, 0, 2, "start"));
        sink.on_progress(&SyncProgress::new(SyncPhase::Complete, 2, 2, "done"));
        assert_eq!(seen, vec![SyncPhase::Syncing, SyncPhase::Complete]);
    }

    #[test]
    fn progress_json_shape() {
        let event = SyncProgress::new(SyncPhase::Syncing, 1, 3, "Syncing entry: e1").with_item("e1");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["phase"], "syncing");
        assert_eq!(json["currentItem"], "e1");

        let bare = serde_json::to_value(SyncProgress::new(SyncPhase::Complete, 3, 3, "done")).unwrap();
        assert!(bare.get("currentItem").is_none());
    }
}
