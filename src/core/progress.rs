//! Run progress sink
//!
//! An append-only list of timestamped messages plus a percentage that only
//! moves forward. The orchestrator writes; hosts read by tailing the list or
//! watching the percentage.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;

/// One progress message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

/// Progress reporter shared between a run and its host
///
/// # Example
///
/// ```rust
/// use cell_import::core::progress::ProgressReporter;
///
/// let progress = ProgressReporter::new();
/// progress.log("Creating generations");
/// progress.set_percent(25);
/// progress.set_percent(10); // ignored, percentage never goes back
/// assert_eq!(progress.percent(), 25);
/// assert_eq!(progress.entries_since(0).len(), 1);
/// ```
pub struct ProgressReporter {
    entries: Mutex<Vec<ProgressEntry>>,
    percent: watch::Sender<u8>,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter {
    pub fn new() -> Self {
        let (percent, _) = watch::channel(0);
        Self {
            entries: Mutex::new(Vec::new()),
            percent,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ProgressEntry>> {
        // Entries are append-only; a poisoned list is still consistent
        self.entries.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Append a message
    pub fn log(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(progress = %message);
        self.lock().push(ProgressEntry {
            timestamp: Utc::now(),
            message,
        });
    }

    /// Raise the percentage; lower values are ignored
    pub fn set_percent(&self, percent: u8) {
        let percent = percent.min(100);
        self.percent.send_if_modified(|current| {
            if percent > *current {
                *current = percent;
                true
            } else {
                false
            }
        });
    }

    /// Current percentage
    pub fn percent(&self) -> u8 {
        *self.percent.borrow()
    }

    /// Watch percentage changes
    pub fn subscribe(&self) -> watch::Receiver<u8> {
        self.percent.subscribe()
    }

    /// All messages so far
    pub fn entries(&self) -> Vec<ProgressEntry> {
        self.lock().clone()
    }

    /// Messages appended after the first `index` ones
    pub fn entries_since(&self, index: usize) -> Vec<ProgressEntry> {
        self.lock().iter().skip(index).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
