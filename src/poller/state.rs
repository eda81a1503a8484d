//! Polling state carried from one tick to the next

use chrono::{DateTime, Utc};

/// Cursor and start-time snapshot, owned by the single polling task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollingState {
    /// Newest signature already handled; fetches stop at it
    cursor: Option<String>,
    /// Taken once at launch; older sales are not notified
    process_start: DateTime<Utc>,
    ticks: u64,
}

impl PollingState {
    pub fn new(process_start: DateTime<Utc>) -> Self {
        Self {
            cursor: None,
            process_start,
            ticks: 0,
        }
    }

    pub fn starting_now() -> Self {
        Self::new(Utc::now())
    }

    /// Resume after a known signature
    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    pub fn process_start(&self) -> DateTime<Utc> {
        self.process_start
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Move the cursor to the newest signature of a processed batch
    pub(crate) fn advance(&mut self, newest: &str) {
        if !newest.is_empty() {
            self.cursor = Some(newest.to_string());
        }
    }

    pub(crate) fn begin_tick(&mut self) -> u64 {
        self.ticks += 1;
        self.ticks
    }
}
