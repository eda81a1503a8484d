//! Admission filter applied to every fetched transaction

use chrono::{DateTime, Utc};

use crate::types::TransactionRecord;

/// Result of running a record through the filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    Admit,
    /// Execution failed on chain
    DropFailed,
    /// Block time precedes process start (or is unknown)
    DropBeforeStart,
}

impl FilterDecision {
    pub fn is_admitted(self) -> bool {
        self == FilterDecision::Admit
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FilterDecision::Admit => "admit",
            FilterDecision::DropFailed => "failed",
            FilterDecision::DropBeforeStart => "before_start",
        }
    }
}

/// Decide whether a record proceeds to classification.
///
/// Rules are applied in order: failed executions are dropped, then records
/// older than `process_start` unless `backfill` is set. A record without a
/// block time is treated as older than `process_start`.
pub fn admit(record: &TransactionRecord, process_start: DateTime<Utc>, backfill: bool) -> FilterDecision {
    if !record.success {
        return FilterDecision::DropFailed;
    }

    if !backfill {
        match record.block_date() {
            Some(date) if date >= process_start => {}
            _ => return FilterDecision::DropBeforeStart,
        }
    }

    FilterDecision::Admit
}
