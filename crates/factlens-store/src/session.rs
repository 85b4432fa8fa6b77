//! Session metrics store.

use std::collections::VecDeque;

use chrono::{DateTime, Local, NaiveDate};
use factlens_core::{AnalysisRequest, ConsensusResult, InputKind, Verdict};
use serde::Serialize;
use tracing::debug;

use crate::stats::SessionStats;

/// One completed analysis as shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionMetricsEntry {
    /// Monotonic within a session, starting at 1.
    pub id: u64,
    pub created_at: DateTime<Local>,
    pub input_kind: InputKind,
    pub source_label: String,
    pub preview: String,
    /// `round(confidence × 100)`, in `0..=100`.
    pub score: u8,
    pub result: Verdict,
}

/// Append-only log of the analyses run in this session.
///
/// Entries are kept newest first and live only as long as the store.
#[derive(Debug, Default)]
pub struct SessionStore {
    entries: VecDeque<SessionMetricsEntry>,
    next_id: u64,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful analysis made at `at`.
    pub fn record(
        &mut self,
        request: &AnalysisRequest,
        result: &ConsensusResult,
        at: DateTime<Local>,
    ) -> &SessionMetricsEntry {
        self.next_id += 1;
        let entry = SessionMetricsEntry {
            id: self.next_id,
            created_at: at,
            input_kind: request.kind(),
            source_label: request.source_label(),
            preview: request.preview(),
            score: percent(result.confidence),
            result: result.prediction,
        };
        debug!(
            id = entry.id,
            kind = %entry.input_kind,
            result = %entry.result,
            score = entry.score,
            "session entry recorded"
        );
        self.entries.push_front(entry);
        &self.entries[0]
    }

    /// All entries, newest first.
    pub fn entries(&self) -> impl Iterator<Item = &SessionMetricsEntry> {
        self.entries.iter()
    }

    /// The `n` newest entries.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &SessionMetricsEntry> {
        self.entries.iter().take(n)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dashboard statistics with the 7-day window ending on `today`.
    pub fn stats(&self, today: NaiveDate) -> SessionStats {
        SessionStats::compute(self.entries.iter(), today)
    }
}

fn percent(confidence: f64) -> u8 {
    if !confidence.is_finite() {
        return 0;
    }
    (confidence.clamp(0.0, 1.0) * 100.0).round() as u8
}
