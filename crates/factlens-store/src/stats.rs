//! Dashboard aggregates over session entries.

use chrono::{Days, NaiveDate};
use factlens_core::{InputKind, Verdict};
use serde::Serialize;

use crate::session::SessionMetricsEntry;

/// Width of the activity window, in days, including today.
const WINDOW_DAYS: u64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayBucket {
    pub day: NaiveDate,
    pub total: usize,
    pub fake: usize,
    pub real: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KindCount {
    pub kind: InputKind,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStats {
    pub total: usize,
    pub fake: usize,
    pub real: usize,
    /// Share of fake verdicts, in percent; 0 for an empty session.
    pub fake_pct: f64,
    /// Oldest first, ending with today.
    pub days: Vec<DayBucket>,
    /// One count per input kind, in dashboard order, zero-filled.
    pub by_kind: Vec<KindCount>,
}

impl SessionStats {
    pub(crate) fn compute<'a>(
        entries: impl Iterator<Item = &'a SessionMetricsEntry>,
        today: NaiveDate,
    ) -> Self {
        let mut days: Vec<DayBucket> = (0..WINDOW_DAYS)
            .rev()
            .filter_map(|back| today.checked_sub_days(Days::new(back)))
            .map(|day| DayBucket {
                day,
                total: 0,
                fake: 0,
                real: 0,
            })
            .collect();
        let mut by_kind: Vec<KindCount> = InputKind::ALL
            .iter()
            .map(|&kind| KindCount { kind, count: 0 })
            .collect();
        let (mut total, mut fake) = (0usize, 0usize);

        for entry in entries {
            total += 1;
            let is_fake = entry.result == Verdict::Fake;
            if is_fake {
                fake += 1;
            }

            if let Some(k) = by_kind.iter_mut().find(|k| k.kind == entry.input_kind) {
                k.count += 1;
            }

            let day = entry.created_at.date_naive();
            if let Some(bucket) = days.iter_mut().find(|b| b.day == day) {
                bucket.total += 1;
                if is_fake {
                    bucket.fake += 1;
                } else {
                    bucket.real += 1;
                }
            }
        }

        let fake_pct = if total == 0 {
            0.0
        } else {
            fake as f64 / total as f64 * 100.0
        };

        Self {
            total,
            fake,
            real: total - fake,
            fake_pct,
            days,
            by_kind,
        }
    }

    pub fn count_for(&self, kind: InputKind) -> usize {
        self.by_kind
            .iter()
            .find(|k| k.kind == kind)
            .map_or(0, |k| k.count)
    }
}

#[cfg(test)]
mod tests {
    use crate::SessionStore;
    use crate::session::tests::{at, result};
    use chrono::NaiveDate;
    use factlens_core::{AnalysisRequest, InputKind, Verdict};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn empty_store() {
        let stats = SessionStore::new().stats(day(2025, 11, 12));
        assert_eq!(stats.total, 0);
        assert_eq!(stats.fake_pct, 0.0);
        assert_eq!(stats.days.len(), 7);
        assert!(stats.days.iter().all(|d| d.total == 0));
        assert_eq!(stats.by_kind.len(), 3);
        assert!(stats.by_kind.iter().all(|k| k.count == 0));
    }

    #[test]
    fn window_is_oldest_first_ending_today() {
        let stats = SessionStore::new().stats(day(2025, 3, 2));
        let days: Vec<NaiveDate> = stats.days.iter().map(|d| d.day).collect();
        assert_eq!(days.first(), Some(&day(2025, 2, 24)));
        assert_eq!(days.last(), Some(&day(2025, 3, 2)));
    }

    #[test]
    fn totals_buckets_and_kinds() {
        let mut store = SessionStore::new();
        let text = AnalysisRequest::Text("Noticia".into());
        let url = AnalysisRequest::Url("https://example.cl".into());

        store.record(&text, &result(Verdict::Fake, 0.9), at(2025, 11, 12, 9));
        store.record(&text, &result(Verdict::Real, 0.6), at(2025, 11, 12, 18));
        store.record(&url, &result(Verdict::Fake, 0.8), at(2025, 11, 10, 12));
        // Outside the window: counted in totals, not in any bucket.
        store.record(&url, &result(Verdict::Real, 0.8), at(2025, 10, 1, 12));

        let stats = store.stats(day(2025, 11, 12));
        assert_eq!((stats.total, stats.fake, stats.real), (4, 2, 2));
        assert_eq!(stats.fake_pct, 50.0);

        let today = stats.days.last().unwrap();
        assert_eq!((today.total, today.fake, today.real), (2, 1, 1));
        let nov10 = stats.days.iter().find(|d| d.day == day(2025, 11, 10)).unwrap();
        assert_eq!(nov10.fake, 1);
        assert_eq!(stats.days.iter().map(|d| d.total).sum::<usize>(), 3);

        assert_eq!(stats.count_for(InputKind::Text), 2);
        assert_eq!(stats.count_for(InputKind::Url), 2);
        assert_eq!(stats.count_for(InputKind::File), 0);
    }
}
