//! Session storage: an append-only, memory-only log of completed analyses
//! and the dashboard statistics derived from it.

mod session;
mod stats;

pub use factlens_core::PREVIEW_CHARS;
pub use session::{SessionMetricsEntry, SessionStore};
pub use stats::{DayBucket, KindCount, SessionStats};
