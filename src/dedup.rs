//! Change detection between the fetched papers and the persisted state.
//!
//! Two independent checks run per paper:
//! - bibliography-new: identifier absent from the bibliography text
//! - news-new: identifier absent from the seen set and published inside the
//!   recency window

use crate::bibliography::Bibliography;
use crate::error::{Result, SiteBotError};
use crate::paper::Paper;
use crate::seen::SeenSet;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use tracing::debug;

/// Default recency window in days
pub const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Largest accepted window, about a century
pub const MAX_WINDOW_DAYS: i64 = 36_500;

/// How recent a paper must be to get announced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecencyWindow {
    days: i64,
}

impl Default for RecencyWindow {
    fn default() -> Self {
        Self {
            days: DEFAULT_WINDOW_DAYS,
        }
    }
}

impl RecencyWindow {
    /// Window of `days`; anything outside `0..=MAX_WINDOW_DAYS` is a config error
    pub fn new(days: i64) -> Result<Self> {
        if !(0..=MAX_WINDOW_DAYS).contains(&days) {
            return Err(SiteBotError::Config(format!(
                "Recency window must be between 0 and {} days, got {}",
                MAX_WINDOW_DAYS, days
            )));
        }
        Ok(Self { days })
    }

    pub fn days(&self) -> i64 {
        self.days
    }

    /// Oldest publication time still inside the window, clamped to the
    /// earliest representable instant
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        Duration::try_days(self.days)
            .and_then(|span| now.checked_sub_signed(span))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Inclusive at the boundary: exactly `now - days` counts as recent
    pub fn is_recent(&self, published: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        published >= self.cutoff(now)
    }
}

/// Papers that need work in this run
#[derive(Debug, Default)]
pub struct SyncPlan<'a> {
    /// Papers to append to the bibliography
    pub bib_new: Vec<&'a Paper>,
    /// Papers to summarize and announce
    pub news_new: Vec<&'a Paper>,
}

impl SyncPlan<'_> {
    pub fn is_empty(&self) -> bool {
        self.bib_new.is_empty() && self.news_new.is_empty()
    }
}

/// Classify fetched papers against the bibliography and the seen set.
///
/// Input order is preserved. A paper listed twice in `papers` is planned at
/// most once per list.
pub fn plan<'a>(
    papers: &'a [Paper],
    bibliography: &Bibliography,
    seen: &SeenSet,
    now: DateTime<Utc>,
    window: RecencyWindow,
) -> SyncPlan<'a> {
    let mut plan = SyncPlan::default();
    let mut cited: HashSet<&str> = HashSet::new();
    let mut announced: HashSet<&str> = HashSet::new();

    for paper in papers {
        let id = paper.id();

        if !bibliography.contains(id) && cited.insert(id) {
            plan.bib_new.push(paper);
        }

        if !seen.contains(id) && window.is_recent(paper.published(), now) && announced.insert(id) {
            plan.news_new.push(paper);
        }
    }

    debug!(
        fetched = papers.len(),
        bib_new = plan.bib_new.len(),
        news_new = plan.news_new.len(),
        cutoff = %window.cutoff(now),
        "Planned sync"
    );
    plan
}
