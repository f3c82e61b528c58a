//! Opening-hours resolution for attraction visits

use std::collections::HashMap;

use chrono::{Duration, NaiveTime, Weekday};

use super::clock;
use crate::types::OpeningWindow;

/// Outcome of checking a proposed visit against opening hours
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// Visit can start as proposed
    Open,
    /// Visit fits if it starts at `start` after a short wait
    OpenAfterWait { start: NaiveTime },
    /// A later window fits but the wait is too long for now
    OpensLater { at: NaiveTime },
    /// No window on this day can take the visit
    Closed,
}

/// Opening windows of every prefetched attraction
#[derive(Debug, Clone, Default)]
pub struct OpeningHours {
    windows: HashMap<i64, Vec<OpeningWindow>>,
    max_wait: Duration,
}

impl OpeningHours {
    pub fn new(rows: Vec<OpeningWindow>, max_wait: Duration) -> Self {
        let mut windows: HashMap<i64, Vec<OpeningWindow>> = HashMap::new();
        for row in rows {
            windows.entry(row.hotspot_id).or_default().push(row);
        }
        Self { windows, max_wait }
    }

    pub fn can_visit(&self, hotspot_id: i64, day: Weekday, start: NaiveTime, end: NaiveTime) -> Availability {
        if end <= start {
            return Availability::Open;
        }

        let rows: Vec<&OpeningWindow> = self
            .windows
            .get(&hotspot_id)
            .map(|rows| rows.iter().filter(|w| w.applies_to(day)).collect())
            .unwrap_or_default();

        // No hours recorded for the day: assume open
        if rows.is_empty() {
            return Availability::Open;
        }

        if rows.iter().any(|w| w.open_all_day && !w.closed) {
            return Availability::Open;
        }

        let mut usable: Vec<(NaiveTime, NaiveTime)> = rows
            .iter()
            .filter(|w| !w.closed)
            .filter_map(|w| match (w.start_time, w.end_time) {
                (Some(open), Some(close)) if close > open => Some((open, close)),
                _ => None,
            })
            .collect();
        usable.sort_by_key(|(open, _)| *open);

        let visit = end - start;
        let mut deferral: Option<NaiveTime> = None;

        for (open, close) in usable {
            if start >= open && end <= close {
                return Availability::Open;
            }
            if start < open {
                let fits = clock::advance(open, visit).is_some_and(|shifted_end| shifted_end <= close);
                if !fits {
                    continue;
                }
                if open - start <= self.max_wait {
                    return Availability::OpenAfterWait { start: open };
                }
                deferral = Some(deferral.map_or(open, |d| d.min(open)));
            }
        }

        match deferral {
            Some(at) => Availability::OpensLater { at },
            None => Availability::Closed,
        }
    }
}
