//! Attraction (hotspot) catalog types

use chrono::{Duration, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{primary_name, Coordinates, Location, Nationality};
use crate::defaults::{DEFAULT_VISIT_DURATION_MINUTES, UNRANKED_PRIORITY};

/// Attraction from the catalog
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Hotspot {
    pub id: i64,
    pub name: String,
    /// Pipe-delimited alias location names, e.g. `"Madurai|Madurai Airport"`
    pub location: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// Typical visit duration stored as a time of day (`01:30:00` = 90 min)
    pub duration: Option<NaiveTime>,
    pub priority: i32,
    /// Cities this attraction lies between, e.g. `"Chennai|Mahabalipuram"`
    pub city_boundaries: Option<String>,
}

impl Hotspot {
    pub fn coordinates(&self) -> Option<Coordinates> {
        Coordinates::from_parts(self.lat, self.lng)
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.location.split('|').map(str::trim).filter(|s| !s.is_empty())
    }

    /// Where the traveler is after visiting this attraction
    pub fn as_location(&self) -> Location {
        Location::new(primary_name(&self.location), self.coordinates())
    }

    /// Visit duration; NULL falls back to one hour, zero means unusable.
    pub fn visit_duration(&self) -> Option<Duration> {
        match self.duration {
            None => Some(Duration::minutes(DEFAULT_VISIT_DURATION_MINUTES)),
            Some(t) => {
                let secs = t.num_seconds_from_midnight() as i64;
                (secs > 0).then(|| Duration::seconds(secs))
            }
        }
    }

    /// Lower is better; 0 is "unranked" and sorts last.
    pub fn effective_priority(&self) -> i32 {
        if self.priority <= 0 {
            UNRANKED_PRIORITY
        } else {
            self.priority
        }
    }
}

/// Opening window row for one attraction and weekday
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OpeningWindow {
    pub hotspot_id: i64,
    /// 0 = Monday .. 6 = Sunday
    pub weekday: i16,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub open_all_day: bool,
    pub closed: bool,
}

impl OpeningWindow {
    pub fn applies_to(&self, day: Weekday) -> bool {
        i64::from(self.weekday) == i64::from(day.num_days_from_monday())
    }
}

/// Entry ticket prices per person
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EntryPrice {
    pub hotspot_id: i64,
    pub nationality: Nationality,
    pub adult_cost: f64,
    pub child_cost: f64,
    pub infant_cost: f64,
}
