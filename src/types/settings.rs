//! Global travel settings and scheduler tuning

use chrono::{Duration, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Coordinates;
use crate::defaults::{
    DEFAULT_LOCAL_SPEED_KMH, DEFAULT_OUTSTATION_SPEED_KMH, DEFAULT_REFRESHMENT_MINUTES,
    GAP_FILL_MARGIN_MINUTES, MAX_OPENING_WAIT_MINUTES, MAX_SCHEDULING_PASSES, SCENIC_SOURCE_LIMIT,
};

/// Global settings row (average speeds and buffers)
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSettings {
    pub local_speed_kmh: Option<f64>,
    pub outstation_speed_kmh: Option<f64>,
    /// Buffer added on top of local (same-city) travel
    pub local_buffer: Option<NaiveTime>,
    /// Buffer added on top of outstation (intercity) travel
    pub outstation_buffer: Option<NaiveTime>,
    /// Refreshment break at the start of each day
    pub refreshment_buffer: Option<NaiveTime>,
}

impl GlobalSettings {
    pub fn local_speed(&self) -> f64 {
        positive_or(self.local_speed_kmh, DEFAULT_LOCAL_SPEED_KMH)
    }

    pub fn outstation_speed(&self) -> f64 {
        positive_or(self.outstation_speed_kmh, DEFAULT_OUTSTATION_SPEED_KMH)
    }

    pub fn local_buffer(&self) -> Duration {
        self.local_buffer.map(time_as_duration).unwrap_or_else(Duration::zero)
    }

    pub fn outstation_buffer(&self) -> Duration {
        self.outstation_buffer.map(time_as_duration).unwrap_or_else(Duration::zero)
    }

    pub fn refreshment(&self) -> Duration {
        self.refreshment_buffer
            .map(time_as_duration)
            .unwrap_or_else(|| Duration::minutes(DEFAULT_REFRESHMENT_MINUTES))
    }
}

fn positive_or(value: Option<f64>, fallback: f64) -> f64 {
    value.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(fallback)
}

/// TIME columns hold durations in this schema
pub fn time_as_duration(t: NaiveTime) -> Duration {
    Duration::seconds(t.num_seconds_from_midnight() as i64)
}

/// Stored distance between two named locations
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StoredDistance {
    pub source_location: String,
    pub destination_location: String,
    pub distance_km: Option<f64>,
    /// Free text such as "1 hour 56 mins"
    pub duration: Option<String>,
    pub source_lat: Option<f64>,
    pub source_lng: Option<f64>,
    pub destination_lat: Option<f64>,
    pub destination_lng: Option<f64>,
}

impl StoredDistance {
    pub fn source_coordinates(&self) -> Option<Coordinates> {
        Coordinates::from_parts(self.source_lat, self.source_lng)
    }

    pub fn destination_coordinates(&self) -> Option<Coordinates> {
        Coordinates::from_parts(self.destination_lat, self.destination_lng)
    }
}

/// Tuning knobs of the greedy scheduler
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerSettings {
    /// Pass 1 plus deferred-retry passes
    pub max_passes: u32,
    /// Longest wait for an attraction to open before deferring it
    pub max_wait_minutes: i64,
    /// Slack kept free when gap-filling before the first attraction
    pub gap_fill_margin_minutes: i64,
    /// Source-city attractions considered on scenic legs
    pub scenic_source_limit: usize,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            max_passes: MAX_SCHEDULING_PASSES,
            max_wait_minutes: MAX_OPENING_WAIT_MINUTES,
            gap_fill_margin_minutes: GAP_FILL_MARGIN_MINUTES,
            scenic_source_limit: SCENIC_SOURCE_LIMIT,
        }
    }
}

impl SchedulerSettings {
    pub fn max_wait(&self) -> Duration {
        Duration::minutes(self.max_wait_minutes)
    }

    pub fn gap_fill_margin(&self) -> Duration {
        Duration::minutes(self.gap_fill_margin_minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_settings_use_defaults() {
        let gs = GlobalSettings::default();
        assert_eq!(gs.local_speed(), 40.0);
        assert_eq!(gs.outstation_speed(), 60.0);
        assert_eq!(gs.local_buffer(), Duration::zero());
        assert_eq!(gs.refreshment(), Duration::minutes(60));
    }

    #[test]
    fn test_non_positive_speed_falls_back() {
        let gs = GlobalSettings {
            local_speed_kmh: Some(0.0),
            outstation_speed_kmh: Some(-5.0),
            ..GlobalSettings::default()
        };
        assert_eq!(gs.local_speed(), 40.0);
        assert_eq!(gs.outstation_speed(), 60.0);
    }

    #[test]
    fn test_buffers_from_time_columns() {
        let gs = GlobalSettings {
            outstation_buffer: NaiveTime::from_hms_opt(0, 15, 0),
            refreshment_buffer: NaiveTime::from_hms_opt(0, 30, 0),
            ..GlobalSettings::default()
        };
        assert_eq!(gs.outstation_buffer(), Duration::minutes(15));
        assert_eq!(gs.refreshment(), Duration::minutes(30));
    }
}
