//! Travel distance and duration estimation between named locations.
//!
//! Lookup order for a pair of locations:
//! 1. stored distance record for the exact (trimmed) name pair
//! 2. haversine road estimate when both coordinates are known
//! 3. zero distance, zero time, zero buffer

use std::collections::HashMap;

use chrono::Duration;
use tracing::trace;

use crate::defaults::{DEFAULT_LOCAL_SPEED_KMH, LOCAL_SPEED_FLOOR_DISTANCE_KM, MAX_TRAVEL_MINUTES};
use crate::services::geo;
use crate::types::{GlobalSettings, Location, StoredDistance, TravelFigures};

/// Same-city hop or intercity drive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelClass {
    Local,
    Outstation,
}

impl TravelClass {
    pub fn between(from: &Location, to: &Location) -> Self {
        if from.same_city_as(to) {
            TravelClass::Local
        } else {
            TravelClass::Outstation
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TravelEstimate {
    pub distance_km: f64,
    pub travel: Duration,
    pub buffer: Duration,
}

impl TravelEstimate {
    pub fn zero() -> Self {
        Self {
            distance_km: 0.0,
            travel: Duration::zero(),
            buffer: Duration::zero(),
        }
    }

    /// Travel time plus buffer
    pub fn total(&self) -> Duration {
        self.travel + self.buffer
    }

    pub fn figures(&self) -> TravelFigures {
        TravelFigures {
            distance_km: self.distance_km,
            travel_minutes: self.travel.num_minutes(),
            buffer_minutes: self.buffer.num_minutes(),
        }
    }
}

/// Distance calculator over prefetched stored distances and global settings
#[derive(Debug, Clone, Default)]
pub struct DistanceCalculator {
    stored: HashMap<(String, String), StoredDistance>,
    settings: GlobalSettings,
}

impl DistanceCalculator {
    /// The first record per name pair wins, so callers pass newest first.
    pub fn new(records: Vec<StoredDistance>, settings: GlobalSettings) -> Self {
        let mut stored = HashMap::with_capacity(records.len());
        for record in records {
            let key = (
                record.source_location.trim().to_string(),
                record.destination_location.trim().to_string(),
            );
            stored.entry(key).or_insert(record);
        }
        Self { stored, settings }
    }

    pub fn settings(&self) -> &GlobalSettings {
        &self.settings
    }

    /// Estimate with the travel class derived from the city names
    pub fn estimate_between(&self, from: &Location, to: &Location) -> TravelEstimate {
        self.estimate(from, to, TravelClass::between(from, to))
    }

    pub fn estimate(&self, from: &Location, to: &Location, class: TravelClass) -> TravelEstimate {
        let key = (from.name.trim().to_string(), to.name.trim().to_string());

        if let Some(record) = self.stored.get(&key) {
            let minutes = record
                .duration
                .as_deref()
                .and_then(parse_duration_minutes)
                .unwrap_or(0)
                .min(MAX_TRAVEL_MINUTES);
            trace!(from = %key.0, to = %key.1, minutes, "Stored distance hit");
            return TravelEstimate {
                distance_km: record.distance_km.filter(|d| d.is_finite() && *d > 0.0).unwrap_or(0.0),
                travel: Duration::minutes(minutes),
                buffer: self.buffer_for(class),
            };
        }

        match geo::road_distance_opt(from.coordinates.as_ref(), to.coordinates.as_ref()) {
            Some(distance_km) => TravelEstimate {
                distance_km,
                travel: self.drive_time(distance_km, class),
                buffer: self.buffer_for(class),
            },
            None => {
                trace!(from = %key.0, to = %key.1, "No distance data, assuming zero travel");
                TravelEstimate::zero()
            }
        }
    }

    fn drive_time(&self, distance_km: f64, class: TravelClass) -> Duration {
        let mut speed = match class {
            TravelClass::Local => self.settings.local_speed(),
            TravelClass::Outstation => self.settings.outstation_speed(),
        };
        // Slow local speeds only make sense for short hops
        if class == TravelClass::Local
            && distance_km > LOCAL_SPEED_FLOOR_DISTANCE_KM
            && speed < DEFAULT_LOCAL_SPEED_KMH
        {
            speed = DEFAULT_LOCAL_SPEED_KMH;
        }

        let hours = distance_km / speed;
        let whole_hours = hours.floor();
        let minutes = whole_hours * 60.0 + ((hours - whole_hours) * 60.0).round();
        if !minutes.is_finite() {
            return Duration::zero();
        }
        Duration::minutes((minutes as i64).clamp(0, MAX_TRAVEL_MINUTES))
    }

    fn buffer_for(&self, class: TravelClass) -> Duration {
        match class {
            TravelClass::Local => self.settings.local_buffer(),
            TravelClass::Outstation => self.settings.outstation_buffer(),
        }
    }
}

/// Parse free-text durations such as `"49 mins"`, `"1 hour 56 mins"`,
/// `"1 day 2 hours 15 mins"` or a bare number of minutes. `None` for text
/// without a number and for values too large to represent.
pub fn parse_duration_minutes(raw: &str) -> Option<i64> {
    let text = raw.trim().to_lowercase();
    if text.is_empty() {
        return None;
    }

    let mut days = None;
    let mut hours = None;
    let mut mins = None;

    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if !chars[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let digits_start = i;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
        let value: i64 = chars[digits_start..i].iter().collect::<String>().parse().ok()?;

        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }
        let unit_start = i;
        while i < chars.len() && chars[i].is_alphabetic() {
            i += 1;
        }
        let unit: String = chars[unit_start..i].iter().collect();

        let slot = if unit.starts_with("day") {
            &mut days
        } else if unit.starts_with("hour") {
            &mut hours
        } else if unit.starts_with("min") {
            &mut mins
        } else {
            continue;
        };
        slot.get_or_insert(value);
    }

    if days.is_none() && hours.is_none() && mins.is_none() {
        let n: f64 = text.parse().ok()?;
        if !n.is_finite() || n >= i64::MAX as f64 {
            return None;
        }
        return Some((n.floor() as i64).max(0));
    }

    days.unwrap_or(0)
        .checked_mul(1440)?
        .checked_add(hours.unwrap_or(0).checked_mul(60)?)?
        .checked_add(mins.unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Coordinates;
    use chrono::NaiveTime;

    fn chennai() -> Location {
        Location::new("Chennai", Some(Coordinates { lat: 13.0827, lng: 80.2707 }))
    }

    fn mahabalipuram() -> Location {
        Location::new("Mahabalipuram", Some(Coordinates { lat: 12.6208, lng: 80.1945 }))
    }

    fn stored(from: &str, to: &str, km: f64, duration: &str) -> StoredDistance {
        StoredDistance {
            source_location: from.to_string(),
            destination_location: to.to_string(),
            distance_km: Some(km),
            duration: Some(duration.to_string()),
            source_lat: None,
            source_lng: None,
            destination_lat: None,
            destination_lng: None,
        }
    }

    #[test]
    fn test_parse_duration_formats() {
        assert_eq!(parse_duration_minutes("49 mins"), Some(49));
        assert_eq!(parse_duration_minutes("1 hour 56 mins"), Some(116));
        assert_eq!(parse_duration_minutes("3 hours 5 mins"), Some(185));
        assert_eq!(parse_duration_minutes("1 day 0 hours"), Some(1440));
        assert_eq!(parse_duration_minutes("1 day 2 hours 15 mins"), Some(1575));
        assert_eq!(parse_duration_minutes(" 75 "), Some(75));
        assert_eq!(parse_duration_minutes("42.9"), Some(42));
    }

    #[test]
    fn test_parse_duration_out_of_range_is_none() {
        assert_eq!(parse_duration_minutes("1e30"), None);
        assert_eq!(parse_duration_minutes("99999999999999999 days"), None);
        assert_eq!(parse_duration_minutes("9223372036854775807 hours"), None);
        assert_eq!(parse_duration_minutes("99999999999999999999 mins"), None);
    }

    #[test]
    fn test_absurd_stored_durations_do_not_break_estimates() {
        let calc = DistanceCalculator::new(
            vec![
                stored("Chennai", "Mahabalipuram", 57.0, "1e30"),
                stored("Mahabalipuram", "Chennai", 57.0, "99999999999999999 days"),
                stored("Chennai", "Ooty", 560.0, "400 days"),
            ],
            GlobalSettings::default(),
        );
        let ooty = Location::new("Ooty", None);

        let est = calc.estimate(&chennai(), &mahabalipuram(), TravelClass::Outstation);
        assert_eq!(est.travel, Duration::zero());
        let est = calc.estimate(&mahabalipuram(), &chennai(), TravelClass::Outstation);
        assert_eq!(est.travel, Duration::zero());
        let est = calc.estimate(&chennai(), &ooty, TravelClass::Outstation);
        assert_eq!(est.travel, Duration::minutes(MAX_TRAVEL_MINUTES));
    }

    #[test]
    fn test_tiny_speed_is_capped() {
        let settings = GlobalSettings {
            outstation_speed_kmh: Some(1e-12),
            ..GlobalSettings::default()
        };
        let calc = DistanceCalculator::new(Vec::new(), settings);
        let est = calc.estimate(&chennai(), &mahabalipuram(), TravelClass::Outstation);
        assert_eq!(est.travel, Duration::minutes(MAX_TRAVEL_MINUTES));
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert_eq!(parse_duration_minutes(""), None);
        assert_eq!(parse_duration_minutes("soon"), None);
    }

    #[test]
    fn test_stored_record_takes_precedence() {
        let calc = DistanceCalculator::new(
            vec![stored(" Chennai ", "Mahabalipuram", 57.0, "1 hour 20 mins")],
            GlobalSettings::default(),
        );
        let est = calc.estimate(&chennai(), &mahabalipuram(), TravelClass::Outstation);
        assert_eq!(est.distance_km, 57.0);
        assert_eq!(est.travel, Duration::minutes(80));
    }

    #[test]
    fn test_first_stored_record_wins() {
        let calc = DistanceCalculator::new(
            vec![
                stored("Chennai", "Mahabalipuram", 57.0, "80"),
                stored("Chennai", "Mahabalipuram", 99.0, "200"),
            ],
            GlobalSettings::default(),
        );
        let est = calc.estimate(&chennai(), &mahabalipuram(), TravelClass::Outstation);
        assert_eq!(est.travel, Duration::minutes(80));
    }

    #[test]
    fn test_coordinate_fallback_uses_outstation_speed() {
        let calc = DistanceCalculator::default();
        let est = calc.estimate(&chennai(), &mahabalipuram(), TravelClass::Outstation);
        assert!((est.distance_km - 78.0315).abs() < 0.01);
        // 78.03 km at 60 km/h = 1 h 18.03 min
        assert_eq!(est.travel, Duration::minutes(78));
    }

    #[test]
    fn test_slow_local_speed_is_floored_for_long_hops() {
        let settings = GlobalSettings {
            local_speed_kmh: Some(15.0),
            ..GlobalSettings::default()
        };
        let calc = DistanceCalculator::new(Vec::new(), settings);
        let est = calc.estimate(&chennai(), &mahabalipuram(), TravelClass::Local);
        // 78.03 km at the 40 km/h floor = 1 h 57.05 min
        assert_eq!(est.travel, Duration::minutes(117));
    }

    #[test]
    fn test_missing_data_is_zero_including_buffer() {
        let settings = GlobalSettings {
            outstation_buffer: NaiveTime::from_hms_opt(0, 30, 0),
            ..GlobalSettings::default()
        };
        let calc = DistanceCalculator::new(Vec::new(), settings);
        let est = calc.estimate(
            &Location::new("Nowhere", None),
            &mahabalipuram(),
            TravelClass::Outstation,
        );
        assert_eq!(est, TravelEstimate::zero());
    }

    #[test]
    fn test_buffer_added_per_class() {
        let settings = GlobalSettings {
            local_buffer: NaiveTime::from_hms_opt(0, 10, 0),
            outstation_buffer: NaiveTime::from_hms_opt(0, 30, 0),
            ..GlobalSettings::default()
        };
        let calc = DistanceCalculator::new(Vec::new(), settings);
        let est = calc.estimate(&chennai(), &mahabalipuram(), TravelClass::Outstation);
        assert_eq!(est.buffer, Duration::minutes(30));
        assert_eq!(est.total(), Duration::minutes(108));
    }

    #[test]
    fn test_class_from_city_names() {
        let airport = Location::new("Chennai Airport", None);
        assert_eq!(TravelClass::between(&airport, &chennai()), TravelClass::Local);
        assert_eq!(TravelClass::between(&chennai(), &mahabalipuram()), TravelClass::Outstation);
    }
}
