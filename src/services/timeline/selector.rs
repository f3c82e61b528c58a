//! Candidate selection for one day leg.
//!
//! Attractions are bucketed by how they relate to the leg (pinned, in the
//! source city, in the destination city, on a via stop, or between the two
//! cities), each bucket is ranked, and the buckets are merged according to
//! the leg's direct/scenic flag.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::services::geo;
use crate::types::{normalize_city_name, Coordinates, DayLeg, Hotspot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Manual,
    Source,
    Destination,
    Via,
    Boundary,
}

/// An attraction proposed for a leg
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub hotspot: &'a Hotspot,
    pub bucket: Bucket,
    /// Road distance from the leg's start, when both ends have coordinates
    pub distance_km: Option<f64>,
}

impl Candidate<'_> {
    pub fn id(&self) -> i64 {
        self.hotspot.id
    }

    pub fn is_manual(&self) -> bool {
        self.bucket == Bucket::Manual
    }

    /// Manual and boundary picks extend a default deadline
    pub fn extends_deadline(&self) -> bool {
        matches!(self.bucket, Bucket::Manual | Bucket::Boundary)
    }
}

/// Everything the selector needs to know about one leg
pub struct SelectionInput<'a> {
    pub leg: &'a DayLeg,
    pub start: Option<Coordinates>,
    pub pinned: &'a HashSet<i64>,
    pub excluded: &'a HashSet<i64>,
    pub scenic_source_limit: usize,
}

/// Split a boundary attribute into city tokens
fn boundary_cities(raw: &str) -> Vec<String> {
    raw.split(['|', ',', '/'])
        .map(normalize_city_name)
        .filter(|s| !s.is_empty())
        .collect()
}

fn rank(a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
    a.hotspot
        .effective_priority()
        .cmp(&b.hotspot.effective_priority())
        .then_with(|| match (a.distance_km, b.distance_km) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}

/// Ordered candidate list for a leg
pub fn select_for_leg<'a>(catalog: &'a [Hotspot], input: &SelectionInput<'_>) -> Vec<Candidate<'a>> {
    let source = normalize_city_name(input.leg.source_city());
    let destination = normalize_city_name(input.leg.destination_city());
    let via: HashSet<String> = input
        .leg
        .via_stops
        .iter()
        .map(|v| normalize_city_name(v))
        .filter(|v| !v.is_empty())
        .collect();

    let mut manual = Vec::new();
    let mut from_source = Vec::new();
    let mut to_destination = Vec::new();
    let mut on_via = Vec::new();
    let mut on_boundary = Vec::new();

    for hotspot in catalog.iter().filter(|h| !input.excluded.contains(&h.id)) {
        let candidate = |bucket| Candidate {
            hotspot,
            bucket,
            distance_km: geo::road_distance_opt(input.start.as_ref(), hotspot.coordinates().as_ref()),
        };

        if input.pinned.contains(&hotspot.id) {
            manual.push(candidate(Bucket::Manual));
            continue;
        }

        let aliases: Vec<String> = hotspot.aliases().map(normalize_city_name).collect();
        let in_source = !source.is_empty() && aliases.contains(&source);
        let in_destination = !destination.is_empty() && aliases.contains(&destination);

        if in_source {
            from_source.push(candidate(Bucket::Source));
        }
        if in_destination {
            to_destination.push(candidate(Bucket::Destination));
        }
        if aliases.iter().any(|a| via.contains(a)) {
            on_via.push(candidate(Bucket::Via));
        }
        if !in_source && !in_destination {
            if let Some(raw) = hotspot.city_boundaries.as_deref() {
                let cities = boundary_cities(raw);
                if cities.contains(&source) && cities.contains(&destination) {
                    on_boundary.push(candidate(Bucket::Boundary));
                }
            }
        }
    }

    for bucket in [&mut manual, &mut from_source, &mut to_destination, &mut on_via, &mut on_boundary] {
        bucket.sort_by(rank);
    }

    let merged: Vec<Candidate<'a>> = if input.leg.direct_to_destination {
        let middle = if on_via.is_empty() { on_boundary } else { on_via };
        manual.into_iter().chain(middle).chain(to_destination).collect()
    } else {
        from_source.truncate(input.scenic_source_limit);
        manual
            .into_iter()
            .chain(from_source)
            .chain(on_via)
            .chain(to_destination)
            .collect()
    };

    let mut seen = HashSet::new();
    merged.into_iter().filter(|c| seen.insert(c.id())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn leg(source: &str, destination: &str, direct: bool, via: &[&str]) -> DayLeg {
        DayLeg {
            id: 10,
            plan_id: 1,
            date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            source_location: source.to_string(),
            destination_location: destination.to_string(),
            start_time: None,
            end_time: None,
            direct_to_destination: direct,
            via_stops: via.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn hotspot(id: i64, location: &str, priority: i32, lat: f64, lng: f64) -> Hotspot {
        Hotspot {
            id,
            name: format!("Spot {id}"),
            location: location.to_string(),
            lat: Some(lat),
            lng: Some(lng),
            duration: None,
            priority,
            city_boundaries: None,
        }
    }

    fn chennai() -> Option<Coordinates> {
        Some(Coordinates { lat: 13.0827, lng: 80.2707 })
    }

    fn ids(candidates: &[Candidate<'_>]) -> Vec<i64> {
        candidates.iter().map(|c| c.id()).collect()
    }

    fn select<'a>(catalog: &'a [Hotspot], leg: &DayLeg, pinned: &HashSet<i64>, excluded: &HashSet<i64>) -> Vec<Candidate<'a>> {
        select_for_leg(
            catalog,
            &SelectionInput {
                leg,
                start: chennai(),
                pinned,
                excluded,
                scenic_source_limit: 3,
            },
        )
    }

    #[test]
    fn test_unranked_priority_sorts_last() {
        let catalog = vec![
            hotspot(1, "Mahabalipuram", 1, 12.6208, 80.1945),
            hotspot(2, "Mahabalipuram", 2, 12.6165, 80.1992),
            hotspot(3, "Mahabalipuram", 0, 12.6170, 80.1990),
            hotspot(4, "Mahabalipuram", 3, 12.6100, 80.1900),
        ];
        let leg = leg("Chennai", "Mahabalipuram", true, &[]);
        let picked = select(&catalog, &leg, &HashSet::new(), &HashSet::new());
        assert_eq!(ids(&picked), vec![1, 2, 4, 3]);
        assert!(picked.iter().all(|c| c.bucket == Bucket::Destination));
    }

    #[test]
    fn test_distance_breaks_priority_ties() {
        let catalog = vec![
            hotspot(1, "Mahabalipuram", 1, 12.6100, 80.1900),
            hotspot(2, "Mahabalipuram", 1, 12.8000, 80.2300),
        ];
        let leg = leg("Chennai", "Mahabalipuram", true, &[]);
        let picked = select(&catalog, &leg, &HashSet::new(), &HashSet::new());
        assert_eq!(ids(&picked), vec![2, 1]);
    }

    #[test]
    fn test_scenic_leg_takes_top_source_attractions() {
        let catalog = vec![
            hotspot(1, "Chennai", 4, 13.05, 80.28),
            hotspot(2, "Chennai", 1, 13.05, 80.28),
            hotspot(3, "Chennai", 2, 13.05, 80.28),
            hotspot(4, "Chennai", 3, 13.05, 80.28),
            hotspot(5, "Mahabalipuram", 1, 12.62, 80.19),
        ];
        let leg = leg("Chennai Airport", "Mahabalipuram", false, &[]);
        let picked = select(&catalog, &leg, &HashSet::new(), &HashSet::new());
        assert_eq!(ids(&picked), vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_direct_leg_skips_source_and_uses_via() {
        let catalog = vec![
            hotspot(1, "Chennai", 1, 13.05, 80.28),
            hotspot(2, "Kanchipuram", 1, 12.83, 79.70),
            hotspot(3, "Mahabalipuram", 1, 12.62, 80.19),
        ];
        let leg = leg("Chennai", "Mahabalipuram", true, &["Kanchipuram"]);
        let picked = select(&catalog, &leg, &HashSet::new(), &HashSet::new());
        assert_eq!(ids(&picked), vec![2, 3]);
        assert_eq!(picked[0].bucket, Bucket::Via);
    }

    #[test]
    fn test_boundary_used_when_no_via() {
        let mut between = hotspot(7, "Kovalam", 1, 12.79, 80.25);
        between.city_boundaries = Some("Chennai / Mahabalipuram".to_string());
        let mut elsewhere = hotspot(8, "Kovalam", 1, 12.79, 80.25);
        elsewhere.city_boundaries = Some("Chennai,Pondicherry".to_string());
        let catalog = vec![between, elsewhere, hotspot(3, "Mahabalipuram", 1, 12.62, 80.19)];

        let leg = leg("Chennai", "Mahabalipuram", true, &[]);
        let picked = select(&catalog, &leg, &HashSet::new(), &HashSet::new());
        assert_eq!(ids(&picked), vec![7, 3]);
        assert!(picked[0].extends_deadline());
    }

    #[test]
    fn test_manual_pins_come_first_and_bypass_city_matching() {
        let catalog = vec![
            hotspot(1, "Mahabalipuram", 1, 12.62, 80.19),
            hotspot(9, "Ooty", 5, 11.41, 76.69),
        ];
        let leg = leg("Chennai", "Mahabalipuram", true, &[]);
        let pinned = HashSet::from([9]);
        let picked = select(&catalog, &leg, &pinned, &HashSet::new());
        assert_eq!(ids(&picked), vec![9, 1]);
        assert!(picked[0].is_manual());
    }

    #[test]
    fn test_exclusion_applies_before_scenic_limit() {
        let catalog = vec![
            hotspot(1, "Chennai", 1, 13.05, 80.28),
            hotspot(2, "Chennai", 2, 13.05, 80.28),
            hotspot(3, "Chennai", 3, 13.05, 80.28),
            hotspot(4, "Chennai", 4, 13.05, 80.28),
        ];
        let leg = leg("Chennai", "Mahabalipuram", false, &[]);
        let excluded = HashSet::from([1, 2]);
        let picked = select(&catalog, &leg, &HashSet::new(), &excluded);
        assert_eq!(ids(&picked), vec![3, 4]);
    }

    #[test]
    fn test_excluded_and_duplicate_ids_removed() {
        let catalog = vec![
            hotspot(1, "Madurai", 1, 9.92, 78.12),
            hotspot(2, "Madurai", 2, 9.93, 78.12),
        ];
        let leg = leg("Madurai", "Madurai", false, &[]);
        let excluded = HashSet::from([1]);
        let picked = select(&catalog, &leg, &HashSet::new(), &excluded);
        assert_eq!(ids(&picked), vec![2]);
    }
}
