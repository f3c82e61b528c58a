//! In-memory timeline source and sample plans for tests

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};

use super::TimelineSource;
use crate::types::{
    DayLeg, EntryPrice, GlobalSettings, Hotspot, ManualSelection, Nationality, OpeningWindow,
    ParkingCharge, Plan, StoredDistance, VehicleRequirement, ViaStop,
};

pub const PLAN_ID: i64 = 1;
pub const DAY1: i64 = 101;
pub const DAY2: i64 = 102;

pub const SHORE_TEMPLE: i64 = 1;
pub const FIVE_RATHAS: i64 = 2;
pub const LIGHTHOUSE: i64 = 3;
pub const ARJUNA_PENANCE: i64 = 4;
pub const CLOSED_MUSEUM: i64 = 5;
pub const CROCODILE_BANK: i64 = 6;
pub const FORT_MUSEUM: i64 = 7;
pub const KOVALAM_BEACH: i64 = 8;

pub const MADURAI_PLAN: i64 = 2;
pub const MADURAI_ROUTE: i64 = 201;
pub const ALAGAR_KOVIL: i64 = 21;
pub const TEMPLE_TANK: i64 = 22;
pub const MEENAKSHI_PALACE: i64 = 23;

/// Test double backed by plain vectors
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    pub plans: Vec<Plan>,
    pub legs: Vec<DayLeg>,
    pub via_stops: Vec<ViaStop>,
    pub hotspots: Vec<Hotspot>,
    pub windows: Vec<OpeningWindow>,
    pub prices: Vec<EntryPrice>,
    pub distances: Vec<StoredDistance>,
    pub settings: Option<GlobalSettings>,
    pub manual: Vec<ManualSelection>,
    pub vehicles: Vec<VehicleRequirement>,
    pub parking: Vec<ParkingCharge>,
    /// Dataset whose load fails, to exercise error paths
    pub fail_on: Option<&'static str>,
}

impl InMemorySource {
    fn check(&self, dataset: &str) -> Result<()> {
        if self.fail_on == Some(dataset) {
            bail!("simulated failure loading {dataset}");
        }
        Ok(())
    }

    fn route_ids(&self, plan_id: i64) -> Vec<i64> {
        self.legs.iter().filter(|l| l.plan_id == plan_id).map(|l| l.id).collect()
    }
}

#[async_trait]
impl TimelineSource for InMemorySource {
    async fn plan(&self, plan_id: i64) -> Result<Option<Plan>> {
        self.check("plan")?;
        Ok(self.plans.iter().find(|p| p.id == plan_id).cloned())
    }

    async fn legs(&self, plan_id: i64) -> Result<Vec<DayLeg>> {
        self.check("legs")?;
        Ok(self.legs.iter().filter(|l| l.plan_id == plan_id).cloned().collect())
    }

    async fn via_stops(&self, plan_id: i64) -> Result<Vec<ViaStop>> {
        self.check("via stops")?;
        let routes = self.route_ids(plan_id);
        Ok(self
            .via_stops
            .iter()
            .filter(|v| routes.contains(&v.route_id))
            .cloned()
            .collect())
    }

    async fn hotspots(&self) -> Result<Vec<Hotspot>> {
        self.check("hotspots")?;
        Ok(self.hotspots.clone())
    }

    async fn opening_windows(&self, hotspot_ids: &[i64]) -> Result<Vec<OpeningWindow>> {
        self.check("opening hours")?;
        Ok(self
            .windows
            .iter()
            .filter(|w| hotspot_ids.contains(&w.hotspot_id))
            .cloned()
            .collect())
    }

    async fn entry_prices(&self, hotspot_ids: &[i64], nationality: Nationality) -> Result<Vec<EntryPrice>> {
        self.check("entry prices")?;
        Ok(self
            .prices
            .iter()
            .filter(|p| hotspot_ids.contains(&p.hotspot_id) && p.nationality == nationality)
            .cloned()
            .collect())
    }

    async fn stored_distances(&self, names: &[String]) -> Result<Vec<StoredDistance>> {
        self.check("stored distances")?;
        Ok(self
            .distances
            .iter()
            .filter(|d| names.contains(&d.source_location) && names.contains(&d.destination_location))
            .cloned()
            .collect())
    }

    async fn global_settings(&self) -> Result<Option<GlobalSettings>> {
        self.check("global settings")?;
        Ok(self.settings.clone())
    }

    async fn manual_selections(&self, plan_id: i64) -> Result<Vec<ManualSelection>> {
        self.check("manual selections")?;
        let routes = self.route_ids(plan_id);
        Ok(self
            .manual
            .iter()
            .filter(|m| routes.contains(&m.route_id))
            .copied()
            .collect())
    }

    async fn vehicle_requirements(&self, plan_id: i64) -> Result<Vec<VehicleRequirement>> {
        self.check("vehicle requirements")?;
        if self.plans.iter().any(|p| p.id == plan_id) {
            Ok(self.vehicles.clone())
        } else {
            Ok(Vec::new())
        }
    }

    async fn parking_charges(&self, hotspot_ids: &[i64]) -> Result<Vec<ParkingCharge>> {
        self.check("parking charges")?;
        Ok(self
            .parking
            .iter()
            .filter(|p| hotspot_ids.contains(&p.hotspot_id))
            .cloned()
            .collect())
    }

    fn name(&self) -> &str {
        "InMemory"
    }
}

// ==========================================================================
// Builders
// ==========================================================================

pub fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// Monday
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
}

pub fn plan(id: i64, arrival: &str, departure: &str) -> Plan {
    Plan {
        id,
        trip_start: monday().and_hms_opt(8, 0, 0).unwrap(),
        trip_end: monday().succ_opt().unwrap().and_hms_opt(20, 0, 0).unwrap(),
        arrival_location: arrival.to_string(),
        departure_location: departure.to_string(),
        total_adults: 2,
        total_children: 1,
        total_infants: 0,
        nationality: Nationality::Domestic,
        entry_ticket_required: true,
    }
}

pub fn leg(id: i64, plan_id: i64, date: NaiveDate, source: &str, destination: &str) -> DayLeg {
    DayLeg {
        id,
        plan_id,
        date,
        source_location: source.to_string(),
        destination_location: destination.to_string(),
        start_time: Some(hm(9, 0)),
        end_time: None,
        direct_to_destination: false,
        via_stops: Vec::new(),
    }
}

pub fn hotspot(id: i64, location: &str, priority: i32, lat: f64, lng: f64, duration: NaiveTime) -> Hotspot {
    Hotspot {
        id,
        name: format!("Hotspot {id}"),
        location: location.to_string(),
        lat: Some(lat),
        lng: Some(lng),
        duration: Some(duration),
        priority,
        city_boundaries: None,
    }
}

/// Opening window on a weekday (0 = Monday)
pub fn window(hotspot_id: i64, weekday: i16, open: NaiveTime, close: NaiveTime) -> OpeningWindow {
    OpeningWindow {
        hotspot_id,
        weekday,
        start_time: Some(open),
        end_time: Some(close),
        open_all_day: false,
        closed: false,
    }
}

pub fn closed_on(hotspot_id: i64, weekday: i16) -> OpeningWindow {
    OpeningWindow {
        hotspot_id,
        weekday,
        start_time: None,
        end_time: None,
        open_all_day: false,
        closed: true,
    }
}

pub fn stored(from: (&str, f64, f64), to: (&str, f64, f64), km: f64, duration: &str) -> StoredDistance {
    StoredDistance {
        source_location: from.0.to_string(),
        destination_location: to.0.to_string(),
        distance_km: Some(km),
        duration: Some(duration.to_string()),
        source_lat: Some(from.1),
        source_lng: Some(from.2),
        destination_lat: Some(to.1),
        destination_lng: Some(to.2),
    }
}

// ==========================================================================
// Scenarios
// ==========================================================================

const CHENNAI: (&str, f64, f64) = ("Chennai", 13.0827, 80.2707);
const MAHABALIPURAM: (&str, f64, f64) = ("Mahabalipuram", 12.6208, 80.1945);
const MADURAI: (&str, f64, f64) = ("Madurai", 9.9252, 78.1198);
const ALAGAR_HILLS: (&str, f64, f64) = ("Alagar Hills", 10.0750, 78.2140);

/// Two days: Chennai to Mahabalipuram (direct, ends 18:00), then back to
/// Chennai (scenic, final).
pub fn chennai_trip() -> InMemorySource {
    let tuesday = monday().succ_opt().unwrap();

    let mut day1 = leg(DAY1, PLAN_ID, monday(), "Chennai", "Mahabalipuram");
    day1.direct_to_destination = true;
    day1.end_time = Some(hm(18, 0));
    let day2 = leg(DAY2, PLAN_ID, tuesday, "Mahabalipuram", "Chennai");

    InMemorySource {
        plans: vec![plan(PLAN_ID, "Chennai Airport", "Chennai Airport")],
        legs: vec![day1, day2],
        hotspots: vec![
            hotspot(SHORE_TEMPLE, "Mahabalipuram", 1, 12.6165, 80.1992, hm(1, 0)),
            hotspot(FIVE_RATHAS, "Mahabalipuram", 2, 12.6083, 80.1897, hm(0, 45)),
            hotspot(LIGHTHOUSE, "Mahabalipuram", 0, 12.6170, 80.1955, hm(1, 0)),
            hotspot(ARJUNA_PENANCE, "Mahabalipuram", 3, 12.6174, 80.1921, hm(0, 30)),
            hotspot(CLOSED_MUSEUM, "Mahabalipuram", 4, 12.6180, 80.1930, hm(1, 0)),
            hotspot(CROCODILE_BANK, "Chennai", 1, 12.7440, 80.2470, hm(1, 0)),
            hotspot(FORT_MUSEUM, "Vellore", 1, 12.9246, 79.1353, hm(1, 0)),
        ],
        windows: vec![
            window(LIGHTHOUSE, 0, hm(14, 0), hm(16, 0)),
            closed_on(CLOSED_MUSEUM, 0),
            closed_on(CLOSED_MUSEUM, 1),
        ],
        prices: vec![
            EntryPrice {
                hotspot_id: SHORE_TEMPLE,
                nationality: Nationality::Domestic,
                adult_cost: 40.0,
                child_cost: 20.0,
                infant_cost: 0.0,
            },
            EntryPrice {
                hotspot_id: SHORE_TEMPLE,
                nationality: Nationality::Foreign,
                adult_cost: 600.0,
                child_cost: 300.0,
                infant_cost: 0.0,
            },
        ],
        distances: vec![
            stored(CHENNAI, MAHABALIPURAM, 57.0, "1 hour 30 mins"),
            stored(MAHABALIPURAM, CHENNAI, 57.0, "1 hour 30 mins"),
        ],
        vehicles: vec![
            VehicleRequirement {
                vehicle_type_id: 1,
                vehicle_count: 1,
            },
            VehicleRequirement {
                vehicle_type_id: 1,
                vehicle_count: 1,
            },
        ],
        parking: vec![ParkingCharge {
            hotspot_id: SHORE_TEMPLE,
            vehicle_type_id: 1,
            charge: 50.0,
        }],
        ..InMemorySource::default()
    }
}

/// One final day around Madurai. The temple tank only fits early in the
/// morning, before the first scheduled attraction.
pub fn madurai_day() -> InMemorySource {
    let mut day = leg(MADURAI_ROUTE, MADURAI_PLAN, monday(), "Madurai", "Madurai");
    day.start_time = Some(hm(8, 0));

    InMemorySource {
        plans: vec![plan(MADURAI_PLAN, "Madurai", "Madurai")],
        legs: vec![day],
        hotspots: vec![
            hotspot(ALAGAR_KOVIL, "Alagar Hills|Madurai", 1, ALAGAR_HILLS.1, ALAGAR_HILLS.2, hm(1, 0)),
            hotspot(TEMPLE_TANK, "Madurai", 2, MADURAI.1, MADURAI.2, hm(0, 20)),
        ],
        windows: vec![
            window(ALAGAR_KOVIL, 0, hm(10, 0), hm(17, 0)),
            window(TEMPLE_TANK, 0, hm(9, 0), hm(9, 40)),
            window(TEMPLE_TANK, 0, hm(15, 0), hm(16, 0)),
        ],
        distances: vec![stored(MADURAI, ALAGAR_HILLS, 21.0, "31 mins")],
        ..InMemorySource::default()
    }
}

/// One final day around Madurai where the palace opens too late for the
/// first pass but fits once the temple on the hills has been visited.
pub fn retry_day() -> InMemorySource {
    let mut day = leg(MADURAI_ROUTE, MADURAI_PLAN, monday(), "Madurai", "Madurai");
    day.start_time = Some(hm(8, 0));

    InMemorySource {
        plans: vec![plan(MADURAI_PLAN, "Madurai", "Madurai")],
        legs: vec![day],
        hotspots: vec![
            hotspot(MEENAKSHI_PALACE, "Madurai", 1, MADURAI.1, MADURAI.2, hm(1, 0)),
            hotspot(ALAGAR_KOVIL, "Alagar Hills|Madurai", 2, ALAGAR_HILLS.1, ALAGAR_HILLS.2, hm(1, 0)),
        ],
        windows: vec![window(MEENAKSHI_PALACE, 0, hm(11, 0), hm(13, 0))],
        distances: vec![stored(MADURAI, ALAGAR_HILLS, 21.0, "31 mins")],
        ..InMemorySource::default()
    }
}

/// Beach on the coast road, matched to the Chennai to Mahabalipuram leg by
/// its city boundaries only
pub fn kovalam_beach() -> Hotspot {
    let mut beach = hotspot(KOVALAM_BEACH, "Kovalam", 1, 12.7900, 80.2500, hm(0, 30));
    beach.city_boundaries = Some("Chennai|Mahabalipuram".to_string());
    beach
}

/// Two days between cities without any attractions
pub fn empty_city_trip() -> InMemorySource {
    let tuesday = monday().succ_opt().unwrap();
    InMemorySource {
        plans: vec![plan(PLAN_ID, "Ooty", "Ooty")],
        legs: vec![
            leg(DAY1, PLAN_ID, monday(), "Ooty", "Coonoor"),
            leg(DAY2, PLAN_ID, tuesday, "Coonoor", "Ooty"),
        ],
        ..InMemorySource::default()
    }
}
