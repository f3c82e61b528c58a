//! Bulk loading of everything a rebuild needs.
//!
//! After `prefetch` returns, the scheduler works purely from memory.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use super::opening_hours::OpeningHours;
use super::{TimelineError, TimelineSource};
use crate::services::distance::DistanceCalculator;
use crate::types::{
    normalize_city_name, primary_name, Coordinates, DayLeg, EntryPrice, Hotspot, Location,
    ManualSelection, ParkingCharge, Plan, SchedulerSettings, VehicleRequirement,
};

/// In-memory snapshot of one plan and its reference data
#[derive(Debug, Clone)]
pub struct PlanData {
    pub plan: Plan,
    /// Ordered by date, then id
    pub legs: Vec<DayLeg>,
    /// Attractions relevant to the plan's cities or pinned by the traveler
    pub catalog: Vec<Hotspot>,
    pub opening_hours: OpeningHours,
    pub distances: DistanceCalculator,
    pub manual: Vec<ManualSelection>,
    pub vehicles: Vec<VehicleRequirement>,
    pub parking: Vec<ParkingCharge>,
    prices: HashMap<i64, EntryPrice>,
    hotspot_index: HashMap<i64, usize>,
    city_coordinates: HashMap<String, Coordinates>,
}

impl PlanData {
    /// Assemble a snapshot from already-loaded rows
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        plan: Plan,
        mut legs: Vec<DayLeg>,
        catalog: Vec<Hotspot>,
        opening_hours: OpeningHours,
        distances: DistanceCalculator,
        manual: Vec<ManualSelection>,
        vehicles: Vec<VehicleRequirement>,
        parking: Vec<ParkingCharge>,
        prices: Vec<EntryPrice>,
        city_coordinates: HashMap<String, Coordinates>,
    ) -> Self {
        legs.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));

        let hotspot_index = catalog.iter().enumerate().map(|(i, h)| (h.id, i)).collect();
        let nationality = plan.nationality;
        let prices = prices
            .into_iter()
            .filter(|p| p.nationality == nationality)
            .map(|p| (p.hotspot_id, p))
            .collect();

        Self {
            plan,
            legs,
            catalog,
            opening_hours,
            distances,
            manual,
            vehicles,
            parking,
            prices,
            hotspot_index,
            city_coordinates,
        }
    }

    pub fn hotspot(&self, id: i64) -> Option<&Hotspot> {
        self.hotspot_index.get(&id).map(|&i| &self.catalog[i])
    }

    pub fn price_for(&self, hotspot_id: i64) -> Option<&EntryPrice> {
        self.prices.get(&hotspot_id)
    }

    /// City-level location for a (possibly pipe-delimited) place name
    pub fn city(&self, raw: &str) -> Location {
        let name = primary_name(raw);
        let coordinates = self.city_coordinates.get(&normalize_city_name(name)).copied();
        Location::new(name, coordinates)
    }
}

fn failed(dataset: &'static str, plan_id: i64) -> impl FnOnce(anyhow::Error) -> TimelineError {
    move |source| TimelineError::Prefetch {
        dataset,
        plan_id,
        source,
    }
}

/// Normalized names of every city a plan touches
fn plan_cities(plan: &Plan, legs: &[DayLeg]) -> HashSet<String> {
    let mut cities: HashSet<String> = legs
        .iter()
        .flat_map(|leg| {
            [leg.source_city(), leg.destination_city()]
                .into_iter()
                .chain(leg.via_stops.iter().map(String::as_str))
        })
        .map(normalize_city_name)
        .collect();
    cities.insert(normalize_city_name(primary_name(&plan.arrival_location)));
    cities.insert(normalize_city_name(primary_name(&plan.departure_location)));
    cities.remove("");
    cities
}

fn is_relevant(hotspot: &Hotspot, cities: &HashSet<String>, pinned: &HashSet<i64>) -> bool {
    if pinned.contains(&hotspot.id) {
        return true;
    }
    if hotspot.aliases().any(|a| cities.contains(&normalize_city_name(a))) {
        return true;
    }
    hotspot
        .city_boundaries
        .as_deref()
        .is_some_and(|raw| raw.split(['|', ',', '/']).any(|c| cities.contains(&normalize_city_name(c))))
}

/// Load a plan and all reference data in bulk. `Ok(None)` when the plan
/// does not exist. `extra_pin` adds one manual selection on top of the
/// stored ones (used by previews).
pub async fn prefetch(
    source: &dyn TimelineSource,
    plan_id: i64,
    settings: &SchedulerSettings,
    extra_pin: Option<ManualSelection>,
) -> Result<Option<PlanData>, TimelineError> {
    let Some(plan) = source.plan(plan_id).await.map_err(failed("plan", plan_id))? else {
        return Ok(None);
    };

    let mut legs = source.legs(plan_id).await.map_err(failed("legs", plan_id))?;
    let via_stops = source.via_stops(plan_id).await.map_err(failed("via stops", plan_id))?;
    for stop in via_stops {
        if let Some(leg) = legs.iter_mut().find(|l| l.id == stop.route_id) {
            leg.via_stops.push(stop.location_name);
        }
    }

    let mut manual = source
        .manual_selections(plan_id)
        .await
        .map_err(failed("manual selections", plan_id))?;
    if let Some(pin) = extra_pin {
        if !manual.contains(&pin) {
            manual.push(pin);
        }
    }

    let global = match source.global_settings().await.map_err(failed("global settings", plan_id))? {
        Some(gs) => gs,
        None => {
            warn!("No global settings found, using default speeds and buffers");
            Default::default()
        }
    };

    let cities = plan_cities(&plan, &legs);
    let pinned: HashSet<i64> = manual.iter().map(|m| m.hotspot_id).collect();
    let catalog: Vec<Hotspot> = source
        .hotspots()
        .await
        .map_err(failed("hotspots", plan_id))?
        .into_iter()
        .filter(|h| is_relevant(h, &cities, &pinned))
        .collect();
    let ids: Vec<i64> = catalog.iter().map(|h| h.id).collect();

    let windows = source
        .opening_windows(&ids)
        .await
        .map_err(failed("opening hours", plan_id))?;
    let prices = source
        .entry_prices(&ids, plan.nationality)
        .await
        .map_err(failed("entry prices", plan_id))?;
    let parking = source
        .parking_charges(&ids)
        .await
        .map_err(failed("parking charges", plan_id))?;
    let vehicles = source
        .vehicle_requirements(plan_id)
        .await
        .map_err(failed("vehicle requirements", plan_id))?;

    let mut names: Vec<String> = legs
        .iter()
        .flat_map(|leg| [leg.source_city().to_string(), leg.destination_city().to_string()])
        .chain(legs.iter().flat_map(|leg| leg.via_stops.iter().map(|v| v.trim().to_string())))
        .chain([
            primary_name(&plan.arrival_location).to_string(),
            primary_name(&plan.departure_location).to_string(),
        ])
        .chain(catalog.iter().map(|h| primary_name(&h.location).to_string()))
        .filter(|n| !n.is_empty())
        .collect();
    names.sort();
    names.dedup();

    let stored = source
        .stored_distances(&names)
        .await
        .map_err(failed("stored distances", plan_id))?;

    let mut city_coordinates: HashMap<String, Coordinates> = HashMap::new();
    for record in &stored {
        if let Some(c) = record.source_coordinates() {
            city_coordinates.entry(normalize_city_name(&record.source_location)).or_insert(c);
        }
        if let Some(c) = record.destination_coordinates() {
            city_coordinates
                .entry(normalize_city_name(&record.destination_location))
                .or_insert(c);
        }
    }
    for city in &cities {
        if city_coordinates.contains_key(city) {
            continue;
        }
        let named_after = catalog
            .iter()
            .find(|h| normalize_city_name(&h.name) == *city)
            .and_then(Hotspot::coordinates);
        match named_after {
            Some(c) => {
                city_coordinates.insert(city.clone(), c);
            }
            None => warn!(plan_id, city = %city, "No coordinates known for city"),
        }
    }

    debug!(
        plan_id,
        legs = legs.len(),
        hotspots = catalog.len(),
        windows = windows.len(),
        stored_distances = stored.len(),
        "Prefetched plan data"
    );

    Ok(Some(PlanData::new(
        plan,
        legs,
        catalog,
        OpeningHours::new(windows, settings.max_wait()),
        DistanceCalculator::new(stored, global),
        manual,
        vehicles,
        parking,
        prices,
        city_coordinates,
    )))
}
