//! Itinerary timeline engine
//!
//! Rebuilds the day-by-day timeline of a plan: which attractions are
//! visited on which leg, when, and how the traveler gets between them.
//! Data is loaded once per rebuild through a [`TimelineSource`]; the
//! scheduling itself is synchronous and works on the in-memory snapshot.

mod clock;
mod cutoff;
mod opening_hours;
mod parking;
mod prefetch;
mod scheduler;
mod segments;
mod selector;

#[cfg(test)]
pub(crate) mod fixtures;

pub use prefetch::PlanData;

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info};

use crate::types::{
    DayLeg, EntryPrice, GlobalSettings, Hotspot, ManualSelection, Nationality, OpeningWindow,
    ParkingCharge, Plan, SchedulerSettings, StoredDistance, TimelineResult, VehicleRequirement, ViaStop,
};
use parking::ParkingChargeBuilder;
use prefetch::prefetch;
use scheduler::LegContext;

/// Read access to plans and reference data
#[async_trait]
pub trait TimelineSource: Send + Sync {
    async fn plan(&self, plan_id: i64) -> Result<Option<Plan>>;

    async fn legs(&self, plan_id: i64) -> Result<Vec<DayLeg>>;

    async fn via_stops(&self, plan_id: i64) -> Result<Vec<ViaStop>>;

    /// Full active attraction catalog
    async fn hotspots(&self) -> Result<Vec<Hotspot>>;

    async fn opening_windows(&self, hotspot_ids: &[i64]) -> Result<Vec<OpeningWindow>>;

    async fn entry_prices(&self, hotspot_ids: &[i64], nationality: Nationality) -> Result<Vec<EntryPrice>>;

    /// Stored distances whose source and destination are both in `names`,
    /// newest first
    async fn stored_distances(&self, names: &[String]) -> Result<Vec<StoredDistance>>;

    async fn global_settings(&self) -> Result<Option<GlobalSettings>>;

    async fn manual_selections(&self, plan_id: i64) -> Result<Vec<ManualSelection>>;

    async fn vehicle_requirements(&self, plan_id: i64) -> Result<Vec<VehicleRequirement>>;

    async fn parking_charges(&self, hotspot_ids: &[i64]) -> Result<Vec<ParkingCharge>>;

    /// Source name for logging
    fn name(&self) -> &str;
}

#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    #[error("failed to load {dataset} for plan {plan_id}")]
    Prefetch {
        dataset: &'static str,
        plan_id: i64,
        #[source]
        source: anyhow::Error,
    },
}

/// Timeline engine; stateless apart from its tuning
#[derive(Debug, Clone, Default)]
pub struct TimelineEngine {
    settings: SchedulerSettings,
}

impl TimelineEngine {
    pub fn new(settings: SchedulerSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    /// Rebuild the full timeline of a plan
    pub async fn rebuild_timeline(&self, source: &dyn TimelineSource, plan_id: i64) -> Result<TimelineResult, TimelineError> {
        self.rebuild_with(source, plan_id, None).await
    }

    /// Rebuild as if `hotspot_id` were pinned to `route_id`; nothing is stored
    pub async fn preview_manual_add(
        &self,
        source: &dyn TimelineSource,
        plan_id: i64,
        route_id: i64,
        hotspot_id: i64,
    ) -> Result<TimelineResult, TimelineError> {
        let pin = ManualSelection { route_id, hotspot_id };
        self.rebuild_with(source, plan_id, Some(pin)).await
    }

    async fn rebuild_with(
        &self,
        source: &dyn TimelineSource,
        plan_id: i64,
        extra_pin: Option<ManualSelection>,
    ) -> Result<TimelineResult, TimelineError> {
        info!(plan_id, source = source.name(), preview = extra_pin.is_some(), "Rebuilding timeline");

        let Some(data) = prefetch(source, plan_id, &self.settings, extra_pin).await? else {
            info!(plan_id, "Plan not found, nothing to schedule");
            return Ok(TimelineResult::empty(plan_id));
        };

        let result = self.build(&data);
        info!(
            plan_id,
            legs = data.legs.len(),
            segments = result.segments.len(),
            visits = result.visit_count(),
            dropped = result.dropped.len(),
            "Timeline rebuilt"
        );
        Ok(result)
    }

    /// Schedule every leg of a prefetched plan
    pub fn build(&self, data: &PlanData) -> TimelineResult {
        let mut result = TimelineResult::empty(data.plan.id);
        if data.legs.is_empty() {
            debug!(plan_id = data.plan.id, "Plan has no legs");
            return result;
        }

        let mut parking = ParkingChargeBuilder::new(&data.vehicles, &data.parking);
        let mut visited: HashSet<i64> = HashSet::new();
        let mut unplaced: Vec<i64> = Vec::new();

        for (idx, leg) in data.legs.iter().enumerate() {
            let pinned: HashSet<i64> = data
                .manual
                .iter()
                .filter(|m| m.route_id == leg.id)
                .map(|m| m.hotspot_id)
                .collect();
            let mut excluded = visited.clone();
            excluded.extend(data.manual.iter().filter(|m| m.route_id != leg.id).map(|m| m.hotspot_id));

            let ctx = LegContext {
                data,
                settings: &self.settings,
                leg,
                is_final: idx + 1 == data.legs.len(),
                pinned: &pinned,
                excluded: &excluded,
            };
            let outcome = scheduler::schedule_leg(&ctx, &mut parking);

            visited.extend(outcome.placed.iter().copied());
            unplaced.extend(outcome.unplaced);
            result.segments.extend(outcome.segments);
            result.parking_charges.extend(outcome.parking_charges);
        }

        let mut seen = HashSet::new();
        result.dropped = unplaced
            .into_iter()
            .filter(|id| !visited.contains(id) && seen.insert(*id))
            .collect();
        result
    }
}
