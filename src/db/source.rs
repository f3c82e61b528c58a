//! PostgreSQL-backed timeline source

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;

use super::queries;
use crate::services::timeline::TimelineSource;
use crate::types::{
    DayLeg, EntryPrice, GlobalSettings, Hotspot, ManualSelection, Nationality, OpeningWindow,
    ParkingCharge, Plan, StoredDistance, VehicleRequirement, ViaStop,
};

#[derive(Clone)]
pub struct PgTimelineSource {
    pool: PgPool,
}

impl PgTimelineSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TimelineSource for PgTimelineSource {
    async fn plan(&self, plan_id: i64) -> Result<Option<Plan>> {
        queries::plan::get_plan(&self.pool, plan_id).await
    }

    async fn legs(&self, plan_id: i64) -> Result<Vec<DayLeg>> {
        queries::plan::list_legs(&self.pool, plan_id).await
    }

    async fn via_stops(&self, plan_id: i64) -> Result<Vec<ViaStop>> {
        queries::plan::list_via_stops(&self.pool, plan_id).await
    }

    async fn hotspots(&self) -> Result<Vec<Hotspot>> {
        queries::hotspot::list_active_hotspots(&self.pool).await
    }

    async fn opening_windows(&self, hotspot_ids: &[i64]) -> Result<Vec<OpeningWindow>> {
        queries::hotspot::list_opening_windows(&self.pool, hotspot_ids).await
    }

    async fn entry_prices(&self, hotspot_ids: &[i64], nationality: Nationality) -> Result<Vec<EntryPrice>> {
        queries::hotspot::list_entry_prices(&self.pool, hotspot_ids, nationality).await
    }

    async fn stored_distances(&self, names: &[String]) -> Result<Vec<StoredDistance>> {
        queries::settings::list_stored_distances(&self.pool, names).await
    }

    async fn global_settings(&self) -> Result<Option<GlobalSettings>> {
        queries::settings::get_global_settings(&self.pool).await
    }

    async fn manual_selections(&self, plan_id: i64) -> Result<Vec<ManualSelection>> {
        queries::plan::list_manual_selections(&self.pool, plan_id).await
    }

    async fn vehicle_requirements(&self, plan_id: i64) -> Result<Vec<VehicleRequirement>> {
        queries::vehicle::list_vehicle_requirements(&self.pool, plan_id).await
    }

    async fn parking_charges(&self, hotspot_ids: &[i64]) -> Result<Vec<ParkingCharge>> {
        queries::vehicle::list_parking_charges(&self.pool, hotspot_ids).await
    }

    fn name(&self) -> &str {
        "Postgres"
    }
}
