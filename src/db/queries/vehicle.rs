//! Vehicle and parking queries

use anyhow::Result;
use sqlx::PgPool;

use crate::types::{ParkingCharge, VehicleRequirement};

pub async fn list_vehicle_requirements(pool: &PgPool, plan_id: i64) -> Result<Vec<VehicleRequirement>> {
    let vehicles = sqlx::query_as::<_, VehicleRequirement>(
        r#"
        SELECT vehicle_type_id, vehicle_count
        FROM itinerary_vehicles
        WHERE plan_id = $1
        ORDER BY id
        "#,
    )
    .bind(plan_id)
    .fetch_all(pool)
    .await?;

    Ok(vehicles)
}

pub async fn list_parking_charges(pool: &PgPool, hotspot_ids: &[i64]) -> Result<Vec<ParkingCharge>> {
    let charges = sqlx::query_as::<_, ParkingCharge>(
        r#"
        SELECT hotspot_id, vehicle_type_id, charge
        FROM hotspot_parking_charges
        WHERE hotspot_id = ANY($1)
        "#,
    )
    .bind(hotspot_ids)
    .fetch_all(pool)
    .await?;

    Ok(charges)
}
