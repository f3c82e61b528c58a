//! Vehicle requirements and parking charges

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Vehicles booked for a plan (one row per vendor allocation)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRequirement {
    pub vehicle_type_id: i64,
    pub vehicle_count: i32,
}

/// Parking fee configured for an attraction and vehicle type
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ParkingCharge {
    pub hotspot_id: i64,
    pub vehicle_type_id: i64,
    pub charge: f64,
}
