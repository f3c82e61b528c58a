//! Plan and route queries

use anyhow::Result;
use sqlx::PgPool;

use crate::types::{DayLeg, ManualSelection, Plan, ViaStop};

/// Get a plan header
pub async fn get_plan(pool: &PgPool, plan_id: i64) -> Result<Option<Plan>> {
    let plan = sqlx::query_as::<_, Plan>(
        r#"
        SELECT
            id, trip_start, trip_end,
            arrival_location, departure_location,
            total_adults, total_children, total_infants,
            nationality, entry_ticket_required
        FROM itinerary_plans
        WHERE id = $1
        "#,
    )
    .bind(plan_id)
    .fetch_optional(pool)
    .await?;

    Ok(plan)
}

/// List a plan's day legs in date order (via stops are loaded separately)
pub async fn list_legs(pool: &PgPool, plan_id: i64) -> Result<Vec<DayLeg>> {
    let legs = sqlx::query_as::<_, DayLeg>(
        r#"
        SELECT
            id, plan_id, route_date AS date,
            source_location, destination_location,
            start_time, end_time, direct_to_destination
        FROM itinerary_routes
        WHERE plan_id = $1
        ORDER BY route_date, id
        "#,
    )
    .bind(plan_id)
    .fetch_all(pool)
    .await?;

    Ok(legs)
}

pub async fn list_via_stops(pool: &PgPool, plan_id: i64) -> Result<Vec<ViaStop>> {
    let stops = sqlx::query_as::<_, ViaStop>(
        r#"
        SELECT v.route_id, v.location_name
        FROM itinerary_via_stops v
        JOIN itinerary_routes r ON r.id = v.route_id
        WHERE r.plan_id = $1
        ORDER BY v.route_id, v.id
        "#,
    )
    .bind(plan_id)
    .fetch_all(pool)
    .await?;

    Ok(stops)
}

/// Attractions pinned by the traveler on any route of the plan
pub async fn list_manual_selections(pool: &PgPool, plan_id: i64) -> Result<Vec<ManualSelection>> {
    let pins = sqlx::query_as::<_, ManualSelection>(
        r#"
        SELECT m.route_id, m.hotspot_id
        FROM itinerary_manual_hotspots m
        JOIN itinerary_routes r ON r.id = m.route_id
        WHERE r.plan_id = $1
        ORDER BY r.route_date, m.route_id, m.hotspot_id
        "#,
    )
    .bind(plan_id)
    .fetch_all(pool)
    .await?;

    Ok(pins)
}
