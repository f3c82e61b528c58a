//! Timeline persistence

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::debug;

use crate::types::{Conflict, EntryFees, SegmentKind, TimelineResult};

/// Replace a plan's stored timeline and parking charges in one transaction
pub async fn replace_timeline(pool: &PgPool, result: &TimelineResult) -> Result<()> {
    let plan_id = result.plan_id;
    let mut tx = pool.begin().await.context("Failed to start timeline transaction")?;

    sqlx::query("DELETE FROM itinerary_parking_charges WHERE plan_id = $1")
        .bind(plan_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM itinerary_timeline_segments WHERE plan_id = $1")
        .bind(plan_id)
        .execute(&mut *tx)
        .await?;

    for segment in &result.segments {
        let (hotspot_id, destination, manual, fees) = match &segment.kind {
            SegmentKind::Travel { hotspot_id, .. } => (Some(*hotspot_id), None, false, EntryFees::default()),
            SegmentKind::Visit { hotspot_id, manual, fees, .. } => (Some(*hotspot_id), None, *manual, *fees),
            SegmentKind::HotelTravel { destination, .. }
            | SegmentKind::HotelStay { destination }
            | SegmentKind::Return { destination, .. } => (None, Some(destination.as_str()), false, EntryFees::default()),
            SegmentKind::Buffer => (None, None, false, EntryFees::default()),
        };
        let conflict_reason = match &segment.kind {
            SegmentKind::Visit { conflicts, .. } => Conflict::describe(conflicts),
            _ => None,
        };
        let figures = segment.kind.figures();

        sqlx::query(
            r#"
            INSERT INTO itinerary_timeline_segments (
                plan_id, route_id, item_order, segment_type, start_time, end_time,
                hotspot_id, destination, distance_km, travel_minutes, buffer_minutes,
                manual, conflict_reason, entry_fee_adults, entry_fee_children, entry_fee_infants,
                entry_fee_total
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(plan_id)
        .bind(segment.route_id)
        .bind(segment.order)
        .bind(segment.kind.segment_type())
        .bind(segment.start)
        .bind(segment.end)
        .bind(hotspot_id)
        .bind(destination)
        .bind(figures.map(|f| f.distance_km))
        .bind(figures.map(|f| f.travel_minutes as i32))
        .bind(figures.map(|f| f.buffer_minutes as i32))
        .bind(manual)
        .bind(conflict_reason)
        .bind(fees.adults)
        .bind(fees.children)
        .bind(fees.infants)
        .bind(fees.total)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("Failed to insert timeline segment for route {}", segment.route_id))?;
    }

    for charge in &result.parking_charges {
        sqlx::query(
            r#"
            INSERT INTO itinerary_parking_charges (
                plan_id, route_id, hotspot_id, vehicle_type_id, vehicle_count, amount
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(plan_id)
        .bind(charge.route_id)
        .bind(charge.hotspot_id)
        .bind(charge.vehicle_type_id)
        .bind(charge.vehicle_count)
        .bind(charge.amount)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await.context("Failed to commit timeline")?;

    debug!(
        plan_id,
        segments = result.segments.len(),
        parking_charges = result.parking_charges.len(),
        "Timeline persisted"
    );
    Ok(())
}
