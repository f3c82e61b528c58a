//! Attraction catalog queries

use anyhow::Result;
use sqlx::PgPool;

use crate::types::{EntryPrice, Hotspot, Nationality, OpeningWindow};

/// All active attractions
pub async fn list_active_hotspots(pool: &PgPool) -> Result<Vec<Hotspot>> {
    let hotspots = sqlx::query_as::<_, Hotspot>(
        r#"
        SELECT id, name, location, lat, lng, duration, priority, city_boundaries
        FROM hotspots
        WHERE active
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(hotspots)
}

pub async fn list_opening_windows(pool: &PgPool, hotspot_ids: &[i64]) -> Result<Vec<OpeningWindow>> {
    let windows = sqlx::query_as::<_, OpeningWindow>(
        r#"
        SELECT hotspot_id, weekday, start_time, end_time, open_all_day, closed
        FROM hotspot_opening_hours
        WHERE hotspot_id = ANY($1)
        ORDER BY hotspot_id, weekday, start_time
        "#,
    )
    .bind(hotspot_ids)
    .fetch_all(pool)
    .await?;

    Ok(windows)
}

pub async fn list_entry_prices(
    pool: &PgPool,
    hotspot_ids: &[i64],
    nationality: Nationality,
) -> Result<Vec<EntryPrice>> {
    let prices = sqlx::query_as::<_, EntryPrice>(
        r#"
        SELECT hotspot_id, nationality, adult_cost, child_cost, infant_cost
        FROM hotspot_entry_prices
        WHERE hotspot_id = ANY($1) AND nationality = $2
        "#,
    )
    .bind(hotspot_ids)
    .bind(nationality)
    .fetch_all(pool)
    .await?;

    Ok(prices)
}
