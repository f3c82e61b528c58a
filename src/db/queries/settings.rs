//! Global settings and stored distance queries

use anyhow::Result;
use sqlx::PgPool;

use crate::types::{GlobalSettings, StoredDistance};

/// Active global settings row, newest first
pub async fn get_global_settings(pool: &PgPool) -> Result<Option<GlobalSettings>> {
    let settings = sqlx::query_as::<_, GlobalSettings>(
        r#"
        SELECT
            local_speed_kmh, outstation_speed_kmh,
            local_buffer, outstation_buffer, refreshment_buffer
        FROM global_settings
        WHERE active
        ORDER BY id DESC
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await?;

    Ok(settings)
}

/// Stored distances between any two of `names`, newest first
pub async fn list_stored_distances(pool: &PgPool, names: &[String]) -> Result<Vec<StoredDistance>> {
    let rows = sqlx::query_as::<_, StoredDistance>(
        r#"
        SELECT
            TRIM(source_location) AS source_location,
            TRIM(destination_location) AS destination_location,
            distance_km, duration,
            source_lat, source_lng,
            destination_lat, destination_lng
        FROM stored_locations
        WHERE NOT deleted
          AND TRIM(source_location) = ANY($1)
          AND TRIM(destination_location) = ANY($1)
        ORDER BY id DESC
        "#,
    )
    .bind(names)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
