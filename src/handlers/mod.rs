//! NATS message handlers

pub mod ping;
pub mod timeline;

use std::sync::Arc;

use anyhow::Result;
use async_nats::Client;
use sqlx::PgPool;
use tokio::select;
use tracing::{error, info};

use crate::config::Config;
use crate::services::timeline::TimelineEngine;

pub const PING_SUBJECT: &str = "itinerary.ping";
pub const REBUILD_SUBJECT: &str = "itinerary.timeline.rebuild";
pub const PREVIEW_SUBJECT: &str = "itinerary.timeline.preview";

/// Start all message handlers
pub async fn start_handlers(client: Client, pool: PgPool, config: &Config) -> Result<()> {
    info!("Starting message handlers...");

    let engine = Arc::new(TimelineEngine::new(config.scheduler));
    info!(
        max_passes = engine.settings().max_passes,
        max_wait_minutes = engine.settings().max_wait_minutes,
        "Timeline engine initialized"
    );

    // Subscribe to all subjects
    let ping_sub = client.subscribe(PING_SUBJECT).await?;
    let rebuild_sub = client.subscribe(REBUILD_SUBJECT).await?;
    let preview_sub = client.subscribe(PREVIEW_SUBJECT).await?;

    info!("Subscribed to NATS subjects: {}, {}, {}", PING_SUBJECT, REBUILD_SUBJECT, PREVIEW_SUBJECT);

    let client_ping = client.clone();
    let ping_handle = tokio::spawn(async move {
        ping::handle_ping(client_ping, ping_sub).await
    });

    let client_rebuild = client.clone();
    let pool_rebuild = pool.clone();
    let engine_rebuild = Arc::clone(&engine);
    let rebuild_handle = tokio::spawn(async move {
        timeline::handle_rebuild(client_rebuild, rebuild_sub, pool_rebuild, engine_rebuild).await
    });

    let client_preview = client.clone();
    let engine_preview = Arc::clone(&engine);
    let preview_handle = tokio::spawn(async move {
        timeline::handle_preview(client_preview, preview_sub, pool, engine_preview).await
    });

    info!("All handlers started, waiting for messages...");

    // Wait for any handler to finish (which would indicate an error)
    select! {
        result = ping_handle => {
            error!("Ping handler finished: {:?}", result);
        }
        result = rebuild_handle => {
            error!("Timeline rebuild handler finished: {:?}", result);
        }
        result = preview_handle => {
            error!("Timeline preview handler finished: {:?}", result);
        }
    }

    Ok(())
}
