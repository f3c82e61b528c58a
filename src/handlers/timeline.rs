//! Timeline rebuild and preview handlers

use std::sync::Arc;

use anyhow::Result;
use async_nats::{Client, Subscriber};
use futures::StreamExt;
use serde::Serialize;
use sqlx::PgPool;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::db::{queries, PgTimelineSource};
use crate::services::timeline::TimelineEngine;
use crate::types::{
    error_codes, ErrorResponse, PreviewManualRequest, RebuildSummary, RebuildTimelineRequest, Request,
    SuccessResponse,
};

/// Why a rebuild request failed, mapped onto an error code
#[derive(Debug)]
pub enum RebuildFailure {
    Rebuild(anyhow::Error),
    Persist(anyhow::Error),
}

impl RebuildFailure {
    pub fn code(&self) -> &'static str {
        match self {
            RebuildFailure::Rebuild(_) => error_codes::REBUILD_FAILED,
            RebuildFailure::Persist(_) => error_codes::PERSIST_FAILED,
        }
    }

    pub fn message(&self) -> String {
        match self {
            RebuildFailure::Rebuild(e) | RebuildFailure::Persist(e) => format!("{:#}", e),
        }
    }
}

/// Rebuild a plan and store the result
pub async fn rebuild_and_persist(
    engine: &TimelineEngine,
    pool: &PgPool,
    plan_id: i64,
) -> Result<RebuildSummary, RebuildFailure> {
    let source = PgTimelineSource::new(pool.clone());
    let result = engine
        .rebuild_timeline(&source, plan_id)
        .await
        .map_err(|e| RebuildFailure::Rebuild(e.into()))?;

    queries::timeline::replace_timeline(pool, &result)
        .await
        .map_err(RebuildFailure::Persist)?;

    Ok(result.summary())
}

async fn respond<T: Serialize>(client: &Client, reply: async_nats::Subject, body: &T) -> Result<()> {
    client.publish(reply, serde_json::to_vec(body)?.into()).await?;
    Ok(())
}

fn parse<T: serde::de::DeserializeOwned>(payload: &[u8]) -> std::result::Result<Request<T>, ErrorResponse> {
    serde_json::from_slice(payload).map_err(|e| {
        ErrorResponse::new(
            Uuid::nil(),
            error_codes::INVALID_REQUEST,
            format!("Failed to parse request: {}", e),
        )
    })
}

/// Handle itinerary.timeline.rebuild
pub async fn handle_rebuild(
    client: Client,
    mut subscriber: Subscriber,
    pool: PgPool,
    engine: Arc<TimelineEngine>,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        let reply = match msg.reply {
            Some(ref r) => r.clone(),
            None => continue,
        };

        let request: Request<RebuildTimelineRequest> = match parse(&msg.payload) {
            Ok(req) => req,
            Err(error) => {
                warn!("Invalid rebuild request: {}", error.error.message);
                let _ = respond(&client, reply, &error).await;
                continue;
            }
        };

        let plan_id = request.payload.plan_id;
        match rebuild_and_persist(&engine, &pool, plan_id).await {
            Ok(summary) => {
                info!(plan_id, segments = summary.segments, "Timeline stored");
                let _ = respond(&client, reply, &SuccessResponse::new(request.id, summary)).await;
            }
            Err(failure) => {
                error!(plan_id, code = failure.code(), "Timeline rebuild failed: {}", failure.message());
                let error = ErrorResponse::new(request.id, failure.code(), failure.message());
                let _ = respond(&client, reply, &error).await;
            }
        }
    }

    Ok(())
}

/// Handle itinerary.timeline.preview
pub async fn handle_preview(
    client: Client,
    mut subscriber: Subscriber,
    pool: PgPool,
    engine: Arc<TimelineEngine>,
) -> Result<()> {
    let source = PgTimelineSource::new(pool);

    while let Some(msg) = subscriber.next().await {
        let reply = match msg.reply {
            Some(ref r) => r.clone(),
            None => continue,
        };

        let request: Request<PreviewManualRequest> = match parse(&msg.payload) {
            Ok(req) => req,
            Err(error) => {
                warn!("Invalid preview request: {}", error.error.message);
                let _ = respond(&client, reply, &error).await;
                continue;
            }
        };

        let PreviewManualRequest { plan_id, route_id, hotspot_id } = request.payload;
        match engine.preview_manual_add(&source, plan_id, route_id, hotspot_id).await {
            Ok(result) => {
                let _ = respond(&client, reply, &SuccessResponse::new(request.id, result)).await;
            }
            Err(e) => {
                let e = anyhow::Error::from(e);
                error!(plan_id, route_id, hotspot_id, "Timeline preview failed: {:#}", e);
                let error = ErrorResponse::new(request.id, error_codes::REBUILD_FAILED, format!("{:#}", e));
                let _ = respond(&client, reply, &error).await;
            }
        }
    }

    Ok(())
}
