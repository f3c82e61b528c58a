//! Itinerary Worker - timeline scheduling service for multi-day trips
//!
//! This worker connects to NATS and rebuilds itinerary timelines on request.

mod cli;
mod config;
mod db;
mod defaults;
mod handlers;
mod services;
mod types;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Command};
use db::PgTimelineSource;
use services::timeline::TimelineEngine;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = config::Config::from_env()?;

    std::fs::create_dir_all(&config.logs_dir).ok();

    // File appender for persistent logs (daily rotation)
    let file_appender = RollingFileAppender::new(Rotation::DAILY, &config.logs_dir, "worker.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Initialize logging - both stdout and file
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,itinerary_worker=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer()) // stdout
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false)) // file
        .init();

    info!("Configuration loaded");

    // Connect to database
    let pool = db::create_pool(&config.database_url, config.db_max_connections).await?;
    info!("Connected to PostgreSQL");

    match cli.command.unwrap_or(Command::Serve) {
        Command::Migrate => {
            db::run_migrations(&pool).await?;
            Ok(())
        }
        Command::Rebuild { plan_id, dry_run } => rebuild_once(&pool, &config, plan_id, dry_run).await,
        Command::Serve => serve(pool, &config).await,
    }
}

async fn serve(pool: sqlx::PgPool, config: &config::Config) -> Result<()> {
    info!("Starting Itinerary Worker...");

    db::run_migrations(&pool).await?;

    // Connect to NATS (supports optional NATS_USER/NATS_PASSWORD auth).
    let nats_client = match (std::env::var("NATS_USER"), std::env::var("NATS_PASSWORD")) {
        (Ok(user), Ok(password)) if !user.is_empty() => async_nats::ConnectOptions::new()
            .user_and_password(user, password)
            .connect(&config.nats_url)
            .await
            .context("Failed to connect to NATS")?,
        _ => async_nats::connect(&config.nats_url)
            .await
            .context("Failed to connect to NATS")?,
    };
    info!("Connected to NATS at {}", config.nats_url);

    // Start message handlers
    let handler_result = handlers::start_handlers(nats_client, pool, config).await;

    if let Err(e) = handler_result {
        error!("Handler error: {}", e);
        return Err(e);
    }

    Ok(())
}

/// One-off rebuild from the command line; prints the result as JSON
async fn rebuild_once(pool: &sqlx::PgPool, config: &config::Config, plan_id: i64, dry_run: bool) -> Result<()> {
    let engine = TimelineEngine::new(config.scheduler);

    if dry_run {
        let source = PgTimelineSource::new(pool.clone());
        let result = engine.rebuild_timeline(&source, plan_id).await?;
        println!("{}", serde_json::to_string_pretty(&result)?);
        info!(plan_id, "Dry run, nothing stored");
        return Ok(());
    }

    match handlers::timeline::rebuild_and_persist(&engine, pool, plan_id).await {
        Ok(summary) => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        Err(failure) => anyhow::bail!("{}: {}", failure.code(), failure.message()),
    }
}
