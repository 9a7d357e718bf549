use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::{get, post};
use tracing::info;

use crate::state::AppState;

mod background;
mod charts;
mod config;
mod export;
mod routes;
mod state;
mod styles;
mod views;

#[tokio::main]
async fn main() -> Result<()> {
    shared::init_tracing!()?;
    let tracker_config = shared::load_tracker_config!()?;
    let state = Arc::new(AppState::new(&tracker_config));

    background::spawn_background_workers(
        Arc::clone(&state),
        Duration::from_secs(tracker_config.export_interval_seconds.max(1)),
    );

    // Fragment routes: /fragments/*
    let fragment_routes = Router::new().route(
        "/series/{granularity}",
        get(views::series::fragment_series_charts),
    );

    let api_routes = Router::new().route("/series/{granularity}", get(routes::series));

    let app = Router::new()
        .route("/", get(views::index))
        .route("/series/{granularity}", get(views::series::series_page))
        .route("/averages", get(views::averages))
        .route("/samples", post(routes::record_sample))
        .route("/styles.css", get(styles::stylesheet))
        .nest("/fragments", fragment_routes)
        .nest("/api", api_routes)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&tracker_config.listen_addr)
        .await
        .with_context(|| format!("failed to bind to {}", tracker_config.listen_addr))?;
    info!("Listening on {}", tracker_config.listen_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
