use std::sync::Arc;

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use chrono::Local;
use click_engine::sample::{TIMESTAMP_FORMAT, parse_timestamp};
use click_engine::{Granularity, PeriodIncrement, compute_period_series};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::state::AppState;
use crate::views::series::parse_granularity;

type ApiError = (StatusCode, String);

fn internal(e: impl std::fmt::Display) -> ApiError {
    error!("Request failed: {e:#}");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

#[derive(Deserialize)]
pub struct SampleRequest {
    number: f64,
    #[serde(default)]
    timestamp: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SampleResponse {
    status: String,
    timestamp: String,
}

pub async fn record_sample(
    State(state): State<Arc<AppState>>,
    Json(data): Json<SampleRequest>,
) -> Result<(StatusCode, Json<SampleResponse>), ApiError> {
    if !data.number.is_finite() || data.number < 0.0 {
        return Err((
            StatusCode::BAD_REQUEST,
            "number must be a finite, non-negative count".to_owned(),
        ));
    }
    let time = match data.timestamp.as_deref() {
        Some(text) => parse_timestamp(text).ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                format!("unrecognized timestamp {text:?}"),
            )
        })?,
        None => Local::now().naive_local(),
    };

    let recorded = state.record(time, data.number).await.map_err(internal)?;
    info!(value = data.number, ?recorded, "Recorded sample");

    Ok((
        StatusCode::CREATED,
        Json(SampleResponse {
            status: "recorded".to_owned(),
            timestamp: time.format(TIMESTAMP_FORMAT).to_string(),
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct SeriesResponse {
    granularity: Granularity,
    total: f64,
    periods: Vec<PeriodIncrement>,
}

pub async fn series(
    Path(granularity): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<SeriesResponse>, ApiError> {
    let granularity = parse_granularity(&granularity)?;
    let samples = state.samples().await;
    let series = compute_period_series(&samples, granularity).map_err(internal)?;

    Ok(Json(SeriesResponse {
        granularity,
        total: series.total(),
        periods: series.periods().to_vec(),
    }))
}
