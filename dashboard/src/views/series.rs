use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use click_engine::{Granularity, GroupRange, Sample};
use maud::{Markup, html};
use tracing::error;

use crate::charts::{self, svg};
use crate::config::MAX_RANGE_CHARTS;
use crate::state::AppState;
use crate::styles::Charts as ChartClass;

use super::RangeQuery;
use super::breadcrumbs::{Breadcrumb, breadcrumbs};
use super::page_shell;

/// Query key for the chart over the whole sampled span.
const ALL_RANGE: &str = "all";

type PageResult = Result<Markup, (StatusCode, String)>;

pub fn parse_granularity(token: &str) -> Result<Granularity, (StatusCode, String)> {
    token
        .parse()
        .map_err(|e: click_engine::Error| (StatusCode::BAD_REQUEST, e.to_string()))
}

/// Resolves a `?range=` query param; missing or `all` means the whole span.
fn parse_range(
    range: Option<&str>,
    granularity: Granularity,
) -> Result<Option<GroupRange>, (StatusCode, String)> {
    match range {
        None | Some(ALL_RANGE) => Ok(None),
        Some(token) => {
            let range: GroupRange = token
                .parse()
                .map_err(|e: click_engine::Error| (StatusCode::BAD_REQUEST, e.to_string()))?;
            if !granularity.group_ranges().contains(&range) {
                return Err((
                    StatusCode::BAD_REQUEST,
                    format!("{granularity} series are not charted in {range} windows"),
                ));
            }
            Ok(Some(range))
        }
    }
}

pub async fn series_page(
    Path(granularity): Path<String>,
    Query(query): Query<RangeQuery>,
    State(state): State<Arc<AppState>>,
) -> PageResult {
    let granularity = parse_granularity(&granularity)?;
    let range = parse_range(query.range.as_deref(), granularity)?;
    let samples = state.samples().await;
    let body = render_charts(&samples, granularity, range)?;

    let content = html! {
        (breadcrumbs(&[
            Breadcrumb { label: "clicks", href: Some("/") },
            Breadcrumb { label: granularity.display_name(), href: None }])
        )

        div #charts-container {
            (body)
        }
    };
    Ok(page_shell(
        &format!("{} clicks | Dashboard", granularity.display_name()),
        content,
    ))
}

pub async fn fragment_series_charts(
    Path(granularity): Path<String>,
    Query(query): Query<RangeQuery>,
    State(state): State<Arc<AppState>>,
) -> PageResult {
    let granularity = parse_granularity(&granularity)?;
    let range = parse_range(query.range.as_deref(), granularity)?;
    let samples = state.samples().await;
    render_charts(&samples, granularity, range)
}

pub fn render_charts(
    samples: &[Sample],
    granularity: Granularity,
    range: Option<GroupRange>,
) -> PageResult {
    let selector = render_range_selector(granularity, range);
    let body = match range {
        None => render_full(samples, granularity),
        Some(range) => render_ranges(samples, granularity, range),
    }
    .map_err(|e| {
        error!("Failed to compute {granularity} series: {e:#}");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    Ok(html! {
        (selector)
        (body)
    })
}

fn render_range_selector(granularity: Granularity, active: Option<GroupRange>) -> Markup {
    let active_key = active.map_or(ALL_RANGE, GroupRange::folder_name);
    let keys = std::iter::once(ALL_RANGE).chain(
        granularity
            .group_ranges()
            .iter()
            .map(|r| r.folder_name()),
    );
    html! {
        div.(ChartClass::TIME_WINDOW_SELECTOR) {
            @for key in keys {
                button
                    .(ChartClass::TIME_WINDOW_BTN)
                    .(if key == active_key { ChartClass::TIME_WINDOW_ACTIVE } else { "" })
                    hx-get=(format!("/fragments/series/{granularity}?range={key}"))
                    hx-target="#charts-container"
                    hx-swap="innerHTML"
                {
                    (key)
                }
            }
        }
    }
}

fn render_full(samples: &[Sample], granularity: Granularity) -> anyhow::Result<Markup> {
    let series = charts::full_series(samples, granularity)?;
    let bars = charts::bars(&series);
    let label = format!("{} clicks", granularity.display_name());

    Ok(html! {
        div.(ChartClass::CHART_CONTAINER) {
            (svg::render_bar_chart(&bars, &label))
        }
        @if !bars.is_empty() {
            table.(ChartClass::SERIES_TABLE) {
                thead { tr { th { "period" } th { (granularity.series_column()) } } }
                tbody {
                    @for (period, value) in bars.iter().rev() {
                        tr { td { (period) } td { (svg::format_value(*value)) } }
                    }
                }
                tfoot { tr { td { "total" } td { (svg::format_value(series.total())) } } }
            }
        }
    })
}

fn render_ranges(
    samples: &[Sample],
    granularity: Granularity,
    range: GroupRange,
) -> anyhow::Result<Markup> {
    let charts = charts::range_charts(samples, granularity, range, MAX_RANGE_CHARTS)?;
    Ok(html! {
        @if charts.is_empty() {
            p.meta { "Not enough samples yet." }
        }
        @for chart in &charts {
            div.(ChartClass::CHART_CONTAINER) {
                div.(ChartClass::CHART_HEADER) { span { (chart.file_name) } }
                (svg::render_bar_chart(&chart.bars, &chart.title))
            }
        }
    })
}
