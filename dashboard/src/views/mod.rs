pub mod breadcrumbs;
pub mod series;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use click_engine::{AverageProfile, Granularity, ProfileCells, Sample};
use maud::{DOCTYPE, Markup, html};
use serde::Deserialize;
use tracing::error;

use crate::charts::{self, svg};
use crate::config::COUNTER_CHART_SAMPLES;
use crate::state::AppState;
use crate::styles::Charts as ChartClass;

use breadcrumbs::{Breadcrumb, breadcrumbs};

#[derive(Deserialize)]
pub struct RangeQuery {
    pub range: Option<String>,
}

pub fn page_shell(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                link rel="stylesheet" href="/styles.css";
                script src="https://unpkg.com/htmx.org@2.0.4" {}
            }
            body {
                main { (content) }
            }
        }
    }
}

pub async fn index(State(state): State<Arc<AppState>>) -> Markup {
    let samples = state.samples().await;

    let content = html! {
        (breadcrumbs(&[Breadcrumb { label: "clicks", href: None }]))

        h2 { "> granularity" }
        div.(ChartClass::TIME_WINDOW_SELECTOR) {
            @for g in Granularity::ALL {
                a.(ChartClass::TIME_WINDOW_BTN) href=(format!("/series/{g}")) {
                    (g.display_name())
                }
            }
        }

        h2 { "> averages" }
        div.(ChartClass::TIME_WINDOW_SELECTOR) {
            a.(ChartClass::TIME_WINDOW_BTN) href="/averages" { "Average profiles" }
        }

        h2 { "> counter" }
        (summary(&samples))
        div.(ChartClass::CHART_CONTAINER) {
            (svg::render_line_chart(&charts::counter_points(&samples, COUNTER_CHART_SAMPLES), "Counter"))
        }
    };
    page_shell("Clicks | Dashboard", content)
}

fn summary(samples: &[Sample]) -> Markup {
    let (Some(first), Some(last)) = (samples.first(), samples.last()) else {
        return html! { p.meta { "No samples recorded yet." } };
    };
    html! {
        div.(ChartClass::SINGLE_VALUE_DISPLAY) {
            div.(ChartClass::SINGLE_VALUE_NUMBER) { (svg::format_value(last.value)) }
            div.(ChartClass::SINGLE_VALUE_LABEL) {
                (samples.len()) " samples, "
                (first.time.format("%Y-%m-%d %H:%M").to_string()) " to "
                (last.time.format("%Y-%m-%d %H:%M").to_string())
                ", +" (svg::format_value((last.value - first.value).max(0.0)))
            }
        }
    }
}

pub async fn averages(State(state): State<Arc<AppState>>) -> Result<Markup, (StatusCode, String)> {
    let samples = state.samples().await;

    let mut profiles = Vec::new();
    for profile in AverageProfile::ALL {
        let cells = ProfileCells::new(&samples, profile).map_err(|e| {
            error!("Failed to compute {profile} averages: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;
        profiles.push((profile, charts::profile_bars(&cells.averages())));
    }

    let content = html! {
        (breadcrumbs(&[
            Breadcrumb { label: "clicks", href: Some("/") },
            Breadcrumb { label: "averages", href: None }])
        )

        @for (profile, bars) in &profiles {
            div.(ChartClass::CHART_CONTAINER) {
                div.(ChartClass::CHART_HEADER) { span { (profile.display_name()) } }
                (svg::render_bar_chart(bars, &format!("Average clicks by {}", profile.display_name().to_lowercase())))
            }
        }
    };
    Ok(page_shell("Average clicks | Dashboard", content))
}
