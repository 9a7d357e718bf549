use chrono::NaiveDateTime;
use maud::{Markup, html};

const WIDTH: f64 = 600.0;
const HEIGHT: f64 = 200.0;
const MARGIN_LEFT: f64 = 60.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 20.0;
const MARGIN_BOTTOM: f64 = 30.0;

// Fallback colors keep exported files readable outside the dashboard's stylesheet.
const BACKGROUND_STYLE: &str = "fill: var(--background, #ffffff)";
const FOREGROUND_FILL: &str = "fill: var(--foreground, #1d1d1d)";
const FOREGROUND_STROKE: &str = "stroke: var(--foreground, #1d1d1d)";
const TEXT_STYLE: &str = "fill: var(--foreground, #1d1d1d); font-family: inherit";
const SVG_CONTAINER_STYLE: &str = "width:100%;height:auto";

fn format_time(ts: NaiveDateTime) -> String {
    ts.format("%m-%d %H:%M").to_string()
}

pub fn format_value(v: f64) -> String {
    if v == v.floor() && v.abs() < 1_000_000.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.1}")
    }
}

pub fn render_bar_chart(bars: &[(String, f64)], label: &str) -> Markup {
    if bars.is_empty() {
        return empty_chart(label);
    }

    let max_val = bars.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    let max_val = if max_val == 0.0 { 1.0 } else { max_val };

    let chart_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let chart_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let bar_w = chart_w / bars.len() as f64;

    let first = bars.first().map(|(period, _)| period.as_str());
    let mid = (bars.len() > 2).then(|| bars[bars.len() / 2].0.as_str());
    let last = bars.last().map(|(period, _)| period.as_str());

    html! {
        svg viewBox=(format!("0 0 {WIDTH} {HEIGHT}")) xmlns="http://www.w3.org/2000/svg" style=(SVG_CONTAINER_STYLE) {
            rect width=(WIDTH) height=(HEIGHT) style=(BACKGROUND_STYLE) {}
            text x=(MARGIN_LEFT) y="14" font-size="12" style=(TEXT_STYLE) { (label) }
            text x=(MARGIN_LEFT - 5.0) y=(MARGIN_TOP + 10.0) font-size="10" text-anchor="end" style=(TEXT_STYLE) {
                (format_value(max_val))
            }
            text x=(MARGIN_LEFT - 5.0) y=(MARGIN_TOP + chart_h) font-size="10" text-anchor="end" style=(TEXT_STYLE) { "0" }
            @for (i, (period, val)) in bars.iter().enumerate() {
                @let bar_h = (val / max_val) * chart_h;
                @let x = MARGIN_LEFT + i as f64 * bar_w;
                @let y = MARGIN_TOP + chart_h - bar_h;
                rect x=(x) y=(y) width=((bar_w - 1.0).max(0.5)) height=(bar_h) opacity="0.7" style=(FOREGROUND_FILL) {
                    title { (period) ": " (format_value(*val)) }
                }
            }
            (write_x_axis(first, mid, last, chart_w))
        }
    }
}

/// Raw counter readings over time.
pub fn render_line_chart(points: &[(NaiveDateTime, f64)], label: &str) -> Markup {
    if points.is_empty() {
        return empty_chart(label);
    }

    let max_val = points.iter().map(|(_, v)| *v).fold(f64::NEG_INFINITY, f64::max);
    let min_val = points.iter().map(|(_, v)| *v).fold(f64::INFINITY, f64::min);
    let range = if (max_val - min_val).abs() < f64::EPSILON {
        1.0
    } else {
        max_val - min_val
    };

    let chart_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let chart_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;

    // x follows real time so irregular sampling stays visible
    let t0 = points[0].0;
    let span = (points[points.len() - 1].0 - t0).num_seconds().max(1) as f64;
    let coords: Vec<(f64, f64)> = points
        .iter()
        .map(|(ts, val)| {
            let x = MARGIN_LEFT + ((*ts - t0).num_seconds() as f64 / span) * chart_w;
            let y = MARGIN_TOP + chart_h - ((val - min_val) / range) * chart_h;
            (x, y)
        })
        .collect();

    let mut polyline = String::new();
    for (x, y) in &coords {
        if !polyline.is_empty() {
            polyline.push(' ');
        }
        use std::fmt::Write;
        let _ = write!(polyline, "{x},{y}");
    }

    let first = format_time(points[0].0);
    let mid = (points.len() > 2).then(|| format_time(points[points.len() / 2].0));
    let last = format_time(points[points.len() - 1].0);

    html! {
        svg viewBox=(format!("0 0 {WIDTH} {HEIGHT}")) xmlns="http://www.w3.org/2000/svg" style=(SVG_CONTAINER_STYLE) {
            rect width=(WIDTH) height=(HEIGHT) style=(BACKGROUND_STYLE) {}
            text x=(MARGIN_LEFT) y="14" font-size="12" style=(TEXT_STYLE) { (label) }
            text x=(MARGIN_LEFT - 5.0) y=(MARGIN_TOP + 10.0) font-size="10" text-anchor="end" style=(TEXT_STYLE) {
                (format_value(max_val))
            }
            text x=(MARGIN_LEFT - 5.0) y=(MARGIN_TOP + chart_h) font-size="10" text-anchor="end" style=(TEXT_STYLE) {
                (format_value(min_val))
            }
            polyline points=(polyline) fill="none" stroke-width="2" style=(FOREGROUND_STROKE) {}
            @for ((x, y), (ts, val)) in coords.iter().zip(points) {
                circle cx=(x) cy=(y) r="2" style=(FOREGROUND_FILL) {
                    title { (format_time(*ts)) ": " (format_value(*val)) }
                }
            }
            (write_x_axis(Some(&first), mid.as_deref(), Some(&last), chart_w))
        }
    }
}

fn write_x_axis(first: Option<&str>, mid: Option<&str>, last: Option<&str>, chart_w: f64) -> Markup {
    let label_y = HEIGHT - 5.0;
    html! {
        @if let Some(label) = first {
            text x=(MARGIN_LEFT) y=(label_y) font-size="11" text-anchor="start" style=(TEXT_STYLE) {
                (label)
            }
        }
        @if let Some(label) = mid {
            @let mid_x = MARGIN_LEFT + chart_w / 2.0;
            text x=(mid_x) y=(label_y) font-size="11" text-anchor="middle" style=(TEXT_STYLE) {
                (label)
            }
        }
        @if let Some(label) = last {
            @let end_x = MARGIN_LEFT + chart_w;
            text x=(end_x) y=(label_y) font-size="11" text-anchor="end" style=(TEXT_STYLE) {
                (label)
            }
        }
    }
}

fn empty_chart(label: &str) -> Markup {
    html! {
        svg viewBox=(format!("0 0 {WIDTH} {HEIGHT}")) xmlns="http://www.w3.org/2000/svg" style=(SVG_CONTAINER_STYLE) {
            rect width=(WIDTH) height=(HEIGHT) style=(BACKGROUND_STYLE) {}
            text x=(WIDTH / 2.0) y=(HEIGHT / 2.0) font-size="14" text-anchor="middle" style=(TEXT_STYLE) {
                (label) ": no data"
            }
        }
    }
}
