//! Scoped style sheets, served together as `/styles.css`.

use std::sync::LazyLock;

use axum::http::header;
use axum::response::IntoResponse;

mod global {
    turf::style_sheet!("assets/global.css");
}

mod breadcrumbs {
    turf::style_sheet!("assets/breadcrumbs.css");
}

mod charts {
    turf::style_sheet!("assets/charts.css");
}

pub use breadcrumbs::ClassName as Breadcrumbs;
pub use charts::ClassName as Charts;

/// Global rules first so the scoped sheets can override them.
static DASHBOARD_CSS: LazyLock<String> = LazyLock::new(|| {
    [
        global::STYLE_SHEET,
        breadcrumbs::STYLE_SHEET,
        charts::STYLE_SHEET,
    ]
    .join("\n")
});

pub async fn stylesheet() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css")], DASHBOARD_CSS.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoped_classes_are_served() {
        for class in [
            Breadcrumbs::BREADCRUMBS,
            Charts::CHART_CONTAINER,
            Charts::SERIES_TABLE,
            Charts::TIME_WINDOW_ACTIVE,
        ] {
            assert!(DASHBOARD_CSS.contains(class), "missing {class}");
        }
        assert!(DASHBOARD_CSS.starts_with(global::STYLE_SHEET));
    }
}
