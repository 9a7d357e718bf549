//! Behavioral constants for chart rendering and background refresh.

/// Range windows rendered per page, most recent first.
pub const MAX_RANGE_CHARTS: usize = 12;

/// Raw samples drawn in the counter chart on the index page.
pub const COUNTER_CHART_SAMPLES: usize = 500;
