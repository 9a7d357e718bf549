pub mod svg;

use anyhow::Result;
use chrono::{Duration, NaiveDateTime};
use click_engine::{
    Granularity, GroupRange, PeriodSeries, ProfileBucket, Sample, compute_period_series,
    compute_period_series_between,
};

/// One chart drawn from a window of the period series.
pub struct RangeChart {
    pub title: String,
    pub file_name: String,
    pub bars: Vec<(String, f64)>,
}

/// `(label, increment)` pairs in period order.
pub fn bars(series: &PeriodSeries) -> Vec<(String, f64)> {
    let g = series.granularity();
    series.iter().map(|(start, v)| (g.label(start), v)).collect()
}

/// `(bucket label, mean growth)` pairs of an average profile.
pub fn profile_bars(buckets: &[ProfileBucket]) -> Vec<(String, f64)> {
    buckets.iter().map(|b| (b.label.clone(), b.mean)).collect()
}

/// Series over the whole sampled span.
pub fn full_series(samples: &[Sample], granularity: Granularity) -> Result<PeriodSeries> {
    Ok(compute_period_series(samples, granularity)?)
}

/// One chart per `range` window touched by the samples, most recent first.
///
/// The padded series is estimated once over all windows and then cut per window.
pub fn range_charts(
    samples: &[Sample],
    granularity: Granularity,
    range: GroupRange,
    limit: usize,
) -> Result<Vec<RangeChart>> {
    let (Some(first), Some(last)) = (samples.first(), samples.last()) else {
        return Ok(Vec::new());
    };
    if samples.len() < 2 {
        return Ok(Vec::new());
    }

    let windows: Vec<_> = range
        .split(first.time, last.time)?
        .into_iter()
        .rev()
        .take(limit)
        .collect();
    let (Some(&(_, latest_end)), Some(&(earliest_start, _))) = (windows.first(), windows.last())
    else {
        return Ok(Vec::new());
    };
    let series = window_series(samples, granularity, earliest_start, latest_end)?;

    Ok(windows
        .into_iter()
        .map(|(start, end)| {
            let file_name = range.file_name(start, end);
            RangeChart {
                title: format!("{} clicks, {}", granularity.display_name(), file_name),
                file_name,
                bars: bars(&series.window(start, end)),
            }
        })
        .collect())
}

/// Series for the periods of `[start, end)`, extrapolating where the window extends past
/// the samples.
pub fn window_series(
    samples: &[Sample],
    granularity: Granularity,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<PeriodSeries> {
    let last_instant = end - Duration::seconds(1);
    Ok(compute_period_series_between(
        samples,
        granularity,
        start,
        last_instant,
    )?)
}

/// `(timestamp, value)` points of the most recent raw samples.
pub fn counter_points(samples: &[Sample], limit: usize) -> Vec<(NaiveDateTime, f64)> {
    let skip = samples.len().saturating_sub(limit);
    samples[skip..].iter().map(|s| (s.time, s.value)).collect()
}
