use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::Result;
use crate::estimator::PeriodEstimator;
use crate::granularity::Granularity;
use crate::grouping::{group_samples, period_records};
use crate::sample::{self, Sample};

/// Estimated counter growth within one period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodIncrement {
    #[serde(with = "sample::timestamp")]
    pub start: NaiveDateTime,
    #[serde(with = "sample::timestamp")]
    pub end: NaiveDateTime,
    pub increment: f64,
}

/// Gap-free, ordered period series produced by [`compute_period_series`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSeries {
    granularity: Granularity,
    periods: Vec<PeriodIncrement>,
}

impl PeriodSeries {
    pub fn empty(granularity: Granularity) -> Self {
        Self {
            granularity,
            periods: Vec::new(),
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn periods(&self) -> &[PeriodIncrement] {
        &self.periods
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDateTime, f64)> + '_ {
        self.periods.iter().map(|p| (p.start, p.increment))
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Increment of the period starting exactly at `start`.
    pub fn get(&self, start: NaiveDateTime) -> Option<f64> {
        self.periods
            .binary_search_by_key(&start, |p| p.start)
            .ok()
            .map(|i| self.periods[i].increment)
    }

    pub fn total(&self) -> f64 {
        self.periods.iter().map(|p| p.increment).sum()
    }

    /// The periods starting in `[start, end)`.
    pub fn window(&self, start: NaiveDateTime, end: NaiveDateTime) -> PeriodSeries {
        let lo = self.periods.partition_point(|p| p.start < start);
        let hi = self.periods.partition_point(|p| p.start < end).max(lo);
        PeriodSeries {
            granularity: self.granularity,
            periods: self.periods[lo..hi].to_vec(),
        }
    }
}

impl<'a> IntoIterator for &'a PeriodSeries {
    type Item = &'a PeriodIncrement;
    type IntoIter = std::slice::Iter<'a, PeriodIncrement>;

    fn into_iter(self) -> Self::IntoIter {
        self.periods.iter()
    }
}

/// Reconstructs per-period counter growth for every period between the first and the last
/// sample.
///
/// Fewer than two samples yield an empty series.
pub fn compute_period_series(samples: &[Sample], granularity: Granularity) -> Result<PeriodSeries> {
    if samples.len() < 2 {
        return Ok(PeriodSeries::empty(granularity));
    }
    let sorted = sorted(samples);
    let first_start = granularity.period_start(sorted[0].time);
    let last_start = granularity.period_start(sorted[sorted.len() - 1].time);
    let periods = estimate_span(&sorted, granularity, first_start, last_start)?;
    Ok(PeriodSeries {
        granularity,
        periods,
    })
}

/// Like [`compute_period_series`] but reports exactly the periods from the one containing
/// `from` to the one containing `to`.
///
/// Periods outside the sampled span are extrapolated from the overall growth rate.
pub fn compute_period_series_between(
    samples: &[Sample],
    granularity: Granularity,
    from: NaiveDateTime,
    to: NaiveDateTime,
) -> Result<PeriodSeries> {
    if samples.len() < 2 || from > to {
        return Ok(PeriodSeries::empty(granularity));
    }
    let sorted = sorted(samples);
    let wanted_first = granularity.period_start(from);
    let wanted_last = granularity.period_start(to);
    let first_start = granularity.period_start(sorted[0].time).min(wanted_first);
    let last_start = granularity
        .period_start(sorted[sorted.len() - 1].time)
        .max(wanted_last);

    let periods = estimate_span(&sorted, granularity, first_start, last_start)?
        .into_iter()
        .filter(|p| p.start >= wanted_first && p.start <= wanted_last)
        .collect();
    Ok(PeriodSeries {
        granularity,
        periods,
    })
}

fn sorted(samples: &[Sample]) -> Vec<Sample> {
    let mut sorted = samples.to_vec();
    sample::sort_by_time(&mut sorted);
    sorted
}

fn estimate_span(
    sorted: &[Sample],
    granularity: Granularity,
    first_start: NaiveDateTime,
    last_start: NaiveDateTime,
) -> Result<Vec<PeriodIncrement>> {
    let buckets = group_samples(sorted, granularity);
    let records = period_records(&buckets, granularity, first_start, last_start)?;
    let estimator = PeriodEstimator::new(&records, sorted[0], sorted[sorted.len() - 1]);

    Ok(records
        .iter()
        .zip(estimator.estimate_all())
        .map(|(record, increment)| PeriodIncrement {
            start: record.start,
            end: record.end,
            increment,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use crate::sample::parse_timestamp;

    use super::*;

    fn ts(text: &str) -> NaiveDateTime {
        parse_timestamp(text).unwrap()
    }

    fn samples(rows: &[(&str, f64)]) -> Vec<Sample> {
        rows.iter().map(|(t, v)| Sample::new(ts(t), *v)).collect()
    }

    #[test]
    fn fewer_than_two_samples_is_empty() {
        let none = compute_period_series(&[], Granularity::Day).unwrap();
        assert!(none.is_empty());

        let one = samples(&[("2024-08-11 10:00:00", 100.0)]);
        assert!(compute_period_series(&one, Granularity::Day).unwrap().is_empty());
    }

    #[test]
    fn unsorted_input_is_sorted_first() {
        let input = samples(&[
            ("2024-08-12 01:00:00", 115.0),
            ("2024-08-11 10:00:00", 100.0),
        ]);
        let series = compute_period_series(&input, Granularity::Day).unwrap();
        assert!((series.get(ts("2024-08-11 00:00:00")).unwrap() - 14.0).abs() < 1e-9);
        assert!((series.get(ts("2024-08-12 00:00:00")).unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn between_pads_a_whole_year() {
        let input = samples(&[
            ("2024-03-01 00:00:00", 0.0),
            ("2024-03-31 00:00:00", 30.0),
        ]);
        let series = compute_period_series_between(
            &input,
            Granularity::Month,
            ts("2024-01-01 00:00:00"),
            ts("2024-12-31 00:00:00"),
        )
        .unwrap();
        assert_eq!(series.len(), 12);
        assert_eq!(series.periods()[0].start, ts("2024-01-01 00:00:00"));
        // one click per day before and after the data
        assert!((series.get(ts("2024-02-01 00:00:00")).unwrap() - 29.0).abs() < 1e-9);
        assert!((series.get(ts("2024-03-01 00:00:00")).unwrap() - 30.0).abs() < 1e-9);
        assert!((series.get(ts("2024-04-01 00:00:00")).unwrap() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn between_with_inverted_bounds_is_empty() {
        let input = samples(&[
            ("2024-03-01 00:00:00", 0.0),
            ("2024-03-31 00:00:00", 30.0),
        ]);
        let series = compute_period_series_between(
            &input,
            Granularity::Month,
            ts("2024-12-01 00:00:00"),
            ts("2024-01-01 00:00:00"),
        )
        .unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn windows_of_a_padded_series_match_separate_computations() {
        let input = samples(&[
            ("2024-03-10 06:00:00", 0.0),
            ("2024-05-02 18:00:00", 40.0),
            ("2024-09-20 12:00:00", 95.0),
        ]);
        let whole = compute_period_series_between(
            &input,
            Granularity::Month,
            ts("2024-01-01 00:00:00"),
            ts("2024-12-31 23:59:59"),
        )
        .unwrap();

        for (start, end) in [
            ("2024-01-01 00:00:00", "2024-07-01 00:00:00"),
            ("2024-07-01 00:00:00", "2025-01-01 00:00:00"),
        ] {
            let separate = compute_period_series_between(
                &input,
                Granularity::Month,
                ts(start),
                ts(end) - chrono::Duration::seconds(1),
            )
            .unwrap();
            assert_eq!(whole.window(ts(start), ts(end)), separate);
        }
    }

    #[test]
    fn serializes_periods() {
        let input = samples(&[
            ("2024-08-11 10:00:00", 100.0),
            ("2024-08-11 22:00:00", 130.0),
        ]);
        let series = compute_period_series(&input, Granularity::Day).unwrap();
        let json = serde_json::to_value(&series).unwrap();
        assert_eq!(json["granularity"], "day");
        assert_eq!(json["periods"][0]["start"], "2024-08-11 00:00:00");
        assert_eq!(json["periods"][0]["end"], "2024-08-12 00:00:00");
        assert_eq!(json["periods"][0]["increment"], 30.0);
    }
}
