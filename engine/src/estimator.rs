use crate::grouping::PeriodRecord;
use crate::neighbors::NeighborIndex;
use crate::sample::Sample;
use crate::share::{Rate, boundary_share};

/// Attributes counter growth to every slot of a dense period arena.
pub struct PeriodEstimator<'a> {
    records: &'a [PeriodRecord],
    neighbors: NeighborIndex,
    first_overall: Sample,
    last_overall: Sample,
    trend: Rate,
}

impl<'a> PeriodEstimator<'a> {
    /// `first_overall` and `last_overall` bound the whole sample sequence and drive the
    /// global trend used for periods beyond the edges of the data.
    pub fn new(records: &'a [PeriodRecord], first_overall: Sample, last_overall: Sample) -> Self {
        Self {
            records,
            neighbors: NeighborIndex::new(records),
            first_overall,
            last_overall,
            trend: Rate::between(&first_overall, &last_overall),
        }
    }

    pub fn estimate_all(&self) -> Vec<f64> {
        (0..self.records.len()).map(|i| self.estimate(i)).collect()
    }

    pub fn estimate(&self, index: usize) -> f64 {
        let record = &self.records[index];
        let prev = self.neighbors.prev(index).and_then(|p| self.records[p].last);
        let next = self.neighbors.next(index).and_then(|n| self.records[n].first);

        match (record.first, record.last) {
            (Some(first), Some(last)) => {
                let internal = (last.value - first.value).max(0.0);
                let left = prev.map_or(0.0, |p| share_between(&p, &first, record));
                let right = next.map_or(0.0, |n| share_between(&last, &n, record));
                internal + left + right
            }
            _ => match (prev, next) {
                (Some(p), Some(n)) => share_between(&p, &n, record),
                (None, Some(n)) => self
                    .trend
                    .share(record.start, n.time, record.start, record.end),
                (Some(p), None) => self.trend.share(p.time, record.end, record.start, record.end),
                (None, None) => (self.last_overall.value - self.first_overall.value).max(0.0),
            },
        }
    }
}

fn share_between(a: &Sample, b: &Sample, record: &PeriodRecord) -> f64 {
    boundary_share(a.value, b.value, a.time, b.time, record.start, record.end)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use crate::granularity::Granularity;
    use crate::grouping::{group_samples, period_records};
    use crate::sample::parse_timestamp;

    use super::*;

    fn ts(text: &str) -> NaiveDateTime {
        parse_timestamp(text).unwrap()
    }

    fn sample(text: &str, value: f64) -> Sample {
        Sample::new(ts(text), value)
    }

    fn estimate(samples: &[Sample], from: &str, to: &str) -> Vec<f64> {
        let g = Granularity::Day;
        let buckets = group_samples(samples, g);
        let records = period_records(&buckets, g, ts(from), ts(to)).unwrap();
        let first = samples[0];
        let last = samples[samples.len() - 1];
        PeriodEstimator::new(&records, first, last).estimate_all()
    }

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-6, "{actual:?} vs {expected:?}");
        }
    }

    #[test]
    fn empty_day_between_samples_is_interpolated() {
        // 48h from noon to noon, 48 clicks: 12 + 24 + 12
        let samples = [
            sample("2024-08-10 12:00:00", 0.0),
            sample("2024-08-12 12:00:00", 48.0),
        ];
        let result = estimate(&samples, "2024-08-10 00:00:00", "2024-08-12 00:00:00");
        assert_close(&result, &[12.0, 24.0, 12.0]);
    }

    #[test]
    fn three_days_proportional() {
        let samples = [
            sample("2024-08-10 18:00:00", 100.0),
            sample("2024-08-11 06:00:00", 112.0),
            sample("2024-08-11 18:00:00", 124.0),
            sample("2024-08-12 06:00:00", 136.0),
        ];
        let result = estimate(&samples, "2024-08-10 00:00:00", "2024-08-12 00:00:00");
        assert_close(&result, &[6.0, 24.0, 6.0]);
    }

    #[test]
    fn periods_before_the_data_follow_the_global_trend() {
        // 2 clicks per hour overall; the morning of the 9th has no left neighbor to split
        let samples = [
            sample("2024-08-09 12:00:00", 100.0),
            sample("2024-08-09 18:00:00", 112.0),
        ];
        let result = estimate(&samples, "2024-08-08 00:00:00", "2024-08-09 00:00:00");
        assert_close(&result, &[48.0, 12.0]);
    }

    #[test]
    fn periods_after_the_data_follow_the_global_trend() {
        let samples = [
            sample("2024-08-09 06:00:00", 100.0),
            sample("2024-08-09 12:00:00", 112.0),
        ];
        let result = estimate(&samples, "2024-08-09 00:00:00", "2024-08-10 00:00:00");
        assert_close(&result, &[12.0, 48.0]);
    }

    #[test]
    fn decreasing_counter_is_clamped() {
        let samples = [
            sample("2024-08-10 12:00:00", 50.0),
            sample("2024-08-11 12:00:00", 40.0),
        ];
        let result = estimate(&samples, "2024-08-10 00:00:00", "2024-08-11 00:00:00");
        assert_close(&result, &[0.0, 0.0]);
    }

    #[test]
    fn arena_without_data_gets_the_whole_delta() {
        let g = Granularity::Day;
        let records = period_records(&[], g, ts("2024-08-10 00:00:00"), ts("2024-08-10 00:00:00"))
            .unwrap();
        let estimator = PeriodEstimator::new(
            &records,
            sample("2024-08-01 00:00:00", 10.0),
            sample("2024-08-02 00:00:00", 30.0),
        );
        assert_close(&estimator.estimate_all(), &[20.0]);
    }
}
