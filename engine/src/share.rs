//! Linear, time-proportional splitting of counter growth across windows.

use chrono::NaiveDateTime;

use crate::sample::Sample;

/// Counter growth of `delta` spread evenly over `seconds`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rate {
    pub delta: f64,
    pub seconds: f64,
}

impl Rate {
    /// Growth between two samples.
    pub fn between(a: &Sample, b: &Sample) -> Self {
        Self {
            delta: b.value - a.value,
            seconds: seconds_between(a.time, b.time),
        }
    }

    /// Portion of this rate's growth that falls into `[window_start, window_end)` when it is
    /// applied to the segment `[segment_start, segment_end)`.
    ///
    /// Zero for non-positive growth, zero-length rates and empty overlaps.
    pub fn share(
        &self,
        segment_start: NaiveDateTime,
        segment_end: NaiveDateTime,
        window_start: NaiveDateTime,
        window_end: NaiveDateTime,
    ) -> f64 {
        if self.seconds <= 0.0 || self.delta <= 0.0 {
            return 0.0;
        }
        let overlap_start = segment_start.max(window_start);
        let overlap_end = segment_end.min(window_end);
        let overlap = seconds_between(overlap_start, overlap_end);
        if overlap <= 0.0 {
            return 0.0;
        }
        self.delta * (overlap / self.seconds)
    }
}

/// Portion of `value_b - value_a` that falls into `[window_start, window_end)`, assuming the
/// counter grows linearly from `time_a` to `time_b`.
pub fn boundary_share(
    value_a: f64,
    value_b: f64,
    time_a: NaiveDateTime,
    time_b: NaiveDateTime,
    window_start: NaiveDateTime,
    window_end: NaiveDateTime,
) -> f64 {
    let rate = Rate {
        delta: value_b - value_a,
        seconds: seconds_between(time_a, time_b),
    };
    rate.share(time_a, time_b, window_start, window_end)
}

pub(crate) fn seconds_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    (to - from).num_milliseconds() as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use crate::sample::parse_timestamp;

    use super::*;

    fn ts(text: &str) -> NaiveDateTime {
        parse_timestamp(text).unwrap()
    }

    fn share(a: f64, b: f64, ta: &str, tb: &str, ws: &str, we: &str) -> f64 {
        boundary_share(a, b, ts(ta), ts(tb), ts(ws), ts(we))
    }

    #[test]
    fn full_segment_inside_window() {
        let result = share(
            100.0,
            115.0,
            "2024-08-11 10:00:00",
            "2024-08-11 22:00:00",
            "2024-08-11 00:00:00",
            "2024-08-12 00:00:00",
        );
        assert!((result - 15.0).abs() < 1e-9);
    }

    #[test]
    fn proportional_split_across_midnight() {
        let left = share(
            100.0,
            115.0,
            "2024-08-11 10:00:00",
            "2024-08-12 01:00:00",
            "2024-08-11 00:00:00",
            "2024-08-12 00:00:00",
        );
        let right = share(
            100.0,
            115.0,
            "2024-08-11 10:00:00",
            "2024-08-12 01:00:00",
            "2024-08-12 00:00:00",
            "2024-08-13 00:00:00",
        );
        assert!((left - 14.0).abs() < 1e-9);
        assert!((right - 1.0).abs() < 1e-9);
    }

    #[test]
    fn month_boundary_splits_evenly() {
        let result = share(
            1000.0,
            1024.0,
            "2024-01-31 12:00:00",
            "2024-02-01 12:00:00",
            "2024-01-01 00:00:00",
            "2024-02-01 00:00:00",
        );
        assert!((result - 12.0).abs() < 1e-9);
    }

    #[test]
    fn non_positive_delta_contributes_nothing() {
        for (a, b) in [(100.0, 100.0), (100.0, 90.0)] {
            let result = share(
                a,
                b,
                "2024-08-11 10:00:00",
                "2024-08-12 01:00:00",
                "2024-08-11 00:00:00",
                "2024-08-12 00:00:00",
            );
            assert_eq!(result, 0.0);
        }
    }

    #[test]
    fn disjoint_window_contributes_nothing() {
        let result = share(
            100.0,
            115.0,
            "2024-08-11 10:00:00",
            "2024-08-11 22:00:00",
            "2024-08-12 00:00:00",
            "2024-08-13 00:00:00",
        );
        assert_eq!(result, 0.0);
    }

    #[test]
    fn zero_duration_contributes_nothing() {
        let result = share(
            100.0,
            200.0,
            "2024-08-11 10:00:00",
            "2024-08-11 10:00:00",
            "2024-08-11 00:00:00",
            "2024-08-12 00:00:00",
        );
        assert_eq!(result, 0.0);
    }

    #[test]
    fn rate_applied_to_a_foreign_segment() {
        // 24 clicks per day applied to the 6 hours before a sample
        let rate = Rate {
            delta: 24.0,
            seconds: 86_400.0,
        };
        let result = rate.share(
            ts("2024-08-11 00:00:00"),
            ts("2024-08-11 06:00:00"),
            ts("2024-08-11 00:00:00"),
            ts("2024-08-12 00:00:00"),
        );
        assert!((result - 6.0).abs() < 1e-9);
    }
}
