//! Average growth profiles: mean counter growth per hour of day, weekday or month of year.
//!
//! Hour-of-day cells split every sample segment linearly over the hours it spans. Weekday and
//! month cells are the estimated daily and monthly increments.

use std::fmt;

use chrono::{Datelike, DurationRound, NaiveDateTime, TimeDelta, Timelike};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::granularity::Granularity;
use crate::range::GroupRange;
use crate::sample::{self, Sample};
use crate::series::compute_period_series;
use crate::share::Rate;

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AverageProfile {
    HourOfDay,
    DayOfWeek,
    MonthOfYear,
}

impl AverageProfile {
    pub const ALL: [AverageProfile; 3] = [
        AverageProfile::HourOfDay,
        AverageProfile::DayOfWeek,
        AverageProfile::MonthOfYear,
    ];

    pub fn folder_name(self) -> &'static str {
        match self {
            AverageProfile::HourOfDay => "hours_of_day",
            AverageProfile::DayOfWeek => "days_of_week",
            AverageProfile::MonthOfYear => "months_of_year",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            AverageProfile::HourOfDay => "Hour of day",
            AverageProfile::DayOfWeek => "Day of week",
            AverageProfile::MonthOfYear => "Month of year",
        }
    }

    pub fn bucket_count(self) -> usize {
        match self {
            AverageProfile::HourOfDay => 24,
            AverageProfile::DayOfWeek => 7,
            AverageProfile::MonthOfYear => 12,
        }
    }

    /// `00:00`..`23:00`, `Mon`..`Sun` or `Jan`..`Dec`.
    pub fn bucket_label(self, key: usize) -> String {
        match self {
            AverageProfile::HourOfDay => format!("{key:02}:00"),
            AverageProfile::DayOfWeek => WEEKDAYS[key % 7].to_owned(),
            AverageProfile::MonthOfYear => MONTHS[key % 12].to_owned(),
        }
    }

    /// Windows a profile is additionally charted in, besides the whole sampled span.
    pub fn group_ranges(self) -> &'static [GroupRange] {
        match self {
            AverageProfile::HourOfDay => &[GroupRange::Monthly, GroupRange::Yearly],
            AverageProfile::DayOfWeek => &[GroupRange::Yearly],
            AverageProfile::MonthOfYear => &[],
        }
    }

    fn key(self, cell_start: NaiveDateTime) -> usize {
        match self {
            AverageProfile::HourOfDay => cell_start.hour() as usize,
            AverageProfile::DayOfWeek => cell_start.weekday().num_days_from_monday() as usize,
            AverageProfile::MonthOfYear => cell_start.month0() as usize,
        }
    }
}

impl fmt::Display for AverageProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.folder_name())
    }
}

/// Mean growth of one profile bucket over `cells` hours, days or months.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileBucket {
    pub label: String,
    pub mean: f64,
    pub cells: usize,
}

/// Per-cell growth of a profile, computed once and averaged over any window.
#[derive(Debug, Clone)]
pub struct ProfileCells {
    profile: AverageProfile,
    cells: Vec<(NaiveDateTime, f64)>,
}

impl ProfileCells {
    /// Fewer than two samples give no cells.
    pub fn new(samples: &[Sample], profile: AverageProfile) -> Result<Self> {
        let cells = if samples.len() < 2 {
            Vec::new()
        } else {
            match profile {
                AverageProfile::HourOfDay => {
                    let mut sorted = samples.to_vec();
                    sample::sort_by_time(&mut sorted);
                    hourly_cells(&sorted)?
                }
                AverageProfile::DayOfWeek => compute_period_series(samples, Granularity::Day)?
                    .iter()
                    .collect(),
                AverageProfile::MonthOfYear => compute_period_series(samples, Granularity::Month)?
                    .iter()
                    .collect(),
            }
        };
        Ok(Self { profile, cells })
    }

    pub fn profile(&self) -> AverageProfile {
        self.profile
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn averages(&self) -> Vec<ProfileBucket> {
        self.summarize(&self.cells)
    }

    /// Averages over the cells starting in `[start, end)`.
    pub fn averages_between(&self, start: NaiveDateTime, end: NaiveDateTime) -> Vec<ProfileBucket> {
        let lo = self.cells.partition_point(|(t, _)| *t < start);
        let hi = self.cells.partition_point(|(t, _)| *t < end).max(lo);
        self.summarize(&self.cells[lo..hi])
    }

    fn summarize(&self, cells: &[(NaiveDateTime, f64)]) -> Vec<ProfileBucket> {
        let mut sums = vec![(0.0, 0usize); self.profile.bucket_count()];
        for &(start, growth) in cells {
            let slot = &mut sums[self.profile.key(start)];
            slot.0 += growth;
            slot.1 += 1;
        }
        sums.into_iter()
            .enumerate()
            .map(|(key, (sum, count))| ProfileBucket {
                label: self.profile.bucket_label(key),
                mean: if count == 0 { 0.0 } else { sum / count as f64 },
                cells: count,
            })
            .collect()
    }
}

/// Mean growth per bucket of `profile` over the whole sampled span.
pub fn average_profile(samples: &[Sample], profile: AverageProfile) -> Result<Vec<ProfileBucket>> {
    Ok(ProfileCells::new(samples, profile)?.averages())
}

/// Growth inside each clock hour from the hour of the first sample up to the last sample.
fn hourly_cells(sorted: &[Sample]) -> Result<Vec<(NaiveDateTime, f64)>> {
    let (Some(first), Some(last)) = (sorted.first(), sorted.last()) else {
        return Ok(Vec::new());
    };
    let hour = TimeDelta::hours(1);
    let origin = first
        .time
        .duration_trunc(hour)
        .map_err(|_| Error::CalendarOverflow(first.time))?;

    let mut cells = Vec::new();
    let mut cell = origin;
    while cell < last.time {
        cells.push((cell, 0.0));
        cell = cell
            .checked_add_signed(hour)
            .ok_or(Error::CalendarOverflow(cell))?;
    }

    for pair in sorted.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let rate = Rate::between(a, b);
        let mut index = (a.time - origin).num_hours().max(0) as usize;
        while let Some((start, growth)) = cells.get_mut(index) {
            if *start >= b.time {
                break;
            }
            *growth += rate.share(a.time, b.time, *start, *start + hour);
            index += 1;
        }
    }
    Ok(cells)
}
