//! Fixed calendar windows used to chart a series piecewise (one chart per month, year, ...).

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::granularity::Granularity;
use crate::sample::Sample;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum GroupRange {
    Monthly,
    Quarterly,
    Yearly,
    ThreeYear,
    FiveYear,
    TenYear,
}

impl GroupRange {
    pub const ALL: [GroupRange; 6] = [
        GroupRange::Monthly,
        GroupRange::Quarterly,
        GroupRange::Yearly,
        GroupRange::ThreeYear,
        GroupRange::FiveYear,
        GroupRange::TenYear,
    ];

    pub fn folder_name(self) -> &'static str {
        match self {
            GroupRange::Monthly => "monthly",
            GroupRange::Quarterly => "quarterly",
            GroupRange::Yearly => "yearly",
            GroupRange::ThreeYear => "3_yearly",
            GroupRange::FiveYear => "5_yearly",
            GroupRange::TenYear => "10_yearly",
        }
    }

    /// Number of base units (month, quarter or year) in one window.
    pub fn span(self) -> u32 {
        match self {
            GroupRange::Monthly | GroupRange::Quarterly | GroupRange::Yearly => 1,
            GroupRange::ThreeYear => 3,
            GroupRange::FiveYear => 5,
            GroupRange::TenYear => 10,
        }
    }

    fn unit(self) -> Granularity {
        match self {
            GroupRange::Monthly => Granularity::Month,
            GroupRange::Quarterly => Granularity::Quarter,
            _ => Granularity::Year,
        }
    }

    fn months(self) -> u32 {
        self.unit().months() * self.span()
    }

    /// Start of the window containing `t`; multi-year windows align to the year of `t`.
    pub fn range_start(self, t: NaiveDateTime) -> NaiveDateTime {
        self.unit().period_start(t)
    }

    pub fn next_range_start(self, start: NaiveDateTime) -> Result<NaiveDateTime> {
        start
            .checked_add_months(Months::new(self.months()))
            .ok_or(Error::CalendarOverflow(start))
    }

    /// File stem for the window `[start, end)`, e.g. `2024_08`, `2024_Q3`, `2024`, `2023_2025`.
    pub fn file_name(self, start: NaiveDateTime, end: NaiveDateTime) -> String {
        match self {
            GroupRange::Monthly => start.format("%Y_%m").to_string(),
            GroupRange::Quarterly => format!("{}_Q{}", start.year(), start.month0() / 3 + 1),
            GroupRange::Yearly => start.year().to_string(),
            _ => format!("{}_{}", start.year(), end.year() - 1),
        }
    }

    /// Consecutive windows covering `data_start..=data_end`.
    pub fn split(
        self,
        data_start: NaiveDateTime,
        data_end: NaiveDateTime,
    ) -> Result<Vec<(NaiveDateTime, NaiveDateTime)>> {
        let mut ranges = Vec::new();
        let mut current = self.range_start(data_start);
        while current <= data_end {
            let end = self.next_range_start(current)?;
            ranges.push((current, end));
            current = end;
        }
        Ok(ranges)
    }
}

/// Samples with `start <= time < end` from a time-sorted slice.
pub fn samples_in(samples: &[Sample], start: NaiveDateTime, end: NaiveDateTime) -> &[Sample] {
    let lo = samples.partition_point(|s| s.time < start);
    let hi = samples.partition_point(|s| s.time < end).max(lo);
    &samples[lo..hi]
}

impl fmt::Display for GroupRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.folder_name())
    }
}

impl FromStr for GroupRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        GroupRange::ALL
            .into_iter()
            .find(|r| r.folder_name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidGroupRange(s.to_owned()))
    }
}

impl TryFrom<String> for GroupRange {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<GroupRange> for String {
    fn from(range: GroupRange) -> Self {
        range.folder_name().to_owned()
    }
}
