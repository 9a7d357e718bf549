use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::range::GroupRange;

/// Calendar unit used to bucket the counter series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Granularity {
    Day,
    Month,
    Quarter,
    Year,
}

impl Granularity {
    pub const ALL: [Granularity; 4] = [
        Granularity::Day,
        Granularity::Month,
        Granularity::Quarter,
        Granularity::Year,
    ];

    /// Start of the period enclosing `t`. Never carries a time-of-day component.
    pub fn period_start(self, t: NaiveDateTime) -> NaiveDateTime {
        let date = t.date();
        let date = match self {
            Granularity::Day => date,
            Granularity::Month => date - Days::new(u64::from(date.day0())),
            Granularity::Quarter => {
                let first_of_month = date - Days::new(u64::from(date.day0()));
                first_of_month - Months::new(date.month0() % 3)
            }
            Granularity::Year => date - Days::new(u64::from(date.ordinal0())),
        };
        date.and_time(NaiveTime::MIN)
    }

    /// Start of the period following the one starting at `start`.
    pub fn period_end(self, start: NaiveDateTime) -> Result<NaiveDateTime> {
        let next = match self {
            Granularity::Day => start.checked_add_days(Days::new(1)),
            Granularity::Month => start.checked_add_months(Months::new(1)),
            Granularity::Quarter => start.checked_add_months(Months::new(3)),
            Granularity::Year => start.checked_add_months(Months::new(12)),
        };
        next.ok_or(Error::CalendarOverflow(start))
    }

    /// Calendar months covered by one period; days report zero.
    pub fn months(self) -> u32 {
        match self {
            Granularity::Day => 0,
            Granularity::Month => 1,
            Granularity::Quarter => 3,
            Granularity::Year => 12,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Month => "month",
            Granularity::Quarter => "quarter",
            Granularity::Year => "year",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Granularity::Day => "Daily",
            Granularity::Month => "Monthly",
            Granularity::Quarter => "Quarterly",
            Granularity::Year => "Yearly",
        }
    }

    /// Name of the increment column in exported tables.
    pub fn series_column(self) -> &'static str {
        match self {
            Granularity::Day => "daily_clicks",
            Granularity::Month => "monthly_clicks",
            Granularity::Quarter => "quarterly_clicks",
            Granularity::Year => "yearly_clicks",
        }
    }

    pub fn folder_name(self) -> &'static str {
        match self {
            Granularity::Day => "daily",
            Granularity::Month => "monthly",
            Granularity::Quarter => "quarterly",
            Granularity::Year => "yearly",
        }
    }

    /// Windows a series of this granularity is charted in, one chart per window.
    pub fn group_ranges(self) -> &'static [GroupRange] {
        match self {
            Granularity::Day => &[GroupRange::Monthly, GroupRange::Quarterly, GroupRange::Yearly],
            Granularity::Month => &[GroupRange::Yearly, GroupRange::ThreeYear],
            Granularity::Quarter => &[GroupRange::Yearly, GroupRange::FiveYear],
            Granularity::Year => &[GroupRange::ThreeYear, GroupRange::TenYear],
        }
    }

    /// Short label for a period start, e.g. `2024-08-11`, `2024-08`, `2024-Q3`, `2024`.
    pub fn label(self, start: NaiveDateTime) -> String {
        match self {
            Granularity::Day => start.format("%Y-%m-%d").to_string(),
            Granularity::Month => start.format("%Y-%m").to_string(),
            Granularity::Quarter => format!("{}-Q{}", start.year(), start.month0() / 3 + 1),
            Granularity::Year => start.year().to_string(),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "daily" => Ok(Granularity::Day),
            "month" | "monthly" => Ok(Granularity::Month),
            "quarter" | "quarterly" => Ok(Granularity::Quarter),
            "year" | "yearly" => Ok(Granularity::Year),
            _ => Err(Error::InvalidGranularity(s.to_owned())),
        }
    }
}

impl TryFrom<String> for Granularity {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}
