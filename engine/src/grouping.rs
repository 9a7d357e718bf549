use chrono::NaiveDateTime;

use crate::error::Result;
use crate::granularity::Granularity;
use crate::sample::Sample;

/// First and last sample of one period that contains data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodBucket {
    pub start: NaiveDateTime,
    pub first: Sample,
    pub last: Sample,
}

/// One slot of the dense period arena. Empty periods keep their slot with no samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodRecord {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub first: Option<Sample>,
    pub last: Option<Sample>,
}

impl PeriodRecord {
    pub fn has_data(&self) -> bool {
        self.first.is_some() && self.last.is_some()
    }
}

/// Groups time-sorted samples into one bucket per period that holds at least one sample.
///
/// Single pass; the input must already be sorted by time.
pub fn group_samples(samples: &[Sample], granularity: Granularity) -> Vec<PeriodBucket> {
    let mut buckets: Vec<PeriodBucket> = Vec::new();
    for sample in samples {
        let start = granularity.period_start(sample.time);
        match buckets.last_mut() {
            Some(bucket) if bucket.start == start => bucket.last = *sample,
            _ => buckets.push(PeriodBucket {
                start,
                first: *sample,
                last: *sample,
            }),
        }
    }
    buckets
}

/// Lays buckets out over every period from `first_start` to `last_start` inclusive.
///
/// Buckets outside that span are ignored.
pub fn period_records(
    buckets: &[PeriodBucket],
    granularity: Granularity,
    first_start: NaiveDateTime,
    last_start: NaiveDateTime,
) -> Result<Vec<PeriodRecord>> {
    let mut records = Vec::new();
    let mut pending = buckets
        .iter()
        .skip_while(|b| b.start < first_start)
        .peekable();

    let mut start = granularity.period_start(first_start);
    while start <= last_start {
        let end = granularity.period_end(start)?;
        let bucket = pending.next_if(|b| b.start == start);
        records.push(PeriodRecord {
            start,
            end,
            first: bucket.map(|b| b.first),
            last: bucket.map(|b| b.last),
        });
        start = end;
    }
    Ok(records)
}
