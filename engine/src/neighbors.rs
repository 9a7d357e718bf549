use crate::grouping::PeriodRecord;

/// Nearest record before `index` whose last sample is known.
pub fn find_prev_with_data(records: &[PeriodRecord], index: usize) -> Option<&PeriodRecord> {
    records[..index.min(records.len())]
        .iter()
        .rev()
        .find(|r| r.last.is_some())
}

/// Nearest record after `index` whose first sample is known.
pub fn find_next_with_data(records: &[PeriodRecord], index: usize) -> Option<&PeriodRecord> {
    records
        .get(index + 1..)
        .and_then(|rest| rest.iter().find(|r| r.first.is_some()))
}

/// Precomputed neighbor lookups for every slot, built in two linear sweeps.
///
/// Answers are identical to [`find_prev_with_data`] / [`find_next_with_data`].
pub struct NeighborIndex {
    prev: Vec<Option<usize>>,
    next: Vec<Option<usize>>,
}

impl NeighborIndex {
    pub fn new(records: &[PeriodRecord]) -> Self {
        let mut prev = Vec::with_capacity(records.len());
        let mut last_seen = None;
        for (i, record) in records.iter().enumerate() {
            prev.push(last_seen);
            if record.last.is_some() {
                last_seen = Some(i);
            }
        }

        let mut next = vec![None; records.len()];
        let mut next_seen = None;
        for (i, record) in records.iter().enumerate().rev() {
            next[i] = next_seen;
            if record.first.is_some() {
                next_seen = Some(i);
            }
        }

        Self { prev, next }
    }

    pub fn prev(&self, index: usize) -> Option<usize> {
        self.prev.get(index).copied().flatten()
    }

    pub fn next(&self, index: usize) -> Option<usize> {
        self.next.get(index).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use crate::sample::{Sample, parse_timestamp};

    use super::*;

    fn records(pattern: &[bool]) -> Vec<PeriodRecord> {
        let t: NaiveDateTime = parse_timestamp("2024-01-01 00:00:00").unwrap();
        pattern
            .iter()
            .enumerate()
            .map(|(i, &has)| {
                let sample = has.then(|| Sample::new(t, i as f64));
                PeriodRecord {
                    start: t,
                    end: t,
                    first: sample,
                    last: sample,
                }
            })
            .collect()
    }

    #[test]
    fn scans_are_strict() {
        let recs = records(&[true, false, true, false, false, true]);
        assert!(find_prev_with_data(&recs, 0).is_none());
        assert_eq!(find_prev_with_data(&recs, 2).unwrap().last.unwrap().value, 0.0);
        assert_eq!(find_prev_with_data(&recs, 4).unwrap().last.unwrap().value, 2.0);
        assert_eq!(find_next_with_data(&recs, 0).unwrap().first.unwrap().value, 2.0);
        assert_eq!(find_next_with_data(&recs, 3).unwrap().first.unwrap().value, 5.0);
        assert!(find_next_with_data(&recs, 5).is_none());
        assert!(find_next_with_data(&recs, 17).is_none());
    }

    #[test]
    fn index_matches_scans() {
        let recs = records(&[false, true, false, false, true, true, false]);
        let index = NeighborIndex::new(&recs);
        for i in 0..recs.len() {
            let prev = index.prev(i).map(|p| &recs[p]);
            let next = index.next(i).map(|n| &recs[n]);
            assert_eq!(prev, find_prev_with_data(&recs, i));
            assert_eq!(next, find_next_with_data(&recs, i));
        }
    }
}
