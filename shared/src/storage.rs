//! JSON-lines persistence for counter samples.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use click_engine::Sample;
use click_engine::sample::{parse_timestamp, sort_by_time};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Appends JSON records as new lines, creating parent directories as needed.
pub fn append_lines<'a, T: Serialize + 'a>(
    path: &Path,
    records: impl IntoIterator<Item = &'a T>,
) -> io::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let mut buf = String::new();
    for record in records {
        buf.push_str(&serde_json::to_string(record)?);
        buf.push('\n');
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(buf.as_bytes())
}

/// Non-empty lines of `path`; a missing file has none.
fn read_lines(path: &Path) -> io::Result<Vec<String>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };
    let mut lines = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if !line.trim().is_empty() {
            lines.push(line);
        }
    }
    Ok(lines)
}

/// Parses `lines`, pairing each record with its line index; malformed lines are skipped with
/// a warning.
fn parse_lines<T: DeserializeOwned>(path: &Path, lines: &[String]) -> Vec<(usize, T)> {
    lines
        .iter()
        .enumerate()
        .filter_map(|(index, line)| match serde_json::from_str(line) {
            Ok(record) => Some((index, record)),
            Err(e) => {
                warn!("skipping record {} of {path:?}: {e}", index + 1);
                None
            }
        })
        .collect()
}

/// Loads every parsable line; malformed lines are skipped with a warning.
pub fn load_lines<T: DeserializeOwned>(path: &Path) -> io::Result<Vec<T>> {
    let lines = read_lines(path)?;
    Ok(parse_lines(path, &lines).into_iter().map(|(_, record)| record).collect())
}

/// Replaces the file content with `lines` through a temporary file in the same directory.
pub fn rewrite_lines(path: &Path, lines: &[String]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        for line in lines {
            writer.write_all(line.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
    }
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Outcome of [`SampleStore::record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recorded {
    Appended,
    /// The reading extended a flat run, so the latest sample was moved forward instead.
    Replaced,
}

/// Time-ordered sample log backed by a JSON-lines file.
///
/// Writers are serialized within the process by a mutex and across processes by an advisory
/// lock on a `<file>.lock` sidecar, so the collector and the dashboard may share one file.
pub struct SampleStore {
    path: PathBuf,
    writer: Mutex<()>,
}

/// Held while a write to the store is in progress.
struct WriteLock<'a> {
    _guard: MutexGuard<'a, ()>,
    _file: File,
}

impl SampleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".lock");
        PathBuf::from(name)
    }

    fn lock(&self) -> Result<WriteLock<'_>> {
        let guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let lock_path = self.lock_path();
        if let Some(dir) = lock_path.parent() {
            fs::create_dir_all(dir).with_context(|| format!("Failed to create {dir:?}"))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .with_context(|| format!("Failed to open {lock_path:?}"))?;
        file.lock()
            .with_context(|| format!("Failed to lock {lock_path:?}"))?;
        Ok(WriteLock {
            _guard: guard,
            _file: file,
        })
    }

    /// All stored samples, sorted by time.
    pub fn load(&self) -> Result<Vec<Sample>> {
        let mut samples: Vec<Sample> = load_lines(&self.path)
            .with_context(|| format!("Failed to read samples from {:?}", self.path))?;
        samples.retain(|s| s.value.is_finite());
        sort_by_time(&mut samples);
        Ok(samples)
    }

    /// Stores a reading taken at `time`.
    ///
    /// When the two latest samples already carry `value`, the latest one is moved to `time`
    /// so a flat run keeps only its first and most recent sample. Lines that don't parse are
    /// carried over untouched.
    pub fn record(&self, time: NaiveDateTime, value: f64) -> Result<Recorded> {
        let sample = Sample::new(time, value);
        let _lock = self.lock()?;

        let mut lines = read_lines(&self.path)
            .with_context(|| format!("Failed to read samples from {:?}", self.path))?;
        let mut parsed: Vec<(usize, Sample)> = parse_lines(&self.path, &lines);
        parsed.retain(|(_, s)| s.value.is_finite());
        parsed.sort_by_key(|(_, s)| s.time);

        let flat = parsed.len() >= 2
            && parsed[parsed.len() - 2..].iter().all(|(_, s)| s.value == value);
        match parsed.last() {
            Some(&(index, _)) if flat => {
                lines[index] = serde_json::to_string(&sample)?;
                rewrite_lines(&self.path, &lines)
                    .with_context(|| format!("Failed to rewrite {:?}", self.path))?;
                let unparsed = lines.len() - parsed.len();
                debug!(value, unparsed, "extended flat run");
                Ok(Recorded::Replaced)
            }
            _ => {
                append_lines(&self.path, [&sample])
                    .with_context(|| format!("Failed to append to {:?}", self.path))?;
                Ok(Recorded::Appended)
            }
        }
    }

    /// Appends every sample of `samples` and returns how many were written.
    pub fn extend(&self, samples: &[Sample]) -> Result<usize> {
        let _lock = self.lock()?;
        append_lines(&self.path, samples)
            .with_context(|| format!("Failed to append to {:?}", self.path))?;
        Ok(samples.len())
    }
}

/// Reads a `timestamp,number` CSV export of the sample sheet.
///
/// The header row is optional. Rows whose timestamp or number can't be parsed are dropped and
/// the result is sorted by time.
pub fn import_csv(path: &Path) -> Result<Vec<Sample>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open {path:?}"))?;

    let mut samples = Vec::new();
    let mut dropped = 0usize;
    for (index, row) in reader.records().enumerate() {
        let row = row.with_context(|| format!("Failed to read {path:?}"))?;
        if index == 0 && row.get(0) == Some("timestamp") {
            continue;
        }
        let parsed = row
            .get(0)
            .and_then(parse_timestamp)
            .zip(row.get(1).and_then(coerce_number));
        match parsed {
            Some((time, value)) => samples.push(Sample::new(time, value)),
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        warn!("dropped {dropped} malformed rows from {path:?}");
    }
    sort_by_time(&mut samples);
    Ok(samples)
}

fn coerce_number(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use chrono::Duration;

    use super::*;

    fn ts(text: &str) -> NaiveDateTime {
        parse_timestamp(text).unwrap()
    }

    #[test]
    fn load_skips_malformed_lines_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("samples.jsonl");
        let mut file = File::create(&path).unwrap();
        writeln!(file, r#"{{"timestamp":"2024-08-12 01:00:00","number":115}}"#).unwrap();
        writeln!(file, "not json").unwrap();
        writeln!(file, r#"{{"timestamp":"yesterday","number":1}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"timestamp":"2024-08-11 10:00:00","number":100}}"#).unwrap();

        let samples = SampleStore::new(&path).load().unwrap();
        assert_eq!(
            samples,
            vec![
                Sample::new(ts("2024-08-11 10:00:00"), 100.0),
                Sample::new(ts("2024-08-12 01:00:00"), 115.0),
            ]
        );
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SampleStore::new(dir.path().join("nothing.jsonl"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn flat_runs_keep_first_and_latest() {
        let dir = tempfile::tempdir().unwrap();
        let store = SampleStore::new(dir.path().join("data/samples.jsonl"));

        let rows = [
            ("2024-08-11 10:00:00", 100.0, Recorded::Appended),
            ("2024-08-11 10:04:00", 100.0, Recorded::Appended),
            ("2024-08-11 10:08:00", 100.0, Recorded::Replaced),
            ("2024-08-11 10:12:00", 100.0, Recorded::Replaced),
            ("2024-08-11 10:16:00", 101.0, Recorded::Appended),
        ];
        for (time, value, expected) in rows {
            assert_eq!(store.record(ts(time), value).unwrap(), expected);
        }

        let times: Vec<NaiveDateTime> = store.load().unwrap().iter().map(|s| s.time).collect();
        assert_eq!(
            times,
            vec![
                ts("2024-08-11 10:00:00"),
                ts("2024-08-11 10:12:00"),
                ts("2024-08-11 10:16:00"),
            ]
        );
    }

    #[test]
    fn compaction_keeps_unparsed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("samples.jsonl");
        let mut file = File::create(&path).unwrap();
        writeln!(file, r#"{{"timestamp":"2024-08-11 10:00:00","number":100}}"#).unwrap();
        writeln!(file, "not json").unwrap();
        writeln!(file, r#"{{"timestamp":"2024-08-11 10:04:00","number":100}}"#).unwrap();
        drop(file);

        let store = SampleStore::new(&path);
        assert_eq!(
            store.record(ts("2024-08-11 10:08:00"), 100.0).unwrap(),
            Recorded::Replaced
        );

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "not json");
        assert!(lines[2].contains("2024-08-11 10:08:00"));
    }

    #[test]
    fn concurrent_recorders_keep_every_sample() {
        let dir = tempfile::tempdir().unwrap();
        let store = SampleStore::new(dir.path().join("samples.jsonl"));
        let base = ts("2024-01-01 00:00:00");

        std::thread::scope(|scope| {
            // A flat run at the tail makes this writer rewrite the file on every call.
            scope.spawn(|| {
                for minute in 0..200 {
                    let time = base + Duration::days(10) + Duration::minutes(minute);
                    store.record(time, 0.0).unwrap();
                }
            });
            for writer in 1..=3i64 {
                let store = &store;
                scope.spawn(move || {
                    for i in 0..200i64 {
                        let time = base + Duration::days(writer) + Duration::seconds(i);
                        store.record(time, (writer * 1000 + i) as f64).unwrap();
                    }
                });
            }
        });

        let kept = store
            .load()
            .unwrap()
            .iter()
            .filter(|s| s.value >= 1000.0)
            .count();
        assert_eq!(kept, 600);
    }

    #[test]
    fn csv_import_coerces_and_drops() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.csv");
        fs::write(
            &path,
            "timestamp,number\n\
             2024-08-27 08:54:49,39746\n\
             2024-08-26 11:40:15,39697\n\
             garbage,12\n\
             2024-08-28 10:00:00,n/a\n\
             2024-08-29 09:23:46\n",
        )
        .unwrap();

        let samples = import_csv(&path).unwrap();
        assert_eq!(
            samples,
            vec![
                Sample::new(ts("2024-08-26 11:40:15"), 39697.0),
                Sample::new(ts("2024-08-27 08:54:49"), 39746.0),
            ]
        );
    }

    #[test]
    fn csv_without_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.csv");
        fs::write(&path, "2024-08-26 11:40:15,39697\n").unwrap();
        assert_eq!(import_csv(&path).unwrap().len(), 1);
    }
}
