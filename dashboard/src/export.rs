//! Writes the period charts to `plot_dir` as standalone SVG files.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use click_engine::{AverageProfile, Granularity, ProfileCells, Sample};
use tracing::debug;

use crate::charts::{self, svg};

/// Folder holding the average profile charts.
pub const AVERAGE_DIR: &str = "average";

/// Renders every granularity's full chart plus one chart per charted range window, then the
/// average profiles.
///
/// Layout: `<plot_dir>/<granularity>/all.svg`, `<plot_dir>/<granularity>/<range>/<window>.svg`,
/// `<plot_dir>/average/<profile>.svg` and `<plot_dir>/average/<profile>/<range>/<window>.svg`.
/// Returns the written paths.
pub fn export_all(samples: &[Sample], plot_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for granularity in Granularity::ALL {
        let dir = plot_dir.join(granularity.folder_name());

        let series = charts::full_series(samples, granularity)?;
        let label = format!("{} clicks", granularity.display_name());
        let markup = svg::render_bar_chart(&charts::bars(&series), &label);
        written.push(write_svg(&dir, "all", &markup.into_string())?);

        for &range in granularity.group_ranges() {
            let range_dir = dir.join(range.folder_name());
            for chart in charts::range_charts(samples, granularity, range, usize::MAX)? {
                let markup = svg::render_bar_chart(&chart.bars, &chart.title);
                written.push(write_svg(&range_dir, &chart.file_name, &markup.into_string())?);
            }
        }
    }
    written.extend(export_averages(samples, &plot_dir.join(AVERAGE_DIR))?);
    debug!("Exported {} charts to {plot_dir:?}", written.len());
    Ok(written)
}

fn export_averages(samples: &[Sample], dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for profile in AverageProfile::ALL {
        let cells = ProfileCells::new(samples, profile)?;
        let label = format!("Average clicks by {}", profile.display_name().to_lowercase());
        let markup = svg::render_bar_chart(&charts::profile_bars(&cells.averages()), &label);
        written.push(write_svg(dir, profile.folder_name(), &markup.into_string())?);

        let (Some(first), Some(last)) = (samples.first(), samples.last()) else {
            continue;
        };
        if cells.is_empty() {
            continue;
        }
        for &range in profile.group_ranges() {
            let range_dir = dir.join(profile.folder_name()).join(range.folder_name());
            for (start, end) in range.split(first.time, last.time)? {
                let file_name = range.file_name(start, end);
                let bars = charts::profile_bars(&cells.averages_between(start, end));
                let markup = svg::render_bar_chart(&bars, &format!("{label}, {file_name}"));
                written.push(write_svg(&range_dir, &file_name, &markup.into_string())?);
            }
        }
    }
    Ok(written)
}

fn write_svg(dir: &Path, stem: &str, content: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {dir:?}"))?;
    let path = dir.join(format!("{stem}.svg"));
    fs::write(&path, content).with_context(|| format!("Failed to write {path:?}"))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use click_engine::sample::parse_timestamp;

    use super::*;

    #[test]
    fn writes_the_expected_layout() {
        let dir = tempfile::tempdir().unwrap();
        let samples: Vec<Sample> = [
            ("2024-12-30 12:00:00", 10_000.0),
            ("2025-01-02 12:00:00", 10_072.0),
        ]
        .iter()
        .map(|(t, v)| Sample::new(parse_timestamp(t).unwrap(), *v))
        .collect();

        let written = export_all(&samples, dir.path()).unwrap();

        for expected in [
            "daily/all.svg",
            "daily/monthly/2024_12.svg",
            "daily/monthly/2025_01.svg",
            "daily/quarterly/2024_Q4.svg",
            "daily/yearly/2025.svg",
            "monthly/yearly/2025.svg",
            "monthly/3_yearly/2024_2026.svg",
            "quarterly/yearly/2024.svg",
            "quarterly/5_yearly/2024_2028.svg",
            "yearly/all.svg",
            "yearly/3_yearly/2024_2026.svg",
            "yearly/10_yearly/2024_2033.svg",
        ] {
            let path = dir.path().join(expected);
            assert!(path.is_file(), "missing {expected}");
            assert!(written.contains(&path));
        }
        for unexpected in [
            "daily/3_yearly",
            "daily/10_yearly",
            "monthly/quarterly",
            "monthly/5_yearly",
            "quarterly/3_yearly",
            "yearly/5_yearly",
            "yearly/yearly",
        ] {
            assert!(!dir.path().join(unexpected).exists(), "unexpected {unexpected}");
        }
    }

    #[test]
    fn writes_hour_of_day_profiles_per_year_and_month() {
        let dir = tempfile::tempdir().unwrap();
        let start = parse_timestamp("2024-01-01 00:00:00").unwrap();
        let hours = (parse_timestamp("2025-02-01 00:00:00").unwrap() - start).num_hours();
        let samples: Vec<Sample> = (0..=hours)
            .map(|h| Sample::new(start + chrono::Duration::hours(h), 10.0 * h as f64))
            .collect();

        export_all(&samples, dir.path()).unwrap();

        for expected in [
            "average/hours_of_day.svg",
            "average/days_of_week.svg",
            "average/months_of_year.svg",
            "average/hours_of_day/yearly/2024.svg",
            "average/hours_of_day/yearly/2025.svg",
            "average/hours_of_day/monthly/2024_01.svg",
            "average/hours_of_day/monthly/2025_01.svg",
            "average/days_of_week/yearly/2025.svg",
        ] {
            assert!(dir.path().join(expected).is_file(), "missing {expected}");
        }
        assert!(!dir.path().join("average/months_of_year").exists());

        let content = fs::read_to_string(dir.path().join("average/hours_of_day/monthly/2024_01.svg"))
            .unwrap();
        assert!(content.contains("13:00: 10"));
    }

    #[test]
    fn too_few_samples_still_write_placeholders() {
        let dir = tempfile::tempdir().unwrap();
        let written = export_all(&[], dir.path()).unwrap();
        assert_eq!(
            written.len(),
            Granularity::ALL.len() + AverageProfile::ALL.len()
        );
        let content = fs::read_to_string(dir.path().join("daily/all.svg")).unwrap();
        assert!(content.contains("no data"));
    }
}
