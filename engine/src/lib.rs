//! Reconstructs how much a monotonically increasing counter grew within each calendar period
//! from sparse, irregularly timed samples.
//!
//! Growth between two samples is assumed to be linear in time; periods without samples are
//! interpolated from their nearest neighbors, or extrapolated from the overall growth rate
//! when they lie beyond the sampled span.

pub mod counter_text;
pub mod error;
pub mod estimator;
pub mod granularity;
pub mod grouping;
pub mod neighbors;
pub mod profile;
pub mod range;
pub mod sample;
pub mod series;
pub mod share;

pub use counter_text::parse_counter;
pub use error::{Error, Result};
pub use granularity::Granularity;
pub use profile::{AverageProfile, ProfileBucket, ProfileCells, average_profile};
pub use range::{GroupRange, samples_in};
pub use sample::Sample;
pub use series::{PeriodIncrement, PeriodSeries, compute_period_series, compute_period_series_between};
pub use share::boundary_share;
