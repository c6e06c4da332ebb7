/* src/lib.rs */

//!
//! A bounded, time-windowed, disk-backed store of GPS samples.
//!
//! Points arrive from any thread, are kept under a count and age limit,
//! survive restarts through an append-only log, and a single subscriber
//! is told about additions and evictions as incremental diffs.
//!
//! - **sample**: `Sample` and `IdentifiedSample`.
//! - **range**: `IdRange`, the contiguous removal range and its "none" sentinel.
//! - **collection**: The in-memory retained set and its retention policy.
//! - **file**: The append-only on-disk log.
//! - **track**: `GpsTrack`, the thread-safe handle over a dedicated worker.
//! - **config**: `TrackConfig` and its builder.
//!
//! ## Feature Flags
//!
//! - `full`: Enables all features.
//! - `config-file`: Load `TrackConfig` from JSON or TOML files (default).
//! - `logging`: `log` records for config loading.
//! - `stream`: Receive diffs as an async `Stream` (`GpsTrack::diff_stream`).
//!
//! ## Basic Usage
//!
//! ```no_run
//! use std::time::Duration;
//! use gpstrack::{GpsTrack, Sample, now_secs};
//!
//! let track = GpsTrack::new("track.dat", 10_000, Duration::from_secs(3600))?;
//! track.set_callback(|added, removed| {
//! 	println!("+{} -{:?}", added.len(), removed.as_inclusive());
//! });
//! track.add_point(Sample::new(now_secs(), 55.75, 37.61));
//! # Ok::<(), gpstrack::TrackError>(())
//! ```

pub mod collection;
pub mod config;
mod default;
pub mod file;
pub mod range;
pub mod sample;
pub mod track;

pub use collection::{AddResult, Collection};
pub use config::{ConfigError, TrackConfig, TrackConfigBuilder};
pub use default::default_track;
pub use file::{FileError, LogContents, TrackFile};
pub use range::{INVALID_ID, IdRange};
pub use sample::{IdentifiedSample, Sample, now_secs};
pub use track::{DiffCallback, GpsTrack, TrackError};

#[cfg(feature = "stream")]
pub use track::{DiffStream, TrackDiff};
