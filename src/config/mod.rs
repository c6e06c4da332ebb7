/* src/config/mod.rs */

//!
//! Construction parameters for a [`GpsTrack`](crate::track::GpsTrack).

mod error;
#[cfg(feature = "config-file")]
mod file;

pub use error::ConfigError;
#[cfg(feature = "config-file")]
pub use file::ConfigFormat;

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default log file name, relative to the working directory.
pub const DEFAULT_FILE_NAME: &str = "gps_track.dat";
/// Default maximum number of retained samples.
pub const DEFAULT_MAX_ITEM_COUNT: usize = 100_000;
/// Default retention window.
pub const DEFAULT_DURATION: Duration = Duration::from_secs(24 * 60 * 60);

/// Where a track lives and how much it keeps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config-file", derive(validator::Validate))]
#[serde(default)]
pub struct TrackConfig {
	/// Path of the persisted log.
	pub file_path: PathBuf,
	/// Upper bound on retained samples.
	#[cfg_attr(feature = "config-file", validate(range(min = 1)))]
	pub max_item_count: usize,
	/// Retention window, stored as whole seconds.
	#[serde(rename = "duration_secs", with = "duration_secs")]
	#[cfg_attr(feature = "config-file", validate(custom(function = "file::validate_duration")))]
	pub duration: Duration,
}

impl Default for TrackConfig {
	fn default() -> Self {
		Self {
			file_path: PathBuf::from(DEFAULT_FILE_NAME),
			max_item_count: DEFAULT_MAX_ITEM_COUNT,
			duration: DEFAULT_DURATION,
		}
	}
}

impl TrackConfig {
	pub fn builder() -> TrackConfigBuilder {
		TrackConfigBuilder::new()
	}
}

/// Builder for [`TrackConfig`].
#[derive(Debug, Default)]
pub struct TrackConfigBuilder {
	file_path: Option<PathBuf>,
	max_item_count: Option<usize>,
	duration: Option<Duration>,
}

impl TrackConfigBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn file_path(mut self, path: impl Into<PathBuf>) -> Self {
		self.file_path = Some(path.into());
		self
	}

	pub fn max_item_count(mut self, count: usize) -> Self {
		self.max_item_count = Some(count);
		self
	}

	pub fn duration(mut self, duration: Duration) -> Self {
		self.duration = Some(duration);
		self
	}

	/// Builds the config. The path is required; the limits default.
	pub fn build(self) -> Result<TrackConfig, ConfigError> {
		let file_path = self
			.file_path
			.ok_or_else(|| ConfigError::Builder("file_path is required".to_string()))?;
		let max_item_count = self.max_item_count.unwrap_or(DEFAULT_MAX_ITEM_COUNT);
		if max_item_count == 0 {
			return Err(ConfigError::Builder(
				"max_item_count must be at least 1".to_string(),
			));
		}
		let duration = self.duration.unwrap_or(DEFAULT_DURATION);
		if duration.is_zero() {
			return Err(ConfigError::Builder("duration must be positive".to_string()));
		}

		Ok(TrackConfig {
			file_path,
			max_item_count,
			duration,
		})
	}
}

mod duration_secs {
	use std::time::Duration;

	use serde::{Deserialize, Deserializer, Serializer};

	pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_u64(duration.as_secs())
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
		u64::deserialize(deserializer).map(Duration::from_secs)
	}
}
