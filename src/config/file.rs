/* src/config/file.rs */

use std::path::Path;
use std::time::Duration;

use validator::{Validate, ValidationError};

#[cfg(feature = "logging")]
use log::{error, info};

use super::{ConfigError, TrackConfig};

/// Supported config file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
	Json,
	Toml,
}

impl ConfigFormat {
	pub fn extensions(&self) -> &'static [&'static str] {
		match self {
			Self::Json => &["json"],
			Self::Toml => &["toml"],
		}
	}

	/// Picks the format from a file extension.
	pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
		let ext = path
			.extension()
			.and_then(|ext| ext.to_str())
			.unwrap_or_default();
		[Self::Json, Self::Toml]
			.into_iter()
			.find(|format| format.extensions().contains(&ext))
			.ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))
	}

	fn parse(&self, input: &str) -> Result<TrackConfig, ConfigError> {
		match self {
			Self::Json => {
				serde_json::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))
			}
			Self::Toml => toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string())),
		}
	}
}

pub(super) fn validate_duration(duration: &Duration) -> Result<(), ValidationError> {
	if duration.is_zero() {
		return Err(ValidationError::new("zero_duration"));
	}
	Ok(())
}

impl TrackConfig {
	/// Parses and validates a JSON config.
	pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
		Self::parse_validated(ConfigFormat::Json, input)
	}

	/// Parses and validates a TOML config.
	pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
		Self::parse_validated(ConfigFormat::Toml, input)
	}

	/// Reads a config file, choosing the format by extension.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let result = ConfigFormat::from_path(path).and_then(|format| {
			let input = std::fs::read_to_string(path)?;
			Self::parse_validated(format, &input)
		});

		#[cfg(feature = "logging")]
		match &result {
			Ok(config) => info!(
				"Loaded track config from {:?}: {:?}, {} items, {:?}",
				path, config.file_path, config.max_item_count, config.duration
			),
			Err(e) => error!("Invalid track config {:?}: {}", path, e),
		}

		result
	}

	fn parse_validated(format: ConfigFormat, input: &str) -> Result<Self, ConfigError> {
		let config = format.parse(input)?;
		config.validate()?;
		Ok(config)
	}
}
