/* src/config/error.rs */

use thiserror::Error;

/// Errors raised while building or loading a [`TrackConfig`](super::TrackConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("Builder error: {0}")]
	Builder(String),

	#[cfg(feature = "config-file")]
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[cfg(feature = "config-file")]
	#[error("parse error: {0}")]
	Parse(String),

	#[cfg(feature = "config-file")]
	#[error("unsupported config format: {0}")]
	UnsupportedFormat(String),

	#[cfg(feature = "config-file")]
	#[error("validation failed: {0}")]
	Validation(#[from] validator::ValidationErrors),
}
