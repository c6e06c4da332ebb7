/* src/track/error.rs */

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while constructing a [`GpsTrack`](super::GpsTrack).
///
/// Once running, a track never reports errors to its callers.
#[derive(Debug, Error)]
pub enum TrackError {
	#[error("failed to spawn worker thread: {0}")]
	Spawn(#[source] std::io::Error),

	#[error("config error: {0}")]
	Config(#[from] ConfigError),
}
