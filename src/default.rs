/* src/default.rs */

use std::sync::OnceLock;

use crate::config::TrackConfig;
use crate::track::{GpsTrack, TrackError};

static DEFAULT_TRACK: OnceLock<Result<GpsTrack, TrackError>> = OnceLock::new();

/// Process-wide track built from [`TrackConfig::default`] on first use.
///
/// It lives until the process exits, so its worker is never joined; callers
/// that need a clean shutdown should own a [`GpsTrack`] instead.
pub fn default_track() -> Result<&'static GpsTrack, &'static TrackError> {
	DEFAULT_TRACK
		.get_or_init(|| GpsTrack::from_config(&TrackConfig::default()))
		.as_ref()
}
