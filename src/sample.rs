/* src/sample.rs */

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// A single location reading.
///
/// `timestamp` is seconds since the UNIX epoch. Retention and ordering only
/// ever look at the timestamp; coordinates are carried through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
	pub timestamp: f64,
	pub latitude: f64,
	pub longitude: f64,
	pub altitude: Option<f64>,
	/// Meters per second.
	pub speed: Option<f64>,
	/// Degrees clockwise from north.
	pub bearing: Option<f64>,
	/// Horizontal accuracy in meters.
	pub accuracy: Option<f64>,
}

impl Sample {
	pub fn new(timestamp: f64, latitude: f64, longitude: f64) -> Self {
		Self {
			timestamp,
			latitude,
			longitude,
			altitude: None,
			speed: None,
			bearing: None,
			accuracy: None,
		}
	}

	pub fn with_altitude(mut self, altitude: f64) -> Self {
		self.altitude = Some(altitude);
		self
	}

	pub fn with_speed(mut self, speed: f64) -> Self {
		self.speed = Some(speed);
		self
	}

	pub fn with_bearing(mut self, bearing: f64) -> Self {
		self.bearing = Some(bearing);
		self
	}

	pub fn with_accuracy(mut self, accuracy: f64) -> Self {
		self.accuracy = Some(accuracy);
		self
	}

	/// A timestamp is usable when it is finite and not before the epoch.
	pub fn has_valid_timestamp(&self) -> bool {
		self.timestamp.is_finite() && self.timestamp >= 0.0
	}
}

/// A sample admitted into a collection, tagged with its id.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IdentifiedSample {
	pub id: u64,
	pub sample: Sample,
}

impl IdentifiedSample {
	pub fn new(id: u64, sample: Sample) -> Self {
		Self { id, sample }
	}
}

/// Current wall-clock time in seconds since the UNIX epoch.
pub fn now_secs() -> f64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map(|d| d.as_secs_f64())
		.unwrap_or(0.0)
}
