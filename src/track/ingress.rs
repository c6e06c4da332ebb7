/* src/track/ingress.rs */

use std::mem;
use std::sync::Mutex;
use std::time::Duration;

use super::lock;
use crate::sample::Sample;

/// Work staged by producers since the last drain.
#[derive(Debug, Default)]
pub(crate) struct PendingBatch {
	pub points: Vec<Sample>,
	pub need_clear: bool,
	pub duration: Option<Duration>,
}

impl PendingBatch {
	pub fn is_empty(&self) -> bool {
		self.points.is_empty() && !self.need_clear && self.duration.is_none()
	}
}

#[derive(Debug)]
struct Staging {
	batch: PendingBatch,
	/// Last duration requested, whether or not the worker applied it yet.
	duration: Duration,
}

/// Producer-side staging area.
///
/// Producers hold the lock only to append or flag. The worker takes the whole
/// batch in one swap and processes it after the lock is released.
#[derive(Debug)]
pub(crate) struct Ingress {
	staging: Mutex<Staging>,
}

impl Ingress {
	pub fn new(duration: Duration) -> Self {
		Self {
			staging: Mutex::new(Staging {
				batch: PendingBatch::default(),
				duration,
			}),
		}
	}

	/// Stages points with a usable timestamp. Returns false if none were.
	pub fn push(&self, points: &[Sample]) -> bool {
		let mut staging = lock(&self.staging);
		let before = staging.batch.points.len();
		staging.batch.points.extend(
			points
				.iter()
				.filter(|point| point.has_valid_timestamp())
				.copied(),
		);
		staging.batch.points.len() > before
	}

	/// Stages a clear. Points staged before it are discarded.
	pub fn clear(&self) {
		let mut staging = lock(&self.staging);
		staging.batch.need_clear = true;
		staging.batch.points.clear();
	}

	pub fn set_duration(&self, duration: Duration) {
		let mut staging = lock(&self.staging);
		staging.duration = duration;
		staging.batch.duration = Some(duration);
	}

	pub fn duration(&self) -> Duration {
		lock(&self.staging).duration
	}

	/// Moves the staged batch out, leaving an empty one behind.
	pub fn take(&self) -> PendingBatch {
		mem::take(&mut lock(&self.staging).batch)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_clear_discards_earlier_points() {
		let ingress = Ingress::new(Duration::from_secs(60));
		assert!(ingress.push(&[Sample::new(1.0, 0.0, 0.0)]));
		ingress.clear();
		assert!(ingress.push(&[Sample::new(2.0, 0.0, 0.0)]));

		let batch = ingress.take();
		assert!(batch.need_clear);
		assert_eq!(batch.points, vec![Sample::new(2.0, 0.0, 0.0)]);
		assert!(ingress.take().is_empty());
	}

	#[test]
	fn test_invalid_points_are_not_staged() {
		let ingress = Ingress::new(Duration::from_secs(60));
		assert!(!ingress.push(&[Sample::new(f64::NAN, 0.0, 0.0)]));
		assert!(!ingress.push(&[Sample::new(-5.0, 0.0, 0.0)]));
		assert!(ingress.take().is_empty());
	}

	#[test]
	fn test_duration_is_visible_before_drain() {
		let ingress = Ingress::new(Duration::from_secs(60));
		ingress.set_duration(Duration::from_secs(30));
		assert_eq!(ingress.duration(), Duration::from_secs(30));

		let batch = ingress.take();
		assert_eq!(batch.duration, Some(Duration::from_secs(30)));
		assert_eq!(ingress.duration(), Duration::from_secs(30));
	}
}
