/* src/track/mod.rs */

//!
//! The GPS track store: a producer-facing handle over a dedicated worker.
//!
//! Producers stage work and return immediately. The worker owns the
//! [`Collection`](crate::collection::Collection) and the
//! [`TrackFile`](crate::file::TrackFile) and is the only thread that touches
//! them. Three locks exist:
//!
//! - the ingress lock, around staged points and flags;
//! - the callback lock, around the subscriber, held while it runs;
//! - the control lock, paired with the worker's condition variable.
//!
//! The only nesting is a callback staging work, which takes the ingress and
//! control locks under the callback lock. Nothing takes them the other way.

mod error;
mod gate;
mod ingress;
#[cfg(feature = "stream")]
mod stream;
mod worker;

pub use error::TrackError;
pub use gate::DiffCallback;
#[cfg(feature = "stream")]
pub use stream::{DiffStream, TrackDiff};

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::config::TrackConfig;
use crate::range::IdRange;
use crate::sample::{IdentifiedSample, Sample};
use gate::NotificationGate;
use ingress::Ingress;
use worker::{Control, Shared, Worker};

/// Locks a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Bounded, time-windowed, disk-backed GPS track.
///
/// All methods may be called from any thread and never wait on disk IO or
/// on the subscriber. Dropping the track stops the worker after it finishes
/// its current cycle, commits anything still staged and closes the file.
pub struct GpsTrack {
	shared: Arc<Shared>,
	file_path: PathBuf,
	max_item_count: usize,
	thread: Option<JoinHandle<()>>,
}

impl GpsTrack {
	/// Creates a track persisted at `file_path` and starts its worker.
	///
	/// The file is read on the worker thread and only created on first write.
	pub fn new(
		file_path: impl Into<PathBuf>,
		max_item_count: usize,
		duration: Duration,
	) -> Result<Self, TrackError> {
		let file_path = file_path.into();
		let shared = Arc::new(Shared {
			ingress: Ingress::new(duration),
			gate: NotificationGate::new(),
			control: Control::default(),
		});

		let worker = Worker::new(
			Arc::clone(&shared),
			file_path.clone(),
			max_item_count,
			duration,
		);
		let thread = thread::Builder::new()
			.name("gps-track".to_string())
			.spawn(move || worker.run())
			.map_err(TrackError::Spawn)?;

		Ok(Self {
			shared,
			file_path,
			max_item_count,
			thread: Some(thread),
		})
	}

	/// Creates a track from a config.
	pub fn from_config(config: &TrackConfig) -> Result<Self, TrackError> {
		Self::new(
			config.file_path.clone(),
			config.max_item_count,
			config.duration,
		)
	}

	/// Loads a config file and creates a track from it.
	#[cfg(feature = "config-file")]
	pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self, TrackError> {
		let config = TrackConfig::load(path)?;
		Self::from_config(&config)
	}

	/// Stages one point.
	pub fn add_point(&self, point: Sample) {
		self.add_points(std::slice::from_ref(&point));
	}

	/// Stages points. Points with an unusable or out-of-order timestamp are
	/// dropped without notice.
	pub fn add_points(&self, points: &[Sample]) {
		if self.shared.ingress.push(points) {
			self.shared.control.wake();
		}
	}

	/// Stages removal of every point, including points staged before this call.
	pub fn clear(&self) {
		self.shared.ingress.clear();
		self.shared.control.wake();
	}

	/// Stages a new retention window. Samples that fall outside it are
	/// evicted; widening it never brings evicted samples back.
	pub fn set_duration(&self, duration: Duration) {
		self.shared.ingress.set_duration(duration);
		self.shared.control.wake();
	}

	/// Returns the last duration set, applied or not.
	pub fn duration(&self) -> Duration {
		self.shared.ingress.duration()
	}

	pub fn max_item_count(&self) -> usize {
		self.max_item_count
	}

	pub fn file_path(&self) -> &Path {
		&self.file_path
	}

	/// Registers the subscriber, replacing any previous one.
	///
	/// The first call after registration receives every retained sample with
	/// [`IdRange::NONE`] as the removal; later calls receive only changes.
	/// Calls come from the worker thread, one at a time, in commit order.
	///
	/// # Deadlocks
	///
	/// The callback runs under the lock that guards it. Calling
	/// [`set_callback`](Self::set_callback) or
	/// [`remove_callback`](Self::remove_callback) from inside the callback
	/// deadlocks. Staging points, clears and durations from inside it is fine.
	pub fn set_callback<F>(&self, callback: F)
	where
		F: FnMut(Vec<IdentifiedSample>, IdRange) + Send + 'static,
	{
		self.replace_callback(Some(Box::new(callback)));
	}

	/// Unregisters the subscriber. Changes made meanwhile are not queued.
	pub fn remove_callback(&self) {
		self.replace_callback(None);
	}

	/// Sets or clears the subscriber in one call.
	pub fn replace_callback(&self, callback: Option<DiffCallback>) {
		let has_callback = callback.is_some();
		self.shared.gate.set_callback(callback);
		if has_callback {
			self.shared.control.wake();
		}
	}
}

impl Drop for GpsTrack {
	fn drop(&mut self) {
		self.shared.control.request_exit();
		if let Some(thread) = self.thread.take() {
			if thread.join().is_err() {
				tracing::error!("GPS track worker for {:?} panicked", self.file_path);
			}
		}
	}
}

impl std::fmt::Debug for GpsTrack {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("GpsTrack")
			.field("file_path", &self.file_path)
			.field("max_item_count", &self.max_item_count)
			.field("duration", &self.duration())
			.finish_non_exhaustive()
	}
}
