/* src/track/worker.rs */

use std::mem;
use std::path::PathBuf;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use super::gate::{CycleDiff, NotificationGate};
use super::ingress::{Ingress, PendingBatch};
use super::lock;
use crate::collection::Collection;
use crate::file::TrackFile;
use crate::range::IdRange;
use crate::sample::now_secs;

/// Phases of the worker loop.
///
/// `Idle -> Draining -> Processing -> Notifying -> Idle`. An exit request is
/// only acted on in `Idle`, so a cycle that has started always finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WorkerState {
	Idle,
	Draining,
	Processing,
	Notifying,
	Exiting,
}

#[derive(Debug, Default)]
struct ControlFlags {
	exit: bool,
	wakeup: bool,
}

/// Wakeup and shutdown signalling for the worker.
#[derive(Debug, Default)]
pub(crate) struct Control {
	flags: Mutex<ControlFlags>,
	cv: Condvar,
}

impl Control {
	pub fn wake(&self) {
		lock(&self.flags).wakeup = true;
		self.cv.notify_one();
	}

	pub fn request_exit(&self) {
		lock(&self.flags).exit = true;
		self.cv.notify_one();
	}

	/// Blocks until woken. Returns false once exit has been requested.
	fn wait(&self) -> bool {
		let guard = lock(&self.flags);
		let mut flags = self
			.cv
			.wait_while(guard, |flags| !flags.exit && !flags.wakeup)
			.unwrap_or_else(|poisoned| poisoned.into_inner());
		if flags.exit {
			return false;
		}
		flags.wakeup = false;
		true
	}
}

/// State shared between the track handle and its worker.
pub(crate) struct Shared {
	pub ingress: Ingress,
	pub gate: NotificationGate,
	pub control: Control,
}

/// Owns the collection and the log; runs on the dedicated thread.
pub(crate) struct Worker {
	shared: Arc<Shared>,
	collection: Collection,
	file: TrackFile,
}

impl Worker {
	pub fn new(
		shared: Arc<Shared>,
		file_path: PathBuf,
		max_item_count: usize,
		duration: Duration,
	) -> Self {
		Self {
			shared,
			collection: Collection::new(max_item_count, duration),
			file: TrackFile::new(file_path),
		}
	}

	pub fn run(mut self) {
		self.init();

		let mut state = WorkerState::Idle;
		let mut batch = PendingBatch::default();
		let mut diff = CycleDiff::default();

		loop {
			tracing::trace!("GPS track worker: {:?}", state);
			state = match state {
				WorkerState::Idle => {
					if self.shared.control.wait() {
						WorkerState::Draining
					} else {
						WorkerState::Exiting
					}
				}
				WorkerState::Draining => {
					batch = self.shared.ingress.take();
					WorkerState::Processing
				}
				WorkerState::Processing => {
					diff = self.apply(mem::take(&mut batch));
					WorkerState::Notifying
				}
				WorkerState::Notifying => {
					self.shared.gate.deliver(&self.collection, diff);
					WorkerState::Idle
				}
				WorkerState::Exiting => {
					self.shutdown();
					break;
				}
			};
		}
	}

	fn init(&mut self) {
		match self.file.read_all() {
			Ok(contents) => {
				let loaded = contents.items.len();
				let evicted = self.collection.restore(
					contents.items,
					contents.evicted_through,
					now_secs(),
				);
				self.mark_evicted(evicted);
				tracing::debug!(
					"Restored {} of {} samples from {:?} (evicted {})",
					self.collection.len(),
					loaded,
					self.file.path(),
					evicted.len()
				);
			}
			Err(e) => {
				tracing::warn!("Failed to read GPS track {:?}: {}", self.file.path(), e);
			}
		}
		self.maintain_file();
	}

	/// Applies a batch: clear, then duration, then points.
	fn apply(&mut self, batch: PendingBatch) -> CycleDiff {
		let now = now_secs();
		let mut removed = IdRange::NONE;

		if batch.need_clear {
			removed = removed.merge(self.collection.clear());
		}
		if let Some(duration) = batch.duration {
			removed = removed.merge(self.collection.set_duration(duration, now));
		}
		let result = self.collection.add(&batch.points, now);
		removed = removed.merge(result.evicted);

		self.update_file(batch.need_clear, result.added, removed);

		CycleDiff {
			added: result.added,
			removed,
		}
	}

	fn update_file(&mut self, need_clear: bool, added: IdRange, removed: IdRange) {
		if need_clear {
			if let Err(e) = self.file.truncate() {
				tracing::warn!("Failed to truncate GPS track {:?}: {}", self.file.path(), e);
			}
		}

		let items = self.collection.items_in(added);
		if let Err(e) = self.file.append(&items) {
			tracing::warn!(
				"Failed to append {} samples to GPS track {:?}: {}",
				items.len(),
				self.file.path(),
				e
			);
		}
		self.mark_evicted(removed);

		self.maintain_file();
	}

	/// Evictions only ever take a prefix, so everything up to `removed.last`
	/// is gone and a single mark covers it.
	fn mark_evicted(&mut self, removed: IdRange) {
		if removed.is_none() {
			return;
		}
		if let Err(e) = self.file.mark_evicted(removed.last) {
			tracing::warn!(
				"Failed to record eviction in GPS track {:?}: {}",
				self.file.path(),
				e
			);
		}
	}

	/// Rewrites the log from the collection once it is damaged or has grown
	/// past the collection size plus one full window of appends.
	fn maintain_file(&mut self) {
		let limit = self.collection.len() + self.collection.max_item_count();
		if !self.file.is_damaged() && self.file.records() <= limit {
			return;
		}

		let items = self.collection.snapshot();
		match self.file.rewrite(&items) {
			Ok(()) => tracing::debug!(
				"Compacted GPS track {:?} to {} records",
				self.file.path(),
				items.len()
			),
			Err(e) => {
				tracing::warn!("Failed to compact GPS track {:?}: {}", self.file.path(), e)
			}
		}
	}

	/// Commits whatever was staged but never drained, without notifying.
	fn shutdown(&mut self) {
		let batch = self.shared.ingress.take();
		if !batch.is_empty() {
			self.apply(batch);
		}
		self.file.close();
	}
}
