/* src/track/gate.rs */

use std::panic::{self, AssertUnwindSafe};
use std::sync::Mutex;

use super::lock;
use crate::collection::Collection;
use crate::range::IdRange;
use crate::sample::IdentifiedSample;

/// Subscriber callback: samples to add, then the id range to remove.
pub type DiffCallback = Box<dyn FnMut(Vec<IdentifiedSample>, IdRange) + Send + 'static>;

/// Net effect of one processing cycle, in collection ids.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct CycleDiff {
	pub added: IdRange,
	pub removed: IdRange,
}

struct Subscriber {
	callback: Option<DiffCallback>,
	needs_snapshot: bool,
}

/// Holds the single subscriber and decides what it receives.
///
/// One lock covers both the callback and the snapshot flag. It is held while
/// the callback runs, so a callback never overlaps with a replacement and is
/// never called after being removed. The price is that replacing the callback
/// from inside the callback deadlocks.
pub(crate) struct NotificationGate {
	subscriber: Mutex<Subscriber>,
}

impl NotificationGate {
	pub fn new() -> Self {
		Self {
			subscriber: Mutex::new(Subscriber {
				callback: None,
				needs_snapshot: true,
			}),
		}
	}

	/// Replaces the callback. The next delivery to it is a full snapshot.
	pub fn set_callback(&self, callback: Option<DiffCallback>) {
		let mut subscriber = lock(&self.subscriber);
		subscriber.callback = callback;
		subscriber.needs_snapshot = true;
	}

	/// Delivers a cycle's outcome to the subscriber, if there is one.
	///
	/// A fresh subscriber gets every retained sample and no removals. Later
	/// deliveries carry the samples still retained out of `diff.added` and the
	/// removed range. Nothing is sent when there is nothing to say. Returns
	/// whether the callback ran.
	pub fn deliver(&self, collection: &Collection, diff: CycleDiff) -> bool {
		let mut guard = lock(&self.subscriber);
		let subscriber = &mut *guard;
		let Some(callback) = subscriber.callback.as_mut() else {
			return false;
		};

		let (to_add, to_remove) = if subscriber.needs_snapshot {
			subscriber.needs_snapshot = false;
			(collection.snapshot(), IdRange::NONE)
		} else {
			(collection.items_in(diff.added), diff.removed)
		};

		if to_add.is_empty() && to_remove.is_none() {
			return false;
		}

		if panic::catch_unwind(AssertUnwindSafe(|| callback(to_add, to_remove))).is_err() {
			tracing::error!("GPS track callback panicked; diff dropped");
		}
		true
	}
}
