/* src/collection/write.rs */

use std::time::Duration;

use super::Collection;
use crate::range::{INVALID_ID, IdRange};
use crate::sample::{IdentifiedSample, Sample};

/// Ids at or above this are never assigned, which keeps `next_id` and every
/// id in a range clear of [`INVALID_ID`].
const MAX_ID: u64 = INVALID_ID - 1;

/// Result of an [`add`](Collection::add) call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddResult {
	/// Ids assigned to admitted samples. Some of them may already be evicted.
	pub added: IdRange,
	/// Ids evicted by the retention pass that followed.
	pub evicted: IdRange,
}

impl Collection {
	/// Repopulates the collection from persisted items.
	///
	/// Items must come in id order; anything out of order (by id or by
	/// timestamp) is dropped, as is anything at or below `evicted_through`.
	/// The id counter continues after the highest id seen, evicted or not,
	/// then retention is applied against `now`. Returns the evicted range.
	pub fn restore<I>(&mut self, items: I, evicted_through: Option<u64>, now: f64) -> IdRange
	where
		I: IntoIterator<Item = IdentifiedSample>,
	{
		self.items.clear();
		if let Some(last) = evicted_through {
			self.reserve_through(last);
		}
		for item in items {
			if item.id >= MAX_ID || !item.sample.has_valid_timestamp() {
				continue;
			}
			if evicted_through.is_some_and(|last| item.id <= last) {
				continue;
			}
			if let Some(back) = self.items.back() {
				if item.id <= back.id || item.sample.timestamp < back.sample.timestamp {
					continue;
				}
			}
			self.reserve_through(item.id);
			self.items.push_back(item);
		}
		self.evict(now)
	}

	/// Makes sure ids up to and including `id` are never handed out again.
	fn reserve_through(&mut self, id: u64) {
		self.next_id = self.next_id.max(id.saturating_add(1).min(MAX_ID));
	}

	/// Admits samples, then enforces the retention policy.
	///
	/// Samples with an unusable timestamp, or one older than the newest
	/// retained sample, are skipped silently.
	pub fn add(&mut self, samples: &[Sample], now: f64) -> AddResult {
		let mut added = IdRange::NONE;
		for sample in samples {
			if !sample.has_valid_timestamp() {
				continue;
			}
			if self
				.latest_timestamp()
				.is_some_and(|latest| sample.timestamp < latest)
			{
				continue;
			}

			if self.next_id >= MAX_ID {
				tracing::warn!("Id space exhausted; dropping sample");
				break;
			}
			let id = self.next_id;
			self.next_id += 1;
			self.items.push_back(IdentifiedSample::new(id, *sample));
			added = added.merge(IdRange::new(id, id));
		}

		AddResult {
			added,
			evicted: self.evict(now),
		}
	}

	/// Drops everything. The id counter keeps going.
	pub fn clear(&mut self) -> IdRange {
		let removed = self.id_range();
		self.items.clear();
		removed
	}

	/// Changes the retention window and evicts whatever falls out of it.
	///
	/// Widening the window never brings evicted samples back.
	pub fn set_duration(&mut self, duration: Duration, now: f64) -> IdRange {
		self.duration = duration;
		self.evict(now)
	}

	/// Pops the oldest items until the size and age limits both hold.
	pub(crate) fn evict(&mut self, now: f64) -> IdRange {
		let lower_bound = now - self.duration.as_secs_f64();
		let mut evicted = IdRange::NONE;

		while let Some(front) = self.items.front() {
			let over_count = self.items.len() > self.max_item_count;
			if !over_count && front.sample.timestamp >= lower_bound {
				break;
			}
			evicted = evicted.merge(IdRange::new(front.id, front.id));
			self.items.pop_front();
		}

		evicted
	}
}
