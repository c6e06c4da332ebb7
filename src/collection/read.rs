/* src/collection/read.rs */

use std::time::Duration;

use super::Collection;
use crate::range::IdRange;
use crate::sample::IdentifiedSample;

impl Collection {
	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	pub fn max_item_count(&self) -> usize {
		self.max_item_count
	}

	pub fn duration(&self) -> Duration {
		self.duration
	}

	/// Id the next admitted sample will receive.
	pub fn next_id(&self) -> u64 {
		self.next_id
	}

	/// Iterates retained samples oldest first.
	pub fn iter(&self) -> impl Iterator<Item = &IdentifiedSample> {
		self.items.iter()
	}

	/// Copies out every retained sample, oldest first.
	pub fn snapshot(&self) -> Vec<IdentifiedSample> {
		self.items.iter().copied().collect()
	}

	/// Looks up a retained sample by id.
	pub fn get(&self, id: u64) -> Option<&IdentifiedSample> {
		self.items
			.binary_search_by_key(&id, |item| item.id)
			.ok()
			.and_then(|idx| self.items.get(idx))
	}

	/// Returns the id range currently retained.
	pub fn id_range(&self) -> IdRange {
		match (self.items.front(), self.items.back()) {
			(Some(front), Some(back)) => IdRange::new(front.id, back.id),
			_ => IdRange::NONE,
		}
	}

	/// Copies out the retained samples whose ids fall inside `range`.
	pub fn items_in(&self, range: IdRange) -> Vec<IdentifiedSample> {
		let Some(ids) = range.as_inclusive() else {
			return Vec::new();
		};
		let start = self.items.partition_point(|item| item.id < *ids.start());
		self.items
			.range(start..)
			.take_while(|item| item.id <= *ids.end())
			.copied()
			.collect()
	}

	/// Timestamp of the newest retained sample.
	pub fn latest_timestamp(&self) -> Option<f64> {
		self.items.back().map(|item| item.sample.timestamp)
	}
}
