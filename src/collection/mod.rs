/* src/collection/mod.rs */

mod read;
mod write;

pub use write::AddResult;

use std::collections::VecDeque;
use std::time::Duration;

use crate::sample::IdentifiedSample;

/// Ordered, id-indexed set of retained samples.
///
/// Items are kept in ascending id order. Eviction only ever pops from the
/// front, so whatever leaves in one pass is a contiguous id range. Ids come
/// from a counter that only grows, even across [`clear`](Collection::clear).
///
/// The collection is not synchronized; the track worker owns it exclusively.
#[derive(Debug, Clone)]
pub struct Collection {
	pub(crate) items: VecDeque<IdentifiedSample>,
	pub(crate) max_item_count: usize,
	pub(crate) duration: Duration,
	pub(crate) next_id: u64,
}

impl Collection {
	/// Creates an empty collection with the given retention policy.
	pub fn new(max_item_count: usize, duration: Duration) -> Self {
		Self {
			items: VecDeque::new(),
			max_item_count,
			duration,
			next_id: 0,
		}
	}
}
