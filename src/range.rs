/* src/range.rs */

use std::ops::RangeInclusive;

/// Reserved id that never names a real sample.
pub const INVALID_ID: u64 = u64::MAX;

/// An inclusive `[first, last]` range of sample ids.
///
/// Removals are always a contiguous prefix of a collection, so a single pair
/// describes them losslessly. [`IdRange::NONE`] means "nothing".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdRange {
	pub first: u64,
	pub last: u64,
}

impl IdRange {
	pub const NONE: IdRange = IdRange {
		first: INVALID_ID,
		last: INVALID_ID,
	};

	pub fn new(first: u64, last: u64) -> Self {
		debug_assert!(first <= last && last != INVALID_ID);
		Self { first, last }
	}

	pub fn is_none(&self) -> bool {
		self.first == INVALID_ID && self.last == INVALID_ID
	}

	pub fn contains(&self, id: u64) -> bool {
		!self.is_none() && self.first <= id && id <= self.last
	}

	/// Number of ids covered by the range.
	pub fn len(&self) -> u64 {
		if self.is_none() {
			0
		} else {
			self.last - self.first + 1
		}
	}

	pub fn is_empty(&self) -> bool {
		self.is_none()
	}

	/// Combines two removal ranges into one.
	///
	/// Successive evictions within one cycle each remove the oldest prefix of
	/// what is left, so their union has no holes in id space.
	pub fn merge(self, other: IdRange) -> IdRange {
		match (self.is_none(), other.is_none()) {
			(true, _) => other,
			(_, true) => self,
			_ => IdRange {
				first: self.first.min(other.first),
				last: self.last.max(other.last),
			},
		}
	}

	pub fn as_inclusive(&self) -> Option<RangeInclusive<u64>> {
		if self.is_none() {
			None
		} else {
			Some(self.first..=self.last)
		}
	}
}

impl Default for IdRange {
	fn default() -> Self {
		Self::NONE
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_none_is_identity_for_merge() {
		let r = IdRange::new(3, 7);
		assert_eq!(IdRange::NONE.merge(r), r);
		assert_eq!(r.merge(IdRange::NONE), r);
		assert!(IdRange::NONE.merge(IdRange::NONE).is_none());
	}

	#[test]
	fn test_merge_adjacent_prefixes() {
		let merged = IdRange::new(0, 4).merge(IdRange::new(5, 6));
		assert_eq!(merged, IdRange::new(0, 6));
		assert_eq!(merged.len(), 7);
	}

	#[test]
	fn test_contains() {
		let r = IdRange::new(2, 4);
		assert!(r.contains(2));
		assert!(r.contains(4));
		assert!(!r.contains(5));
		assert!(!IdRange::NONE.contains(INVALID_ID));
		assert_eq!(IdRange::NONE.as_inclusive(), None);
	}
}
