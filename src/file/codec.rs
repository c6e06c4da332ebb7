/* src/file/codec.rs */

//!
//! Record framing for the track log.
//!
//! Every record is a postcard-serialized [`LogRecord`] in COBS form,
//! terminated by a single zero byte. Zero never appears inside a frame, so a
//! torn write only ever damages the last frame.

use serde::{Deserialize, Serialize};

use super::FileError;
use crate::sample::IdentifiedSample;

/// One frame of the log.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub(crate) enum LogRecord {
	Sample(IdentifiedSample),
	/// Every sample with an id up to and including this one was evicted.
	EvictedThrough(u64),
}

/// Appends the framed encoding of `items` to `out`.
pub(crate) fn encode_into(items: &[IdentifiedSample], out: &mut Vec<u8>) -> Result<(), FileError> {
	for item in items {
		encode_record(&LogRecord::Sample(*item), out)?;
	}
	Ok(())
}

pub(crate) fn encode_record(record: &LogRecord, out: &mut Vec<u8>) -> Result<(), FileError> {
	let frame = postcard::to_stdvec_cobs(record)?;
	out.extend_from_slice(&frame);
	Ok(())
}

/// Output of [`decode_all`].
#[derive(Debug, Default)]
pub(crate) struct Decoded {
	pub items: Vec<IdentifiedSample>,
	/// Highest eviction mark seen anywhere in the log.
	pub evicted_through: Option<u64>,
	/// Number of terminated frames, readable or not.
	pub frames: usize,
	/// Set when any frame was unreadable or the tail was torn.
	pub damaged: bool,
}

/// Decodes every complete frame in `bytes`, skipping bad ones.
pub(crate) fn decode_all(mut bytes: Vec<u8>) -> Decoded {
	let mut decoded = Decoded::default();

	let complete = bytes.iter().rposition(|b| *b == 0).map_or(0, |pos| pos + 1);
	if complete < bytes.len() {
		tracing::warn!(
			"Dropping torn trailing record ({} bytes)",
			bytes.len() - complete
		);
		decoded.damaged = true;
	}

	for frame in bytes[..complete].split_inclusive_mut(|b| *b == 0) {
		decoded.frames += 1;
		if frame.len() < 2 {
			decoded.damaged = true;
			continue;
		}
		match postcard::from_bytes_cobs::<LogRecord>(frame) {
			Ok(LogRecord::Sample(item)) => decoded.items.push(item),
			Ok(LogRecord::EvictedThrough(id)) => {
				decoded.evicted_through = decoded.evicted_through.max(Some(id));
			}
			Err(e) => {
				tracing::warn!("Skipping unreadable record: {}", e);
				decoded.damaged = true;
			}
		}
	}

	decoded
}
