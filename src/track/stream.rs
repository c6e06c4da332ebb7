/* src/track/stream.rs */

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use super::GpsTrack;
use crate::range::IdRange;
use crate::sample::IdentifiedSample;

/// One delivered change, as yielded by [`DiffStream`].
#[derive(Debug, Clone, PartialEq)]
pub struct TrackDiff {
	pub added: Vec<IdentifiedSample>,
	pub removed: IdRange,
}

/// Async stream of track diffs. Ends when the track is dropped or the
/// subscriber is replaced.
pub struct DiffStream {
	inner: UnboundedReceiverStream<TrackDiff>,
}

impl Stream for DiffStream {
	type Item = TrackDiff;

	fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
		Pin::new(&mut self.inner).poll_next(cx)
	}
}

impl GpsTrack {
	/// Subscribes through an async stream instead of a callback.
	///
	/// This takes the single subscriber slot, so it replaces any callback.
	/// The first item is the full snapshot.
	pub fn diff_stream(&self) -> DiffStream {
		let (tx, rx) = mpsc::unbounded_channel();
		self.set_callback(move |added, removed| {
			let _ = tx.send(TrackDiff { added, removed });
		});
		DiffStream {
			inner: UnboundedReceiverStream::new(rx),
		}
	}
}
