/* tests/stream_tests.rs */

#![cfg(feature = "stream")]

use std::time::Duration;

use futures_util::StreamExt;
use gpstrack::{GpsTrack, IdRange, Sample, now_secs};

#[tokio::test]
async fn test_diff_stream_snapshot_then_changes() -> Result<(), Box<dyn std::error::Error>> {
	let dir = tempfile::tempdir()?;
	let track = GpsTrack::new(dir.path().join("track.dat"), 100, Duration::from_secs(3600))?;

	let base = now_secs() - 10.0;
	track.add_points(&[Sample::new(base, 1.0, 1.0), Sample::new(base + 1.0, 1.0, 1.1)]);
	let mut stream = track.diff_stream();

	let snapshot = tokio::time::timeout(Duration::from_secs(5), stream.next())
		.await?
		.ok_or("stream ended")?;
	assert_eq!(snapshot.added.len(), 2);
	assert_eq!(snapshot.removed, IdRange::NONE);

	track.clear();
	let cleared = tokio::time::timeout(Duration::from_secs(5), stream.next())
		.await?
		.ok_or("stream ended")?;
	assert!(cleared.added.is_empty());
	assert_eq!(cleared.removed, IdRange::new(0, 1));

	drop(track);
	assert!(stream.next().await.is_none());
	Ok(())
}
