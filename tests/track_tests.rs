/* tests/track_tests.rs */

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use gpstrack::{GpsTrack, IdRange, IdentifiedSample, Sample, now_secs};

const DAY: Duration = Duration::from_secs(24 * 3600);
const TIMEOUT: Duration = Duration::from_secs(5);

type Diff = (Vec<IdentifiedSample>, IdRange);

fn point(age_secs: f64) -> Sample {
	Sample::new(now_secs() - age_secs, 55.75, 37.61)
}

fn points(count: usize) -> Vec<Sample> {
	let base = now_secs() - 100.0;
	(0..count)
		.map(|i| Sample::new(base + i as f64, 55.75, 37.61 + i as f64 * 1e-4))
		.collect()
}

fn ids(diff: &Diff) -> Vec<u64> {
	diff.0.iter().map(|item| item.id).collect()
}

/// Records every diff delivered to the callback.
fn subscribe(track: &GpsTrack) -> Receiver<Diff> {
	let (tx, rx) = mpsc::channel();
	track.set_callback(move |added, removed| {
		let _ = tx.send((added, removed));
	});
	rx
}

/// Subscribes with a callback that reports entry, then blocks on `pause`.
fn subscribe_paused(track: &GpsTrack, pause: Arc<Mutex<()>>) -> (Receiver<()>, Receiver<Diff>) {
	let (entered_tx, entered_rx) = mpsc::channel();
	let (tx, rx) = mpsc::channel();
	track.set_callback(move |added, removed| {
		let _ = entered_tx.send(());
		let _guard = pause.lock().unwrap();
		let _ = tx.send((added, removed));
	});
	(entered_rx, rx)
}

#[test]
fn test_first_subscription_gets_snapshot_then_increments() -> Result<(), Box<dyn std::error::Error>> {
	let dir = tempfile::tempdir()?;
	let track = GpsTrack::new(dir.path().join("track.dat"), 100, DAY)?;

	let samples = points(4);
	track.add_points(&samples[..3]);
	let rx = subscribe(&track);

	let snapshot = rx.recv_timeout(TIMEOUT)?;
	assert_eq!(ids(&snapshot), vec![0, 1, 2]);
	assert_eq!(
		snapshot.0.iter().map(|item| item.sample).collect::<Vec<_>>(),
		samples[..3].to_vec()
	);
	assert!(snapshot.1.is_none());

	track.add_point(samples[3]);
	let diff = rx.recv_timeout(TIMEOUT)?;
	assert_eq!(ids(&diff), vec![3]);
	assert_eq!(diff.0[0].sample, samples[3]);
	assert!(diff.1.is_none());
	Ok(())
}

#[test]
fn test_clear_and_add_in_one_batch() -> Result<(), Box<dyn std::error::Error>> {
	let dir = tempfile::tempdir()?;
	let track = GpsTrack::new(dir.path().join("track.dat"), 100, DAY)?;

	track.add_points(&points(5));

	let pause = Arc::new(Mutex::new(()));
	let held = pause.lock().unwrap();
	let (entered, rx) = subscribe_paused(&track, Arc::clone(&pause));

	// The worker is parked inside the snapshot delivery.
	entered.recv_timeout(TIMEOUT)?;
	track.clear();
	let fresh = vec![point(2.0), point(1.0)];
	track.add_points(&fresh);
	drop(held);

	let snapshot = rx.recv_timeout(TIMEOUT)?;
	assert_eq!(ids(&snapshot), vec![0, 1, 2, 3, 4]);

	entered.recv_timeout(TIMEOUT)?;
	let diff = rx.recv_timeout(TIMEOUT)?;
	assert_eq!(ids(&diff), vec![5, 6]);
	assert_eq!(
		diff.0.iter().map(|item| item.sample).collect::<Vec<_>>(),
		fresh
	);
	assert_eq!(diff.1, IdRange::new(0, 4));
	Ok(())
}

#[test]
fn test_clear_alone_reports_full_removal() -> Result<(), Box<dyn std::error::Error>> {
	let dir = tempfile::tempdir()?;
	let track = GpsTrack::new(dir.path().join("track.dat"), 100, DAY)?;
	let rx = subscribe(&track);

	track.add_points(&points(3));
	let added = rx.recv_timeout(TIMEOUT)?;
	assert_eq!(ids(&added), vec![0, 1, 2]);

	track.clear();
	let cleared = rx.recv_timeout(TIMEOUT)?;
	assert!(cleared.0.is_empty());
	assert_eq!(cleared.1, IdRange::new(0, 2));

	track.add_point(point(0.0));
	let next = rx.recv_timeout(TIMEOUT)?;
	assert_eq!(ids(&next), vec![3]);
	Ok(())
}

#[test]
fn test_duration_shrink_evicts_older_samples() -> Result<(), Box<dyn std::error::Error>> {
	let dir = tempfile::tempdir()?;
	let track = GpsTrack::new(dir.path().join("track.dat"), 100, DAY)?;
	let rx = subscribe(&track);

	let hour = 3600.0;
	let samples: Vec<Sample> = (0..10)
		.rev()
		.map(|h| point((f64::from(h) + 0.5) * hour))
		.collect();
	track.add_points(&samples);
	let added = rx.recv_timeout(TIMEOUT)?;
	assert_eq!(added.0.len(), 10);

	track.set_duration(Duration::from_secs(5 * 3600));
	assert_eq!(track.duration(), Duration::from_secs(5 * 3600));

	let diff = rx.recv_timeout(TIMEOUT)?;
	assert!(diff.0.is_empty());
	assert_eq!(diff.1, IdRange::new(0, 4));
	Ok(())
}

#[test]
fn test_count_limit_is_enforced() -> Result<(), Box<dyn std::error::Error>> {
	let dir = tempfile::tempdir()?;
	let track = GpsTrack::new(dir.path().join("track.dat"), 3, DAY)?;
	let rx = subscribe(&track);

	track.add_points(&points(2));
	assert_eq!(ids(&rx.recv_timeout(TIMEOUT)?), vec![0, 1]);

	let more: Vec<Sample> = (0..3).map(|i| point(10.0 - f64::from(i))).collect();
	track.add_points(&more);
	let diff = rx.recv_timeout(TIMEOUT)?;
	assert_eq!(ids(&diff), vec![2, 3, 4]);
	assert_eq!(diff.1, IdRange::new(0, 1));
	Ok(())
}

#[test]
fn test_restart_round_trip() -> Result<(), Box<dyn std::error::Error>> {
	let dir = tempfile::tempdir()?;
	let path = dir.path().join("track.dat");
	let samples = points(20);

	{
		let track = GpsTrack::new(&path, 100, DAY)?;
		let rx = subscribe(&track);
		track.add_points(&samples[..12]);
		track.add_points(&samples[12..]);

		let mut seen = 0;
		while seen < samples.len() {
			seen += rx.recv_timeout(TIMEOUT)?.0.len();
		}
	}
	assert!(path.exists());

	let track = GpsTrack::new(&path, 100, DAY)?;
	let rx = subscribe(&track);
	let snapshot = rx.recv_timeout(TIMEOUT)?;
	assert_eq!(
		snapshot.0.iter().map(|item| item.sample).collect::<Vec<_>>(),
		samples
	);
	assert!(snapshot.0.windows(2).all(|w| w[0].id < w[1].id));

	// Ids keep increasing past the restored ones.
	let last = snapshot.0.last().map(|item| item.id).unwrap_or_default();
	track.add_point(point(0.0));
	let diff = rx.recv_timeout(TIMEOUT)?;
	assert_eq!(ids(&diff), vec![last + 1]);
	Ok(())
}

#[test]
fn test_points_staged_before_drop_are_persisted() -> Result<(), Box<dyn std::error::Error>> {
	let dir = tempfile::tempdir()?;
	let path = dir.path().join("track.dat");
	let samples = points(5);

	drop({
		let track = GpsTrack::new(&path, 100, DAY)?;
		track.add_points(&samples);
		track
	});

	let track = GpsTrack::new(&path, 100, DAY)?;
	let rx = subscribe(&track);
	let snapshot = rx.recv_timeout(TIMEOUT)?;
	assert_eq!(
		snapshot.0.iter().map(|item| item.sample).collect::<Vec<_>>(),
		samples
	);
	Ok(())
}

#[test]
fn test_clear_survives_restart() -> Result<(), Box<dyn std::error::Error>> {
	let dir = tempfile::tempdir()?;
	let path = dir.path().join("track.dat");

	{
		let track = GpsTrack::new(&path, 100, DAY)?;
		let rx = subscribe(&track);
		track.add_points(&points(4));
		rx.recv_timeout(TIMEOUT)?;
		track.clear();
		rx.recv_timeout(TIMEOUT)?;
		track.add_point(point(0.0));
		rx.recv_timeout(TIMEOUT)?;
	}

	let track = GpsTrack::new(&path, 100, DAY)?;
	let rx = subscribe(&track);
	let snapshot = rx.recv_timeout(TIMEOUT)?;
	assert_eq!(ids(&snapshot), vec![4]);
	Ok(())
}

#[test]
fn test_duration_eviction_survives_restart() -> Result<(), Box<dyn std::error::Error>> {
	let dir = tempfile::tempdir()?;
	let path = dir.path().join("track.dat");
	let hour = 3600.0;

	{
		let track = GpsTrack::new(&path, 100, DAY)?;
		let rx = subscribe(&track);
		let samples: Vec<Sample> = (0..10)
			.rev()
			.map(|h| point((f64::from(h) + 0.5) * hour))
			.collect();
		track.add_points(&samples);
		assert_eq!(rx.recv_timeout(TIMEOUT)?.0.len(), 10);

		track.set_duration(Duration::from_secs(5 * 3600));
		assert_eq!(rx.recv_timeout(TIMEOUT)?.1, IdRange::new(0, 4));
	}

	// Widening the window again must not resurrect what was evicted.
	let track = GpsTrack::new(&path, 100, DAY)?;
	let rx = subscribe(&track);
	let snapshot = rx.recv_timeout(TIMEOUT)?;
	assert_eq!(ids(&snapshot), vec![5, 6, 7, 8, 9]);

	track.add_point(point(0.0));
	assert_eq!(ids(&rx.recv_timeout(TIMEOUT)?), vec![10]);
	Ok(())
}

#[test]
fn test_count_eviction_survives_restart() -> Result<(), Box<dyn std::error::Error>> {
	let dir = tempfile::tempdir()?;
	let path = dir.path().join("track.dat");

	{
		let track = GpsTrack::new(&path, 3, DAY)?;
		let rx = subscribe(&track);
		track.add_points(&points(5));
		let diff = rx.recv_timeout(TIMEOUT)?;
		assert_eq!(ids(&diff), vec![2, 3, 4]);
	}

	let track = GpsTrack::new(&path, 100, DAY)?;
	let rx = subscribe(&track);
	let snapshot = rx.recv_timeout(TIMEOUT)?;
	assert_eq!(ids(&snapshot), vec![2, 3, 4]);
	Ok(())
}

#[test]
fn test_diffs_keep_flowing_when_log_is_unwritable() -> Result<(), Box<dyn std::error::Error>> {
	let dir = tempfile::tempdir()?;
	let blocker = dir.path().join("blocker");
	std::fs::write(&blocker, b"not a directory")?;

	let track = GpsTrack::new(blocker.join("track.dat"), 100, DAY)?;
	let rx = subscribe(&track);

	track.add_point(point(2.0));
	assert_eq!(ids(&rx.recv_timeout(TIMEOUT)?), vec![0]);
	track.add_point(point(1.0));
	assert_eq!(ids(&rx.recv_timeout(TIMEOUT)?), vec![1]);
	Ok(())
}

#[test]
fn test_clear_still_notifies_when_truncate_fails() -> Result<(), Box<dyn std::error::Error>> {
	let dir = tempfile::tempdir()?;
	let blocker = dir.path().join("blocker");
	std::fs::write(&blocker, b"not a directory")?;

	let track = GpsTrack::new(blocker.join("track.dat"), 100, DAY)?;
	let rx = subscribe(&track);

	track.add_point(point(2.0));
	assert_eq!(ids(&rx.recv_timeout(TIMEOUT)?), vec![0]);

	track.clear();
	let cleared = rx.recv_timeout(TIMEOUT)?;
	assert!(cleared.0.is_empty());
	assert_eq!(cleared.1, IdRange::new(0, 0));

	track.add_point(point(1.0));
	let next = rx.recv_timeout(TIMEOUT)?;
	assert_eq!(ids(&next), vec![1]);
	assert!(next.1.is_none());
	Ok(())
}

#[test]
fn test_idle_track_never_creates_file() -> Result<(), Box<dyn std::error::Error>> {
	let dir = tempfile::tempdir()?;
	let path = dir.path().join("track.dat");

	{
		let track = GpsTrack::new(&path, 100, DAY)?;
		track.clear();
		track.set_duration(Duration::from_secs(60));
		track.add_point(Sample::new(f64::NAN, 0.0, 0.0));
	}

	assert!(!path.exists());
	Ok(())
}

#[test]
fn test_resubscribing_gets_fresh_snapshot() -> Result<(), Box<dyn std::error::Error>> {
	let dir = tempfile::tempdir()?;
	let track = GpsTrack::new(dir.path().join("track.dat"), 100, DAY)?;

	let first = subscribe(&track);
	track.add_points(&points(2));
	assert_eq!(ids(&first.recv_timeout(TIMEOUT)?), vec![0, 1]);

	track.remove_callback();
	track.add_point(point(0.0));

	let second = subscribe(&track);
	let snapshot = second.recv_timeout(TIMEOUT)?;
	assert!(snapshot.1.is_none());
	assert_eq!(ids(&snapshot)[..2], [0, 1]);

	// The new point lands in the snapshot or in the diff right after it.
	let mut seen = ids(&snapshot);
	while seen.len() < 3 {
		seen.extend(ids(&second.recv_timeout(TIMEOUT)?));
	}
	assert_eq!(seen, vec![0, 1, 2]);

	// The replaced callback was dropped, so its channel is closed.
	assert!(first.recv_timeout(Duration::from_millis(100)).is_err());
	Ok(())
}

#[test]
fn test_diffs_arrive_in_commit_order() -> Result<(), Box<dyn std::error::Error>> {
	let dir = tempfile::tempdir()?;
	let track = GpsTrack::new(dir.path().join("track.dat"), 1000, DAY)?;
	let rx = subscribe(&track);

	let samples = points(50);
	for sample in &samples {
		track.add_point(*sample);
	}

	let mut delivered = Vec::new();
	while delivered.len() < samples.len() {
		let diff = rx.recv_timeout(TIMEOUT)?;
		assert!(diff.1.is_none());
		delivered.extend(ids(&diff));
	}
	assert_eq!(delivered, (0..50).collect::<Vec<u64>>());
	Ok(())
}

#[test]
fn test_concurrent_producers() -> Result<(), Box<dyn std::error::Error>> {
	let dir = tempfile::tempdir()?;
	let track = Arc::new(GpsTrack::new(dir.path().join("track.dat"), 10_000, DAY)?);
	let rx = subscribe(&track);

	// Every producer uses the same timestamp so no point is out of order.
	let ts = now_secs() - 1.0;
	let handles: Vec<_> = (0..4)
		.map(|_| {
			let track = Arc::clone(&track);
			std::thread::spawn(move || {
				for _ in 0..25 {
					track.add_point(Sample::new(ts, 1.0, 2.0));
				}
			})
		})
		.collect();
	for handle in handles {
		handle.join().map_err(|_| "producer panicked")?;
	}

	let mut delivered = Vec::new();
	while delivered.len() < 100 {
		delivered.extend(ids(&rx.recv_timeout(TIMEOUT)?));
	}
	assert_eq!(delivered, (0..100).collect::<Vec<u64>>());
	Ok(())
}

#[test]
fn test_panicking_callback_does_not_stop_worker() -> Result<(), Box<dyn std::error::Error>> {
	let dir = tempfile::tempdir()?;
	let track = GpsTrack::new(dir.path().join("track.dat"), 100, DAY)?;

	let (tx, rx) = mpsc::channel();
	let panicked = Arc::new(AtomicBool::new(false));
	let flag = Arc::clone(&panicked);
	track.set_callback(move |added, removed| {
		if !flag.swap(true, Ordering::SeqCst) {
			panic!("subscriber failure");
		}
		let _ = tx.send((added, removed));
	});

	track.add_point(point(2.0));
	let deadline = std::time::Instant::now() + TIMEOUT;
	while !panicked.load(Ordering::SeqCst) {
		assert!(std::time::Instant::now() < deadline, "callback never ran");
		std::thread::sleep(Duration::from_millis(10));
	}

	track.add_point(point(1.0));
	let diff = rx.recv_timeout(TIMEOUT)?;
	assert_eq!(diff.0.last().map(|item| item.id), Some(1));
	Ok(())
}

#[test]
fn test_duration_accessor_and_limits() -> Result<(), Box<dyn std::error::Error>> {
	let dir = tempfile::tempdir()?;
	let path = dir.path().join("track.dat");
	let track = GpsTrack::new(&path, 42, DAY)?;

	assert_eq!(track.duration(), DAY);
	assert_eq!(track.max_item_count(), 42);
	assert_eq!(track.file_path(), path.as_path());

	track.set_duration(Duration::from_secs(90));
	assert_eq!(track.duration(), Duration::from_secs(90));
	Ok(())
}
