/* demos/basic.rs */

use std::time::Duration;

use gpstrack::{GpsTrack, Sample, TrackConfig, now_secs};

fn main() -> Result<(), Box<dyn std::error::Error>> {
	let config = TrackConfig::builder()
		.file_path("example_track.dat")
		.max_item_count(1_000)
		.duration(Duration::from_secs(3600))
		.build()?;

	let track = GpsTrack::from_config(&config)?;
	track.set_callback(|added, removed| {
		println!(
			"added {} samples, removed {:?}",
			added.len(),
			removed.as_inclusive()
		);
	});

	// Walk north-east, one fix per second.
	let start = now_secs() - 10.0;
	for i in 0..10 {
		let step = f64::from(i);
		track.add_point(Sample::new(start + step, 55.75 + step * 1e-4, 37.61 + step * 1e-4).with_speed(1.4));
		std::thread::sleep(Duration::from_millis(100));
	}

	track.set_duration(Duration::from_secs(5));
	std::thread::sleep(Duration::from_millis(200));

	drop(track);
	std::fs::remove_file(config.file_path)?;
	println!("Done.");
	Ok(())
}
