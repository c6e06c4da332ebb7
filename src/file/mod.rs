/* src/file/mod.rs */

//!
//! Append-only on-disk mirror of a track collection.

mod codec;
mod error;

pub use error::FileError;

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::sample::IdentifiedSample;

/// Everything recovered from a log on disk.
#[derive(Debug, Default)]
pub struct LogContents {
	/// Samples still live, in log order.
	pub items: Vec<IdentifiedSample>,
	/// Highest id recorded as evicted, if any.
	pub evicted_through: Option<u64>,
	/// Set when unreadable records were skipped.
	pub damaged: bool,
}

/// Append-only log of identified samples.
///
/// Nothing touches the disk until the first write. A missing or empty file
/// reads as an empty log. After a write failure the handle is dropped and the
/// log is flagged as damaged, so the next write reopens it and the owner can
/// [`rewrite`](TrackFile::rewrite) it.
#[derive(Debug)]
pub struct TrackFile {
	path: PathBuf,
	file: Option<File>,
	records: usize,
	damaged: bool,
}

impl TrackFile {
	/// Creates a log handle for `path` without opening it.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			file: None,
			records: 0,
			damaged: false,
		}
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn is_open(&self) -> bool {
		self.file.is_some()
	}

	/// Number of records on disk, counting unreadable ones.
	pub fn records(&self) -> usize {
		self.records
	}

	pub fn is_damaged(&self) -> bool {
		self.damaged
	}

	/// Reads every readable record.
	pub fn read_all(&mut self) -> Result<LogContents, FileError> {
		let bytes = match fs::read(&self.path) {
			Ok(bytes) => bytes,
			Err(e) if e.kind() == ErrorKind::NotFound => {
				self.records = 0;
				return Ok(LogContents::default());
			}
			Err(e) => return Err(FileError::Io(e)),
		};

		let decoded = codec::decode_all(bytes);
		self.records = decoded.frames;
		self.damaged |= decoded.damaged;

		let evicted_through = decoded.evicted_through;
		let items = decoded
			.items
			.into_iter()
			.filter(|item| evicted_through.is_none_or(|last| item.id > last))
			.collect();

		Ok(LogContents {
			items,
			evicted_through,
			damaged: decoded.damaged,
		})
	}

	/// Appends records, opening the file first if needed.
	pub fn append(&mut self, items: &[IdentifiedSample]) -> Result<(), FileError> {
		if items.is_empty() {
			return Ok(());
		}

		let mut buf = Vec::new();
		codec::encode_into(items, &mut buf)?;
		self.write_frames(&buf, items.len())
	}

	/// Records that every id up to and including `last_id` was evicted, so a
	/// later [`read_all`](Self::read_all) no longer returns those samples.
	pub fn mark_evicted(&mut self, last_id: u64) -> Result<(), FileError> {
		let mut buf = Vec::new();
		codec::encode_record(&codec::LogRecord::EvictedThrough(last_id), &mut buf)?;
		self.write_frames(&buf, 1)
	}

	fn write_frames(&mut self, buf: &[u8], count: usize) -> Result<(), FileError> {
		let result = match self.ensure_open() {
			Ok(file) => file.write_all(buf).map_err(FileError::Io),
			Err(e) => Err(e),
		};
		if let Err(e) = result {
			self.file = None;
			self.damaged = true;
			return Err(e);
		}

		self.records += count;
		Ok(())
	}

	/// Empties the log and closes it. The next append reopens it.
	pub fn truncate(&mut self) -> Result<(), FileError> {
		self.file = None;
		match OpenOptions::new().write(true).truncate(true).open(&self.path) {
			Ok(_) => {}
			Err(e) if e.kind() == ErrorKind::NotFound => {}
			Err(e) => {
				self.damaged = true;
				return Err(FileError::Io(e));
			}
		}
		self.records = 0;
		self.damaged = false;
		Ok(())
	}

	/// Replaces the log contents with exactly `items`.
	///
	/// The new contents are written to a sibling temp file and renamed over
	/// the log, so a crash leaves either the old or the new log in place.
	pub fn rewrite(&mut self, items: &[IdentifiedSample]) -> Result<(), FileError> {
		let mut buf = Vec::new();
		codec::encode_into(items, &mut buf)?;

		self.file = None;
		self.create_parent()?;

		let tmp = self.tmp_path();
		let result = File::create(&tmp)
			.and_then(|mut file| {
				file.write_all(&buf)?;
				file.sync_data()
			})
			.and_then(|()| fs::rename(&tmp, &self.path));
		if let Err(e) = result {
			let _ = fs::remove_file(&tmp);
			return Err(FileError::Io(e));
		}

		self.records = items.len();
		self.damaged = false;
		Ok(())
	}

	/// Closes the handle if open.
	pub fn close(&mut self) {
		if let Some(file) = self.file.take() {
			if let Err(e) = file.sync_data() {
				tracing::warn!("Failed to sync {:?} on close: {}", self.path, e);
			}
		}
	}

	fn ensure_open(&mut self) -> Result<&mut File, FileError> {
		let file = match self.file.take() {
			Some(file) => file,
			None => {
				self.create_parent()?;
				OpenOptions::new()
					.create(true)
					.append(true)
					.open(&self.path)?
			}
		};
		Ok(self.file.insert(file))
	}

	fn create_parent(&self) -> Result<(), FileError> {
		if let Some(parent) = self.path.parent() {
			if !parent.as_os_str().is_empty() {
				fs::create_dir_all(parent)?;
			}
		}
		Ok(())
	}

	fn tmp_path(&self) -> PathBuf {
		let mut name = self.path.as_os_str().to_owned();
		name.push(".tmp");
		PathBuf::from(name)
	}
}

impl Drop for TrackFile {
	fn drop(&mut self) {
		self.close();
	}
}
