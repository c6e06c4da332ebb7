/* src/file/error.rs */

/// Errors raised by the on-disk track log.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
	/// IO error while opening, writing or truncating the log.
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),

	/// A sample could not be encoded.
	#[error("encode error: {0}")]
	Encode(#[from] postcard::Error),
}
