use std::{io, path::PathBuf};

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Describes an error encountered while reading, writing or building an image.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The file could not be opened for reading or created for writing.
    #[error("could not open {}: {source}", path.display())]
    NotFound {
        /// The path that failed to open
        path: PathBuf,
        /// The underlying error
        source: io::Error,
    },
    /// The file is not a 24-bit uncompressed BMP. The string describes why.
    #[error("invalid format: {0}")]
    InvalidFormat(&'static str),
    /// The pixel buffer could not be allocated.
    #[error("out of memory allocating a {width}x{height} pixel buffer")]
    OutOfMemory {
        /// Requested width in pixels
        width: u32,
        /// Requested height in pixels
        height: u32,
    },
    /// Dimensions are zero, too large, or disagree with the buffer length.
    #[error("invalid dimensions {width}x{height} for a buffer of {len} pixels")]
    InvalidDimensions {
        /// Width in pixels
        width: u32,
        /// Height in pixels
        height: u32,
        /// Number of pixels supplied
        len: usize,
    },
    /// There was an error reading or writing the image after it was opened
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}
