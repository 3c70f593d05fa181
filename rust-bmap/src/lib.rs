#![warn(missing_docs)]

//! Loads, transforms and saves uncompressed 24-bit BMP images.
//!
//! ```no_run
//! # fn main() -> rust_bmap::Result<()> {
//! let mut image = rust_bmap::decode("input.bmp")?;
//! image.grayscale();
//! image.rotate_clockwise_90()?;
//! rust_bmap::encode(&image, "output.bmp")?;
//! # Ok(())
//! # }
//! ```
/// Reader and writer for uncompressed 24-bit BMP files
pub mod bmp;
/// Error type shared by the crate
pub mod error;
/// Defines the in-memory image and the codec traits
pub mod image;
/// A single BGR pixel
pub mod pixel;
/// Rotation, mirroring and color filters
pub mod transform;

pub use bmp::{decode, encode};
pub use error::{Error, Result};
pub use image::Image;
pub use pixel::Pixel;
