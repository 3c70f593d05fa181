use std::{io::Write, path::Path};

use crate::{
    error::{Error, Result},
    pixel::Pixel,
};

/// A decoded 24-bit image held entirely in memory.
///
/// Pixels are stored row-major with no padding between rows, so the buffer always holds exactly
/// `width * height` pixels. Row 0 is the first row stored in the file, which for the usual
/// bottom-up BMP layout is the bottom of the picture.
///
/// `Image::default()` is the empty 0x0 image. Every transform is a no-op on it and it cannot be
/// encoded.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Image {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) data: Vec<Pixel>,
}

impl Image {
    /// Creates an all black image.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        check_dimensions(width, height, 0)?;
        let data = alloc_pixels(width, height)?;
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Wraps an existing row-major buffer. Its length must be exactly `width * height`.
    pub fn from_pixels(width: u32, height: u32, data: Vec<Pixel>) -> Result<Self> {
        check_dimensions(width, height, data.len())?;
        if width as u64 * height as u64 != data.len() as u64 {
            return Err(Error::InvalidDimensions {
                width,
                height,
                len: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// True for the empty 0x0 image.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The raw row-major pixel buffer.
    pub fn pixels(&self) -> &[Pixel] {
        &self.data
    }

    /// Mutable access to the pixel buffer. Its length cannot change through a slice.
    pub fn pixels_mut(&mut self) -> &mut [Pixel] {
        &mut self.data
    }

    /// Iterates over the rows in buffer order.
    pub fn rows(&self) -> impl Iterator<Item = &[Pixel]> {
        self.data.chunks_exact(self.width.max(1) as usize)
    }

    /// Consumes the image and returns its pixel buffer.
    pub fn into_pixels(self) -> Vec<Pixel> {
        self.data
    }

    fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Returns the pixel at `(x, y)`, or [`Pixel::BLACK`] if the coordinates are out of bounds.
    pub fn get_pixel(&self, x: i32, y: i32) -> Pixel {
        match self.index_of(x, y) {
            Some(index) => self.data[index],
            None => Pixel::BLACK,
        }
    }

    /// Writes the pixel at `(x, y)`. Out of bounds writes are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, pixel: Pixel) {
        if let Some(index) = self.index_of(x, y) {
            self.data[index] = pixel;
        }
    }
}

/// Dimensions must be non-zero and fit the signed 32 bit header fields.
pub(crate) fn check_dimensions(width: u32, height: u32, len: usize) -> Result<()> {
    let limit = i32::MAX as u32;
    if width == 0 || height == 0 || width > limit || height > limit {
        return Err(Error::InvalidDimensions { width, height, len });
    }
    Ok(())
}

/// Allocates a black `width * height` buffer, reporting failure instead of aborting.
pub(crate) fn alloc_pixels(width: u32, height: u32) -> Result<Vec<Pixel>> {
    let len = (width as usize)
        .checked_mul(height as usize)
        .ok_or(Error::OutOfMemory { width, height })?;

    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| Error::OutOfMemory { width, height })?;
    data.resize(len, Pixel::BLACK);
    Ok(data)
}

/// Used to decode an image. This trait can be implemented for any image format I want to decode.
pub trait ImageDecoder<'data> {
    /// Supplies the decoder with the image data
    fn new(image_data: &'data [u8]) -> Self;
    /// Decodes the image
    fn decode(&self) -> Result<Image>;
}

/// Used to encode an image. This trait can be implemented for any image format I want to encode.
pub trait ImageEncoder<'image> {
    /// Supplies the encoder with an image to encode.
    fn new(image: &'image Image) -> Self;
    /// Encodes the image into any writer.
    fn encode<W: Write>(&self, writer: W) -> Result<()>;
    /// Encodes the image and saves the result to a file at the given path.
    fn encode_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()>;
}
