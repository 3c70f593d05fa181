mod bmp_core;
mod bmp_reader;
mod header;

use std::{
    fs::File,
    io::{BufReader, BufWriter, Cursor, Read, Seek, Write},
    path::Path,
};

use log::debug;

use crate::{
    error::{Error, Result},
    image::{Image, ImageDecoder, ImageEncoder},
};

pub use header::{row_padding, BMP_SIGNATURE, DEFAULT_RESOLUTION, PIXEL_DATA_OFFSET};

/// Decodes an uncompressed 24-bit BMP from any seekable source.
pub fn decode_from<R: Read + Seek>(reader: R) -> Result<Image> {
    let mut parser = bmp_reader::BMPParser::new(reader);
    bmp_core::read_image(&mut parser)
}

/// Encodes `image` as an uncompressed 24-bit BMP into any writer. The writer is flushed.
pub fn encode_to<W: Write>(image: &Image, mut writer: W) -> Result<()> {
    bmp_core::write_image(image, &mut writer)
}

/// Opens and decodes the BMP file at `path`.
pub fn decode<P: AsRef<Path>>(path: P) -> Result<Image> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| Error::NotFound {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Reading {}", path.display());
    decode_from(BufReader::new(file))
}

/// Writes `image` to a BMP file at `path`, replacing any existing file.
pub fn encode<P: AsRef<Path>>(image: &Image, path: P) -> Result<()> {
    // Fail before File::create so an existing file is never truncated
    bmp_core::check_encodable(image)?;
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| Error::NotFound {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Writing {}", path.display());
    encode_to(image, BufWriter::new(file))
}

/// Contains BMP image data
pub struct BMPDecoder<'data> {
    image_data: &'data [u8],
}

impl<'data> ImageDecoder<'data> for BMPDecoder<'data> {
    /// Initializes the BMP decoder from a byte slice
    fn new(image_data: &'data [u8]) -> Self {
        Self { image_data }
    }

    fn decode(&self) -> Result<Image> {
        decode_from(Cursor::new(self.image_data))
    }
}

/// BMP encoder
pub struct BMPEncoder<'image> {
    image: &'image Image,
}

impl<'image> BMPEncoder<'image> {
    /// Encodes the image into a new byte vector.
    pub fn encode_to_vec(&self) -> Result<Vec<u8>> {
        let mut bytes = vec![];
        self.encode(&mut bytes)?;
        Ok(bytes)
    }
}

impl<'image> ImageEncoder<'image> for BMPEncoder<'image> {
    fn new(image: &'image Image) -> Self {
        Self { image }
    }

    fn encode<W: Write>(&self, writer: W) -> Result<()> {
        encode_to(self.image, writer)
    }

    fn encode_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        encode(self.image, path)
    }
}
