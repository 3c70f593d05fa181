use std::io::{Read, Seek, Write};

use byteorder::{LittleEndian, WriteBytesExt};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::{
    bmp::bmp_reader::BMPParser,
    error::{Error, Result},
};

/// "BM" read as a little endian word
pub const BMP_SIGNATURE: u16 = 0x4D42;
pub const FILE_HEADER_SIZE: u32 = 14;
pub const INFO_HEADER_SIZE: u32 = 40;
/// Pixel data offset written by the encoder, directly after both headers.
pub const PIXEL_DATA_OFFSET: u32 = FILE_HEADER_SIZE + INFO_HEADER_SIZE;
pub const BITS_PER_PIXEL: u16 = 24;
/// 72 DPI expressed in pixels per metre
pub const DEFAULT_RESOLUTION: i32 = 2835;

/// Compression methods a BMP info header can declare. Only `Rgb` is supported.
#[derive(PartialEq, FromPrimitive, Debug, Clone, Copy)]
pub enum Compression {
    Rgb = 0,
    Rle8 = 1,
    Rle4 = 2,
    Bitfields = 3,
    Jpeg = 4,
    Png = 5,
    AlphaBitfields = 6,
}

/// Zero bytes needed after a row of `width` pixels to reach a 4 byte boundary.
pub fn row_padding(width: u32) -> u32 {
    (4 - (width as u64 * 3) % 4) as u32 % 4
}

/// The 14 byte header at the very start of the file
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub signature: u16,
    pub file_size: u32,
    pub reserved1: u16,
    pub reserved2: u16,
    pub pixel_offset: u32,
}

impl FileHeader {
    pub fn read_from<R: Read + Seek>(reader: &mut BMPParser<R>) -> Result<Self> {
        Ok(Self {
            signature: reader.read_next_u16()?,
            file_size: reader.read_next_u32()?,
            reserved1: reader.read_next_u16()?,
            reserved2: reader.read_next_u16()?,
            pixel_offset: reader.read_next_u32()?,
        })
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u16::<LittleEndian>(self.signature)?;
        writer.write_u32::<LittleEndian>(self.file_size)?;
        writer.write_u16::<LittleEndian>(self.reserved1)?;
        writer.write_u16::<LittleEndian>(self.reserved2)?;
        writer.write_u32::<LittleEndian>(self.pixel_offset)?;
        Ok(())
    }
}

/// The 40 byte BITMAPINFOHEADER that follows the file header
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InfoHeader {
    pub header_size: u32,
    pub width: i32,
    /// Positive for bottom-up row order, negative for top-down
    pub height: i32,
    pub planes: u16,
    pub bits_per_pixel: u16,
    pub compression: u32,
    pub image_size: u32,
    pub x_pixels_per_meter: i32,
    pub y_pixels_per_meter: i32,
    pub colors_used: u32,
    pub colors_important: u32,
}

impl InfoHeader {
    pub fn read_from<R: Read + Seek>(reader: &mut BMPParser<R>) -> Result<Self> {
        Ok(Self {
            header_size: reader.read_next_u32()?,
            width: reader.read_next_i32()?,
            height: reader.read_next_i32()?,
            planes: reader.read_next_u16()?,
            bits_per_pixel: reader.read_next_u16()?,
            compression: reader.read_next_u32()?,
            image_size: reader.read_next_u32()?,
            x_pixels_per_meter: reader.read_next_i32()?,
            y_pixels_per_meter: reader.read_next_i32()?,
            colors_used: reader.read_next_u32()?,
            colors_important: reader.read_next_u32()?,
        })
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32::<LittleEndian>(self.header_size)?;
        writer.write_i32::<LittleEndian>(self.width)?;
        writer.write_i32::<LittleEndian>(self.height)?;
        writer.write_u16::<LittleEndian>(self.planes)?;
        writer.write_u16::<LittleEndian>(self.bits_per_pixel)?;
        writer.write_u32::<LittleEndian>(self.compression)?;
        writer.write_u32::<LittleEndian>(self.image_size)?;
        writer.write_i32::<LittleEndian>(self.x_pixels_per_meter)?;
        writer.write_i32::<LittleEndian>(self.y_pixels_per_meter)?;
        writer.write_u32::<LittleEndian>(self.colors_used)?;
        writer.write_u32::<LittleEndian>(self.colors_important)?;
        Ok(())
    }

    pub fn compression(&self) -> Option<Compression> {
        FromPrimitive::from_u32(self.compression)
    }

    pub fn is_top_down(&self) -> bool {
        self.height < 0
    }
}

/// Both headers of a BMP file, checked against the single profile this crate supports.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HeaderInfo {
    pub file: FileHeader,
    pub info: InfoHeader,
}

impl HeaderInfo {
    pub fn read_header_info<R: Read + Seek>(reader: &mut BMPParser<R>) -> Result<Self> {
        let file = FileHeader::read_from(reader)?;
        if file.signature != BMP_SIGNATURE {
            return Err(Error::InvalidFormat("File does not start with BM"));
        }

        let info = InfoHeader::read_from(reader)?;
        if info.header_size < INFO_HEADER_SIZE {
            return Err(Error::InvalidFormat("Info header is smaller than 40 bytes"));
        }
        if info.bits_per_pixel != BITS_PER_PIXEL {
            return Err(Error::InvalidFormat("Only 24 bits per pixel is supported"));
        }
        match info.compression() {
            Some(Compression::Rgb) => {}
            Some(_) => return Err(Error::InvalidFormat("Compressed images are not supported")),
            None => return Err(Error::InvalidFormat("Unknown compression method")),
        }
        if info.width <= 0 || info.height == 0 {
            return Err(Error::InvalidFormat("Image has no pixels"));
        }
        if info.height == i32::MIN {
            return Err(Error::InvalidFormat("Image height out of range"));
        }
        if (file.pixel_offset as u64) < FILE_HEADER_SIZE as u64 + info.header_size as u64 {
            return Err(Error::InvalidFormat("Pixel data offset points into the headers"));
        }

        Ok(Self { file, info })
    }

    /// Builds the headers the encoder writes for a `width` x `height` image.
    pub fn for_image(width: u32, height: u32) -> Self {
        let row_size = width as u64 * 3 + row_padding(width) as u64;
        let image_size = (row_size * height as u64) as u32;

        Self {
            file: FileHeader {
                signature: BMP_SIGNATURE,
                file_size: PIXEL_DATA_OFFSET.wrapping_add(image_size),
                reserved1: 0,
                reserved2: 0,
                pixel_offset: PIXEL_DATA_OFFSET,
            },
            info: InfoHeader {
                header_size: INFO_HEADER_SIZE,
                width: width as i32,
                height: height as i32,
                planes: 1,
                bits_per_pixel: BITS_PER_PIXEL,
                compression: Compression::Rgb as u32,
                image_size,
                x_pixels_per_meter: DEFAULT_RESOLUTION,
                y_pixels_per_meter: DEFAULT_RESOLUTION,
                colors_used: 0,
                colors_important: 0,
            },
        }
    }

    pub fn width(&self) -> u32 {
        self.info.width as u32
    }

    pub fn height(&self) -> u32 {
        self.info.height.unsigned_abs()
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.file.write_to(writer)?;
        self.info.write_to(writer)
    }
}

#[cfg(test)]
fn header_bytes(header: &HeaderInfo) -> Vec<u8> {
    let mut bytes = vec![];
    header.write_to(&mut bytes).unwrap();
    bytes
}

#[test]
fn padding_aligns_rows() {
    for width in 1..64 {
        let padding = row_padding(width);
        assert!(padding <= 3);
        assert_eq!((width * 3 + padding) % 4, 0);
    }
    assert_eq!(row_padding(1), 1);
    assert_eq!(row_padding(2), 2);
    assert_eq!(row_padding(3), 3);
    assert_eq!(row_padding(4), 0);
}

#[test]
fn header_sizes() {
    let bytes = header_bytes(&HeaderInfo::for_image(1, 1));
    assert_eq!(bytes.len(), PIXEL_DATA_OFFSET as usize);
    assert_eq!(&bytes[0..2], b"BM");
    // file size: 54 + one 3 byte pixel + 1 byte padding
    assert_eq!(&bytes[2..6], &58u32.to_le_bytes());
    assert_eq!(&bytes[10..14], &54u32.to_le_bytes());
    assert_eq!(&bytes[14..18], &40u32.to_le_bytes());
    assert_eq!(&bytes[28..30], &24u16.to_le_bytes());
    assert_eq!(&bytes[38..42], &2835i32.to_le_bytes());
}

#[test]
fn read_back_written_headers() {
    let header = HeaderInfo::for_image(3, 5);
    let bytes = header_bytes(&header);
    let mut reader = BMPParser::new(std::io::Cursor::new(bytes.as_slice()));
    let read = HeaderInfo::read_header_info(&mut reader).unwrap();
    assert_eq!(read, header);
    assert_eq!(read.info.image_size, (3 * 3 + 3) * 5);
    assert_eq!(reader.position().unwrap(), 54);
}

#[test]
fn reject_unsupported_headers() {
    let parse = |header: &HeaderInfo| {
        let bytes = header_bytes(header);
        HeaderInfo::read_header_info(&mut BMPParser::new(std::io::Cursor::new(bytes)))
    };

    let mut header = HeaderInfo::for_image(2, 2);
    header.file.signature = 0x4142;
    assert!(matches!(parse(&header), Err(Error::InvalidFormat(_))));

    let mut header = HeaderInfo::for_image(2, 2);
    header.info.bits_per_pixel = 32;
    assert!(matches!(parse(&header), Err(Error::InvalidFormat(_))));

    let mut header = HeaderInfo::for_image(2, 2);
    header.info.compression = Compression::Rle8 as u32;
    assert!(matches!(parse(&header), Err(Error::InvalidFormat(_))));

    let mut header = HeaderInfo::for_image(2, 2);
    header.info.compression = 42;
    assert!(matches!(parse(&header), Err(Error::InvalidFormat(_))));

    let mut header = HeaderInfo::for_image(2, 2);
    header.info.height = 0;
    assert!(matches!(parse(&header), Err(Error::InvalidFormat(_))));

    let mut header = HeaderInfo::for_image(2, 2);
    header.file.pixel_offset = 14;
    assert!(matches!(parse(&header), Err(Error::InvalidFormat(_))));

    // A larger info header pushes the earliest valid offset past 54
    let mut header = HeaderInfo::for_image(2, 2);
    header.info.header_size = 124;
    assert!(matches!(parse(&header), Err(Error::InvalidFormat(_))));
    header.file.pixel_offset = 14 + 124;
    assert!(parse(&header).is_ok());

    let mut header = HeaderInfo::for_image(2, 2);
    header.info.width = 0;
    assert!(matches!(parse(&header), Err(Error::InvalidFormat(_))));

    let mut header = HeaderInfo::for_image(2, 2);
    header.info.width = -3;
    assert!(matches!(parse(&header), Err(Error::InvalidFormat(_))));

    let mut header = HeaderInfo::for_image(2, 2);
    header.info.height = i32::MIN;
    assert!(matches!(parse(&header), Err(Error::InvalidFormat(_))));
}

#[test]
fn truncated_header_is_invalid() {
    let bytes = header_bytes(&HeaderInfo::for_image(2, 2));
    let mut reader = BMPParser::new(std::io::Cursor::new(&bytes[..30]));
    assert!(matches!(
        HeaderInfo::read_header_info(&mut reader),
        Err(Error::InvalidFormat(_))
    ));
}
