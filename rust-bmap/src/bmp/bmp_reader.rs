use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, Read, Seek, SeekFrom};

use crate::error::{Error, Result};

/// Little endian reader over any seekable byte source.
pub struct BMPParser<R> {
    reader: R,
}

/// A short read means the file is truncated, anything else is a real I/O failure.
fn map_read_error(err: io::Error) -> Error {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        Error::InvalidFormat("Unexpected end of input")
    } else {
        Error::Io(err)
    }
}

impl<R: Read + Seek> BMPParser<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    pub fn read_next_u16(&mut self) -> Result<u16> {
        self.reader
            .read_u16::<LittleEndian>()
            .map_err(map_read_error)
    }

    pub fn read_next_u32(&mut self) -> Result<u32> {
        self.reader
            .read_u32::<LittleEndian>()
            .map_err(map_read_error)
    }

    pub fn read_next_i32(&mut self) -> Result<i32> {
        self.reader
            .read_i32::<LittleEndian>()
            .map_err(map_read_error)
    }

    /// Fills `buf` completely or fails.
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.reader.read_exact(buf).map_err(map_read_error)
    }

    pub fn seek_to(&mut self, offset: u64) -> Result<()> {
        self.reader.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    /// Total length of the source. The read position is left where it was.
    pub fn stream_len(&mut self) -> Result<u64> {
        let position = self.reader.stream_position()?;
        let len = self.reader.seek(SeekFrom::End(0))?;
        if position != len {
            self.reader.seek(SeekFrom::Start(position))?;
        }
        Ok(len)
    }

    /// Skips row padding by reading it, which keeps a `BufReader` buffer intact.
    /// Running out of input here is not an error, the next row read reports it.
    pub fn skip(&mut self, bytes: u32) -> Result<()> {
        if bytes > 0 {
            io::copy(&mut self.reader.by_ref().take(bytes as u64), &mut io::sink())?;
        }
        Ok(())
    }

    #[cfg(test)]
    pub fn position(&mut self) -> Result<u64> {
        Ok(self.reader.stream_position()?)
    }
}

#[rustfmt::skip]
#[allow(dead_code)]
static TEST_DATA: [u8; 12] = [
    0x42, 0x4D,             // BM
    0x3A, 0x00, 0x00, 0x00, // 58
    0xFE, 0xFF, 0xFF, 0xFF, // -2
    0x01, 0x02,             // Truncated word
];

#[test]
fn read_little_endian() {
    let mut reader = BMPParser::new(io::Cursor::new(&TEST_DATA[..]));
    assert_eq!(reader.read_next_u16().unwrap(), 0x4D42);
    assert_eq!(reader.read_next_u32().unwrap(), 58);
    assert_eq!(reader.read_next_i32().unwrap(), -2);
    assert_eq!(reader.position().unwrap(), 10);
}

#[test]
fn short_read_is_invalid_format() {
    let mut reader = BMPParser::new(io::Cursor::new(&TEST_DATA[..]));
    reader.seek_to(10).unwrap();
    assert!(matches!(
        reader.read_next_u32(),
        Err(Error::InvalidFormat("Unexpected end of input"))
    ));
}

#[test]
fn skip_moves_forward() {
    let mut reader = BMPParser::new(io::Cursor::new(&TEST_DATA[..]));
    reader.skip(2).unwrap();
    reader.skip(0).unwrap();
    assert_eq!(reader.read_next_u32().unwrap(), 58);

    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf).unwrap();
    assert_eq!(buf, [0xFE, 0xFF, 0xFF, 0xFF]);
}

#[test]
fn stream_len_keeps_position() {
    let mut reader = BMPParser::new(io::Cursor::new(&TEST_DATA[..]));
    reader.skip(2).unwrap();
    assert_eq!(reader.stream_len().unwrap(), 12);
    assert_eq!(reader.read_next_u32().unwrap(), 58);
}
