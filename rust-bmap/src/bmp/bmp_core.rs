use std::io::{Read, Seek, Write};

use log::{debug, trace, warn};

use crate::{
    bmp::{bmp_reader::BMPParser, header::*},
    error::{Error, Result},
    image::{alloc_pixels, Image},
    pixel::Pixel,
};

/// Reads both headers and every pixel row into a freshly allocated image.
///
/// The returned buffer is always in bottom-up order: row 0 is the first row of a bottom-up file.
/// Rows of top-down files (negative height) are reversed while reading so both layouts of the
/// same picture produce the same buffer.
pub fn read_image<R: Read + Seek>(reader: &mut BMPParser<R>) -> Result<Image> {
    let header = HeaderInfo::read_header_info(reader)?;
    let width = header.width();
    let height = header.height();
    let padding = row_padding(width);
    let top_down = header.info.is_top_down();

    trace!("Width: {}", width);
    trace!("Height: {}", header.info.height);
    trace!("Row padding: {}", padding);
    trace!("Pixel offset: {}", header.file.pixel_offset);

    let headers_end = FILE_HEADER_SIZE as u64 + header.info.header_size as u64;
    if header.file.pixel_offset as u64 > headers_end {
        warn!(
            "{} byte gap between the headers and the pixel data",
            header.file.pixel_offset as u64 - headers_end
        );
    }
    if top_down {
        warn!("Top-down BMP, rows will be stored bottom-up");
    }

    // The last row's padding may be missing, every other byte must be there
    let pixel_bytes = width as u64 * Pixel::BYTES as u64;
    let pixels_end = header.file.pixel_offset as u64
        + (pixel_bytes + padding as u64) * (height as u64 - 1)
        + pixel_bytes;
    if pixels_end > reader.stream_len()? {
        return Err(Error::InvalidFormat("Unexpected end of input"));
    }

    let mut data = alloc_pixels(width, height)?;

    let row_len = width as usize * Pixel::BYTES;
    let mut row = Vec::new();
    row.try_reserve_exact(row_len)
        .map_err(|_| Error::OutOfMemory { width, height })?;
    row.resize(row_len, 0u8);

    reader.seek_to(header.file.pixel_offset as u64)?;

    let w = width as usize;
    let h = height as usize;
    for i in 0..h {
        reader.read_exact(&mut row)?;

        let target = if top_down { h - 1 - i } else { i };
        let dst = &mut data[target * w..(target + 1) * w];
        for (pixel, bytes) in dst.iter_mut().zip(row.chunks_exact(Pixel::BYTES)) {
            *pixel = Pixel::from_bgr_bytes(bytes);
        }

        reader.skip(padding)?;
    }

    debug!("Decoded {}x{} BMP", width, height);
    Ok(Image {
        width,
        height,
        data,
    })
}

/// Returns the encoded file size, or `InvalidDimensions` if `image` has no BMP representation.
pub(crate) fn check_encodable(image: &Image) -> Result<u64> {
    let (width, height) = image.dimensions();
    let row_len = width as u64 * Pixel::BYTES as u64 + row_padding(width) as u64;
    let file_size = row_len * height as u64 + PIXEL_DATA_OFFSET as u64;
    if image.is_empty() || file_size > u32::MAX as u64 {
        return Err(Error::InvalidDimensions {
            width,
            height,
            len: image.pixels().len(),
        });
    }
    Ok(file_size)
}

/// Writes `image` as a bottom-up, uncompressed 24-bit BMP. Rows are written in buffer order.
pub fn write_image<W: Write>(image: &Image, writer: &mut W) -> Result<()> {
    let file_size = check_encodable(image)?;
    let (width, height) = image.dimensions();
    let padding = row_padding(width) as usize;
    let row_len = width as usize * Pixel::BYTES + padding;

    let header = HeaderInfo::for_image(width, height);
    trace!("Image data size: {}", header.info.image_size);
    trace!("File size: {}", header.file.file_size);
    header.write_to(writer)?;

    let padding_bytes = [0u8; 3];
    let mut row = Vec::with_capacity(row_len);
    for pixels in image.rows() {
        row.clear();
        for pixel in pixels {
            row.extend_from_slice(&pixel.to_bgr_bytes());
        }
        row.extend_from_slice(&padding_bytes[..padding]);
        writer.write_all(&row)?;
    }
    writer.flush()?;

    debug!("Encoded {}x{} BMP, {} bytes", width, height, file_size);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn encode(image: &Image) -> Vec<u8> {
        let mut bytes = vec![];
        write_image(image, &mut bytes).unwrap();
        bytes
    }

    fn decode(bytes: &[u8]) -> Result<Image> {
        read_image(&mut BMPParser::new(Cursor::new(bytes)))
    }

    #[test]
    fn one_pixel_layout() {
        let image = Image::from_pixels(1, 1, vec![Pixel::new(1, 2, 3)]).unwrap();
        let bytes = encode(&image);
        assert_eq!(bytes.len(), 58);
        assert_eq!(&bytes[54..], &[1, 2, 3, 0]);
    }

    #[test]
    fn rows_written_in_buffer_order() {
        let a = Pixel::new(1, 1, 1);
        let b = Pixel::new(2, 2, 2);
        let image = Image::from_pixels(1, 2, vec![a, b]).unwrap();
        let bytes = encode(&image);
        assert_eq!(&bytes[54..], &[1, 1, 1, 0, 2, 2, 2, 0]);
        assert_eq!(decode(&bytes).unwrap(), image);
    }

    #[test]
    fn round_trip_all_paddings() {
        for width in 1..=5 {
            let data = (0..width * 3)
                .map(|i| Pixel::new(i as u8, 255 - i as u8, (i * 31) as u8))
                .collect();
            let image = Image::from_pixels(width, 3, data).unwrap();
            let bytes = encode(&image);
            let expected = 54 + (width * 3 + row_padding(width)) as usize * 3;
            assert_eq!(bytes.len(), expected);
            assert_eq!(decode(&bytes).unwrap(), image);
        }
    }

    #[test]
    fn honors_pixel_offset_gap() {
        let pixels = vec![Pixel::new(9, 8, 7), Pixel::new(6, 5, 4)];
        let image = Image::from_pixels(2, 1, pixels).unwrap();
        let bytes = encode(&image);

        let mut gapped = bytes[..54].to_vec();
        gapped[10..14].copy_from_slice(&64u32.to_le_bytes());
        gapped.extend_from_slice(&[0xAA; 10]);
        gapped.extend_from_slice(&bytes[54..]);

        assert_eq!(decode(&gapped).unwrap(), image);
    }

    #[test]
    fn top_down_matches_bottom_up() {
        let image = Image::from_pixels(
            3,
            2,
            vec![
                Pixel::new(1, 0, 0),
                Pixel::new(2, 0, 0),
                Pixel::new(3, 0, 0),
                Pixel::new(4, 0, 0),
                Pixel::new(5, 0, 0),
                Pixel::new(6, 0, 0),
            ],
        )
        .unwrap();
        let bytes = encode(&image);

        // Same picture stored top-down: rows swapped and height negated
        let row = 3 * 3 + 3;
        let mut top_down = bytes[..54].to_vec();
        top_down[22..26].copy_from_slice(&(-2i32).to_le_bytes());
        top_down.extend_from_slice(&bytes[54 + row..]);
        top_down.extend_from_slice(&bytes[54..54 + row]);

        let decoded = decode(&top_down).unwrap();
        assert_eq!(decoded, image);
        assert_eq!(encode(&decoded), bytes);
    }

    #[test]
    fn truncated_pixels_are_invalid() {
        let image = Image::new(4, 4).unwrap();
        let bytes = encode(&image);
        assert!(matches!(
            decode(&bytes[..bytes.len() - 1]),
            Err(Error::InvalidFormat(_))
        ));
    }

    #[test]
    fn short_source_rejected_before_allocating() {
        // 20000x20000 would need 1.2 GB, the source has nothing after the headers
        let mut bytes = vec![];
        HeaderInfo::for_image(20000, 20000)
            .write_to(&mut bytes)
            .unwrap();
        assert_eq!(bytes.len(), 54);

        assert!(matches!(
            decode(&bytes),
            Err(Error::InvalidFormat("Unexpected end of input"))
        ));
    }

    #[test]
    fn missing_last_row_padding_is_accepted() {
        let image = Image::new(1, 2).unwrap();
        let bytes = encode(&image);
        assert_eq!(decode(&bytes[..bytes.len() - 1]).unwrap(), image);
    }

    #[test]
    fn empty_image_cannot_be_encoded() {
        let mut bytes = vec![];
        assert!(matches!(
            write_image(&Image::default(), &mut bytes),
            Err(Error::InvalidDimensions { .. })
        ));
        assert!(bytes.is_empty());
    }
}
