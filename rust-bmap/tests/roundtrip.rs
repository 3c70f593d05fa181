use std::path::PathBuf;

use rust_bmap::{
    bmp::{self, BMPDecoder, BMPEncoder},
    image::{ImageDecoder, ImageEncoder},
    Error, Image, Pixel,
};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("rust-bmap-{}-{}.bmp", name, std::process::id()))
}

fn checkerboard(width: u32, height: u32) -> Image {
    let mut image = Image::new(width, height).unwrap();
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            if (x + y) % 2 == 0 {
                image.set_pixel(x, y, Pixel::from_rgb(255, 0, 128));
            } else {
                image.set_pixel(x, y, Pixel::from_rgb(0, 200, 50));
            }
        }
    }
    image
}

#[test]
fn two_by_two_file_roundtrip() {
    let p0 = Pixel::new(10, 20, 30);
    let p1 = Pixel::new(40, 50, 60);
    let p2 = Pixel::new(70, 80, 90);
    let p3 = Pixel::new(100, 110, 120);
    let image = Image::from_pixels(2, 2, vec![p0, p1, p2, p3]).unwrap();

    let path = temp_path("two-by-two");
    rust_bmap::encode(&image, &path).unwrap();
    let mut decoded = rust_bmap::decode(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(decoded.dimensions(), (2, 2));
    assert_eq!(decoded.pixels(), &[p0, p1, p2, p3]);

    decoded.rotate_clockwise_90().unwrap();
    assert_eq!(decoded.pixels(), &[p2, p0, p3, p1]);
}

#[test]
fn file_size_on_disk() {
    // 5 pixels * 3 bytes = 15, padded to 16
    let image = checkerboard(5, 3);
    let path = temp_path("file-size");
    rust_bmap::encode(&image, &path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(bytes.len(), 54 + 16 * 3);
    assert_eq!(&bytes[0..2], b"BM");
    assert_eq!(&bytes[2..6], &(bytes.len() as u32).to_le_bytes());
    assert_eq!(&bytes[34..38], &(16u32 * 3).to_le_bytes());
    // Padding bytes are zero
    assert_eq!(bytes[54 + 15], 0);
}

#[test]
fn transformed_roundtrip() {
    let mut image = checkerboard(7, 4);
    image.grayscale();
    image.invert();
    image.rotate_clockwise_90().unwrap();
    image.flip_horizontal().unwrap();
    assert_eq!(image.dimensions(), (4, 7));

    let bytes = BMPEncoder::new(&image).encode_to_vec().unwrap();
    let decoded = BMPDecoder::new(&bytes).decode().unwrap();
    assert_eq!(decoded, image);
}

#[test]
fn encoder_trait_writes_file() {
    let image = checkerboard(3, 3);
    let path = temp_path("encoder-trait");
    BMPEncoder::new(&image).encode_to_file(&path).unwrap();
    let decoded = bmp::decode(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(decoded, image);
}

#[test]
fn missing_file_is_not_found() {
    let path = temp_path("does-not-exist");
    assert!(matches!(
        rust_bmap::decode(&path),
        Err(Error::NotFound { .. })
    ));
}

#[test]
fn unwritable_path_is_not_found() {
    let image = checkerboard(2, 2);
    let path = std::env::temp_dir()
        .join("rust-bmap-no-such-directory")
        .join("out.bmp");
    assert!(matches!(
        rust_bmap::encode(&image, &path),
        Err(Error::NotFound { .. })
    ));
}

#[test]
fn wrong_magic_is_invalid_format() {
    let mut bytes = BMPEncoder::new(&checkerboard(2, 2))
        .encode_to_vec()
        .unwrap();
    bytes[0] = b'P';
    assert!(matches!(
        BMPDecoder::new(&bytes).decode(),
        Err(Error::InvalidFormat(_))
    ));
}

#[test]
fn wrong_depth_is_invalid_format() {
    let mut bytes = BMPEncoder::new(&checkerboard(2, 2))
        .encode_to_vec()
        .unwrap();
    bytes[28..30].copy_from_slice(&32u16.to_le_bytes());
    assert!(matches!(
        BMPDecoder::new(&bytes).decode(),
        Err(Error::InvalidFormat(_))
    ));
}

#[test]
fn failing_writer_reports_io() {
    struct Full;

    impl std::io::Write for Full {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let image = checkerboard(2, 2);
    assert!(matches!(bmp::encode_to(&image, Full), Err(Error::Io(_))));
}

#[test]
fn failed_encode_keeps_existing_file() {
    let path = temp_path("keep-existing");
    std::fs::write(&path, b"precious contents").unwrap();

    let result = rust_bmap::encode(&Image::default(), &path);
    let contents = std::fs::read(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert!(matches!(result, Err(Error::InvalidDimensions { .. })));
    assert_eq!(contents, b"precious contents");
}
