/// A single 24-bit pixel, stored in the blue, green, red order BMP files use on disk.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pixel {
    /// Blue channel
    pub blue: u8,
    /// Green channel
    pub green: u8,
    /// Red channel
    pub red: u8,
}

impl Pixel {
    /// Returned for out of bounds reads.
    pub const BLACK: Pixel = Pixel::new(0, 0, 0);

    /// Number of bytes a pixel occupies in a BMP file.
    pub const BYTES: usize = 3;

    /// Creates a pixel from its channels in on-disk (blue, green, red) order.
    pub const fn new(blue: u8, green: u8, red: u8) -> Self {
        Self { blue, green, red }
    }

    /// Creates a pixel from its channels in red, green, blue order.
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { blue, green, red }
    }

    /// Builds a pixel from a 3 byte BGR triple.
    pub(crate) fn from_bgr_bytes(bytes: &[u8]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2])
    }

    pub(crate) fn to_bgr_bytes(self) -> [u8; 3] {
        [self.blue, self.green, self.red]
    }

    /// Truncating average of the three channels, replicated into each of them.
    pub fn grayscale(self) -> Self {
        let sum = self.red as u16 + self.green as u16 + self.blue as u16;
        let avg = (sum / 3) as u8;
        Self::new(avg, avg, avg)
    }

    /// Color negative: every channel becomes `255 - channel`.
    pub fn inverted(self) -> Self {
        Self::new(255 - self.blue, 255 - self.green, 255 - self.red)
    }
}

#[test]
fn grayscale_truncates() {
    // 10 + 20 + 31 = 61, 61 / 3 = 20.33
    let gray = Pixel::from_rgb(10, 20, 31).grayscale();
    assert_eq!(gray, Pixel::new(20, 20, 20));

    let white = Pixel::new(255, 255, 255).grayscale();
    assert_eq!(white, Pixel::new(255, 255, 255));
}

#[test]
fn invert_channels() {
    let pixel = Pixel::new(0, 100, 255);
    assert_eq!(pixel.inverted(), Pixel::new(255, 155, 0));
    assert_eq!(pixel.inverted().inverted(), pixel);
}

#[test]
fn bgr_byte_order() {
    let pixel = Pixel::from_rgb(1, 2, 3);
    assert_eq!(pixel.to_bgr_bytes(), [3, 2, 1]);
    assert_eq!(Pixel::from_bgr_bytes(&[3, 2, 1]), pixel);
}
