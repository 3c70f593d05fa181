//! Geometric and color transforms.
//!
//! [`Image::grayscale`] and [`Image::invert`] work in place and never reallocate.
//! [`Image::rotate_clockwise_90`] and [`Image::flip_horizontal`] build a complete new buffer
//! first and only then swap it in, so a failed allocation leaves the image untouched. Callers
//! holding on to the old buffer's address should not expect it to survive those two calls.

use log::debug;

use crate::{
    error::Result,
    image::{alloc_pixels, Image},
};

impl Image {
    /// Rotates the image 90 degrees clockwise, swapping width and height.
    pub fn rotate_clockwise_90(&mut self) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }

        let (old_width, old_height) = (self.width as usize, self.height as usize);
        let (new_width, new_height) = (self.height, self.width);
        let mut new_data = alloc_pixels(new_width, new_height)?;

        for i in 0..old_height {
            for j in 0..old_width {
                let new_index = j * new_width as usize + (old_height - 1 - i);
                new_data[new_index] = self.data[i * old_width + j];
            }
        }

        self.data = new_data;
        self.width = new_width;
        self.height = new_height;
        debug!("Rotated to {}x{}", self.width, self.height);
        Ok(())
    }

    /// Mirrors every row left to right. Dimensions are unchanged.
    pub fn flip_horizontal(&mut self) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }

        let width = self.width as usize;
        let mut new_data = alloc_pixels(self.width, self.height)?;

        for (src, dst) in self
            .data
            .chunks_exact(width)
            .zip(new_data.chunks_exact_mut(width))
        {
            for (j, pixel) in src.iter().enumerate() {
                dst[width - 1 - j] = *pixel;
            }
        }

        self.data = new_data;
        Ok(())
    }

    /// Replaces every pixel with the truncated average of its channels.
    pub fn grayscale(&mut self) {
        for pixel in self.data.iter_mut() {
            *pixel = pixel.grayscale();
        }
    }

    /// Inverts every channel of every pixel.
    pub fn invert(&mut self) {
        for pixel in self.data.iter_mut() {
            *pixel = pixel.inverted();
        }
    }
}

/// Rotates `image` clockwise if there is one.
pub fn rotate_clockwise_90(image: Option<&mut Image>) -> Result<()> {
    match image {
        Some(image) => image.rotate_clockwise_90(),
        None => Ok(()),
    }
}

/// Mirrors `image` if there is one.
pub fn flip_horizontal(image: Option<&mut Image>) -> Result<()> {
    match image {
        Some(image) => image.flip_horizontal(),
        None => Ok(()),
    }
}

/// Converts `image` to grayscale if there is one.
pub fn grayscale(image: Option<&mut Image>) {
    if let Some(image) = image {
        image.grayscale();
    }
}

/// Inverts `image` if there is one.
pub fn invert(image: Option<&mut Image>) {
    if let Some(image) = image {
        image.invert();
    }
}
