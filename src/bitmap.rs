//! The pixel buffer and its image-file persistence.
//!
//! A [`Bitmap`] is a flat, row-major RGBA byte buffer.  The renderer
//! never locks it; the coordinator carves it into disjoint per-band
//! slices up front and each worker writes only inside its own slice.

use color::Color;
use image::png::PNGEncoder;
use image::ColorType;
use std::fs::File;
use std::io;
use std::path::Path;

/// Bytes per pixel: red, green, blue, alpha.
pub const PIXEL_BYTES: usize = 4;

/// A width x height grid of RGBA pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct Bitmap {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Bitmap {
    /// Allocates a buffer of the given dimensions with every channel
    /// at zero.
    pub fn new(width: usize, height: usize) -> Bitmap {
        Bitmap {
            width,
            height,
            pixels: vec![0; width * height * PIXEL_BYTES],
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Overwrites every pixel with the given color.
    pub fn reset(&mut self, color: Color) {
        for pixel in self.pixels.chunks_mut(PIXEL_BYTES) {
            pixel.copy_from_slice(&color.channels());
        }
    }

    /// Writes one pixel.  Panics when `(x, y)` is outside the grid.
    pub fn set(&mut self, x: usize, y: usize, color: Color) {
        assert!(x < self.width && y < self.height);
        let offset = (y * self.width + x) * PIXEL_BYTES;
        self.pixels[offset..offset + PIXEL_BYTES].copy_from_slice(&color.channels());
    }

    /// Reads one pixel back.  Panics when `(x, y)` is outside the
    /// grid.
    pub fn get(&self, x: usize, y: usize) -> Color {
        assert!(x < self.width && y < self.height);
        let offset = (y * self.width + x) * PIXEL_BYTES;
        Color::rgba(
            self.pixels[offset],
            self.pixels[offset + 1],
            self.pixels[offset + 2],
            self.pixels[offset + 3],
        )
    }

    /// The raw bytes, row-major RGBA.
    pub fn raw(&self) -> &[u8] {
        &self.pixels
    }

    /// The raw bytes, mutable, for carving into per-band slices.
    pub fn raw_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Encodes the buffer as a PNG file at `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let output = File::create(path)?;
        let encoder = PNGEncoder::new(output);
        encoder.encode(
            &self.pixels,
            self.width as u32,
            self.height as u32,
            ColorType::RGBA(8),
        )
    }
}

#[cfg(test)]
mod tests {
    extern crate tempfile;

    use super::*;
    use image::GenericImageView;

    #[test]
    fn set_and_get_round_trip() {
        let mut bitmap = Bitmap::new(3, 2);
        let red = Color::rgba(255, 0, 0, 0);
        bitmap.set(2, 1, red);
        assert_eq!(bitmap.get(2, 1), red);
        assert_eq!(bitmap.get(0, 0), Color::rgba(0, 0, 0, 0));
    }

    #[test]
    fn reset_paints_every_pixel() {
        let mut bitmap = Bitmap::new(4, 4);
        let blue = Color::rgba(0, 0, 255, 0);
        bitmap.reset(blue);
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(bitmap.get(x, y), blue);
            }
        }
    }

    #[test]
    #[should_panic]
    fn out_of_bounds_writes_are_refused() {
        let mut bitmap = Bitmap::new(2, 2);
        bitmap.set(2, 0, Color::rgba(0, 0, 0, 0));
    }

    #[test]
    fn save_produces_a_decodable_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let mut bitmap = Bitmap::new(5, 3);
        bitmap.reset(Color::rgba(10, 20, 30, 0));
        bitmap.save(&path).unwrap();

        let decoded = image::open(&path).unwrap();
        assert_eq!(decoded.dimensions(), (5, 3));
        assert_eq!(decoded.color(), ColorType::RGBA(8));
    }
}
