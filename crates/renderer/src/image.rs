//! Minimal 8-bit RGB raster used as the output of every renderer.

use wx_common::{WxError, WxResult};

use crate::palette::Color;

/// An 8-bit RGB image, row-major, 3 bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbImage {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl RgbImage {
    /// Create an image filled with a single color.
    pub fn new(width: usize, height: usize, fill: Color) -> Self {
        let mut pixels = Vec::with_capacity(width * height * 3);
        for _ in 0..width * height {
            pixels.extend_from_slice(&[fill.r, fill.g, fill.b]);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Wrap raw RGB bytes.
    pub fn from_raw(width: usize, height: usize, pixels: Vec<u8>) -> WxResult<Self> {
        if pixels.len() != width * height * 3 {
            return Err(WxError::Render(format!(
                "expected {} bytes for {}x{} RGB image, got {}",
                width * height * 3,
                width,
                height,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Color at column `x`, row `y`.
    pub fn pixel(&self, x: usize, y: usize) -> Color {
        let i = (y * self.width + x) * 3;
        Color::new(self.pixels[i], self.pixels[i + 1], self.pixels[i + 2])
    }

    pub fn put_pixel(&mut self, x: usize, y: usize, color: Color) {
        let i = (y * self.width + x) * 3;
        self.pixels[i] = color.r;
        self.pixels[i + 1] = color.g;
        self.pixels[i + 2] = color.b;
    }

    /// Copy `src` into this image with its top-left corner at `(x, y)`.
    ///
    /// Parts of `src` falling outside this image are dropped.
    pub fn blit(&mut self, src: &RgbImage, x: usize, y: usize) {
        if x >= self.width || y >= self.height {
            return;
        }
        let copy_w = src.width.min(self.width - x);
        let copy_h = src.height.min(self.height - y);
        for row in 0..copy_h {
            let dst_start = ((y + row) * self.width + x) * 3;
            let src_start = row * src.width * 3;
            self.pixels[dst_start..dst_start + copy_w * 3]
                .copy_from_slice(&src.pixels[src_start..src_start + copy_w * 3]);
        }
    }
}
