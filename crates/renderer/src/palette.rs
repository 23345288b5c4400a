//! Palette-based rendering of scalar fields.
//!
//! A palette is an ordered list of hex colors. It is expanded into a
//! 256-entry colormap by linear interpolation of each RGB channel between
//! adjacent anchors. Values are normalized against a `[min, max]` range,
//! clipped to `[0, 1]` and mapped to a colormap index.

use rayon::prelude::*;
use wx_common::{WxError, WxResult};

use crate::image::RgbImage;

/// Number of entries in an interpolated colormap.
pub const COLORMAP_SIZE: usize = 256;

/// Minimum pixels to render in parallel
const PARALLEL_THRESHOLD: usize = 4096;

/// An 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a 6-digit hex color, with or without a leading `#`.
    pub fn from_hex(hex: &str) -> WxResult<Self> {
        hex_to_rgb(hex)
            .map(|(r, g, b)| Color::new(r, g, b))
            .ok_or_else(|| WxError::InvalidPalette(format!("invalid hex color '{}'", hex)))
    }
}

/// Parse hex color string to RGB
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}

/// Where palette anchors sit along the colormap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnchorLayout {
    /// First anchor at entry 0, last anchor at entry 255, the rest evenly
    /// spaced in between.
    #[default]
    Endpoints,
    /// Anchor `i` at entry `i * 255 / k` for `k` anchors, so the last
    /// `1/k` of the colormap holds the last color. Entries are interpolated
    /// in `f64` from `j * (k / 255)` and truncated, which reproduces the
    /// legacy dashboard colors bit for bit.
    Bands,
}

/// A validated `[min, max]` normalization range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    min: f32,
    max: f32,
}

impl ValueRange {
    /// Fails with InvalidRange unless both bounds are finite and `min < max`.
    pub fn new(min: f32, max: f32) -> WxResult<Self> {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(WxError::InvalidRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    /// Map a value into `[0, 1]`, clamping outside the range.
    ///
    /// NaN stays NaN; callers convert it to index 0.
    #[inline]
    pub fn normalize(&self, value: f32) -> f64 {
        let scaled = (value as f64 - self.min as f64) / (self.max as f64 - self.min as f64);
        scaled.clamp(0.0, 1.0)
    }
}

/// A 256-entry colormap interpolated from palette anchors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Colormap {
    entries: Vec<Color>,
}

impl Colormap {
    /// Interpolate a colormap from anchor colors.
    pub fn from_colors(anchors: &[Color], layout: AnchorLayout) -> WxResult<Self> {
        if anchors.is_empty() {
            return Err(WxError::InvalidPalette("palette is empty".to_string()));
        }

        let k = anchors.len();
        let last = anchors[k - 1];
        let span = COLORMAP_SIZE - 1;
        let entries = match layout {
            // Positions j * (k - 1) / 255 are exact rationals
            AnchorLayout::Endpoints => (0..COLORMAP_SIZE)
                .map(|j| {
                    let position = j * (k - 1);
                    let i = position / span;
                    if i + 1 >= k {
                        return last;
                    }
                    interpolate_color(anchors[i], anchors[i + 1], position % span, span)
                })
                .collect(),
            AnchorLayout::Bands => {
                let step = k as f64 / span as f64;
                (0..COLORMAP_SIZE)
                    .map(|j| {
                        let x = if j == span { k as f64 } else { j as f64 * step };
                        let i = x as usize;
                        if i + 1 >= k {
                            return last;
                        }
                        lerp_color(anchors[i], anchors[i + 1], x - i as f64)
                    })
                    .collect()
            }
        };

        Ok(Self { entries })
    }

    /// Parse a hex palette and interpolate a colormap from it.
    pub fn from_hex_palette<S: AsRef<str>>(palette: &[S], layout: AnchorLayout) -> WxResult<Self> {
        let anchors = palette
            .iter()
            .map(|hex| Color::from_hex(hex.as_ref()))
            .collect::<WxResult<Vec<_>>>()?;
        Self::from_colors(&anchors, layout)
    }

    pub fn entries(&self) -> &[Color] {
        &self.entries
    }

    /// Colormap index for a normalized value in `[0, 1]`.
    #[inline]
    pub fn index(normalized: f64) -> usize {
        // Float-to-int casts saturate and send NaN to 0
        ((normalized * 255.0) as u8) as usize
    }

    /// Color for a normalized value in `[0, 1]`.
    #[inline]
    pub fn lookup(&self, normalized: f64) -> Color {
        self.entries[Self::index(normalized)]
    }

    /// Color for a raw value under the given range.
    #[inline]
    pub fn color_for(&self, value: f32, range: &ValueRange) -> Color {
        self.lookup(range.normalize(value))
    }
}

/// Linear color interpolation at `num / den`, truncating each channel.
fn interpolate_color(c1: Color, c2: Color, num: usize, den: usize) -> Color {
    let lerp = |a: u8, b: u8| ((a as usize * (den - num) + b as usize * num) / den) as u8;
    Color::new(lerp(c1.r, c2.r), lerp(c1.g, c2.g), lerp(c1.b, c2.b))
}

/// Floating-point interpolation at `t`, truncating each channel.
fn lerp_color(c1: Color, c2: Color, t: f64) -> Color {
    let lerp = |a: u8, b: u8| ((b as f64 - a as f64) * t + a as f64) as u8;
    Color::new(lerp(c1.r, c2.r), lerp(c1.g, c2.g), lerp(c1.b, c2.b))
}

/// Render a row-major scalar plane through a colormap.
pub fn render_colormap(
    values: &[f32],
    width: usize,
    height: usize,
    colormap: &Colormap,
    range: &ValueRange,
) -> WxResult<RgbImage> {
    if values.len() != width * height {
        return Err(WxError::Render(format!(
            "expected {} values for {}x{} plane, got {}",
            width * height,
            width,
            height,
            values.len()
        )));
    }

    let mut pixels = vec![0u8; width * height * 3];
    let paint = |(px, &value): (&mut [u8], &f32)| {
        let color = colormap.color_for(value, range);
        px[0] = color.r;
        px[1] = color.g;
        px[2] = color.b;
    };

    if values.len() >= PARALLEL_THRESHOLD {
        pixels.par_chunks_mut(3).zip(values.par_iter()).for_each(paint);
    } else {
        pixels.chunks_mut(3).zip(values.iter()).for_each(paint);
    }

    RgbImage::from_raw(width, height, pixels)
}

/// Render a scalar plane with a hex palette.
///
/// Anchors span the whole colormap: `min` maps to the first palette color and
/// `max` to the last. Values outside `[min, max]` saturate.
///
/// # Arguments
/// - `values`: Row-major scalar plane (`width * height` values)
/// - `palette`: Hex encoded anchor colors
/// - `min`, `max`: Normalization range, `min < max`
pub fn render_palette<S: AsRef<str>>(
    values: &[f32],
    width: usize,
    height: usize,
    palette: &[S],
    min: f32,
    max: f32,
) -> WxResult<RgbImage> {
    let range = ValueRange::new(min, max)?;
    let colormap = Colormap::from_hex_palette(palette, AnchorLayout::Endpoints)?;
    render_colormap(values, width, height, &colormap, &range)
}
