//! Multispectral composite rendering.
//!
//! GOES-16 ABI frames carry 16 bands. A true-color-like composite uses the
//! red band (C02) for R, the "veggie" near-IR band (C03) for G and the blue
//! band (C01) for B.

use wx_common::{Patch, WxError, WxResult};

use crate::image::RgbImage;
use crate::palette::ValueRange;

/// Band indices within a GOES-16 frame used for R, G and B.
pub const GOES16_RGB_BANDS: [usize; 3] = [
    1, // CMI_C02
    2, // CMI_C03
    0, // CMI_C01
];

/// Reflectance scale ceiling for GOES-16 composites.
pub const GOES16_MAX: f32 = 3000.0;

/// Render channel-last RGB values as an image.
///
/// Each value is scaled by `(v - min) / (max - min)`, clipped to `[0, 1]`,
/// multiplied by 255 and truncated.
///
/// # Arguments
/// - `values`: `width * height * 3` values, channel-last
/// - `min`, `max`: Normalization range, `min < max`
pub fn render_rgb(
    values: &[f32],
    width: usize,
    height: usize,
    min: f32,
    max: f32,
) -> WxResult<RgbImage> {
    let range = ValueRange::new(min, max)?;
    if values.len() != width * height * 3 {
        return Err(WxError::Render(format!(
            "expected {} values for {}x{} RGB, got {}",
            width * height * 3,
            width,
            height,
            values.len()
        )));
    }

    let pixels = values
        .iter()
        .map(|&v| (range.normalize(v) * 255.0) as u8)
        .collect();
    RgbImage::from_raw(width, height, pixels)
}

/// Render a GOES-16 frame (at least 3 bands, normally 16) as a color composite.
pub fn render_goes16(frame: &Patch) -> WxResult<RgbImage> {
    let needed = GOES16_RGB_BANDS.iter().max().map_or(0, |&b| b + 1);
    if frame.channels() < needed {
        return Err(WxError::ChannelMismatch {
            expected: needed,
            actual: frame.channels(),
        });
    }

    let mut rgb = Vec::with_capacity(frame.width() * frame.height() * 3);
    for row in 0..frame.height() {
        for col in 0..frame.width() {
            let px = frame.pixel(row, col);
            rgb.extend(GOES16_RGB_BANDS.iter().map(|&band| px[band]));
        }
    }
    render_rgb(&rgb, frame.width(), frame.height(), 0.0, GOES16_MAX)
}
