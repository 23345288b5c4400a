//! Named renderers for the dashboard layers.

use wx_common::layout::GOES16_FRAMES;
use wx_common::{Patch, WxResult};

use crate::composite::render_goes16;
use crate::image::RgbImage;
use crate::palette::{render_colormap, AnchorLayout, Colormap, ValueRange};

/// GPM precipitation palette, light to heavy.
pub const GPM_PALETTE: [&str; 10] = [
    "000096", // Navy blue
    "0064ff", // Blue ribbon blue
    "00b4ff", // Dodger blue
    "33db80", // Shamrock green
    "9beb4a", // Conifer green
    "ffeb00", // Turbo yellow
    "ffb300", // Selective yellow
    "ff6400", // Blaze orange
    "eb1e00", // Scarlet red
    "af0000", // Bright red
];

/// Precipitation rate (mm/h) at which the GPM palette saturates.
pub const GPM_MAX: f32 = 20.0;

/// Elevation palette, sea level to peaks.
pub const ELEVATION_PALETTE: [&str; 8] = [
    "000000", // Black
    "478fcd", // Shakespeare blue
    "86c58e", // De York green
    "afc35e", // Celery green
    "8f7131", // Pesto brown
    "b78d4f", // Muddy waters brown
    "e2b8a6", // Rose fog pink
    "ffffff", // White
];

/// Elevation (m) at which the elevation palette saturates.
pub const ELEVATION_MAX: f32 = 3000.0;

/// A palette plus the value range it covers.
#[derive(Debug, Clone, Copy)]
pub struct LayerStyle {
    pub palette: &'static [&'static str],
    pub min: f32,
    pub max: f32,
}

pub const GPM_STYLE: LayerStyle = LayerStyle {
    palette: &GPM_PALETTE,
    min: 0.0,
    max: GPM_MAX,
};

pub const ELEVATION_STYLE: LayerStyle = LayerStyle {
    palette: &ELEVATION_PALETTE,
    min: 0.0,
    max: ELEVATION_MAX,
};

impl LayerStyle {
    /// Render one channel of a patch with this style.
    ///
    /// Uses the banded anchor layout so colors match the legacy dashboard.
    pub fn render_channel(&self, patch: &Patch, channel: usize) -> WxResult<RgbImage> {
        let plane = patch.channel(channel)?;
        let range = ValueRange::new(self.min, self.max)?;
        let colormap = Colormap::from_hex_palette(self.palette, AnchorLayout::Bands)?;
        render_colormap(&plane, patch.width(), patch.height(), &colormap, &range)
    }
}

/// Render a GPM precipitation channel.
pub fn render_gpm(patch: &Patch, channel: usize) -> WxResult<RgbImage> {
    GPM_STYLE.render_channel(patch, channel)
}

/// Render an elevation channel.
pub fn render_elevation(patch: &Patch, channel: usize) -> WxResult<RgbImage> {
    ELEVATION_STYLE.render_channel(patch, channel)
}

/// Render one of the three GOES-16 frames of an input patch.
pub fn render_goes16_frame(inputs: &Patch, frame: usize) -> WxResult<RgbImage> {
    let range = GOES16_FRAMES.get(frame).cloned().ok_or_else(|| {
        wx_common::WxError::invalid_parameter("frame", format!("{} is not in 0..3", frame))
    })?;
    render_goes16(&inputs.slice_channels(range)?)
}
