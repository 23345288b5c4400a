//! Panel figures for model inputs and outputs.
//!
//! A figure is a grid of equally sized panels separated by a white gutter.
//!
//! Output figures are one row of two GPM panels (channel 0 and channel 1).
//! Input figures are two rows of four panels:
//!
//! ```text
//! | GPM t-4h   | GPM t-2h   | GPM t0     | elevation |
//! | GOES16 #1  | GOES16 #2  | GOES16 #3  |           |
//! ```

use tracing::debug;
use wx_common::layout::{ELEVATION, GOES16_FRAMES, GPM_HISTORY, INPUT_CHANNELS, LABEL_CHANNELS};
use wx_common::{Patch, WxError, WxResult};

use crate::image::RgbImage;
use crate::layers::{render_elevation, render_goes16_frame, render_gpm};
use crate::palette::Color;

/// Spacing between panels and around the figure border, in pixels.
pub const GUTTER: usize = 8;

/// Figure background color.
pub const BACKGROUND: Color = Color::WHITE;

/// Pixel size of a `rows x cols` grid of `panel_width x panel_height` panels.
pub fn figure_size(rows: usize, cols: usize, panel_width: usize, panel_height: usize) -> (usize, usize) {
    (
        cols * panel_width + (cols + 1) * GUTTER,
        rows * panel_height + (rows + 1) * GUTTER,
    )
}

/// Top-left corner of the panel at `(row, col)`.
pub fn panel_origin(row: usize, col: usize, panel_width: usize, panel_height: usize) -> (usize, usize) {
    (
        GUTTER + col * (panel_width + GUTTER),
        GUTTER + row * (panel_height + GUTTER),
    )
}

/// Lay out panels row by row; `None` leaves a cell empty.
pub fn compose(panels: &[Option<RgbImage>], rows: usize, cols: usize) -> WxResult<RgbImage> {
    if panels.len() > rows * cols {
        return Err(WxError::Render(format!(
            "{} panels do not fit a {}x{} grid",
            panels.len(),
            rows,
            cols
        )));
    }

    let (panel_width, panel_height) = panels
        .iter()
        .flatten()
        .next()
        .map(|p| (p.width(), p.height()))
        .ok_or_else(|| WxError::Render("figure has no panels".to_string()))?;

    if panels
        .iter()
        .flatten()
        .any(|p| p.width() != panel_width || p.height() != panel_height)
    {
        return Err(WxError::Render("figure panels differ in size".to_string()));
    }

    let (width, height) = figure_size(rows, cols, panel_width, panel_height);
    let mut figure = RgbImage::new(width, height, BACKGROUND);
    for (idx, panel) in panels.iter().enumerate() {
        if let Some(panel) = panel {
            let (x, y) = panel_origin(idx / cols, idx % cols, panel_width, panel_height);
            figure.blit(panel, x, y);
        }
    }

    debug!(rows, cols, width, height, "Composed figure");
    Ok(figure)
}

/// Render a prediction or label patch as two side-by-side GPM panels.
pub fn show_outputs(patch: &Patch) -> WxResult<RgbImage> {
    if patch.channels() < LABEL_CHANNELS {
        return Err(WxError::ChannelMismatch {
            expected: LABEL_CHANNELS,
            actual: patch.channels(),
        });
    }
    let panels = [Some(render_gpm(patch, 0)?), Some(render_gpm(patch, 1)?)];
    compose(&panels, 1, 2)
}

/// Render a model input patch as a 2x4 grid of its layers.
pub fn show_inputs(patch: &Patch) -> WxResult<RgbImage> {
    if patch.channels() < INPUT_CHANNELS {
        return Err(WxError::ChannelMismatch {
            expected: INPUT_CHANNELS,
            actual: patch.channels(),
        });
    }

    let mut panels: Vec<Option<RgbImage>> = Vec::with_capacity(8);
    for channel in GPM_HISTORY {
        panels.push(Some(render_gpm(patch, channel)?));
    }
    panels.push(Some(render_elevation(patch, ELEVATION)?));
    for frame in 0..GOES16_FRAMES.len() {
        panels.push(Some(render_goes16_frame(patch, frame)?));
    }
    panels.push(None);

    compose(&panels, 2, 4)
}
