//! Image rendering for nowcast patches.
//!
//! Implements:
//! - Palette colormaps for scalar fields (precipitation, elevation)
//! - GOES-16 multispectral composites
//! - Panel figures for model inputs and outputs
//! - PNG encoding

pub mod composite;
pub mod figure;
pub mod image;
pub mod layers;
pub mod palette;
pub mod png;

pub use figure::{show_inputs, show_outputs};
pub use image::RgbImage;
pub use palette::{render_palette, AnchorLayout, Color, Colormap, ValueRange};
