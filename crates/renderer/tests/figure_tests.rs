//! Tests for input and output figures.

use renderer::figure::{compose, figure_size, panel_origin, BACKGROUND, GUTTER};
use renderer::layers::{render_elevation, render_goes16_frame, render_gpm};
use renderer::palette::Color;
use renderer::{show_inputs, show_outputs, RgbImage};
use test_utils::{create_input_patch, create_label_patch};
use wx_common::{Patch, WxError};

fn crop(image: &RgbImage, x0: usize, y0: usize, width: usize, height: usize) -> RgbImage {
    let mut out = RgbImage::new(width, height, Color::BLACK);
    for y in 0..height {
        for x in 0..width {
            out.put_pixel(x, y, image.pixel(x0 + x, y0 + y));
        }
    }
    out
}

// ============================================================================
// Layout
// ============================================================================

#[test]
fn test_figure_size() {
    assert_eq!(figure_size(1, 2, 16, 16), (2 * 16 + 3 * GUTTER, 16 + 2 * GUTTER));
    assert_eq!(figure_size(2, 4, 10, 20), (4 * 10 + 5 * GUTTER, 2 * 20 + 3 * GUTTER));
}

#[test]
fn test_compose_places_panels() {
    let red = RgbImage::new(4, 3, Color::new(255, 0, 0));
    let blue = RgbImage::new(4, 3, Color::new(0, 0, 255));
    let figure = compose(&[Some(red.clone()), None, Some(blue.clone())], 2, 2).unwrap();

    let (x, y) = panel_origin(0, 0, 4, 3);
    assert_eq!(crop(&figure, x, y, 4, 3), red);
    let (x, y) = panel_origin(1, 0, 4, 3);
    assert_eq!(crop(&figure, x, y, 4, 3), blue);

    // Empty cell and gutters stay background
    let (x, y) = panel_origin(0, 1, 4, 3);
    assert_eq!(figure.pixel(x, y), BACKGROUND);
    assert_eq!(figure.pixel(0, 0), BACKGROUND);
}

#[test]
fn test_compose_errors() {
    let a = RgbImage::new(4, 4, Color::BLACK);
    let b = RgbImage::new(5, 4, Color::BLACK);
    assert!(compose(&[Some(a.clone()), Some(b)], 1, 2).is_err());
    assert!(compose(&[None, None], 1, 2).is_err());
    assert!(compose(&[Some(a.clone()), Some(a.clone()), Some(a)], 1, 2).is_err());
}

// ============================================================================
// Output figures
// ============================================================================

#[test]
fn test_show_outputs() {
    let labels = create_label_patch(16, 3);
    let figure = show_outputs(&labels).unwrap();
    assert_eq!((figure.width(), figure.height()), figure_size(1, 2, 16, 16));

    for channel in 0..2 {
        let (x, y) = panel_origin(0, channel, 16, 16);
        assert_eq!(crop(&figure, x, y, 16, 16), render_gpm(&labels, channel).unwrap());
    }
}

#[test]
fn test_show_outputs_needs_two_channels() {
    let patch = Patch::zeros(8, 8, 1).unwrap();
    assert!(matches!(
        show_outputs(&patch),
        Err(WxError::ChannelMismatch { expected: 2, actual: 1 })
    ));
}

// ============================================================================
// Input figures
// ============================================================================

#[test]
fn test_show_inputs_layout() {
    let inputs = create_input_patch(12);
    let figure = show_inputs(&inputs).unwrap();
    assert_eq!((figure.width(), figure.height()), figure_size(2, 4, 12, 12));

    for gpm in 0..3 {
        let (x, y) = panel_origin(0, gpm, 12, 12);
        assert_eq!(crop(&figure, x, y, 12, 12), render_gpm(&inputs, gpm).unwrap());
    }
    let (x, y) = panel_origin(0, 3, 12, 12);
    assert_eq!(crop(&figure, x, y, 12, 12), render_elevation(&inputs, 51).unwrap());
    for frame in 0..3 {
        let (x, y) = panel_origin(1, frame, 12, 12);
        assert_eq!(
            crop(&figure, x, y, 12, 12),
            render_goes16_frame(&inputs, frame).unwrap()
        );
    }

    let (x, y) = panel_origin(1, 3, 12, 12);
    assert_eq!(crop(&figure, x, y, 12, 12), RgbImage::new(12, 12, BACKGROUND));
}

#[test]
fn test_show_inputs_needs_all_channels() {
    let patch = Patch::zeros(8, 8, 51).unwrap();
    assert!(matches!(
        show_inputs(&patch),
        Err(WxError::ChannelMismatch { expected: 52, actual: 51 })
    ));
}

#[test]
fn test_goes16_frame_out_of_range() {
    let inputs = create_input_patch(4);
    assert!(render_goes16_frame(&inputs, 3).is_err());
}
