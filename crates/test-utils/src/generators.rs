//! Test data generators for synthetic weather patches.
//!
//! These generators create predictable, verifiable patterns that can be used
//! across the test suite. Nothing here is random: every value is a function
//! of position and seed.

use wx_common::layout::{ELEVATION, GOES16_FRAMES, GPM_HISTORY, INPUT_CHANNELS, LABEL_CHANNELS};
use wx_common::Patch;

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50);
/// assert_eq!(grid[1], 1000.0); // col=1, row=0
/// assert_eq!(grid[10], 1.0);   // col=0, row=1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// Creates a horizontal ramp from `min` at the left edge to `max` at the right.
pub fn create_ramp_grid(width: usize, height: usize, min: f32, max: f32) -> Vec<f32> {
    let denom = (width.max(2) - 1) as f32;
    (0..height)
        .flat_map(|_| (0..width).map(move |col| min + (max - min) * col as f32 / denom))
        .collect()
}

/// Creates a grid with precipitation-like values in mm/h.
///
/// Most cells are dry; a quarter carry up to 50 mm/h.
pub fn create_precipitation_grid(width: usize, height: usize, seed: u32) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let hash = simple_hash(col as u32, row as u32, seed);
            let precip = if hash % 4 == 0 {
                (hash % 5000) as f32 / 100.0
            } else {
                0.0
            };
            data.push(precip);
        }
    }
    data
}

/// Creates a radial storm cell: `peak` at the center, falling to zero at `radius`.
pub fn create_storm_grid(width: usize, height: usize, peak: f32, radius: f32) -> Vec<f32> {
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let d = ((col as f32 - cx).powi(2) + (row as f32 - cy).powi(2)).sqrt();
            data.push((peak * (1.0 - d / radius.max(f32::EPSILON))).max(0.0));
        }
    }
    data
}

/// Simple deterministic hash for reproducible test data.
pub fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}

/// Creates a 52-channel square input patch with plausible values.
///
/// - GPM history: storm cells, 0..20 mm/h
/// - GOES-16 bands: reflectance-like values in 0..3000
/// - Elevation: ramp from 0 to 3000 m
pub fn create_input_patch(size: usize) -> Patch {
    let mut planes: Vec<Vec<f32>> = Vec::with_capacity(INPUT_CHANNELS);
    for (i, _) in GPM_HISTORY.enumerate() {
        planes.push(create_storm_grid(size, size, 10.0 + 5.0 * i as f32, size as f32 / 2.0));
    }
    for frame in GOES16_FRAMES.iter() {
        for band in frame.clone() {
            let plane = (0..size * size)
                .map(|idx| (simple_hash((idx % size) as u32, (idx / size) as u32, band as u32) % 3000) as f32)
                .collect();
            planes.push(plane);
        }
    }
    debug_assert_eq!(planes.len(), ELEVATION);
    planes.push(create_ramp_grid(size, size, 0.0, 3000.0));

    Patch::from_planes(size, size, &planes).expect("planes are size * size")
}

/// Creates a 2-channel square label patch.
pub fn create_label_patch(size: usize, seed: u32) -> Patch {
    let planes: Vec<Vec<f32>> = (0..LABEL_CHANNELS as u32)
        .map(|ch| create_precipitation_grid(size, size, seed.wrapping_add(ch)))
        .collect();
    Patch::from_planes(size, size, &planes).expect("planes are size * size")
}
