//! Deterministic synthetic patches.
//!
//! Fields are a function of the timestamp and point only, so repeated
//! requests return identical patches. A single storm cell drifts across the
//! window: the GPM history shows it at t-4h, t-2h and t0, the labels at
//! t+2h and t+4h. GOES-16 bands brighten over the storm. Elevation depends
//! on the point alone.

use chrono::{DateTime, Utc};
use wx_common::layout::{ELEVATION, GOES16_FRAMES, GPM_HISTORY, INPUT_CHANNELS, LABEL_CHANNELS};
use wx_common::{GeoPoint, Patch, WxResult};

use crate::{check_patch_size, PatchSource};

/// Peak GPM precipitation rate, mm/h.
pub const MAX_PRECIP: f32 = 20.0;

/// Ceiling of synthetic GOES-16 values.
pub const MAX_GOES: f32 = 3000.0;

/// Ceiling of synthetic elevation, meters.
pub const MAX_ELEVATION: f32 = 100.0;

/// Generator of plausible fields without any data on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticSource {
    seed: u64,
}

impl SyntheticSource {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    fn point_seed(&self, point: GeoPoint) -> u64 {
        mix(self.seed ^ point.lon.to_bits() ^ point.lat.to_bits().rotate_left(32))
    }

    fn storm(&self, time: DateTime<Utc>, point: GeoPoint, size: usize) -> Storm {
        let s = mix(self.point_seed(point) ^ time.timestamp() as u64);
        let size = size as f32;
        Storm {
            cx: size * (0.25 + 0.5 * unit(s, 0)),
            cy: size * (0.25 + 0.5 * unit(s, 1)),
            dx: size * (unit(s, 2) - 0.5) / 4.0,
            dy: size * (unit(s, 3) - 0.5) / 4.0,
            radius: size * (0.15 + 0.2 * unit(s, 4)) + 1.0,
            peak: MAX_PRECIP * (0.25 + 0.75 * unit(s, 5)),
        }
    }
}

/// One drifting precipitation cell. Offsets are in 2-hour steps from t0.
struct Storm {
    cx: f32,
    cy: f32,
    dx: f32,
    dy: f32,
    radius: f32,
    peak: f32,
}

impl Storm {
    /// Precipitation at pixel (row, col), `step` slots after t0.
    fn rate(&self, row: usize, col: usize, step: i32) -> f32 {
        let x = self.cx + self.dx * step as f32;
        let y = self.cy + self.dy * step as f32;
        let d = ((col as f32 - x).powi(2) + (row as f32 - y).powi(2)).sqrt();
        (self.peak * (1.0 - d / self.radius)).clamp(0.0, MAX_PRECIP)
    }
}

impl PatchSource for SyntheticSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn get_inputs_patch(
        &self,
        time: DateTime<Utc>,
        point: GeoPoint,
        patch_size: usize,
    ) -> WxResult<Patch> {
        check_patch_size(patch_size)?;
        let storm = self.storm(time, point, patch_size);
        let terrain = self.point_seed(point);
        let phase = unit(terrain, 0) * std::f32::consts::TAU;
        let mut patch = Patch::zeros(patch_size, patch_size, INPUT_CHANNELS)?;

        for row in 0..patch_size {
            for col in 0..patch_size {
                for (i, ch) in GPM_HISTORY.enumerate() {
                    patch.set(row, col, ch, storm.rate(row, col, i as i32 - 2));
                }
                for (f, frame) in GOES16_FRAMES.iter().enumerate() {
                    let cloud = storm.rate(row, col, f as i32 - 2) / MAX_PRECIP;
                    for (band, ch) in frame.clone().enumerate() {
                        let pixel_seed = mix(terrain ^ (row * patch_size + col) as u64);
                        let noise = unit(pixel_seed, band as u32);
                        let brightness = 1.0 - band as f32 / 32.0;
                        let value = 400.0 + 2200.0 * cloud * brightness + 300.0 * noise;
                        patch.set(row, col, ch, value.clamp(0.0, MAX_GOES));
                    }
                }
                let relief = (col as f32 * 0.07 + phase).sin() * (row as f32 * 0.05).cos();
                patch.set(row, col, ELEVATION, MAX_ELEVATION * (0.5 + 0.5 * relief));
            }
        }
        Ok(patch)
    }

    fn get_labels_patch(
        &self,
        time: DateTime<Utc>,
        point: GeoPoint,
        patch_size: usize,
    ) -> WxResult<Patch> {
        check_patch_size(patch_size)?;
        let storm = self.storm(time, point, patch_size);
        let mut patch = Patch::zeros(patch_size, patch_size, LABEL_CHANNELS)?;
        for row in 0..patch_size {
            for col in 0..patch_size {
                for ch in 0..LABEL_CHANNELS {
                    patch.set(row, col, ch, storm.rate(row, col, ch as i32 + 1));
                }
            }
        }
        Ok(patch)
    }
}

/// splitmix64 finalizer.
fn mix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Uniform value in [0, 1) derived from `seed` and a lane.
fn unit(seed: u64, lane: u32) -> f32 {
    (mix(seed.wrapping_add(lane as u64)) >> 40) as f32 / (1u64 << 24) as f32
}
