//! Multi-channel raster patches.
//!
//! A patch is a `height x width x channels` array of `f32` values stored in
//! row-major, channel-last order:
//!
//! ```text
//! data[(row * width + col) * channels + channel]
//! ```
//!
//! Model inputs stack 52 channels (see [`crate::layout`]); model outputs and
//! labels carry two.

use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::error::{WxError, WxResult};

/// A fixed-size multi-channel 2D array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PatchRepr")]
pub struct Patch {
    width: usize,
    height: usize,
    channels: usize,
    data: Vec<f32>,
}

/// Unchecked serialized form, validated on conversion.
#[derive(Deserialize)]
struct PatchRepr {
    width: usize,
    height: usize,
    channels: usize,
    data: Vec<f32>,
}

impl TryFrom<PatchRepr> for Patch {
    type Error = WxError;

    fn try_from(repr: PatchRepr) -> WxResult<Self> {
        Patch::new(repr.width, repr.height, repr.channels, repr.data)
    }
}

fn element_count(width: usize, height: usize, channels: usize) -> WxResult<usize> {
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(channels))
        .ok_or_else(|| {
            WxError::invalid_parameter(
                "shape",
                format!("{}x{}x{} overflows", width, height, channels),
            )
        })
}

impl Patch {
    /// Create a patch from channel-last data.
    ///
    /// Fails if `data.len() != width * height * channels` or the element
    /// count overflows `usize`.
    pub fn new(width: usize, height: usize, channels: usize, data: Vec<f32>) -> WxResult<Self> {
        let expected = element_count(width, height, channels)?;
        if data.len() != expected {
            return Err(WxError::invalid_parameter(
                "data",
                format!(
                    "expected {} values for {}x{}x{}, got {}",
                    expected,
                    width,
                    height,
                    channels,
                    data.len()
                ),
            ));
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Create a zero-filled patch.
    pub fn zeros(width: usize, height: usize, channels: usize) -> WxResult<Self> {
        let count = element_count(width, height, channels)?;
        Ok(Self {
            width,
            height,
            channels,
            data: vec![0.0; count],
        })
    }

    /// Stack single-channel planes (each `width * height`, row-major) into a patch.
    pub fn from_planes(width: usize, height: usize, planes: &[Vec<f32>]) -> WxResult<Self> {
        let channels = planes.len();
        let mut patch = Self::zeros(width, height, channels)?;
        for (ch, plane) in planes.iter().enumerate() {
            if plane.len() != width * height {
                return Err(WxError::invalid_parameter(
                    "planes",
                    format!("plane {} has {} values, expected {}", ch, plane.len(), width * height),
                ));
            }
            for (idx, &value) in plane.iter().enumerate() {
                patch.data[idx * channels + ch] = value;
            }
        }
        Ok(patch)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// `(width, height, channels)`
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.width, self.height, self.channels)
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    #[inline]
    fn offset(&self, row: usize, col: usize, channel: usize) -> usize {
        (row * self.width + col) * self.channels + channel
    }

    /// Value at `(row, col, channel)`. Panics when out of range, like slice indexing.
    #[inline]
    pub fn get(&self, row: usize, col: usize, channel: usize) -> f32 {
        self.data[self.offset(row, col, channel)]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, channel: usize, value: f32) {
        let idx = self.offset(row, col, channel);
        self.data[idx] = value;
    }

    /// All channel values of one pixel.
    #[inline]
    pub fn pixel(&self, row: usize, col: usize) -> &[f32] {
        let start = self.offset(row, col, 0);
        &self.data[start..start + self.channels]
    }

    /// Extract one channel as a row-major plane.
    pub fn channel(&self, channel: usize) -> WxResult<Vec<f32>> {
        if channel >= self.channels {
            return Err(WxError::ChannelMismatch {
                expected: channel + 1,
                actual: self.channels,
            });
        }
        Ok(self
            .data
            .chunks_exact(self.channels)
            .map(|px| px[channel])
            .collect())
    }

    /// Copy a contiguous range of channels into a new patch.
    pub fn slice_channels(&self, range: Range<usize>) -> WxResult<Patch> {
        if range.end > self.channels || range.start >= range.end {
            return Err(WxError::ChannelMismatch {
                expected: range.end,
                actual: self.channels,
            });
        }
        let channels = range.len();
        let mut data = Vec::with_capacity(self.width * self.height * channels);
        for px in self.data.chunks_exact(self.channels) {
            data.extend_from_slice(&px[range.clone()]);
        }
        Ok(Patch {
            width: self.width,
            height: self.height,
            channels,
            data,
        })
    }

    /// Fail with ChannelMismatch unless the patch has exactly `expected` channels.
    pub fn expect_channels(&self, expected: usize) -> WxResult<()> {
        if self.channels != expected {
            return Err(WxError::ChannelMismatch {
                expected,
                actual: self.channels,
            });
        }
        Ok(())
    }
}
