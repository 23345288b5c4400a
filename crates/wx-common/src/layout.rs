//! Channel layout of model input and output patches.
//!
//! Input patches stack, in order: three GPM precipitation frames
//! (t-4h, t-2h, t0), three GOES-16 frames of 16 ABI bands each, and one
//! elevation channel.

use std::ops::Range;

/// GPM precipitation history channels.
pub const GPM_HISTORY: Range<usize> = 0..3;

/// Number of ABI bands per GOES-16 frame.
pub const GOES16_BANDS: usize = 16;

/// Channel ranges of the three GOES-16 frames.
pub const GOES16_FRAMES: [Range<usize>; 3] = [3..19, 19..35, 35..51];

/// Elevation channel.
pub const ELEVATION: usize = 51;

/// Total channels of a model input patch.
pub const INPUT_CHANNELS: usize = 52;

/// Channels of a model output or label patch.
pub const LABEL_CHANNELS: usize = 2;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_is_contiguous() {
        assert_eq!(GPM_HISTORY.end, GOES16_FRAMES[0].start);
        for pair in GOES16_FRAMES.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        for frame in GOES16_FRAMES.iter() {
            assert_eq!(frame.len(), GOES16_BANDS);
        }
        assert_eq!(GOES16_FRAMES[2].end, ELEVATION);
        assert_eq!(ELEVATION + 1, INPUT_CHANNELS);
    }
}
