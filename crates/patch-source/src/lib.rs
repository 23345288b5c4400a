//! Patch retrieval.
//!
//! A [`PatchSource`] assembles the model's input patch and the matching
//! ground-truth labels for a UTC time and a point. Two implementations are
//! provided:
//!
//! - [`ArchiveSource`] cuts windows out of georeferenced `.wxp` tiles on disk
//! - [`SyntheticSource`] generates deterministic, plausible fields

pub mod archive;
pub mod codec;
pub mod synthetic;

pub use archive::ArchiveSource;
pub use codec::{decode_tile, encode_tile, read_tile, write_tile, Georef, Tile};
pub use synthetic::SyntheticSource;

use chrono::{DateTime, Utc};
use wx_common::{GeoPoint, Patch, WxError, WxResult};

/// Source of model inputs and labels.
///
/// Both methods return a `(patch_size, patch_size, C)` patch centered on
/// `point`, with C = 52 for inputs and C = 2 for labels.
pub trait PatchSource: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Input patch (GPM history, GOES-16 frames, elevation) at `time`.
    fn get_inputs_patch(
        &self,
        time: DateTime<Utc>,
        point: GeoPoint,
        patch_size: usize,
    ) -> WxResult<Patch>;

    /// Observed precipitation following `time`.
    fn get_labels_patch(
        &self,
        time: DateTime<Utc>,
        point: GeoPoint,
        patch_size: usize,
    ) -> WxResult<Patch>;
}

pub(crate) fn check_patch_size(patch_size: usize) -> WxResult<()> {
    if patch_size == 0 {
        return Err(WxError::invalid_parameter("patch_size", "must be positive"));
    }
    Ok(())
}
