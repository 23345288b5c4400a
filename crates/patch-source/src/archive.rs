//! Patches cut from an on-disk tile archive.
//!
//! ```text
//! <root>/
//!   20200930T1800/
//!     inputs.wxp   52 channels
//!     labels.wxp    2 channels
//!   20200930T2000/
//!     ...
//! ```

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use std::path::{Path, PathBuf};
use tracing::debug;
use wx_common::layout::{INPUT_CHANNELS, LABEL_CHANNELS};
use wx_common::{GeoPoint, Patch, WxError, WxResult};

use crate::codec::read_tile;
use crate::{check_patch_size, PatchSource};

pub const INPUTS_FILE: &str = "inputs.wxp";
pub const LABELS_FILE: &str = "labels.wxp";

/// Hours between archive slots unless configured otherwise.
pub const DEFAULT_STEP_HOURS: u32 = 2;

/// Directory name format of a slot.
pub const SLOT_FORMAT: &str = "%Y%m%dT%H%M";

/// Tile archive rooted at a directory.
#[derive(Debug, Clone)]
pub struct ArchiveSource {
    root: PathBuf,
    step_hours: u32,
}

impl ArchiveSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            step_hours: DEFAULT_STEP_HOURS,
        }
    }

    /// Use a different slot spacing, 1 to 24 hours.
    pub fn with_step_hours(mut self, step_hours: u32) -> WxResult<Self> {
        if !(1..=24).contains(&step_hours) {
            return Err(WxError::invalid_parameter(
                "step_hours",
                format!("{} is outside 1..=24", step_hours),
            ));
        }
        self.step_hours = step_hours;
        Ok(self)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn step_hours(&self) -> u32 {
        self.step_hours
    }

    /// Truncate `time` to the start of its archive slot.
    pub fn slot(&self, time: DateTime<Utc>) -> WxResult<NaiveDateTime> {
        let hour = time.hour() - time.hour() % self.step_hours;
        time.date_naive()
            .and_hms_opt(hour, 0, 0)
            .ok_or_else(|| WxError::Internal(format!("cannot truncate {} to hour {}", time, hour)))
    }

    /// Directory holding the tiles for `time`.
    pub fn slot_dir(&self, time: DateTime<Utc>) -> WxResult<PathBuf> {
        let slot = self.slot(time)?;
        Ok(self.root.join(slot.format(SLOT_FORMAT).to_string()))
    }

    fn load_window(
        &self,
        time: DateTime<Utc>,
        point: GeoPoint,
        patch_size: usize,
        file: &str,
        channels: usize,
    ) -> WxResult<Patch> {
        check_patch_size(patch_size)?;
        let path = self.slot_dir(time)?.join(file);
        debug!(path = %path.display(), %point, patch_size, "Reading archive tile");

        let tile = read_tile(&path).map_err(|e| match e {
            WxError::DataNotAvailable(_) => WxError::DataNotAvailable(format!(
                "{} (no {})",
                time.format("%Y-%m-%d %H:%M"),
                path.display()
            )),
            other => other,
        })?;
        tile.patch().expect_channels(channels)?;
        tile.extract_window(point, patch_size)
    }
}

impl PatchSource for ArchiveSource {
    fn name(&self) -> &str {
        "archive"
    }

    fn get_inputs_patch(
        &self,
        time: DateTime<Utc>,
        point: GeoPoint,
        patch_size: usize,
    ) -> WxResult<Patch> {
        self.load_window(time, point, patch_size, INPUTS_FILE, INPUT_CHANNELS)
    }

    fn get_labels_patch(
        &self,
        time: DateTime<Utc>,
        point: GeoPoint,
        patch_size: usize,
    ) -> WxResult<Patch> {
        self.load_window(time, point, patch_size, LABELS_FILE, LABEL_CHANNELS)
    }
}
