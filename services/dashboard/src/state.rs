//! Application state shared across handlers.

use patch_source::{ArchiveSource, PatchSource, SyntheticSource};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use wx_common::WxResult;

use crate::config::{DashboardSettings, Tables};
use crate::pipeline::Forecaster;

/// Where patches come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    /// `.wxp` tile archive rooted at a directory.
    Archive(PathBuf),
    /// Deterministic generated fields.
    Synthetic,
}

impl SourceConfig {
    pub fn build(&self, settings: &DashboardSettings) -> WxResult<Arc<dyn PatchSource>> {
        let source: Arc<dyn PatchSource> = match self {
            SourceConfig::Archive(root) => Arc::new(
                ArchiveSource::new(root).with_step_hours(settings.archive_step_hours)?,
            ),
            SourceConfig::Synthetic => Arc::new(SyntheticSource::default()),
        };
        Ok(source)
    }
}

/// Shared application state.
pub struct AppState {
    pub forecaster: Forecaster,
}

impl AppState {
    pub fn new(forecaster: Forecaster) -> Self {
        Self { forecaster }
    }

    /// Load config tables and models, and open the patch source.
    pub fn from_config(config_dir: &Path, source: &SourceConfig) -> WxResult<Self> {
        let tables = Tables::load_from_directory(config_dir)?;
        let source = source.build(&tables.settings)?;
        let forecaster = Forecaster::load(tables, source)?;
        info!(
            source = forecaster.source_name(),
            models = forecaster.tables().models.len(),
            "Application state initialized"
        );
        Ok(Self::new(forecaster))
    }
}
