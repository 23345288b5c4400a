//! Shared setup for dashboard integration tests.

#![allow(dead_code)]

use dashboard::config::{DashboardSettings, ModelEntry, Tables};
use dashboard::pipeline::Forecaster;
use nowcast_model::WeatherModel;
use patch_source::SyntheticSource;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use wx_common::layout::{INPUT_CHANNELS, LABEL_CHANNELS};
use wx_common::GeoPoint;

pub const PATCH_SIZE: usize = 16;

/// Built-in launches with a single persistence model and small patches.
pub fn test_tables() -> Tables {
    Tables {
        models: vec![ModelEntry {
            id: "persistence".to_string(),
            name: "Persistence".to_string(),
            path: PathBuf::from("models/persistence"),
        }],
        settings: DashboardSettings {
            site: GeoPoint::CAPE_CANAVERAL,
            patch_size: PATCH_SIZE,
            cache_size: 4,
            archive_step_hours: 2,
        },
        ..Tables::builtin()
    }
}

/// Forecaster over synthetic patches with a persistence model that
/// repeats the latest GPM frame.
pub fn test_forecaster() -> Forecaster {
    let mut models = HashMap::new();
    models.insert(
        "persistence".to_string(),
        WeatherModel::persistence(INPUT_CHANNELS, 2, LABEL_CHANNELS).unwrap(),
    );
    Forecaster::with_models(test_tables(), models, Arc::new(SyntheticSource::default())).unwrap()
}
