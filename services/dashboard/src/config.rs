//! Dashboard configuration tables.
//!
//! Loaded from a config directory at startup:
//!
//! ```text
//! config/
//!   launches.yaml    canned launch scenarios
//!   models.yaml      available models and their weight directories
//!   dashboard.yaml   forecast site, patch size, cache size
//! ```
//!
//! A missing file falls back to the built-in table with a warning. A file
//! that exists but does not parse is an error.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use wx_common::{GeoPoint, Launch, WxError, WxResult, CUSTOM_TIME_ID};

pub const LAUNCHES_FILE: &str = "launches.yaml";
pub const MODELS_FILE: &str = "models.yaml";
pub const SETTINGS_FILE: &str = "dashboard.yaml";

/// A selectable model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub id: String,
    pub name: String,
    /// Weights directory. Relative paths resolve against the parent of the
    /// config directory.
    pub path: PathBuf,
}

/// Forecast settings shared by every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    /// Forecast point.
    pub site: GeoPoint,
    /// Edge length of input and output patches, in pixels.
    pub patch_size: usize,
    /// Prediction bundles kept in memory.
    pub cache_size: usize,
    /// Spacing of archive slots, in hours.
    pub archive_step_hours: u32,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            site: GeoPoint::CAPE_CANAVERAL,
            patch_size: 128,
            cache_size: 16,
            archive_step_hours: 2,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LaunchesFile {
    #[serde(default)]
    launches: Vec<Launch>,
}

#[derive(Debug, Deserialize)]
struct ModelsFile {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

/// All configuration tables.
#[derive(Debug, Clone, PartialEq)]
pub struct Tables {
    pub launches: Vec<Launch>,
    pub models: Vec<ModelEntry>,
    pub settings: DashboardSettings,
}

impl Default for Tables {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Tables {
    /// Tables used when no config files are present.
    pub fn builtin() -> Self {
        Self {
            launches: builtin_launches(),
            models: vec![ModelEntry {
                id: "26_100_epochs_tropics".to_string(),
                name: "2/6 100 Epochs, Tropics".to_string(),
                path: PathBuf::from("models/26_100_epochs_tropics"),
            }],
            settings: DashboardSettings::default(),
        }
    }

    /// Load every table from `config_dir`.
    pub fn load_from_directory<P: AsRef<Path>>(config_dir: P) -> WxResult<Self> {
        let config_dir = config_dir.as_ref();
        let builtin = Self::builtin();

        let launches = match read_optional(&config_dir.join(LAUNCHES_FILE))? {
            Some(text) => serde_yaml::from_str::<LaunchesFile>(&text)?.launches,
            None => builtin.launches,
        };
        let mut models = match read_optional(&config_dir.join(MODELS_FILE))? {
            Some(text) => serde_yaml::from_str::<ModelsFile>(&text)?.models,
            None => builtin.models,
        };
        let settings = match read_optional(&config_dir.join(SETTINGS_FILE))? {
            Some(text) => serde_yaml::from_str::<DashboardSettings>(&text)?,
            None => builtin.settings,
        };

        let base = config_dir.parent().unwrap_or(config_dir);
        for model in &mut models {
            if model.path.is_relative() {
                model.path = base.join(&model.path);
            }
        }

        let tables = Self {
            launches,
            models,
            settings,
        };
        tables.validate()?;

        info!(
            config_dir = %config_dir.display(),
            launches = tables.launches.len(),
            models = tables.models.len(),
            patch_size = tables.settings.patch_size,
            "Loaded dashboard configuration"
        );
        Ok(tables)
    }

    /// Reject duplicate or reserved ids and unusable settings.
    pub fn validate(&self) -> WxResult<()> {
        let mut seen = HashSet::new();
        for launch in &self.launches {
            if launch.id == CUSTOM_TIME_ID {
                return Err(WxError::Config(format!(
                    "launch id '{}' is reserved",
                    CUSTOM_TIME_ID
                )));
            }
            if !seen.insert(launch.id.as_str()) {
                return Err(WxError::Config(format!("duplicate launch id '{}'", launch.id)));
            }
            launch.forecast_datetime().map_err(|e| {
                WxError::Config(format!("launch '{}' has a bad time: {}", launch.id, e))
            })?;
        }

        let mut seen = HashSet::new();
        for model in &self.models {
            if !seen.insert(model.id.as_str()) {
                return Err(WxError::Config(format!("duplicate model id '{}'", model.id)));
            }
        }
        if self.models.is_empty() {
            return Err(WxError::Config("no models configured".to_string()));
        }

        let s = &self.settings;
        if s.patch_size == 0 || s.cache_size == 0 {
            return Err(WxError::Config(
                "patch_size and cache_size must be positive".to_string(),
            ));
        }
        if !(1..=24).contains(&s.archive_step_hours) {
            return Err(WxError::Config(format!(
                "archive_step_hours {} is outside 1..=24",
                s.archive_step_hours
            )));
        }
        s.site.validated()?;
        Ok(())
    }

    pub fn launch(&self, id: &str) -> Option<&Launch> {
        self.launches.iter().find(|l| l.id == id)
    }

    pub fn model(&self, id: &str) -> Option<&ModelEntry> {
        self.models.iter().find(|m| m.id == id)
    }

    /// The model selected when a session starts.
    pub fn default_model(&self) -> &str {
        self.models.first().map(|m| m.id.as_str()).unwrap_or_default()
    }

    /// Scenario ids in display order, custom time first.
    pub fn scenario_ids(&self) -> Vec<&str> {
        std::iter::once(CUSTOM_TIME_ID)
            .chain(self.launches.iter().map(|l| l.id.as_str()))
            .collect()
    }
}

fn builtin_launches() -> Vec<Launch> {
    let launch = |id: &str, name: &str, y, m, d| {
        NaiveDate::from_ymd_opt(y, m, d).map(|date| Launch::new(id, name, date))
    };
    [
        launch("crew2demo", "Crew 2 Demo", 2020, 9, 30),
        launch("starlink12", "Falcon 9 Starlink-12", 2020, 5, 10),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn read_optional(path: &Path) -> WxResult<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = ?path, "Config file not found, using built-in defaults");
            Ok(None)
        }
        Err(e) => Err(WxError::Config(format!("cannot read {}: {}", path.display(), e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables() {
        let tables = Tables::builtin();
        tables.validate().unwrap();
        assert_eq!(tables.launches.len(), 2);
        assert_eq!(tables.launch("crew2demo").unwrap().time, "18:00");
        assert_eq!(tables.default_model(), "26_100_epochs_tropics");
        assert_eq!(
            tables.scenario_ids(),
            vec!["customtime", "crew2demo", "starlink12"]
        );
    }

    #[test]
    fn test_duplicate_launch_rejected() {
        let mut tables = Tables::builtin();
        tables.launches.push(tables.launches[0].clone());
        assert!(matches!(tables.validate(), Err(WxError::Config(_))));
    }

    #[test]
    fn test_reserved_launch_id_rejected() {
        let mut tables = Tables::builtin();
        tables.launches[0].id = CUSTOM_TIME_ID.to_string();
        assert!(tables.validate().is_err());
    }

    #[test]
    fn test_bad_launch_time_rejected() {
        let mut tables = Tables::builtin();
        tables.launches[0].time = "18:80".to_string();
        assert!(tables.validate().is_err());
    }

    #[test]
    fn test_settings_defaults_fill_missing_keys() {
        let settings: DashboardSettings = serde_yaml::from_str("patch_size: 32").unwrap();
        assert_eq!(settings.patch_size, 32);
        assert_eq!(settings.cache_size, 16);
        assert_eq!(settings.site, GeoPoint::CAPE_CANAVERAL);
    }
}
