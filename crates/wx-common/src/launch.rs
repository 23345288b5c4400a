//! Historical launch windows used as canned forecast scenarios.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WxResult;
use crate::time::{forecast_datetime, DEFAULT_TIME};

/// Scenario identifier for a user-chosen date and time.
pub const CUSTOM_TIME_ID: &str = "customtime";

/// Display name for the custom-time scenario.
pub const CUSTOM_TIME_NAME: &str = "Custom Time";

/// A historical launch window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Launch {
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
    /// UTC time of day, `HH:MM`.
    #[serde(default = "default_time")]
    pub time: String,
}

fn default_time() -> String {
    DEFAULT_TIME.to_string()
}

impl Launch {
    pub fn new(id: impl Into<String>, name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            date,
            time: default_time(),
        }
    }

    /// The launch window as a UTC timestamp.
    pub fn forecast_datetime(&self) -> WxResult<DateTime<Utc>> {
        forecast_datetime(self.date, &self.time)
    }
}
