//! Geographic point type.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{WxError, WxResult};

/// A WGS84 point in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    /// Cape Canaveral launch complex, the default forecast site.
    pub const CAPE_CANAVERAL: GeoPoint = GeoPoint {
        lon: -80.607,
        lat: 28.392,
    };

    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Return the point if it lies on the globe, otherwise an InvalidParameter error.
    pub fn validated(self) -> WxResult<Self> {
        if !(-180.0..=180.0).contains(&self.lon) || !self.lon.is_finite() {
            return Err(WxError::invalid_parameter(
                "longitude",
                format!("{} is outside [-180, 180]", self.lon),
            ));
        }
        if !(-90.0..=90.0).contains(&self.lat) || !self.lat.is_finite() {
            return Err(WxError::invalid_parameter(
                "latitude",
                format!("{} is outside [-90, 90]", self.lat),
            ));
        }
        Ok(self)
    }
}

impl Default for GeoPoint {
    fn default() -> Self {
        Self::CAPE_CANAVERAL
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lon, self.lat)
    }
}
