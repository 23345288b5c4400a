//! Common types and utilities shared across the launch-site nowcasting crates.

pub mod error;
pub mod geo;
pub mod launch;
pub mod layout;
pub mod patch;
pub mod time;

pub use error::{WxError, WxResult};
pub use geo::GeoPoint;
pub use launch::{Launch, CUSTOM_TIME_ID};
pub use patch::Patch;
pub use time::{forecast_datetime, parse_forecast_time};
