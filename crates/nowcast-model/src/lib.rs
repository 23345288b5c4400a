//! Precipitation nowcasting model.
//!
//! A small convolutional network that maps a 52-channel input patch to a
//! 2-channel precipitation patch of the same spatial size:
//!
//! ```text
//! Normalization -> Conv2d (valid) -> ReLU -> ConvTranspose2d -> ReLU -> Linear -> ReLU
//! ```
//!
//! Weights are exported to `<dir>/model.json` and loaded with
//! [`WeatherModel::from_pretrained`].

pub mod config;
pub mod layers;
pub mod model;

pub use config::{LayerWeights, ModelConfig, ModelFile, Normalization};
pub use model::WeatherModel;
