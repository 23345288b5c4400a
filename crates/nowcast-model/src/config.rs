//! Serialized model format.
//!
//! Weight tensors are stored flattened in PyTorch order:
//! - `conv.weight`: `[hidden1][input_channels][k][k]`
//! - `deconv.weight`: `[hidden1][hidden2][k][k]` (transposed convolution keeps
//!   input channels first)
//! - `dense.weight`: `[output_channels][hidden2]`

use serde::{Deserialize, Serialize};
use wx_common::{WxError, WxResult};

/// Layer sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub input_channels: usize,
    pub hidden1: usize,
    pub hidden2: usize,
    pub output_channels: usize,
    pub kernel_size: usize,
}

/// Per-channel input standardization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Normalization {
    pub mean: Vec<f32>,
    pub std: Vec<f32>,
}

/// Flattened weights and bias of one layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerWeights {
    pub weight: Vec<f32>,
    pub bias: Vec<f32>,
}

/// Contents of `model.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFile {
    #[serde(default)]
    pub name: Option<String>,
    pub config: ModelConfig,
    pub normalization: Normalization,
    pub conv: LayerWeights,
    pub deconv: LayerWeights,
    pub dense: LayerWeights,
}

impl ModelFile {
    /// Check every tensor length against the config.
    pub fn validate(&self) -> WxResult<()> {
        let c = &self.config;
        if c.input_channels == 0
            || c.hidden1 == 0
            || c.hidden2 == 0
            || c.output_channels == 0
            || c.kernel_size == 0
        {
            return Err(WxError::ModelLoad(format!(
                "layer sizes must be positive: {:?}",
                c
            )));
        }

        let k2 = c.kernel_size * c.kernel_size;
        check_len("normalization.mean", self.normalization.mean.len(), c.input_channels)?;
        check_len("normalization.std", self.normalization.std.len(), c.input_channels)?;
        check_len("conv.weight", self.conv.weight.len(), c.hidden1 * c.input_channels * k2)?;
        check_len("conv.bias", self.conv.bias.len(), c.hidden1)?;
        check_len("deconv.weight", self.deconv.weight.len(), c.hidden1 * c.hidden2 * k2)?;
        check_len("deconv.bias", self.deconv.bias.len(), c.hidden2)?;
        check_len("dense.weight", self.dense.weight.len(), c.output_channels * c.hidden2)?;
        check_len("dense.bias", self.dense.bias.len(), c.output_channels)?;

        let non_finite = [
            &self.normalization.mean,
            &self.normalization.std,
            &self.conv.weight,
            &self.conv.bias,
            &self.deconv.weight,
            &self.deconv.bias,
            &self.dense.weight,
            &self.dense.bias,
        ]
        .iter()
        .any(|t| t.iter().any(|v| !v.is_finite()));
        if non_finite {
            return Err(WxError::ModelLoad("weights contain non-finite values".to_string()));
        }

        Ok(())
    }
}

fn check_len(tensor: &str, actual: usize, expected: usize) -> WxResult<()> {
    if actual != expected {
        return Err(WxError::ModelLoad(format!(
            "{} has {} values, expected {}",
            tensor, actual, expected
        )));
    }
    Ok(())
}
