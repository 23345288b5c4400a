//! Loading and running the nowcasting network.

use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};
use wx_common::{Patch, WxError, WxResult};

use crate::config::{LayerWeights, ModelConfig, ModelFile, Normalization};
use crate::layers::{conv2d_valid, conv_transpose2d, dense, normalize, relu};

/// Weights file inside a model directory.
pub const WEIGHTS_FILE: &str = "model.json";

/// A loaded, validated model.
#[derive(Debug, Clone)]
pub struct WeatherModel {
    name: String,
    file: ModelFile,
}

impl WeatherModel {
    /// Load `<dir>/model.json`.
    ///
    /// A missing directory or file, malformed JSON, or tensors that do not
    /// match the declared layer sizes all fail with ModelLoad.
    pub fn from_pretrained(dir: impl AsRef<Path>) -> WxResult<Self> {
        let dir = dir.as_ref();
        let path = dir.join(WEIGHTS_FILE);
        let contents = fs::read_to_string(&path).map_err(|e| {
            WxError::ModelLoad(format!("cannot read {}: {}", path.display(), e))
        })?;
        let file: ModelFile = serde_json::from_str(&contents).map_err(|e| {
            WxError::ModelLoad(format!("invalid model file {}: {}", path.display(), e))
        })?;

        let fallback = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| dir.display().to_string());
        let model = Self::from_file(file, fallback)?;

        info!(
            model = %model.name,
            path = %path.display(),
            input_channels = model.file.config.input_channels,
            kernel_size = model.file.config.kernel_size,
            "Loaded model"
        );
        Ok(model)
    }

    /// Build from an in-memory model file. `fallback_name` is used when the
    /// file carries no name.
    pub fn from_file(file: ModelFile, fallback_name: impl Into<String>) -> WxResult<Self> {
        file.validate()?;
        let name = file.name.clone().unwrap_or_else(|| fallback_name.into());
        Ok(Self { name, file })
    }

    /// Write `<dir>/model.json`, creating the directory if needed.
    pub fn save_pretrained(&self, dir: impl AsRef<Path>) -> WxResult<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let mut file = self.file.clone();
        file.name = Some(self.name.clone());
        let json = serde_json::to_string(&file)?;
        fs::write(dir.join(WEIGHTS_FILE), json)?;
        Ok(())
    }

    /// A model that forecasts "no change": every output channel repeats the
    /// (rectified) value of `source_channel`.
    pub fn persistence(
        input_channels: usize,
        source_channel: usize,
        output_channels: usize,
    ) -> WxResult<Self> {
        if source_channel >= input_channels {
            return Err(WxError::invalid_parameter(
                "source_channel",
                format!("{} is not below {} input channels", source_channel, input_channels),
            ));
        }
        let mut conv_weight = vec![0.0; input_channels];
        conv_weight[source_channel] = 1.0;

        let file = ModelFile {
            name: Some("persistence".to_string()),
            config: ModelConfig {
                input_channels,
                hidden1: 1,
                hidden2: 1,
                output_channels,
                kernel_size: 1,
            },
            normalization: Normalization {
                mean: vec![0.0; input_channels],
                std: vec![1.0; input_channels],
            },
            conv: LayerWeights {
                weight: conv_weight,
                bias: vec![0.0],
            },
            deconv: LayerWeights {
                weight: vec![1.0],
                bias: vec![0.0],
            },
            dense: LayerWeights {
                weight: vec![1.0; output_channels],
                bias: vec![0.0; output_channels],
            },
        };
        Self::from_file(file, "persistence")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &ModelConfig {
        &self.file.config
    }

    /// Run the network on one input patch.
    ///
    /// The output has the input's width and height and
    /// `config().output_channels` channels, all non-negative.
    pub fn predict(&self, inputs: &Patch) -> WxResult<Patch> {
        let start = Instant::now();
        let c = &self.file.config;
        inputs.expect_channels(c.input_channels)?;

        let mut x = inputs.clone();
        normalize(&mut x, &self.file.normalization.mean, &self.file.normalization.std)?;

        let mut x = conv2d_valid(
            &x,
            &self.file.conv.weight,
            &self.file.conv.bias,
            c.hidden1,
            c.kernel_size,
        )?;
        relu(&mut x);

        let mut x = conv_transpose2d(
            &x,
            &self.file.deconv.weight,
            &self.file.deconv.bias,
            c.hidden2,
            c.kernel_size,
        )?;
        relu(&mut x);

        let mut x = dense(&x, &self.file.dense.weight, &self.file.dense.bias, c.output_channels)?;
        relu(&mut x);

        debug!(
            model = %self.name,
            width = x.width(),
            height = x.height(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Prediction complete"
        );
        Ok(x)
    }
}
