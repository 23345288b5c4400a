//! Fetch, predict and compare: one forecast run per (model, time).

use chrono::{DateTime, Utc};
use lru::LruCache;
use metrics::{counter, histogram};
use nowcast_model::WeatherModel;
use patch_source::PatchSource;
use serde::Serialize;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, info, warn};
use wx_common::layout::{INPUT_CHANNELS, LABEL_CHANNELS};
use wx_common::{Patch, WxError, WxResult};

use crate::config::Tables;

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub inputs: Patch,
    pub predictions: Patch,
    pub labels: Patch,
}

type CacheKey = (String, DateTime<Utc>);

/// Runs forecasts against loaded models and a patch source.
///
/// Completed forecasts are kept in a bounded LRU cache so the demo page and
/// its figure images share one run.
pub struct Forecaster {
    tables: Tables,
    models: HashMap<String, Arc<WeatherModel>>,
    source: Arc<dyn PatchSource>,
    cache: Mutex<LruCache<CacheKey, Arc<Forecast>>>,
}

impl Forecaster {
    /// Load every configured model from its weights directory.
    pub fn load(tables: Tables, source: Arc<dyn PatchSource>) -> WxResult<Self> {
        let mut models = HashMap::new();
        for entry in &tables.models {
            let model = WeatherModel::from_pretrained(&entry.path)?;
            models.insert(entry.id.clone(), model);
        }
        Self::with_models(tables, models, source)
    }

    /// Use already loaded models, keyed by model id.
    pub fn with_models(
        tables: Tables,
        models: HashMap<String, WeatherModel>,
        source: Arc<dyn PatchSource>,
    ) -> WxResult<Self> {
        for entry in &tables.models {
            let model = models
                .get(&entry.id)
                .ok_or_else(|| WxError::UnknownModel(entry.id.clone()))?;
            let config = model.config();
            if config.input_channels != INPUT_CHANNELS || config.output_channels != LABEL_CHANNELS {
                return Err(WxError::ModelLoad(format!(
                    "model '{}' maps {} channels to {}, expected {} to {}",
                    entry.id,
                    config.input_channels,
                    config.output_channels,
                    INPUT_CHANNELS,
                    LABEL_CHANNELS
                )));
            }
        }

        let capacity = NonZeroUsize::new(tables.settings.cache_size)
            .ok_or_else(|| WxError::Config("cache_size must be positive".to_string()))?;
        Ok(Self {
            models: models
                .into_iter()
                .map(|(id, model)| (id, Arc::new(model)))
                .collect(),
            tables,
            source,
            cache: Mutex::new(LruCache::new(capacity)),
        })
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    fn model(&self, id: &str) -> WxResult<&Arc<WeatherModel>> {
        self.models
            .get(id)
            .ok_or_else(|| WxError::UnknownModel(id.to_string()))
    }

    /// Forecast for `time` with model `model_id`, reusing a cached run.
    ///
    /// Blocks for the whole fetch and inference; call from a blocking
    /// thread when on an async runtime.
    pub fn forecast(&self, model_id: &str, time: DateTime<Utc>) -> WxResult<Arc<Forecast>> {
        let model = self.model(model_id)?;
        let key = (model_id.to_string(), time);

        if let Some(hit) = self.lock_cache().get(&key) {
            debug!(model = %model_id, %time, "Forecast cache hit");
            return Ok(Arc::clone(hit));
        }

        let forecast = Arc::new(self.run(model_id, model, time)?);
        self.lock_cache().put(key, Arc::clone(&forecast));
        Ok(forecast)
    }

    fn run(&self, model_id: &str, model: &WeatherModel, time: DateTime<Utc>) -> WxResult<Forecast> {
        let start = Instant::now();
        let settings = &self.tables.settings;

        let result = self
            .source
            .get_inputs_patch(time, settings.site, settings.patch_size)
            .and_then(|inputs| {
                let predictions = model.predict(&inputs)?;
                let labels = self
                    .source
                    .get_labels_patch(time, settings.site, settings.patch_size)?;
                Ok(Forecast {
                    inputs,
                    predictions,
                    labels,
                })
            });

        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        match &result {
            Ok(_) => {
                counter!("dashboard_predictions_total", "model" => model_id.to_string()).increment(1);
                histogram!("dashboard_prediction_duration_ms").record(elapsed_ms);
                info!(
                    model = %model_id,
                    %time,
                    source = self.source.name(),
                    elapsed_ms,
                    "Forecast complete"
                );
            }
            Err(e) => {
                warn!(model = %model_id, %time, error = %e, "Forecast failed");
            }
        }
        result
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, LruCache<CacheKey, Arc<Forecast>>> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of cached forecasts.
    pub fn cached(&self) -> usize {
        self.lock_cache().len()
    }
}
