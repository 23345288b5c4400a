//! Demo session view-model.
//!
//! The session is plain data: each user interaction is a [`SessionEvent`]
//! applied to the current [`SessionState`], producing the next state. A
//! failed event returns an error and the caller keeps its previous state.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;
use wx_common::time::{default_date, DEFAULT_TIME};
use wx_common::{forecast_datetime, Patch, WxError, WxResult, CUSTOM_TIME_ID};

use crate::config::Tables;
use crate::pipeline::Forecaster;

/// Everything the demo page shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub date: NaiveDate,
    /// Forecast time of day as typed, validated when predicting.
    pub time: String,
    /// `customtime` or a launch id.
    pub scenario: String,
    pub model: String,
    #[serde(default)]
    pub show_inputs: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Patch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predictions: Option<Patch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Patch>,
}

impl SessionState {
    /// A fresh custom-time session with the default model selected.
    pub fn new(tables: &Tables) -> Self {
        Self {
            date: default_date(),
            time: DEFAULT_TIME.to_string(),
            scenario: CUSTOM_TIME_ID.to_string(),
            model: tables.default_model().to_string(),
            show_inputs: false,
            inputs: None,
            predictions: None,
            labels: None,
        }
    }

    pub fn is_custom_time(&self) -> bool {
        self.scenario == CUSTOM_TIME_ID
    }

    pub fn has_forecast(&self) -> bool {
        self.predictions.is_some()
    }
}

/// A user interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Pick `customtime` or a launch. Launches predict immediately.
    SelectScenario(String),
    /// Pick a model. Does not re-predict.
    SelectModel(String),
    SetDate(NaiveDate),
    SetTime(String),
    ToggleInputs(bool),
    /// Run the pipeline for the current date, time and model.
    Predict,
}

/// Apply one event.
pub fn apply(
    mut state: SessionState,
    event: SessionEvent,
    forecaster: &Forecaster,
) -> WxResult<SessionState> {
    debug!(?event, scenario = %state.scenario, "Applying session event");
    let tables = forecaster.tables();

    match event {
        SessionEvent::SelectScenario(id) if id == CUSTOM_TIME_ID => {
            state.scenario = id;
            state.date = default_date();
            state.time = DEFAULT_TIME.to_string();
        }
        SessionEvent::SelectScenario(id) => {
            let launch = tables
                .launch(&id)
                .ok_or_else(|| WxError::UnknownScenario(id.clone()))?;
            state.date = launch.date;
            state.time = launch.time.clone();
            state.scenario = id;
            state = predict(state, forecaster)?;
        }
        SessionEvent::SelectModel(id) => {
            if tables.model(&id).is_none() {
                return Err(WxError::UnknownModel(id));
            }
            state.model = id;
        }
        SessionEvent::SetDate(date) => state.date = date,
        SessionEvent::SetTime(time) => state.time = time,
        SessionEvent::ToggleInputs(show) => state.show_inputs = show,
        SessionEvent::Predict => state = predict(state, forecaster)?,
    }
    Ok(state)
}

fn predict(mut state: SessionState, forecaster: &Forecaster) -> WxResult<SessionState> {
    let time = forecast_datetime(state.date, &state.time)?;
    let forecast = forecaster.forecast(&state.model, time)?;
    state.inputs = Some(forecast.inputs.clone());
    state.predictions = Some(forecast.predictions.clone());
    state.labels = Some(forecast.labels.clone());
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_shape() {
        let event: SessionEvent =
            serde_json::from_str(r#"{"type":"select_scenario","value":"crew2demo"}"#).unwrap();
        assert_eq!(event, SessionEvent::SelectScenario("crew2demo".to_string()));

        let event: SessionEvent = serde_json::from_str(r#"{"type":"predict"}"#).unwrap();
        assert_eq!(event, SessionEvent::Predict);

        let event: SessionEvent =
            serde_json::from_str(r#"{"type":"set_date","value":"2021-01-02"}"#).unwrap();
        assert!(matches!(event, SessionEvent::SetDate(_)));
    }

    #[test]
    fn test_new_session_defaults() {
        let state = SessionState::new(&Tables::builtin());
        assert!(state.is_custom_time());
        assert_eq!(state.time, "18:00");
        assert_eq!(state.date, NaiveDate::from_ymd_opt(2022, 9, 30).unwrap());
        assert!(!state.has_forecast());
    }
}
