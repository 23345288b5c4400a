//! Tests for session events, page models and configuration loading.

mod common;

use chrono::NaiveDate;
use dashboard::config::Tables;
use dashboard::session::{apply, SessionEvent, SessionState};
use dashboard::state::{AppState, SourceConfig};
use dashboard::view::render_page;
use test_utils::{persistence_model_json, temp_dir, write_file, DASHBOARD_YAML, LAUNCHES_YAML, MODELS_YAML};
use wx_common::layout::INPUT_CHANNELS;
use wx_common::WxError;

use common::{test_forecaster, PATCH_SIZE};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ============================================================================
// Scenario selection
// ============================================================================

#[test]
fn test_select_launch_predicts() {
    let forecaster = test_forecaster();
    let state = SessionState::new(forecaster.tables());

    let state = apply(
        state,
        SessionEvent::SelectScenario("crew2demo".to_string()),
        &forecaster,
    )
    .unwrap();

    assert_eq!(state.scenario, "crew2demo");
    assert_eq!(state.date, date(2020, 9, 30));
    assert_eq!(state.time, "18:00");
    let predictions = state.predictions.as_ref().unwrap();
    assert_eq!(predictions.shape(), (PATCH_SIZE, PATCH_SIZE, 2));
    assert_eq!(state.labels.as_ref().unwrap().shape(), (PATCH_SIZE, PATCH_SIZE, 2));
    assert_eq!(
        state.inputs.as_ref().unwrap().shape(),
        (PATCH_SIZE, PATCH_SIZE, INPUT_CHANNELS)
    );
}

#[test]
fn test_select_custom_time_resets_date_and_keeps_forecast() {
    let forecaster = test_forecaster();
    let mut state = SessionState::new(forecaster.tables());
    state = apply(state, SessionEvent::SelectScenario("starlink12".into()), &forecaster).unwrap();
    assert_eq!(state.date, date(2020, 5, 10));
    let predictions = state.predictions.clone();

    state = apply(state, SessionEvent::SelectScenario("customtime".into()), &forecaster).unwrap();
    assert_eq!(state.scenario, "customtime");
    assert_eq!(state.date, date(2022, 9, 30));
    assert_eq!(state.time, "18:00");
    assert_eq!(state.predictions, predictions);
}

#[test]
fn test_unknown_scenario() {
    let forecaster = test_forecaster();
    let state = SessionState::new(forecaster.tables());
    let err = apply(state, SessionEvent::SelectScenario("apollo11".into()), &forecaster).unwrap_err();
    assert!(matches!(err, WxError::UnknownScenario(_)));
    assert_eq!(err.http_status_code(), 404);
}

// ============================================================================
// Model selection
// ============================================================================

#[test]
fn test_select_model_does_not_predict() {
    let forecaster = test_forecaster();
    let state = SessionState::new(forecaster.tables());
    let state = apply(state, SessionEvent::SelectModel("persistence".into()), &forecaster).unwrap();
    assert_eq!(state.model, "persistence");
    assert!(state.predictions.is_none());
}

#[test]
fn test_unknown_model() {
    let forecaster = test_forecaster();
    let state = SessionState::new(forecaster.tables());
    assert!(matches!(
        apply(state, SessionEvent::SelectModel("metnet".into()), &forecaster),
        Err(WxError::UnknownModel(_))
    ));
}

// ============================================================================
// Prediction
// ============================================================================

#[test]
fn test_predict_custom_time() {
    let forecaster = test_forecaster();
    let mut state = SessionState::new(forecaster.tables());
    state = apply(state, SessionEvent::SetDate(date(2021, 7, 4)), &forecaster).unwrap();
    state = apply(state, SessionEvent::SetTime("06:30".into()), &forecaster).unwrap();
    state = apply(state, SessionEvent::Predict, &forecaster).unwrap();

    // The persistence model repeats the latest GPM frame
    let inputs = state.inputs.as_ref().unwrap();
    let predictions = state.predictions.as_ref().unwrap();
    assert_eq!(predictions.channel(0).unwrap(), inputs.channel(2).unwrap());
    assert_eq!(predictions.channel(1).unwrap(), inputs.channel(2).unwrap());
}

#[test]
fn test_predict_invalid_time_fails_whole_event() {
    let forecaster = test_forecaster();
    let mut state = SessionState::new(forecaster.tables());
    state = apply(state, SessionEvent::SetTime("18:80".into()), &forecaster).unwrap();
    assert_eq!(state.time, "18:80");

    let err = apply(state, SessionEvent::Predict, &forecaster).unwrap_err();
    assert!(matches!(err, WxError::InvalidTime(_)));
    assert_eq!(err.http_status_code(), 400);
    assert_eq!(forecaster.cached(), 0);
}

#[test]
fn test_repeated_predict_uses_cache() {
    let forecaster = test_forecaster();
    let state = SessionState::new(forecaster.tables());
    let first = apply(state.clone(), SessionEvent::Predict, &forecaster).unwrap();
    let second = apply(state, SessionEvent::Predict, &forecaster).unwrap();
    assert_eq!(first, second);
    assert_eq!(forecaster.cached(), 1);
}

#[test]
fn test_toggle_inputs() {
    let forecaster = test_forecaster();
    let state = SessionState::new(forecaster.tables());
    let state = apply(state, SessionEvent::ToggleInputs(true), &forecaster).unwrap();
    assert!(state.show_inputs);

    // Nothing to show until a forecast exists
    let page = render_page(&state, forecaster.tables()).unwrap();
    assert!(!page.show_inputs);

    let state = apply(state, SessionEvent::Predict, &forecaster).unwrap();
    let page = render_page(&state, forecaster.tables()).unwrap();
    assert!(page.show_inputs);
    assert!(page.has_predictions && page.has_labels);
    assert!(page.to_html().contains("/figures/inputs.png"));
}

#[test]
fn test_launch_page_hides_time_inputs() {
    let forecaster = test_forecaster();
    let state = SessionState::new(forecaster.tables());
    let state = apply(state, SessionEvent::SelectScenario("crew2demo".into()), &forecaster).unwrap();
    let page = render_page(&state, forecaster.tables()).unwrap();
    assert!(!page.show_time_inputs);
    let selected: Vec<_> = page.scenarios.iter().filter(|o| o.selected).collect();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].label, "Crew 2 Demo");
}

#[test]
fn test_session_state_json() {
    let forecaster = test_forecaster();
    let state = apply(
        SessionState::new(forecaster.tables()),
        SessionEvent::Predict,
        &forecaster,
    )
    .unwrap();
    let json = serde_json::to_string(&state).unwrap();
    let back: SessionState = serde_json::from_str(&json).unwrap();
    assert_eq!(back, state);
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_load_tables_from_directory() {
    let dir = temp_dir();
    let config = dir.path().join("config");
    write_file(&config, "launches.yaml", LAUNCHES_YAML);
    write_file(&config, "models.yaml", MODELS_YAML);
    write_file(&config, "dashboard.yaml", DASHBOARD_YAML);
    write_file(
        dir.path(),
        "models/persistence/model.json",
        &persistence_model_json(INPUT_CHANNELS, 2),
    );

    let tables = Tables::load_from_directory(&config).unwrap();
    assert_eq!(tables.launches.len(), 2);
    assert_eq!(tables.launch("starlink12").unwrap().time, "06:00");
    assert_eq!(tables.settings.patch_size, 16);
    let model = tables.model("persistence").unwrap();
    assert_eq!(model.path, dir.path().join("models/persistence"));
    assert!(model.path.join("model.json").exists());
}

#[test]
fn test_missing_config_files_use_builtin() {
    let dir = temp_dir();
    let tables = Tables::load_from_directory(dir.path()).unwrap();
    assert_eq!(tables.launches, Tables::builtin().launches);
    assert_eq!(tables.settings, Tables::builtin().settings);
}

#[test]
fn test_duplicate_model_ids_rejected() {
    let dir = temp_dir();
    let yaml = format!("{}{}", MODELS_YAML, "  - id: persistence\n    name: Again\n    path: models/again\n");
    write_file(dir.path(), "models.yaml", &yaml);
    assert!(matches!(
        Tables::load_from_directory(dir.path()),
        Err(WxError::Config(_))
    ));
}

#[test]
fn test_malformed_yaml_rejected() {
    let dir = temp_dir();
    write_file(dir.path(), "launches.yaml", "launches: [ {id: x");
    assert!(Tables::load_from_directory(dir.path()).is_err());
}

#[test]
fn test_shipped_config_loads() {
    let state = AppState::from_config(&test_utils::config_dir(), &SourceConfig::Synthetic).unwrap();
    let forecaster = &state.forecaster;
    assert_eq!(forecaster.tables().default_model(), "persistence");
    assert_eq!(forecaster.source_name(), "synthetic");

    let state = apply(
        SessionState::new(forecaster.tables()),
        SessionEvent::SelectScenario("starlink12".into()),
        forecaster,
    )
    .unwrap();
    assert_eq!(state.predictions.as_ref().unwrap().shape(), (128, 128, 2));
}
