//! HTTP request handlers.

use axum::{
    extract::{Extension, Path, Query},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use metrics::counter;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use wx_common::{forecast_datetime, WxError, WxResult};

use crate::session::{apply, SessionEvent, SessionState};
use crate::state::AppState;
use crate::view::{home_html, render_page};

// ============================================================================
// Pages
// ============================================================================

/// GET / - About page
pub async fn home_handler() -> Html<String> {
    Html(home_html())
}

/// Query parameters of the demo page. Each present field becomes one
/// session event, applied in a fixed order.
#[derive(Debug, Default, Deserialize)]
pub struct DemoParams {
    pub model: Option<String>,
    pub scenario: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub show_inputs: Option<bool>,
    pub predict: Option<bool>,
}

impl DemoParams {
    fn into_events(self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if let Some(model) = self.model {
            events.push(SessionEvent::SelectModel(model));
        }
        let custom = match self.scenario {
            Some(scenario) => {
                let custom = scenario == wx_common::CUSTOM_TIME_ID;
                events.push(SessionEvent::SelectScenario(scenario));
                custom
            }
            None => true,
        };
        // Date and time are only editable for custom-time forecasts
        if custom {
            if let Some(date) = self.date {
                events.push(SessionEvent::SetDate(date));
            }
            if let Some(time) = self.time {
                events.push(SessionEvent::SetTime(time));
            }
            if self.predict.unwrap_or(false) {
                events.push(SessionEvent::Predict);
            }
        }
        if let Some(show) = self.show_inputs {
            events.push(SessionEvent::ToggleInputs(show));
        }
        events
    }
}

/// GET /demo - Interactive demo page
#[instrument(skip(state))]
pub async fn demo_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<DemoParams>,
) -> Response {
    let result = run_blocking(move || {
        let forecaster = &state.forecaster;
        let mut session = SessionState::new(forecaster.tables());
        for event in params.into_events() {
            session = apply(session, event, forecaster)?;
        }
        Ok(render_page(&session, forecaster.tables())?.to_html())
    })
    .await;

    match result {
        Ok(html) => Html(html).into_response(),
        Err(e) => error_response(&e),
    }
}

// ============================================================================
// Figures
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct FigureParams {
    pub model: Option<String>,
    pub date: NaiveDate,
    pub time: String,
}

/// Which figure of a forecast to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FigureKind {
    Inputs,
    Predictions,
    Labels,
}

impl FigureKind {
    /// Parse a `<kind>.png` path segment.
    pub fn from_file_name(name: &str) -> Option<Self> {
        match name {
            "inputs.png" => Some(Self::Inputs),
            "predictions.png" => Some(Self::Predictions),
            "labels.png" => Some(Self::Labels),
            _ => None,
        }
    }
}

/// GET /figures/:name - PNG figure of a forecast
#[instrument(skip(state))]
pub async fn figure_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(name): Path<String>,
    Query(params): Query<FigureParams>,
) -> Response {
    let Some(kind) = FigureKind::from_file_name(&name) else {
        return error_response(&WxError::invalid_parameter(
            "figure",
            format!("unknown figure '{}'", name),
        ));
    };

    let result = run_blocking(move || {
        let forecaster = &state.forecaster;
        let model = params
            .model
            .unwrap_or_else(|| forecaster.tables().default_model().to_string());
        let time = forecast_datetime(params.date, &params.time)?;
        let forecast = forecaster.forecast(&model, time)?;
        let image = match kind {
            FigureKind::Inputs => renderer::show_inputs(&forecast.inputs)?,
            FigureKind::Predictions => renderer::show_outputs(&forecast.predictions)?,
            FigureKind::Labels => renderer::show_outputs(&forecast.labels)?,
        };
        renderer::png::create_png_auto(&image)
    })
    .await;

    match result {
        Ok(png) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "image/png"),
                (header::CACHE_CONTROL, "max-age=3600"),
            ],
            png,
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

// ============================================================================
// JSON API
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    /// Current state; a new session when absent.
    #[serde(default)]
    pub state: Option<SessionState>,
    pub event: SessionEvent,
}

/// POST /api/session - Apply one event to a session
#[instrument(skip(state, request))]
pub async fn session_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<SessionRequest>,
) -> Response {
    info!(event = ?request.event, "Session event");
    let result = run_blocking(move || {
        let forecaster = &state.forecaster;
        let session = request
            .state
            .unwrap_or_else(|| SessionState::new(forecaster.tables()));
        apply(session, request.event, forecaster)
    })
    .await;

    match result {
        Ok(session) => Json(session).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET /api/launches - Configured launch scenarios
pub async fn launches_handler(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    Json(state.forecaster.tables().launches.clone())
}

#[derive(Debug, Serialize)]
struct ModelSummary<'a> {
    id: &'a str,
    name: &'a str,
}

/// GET /api/models - Configured models
pub async fn models_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    let models: Vec<ModelSummary> = state
        .forecaster
        .tables()
        .models
        .iter()
        .map(|m| ModelSummary {
            id: &m.id,
            name: &m.name,
        })
        .collect();
    Json(models).into_response()
}

// ============================================================================
// Health and metrics
// ============================================================================

/// GET /health - Basic health check
pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /metrics - Prometheus metrics endpoint
pub async fn metrics_handler(Extension(handle): Extension<PrometheusHandle>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    )
}

// ============================================================================
// Helpers
// ============================================================================

/// Run fetch/inference/rendering work off the async runtime.
async fn run_blocking<T, F>(f: F) -> WxResult<T>
where
    F: FnOnce() -> WxResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| WxError::Internal(format!("worker task failed: {}", e)))?
}

/// Map an error to a JSON response with the matching status code.
pub fn error_response(err: &WxError) -> Response {
    let code = err.http_status_code();
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    counter!("dashboard_errors_total", "status" => code.to_string()).increment(1);
    if status.is_server_error() {
        error!(error = %err, "Request failed");
    } else {
        info!(error = %err, status = code, "Request rejected");
    }

    (
        status,
        Json(serde_json::json!({
            "error": err.to_string(),
            "status": code,
        })),
    )
        .into_response()
}
