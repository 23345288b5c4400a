//! Page models and HTML.

use serde::Serialize;
use wx_common::launch::CUSTOM_TIME_NAME;
use wx_common::{WxError, WxResult, CUSTOM_TIME_ID};

use crate::config::Tables;
use crate::session::SessionState;

/// One entry of a select box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub id: String,
    pub label: String,
    pub selected: bool,
}

/// Everything needed to draw the demo page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DemoPage {
    pub title: String,
    pub models: Vec<SelectOption>,
    pub scenarios: Vec<SelectOption>,
    /// Date and time fields plus the Predict button, custom time only.
    pub show_time_inputs: bool,
    pub date: String,
    pub time: String,
    /// The input figure checkbox is offered once inputs exist.
    pub inputs_available: bool,
    pub show_inputs: bool,
    pub has_predictions: bool,
    pub has_labels: bool,
    /// Query string that reproduces the forecast for figure URLs.
    pub figure_query: String,
}

/// Display name of a scenario.
pub fn format_launch(id: &str, tables: &Tables) -> WxResult<String> {
    if id == CUSTOM_TIME_ID {
        return Ok(CUSTOM_TIME_NAME.to_string());
    }
    tables
        .launch(id)
        .map(|l| l.name.clone())
        .ok_or_else(|| WxError::UnknownScenario(id.to_string()))
}

/// Display name of a model.
pub fn format_model(id: &str, tables: &Tables) -> WxResult<String> {
    tables
        .model(id)
        .map(|m| m.name.clone())
        .ok_or_else(|| WxError::UnknownModel(id.to_string()))
}

/// Build the page model for a session.
pub fn render_page(state: &SessionState, tables: &Tables) -> WxResult<DemoPage> {
    let models = tables
        .models
        .iter()
        .map(|m| SelectOption {
            id: m.id.clone(),
            label: m.name.clone(),
            selected: m.id == state.model,
        })
        .collect();

    let scenarios = tables
        .scenario_ids()
        .into_iter()
        .map(|id| {
            Ok(SelectOption {
                id: id.to_string(),
                label: format_launch(id, tables)?,
                selected: id == state.scenario,
            })
        })
        .collect::<WxResult<Vec<_>>>()?;

    // Surface stale ids before drawing
    format_model(&state.model, tables)?;
    format_launch(&state.scenario, tables)?;

    Ok(DemoPage {
        title: "Demo".to_string(),
        models,
        scenarios,
        show_time_inputs: state.is_custom_time(),
        date: state.date.to_string(),
        time: state.time.clone(),
        inputs_available: state.inputs.is_some(),
        show_inputs: state.show_inputs && state.inputs.is_some(),
        has_predictions: state.predictions.is_some(),
        has_labels: state.labels.is_some(),
        figure_query: format!(
            "model={}&date={}&time={}",
            encode_query(&state.model),
            state.date,
            encode_query(&state.time)
        ),
    })
}

impl DemoPage {
    pub fn to_html(&self) -> String {
        let mut body = String::new();

        body.push_str(r#"<form method="get" action="/demo">"#);
        body.push_str(&select("Model", "model", &self.models));
        body.push_str(&select("Launch to Predict", "scenario", &self.scenarios));
        if self.inputs_available {
            body.push_str(&format!(
                r#"<label><input type="checkbox" name="show_inputs" value="true"{}> Input Data</label>"#,
                if self.show_inputs { " checked" } else { "" }
            ));
        }
        if self.show_time_inputs {
            body.push_str(&format!(
                r#"<label>Forecast Date <input type="date" name="date" value="{}"></label>
<label>Forecast Time (UTC) <input type="text" name="time" value="{}"></label>
<button type="submit" name="predict" value="true">Predict Weather</button>"#,
                escape_html(&self.date),
                escape_html(&self.time)
            ));
        } else {
            body.push_str(r#"<button type="submit">Update</button>"#);
        }
        body.push_str("</form>\n");

        if self.show_inputs {
            body.push_str(&figure("Inputs", "inputs", &self.figure_query));
        }
        body.push_str("<h2>Predictions</h2>\n");
        if self.has_predictions {
            body.push_str(&figure("Predictions", "predictions", &self.figure_query));
        }
        body.push_str("<h2>Actual</h2>\n");
        if self.has_labels {
            body.push_str(&figure("Actual", "labels", &self.figure_query));
        }

        layout(&self.title, &body)
    }
}

/// The about page.
pub fn home_html() -> String {
    layout(
        "Cape Canaveral Wx Forecasting",
        r#"<h2>Objective</h2>
<p>Weather violations are the primary cause of launch cancellations at Cape Canaveral.
Better identification and forecasting of weather near launch and recovery sites enables
better planning and more launches.</p>
<h2>Approach</h2>
<p>A small convolutional network nowcasts precipitation from the recent GPM precipitation
history, three GOES-16 frames of 16 ABI bands each and terrain elevation. Predictions
are shown side by side with the observed precipitation.</p>
<h2>Data</h2>
<p>Each forecast uses a square patch centered on the launch site, with inputs at
t-4h, t-2h and t0 and labels at the following two time steps.</p>
<p><a href="/demo">Open the demo</a></p>"#,
    )
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n<h1>{title}</h1>\n{body}\n</body>\n</html>\n",
        title = escape_html(title),
        body = body
    )
}

fn select(label: &str, name: &str, options: &[SelectOption]) -> String {
    let mut html = format!(r#"<label>{} <select name="{}">"#, escape_html(label), name);
    for opt in options {
        html.push_str(&format!(
            r#"<option value="{}"{}>{}</option>"#,
            escape_html(&opt.id),
            if opt.selected { " selected" } else { "" },
            escape_html(&opt.label)
        ));
    }
    html.push_str("</select></label>\n");
    html
}

fn figure(alt: &str, kind: &str, query: &str) -> String {
    format!(
        "<img alt=\"{}\" src=\"/figures/{}.png?{}\">\n",
        alt,
        kind,
        escape_html(query)
    )
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Percent-encode a query value.
pub fn encode_query(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(b as char),
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}
