//! Common test fixtures for launch-wx tests.

/// Launch sites used in tests.
pub mod sites {
    /// Cape Canaveral Space Force Station, (lon, lat)
    pub const CAPE_CANAVERAL: (f64, f64) = (-80.607, 28.392);
}

/// A launches table with one demo launch.
pub const LAUNCHES_YAML: &str = r#"
launches:
  - id: crew2demo
    name: "Crew-2 Demo"
    date: 2020-09-30
    time: "18:00"
  - id: starlink12
    name: "Starlink-12"
    date: 2020-05-10
    time: "06:00"
"#;

/// A models table pointing at `models/persistence`.
pub const MODELS_YAML: &str = r#"
models:
  - id: persistence
    name: "Persistence"
    path: models/persistence
"#;

/// Dashboard settings with a small patch.
pub const DASHBOARD_YAML: &str = r#"
site:
  lon: -80.607
  lat: 28.392
patch_size: 16
cache_size: 4
"#;

/// `model.json` for a 1x1-kernel model that repeats `source_channel`
/// into two output channels.
pub fn persistence_model_json(input_channels: usize, source_channel: usize) -> String {
    let mut conv = vec![0.0f32; input_channels];
    conv[source_channel] = 1.0;
    serde_json::json!({
        "name": "persistence",
        "config": {
            "input_channels": input_channels,
            "hidden1": 1,
            "hidden2": 1,
            "output_channels": 2,
            "kernel_size": 1
        },
        "normalization": {
            "mean": vec![0.0f32; input_channels],
            "std": vec![1.0f32; input_channels]
        },
        "conv": { "weight": conv, "bias": [0.0] },
        "deconv": { "weight": [1.0], "bias": [0.0] },
        "dense": { "weight": [1.0, 1.0], "bias": [0.0, 0.0] }
    })
    .to_string()
}
