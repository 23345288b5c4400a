//! Launch-site nowcasting dashboard.
//!
//! `dashboard serve` runs the HTTP dashboard; `dashboard render` runs one
//! forecast and writes its figures as PNG files.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::{env, fs, net::SocketAddr, path::PathBuf, sync::Arc};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use dashboard::session::{apply, SessionEvent, SessionState};
use dashboard::state::{AppState, SourceConfig};
use dashboard::build_router;

#[derive(Parser, Debug)]
#[command(name = "dashboard")]
#[command(about = "Launch-site precipitation nowcasting dashboard")]
struct Cli {
    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the dashboard over HTTP
    Serve(ServeArgs),
    /// Run one forecast and write its figures
    Render(RenderArgs),
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Directory holding launches.yaml, models.yaml and dashboard.yaml
    #[arg(long, env = "DASHBOARD_CONFIG_DIR", default_value = "config")]
    config_dir: PathBuf,

    /// Root of the .wxp tile archive (required unless --synthetic)
    #[arg(
        long,
        env = "DASHBOARD_ARCHIVE_DIR",
        conflicts_with = "synthetic",
        required_unless_present = "synthetic"
    )]
    archive_dir: Option<PathBuf>,

    /// Generate synthetic patches instead of reading an archive
    #[arg(long)]
    synthetic: bool,
}

impl SourceArgs {
    fn source(&self) -> SourceConfig {
        match &self.archive_dir {
            Some(dir) if !self.synthetic => SourceConfig::Archive(dir.clone()),
            _ => SourceConfig::Synthetic,
        }
    }

    fn load_state(&self) -> Result<AppState> {
        AppState::from_config(&self.config_dir, &self.source())
            .with_context(|| format!("loading dashboard from {}", self.config_dir.display()))
    }
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Listen address
    #[arg(short, long, env = "DASHBOARD_LISTEN", default_value = "0.0.0.0:8501")]
    listen: String,

    /// Number of tokio worker threads (default: number of CPU cores)
    #[arg(long)]
    worker_threads: Option<usize>,

    #[command(flatten)]
    source: SourceArgs,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Launch id to forecast; custom date and time when absent
    #[arg(long)]
    scenario: Option<String>,

    /// Forecast date (custom time only)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Forecast time of day, HH:MM UTC (custom time only)
    #[arg(long)]
    time: Option<String>,

    /// Model id (default: first configured model)
    #[arg(long)]
    model: Option<String>,

    /// Output directory for the PNG figures
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Also write inputs.png
    #[arg(long)]
    inputs: bool,

    #[command(flatten)]
    source: SourceArgs,
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    match cli.command {
        Command::Serve(args) => serve(args),
        Command::Render(args) => render(args),
    }
}

fn init_tracing(log_level: &str) -> Result<()> {
    // RUST_LOG directives take precedence over --log-level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing tracing subscriber: {}", e))
}

fn serve(args: ServeArgs) -> Result<()> {
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        info!("Configuring tokio runtime with {} worker threads", threads);
        runtime_builder.worker_threads(threads);
    } else if let Some(threads) = env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
    {
        info!("Configuring tokio runtime with {} worker threads (from env)", threads);
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_serve(args))
}

async fn async_serve(args: ServeArgs) -> Result<()> {
    // Initialize Prometheus metrics exporter
    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("installing Prometheus recorder")?;
    info!("Prometheus metrics exporter initialized");

    // Load models before accepting connections
    let source = args.source;
    let state = tokio::task::spawn_blocking(move || source.load_state()).await??;
    let app = build_router(Arc::new(state), prometheus_handle);

    let addr: SocketAddr = args.listen.parse()?;
    info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn render(args: RenderArgs) -> Result<()> {
    let state = args.source.load_state()?;
    let forecaster = &state.forecaster;

    let mut events = Vec::new();
    if let Some(model) = args.model {
        events.push(SessionEvent::SelectModel(model));
    }
    match args.scenario {
        Some(scenario) => events.push(SessionEvent::SelectScenario(scenario)),
        None => {
            if let Some(date) = args.date {
                events.push(SessionEvent::SetDate(date));
            }
            if let Some(time) = args.time {
                events.push(SessionEvent::SetTime(time));
            }
            events.push(SessionEvent::Predict);
        }
    }

    let mut session = SessionState::new(forecaster.tables());
    for event in events {
        session = apply(session, event, forecaster)?;
    }

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;

    let mut figures = Vec::new();
    if let Some(predictions) = &session.predictions {
        figures.push(("predictions.png", renderer::show_outputs(predictions)?));
    }
    if let Some(labels) = &session.labels {
        figures.push(("labels.png", renderer::show_outputs(labels)?));
    }
    if args.inputs {
        if let Some(inputs) = &session.inputs {
            figures.push(("inputs.png", renderer::show_inputs(inputs)?));
        }
    }

    for (name, image) in figures {
        let path = args.out_dir.join(name);
        let png = renderer::png::create_png_auto(&image)?;
        fs::write(&path, png).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), width = image.width(), height = image.height(), "Wrote figure");
    }

    info!(
        scenario = %session.scenario,
        model = %session.model,
        date = %session.date,
        time = %session.time,
        "Render complete"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source_of(args: &[&str]) -> SourceConfig {
        match Cli::try_parse_from(args).unwrap().command {
            Command::Serve(serve) => serve.source.source(),
            Command::Render(render) => render.source.source(),
        }
    }

    #[test]
    fn test_source_must_be_chosen() {
        // Only meaningful when the archive env var is unset
        if env::var_os("DASHBOARD_ARCHIVE_DIR").is_some() {
            return;
        }
        assert!(Cli::try_parse_from(["dashboard", "serve"]).is_err());
        assert!(Cli::try_parse_from(["dashboard", "render", "--scenario", "crew2demo"]).is_err());
    }

    #[test]
    fn test_explicit_sources() {
        assert_eq!(source_of(&["dashboard", "serve", "--synthetic"]), SourceConfig::Synthetic);
        assert_eq!(
            source_of(&["dashboard", "render", "--archive-dir", "/data/wxp"]),
            SourceConfig::Archive(PathBuf::from("/data/wxp"))
        );
    }

    #[test]
    fn test_archive_and_synthetic_conflict() {
        assert!(Cli::try_parse_from([
            "dashboard",
            "serve",
            "--synthetic",
            "--archive-dir",
            "/data/wxp"
        ])
        .is_err());
    }
}
