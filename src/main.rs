//! # Airtime
//!
//! Replays a recorded sensor log through the real-time jump detection
//! pipeline and prints the session summary. Detection is deterministic
//! over the sample stream, so the replay commits exactly the jumps a
//! live run over the same samples would have.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::info;

use airtime::config::Config;
use airtime::engine::JumpEngine;
use airtime::replay;
use airtime::telemetry::logger::{JumpLogFormat, TelemetryLogger};
use airtime::telemetry::NullTelemetry;

/// Config path probed when none is given on the command line.
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Entry point: `airtime <sensor_data.csv> [config.toml]`
///
/// Loads configuration, replays the recording, prints the per-jump table
/// and session totals, and (when telemetry is enabled) writes the session
/// files exactly as a live run would.
///
/// # Errors
///
/// Returns error if:
/// - No recording path is given
/// - Configuration cannot be loaded or fails validation
/// - The recording cannot be read or contains no parseable samples
#[tokio::main]
async fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let Some(csv_path) = args.next().map(PathBuf::from) else {
        bail!("usage: airtime <sensor_data.csv> [config.toml]");
    };
    let config_path = args.next().map(PathBuf::from);

    let config = load_config(config_path.as_deref())?;

    // Application diagnostics go to a rolling file under the log
    // directory; stdout stays clean for the summary table.
    let log_dir = if config.telemetry.log_dir.is_empty() {
        "./logs"
    } else {
        &config.telemetry.log_dir
    };
    let file_appender = tracing_appender::rolling::daily(log_dir, "airtime.log");
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(file_writer)
        .with_ansi(false)
        .init();

    info!("Airtime v{} starting", env!("CARGO_PKG_VERSION"));
    info!(recording = %csv_path.display(), "replaying recording");

    if config.telemetry.enabled {
        let format = JumpLogFormat::parse(&config.telemetry.format)?;
        let logger = TelemetryLogger::create(&config.telemetry.log_dir, format).await?;
        println!("Telemetry session: {}", logger.session_dir().display());

        let mut engine = JumpEngine::new(&config, logger);
        let report = replay::replay_file(&csv_path, &mut engine)?;
        print!("{}", replay::render_summary(&report));

        engine.finish().shutdown().await;
    } else {
        let mut engine = JumpEngine::new(&config, NullTelemetry);
        let report = replay::replay_file(&csv_path, &mut engine)?;
        print!("{}", replay::render_summary(&report));
        engine.finish();
    }

    Ok(())
}

/// Loads configuration from the given path, falling back to
/// `config/default.toml` when present and built-in defaults otherwise.
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => Config::load(DEFAULT_CONFIG_PATH)
            .with_context(|| format!("failed to load config from {}", DEFAULT_CONFIG_PATH)),
        None => Ok(Config::default()),
    }
}
