//! # Offline Replay
//!
//! Re-runs recorded sensor logs through the live detection pipeline.
//! Because detection is a pure function of the sample stream, a replayed
//! session commits exactly the jumps the live run would have, which makes
//! recorded logs the primary tool for threshold tuning.
//!
//! Input is the `sensor_data.csv` format the telemetry logger writes.
//! Malformed lines are counted and skipped; a recording with a few
//! corrupt rows is still worth analyzing.

use std::path::Path;

use tracing::{info, warn};

use crate::engine::JumpEngine;
use crate::error::{AirtimeError, Result};
use crate::event::JumpEvent;
use crate::sample::SensorSample;
use crate::telemetry::TelemetrySink;

/// Outcome of one replayed recording.
#[derive(Debug)]
pub struct ReplayReport {
    /// Samples successfully parsed and fed through the pipeline.
    pub samples_fed: usize,
    /// Malformed lines skipped.
    pub lines_skipped: usize,
    /// Sample rate observed from the timestamps (Hz).
    pub effective_rate_hz: f64,
    /// Jumps committed during the replay, chronological.
    pub jumps: Vec<JumpEvent>,
}

/// Replays a recorded sensor log through `engine`.
///
/// # Errors
///
/// Returns error if the file cannot be read or contains no parseable
/// samples.
pub fn replay_file<S: TelemetrySink, P: AsRef<Path>>(
    path: P,
    engine: &mut JumpEngine<S>,
) -> Result<ReplayReport> {
    let contents = std::fs::read_to_string(path.as_ref())?;

    let mut samples_fed = 0;
    let mut lines_skipped = 0;
    let mut first_ts = None;
    let mut last_ts = 0.0;
    let mut jumps = Vec::new();

    for line in contents.lines().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let Some(sample) = parse_line(line) else {
            lines_skipped += 1;
            continue;
        };

        first_ts.get_or_insert(sample.timestamp);
        last_ts = sample.timestamp;
        samples_fed += 1;

        if let Some(event) = engine.on_sample(sample) {
            jumps.push(event);
        }
    }

    if samples_fed == 0 {
        return Err(AirtimeError::Replay(format!(
            "no parseable samples in {}",
            path.as_ref().display()
        )));
    }
    if lines_skipped > 0 {
        warn!(lines_skipped, "skipped malformed sensor rows");
    }

    let span = last_ts - first_ts.unwrap_or(0.0);
    let effective_rate_hz = if span > 0.0 && samples_fed > 1 {
        (samples_fed - 1) as f64 / span
    } else {
        0.0
    };

    info!(
        samples_fed,
        effective_rate_hz,
        jumps = jumps.len(),
        "replay finished"
    );

    Ok(ReplayReport {
        samples_fed,
        lines_skipped,
        effective_rate_hz,
        jumps,
    })
}

/// Renders the per-jump table and session totals for terminal output.
#[must_use]
pub fn render_summary(report: &ReplayReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Replayed {} samples at {:.1} Hz ({} malformed lines skipped)\n",
        report.samples_fed, report.effective_rate_hz, report.lines_skipped
    ));

    if report.jumps.is_empty() {
        out.push_str("No jumps detected.\n");
        return out;
    }

    out.push_str("\n  #    Start      Airtime   Rotation            Peak     Impact\n");
    for (i, jump) in report.jumps.iter().enumerate() {
        out.push_str(&format!(
            "{:>3}  {:>8.2}s  {:>6.2}s   {:<18}  {:>5.2}g  {:>6.2}g\n",
            i + 1,
            jump.start_time,
            jump.duration_s,
            format!("{:+.0}° ({})", jump.yaw_degrees, jump.rotation_label()),
            jump.peak_accel_g,
            jump.landing_impact_g,
        ));
    }

    let total_airtime: f64 = report.jumps.iter().map(|j| j.duration_s).sum();
    let max_airtime = report
        .jumps
        .iter()
        .map(|j| j.duration_s)
        .fold(0.0, f64::max);
    let max_rotation = report
        .jumps
        .iter()
        .map(|j| j.yaw_degrees.abs())
        .fold(0.0, f64::max);

    out.push_str(&format!(
        "\nJumps: {}   Total airtime: {:.2}s   Avg: {:.2}s   Longest: {:.2}s   Max rotation: {:.0}°\n",
        report.jumps.len(),
        total_airtime,
        total_airtime / report.jumps.len() as f64,
        max_airtime,
        max_rotation,
    ));
    out
}

/// Parses one `sensor_data.csv` row. `None` on any malformed field.
fn parse_line(line: &str) -> Option<SensorSample> {
    let mut fields = line.split(',').map(str::trim);
    let mut next = || fields.next()?.parse::<f64>().ok();

    let timestamp = next()?;
    let user_accel = [next()?, next()?, next()?];
    let rotation_rate = [next()?, next()?, next()?];
    let gravity = [next()?, next()?, next()?];

    Some(SensorSample::new(timestamp, user_accel, rotation_rate, gravity))
}
