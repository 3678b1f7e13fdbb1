//! # Telemetry Module
//!
//! Append-only persistence of raw samples, committed jump events, and
//! manual ground-truth marks.
//!
//! This module handles:
//! - Flattening engine types into stable row records
//! - Fixed-precision CSV formatting (the stable on-disk contract)
//! - The [`TelemetrySink`] seam the engine pushes batches through
//! - Writing to per-session files on a background task ([`logger`])
//!
//! The sink is fire-and-forget: submission never blocks the detection
//! path and a failed write is reported through logging, never as an
//! error back into the engine.

pub mod logger;

use serde::Serialize;

use crate::event::JumpEvent;
use crate::sample::SensorSample;

/// Header for `sensor_data.csv`. Field order is a stable contract.
pub const SAMPLE_CSV_HEADER: &str = "Timestamp,UserAccel_X,UserAccel_Y,UserAccel_Z,\
RotationRate_X,RotationRate_Y,RotationRate_Z,Gravity_X,Gravity_Y,Gravity_Z";

/// Header for `jump_events.csv`.
pub const JUMP_CSV_HEADER: &str =
    "Timestamp,Duration_s,Yaw_deg,PeakAccel_g,LandingImpact_g,SampleCount";

/// Header for `ground_truth_marks.csv`.
pub const MARK_CSV_HEADER: &str = "Timestamp,Label";

/// One raw sample flattened for persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRow {
    pub timestamp: f64,
    pub accel: [f64; 3],
    pub rotation: [f64; 3],
    pub gravity: [f64; 3],
}

impl From<&SensorSample> for SampleRow {
    fn from(sample: &SensorSample) -> Self {
        Self {
            timestamp: sample.timestamp,
            accel: sample.user_accel,
            rotation: sample.rotation_rate,
            gravity: sample.gravity,
        }
    }
}

impl SampleRow {
    /// Fixed-precision CSV row, fields in header order.
    #[must_use]
    pub fn to_csv(&self) -> String {
        format!(
            "{:.4},{:.5},{:.5},{:.5},{:.5},{:.5},{:.5},{:.5},{:.5},{:.5}",
            self.timestamp,
            self.accel[0],
            self.accel[1],
            self.accel[2],
            self.rotation[0],
            self.rotation[1],
            self.rotation[2],
            self.gravity[0],
            self.gravity[1],
            self.gravity[2],
        )
    }
}

/// One committed jump flattened for persistence. The raw in-flight sample
/// sequence stays with the [`JumpEvent`]; only the scalar summary is
/// persisted here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JumpRow {
    pub timestamp: f64,
    pub duration_s: f64,
    pub yaw_degrees: f64,
    pub peak_accel_g: f64,
    pub landing_impact_g: f64,
    pub sample_count: usize,
}

impl From<&JumpEvent> for JumpRow {
    fn from(event: &JumpEvent) -> Self {
        Self {
            timestamp: event.start_time,
            duration_s: event.duration_s,
            yaw_degrees: event.yaw_degrees,
            peak_accel_g: event.peak_accel_g,
            landing_impact_g: event.landing_impact_g,
            sample_count: event.samples.len(),
        }
    }
}

impl JumpRow {
    /// Fixed-precision CSV row, fields in header order.
    #[must_use]
    pub fn to_csv(&self) -> String {
        format!(
            "{:.4},{:.3},{:.1},{:.3},{:.3},{}",
            self.timestamp,
            self.duration_s,
            self.yaw_degrees,
            self.peak_accel_g,
            self.landing_impact_g,
            self.sample_count,
        )
    }
}

/// One manual ground-truth annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkRow {
    pub timestamp: f64,
    pub label: String,
}

impl MarkRow {
    /// Creates a mark, flattening the label onto one CSV-safe line.
    #[must_use]
    pub fn new(timestamp: f64, label: &str) -> Self {
        Self {
            timestamp,
            label: label.replace([',', '\n', '\r'], " "),
        }
    }

    /// Fixed-precision CSV row.
    #[must_use]
    pub fn to_csv(&self) -> String {
        format!("{:.4},{}", self.timestamp, self.label)
    }
}

/// The seam between the engine and persistence. Three append-only write
/// operations; no reads, no updates, no deletes.
///
/// Implementations must not block the caller: the production sink hands
/// records to a background writer task.
#[cfg_attr(test, mockall::automock)]
pub trait TelemetrySink {
    /// Submits a full batch of raw sample rows.
    fn submit_samples(&mut self, batch: Vec<SampleRow>);

    /// Submits one committed jump event summary.
    fn submit_jump(&mut self, row: JumpRow);

    /// Submits one ground-truth annotation.
    fn submit_mark(&mut self, row: MarkRow);
}

/// Sink for deployments with telemetry disabled. Drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTelemetry;

impl TelemetrySink for NullTelemetry {
    fn submit_samples(&mut self, _batch: Vec<SampleRow>) {}
    fn submit_jump(&mut self, _row: JumpRow) {}
    fn submit_mark(&mut self, _row: MarkRow) {}
}
