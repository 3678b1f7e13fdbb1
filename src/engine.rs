//! # Jump Engine
//!
//! The orchestration layer: owns one instance of every pipeline stage and
//! drives a sample through them in order. Callers push raw samples and
//! altitude readings in; committed [`JumpEvent`]s come out, with session
//! aggregation and telemetry handled on the way.
//!
//! Per-sample flow:
//! 1. Append the raw sample to the telemetry batch (flushed at capacity)
//! 2. Condition the signal
//! 3. Snapshot vertical motion from the altitude tracker
//! 4. Step the detector state machine
//! 5. On a landing, build and validate the event, record it, persist it
//!
//! The engine is generic over its [`TelemetrySink`] so tests observe
//! persistence without a filesystem and deployments without telemetry
//! plug in a null sink.

use tracing::{debug, info, warn};

use crate::config::{Config, DetectionConfig};
use crate::detector::{DetectionState, DetectorEvent, JumpDetector};
use crate::event::JumpEvent;
use crate::integrator::AltitudeTracker;
use crate::sample::{SampleBuffer, SensorSample};
use crate::session::SessionAggregator;
use crate::signal::SignalConditioner;
use crate::telemetry::{JumpRow, MarkRow, SampleRow, TelemetrySink};

/// Real-time jump detection engine.
#[derive(Debug)]
pub struct JumpEngine<S: TelemetrySink> {
    conditioner: SignalConditioner,
    altitude: AltitudeTracker,
    detector: JumpDetector,
    session: SessionAggregator,
    sink: S,
    batch: Vec<SampleRow>,
    batch_capacity: usize,
    /// Timestamp of the most recent sample, used to stamp ground-truth marks.
    last_sample_time: Option<f64>,
}

impl<S: TelemetrySink> JumpEngine<S> {
    /// Builds an engine from a validated configuration and a sink.
    #[must_use]
    pub fn new(config: &Config, sink: S) -> Self {
        let batch_capacity = config.batch_capacity().max(1);
        Self {
            conditioner: SignalConditioner::new(
                config.signal.peak_window,
                config.display_capacity(),
            ),
            altitude: AltitudeTracker::new(),
            detector: JumpDetector::new(config.detection.clone()),
            session: SessionAggregator::new(config.session.recent_jumps),
            sink,
            batch: Vec::with_capacity(batch_capacity),
            batch_capacity,
            last_sample_time: None,
        }
    }

    /// Processes one IMU sample. Returns the committed jump when this
    /// sample landed one.
    pub fn on_sample(&mut self, sample: SensorSample) -> Option<JumpEvent> {
        self.last_sample_time = Some(sample.timestamp);

        self.batch.push(SampleRow::from(&sample));
        if self.batch.len() >= self.batch_capacity {
            self.flush_batch();
        }

        let signal = self.conditioner.condition(sample);
        let vertical = self.altitude.motion();

        match self.detector.process(&signal, &vertical)? {
            DetectorEvent::TakeoffArmed => {
                self.altitude.mark_takeoff();
                None
            }
            DetectorEvent::BecameAirborne => None,
            DetectorEvent::NoiseRejected
            | DetectorEvent::TimedOut
            | DetectorEvent::TooShort => {
                self.altitude.clear_takeoff();
                None
            }
            DetectorEvent::Landed(flight) => {
                self.altitude.clear_takeoff();
                // The flight carries the config it armed with; a runtime
                // swap mid-flight must not re-judge the duration bounds.
                let event = JumpEvent::build(flight)?;
                info!(
                    duration_s = event.duration_s,
                    yaw_degrees = event.yaw_degrees,
                    impact_g = event.landing_impact_g,
                    "jump committed"
                );
                self.sink.submit_jump(JumpRow::from(&event));
                self.session.record(event.clone());
                Some(event)
            }
        }
    }

    /// Ingests one relative-altitude reading. Independent of the sample
    /// stream; typically slower.
    pub fn on_altitude(&mut self, altitude_m: f64, timestamp: f64) {
        self.altitude.update(altitude_m, timestamp);
    }

    /// Records a manual ground-truth annotation at the time of the most
    /// recent sample. Before the first sample there is no stream-epoch
    /// timestamp to align the mark to, so it is dropped.
    pub fn mark_ground_truth(&mut self, label: &str) {
        let Some(timestamp) = self.last_sample_time else {
            warn!(label, "ground truth mark before any sample; dropped");
            return;
        };
        debug!(timestamp, label, "ground truth marked");
        self.sink.submit_mark(MarkRow::new(timestamp, label));
    }

    /// Swaps the detection thresholds from the next sample on. A candidate
    /// currently in flight resolves under the thresholds it armed with.
    pub fn set_detection(&mut self, config: DetectionConfig) {
        self.detector.set_config(config);
    }

    /// Current detector state.
    #[must_use]
    pub fn state(&self) -> DetectionState {
        self.detector.state()
    }

    /// Human-readable motion phase for live display.
    #[must_use]
    pub fn status(&self) -> &str {
        self.detector.status()
    }

    /// Session-level jump aggregate.
    #[must_use]
    pub fn session(&self) -> &SessionAggregator {
        &self.session
    }

    /// Recent samples for live display.
    #[must_use]
    pub fn display_buffer(&self) -> &SampleBuffer {
        self.conditioner.display_buffer()
    }

    /// Clears session statistics and all rolling pipeline state. Any
    /// in-flight candidate is discarded.
    pub fn reset_session(&mut self) {
        info!("session reset");
        self.session.clear();
        self.detector.reset();
        self.conditioner.reset();
        self.altitude.reset();
    }

    /// Ends the stream: flushes the partial telemetry batch and discards
    /// any in-flight candidate without reporting a jump. Returns the sink
    /// for shutdown.
    pub fn finish(mut self) -> S {
        self.detector.reset();
        self.flush_batch();
        self.sink
    }

    fn flush_batch(&mut self) {
        if self.batch.is_empty() {
            return;
        }
        let batch = std::mem::replace(&mut self.batch, Vec::with_capacity(self.batch_capacity));
        debug!(rows = batch.len(), "flushing sample batch");
        self.sink.submit_samples(batch);
    }
}
