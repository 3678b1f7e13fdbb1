//! # Jump Candidate
//!
//! Detector-private accumulator for a takeoff candidate. Created on the
//! Ground → PotentialTakeoff transition, discarded on any reset to
//! Ground, and promoted into a [`crate::event::JumpEvent`] only on a
//! validated landing.

use crate::integrator::YawIntegrator;
use crate::sample::SensorSample;

/// Accumulating state for one suspected jump.
#[derive(Debug)]
pub struct JumpCandidate {
    /// Timestamp of the sample that armed the candidate (s).
    pub start_time: f64,
    /// Stream index of the sample that armed the candidate.
    pub start_index: u64,
    /// Ordered samples captured since the candidate armed.
    samples: Vec<SensorSample>,
    /// Running peak acceleration magnitude (g).
    peak_magnitude: f64,
    /// Yaw accumulated since the candidate armed.
    yaw: YawIntegrator,
}

impl JumpCandidate {
    /// Creates a fresh candidate anchored at the arming sample.
    #[must_use]
    pub fn new(start_time: f64, start_index: u64) -> Self {
        Self {
            start_time,
            start_index,
            samples: Vec::new(),
            peak_magnitude: 0.0,
            yaw: YawIntegrator::new(),
        }
    }

    /// Folds one sample into the candidate: appends it, updates the peak
    /// magnitude, and advances the yaw integral.
    pub fn observe(&mut self, sample: SensorSample) {
        let magnitude = sample.accel_magnitude();
        if magnitude > self.peak_magnitude {
            self.peak_magnitude = magnitude;
        }
        self.yaw.advance(sample.yaw_rate(), sample.timestamp);
        self.samples.push(sample);
    }

    /// Seconds since the candidate armed, as of `timestamp`.
    #[must_use]
    pub fn elapsed(&self, timestamp: f64) -> f64 {
        timestamp - self.start_time
    }

    /// Peak acceleration magnitude observed so far (g).
    #[must_use]
    pub fn peak_magnitude(&self) -> f64 {
        self.peak_magnitude
    }

    /// Signed accumulated yaw in degrees (positive = right).
    #[must_use]
    pub fn yaw_degrees(&self) -> f64 {
        self.yaw.yaw_degrees()
    }

    /// Number of samples captured.
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Consumes the candidate, yielding its captured sample sequence.
    #[must_use]
    pub fn into_samples(self) -> Vec<SensorSample> {
        self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(t: f64, mag: f64, yaw_rate: f64) -> SensorSample {
        SensorSample::new(t, [0.0, 0.0, mag], [0.0, 0.0, yaw_rate], [0.0, 0.0, -1.0])
    }

    #[test]
    fn test_peak_magnitude_tracks_maximum() {
        let mut candidate = JumpCandidate::new(0.0, 0);
        candidate.observe(sample(0.00, 1.8, 0.0));
        candidate.observe(sample(0.02, 2.4, 0.0));
        candidate.observe(sample(0.04, 0.1, 0.0));
        assert!((candidate.peak_magnitude() - 2.4).abs() < 1e-9);
    }

    #[test]
    fn test_samples_kept_in_order() {
        let mut candidate = JumpCandidate::new(0.0, 0);
        candidate.observe(sample(0.00, 1.0, 0.0));
        candidate.observe(sample(0.02, 1.0, 0.0));
        candidate.observe(sample(0.04, 1.0, 0.0));

        assert_eq!(candidate.sample_count(), 3);
        let timestamps: Vec<f64> = candidate
            .into_samples()
            .iter()
            .map(|s| s.timestamp)
            .collect();
        assert_eq!(timestamps, vec![0.00, 0.02, 0.04]);
    }

    #[test]
    fn test_yaw_accumulates_during_candidate() {
        let mut candidate = JumpCandidate::new(0.0, 0);
        // ~3.14 rad/s for 0.5 s comes out near 90 degrees.
        for i in 0..26 {
            candidate.observe(sample(i as f64 * 0.02, 0.1, std::f64::consts::PI));
        }
        assert!((candidate.yaw_degrees() - 90.0).abs() < 2.0);
    }

    #[test]
    fn test_elapsed() {
        let candidate = JumpCandidate::new(10.0, 42);
        assert!((candidate.elapsed(10.35) - 0.35).abs() < 1e-9);
    }
}
