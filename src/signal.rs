//! # Signal Conditioner
//!
//! Per-sample derived-quantity computation ahead of the jump detector.
//!
//! Raw accelerometer output at 50–60 Hz carries single-sample spikes that
//! would trip a naive threshold comparison. The conditioner keeps a short
//! rolling window of recent magnitudes and exposes their average as a
//! smoothed "recent peak" signal, which the detector compares against the
//! takeoff threshold instead of the instantaneous value. This rejects
//! isolated spikes without adding latency beyond the window length.
//!
//! The conditioner also owns the live-display circular buffer — a longer
//! FIFO of whole samples read by the presentation layer. Nothing here can
//! fail: every well-formed sample produces a conditioned output.

use std::collections::VecDeque;

use crate::sample::{SampleBuffer, SensorSample};

/// A conditioned sample: instantaneous and smoothed magnitudes alongside
/// the raw reading.
#[derive(Debug, Clone)]
pub struct ConditionedSignal {
    /// Instantaneous user acceleration magnitude (g).
    pub magnitude: f64,
    /// Average of the last few magnitudes (adaptive noise floor, g).
    pub smoothed_magnitude: f64,
    /// The raw sample this signal was derived from.
    pub sample: SensorSample,
}

/// Rolling-window signal conditioner. O(1) running state per sample.
///
/// # Examples
///
/// ```
/// use airtime::sample::SensorSample;
/// use airtime::signal::SignalConditioner;
///
/// let mut conditioner = SignalConditioner::new(10, 200);
/// let sample = SensorSample::new(0.0, [0.0, 0.0, 1.0], [0.0; 3], [0.0, 0.0, -1.0]);
/// let signal = conditioner.condition(sample);
/// assert!((signal.magnitude - 1.0).abs() < 1e-9);
/// ```
#[derive(Debug)]
pub struct SignalConditioner {
    /// Recent magnitudes for the smoothed-peak average.
    recent_magnitudes: VecDeque<f64>,
    /// Running sum of `recent_magnitudes`, kept incrementally.
    magnitude_sum: f64,
    peak_window: usize,
    /// Whole samples for live display, strict FIFO.
    display: SampleBuffer,
}

impl SignalConditioner {
    /// Creates a conditioner with the given smoothing window length and
    /// display buffer capacity (both in samples).
    #[must_use]
    pub fn new(peak_window: usize, display_capacity: usize) -> Self {
        Self {
            recent_magnitudes: VecDeque::with_capacity(peak_window),
            magnitude_sum: 0.0,
            peak_window: peak_window.max(1),
            display: SampleBuffer::new(display_capacity.max(1)),
        }
    }

    /// Conditions one sample. Always succeeds.
    pub fn condition(&mut self, sample: SensorSample) -> ConditionedSignal {
        let magnitude = sample.accel_magnitude();

        if self.recent_magnitudes.len() == self.peak_window {
            if let Some(evicted) = self.recent_magnitudes.pop_front() {
                self.magnitude_sum -= evicted;
            }
        }
        self.recent_magnitudes.push_back(magnitude);
        self.magnitude_sum += magnitude;

        let smoothed_magnitude = self.magnitude_sum / self.recent_magnitudes.len() as f64;

        self.display.push(sample.clone());

        ConditionedSignal {
            magnitude,
            smoothed_magnitude,
            sample,
        }
    }

    /// The live-display buffer (read by the presentation layer).
    #[must_use]
    pub fn display_buffer(&self) -> &SampleBuffer {
        &self.display
    }

    /// Clears all rolling state. Used on session reset.
    pub fn reset(&mut self) {
        self.recent_magnitudes.clear();
        self.magnitude_sum = 0.0;
        self.display.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_with_mag(t: f64, mag: f64) -> SensorSample {
        SensorSample::new(t, [0.0, 0.0, mag], [0.0; 3], [0.0, 0.0, -1.0])
    }

    #[test]
    fn test_first_sample_smoothed_equals_instantaneous() {
        let mut conditioner = SignalConditioner::new(10, 50);
        let signal = conditioner.condition(sample_with_mag(0.0, 1.5));
        assert!((signal.magnitude - 1.5).abs() < 1e-9);
        assert!((signal.smoothed_magnitude - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_smoothed_is_window_average() {
        let mut conditioner = SignalConditioner::new(4, 50);
        conditioner.condition(sample_with_mag(0.00, 1.0));
        conditioner.condition(sample_with_mag(0.02, 2.0));
        conditioner.condition(sample_with_mag(0.04, 3.0));
        let signal = conditioner.condition(sample_with_mag(0.06, 4.0));
        assert!((signal.smoothed_magnitude - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_window_evicts_oldest() {
        let mut conditioner = SignalConditioner::new(2, 50);
        conditioner.condition(sample_with_mag(0.00, 10.0));
        conditioner.condition(sample_with_mag(0.02, 1.0));
        let signal = conditioner.condition(sample_with_mag(0.04, 1.0));
        // The 10.0 spike fell out of the window.
        assert!((signal.smoothed_magnitude - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_spike_is_damped() {
        let mut conditioner = SignalConditioner::new(10, 50);
        for i in 0..9 {
            conditioner.condition(sample_with_mag(i as f64 * 0.02, 1.0));
        }
        let signal = conditioner.condition(sample_with_mag(0.18, 5.0));
        // One 5 g spike among nine 1 g readings averages to 1.4 g.
        assert!(signal.smoothed_magnitude < 1.5);
        assert!((signal.magnitude - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_display_buffer_fills() {
        let mut conditioner = SignalConditioner::new(10, 3);
        for i in 0..5 {
            conditioner.condition(sample_with_mag(i as f64 * 0.02, 1.0));
        }
        assert_eq!(conditioner.display_buffer().len(), 3);
        assert_eq!(
            conditioner.display_buffer().iter().next().unwrap().timestamp,
            0.04
        );
    }

    #[test]
    fn test_reset_clears_state() {
        let mut conditioner = SignalConditioner::new(10, 50);
        conditioner.condition(sample_with_mag(0.0, 3.0));
        conditioner.reset();
        assert!(conditioner.display_buffer().is_empty());

        let signal = conditioner.condition(sample_with_mag(1.0, 1.0));
        assert!((signal.smoothed_magnitude - 1.0).abs() < 1e-9);
    }
}
