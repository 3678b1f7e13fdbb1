//! # Jump Event Builder
//!
//! Validates a committed flight against the configured duration bounds
//! and produces the immutable [`JumpEvent`] record. Validation failure is
//! not an error: the candidate is silently dropped and the detector has
//! already surfaced a status message.
//!
//! Height policy: a positive barometric peak wins; without one the height
//! falls back to a ballistic estimate from the flight duration, clamped
//! to a physically plausible range so noisy inputs cannot report a
//! four-meter bunny hop.

use crate::detector::CompletedFlight;
use crate::sample::SensorSample;

/// Standard gravity (m/s²).
const GRAVITY_MPS2: f64 = 9.81;

/// Ceiling for the ballistic height estimate (m).
const MAX_ESTIMATED_HEIGHT_M: f64 = 2.0;

/// Rotation below this absolute yaw reports as no rotation (degrees).
const ROTATION_LABEL_FLOOR_DEG: f64 = 45.0;

/// One validated, committed jump. Immutable once built.
#[derive(Debug, Clone)]
pub struct JumpEvent {
    /// Timestamp of the takeoff sample (s, stream epoch).
    pub start_time: f64,
    /// Flight duration (s). Always within the configured airtime bounds.
    pub duration_s: f64,
    /// Signed accumulated yaw (degrees, positive = right).
    pub yaw_degrees: f64,
    /// Peak acceleration magnitude during flight (g).
    pub peak_accel_g: f64,
    /// Acceleration magnitude of the landing sample (g).
    pub landing_impact_g: f64,
    /// Peak height above takeoff (m): barometric when available,
    /// otherwise a clamped ballistic estimate.
    pub height_m: f64,
    /// Stream index of the takeoff sample.
    pub takeoff_index: u64,
    /// Stream index of the landing sample.
    pub landing_index: u64,
    /// Every sample captured during the flight, chronological.
    pub samples: Vec<SensorSample>,
}

impl JumpEvent {
    /// Builds an event from a committed flight, or `None` when the
    /// duration falls outside `[min_airtime_s, max_airtime_s]`. The
    /// bounds come from the configuration the flight armed with, so a
    /// runtime threshold swap never re-judges a candidate mid-flight.
    #[must_use]
    pub fn build(flight: CompletedFlight) -> Option<Self> {
        let bounds = &flight.config;
        if flight.duration < bounds.min_airtime_s || flight.duration > bounds.max_airtime_s {
            return None;
        }

        let height_m = if flight.peak_height_m > 0.0 {
            flight.peak_height_m
        } else {
            estimate_height(flight.duration)
        };

        let candidate = flight.candidate;
        let start_time = candidate.start_time;
        let takeoff_index = candidate.start_index;
        let yaw_degrees = candidate.yaw_degrees();
        let peak_accel_g = candidate.peak_magnitude();
        let samples = candidate.into_samples();
        debug_assert!(!samples.is_empty(), "committed flight captured no samples");
        debug_assert!(takeoff_index <= flight.landing_index);

        Some(Self {
            start_time,
            duration_s: flight.duration,
            yaw_degrees,
            peak_accel_g,
            landing_impact_g: flight.impact_g,
            height_m,
            takeoff_index,
            landing_index: flight.landing_index,
            samples,
        })
    }

    /// Coarse rotation description for display.
    #[must_use]
    pub fn rotation_label(&self) -> String {
        rotation_label(self.yaw_degrees)
    }
}

/// Ballistic height estimate from flight duration alone.
///
/// Symmetric flight: peak upward velocity v = g·t/2 for airtime t, apex
/// at t/2, so h = v·(t/2) − ½·g·(t/2)². Clamped to
/// `[0, MAX_ESTIMATED_HEIGHT_M]` to reject implausible estimates from
/// noisy duration measurements.
fn estimate_height(duration_s: f64) -> f64 {
    let half = duration_s / 2.0;
    let v0 = GRAVITY_MPS2 * half;
    let height = v0 * half - 0.5 * GRAVITY_MPS2 * half * half;
    height.clamp(0.0, MAX_ESTIMATED_HEIGHT_M)
}

/// Labels an accumulated yaw as the nearest 90° increment with a turn
/// direction, or "no rotation" below 45°.
///
/// # Examples
///
/// ```
/// use airtime::event::rotation_label;
///
/// assert_eq!(rotation_label(30.0), "no rotation");
/// assert_eq!(rotation_label(95.0), "90° right");
/// assert_eq!(rotation_label(-181.0), "180° left");
/// ```
#[must_use]
pub fn rotation_label(yaw_degrees: f64) -> String {
    let magnitude = yaw_degrees.abs();
    if magnitude < ROTATION_LABEL_FLOOR_DEG {
        return "no rotation".to_string();
    }
    let nearest = ((magnitude / 90.0).round() * 90.0) as i64;
    let direction = if yaw_degrees >= 0.0 { "right" } else { "left" };
    format!("{}° {}", nearest, direction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DetectionConfig;
    use crate::detector::JumpCandidate;

    fn flight_with(duration: f64, peak_height_m: f64, config: DetectionConfig) -> CompletedFlight {
        let mut candidate = JumpCandidate::new(10.0, 5);
        let steps = ((duration / 0.02) as usize).max(1);
        for i in 0..=steps {
            candidate.observe(SensorSample::new(
                10.0 + i as f64 * 0.02,
                [0.0, 0.0, if i == 0 { 2.0 } else { 0.1 }],
                [0.0; 3],
                [0.0, 0.0, -1.0],
            ));
        }
        CompletedFlight {
            candidate,
            duration,
            impact_g: 3.0,
            landing_index: 5 + steps as u64,
            peak_height_m,
            config,
        }
    }

    fn flight(duration: f64, peak_height_m: f64) -> CompletedFlight {
        flight_with(duration, peak_height_m, DetectionConfig::watch())
    }

    #[test]
    fn test_build_valid_flight() {
        let event = JumpEvent::build(flight(0.5, 0.0)).unwrap();
        assert_eq!(event.duration_s, 0.5);
        assert_eq!(event.start_time, 10.0);
        assert_eq!(event.landing_impact_g, 3.0);
        assert_eq!(event.peak_accel_g, 2.0);
        assert!(event.takeoff_index <= event.landing_index);
        assert!(!event.samples.is_empty());
    }

    #[test]
    fn test_samples_are_chronological() {
        let event = JumpEvent::build(flight(0.4, 0.0)).unwrap();
        for pair in event.samples.windows(2) {
            assert!(pair[0].timestamp <= pair[1].timestamp);
        }
    }

    #[test]
    fn test_too_short_rejected() {
        assert!(JumpEvent::build(flight(0.1, 0.0)).is_none());
    }

    #[test]
    fn test_too_long_rejected() {
        assert!(JumpEvent::build(flight(5.5, 0.0)).is_none());
    }

    #[test]
    fn test_bounds_come_from_flight_config() {
        // 6 s is past the watch ceiling but inside the phone profile the
        // flight armed with.
        assert!(JumpEvent::build(flight(6.0, 0.0)).is_none());
        let event = JumpEvent::build(flight_with(6.0, 0.0, DetectionConfig::phone()));
        assert!(event.is_some());
    }

    #[test]
    fn test_barometric_height_preferred() {
        let event = JumpEvent::build(flight(0.5, 1.3)).unwrap();
        assert!((event.height_m - 1.3).abs() < 1e-9);
    }

    #[test]
    fn test_ballistic_height_fallback() {
        let event = JumpEvent::build(flight(0.6, 0.0)).unwrap();
        // h = g * t^2 / 8 = 9.81 * 0.36 / 8
        assert!((event.height_m - 0.441_45).abs() < 1e-3);
    }

    #[test]
    fn test_ballistic_height_clamped() {
        // 4 s of airtime would estimate ~19.6 m; the clamp caps it.
        let event = JumpEvent::build(flight(4.0, 0.0)).unwrap();
        assert_eq!(event.height_m, MAX_ESTIMATED_HEIGHT_M);
    }

    #[test]
    fn test_rotation_label_below_floor() {
        assert_eq!(rotation_label(30.0), "no rotation");
        assert_eq!(rotation_label(-44.9), "no rotation");
        assert_eq!(rotation_label(0.0), "no rotation");
    }

    #[test]
    fn test_rotation_label_rounds_to_90() {
        assert_eq!(rotation_label(95.0), "90° right");
        assert_eq!(rotation_label(60.0), "90° right");
        assert_eq!(rotation_label(-95.0), "90° left");
    }

    #[test]
    fn test_rotation_label_180_left() {
        assert_eq!(rotation_label(-181.0), "180° left");
    }

    #[test]
    fn test_rotation_label_full_spin() {
        assert_eq!(rotation_label(352.0), "360° right");
        assert_eq!(rotation_label(-540.0), "540° left");
    }
}
