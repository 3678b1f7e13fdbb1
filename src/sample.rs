//! # Sensor Sample Types
//!
//! Raw sensor readings as delivered by the sample source (phone or watch
//! motion driver) and the bounded circular buffer used for live display.
//!
//! A [`SensorSample`] is one timestamped tuple of user (gravity-removed)
//! acceleration, gyroscopic rotation rate, and the gravity vector. Samples
//! arrive at a fixed nominal rate (50–60 Hz) with monotonically
//! non-decreasing timestamps; the source guarantees ordering, the engine
//! never sees retries or gaps it must repair.

use std::collections::VecDeque;

/// One raw sensor reading.
///
/// Timestamps are seconds against an arbitrary monotonic epoch (whatever
/// the sensor driver provides at stream start). Acceleration and gravity
/// are in g, rotation rate in rad/s.
///
/// # Examples
///
/// ```
/// use airtime::sample::SensorSample;
///
/// let sample = SensorSample::new(12.5, [0.0, 0.0, 1.8], [0.0, 0.0, 3.1], [0.0, 0.0, -1.0]);
/// assert!((sample.accel_magnitude() - 1.8).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SensorSample {
    /// Monotonic timestamp in seconds.
    pub timestamp: f64,
    /// User acceleration (gravity removed) [x, y, z] in g.
    pub user_accel: [f64; 3],
    /// Rotation rate [x, y, z] in rad/s. Z is the vertical (yaw) axis.
    pub rotation_rate: [f64; 3],
    /// Gravity vector [x, y, z] in g.
    pub gravity: [f64; 3],
}

impl SensorSample {
    /// Creates a new sensor sample.
    #[must_use]
    pub fn new(
        timestamp: f64,
        user_accel: [f64; 3],
        rotation_rate: [f64; 3],
        gravity: [f64; 3],
    ) -> Self {
        Self {
            timestamp,
            user_accel,
            rotation_rate,
            gravity,
        }
    }

    /// Euclidean norm of the user acceleration vector, in g.
    ///
    /// This is the primary detection signal: near zero in freefall,
    /// spiking on takeoff impulse and landing impact.
    #[must_use]
    pub fn accel_magnitude(&self) -> f64 {
        let [x, y, z] = self.user_accel;
        (x * x + y * y + z * z).sqrt()
    }

    /// Rotation rate about the vertical (yaw) axis, in rad/s.
    #[must_use]
    pub fn yaw_rate(&self) -> f64 {
        self.rotation_rate[2]
    }
}

/// Fixed-capacity circular buffer of recent samples for live display.
///
/// Strict FIFO: inserting at capacity evicts the oldest entry. Capacity is
/// sized for roughly 3–5 seconds of samples at the nominal rate; the
/// presentation layer reads it, the conditioning path is the only writer.
///
/// # Examples
///
/// ```
/// use airtime::sample::{SampleBuffer, SensorSample};
///
/// let mut buffer = SampleBuffer::new(3);
/// for i in 0..5 {
///     buffer.push(SensorSample::new(i as f64, [0.0; 3], [0.0; 3], [0.0, 0.0, -1.0]));
/// }
/// assert_eq!(buffer.len(), 3);
/// // Oldest two evicted; contents are the last three in arrival order.
/// assert_eq!(buffer.iter().next().unwrap().timestamp, 2.0);
/// ```
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    samples: VecDeque<SensorSample>,
    capacity: usize,
}

impl SampleBuffer {
    /// Creates an empty buffer holding at most `capacity` samples.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "sample buffer capacity must be non-zero");
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a sample, evicting the oldest if at capacity.
    pub fn push(&mut self, sample: SensorSample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Number of samples currently buffered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if no samples are buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Maximum number of samples retained.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterates samples oldest-first (arrival order).
    pub fn iter(&self) -> impl Iterator<Item = &SensorSample> {
        self.samples.iter()
    }

    /// Most recent sample, if any.
    #[must_use]
    pub fn latest(&self) -> Option<&SensorSample> {
        self.samples.back()
    }

    /// Drops all buffered samples.
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_at(t: f64) -> SensorSample {
        SensorSample::new(t, [0.0; 3], [0.0; 3], [0.0, 0.0, -1.0])
    }

    #[test]
    fn test_accel_magnitude() {
        let sample = SensorSample::new(0.0, [3.0, 4.0, 0.0], [0.0; 3], [0.0, 0.0, -1.0]);
        assert!((sample.accel_magnitude() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_accel_magnitude_zero() {
        let sample = sample_at(0.0);
        assert_eq!(sample.accel_magnitude(), 0.0);
    }

    #[test]
    fn test_yaw_rate_is_z_axis() {
        let sample = SensorSample::new(0.0, [0.0; 3], [0.1, 0.2, 0.3], [0.0, 0.0, -1.0]);
        assert_eq!(sample.yaw_rate(), 0.3);
    }

    #[test]
    fn test_buffer_below_capacity() {
        let mut buffer = SampleBuffer::new(10);
        for i in 0..4 {
            buffer.push(sample_at(i as f64));
        }
        assert_eq!(buffer.len(), 4);
        assert!(!buffer.is_empty());
    }

    #[test]
    fn test_buffer_evicts_oldest_at_capacity() {
        let mut buffer = SampleBuffer::new(5);
        for i in 0..12 {
            buffer.push(sample_at(i as f64));
        }

        assert_eq!(buffer.len(), 5);

        // Contents must equal the last `capacity` samples in arrival order.
        let timestamps: Vec<f64> = buffer.iter().map(|s| s.timestamp).collect();
        assert_eq!(timestamps, vec![7.0, 8.0, 9.0, 10.0, 11.0]);
    }

    #[test]
    fn test_buffer_latest() {
        let mut buffer = SampleBuffer::new(3);
        assert!(buffer.latest().is_none());

        buffer.push(sample_at(1.0));
        buffer.push(sample_at(2.0));
        assert_eq!(buffer.latest().unwrap().timestamp, 2.0);
    }

    #[test]
    fn test_buffer_clear() {
        let mut buffer = SampleBuffer::new(3);
        buffer.push(sample_at(1.0));
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 3);
    }

    #[test]
    #[should_panic(expected = "capacity must be non-zero")]
    fn test_buffer_zero_capacity_panics() {
        let _ = SampleBuffer::new(0);
    }
}
