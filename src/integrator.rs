//! # Altitude and Orientation Integrators
//!
//! Two independent, optionally-active integration paths feeding the
//! detector:
//!
//! - [`AltitudeTracker`]: barometric height tracking for the phone
//!   deployment. Vertical velocity comes from a finite difference over
//!   relative-altitude readings, classified into moving-up/moving-down
//!   with a deadband to suppress jitter at rest.
//! - [`YawIntegrator`]: gyroscopic yaw accumulation for rotation metrics,
//!   rectangular integration of the vertical-axis rate.
//!
//! Integration is best-effort: a non-positive or implausibly large time
//! step skips that integration step and carries state forward. Nothing
//! here ever aborts the sample pipeline.

/// Minimum elapsed time between altitude readings used for a velocity
/// estimate. Shorter gaps amplify barometer noise through the division.
const MIN_ALTITUDE_INTERVAL_S: f64 = 0.1;

/// Vertical velocity deadband (m/s). Within it the body counts as neither
/// rising nor descending.
const VELOCITY_DEADBAND_MPS: f64 = 0.05;

/// Longest gyro time step accepted for yaw integration. Anything larger
/// is a clock discontinuity or stream gap and would corrupt the integral.
const MAX_YAW_STEP_S: f64 = 0.1;

/// Snapshot of current vertical motion, consumed by the detector.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerticalMotion {
    /// Rising faster than the deadband.
    pub moving_up: bool,
    /// Descending faster than the deadband.
    pub moving_down: bool,
    /// Height above the altitude captured at takeoff (m), if armed.
    pub height_above_takeoff: Option<f64>,
    /// Running peak of `height_above_takeoff` for the current flight (m).
    pub peak_height: f64,
}

/// Barometric altitude tracker (phone deployment).
///
/// Feed it relative-altitude readings as they arrive; they are slower and
/// independent of the accelerometer stream. The tracker holds the last
/// velocity estimate between readings.
#[derive(Debug, Default)]
pub struct AltitudeTracker {
    /// Last reading used for a velocity estimate: (altitude m, timestamp s).
    anchor: Option<(f64, f64)>,
    /// Most recent relative altitude (m).
    current_altitude: Option<f64>,
    /// Latest vertical velocity estimate (m/s).
    vertical_velocity: f64,
    /// Altitude snapshotted when a takeoff candidate armed (m).
    takeoff_altitude: Option<f64>,
    /// Peak height above takeoff for the current flight (m).
    peak_height: f64,
}

impl AltitudeTracker {
    /// Creates an idle tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingests one relative-altitude reading.
    ///
    /// The velocity estimate only updates once at least
    /// `MIN_ALTITUDE_INTERVAL_S` has elapsed since the previous anchored
    /// reading; a non-positive elapsed time skips the step entirely.
    pub fn update(&mut self, altitude_m: f64, timestamp: f64) {
        self.current_altitude = Some(altitude_m);

        match self.anchor {
            None => {
                self.anchor = Some((altitude_m, timestamp));
            }
            Some((prev_altitude, prev_timestamp)) => {
                let dt = timestamp - prev_timestamp;
                if dt <= 0.0 {
                    // Malformed timing; carry the previous estimate forward.
                    return;
                }
                if dt < MIN_ALTITUDE_INTERVAL_S {
                    return;
                }
                self.vertical_velocity = (altitude_m - prev_altitude) / dt;
                self.anchor = Some((altitude_m, timestamp));
            }
        }

        if let (Some(takeoff), Some(current)) = (self.takeoff_altitude, self.current_altitude) {
            let height = current - takeoff;
            if height > self.peak_height {
                self.peak_height = height;
            }
        }
    }

    /// Snapshots the current altitude as the takeoff reference and resets
    /// the flight peak.
    pub fn mark_takeoff(&mut self) {
        self.takeoff_altitude = self.current_altitude;
        self.peak_height = 0.0;
    }

    /// Drops the takeoff reference (flight over or discarded).
    pub fn clear_takeoff(&mut self) {
        self.takeoff_altitude = None;
        self.peak_height = 0.0;
    }

    /// Latest vertical velocity estimate (m/s).
    #[must_use]
    pub fn vertical_velocity(&self) -> f64 {
        self.vertical_velocity
    }

    /// Current vertical-motion snapshot for the detector.
    #[must_use]
    pub fn motion(&self) -> VerticalMotion {
        let height_above_takeoff = match (self.takeoff_altitude, self.current_altitude) {
            (Some(takeoff), Some(current)) => Some(current - takeoff),
            _ => None,
        };
        VerticalMotion {
            moving_up: self.vertical_velocity > VELOCITY_DEADBAND_MPS,
            moving_down: self.vertical_velocity < -VELOCITY_DEADBAND_MPS,
            height_above_takeoff,
            peak_height: self.peak_height,
        }
    }

    /// Clears all state. Used on session reset.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Gyroscopic yaw accumulator (watch deployment, rotation metrics on both).
///
/// # Examples
///
/// ```
/// use airtime::integrator::YawIntegrator;
///
/// let mut yaw = YawIntegrator::new();
/// yaw.advance(1.0, 0.00); // anchors the clock
/// yaw.advance(1.0, 0.02); // 1 rad/s for 20 ms
/// assert!((yaw.yaw_radians() - 0.02).abs() < 1e-9);
/// ```
#[derive(Debug, Default)]
pub struct YawIntegrator {
    accumulated_rad: f64,
    last_timestamp: Option<f64>,
}

impl YawIntegrator {
    /// Creates a zeroed integrator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the integral by one gyro reading.
    ///
    /// The step only accumulates when `0 < dt < MAX_YAW_STEP_S`; the clock
    /// anchor always advances so a single bad gap cannot poison later
    /// steps.
    pub fn advance(&mut self, yaw_rate_rad_s: f64, timestamp: f64) {
        if let Some(prev) = self.last_timestamp {
            let dt = timestamp - prev;
            if dt > 0.0 && dt < MAX_YAW_STEP_S {
                self.accumulated_rad += yaw_rate_rad_s * dt;
            }
        }
        self.last_timestamp = Some(timestamp);
    }

    /// Zeroes the accumulated angle. Called at the start of every jump
    /// candidate; the clock anchor is kept so the next step integrates
    /// against the previous sample.
    pub fn zero(&mut self) {
        self.accumulated_rad = 0.0;
    }

    /// Accumulated yaw in radians (signed).
    #[must_use]
    pub fn yaw_radians(&self) -> f64 {
        self.accumulated_rad
    }

    /// Accumulated yaw in degrees (signed, positive = right).
    #[must_use]
    pub fn yaw_degrees(&self) -> f64 {
        self.accumulated_rad.to_degrees()
    }

    /// Clears angle and clock anchor. Used on session reset.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
