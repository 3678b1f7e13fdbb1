//! # Jump Detector State Machine
//!
//! The core decision logic: consumes conditioned signals and vertical
//! motion, cycles a three-state machine, and reports transitions to the
//! engine.
//!
//! ## States
//!
//! | State | Meaning | Leaves when |
//! |-------|---------|-------------|
//! | Ground | riding / at rest | acceleration arms a takeoff candidate |
//! | PotentialTakeoff | launch impulse seen | freefall confirms, or noise reject |
//! | Airborne | freefall confirmed | landing impact / descent, or timeout |
//!
//! A takeoff arms when the smoothed magnitude clears a fraction of the
//! takeoff threshold *and* either the altimeter says we are rising or the
//! instantaneous magnitude clears the full threshold on its own — two
//! independent evidences so a single failing signal does not cost a
//! detection. Freefall (near-zero net acceleration) then confirms the
//! flight; a second spike without freefall is a shock, not a jump.
//!
//! Every rejected candidate is a normal outcome, not an error: the
//! machine resets to Ground and keeps a human-readable status string for
//! live feedback. Detection never touches the status text to make
//! decisions.

pub mod candidate;

use tracing::debug;

use crate::config::{DetectionConfig, DetectionStrategy};
use crate::integrator::VerticalMotion;
use crate::signal::ConditionedSignal;

pub use candidate::JumpCandidate;

/// Detector process state. Exactly one per engine; transitions are total
/// functions of (state, sample, timers).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionState {
    /// On the ground, watching for a launch impulse.
    Ground,
    /// Launch impulse seen, waiting for freefall to confirm.
    PotentialTakeoff,
    /// Freefall confirmed, waiting for a landing signature.
    Airborne,
}

/// A flight the detector has committed, ready for event building.
#[derive(Debug)]
pub struct CompletedFlight {
    /// The promoted candidate with its captured samples.
    pub candidate: JumpCandidate,
    /// Flight duration at commit (s).
    pub duration: f64,
    /// Acceleration magnitude of the landing sample (g).
    pub impact_g: f64,
    /// Stream index of the landing sample.
    pub landing_index: u64,
    /// Peak barometric height above takeoff, when tracked (m).
    pub peak_height_m: f64,
    /// The configuration the candidate armed with. Event building
    /// validates against this, not whatever is active at commit time.
    pub config: DetectionConfig,
}

/// Transition reported for one processed sample.
#[derive(Debug)]
pub enum DetectorEvent {
    /// Ground → PotentialTakeoff; the engine should snapshot takeoff altitude.
    TakeoffArmed,
    /// PotentialTakeoff → Airborne.
    BecameAirborne,
    /// Candidate discarded: high spike without ever reaching freefall.
    NoiseRejected,
    /// Candidate discarded: airborne past the safety timeout.
    TimedOut,
    /// Candidate discarded: landing arrived before the minimum airtime.
    TooShort,
    /// Airborne → Ground with a validated-duration landing.
    Landed(CompletedFlight),
}

/// The jump detector state machine.
///
/// Strategy-parameterized: the altimeter-aided variant additionally
/// accepts a sustained-descent landing signature; the inertial variant
/// relies on the impact spike alone. Thresholds are runtime-swappable,
/// but a candidate in flight keeps the configuration it armed with until
/// it resolves.
#[derive(Debug)]
pub struct JumpDetector {
    config: DetectionConfig,
    /// Configuration snapshotted when the current candidate armed.
    flight_config: DetectionConfig,
    state: DetectionState,
    candidate: Option<JumpCandidate>,
    /// Running stream index of processed samples.
    sample_index: u64,
    /// Human-readable motion phase for live feedback.
    status: String,
}

impl JumpDetector {
    /// Creates a detector in the Ground state.
    #[must_use]
    pub fn new(config: DetectionConfig) -> Self {
        Self {
            flight_config: config.clone(),
            config,
            state: DetectionState::Ground,
            candidate: None,
            sample_index: 0,
            status: "Riding".to_string(),
        }
    }

    /// Current machine state.
    #[must_use]
    pub fn state(&self) -> DetectionState {
        self.state
    }

    /// Current motion-phase description. Presentation only.
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Number of samples processed since construction or reset.
    #[must_use]
    pub fn samples_processed(&self) -> u64 {
        self.sample_index
    }

    /// Replaces the detection thresholds from the next sample on. An
    /// in-flight candidate keeps the configuration it armed with.
    pub fn set_config(&mut self, config: DetectionConfig) {
        self.config = config;
        if self.state == DetectionState::Ground {
            self.flight_config = self.config.clone();
        }
    }

    /// Active configuration (the one new candidates will arm with).
    #[must_use]
    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Processes one conditioned sample. Returns the transition taken,
    /// if any.
    ///
    /// `vertical` carries altimeter-derived motion; for the inertial
    /// strategy pass [`VerticalMotion::default()`].
    pub fn process(
        &mut self,
        signal: &ConditionedSignal,
        vertical: &VerticalMotion,
    ) -> Option<DetectorEvent> {
        let index = self.sample_index;
        self.sample_index += 1;

        match self.state {
            DetectionState::Ground => self.process_ground(signal, vertical, index),
            DetectionState::PotentialTakeoff => self.process_potential_takeoff(signal),
            DetectionState::Airborne => self.process_airborne(signal, vertical, index),
        }
    }

    /// Discards any in-flight candidate without emitting an event.
    /// Called when the sample stream stops mid-candidate: no partial jump
    /// is ever reported.
    pub fn reset(&mut self) {
        if self.candidate.is_some() {
            debug!("discarding in-flight candidate on reset");
        }
        self.state = DetectionState::Ground;
        self.candidate = None;
        self.flight_config = self.config.clone();
        self.status = "Riding".to_string();
    }

    fn process_ground(
        &mut self,
        signal: &ConditionedSignal,
        vertical: &VerticalMotion,
        index: u64,
    ) -> Option<DetectorEvent> {
        let cfg = &self.config;
        let armed_floor = cfg.takeoff_arm_fraction * cfg.takeoff_threshold_g;

        let armed = signal.smoothed_magnitude > armed_floor
            && (vertical.moving_up || signal.magnitude > cfg.takeoff_threshold_g);

        if !armed {
            self.status = "Riding".to_string();
            return None;
        }

        debug!(
            magnitude = signal.magnitude,
            smoothed = signal.smoothed_magnitude,
            "takeoff candidate armed"
        );

        self.flight_config = self.config.clone();
        let mut candidate = JumpCandidate::new(signal.sample.timestamp, index);
        candidate.observe(signal.sample.clone());
        self.candidate = Some(candidate);
        self.state = DetectionState::PotentialTakeoff;
        self.status = "Takeoff?".to_string();
        Some(DetectorEvent::TakeoffArmed)
    }

    fn process_potential_takeoff(&mut self, signal: &ConditionedSignal) -> Option<DetectorEvent> {
        let cfg = self.flight_config.clone();
        let candidate = self
            .candidate
            .as_mut()
            .expect("candidate present in PotentialTakeoff");

        candidate.observe(signal.sample.clone());
        let elapsed = candidate.elapsed(signal.sample.timestamp);

        if signal.magnitude < cfg.freefall_ceiling_g {
            debug!(elapsed, "freefall confirmed, airborne");
            self.state = DetectionState::Airborne;
            self.status = "Airborne".to_string();
            return Some(DetectorEvent::BecameAirborne);
        }

        // A second strong spike without freefall is a shock, not a jump.
        if elapsed > cfg.noise_reject_window_s && signal.magnitude > cfg.takeoff_threshold_g {
            debug!(elapsed, magnitude = signal.magnitude, "noise rejected");
            self.discard("Bump rejected");
            return Some(DetectorEvent::NoiseRejected);
        }

        if elapsed > cfg.flight_timeout_s {
            debug!(elapsed, "takeoff candidate timed out");
            self.discard("Riding");
            return Some(DetectorEvent::TimedOut);
        }

        None
    }

    fn process_airborne(
        &mut self,
        signal: &ConditionedSignal,
        vertical: &VerticalMotion,
        index: u64,
    ) -> Option<DetectorEvent> {
        let cfg = self.flight_config.clone();
        let candidate = self
            .candidate
            .as_mut()
            .expect("candidate present in Airborne");

        candidate.observe(signal.sample.clone());
        let elapsed = candidate.elapsed(signal.sample.timestamp);
        self.status = format!("Airborne {:.1}s", elapsed);

        // Landing evidence, in priority order: a hard impact wins; a
        // sustained descent past the altitude peak (altimeter strategy
        // only) lands softer touchdowns. Both share the same arming gate
        // so they cannot double-fire.
        let gate_open = elapsed > 0.5 * cfg.min_airtime_s;
        let impact_landing = signal.magnitude > cfg.landing_threshold_g;
        let descent_landing = cfg.strategy == DetectionStrategy::Altimeter
            && !impact_landing
            && vertical.moving_down
            && vertical.peak_height > 0.0
            && vertical
                .height_above_takeoff
                .is_some_and(|h| h < 0.5 * vertical.peak_height);

        if gate_open && (impact_landing || descent_landing) {
            if elapsed >= cfg.min_airtime_s {
                debug!(
                    elapsed,
                    impact = signal.magnitude,
                    "landing committed"
                );
                let candidate = self.candidate.take().expect("candidate checked above");
                self.state = DetectionState::Ground;
                self.flight_config = self.config.clone();
                self.status = format!("Landed {:.2}s", elapsed);
                return Some(DetectorEvent::Landed(CompletedFlight {
                    candidate,
                    duration: elapsed,
                    impact_g: signal.magnitude,
                    landing_index: index,
                    peak_height_m: vertical.peak_height,
                    config: cfg,
                }));
            }

            debug!(elapsed, "landing before minimum airtime, discarded");
            self.discard("Too short");
            return Some(DetectorEvent::TooShort);
        }

        if elapsed > cfg.flight_timeout_s {
            debug!(elapsed, "airborne past safety timeout, discarded");
            self.discard("Riding");
            return Some(DetectorEvent::TimedOut);
        }

        None
    }

    fn discard(&mut self, status: &str) {
        self.candidate = None;
        self.state = DetectionState::Ground;
        self.flight_config = self.config.clone();
        self.status = status.to_string();
    }
}
