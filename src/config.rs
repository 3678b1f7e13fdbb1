//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Detection thresholds are configuration, not constants: the two shipped
//! deployment profiles (phone with altimeter aid, watch with inertial-only
//! detection) differ in sensor placement and gravity-compensation
//! conventions, so their takeoff/landing thresholds differ by nearly an
//! order of magnitude. [`DetectionConfig`] can also be swapped at runtime
//! through the engine without restarting the sample pipeline.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub detection: DetectionConfig,

    #[serde(default)]
    pub signal: SignalConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Which auxiliary integrator drives detection.
///
/// Picked once at engine construction from a capability probe (altimeter
/// present or not); the hot path never re-checks hardware.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DetectionStrategy {
    /// Accelerometer + gyroscope only (watch deployment).
    Inertial,
    /// Barometric height tracking assists takeoff and landing (phone deployment).
    Altimeter,
}

/// Jump detection thresholds and timing bounds.
///
/// Runtime-adjustable: the engine accepts a replacement mid-stream and
/// applies it from the next sample on.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DetectionConfig {
    #[serde(default = "default_strategy")]
    pub strategy: DetectionStrategy,

    /// Acceleration magnitude above which upward launch is suspected (g).
    #[serde(default = "default_takeoff_threshold_g")]
    pub takeoff_threshold_g: f64,

    /// Acceleration magnitude above which ground impact is suspected (g).
    #[serde(default = "default_landing_threshold_g")]
    pub landing_threshold_g: f64,

    /// Acceleration magnitude below which the body counts as unsupported (g).
    #[serde(default = "default_freefall_ceiling_g")]
    pub freefall_ceiling_g: f64,

    /// Fraction of the takeoff threshold at which a candidate may arm
    /// when upward motion corroborates it.
    #[serde(default = "default_takeoff_arm_fraction")]
    pub takeoff_arm_fraction: f64,

    /// Shortest flight accepted as a jump (seconds).
    #[serde(default = "default_min_airtime_s")]
    pub min_airtime_s: f64,

    /// Longest flight accepted as a jump (seconds).
    #[serde(default = "default_max_airtime_s")]
    pub max_airtime_s: f64,

    /// Safety timeout: a candidate still airborne past this is discarded (seconds).
    #[serde(default = "default_flight_timeout_s")]
    pub flight_timeout_s: f64,

    /// A takeoff candidate that spikes again past this age without ever
    /// reaching the freefall ceiling is rejected as a shock (seconds).
    #[serde(default = "default_noise_reject_window_s")]
    pub noise_reject_window_s: f64,
}

/// Signal conditioning parameters.
#[derive(Debug, Deserialize, Clone)]
pub struct SignalConfig {
    /// Nominal sample delivery rate (Hz).
    #[serde(default = "default_sample_rate_hz")]
    pub sample_rate_hz: f64,

    /// Rolling window of recent magnitudes used for adaptive noise rejection.
    #[serde(default = "default_peak_window")]
    pub peak_window: usize,

    /// Seconds of samples retained in the live-display circular buffer.
    #[serde(default = "default_display_seconds")]
    pub display_seconds: f64,
}

/// Session aggregation parameters.
#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    /// Capacity of the most-recent-first jump list.
    #[serde(default = "default_recent_jumps")]
    pub recent_jumps: usize,
}

/// Telemetry configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    #[serde(default = "default_telemetry_enabled")]
    pub enabled: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    /// Seconds of raw samples accumulated per batch before a flush.
    #[serde(default = "default_batch_seconds")]
    pub batch_seconds: f64,

    /// Jump-event record format: "csv" (stable contract) or "jsonl".
    /// Sample and ground-truth rows are always CSV.
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_strategy() -> DetectionStrategy { DetectionStrategy::Inertial }
fn default_takeoff_threshold_g() -> f64 { 1.5 }
fn default_landing_threshold_g() -> f64 { 2.5 }
fn default_freefall_ceiling_g() -> f64 { 0.4 }
fn default_takeoff_arm_fraction() -> f64 { 0.8 }
fn default_min_airtime_s() -> f64 { 0.2 }
fn default_max_airtime_s() -> f64 { 5.0 }
fn default_flight_timeout_s() -> f64 { 5.0 }
fn default_noise_reject_window_s() -> f64 { 0.5 }

fn default_sample_rate_hz() -> f64 { 50.0 }
fn default_peak_window() -> usize { 10 }
fn default_display_seconds() -> f64 { 4.0 }

fn default_recent_jumps() -> usize { 30 }

fn default_telemetry_enabled() -> bool { true }
fn default_log_dir() -> String { "./logs".to_string() }
fn default_batch_seconds() -> f64 { 60.0 }
fn default_log_format() -> String { "csv".to_string() }

impl Default for DetectionConfig {
    fn default() -> Self {
        Self::watch()
    }
}

impl DetectionConfig {
    /// Watch deployment profile: inertial-only, wrist-mounted sensor.
    #[must_use]
    pub fn watch() -> Self {
        Self {
            strategy: DetectionStrategy::Inertial,
            takeoff_threshold_g: default_takeoff_threshold_g(),
            landing_threshold_g: default_landing_threshold_g(),
            freefall_ceiling_g: default_freefall_ceiling_g(),
            takeoff_arm_fraction: default_takeoff_arm_fraction(),
            min_airtime_s: default_min_airtime_s(),
            max_airtime_s: default_max_airtime_s(),
            flight_timeout_s: default_flight_timeout_s(),
            noise_reject_window_s: default_noise_reject_window_s(),
        }
    }

    /// Phone deployment profile: altimeter-aided, body-worn sensor.
    ///
    /// Thresholds are much lower than the watch profile because the phone
    /// driver reports user acceleration with a different gravity
    /// compensation convention and the sensor rides closer to the
    /// body's center of mass.
    #[must_use]
    pub fn phone() -> Self {
        Self {
            strategy: DetectionStrategy::Altimeter,
            takeoff_threshold_g: 0.3,
            landing_threshold_g: 0.4,
            freefall_ceiling_g: 0.15,
            takeoff_arm_fraction: default_takeoff_arm_fraction(),
            min_airtime_s: default_min_airtime_s(),
            max_airtime_s: 8.0,
            flight_timeout_s: 8.0,
            noise_reject_window_s: default_noise_reject_window_s(),
        }
    }
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: default_sample_rate_hz(),
            peak_window: default_peak_window(),
            display_seconds: default_display_seconds(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            recent_jumps: default_recent_jumps(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: default_telemetry_enabled(),
            log_dir: default_log_dir(),
            batch_seconds: default_batch_seconds(),
            format: default_log_format(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            detection: DetectionConfig::default(),
            signal: SignalConfig::default(),
            session: SessionConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use airtime::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        let d = &self.detection;

        if d.takeoff_threshold_g <= 0.0 || d.takeoff_threshold_g > 10.0 {
            return Err(crate::error::AirtimeError::Config(
                toml::de::Error::custom("takeoff_threshold_g must be between 0.0 and 10.0")
            ));
        }

        if d.landing_threshold_g <= 0.0 || d.landing_threshold_g > 16.0 {
            return Err(crate::error::AirtimeError::Config(
                toml::de::Error::custom("landing_threshold_g must be between 0.0 and 16.0")
            ));
        }

        if d.freefall_ceiling_g <= 0.0 || d.freefall_ceiling_g >= d.takeoff_threshold_g {
            return Err(crate::error::AirtimeError::Config(
                toml::de::Error::custom("freefall_ceiling_g must be positive and below takeoff_threshold_g")
            ));
        }

        if d.takeoff_arm_fraction <= 0.0 || d.takeoff_arm_fraction > 1.0 {
            return Err(crate::error::AirtimeError::Config(
                toml::de::Error::custom("takeoff_arm_fraction must be between 0.0 and 1.0")
            ));
        }

        if d.min_airtime_s <= 0.0 || d.min_airtime_s > 2.0 {
            return Err(crate::error::AirtimeError::Config(
                toml::de::Error::custom("min_airtime_s must be between 0.0 and 2.0")
            ));
        }

        if d.max_airtime_s < d.min_airtime_s {
            return Err(crate::error::AirtimeError::Config(
                toml::de::Error::custom("max_airtime_s must be at least min_airtime_s")
            ));
        }

        if d.flight_timeout_s < d.max_airtime_s || d.flight_timeout_s > 30.0 {
            return Err(crate::error::AirtimeError::Config(
                toml::de::Error::custom("flight_timeout_s must be between max_airtime_s and 30.0")
            ));
        }

        if d.noise_reject_window_s <= 0.0 || d.noise_reject_window_s > 2.0 {
            return Err(crate::error::AirtimeError::Config(
                toml::de::Error::custom("noise_reject_window_s must be between 0.0 and 2.0")
            ));
        }

        if self.signal.sample_rate_hz < 10.0 || self.signal.sample_rate_hz > 240.0 {
            return Err(crate::error::AirtimeError::Config(
                toml::de::Error::custom("sample_rate_hz must be between 10.0 and 240.0")
            ));
        }

        if self.signal.peak_window == 0 || self.signal.peak_window > 100 {
            return Err(crate::error::AirtimeError::Config(
                toml::de::Error::custom("peak_window must be between 1 and 100")
            ));
        }

        if self.signal.display_seconds < 1.0 || self.signal.display_seconds > 30.0 {
            return Err(crate::error::AirtimeError::Config(
                toml::de::Error::custom("display_seconds must be between 1.0 and 30.0")
            ));
        }

        if self.session.recent_jumps == 0 || self.session.recent_jumps > 200 {
            return Err(crate::error::AirtimeError::Config(
                toml::de::Error::custom("recent_jumps must be between 1 and 200")
            ));
        }

        if self.telemetry.enabled && self.telemetry.log_dir.is_empty() {
            return Err(crate::error::AirtimeError::Config(
                toml::de::Error::custom("telemetry log_dir cannot be empty when enabled")
            ));
        }

        if self.telemetry.batch_seconds <= 0.0 || self.telemetry.batch_seconds > 600.0 {
            return Err(crate::error::AirtimeError::Config(
                toml::de::Error::custom("batch_seconds must be between 0.0 and 600.0")
            ));
        }

        if self.telemetry.format != "csv" && self.telemetry.format != "jsonl" {
            return Err(crate::error::AirtimeError::Config(
                toml::de::Error::custom("log format must be 'csv' or 'jsonl'")
            ));
        }

        Ok(())
    }

    /// Live-display buffer capacity in samples, derived from the signal
    /// configuration.
    #[must_use]
    pub fn display_capacity(&self) -> usize {
        (self.signal.sample_rate_hz * self.signal.display_seconds).round() as usize
    }

    /// Raw-sample batch size in rows, derived from the telemetry and
    /// signal configuration.
    #[must_use]
    pub fn batch_capacity(&self) -> usize {
        (self.signal.sample_rate_hz * self.telemetry.batch_seconds).round() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_phone_profile_is_valid() {
        let config = Config {
            detection: DetectionConfig::phone(),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.detection.strategy, DetectionStrategy::Altimeter);
    }

    #[test]
    fn test_watch_profile_defaults() {
        let d = DetectionConfig::watch();
        assert_eq!(d.takeoff_threshold_g, 1.5);
        assert_eq!(d.landing_threshold_g, 2.5);
        assert_eq!(d.freefall_ceiling_g, 0.4);
        assert_eq!(d.min_airtime_s, 0.2);
        assert_eq!(d.flight_timeout_s, 5.0);
        assert_eq!(d.strategy, DetectionStrategy::Inertial);
    }

    #[test]
    fn test_phone_profile_thresholds() {
        let d = DetectionConfig::phone();
        assert_eq!(d.takeoff_threshold_g, 0.3);
        assert_eq!(d.landing_threshold_g, 0.4);
        assert!(d.flight_timeout_s > DetectionConfig::watch().flight_timeout_s);
    }

    #[test]
    fn test_load_config_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let toml_content = r#"
[detection]
takeoff_threshold_g = 1.2

[signal]

[session]

[telemetry]
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.detection.takeoff_threshold_g, 1.2);
        // Unset fields fall back to defaults.
        assert_eq!(config.detection.landing_threshold_g, 2.5);
    }

    #[test]
    fn test_load_strategy_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let toml_content = r#"
[detection]
strategy = "altimeter"
takeoff_threshold_g = 0.3
landing_threshold_g = 0.4
freefall_ceiling_g = 0.15
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.detection.strategy, DetectionStrategy::Altimeter);
    }

    #[test]
    fn test_takeoff_threshold_zero() {
        let mut config = Config::default();
        config.detection.takeoff_threshold_g = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_takeoff_threshold_too_high() {
        let mut config = Config::default();
        config.detection.takeoff_threshold_g = 10.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_landing_threshold_zero() {
        let mut config = Config::default();
        config.detection.landing_threshold_g = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_freefall_ceiling_above_takeoff() {
        let mut config = Config::default();
        config.detection.freefall_ceiling_g = 2.0; // above takeoff 1.5
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_arm_fraction_above_one() {
        let mut config = Config::default();
        config.detection.takeoff_arm_fraction = 1.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_min_airtime_zero() {
        let mut config = Config::default();
        config.detection.min_airtime_s = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_max_airtime_below_min() {
        let mut config = Config::default();
        config.detection.max_airtime_s = 0.1; // min is 0.2
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_flight_timeout_below_max_airtime() {
        let mut config = Config::default();
        config.detection.flight_timeout_s = 3.0; // max_airtime is 5.0
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sample_rate_too_low() {
        let mut config = Config::default();
        config.signal.sample_rate_hz = 5.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_peak_window_zero() {
        let mut config = Config::default();
        config.signal.peak_window = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_recent_jumps_zero() {
        let mut config = Config::default();
        config.session.recent_jumps = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_log_dir_when_enabled() {
        let mut config = Config::default();
        config.telemetry.enabled = true;
        config.telemetry.log_dir = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_log_dir_when_disabled() {
        let mut config = Config::default();
        config.telemetry.enabled = false;
        config.telemetry.log_dir = String::new();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_batch_seconds_zero() {
        let mut config = Config::default();
        config.telemetry.batch_seconds = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_format() {
        let mut config = Config::default();
        config.telemetry.format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_jsonl_format_is_valid() {
        let mut config = Config::default();
        config.telemetry.format = "jsonl".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_display_capacity() {
        let config = Config::default();
        // 50 Hz * 4 s
        assert_eq!(config.display_capacity(), 200);
    }

    #[test]
    fn test_batch_capacity() {
        let config = Config::default();
        // 50 Hz * 60 s
        assert_eq!(config.batch_capacity(), 3000);
    }
}
