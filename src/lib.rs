//! # Airtime
//!
//! Real-time jump detection for board sports from phone or watch motion
//! sensors: airtime, rotation, and landing impact from the IMU stream,
//! with optional barometric altitude assistance.
//!
//! The pipeline is a pure function of the sample stream. [`engine::JumpEngine`]
//! drives conditioning, altitude/yaw integration, the three-state
//! detector, event building, and session aggregation; [`replay`] re-runs
//! recorded logs through the identical pipeline for offline tuning.

pub mod config;
pub mod detector;
pub mod engine;
pub mod error;
pub mod event;
pub mod integrator;
pub mod replay;
pub mod sample;
pub mod session;
pub mod signal;
pub mod telemetry;

pub use config::{Config, DetectionConfig, DetectionStrategy};
pub use engine::JumpEngine;
pub use error::{AirtimeError, Result};
pub use event::JumpEvent;
pub use sample::SensorSample;
