//! # Error Types
//!
//! Custom error types for Airtime using `thiserror`.
//!
//! Note that rejected jump candidates, noise resets, and malformed sample
//! timing are *not* errors — the detection path handles those internally
//! (see the detector module). Errors here cover the edges of the system:
//! configuration, telemetry persistence, and session replay input.

use thiserror::Error;

/// Main error type for Airtime
#[derive(Debug, Error)]
pub enum AirtimeError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Telemetry persistence errors
    #[error("Telemetry error: {0}")]
    Telemetry(String),

    /// Session replay input errors
    #[error("Replay error: {0}")]
    Replay(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Airtime
pub type Result<T> = std::result::Result<T, AirtimeError>;
