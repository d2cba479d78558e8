//! # Error Types
//!
//! Custom error types for Drive Teleop using `thiserror`.

use thiserror::Error;

/// Main error type for Drive Teleop
#[derive(Debug, Error)]
pub enum TeleopError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Gamepad discovery or read errors
    #[error("Controller error: {0}")]
    Controller(String),

    /// No usable gamepad was found
    #[error("No gamepad found under /dev/input")]
    ControllerNotFound,

    /// A configured binding points past what the input source reports
    #[error("{kind} index {index} is out of range (input source reports {available})")]
    ChannelOutOfRange {
        kind: &'static str,
        index: usize,
        available: usize,
    },

    /// Heading sensor could not be calibrated
    #[error("Heading sensor calibration failed: {0}")]
    HeadingCalibration(String),

    /// An actuator rejected a command
    #[error("Actuator error: {0}")]
    Actuator(String),
}

/// Result type alias for Drive Teleop
pub type Result<T> = std::result::Result<T, TeleopError>;
