//! # Drive Module
//!
//! Turns conditioned stick values into drivetrain speeds.
//!
//! This module handles:
//! - Reverse, wheel-lock and precision mixing ([`mixer`])
//! - Gyro straight-line correction ([`heading`])
//! - Acceleration limiting and low-speed deadband ([`ramp`])

pub mod heading;
pub mod mixer;
pub mod ramp;

/// Left/right drivetrain command, each side in `[-1, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WheelCommand {
    pub left: f32,
    pub right: f32,
}

impl WheelCommand {
    /// Both sides stopped.
    pub const ZERO: WheelCommand = WheelCommand { left: 0.0, right: 0.0 };

    /// Creates a command, clamping both sides to `[-1, 1]`.
    #[must_use]
    pub fn new(left: f32, right: f32) -> Self {
        Self {
            left: left.clamp(-1.0, 1.0),
            right: right.clamp(-1.0, 1.0),
        }
    }

    /// Whether both sides are zero.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.left == 0.0 && self.right == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps() {
        let cmd = WheelCommand::new(1.5, -2.0);
        assert_eq!(cmd, WheelCommand { left: 1.0, right: -1.0 });
    }

    #[test]
    fn test_is_stopped() {
        assert!(WheelCommand::ZERO.is_stopped());
        assert!(!WheelCommand::new(0.0, 0.1).is_stopped());
    }
}
