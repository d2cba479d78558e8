//! # Drive Mixer
//!
//! Applies the operator's drive modes to a left/right command pair.
//!
//! ## Stages
//!
//! 1. **Reverse**: both sides are negated, so "forward" on the sticks drives
//!    the robot's back end first.
//! 2. **Wheel lock**: when both sides are non-zero and their magnitudes differ
//!    by at most the lock threshold, both sides get the shared magnitude
//!    `min + (max - min) / 2`, each keeping its own sign.
//! 3. **Precision**: both sides are divided by the precision divisor.
//!
//! ## Usage
//!
//! ```
//! use drive_teleop::drive::WheelCommand;
//! use drive_teleop::drive::mixer::{DriveMixer, DriveModes};
//!
//! let mixer = DriveMixer::new(0.1, 2.0);
//! let modes = DriveModes { wheel_lock: true, ..DriveModes::default() };
//!
//! let out = mixer.mix(WheelCommand::new(0.5, 0.52), modes);
//! assert!((out.left - 0.51).abs() < 1e-6);
//! assert!((out.right - 0.51).abs() < 1e-6);
//! ```

use super::WheelCommand;

/// Mode flags that affect mixing this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriveModes {
    pub reversed: bool,
    pub wheel_lock: bool,
    pub precision: bool,
}

/// Stateless left/right mixer.
#[derive(Debug, Clone, Copy)]
pub struct DriveMixer {
    lock_threshold: f32,
    precision_divisor: f32,
}

impl Default for DriveMixer {
    fn default() -> Self {
        Self::new(0.1, 2.0)
    }
}

impl DriveMixer {
    /// Creates a mixer.
    ///
    /// A `precision_divisor` below 1 is raised to 1 so precision mode never
    /// speeds the robot up.
    #[must_use]
    pub fn new(lock_threshold: f32, precision_divisor: f32) -> Self {
        Self {
            lock_threshold: lock_threshold.max(0.0),
            precision_divisor: precision_divisor.max(1.0),
        }
    }

    /// Magnitude difference below which wheel lock engages.
    #[must_use]
    pub fn lock_threshold(&self) -> f32 {
        self.lock_threshold
    }

    /// Mixes one command pair.
    #[must_use]
    pub fn mix(&self, command: WheelCommand, modes: DriveModes) -> WheelCommand {
        let (mut left, mut right) = (command.left, command.right);

        if modes.reversed {
            left = -left;
            right = -right;
        }

        if modes.wheel_lock {
            if let Some(shared) = self.locked_magnitude(left, right) {
                left = shared.copysign(left);
                right = shared.copysign(right);
            }
        }

        if modes.precision {
            left /= self.precision_divisor;
            right /= self.precision_divisor;
        }

        WheelCommand::new(left, right)
    }

    /// Shared magnitude for a near-equal pair, or `None` when lock does not apply.
    fn locked_magnitude(&self, left: f32, right: f32) -> Option<f32> {
        if left == 0.0 || right == 0.0 {
            return None;
        }

        let (a, b) = (left.abs(), right.abs());
        if (a - b).abs() > self.lock_threshold {
            return None;
        }

        let slower = a.min(b);
        Some(slower + (a.max(b) - slower) / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locked() -> DriveModes {
        DriveModes {
            wheel_lock: true,
            ..DriveModes::default()
        }
    }

    #[test]
    fn test_passthrough_without_modes() {
        let mixer = DriveMixer::default();
        let out = mixer.mix(WheelCommand::new(0.3, -0.7), DriveModes::default());
        assert_eq!(out, WheelCommand::new(0.3, -0.7));
    }

    #[test]
    fn test_reverse_negates_both() {
        let mixer = DriveMixer::default();
        let modes = DriveModes {
            reversed: true,
            ..DriveModes::default()
        };
        let out = mixer.mix(WheelCommand::new(0.3, -0.7), modes);
        assert!((out.left + 0.3).abs() < 1e-6);
        assert!((out.right - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_wheel_lock_shares_magnitude() {
        let mixer = DriveMixer::new(0.1, 2.0);
        let out = mixer.mix(WheelCommand::new(0.5, 0.52), locked());
        assert!((out.left - 0.51).abs() < 1e-6);
        assert!((out.right - 0.51).abs() < 1e-6);
    }

    #[test]
    fn test_wheel_lock_preserves_signs() {
        let mixer = DriveMixer::new(0.1, 2.0);
        let out = mixer.mix(WheelCommand::new(-0.5, 0.52), locked());
        assert!((out.left + 0.51).abs() < 1e-6);
        assert!((out.right - 0.51).abs() < 1e-6);

        let out = mixer.mix(WheelCommand::new(-0.5, -0.52), locked());
        assert!((out.left + 0.51).abs() < 1e-6);
        assert!((out.right + 0.51).abs() < 1e-6);
    }

    #[test]
    fn test_wheel_lock_skips_wide_gap() {
        let mixer = DriveMixer::new(0.1, 2.0);
        let out = mixer.mix(WheelCommand::new(0.3, 0.6), locked());
        assert_eq!(out, WheelCommand::new(0.3, 0.6));
    }

    #[test]
    fn test_wheel_lock_skips_zero_side() {
        let mixer = DriveMixer::new(0.1, 2.0);
        let out = mixer.mix(WheelCommand::new(0.0, 0.05), locked());
        assert_eq!(out, WheelCommand::new(0.0, 0.05));
    }

    #[test]
    fn test_wheel_lock_disabled() {
        let mixer = DriveMixer::new(0.1, 2.0);
        let out = mixer.mix(WheelCommand::new(0.5, 0.52), DriveModes::default());
        assert_eq!(out, WheelCommand::new(0.5, 0.52));
    }

    #[test]
    fn test_reverse_then_lock() {
        let mixer = DriveMixer::new(0.1, 2.0);
        let modes = DriveModes {
            reversed: true,
            wheel_lock: true,
            precision: false,
        };
        let out = mixer.mix(WheelCommand::new(0.5, 0.52), modes);
        assert!((out.left + 0.51).abs() < 1e-6);
        assert!((out.right + 0.51).abs() < 1e-6);
    }

    #[test]
    fn test_precision_divides() {
        let mixer = DriveMixer::new(0.1, 2.0);
        let modes = DriveModes {
            precision: true,
            ..DriveModes::default()
        };
        let out = mixer.mix(WheelCommand::new(0.8, -0.4), modes);
        assert!((out.left - 0.4).abs() < 1e-6);
        assert!((out.right + 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_precision_divisor_floor() {
        let mixer = DriveMixer::new(0.1, 0.5);
        let modes = DriveModes {
            precision: true,
            ..DriveModes::default()
        };
        let out = mixer.mix(WheelCommand::new(0.8, 0.8), modes);
        assert!((out.left - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_output_stays_bounded() {
        let mixer = DriveMixer::new(0.5, 1.0);
        for l in [-1.0f32, -0.7, 0.0, 0.4, 1.0] {
            for r in [-1.0f32, -0.2, 0.0, 0.6, 1.0] {
                let out = mixer.mix(WheelCommand::new(l, r), locked());
                assert!(out.left.abs() <= 1.0 && out.right.abs() <= 1.0);
            }
        }
    }
}
