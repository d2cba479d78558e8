//! # Heading Lock
//!
//! Keeps straight commanded motion on a fixed bearing.
//!
//! When the left and right targets are equal (and non-zero) the current gyro
//! heading is captured as the anchor. On later ticks, if the heading has
//! drifted past the margin, a fixed increment is added to the wheel that
//! turns the robot back: clockwise drift raises the right wheel,
//! counter-clockwise drift raises the left. The anchor is dropped the moment
//! the targets diverge.
//!
//! The correction is a fixed step, not a proportional term, and it is
//! applied before the acceleration ramp; at low speed the step can overshoot.
//!
//! Headings are degrees, clockwise-positive. Without a heading reading the
//! lock does nothing.

use tracing::debug;

use super::WheelCommand;

/// Gyro-based straight-line correction.
#[derive(Debug, Clone)]
pub struct HeadingLock {
    margin_deg: f32,
    correction: f32,
    anchor: Option<f32>,
    bias: WheelCommand,
}

impl HeadingLock {
    /// Creates a heading lock with no anchor.
    ///
    /// # Arguments
    ///
    /// * `margin_deg` - Drift tolerated before correcting (degrees)
    /// * `correction` - Speed added to the correcting wheel per tick
    #[must_use]
    pub fn new(margin_deg: f32, correction: f32) -> Self {
        Self {
            margin_deg: margin_deg.abs(),
            correction: correction.abs(),
            anchor: None,
            bias: WheelCommand::ZERO,
        }
    }

    /// Captured heading, if any.
    #[must_use]
    pub fn anchor(&self) -> Option<f32> {
        self.anchor
    }

    /// Bias added on the most recent [`apply`](Self::apply).
    #[must_use]
    pub fn bias(&self) -> WheelCommand {
        self.bias
    }

    /// Corrects `target` for heading drift.
    ///
    /// # Arguments
    ///
    /// * `target` - Mixed wheel targets for this tick
    /// * `heading` - Current heading, or `None` when the sensor is unavailable
    ///
    /// # Returns
    ///
    /// The targets with this tick's bias added, clamped to `[-1, 1]`.
    pub fn apply(&mut self, target: WheelCommand, heading: Option<f32>) -> WheelCommand {
        self.bias = WheelCommand::ZERO;

        let straight = target.left == target.right && target.left != 0.0;
        let heading = match heading {
            Some(h) if straight && h.is_finite() => h,
            _ => {
                if self.anchor.take().is_some() {
                    debug!("Heading anchor released");
                }
                return target;
            }
        };

        let anchor = *self.anchor.get_or_insert_with(|| {
            debug!("Heading anchor captured at {:.1}°", heading);
            heading
        });

        let drift = wrap_degrees(heading - anchor);
        if drift > self.margin_deg {
            self.bias.right = self.correction;
        } else if drift < -self.margin_deg {
            self.bias.left = self.correction;
        }

        WheelCommand::new(target.left + self.bias.left, target.right + self.bias.right)
    }

    /// Drops the anchor and clears the bias.
    pub fn reset(&mut self) {
        self.anchor = None;
        self.bias = WheelCommand::ZERO;
    }
}

/// Wraps an angle difference into `(-180, 180]`.
#[must_use]
pub fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight(speed: f32) -> WheelCommand {
        WheelCommand::new(speed, speed)
    }

    #[test]
    fn test_wrap_degrees() {
        assert!((wrap_degrees(10.0) - 10.0).abs() < 1e-4);
        assert!((wrap_degrees(350.0) + 10.0).abs() < 1e-4);
        assert!((wrap_degrees(-350.0) - 10.0).abs() < 1e-4);
        assert!((wrap_degrees(180.0) - 180.0).abs() < 1e-4);
        assert!((wrap_degrees(-180.0) - 180.0).abs() < 1e-4);
    }

    #[test]
    fn test_captures_anchor_once() {
        let mut lock = HeadingLock::new(2.0, 0.05);
        lock.apply(straight(0.5), Some(10.0));
        assert_eq!(lock.anchor(), Some(10.0));
        lock.apply(straight(0.5), Some(11.0));
        assert_eq!(lock.anchor(), Some(10.0));
    }

    #[test]
    fn test_no_bias_within_margin() {
        let mut lock = HeadingLock::new(2.0, 0.05);
        lock.apply(straight(0.5), Some(0.0));
        let out = lock.apply(straight(0.5), Some(1.5));
        assert_eq!(out, straight(0.5));
        assert_eq!(lock.bias(), WheelCommand::ZERO);
    }

    #[test]
    fn test_constant_drift_biases_one_direction() {
        let mut lock = HeadingLock::new(2.0, 0.05);
        lock.apply(straight(0.5), Some(0.0));

        let mut heading = 0.0;
        for _ in 0..10 {
            heading += 1.0;
            let out = lock.apply(straight(0.5), Some(heading));
            if heading > 2.0 {
                assert!((out.right - 0.55).abs() < 1e-6);
                assert!((out.left - 0.5).abs() < 1e-6);
                assert_eq!(lock.bias().left, 0.0);
            }
        }

        // Targets diverge: bias is gone on the very next tick
        let out = lock.apply(WheelCommand::new(0.5, 0.2), Some(heading + 1.0));
        assert_eq!(out, WheelCommand::new(0.5, 0.2));
        assert_eq!(lock.bias(), WheelCommand::ZERO);
        assert_eq!(lock.anchor(), None);
    }

    #[test]
    fn test_counter_clockwise_drift_raises_left() {
        let mut lock = HeadingLock::new(2.0, 0.05);
        lock.apply(straight(0.5), Some(0.0));
        let out = lock.apply(straight(0.5), Some(-5.0));
        assert!((out.left - 0.55).abs() < 1e-6);
        assert!((out.right - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_drift_across_wraparound() {
        let mut lock = HeadingLock::new(2.0, 0.05);
        lock.apply(straight(0.5), Some(359.0));
        // 359 -> 5 is +6 degrees clockwise
        let out = lock.apply(straight(0.5), Some(5.0));
        assert!((out.right - 0.55).abs() < 1e-6);
    }

    #[test]
    fn test_reanchors_after_divergence() {
        let mut lock = HeadingLock::new(2.0, 0.05);
        lock.apply(straight(0.5), Some(0.0));
        lock.apply(WheelCommand::new(0.5, 0.0), Some(30.0));
        lock.apply(straight(0.5), Some(45.0));
        assert_eq!(lock.anchor(), Some(45.0));
    }

    #[test]
    fn test_missing_heading_is_noop() {
        let mut lock = HeadingLock::new(2.0, 0.05);
        let out = lock.apply(straight(0.5), None);
        assert_eq!(out, straight(0.5));
        assert_eq!(lock.anchor(), None);
    }

    #[test]
    fn test_stopped_targets_do_not_anchor() {
        let mut lock = HeadingLock::new(2.0, 0.05);
        let out = lock.apply(WheelCommand::ZERO, Some(20.0));
        assert_eq!(out, WheelCommand::ZERO);
        assert_eq!(lock.anchor(), None);
    }

    #[test]
    fn test_bias_output_is_clamped() {
        let mut lock = HeadingLock::new(1.0, 0.2);
        lock.apply(straight(1.0), Some(0.0));
        let out = lock.apply(straight(1.0), Some(10.0));
        assert_eq!(out.right, 1.0);
    }

    #[test]
    fn test_reset_clears_anchor() {
        let mut lock = HeadingLock::new(2.0, 0.05);
        lock.apply(straight(0.5), Some(0.0));
        lock.apply(straight(0.5), Some(10.0));
        lock.reset();
        assert_eq!(lock.anchor(), None);
        assert_eq!(lock.bias(), WheelCommand::ZERO);
    }
}
