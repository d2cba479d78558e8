//! # Motion Ramp
//!
//! Acceleration-limited smoothing of wheel speeds across ticks.
//!
//! Each tick the speed on each side moves toward its target by at most
//! `acceleration * elapsed_seconds`. Two cases jump instead of ramping:
//!
//! - **Snap**: when the remaining gap is already below the snap threshold the
//!   side goes straight to its target.
//! - **Low-speed deadband**: a result strictly between 0 and the minimum
//!   speed is not sent to the motors, which stall there. A side heading toward
//!   (or through) zero snaps to 0; a side accelerating away from zero snaps to
//!   the minimum speed. A target below the minimum speed resolves to 0.
//!
//! The first tick after a reset only records the timestamp.

use std::time::Instant;

use super::WheelCommand;

/// Ramp state: current speeds plus the previous tick time.
#[derive(Debug, Clone)]
pub struct MotionRamp {
    acceleration: f32,
    snap_threshold: f32,
    min_speed: f32,
    current: WheelCommand,
    last_tick: Option<Instant>,
}

impl MotionRamp {
    /// Creates a ramp at rest.
    ///
    /// # Arguments
    ///
    /// * `acceleration` - Maximum speed change per second
    /// * `snap_threshold` - Gap below which a side jumps to its target
    /// * `min_speed` - Smallest non-zero speed sent to the motors
    #[must_use]
    pub fn new(acceleration: f32, snap_threshold: f32, min_speed: f32) -> Self {
        Self {
            acceleration: acceleration.abs(),
            snap_threshold: snap_threshold.abs(),
            min_speed: min_speed.abs(),
            current: WheelCommand::ZERO,
            last_tick: None,
        }
    }

    /// Speeds sent on the most recent tick.
    #[must_use]
    pub fn current(&self) -> WheelCommand {
        self.current
    }

    /// Time of the most recent tick.
    #[must_use]
    pub fn last_tick(&self) -> Option<Instant> {
        self.last_tick
    }

    /// Advances the ramp one tick toward `target`.
    pub fn step(&mut self, target: WheelCommand, now: Instant) -> WheelCommand {
        let elapsed = self
            .last_tick
            .map_or(0.0, |last| now.saturating_duration_since(last).as_secs_f32());
        self.last_tick = Some(now);

        let max_delta = self.acceleration * elapsed;
        self.current = WheelCommand::new(
            self.approach(self.current.left, target.left, max_delta),
            self.approach(self.current.right, target.right, max_delta),
        );
        self.current
    }

    /// Returns to rest and forgets the tick time.
    pub fn reset(&mut self) {
        self.current = WheelCommand::ZERO;
        self.last_tick = None;
    }

    fn approach(&self, current: f32, target: f32, max_delta: f32) -> f32 {
        let gap = target - current;
        let next = if gap.abs() < self.snap_threshold {
            target
        } else {
            current + gap.clamp(-max_delta, max_delta)
        };
        self.apply_deadband(next, target)
    }

    fn apply_deadband(&self, next: f32, target: f32) -> f32 {
        if next == 0.0 || next.abs() >= self.min_speed {
            return next;
        }

        // Targets inside the deadband resolve to rest so a steady target
        // settles on one value.
        let accelerating_away = target.abs() >= self.min_speed
            && target.signum() == next.signum()
            && target.abs() > next.abs();
        if accelerating_away {
            self.min_speed.copysign(target)
        } else {
            0.0
        }
    }
}
