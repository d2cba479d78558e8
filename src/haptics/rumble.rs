//! # Rumble Scheduler
//!
//! Starts a timed pulse on one side of the gamepad and clears it once its
//! duration has elapsed. Only one pulse is tracked at a time; starting a new
//! one replaces the running timer and silences the other side.

use std::time::{Duration, Instant};

use tracing::debug;

use super::RumbleSide;
use crate::hal::HapticSink;

/// A running rumble pulse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RumbleEvent {
    pub side: RumbleSide,
    pub intensity: f32,
    pub started_at: Instant,
    pub duration: Duration,
}

/// Timed haptic feedback.
#[derive(Debug, Clone)]
pub struct RumbleScheduler {
    default_duration: Duration,
    default_intensity: f32,
    active: Option<RumbleEvent>,
}

impl RumbleScheduler {
    /// Creates an idle scheduler.
    #[must_use]
    pub fn new(default_duration: Duration, default_intensity: f32) -> Self {
        Self {
            default_duration,
            default_intensity: default_intensity.clamp(0.0, 1.0),
            active: None,
        }
    }

    /// The running pulse, if any.
    #[must_use]
    pub fn active(&self) -> Option<&RumbleEvent> {
        self.active.as_ref()
    }

    /// Requested intensity on `side` right now.
    #[must_use]
    pub fn intensity(&self, side: RumbleSide) -> f32 {
        match self.active {
            Some(event) if event.side == side => event.intensity,
            _ => 0.0,
        }
    }

    /// Signals a toggle transition with the default pulse on the side mapped
    /// to the toggle's new value.
    pub fn signal_toggle<H: HapticSink + ?Sized>(&mut self, value: bool, now: Instant, sink: &mut H) {
        self.pulse(
            RumbleSide::for_value(value),
            self.default_intensity,
            None,
            now,
            sink,
        );
    }

    /// Starts a pulse, replacing any running one.
    ///
    /// `duration` falls back to the scheduler's default when `None`.
    pub fn pulse<H: HapticSink + ?Sized>(
        &mut self,
        side: RumbleSide,
        intensity: f32,
        duration: Option<Duration>,
        now: Instant,
        sink: &mut H,
    ) {
        let intensity = intensity.clamp(0.0, 1.0);

        if self.active.is_some_and(|previous| previous.side != side) {
            sink.set_pulse(side.opposite(), 0.0);
        }

        sink.set_pulse(side, intensity);
        self.active = Some(RumbleEvent {
            side,
            intensity,
            started_at: now,
            duration: duration.unwrap_or(self.default_duration),
        });
        debug!("Rumble {:?} at {:.2}", side, intensity);
    }

    /// Clears the running pulse once its duration has elapsed.
    pub fn tick<H: HapticSink + ?Sized>(&mut self, now: Instant, sink: &mut H) {
        let expired = self
            .active
            .is_some_and(|event| now.saturating_duration_since(event.started_at) >= event.duration);

        if expired {
            self.silence(sink);
        }
    }

    /// Zeroes both sides and drops any running pulse.
    pub fn silence<H: HapticSink + ?Sized>(&mut self, sink: &mut H) {
        sink.set_pulse(RumbleSide::Left, 0.0);
        sink.set_pulse(RumbleSide::Right, 0.0);
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::mocks::RecordingHaptics;
    use crate::hal::MockHapticSink;
    use mockall::predicate::eq;

    fn scheduler() -> RumbleScheduler {
        RumbleScheduler::new(Duration::from_millis(150), 1.0)
    }

    #[test]
    fn test_toggle_value_picks_side() {
        let mut s = scheduler();
        let mut sink = RecordingHaptics::default();
        let now = Instant::now();

        s.signal_toggle(true, now, &mut sink);
        assert_eq!(s.intensity(RumbleSide::Right), 1.0);
        assert_eq!(s.intensity(RumbleSide::Left), 0.0);

        s.signal_toggle(false, now, &mut sink);
        assert_eq!(s.intensity(RumbleSide::Left), 1.0);
        assert_eq!(s.intensity(RumbleSide::Right), 0.0);
        assert_eq!(sink.last_for(RumbleSide::Right), Some(0.0));
    }

    #[test]
    fn test_pulse_clears_after_duration() {
        let mut s = scheduler();
        let mut sink = RecordingHaptics::default();
        let t0 = Instant::now();

        s.signal_toggle(true, t0, &mut sink);
        s.tick(t0 + Duration::from_millis(100), &mut sink);
        assert_eq!(s.intensity(RumbleSide::Right), 1.0);

        s.tick(t0 + Duration::from_millis(151), &mut sink);
        assert!(s.active().is_none());
        assert_eq!(s.intensity(RumbleSide::Left), 0.0);
        assert_eq!(s.intensity(RumbleSide::Right), 0.0);
        assert_eq!(sink.last_for(RumbleSide::Left), Some(0.0));
        assert_eq!(sink.last_for(RumbleSide::Right), Some(0.0));
    }

    #[test]
    fn test_new_pulse_restarts_timer() {
        let mut s = scheduler();
        let mut sink = RecordingHaptics::default();
        let t0 = Instant::now();

        s.signal_toggle(true, t0, &mut sink);
        s.signal_toggle(true, t0 + Duration::from_millis(100), &mut sink);
        s.tick(t0 + Duration::from_millis(200), &mut sink);
        assert_eq!(s.intensity(RumbleSide::Right), 1.0);

        s.tick(t0 + Duration::from_millis(260), &mut sink);
        assert!(s.active().is_none());
    }

    #[test]
    fn test_duration_override() {
        let mut s = scheduler();
        let mut sink = RecordingHaptics::default();
        let t0 = Instant::now();

        s.pulse(RumbleSide::Left, 0.5, Some(Duration::from_millis(500)), t0, &mut sink);
        s.tick(t0 + Duration::from_millis(300), &mut sink);
        assert_eq!(s.intensity(RumbleSide::Left), 0.5);
        s.tick(t0 + Duration::from_millis(500), &mut sink);
        assert_eq!(s.intensity(RumbleSide::Left), 0.0);
    }

    #[test]
    fn test_idle_tick_does_not_touch_sink() {
        let mut s = scheduler();
        let mut sink = MockHapticSink::new();
        sink.expect_set_pulse().never();
        s.tick(Instant::now(), &mut sink);
    }

    #[test]
    fn test_expiry_zeroes_both_sides_once() {
        let mut s = scheduler();
        let mut sink = MockHapticSink::new();
        let t0 = Instant::now();

        sink.expect_set_pulse()
            .with(eq(RumbleSide::Right), eq(1.0))
            .times(1)
            .return_const(());
        sink.expect_set_pulse()
            .with(eq(RumbleSide::Left), eq(0.0))
            .times(1)
            .return_const(());
        sink.expect_set_pulse()
            .with(eq(RumbleSide::Right), eq(0.0))
            .times(1)
            .return_const(());

        s.signal_toggle(true, t0, &mut sink);
        s.tick(t0 + Duration::from_millis(200), &mut sink);
        s.tick(t0 + Duration::from_millis(400), &mut sink);
    }

    #[test]
    fn test_intensity_is_clamped() {
        let mut s = scheduler();
        let mut sink = RecordingHaptics::default();
        s.pulse(RumbleSide::Left, 3.0, None, Instant::now(), &mut sink);
        assert_eq!(s.intensity(RumbleSide::Left), 1.0);
    }
}
