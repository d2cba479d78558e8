//! # Console Collaborators
//!
//! Stand-ins for hardware the host machine does not have. Actuator and rumble
//! commands are written to the log; the heading sensor is always absent. The
//! gamepad itself is real and reaches the loop through [`WatchInput`].

use tokio::sync::watch;
use tracing::{debug, info};

use super::{ActuatorSink, AuxChannel, HapticSink, HeadingSensor, InputSource};
use crate::controller::mapper::GamepadState;
use crate::error::{Result, TeleopError};
use crate::haptics::RumbleSide;

/// Input source fed by a background evdev reader.
///
/// Holds one snapshot per tick; call [`refresh`](Self::refresh) before each
/// tick so every channel in a tick comes from the same snapshot.
#[derive(Debug)]
pub struct WatchInput {
    rx: watch::Receiver<GamepadState>,
    snapshot: GamepadState,
    connected: bool,
}

impl WatchInput {
    #[must_use]
    pub fn new(rx: watch::Receiver<GamepadState>) -> Self {
        let snapshot = *rx.borrow();
        Self {
            rx,
            snapshot,
            connected: true,
        }
    }

    /// Takes the latest snapshot from the reader.
    ///
    /// Once the reader has gone away the snapshot falls back to centered
    /// sticks and released buttons.
    ///
    /// # Returns
    ///
    /// Whether the reader is still running.
    pub fn refresh(&mut self) -> bool {
        let connected = self.rx.has_changed().is_ok();
        if connected {
            self.snapshot = *self.rx.borrow_and_update();
        } else {
            if self.connected {
                info!("Gamepad reader stopped; inputs released");
            }
            self.snapshot = GamepadState::default();
        }
        self.connected = connected;
        connected
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

impl InputSource for WatchInput {
    fn axis(&self, index: usize) -> Option<f32> {
        self.snapshot.axis(index)
    }

    fn button(&self, index: usize) -> Option<bool> {
        self.snapshot.button(index)
    }

    fn pov(&self) -> Option<u16> {
        self.snapshot.pov()
    }

    fn axis_count(&self) -> usize {
        self.snapshot.axis_count()
    }

    fn button_count(&self) -> usize {
        self.snapshot.button_count()
    }
}

/// Actuator sink that logs commands instead of driving motors.
///
/// Only changes are logged, at debug level.
#[derive(Debug, Default)]
pub struct ConsoleActuators {
    wheels: (f32, f32),
    aux: [f32; 3],
}

impl ConsoleActuators {
    /// Last commanded wheel speeds.
    #[must_use]
    pub fn wheels(&self) -> (f32, f32) {
        self.wheels
    }

    /// Last commanded value for `channel`.
    #[must_use]
    pub fn auxiliary(&self, channel: AuxChannel) -> f32 {
        self.aux[aux_slot(channel)]
    }
}

fn aux_slot(channel: AuxChannel) -> usize {
    match channel {
        AuxChannel::Lift => 0,
        AuxChannel::Arm => 1,
        AuxChannel::Winch => 2,
    }
}

impl ActuatorSink for ConsoleActuators {
    fn set_wheel_speeds(&mut self, left: f32, right: f32) {
        let wheels = (left.clamp(-1.0, 1.0), right.clamp(-1.0, 1.0));
        if wheels != self.wheels {
            debug!("Wheels: left={:+.3} right={:+.3}", wheels.0, wheels.1);
            self.wheels = wheels;
        }
    }

    fn set_auxiliary(&mut self, channel: AuxChannel, value: f32) -> Result<()> {
        let value = value.clamp(-1.0, 1.0);
        let slot = &mut self.aux[aux_slot(channel)];
        if *slot != value {
            debug!("{}: {:+.3}", channel.name(), value);
            *slot = value;
        }
        Ok(())
    }

    fn stop_motor(&mut self) {
        self.wheels = (0.0, 0.0);
        self.aux = [0.0; 3];
        info!("All outputs stopped");
    }
}

/// Haptic sink that logs pulses.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleHaptics;

impl HapticSink for ConsoleHaptics {
    fn set_pulse(&mut self, side: RumbleSide, intensity: f32) {
        debug!("Rumble {:?}: {:.2}", side, intensity);
    }
}

/// Heading sensor for machines without a gyro.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHeadingSensor;

impl HeadingSensor for NoHeadingSensor {
    fn heading(&self) -> Option<f32> {
        None
    }

    fn calibrate(&mut self) -> Result<()> {
        Err(TeleopError::HeadingCalibration(
            "no heading sensor attached".to_string(),
        ))
    }
}
