//! # Collaborator Interfaces
//!
//! Traits for everything the control loop talks to outside itself: the
//! operator's gamepad, the drivetrain and mechanism actuators, the gamepad's
//! rumble motors, and the heading sensor. Keeping them behind traits lets the
//! loop run against real hardware, the console sinks in [`console`], or
//! mocks in tests.

pub mod console;

use crate::error::Result;
use crate::haptics::RumbleSide;

/// Auxiliary mechanism channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuxChannel {
    Lift,
    Arm,
    Winch,
}

impl AuxChannel {
    /// Human-readable channel name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            AuxChannel::Lift => "lift",
            AuxChannel::Arm => "arm",
            AuxChannel::Winch => "winch",
        }
    }
}

/// Operator input device.
///
/// Every read is non-blocking and returns `None` for channels the device
/// does not have.
#[cfg_attr(test, mockall::automock)]
pub trait InputSource {
    /// Analog axis value in `[-1, 1]`.
    fn axis(&self, index: usize) -> Option<f32>;

    /// Button state.
    fn button(&self, index: usize) -> Option<bool>;

    /// Directional-pad angle in degrees, or `None` when released.
    fn pov(&self) -> Option<u16>;

    /// Number of axes the device reports.
    fn axis_count(&self) -> usize;

    /// Number of buttons the device reports.
    fn button_count(&self) -> usize;
}

/// Drivetrain and mechanism outputs.
#[cfg_attr(test, mockall::automock)]
pub trait ActuatorSink {
    /// Commands both drivetrain sides, each in `[-1, 1]`.
    fn set_wheel_speeds(&mut self, left: f32, right: f32);

    /// Commands one auxiliary mechanism. Out-of-range values are clamped by
    /// the sink.
    ///
    /// # Errors
    ///
    /// Returns [`TeleopError::Actuator`](crate::error::TeleopError::Actuator)
    /// when the mechanism rejects the command.
    fn set_auxiliary(&mut self, channel: AuxChannel, value: f32) -> Result<()>;

    /// Immediately zeroes every output. Idempotent.
    fn stop_motor(&mut self);
}

/// Gamepad rumble motors. Fire-and-forget.
#[cfg_attr(test, mockall::automock)]
pub trait HapticSink {
    /// Sets one side's rumble intensity in `[0, 1]`.
    fn set_pulse(&mut self, side: RumbleSide, intensity: f32);
}

/// Gyro heading source.
#[cfg_attr(test, mockall::automock)]
pub trait HeadingSensor {
    /// Current heading in degrees, clockwise-positive, or `None` when
    /// unavailable.
    fn heading(&self) -> Option<f32>;

    /// Calibrates the sensor. Blocks for several seconds on real hardware.
    ///
    /// # Errors
    ///
    /// Returns [`TeleopError::HeadingCalibration`](crate::error::TeleopError::HeadingCalibration)
    /// when the sensor is missing or calibration fails.
    fn calibrate(&mut self) -> Result<()>;
}

#[cfg(test)]
pub mod mocks {
    //! Recording fakes for tests that care about sequences rather than call counts.

    use super::*;

    /// Input device whose state is set directly by the test.
    #[derive(Debug, Clone)]
    pub struct FakeInput {
        pub axes: Vec<f32>,
        pub buttons: Vec<bool>,
        pub pov: Option<u16>,
    }

    impl FakeInput {
        pub fn new(axis_count: usize, button_count: usize) -> Self {
            Self {
                axes: vec![0.0; axis_count],
                buttons: vec![false; button_count],
                pov: None,
            }
        }
    }

    impl InputSource for FakeInput {
        fn axis(&self, index: usize) -> Option<f32> {
            self.axes.get(index).copied()
        }

        fn button(&self, index: usize) -> Option<bool> {
            self.buttons.get(index).copied()
        }

        fn pov(&self) -> Option<u16> {
            self.pov
        }

        fn axis_count(&self) -> usize {
            self.axes.len()
        }

        fn button_count(&self) -> usize {
            self.buttons.len()
        }
    }

    /// Actuator sink that records every command.
    #[derive(Debug, Default)]
    pub struct RecordingActuators {
        pub wheel_commands: Vec<(f32, f32)>,
        pub aux_commands: Vec<(AuxChannel, f32)>,
        pub stop_count: usize,
        pub failing_channel: Option<AuxChannel>,
    }

    impl RecordingActuators {
        pub fn last_wheels(&self) -> Option<(f32, f32)> {
            self.wheel_commands.last().copied()
        }

        pub fn last_aux(&self, channel: AuxChannel) -> Option<f32> {
            self.aux_commands
                .iter()
                .rev()
                .find(|(c, _)| *c == channel)
                .map(|(_, v)| *v)
        }
    }

    impl ActuatorSink for RecordingActuators {
        fn set_wheel_speeds(&mut self, left: f32, right: f32) {
            self.wheel_commands.push((left, right));
        }

        fn set_auxiliary(&mut self, channel: AuxChannel, value: f32) -> Result<()> {
            if self.failing_channel == Some(channel) {
                return Err(crate::error::TeleopError::Actuator(format!(
                    "{} jammed",
                    channel.name()
                )));
            }
            self.aux_commands.push((channel, value));
            Ok(())
        }

        fn stop_motor(&mut self) {
            self.stop_count += 1;
        }
    }

    /// Haptic sink that records every pulse.
    #[derive(Debug, Default)]
    pub struct RecordingHaptics {
        pub pulses: Vec<(RumbleSide, f32)>,
    }

    impl RecordingHaptics {
        pub fn last_for(&self, side: RumbleSide) -> Option<f32> {
            self.pulses
                .iter()
                .rev()
                .find(|(s, _)| *s == side)
                .map(|(_, v)| *v)
        }
    }

    impl HapticSink for RecordingHaptics {
        fn set_pulse(&mut self, side: RumbleSide, intensity: f32) {
            self.pulses.push((side, intensity));
        }
    }

    /// Heading sensor whose reading is set directly by the test.
    #[derive(Debug, Default)]
    pub struct FakeHeading {
        pub heading: Option<f32>,
        pub fail_calibration: bool,
        pub calibrations: usize,
    }

    impl HeadingSensor for FakeHeading {
        fn heading(&self) -> Option<f32> {
            self.heading
        }

        fn calibrate(&mut self) -> Result<()> {
            self.calibrations += 1;
            if self.fail_calibration {
                return Err(crate::error::TeleopError::HeadingCalibration(
                    "no gyro attached".to_string(),
                ));
            }
            Ok(())
        }
    }
}
