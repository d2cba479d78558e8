//! # Operator Control Loop
//!
//! Runs the full pipeline once per tick:
//!
//! 1. Read a [`RawSample`] from the input source
//! 2. Track press edges and flip toggles (with rumble feedback)
//! 3. Handle emergency stop and resume
//! 4. Condition the drive axes and mix them
//! 5. Apply heading lock, then the acceleration ramp
//! 6. Dispatch wheel speeds, then auxiliary mechanisms
//! 7. Advance the rumble scheduler
//!
//! Emergency stop takes precedence over everything else: while stopped no
//! drive or auxiliary commands are sent, and a resume pressed on the same
//! tick as a stop is ignored.
//!
//! ## Usage
//!
//! ```no_run
//! use std::time::Instant;
//! use drive_teleop::config::Config;
//! use drive_teleop::control::ControlLoop;
//! use drive_teleop::hal::console::{ConsoleActuators, ConsoleHaptics, NoHeadingSensor};
//! # use drive_teleop::controller::mapper::GamepadState;
//! # fn input() -> GamepadState { unimplemented!() }
//!
//! let config = Config::default();
//! let mut teleop = ControlLoop::new(
//!     &config,
//!     input(),
//!     ConsoleActuators::default(),
//!     ConsoleHaptics,
//!     NoHeadingSensor,
//! )?;
//!
//! teleop.init();
//! loop {
//!     teleop.periodic(Instant::now());
//! #   break;
//! }
//! # Ok::<(), drive_teleop::error::TeleopError>(())
//! ```

use std::time::Instant;

use tracing::{debug, info, warn};

use super::toggles::ToggleState;
use crate::config::Config;
use crate::controller::axis::{AxisConditioner, SpeedEnhancer};
use crate::controller::buttons::ButtonEdgeTracker;
use crate::controller::sample::{validate_bindings, AxisBindings, AxisChannel, Control, RawSample};
use crate::drive::heading::HeadingLock;
use crate::drive::mixer::{DriveMixer, DriveModes};
use crate::drive::ramp::MotionRamp;
use crate::drive::WheelCommand;
use crate::error::Result;
use crate::hal::{ActuatorSink, AuxChannel, HapticSink, HeadingSensor, InputSource};
use crate::haptics::rumble::RumbleScheduler;

/// Auxiliary channels, in dispatch order.
const AUX_CHANNELS: [AuxChannel; 3] = [AuxChannel::Lift, AuxChannel::Arm, AuxChannel::Winch];

/// Operator-control loop.
///
/// Owns every piece of per-session state; nothing here is shared or touched
/// outside [`init`](Self::init), [`periodic`](Self::periodic) and the explicit
/// stop/resume/disable transitions.
pub struct ControlLoop<I, A, H, G> {
    input: I,
    actuators: A,
    haptics: H,
    heading_sensor: G,

    axis_bindings: AxisBindings,
    conditioners: [AxisConditioner; AxisChannel::COUNT],
    tracker: ButtonEdgeTracker,
    toggles: ToggleState,
    enhancer: SpeedEnhancer,
    mixer: DriveMixer,
    heading_lock: HeadingLock,
    ramp: MotionRamp,
    rumble: RumbleScheduler,

    enhancer_step: f32,
    winch_speed: f32,
    heading_enabled: bool,
    heading_ready: bool,
    stopped: bool,
    aux_faulted: [bool; AUX_CHANNELS.len()],
}

impl<I, A, H, G> std::fmt::Debug for ControlLoop<I, A, H, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlLoop")
            .field("toggles", &self.toggles)
            .field("enhancer", &self.enhancer)
            .field("ramp", &self.ramp)
            .field("stopped", &self.stopped)
            .finish_non_exhaustive()
    }
}

impl<I, A, H, G> ControlLoop<I, A, H, G>
where
    I: InputSource,
    A: ActuatorSink,
    H: HapticSink,
    G: HeadingSensor,
{
    /// Builds the loop from configuration.
    ///
    /// Validates every binding against the input source's reported channel
    /// counts; this is the only time channels are checked.
    ///
    /// # Errors
    ///
    /// Returns [`TeleopError::ChannelOutOfRange`](crate::error::TeleopError::ChannelOutOfRange)
    /// if a binding points past what the input source reports.
    pub fn new(config: &Config, input: I, actuators: A, haptics: H, heading_sensor: G) -> Result<Self> {
        let axis_bindings = config.axes.bindings();
        let controls = config.bindings.controls();
        validate_bindings(&input, &axis_bindings, &controls)?;

        let conditioners =
            AxisChannel::ALL.map(|c| AxisConditioner::new(config.axes.channel(c).axis_config()));

        Ok(Self {
            input,
            actuators,
            haptics,
            heading_sensor,
            axis_bindings,
            conditioners,
            tracker: ButtonEdgeTracker::new(controls),
            toggles: ToggleState::default(),
            enhancer: SpeedEnhancer::default(),
            mixer: DriveMixer::new(config.drive.lock_threshold, config.drive.precision_divisor),
            heading_lock: HeadingLock::new(config.heading.margin_deg, config.heading.correction),
            ramp: MotionRamp::new(
                config.drive.acceleration,
                config.drive.lock_threshold,
                config.drive.min_speed,
            ),
            rumble: RumbleScheduler::new(config.rumble.duration(), config.rumble.intensity),
            enhancer_step: config.drive.enhancer_step,
            winch_speed: config.auxiliary.winch_speed,
            heading_enabled: config.heading.enabled,
            heading_ready: false,
            stopped: false,
            aux_faulted: [false; AUX_CHANNELS.len()],
        })
    }

    /// Mode entry.
    ///
    /// Resets all state to defaults and calibrates the heading sensor. Safe to
    /// call more than once. A failed calibration leaves heading lock disabled
    /// for the session.
    pub fn init(&mut self) {
        self.reset_motion();
        self.toggles.reset();
        self.tracker.reset();
        self.enhancer.reset();
        self.stopped = false;
        self.aux_faulted = [false; AUX_CHANNELS.len()];
        self.rumble.silence(&mut self.haptics);

        self.heading_ready = false;
        if self.heading_enabled {
            info!("Calibrating heading sensor...");
            match self.heading_sensor.calibrate() {
                Ok(()) => {
                    self.heading_ready = true;
                    info!("Heading sensor calibrated");
                }
                Err(e) => warn!("Heading lock disabled: {}", e),
            }
        }

        info!("Teleop initialized");
    }

    /// Runs one tick.
    ///
    /// # Returns
    ///
    /// The wheel speeds dispatched this tick, or zero while stopped.
    pub fn periodic(&mut self, now: Instant) -> WheelCommand {
        let sample = RawSample::read(&self.input, &self.axis_bindings, self.tracker.bindings());
        let frame = self.tracker.update(&sample, &mut self.toggles);

        if frame.pressed(Control::EmergencyStop) {
            self.emergency_stop();
        } else {
            for (control, value) in frame.flips() {
                info!("{}: {}", control.name(), if value { "on" } else { "off" });
                self.rumble.signal_toggle(value, now, &mut self.haptics);
            }
            if frame.pressed(Control::Resume) {
                self.resume();
            }
        }

        if self.stopped {
            self.rumble.tick(now, &mut self.haptics);
            return WheelCommand::ZERO;
        }

        if frame.pressed(Control::EnhanceUp) {
            self.enhancer.step(self.enhancer_step);
            info!("Speed enhancer raised to {:+.2}", self.enhancer.positive());
        }
        if frame.pressed(Control::EnhanceDown) {
            self.enhancer.step(-self.enhancer_step);
            info!("Speed enhancer lowered to {:+.2}", self.enhancer.positive());
        }

        let boost = frame.held(Control::Boost);
        let command = WheelCommand::new(
            self.condition(&sample, AxisChannel::LeftDrive, boost),
            self.condition(&sample, AxisChannel::RightDrive, boost),
        );

        let modes = DriveModes {
            reversed: self.toggles.reversed(),
            wheel_lock: self.toggles.wheel_lock(),
            precision: frame.held(Control::Precision),
        };
        let mixed = self.mixer.mix(command, modes);

        let heading = if self.heading_ready {
            self.heading_sensor.heading()
        } else {
            None
        };
        let target = self.heading_lock.apply(mixed, heading);
        let speeds = self.ramp.step(target, now);

        self.actuators.set_wheel_speeds(speeds.left, speeds.right);
        debug!(
            "target=({:.3}, {:.3}) speeds=({:.3}, {:.3})",
            target.left, target.right, speeds.left, speeds.right
        );

        self.dispatch_auxiliary(&sample);
        self.rumble.tick(now, &mut self.haptics);

        speeds
    }

    /// Hard stop.
    ///
    /// Zeroes the ramp, drops the heading anchor, resets every toggle, and
    /// tells the actuators to stop. Drive dispatch stays off until
    /// [`resume`](Self::resume).
    pub fn emergency_stop(&mut self) {
        self.stopped = true;
        self.reset_motion();
        self.toggles.reset();
        self.actuators.stop_motor();
        warn!("Emergency stop");
    }

    /// Clears the stop flag. Nothing else is restored.
    pub fn resume(&mut self) {
        if self.stopped {
            self.stopped = false;
            info!("Resumed");
        }
    }

    /// Mode exit.
    ///
    /// Stops the actuators, silences rumble and resets all motion state.
    pub fn disable(&mut self) {
        self.reset_motion();
        self.toggles.reset();
        self.tracker.reset();
        self.enhancer.reset();
        self.stopped = false;
        self.actuators.stop_motor();
        self.rumble.silence(&mut self.haptics);
        info!("Teleop disabled");
    }

    /// Whether an emergency stop is in effect.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Whether heading lock has a calibrated sensor.
    #[must_use]
    pub fn heading_ready(&self) -> bool {
        self.heading_ready
    }

    pub fn toggles(&self) -> &ToggleState {
        &self.toggles
    }

    pub fn enhancer(&self) -> &SpeedEnhancer {
        &self.enhancer
    }

    pub fn ramp(&self) -> &MotionRamp {
        &self.ramp
    }

    pub fn heading_lock(&self) -> &HeadingLock {
        &self.heading_lock
    }

    pub fn rumble(&self) -> &RumbleScheduler {
        &self.rumble
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn actuators(&self) -> &A {
        &self.actuators
    }

    pub fn haptics(&self) -> &H {
        &self.haptics
    }

    pub fn heading_sensor_mut(&mut self) -> &mut G {
        &mut self.heading_sensor
    }

    fn condition(&self, sample: &RawSample, channel: AxisChannel, unrestricted: bool) -> f32 {
        self.conditioners[channel.index()].apply(sample.axis(channel), Some(&self.enhancer), unrestricted)
    }

    /// Sends lift, arm and winch commands. A failing channel is logged and
    /// skipped.
    fn dispatch_auxiliary(&mut self, sample: &RawSample) {
        let lift = self.conditioners[AxisChannel::Lift.index()].apply(
            sample.axis(AxisChannel::Lift),
            None,
            self.toggles.climb(),
        );
        let arm = self.conditioners[AxisChannel::Arm.index()].apply(sample.axis(AxisChannel::Arm), None, false);
        let winch = if self.toggles.winch() { self.winch_speed } else { 0.0 };

        for (i, (channel, value)) in AUX_CHANNELS.into_iter().zip([lift, arm, winch]).enumerate() {
            match self.actuators.set_auxiliary(channel, value) {
                Ok(()) => {
                    if self.aux_faulted[i] {
                        info!("{} recovered", channel.name());
                        self.aux_faulted[i] = false;
                    }
                }
                Err(e) => {
                    if !self.aux_faulted[i] {
                        warn!("{} command failed: {}", channel.name(), e);
                        self.aux_faulted[i] = true;
                    }
                }
            }
        }
    }

    fn reset_motion(&mut self) {
        self.ramp.reset();
        self.heading_lock.reset();
    }
}
