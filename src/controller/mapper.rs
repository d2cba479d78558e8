//! # Gamepad Event Mapper
//!
//! Folds raw evdev events from a gamepad into a [`GamepadState`] snapshot
//! with normalized axes, an indexed button list and a directional-pad angle.
//! The snapshot implements [`InputSource`], so the control loop reads it the
//! same way it reads any other input device.
//!
//! ## Axis Indices
//!
//! | Index | evdev Code | Typical Use |
//! |-------|------------|-------------|
//! | 0 | ABS_X | Left stick X |
//! | 1 | ABS_Y | Left stick Y |
//! | 2 | ABS_Z | Right stick X |
//! | 3 | ABS_RX | Left trigger |
//! | 4 | ABS_RY | Right trigger |
//! | 5 | ABS_RZ | Right stick Y |
//!
//! Raw values are normalized to `[-1, 1]` against each axis's reported range
//! (0-255 on DualSense-style pads, -32768..32767 on many others). Stick Y axes
//! read negative when pushed forward.
//!
//! ## Button Indices
//!
//! | Index | evdev Code | Index | evdev Code |
//! |-------|------------|-------|------------|
//! | 0 | BTN_SOUTH | 7 | BTN_TR2 |
//! | 1 | BTN_EAST | 8 | BTN_SELECT |
//! | 2 | BTN_NORTH | 9 | BTN_START |
//! | 3 | BTN_WEST | 10 | BTN_MODE |
//! | 4 | BTN_TL | 11 | BTN_THUMBL |
//! | 5 | BTN_TR | 12 | BTN_THUMBR |
//! | 6 | BTN_TL2 | | |
//!
//! ## Directional Pad
//!
//! ABS_HAT0X/ABS_HAT0Y (-1/0/1) combine into a clockwise angle from up in
//! 45° steps: 0 up, 90 right, 180 down, 270 left. Released reads `None`.
//!
//! ## Usage
//!
//! ```no_run
//! use drive_teleop::controller::gamepad::Gamepad;
//! use drive_teleop::controller::mapper::EventMapper;
//!
//! let mut gamepad = Gamepad::open(None)?;
//! let mut mapper = EventMapper::with_ranges(gamepad.axis_ranges());
//!
//! loop {
//!     for event in gamepad.fetch_events()? {
//!         mapper.process_event(&event);
//!     }
//!     let state = mapper.state_snapshot();
//!     // Hand the snapshot to the control loop...
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use evdev::{AbsoluteAxisType, InputEvent, Key};

use super::axis::AxisRange;
use crate::hal::InputSource;

/// Number of axes a [`GamepadState`] reports.
pub const AXIS_COUNT: usize = 6;

/// Number of buttons a [`GamepadState`] reports.
pub const BUTTON_COUNT: usize = 13;

/// Axis order; an axis's index is its position here.
pub const AXES: [AbsoluteAxisType; AXIS_COUNT] = [
    AbsoluteAxisType::ABS_X,
    AbsoluteAxisType::ABS_Y,
    AbsoluteAxisType::ABS_Z,
    AbsoluteAxisType::ABS_RX,
    AbsoluteAxisType::ABS_RY,
    AbsoluteAxisType::ABS_RZ,
];

/// Normalized value of a released trigger.
const TRIGGER_RELEASED: f32 = -1.0;

/// Button order; a button's index is its position here.
const BUTTONS: [Key; BUTTON_COUNT] = [
    Key::BTN_SOUTH,
    Key::BTN_EAST,
    Key::BTN_NORTH,
    Key::BTN_WEST,
    Key::BTN_TL,
    Key::BTN_TR,
    Key::BTN_TL2,
    Key::BTN_TR2,
    Key::BTN_SELECT,
    Key::BTN_START,
    Key::BTN_MODE,
    Key::BTN_THUMBL,
    Key::BTN_THUMBR,
];

/// Snapshot of everything the gamepad reports.
///
/// # Examples
///
/// ```
/// use drive_teleop::controller::mapper::GamepadState;
/// use drive_teleop::hal::InputSource;
///
/// let state = GamepadState::default();
/// assert_eq!(state.axis(0), Some(0.0));    // Centered
/// assert_eq!(state.button(0), Some(false));
/// assert_eq!(state.pov(), None);
/// assert_eq!(state.axis(6), None);         // No such axis
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GamepadState {
    axes: [f32; AXIS_COUNT],
    buttons: [bool; BUTTON_COUNT],
    hat_x: i32,
    hat_y: i32,
}

impl Default for GamepadState {
    /// Sticks centered, triggers and buttons released.
    fn default() -> Self {
        Self {
            axes: [0.0, 0.0, 0.0, TRIGGER_RELEASED, TRIGGER_RELEASED, 0.0],
            buttons: [false; BUTTON_COUNT],
            hat_x: 0,
            hat_y: 0,
        }
    }
}

impl InputSource for GamepadState {
    fn axis(&self, index: usize) -> Option<f32> {
        self.axes.get(index).copied()
    }

    fn button(&self, index: usize) -> Option<bool> {
        self.buttons.get(index).copied()
    }

    fn pov(&self) -> Option<u16> {
        hat_to_pov(self.hat_x, self.hat_y)
    }

    fn axis_count(&self) -> usize {
        AXIS_COUNT
    }

    fn button_count(&self) -> usize {
        BUTTON_COUNT
    }
}

/// Combines hat X/Y (-1/0/1, Y negative up) into a pov angle.
///
/// # Examples
///
/// ```
/// use drive_teleop::controller::mapper::hat_to_pov;
///
/// assert_eq!(hat_to_pov(0, -1), Some(0));
/// assert_eq!(hat_to_pov(1, 1), Some(135));
/// assert_eq!(hat_to_pov(0, 0), None);
/// ```
#[must_use]
pub fn hat_to_pov(x: i32, y: i32) -> Option<u16> {
    match (x.signum(), y.signum()) {
        (0, -1) => Some(0),
        (1, -1) => Some(45),
        (1, 0) => Some(90),
        (1, 1) => Some(135),
        (0, 1) => Some(180),
        (-1, 1) => Some(225),
        (-1, 0) => Some(270),
        (-1, -1) => Some(315),
        _ => None,
    }
}

/// Parses raw evdev events and maintains a [`GamepadState`].
///
/// Not thread-safe; feed it from a single reader.
#[derive(Debug, Default)]
pub struct EventMapper {
    state: GamepadState,
    ranges: [AxisRange; AXIS_COUNT],
}

impl EventMapper {
    /// Creates a mapper assuming 0-255 axes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mapper for a device with the given axis ranges, in
    /// [`AXES`] order.
    #[must_use]
    pub fn with_ranges(ranges: [AxisRange; AXIS_COUNT]) -> Self {
        Self {
            state: GamepadState::default(),
            ranges,
        }
    }

    /// Axis ranges in use.
    #[must_use]
    pub fn ranges(&self) -> &[AxisRange; AXIS_COUNT] {
        &self.ranges
    }

    /// Current state, reflecting every event processed so far.
    #[must_use]
    pub fn state(&self) -> &GamepadState {
        &self.state
    }

    /// Owned copy of the current state.
    #[must_use]
    pub fn state_snapshot(&self) -> GamepadState {
        self.state
    }

    /// Processes a single evdev event.
    ///
    /// # Returns
    ///
    /// `true` if the event changed a tracked axis or button.
    pub fn process_event(&mut self, event: &InputEvent) -> bool {
        match event.kind() {
            evdev::InputEventKind::AbsAxis(axis) => self.process_axis_event(axis, event.value()),
            evdev::InputEventKind::Key(key) => self.process_key_event(key, event.value() != 0),
            _ => false,
        }
    }

    fn process_axis_event(&mut self, axis: AbsoluteAxisType, value: i32) -> bool {
        match axis {
            AbsoluteAxisType::ABS_HAT0X => self.state.hat_x = value,
            AbsoluteAxisType::ABS_HAT0Y => self.state.hat_y = value,
            _ => match AXES.iter().position(|&a| a == axis) {
                Some(index) => self.state.axes[index] = self.ranges[index].normalize(value),
                // Gyro, accelerometer, touchpad
                None => return false,
            },
        }
        true
    }

    fn process_key_event(&mut self, key: Key, pressed: bool) -> bool {
        match BUTTONS.iter().position(|&k| k == key) {
            Some(index) => {
                self.state.buttons[index] = pressed;
                true
            }
            None => false,
        }
    }

    /// Back to centered sticks and released buttons, e.g. after the device
    /// drops out. Ranges are kept.
    pub fn reset(&mut self) {
        self.state = GamepadState::default();
    }
}
