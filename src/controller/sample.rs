//! # Input Channels and Raw Samples
//!
//! The set of analog channels and operator controls is fixed at compile time.
//! Configuration binds each one to a physical axis index, button index, or
//! directional-pad angle; [`validate_bindings`] checks those bindings once
//! against what the input source reports.
//!
//! ## Controls
//!
//! | Control | Kind | Default binding |
//! |---------|------|-----------------|
//! | Reverse | Toggle | Button 0 |
//! | Wheel lock | Toggle | Button 1 |
//! | Winch | Toggle | Button 2 |
//! | Climb | Toggle | D-Pad 90° |
//! | Emergency stop | Press | Button 8 |
//! | Resume | Press | Button 9 |
//! | Boost | Momentary | Button 5 |
//! | Precision | Momentary | Button 4 |
//! | Enhance up | Press | D-Pad 0° |
//! | Enhance down | Press | D-Pad 180° |

use serde::Deserialize;

use crate::error::{Result, TeleopError};
use crate::hal::InputSource;

/// Analog input channels consumed by the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisChannel {
    /// Left drivetrain side.
    LeftDrive,
    /// Right drivetrain side.
    RightDrive,
    /// Lift mechanism.
    Lift,
    /// Arm mechanism.
    Arm,
}

impl AxisChannel {
    /// Number of analog channels.
    pub const COUNT: usize = 4;

    /// Every channel, in index order.
    pub const ALL: [AxisChannel; Self::COUNT] = [
        AxisChannel::LeftDrive,
        AxisChannel::RightDrive,
        AxisChannel::Lift,
        AxisChannel::Arm,
    ];

    /// Position of this channel in per-channel arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Config-file name of this channel.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            AxisChannel::LeftDrive => "left_drive",
            AxisChannel::RightDrive => "right_drive",
            AxisChannel::Lift => "lift",
            AxisChannel::Arm => "arm",
        }
    }
}

/// How a control turns presses into behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    /// Flips a persisted flag on each fresh press.
    Toggle,
    /// Active exactly while held.
    Momentary,
    /// Fires a one-shot event on each fresh press.
    Press,
}

/// Operator controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Reverse,
    WheelLock,
    Winch,
    Climb,
    EmergencyStop,
    Resume,
    Boost,
    Precision,
    EnhanceUp,
    EnhanceDown,
}

impl Control {
    /// Number of controls.
    pub const COUNT: usize = 10;

    /// Every control, in index order.
    pub const ALL: [Control; Self::COUNT] = [
        Control::Reverse,
        Control::WheelLock,
        Control::Winch,
        Control::Climb,
        Control::EmergencyStop,
        Control::Resume,
        Control::Boost,
        Control::Precision,
        Control::EnhanceUp,
        Control::EnhanceDown,
    ];

    /// Position of this control in per-control arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Behavior class of this control.
    #[must_use]
    pub const fn kind(self) -> ControlKind {
        match self {
            Control::Reverse | Control::WheelLock | Control::Winch | Control::Climb => {
                ControlKind::Toggle
            }
            Control::Boost | Control::Precision => ControlKind::Momentary,
            Control::EmergencyStop
            | Control::Resume
            | Control::EnhanceUp
            | Control::EnhanceDown => ControlKind::Press,
        }
    }

    /// Config-file name of this control.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Control::Reverse => "reverse",
            Control::WheelLock => "wheel_lock",
            Control::Winch => "winch",
            Control::Climb => "climb",
            Control::EmergencyStop => "emergency_stop",
            Control::Resume => "resume",
            Control::Boost => "boost",
            Control::Precision => "precision",
            Control::EnhanceUp => "enhance_up",
            Control::EnhanceDown => "enhance_down",
        }
    }
}

/// Physical source of a control.
///
/// In TOML: `reverse = { button = 0 }` or `climb = { pov = 90 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlSource {
    /// Gamepad button by index.
    Button(usize),
    /// Directional pad held at exactly this angle (degrees).
    Pov(u16),
}

/// Axis index bound to each [`AxisChannel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisBindings {
    indices: [usize; AxisChannel::COUNT],
}

impl Default for AxisBindings {
    fn default() -> Self {
        // Left stick Y, right stick Y, right stick X, left stick X
        Self { indices: [1, 5, 2, 0] }
    }
}

impl AxisBindings {
    /// Creates bindings from a per-channel index array.
    #[must_use]
    pub fn new(indices: [usize; AxisChannel::COUNT]) -> Self {
        Self { indices }
    }

    /// Axis index bound to `channel`.
    #[must_use]
    pub fn get(&self, channel: AxisChannel) -> usize {
        self.indices[channel.index()]
    }
}

/// Source bound to each [`Control`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlBindings {
    sources: [ControlSource; Control::COUNT],
}

impl Default for ControlBindings {
    fn default() -> Self {
        Self {
            sources: [
                ControlSource::Button(0),
                ControlSource::Button(1),
                ControlSource::Button(2),
                ControlSource::Pov(90),
                ControlSource::Button(8),
                ControlSource::Button(9),
                ControlSource::Button(5),
                ControlSource::Button(4),
                ControlSource::Pov(0),
                ControlSource::Pov(180),
            ],
        }
    }
}

impl ControlBindings {
    /// Creates bindings from a per-control source array.
    #[must_use]
    pub fn new(sources: [ControlSource; Control::COUNT]) -> Self {
        Self { sources }
    }

    /// Source bound to `control`.
    #[must_use]
    pub fn get(&self, control: Control) -> ControlSource {
        self.sources[control.index()]
    }

    /// Rebinds one control.
    pub fn set(&mut self, control: Control, source: ControlSource) {
        self.sources[control.index()] = source;
    }
}

/// Checks every binding against the counts the input source reports.
///
/// Run once at startup; after this succeeds the per-tick path never probes
/// for channels.
///
/// # Errors
///
/// Returns [`TeleopError::ChannelOutOfRange`] for the first binding that
/// points past the reported axis or button count.
pub fn validate_bindings<I: InputSource + ?Sized>(
    source: &I,
    axes: &AxisBindings,
    controls: &ControlBindings,
) -> Result<()> {
    let axis_count = source.axis_count();
    for channel in AxisChannel::ALL {
        let index = axes.get(channel);
        if index >= axis_count {
            return Err(TeleopError::ChannelOutOfRange {
                kind: "axis",
                index,
                available: axis_count,
            });
        }
    }

    let button_count = source.button_count();
    for control in Control::ALL {
        if let ControlSource::Button(index) = controls.get(control) {
            if index >= button_count {
                return Err(TeleopError::ChannelOutOfRange {
                    kind: "button",
                    index,
                    available: button_count,
                });
            }
        }
    }

    Ok(())
}

/// One tick's worth of raw operator input.
///
/// Absent channels stay `None`; consumers substitute a safe default.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawSample {
    axes: [Option<f32>; AxisChannel::COUNT],
    buttons: [Option<bool>; Control::COUNT],
    pov: Option<u16>,
}

impl RawSample {
    /// Reads every bound channel from the input source.
    pub fn read<I: InputSource + ?Sized>(
        source: &I,
        axes: &AxisBindings,
        controls: &ControlBindings,
    ) -> Self {
        let mut sample = Self {
            pov: source.pov(),
            ..Self::default()
        };

        for channel in AxisChannel::ALL {
            sample.axes[channel.index()] = source.axis(axes.get(channel));
        }

        for control in Control::ALL {
            if let ControlSource::Button(index) = controls.get(control) {
                sample.buttons[control.index()] = source.button(index);
            }
        }

        sample
    }

    /// Sets an axis value.
    #[must_use]
    pub fn with_axis(mut self, channel: AxisChannel, value: f32) -> Self {
        self.axes[channel.index()] = Some(value);
        self
    }

    /// Sets the raw button state read for a button-bound control.
    #[must_use]
    pub fn with_button(mut self, control: Control, pressed: bool) -> Self {
        self.buttons[control.index()] = Some(pressed);
        self
    }

    /// Sets the directional-pad angle.
    #[must_use]
    pub fn with_pov(mut self, pov: Option<u16>) -> Self {
        self.pov = pov;
        self
    }

    /// Raw value of an analog channel.
    #[must_use]
    pub fn axis(&self, channel: AxisChannel) -> Option<f32> {
        self.axes[channel.index()]
    }

    /// Raw button state read for a button-bound control.
    #[must_use]
    pub fn button(&self, control: Control) -> Option<bool> {
        self.buttons[control.index()]
    }

    /// Directional-pad angle, if the pad is pressed.
    #[must_use]
    pub fn pov(&self) -> Option<u16> {
        self.pov
    }

    /// Whether `control`, bound to `source`, is held in this sample.
    ///
    /// An absent button reads as released. A directional-pad binding is held
    /// only when the pad reports exactly its target angle.
    #[must_use]
    pub fn is_held(&self, control: Control, source: ControlSource) -> bool {
        match source {
            ControlSource::Button(_) => self.button(control).unwrap_or(false),
            ControlSource::Pov(target) => self.pov == Some(target),
        }
    }
}
