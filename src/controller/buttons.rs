//! # Button Edge Tracking
//!
//! Converts raw per-tick button and directional-pad samples into press edges,
//! momentary states and toggle flips.
//!
//! ## Edge Rule
//!
//! On the first tick a control is seen held, it reports a press exactly once
//! and is marked pending. While it stays held it reports nothing. On release
//! the pending mark is dropped, so the next press reports once again.
//!
//! A directional-pad binding counts as held only while the pad reports its
//! exact target angle; any other angle, or no angle, is a release.
//!
//! ## Usage
//!
//! ```
//! use drive_teleop::control::toggles::ToggleState;
//! use drive_teleop::controller::buttons::ButtonEdgeTracker;
//! use drive_teleop::controller::sample::{Control, ControlBindings, RawSample};
//!
//! let mut tracker = ButtonEdgeTracker::new(ControlBindings::default());
//! let mut toggles = ToggleState::default();
//!
//! let held = RawSample::default().with_button(Control::Reverse, true);
//! let frame = tracker.update(&held, &mut toggles);
//! assert_eq!(frame.flipped(Control::Reverse), Some(true));
//!
//! // Still held: no second flip
//! let frame = tracker.update(&held, &mut toggles);
//! assert_eq!(frame.flipped(Control::Reverse), None);
//! assert!(toggles.reversed());
//! ```

use tracing::debug;

use super::sample::{Control, ControlBindings, ControlKind, RawSample};
use crate::control::toggles::ToggleState;

/// Results of one tick of edge tracking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlFrame {
    pressed: [bool; Control::COUNT],
    held: [bool; Control::COUNT],
    flipped: [Option<bool>; Control::COUNT],
}

impl ControlFrame {
    /// Whether `control` saw a fresh press this tick.
    #[must_use]
    pub fn pressed(&self, control: Control) -> bool {
        self.pressed[control.index()]
    }

    /// Whether `control` is held this tick.
    #[must_use]
    pub fn held(&self, control: Control) -> bool {
        self.held[control.index()]
    }

    /// New value of a toggle that flipped this tick.
    #[must_use]
    pub fn flipped(&self, control: Control) -> Option<bool> {
        self.flipped[control.index()]
    }

    /// Every toggle that flipped this tick, in control order.
    pub fn flips(&self) -> impl Iterator<Item = (Control, bool)> + '_ {
        Control::ALL
            .iter()
            .filter_map(move |&c| self.flipped[c.index()].map(|value| (c, value)))
    }
}

/// Tracks press edges for every bound control.
#[derive(Debug, Clone)]
pub struct ButtonEdgeTracker {
    bindings: ControlBindings,
    pending: [bool; Control::COUNT],
}

impl ButtonEdgeTracker {
    /// Creates a tracker with nothing pending.
    #[must_use]
    pub fn new(bindings: ControlBindings) -> Self {
        Self {
            bindings,
            pending: [false; Control::COUNT],
        }
    }

    /// Returns the control bindings.
    #[must_use]
    pub fn bindings(&self) -> &ControlBindings {
        &self.bindings
    }

    /// Applies the edge rule to one control.
    ///
    /// Returns `true` only on the first tick `held` is seen after a release.
    pub fn press_edge(&mut self, control: Control, held: bool) -> bool {
        let pending = &mut self.pending[control.index()];
        if held {
            let fresh = !*pending;
            *pending = true;
            fresh
        } else {
            *pending = false;
            false
        }
    }

    /// Processes one sample, flipping toggles on fresh presses.
    pub fn update(&mut self, sample: &RawSample, toggles: &mut ToggleState) -> ControlFrame {
        let mut frame = ControlFrame::default();

        for control in Control::ALL {
            let i = control.index();
            let held = sample.is_held(control, self.bindings.get(control));
            let fresh = self.press_edge(control, held);

            frame.held[i] = held;
            frame.pressed[i] = fresh;

            if fresh && control.kind() == ControlKind::Toggle {
                frame.flipped[i] = toggles.flip(control);
                debug!("{} toggled to {:?}", control.name(), frame.flipped[i]);
            }
        }

        frame
    }

    /// Forgets every pending press.
    ///
    /// A control still held after a reset reports a fresh press on the next
    /// tick.
    pub fn reset(&mut self) {
        self.pending = [false; Control::COUNT];
    }
}
