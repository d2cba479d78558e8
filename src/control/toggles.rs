//! Persisted toggle flags.

use crate::controller::sample::{Control, ControlKind};

/// Current value of every toggle control.
///
/// Flags change only on a fresh press edge and go back to their defaults on
/// mode entry and emergency stop. Defaults: wheel lock on, everything else off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleState {
    flags: [bool; Control::COUNT],
}

impl Default for ToggleState {
    fn default() -> Self {
        let mut flags = [false; Control::COUNT];
        for control in Control::ALL {
            flags[control.index()] = Self::default_for(control);
        }
        Self { flags }
    }
}

impl ToggleState {
    /// Default value of a toggle control.
    #[must_use]
    pub const fn default_for(control: Control) -> bool {
        matches!(control, Control::WheelLock)
    }

    /// Current value of `control`. Non-toggle controls always read `false`.
    #[must_use]
    pub fn get(&self, control: Control) -> bool {
        control.kind() == ControlKind::Toggle && self.flags[control.index()]
    }

    /// Flips a toggle control and returns its new value.
    ///
    /// Returns `None` for controls that are not toggles.
    pub fn flip(&mut self, control: Control) -> Option<bool> {
        if control.kind() != ControlKind::Toggle {
            return None;
        }
        let flag = &mut self.flags[control.index()];
        *flag = !*flag;
        Some(*flag)
    }

    /// Restores every flag to its default.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn reversed(&self) -> bool {
        self.get(Control::Reverse)
    }

    pub fn wheel_lock(&self) -> bool {
        self.get(Control::WheelLock)
    }

    pub fn climb(&self) -> bool {
        self.get(Control::Climb)
    }

    pub fn winch(&self) -> bool {
        self.get(Control::Winch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let toggles = ToggleState::default();
        assert!(!toggles.reversed());
        assert!(toggles.wheel_lock());
        assert!(!toggles.climb());
        assert!(!toggles.winch());
    }

    #[test]
    fn test_flip_returns_new_value() {
        let mut toggles = ToggleState::default();
        assert_eq!(toggles.flip(Control::Reverse), Some(true));
        assert!(toggles.reversed());
        assert_eq!(toggles.flip(Control::Reverse), Some(false));
        assert_eq!(toggles.flip(Control::WheelLock), Some(false));
        assert!(!toggles.wheel_lock());
    }

    #[test]
    fn test_flip_ignores_non_toggles() {
        let mut toggles = ToggleState::default();
        assert_eq!(toggles.flip(Control::Boost), None);
        assert_eq!(toggles.flip(Control::EmergencyStop), None);
        assert!(!toggles.get(Control::Boost));
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut toggles = ToggleState::default();
        toggles.flip(Control::Reverse);
        toggles.flip(Control::WheelLock);
        toggles.flip(Control::Climb);
        toggles.reset();
        assert_eq!(toggles, ToggleState::default());
    }
}
