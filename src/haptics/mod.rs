//! # Haptics Module
//!
//! Timed rumble feedback on the operator's gamepad.

pub mod rumble;

/// Which rumble motor to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RumbleSide {
    Left,
    Right,
}

impl RumbleSide {
    /// Side used to signal a toggle's new value: right for on, left for off.
    #[must_use]
    pub const fn for_value(value: bool) -> Self {
        if value {
            RumbleSide::Right
        } else {
            RumbleSide::Left
        }
    }

    /// The other side.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            RumbleSide::Left => RumbleSide::Right,
            RumbleSide::Right => RumbleSide::Left,
        }
    }
}
