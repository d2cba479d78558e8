//! # Gamepad Device Module
//!
//! Finds and opens a gamepad through the Linux evdev interface.
//!
//! ## Detection
//!
//! Without an explicit path, every `/dev/input/event*` device is probed in
//! sorted order and the first one reporting a `BTN_SOUTH` key is taken.
//! Keyboards, mice and motion-sensor sub-devices do not report it.
//!
//! ## Axis Ranges
//!
//! Gamepads disagree on raw axis ranges, so each axis's minimum and maximum
//! are read from the device's absinfo and handed to the
//! [`EventMapper`](super::mapper::EventMapper) through [`Gamepad::axis_ranges`].

use evdev::{Device, Key};
use std::path::Path;
use tracing::{debug, info, warn};

use super::axis::AxisRange;
use super::mapper::{AXES, AXIS_COUNT};
use crate::error::{Result, TeleopError};

/// Key every gamepad reports and non-gamepad input devices do not.
const GAMEPAD_MARKER_KEY: Key = Key::BTN_SOUTH;

/// Open gamepad handle.
pub struct Gamepad {
    device: Device,
    device_path: String,
}

impl Gamepad {
    /// Opens the gamepad at `path`, or the first one found under `/dev/input`.
    ///
    /// # Errors
    ///
    /// - `Controller`: the explicit path cannot be opened or is not a gamepad
    /// - `ControllerNotFound`: no gamepad found while scanning
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use drive_teleop::controller::gamepad::Gamepad;
    ///
    /// let gamepad = Gamepad::open(None)?;
    /// println!("Connected to gamepad at: {}", gamepad.device_path());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::open_path(path),
            None => Self::scan(),
        }
    }

    fn open_path(path: &Path) -> Result<Self> {
        let device = Device::open(path)
            .map_err(|e| TeleopError::Controller(format!("Failed to open {}: {}", path.display(), e)))?;

        if !is_gamepad(&device) {
            return Err(TeleopError::Controller(format!(
                "{} is not a gamepad",
                path.display()
            )));
        }

        let device_path = path.to_string_lossy().to_string();
        info!("Opened gamepad at: {}", device_path);
        Ok(Gamepad { device, device_path })
    }

    fn scan() -> Result<Self> {
        let input_dir = Path::new("/dev/input");

        if !input_dir.exists() {
            return Err(TeleopError::Controller(
                "/dev/input directory not found".to_string(),
            ));
        }

        let mut entries: Vec<_> = std::fs::read_dir(input_dir)
            .map_err(|e| TeleopError::Controller(format!("Failed to read /dev/input: {}", e)))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| TeleopError::Controller(format!("Failed to read directory entry: {}", e)))?;

        // Deterministic pick when several gamepads are attached
        entries.sort_by_key(|entry| entry.path());

        for entry in entries {
            let path = entry.path();

            let is_event_node = path
                .file_name()
                .is_some_and(|name| name.to_string_lossy().starts_with("event"));
            if !is_event_node {
                continue;
            }

            match Device::open(&path) {
                Ok(device) => {
                    debug!(
                        "Found input device: {} ({})",
                        path.display(),
                        device.name().unwrap_or("unnamed")
                    );

                    if is_gamepad(&device) {
                        let device_path = path.to_string_lossy().to_string();
                        info!("Found gamepad at: {}", device_path);
                        return Ok(Gamepad { device, device_path });
                    }
                }
                Err(e) => {
                    debug!("Could not open {}: {}", path.display(), e);
                }
            }
        }

        Err(TeleopError::ControllerNotFound)
    }

    /// The `/dev/input/eventX` path this gamepad was opened from.
    #[must_use]
    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    /// Fetches pending input events. Blocks until at least one is available.
    ///
    /// # Errors
    ///
    /// Returns `Controller` if the read fails, e.g. the gamepad was unplugged.
    pub fn fetch_events(&mut self) -> Result<impl Iterator<Item = evdev::InputEvent> + '_> {
        self.device
            .fetch_events()
            .map_err(|e| TeleopError::Controller(format!("Failed to fetch events: {}", e)))
    }

    /// Raw range of each mapped axis, in [`AXES`] order.
    ///
    /// Axes the device does not report, or reports with an empty range, keep
    /// the 0-255 default.
    #[must_use]
    pub fn axis_ranges(&self) -> [AxisRange; AXIS_COUNT] {
        let mut ranges = [AxisRange::default(); AXIS_COUNT];

        let state = match self.device.get_abs_state() {
            Ok(state) => state,
            Err(e) => {
                warn!("Could not read axis ranges from {}: {}", self.device_path, e);
                return ranges;
            }
        };

        for (range, axis) in ranges.iter_mut().zip(AXES) {
            let info = &state[axis.0 as usize];
            match AxisRange::new(info.minimum, info.maximum) {
                Some(reported) => {
                    debug!("{:?} range {}..={}", axis, reported.min(), reported.max());
                    *range = reported;
                }
                None => debug!("{:?} has no usable range, assuming 0-255", axis),
            }
        }

        ranges
    }

    /// Device name reported by the kernel.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.device.name()
    }
}

fn is_gamepad(device: &Device) -> bool {
    device
        .supported_keys()
        .is_some_and(|keys| keys.contains(GAMEPAD_MARKER_KEY))
}
