//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every section and field is optional; missing values fall back to the
//! defaults below, so an empty file is a valid configuration.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::controller::axis::{AxisConfig, MAX_DEADZONE};
use crate::controller::sample::{AxisBindings, AxisChannel, Control, ControlBindings, ControlSource};
use crate::error::{Result, TeleopError};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub axes: AxesConfig,
    #[serde(default)]
    pub bindings: BindingsConfig,
    #[serde(default)]
    pub drive: DriveConfig,
    #[serde(default)]
    pub heading: HeadingConfig,
    #[serde(default)]
    pub rumble: RumbleConfig,
    #[serde(default)]
    pub auxiliary: AuxiliaryConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Gamepad configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ControllerConfig {
    /// Explicit `/dev/input/event*` path; empty means auto-detect.
    #[serde(default)]
    pub device_path: String,
}

/// One analog channel: where to read it and how to condition it
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct AxisChannelConfig {
    pub index: usize,

    #[serde(default = "default_deadzone")]
    pub deadzone: f32,

    #[serde(default)]
    pub reversed: bool,

    #[serde(default = "default_cap")]
    pub cap_negative: f32,

    #[serde(default = "default_cap")]
    pub cap_positive: f32,
}

impl AxisChannelConfig {
    /// Conditioning parameters for this channel.
    #[must_use]
    pub fn axis_config(&self) -> AxisConfig {
        AxisConfig::new(self.deadzone, self.reversed, self.cap_negative, self.cap_positive)
    }
}

/// Analog channel configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AxesConfig {
    #[serde(default = "default_left_drive_axis")]
    pub left_drive: AxisChannelConfig,

    #[serde(default = "default_right_drive_axis")]
    pub right_drive: AxisChannelConfig,

    #[serde(default = "default_lift_axis")]
    pub lift: AxisChannelConfig,

    #[serde(default = "default_arm_axis")]
    pub arm: AxisChannelConfig,
}

impl Default for AxesConfig {
    fn default() -> Self {
        Self {
            left_drive: default_left_drive_axis(),
            right_drive: default_right_drive_axis(),
            lift: default_lift_axis(),
            arm: default_arm_axis(),
        }
    }
}

impl AxesConfig {
    /// Settings for one channel.
    #[must_use]
    pub fn channel(&self, channel: AxisChannel) -> &AxisChannelConfig {
        match channel {
            AxisChannel::LeftDrive => &self.left_drive,
            AxisChannel::RightDrive => &self.right_drive,
            AxisChannel::Lift => &self.lift,
            AxisChannel::Arm => &self.arm,
        }
    }

    /// Axis index bound to each channel.
    #[must_use]
    pub fn bindings(&self) -> AxisBindings {
        AxisBindings::new(AxisChannel::ALL.map(|c| self.channel(c).index))
    }
}

/// Control bindings
#[derive(Debug, Deserialize, Clone)]
pub struct BindingsConfig {
    #[serde(default = "default_bind_reverse")]
    pub reverse: ControlSource,

    #[serde(default = "default_bind_wheel_lock")]
    pub wheel_lock: ControlSource,

    #[serde(default = "default_bind_winch")]
    pub winch: ControlSource,

    #[serde(default = "default_bind_climb")]
    pub climb: ControlSource,

    #[serde(default = "default_bind_emergency_stop")]
    pub emergency_stop: ControlSource,

    #[serde(default = "default_bind_resume")]
    pub resume: ControlSource,

    #[serde(default = "default_bind_boost")]
    pub boost: ControlSource,

    #[serde(default = "default_bind_precision")]
    pub precision: ControlSource,

    #[serde(default = "default_bind_enhance_up")]
    pub enhance_up: ControlSource,

    #[serde(default = "default_bind_enhance_down")]
    pub enhance_down: ControlSource,
}

impl Default for BindingsConfig {
    fn default() -> Self {
        Self {
            reverse: default_bind_reverse(),
            wheel_lock: default_bind_wheel_lock(),
            winch: default_bind_winch(),
            climb: default_bind_climb(),
            emergency_stop: default_bind_emergency_stop(),
            resume: default_bind_resume(),
            boost: default_bind_boost(),
            precision: default_bind_precision(),
            enhance_up: default_bind_enhance_up(),
            enhance_down: default_bind_enhance_down(),
        }
    }
}

impl BindingsConfig {
    /// Source bound to one control.
    #[must_use]
    pub fn source(&self, control: Control) -> ControlSource {
        match control {
            Control::Reverse => self.reverse,
            Control::WheelLock => self.wheel_lock,
            Control::Winch => self.winch,
            Control::Climb => self.climb,
            Control::EmergencyStop => self.emergency_stop,
            Control::Resume => self.resume,
            Control::Boost => self.boost,
            Control::Precision => self.precision,
            Control::EnhanceUp => self.enhance_up,
            Control::EnhanceDown => self.enhance_down,
        }
    }

    /// All control bindings.
    #[must_use]
    pub fn controls(&self) -> ControlBindings {
        ControlBindings::new(Control::ALL.map(|c| self.source(c)))
    }
}

/// Drivetrain configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DriveConfig {
    #[serde(default = "default_lock_threshold")]
    pub lock_threshold: f32,

    /// Maximum speed change per second
    #[serde(default = "default_acceleration")]
    pub acceleration: f32,

    #[serde(default = "default_min_speed")]
    pub min_speed: f32,

    #[serde(default = "default_precision_divisor")]
    pub precision_divisor: f32,

    #[serde(default = "default_enhancer_step")]
    pub enhancer_step: f32,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            lock_threshold: default_lock_threshold(),
            acceleration: default_acceleration(),
            min_speed: default_min_speed(),
            precision_divisor: default_precision_divisor(),
            enhancer_step: default_enhancer_step(),
        }
    }
}

/// Heading lock configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HeadingConfig {
    #[serde(default = "default_heading_enabled")]
    pub enabled: bool,

    #[serde(default = "default_margin_deg")]
    pub margin_deg: f32,

    #[serde(default = "default_correction")]
    pub correction: f32,
}

impl Default for HeadingConfig {
    fn default() -> Self {
        Self {
            enabled: default_heading_enabled(),
            margin_deg: default_margin_deg(),
            correction: default_correction(),
        }
    }
}

/// Rumble configuration
#[derive(Debug, Deserialize, Clone)]
pub struct RumbleConfig {
    #[serde(default = "default_rumble_duration_ms")]
    pub duration_ms: u64,

    #[serde(default = "default_rumble_intensity")]
    pub intensity: f32,
}

impl Default for RumbleConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_rumble_duration_ms(),
            intensity: default_rumble_intensity(),
        }
    }
}

impl RumbleConfig {
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// Auxiliary mechanism configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AuxiliaryConfig {
    /// Winch output while the winch toggle is on
    #[serde(default = "default_winch_speed")]
    pub winch_speed: f32,
}

impl Default for AuxiliaryConfig {
    fn default() -> Self {
        Self {
            winch_speed: default_winch_speed(),
        }
    }
}

/// Loop timing configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TimingConfig {
    #[serde(default = "default_tick_rate_hz")]
    pub tick_rate_hz: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: default_tick_rate_hz(),
        }
    }
}

impl TimingConfig {
    /// Time between ticks.
    #[must_use]
    pub fn period(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.tick_rate_hz.max(1)))
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Directory for daily log files; empty disables file logging.
    #[serde(default)]
    pub dir: String,

    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: String::new(),
            level: default_log_level(),
        }
    }
}

// Default value functions
fn default_deadzone() -> f32 { 0.16 }
fn default_cap() -> f32 { 1.0 }

fn default_left_drive_axis() -> AxisChannelConfig {
    AxisChannelConfig { index: 1, deadzone: 0.16, reversed: true, cap_negative: 0.6, cap_positive: 0.6 }
}
fn default_right_drive_axis() -> AxisChannelConfig {
    AxisChannelConfig { index: 5, deadzone: 0.16, reversed: true, cap_negative: 0.6, cap_positive: 0.6 }
}
fn default_lift_axis() -> AxisChannelConfig {
    AxisChannelConfig { index: 2, deadzone: 0.1, reversed: false, cap_negative: 0.5, cap_positive: 1.0 }
}
fn default_arm_axis() -> AxisChannelConfig {
    AxisChannelConfig { index: 0, deadzone: 0.1, reversed: false, cap_negative: 0.7, cap_positive: 0.7 }
}

fn default_bind_reverse() -> ControlSource { ControlSource::Button(0) }
fn default_bind_wheel_lock() -> ControlSource { ControlSource::Button(1) }
fn default_bind_winch() -> ControlSource { ControlSource::Button(2) }
fn default_bind_climb() -> ControlSource { ControlSource::Pov(90) }
fn default_bind_emergency_stop() -> ControlSource { ControlSource::Button(8) }
fn default_bind_resume() -> ControlSource { ControlSource::Button(9) }
fn default_bind_boost() -> ControlSource { ControlSource::Button(5) }
fn default_bind_precision() -> ControlSource { ControlSource::Button(4) }
fn default_bind_enhance_up() -> ControlSource { ControlSource::Pov(0) }
fn default_bind_enhance_down() -> ControlSource { ControlSource::Pov(180) }

fn default_lock_threshold() -> f32 { 0.1 }
fn default_acceleration() -> f32 { 3.0 }
fn default_min_speed() -> f32 { 0.08 }
fn default_precision_divisor() -> f32 { 2.0 }
fn default_enhancer_step() -> f32 { 0.1 }

fn default_heading_enabled() -> bool { true }
fn default_margin_deg() -> f32 { 2.0 }
fn default_correction() -> f32 { 0.05 }

fn default_rumble_duration_ms() -> u64 { 150 }
fn default_rumble_intensity() -> f32 { 1.0 }

fn default_winch_speed() -> f32 { 1.0 }

fn default_tick_rate_hz() -> u32 { 50 }

fn default_log_level() -> String { "info".to_string() }

/// Builds a validation error.
fn invalid(msg: impl std::fmt::Display) -> TeleopError {
    TeleopError::Config(toml::de::Error::custom(msg))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use drive_teleop::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a TOML string
    ///
    /// # Errors
    ///
    /// Returns error if TOML parsing or validation fails
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        // Validate analog channels
        for channel in AxisChannel::ALL {
            let axis = self.axes.channel(channel);
            if !(0.0..MAX_DEADZONE).contains(&axis.deadzone) {
                return Err(invalid(format!(
                    "{} deadzone must be in [0.0, {})",
                    channel.name(),
                    MAX_DEADZONE
                )));
            }
            for (side, cap) in [("cap_negative", axis.cap_negative), ("cap_positive", axis.cap_positive)] {
                if !(0.0..=1.0).contains(&cap) {
                    return Err(invalid(format!(
                        "{} {} must be between 0.0 and 1.0",
                        channel.name(),
                        side
                    )));
                }
            }
        }

        // Validate control bindings
        for (i, &a) in Control::ALL.iter().enumerate() {
            let source = self.bindings.source(a);
            if let ControlSource::Pov(angle) = source {
                if angle >= 360 || angle % 45 != 0 {
                    return Err(invalid(format!(
                        "{} pov angle {} must be a multiple of 45 below 360",
                        a.name(),
                        angle
                    )));
                }
            }
            for &b in &Control::ALL[i + 1..] {
                if self.bindings.source(b) == source {
                    return Err(invalid(format!(
                        "{} and {} are bound to the same input",
                        a.name(),
                        b.name()
                    )));
                }
            }
        }

        // Validate drive tuning
        if !(0.0..=0.5).contains(&self.drive.lock_threshold) {
            return Err(invalid("lock_threshold must be between 0.0 and 0.5"));
        }

        if self.drive.acceleration <= 0.0 || self.drive.acceleration > 100.0 {
            return Err(invalid("acceleration must be greater than 0.0 and at most 100.0"));
        }

        if !(0.0..0.5).contains(&self.drive.min_speed) {
            return Err(invalid("min_speed must be in [0.0, 0.5)"));
        }

        if !(1.0..=10.0).contains(&self.drive.precision_divisor) {
            return Err(invalid("precision_divisor must be between 1.0 and 10.0"));
        }

        if self.drive.enhancer_step <= 0.0 || self.drive.enhancer_step > 1.0 {
            return Err(invalid("enhancer_step must be greater than 0.0 and at most 1.0"));
        }

        // Validate heading lock
        if self.heading.margin_deg <= 0.0 || self.heading.margin_deg > 45.0 {
            return Err(invalid("margin_deg must be greater than 0.0 and at most 45.0"));
        }

        if !(0.0..=0.5).contains(&self.heading.correction) {
            return Err(invalid("correction must be between 0.0 and 0.5"));
        }

        // Validate rumble
        if self.rumble.duration_ms == 0 || self.rumble.duration_ms > 5000 {
            return Err(invalid("rumble duration_ms must be between 1 and 5000"));
        }

        if !(0.0..=1.0).contains(&self.rumble.intensity) {
            return Err(invalid("rumble intensity must be between 0.0 and 1.0"));
        }

        // Validate auxiliary outputs
        if !(-1.0..=1.0).contains(&self.auxiliary.winch_speed) {
            return Err(invalid("winch_speed must be between -1.0 and 1.0"));
        }

        // Validate tick rate
        if self.timing.tick_rate_hz < 10 || self.timing.tick_rate_hz > 500 {
            return Err(invalid("tick_rate_hz must be between 10 and 500"));
        }

        // Validate log level
        if !["trace", "debug", "info", "warn", "error"].contains(&self.logging.level.as_str()) {
            return Err(invalid("log level must be one of: trace, debug, info, warn, error"));
        }

        Ok(())
    }
}
