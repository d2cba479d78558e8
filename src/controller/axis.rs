//! # Axis Conditioning Module
//!
//! Turns a raw stick sample into a bounded actuator command.
//!
//! ## Pipeline
//!
//! 1. **Deadzone**: values with `|v| <= deadzone` map to 0.
//! 2. **Rescale**: the remaining travel is stretched back to the full range,
//!    so the output rises continuously from 0 just past the deadzone edge.
//! 3. **Cap**: unless running unrestricted, the result is multiplied by the
//!    cap for its direction. A [`SpeedEnhancer`] can raise or lower each cap
//!    at runtime.
//! 4. **Reverse**: the sign is flipped for reversed channels.
//!
//! The formula for step 2 is: `v' = sign(v) * (|v| - deadzone) / (1 - deadzone)`
//!
//! ## Usage
//!
//! ```
//! use drive_teleop::controller::axis::{AxisConditioner, AxisConfig};
//!
//! let cond = AxisConditioner::new(AxisConfig::new(0.1, false, 0.6, 0.6));
//!
//! // Input within the deadzone
//! assert_eq!(cond.apply(Some(0.05), None, false), 0.0);
//!
//! // Full deflection is limited by the cap
//! assert!((cond.apply(Some(1.0), None, false) - 0.6).abs() < 0.001);
//!
//! // ...unless running unrestricted
//! assert!((cond.apply(Some(1.0), None, true) - 1.0).abs() < 0.001);
//! ```

/// Largest deadzone accepted by [`AxisConfig::new`].
pub const MAX_DEADZONE: f32 = 0.95;

/// Per-channel conditioning parameters.
///
/// Caps are magnitudes: `cap_negative` limits travel below zero and
/// `cap_positive` limits travel above zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisConfig {
    /// Deadzone as a fraction (0.0 to [`MAX_DEADZONE`]).
    pub deadzone: f32,
    /// Flip the sign of the conditioned output.
    pub reversed: bool,
    /// Speed cap for negative deflection (0.0 to 1.0).
    pub cap_negative: f32,
    /// Speed cap for positive deflection (0.0 to 1.0).
    pub cap_positive: f32,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            deadzone: 0.1,
            reversed: false,
            cap_negative: 1.0,
            cap_positive: 1.0,
        }
    }
}

impl AxisConfig {
    /// Creates an axis configuration, clamping every field into its valid range.
    ///
    /// # Examples
    ///
    /// ```
    /// use drive_teleop::controller::axis::AxisConfig;
    ///
    /// let cfg = AxisConfig::new(1.5, true, 2.0, -0.5);
    /// assert!(cfg.deadzone < 1.0);
    /// assert_eq!(cfg.cap_negative, 1.0);
    /// assert_eq!(cfg.cap_positive, 0.0);
    /// ```
    #[must_use]
    pub fn new(deadzone: f32, reversed: bool, cap_negative: f32, cap_positive: f32) -> Self {
        Self {
            deadzone: deadzone.clamp(0.0, MAX_DEADZONE),
            reversed,
            cap_negative: cap_negative.clamp(0.0, 1.0),
            cap_positive: cap_positive.clamp(0.0, 1.0),
        }
    }

    /// A pass-through channel: no deadzone, no caps.
    #[must_use]
    pub fn linear() -> Self {
        Self {
            deadzone: 0.0,
            reversed: false,
            cap_negative: 1.0,
            cap_positive: 1.0,
        }
    }
}

/// Runtime offsets that relax (or tighten) the configured caps.
///
/// Each offset is kept within `[-1, 1]`. The effective cap for a direction is
/// `(cap + offset).clamp(0, 1)`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpeedEnhancer {
    negative: f32,
    positive: f32,
}

impl SpeedEnhancer {
    /// Creates an enhancer with the given offsets, clamped to `[-1, 1]`.
    #[must_use]
    pub fn new(negative: f32, positive: f32) -> Self {
        Self {
            negative: negative.clamp(-1.0, 1.0),
            positive: positive.clamp(-1.0, 1.0),
        }
    }

    /// Offset applied to the negative-direction cap.
    #[must_use]
    pub fn negative(&self) -> f32 {
        self.negative
    }

    /// Offset applied to the positive-direction cap.
    #[must_use]
    pub fn positive(&self) -> f32 {
        self.positive
    }

    /// Shifts both offsets by `step`, keeping each within `[-1, 1]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use drive_teleop::controller::axis::SpeedEnhancer;
    ///
    /// let mut enhancer = SpeedEnhancer::default();
    /// for _ in 0..30 {
    ///     enhancer.step(0.1);
    /// }
    /// assert_eq!(enhancer.positive(), 1.0);
    /// ```
    pub fn step(&mut self, step: f32) {
        self.negative = (self.negative + step).clamp(-1.0, 1.0);
        self.positive = (self.positive + step).clamp(-1.0, 1.0);
    }

    /// Clears both offsets.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Applies deadzone, rescale, caps and reversal to one input channel.
///
/// Holds no state besides its immutable configuration; the output depends
/// only on the current sample and the arguments passed to [`apply`](Self::apply).
#[derive(Debug, Clone, Copy, Default)]
pub struct AxisConditioner {
    config: AxisConfig,
}

impl AxisConditioner {
    /// Creates a conditioner for one channel.
    #[must_use]
    pub fn new(config: AxisConfig) -> Self {
        Self { config }
    }

    /// Returns the channel configuration.
    #[must_use]
    pub fn config(&self) -> &AxisConfig {
        &self.config
    }

    /// Conditions a raw sample.
    ///
    /// # Arguments
    ///
    /// * `raw` - Raw value in `[-1, 1]`, or `None` when the channel is absent
    /// * `enhancer` - Optional cap offsets
    /// * `unrestricted` - Skip the caps entirely
    ///
    /// # Returns
    ///
    /// Conditioned command in `[-1, 1]`. Absent or NaN input yields 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use drive_teleop::controller::axis::{AxisConditioner, AxisConfig};
    ///
    /// let cond = AxisConditioner::new(AxisConfig::new(0.1, true, 1.0, 1.0));
    /// assert!((cond.apply(Some(-1.0), None, false) - 1.0).abs() < 0.001);
    /// assert_eq!(cond.apply(None, None, false), 0.0);
    /// ```
    #[must_use]
    pub fn apply(&self, raw: Option<f32>, enhancer: Option<&SpeedEnhancer>, unrestricted: bool) -> f32 {
        let value = match raw {
            Some(v) if !v.is_nan() => v.clamp(-1.0, 1.0),
            _ => return 0.0,
        };

        let rescaled = self.apply_deadzone(value);
        if rescaled == 0.0 {
            return 0.0;
        }

        let capped = if unrestricted {
            rescaled
        } else {
            rescaled * self.cap_for(rescaled, enhancer)
        };

        if self.config.reversed {
            -capped
        } else {
            capped
        }
    }

    /// Applies the deadzone and stretches the remaining travel to `[-1, 1]`.
    #[inline]
    fn apply_deadzone(&self, value: f32) -> f32 {
        let abs_value = value.abs();
        if abs_value <= self.config.deadzone {
            0.0
        } else {
            value.signum() * (abs_value - self.config.deadzone) / (1.0 - self.config.deadzone)
        }
    }

    /// Effective cap for the direction of `value`.
    #[inline]
    fn cap_for(&self, value: f32, enhancer: Option<&SpeedEnhancer>) -> f32 {
        let (cap, offset) = if value < 0.0 {
            (self.config.cap_negative, enhancer.map_or(0.0, SpeedEnhancer::negative))
        } else {
            (self.config.cap_positive, enhancer.map_or(0.0, SpeedEnhancer::positive))
        };
        (cap + offset).clamp(0.0, 1.0)
    }
}

/// Raw value range an input device reports for one axis.
///
/// Gamepads differ: DualSense sticks report 0-255, many others report
/// -32768..32767. The range comes from the device's absinfo when it is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisRange {
    min: i32,
    max: i32,
}

impl Default for AxisRange {
    /// The 0-255 range DualSense-style gamepads report.
    fn default() -> Self {
        Self { min: 0, max: 255 }
    }
}

impl AxisRange {
    /// Creates a range, or `None` if it is empty.
    #[must_use]
    pub fn new(min: i32, max: i32) -> Option<Self> {
        (max > min).then_some(Self { min, max })
    }

    #[must_use]
    pub fn min(&self) -> i32 {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> i32 {
        self.max
    }

    /// Maps a raw value onto `[-1, 1]`, with the range midpoint at 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use drive_teleop::controller::axis::AxisRange;
    ///
    /// let byte = AxisRange::default();
    /// assert!((byte.normalize(0) - (-1.0)).abs() < 0.01);
    /// assert!((byte.normalize(128) - 0.0).abs() < 0.01);
    /// assert!((byte.normalize(255) - 1.0).abs() < 0.01);
    ///
    /// let signed = AxisRange::new(-32768, 32767).unwrap();
    /// assert!(signed.normalize(0).abs() < 0.001);
    /// ```
    #[must_use]
    pub fn normalize(&self, raw: i32) -> f32 {
        let center = (f64::from(self.min) + f64::from(self.max)) / 2.0;
        let half_span = (f64::from(self.max) - f64::from(self.min)) / 2.0;
        (((f64::from(raw) - center) / half_span) as f32).clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cond(deadzone: f32, reversed: bool) -> AxisConditioner {
        AxisConditioner::new(AxisConfig::new(deadzone, reversed, 1.0, 1.0))
    }

    // ==================== AxisConfig Tests ====================

    #[test]
    fn test_axis_config_clamps_fields() {
        let cfg = AxisConfig::new(-0.2, false, 1.5, -1.0);
        assert_eq!(cfg.deadzone, 0.0);
        assert_eq!(cfg.cap_negative, 1.0);
        assert_eq!(cfg.cap_positive, 0.0);

        let cfg = AxisConfig::new(1.0, false, 0.5, 0.5);
        assert!((cfg.deadzone - MAX_DEADZONE).abs() < 0.001);
    }

    #[test]
    fn test_axis_config_linear() {
        let cfg = AxisConfig::linear();
        assert_eq!(cfg.deadzone, 0.0);
        assert!(!cfg.reversed);
        assert_eq!(cfg.cap_negative, 1.0);
        assert_eq!(cfg.cap_positive, 1.0);
    }

    // ==================== Deadzone Tests ====================

    #[test]
    fn test_zero_input_is_zero_for_any_deadzone() {
        for dz in [0.01, 0.05, 0.16, 0.5, 0.9] {
            assert_eq!(cond(dz, false).apply(Some(0.0), None, false), 0.0);
            assert_eq!(cond(dz, true).apply(Some(0.0), None, false), 0.0);
        }
    }

    #[test]
    fn test_deadzone_boundary_maps_to_zero() {
        let c = cond(0.2, false);
        assert_eq!(c.apply(Some(0.2), None, false), 0.0);
        assert_eq!(c.apply(Some(-0.2), None, false), 0.0);
        assert_eq!(c.apply(Some(0.15), None, false), 0.0);
    }

    #[test]
    fn test_no_jump_just_above_deadzone() {
        let c = cond(0.2, false);
        let just_above = c.apply(Some(0.2001), None, false);
        assert!(just_above > 0.0);
        assert!(just_above < 0.001);

        let just_below = c.apply(Some(-0.2001), None, false);
        assert!(just_below < 0.0);
        assert!(just_below > -0.001);
    }

    #[test]
    fn test_rescale_reaches_full_range() {
        let c = cond(0.1, false);
        assert!((c.apply(Some(1.0), None, false) - 1.0).abs() < 0.001);
        assert!((c.apply(Some(-1.0), None, false) + 1.0).abs() < 0.001);
        // Halfway between deadzone and max
        assert!((c.apply(Some(0.55), None, false) - 0.5).abs() < 0.001);
    }

    // ==================== Reversal Tests ====================

    #[test]
    fn test_reversal_negates_output() {
        let normal = AxisConditioner::new(AxisConfig::new(0.1, false, 0.4, 0.8));
        let reversed = AxisConditioner::new(AxisConfig::new(0.1, true, 0.4, 0.8));
        let enhancer = SpeedEnhancer::new(0.1, -0.2);

        for v in [-1.0, -0.6, -0.11, 0.0, 0.05, 0.3, 0.75, 1.0] {
            for enh in [None, Some(&enhancer)] {
                for unrestricted in [false, true] {
                    let a = normal.apply(Some(v), enh, unrestricted);
                    let b = reversed.apply(Some(v), enh, unrestricted);
                    assert!((a + b).abs() < 1e-6, "v={} a={} b={}", v, a, b);
                }
            }
        }
    }

    // ==================== Cap Tests ====================

    #[test]
    fn test_caps_are_direction_specific() {
        let c = AxisConditioner::new(AxisConfig::new(0.0, false, 0.3, 0.6));
        assert!((c.apply(Some(1.0), None, false) - 0.6).abs() < 0.001);
        assert!((c.apply(Some(-1.0), None, false) + 0.3).abs() < 0.001);
    }

    #[test]
    fn test_unrestricted_ignores_caps() {
        let c = AxisConditioner::new(AxisConfig::new(0.0, false, 0.3, 0.6));
        assert!((c.apply(Some(1.0), None, true) - 1.0).abs() < 0.001);
        assert!((c.apply(Some(-1.0), None, true) + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_enhancer_relaxes_caps_independently() {
        let c = AxisConditioner::new(AxisConfig::new(0.0, false, 0.5, 0.5));
        let enhancer = SpeedEnhancer::new(0.1, 0.3);
        assert!((c.apply(Some(1.0), Some(&enhancer), false) - 0.8).abs() < 0.001);
        assert!((c.apply(Some(-1.0), Some(&enhancer), false) + 0.6).abs() < 0.001);
    }

    #[test]
    fn test_enhancer_never_exceeds_unit_range() {
        let c = AxisConditioner::new(AxisConfig::new(0.0, false, 0.9, 0.9));
        let enhancer = SpeedEnhancer::new(1.0, 1.0);
        assert!((c.apply(Some(1.0), Some(&enhancer), false) - 1.0).abs() < 0.001);

        let enhancer = SpeedEnhancer::new(-1.0, -1.0);
        assert_eq!(c.apply(Some(1.0), Some(&enhancer), false), 0.0);
    }

    #[test]
    fn test_enhancer_step_clamps() {
        let mut enhancer = SpeedEnhancer::default();
        enhancer.step(0.4);
        enhancer.step(0.4);
        enhancer.step(0.4);
        assert_eq!(enhancer.positive(), 1.0);
        assert_eq!(enhancer.negative(), 1.0);

        enhancer.reset();
        assert_eq!(enhancer, SpeedEnhancer::default());
    }

    // ==================== Safe Default Tests ====================

    #[test]
    fn test_absent_and_nan_input_yield_zero() {
        let c = cond(0.0, false);
        assert_eq!(c.apply(None, None, false), 0.0);
        assert_eq!(c.apply(Some(f32::NAN), None, false), 0.0);
    }

    #[test]
    fn test_out_of_range_input_is_clamped() {
        let c = cond(0.0, false);
        assert!((c.apply(Some(3.0), None, false) - 1.0).abs() < 0.001);
        assert!((c.apply(Some(-3.0), None, false) + 1.0).abs() < 0.001);
    }

    // ==================== Normalization Tests ====================

    #[test]
    fn test_byte_range_normalize() {
        let r = AxisRange::default();
        assert!((r.normalize(0) - (-1.0)).abs() < 0.01);
        assert!((r.normalize(128) - 0.0).abs() < 0.01);
        assert!((r.normalize(255) - 1.0).abs() < 0.01);
        assert!((r.normalize(192) - 0.5).abs() < 0.02);
    }

    #[test]
    fn test_signed_range_normalize() {
        let r = AxisRange::new(-32768, 32767).unwrap();
        assert!(r.normalize(0).abs() < 0.001);
        assert_eq!(r.normalize(-32768), -1.0);
        assert_eq!(r.normalize(32767), 1.0);
        assert!((r.normalize(16384) - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_range_clamps_out_of_range_raw() {
        let r = AxisRange::new(0, 1023).unwrap();
        assert_eq!(r.normalize(5000), 1.0);
        assert_eq!(r.normalize(-5), -1.0);
    }

    #[test]
    fn test_empty_range_rejected() {
        assert_eq!(AxisRange::new(10, 10), None);
        assert_eq!(AxisRange::new(10, -10), None);
    }
}
