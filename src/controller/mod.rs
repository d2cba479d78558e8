//! # Controller Module
//!
//! Operator gamepad input handling.
//!
//! This module handles:
//! - Gamepad detection and event reading via evdev ([`gamepad`], [`mapper`])
//! - Reading bound channels into a per-tick sample ([`sample`])
//! - Deadzone, rescale and speed caps ([`axis`])
//! - Press edges and toggle flips ([`buttons`])

pub mod axis;
pub mod buttons;
pub mod gamepad;
pub mod mapper;
pub mod sample;
