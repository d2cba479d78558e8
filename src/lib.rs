//! # Drive Teleop Library
//!
//! Drive a differential-drive robot from a gamepad.
//!
//! This library provides the operator-control pipeline: it reads gamepad
//! axes and buttons, shapes them into wheel speeds (deadzone, speed caps,
//! wheel lock, heading hold, acceleration ramp), drives auxiliary mechanisms
//! and gives rumble feedback on mode changes.

pub mod config;
pub mod control;
pub mod controller;
pub mod drive;
pub mod error;
pub mod hal;
pub mod haptics;
