//! # Control Module
//!
//! The per-tick operator-control loop and the mode state it owns.
//!
//! This module handles:
//! - Persisted toggle flags ([`toggles`])
//! - Orchestrating input, mixing, ramping and dispatch each tick ([`teleop`])

pub mod teleop;
pub mod toggles;

pub use teleop::ControlLoop;
