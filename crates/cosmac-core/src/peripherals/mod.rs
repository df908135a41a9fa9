//! Support-chip peripherals adjacent to the CPU core.

/// Keyboard select latch and once-per-frame key sampling.
pub mod keypad;

pub use keypad::{KeypadState, LatchShape};
