//! Host-facing contracts for embedding the core.
//!
//! The engine is synchronous and single-threaded: it advances one guest
//! instruction per [`crate::Machine::step`] call on the caller's thread and
//! reaches the outside world only through the [`HardwareHost`] trait. The
//! one point where a host may block is [`HardwareHost::frame_sync`], which
//! pins emulation to the 60 Hz frame boundary.

use crate::state::{FramePhase, RegisterFile, Scratch, SCRATCH_REGISTER_COUNT};

/// Number of key lines sampled once per frame (key indices `0..=15`).
pub const KEY_LINES: u8 = 16;

/// Physical keypad group selected on machines with two keypads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeypadGroup {
    /// Player-one keypad.
    Player1,
    /// Player-two keypad.
    Player2,
}

/// Hardware services the core calls into.
///
/// The six commands of the hardware command protocol, as typed methods.
/// Implementations own key scanning, sound/LED output and real-time
/// pacing; none of that lives in the core.
pub trait HardwareHost {
    /// Polls the key matrix: `true` when the key at `key` (0–15) is down.
    fn read_keyboard(&mut self, key: u8) -> bool;

    /// Drives the sound/output indicator from the `Q` flip-flop.
    fn set_output_flag(&mut self, on: bool);

    /// Called once per frame; may block until the next 1/60 s boundary.
    /// A cooperative host can treat this as its yield point.
    fn frame_sync(&mut self);

    /// Polls the dedicated secondary/interrupt key.
    fn read_secondary_key(&mut self) -> bool;

    /// Updates the auxiliary digit display (Elf II only).
    fn update_display(&mut self, value: u8);

    /// Selects which physical keypad group maps onto the logical keys
    /// (Studio II only).
    fn set_keypad_group(&mut self, group: KeypadGroup);
}

/// Host with nothing attached: no keys ever down, outputs discarded,
/// frame sync returns immediately. Useful for tests and headless runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHost;

impl HardwareHost for NullHost {
    fn read_keyboard(&mut self, _key: u8) -> bool {
        false
    }

    fn set_output_flag(&mut self, _on: bool) {}

    fn frame_sync(&mut self) {}

    fn read_secondary_key(&mut self) -> bool {
        false
    }

    fn update_display(&mut self, _value: u8) {}

    fn set_keypad_group(&mut self, _group: KeypadGroup) {}
}

/// Result of advancing the machine by one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// The instruction retired inside the current frame phase.
    Executed,
    /// The phase budget ran out and the machine entered the given phase.
    /// Entering [`FramePhase::InterruptPreliminary`] marks the end of one
    /// video frame's execution window.
    PhaseEntered(FramePhase),
}

impl StepOutcome {
    /// Returns the phase just entered, if this step switched phases.
    #[must_use]
    pub const fn phase_entered(self) -> Option<FramePhase> {
        match self {
            Self::Executed => None,
            Self::PhaseEntered(phase) => Some(phase),
        }
    }
}

/// Read-only copy of the machine state for the debugger collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CpuSnapshot {
    /// Scratch registers `R0..R15`.
    pub r: [u16; SCRATCH_REGISTER_COUNT],
    /// Accumulator `D`.
    pub d: u8,
    /// Carry/borrow flag `DF`.
    pub df: bool,
    /// Program-counter selector `P`.
    pub p: Scratch,
    /// Data-pointer selector `X`.
    pub x: Scratch,
    /// Saved `X,P` pair `T`.
    pub t: u8,
    /// Interrupt-enable flag.
    pub ie: bool,
    /// `Q` output flip-flop.
    pub q: bool,
    /// Current frame phase.
    pub phase: FramePhase,
    /// Cycles remaining in the current phase.
    pub budget: i16,
}

impl CpuSnapshot {
    pub(crate) fn capture(regs: &RegisterFile, phase: FramePhase, budget: i16) -> Self {
        let mut r = [0; SCRATCH_REGISTER_COUNT];
        for (slot, reg) in r.iter_mut().zip(Scratch::ALL.iter().copied()) {
            *slot = regs.r(reg);
        }
        Self {
            r,
            d: regs.d(),
            df: regs.df(),
            p: regs.p(),
            x: regs.x(),
            t: regs.t(),
            ie: regs.ie(),
            q: regs.q(),
            phase,
            budget,
        }
    }
}
