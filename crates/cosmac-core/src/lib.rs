//! CPU and frame-timing core for the RCA COSMAC 1802 machine family.
//!
//! Emulates the 1802 and the minimal support chipset of three selectable
//! machines (COSMAC VIP, Netronics Elf II, RCA Studio II), multiplexing
//! guest execution against the fixed NTSC frame budget so a raster
//! collaborator can paint a synchronized picture. Hosts drive it one
//! instruction at a time through [`Machine::step`] and supply keyboard,
//! sound and pacing services through [`HardwareHost`].

/// Public host-facing contracts and integration types.
pub mod api;
pub use api::{
    CpuSnapshot, HardwareHost, KeypadGroup, NullHost, StepOutcome, KEY_LINES,
};

/// Architectural CPU state model primitives.
pub mod state;
pub use state::{FramePhase, RegisterFile, Scratch, SCRATCH_REGISTER_COUNT};

/// Memory model primitives and per-variant address decoding.
pub mod memory;
pub use memory::{
    new_ram, MemoryMap, MONITOR_BASE, STUDIO2_RAM_BASE, STUDIO2_RAM_END, STUDIO2_WINDOW_MASK,
};

/// Hardware variant descriptors and ROM image validation.
pub mod variant;
pub use variant::{
    RomImage, RomImageError, Variant, VariantKind, MONITOR_ROM_BYTES, STUDIO2_ROM_BYTES,
};

/// Deterministic opcode classification tables.
pub mod opcode;
pub use opcode::{decode, EfLine, Op, Predicate, Test, IDLE_OPCODE, OP_TABLE};

/// NTSC clock-divisor chain and frame-phase budgets.
pub mod timing;
pub use timing::{
    BULK_BUDGET, CLOCKS_PER_CYCLE, CLOCK_HZ, CYCLES_PER_FRAME, CYCLES_PER_LINE,
    CYCLES_PER_SECOND, FRAMES_PER_SECOND, INSTRUCTION_COST, INTERRUPT_WINDOW_BUDGET,
    LINES_PER_FRAME, NON_DISPLAY_LINES, VISIBLE_LINES,
};

/// Support-chip peripherals adjacent to the CPU core.
pub mod peripherals;
pub use peripherals::{KeypadState, LatchShape};

/// The machine engine and frame state machine.
pub mod machine;
pub use machine::Machine;

mod execute;
mod io;

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
