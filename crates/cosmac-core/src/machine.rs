//! The machine engine: register file, memory, keypad latch, frame timing.
//!
//! One [`Machine`] is one complete emulated computer. All mutable state
//! lives in the instance, so independent machines can run side by side;
//! nothing is process-global.

use crate::api::{CpuSnapshot, HardwareHost, StepOutcome, KEY_LINES};
use crate::memory::MemoryMap;
use crate::opcode::{IDLE_OPCODE, OP_TABLE};
use crate::state::{FramePhase, RegisterFile, Scratch};
use crate::timing::{BULK_BUDGET, INSTRUCTION_COST, INTERRUPT_WINDOW_BUDGET};
use crate::variant::{Variant, VariantKind};
use crate::KeypadState;

/// One emulated machine: CPU, memory map, keypad latch and the NTSC frame
/// state machine, wired to a [`HardwareHost`].
#[derive(Debug)]
pub struct Machine<H> {
    pub(crate) regs: RegisterFile,
    pub(crate) memory: MemoryMap,
    pub(crate) host: H,
    pub(crate) kind: VariantKind,
    pub(crate) force_monitor_boot: bool,
    pub(crate) keypad: KeypadState,
    pub(crate) screen_enabled: bool,
    phase: FramePhase,
    budget: i16,
    screen_page: Option<u16>,
    scroll: u8,
}

impl<H: HardwareHost> Machine<H> {
    /// Builds a machine for `variant`, binding the caller-supplied RAM
    /// buffer, and applies the reset sequence.
    #[must_use]
    pub fn new(variant: Variant, ram: Vec<u8>, host: H) -> Self {
        let kind = variant.kind();
        let force_monitor_boot = matches!(
            variant,
            Variant::CosmacVip {
                force_monitor_boot: true,
                ..
            }
        );
        let mut machine = Self {
            regs: RegisterFile::default(),
            memory: MemoryMap::for_variant(variant, ram),
            host,
            kind,
            force_monitor_boot,
            keypad: KeypadState::for_variant(kind),
            screen_enabled: false,
            phase: FramePhase::Bulk,
            budget: BULK_BUDGET,
            screen_page: None,
            scroll: 0,
        };
        machine.reset();
        machine
    }

    /// Resets the CPU and frame state. The bound RAM buffer and its
    /// contents are kept, so reset never needs memory re-supplied.
    pub fn reset(&mut self) {
        self.regs.reset();
        if self.kind == VariantKind::CosmacVip {
            // Boot straight into the resident monitor; the U6A reset
            // latch that maps ROM over page zero is not modelled.
            self.regs.set_d(0x08);
            self.regs.set_r(Scratch::R0, 0x0008);
            self.regs.set_r(Scratch::R2, 0x800A);
            self.regs.set_p(Scratch::R2);
            self.regs.set_x(Scratch::R2);
        }
        self.phase = FramePhase::Bulk;
        self.budget = BULK_BUDGET;
        self.screen_enabled = false;
        self.screen_page = None;
        self.scroll = 0;
        self.keypad.reset();
    }

    /// Replaces the bound RAM buffer.
    pub fn bind_ram(&mut self, ram: Vec<u8>) {
        self.memory.bind_ram(ram);
    }

    /// Executes one instruction and accounts its cost against the current
    /// phase budget, switching phases when the budget runs out.
    pub fn step(&mut self) -> StepOutcome {
        let opcode = self.fetch_byte();
        self.budget -= INSTRUCTION_COST;
        self.execute(OP_TABLE[usize::from(opcode)]);
        if self.budget >= 0 {
            return StepOutcome::Executed;
        }
        let phase = self.switch_phase();
        // The budget times out by going negative, so the overshoot is
        // repaid out of the fresh budget.
        self.budget -= 1;
        StepOutcome::PhaseEntered(phase)
    }

    fn switch_phase(&mut self) -> FramePhase {
        match self.phase {
            FramePhase::Bulk => {
                self.phase = FramePhase::InterruptPreliminary;
                self.budget = INTERRUPT_WINDOW_BUDGET;
                if self.screen_enabled {
                    // A CPU parked on IDL comes out of it for the
                    // interrupt.
                    if self.memory.read(self.regs.pc()) == IDLE_OPCODE {
                        self.regs.set_pc(self.regs.pc().wrapping_add(1));
                    }
                    self.raise_interrupt();
                }
            }
            FramePhase::InterruptPreliminary => {
                self.phase = FramePhase::Bulk;
                self.budget = BULK_BUDGET;
                self.capture_screen_pointer();
                self.host.frame_sync();
                self.sample_keys();
            }
        }
        self.phase
    }

    /// Standard 1802 interrupt acknowledge: save `X,P` into `T`, force
    /// `P=1`, `X=2`, disable further interrupts. A no-op while `IE` is
    /// clear.
    fn raise_interrupt(&mut self) {
        if !self.regs.ie() {
            return;
        }
        let pair = self.regs.xp_pair();
        self.regs.set_t(pair);
        self.regs.set_x(Scratch::R2);
        self.regs.set_p(Scratch::R1);
        self.regs.set_ie(false);
    }

    /// After the 29-cycle window, `R0` points at screen RAM: the high byte
    /// is the page, the low byte the vertical scroll offset.
    #[allow(clippy::cast_possible_truncation)]
    fn capture_screen_pointer(&mut self) {
        let r0 = self.regs.r(Scratch::R0);
        let page = (r0 & 0xFF00).wrapping_sub(self.kind.screen_page_offset());
        self.screen_page = Some(page);
        self.scroll = (r0 & 0x00FF) as u8;
    }

    /// Samples all 16 key lines, highest index winning, and folds an edge
    /// into the keypad latch.
    fn sample_keys(&mut self) {
        let mut pressed = None;
        for key in 0..KEY_LINES {
            if self.host.read_keyboard(key) {
                pressed = Some(key);
            }
        }
        self.keypad.record_sample(pressed);
    }

    /// Copies bytes in through the memory map's write policy; loads that
    /// target read-only or unmapped windows are silently ignored.
    pub fn load_bytes(&mut self, address: u16, data: &[u8]) {
        self.memory.load_bytes(address, data);
    }

    /// Reads one byte through the variant's address decoding, for the
    /// debugger collaborator.
    #[must_use]
    pub fn read_byte(&self, address: u16) -> u8 {
        self.memory.read(address)
    }

    /// Current program counter, i.e. `R[P]`.
    #[must_use]
    pub const fn program_counter(&self) -> u16 {
        self.regs.pc()
    }

    /// Read-only copy of the register file, frame phase and remaining
    /// budget.
    #[must_use]
    pub fn snapshot(&self) -> CpuSnapshot {
        CpuSnapshot::capture(&self.regs, self.phase, self.budget)
    }

    /// Current frame phase.
    #[must_use]
    pub const fn phase(&self) -> FramePhase {
        self.phase
    }

    /// RAM byte offset of the current frame's screen memory, or `None`
    /// while the screen is disabled or no frame has captured one yet.
    #[must_use]
    pub const fn screen_page(&self) -> Option<u16> {
        if self.screen_enabled {
            self.screen_page
        } else {
            None
        }
    }

    /// Vertical scroll offset captured with the screen pointer.
    #[must_use]
    pub const fn scroll_offset(&self) -> u8 {
        self.scroll
    }

    /// Read view of the bound RAM buffer, for the raster collaborator.
    #[must_use]
    pub fn ram(&self) -> &[u8] {
        self.memory.ram()
    }

    /// The machine's hardware variant.
    #[must_use]
    pub const fn variant_kind(&self) -> VariantKind {
        self.kind
    }

    /// Shared access to the attached host.
    #[must_use]
    pub const fn host(&self) -> &H {
        &self.host
    }

    /// Exclusive access to the attached host.
    #[must_use]
    pub const fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}
