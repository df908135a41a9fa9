//! Port and external-flag dispatch.
//!
//! Reached only from the executor while it runs I/O-class opcodes. Port
//! and flag wiring differs per variant; anything a variant does not wire
//! is a no-op (outputs) or reads as zero (inputs).

use crate::api::{HardwareHost, KeypadGroup};
use crate::machine::Machine;
use crate::opcode::EfLine;
use crate::variant::VariantKind;

/// Program counter at which the VIP monitor probes the keypad during boot.
const MONITOR_BOOT_PROBE_PC: u16 = 0x8024;

/// Key-select value the monitor's boot probe has latched at that point.
const MONITOR_BOOT_PROBE_SELECT: u8 = 0x0C;

impl<H: HardwareHost> Machine<H> {
    /// Output-port dispatch. Port 0 is not reachable from `OUT`; it is the
    /// internal path `SEQ`/`REQ` use to report the `Q` flip-flop.
    pub(crate) fn output(&mut self, port: u8, data: u8) {
        match port {
            0 => self.host.set_output_flag(data != 0),
            // OUT 1 turns the display off.
            1 => self.screen_enabled = false,
            // OUT 2 sets the key-select latch (VIP and Studio II).
            2 => self.keypad.select(data),
            // OUT 4 drives the hex digit display on the Elf.
            4 if self.kind == VariantKind::Elf2 => self.host.update_display(data),
            _ => {}
        }
    }

    /// Input-port dispatch. Unwired ports read as zero.
    pub(crate) fn input(&mut self, port: u8) -> u8 {
        match port {
            // IN 1 turns the display on.
            1 => {
                self.screen_enabled = true;
                0
            }
            // IN 4 reads the keypad shift register on the Elf.
            4 if self.kind == VariantKind::Elf2 => self.keypad.latch(),
            _ => 0,
        }
    }

    /// Samples one external flag line.
    pub(crate) fn ef(&mut self, line: EfLine) -> bool {
        match line {
            // EF1 marks "inside the display period" on real hardware.
            // Video timing is not cycle-replicated, so the line is wired
            // permanently asserted and BN1 in interrupt handlers never
            // succeeds.
            EfLine::Ef1 => true,
            EfLine::Ef2 => false,
            EfLine::Ef3 => self.ef3(),
            EfLine::Ef4 => self.ef4(),
        }
    }

    /// EF3 reports "a key is down", differently wired per machine.
    fn ef3(&mut self) -> bool {
        match self.kind {
            VariantKind::CosmacVip => {
                let pressed = self.host.read_keyboard(self.keypad.latch());
                if self.force_monitor_boot
                    && self.regs.pc() == MONITOR_BOOT_PROBE_PC
                    && self.keypad.latch() == MONITOR_BOOT_PROBE_SELECT
                {
                    // Compatibility patch: answer the monitor's boot-time
                    // keypad probe so the monitor runs whatever is held.
                    return true;
                }
                pressed
            }
            VariantKind::Elf2 => self.keypad.current_key().is_some(),
            VariantKind::Studio2 => {
                self.host.set_keypad_group(KeypadGroup::Player1);
                self.host.read_keyboard(self.keypad.latch())
            }
        }
    }

    /// EF4 reports the secondary key (Elf) or the player-two keypad
    /// (Studio II).
    fn ef4(&mut self) -> bool {
        match self.kind {
            VariantKind::CosmacVip => false,
            // The line reads low while the I key is held.
            VariantKind::Elf2 => !self.host.read_secondary_key(),
            VariantKind::Studio2 => {
                self.host.set_keypad_group(KeypadGroup::Player2);
                self.host.read_keyboard(self.keypad.latch())
            }
        }
    }
}
