//! Fetch-decode-execute for the 1802 instruction set.
//!
//! One [`Machine::step`] runs exactly one instruction through
//! [`Machine::execute`]. No opcode faults: arithmetic wraps, `DF` carries
//! the carry/borrow, and the unassigned byte burns its time like a no-op.

// One match arm per opcode class keeps the dispatch readable even though
// the function is long.
#![allow(clippy::too_many_lines, clippy::match_same_arms)]

use crate::api::HardwareHost;
use crate::machine::Machine;
use crate::opcode::{Op, Predicate, Test};
use crate::state::Scratch;

impl<H: HardwareHost> Machine<H> {
    /// Reads the byte at `R[P]` and advances `R[P]`.
    pub(crate) fn fetch_byte(&mut self) -> u8 {
        let address = self.regs.pc();
        self.regs.set_pc(address.wrapping_add(1));
        self.memory.read(address)
    }

    /// Runs one classified opcode against the machine state.
    pub(crate) fn execute(&mut self, op: Op) {
        match op {
            // IDL parks the CPU on its own byte; the frame machine
            // advances past it when the interrupt arrives.
            Op::Idle => self.regs.set_pc(self.regs.pc().wrapping_sub(1)),
            Op::Ldn(reg) => {
                let value = self.memory.read(self.regs.r(reg));
                self.regs.set_d(value);
            }
            Op::Inc(reg) => self.regs.inc_r(reg),
            Op::Dec(reg) => self.regs.dec_r(reg),
            Op::ShortBranch(predicate) => self.short_branch(predicate),
            Op::Lda(reg) => {
                let value = self.memory.read(self.regs.r(reg));
                self.regs.set_d(value);
                self.regs.inc_r(reg);
            }
            Op::Str(reg) => {
                let address = self.regs.r(reg);
                self.memory.write(address, self.regs.d());
            }
            Op::Irx => self.regs.inc_r(self.regs.x()),
            Op::Out(port) => {
                let address = self.regs.r(self.regs.x());
                let data = self.memory.read(address);
                self.regs.inc_r(self.regs.x());
                self.output(port, data);
            }
            Op::Undefined => {}
            Op::Inp(port) => {
                let value = self.input(port);
                self.memory.write(self.regs.r(self.regs.x()), value);
                self.regs.set_d(value);
            }
            Op::Ret => self.restore_selectors(true),
            Op::Dis => self.restore_selectors(false),
            Op::Ldxa => {
                let value = self.memory.read(self.regs.r(self.regs.x()));
                self.regs.set_d(value);
                self.regs.inc_r(self.regs.x());
            }
            Op::Stxd => {
                let address = self.regs.r(self.regs.x());
                self.memory.write(address, self.regs.d());
                self.regs.dec_r(self.regs.x());
            }
            Op::Adc => {
                let operand = self.read_via_x();
                let carry = u8::from(self.regs.df());
                self.add_to_d(operand, carry);
            }
            Op::Sdb => {
                let operand = self.read_via_x();
                let borrow = u8::from(!self.regs.df());
                self.subtract_into_d(operand, self.regs.d(), borrow);
            }
            Op::Shrc => {
                let d = self.regs.d();
                let carry_in = if self.regs.df() { 0x80 } else { 0x00 };
                self.regs.set_df(d & 0x01 != 0);
                self.regs.set_d((d >> 1) | carry_in);
            }
            Op::Smb => {
                let operand = self.read_via_x();
                let borrow = u8::from(!self.regs.df());
                self.subtract_into_d(self.regs.d(), operand, borrow);
            }
            Op::Sav => {
                let address = self.regs.r(self.regs.x());
                self.memory.write(address, self.regs.t());
            }
            Op::Mark => {
                let pair = self.regs.xp_pair();
                self.regs.set_t(pair);
                let stack = self.regs.r(Scratch::R2);
                self.memory.write(stack, pair);
                self.regs.set_x(self.regs.p());
                self.regs.set_r(Scratch::R2, stack.wrapping_sub(1));
            }
            Op::Req => {
                self.regs.set_q(false);
                self.output(0, 0);
            }
            Op::Seq => {
                self.regs.set_q(true);
                self.output(0, 1);
            }
            Op::Adci => {
                let operand = self.fetch_byte();
                let carry = u8::from(self.regs.df());
                self.add_to_d(operand, carry);
            }
            Op::Sdbi => {
                let operand = self.fetch_byte();
                let borrow = u8::from(!self.regs.df());
                self.subtract_into_d(operand, self.regs.d(), borrow);
            }
            Op::Shlc => {
                let d = self.regs.d();
                let carry_in = u8::from(self.regs.df());
                self.regs.set_df(d & 0x80 != 0);
                self.regs.set_d((d << 1) | carry_in);
            }
            Op::Smbi => {
                let operand = self.fetch_byte();
                let borrow = u8::from(!self.regs.df());
                self.subtract_into_d(self.regs.d(), operand, borrow);
            }
            Op::Glo(reg) => {
                let value = self.regs.r(reg);
                self.regs.set_d(low_byte(value));
            }
            Op::Ghi(reg) => {
                let value = self.regs.r(reg);
                self.regs.set_d(high_byte(value));
            }
            Op::Plo(reg) => {
                let value = self.regs.r(reg);
                self.regs
                    .set_r(reg, (value & 0xFF00) | u16::from(self.regs.d()));
            }
            Op::Phi(reg) => {
                let value = self.regs.r(reg);
                self.regs
                    .set_r(reg, (value & 0x00FF) | (u16::from(self.regs.d()) << 8));
            }
            Op::LongBranch(predicate) => self.long_branch(predicate),
            Op::Nop => {}
            Op::LongSkip(predicate) => self.long_skip(predicate),
            Op::Sep(reg) => self.regs.set_p(reg),
            Op::Sex(reg) => self.regs.set_x(reg),
            Op::Ldx => {
                let value = self.read_via_x();
                self.regs.set_d(value);
            }
            Op::Or => {
                let operand = self.read_via_x();
                self.regs.set_d(self.regs.d() | operand);
            }
            Op::And => {
                let operand = self.read_via_x();
                self.regs.set_d(self.regs.d() & operand);
            }
            Op::Xor => {
                let operand = self.read_via_x();
                self.regs.set_d(self.regs.d() ^ operand);
            }
            Op::Add => {
                let operand = self.read_via_x();
                self.add_to_d(operand, 0);
            }
            Op::Sd => {
                let operand = self.read_via_x();
                self.subtract_into_d(operand, self.regs.d(), 0);
            }
            Op::Shr => {
                let d = self.regs.d();
                self.regs.set_df(d & 0x01 != 0);
                self.regs.set_d(d >> 1);
            }
            Op::Sm => {
                let operand = self.read_via_x();
                self.subtract_into_d(self.regs.d(), operand, 0);
            }
            Op::Ldi => {
                let operand = self.fetch_byte();
                self.regs.set_d(operand);
            }
            Op::Ori => {
                let operand = self.fetch_byte();
                self.regs.set_d(self.regs.d() | operand);
            }
            Op::Ani => {
                let operand = self.fetch_byte();
                self.regs.set_d(self.regs.d() & operand);
            }
            Op::Xri => {
                let operand = self.fetch_byte();
                self.regs.set_d(self.regs.d() ^ operand);
            }
            Op::Adi => {
                let operand = self.fetch_byte();
                self.add_to_d(operand, 0);
            }
            Op::Sdi => {
                let operand = self.fetch_byte();
                self.subtract_into_d(operand, self.regs.d(), 0);
            }
            Op::Shl => {
                let d = self.regs.d();
                self.regs.set_df(d & 0x80 != 0);
                self.regs.set_d(d << 1);
            }
            Op::Smi => {
                let operand = self.fetch_byte();
                self.subtract_into_d(self.regs.d(), operand, 0);
            }
        }
    }

    /// `RET`/`DIS`: read the saved `X,P` pair through `R(X)`, advance
    /// `R(X)`, then set or clear the interrupt-enable flag.
    fn restore_selectors(&mut self, enable_interrupts: bool) {
        let address = self.regs.r(self.regs.x());
        let pair = self.memory.read(address);
        self.regs.set_r(self.regs.x(), address.wrapping_add(1));
        self.regs.set_x(Scratch::from_nibble(pair >> 4));
        self.regs.set_p(Scratch::from_nibble(pair & 0x0F));
        self.regs.set_ie(enable_interrupts);
    }

    /// Reads the byte the data pointer `R(X)` addresses.
    fn read_via_x(&mut self) -> u8 {
        self.memory.read(self.regs.r(self.regs.x()))
    }

    /// `D = D + operand + carry_in`, `DF` receives the carry out.
    fn add_to_d(&mut self, operand: u8, carry_in: u8) {
        let sum = u16::from(self.regs.d()) + u16::from(operand) + u16::from(carry_in);
        #[allow(clippy::cast_possible_truncation)]
        self.regs.set_d((sum & 0x00FF) as u8);
        self.regs.set_df(sum > 0x00FF);
    }

    /// `D = minuend - subtrahend - borrow_in`; `DF` is set when no borrow
    /// was needed, the 1802's subtract convention.
    fn subtract_into_d(&mut self, minuend: u8, subtrahend: u8, borrow_in: u8) {
        let difference =
            i16::from(minuend) - i16::from(subtrahend) - i16::from(borrow_in);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        self.regs.set_d((difference & 0x00FF) as u8);
        self.regs.set_df(difference >= 0);
    }

    /// Short branches stay on the page the operand byte occupies: taken,
    /// the operand replaces the low byte of `R[P]`; not taken, `R[P]`
    /// steps past the operand.
    fn short_branch(&mut self, predicate: Predicate) {
        let operand_address = self.regs.pc();
        let target = self.memory.read(operand_address);
        if self.predicate_holds(predicate) {
            self.regs
                .set_pc((operand_address & 0xFF00) | u16::from(target));
        } else {
            self.regs.set_pc(operand_address.wrapping_add(1));
        }
    }

    /// Long branches carry a full 16-bit target, high byte first.
    fn long_branch(&mut self, predicate: Predicate) {
        let high = self.fetch_byte();
        let low = self.fetch_byte();
        if self.predicate_holds(predicate) {
            self.regs
                .set_pc((u16::from(high) << 8) | u16::from(low));
        }
    }

    /// Long skips step `R[P]` over the next two bytes when the predicate
    /// holds.
    fn long_skip(&mut self, predicate: Predicate) {
        if self.predicate_holds(predicate) {
            self.regs.set_pc(self.regs.pc().wrapping_add(2));
        }
    }

    fn predicate_holds(&mut self, predicate: Predicate) -> bool {
        let sampled = match predicate.test {
            Test::Unconditional => true,
            Test::QSet => self.regs.q(),
            Test::DIsZero => self.regs.d() == 0,
            Test::DfSet => self.regs.df(),
            Test::Line(line) => self.ef(line),
            Test::InterruptsEnabled => self.regs.ie(),
        };
        sampled != predicate.negated
    }
}

#[allow(clippy::cast_possible_truncation)]
const fn low_byte(value: u16) -> u8 {
    (value & 0x00FF) as u8
}

#[allow(clippy::cast_possible_truncation)]
const fn high_byte(value: u16) -> u8 {
    (value >> 8) as u8
}
