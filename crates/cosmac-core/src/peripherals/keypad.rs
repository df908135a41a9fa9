//! Per-variant keyboard latch and frame-edge key sampling.
//!
//! Two latch shapes exist in the family. The VIP and Studio II drive a
//! 4-bit select latch from `OUT 2` and test the selected key line through
//! `EF3`/`EF4`. The Elf II instead accumulates the last two hex keypad
//! presses in an 8-bit shift register readable through `INP 4`.

use crate::variant::VariantKind;

/// Shape of the keyboard latch a variant wires up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LatchShape {
    /// 4-bit key-select value written by `OUT 2`.
    Select,
    /// Two-nibble shift register fed by new key presses.
    ShiftAccumulator,
}

impl LatchShape {
    /// Latch shape for a machine variant.
    #[must_use]
    pub const fn for_variant(kind: VariantKind) -> Self {
        match kind {
            VariantKind::CosmacVip | VariantKind::Studio2 => Self::Select,
            VariantKind::Elf2 => Self::ShiftAccumulator,
        }
    }
}

/// Keyboard latch plus the key sample taken each frame.
///
/// `current` holds the highest-priority key seen during the last
/// interrupt-preliminary sampling pass, or `None` when nothing was down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeypadState {
    shape: LatchShape,
    latch: u8,
    current: Option<u8>,
}

impl KeypadState {
    /// Creates the latch state for a variant.
    #[must_use]
    pub const fn for_variant(kind: VariantKind) -> Self {
        Self {
            shape: LatchShape::for_variant(kind),
            latch: 0,
            current: None,
        }
    }

    /// Clears the latch and the current-key sample.
    pub const fn reset(&mut self) {
        self.latch = 0;
        self.current = None;
    }

    /// Current latch value.
    #[must_use]
    pub const fn latch(&self) -> u8 {
        self.latch
    }

    /// Key sampled during the last frame, if any.
    #[must_use]
    pub const fn current_key(&self) -> Option<u8> {
        self.current
    }

    /// `OUT 2` path: stores the low nibble as the key-select value.
    /// Ignored on the shift-accumulator shape, whose latch is fed only by
    /// sampling.
    pub const fn select(&mut self, value: u8) {
        if matches!(self.shape, LatchShape::Select) {
            self.latch = value & 0x0F;
        }
    }

    /// Records one per-frame key sample. Only an edge (a sample differing
    /// from the previous frame's) changes state; on the shift-accumulator
    /// shape a newly pressed key is shifted into the latch.
    pub const fn record_sample(&mut self, key: Option<u8>) {
        // const-compatible Option<u8> comparison
        let changed = match (self.current, key) {
            (None, None) => false,
            (Some(previous), Some(next)) => previous != next,
            _ => true,
        };
        if !changed {
            return;
        }
        self.current = key;
        if let (LatchShape::ShiftAccumulator, Some(pressed)) = (self.shape, key) {
            self.latch = (self.latch << 4) | (pressed & 0x0F);
        }
    }
}
