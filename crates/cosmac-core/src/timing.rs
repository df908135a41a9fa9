//! NTSC clock-divisor chain and frame-phase budgets.
//!
//! The video generator steals the CPU during the visible lines of each
//! frame, so guest execution only happens during the non-display lines.
//! Everything below derives from the crystal: clock over eight clocks per
//! machine cycle gives cycles per second, over the frame rate gives cycles
//! per frame, over the line count gives cycles per line.

/// CPU clock frequency in Hz (half the 3.52128 MHz crystal).
pub const CLOCK_HZ: u32 = 3_521_280 / 2;

/// Clock pulses per machine cycle.
pub const CLOCKS_PER_CYCLE: u32 = 8;

/// Machine cycles per second (220,080).
pub const CYCLES_PER_SECOND: u32 = CLOCK_HZ / CLOCKS_PER_CYCLE;

/// NTSC frames per second.
pub const FRAMES_PER_SECOND: u32 = 60;

/// Scan lines per NTSC frame.
pub const LINES_PER_FRAME: u32 = 262;

/// Machine cycles in one complete frame (3668).
pub const CYCLES_PER_FRAME: u32 = CYCLES_PER_SECOND / FRAMES_PER_SECOND;

/// Machine cycles in one scan line (14).
pub const CYCLES_PER_LINE: u32 = CYCLES_PER_FRAME / LINES_PER_FRAME;

/// Visible scan lines per frame.
pub const VISIBLE_LINES: u32 = 128;

/// Scan lines per frame with no display DMA (134).
pub const NON_DISPLAY_LINES: u32 = LINES_PER_FRAME - VISIBLE_LINES;

/// Cycle budget of the bulk execution phase (1876): the cycles per frame
/// during which the CPU is not generating video.
#[allow(clippy::cast_possible_truncation)]
pub const BULK_BUDGET: i16 = (NON_DISPLAY_LINES * CYCLES_PER_LINE) as i16;

/// Cycle budget of the interrupt-preliminary phase: the 29 cycles between
/// the interrupt and the first display DMA.
pub const INTERRUPT_WINDOW_BUDGET: i16 = 29;

/// Flat cost deducted per instruction: one fetch plus one execute machine
/// cycle. Not historically exact per opcode, but tuned so the aggregate
/// budget per frame matches the scan-line arithmetic above.
pub const INSTRUCTION_COST: i16 = 2;
