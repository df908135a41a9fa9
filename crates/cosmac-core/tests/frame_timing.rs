//! Frame-phase alternation, interrupt delivery, screen capture and
//! keyboard edge sampling.

mod common;

use common::ScriptedHost;
use cosmac_core::{
    FramePhase, KeypadGroup, Machine, Scratch, StepOutcome, Variant, MONITOR_ROM_BYTES,
    STUDIO2_ROM_BYTES,
};
use proptest as _;
use rstest as _;
use thiserror as _;

/// Elf machine whose RAM is NOP-filled, with `program` loaded at zero.
fn elf_machine(program: &[u8]) -> Machine<ScriptedHost> {
    let mut machine = Machine::new(Variant::elf2(), vec![0xC4; 0x1000], ScriptedHost::default());
    machine.load_bytes(0x0000, program);
    machine
}

/// Steps until the machine reports entering `phase`.
fn run_to_phase(machine: &mut Machine<ScriptedHost>, phase: FramePhase) {
    loop {
        if machine.step() == StepOutcome::PhaseEntered(phase) {
            return;
        }
    }
}

#[test]
fn outcomes_report_alternating_phase_entries() {
    let mut machine = elf_machine(&[]);
    let mut entered = Vec::new();
    while entered.len() < 4 {
        if let Some(phase) = machine.step().phase_entered() {
            entered.push(phase);
        }
    }
    assert_eq!(
        entered,
        vec![
            FramePhase::InterruptPreliminary,
            FramePhase::Bulk,
            FramePhase::InterruptPreliminary,
            FramePhase::Bulk,
        ]
    );
}

#[test]
fn frame_sync_is_issued_once_per_frame() {
    let mut machine = elf_machine(&[]);
    assert_eq!(machine.host().frame_syncs, 0);
    run_to_phase(&mut machine, FramePhase::Bulk);
    assert_eq!(machine.host().frame_syncs, 1);
    run_to_phase(&mut machine, FramePhase::Bulk);
    assert_eq!(machine.host().frame_syncs, 2);
}

#[test]
fn interrupt_is_delivered_when_screen_enabled_and_ie_set() {
    // SEX R5 gives the saved X,P pair a recognisable value, INP 1 turns
    // the screen on, then NOPs run out the frame.
    let mut machine = elf_machine(&[0xE5, 0x69]);
    run_to_phase(&mut machine, FramePhase::InterruptPreliminary);

    let snapshot = machine.snapshot();
    assert_eq!(snapshot.p, Scratch::R1);
    assert_eq!(snapshot.x, Scratch::R2);
    assert!(!snapshot.ie);
    assert_eq!(snapshot.t, 0x50); // X was R5, P was R0
}

#[test]
fn no_interrupt_while_the_screen_is_disabled() {
    let mut machine = elf_machine(&[]);
    run_to_phase(&mut machine, FramePhase::InterruptPreliminary);

    let snapshot = machine.snapshot();
    assert_eq!(snapshot.p, Scratch::R0);
    assert_eq!(snapshot.x, Scratch::R0);
    assert!(snapshot.ie);
}

#[test]
fn no_interrupt_while_ie_is_clear() {
    // DIS reads the pair 0x00 (X = R0, P = R0) and clears IE; INP 1 then
    // enables the screen.
    let mut machine = elf_machine(&[
        0xF8, 0x02, 0xB5, 0xF8, 0x00, 0xA5, // R5 = 0x0200
        0xE5, // SEX R5
        0x71, // DIS
        0x69, // INP 1
    ]);
    machine.load_bytes(0x0200, &[0x00]);
    run_to_phase(&mut machine, FramePhase::InterruptPreliminary);

    let snapshot = machine.snapshot();
    assert!(!snapshot.ie);
    assert_eq!(snapshot.p, Scratch::R0);
    // T was never written.
    assert_eq!(snapshot.t, 0x00);
}

#[test]
fn a_parked_idl_wakes_for_the_interrupt() {
    // INP 1 enables the screen, then IDL parks the CPU at address 1.
    let mut machine = elf_machine(&[0x69, 0x00]);
    for _ in 0..16 {
        machine.step();
    }
    assert_eq!(machine.program_counter(), 0x0001);

    run_to_phase(&mut machine, FramePhase::InterruptPreliminary);
    // The interrupt advanced R0 past the IDL before borrowing the PC.
    assert_eq!(machine.snapshot().r[0], 0x0002);
    assert_eq!(machine.snapshot().p, Scratch::R1);
}

#[test]
fn a_parked_idl_stays_parked_with_the_screen_off() {
    let mut machine = elf_machine(&[0x00]);
    run_to_phase(&mut machine, FramePhase::InterruptPreliminary);
    assert_eq!(machine.program_counter(), 0x0000);
}

#[test]
fn screen_pointer_is_captured_from_r0_each_frame() {
    // Move the PC off R0 first, then point R0 at page 0x09 with a scroll
    // offset of 5.
    let mut machine = elf_machine(&[
        0xF8, 0x01, 0xB3, 0xF8, 0x10, 0xA3, // R3 = 0x0110
        0xD3, // SEP R3
    ]);
    machine.load_bytes(
        0x0110,
        &[
            0x69, // INP 1: screen on
            0xF8, 0x09, 0xB0, // PHI R0: R0 = 0x09xx
            0xF8, 0x05, 0xA0, // PLO R0: R0 = 0x0905
        ],
    );
    assert_eq!(machine.screen_page(), None);
    run_to_phase(&mut machine, FramePhase::Bulk);
    assert_eq!(machine.screen_page(), Some(0x0900));
    assert_eq!(machine.scroll_offset(), 0x05);
}

#[test]
fn studio2_screen_page_lands_in_its_ram_window() {
    // ROM bootstraps into the RAM window at 0x0810, where the loaded
    // program enables the screen and points R0 at page 0x09. The captured
    // pointer is a RAM offset, so the 0x800 window base is subtracted.
    let mut rom = vec![0xC4_u8; STUDIO2_ROM_BYTES];
    rom[..7].copy_from_slice(&[0xF8, 0x08, 0xB3, 0xF8, 0x10, 0xA3, 0xD3]);
    let variant = Variant::studio2(&rom).expect("valid rom image");
    let mut machine = Machine::new(variant, vec![0; 512], ScriptedHost::default());
    machine.load_bytes(
        0x0810,
        &[
            0x69, // INP 1
            0xF8, 0x09, 0xB0, // PHI R0
            0x30, 0x14, // BR 0x14: loop here, clear of the screen page
        ],
    );
    run_to_phase(&mut machine, FramePhase::Bulk);
    assert_eq!(machine.screen_page(), Some(0x0100));
}

#[test]
fn elf_latch_shifts_a_new_key_and_holds_on_release() {
    // Key 5 held through the first frame, released before the second.
    // INP 4 injected at the current PC reads the latch back into D.
    let mut machine = elf_machine(&[]);
    machine.host_mut().press(0x05);
    run_to_phase(&mut machine, FramePhase::Bulk);

    let pc = machine.program_counter();
    machine.load_bytes(pc, &[0xE5, 0x6C]); // SEX R5; INP 4
    machine.step();
    machine.step();
    assert_eq!(machine.snapshot().d, 0x05);

    // Released: the current-key sample clears but the accumulator holds,
    // since there is no new key to shift in.
    machine.host_mut().release_all();
    run_to_phase(&mut machine, FramePhase::Bulk);
    let pc = machine.program_counter();
    machine.load_bytes(pc, &[0x6C]);
    machine.step();
    assert_eq!(machine.snapshot().d, 0x05);

    // A second key shifts under the first nibble.
    machine.host_mut().press(0x0A);
    run_to_phase(&mut machine, FramePhase::Bulk);
    let pc = machine.program_counter();
    machine.load_bytes(pc, &[0x6C]);
    machine.step();
    assert_eq!(machine.snapshot().d, 0x5A);
}

#[test]
fn highest_key_line_wins_the_sample() {
    let mut machine = elf_machine(&[]);
    machine.host_mut().press(0x03);
    machine.host_mut().press(0x09);
    run_to_phase(&mut machine, FramePhase::Bulk);

    let pc = machine.program_counter();
    machine.load_bytes(pc, &[0xE5, 0x6C]); // SEX R5; INP 4
    machine.step();
    machine.step();
    assert_eq!(machine.snapshot().d, 0x09);
}

#[test]
fn elf_ef3_follows_the_sampled_current_key() {
    let mut machine = elf_machine(&[0x36, 0x77]); // B3
    // No sample yet: EF3 is clear and B3 falls through.
    machine.step();
    assert_eq!(machine.program_counter(), 0x0002);

    machine.host_mut().press(0x03);
    run_to_phase(&mut machine, FramePhase::Bulk);
    let pc = machine.program_counter();
    machine.load_bytes(pc, &[0x36, 0x77]);
    machine.step();
    assert_eq!(machine.program_counter() & 0x00FF, 0x0077);
}

#[test]
fn elf_ef4_inverts_the_secondary_key() {
    let mut machine = elf_machine(&[0x37, 0x55]); // B4
    machine.step();
    assert_eq!(machine.program_counter(), 0x0055);

    let mut machine = elf_machine(&[0x37, 0x55]);
    machine.host_mut().secondary_down = true;
    machine.step();
    assert_eq!(machine.program_counter(), 0x0002);
}

#[test]
fn vip_select_latch_ignores_sampling_edges() {
    // The monitor immediately jumps into NOP-filled RAM; the select latch
    // is then observed through EF3, which polls the selected key line.
    let mut monitor = vec![0xC4_u8; MONITOR_ROM_BYTES];
    monitor[0x0A..0x0D].copy_from_slice(&[0xC0, 0x00, 0x00]); // LBR 0x0000
    let variant = Variant::cosmac_vip(&monitor).expect("valid monitor image");
    let mut machine = Machine::new(variant, vec![0xC4; 0x1000], ScriptedHost::default());
    machine.step();
    assert_eq!(machine.program_counter(), 0x0000);

    machine.host_mut().press(0x05);
    run_to_phase(&mut machine, FramePhase::Bulk);

    // Sampling saw key 5, but the select latch still addresses line 0,
    // which is up: B3 falls through.
    let pc = machine.program_counter();
    machine.load_bytes(pc, &[0x36, 0x77]);
    machine.step();
    assert_eq!(machine.program_counter(), pc.wrapping_add(2));

    // OUT 2 (inline data: X == P after VIP reset) selects line 5: B3
    // branches.
    let pc = machine.program_counter();
    machine.load_bytes(pc, &[0x62, 0x05, 0x36, 0x77]);
    machine.step();
    machine.step();
    assert_eq!(machine.program_counter() & 0x00FF, 0x0077);
}

#[test]
fn studio2_flag_lines_select_their_keypad_group() {
    let mut rom = vec![0xC4_u8; STUDIO2_ROM_BYTES];
    // B3 then B4: each flag sample selects its keypad group first.
    rom[..4].copy_from_slice(&[0x36, 0x00, 0x37, 0x00]);
    let variant = Variant::studio2(&rom).expect("valid rom image");
    let mut machine = Machine::new(variant, vec![0; 512], ScriptedHost::default());
    machine.step();
    machine.step();
    assert_eq!(
        machine.host().groups,
        vec![KeypadGroup::Player1, KeypadGroup::Player2]
    );
}

#[test]
fn vip_monitor_boot_patch_forces_the_keypad_probe() {
    // The monitor image latches select 0x0C through OUT 2 (inline data,
    // X = P), pads to 0x8023, then probes EF3 with B3.
    let mut monitor = vec![0xC4_u8; MONITOR_ROM_BYTES];
    monitor[0x0A] = 0x62; // OUT 2, data follows inline (X == P)
    monitor[0x0B] = 0x0C;
    monitor[0x23] = 0x36; // B3 at 0x8023; EF3 samples with PC at 0x8024
    monitor[0x24] = 0x30;

    // One OUT 2, 23 NOPs (0x800C..=0x8022), then the B3: 25 steps.
    let patched =
        Variant::cosmac_vip_with_monitor_boot(&monitor).expect("valid monitor image");
    let mut machine = Machine::new(patched, vec![0; 0x1000], ScriptedHost::default());
    for _ in 0..25 {
        machine.step();
    }
    assert_eq!(machine.program_counter(), 0x8030);

    let unpatched = Variant::cosmac_vip(&monitor).expect("valid monitor image");
    let mut machine = Machine::new(unpatched, vec![0; 0x1000], ScriptedHost::default());
    for _ in 0..25 {
        machine.step();
    }
    assert_eq!(machine.program_counter(), 0x8025);
}
