use super::*;
use crate::config::MachineConfig;
use crate::START_ADDRESS;

fn machine() -> Machine {
    Machine::new(MachineConfig::builder().rng_seed(42).build()).unwrap()
}

fn loaded(program: &[u8]) -> Machine {
    let mut m = machine();
    m.load_program(program).unwrap();
    m
}

#[test]
fn font_table_is_seeded() {
    let m = machine();
    assert_eq!(&m.memory()[..FONTSET_SIZE], &FONTSET[..]);
    // '7'
    assert_eq!(&m.memory()[35..40], &[0xF0, 0x10, 0x20, 0x40, 0x40]);
}

#[test]
fn load_program_sets_pc_and_copies_bytes() {
    let m = loaded(&[0x62, 0xAA, 0x00, 0xE0]);
    assert_eq!(m.pc(), START_ADDRESS);
    assert_eq!(&m.memory()[0x200..0x204], &[0x62, 0xAA, 0x00, 0xE0]);
}

#[test]
fn load_program_at_custom_origin() {
    let mut m = machine();
    m.load_program_at(&[0x12, 0x34], 0x600).unwrap();
    assert_eq!(m.pc(), 0x600);
    assert_eq!(&m.memory()[0x600..0x602], &[0x12, 0x34]);
}

#[test]
fn oversized_program_is_rejected() {
    let mut m = machine();
    let program = vec![0xAA; 4096 - 0x200 + 1];
    assert!(matches!(
        m.load_program(&program),
        Err(VmError::ProgramTooLarge { .. })
    ));
    let program = vec![0xAA; 4096 - 0x200];
    assert!(m.load_program(&program).is_ok());
}

#[test]
fn step_advances_pc_for_plain_instructions() {
    let mut m = loaded(&[0x62, 0xAA, 0x00, 0xE0]);
    m.step().unwrap();
    assert_eq!(m.v(2), 0xAA);
    assert_eq!(m.pc(), 0x202);
    m.step().unwrap();
    assert_eq!(m.pc(), 0x204);
}

#[test]
fn step_leaves_pc_to_jump_instructions() {
    let mut m = machine();
    m.set_pc(100);
    m.memory_mut()[100..102].copy_from_slice(&[0x1E, 0xAB]);
    m.step().unwrap();
    assert_eq!(m.pc(), 0xEAB);
}

#[test]
fn call_and_return_round_trip() {
    // 0x200: CALL 0x206; 0x202: LD V1, 0x01; 0x204: 0000; 0x206: RET
    let mut m = loaded(&[0x22, 0x06, 0x61, 0x01, 0x00, 0x00, 0x00, 0xEE]);
    m.step().unwrap();
    assert_eq!(m.pc(), 0x206);
    assert_eq!(m.stack().size(), 1);
    m.step().unwrap();
    assert_eq!(m.pc(), 0x202);
    m.step().unwrap();
    assert_eq!(m.v(1), 1);
    m.step().unwrap();
    assert_eq!(m.exit_code(), Some(EXIT_OK));
}

#[test]
fn skip_through_step() {
    // SE V0, 0x00 skips the LD V1 and lands on LD V2.
    let mut m = loaded(&[0x30, 0x00, 0x61, 0x01, 0x62, 0x02]);
    m.step().unwrap();
    assert_eq!(m.pc(), 0x204);
    m.step().unwrap();
    assert_eq!(m.v(1), 0);
    assert_eq!(m.v(2), 2);
}

#[test]
fn sentinel_halts_and_further_steps_are_noops() {
    let mut m = loaded(&[0x00, 0x00, 0x62, 0xAA]);
    m.step().unwrap();
    assert_eq!(m.exit_code(), Some(0));
    assert_eq!(m.pc(), 0x200);
    m.step().unwrap();
    assert_eq!(m.v(2), 0);
    assert_eq!(m.pc(), 0x200);
}

#[test]
fn pc_past_memory_halts() {
    let mut m = machine();
    m.set_pc(4095);
    m.step().unwrap();
    assert_eq!(m.exit_code(), Some(0));
}

#[test]
fn unknown_opcode_surfaces_decode_error() {
    let mut m = loaded(&[0x01, 0x23]);
    let err = m.step().unwrap_err();
    assert!(err.is_decode_error());
    assert_eq!(err, VmError::UnknownOpcode { opcode: [0x01, 0x23] });
    assert_eq!(m.pc(), 0x200);
}

#[test]
fn extended_opcode_decodes_but_fails_to_execute() {
    let mut m = loaded(&[0x00, 0xFF]);
    assert_eq!(m.peek_instruction().unwrap(), Some(Instruction::HighRes));
    assert!(matches!(m.step(), Err(VmError::NotImplemented { .. })));
}

#[test]
fn wait_for_key_blocks_until_pressed() {
    let mut m = loaded(&[0xF3, 0x0A, 0x62, 0xAA]);
    for _ in 0..5 {
        m.step().unwrap();
        assert!(m.is_blocked());
        assert_eq!(m.pc(), 0x200);
    }

    m.key_down(5).unwrap();
    m.step().unwrap();
    assert_eq!(m.v(3), 5);
    assert!(!m.is_blocked());
    assert_eq!(m.pc(), 0x202);
}

#[test]
fn compatibility_toggle_through_step() {
    // LD I, 0x300; LD [I], V5
    let program = [0xA3, 0x00, 0xF5, 0x55];

    let mut m = loaded(&program);
    m.step().unwrap();
    m.step().unwrap();
    assert_eq!(m.i(), 0x300);

    let mut m = Machine::new(
        MachineConfig::builder()
            .compatibility_load_store(true)
            .rng_seed(1)
            .build(),
    )
    .unwrap();
    m.load_program(&program).unwrap();
    m.step().unwrap();
    m.step().unwrap();
    assert_eq!(m.i(), 0x306);
}

#[test]
fn reset_restores_program_and_clears_state() {
    let mut m = loaded(&[0x62, 0xAA, 0x22, 0x00]);
    m.step().unwrap();
    m.memory_mut()[0x200] = 0xFF;
    m.memory_mut()[0x300] = 0x12;
    m.screen_mut().set_pixel(0, 0, 1).unwrap();
    m.sound_timer_mut().set(10).unwrap();
    m.stack_mut().push(0x400);
    m.set_i(0x123);

    m.reset();
    assert_eq!(m.pc(), 0x200);
    assert_eq!(m.i(), 0);
    assert_eq!(m.v(2), 0);
    assert_eq!(&m.memory()[0x200..0x202], &[0x62, 0xAA]);
    assert_eq!(m.memory()[0x300], 0);
    assert_eq!(&m.memory()[..FONTSET_SIZE], &FONTSET[..]);
    assert!(m.stack().is_empty());
    assert!(!m.screen().pixel(0, 0));
    assert_eq!(m.sound_timer().get(), 0);
    assert_eq!(m.exit_code(), None);
}

#[test]
fn reset_keeps_configuration() {
    let mut m = Machine::new(
        MachineConfig::builder()
            .compatibility_load_store(true)
            .memory_size(0x800)
            .rng_seed(3)
            .build(),
    )
    .unwrap();
    m.reset();
    assert!(m.config().compatibility_load_store);
    assert_eq!(m.memory().len(), 0x800);
}

#[test]
fn decode_cache_survives_reset() {
    let mut m = loaded(&[0x62, 0xAA]);
    m.step().unwrap();
    m.reset();
    m.step().unwrap();
    assert_eq!(m.decoder().cached(), 1);
}

#[test]
fn decrement_timers_reports_sound() {
    let mut m = machine();
    m.delay_timer_mut().set(1).unwrap();
    m.sound_timer_mut().set(2).unwrap();
    assert!(m.decrement_timers());
    assert_eq!(m.delay_timer().get(), 0);
    assert!(!m.decrement_timers());
    assert!(!m.decrement_timers());
    assert_eq!(m.sound_timer().get(), 0);
}

#[test]
fn memory_accesses_wrap() {
    let mut m = machine();
    m.set_i(0xFFF);
    m.set_v(0, 0x11);
    m.set_v(1, 0x22);
    Instruction::StoreRegs { x: 1 }.execute(&mut m).unwrap();
    assert_eq!(m.memory()[0xFFF], 0x11);
    assert_eq!(m.memory()[0x000], 0x22);
}

#[test]
fn snapshot_summary() {
    let mut m = loaded(&[0x22, 0x04]);
    m.step().unwrap();
    m.set_v(0xA, 0x5C);
    let state = m.snapshot();
    assert_eq!(state.stack, vec![0x202]);
    let text = state.to_string();
    assert!(text.starts_with("V: [00 00"));
    assert!(text.contains("5C"));
    assert!(text.contains("PC: 204 I: 000 DT: 00 ST: 00 Stack: [202]"));
}

#[test]
fn reentrant_step_is_rejected() {
    let mut m = loaded(&[0x62, 0xAA]);
    m.executing = true;
    assert_eq!(m.step(), Err(VmError::Reentrant));
    m.executing = false;
    assert!(m.step().is_ok());
}

#[test]
fn invalid_configuration_is_rejected() {
    let result = Machine::new(MachineConfig::builder().memory_size(16).build());
    assert!(matches!(result, Err(VmError::InvalidConfig(_))));
}

#[test]
fn register_accessors_use_low_nibble() {
    let mut m = machine();
    m.set_v(0x13, 0x42);
    assert_eq!(m.v(0x3), 0x42);
    assert_eq!(m.v(0xF3), 0x42);
    assert_eq!(m.registers()[0x3], 0x42);
}
