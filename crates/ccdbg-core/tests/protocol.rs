//! Protocol-level tests against the emulated target

use ccdbg_core::{timing, Debugger, Error};
use ccdbg_dummy::{DummyConfig, DummyTarget, Event};

fn debugger() -> Debugger<DummyTarget> {
    Debugger::new(DummyTarget::new_default())
}

fn debugger_with(config: DummyConfig) -> Debugger<DummyTarget> {
    Debugger::new(DummyTarget::new(config))
}

#[test]
fn new_session_is_active_and_attached() {
    let dbg = debugger();
    assert!(dbg.is_active());
    assert!(!dbg.in_debug_mode());
    assert_eq!(dbg.controller().events(), &[Event::Attach]);
}

#[test]
fn inactive_session_rejects_everything_without_touching_lines() {
    let mut dbg = debugger();
    dbg.set_active(false);
    dbg.controller_mut().clear_events();

    assert_eq!(dbg.enter(), Err(Error::NotActive));
    assert_eq!(dbg.halt(), Err(Error::NotActive));
    assert_eq!(dbg.chip_id(), Err(Error::NotActive));
    assert_eq!(dbg.read_byte(), Err(Error::NotActive));
    assert_eq!(dbg.write_byte(0xFF), Err(Error::NotActive));
    assert_eq!(dbg.last_error(), Some(Error::NotActive));
    assert!(dbg.controller().events().is_empty());
}

#[test]
fn debug_ops_outside_debug_mode_set_not_debugging() {
    let mut dbg = debugger();
    dbg.controller_mut().clear_events();

    assert_eq!(dbg.halt(), Err(Error::NotDebugging));
    assert_eq!(dbg.resume(), Err(Error::NotDebugging));
    assert_eq!(dbg.step(), Err(Error::NotDebugging));
    assert_eq!(dbg.read_status(), Err(Error::NotDebugging));
    assert_eq!(dbg.read_config(), Err(Error::NotDebugging));
    assert_eq!(dbg.write_config(0x22), Err(Error::NotDebugging));
    assert_eq!(dbg.exec(0x00), Err(Error::NotDebugging));
    assert_eq!(dbg.exec2(0x00, 0x00), Err(Error::NotDebugging));
    assert_eq!(dbg.exec3(0x00, 0x00, 0x00), Err(Error::NotDebugging));
    assert_eq!(dbg.exec_imm(0x02, 0x1234), Err(Error::NotDebugging));
    assert_eq!(dbg.chip_id(), Err(Error::NotDebugging));
    assert_eq!(dbg.pc(), Err(Error::NotDebugging));
    assert_eq!(dbg.chip_erase(), Err(Error::NotDebugging));
    assert_eq!(dbg.exit(), Err(Error::NotDebugging));
    assert_eq!(dbg.write_byte(0xFF), Err(Error::NotDebugging));
    assert_eq!(dbg.switch_read(timing::READY_TIMEOUT), Err(Error::NotDebugging));

    assert_eq!(dbg.last_error(), Some(Error::NotDebugging));
    assert!(dbg.controller().events().is_empty());
}

#[test]
fn read_byte_only_requires_active() {
    // Deliberate asymmetry: raw reads work outside debug mode
    let mut dbg = debugger();
    assert!(dbg.read_byte().is_ok());
}

#[test]
fn enter_then_exit_returns_to_active() {
    let mut dbg = debugger();
    dbg.enter().unwrap();
    assert!(dbg.in_debug_mode());

    dbg.exit().unwrap();
    assert!(dbg.is_active());
    assert!(!dbg.in_debug_mode());
    // Exit resumes the target on the wire
    assert_eq!(dbg.controller().commands(), &[vec![0x48]]);
}

#[test]
fn enter_handshake_pulse_train() {
    let mut dbg = debugger();
    dbg.controller_mut().clear_events();
    dbg.enter().unwrap();

    assert_eq!(
        dbg.controller().events(),
        &[
            Event::Reset(false),
            Event::Clock(true),
            Event::Delay(timing::ENTER_PULSE_LONG),
            Event::Clock(false),
            Event::Delay(timing::ENTER_PULSE_SHORT),
            Event::Clock(true),
            Event::Delay(timing::ENTER_PULSE_SHORT),
            Event::Clock(false),
            Event::Delay(timing::ENTER_RESET_HOLD),
            Event::Reset(true),
            Event::Delay(timing::ENTER_RESET_HOLD),
        ]
    );
}

#[test]
fn write_byte_is_msb_first() {
    let mut dbg = debugger();
    dbg.enter().unwrap();
    dbg.controller_mut().clear_events();

    dbg.write_byte(0xA5).unwrap();

    assert_eq!(
        dbg.controller().written_bits(),
        &[true, false, true, false, false, true, false, true]
    );

    // Each bit is straddled by a full clock pulse with the minimum
    // half-period held on both phases
    let events = dbg.controller().events();
    let rising = events.iter().filter(|e| **e == Event::Clock(true)).count();
    let falling = events.iter().filter(|e| **e == Event::Clock(false)).count();
    assert_eq!(rising, 8);
    assert_eq!(falling, 8);
    for bit in 0..8 {
        assert!(matches!(events[5 * bit], Event::Data(_)));
        assert_eq!(events[5 * bit + 1], Event::Clock(true));
        assert_eq!(events[5 * bit + 2], Event::Delay(timing::WRITE_BIT_HOLD));
        assert_eq!(events[5 * bit + 3], Event::Clock(false));
        assert_eq!(events[5 * bit + 4], Event::Delay(timing::WRITE_BIT_HOLD));
    }
}

#[test]
fn switch_read_succeeds_when_target_ready() {
    let mut dbg = debugger();
    dbg.enter().unwrap();
    dbg.controller_mut().queue_response(&[0x00]);
    dbg.controller_mut().clear_events();

    assert!(dbg.switch_read(timing::READY_TIMEOUT).is_ok());
    assert!(dbg.in_debug_mode());
    assert_eq!(dbg.last_error(), None);

    // The direction change settles before the edge wait, and the last
    // busy pulse settles before the first result bit is sampled
    let events = dbg.controller().events();
    assert_eq!(events[3], Event::Delay(timing::DIR_CHANGE_SETTLE));
    assert_eq!(events[4], Event::EdgeWait);
    assert_eq!(events.last(), Some(&Event::Delay(timing::SAMPLE_SETTLE)));
}

#[test]
fn switch_read_timeout_abandons_debug_session() {
    let mut dbg = debugger_with(DummyConfig {
        wired: false,
        ..Default::default()
    });
    dbg.enter().unwrap();

    assert_eq!(dbg.switch_read(timing::READY_TIMEOUT), Err(Error::NotWired));
    assert!(!dbg.in_debug_mode());
    assert_eq!(dbg.last_error(), Some(Error::NotWired));

    // Terminal for the session: further debug ops need a fresh enter
    assert_eq!(dbg.halt(), Err(Error::NotDebugging));
}

#[test]
fn exit_with_absent_target_fails_cleanly() {
    // No hardware on the other end: exit reports NotWired instead of
    // panicking, and the session falls back to plain active
    let mut dbg = debugger_with(DummyConfig {
        wired: false,
        ..Default::default()
    });
    dbg.enter().unwrap();

    assert_eq!(dbg.exit(), Err(Error::NotWired));
    assert!(dbg.is_active());
    assert!(!dbg.in_debug_mode());
}

#[test]
fn data_direction_switch_is_idempotent() {
    let mut dbg = debugger();
    dbg.enter().unwrap();
    dbg.controller_mut().queue_response(&[0x00]);
    assert_eq!(dbg.controller().reconfigure_count(), 0);

    dbg.switch_read(timing::READY_TIMEOUT).unwrap();
    assert_eq!(dbg.controller().reconfigure_count(), 1);

    // read_byte also forces input direction, but it already is input
    dbg.read_byte().unwrap();
    assert_eq!(dbg.controller().reconfigure_count(), 1);

    dbg.switch_write();
    assert_eq!(dbg.controller().reconfigure_count(), 2);
    dbg.switch_write();
    assert_eq!(dbg.controller().reconfigure_count(), 2);
}

#[test]
fn chip_id_assembles_high_byte_first() {
    let mut dbg = debugger_with(DummyConfig {
        chip_id: 0x1234,
        ..Default::default()
    });
    dbg.enter().unwrap();

    assert_eq!(dbg.chip_id(), Ok(0x1234));
    assert_eq!(dbg.controller().commands(), &[vec![0x68]]);
}

#[test]
fn pc_assembles_high_byte_first() {
    let mut dbg = debugger_with(DummyConfig {
        pc: 0xBEEF,
        ..Default::default()
    });
    dbg.enter().unwrap();

    assert_eq!(dbg.pc(), Ok(0xBEEF));
}

#[test]
fn exec_imm_sends_big_endian_immediate() {
    let mut dbg = debugger();
    dbg.enter().unwrap();

    dbg.exec_imm(0x02, 0x1234).unwrap();
    assert_eq!(dbg.controller().commands(), &[vec![0x53, 0x02, 0x12, 0x34]]);
}

#[test]
fn exec_variants_send_expected_byte_counts() {
    let mut dbg = debugger();
    dbg.enter().unwrap();

    dbg.exec(0x00).unwrap();
    dbg.exec2(0x74, 0x56).unwrap();
    dbg.exec3(0x75, 0xC1, 0x04).unwrap();

    assert_eq!(
        dbg.controller().commands(),
        &[
            vec![0x51, 0x00],
            vec![0x52, 0x74, 0x56],
            vec![0x53, 0x75, 0xC1, 0x04],
        ]
    );
}

#[test]
fn write_config_echoes_readback() {
    let mut dbg = debugger();
    dbg.enter().unwrap();

    assert_eq!(dbg.write_config(0x22), Ok(0x22));
    assert_eq!(dbg.read_config(), Ok(0x22));
}

#[test]
fn status_ops_return_status_byte() {
    let mut dbg = debugger_with(DummyConfig {
        status: 0xA0,
        ..Default::default()
    });
    dbg.enter().unwrap();

    assert_eq!(dbg.read_status(), Ok(0xA0));
    assert_eq!(dbg.chip_erase(), Ok(0xA0));
    assert_eq!(dbg.halt(), Ok(0x00)); // accumulator, not status
}

#[test]
fn instruction_table_replacement_reports_new_version() {
    let mut dbg = debugger();
    dbg.enter().unwrap();

    let mut table = *dbg.instruction_set().as_bytes();
    table[0] = 7;
    assert_eq!(dbg.update_instruction_table(table), 7);
    assert_eq!(dbg.instruction_table_version(), 7);

    // Unchanged slots keep working against the same target
    assert_eq!(dbg.read_status(), Ok(0x22));
}

#[test]
fn deactivation_exits_debug_mode_first() {
    let mut dbg = debugger();
    dbg.enter().unwrap();

    dbg.set_active(false);
    assert!(!dbg.is_active());
    assert!(!dbg.in_debug_mode());
    // RESUME went out before the lines were released
    assert_eq!(dbg.controller().commands(), &[vec![0x48]]);
    assert_eq!(dbg.controller().events().last(), Some(&Event::Release));
}

#[test]
fn reactivated_session_requires_fresh_enter() {
    let mut dbg = debugger();
    dbg.enter().unwrap();

    dbg.set_active(false);
    dbg.set_active(true);

    // The handshake state did not survive deactivation
    assert!(!dbg.in_debug_mode());
    assert_eq!(dbg.halt(), Err(Error::NotDebugging));

    dbg.enter().unwrap();
    assert!(dbg.halt().is_ok());
}

#[test]
fn reactivation_clears_stale_error() {
    let mut dbg = debugger();
    dbg.set_active(false);
    assert_eq!(dbg.halt(), Err(Error::NotActive));
    assert!(dbg.last_error().is_some());

    dbg.set_active(true);
    assert_eq!(dbg.last_error(), None);
    assert!(dbg.is_active());
}

#[test]
fn enter_clears_stale_error() {
    let mut dbg = debugger();
    assert_eq!(dbg.halt(), Err(Error::NotDebugging));
    assert!(dbg.last_error().is_some());

    dbg.enter().unwrap();
    assert_eq!(dbg.last_error(), None);
}

#[test]
fn full_session_round_trip() {
    let mut dbg = debugger_with(DummyConfig {
        chip_id: 0x1234,
        ..Default::default()
    });

    dbg.enter().unwrap();
    assert_eq!(dbg.chip_id(), Ok(0x1234));
    dbg.exit().unwrap();
    dbg.set_active(false);

    assert_eq!(dbg.last_error(), None);
    assert!(!dbg.is_active());
}
