use super::SimTester;
use crate::common::save_state::Savable;
use std::io::Cursor;

// lda #$50 / sta $1000 / loop: dec $1000 / jmp loop
const LOOP_PROGRAM: [u8; 11] = [
    0xA9, 0x50, 0x8D, 0x00, 0x10, 0xCE, 0x00, 0x10, 0x4C, 0x05, 0xE0,
];

/// Snapshot mid-program, keep running, then rewind and check that the
/// replay services the bus identically.
#[test]
fn save_load_resumes_identically() {
    let mut tester = match SimTester::new(&LOOP_PROGRAM) {
        Some(tester) => tester,
        None => return,
    };

    tester.half_steps(200);

    let mut buffer = Vec::new();
    tester.cpu.save(&mut buffer).unwrap();

    tester.clear_logs();
    tester.half_steps(100);
    let first_run = tester.reads();
    let first_ram = tester.cpu.bus().ram[0x1000];

    let mut cursor = Cursor::new(&buffer);
    tester.cpu.load(&mut cursor).unwrap();
    assert_eq!(cursor.position(), buffer.len() as u64);

    tester.clear_logs();
    tester.half_steps(100);

    assert_eq!(tester.reads(), first_run);
    assert_eq!(tester.cpu.bus().ram[0x1000], first_ram);
}
