use silicon_core::board::Board;
use std::env::args;
use std::time::Instant;

// lda #$50 / sta $1000 / loop: dec $1000 / jmp loop
const DEMO_PROGRAM: [u8; 11] = [
    0xA9, 0x50, 0x8D, 0x00, 0x10, 0xCE, 0x00, 0x10, 0x4C, 0x05, 0xE0,
];

const HALF_STEPS: usize = 10_000;

fn main() {
    let args = args().collect::<Vec<String>>();

    let (trans_path, seg_path) = match args.len() {
        1 => ("data/transdefs.txt".to_owned(), "data/segdefs.txt".to_owned()),
        3 => (args[1].clone(), args[2].clone()),
        _ => {
            eprintln!("USAGE: {} [<transdefs-file> <segdefs-file>]", args[0]);
            return;
        }
    };

    println!("loading chip definitions:\n  trans: {}\n  segs: {}", trans_path, seg_path);

    let mut board = match Board::new(&trans_path, &seg_path) {
        Ok(board) => board,
        Err(err) => {
            eprintln!("failed to build the netlist: {}", err);
            return;
        }
    };

    board.load_rom(0, &DEMO_PROGRAM);
    board.set_reset_vector(0xE000);

    board.reset();

    let start = Instant::now();
    for _ in 0..HALF_STEPS {
        board.half_step();
    }
    let elapsed = start.elapsed();

    let cycles = HALF_STEPS as f64 / 2.0;
    println!(
        "ran {} half-steps in {} ms ({:.0} Hz effective clock)",
        HALF_STEPS,
        elapsed.as_millis(),
        cycles / elapsed.as_secs_f64()
    );
    println!("$1000 = {:#04X}", board.read_ram(0x1000));
}
