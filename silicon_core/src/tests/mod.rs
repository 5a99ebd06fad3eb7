use crate::common::save_state::{Savable, SaveError};
use crate::cpu6502::{CPUBusTrait, CPU6502};
use crate::netlist::Netlist;
use std::cell::RefCell;
use std::io::{Read, Write};
use std::path::Path;

mod save_state;

/// The real chip definition files, shared with the runner binary. They are
/// too large to live in the repository; tests that need them skip when the
/// files are absent.
const TRANS_DEFS: &str = "../data/transdefs.txt";
const SEG_DEFS: &str = "../data/segdefs.txt";

/// The memory map of the example board, with every bus transaction logged.
pub struct RecordingBus {
    pub ram: Vec<u8>,
    pub rom: Vec<u8>,
    pub reads: RefCell<Vec<u16>>,
    pub writes: Vec<(u16, u8)>,
}

impl RecordingBus {
    fn new(rom: Vec<u8>) -> Self {
        Self {
            ram: vec![0; 0x2000],
            rom,
            reads: RefCell::new(Vec::new()),
            writes: Vec::new(),
        }
    }
}

impl CPUBusTrait for RecordingBus {
    fn read(&self, address: u16) -> u8 {
        self.reads.borrow_mut().push(address);

        match address {
            0x0000..=0x1FFF => self.ram[address as usize],
            0xE000..=0xFFFF => self.rom[(address - 0xE000) as usize],
            _ => 0x00,
        }
    }

    fn write(&mut self, address: u16, data: u8) {
        self.writes.push((address, data));

        if let 0x0000..=0x1FFF = address {
            self.ram[address as usize] = data;
        }
    }

    fn reset(&mut self) {
        for byte in self.ram.iter_mut() {
            *byte = 0;
        }
    }
}

impl Savable for RecordingBus {
    fn save<W: Write>(&self, writer: &mut W) -> Result<(), SaveError> {
        writer.write_all(&self.ram)?;

        Ok(())
    }

    fn load<R: Read>(&mut self, reader: &mut R) -> Result<(), SaveError> {
        reader.read_exact(&mut self.ram)?;

        Ok(())
    }
}

pub struct SimTester {
    pub cpu: CPU6502<RecordingBus>,
}

impl SimTester {
    /// Build a chip running `program` from $E000, already reset. Returns
    /// `None` (after logging) when the definition files are not available.
    pub fn new(program: &[u8]) -> Option<Self> {
        if !Path::new(TRANS_DEFS).exists() || !Path::new(SEG_DEFS).exists() {
            eprintln!(
                "skipping: chip definition files not found at {} / {}",
                TRANS_DEFS, SEG_DEFS
            );
            return None;
        }

        let netlist = Netlist::from_files(TRANS_DEFS, SEG_DEFS).unwrap();

        let mut rom = vec![0; 0x2000];
        rom[..program.len()].copy_from_slice(program);
        // reset vector -> $E000
        rom[0x1FFC] = 0x00;
        rom[0x1FFD] = 0xE0;

        let mut cpu = CPU6502::new(netlist, RecordingBus::new(rom));
        cpu.reset();

        Some(SimTester { cpu })
    }

    pub fn poke_rom(&mut self, offset: usize, bytes: &[u8]) {
        let rom = &mut self.cpu.bus_mut().rom;
        rom[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    pub fn half_steps(&mut self, count: usize) {
        for _ in 0..count {
            self.cpu.half_step();
        }
    }

    pub fn clear_logs(&mut self) {
        self.cpu.bus().reads.borrow_mut().clear();
        self.cpu.bus_mut().writes.clear();
    }

    pub fn reads(&self) -> Vec<u16> {
        self.cpu.bus().reads.borrow().clone()
    }

    /// Values written to `address`, in bus order.
    pub fn writes_to(&self, address: u16) -> Vec<u8> {
        self.cpu
            .bus()
            .writes
            .iter()
            .filter(|(a, _)| *a == address)
            .map(|(_, data)| *data)
            .collect()
    }
}
