use crate::common::save_state::{Savable, SaveError};
use crate::common::Bus;
use crate::cpu6502::{CPUBusTrait, CPU6502};
use crate::netlist::{Netlist, NetlistError};
use std::io::{Read, Write};
use std::path::Path;

pub const RAM_SIZE: usize = 8 * 1024;
pub const ROM_SIZE: usize = 8 * 1024;
pub const ROM_BASE: u16 = 0xE000;

pub const RESET_VECTOR: u16 = 0xFFFC;

/// A flat byte memory. Bus writes to read-only memory are silently
/// dropped; the host loads ROM images through `fill`, which is not on the
/// bus path and ignores the guard.
pub struct Memory {
    data: Vec<u8>,
    read_only: bool,
}

impl Memory {
    pub fn new(size: usize, read_only: bool) -> Self {
        Memory {
            data: vec![0; size],
            read_only,
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn fill(&mut self, offset: usize, bytes: &[u8]) {
        let end = (offset + bytes.len()).min(self.data.len());
        if offset >= end {
            return;
        }
        self.data[offset..end].copy_from_slice(&bytes[..end - offset]);
    }

    pub fn clear(&mut self) {
        if !self.read_only {
            for byte in self.data.iter_mut() {
                *byte = 0;
            }
        }
    }
}

impl Bus for Memory {
    fn read(&self, address: u16) -> u8 {
        self.data[address as usize]
    }

    fn write(&mut self, address: u16, data: u8) {
        if !self.read_only {
            self.data[address as usize] = data;
        }
    }
}

/// The example memory map: 8 KiB of RAM at the bottom of the address
/// space, 8 KiB of ROM at the top, nothing in between.
pub struct SystemBus {
    ram: Memory,
    rom: Memory,
}

impl SystemBus {
    pub fn new() -> Self {
        SystemBus {
            ram: Memory::new(RAM_SIZE, false),
            rom: Memory::new(ROM_SIZE, true),
        }
    }

    pub fn ram(&self) -> &Memory {
        &self.ram
    }

    pub fn rom(&self) -> &Memory {
        &self.rom
    }

    pub fn rom_mut(&mut self) -> &mut Memory {
        &mut self.rom
    }
}

impl CPUBusTrait for SystemBus {
    fn read(&self, address: u16) -> u8 {
        match address {
            0x0000..=0x1FFF => self.ram.read(address),
            0xE000..=0xFFFF => self.rom.read(address - ROM_BASE),
            _ => 0x00,
        }
    }

    fn write(&mut self, address: u16, data: u8) {
        match address {
            0x0000..=0x1FFF => self.ram.write(address, data),
            0xE000..=0xFFFF => self.rom.write(address - ROM_BASE, data),
            _ => {}
        }
    }

    fn reset(&mut self) {
        self.ram.clear();
    }
}

impl Savable for SystemBus {
    fn save<W: Write>(&self, writer: &mut W) -> Result<(), SaveError> {
        writer.write_all(&self.ram.data)?;

        Ok(())
    }

    fn load<R: Read>(&mut self, reader: &mut R) -> Result<(), SaveError> {
        reader.read_exact(&mut self.ram.data)?;

        Ok(())
    }
}

/// A single-master board: the transistor-level chip wired to the example
/// memory map.
pub struct Board {
    cpu: CPU6502<SystemBus>,
}

impl Board {
    pub fn new<P: AsRef<Path>>(trans_path: P, seg_path: P) -> Result<Self, NetlistError> {
        let netlist = Netlist::from_files(trans_path, seg_path)?;

        Ok(Board {
            cpu: CPU6502::new(netlist, SystemBus::new()),
        })
    }

    /// Copy a program image into ROM, starting at `offset` from $E000.
    pub fn load_rom(&mut self, offset: usize, bytes: &[u8]) {
        self.cpu.bus_mut().rom_mut().fill(offset, bytes);
    }

    /// Point the reset vector at `address`.
    pub fn set_reset_vector(&mut self, address: u16) {
        let offset = (RESET_VECTOR - ROM_BASE) as usize;
        self.cpu
            .bus_mut()
            .rom_mut()
            .fill(offset, &[address as u8, (address >> 8) as u8]);
    }

    pub fn reset(&mut self) {
        self.cpu.reset();
    }

    pub fn half_step(&mut self) {
        self.cpu.half_step();
    }

    /// One full clock: two half-steps.
    pub fn step(&mut self) {
        self.cpu.half_step();
        self.cpu.half_step();
    }

    pub fn read_ram(&self, address: u16) -> u8 {
        self.cpu.bus().ram().read(address)
    }

    pub fn cpu(&self) -> &CPU6502<SystemBus> {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut CPU6502<SystemBus> {
        &mut self.cpu
    }

    pub fn save_state<W: Write>(&self, writer: &mut W) -> Result<(), SaveError> {
        self.cpu.save(writer)
    }

    pub fn load_state<R: Read>(&mut self, reader: &mut R) -> Result<(), SaveError> {
        self.cpu.load(reader)
    }
}
