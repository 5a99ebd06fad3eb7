mod common;
mod cpu6502;
mod netlist;

pub mod board;

#[cfg(test)]
mod tests;

pub use common::save_state::{Savable, SaveError};
pub use common::Bus;
pub use cpu6502::node_names;
pub use cpu6502::{CPUBusTrait, CPU6502};
pub use netlist::{Netlist, NetlistError, Node, NODE_COUNT};
