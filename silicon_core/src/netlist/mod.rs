mod error;
mod netlist;

mod tests;

pub use error::NetlistError;
pub use netlist::{Netlist, Node, NodeFlags, Transistor, NODE_COUNT};
