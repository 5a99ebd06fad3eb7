//! Node ids of the named pads and signals in the 6502 netlist.

pub const GND: usize = 558; // vss
pub const VCC: usize = 657; // vcc
pub const CLK0: usize = 1171;
pub const RDY: usize = 89;
pub const SO: usize = 1672;
pub const NMI: usize = 1297;
pub const IRQ: usize = 103;
pub const RES: usize = 159;
pub const RW: usize = 1156;

/// Address pads A0-A15, bit i at index i.
pub const ADDRESS_LINES: [usize; 16] = [
    268, 451, 1340, 211, 435, 736, 887, 1493, 230, 148, 1443, 399, 1237, 349, 672, 195,
];

/// Data pads D0-D7, bit i at index i.
pub const DATA_LINES: [usize; 8] = [1005, 82, 945, 650, 1393, 175, 1591, 1349];

/// The named control nodes checked at reset, with their pad names.
pub(crate) const CONTROL_NODES: [(usize, &str); 9] = [
    (GND, "vss"),
    (VCC, "vcc"),
    (CLK0, "clk0"),
    (RDY, "rdy"),
    (SO, "so"),
    (NMI, "nmi"),
    (IRQ, "irq"),
    (RES, "res"),
    (RW, "rw"),
];
