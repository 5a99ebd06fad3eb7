use super::error::NetlistError;
use crate::cpu6502::node_names::{GND, VCC};
use bitflags::bitflags;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Total number of wire nodes on the die. Node ids index directly into the
/// node array, so every id in the definition files must be below this.
pub const NODE_COUNT: usize = 1725;

bitflags! {
    pub struct NodeFlags: u8 {
        /// current logical level of the wire
        const STATE = 1 << 0;
        /// permanently or momentarily pulled high
        const PULL_UP = 1 << 1;
        /// transient marker used during one group traversal
        const IN_GROUP = 1 << 2;
        /// the id appeared in the segment file or is referenced by a transistor
        const DEFINED = 1 << 3;
    }
}

pub struct Node {
    pub(crate) flags: NodeFlags,
    /// -1 = unset, 0 = not pulled low, 1 = pulled low this cycle
    pub(crate) pull_down: i8,
    /// indices of transistors whose gate terminal is this node
    pub(crate) gates: Vec<usize>,
    /// indices of transistors whose c1 or c2 terminal is this node
    pub(crate) channels: Vec<usize>,
}

impl Node {
    fn new() -> Self {
        Node {
            flags: NodeFlags::empty(),
            pull_down: -1,
            gates: Vec::new(),
            channels: Vec::new(),
        }
    }

    pub fn state(&self) -> bool {
        self.flags.contains(NodeFlags::STATE)
    }

    pub(crate) fn set_state(&mut self, state: bool) {
        self.flags.set(NodeFlags::STATE, state);
    }

    pub fn pull_up(&self) -> bool {
        self.flags.contains(NodeFlags::PULL_UP)
    }

    pub(crate) fn set_pull_up(&mut self, pull_up: bool) {
        self.flags.set(NodeFlags::PULL_UP, pull_up);
    }

    pub(crate) fn in_group(&self) -> bool {
        self.flags.contains(NodeFlags::IN_GROUP)
    }

    pub(crate) fn set_in_group(&mut self, in_group: bool) {
        self.flags.set(NodeFlags::IN_GROUP, in_group);
    }

    pub fn is_defined(&self) -> bool {
        self.flags.contains(NodeFlags::DEFINED)
    }

    fn set_defined(&mut self) {
        self.flags.insert(NodeFlags::DEFINED);
    }
}

pub struct Transistor {
    pub(crate) gate: usize,
    pub(crate) c1: usize,
    pub(crate) c2: usize,
    pub(crate) on: bool,
}

struct TransistorDef {
    gate: usize,
    c1: usize,
    c2: usize,
}

/// The fixed node/transistor arrays built from the two definition files.
///
/// Adjacency lists hold indices into the transistor array; transistors are
/// identified by their position in definition-file order.
pub struct Netlist {
    pub(crate) nodes: Vec<Node>,
    pub(crate) transistors: Vec<Transistor>,
}

impl Netlist {
    pub fn from_files<P: AsRef<Path>>(
        trans_path: P,
        seg_path: P,
    ) -> Result<Self, NetlistError> {
        let trans_file = BufReader::new(File::open(trans_path.as_ref())?);
        let seg_file = BufReader::new(File::open(seg_path.as_ref())?);

        Self::from_readers(trans_file, seg_file)
    }

    /// Build a netlist from any pair of line sources, the transistor
    /// definitions first. Tests feed in-memory definitions through `Cursor`.
    pub fn from_readers<T: BufRead, S: BufRead>(
        trans_defs: T,
        seg_defs: S,
    ) -> Result<Self, NetlistError> {
        let trans = parse_transistor_defs(trans_defs)?;
        let segs = parse_segment_defs(seg_defs)?;

        if trans.is_empty() {
            return Err(NetlistError::EmptyNetlist);
        }

        Ok(Self::build(&trans, &segs))
    }

    fn build(trans_defs: &[TransistorDef], seg_defs: &[(usize, bool)]) -> Self {
        let mut nodes = (0..NODE_COUNT).map(|_| Node::new()).collect::<Vec<_>>();

        // first occurrence wins; later lines for the same id carry polygon
        // geometry the simulation does not need
        for &(id, pull_up) in seg_defs {
            if id >= NODE_COUNT {
                continue;
            }
            let node = &mut nodes[id];
            if node.is_defined() {
                continue;
            }
            node.set_defined();
            node.set_pull_up(pull_up);
        }

        let mut transistors = Vec::with_capacity(trans_defs.len());

        for def in trans_defs {
            if def.gate >= NODE_COUNT || def.c1 >= NODE_COUNT || def.c2 >= NODE_COUNT {
                continue;
            }

            // keep the supply on the c2 side
            let mut c1 = def.c1;
            let mut c2 = def.c2;
            if c1 == GND {
                std::mem::swap(&mut c1, &mut c2);
            }
            if c1 == VCC {
                std::mem::swap(&mut c1, &mut c2);
            }

            let index = transistors.len();
            transistors.push(Transistor {
                gate: def.gate,
                c1,
                c2,
                on: false,
            });

            nodes[def.gate].set_defined();
            nodes[c1].set_defined();
            nodes[c2].set_defined();

            nodes[def.gate].gates.push(index);
            nodes[c1].channels.push(index);
            nodes[c2].channels.push(index);
        }

        Netlist { nodes, transistors }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn transistor_count(&self) -> usize {
        self.transistors.len()
    }

    pub fn node(&self, id: usize) -> &Node {
        &self.nodes[id]
    }
}

/// Split a definition line into integer fields. Tokens are separated by
/// commas or whitespace; non-numeric tokens parse as 0, matching the
/// tooling that produced the historical netlist files.
fn int_fields(line: &str) -> impl Iterator<Item = usize> + '_ {
    line.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| token.parse::<usize>().unwrap_or(0))
}

fn parse_transistor_defs<R: BufRead>(reader: R) -> Result<Vec<TransistorDef>, NetlistError> {
    let mut defs = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields = int_fields(line).collect::<Vec<_>>();
        if fields.len() < 4 {
            continue;
        }

        // fields[0] is the transistor id; position in file order is used
        // as the identity instead
        defs.push(TransistorDef {
            gate: fields[1],
            c1: fields[2],
            c2: fields[3],
        });
    }

    Ok(defs)
}

fn parse_segment_defs<R: BufRead>(reader: R) -> Result<Vec<(usize, bool)>, NetlistError> {
    let mut defs = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = int_fields(line);
        let id = match fields.next() {
            Some(id) => id,
            None => continue,
        };
        let pull_up = match fields.next() {
            Some(flag) => flag == 1,
            None => continue,
        };

        defs.push((id, pull_up));
    }

    Ok(defs)
}
