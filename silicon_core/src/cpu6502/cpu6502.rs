use super::node_names::{
    ADDRESS_LINES, CLK0, CONTROL_NODES, DATA_LINES, GND, IRQ, NMI, RDY, RES, RW, SO, VCC,
};
use super::CPUBusTrait;
use crate::common::save_state::{Savable, SaveError};
use crate::netlist::{Netlist, NodeFlags};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::mem;

/// Cap on settling rounds for a single recalculation pass. The real netlist
/// settles in a handful of rounds; the cap only matters for malformed input.
const RECALC_ROUND_LIMIT: usize = 10_000;

/// A worklist of node ids deduplicated by a membership mask. Clearing walks
/// only the stored entries, and the two lists used by the settling loop are
/// swapped instead of reallocated.
pub(crate) struct Worklist {
    ids: Vec<usize>,
    queued: Vec<bool>,
}

impl Worklist {
    pub(crate) fn new(node_count: usize) -> Self {
        Worklist {
            ids: Vec::with_capacity(node_count),
            queued: vec![false; node_count],
        }
    }

    pub(crate) fn push(&mut self, id: usize) {
        if !self.queued[id] {
            self.queued[id] = true;
            self.ids.push(id);
        }
    }

    pub(crate) fn clear(&mut self) {
        while let Some(id) = self.ids.pop() {
            self.queued[id] = false;
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.ids.len()
    }

    fn get(&self, index: usize) -> usize {
        self.ids[index]
    }
}

/// The 6502 modeled as its transistor network.
///
/// The chip knows nothing about instructions; it only settles wire levels
/// whenever CLK0 or a pad changes, and exchanges bytes with the host bus
/// on the appropriate clock edges.
pub struct CPU6502<T: CPUBusTrait> {
    netlist: Netlist,

    // reused across settling passes so the hot path does not allocate
    group: Vec<usize>,
    traversal: Vec<usize>,
    current: Worklist,
    next: Worklist,

    bus: T,
}

impl<T> CPU6502<T>
where
    T: CPUBusTrait,
{
    pub fn new(netlist: Netlist, bus: T) -> Self {
        let node_count = netlist.node_count();

        CPU6502 {
            netlist,

            group: Vec::with_capacity(node_count),
            traversal: Vec::with_capacity(node_count),
            current: Worklist::new(node_count),
            next: Worklist::new(node_count),

            bus,
        }
    }

    /// Run the power-on sequence. Calling this twice in a row leaves the
    /// chip in an identical state.
    pub fn reset(&mut self) {
        for &(id, name) in CONTROL_NODES.iter() {
            if !self.netlist.nodes[id].is_defined() {
                eprintln!("[WARN] control node {} (id {}) is missing from the netlist", name, id);
            }
        }

        for node in self.netlist.nodes.iter_mut() {
            node.set_state(false);
            node.set_in_group(false);
        }
        for trans in self.netlist.transistors.iter_mut() {
            trans.on = false;
        }

        self.netlist.nodes[GND].set_state(false);
        self.netlist.nodes[VCC].set_state(true);

        self.set_node_low(RES);
        self.set_node_low(CLK0);
        self.set_node_high(RDY);
        self.set_node_low(SO);
        self.set_node_high(IRQ);
        self.set_node_high(NMI);

        // seed the initial settled state from every node at once
        for id in 0..self.netlist.node_count() {
            self.current.push(id);
        }
        self.recalc_node_list();

        // hold reset for 8 clocks, release it, then let the chip walk up to
        // its vector fetch for 6 more
        for _ in 0..8 {
            self.set_node_high(CLK0);
            self.set_node_low(CLK0);
        }

        self.set_node_high(RES);

        for _ in 0..6 {
            self.set_node_high(CLK0);
            self.set_node_low(CLK0);
        }
    }

    /// Advance one half clock: toggle CLK0 and service the bus phase that
    /// belongs to the new edge.
    pub fn half_step(&mut self) {
        if self.netlist.nodes[CLK0].state() {
            self.set_node_low(CLK0);
            self.handle_bus_read();
        } else {
            self.set_node_high(CLK0);
            self.handle_bus_write();
        }
    }

    pub fn set_ready(&mut self, state: bool) {
        self.set_node(RDY, state);
    }

    pub fn set_irq_pin(&mut self, state: bool) {
        self.set_node(IRQ, state);
    }

    pub fn set_nmi_pin(&mut self, state: bool) {
        self.set_node(NMI, state);
    }

    pub fn address_bus(&self) -> u16 {
        let mut address = 0;
        for (bit, &id) in ADDRESS_LINES.iter().enumerate() {
            if self.netlist.nodes[id].state() {
                address |= 1 << bit;
            }
        }
        address
    }

    pub fn data_bus(&self) -> u8 {
        let mut data = 0;
        for (bit, &id) in DATA_LINES.iter().enumerate() {
            if self.netlist.nodes[id].state() {
                data |= 1 << bit;
            }
        }
        data
    }

    /// True while the chip is reading from the bus.
    pub fn rw(&self) -> bool {
        self.netlist.nodes[RW].state()
    }

    pub fn clock_state(&self) -> bool {
        self.netlist.nodes[CLK0].state()
    }

    pub fn bus(&self) -> &T {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut T {
        &mut self.bus
    }

    pub fn reset_bus(&mut self) {
        self.bus.reset()
    }

    #[cfg(test)]
    pub(crate) fn netlist(&self) -> &Netlist {
        &self.netlist
    }

    #[cfg(test)]
    pub(crate) fn netlist_mut(&mut self) -> &mut Netlist {
        &mut self.netlist
    }

    // bus phases

    fn handle_bus_read(&mut self) {
        if !self.rw() {
            return;
        }

        let address = self.address_bus();
        let data = self.bus.read(address);
        self.drive_data_bus(data);
    }

    fn handle_bus_write(&mut self) {
        if self.rw() {
            return;
        }

        let address = self.address_bus();
        let data = self.data_bus();
        self.bus.write(address, data);
    }

    /// Put a byte from the host onto the eight data pads and settle once
    /// over the combined worklist.
    fn drive_data_bus(&mut self, data: u8) {
        for (bit, &id) in DATA_LINES.iter().enumerate() {
            let node = &mut self.netlist.nodes[id];
            if data & (1 << bit) != 0 {
                node.set_pull_up(true);
                node.pull_down = 0;
            } else {
                node.set_pull_up(false);
                node.pull_down = 1;
            }
            self.current.push(id);
        }

        self.recalc_node_list();
    }

    // drive primitives

    pub(crate) fn set_node(&mut self, id: usize, state: bool) {
        if state {
            self.set_node_high(id);
        } else {
            self.set_node_low(id);
        }
    }

    pub(crate) fn set_node_low(&mut self, id: usize) {
        let node = &mut self.netlist.nodes[id];
        node.set_pull_up(false);
        node.pull_down = 1;

        self.current.push(id);
        self.recalc_node_list();
    }

    pub(crate) fn set_node_high(&mut self, id: usize) {
        let node = &mut self.netlist.nodes[id];
        node.set_pull_up(true);
        node.pull_down = 0;

        self.current.push(id);
        self.recalc_node_list();
    }

    // settling

    /// Drain the worklist to a fixed point: recalculate every dirty node,
    /// collecting the nodes disturbed by transistor toggles into the other
    /// list, and swap until a round produces nothing new.
    fn recalc_node_list(&mut self) {
        for _ in 0..RECALC_ROUND_LIMIT {
            if self.current.is_empty() {
                return;
            }

            for i in 0..self.current.len() {
                let id = self.current.get(i);
                self.recalc_node(id);
            }

            self.current.clear();
            mem::swap(&mut self.current, &mut self.next);
        }

        eprintln!(
            "[WARN] network did not settle within {} rounds, abandoning the pass",
            RECALC_ROUND_LIMIT
        );
        self.current.clear();
    }

    fn recalc_node(&mut self, id: usize) {
        // the supplies are never recomputed
        if id == GND || id == VCC {
            return;
        }

        let new_state = self.resolve_group(id);

        for i in 0..self.group.len() {
            let member = self.group[i];
            let node = &mut self.netlist.nodes[member];

            node.set_in_group(false);

            if node.state() == new_state {
                continue;
            }
            node.set_state(new_state);

            for g in 0..self.netlist.nodes[member].gates.len() {
                let trans = self.netlist.nodes[member].gates[g];
                if new_state {
                    self.turn_transistor_on(trans);
                } else {
                    self.turn_transistor_off(trans);
                }
            }
        }

        self.group.clear();
    }

    /// Collect the set of nodes electrically connected to `seed` through
    /// conducting transistors, then resolve the level the whole group takes.
    ///
    /// Traversal is iterative; the worst-case group (the ground rail) is
    /// thousands of nodes deep.
    fn resolve_group(&mut self, seed: usize) -> bool {
        let mut contains_gnd = false;
        let mut contains_vcc = false;

        self.traversal.push(seed);

        while let Some(id) = self.traversal.pop() {
            let node = &mut self.netlist.nodes[id];
            if node.in_group() {
                continue;
            }
            node.set_in_group(true);
            self.group.push(id);

            // supplies contribute their dominance but stop the walk
            if id == GND {
                contains_gnd = true;
                continue;
            }
            if id == VCC {
                contains_vcc = true;
                continue;
            }

            for c in 0..self.netlist.nodes[id].channels.len() {
                let index = self.netlist.nodes[id].channels[c];
                let trans = &self.netlist.transistors[index];
                if !trans.on {
                    continue;
                }

                let other = if trans.c1 == id { trans.c2 } else { trans.c1 };
                self.traversal.push(other);
            }
        }

        // dominance order: supplies, then external drives, then stored charge
        if contains_gnd {
            return false;
        }
        if contains_vcc {
            return true;
        }

        let mut any_pull_up = false;
        let mut any_pull_down = false;
        let mut any_state = false;

        for &id in self.group.iter() {
            let node = &self.netlist.nodes[id];
            any_pull_up |= node.pull_up();
            any_pull_down |= node.pull_down == 1;
            any_state |= node.state();
        }

        if any_pull_up {
            true
        } else if any_pull_down {
            false
        } else {
            // an undriven group keeps whatever level any member last held
            any_state
        }
    }

    fn turn_transistor_on(&mut self, index: usize) {
        let trans = &mut self.netlist.transistors[index];
        if trans.on {
            return;
        }
        trans.on = true;

        // c2 holds the supply when one is involved; when neither terminal is
        // a supply, c1 alone is enough because the group walk from c1 will
        // reach c2 in the next round
        let c1 = trans.c1;
        if c1 != GND && c1 != VCC {
            self.next.push(c1);
        }
    }

    fn turn_transistor_off(&mut self, index: usize) {
        let trans = &mut self.netlist.transistors[index];
        if !trans.on {
            return;
        }
        trans.on = false;

        // the break disconnects both sides; each may settle differently
        let c1 = trans.c1;
        let c2 = trans.c2;
        if c1 != GND && c1 != VCC {
            self.next.push(c1);
        }
        if c2 != GND && c2 != VCC {
            self.next.push(c2);
        }
    }
}

#[derive(Serialize, Deserialize)]
struct SavableCPUState {
    node_flags: Vec<u8>,
    pull_down: Vec<i8>,
    transistor_on: Vec<bool>,
}

impl SavableCPUState {
    fn from_cpu<T: CPUBusTrait>(cpu: &CPU6502<T>) -> Self {
        Self {
            node_flags: cpu.netlist.nodes.iter().map(|n| n.flags.bits()).collect(),
            pull_down: cpu.netlist.nodes.iter().map(|n| n.pull_down).collect(),
            transistor_on: cpu.netlist.transistors.iter().map(|t| t.on).collect(),
        }
    }
}

/// Wraps a borrowed reader so bincode can consume it by value without
/// taking the caller's reader away.
struct WrapperReader<'a, R: Read> {
    pub inner: &'a mut R,
}

impl<'a, R: Read> Read for WrapperReader<'a, R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<T> Savable for CPU6502<T>
where
    T: CPUBusTrait,
{
    fn save<W: Write>(&self, writer: &mut W) -> Result<(), SaveError> {
        let state = SavableCPUState::from_cpu(self);

        let data = bincode::serialize(&state).map_err(|_| SaveError::Others)?;
        writer.write_all(data.as_slice())?;

        self.bus.save(writer)?;

        Ok(())
    }

    fn load<R: Read>(&mut self, reader: &mut R) -> Result<(), SaveError> {
        let outer_reader = WrapperReader { inner: reader };

        {
            let state: SavableCPUState =
                bincode::deserialize_from(outer_reader).map_err(|err| match *err {
                    bincode::ErrorKind::Io(err) => SaveError::IoError(err),
                    _ => SaveError::Others,
                })?;

            if state.node_flags.len() != self.netlist.node_count()
                || state.pull_down.len() != self.netlist.node_count()
                || state.transistor_on.len() != self.netlist.transistor_count()
            {
                return Err(SaveError::SizeMismatch);
            }

            for (node, &bits) in self.netlist.nodes.iter_mut().zip(state.node_flags.iter()) {
                node.flags = NodeFlags::from_bits_truncate(bits);
            }
            for (node, &pull_down) in self.netlist.nodes.iter_mut().zip(state.pull_down.iter()) {
                node.pull_down = pull_down;
            }
            for (trans, &on) in self
                .netlist
                .transistors
                .iter_mut()
                .zip(state.transistor_on.iter())
            {
                trans.on = on;
            }
        }

        self.bus.load(reader)?;

        Ok(())
    }
}
