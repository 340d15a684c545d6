//! Memory and I/O bus interface.

use std::collections::HashMap;

/// Memory and I/O bus interface.
///
/// The CPU reaches memory, ports and interrupting devices only through
/// this trait. The core performs no bounds checks: the address space is
/// always 64 KiB of memory and 64 Ki ports, and the implementor decides
/// what is mapped, mirrored or open.
pub trait Bus {
    /// Read a byte from the given address.
    fn read(&mut self, address: u16) -> u8;

    /// Write a byte to the given address.
    fn write(&mut self, address: u16, value: u8);

    /// Read a byte from an I/O port.
    ///
    /// 8-bit port instructions drive the upper address lines with A (or B
    /// for the `(C)` forms), so the full 16-bit port is passed through.
    fn io_read(&mut self, _port: u16) -> u8 {
        0xFF
    }

    /// Write a byte to an I/O port.
    fn io_write(&mut self, _port: u16, _value: u8) {}

    /// Opcode fetch (M1 cycle). Defaults to a plain memory read.
    fn fetch_opcode(&mut self, address: u16) -> u8 {
        self.read(address)
    }

    /// Operand fetch (immediates, displacements, addresses).
    fn fetch_operand(&mut self, address: u16) -> u8 {
        self.read(address)
    }

    /// Data placed on the bus during an interrupt-acknowledge cycle.
    ///
    /// IM 2 uses the low byte as the vector. IM 0 decodes the value as an
    /// instruction: `0xCD_nnnn` is `CALL nnnn`, `0xC3_nnnn` is `JP nnnn`,
    /// anything else is treated as `RST (value & 0x38)`. An idle data bus
    /// reads as `0xFF`.
    fn irq_ack(&mut self) -> u32 {
        0xFF
    }
}

/// Flat 64 KiB RAM with latched input ports.
///
/// Good enough for tests and for hosts without any memory map. Port reads
/// return whatever was latched with [`SimpleBus::set_port`] (or `0xFF`),
/// and every port write is recorded in order.
pub struct SimpleBus {
    ram: Box<[u8]>,
    ports: HashMap<u16, u8>,
    io_writes: Vec<(u16, u8)>,
    irq_data: u32,
}

impl SimpleBus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ram: vec![0; 0x10000].into_boxed_slice(),
            ports: HashMap::new(),
            io_writes: Vec::new(),
            irq_data: 0xFF,
        }
    }

    /// Copy `data` into RAM starting at `address`, wrapping at 64 KiB.
    pub fn load(&mut self, address: u16, data: &[u8]) {
        let mut addr = address;
        for &byte in data {
            self.ram[addr as usize] = byte;
            addr = addr.wrapping_add(1);
        }
    }

    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        self.ram[address as usize]
    }

    pub fn poke(&mut self, address: u16, value: u8) {
        self.ram[address as usize] = value;
    }

    /// Latch the value returned by reads of `port`.
    pub fn set_port(&mut self, port: u16, value: u8) {
        self.ports.insert(port, value);
    }

    /// Port writes seen so far, oldest first.
    #[must_use]
    pub fn io_writes(&self) -> &[(u16, u8)] {
        &self.io_writes
    }

    /// Set the interrupt-acknowledge data (see [`Bus::irq_ack`]).
    pub fn set_irq_data(&mut self, data: u32) {
        self.irq_data = data;
    }
}

impl Default for SimpleBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for SimpleBus {
    fn read(&mut self, address: u16) -> u8 {
        self.ram[address as usize]
    }

    fn write(&mut self, address: u16, value: u8) {
        self.ram[address as usize] = value;
    }

    fn io_read(&mut self, port: u16) -> u8 {
        self.ports.get(&port).copied().unwrap_or(0xFF)
    }

    fn io_write(&mut self, port: u16, value: u8) {
        self.io_writes.push((port, value));
    }

    fn irq_ack(&mut self) -> u32 {
        self.irq_data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_wraps_at_top_of_memory() {
        let mut bus = SimpleBus::new();
        bus.load(0xFFFF, &[0x11, 0x22]);
        assert_eq!(bus.peek(0xFFFF), 0x11);
        assert_eq!(bus.peek(0x0000), 0x22);
    }

    #[test]
    fn unlatched_ports_read_open_bus() {
        let mut bus = SimpleBus::new();
        bus.set_port(0x12FE, 0x1F);
        assert_eq!(bus.io_read(0x12FE), 0x1F);
        assert_eq!(bus.io_read(0x00FE), 0xFF);
        bus.io_write(0x00FE, 0x07);
        assert_eq!(bus.io_writes(), &[(0x00FE, 0x07)]);
    }

    #[test]
    fn opcode_fetch_defaults_to_memory_read() {
        let mut bus = SimpleBus::new();
        bus.poke(0x4000, 0xC9);
        assert_eq!(bus.fetch_opcode(0x4000), 0xC9);
        assert_eq!(bus.fetch_operand(0x4000), 0xC9);
    }
}
