//! DD/FD-prefixed instructions and DD CB / FD CB.
//!
//! Both prefixes share one handler; `IndexReg` picks IX or IY. Opcodes
//! that do not touch HL, H or L fall through to the unprefixed handler and
//! only pay for the prefix.

use emu_core::Bus;

use crate::alu;
use crate::timing::{CC_XY, CC_XYCB};

use super::Z80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IndexReg {
    Ix,
    Iy,
}

impl Z80 {
    fn index(&self, idx: IndexReg) -> u16 {
        match idx {
            IndexReg::Ix => self.regs.ix,
            IndexReg::Iy => self.regs.iy,
        }
    }

    fn set_index(&mut self, idx: IndexReg, value: u16) {
        match idx {
            IndexReg::Ix => self.regs.ix = value,
            IndexReg::Iy => self.regs.iy = value,
        }
    }

    /// Register `r` with H and L replaced by the index halves.
    fn get_reg8_indexed(&self, idx: IndexReg, r: u8) -> u8 {
        match r & 7 {
            4 => (self.index(idx) >> 8) as u8,
            5 => self.index(idx) as u8,
            r => self.get_reg8(r),
        }
    }

    fn set_reg8_indexed(&mut self, idx: IndexReg, r: u8, value: u8) {
        let ix = self.index(idx);
        match r & 7 {
            4 => self.set_index(idx, (ix & 0x00FF) | (u16::from(value) << 8)),
            5 => self.set_index(idx, (ix & 0xFF00) | u16::from(value)),
            r => self.set_reg8(r, value),
        }
    }

    /// Fetch the displacement and form `index + d`. The address is latched
    /// in WZ.
    fn indexed_address<B: Bus>(&mut self, bus: &mut B, idx: IndexReg) -> u16 {
        let d = self.fetch_arg(bus) as i8;
        let addr = self.index(idx).wrapping_add_signed(i16::from(d));
        self.regs.wz = addr;
        addr
    }

    pub(super) fn execute_indexed<B: Bus>(&mut self, bus: &mut B, idx: IndexReg) {
        // A prefix followed by another prefix acts as a 4 T-state NOP; the
        // next prefix then starts a new instruction.
        let op = bus.fetch_opcode(self.regs.pc);
        if op == 0xDD || op == 0xFD {
            self.charge(CC_XY[op as usize]);
            return;
        }
        self.regs.pc = self.regs.pc.wrapping_add(1);
        self.regs.inc_r();
        self.charge(CC_XY[op as usize]);

        match op {
            // ADD IX, rr
            0x09 | 0x19 | 0x29 | 0x39 => {
                let ix = self.index(idx);
                let rr = if op == 0x29 { ix } else { self.get_rp(op >> 4) };
                let result = alu::add16(ix, rr, self.regs.f);
                self.regs.wz = ix.wrapping_add(1);
                self.set_index(idx, result.value);
                self.set_f(result.flags);
            }

            // LD IX, nn
            0x21 => {
                let value = self.fetch_arg16(bus);
                self.set_index(idx, value);
            }

            // LD (nn), IX
            0x22 => {
                let addr = self.fetch_arg16(bus);
                Self::write16(bus, addr, self.index(idx));
                self.regs.wz = addr.wrapping_add(1);
            }

            // INC IX / DEC IX
            0x23 => self.set_index(idx, self.index(idx).wrapping_add(1)),
            0x2B => self.set_index(idx, self.index(idx).wrapping_sub(1)),

            // INC IXH / INC IXL
            0x24 | 0x2C => {
                let r = op >> 3;
                let result = alu::inc8(self.get_reg8_indexed(idx, r), self.regs.f);
                self.set_reg8_indexed(idx, r, result.value);
                self.set_f(result.flags);
            }

            // DEC IXH / DEC IXL
            0x25 | 0x2D => {
                let r = op >> 3;
                let result = alu::dec8(self.get_reg8_indexed(idx, r), self.regs.f);
                self.set_reg8_indexed(idx, r, result.value);
                self.set_f(result.flags);
            }

            // LD IXH, n / LD IXL, n
            0x26 | 0x2E => {
                let n = self.fetch_arg(bus);
                self.set_reg8_indexed(idx, op >> 3, n);
            }

            // LD IX, (nn)
            0x2A => {
                let addr = self.fetch_arg16(bus);
                let value = Self::read16(bus, addr);
                self.set_index(idx, value);
                self.regs.wz = addr.wrapping_add(1);
            }

            // INC (IX+d)
            0x34 => {
                let addr = self.indexed_address(bus, idx);
                let result = alu::inc8(bus.read(addr), self.regs.f);
                bus.write(addr, result.value);
                self.set_f(result.flags);
            }

            // DEC (IX+d)
            0x35 => {
                let addr = self.indexed_address(bus, idx);
                let result = alu::dec8(bus.read(addr), self.regs.f);
                bus.write(addr, result.value);
                self.set_f(result.flags);
            }

            // LD (IX+d), n
            0x36 => {
                let addr = self.indexed_address(bus, idx);
                let n = self.fetch_arg(bus);
                bus.write(addr, n);
            }

            // LD r, r' with H/L replaced by the index halves
            0x44 | 0x45 | 0x4C | 0x4D | 0x54 | 0x55 | 0x5C | 0x5D | 0x60..=0x65 | 0x67..=0x6D
            | 0x6F | 0x7C | 0x7D => {
                let value = self.get_reg8_indexed(idx, op);
                self.set_reg8_indexed(idx, op >> 3, value);
            }

            // LD r, (IX+d): r is the real H or L
            0x46 | 0x4E | 0x56 | 0x5E | 0x66 | 0x6E | 0x7E => {
                let addr = self.indexed_address(bus, idx);
                let value = bus.read(addr);
                self.set_reg8(op >> 3, value);
            }

            // LD (IX+d), r
            0x70..=0x75 | 0x77 => {
                let addr = self.indexed_address(bus, idx);
                bus.write(addr, self.get_reg8(op));
            }

            // ALU A, IXH / IXL
            0x84 | 0x85 | 0x8C | 0x8D | 0x94 | 0x95 | 0x9C | 0x9D | 0xA4 | 0xA5 | 0xAC | 0xAD
            | 0xB4 | 0xB5 | 0xBC | 0xBD => {
                let value = self.get_reg8_indexed(idx, op);
                self.alu_a(op >> 3, value);
            }

            // ALU A, (IX+d)
            0x86 | 0x8E | 0x96 | 0x9E | 0xA6 | 0xAE | 0xB6 | 0xBE => {
                let addr = self.indexed_address(bus, idx);
                let value = bus.read(addr);
                self.alu_a(op >> 3, value);
            }

            0xCB => self.execute_indexed_cb(bus, idx),

            // POP IX
            0xE1 => {
                let value = self.pop(bus);
                self.set_index(idx, value);
            }

            // EX (SP), IX
            0xE3 => {
                let sp = self.regs.sp;
                let value = Self::read16(bus, sp);
                Self::write16(bus, sp, self.index(idx));
                self.set_index(idx, value);
                self.regs.wz = value;
            }

            // PUSH IX
            0xE5 => {
                let value = self.index(idx);
                self.push(bus, value);
            }

            // JP (IX)
            0xE9 => self.regs.pc = self.index(idx),

            // LD SP, IX
            0xF9 => self.regs.sp = self.index(idx),

            0xED => self.execute_ed(bus),

            _ => self.execute_unprefixed(bus, op),
        }
    }

    /// DD CB d op / FD CB d op. Neither the displacement nor the final
    /// opcode is an M1 fetch, so R is not bumped here.
    fn execute_indexed_cb<B: Bus>(&mut self, bus: &mut B, idx: IndexReg) {
        let addr = self.indexed_address(bus, idx);
        let op = self.fetch_arg(bus);
        self.charge(CC_XYCB[op as usize]);

        let r = op & 7;
        let n = (op >> 3) & 7;
        let value = bus.read(addr);

        let result = match op >> 6 {
            0 => {
                let result = alu::rot8(op, value, self.regs.f);
                self.set_f(result.flags);
                result.value
            }
            1 => {
                self.set_f(alu::bit(n, value, (addr >> 8) as u8, self.regs.f));
                return;
            }
            2 => value & !(1 << n),
            _ => value | (1 << n),
        };

        bus.write(addr, result);
        // Undocumented: the result is also copied to a register
        if r != 6 {
            self.set_reg8(r, result);
        }
    }
}
