//! Unprefixed instructions.

use emu_core::Bus;

use crate::alu;
use crate::flags::{CF, HF, PF, SF, XF, YF, ZF};
use crate::timing::{CC_EX, CC_OP};

use super::Z80;
use super::indexed::IndexReg;

impl Z80 {
    /// Execute an unprefixed opcode. The table cost is already charged.
    pub(super) fn execute_unprefixed<B: Bus>(&mut self, bus: &mut B, op: u8) {
        match op {
            // NOP
            0x00 => {}

            // LD rr, nn
            0x01 | 0x11 | 0x21 | 0x31 => {
                let value = self.fetch_arg16(bus);
                self.set_rp(op >> 4, value);
            }

            // LD (BC), A / LD (DE), A
            0x02 | 0x12 => {
                let addr = if op == 0x02 { self.regs.bc() } else { self.regs.de() };
                bus.write(addr, self.regs.a);
                self.regs.wz = (u16::from(self.regs.a) << 8) | (addr.wrapping_add(1) & 0xFF);
            }

            // INC rr
            0x03 | 0x13 | 0x23 | 0x33 => {
                let p = op >> 4;
                self.set_rp(p, self.get_rp(p).wrapping_add(1));
            }

            // DEC rr
            0x0B | 0x1B | 0x2B | 0x3B => {
                let p = op >> 4;
                self.set_rp(p, self.get_rp(p).wrapping_sub(1));
                if p != 3 {
                    self.accelerate_countdown(bus, p);
                }
            }

            // INC r
            0x04 | 0x0C | 0x14 | 0x1C | 0x24 | 0x2C | 0x3C => {
                let r = op >> 3;
                let result = alu::inc8(self.get_reg8(r), self.regs.f);
                self.set_reg8(r, result.value);
                self.set_f(result.flags);
            }

            // INC (HL)
            0x34 => {
                let hl = self.regs.hl();
                let result = alu::inc8(bus.read(hl), self.regs.f);
                bus.write(hl, result.value);
                self.set_f(result.flags);
            }

            // DEC r
            0x05 | 0x0D | 0x15 | 0x1D | 0x25 | 0x2D | 0x3D => {
                let r = op >> 3;
                let result = alu::dec8(self.get_reg8(r), self.regs.f);
                self.set_reg8(r, result.value);
                self.set_f(result.flags);
            }

            // DEC (HL)
            0x35 => {
                let hl = self.regs.hl();
                let result = alu::dec8(bus.read(hl), self.regs.f);
                bus.write(hl, result.value);
                self.set_f(result.flags);
            }

            // LD r, n
            0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x3E => {
                let n = self.fetch_arg(bus);
                self.set_reg8(op >> 3, n);
            }

            // LD (HL), n
            0x36 => {
                let n = self.fetch_arg(bus);
                bus.write(self.regs.hl(), n);
            }

            // RLCA / RRCA / RLA / RRA
            0x07 | 0x0F | 0x17 | 0x1F => {
                let result = alu::rotate_a(op, self.regs.a, self.regs.f);
                self.regs.a = result.value;
                self.set_f(result.flags);
            }

            // EX AF, AF'
            0x08 => self.regs.swap_af(),

            // ADD HL, rr
            0x09 | 0x19 | 0x29 | 0x39 => {
                let hl = self.regs.hl();
                let result = alu::add16(hl, self.get_rp(op >> 4), self.regs.f);
                self.regs.wz = hl.wrapping_add(1);
                self.regs.set_hl(result.value);
                self.set_f(result.flags);
            }

            // LD A, (BC) / LD A, (DE)
            0x0A | 0x1A => {
                let addr = if op == 0x0A { self.regs.bc() } else { self.regs.de() };
                self.regs.a = bus.read(addr);
                self.regs.wz = addr.wrapping_add(1);
            }

            // DJNZ e
            0x10 => {
                let d = self.fetch_arg(bus) as i8;
                self.regs.b = self.regs.b.wrapping_sub(1);
                if self.regs.b != 0 {
                    self.charge(CC_EX[0x10]);
                    self.jump_relative(d);
                }
            }

            // JR e
            0x18 => {
                let op_addr = self.regs.pc.wrapping_sub(1);
                let d = self.fetch_arg(bus) as i8;
                self.jump_relative(d);
                self.accelerate_jump(bus, op_addr, CC_OP[0x18]);
            }

            // JR cc, e
            0x20 | 0x28 | 0x30 | 0x38 => {
                let d = self.fetch_arg(bus) as i8;
                if self.condition((op >> 3) & 3) {
                    self.charge(CC_EX[op as usize]);
                    self.jump_relative(d);
                }
            }

            // LD (nn), HL
            0x22 => {
                let addr = self.fetch_arg16(bus);
                Self::write16(bus, addr, self.regs.hl());
                self.regs.wz = addr.wrapping_add(1);
            }

            // LD HL, (nn)
            0x2A => {
                let addr = self.fetch_arg16(bus);
                let value = Self::read16(bus, addr);
                self.regs.set_hl(value);
                self.regs.wz = addr.wrapping_add(1);
            }

            // LD (nn), A
            0x32 => {
                let addr = self.fetch_arg16(bus);
                bus.write(addr, self.regs.a);
                self.regs.wz = (u16::from(self.regs.a) << 8) | (addr.wrapping_add(1) & 0xFF);
            }

            // LD A, (nn)
            0x3A => {
                let addr = self.fetch_arg16(bus);
                self.regs.a = bus.read(addr);
                self.regs.wz = addr.wrapping_add(1);
            }

            // DAA
            0x27 => {
                let result = alu::daa(self.regs.a, self.regs.f);
                self.regs.a = result.value;
                self.set_f(result.flags);
            }

            // CPL
            0x2F => {
                let result = alu::cpl(self.regs.a, self.regs.f);
                self.regs.a = result.value;
                self.set_f(result.flags);
            }

            // SCF
            0x37 => {
                // Undocumented: X/Y flags from (prev_Q XOR F) OR A
                let q_xor_f = self.prev_q ^ self.regs.f;
                self.set_f(
                    (self.regs.f & (SF | ZF | PF)) | CF | ((q_xor_f | self.regs.a) & (XF | YF)),
                );
            }

            // CCF
            0x3F => {
                let old_cf = self.regs.f & CF;
                let q_xor_f = self.prev_q ^ self.regs.f;
                self.set_f(
                    (self.regs.f & (SF | ZF | PF))
                        | ((q_xor_f | self.regs.a) & (XF | YF))
                        | if old_cf != 0 { HF } else { CF },
                );
            }

            // HALT: park PC on the opcode; the execute loop burns from here
            0x76 => {
                self.regs.pc = self.regs.pc.wrapping_sub(1);
                self.regs.halted = true;
            }

            // LD r, r' / LD r, (HL) / LD (HL), r
            0x40..=0x7F => {
                let dst = (op >> 3) & 7;
                let src = op & 7;
                if src == 6 {
                    let value = bus.read(self.regs.hl());
                    self.set_reg8(dst, value);
                } else if dst == 6 {
                    bus.write(self.regs.hl(), self.get_reg8(src));
                } else {
                    self.set_reg8(dst, self.get_reg8(src));
                }
            }

            // ALU A, r / ALU A, (HL)
            0x80..=0xBF => {
                let value = if op & 7 == 6 { bus.read(self.regs.hl()) } else { self.get_reg8(op) };
                self.alu_a(op >> 3, value);
            }

            // RET cc
            0xC0 | 0xC8 | 0xD0 | 0xD8 | 0xE0 | 0xE8 | 0xF0 | 0xF8 => {
                if self.condition(op >> 3) {
                    self.charge(CC_EX[op as usize]);
                    self.regs.pc = self.pop(bus);
                    self.regs.wz = self.regs.pc;
                }
            }

            // POP rr (POP AF does not latch Q)
            0xC1 | 0xD1 | 0xE1 | 0xF1 => {
                let value = self.pop(bus);
                self.set_rp_af(op >> 4, value);
            }

            // JP cc, nn
            0xC2 | 0xCA | 0xD2 | 0xDA | 0xE2 | 0xEA | 0xF2 | 0xFA => {
                let addr = self.fetch_arg16(bus);
                if self.condition(op >> 3) {
                    self.regs.pc = addr;
                }
                self.regs.wz = addr;
            }

            // JP nn
            0xC3 => {
                let op_addr = self.regs.pc.wrapping_sub(1);
                let addr = self.fetch_arg16(bus);
                self.regs.pc = addr;
                self.regs.wz = addr;
                self.accelerate_jump(bus, op_addr, CC_OP[0xC3]);
            }

            // CALL cc, nn
            0xC4 | 0xCC | 0xD4 | 0xDC | 0xE4 | 0xEC | 0xF4 | 0xFC => {
                let addr = self.fetch_arg16(bus);
                self.regs.wz = addr;
                if self.condition(op >> 3) {
                    self.charge(CC_EX[op as usize]);
                    self.push(bus, self.regs.pc);
                    self.regs.pc = addr;
                }
            }

            // PUSH rr
            0xC5 | 0xD5 | 0xE5 | 0xF5 => {
                let value = self.get_rp_af(op >> 4);
                self.push(bus, value);
            }

            // ALU A, n
            0xC6 | 0xCE | 0xD6 | 0xDE | 0xE6 | 0xEE | 0xF6 | 0xFE => {
                let n = self.fetch_arg(bus);
                self.alu_a(op >> 3, n);
            }

            // RST p
            0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => {
                self.push(bus, self.regs.pc);
                self.regs.pc = u16::from(op & 0x38);
                self.regs.wz = self.regs.pc;
            }

            // RET
            0xC9 => {
                self.regs.pc = self.pop(bus);
                self.regs.wz = self.regs.pc;
            }

            0xCB => self.execute_cb(bus),

            // CALL nn
            0xCD => {
                let addr = self.fetch_arg16(bus);
                self.regs.wz = addr;
                self.push(bus, self.regs.pc);
                self.regs.pc = addr;
            }

            // OUT (n), A
            0xD3 => {
                let n = self.fetch_arg(bus);
                let a = u16::from(self.regs.a) << 8;
                bus.io_write(a | u16::from(n), self.regs.a);
                self.regs.wz = a | u16::from(n.wrapping_add(1));
            }

            // EXX
            0xD9 => self.regs.exx(),

            // IN A, (n)
            0xDB => {
                let n = self.fetch_arg(bus);
                let port = (u16::from(self.regs.a) << 8) | u16::from(n);
                self.regs.a = bus.io_read(port);
                self.regs.wz = port.wrapping_add(1);
            }

            0xDD => self.execute_indexed(bus, IndexReg::Ix),

            // EX (SP), HL
            0xE3 => {
                let sp = self.regs.sp;
                let value = Self::read16(bus, sp);
                Self::write16(bus, sp, self.regs.hl());
                self.regs.set_hl(value);
                self.regs.wz = value;
            }

            // JP (HL)
            0xE9 => self.regs.pc = self.regs.hl(),

            // EX DE, HL
            0xEB => {
                let de = self.regs.de();
                self.regs.set_de(self.regs.hl());
                self.regs.set_hl(de);
            }

            0xED => self.execute_ed(bus),

            // DI
            0xF3 => {
                self.regs.iff1 = false;
                self.regs.iff2 = false;
            }

            // LD SP, HL
            0xF9 => self.regs.sp = self.regs.hl(),

            // EI: interrupts stay blocked until after the next instruction
            0xFB => {
                self.regs.iff1 = true;
                self.regs.iff2 = true;
                self.ei_delay = true;
            }

            0xFD => self.execute_indexed(bus, IndexReg::Iy),
        }
    }

    fn jump_relative(&mut self, d: i8) {
        self.regs.pc = self.regs.pc.wrapping_add_signed(i16::from(d));
        self.regs.wz = self.regs.pc;
    }
}
