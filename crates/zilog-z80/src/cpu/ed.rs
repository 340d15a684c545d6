//! ED-prefixed instructions.

use emu_core::Bus;

use crate::alu;
use crate::flags::{CF, HF, NF, PF, SF, XF, YF, ZF};
use crate::timing::{CC_ED, CC_EX};

use super::Z80;

impl Z80 {
    pub(super) fn execute_ed<B: Bus>(&mut self, bus: &mut B) {
        self.regs.inc_r();
        let op = self.fetch_opcode(bus);
        self.charge(CC_ED[op as usize]);

        match op {
            // IN r, (C); ED 70 only sets flags
            0x40 | 0x48 | 0x50 | 0x58 | 0x60 | 0x68 | 0x70 | 0x78 => {
                let bc = self.regs.bc();
                let value = bus.io_read(bc);
                self.regs.wz = bc.wrapping_add(1);
                self.set_reg8(op >> 3, value);
                self.set_f((self.regs.f & CF) | self.tables.szp[value as usize]);
            }

            // OUT (C), r; ED 71 outputs 0 on NMOS parts
            0x41 | 0x49 | 0x51 | 0x59 | 0x61 | 0x69 | 0x71 | 0x79 => {
                let bc = self.regs.bc();
                bus.io_write(bc, self.get_reg8(op >> 3));
                self.regs.wz = bc.wrapping_add(1);
            }

            // SBC HL, rr
            0x42 | 0x52 | 0x62 | 0x72 => {
                let hl = self.regs.hl();
                let result = alu::sbc16(hl, self.get_rp(op >> 4), self.regs.f);
                self.regs.wz = hl.wrapping_add(1);
                self.regs.set_hl(result.value);
                self.set_f(result.flags);
            }

            // ADC HL, rr
            0x4A | 0x5A | 0x6A | 0x7A => {
                let hl = self.regs.hl();
                let result = alu::adc16(hl, self.get_rp(op >> 4), self.regs.f);
                self.regs.wz = hl.wrapping_add(1);
                self.regs.set_hl(result.value);
                self.set_f(result.flags);
            }

            // LD (nn), rr
            0x43 | 0x53 | 0x63 | 0x73 => {
                let addr = self.fetch_arg16(bus);
                Self::write16(bus, addr, self.get_rp(op >> 4));
                self.regs.wz = addr.wrapping_add(1);
            }

            // LD rr, (nn)
            0x4B | 0x5B | 0x6B | 0x7B => {
                let addr = self.fetch_arg16(bus);
                let value = Self::read16(bus, addr);
                self.set_rp(op >> 4, value);
                self.regs.wz = addr.wrapping_add(1);
            }

            // NEG
            0x44 | 0x4C | 0x54 | 0x5C | 0x64 | 0x6C | 0x74 | 0x7C => {
                let result = alu::neg(self.regs.a);
                self.regs.a = result.value;
                self.set_f(result.flags);
            }

            // RETN (and its undocumented mirrors)
            0x45 | 0x55 | 0x5D | 0x65 | 0x6D | 0x75 | 0x7D => {
                self.regs.pc = self.pop(bus);
                self.regs.wz = self.regs.pc;
                self.regs.iff1 = self.regs.iff2;
            }

            // RETI: peripherals decode this opcode pair to release the chain
            0x4D => {
                self.regs.pc = self.pop(bus);
                self.regs.wz = self.regs.pc;
                self.regs.iff1 = self.regs.iff2;
                if let Some(chain) = &mut self.daisy {
                    chain.reti();
                }
            }

            // IM 0 / IM 1 / IM 2
            0x46 | 0x4E | 0x66 | 0x6E => self.regs.im = 0,
            0x56 | 0x76 => self.regs.im = 1,
            0x5E | 0x7E => self.regs.im = 2,

            // LD I, A / LD R, A
            0x47 => self.regs.i = self.regs.a,
            0x4F => self.regs.r = self.regs.a,

            // LD A, I / LD A, R: P/V reflects IFF2
            0x57 | 0x5F => {
                self.regs.a = if op == 0x57 { self.regs.i } else { self.regs.r };
                let iff2 = if self.regs.iff2 { PF } else { 0 };
                self.set_f((self.regs.f & CF) | self.tables.sz[self.regs.a as usize] | iff2);
                self.after_ld_a_ir = true;
            }

            // RRD
            0x67 => {
                let hl = self.regs.hl();
                let m = bus.read(hl);
                self.regs.wz = hl.wrapping_add(1);
                bus.write(hl, (m >> 4) | (self.regs.a << 4));
                self.regs.a = (self.regs.a & 0xF0) | (m & 0x0F);
                self.set_f((self.regs.f & CF) | self.tables.szp[self.regs.a as usize]);
            }

            // RLD
            0x6F => {
                let hl = self.regs.hl();
                let m = bus.read(hl);
                self.regs.wz = hl.wrapping_add(1);
                bus.write(hl, (m << 4) | (self.regs.a & 0x0F));
                self.regs.a = (self.regs.a & 0xF0) | (m >> 4);
                self.set_f((self.regs.f & CF) | self.tables.szp[self.regs.a as usize]);
            }

            // LDI / LDD / LDIR / LDDR
            0xA0 | 0xA8 | 0xB0 | 0xB8 => self.block_ld(bus, op),

            // CPI / CPD / CPIR / CPDR
            0xA1 | 0xA9 | 0xB1 | 0xB9 => self.block_cp(bus, op),

            // INI / IND / INIR / INDR
            0xA2 | 0xAA | 0xB2 | 0xBA => self.block_in(bus, op),

            // OUTI / OUTD / OTIR / OTDR
            0xA3 | 0xAB | 0xB3 | 0xBB => self.block_out(bus, op),

            _ => {
                tracing::debug!(opcode = op, pc = self.regs.prepc, "undefined ED opcode");
            }
        }
    }

    /// +1 for the increment forms (bit 3 clear), -1 for the decrement forms.
    fn block_step(op: u8) -> u16 {
        if op & 0x08 == 0 { 1 } else { 0xFFFF }
    }

    /// Repeat forms rewind PC onto the ED prefix and charge the extra time.
    /// Returns the high byte of the rewound PC, which supplies X/Y.
    fn block_repeat(&mut self, op: u8) -> u8 {
        self.charge(CC_EX[op as usize]);
        self.regs.pc = self.regs.pc.wrapping_sub(2);
        self.regs.wz = self.regs.pc.wrapping_add(1);
        (self.regs.pc >> 8) as u8
    }

    fn block_ld<B: Bus>(&mut self, bus: &mut B, op: u8) {
        let step = Self::block_step(op);
        let value = bus.read(self.regs.hl());
        bus.write(self.regs.de(), value);
        self.regs.set_hl(self.regs.hl().wrapping_add(step));
        self.regs.set_de(self.regs.de().wrapping_add(step));
        self.regs.set_bc(self.regs.bc().wrapping_sub(1));

        let n = value.wrapping_add(self.regs.a);
        let mut f = (self.regs.f & (SF | ZF | CF)) | (n & XF) | ((n << 4) & YF);
        if self.regs.bc() != 0 {
            f |= PF;
            if op & 0x10 != 0 {
                let pch = self.block_repeat(op);
                f = (f & !(XF | YF)) | (pch & (XF | YF));
            }
        }
        self.set_f(f);
    }

    fn block_cp<B: Bus>(&mut self, bus: &mut B, op: u8) {
        let step = Self::block_step(op);
        let value = bus.read(self.regs.hl());
        let result = self.regs.a.wrapping_sub(value);
        self.regs.set_hl(self.regs.hl().wrapping_add(step));
        self.regs.set_bc(self.regs.bc().wrapping_sub(1));
        self.regs.wz = self.regs.wz.wrapping_add(step);

        let mut f = (self.regs.f & CF)
            | NF
            | (self.tables.sz[result as usize] & !(XF | YF))
            | ((self.regs.a ^ value ^ result) & HF);
        let n = if f & HF != 0 { result.wrapping_sub(1) } else { result };
        f |= (n & XF) | ((n << 4) & YF);
        if self.regs.bc() != 0 {
            f |= PF;
            if op & 0x10 != 0 && result != 0 {
                let pch = self.block_repeat(op);
                f = (f & !(XF | YF)) | (pch & (XF | YF));
            }
        }
        self.set_f(f);
    }

    fn block_in<B: Bus>(&mut self, bus: &mut B, op: u8) {
        let step = Self::block_step(op);
        let bc = self.regs.bc();
        let value = bus.io_read(bc);
        self.regs.wz = bc.wrapping_add(step);
        self.regs.b = self.regs.b.wrapping_sub(1);
        bus.write(self.regs.hl(), value);
        self.regs.set_hl(self.regs.hl().wrapping_add(step));

        let k = u16::from(value) + u16::from(self.regs.c.wrapping_add(step as u8));
        self.block_io_flags(op, value, k);
    }

    fn block_out<B: Bus>(&mut self, bus: &mut B, op: u8) {
        let step = Self::block_step(op);
        let value = bus.read(self.regs.hl());
        self.regs.b = self.regs.b.wrapping_sub(1);
        let bc = self.regs.bc();
        bus.io_write(bc, value);
        self.regs.wz = bc.wrapping_add(step);
        self.regs.set_hl(self.regs.hl().wrapping_add(step));

        let k = u16::from(value) + u16::from(self.regs.l);
        self.block_io_flags(op, value, k);
    }

    /// Flags shared by the INI/OUTI family. `k` is the transferred byte
    /// plus C±1 (input) or the updated L (output).
    fn block_io_flags(&mut self, op: u8, value: u8, k: u16) {
        let b = self.regs.b;
        let carry = k > 0xFF;
        let p = (k as u8 & 7) ^ b;

        let mut f = self.tables.sz[b as usize] | (self.tables.szp[p as usize] & PF);
        if value & 0x80 != 0 {
            f |= NF;
        }
        if carry {
            f |= HF | CF;
        }

        if b != 0 && op & 0x10 != 0 {
            let pch = self.block_repeat(op);
            // The repeat cycles run B through the ALU once more, which
            // rewrites H and P/V.
            let (hf, pf) = if carry {
                if value & 0x80 != 0 {
                    let hf = if b & 0x0F == 0 { HF } else { 0 };
                    (hf, self.tables.szp[(p ^ (b.wrapping_sub(1) & 7)) as usize] & PF)
                } else {
                    let hf = if b & 0x0F == 0x0F { HF } else { 0 };
                    (hf, self.tables.szp[(p ^ (b.wrapping_add(1) & 7)) as usize] & PF)
                }
            } else {
                (0, self.tables.szp[(p ^ (b & 7)) as usize] & PF)
            };
            f = (f & (SF | ZF | NF | CF)) | (pch & (XF | YF)) | hf | pf;
        }
        self.set_f(f);
    }
}
