//! CB-prefixed instructions: rotates, shifts, BIT, RES and SET.

use emu_core::Bus;

use crate::alu;
use crate::timing::CC_CB;

use super::Z80;

impl Z80 {
    pub(super) fn execute_cb<B: Bus>(&mut self, bus: &mut B) {
        self.regs.inc_r();
        let op = self.fetch_opcode(bus);
        self.charge(CC_CB[op as usize]);

        let r = op & 7;
        let n = (op >> 3) & 7;
        let hl = self.regs.hl();
        let value = if r == 6 { bus.read(hl) } else { self.get_reg8(r) };

        let result = match op >> 6 {
            0 => {
                let result = alu::rot8(op, value, self.regs.f);
                self.set_f(result.flags);
                result.value
            }
            1 => {
                // BIT n,(HL) leaks the high byte of WZ into X/Y
                let xy = if r == 6 { (self.regs.wz >> 8) as u8 } else { value };
                self.set_f(alu::bit(n, value, xy, self.regs.f));
                return;
            }
            2 => value & !(1 << n),
            _ => value | (1 << n),
        };

        if r == 6 {
            bus.write(hl, result);
        } else {
            self.set_reg8(r, result);
        }
    }
}
