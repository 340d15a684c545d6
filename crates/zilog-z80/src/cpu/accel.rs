//! Busy-loop fast-forwarding.
//!
//! Each pass recognises a loop shape right after the instruction that
//! closes it, then skips whole iterations in one step. The number skipped
//! always leaves at least one T-state in the slice, so the interpreter
//! resumes exactly where literal execution would be, with the same
//! registers and the same consumed cycles. Nothing is skipped while an
//! interrupt could be accepted.
//!
//! Loop bytes are inspected with plain `Bus::read` calls, never through
//! the opcode or operand fetch hooks.

use emu_core::Bus;

use crate::timing::{CC_EX, CC_OP};

use super::Z80;

impl Z80 {
    fn can_accelerate(&self) -> bool {
        self.config.loop_acceleration && self.icount > 0 && !self.interrupt_possible()
    }

    /// Whole iterations of `cost` T-states that fit while still leaving
    /// the slice positive.
    fn skippable(&self, cost: i64) -> i64 {
        if self.icount <= 0 { 0 } else { (self.icount - 1) / cost }
    }

    /// `JP`/`JR` at `op_addr` has just landed on PC.
    ///
    /// Handles `JP $` / `JR $`, and `NOP` or `EI` directly in front of a
    /// jump back to it.
    pub(super) fn accelerate_jump<B: Bus>(&mut self, bus: &mut B, op_addr: u16, jump_cost: u8) {
        if !self.can_accelerate() {
            return;
        }
        let target = self.regs.pc;
        let jump_cost = i64::from(jump_cost);

        if target == op_addr {
            let n = self.skippable(jump_cost);
            if n > 0 {
                self.icount -= n * jump_cost;
                self.regs.add_r(n as u64);
                self.regs.prepc = op_addr;
                tracing::trace!(pc = target, iterations = n, "self-jump skipped");
            }
            return;
        }

        if target != op_addr.wrapping_sub(1) {
            return;
        }
        let filler = bus.read(target);
        let is_nop = filler == 0x00;
        // EI only repeats harmlessly once interrupts are already enabled
        let is_ei = filler == 0xFB && self.regs.iff1;
        if !is_nop && !is_ei {
            return;
        }

        let cost = i64::from(CC_OP[filler as usize]) + jump_cost;
        let n = self.skippable(cost);
        if n > 0 {
            self.icount -= n * cost;
            self.regs.add_r(2 * n as u64);
            self.regs.prepc = op_addr;
            if is_ei {
                self.regs.iff2 = true;
            }
            tracing::trace!(pc = target, iterations = n, "idle loop skipped");
        }
    }

    /// `DEC rr` (BC, DE or HL) has just executed. Recognises
    ///
    /// ```text
    /// loop: DEC rr
    ///       LD A,hi / LD A,lo
    ///       OR lo   / OR hi
    ///       JR NZ,loop  or  JP NZ,loop
    /// ```
    ///
    /// and runs as many whole iterations as fit in one go.
    pub(super) fn accelerate_countdown<B: Bus>(&mut self, bus: &mut B, pair: u8) {
        if !self.can_accelerate() {
            return;
        }
        let pc = self.regs.pc;
        let count = self.get_rp(pair);
        if count <= 1 || pc >= 0xFFFC {
            return;
        }

        let hi = pair * 2;
        let lo = hi + 1;
        let (b0, b1) = (bus.read(pc), bus.read(pc + 1));
        let tests_pair = (b0 == (0x78 | hi) && b1 == (0xB0 | lo)) || (b0 == (0x78 | lo) && b1 == (0xB0 | hi));
        if !tests_pair {
            return;
        }

        let dec_addr = pc.wrapping_sub(1);
        let body = CC_OP[0x78] + CC_OP[0xB0] + CC_OP[0x0B];
        let cost = match bus.read(pc + 2) {
            0x20 if bus.read(pc + 3) == 0xFB => body + CC_OP[0x20] + CC_EX[0x20],
            0xC2 if Self::read16(bus, pc + 3) == dec_addr => body + CC_OP[0xC2],
            _ => return,
        };
        let cost = i64::from(cost);

        let n = self.skippable(cost).min(i64::from(count));
        if n <= 0 {
            return;
        }
        self.icount -= n * cost;
        self.regs.add_r(4 * n as u64);

        // State after the last skipped DEC: A and F hold the OR of the
        // value tested on that pass.
        let remaining = count - n as u16;
        let [tested_hi, tested_lo] = remaining.wrapping_add(1).to_be_bytes();
        self.set_rp(pair, remaining);
        self.regs.a = tested_hi | tested_lo;
        self.regs.f = self.tables.szp[self.regs.a as usize];
        self.regs.wz = dec_addr;
        self.regs.prepc = dec_addr;
        self.q = 0;
        tracing::trace!(pc = dec_addr, iterations = n, "countdown loop skipped");
    }
}
