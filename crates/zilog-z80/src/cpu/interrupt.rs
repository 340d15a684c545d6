//! NMI and maskable interrupt entry.

use emu_core::{Bus, LineState};

use crate::flags::PF;
use crate::timing::{CC_OP, IRQ_LATENCY, NMI_ENTRY};

use super::Z80;

impl Z80 {
    /// Is a maskable request waiting? With a populated daisy chain only the
    /// chain's arbitration counts, otherwise the raw IRQ line.
    pub(crate) fn irq_requested(&self) -> bool {
        match &self.daisy {
            Some(chain) if !chain.is_empty() => chain.request().is_some(),
            _ => self.irq_state.is_active(),
        }
    }

    /// Could an interrupt be taken at the next instruction boundary?
    pub(crate) fn interrupt_possible(&self) -> bool {
        self.nmi_pending || (self.regs.iff1 && self.irq_requested())
    }

    /// Run at every instruction boundary. Returns true if an interrupt was
    /// entered (and its cost charged).
    pub(super) fn service_interrupts<B: Bus>(&mut self, bus: &mut B) -> bool {
        if self.ei_delay {
            self.ei_delay = false;
            return false;
        }
        if self.nmi_pending {
            self.take_nmi(bus);
            return true;
        }
        if self.regs.iff1 && self.irq_requested() {
            self.take_irq(bus);
            return true;
        }
        false
    }

    /// An accepted interrupt resumes after the HALT opcode.
    fn leave_halt(&mut self) {
        if self.regs.halted {
            self.regs.halted = false;
            self.regs.pc = self.regs.pc.wrapping_add(1);
        }
    }

    fn take_nmi<B: Bus>(&mut self, bus: &mut B) {
        self.nmi_pending = false;
        if self.nmi_state == LineState::Hold {
            self.nmi_state = LineState::Clear;
        }
        self.leave_halt();
        self.after_ld_a_ir = false;
        self.regs.inc_r();
        self.regs.iff1 = false;

        self.push(bus, self.regs.pc);
        self.regs.pc = 0x0066;
        self.regs.wz = self.regs.pc;
        self.charge(NMI_ENTRY);
        tracing::trace!(sp = self.regs.sp, "nmi taken");
    }

    fn take_irq<B: Bus>(&mut self, bus: &mut B) {
        if self.irq_state == LineState::Hold {
            self.irq_state = LineState::Clear;
        }
        self.leave_halt();
        // NMOS parts: an interrupt accepted right after LD A,I / LD A,R
        // leaves P/V reading as if IFF2 were already clear.
        if self.after_ld_a_ir {
            self.regs.f &= !PF;
            self.after_ld_a_ir = false;
        }
        self.regs.inc_r();
        self.regs.iff1 = false;
        self.regs.iff2 = false;

        let data = match &mut self.daisy {
            Some(chain) if !chain.is_empty() => u32::from(chain.acknowledge().unwrap_or(0xFF)),
            _ => bus.irq_ack(),
        };

        match self.regs.im {
            2 => {
                let table = (u16::from(self.regs.i) << 8) | (data & 0xFF) as u16;
                self.push(bus, self.regs.pc);
                self.regs.pc = Self::read16(bus, table);
                self.charge(CC_OP[0xCD] + IRQ_LATENCY);
            }
            1 => {
                self.push(bus, self.regs.pc);
                self.regs.pc = 0x0038;
                self.charge(CC_OP[0xFF] + IRQ_LATENCY);
            }
            _ => match data & 0x00FF_0000 {
                // CALL nnnn
                0x00CD_0000 => {
                    self.push(bus, self.regs.pc);
                    self.regs.pc = data as u16;
                    self.charge(CC_OP[0xCD] + IRQ_LATENCY);
                }
                // JP nnnn
                0x00C3_0000 => {
                    self.regs.pc = data as u16;
                    self.charge(CC_OP[0xC3] + IRQ_LATENCY);
                }
                // Anything else is taken as RST
                _ => {
                    self.push(bus, self.regs.pc);
                    self.regs.pc = (data & 0x38) as u16;
                    self.charge(CC_OP[0xFF] + IRQ_LATENCY);
                }
            },
        }
        self.regs.wz = self.regs.pc;
        tracing::trace!(im = self.regs.im, data, pc = self.regs.pc, "irq taken");
    }
}
