//! Z80 CPU core.

mod accel;
mod cb;
mod ed;
mod execute;
mod indexed;
mod interrupt;

use emu_core::{Bus, Cpu, LineState, Observable, Value};

use crate::config::Z80Config;
use crate::daisy::DaisyChain;
use crate::flags::{CF, FlagTables, HF, NF, PF, SF, XF, YF, ZF, tables};
use crate::registers::{Register, Registers};
use crate::timing::CC_OP;

/// Zilog Z80 CPU.
pub struct Z80 {
    pub(crate) regs: Registers,
    pub(crate) config: Z80Config,
    pub(crate) tables: &'static FlagTables,

    /// T-states left in the current `execute` slice. Goes negative when
    /// the last instruction overruns the budget.
    pub(crate) icount: i64,
    total_cycles: u64,

    pub(crate) irq_state: LineState,
    pub(crate) nmi_state: LineState,
    /// Latched on the rising edge of NMI, cleared when the NMI is taken.
    pub(crate) nmi_pending: bool,
    /// Set by EI: no interrupt is accepted at the next boundary.
    pub(crate) ei_delay: bool,
    /// The last instruction was `LD A,I` or `LD A,R`.
    pub(crate) after_ld_a_ir: bool,

    /// Flags written by the current instruction (0 if it wrote none).
    pub(crate) q: u8,
    /// `q` of the previous instruction. Feeds X/Y of SCF and CCF.
    pub(crate) prev_q: u8,

    pub(crate) daisy: Option<DaisyChain>,
}

impl Default for Z80 {
    fn default() -> Self {
        Self::new()
    }
}

impl Z80 {
    /// Create a CPU in the reset state with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Z80Config::default())
    }

    #[must_use]
    pub fn with_config(config: Z80Config) -> Self {
        Self {
            regs: Registers::default(),
            config,
            tables: tables(),
            icount: 0,
            total_cycles: 0,
            irq_state: LineState::Clear,
            nmi_state: LineState::Clear,
            nmi_pending: false,
            ei_delay: false,
            after_ld_a_ir: false,
            q: 0,
            prev_q: 0,
            daisy: None,
        }
    }

    /// Reset, replacing the interrupt daisy chain. `None` removes it and
    /// the IRQ line is then taken at face value.
    pub fn reset_with(&mut self, daisy: Option<DaisyChain>) {
        self.regs = Registers::default();
        self.irq_state = LineState::Clear;
        self.nmi_state = LineState::Clear;
        self.nmi_pending = false;
        self.ei_delay = false;
        self.after_ld_a_ir = false;
        self.q = 0;
        self.prev_q = 0;
        self.daisy = daisy;
        if let Some(chain) = &mut self.daisy {
            chain.reset();
        }
        tracing::debug!(
            daisy_devices = self.daisy.as_ref().map_or(0, DaisyChain::len),
            "z80 reset"
        );
    }

    #[must_use]
    pub fn config(&self) -> Z80Config {
        self.config
    }

    pub fn set_config(&mut self, config: Z80Config) {
        self.config = config;
    }

    /// Mutable access to the register file, for debuggers and test setup.
    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }

    /// T-states consumed by every `execute` call since construction.
    #[must_use]
    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    #[must_use]
    pub fn irq_line(&self) -> LineState {
        self.irq_state
    }

    #[must_use]
    pub fn nmi_line(&self) -> LineState {
        self.nmi_state
    }

    #[must_use]
    pub fn daisy_chain(&self) -> Option<&DaisyChain> {
        self.daisy.as_ref()
    }

    pub fn daisy_chain_mut(&mut self) -> Option<&mut DaisyChain> {
        self.daisy.as_mut()
    }

    /// Read any register, composed view, interrupt state or daisy slot.
    /// 8-bit and boolean registers are zero-extended.
    #[must_use]
    pub fn get_register(&self, reg: Register) -> u16 {
        let r = &self.regs;
        match reg {
            Register::Pc => r.pc,
            Register::Sp => r.sp,
            Register::Af => r.af(),
            Register::Bc => r.bc(),
            Register::De => r.de(),
            Register::Hl => r.hl(),
            Register::Ix => r.ix,
            Register::Iy => r.iy,
            Register::AfAlt => r.af_alt(),
            Register::BcAlt => r.bc_alt(),
            Register::DeAlt => r.de_alt(),
            Register::HlAlt => r.hl_alt(),
            Register::A => r.a.into(),
            Register::F => r.f.into(),
            Register::B => r.b.into(),
            Register::C => r.c.into(),
            Register::D => r.d.into(),
            Register::E => r.e.into(),
            Register::H => r.h.into(),
            Register::L => r.l.into(),
            Register::Ixh => r.ix >> 8,
            Register::Ixl => r.ix & 0xFF,
            Register::Iyh => r.iy >> 8,
            Register::Iyl => r.iy & 0xFF,
            Register::I => r.i.into(),
            Register::R => r.r.into(),
            Register::Im => r.im.into(),
            Register::Iff1 => r.iff1.into(),
            Register::Iff2 => r.iff2.into(),
            Register::Halt => r.halted.into(),
            Register::Wz => r.wz,
            Register::PrePc => r.prepc,
            Register::NmiState => self.nmi_state.to_byte().into(),
            Register::IrqState => self.irq_state.to_byte().into(),
            Register::Dc0 | Register::Dc1 | Register::Dc2 | Register::Dc3 => {
                let slot = reg.daisy_slot().unwrap_or_default();
                self.daisy.as_ref().map_or(0, |chain| chain.states()[slot].into())
            }
        }
    }

    /// Write any register. 8-bit targets take the low byte of `value`.
    /// Writing a line state behaves like driving the line.
    pub fn set_register(&mut self, reg: Register, value: u16) {
        let byte = value as u8;
        let r = &mut self.regs;
        match reg {
            Register::Pc => r.pc = value,
            Register::Sp => r.sp = value,
            Register::Af => r.set_af(value),
            Register::Bc => r.set_bc(value),
            Register::De => r.set_de(value),
            Register::Hl => r.set_hl(value),
            Register::Ix => r.ix = value,
            Register::Iy => r.iy = value,
            Register::AfAlt => r.set_af_alt(value),
            Register::BcAlt => r.set_bc_alt(value),
            Register::DeAlt => r.set_de_alt(value),
            Register::HlAlt => r.set_hl_alt(value),
            Register::A => r.a = byte,
            Register::F => r.f = byte,
            Register::B => r.b = byte,
            Register::C => r.c = byte,
            Register::D => r.d = byte,
            Register::E => r.e = byte,
            Register::H => r.h = byte,
            Register::L => r.l = byte,
            Register::Ixh => r.ix = (r.ix & 0x00FF) | (u16::from(byte) << 8),
            Register::Ixl => r.ix = (r.ix & 0xFF00) | u16::from(byte),
            Register::Iyh => r.iy = (r.iy & 0x00FF) | (u16::from(byte) << 8),
            Register::Iyl => r.iy = (r.iy & 0xFF00) | u16::from(byte),
            Register::I => r.i = byte,
            Register::R => r.r = byte,
            Register::Im => r.im = byte.min(2),
            Register::Iff1 => r.iff1 = value != 0,
            Register::Iff2 => r.iff2 = value != 0,
            Register::Halt => r.halted = value != 0,
            Register::Wz => r.wz = value,
            Register::PrePc => r.prepc = value,
            Register::NmiState => self.set_nmi_line(LineState::from_byte(byte)),
            Register::IrqState => self.set_irq_line(LineState::from_byte(byte)),
            Register::Dc0 | Register::Dc1 | Register::Dc2 | Register::Dc3 => {
                if let (Some(chain), Some(slot)) = (self.daisy.as_mut(), reg.daisy_slot()) {
                    chain.set_state(slot, byte);
                }
            }
        }
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Run one instruction from PC.
    fn step<B: Bus>(&mut self, bus: &mut B) {
        self.regs.prepc = self.regs.pc;
        self.after_ld_a_ir = false;
        self.prev_q = self.q;
        self.q = 0;
        self.regs.inc_r();
        let op = self.fetch_opcode(bus);
        self.charge(CC_OP[op as usize]);
        self.execute_unprefixed(bus, op);
    }

    /// HALT repeats an internal NOP until an interrupt arrives: burn the
    /// rest of the slice in 4 T-state units, one refresh each.
    fn burn_halt(&mut self) {
        let units = (self.icount + 3) / 4;
        self.regs.add_r(units as u64);
        self.icount -= units * 4;
    }

    // =========================================================================
    // Bus helpers
    // =========================================================================

    #[inline]
    pub(crate) fn charge(&mut self, cycles: u8) {
        self.icount -= i64::from(cycles);
    }

    #[inline]
    pub(crate) fn fetch_opcode<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let op = bus.fetch_opcode(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        op
    }

    #[inline]
    pub(crate) fn fetch_arg<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let v = bus.fetch_operand(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        v
    }

    pub(crate) fn fetch_arg16<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let lo = self.fetch_arg(bus);
        let hi = self.fetch_arg(bus);
        u16::from_le_bytes([lo, hi])
    }

    pub(crate) fn read16<B: Bus>(bus: &mut B, addr: u16) -> u16 {
        let lo = bus.read(addr);
        let hi = bus.read(addr.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    pub(crate) fn write16<B: Bus>(bus: &mut B, addr: u16, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        bus.write(addr, lo);
        bus.write(addr.wrapping_add(1), hi);
    }

    pub(crate) fn push<B: Bus>(&mut self, bus: &mut B, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write(self.regs.sp, hi);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write(self.regs.sp, lo);
    }

    pub(crate) fn pop<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let value = Self::read16(bus, self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(2);
        value
    }

    // =========================================================================
    // Register helpers
    // =========================================================================

    /// Write F and latch it into Q.
    #[inline]
    pub(crate) fn set_f(&mut self, f: u8) {
        self.regs.f = f;
        self.q = f;
    }

    /// 8-bit register by its 3-bit encoding. Code 6 is `(HL)` and must be
    /// handled by the caller.
    pub(crate) fn get_reg8(&self, r: u8) -> u8 {
        match r & 7 {
            0 => self.regs.b,
            1 => self.regs.c,
            2 => self.regs.d,
            3 => self.regs.e,
            4 => self.regs.h,
            5 => self.regs.l,
            7 => self.regs.a,
            _ => 0,
        }
    }

    pub(crate) fn set_reg8(&mut self, r: u8, value: u8) {
        match r & 7 {
            0 => self.regs.b = value,
            1 => self.regs.c = value,
            2 => self.regs.d = value,
            3 => self.regs.e = value,
            4 => self.regs.h = value,
            5 => self.regs.l = value,
            7 => self.regs.a = value,
            _ => {}
        }
    }

    /// Register pair by its 2-bit encoding: BC, DE, HL, SP.
    pub(crate) fn get_rp(&self, p: u8) -> u16 {
        match p & 3 {
            0 => self.regs.bc(),
            1 => self.regs.de(),
            2 => self.regs.hl(),
            _ => self.regs.sp,
        }
    }

    pub(crate) fn set_rp(&mut self, p: u8, value: u16) {
        match p & 3 {
            0 => self.regs.set_bc(value),
            1 => self.regs.set_de(value),
            2 => self.regs.set_hl(value),
            _ => self.regs.sp = value,
        }
    }

    /// Register pair for PUSH/POP: BC, DE, HL, AF.
    pub(crate) fn get_rp_af(&self, p: u8) -> u16 {
        match p & 3 {
            3 => self.regs.af(),
            p => self.get_rp(p),
        }
    }

    pub(crate) fn set_rp_af(&mut self, p: u8, value: u16) {
        match p & 3 {
            3 => self.regs.set_af(value),
            p => self.set_rp(p, value),
        }
    }

    /// Condition code: NZ, Z, NC, C, PO, PE, P, M.
    pub(crate) fn condition(&self, cc: u8) -> bool {
        let f = self.regs.f;
        match cc & 7 {
            0 => f & ZF == 0,
            1 => f & ZF != 0,
            2 => f & CF == 0,
            3 => f & CF != 0,
            4 => f & PF == 0,
            5 => f & PF != 0,
            6 => f & SF == 0,
            _ => f & SF != 0,
        }
    }

    /// 8-bit ALU operation on A.
    pub(crate) fn alu_a(&mut self, op: u8, value: u8) {
        let result = crate::alu::alu8(op, self.regs.a, value, self.regs.f);
        self.regs.a = result.value;
        self.set_f(result.flags);
    }
}

impl Cpu for Z80 {
    type Registers = Registers;

    fn execute<B: Bus>(&mut self, bus: &mut B, cycles: u32) -> u32 {
        let budget = i64::from(cycles);
        self.icount = budget;

        while self.icount > 0 {
            if self.service_interrupts(bus) {
                continue;
            }
            if self.regs.halted {
                self.burn_halt();
                break;
            }
            self.step(bus);
        }

        // Only the overrun of a budget near u32::MAX can exceed the return
        // type; the running total stays exact.
        let consumed = (budget - self.icount) as u64;
        self.total_cycles += consumed;
        u32::try_from(consumed).unwrap_or(u32::MAX)
    }

    fn pc(&self) -> u32 {
        u32::from(self.regs.pc)
    }

    fn registers(&self) -> Registers {
        self.regs
    }

    fn is_halted(&self) -> bool {
        self.regs.halted
    }

    fn set_irq_line(&mut self, state: LineState) {
        self.irq_state = state;
        if state.is_active() {
            if let Some(chain) = &mut self.daisy {
                chain.arbitrate();
            }
        }
    }

    fn set_nmi_line(&mut self, state: LineState) {
        if self.nmi_state == LineState::Clear && state.is_active() {
            self.nmi_pending = true;
        }
        self.nmi_state = state;
    }

    fn reset(&mut self) {
        let daisy = self.daisy.take();
        self.reset_with(daisy);
    }
}

/// Paths accepted by the Z80's `query`.
#[rustfmt::skip]
const Z80_QUERY_PATHS: &[&str] = &[
    "a", "f", "b", "c", "d", "e", "h", "l",
    "af", "bc", "de", "hl",
    "af'", "bc'", "de'", "hl'",
    "ix", "iy", "ixh", "ixl", "iyh", "iyl",
    "sp", "pc", "i", "r", "wz", "prepc",
    "iff1", "iff2", "im", "halt",
    "nmi_state", "irq_state",
    "flags.s", "flags.z", "flags.y", "flags.h",
    "flags.x", "flags.p", "flags.n", "flags.c",
    "cycles",
];

impl Observable for Z80 {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(flag) = path.strip_prefix("flags.") {
            let mask = match flag {
                "s" => SF,
                "z" => ZF,
                "y" => YF,
                "h" => HF,
                "x" => XF,
                "p" => PF,
                "n" => NF,
                "c" => CF,
                _ => return None,
            };
            return Some(Value::Bool(self.regs.f & mask != 0));
        }
        if path == "cycles" {
            return Some(Value::U64(self.total_cycles));
        }

        let reg: Register = path.parse().ok()?;
        let raw = self.get_register(reg);
        Some(match reg {
            Register::Iff1 | Register::Iff2 | Register::Halt => Value::Bool(raw != 0),
            Register::Pc
            | Register::Sp
            | Register::Af
            | Register::Bc
            | Register::De
            | Register::Hl
            | Register::Ix
            | Register::Iy
            | Register::AfAlt
            | Register::BcAlt
            | Register::DeAlt
            | Register::HlAlt
            | Register::Wz
            | Register::PrePc => Value::U16(raw),
            _ => Value::U8(raw as u8),
        })
    }

    fn query_paths(&self) -> &'static [&'static str] {
        Z80_QUERY_PATHS
    }
}
