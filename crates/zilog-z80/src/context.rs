//! Save and restore of the complete CPU state.
//!
//! [`Z80Context`] captures everything that influences future execution:
//! the register file, the hidden Q and EI latches, both interrupt lines and
//! the daisy chain arbitration state. Restoring a context into a fresh core
//! (with an equivalent chain attached) continues execution identically.

use emu_core::LineState;

use crate::cpu::Z80;
use crate::daisy::MAX_DAISY;
use crate::error::ContextError;
use crate::registers::Registers;

/// Size of the flat image produced by [`Z80Context::to_bytes`].
pub const CONTEXT_SIZE: usize = 41;

/// Byte stored for an absent daisy index.
const NO_DEVICE: u8 = 0xFF;

const FLAG_IFF1: u8 = 0x01;
const FLAG_IFF2: u8 = 0x02;
const FLAG_HALTED: u8 = 0x04;
const FLAG_EI_DELAY: u8 = 0x08;
const FLAG_AFTER_LD_A_IR: u8 = 0x10;
const FLAG_NMI_PENDING: u8 = 0x20;

/// A snapshot of the CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Z80Context {
    pub registers: Registers,
    /// Flags written by the last instruction.
    pub q: u8,
    pub ei_delay: bool,
    pub after_ld_a_ir: bool,
    pub irq_line: LineState,
    pub nmi_line: LineState,
    pub nmi_pending: bool,
    pub daisy_states: [u8; MAX_DAISY],
    pub daisy_request: Option<u8>,
    pub daisy_service: Option<u8>,
}

/// Little-endian cursor over the image.
struct Writer<'a> {
    buf: &'a mut [u8; CONTEXT_SIZE],
    pos: usize,
}

impl Writer<'_> {
    fn u8(&mut self, value: u8) {
        self.buf[self.pos] = value;
        self.pos += 1;
    }

    fn u16(&mut self, value: u16) {
        for byte in value.to_le_bytes() {
            self.u8(byte);
        }
    }
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    fn u8(&mut self) -> u8 {
        let value = self.buf[self.pos];
        self.pos += 1;
        value
    }

    fn u16(&mut self) -> u16 {
        let lo = self.u8();
        let hi = self.u8();
        u16::from_le_bytes([lo, hi])
    }
}

fn index_to_byte(index: Option<u8>) -> u8 {
    index.unwrap_or(NO_DEVICE)
}

fn byte_to_index(byte: u8) -> Result<Option<u8>, ContextError> {
    match byte {
        NO_DEVICE => Ok(None),
        b if usize::from(b) < MAX_DAISY => Ok(Some(b)),
        b => Err(ContextError::InvalidDaisyIndex { index: b, devices: MAX_DAISY }),
    }
}

impl Z80Context {
    /// Serialise to the fixed little-endian layout.
    ///
    /// | offset | contents |
    /// |--------|----------|
    /// | 0      | AF BC DE HL IX IY SP PC |
    /// | 16     | AF' BC' DE' HL' |
    /// | 24     | WZ, PREPC |
    /// | 28     | I, R, IM |
    /// | 31     | IFF1, IFF2, HALT, EI delay, LD A,I/R, NMI pending (bits 0-5) |
    /// | 32     | IRQ line, NMI line |
    /// | 34     | Q |
    /// | 35     | daisy states 0-3 |
    /// | 39     | daisy request, daisy service (`0xFF` = none) |
    #[must_use]
    pub fn to_bytes(&self) -> [u8; CONTEXT_SIZE] {
        let mut buf = [0u8; CONTEXT_SIZE];
        let mut w = Writer { buf: &mut buf, pos: 0 };
        let r = &self.registers;

        for pair in [r.af(), r.bc(), r.de(), r.hl(), r.ix, r.iy, r.sp, r.pc] {
            w.u16(pair);
        }
        for pair in [r.af_alt(), r.bc_alt(), r.de_alt(), r.hl_alt()] {
            w.u16(pair);
        }
        w.u16(r.wz);
        w.u16(r.prepc);
        w.u8(r.i);
        w.u8(r.r);
        w.u8(r.im);

        let mut flags = 0;
        for (set, bit) in [
            (r.iff1, FLAG_IFF1),
            (r.iff2, FLAG_IFF2),
            (r.halted, FLAG_HALTED),
            (self.ei_delay, FLAG_EI_DELAY),
            (self.after_ld_a_ir, FLAG_AFTER_LD_A_IR),
            (self.nmi_pending, FLAG_NMI_PENDING),
        ] {
            if set {
                flags |= bit;
            }
        }
        w.u8(flags);

        w.u8(self.irq_line.to_byte());
        w.u8(self.nmi_line.to_byte());
        w.u8(self.q);
        for state in self.daisy_states {
            w.u8(state);
        }
        w.u8(index_to_byte(self.daisy_request));
        w.u8(index_to_byte(self.daisy_service));
        debug_assert_eq!(w.pos, CONTEXT_SIZE);
        buf
    }

    /// Parse an image produced by [`Z80Context::to_bytes`].
    ///
    /// # Errors
    ///
    /// Fails if the image is not exactly [`CONTEXT_SIZE`] bytes, carries an
    /// interrupt mode above 2, or names a daisy slot that cannot exist.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ContextError> {
        if bytes.len() != CONTEXT_SIZE {
            return Err(ContextError::WrongSize { expected: CONTEXT_SIZE, actual: bytes.len() });
        }
        let mut rd = Reader { buf: bytes, pos: 0 };
        let mut r = Registers::default();

        r.set_af(rd.u16());
        r.set_bc(rd.u16());
        r.set_de(rd.u16());
        r.set_hl(rd.u16());
        r.ix = rd.u16();
        r.iy = rd.u16();
        r.sp = rd.u16();
        r.pc = rd.u16();
        r.set_af_alt(rd.u16());
        r.set_bc_alt(rd.u16());
        r.set_de_alt(rd.u16());
        r.set_hl_alt(rd.u16());
        r.wz = rd.u16();
        r.prepc = rd.u16();
        r.i = rd.u8();
        r.r = rd.u8();
        r.im = rd.u8();
        if r.im > 2 {
            return Err(ContextError::InvalidInterruptMode(r.im));
        }

        let flags = rd.u8();
        r.iff1 = flags & FLAG_IFF1 != 0;
        r.iff2 = flags & FLAG_IFF2 != 0;
        r.halted = flags & FLAG_HALTED != 0;

        let irq_line = LineState::from_byte(rd.u8());
        let nmi_line = LineState::from_byte(rd.u8());
        let q = rd.u8();
        let mut daisy_states = [0; MAX_DAISY];
        for state in &mut daisy_states {
            *state = rd.u8();
        }
        let daisy_request = byte_to_index(rd.u8())?;
        let daisy_service = byte_to_index(rd.u8())?;

        Ok(Self {
            registers: r,
            q,
            ei_delay: flags & FLAG_EI_DELAY != 0,
            after_ld_a_ir: flags & FLAG_AFTER_LD_A_IR != 0,
            irq_line,
            nmi_line,
            nmi_pending: flags & FLAG_NMI_PENDING != 0,
            daisy_states,
            daisy_request,
            daisy_service,
        })
    }
}

impl Z80 {
    /// Capture the current state.
    #[must_use]
    pub fn context(&self) -> Z80Context {
        let (daisy_states, daisy_request, daisy_service) = match &self.daisy {
            Some(chain) => (
                chain.states(),
                chain.request().map(|i| i as u8),
                chain.service().map(|i| i as u8),
            ),
            None => ([0; MAX_DAISY], None, None),
        };
        Z80Context {
            registers: self.regs,
            q: self.q,
            ei_delay: self.ei_delay,
            after_ld_a_ir: self.after_ld_a_ir,
            irq_line: self.irq_state,
            nmi_line: self.nmi_state,
            nmi_pending: self.nmi_pending,
            daisy_states,
            daisy_request,
            daisy_service,
        }
    }

    /// Restore a captured state. The attached daisy chain (if any) keeps
    /// its devices and takes the captured arbitration state.
    ///
    /// # Errors
    ///
    /// Fails without touching the CPU if the interrupt mode is invalid or a
    /// daisy index does not name a device on the attached chain.
    pub fn set_context(&mut self, ctx: &Z80Context) -> Result<(), ContextError> {
        if ctx.registers.im > 2 {
            return Err(ContextError::InvalidInterruptMode(ctx.registers.im));
        }
        let devices = self.daisy.as_ref().map_or(0, crate::daisy::DaisyChain::len);
        for index in [ctx.daisy_request, ctx.daisy_service].into_iter().flatten() {
            if usize::from(index) >= devices {
                return Err(ContextError::InvalidDaisyIndex { index, devices });
            }
        }

        self.regs = ctx.registers;
        self.q = ctx.q;
        self.prev_q = ctx.q;
        self.ei_delay = ctx.ei_delay;
        self.after_ld_a_ir = ctx.after_ld_a_ir;
        self.irq_state = ctx.irq_line;
        self.nmi_state = ctx.nmi_line;
        self.nmi_pending = ctx.nmi_pending;
        if let Some(chain) = &mut self.daisy {
            chain.restore(
                ctx.daisy_states,
                ctx.daisy_request.map(usize::from),
                ctx.daisy_service.map(usize::from),
            );
        }
        tracing::debug!(pc = ctx.registers.pc, "context restored");
        Ok(())
    }

    /// Capture the current state as a flat image.
    #[must_use]
    pub fn export_context(&self) -> [u8; CONTEXT_SIZE] {
        self.context().to_bytes()
    }

    /// Restore a flat image produced by [`Z80::export_context`].
    ///
    /// # Errors
    ///
    /// See [`Z80Context::from_bytes`] and [`Z80::set_context`].
    pub fn import_context(&mut self, bytes: &[u8]) -> Result<(), ContextError> {
        let ctx = Z80Context::from_bytes(bytes)?;
        self.set_context(&ctx)
    }
}
