//! Z80 register set.

use std::fmt;
use std::str::FromStr;

use crate::error::UnknownRegister;

/// Z80 register file.
///
/// Pairs are stored as 8-bit halves so that writing one half never
/// disturbs the other; the 16-bit views are composed on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Registers {
    // Main registers
    pub a: u8,
    pub f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,

    // Alternate registers
    pub a_alt: u8,
    pub f_alt: u8,
    pub b_alt: u8,
    pub c_alt: u8,
    pub d_alt: u8,
    pub e_alt: u8,
    pub h_alt: u8,
    pub l_alt: u8,

    // Index registers
    pub ix: u16,
    pub iy: u16,

    pub sp: u16,
    pub pc: u16,
    pub i: u8,
    /// Refresh register. Only the low 7 bits count; bit 7 is whatever
    /// `LD R,A` last stored.
    pub r: u8,

    /// WZ/MEMPTR - internal address latch. Leaks into X/Y of `BIT n,(HL)`.
    pub wz: u16,
    /// PC at the start of the current instruction.
    pub prepc: u16,

    pub iff1: bool,
    pub iff2: bool,
    pub im: u8,
    pub halted: bool,
}

impl Default for Registers {
    /// Power-on state: IX and IY read back as `0xFFFF` and only Z is set.
    fn default() -> Self {
        Self {
            a: 0,
            f: crate::flags::ZF,
            b: 0,
            c: 0,
            d: 0,
            e: 0,
            h: 0,
            l: 0,
            a_alt: 0,
            f_alt: 0,
            b_alt: 0,
            c_alt: 0,
            d_alt: 0,
            e_alt: 0,
            h_alt: 0,
            l_alt: 0,
            ix: 0xFFFF,
            iy: 0xFFFF,
            sp: 0,
            pc: 0,
            i: 0,
            r: 0,
            wz: 0,
            prepc: 0,
            iff1: false,
            iff2: false,
            im: 0,
            halted: false,
        }
    }
}

impl Registers {
    #[must_use]
    pub const fn af(&self) -> u16 {
        (self.a as u16) << 8 | self.f as u16
    }

    #[must_use]
    pub const fn bc(&self) -> u16 {
        (self.b as u16) << 8 | self.c as u16
    }

    #[must_use]
    pub const fn de(&self) -> u16 {
        (self.d as u16) << 8 | self.e as u16
    }

    #[must_use]
    pub const fn hl(&self) -> u16 {
        (self.h as u16) << 8 | self.l as u16
    }

    #[must_use]
    pub const fn af_alt(&self) -> u16 {
        (self.a_alt as u16) << 8 | self.f_alt as u16
    }

    #[must_use]
    pub const fn bc_alt(&self) -> u16 {
        (self.b_alt as u16) << 8 | self.c_alt as u16
    }

    #[must_use]
    pub const fn de_alt(&self) -> u16 {
        (self.d_alt as u16) << 8 | self.e_alt as u16
    }

    #[must_use]
    pub const fn hl_alt(&self) -> u16 {
        (self.h_alt as u16) << 8 | self.l_alt as u16
    }

    pub fn set_af(&mut self, value: u16) {
        self.a = (value >> 8) as u8;
        self.f = value as u8;
    }

    pub fn set_bc(&mut self, value: u16) {
        self.b = (value >> 8) as u8;
        self.c = value as u8;
    }

    pub fn set_de(&mut self, value: u16) {
        self.d = (value >> 8) as u8;
        self.e = value as u8;
    }

    pub fn set_hl(&mut self, value: u16) {
        self.h = (value >> 8) as u8;
        self.l = value as u8;
    }

    pub fn set_af_alt(&mut self, value: u16) {
        self.a_alt = (value >> 8) as u8;
        self.f_alt = value as u8;
    }

    pub fn set_bc_alt(&mut self, value: u16) {
        self.b_alt = (value >> 8) as u8;
        self.c_alt = value as u8;
    }

    pub fn set_de_alt(&mut self, value: u16) {
        self.d_alt = (value >> 8) as u8;
        self.e_alt = value as u8;
    }

    pub fn set_hl_alt(&mut self, value: u16) {
        self.h_alt = (value >> 8) as u8;
        self.l_alt = value as u8;
    }

    /// `EX AF,AF'`
    pub fn swap_af(&mut self) {
        std::mem::swap(&mut self.a, &mut self.a_alt);
        std::mem::swap(&mut self.f, &mut self.f_alt);
    }

    /// `EXX`
    pub fn exx(&mut self) {
        std::mem::swap(&mut self.b, &mut self.b_alt);
        std::mem::swap(&mut self.c, &mut self.c_alt);
        std::mem::swap(&mut self.d, &mut self.d_alt);
        std::mem::swap(&mut self.e, &mut self.e_alt);
        std::mem::swap(&mut self.h, &mut self.h_alt);
        std::mem::swap(&mut self.l, &mut self.l_alt);
    }

    /// Bump the low 7 bits of R, leaving bit 7 alone.
    pub fn inc_r(&mut self) {
        self.r = (self.r & 0x80) | (self.r.wrapping_add(1) & 0x7F);
    }

    /// Advance the low 7 bits of R by `n` refresh cycles at once.
    pub fn add_r(&mut self, n: u64) {
        let low = (u64::from(self.r) + n) & 0x7F;
        self.r = (self.r & 0x80) | low as u8;
    }
}

/// Every register reachable through `get_register`/`set_register`.
///
/// Beyond the architectural registers this names the interrupt line
/// states and the per-device daisy-chain state slots, so a debugger or
/// save-state tool never needs raw offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    Pc,
    Sp,
    Af,
    Bc,
    De,
    Hl,
    Ix,
    Iy,
    AfAlt,
    BcAlt,
    DeAlt,
    HlAlt,
    A,
    F,
    B,
    C,
    D,
    E,
    H,
    L,
    Ixh,
    Ixl,
    Iyh,
    Iyl,
    I,
    R,
    Im,
    Iff1,
    Iff2,
    Halt,
    Wz,
    PrePc,
    NmiState,
    IrqState,
    Dc0,
    Dc1,
    Dc2,
    Dc3,
}

impl Register {
    pub const ALL: [Register; 38] = [
        Register::Pc,
        Register::Sp,
        Register::Af,
        Register::Bc,
        Register::De,
        Register::Hl,
        Register::Ix,
        Register::Iy,
        Register::AfAlt,
        Register::BcAlt,
        Register::DeAlt,
        Register::HlAlt,
        Register::A,
        Register::F,
        Register::B,
        Register::C,
        Register::D,
        Register::E,
        Register::H,
        Register::L,
        Register::Ixh,
        Register::Ixl,
        Register::Iyh,
        Register::Iyl,
        Register::I,
        Register::R,
        Register::Im,
        Register::Iff1,
        Register::Iff2,
        Register::Halt,
        Register::Wz,
        Register::PrePc,
        Register::NmiState,
        Register::IrqState,
        Register::Dc0,
        Register::Dc1,
        Register::Dc2,
        Register::Dc3,
    ];

    /// Lower-case debugger name; shadow registers carry a trailing `'`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Register::Pc => "pc",
            Register::Sp => "sp",
            Register::Af => "af",
            Register::Bc => "bc",
            Register::De => "de",
            Register::Hl => "hl",
            Register::Ix => "ix",
            Register::Iy => "iy",
            Register::AfAlt => "af'",
            Register::BcAlt => "bc'",
            Register::DeAlt => "de'",
            Register::HlAlt => "hl'",
            Register::A => "a",
            Register::F => "f",
            Register::B => "b",
            Register::C => "c",
            Register::D => "d",
            Register::E => "e",
            Register::H => "h",
            Register::L => "l",
            Register::Ixh => "ixh",
            Register::Ixl => "ixl",
            Register::Iyh => "iyh",
            Register::Iyl => "iyl",
            Register::I => "i",
            Register::R => "r",
            Register::Im => "im",
            Register::Iff1 => "iff1",
            Register::Iff2 => "iff2",
            Register::Halt => "halt",
            Register::Wz => "wz",
            Register::PrePc => "prepc",
            Register::NmiState => "nmi_state",
            Register::IrqState => "irq_state",
            Register::Dc0 => "dc0",
            Register::Dc1 => "dc1",
            Register::Dc2 => "dc2",
            Register::Dc3 => "dc3",
        }
    }

    /// Daisy-chain slot for `Dc0`..`Dc3`.
    #[must_use]
    pub const fn daisy_slot(self) -> Option<usize> {
        match self {
            Register::Dc0 => Some(0),
            Register::Dc1 => Some(1),
            Register::Dc2 => Some(2),
            Register::Dc3 => Some(3),
            _ => None,
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Register {
    type Err = UnknownRegister;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Register::ALL
            .iter()
            .copied()
            .find(|reg| reg.name() == lower)
            .ok_or_else(|| UnknownRegister(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_halves_are_independent() {
        let mut regs = Registers::default();
        regs.set_hl(0x1234);
        regs.l = 0xFF;
        assert_eq!(regs.hl(), 0x12FF);
        assert_eq!(regs.h, 0x12);
    }

    #[test]
    fn refresh_keeps_bit_seven() {
        let mut regs = Registers { r: 0xFF, ..Registers::default() };
        regs.inc_r();
        assert_eq!(regs.r, 0x80);
        regs.add_r(130);
        assert_eq!(regs.r, 0x82);
    }

    #[test]
    fn register_names_parse_back() {
        for reg in Register::ALL {
            assert_eq!(reg.name().parse::<Register>(), Ok(reg));
        }
        assert_eq!("HL'".parse::<Register>(), Ok(Register::HlAlt));
        assert!("xyz".parse::<Register>().is_err());
    }

    #[test]
    fn exx_leaves_af_alone() {
        let mut regs = Registers::default();
        regs.set_af(0x1122);
        regs.set_bc(0x3344);
        regs.exx();
        assert_eq!(regs.af(), 0x1122);
        assert_eq!(regs.bc(), 0);
        assert_eq!(regs.bc_alt(), 0x3344);
    }
}
