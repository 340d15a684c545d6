//! ALU operations for the Z80.
//!
//! Pure functions over operands and the incoming flags; the flag bytes
//! come from [`crate::flags::tables`].

use crate::flags::{CF, FlagTables, HF, NF, PF, SF, XF, YF, ZF, tables};

/// Result of an ALU operation with flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluResult {
    pub value: u8,
    pub flags: u8,
}

/// 16-bit result with flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluResult16 {
    pub value: u16,
    pub flags: u8,
}

#[inline]
fn t() -> &'static FlagTables {
    tables()
}

#[must_use]
pub fn add8(a: u8, b: u8, carry: bool) -> AluResult {
    let value = a.wrapping_add(b).wrapping_add(u8::from(carry));
    AluResult { value, flags: t().add(a, value, carry) }
}

#[must_use]
pub fn sub8(a: u8, b: u8, carry: bool) -> AluResult {
    let value = a.wrapping_sub(b).wrapping_sub(u8::from(carry));
    AluResult { value, flags: t().sub(a, value, carry) }
}

/// CP: subtraction flags, but X and Y come from the operand.
#[must_use]
pub fn cp8(a: u8, b: u8) -> u8 {
    let result = a.wrapping_sub(b);
    (t().sub(a, result, false) & !(YF | XF)) | (b & (YF | XF))
}

#[must_use]
pub fn and8(a: u8, b: u8) -> AluResult {
    let value = a & b;
    AluResult { value, flags: t().szp[value as usize] | HF }
}

#[must_use]
pub fn or8(a: u8, b: u8) -> AluResult {
    let value = a | b;
    AluResult { value, flags: t().szp[value as usize] }
}

#[must_use]
pub fn xor8(a: u8, b: u8) -> AluResult {
    let value = a ^ b;
    AluResult { value, flags: t().szp[value as usize] }
}

/// Dispatch on the 3-bit ALU selector used by `10xxxrrr` and `11xxx110`.
///
/// Returns the new accumulator (unchanged for CP) and flags.
#[must_use]
pub fn alu8(op: u8, a: u8, b: u8, f: u8) -> AluResult {
    match op & 7 {
        0 => add8(a, b, false),
        1 => add8(a, b, f & CF != 0),
        2 => sub8(a, b, false),
        3 => sub8(a, b, f & CF != 0),
        4 => and8(a, b),
        5 => xor8(a, b),
        6 => or8(a, b),
        _ => AluResult { value: a, flags: cp8(a, b) },
    }
}

/// INC: carry is preserved from `f`.
#[must_use]
pub fn inc8(v: u8, f: u8) -> AluResult {
    let value = v.wrapping_add(1);
    AluResult { value, flags: (f & CF) | t().szhv_inc[value as usize] }
}

/// DEC: carry is preserved from `f`.
#[must_use]
pub fn dec8(v: u8, f: u8) -> AluResult {
    let value = v.wrapping_sub(1);
    AluResult { value, flags: (f & CF) | t().szhv_dec[value as usize] }
}

#[must_use]
pub fn daa(a: u8, f: u8) -> AluResult {
    let cf = f & CF != 0;
    let nf = f & NF != 0;
    let hf = f & HF != 0;
    let lo = a & 0x0F;
    let hi = a >> 4;

    let diff = if cf {
        if lo <= 9 && !hf { 0x60 } else { 0x66 }
    } else if lo >= 10 {
        if hi <= 8 { 0x06 } else { 0x66 }
    } else if hi >= 10 {
        if hf { 0x66 } else { 0x60 }
    } else if hf {
        0x06
    } else {
        0x00
    };

    let value = if nf { a.wrapping_sub(diff) } else { a.wrapping_add(diff) };
    let mut flags = t().szp[value as usize] | (f & NF);
    let carry = if lo <= 9 { hi >= 10 } else { hi >= 9 };
    if cf || carry {
        flags |= CF;
    }
    let half = if nf { hf && lo <= 5 } else { lo >= 10 };
    if half {
        flags |= HF;
    }
    AluResult { value, flags }
}

/// CPL: S, Z, P/V and C kept; H and N set; X/Y from the result.
#[must_use]
pub fn cpl(a: u8, f: u8) -> AluResult {
    let value = !a;
    AluResult { value, flags: (f & (SF | ZF | PF | CF)) | HF | NF | (value & (YF | XF)) }
}

/// NEG is `0 - A`.
#[must_use]
pub fn neg(a: u8) -> AluResult {
    sub8(0, a, false)
}

/// RLCA/RRCA/RLA/RRA: S, Z and P/V kept, X/Y from the result.
#[must_use]
pub fn rotate_a(op: u8, a: u8, f: u8) -> AluResult {
    let (value, carry) = match op {
        0x07 => (a.rotate_left(1), a >> 7),
        0x0F => (a.rotate_right(1), a & 1),
        0x17 => ((a << 1) | (f & CF), a >> 7),
        _ => ((a >> 1) | ((f & CF) << 7), a & 1),
    };
    AluResult { value, flags: (f & (SF | ZF | PF)) | carry | (value & (YF | XF)) }
}

/// CB rotates and shifts, selected by bits 3-5 of the opcode.
#[must_use]
pub fn rot8(op: u8, v: u8, f: u8) -> AluResult {
    let (value, carry) = match (op >> 3) & 7 {
        0 => (v.rotate_left(1), v >> 7),
        1 => (v.rotate_right(1), v & 1),
        2 => ((v << 1) | (f & CF), v >> 7),
        3 => ((v >> 1) | ((f & CF) << 7), v & 1),
        4 => (v << 1, v >> 7),
        5 => ((v >> 1) | (v & 0x80), v & 1),
        // SLL: undocumented, shifts a 1 into bit 0
        6 => ((v << 1) | 1, v >> 7),
        _ => (v >> 1, v & 1),
    };
    AluResult { value, flags: t().szp[value as usize] | carry }
}

/// BIT n: Z and P/V set if the bit is clear; X/Y come from `xy`, which is
/// the operand for registers and an internal address byte for memory forms.
#[must_use]
pub fn bit(n: u8, v: u8, xy: u8, f: u8) -> u8 {
    let masked = v & (1 << (n & 7));
    (f & CF) | HF | (t().sz_bit[masked as usize] & !(YF | XF)) | (xy & (YF | XF))
}

/// ADD HL/IX/IY,rr: S, Z and P/V preserved.
#[must_use]
pub fn add16(a: u16, b: u16, f: u8) -> AluResult16 {
    let res = u32::from(a) + u32::from(b);
    let flags = (f & (SF | ZF | PF))
        | (((u32::from(a) ^ res ^ u32::from(b)) >> 8) as u8 & HF)
        | ((res >> 16) as u8 & CF)
        | ((res >> 8) as u8 & (YF | XF));
    AluResult16 { value: res as u16, flags }
}

#[must_use]
pub fn adc16(a: u16, b: u16, f: u8) -> AluResult16 {
    let (a32, b32) = (u32::from(a), u32::from(b));
    let res = a32 + b32 + u32::from(f & CF);
    let mut flags = (((a32 ^ res ^ b32) >> 8) as u8 & HF)
        | ((res >> 16) as u8 & CF)
        | ((res >> 8) as u8 & (SF | YF | XF));
    if res & 0xFFFF == 0 {
        flags |= ZF;
    }
    if (b32 ^ a32 ^ 0x8000) & (b32 ^ res) & 0x8000 != 0 {
        flags |= PF;
    }
    AluResult16 { value: res as u16, flags }
}

#[must_use]
pub fn sbc16(a: u16, b: u16, f: u8) -> AluResult16 {
    let (a32, b32) = (u32::from(a), u32::from(b));
    let res = a32.wrapping_sub(b32).wrapping_sub(u32::from(f & CF));
    let mut flags = (((a32 ^ res ^ b32) >> 8) as u8 & HF)
        | NF
        | ((res >> 16) as u8 & CF)
        | ((res >> 8) as u8 & (SF | YF | XF));
    if res & 0xFFFF == 0 {
        flags |= ZF;
    }
    if (b32 ^ a32) & (a32 ^ res) & 0x8000 != 0 {
        flags |= PF;
    }
    AluResult16 { value: res as u16, flags }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daa_after_bcd_add() {
        // 0x15 + 0x27 = 0x3C, adjusted to 0x42
        let sum = add8(0x15, 0x27, false);
        let adj = daa(sum.value, sum.flags);
        assert_eq!(adj.value, 0x42);
        assert_eq!(adj.flags & CF, 0);
    }

    #[test]
    fn daa_after_bcd_subtract() {
        // 0x42 - 0x15 = 0x2D, adjusted to 0x27
        let diff = sub8(0x42, 0x15, false);
        let adj = daa(diff.value, diff.flags);
        assert_eq!(adj.value, 0x27);
        assert_ne!(adj.flags & NF, 0);
    }

    #[test]
    fn sll_sets_bit_zero() {
        let r = rot8(0x30, 0x80, 0);
        assert_eq!(r.value, 0x01);
        assert_eq!(r.flags & CF, CF);
    }

    #[test]
    fn sbc16_zero_result() {
        let r = sbc16(0x1000, 0x0FFF, CF);
        assert_eq!(r.value, 0);
        assert_eq!(r.flags & (ZF | NF | CF), ZF | NF);
    }

    #[test]
    fn add16_half_carry_from_bit_11() {
        let r = add16(0x0FFF, 0x0001, 0);
        assert_eq!(r.value, 0x1000);
        assert_eq!(r.flags & HF, HF);
    }
}
