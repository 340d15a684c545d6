//! Z80 flag register bits and precomputed flag tables.

use std::sync::LazyLock;

/// Sign flag (bit 7) - set if result is negative.
pub const SF: u8 = 0b1000_0000;

/// Zero flag (bit 6) - set if result is zero.
pub const ZF: u8 = 0b0100_0000;

/// Undocumented flag (bit 5) - usually a copy of bit 5 of the result.
pub const YF: u8 = 0b0010_0000;

/// Half-carry flag (bit 4) - carry from bit 3 to bit 4.
pub const HF: u8 = 0b0001_0000;

/// Undocumented flag (bit 3) - usually a copy of bit 3 of the result.
pub const XF: u8 = 0b0000_1000;

/// Parity/Overflow flag (bit 2) - parity or overflow depending on instruction.
pub const PF: u8 = 0b0000_0100;

/// Add/Subtract flag (bit 1) - set if last operation was subtraction.
pub const NF: u8 = 0b0000_0010;

/// Carry flag (bit 0) - carry out of bit 7.
pub const CF: u8 = 0b0000_0001;

/// Lookup tables for flag results.
///
/// The 8-bit tables are indexed by result. The two arithmetic tables are
/// indexed by `(carry_in << 16) | (old_a << 8) | result` and hold the
/// complete ADD/ADC or SUB/SBC/CP flag byte.
pub struct FlagTables {
    /// S, Z, Y and X of the value.
    pub sz: [u8; 256],
    /// As `sz`, but a zero value also sets P/V. Used by BIT.
    pub sz_bit: [u8; 256],
    /// `sz` plus even parity in P/V.
    pub szp: [u8; 256],
    /// INC flags (carry excluded) keyed by the incremented value.
    pub szhv_inc: [u8; 256],
    /// DEC flags (carry excluded) keyed by the decremented value.
    pub szhv_dec: [u8; 256],
    /// ADD/ADC flags.
    pub szhvc_add: Box<[u8]>,
    /// SUB/SBC/CP flags.
    pub szhvc_sub: Box<[u8]>,
}

static TABLES: LazyLock<FlagTables> = LazyLock::new(FlagTables::build);

/// The process-wide flag tables. Built on first use, never mutated.
#[must_use]
pub fn tables() -> &'static FlagTables {
    &TABLES
}

impl FlagTables {
    fn build() -> Self {
        let mut tables = Self {
            sz: [0; 256],
            sz_bit: [0; 256],
            szp: [0; 256],
            szhv_inc: [0; 256],
            szhv_dec: [0; 256],
            szhvc_add: vec![0; 2 * 256 * 256].into_boxed_slice(),
            szhvc_sub: vec![0; 2 * 256 * 256].into_boxed_slice(),
        };

        for i in 0..=255u8 {
            let sz = (if i == 0 { ZF } else { i & SF }) | (i & (YF | XF));
            let parity = if i.count_ones().is_multiple_of(2) { PF } else { 0 };

            tables.sz[i as usize] = sz;
            tables.sz_bit[i as usize] = (if i == 0 { ZF | PF } else { i & SF }) | (i & (YF | XF));
            tables.szp[i as usize] = sz | parity;

            let mut inc = sz;
            if i == 0x80 {
                inc |= PF;
            }
            if i & 0x0F == 0x00 {
                inc |= HF;
            }
            tables.szhv_inc[i as usize] = inc;

            let mut dec = sz | NF;
            if i == 0x7F {
                dec |= PF;
            }
            if i & 0x0F == 0x0F {
                dec |= HF;
            }
            tables.szhv_dec[i as usize] = dec;
        }

        // Both tables are derived from (old, new) alone: the operand is
        // recovered as the difference, so a single pass covers every
        // operand and carry-in.
        for old in 0..256i32 {
            for new in 0..256i32 {
                let idx = ((old << 8) | new) as usize;
                let carry_idx = idx | 0x1_0000;
                let sz = tables.sz[new as usize];

                // ADD / ADC with carry clear
                let val = new - old;
                let mut f = sz;
                if (new & 0x0F) < (old & 0x0F) {
                    f |= HF;
                }
                if new < old {
                    f |= CF;
                }
                if (val ^ old ^ 0x80) & (val ^ new) & 0x80 != 0 {
                    f |= PF;
                }
                tables.szhvc_add[idx] = f;

                // ADC with carry set
                let val = new - old - 1;
                let mut f = sz;
                if (new & 0x0F) <= (old & 0x0F) {
                    f |= HF;
                }
                if new <= old {
                    f |= CF;
                }
                if (val ^ old ^ 0x80) & (val ^ new) & 0x80 != 0 {
                    f |= PF;
                }
                tables.szhvc_add[carry_idx] = f;

                // SUB / SBC / CP with carry clear
                let val = old - new;
                let mut f = sz | NF;
                if (new & 0x0F) > (old & 0x0F) {
                    f |= HF;
                }
                if new > old {
                    f |= CF;
                }
                if (val ^ old) & (old ^ new) & 0x80 != 0 {
                    f |= PF;
                }
                tables.szhvc_sub[idx] = f;

                // SBC with carry set
                let val = old - new - 1;
                let mut f = sz | NF;
                if (new & 0x0F) >= (old & 0x0F) {
                    f |= HF;
                }
                if new >= old {
                    f |= CF;
                }
                if (val ^ old) & (old ^ new) & 0x80 != 0 {
                    f |= PF;
                }
                tables.szhvc_sub[carry_idx] = f;
            }
        }

        tables
    }

    /// Flags for `old + operand + carry` producing `result`.
    #[inline]
    #[must_use]
    pub fn add(&self, old: u8, result: u8, carry: bool) -> u8 {
        self.szhvc_add[Self::arith_index(old, result, carry)]
    }

    /// Flags for `old - operand - carry` producing `result`.
    #[inline]
    #[must_use]
    pub fn sub(&self, old: u8, result: u8, carry: bool) -> u8 {
        self.szhvc_sub[Self::arith_index(old, result, carry)]
    }

    #[inline]
    fn arith_index(old: u8, result: u8, carry: bool) -> usize {
        (usize::from(carry) << 16) | (usize::from(old) << 8) | usize::from(result)
    }
}
