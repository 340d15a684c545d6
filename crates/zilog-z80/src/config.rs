//! Core configuration.

/// Options fixed when the core is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Z80Config {
    /// Fast-forward recognised busy loops (self-jumps, `NOP`/`EI` + jump,
    /// `DEC rr` countdowns). Consumed cycles and final register state are
    /// identical either way; disabling only costs host time.
    pub loop_acceleration: bool,
}

impl Default for Z80Config {
    fn default() -> Self {
        Self { loop_acceleration: true }
    }
}
