//! CPU core trait.

use crate::Bus;

/// State of an interrupt input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LineState {
    /// Line released.
    #[default]
    Clear,
    /// Line held active until the host clears it.
    Assert,
    /// Line active until the CPU acknowledges the interrupt, then cleared
    /// automatically.
    Hold,
}

impl LineState {
    #[must_use]
    pub fn is_active(self) -> bool {
        self != LineState::Clear
    }

    #[must_use]
    pub fn to_byte(self) -> u8 {
        match self {
            LineState::Clear => 0,
            LineState::Assert => 1,
            LineState::Hold => 2,
        }
    }

    /// Inverse of [`LineState::to_byte`]. Unknown values read as asserted.
    #[must_use]
    pub fn from_byte(value: u8) -> Self {
        match value {
            0 => LineState::Clear,
            2 => LineState::Hold,
            _ => LineState::Assert,
        }
    }
}

/// A CPU core.
///
/// CPUs run whole instructions against a borrowed bus, charging each one
/// to a T-state budget. Control returns to the host only at instruction
/// boundaries, so the host schedules the CPU by handing out budgets (one
/// video line, one frame) and syncing other components in between.
pub trait Cpu {
    /// The type used for register inspection.
    type Registers;

    /// Run until at least `cycles` T-states have been spent.
    ///
    /// Returns the T-states actually consumed. This only exceeds the budget
    /// by the remainder of the last instruction (or interrupt entry), and
    /// saturates at `u32::MAX` when that overrun would not fit.
    fn execute<B: Bus>(&mut self, bus: &mut B, cycles: u32) -> u32;

    /// Returns the current program counter.
    ///
    /// Returns `u32` so 16-bit cores and wider cores share the signature.
    /// Narrower CPUs zero-extend.
    fn pc(&self) -> u32;

    /// Returns a snapshot of all registers for inspection.
    fn registers(&self) -> Self::Registers;

    /// Returns true if the CPU is halted.
    fn is_halted(&self) -> bool;

    /// Drive the maskable interrupt line.
    fn set_irq_line(&mut self, state: LineState);

    /// Drive the non-maskable interrupt line. NMI fires on the rising edge.
    fn set_nmi_line(&mut self, state: LineState);

    /// Reset the CPU to its power-on state.
    fn reset(&mut self);
}
