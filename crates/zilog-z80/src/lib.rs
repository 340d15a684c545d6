//! Zilog Z80 interpreter.
//!
//! Whole instructions are executed against a T-state budget: every opcode
//! family has a cost table that is charged before the handler runs, and
//! handlers add the extra cost of taken branches and repeating block
//! instructions. Flags come from precomputed tables, including the
//! undocumented X and Y bits.
//!
//! ```no_run
//! use emu_core::{Cpu, SimpleBus};
//! use zilog_z80::Z80;
//!
//! let mut bus = SimpleBus::new();
//! bus.load(0x0000, &[0x3E, 0x05, 0x06, 0x03, 0x80]);
//! let mut cpu = Z80::new();
//! let spent = cpu.execute(&mut bus, 18);
//! assert_eq!((cpu.registers().a, spent), (8, 18));
//! ```

mod alu;
mod config;
mod context;
mod cpu;
mod daisy;
mod error;
pub mod flags;
mod registers;
pub mod timing;

pub use config::Z80Config;
pub use context::{CONTEXT_SIZE, Z80Context};
pub use cpu::Z80;
pub use daisy::{DaisyChain, DaisyDevice, INT_IEO, INT_REQ, MAX_DAISY};
pub use error::{ContextError, DaisyError, UnknownRegister};
pub use flags::{CF, HF, NF, PF, SF, XF, YF, ZF};
pub use registers::{Register, Registers};
