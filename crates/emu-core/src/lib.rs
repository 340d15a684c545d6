//! Core traits and types shared by the interpreter cores.
//!
//! A CPU core owns its registers and nothing else. Memory, ports and the
//! interrupt-acknowledge data all come from a host-supplied [`Bus`].

mod bus;
mod cpu;
mod observable;

pub use bus::{Bus, SimpleBus};
pub use cpu::{Cpu, LineState};
pub use observable::{Observable, Value};
