//! Errors raised by the configuration surfaces of the core.
//!
//! Instruction execution itself never fails.

use thiserror::Error;

/// A context image could not be imported.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("context image is {actual} bytes, expected {expected}")]
    WrongSize { expected: usize, actual: usize },

    #[error("invalid interrupt mode {0}")]
    InvalidInterruptMode(u8),

    #[error("daisy chain index {index} out of range for {devices} devices")]
    InvalidDaisyIndex { index: u8, devices: usize },
}

/// A daisy chain could not be built.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DaisyError {
    #[error("daisy chain supports at most {max} devices, got {actual}")]
    TooManyDevices { max: usize, actual: usize },
}

/// A register name did not match any [`Register`](crate::Register).
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown register `{0}`")]
pub struct UnknownRegister(pub String);
