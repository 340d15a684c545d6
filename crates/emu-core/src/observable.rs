//! Read-only state inspection for debuggers and tests.

use std::fmt;

/// A register or flag value returned by [`Observable::query`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    U8(u8),
    U16(u16),
    U64(u64),
}

impl Value {
    /// Widen to `u64`, mapping booleans to 0/1.
    #[must_use]
    pub fn as_u64(self) -> u64 {
        match self {
            Value::Bool(v) => u64::from(v),
            Value::U8(v) => u64::from(v),
            Value::U16(v) => u64::from(v),
            Value::U64(v) => v,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::U8(v) => write!(f, "{v:#04X}"),
            Value::U16(v) => write!(f, "{v:#06X}"),
            Value::U64(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::U8(v)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::U16(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::U64(v)
    }
}

/// A component whose state can be inspected by name.
///
/// Queries never affect emulation state.
pub trait Observable {
    /// Query a property by path, e.g. `pc`, `hl'` or `flags.z`.
    ///
    /// Returns `None` if the path is not recognised.
    fn query(&self, path: &str) -> Option<Value>;

    /// All paths accepted by [`Observable::query`].
    fn query_paths(&self) -> &'static [&'static str];

    /// Every known path paired with its current value.
    fn snapshot(&self) -> Vec<(&'static str, Value)> {
        self.query_paths()
            .iter()
            .filter_map(|&path| self.query(path).map(|v| (path, v)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_register_width() {
        assert_eq!(Value::U8(0x0A).to_string(), "0x0A");
        assert_eq!(Value::U16(0x38).to_string(), "0x0038");
        assert_eq!(Value::Bool(true).as_u64(), 1);
    }
}
