//! Host-side mirror of the board's write-only registers.
//!
//! The board cannot be read back, so every write that touches a shadowed
//! register goes through [`ShadowRegisters`] first. A shadow byte is then
//! always equal to the last value handed to the bus for its register.

use crate::registers::{owning_register, shadow_index, SHADOW_DEFAULTS, SHADOW_LEN};

/// Fixed table of the 30 shadowed register bytes.
///
/// Indices follow the layout in [`registers`](crate::registers): oscillator
/// control bytes 0–7, envelope quads 8–23, master byte 24, patch slots 25–29.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowRegisters {
    bytes: [u8; SHADOW_LEN],
}

impl Default for ShadowRegisters {
    fn default() -> Self {
        Self::new()
    }
}

impl ShadowRegisters {
    /// Create a store holding the power-up defaults.
    pub const fn new() -> Self {
        Self {
            bytes: SHADOW_DEFAULTS,
        }
    }

    /// Last value written for shadow byte `index`, or `None` past the end
    /// of the table.
    pub fn get(&self, index: usize) -> Option<u8> {
        self.bytes.get(index).copied()
    }

    /// Shadow byte `index`.
    ///
    /// # Panics
    /// If `index >= 30`. Callers derive indices from validated entity
    /// numbers.
    pub(crate) fn byte(&self, index: usize) -> u8 {
        self.bytes[index]
    }

    /// # Panics
    /// If `index >= 30`.
    pub(crate) fn set(&mut self, index: usize, value: u8) {
        self.bytes[index] = value;
    }

    /// A contiguous copy of `N` shadow bytes starting at `index`.
    ///
    /// # Panics
    /// If the range runs past the end of the table.
    pub(crate) fn slice<const N: usize>(&self, index: usize) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.bytes[index..index + N]);
        out
    }

    /// Record a raw write to compact register `register`.
    ///
    /// Registers with no shadow byte (frequency, midpoint, halt, patch
    /// parameters, speech buffer) are ignored.
    pub fn record_register(&mut self, register: u8, value: u8) {
        if let Some(index) = shadow_index(register) {
            self.bytes[index] = value;
        }
    }

    /// Restore power-up defaults for every byte owned by a register at or
    /// after `from`. Bytes owned by earlier registers are left alone.
    pub fn reset_from(&mut self, from: u8) {
        for (index, byte) in self.bytes.iter_mut().enumerate() {
            if owning_register(index) >= from {
                *byte = SHADOW_DEFAULTS[index];
            }
        }
    }

    /// The whole table, for diagnostics.
    pub fn as_bytes(&self) -> &[u8; SHADOW_LEN] {
        &self.bytes
    }
}
