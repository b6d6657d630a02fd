//! Error types for the BuzzKill driver.

use core::fmt;

/// Errors returned by [`BuzzKill`](crate::BuzzKill) operations.
///
/// A rejected call never reaches the bus or the shadow registers, so an
/// `InvalidArgument` or `NoFreePatchSlot` result leaves the board exactly as
/// it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuzzKillError<E> {
    /// Underlying bus error from the SPI or I2C implementation.
    Interface(E),

    /// An argument was outside its documented range.
    InvalidArgument,

    /// All five modulation patch slots are in use.
    NoFreePatchSlot,
}

// Allow ergonomic `?` propagation from raw bus errors.
impl<E> From<E> for BuzzKillError<E> {
    fn from(error: E) -> Self {
        BuzzKillError::Interface(error)
    }
}

impl<E: fmt::Debug> fmt::Display for BuzzKillError<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BuzzKillError::Interface(e) => write!(f, "Bus error: {:?}", e),
            BuzzKillError::InvalidArgument => write!(f, "Argument out of range"),
            BuzzKillError::NoFreePatchSlot => write!(f, "No free patch slot"),
        }
    }
}

#[cfg(feature = "defmt")]
impl<E: defmt::Format> defmt::Format for BuzzKillError<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            BuzzKillError::Interface(e) => defmt::write!(f, "Bus error: {}", e),
            BuzzKillError::InvalidArgument => defmt::write!(f, "Argument out of range"),
            BuzzKillError::NoFreePatchSlot => defmt::write!(f, "No free patch slot"),
        }
    }
}
