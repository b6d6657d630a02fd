//! Async driver for the BuzzKill sound effects and speech synthesis board.
//!
//! The board has eight oscillators (four modulation, four voice), four
//! envelopes, a mixer, five modulation patch slots and a phoneme speech
//! engine. It listens on SPI or I2C and its registers are write-only.
//!
//! [`BuzzKill`] exposes the whole feature set over any
//! [`embedded_hal_async`] SPI device or I2C bus, and keeps a
//! [`ShadowRegisters`] mirror so single-field setters never clobber the
//! other bits of a shared register.
//!
//! # Layers
//!
//! - [`buzzkill`]: validated feature API and shadow bookkeeping.
//! - [`protocol`]: command byte encoding and I2C packet planning.
//! - [`interface`]: SPI and I2C back ends.
//! - [`registers`], [`fields`]: register map and bitfield layouts.
//!
//! # Quick Start
//!
//! ```ignore
//! use buzzkill_driver::{
//!     BuzzKill, Curve, EnvelopeConfig, Oscillator, PatchType, Shape, DEFAULT_ADDRESS,
//! };
//!
//! let mut board = BuzzKill::new().begin_i2c(i2c, DEFAULT_ADDRESS);
//!
//! board.set_frequency(Oscillator::voice(0), 261.6).await?;
//! board.set_shape(Oscillator::voice(0), Shape::Triangle).await?;
//! board
//!     .configure_envelope(0, &EnvelopeConfig::from_millis(Curve::Natural, 20, 200, 90, 600, 15, true))
//!     .await?;
//! board.enable_voice(0, true).await?;
//!
//! // Speech
//! board.prepare_speech_mode(110.0, PatchType::FreqScale).await?;
//! board.add_speech_tags("H*EH LX OW.").await?;
//! board.start_speaking().await?;
//! ```
//!
//! # Crate Features
//!
//! - **`defmt`**: structured logging via [`defmt`](https://docs.rs/defmt)
//!   and `defmt::Format` on the public types.

#![cfg_attr(not(test), no_std)]

pub mod buzzkill;
mod driver;
pub mod error;
pub mod fields;
pub mod interface;
pub mod patch;
pub mod phonemes;
pub mod protocol;
pub mod registers;
pub mod shadow;
pub mod timing;

#[cfg(test)]
mod mock;

// ── Re-exports for convenience ───────────────────────────────────────────

pub use buzzkill::{
    BuzzKill, EnvelopeConfig, Oscillator, OscillatorConfig, SpeechFactors, FREQUENCY_LIMIT,
    SET_REGISTERS_MAX, SPEECH_SPEED_MAX,
};
pub use error::BuzzKillError;
pub use fields::{Curve, OscType, PatchType, Shape};
pub use interface::{I2cInterface, Interface, NoInterface, SpiInterface};
pub use patch::PATCH_FAILED;
pub use phonemes::{parse_tags, phoneme_from_tag, TagError};
pub use registers::{DEFAULT_ADDRESS, SPI_FREQUENCY_HZ};
pub use shadow::ShadowRegisters;
pub use timing::RateSetting;
