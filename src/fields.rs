//! Bit-packed views of the multi-field registers.
//!
//! Each struct covers all eight bits of its register, so
//! `unpack(b).pack() == b` for every byte. Setters that own one field
//! unpack the shadow byte, change that field and pack it again, which
//! preserves sibling bits exactly.

use crate::registers::{OSC_MOD_BASE, OSC_VOICE_BASE};

/// Oscillator type. The discriminant is the register base of the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum OscType {
    Modulation = OSC_MOD_BASE,
    Voice = OSC_VOICE_BASE,
}

/// Oscillator waveform shape, stored in bits 7..5 of the control register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Shape {
    #[default]
    Sine = 0x00,
    Ramp = 0x20,
    Triangle = 0x40,
    Pulse = 0x60,
    Expon = 0x80,
    Noise = 0xA0,
    Custom = 0xC0,
    Hilltop = 0xE0,
}

impl Shape {
    const fn from_bits(bits: u8) -> Self {
        match bits & 0xE0 {
            0x00 => Shape::Sine,
            0x20 => Shape::Ramp,
            0x40 => Shape::Triangle,
            0x60 => Shape::Pulse,
            0x80 => Shape::Expon,
            0xA0 => Shape::Noise,
            0xC0 => Shape::Custom,
            _ => Shape::Hilltop,
        }
    }
}

/// Envelope curve type, stored in bits 7..6 of the envelope curve register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Curve {
    #[default]
    Linear = 0x00,
    InvertedAttack = 0x40,
    InvertedDecay = 0x80,
    Natural = 0xC0,
}

impl Curve {
    const fn from_bits(bits: u8) -> Self {
        match bits & 0xC0 {
            0x00 => Curve::Linear,
            0x40 => Curve::InvertedAttack,
            0x80 => Curve::InvertedDecay,
            _ => Curve::Natural,
        }
    }
}

/// Modulation patch type, stored in the low nibble of a patch slot.
///
/// [`PatchType::None`] marks a free slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PatchType {
    #[default]
    None = 0x00,
    FreqScale = 0x01,
    FreqShift = 0x02,
    MidShift = 0x03,
    AmpScale = 0x04,
    AmpLevel = 0x05,
    EnvGate = 0x06,
    HardSync = 0x07,
    SoftSync = 0x08,
    RingMod = 0x09,
    AmpScaleMulti = 0x0A,
    AmpLevelMulti = 0x0B,
    EnvGateMulti = 0x0C,
    HardSyncMulti = 0x0D,
    SoftSyncMulti = 0x0E,
    OutputPin = 0x0F,
}

impl PatchType {
    const fn from_bits(bits: u8) -> Self {
        match bits & 0x0F {
            0x00 => PatchType::None,
            0x01 => PatchType::FreqScale,
            0x02 => PatchType::FreqShift,
            0x03 => PatchType::MidShift,
            0x04 => PatchType::AmpScale,
            0x05 => PatchType::AmpLevel,
            0x06 => PatchType::EnvGate,
            0x07 => PatchType::HardSync,
            0x08 => PatchType::SoftSync,
            0x09 => PatchType::RingMod,
            0x0A => PatchType::AmpScaleMulti,
            0x0B => PatchType::AmpLevelMulti,
            0x0C => PatchType::EnvGateMulti,
            0x0D => PatchType::HardSyncMulti,
            0x0E => PatchType::SoftSyncMulti,
            _ => PatchType::OutputPin,
        }
    }
}

// ---------------------------------------------------------------------------
// Oscillator control
// ---------------------------------------------------------------------------

/// Oscillator control register: `shape[7:5] reverse[4] invert[3] step[2:0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OscControl {
    pub shape: Shape,
    pub reverse: bool,
    pub invert: bool,
    /// Step size, 0–7.
    pub step: u8,
}

impl OscControl {
    pub const fn unpack(byte: u8) -> Self {
        Self {
            shape: Shape::from_bits(byte),
            reverse: byte & 0x10 != 0,
            invert: byte & 0x08 != 0,
            step: byte & 0x07,
        }
    }

    pub const fn pack(self) -> u8 {
        self.shape as u8
            | if self.reverse { 0x10 } else { 0 }
            | if self.invert { 0x08 } else { 0 }
            | (self.step & 0x07)
    }
}

// ---------------------------------------------------------------------------
// Envelope quad
// ---------------------------------------------------------------------------

/// Envelope byte 0: `curve[7:6] release_range[5:4] decay_range[3:2] attack_range[1:0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnvRanges {
    pub curve: Curve,
    pub release_range: u8,
    pub decay_range: u8,
    pub attack_range: u8,
}

impl EnvRanges {
    pub const fn unpack(byte: u8) -> Self {
        Self {
            curve: Curve::from_bits(byte),
            release_range: (byte >> 4) & 0x03,
            decay_range: (byte >> 2) & 0x03,
            attack_range: byte & 0x03,
        }
    }

    pub const fn pack(self) -> u8 {
        self.curve as u8
            | (self.release_range & 0x03) << 4
            | (self.decay_range & 0x03) << 2
            | (self.attack_range & 0x03)
    }
}

/// Envelope byte 1: `decay_value[7:4] attack_value[3:0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnvRates {
    pub decay_value: u8,
    pub attack_value: u8,
}

impl EnvRates {
    pub const fn unpack(byte: u8) -> Self {
        Self {
            decay_value: byte >> 4,
            attack_value: byte & 0x0F,
        }
    }

    pub const fn pack(self) -> u8 {
        (self.decay_value & 0x0F) << 4 | (self.attack_value & 0x0F)
    }
}

/// Envelope byte 2: `gate[7] sustain[6:0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnvGate {
    pub gate: bool,
    pub sustain: u8,
}

impl EnvGate {
    pub const fn unpack(byte: u8) -> Self {
        Self {
            gate: byte & 0x80 != 0,
            sustain: byte & 0x7F,
        }
    }

    pub const fn pack(self) -> u8 {
        (if self.gate { 0x80 } else { 0 }) | (self.sustain & 0x7F)
    }
}

/// Envelope byte 3: `mix_volume[7:4] release_value[3:0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnvMix {
    pub mix_volume: u8,
    pub release_value: u8,
}

impl EnvMix {
    pub const fn unpack(byte: u8) -> Self {
        Self {
            mix_volume: byte >> 4,
            release_value: byte & 0x0F,
        }
    }

    pub const fn pack(self) -> u8 {
        (self.mix_volume & 0x0F) << 4 | (self.release_value & 0x0F)
    }
}

// ---------------------------------------------------------------------------
// Globals
// ---------------------------------------------------------------------------

/// Master register: `volume[7:4] voice_enable[3:0]` (bit n enables voice n).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MasterControl {
    pub volume: u8,
    pub voice_enable: u8,
}

impl MasterControl {
    pub const fn unpack(byte: u8) -> Self {
        Self {
            volume: byte >> 4,
            voice_enable: byte & 0x0F,
        }
    }

    pub const fn pack(self) -> u8 {
        (self.volume & 0x0F) << 4 | (self.voice_enable & 0x0F)
    }
}

/// Patch slot register: `dest_voice[7:6] src_mod[5:4] patch_type[3:0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PatchControl {
    pub dest_voice: u8,
    pub src_mod: u8,
    pub patch_type: PatchType,
}

impl PatchControl {
    pub const fn unpack(byte: u8) -> Self {
        Self {
            dest_voice: byte >> 6,
            src_mod: (byte >> 4) & 0x03,
            patch_type: PatchType::from_bits(byte),
        }
    }

    pub const fn pack(self) -> u8 {
        (self.dest_voice & 0x03) << 6 | (self.src_mod & 0x03) << 4 | self.patch_type as u8
    }

    /// A slot is free exactly when its patch type nibble is zero.
    pub const fn is_free(byte: u8) -> bool {
        byte & 0x0F == 0
    }
}
