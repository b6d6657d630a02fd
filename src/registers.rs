//! Register and command numbers for the BuzzKill board.
//!
//! The board exposes two address spaces on the wire:
//! - **Compact registers** (0–60): the command byte is `register << 2`, with
//!   the payload length folded into the two low bits when it is 1–3.
//! - **Control commands** (61–255): the command byte is sent verbatim.
//!
//! Shadow indices (0–29) are a separate, smaller space. See
//! [`shadow_index`] for the mapping between the two.

// ---------------------------------------------------------------------------
// Compact registers
// ---------------------------------------------------------------------------

/// First register of the modulation oscillator block (4 registers per oscillator).
pub const OSC_MOD_BASE: u8 = 0x00;

/// First register of the voice oscillator block (4 registers per oscillator).
pub const OSC_VOICE_BASE: u8 = 0x10;

/// Offset of the 16-bit frequency register within an oscillator block.
pub const OSC_FREQUENCY: u8 = 0;

/// Offset of the midpoint register within an oscillator block.
pub const OSC_MIDPOINT: u8 = 2;

/// Offset of the shape/flags/step control register within an oscillator block.
pub const OSC_CONTROL: u8 = 3;

/// First envelope register. Envelope `e` occupies `32 + 4e .. 35 + 4e`.
pub const ENV_BASE: u8 = 32;

/// Offset of the curve/ranges register within an envelope block.
pub const ENV_CURVE: u8 = 0;

/// Offset of the gate/sustain register within an envelope block.
pub const ENV_GATE_SUSTAIN: u8 = 2;

/// Offset of the mix volume/release value register within an envelope block.
pub const ENV_MIX_RELEASE: u8 = 3;

/// Master volume (high nibble) and voice output enables (low nibble).
pub const REG_MASTER: u8 = 48;

/// Oscillator halt mask.
pub const REG_HALT: u8 = 49;

/// First patch slot register. Slot `s` is at `50 + 2s`, its parameter at `51 + 2s`.
pub const REG_PATCH_BASE: u8 = 50;

/// Speech buffer append (zero-length write clears the buffer).
pub const REG_SPEECH_BUFFER: u8 = 60;

/// Highest register accepted by the bulk register writes.
pub const REG_LAST: u8 = 59;

/// Registers below this value use folded-length framing.
pub const COMPACT_LIMIT: u8 = 61;

// ---------------------------------------------------------------------------
// Control commands
// ---------------------------------------------------------------------------

pub const CMD_SPEECH_SPEED: u8 = 244;
pub const CMD_SPEECH_FACTORS: u8 = 245;
pub const CMD_STOP_SPEAKING: u8 = 246;
pub const CMD_START_SPEAKING: u8 = 247;
pub const CMD_RESTART_OSCILLATORS: u8 = 248;

/// Custom waveform upload, first 128 bytes.
pub const CMD_CUSTOM_WAVE: u8 = 249;

/// I2C address change, followed by the 3-byte checked payload.
pub const CMD_CHANGE_ADDRESS: u8 = 250;

pub const CMD_SLEEP: u8 = 251;

/// Internal marker: frame carries no command byte at all. Used for the
/// second half of the custom waveform upload.
pub const CMD_CONTINUE: u8 = 255;

/// Raw byte written over I2C to wake a sleeping board.
pub const WAKE_BYTE: u8 = 0xFF;

// ---------------------------------------------------------------------------
// Shadow layout
// ---------------------------------------------------------------------------

/// Number of shadowed register bytes.
pub const SHADOW_LEN: usize = 30;

/// Shadow index of the first envelope byte.
pub const SHADOW_ENV_BASE: usize = 8;

/// Shadow index of the master volume/voice enable byte.
pub const SHADOW_MASTER: usize = 24;

/// Shadow index of patch slot 0.
pub const SHADOW_PATCH_BASE: usize = 25;

/// Power-up value of every shadow byte.
///
/// Envelopes default to sustain 127 and mix volume 15; the master byte
/// defaults to volume 15 with all voices disabled.
#[rustfmt::skip]
pub const SHADOW_DEFAULTS: [u8; SHADOW_LEN] = [
    // Oscillator control bytes (4 modulation, 4 voice)
    0, 0, 0, 0, 0, 0, 0, 0,
    // Envelope quads: curve/ranges, rate values, gate/sustain, mix/release
    0, 0, 127, 240,
    0, 0, 127, 240,
    0, 0, 127, 240,
    0, 0, 127, 240,
    // Master volume / voice enables
    240,
    // Patch slots
    0, 0, 0, 0, 0,
];

/// Map a compact register number to the shadow byte it writes, if any.
///
/// - 0–31: only the control register of each oscillator (`reg % 4 == 3`),
///   at index `reg / 4`.
/// - 32–48: envelope bytes and the master byte, at index `reg - 24`.
/// - 49–59: only even registers (patch slots), at index `reg / 2`.
pub const fn shadow_index(register: u8) -> Option<usize> {
    match register {
        0..=31 if register % 4 == 3 => Some(register as usize / 4),
        32..=48 => Some(register as usize - 24),
        49..=REG_LAST if register % 2 == 0 => Some(register as usize / 2),
        _ => None,
    }
}

/// The compact register through which shadow byte `index` is written.
///
/// Inverse of [`shadow_index`] for every `index < SHADOW_LEN`.
pub const fn owning_register(index: usize) -> u8 {
    if index < SHADOW_ENV_BASE {
        (index * 4 + 3) as u8
    } else if index <= SHADOW_MASTER {
        (index + 24) as u8
    } else {
        (index * 2) as u8
    }
}

// ---------------------------------------------------------------------------
// Device constants
// ---------------------------------------------------------------------------

/// Factory-default 7-bit I2C address.
pub const DEFAULT_ADDRESS: u8 = 0x0A;

/// Lowest and highest addresses accepted by an address change.
pub const ADDRESS_MIN: u8 = 8;
pub const ADDRESS_MAX: u8 = 119;

/// Recommended SPI clock for the board's secondary-peripheral SPI port.
pub const SPI_FREQUENCY_HZ: u32 = 400_000;

/// Maximum bytes in one I2C write packet.
pub const I2C_PACKET_LIMIT: usize = 32;

/// Oscillators per type, envelopes and voice outputs.
pub const OSCILLATOR_COUNT: u8 = 4;
pub const ENVELOPE_COUNT: u8 = 4;
pub const VOICE_COUNT: u8 = 4;

/// Number of modulation patch slots.
pub const PATCH_SLOT_COUNT: usize = 5;

/// Length of a custom waveform table.
pub const CUSTOM_WAVE_LEN: usize = 256;

/// Longest phoneme run accepted in a single speech buffer append.
pub const SPEECH_APPEND_MAX: usize = 254;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shadow_index_partition() {
        // Oscillator control registers only
        assert_eq!(shadow_index(0), None);
        assert_eq!(shadow_index(3), Some(0));
        assert_eq!(shadow_index(19), Some(4));
        assert_eq!(shadow_index(31), Some(7));
        assert_eq!(shadow_index(30), None);

        // Envelopes and master
        assert_eq!(shadow_index(32), Some(8));
        assert_eq!(shadow_index(47), Some(23));
        assert_eq!(shadow_index(48), Some(24));

        // Halt and patch parameters are not shadowed
        assert_eq!(shadow_index(49), None);
        assert_eq!(shadow_index(51), None);
        assert_eq!(shadow_index(50), Some(25));
        assert_eq!(shadow_index(58), Some(29));

        // Speech buffer and beyond
        assert_eq!(shadow_index(60), None);
        assert_eq!(shadow_index(200), None);
    }

    #[test]
    fn owning_register_inverts_shadow_index() {
        for index in 0..SHADOW_LEN {
            assert_eq!(shadow_index(owning_register(index)), Some(index));
        }
    }

    #[test]
    fn oscillator_control_bytes_are_written_through_control_registers() {
        assert_eq!(owning_register(0), OSC_MOD_BASE + OSC_CONTROL);
        assert_eq!(owning_register(5), OSC_VOICE_BASE + 4 + OSC_CONTROL);
        assert_eq!(owning_register(SHADOW_MASTER), REG_MASTER);
    }
}
