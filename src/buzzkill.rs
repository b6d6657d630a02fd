//! High-level interface for the BuzzKill sound effects board.
//!
//! [`BuzzKill`] validates arguments, keeps the shadow registers in step with
//! everything it writes, and hands finished frames to the low-level driver.

use crate::driver::WireDriver;
use crate::error::BuzzKillError;
use crate::fields::{
    Curve, EnvGate, EnvMix, EnvRanges, EnvRates, MasterControl, OscControl, OscType, PatchType,
    Shape,
};
use crate::interface::{I2cInterface, Interface, NoInterface, SpiInterface};
use crate::patch;
use crate::phonemes::parse_tags;
use crate::registers::{
    owning_register, ADDRESS_MAX, ADDRESS_MIN, CMD_CHANGE_ADDRESS, CMD_CONTINUE, CMD_CUSTOM_WAVE,
    CMD_RESTART_OSCILLATORS, CMD_SLEEP, CMD_SPEECH_FACTORS, CMD_SPEECH_SPEED,
    CMD_START_SPEAKING, CMD_STOP_SPEAKING, CUSTOM_WAVE_LEN, ENVELOPE_COUNT, ENV_BASE, ENV_CURVE,
    ENV_GATE_SUSTAIN, ENV_MIX_RELEASE, OSCILLATOR_COUNT, OSC_FREQUENCY,
    OSC_MIDPOINT, REG_HALT, REG_LAST, REG_PATCH_BASE, REG_SPEECH_BUFFER,
    SHADOW_ENV_BASE, SHADOW_MASTER, SPEECH_APPEND_MAX, VOICE_COUNT,
};
use crate::shadow::ShadowRegisters;
use crate::timing::RateSetting;

/// Most values accepted by [`BuzzKill::set_registers`].
pub const SET_REGISTERS_MAX: usize = 10;

/// Highest accepted speech speed.
pub const SPEECH_SPEED_MAX: u8 = 253;

/// Frequencies must be below this many hertz.
pub const FREQUENCY_LIMIT: f32 = 4096.0;

// ---------------------------------------------------------------------------
// Value types
// ---------------------------------------------------------------------------

/// One of the eight oscillators, addressed by type and number (0–3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Oscillator {
    pub kind: OscType,
    pub number: u8,
}

impl Oscillator {
    pub const fn new(kind: OscType, number: u8) -> Self {
        Self { kind, number }
    }

    /// Modulation oscillator `number`.
    pub const fn modulation(number: u8) -> Self {
        Self::new(OscType::Modulation, number)
    }

    /// Voice oscillator `number`.
    pub const fn voice(number: u8) -> Self {
        Self::new(OscType::Voice, number)
    }

    const fn is_valid(&self) -> bool {
        self.number < OSCILLATOR_COUNT
    }

    const fn register(&self, offset: u8) -> u8 {
        self.kind as u8 + (self.number << 2) + offset
    }

    const fn shadow_index(&self) -> usize {
        (self.kind as u8 >> 2) as usize + self.number as usize
    }
}

/// Full oscillator setup for [`BuzzKill::configure_oscillator`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OscillatorConfig {
    /// Frequency in hertz, `0.0 <= f < 4096.0`, truncated to 1/16 Hz.
    pub frequency: f32,
    pub shape: Shape,
    pub midpoint: u8,
    pub invert: bool,
    pub reverse: bool,
    /// Step size, 0–7.
    pub step: u8,
}

impl OscillatorConfig {
    /// Frequency and shape with midpoint 128, no inversion, no reversal
    /// and step 0.
    pub const fn new(frequency: f32, shape: Shape) -> Self {
        Self {
            frequency,
            shape,
            midpoint: 128,
            invert: false,
            reverse: false,
            step: 0,
        }
    }

    fn control(&self) -> OscControl {
        OscControl {
            shape: self.shape,
            reverse: self.reverse,
            invert: self.invert,
            step: self.step,
        }
    }
}

/// Full envelope setup for [`BuzzKill::configure_envelope`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EnvelopeConfig {
    pub curve: Curve,
    pub attack: RateSetting,
    pub decay: RateSetting,
    /// Sustain level, 0–127.
    pub sustain: u8,
    pub release: RateSetting,
    /// Mix volume, 0–15.
    pub mix_volume: u8,
    /// Gate the note on as part of the write.
    pub note_on: bool,
}

impl Default for EnvelopeConfig {
    /// The board's power-up envelope.
    fn default() -> Self {
        Self {
            curve: Curve::Linear,
            attack: RateSetting::default(),
            decay: RateSetting::default(),
            sustain: 127,
            release: RateSetting::default(),
            mix_volume: 15,
            note_on: false,
        }
    }
}

impl EnvelopeConfig {
    /// Build a config from stage durations in milliseconds.
    pub const fn from_millis(
        curve: Curve,
        attack_ms: u16,
        decay_ms: u16,
        sustain: u8,
        release_ms: u16,
        mix_volume: u8,
        note_on: bool,
    ) -> Self {
        Self {
            curve,
            attack: RateSetting::from_millis(attack_ms),
            decay: RateSetting::from_millis(decay_ms),
            sustain,
            release: RateSetting::from_millis(release_ms),
            mix_volume,
            note_on,
        }
    }

    const fn is_valid(&self) -> bool {
        self.attack.is_valid()
            && self.decay.is_valid()
            && self.release.is_valid()
            && self.sustain <= 127
            && self.mix_volume <= 15
    }

    /// The four envelope register bytes in register order.
    fn pack(&self) -> [u8; 4] {
        [
            EnvRanges {
                curve: self.curve,
                release_range: self.release.range,
                decay_range: self.decay.range,
                attack_range: self.attack.range,
            }
            .pack(),
            EnvRates {
                decay_value: self.decay.value,
                attack_value: self.attack.value,
            }
            .pack(),
            EnvGate {
                gate: self.note_on,
                sustain: self.sustain,
            }
            .pack(),
            EnvMix {
                mix_volume: self.mix_volume,
                release_value: self.release.value,
            }
            .pack(),
        ]
    }
}

/// Frequency and amplitude adjustment for each of the four speech formants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpeechFactors {
    pub frequency: [u8; 4],
    pub amplitude: [u8; 4],
}

impl SpeechFactors {
    /// Wire order: formant 1 frequency, formant 1 amplitude, formant 2 ...
    fn to_bytes(self) -> [u8; 8] {
        let mut out = [0u8; 8];
        for formant in 0..4 {
            out[formant * 2] = self.frequency[formant];
            out[formant * 2 + 1] = self.amplitude[formant];
        }
        out
    }
}

/// Frequency register value (1/16 Hz units), or `None` when out of range.
fn frequency_word(hz: f32) -> Option<u16> {
    if (0.0..FREQUENCY_LIMIT).contains(&hz) {
        Some((hz * 16.0) as u16)
    } else {
        None
    }
}

const fn envelope_register(env: u8, offset: u8) -> u8 {
    ENV_BASE + (env << 2) + offset
}

const fn envelope_index(env: u8) -> usize {
    SHADOW_ENV_BASE + ((env as usize) << 2)
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// High-level interface for the BuzzKill board.
///
/// The board's registers are write-only, so the driver mirrors them in a
/// [`ShadowRegisters`] table. Setters that change one field read the
/// shadow byte, replace their bits, store the result and send it, which
/// keeps the other fields of the register intact.
///
/// Arguments outside their documented range make a call return
/// [`BuzzKillError::InvalidArgument`] before anything is stored or sent.
///
/// # Lifecycle
///
/// 1. [`BuzzKill::new()`]: shadow registers at power-up defaults, no bus.
///    Calls made now update the shadow only.
/// 2. [`begin_spi()`](BuzzKill::begin_spi) or
///    [`begin_i2c()`](BuzzKill::begin_i2c): choose the bus. The shadow
///    table carries over.
/// 3. Use the oscillator, envelope, patch and speech methods.
///
/// # Example
///
/// ```no_run
/// use buzzkill_driver::{BuzzKill, Oscillator, Shape, DEFAULT_ADDRESS};
///
/// # async fn example(i2c: impl embedded_hal_async::i2c::I2c) {
/// let mut board = BuzzKill::new().begin_i2c(i2c, DEFAULT_ADDRESS);
/// board.set_frequency(Oscillator::voice(0), 440.0).await.unwrap();
/// board.set_shape(Oscillator::voice(0), Shape::Triangle).await.unwrap();
/// board.enable_voice(0, true).await.unwrap();
/// board.note_on(0).await.unwrap();
/// # }
/// ```
pub struct BuzzKill<IF> {
    driver: WireDriver<IF>,
    shadow: ShadowRegisters,
}

impl Default for BuzzKill<NoInterface> {
    fn default() -> Self {
        Self::new()
    }
}

impl BuzzKill<NoInterface> {
    /// Create a driver with no bus selected.
    pub fn new() -> Self {
        Self::with_interface(NoInterface)
    }

    /// Talk to the board over SPI.
    pub fn begin_spi<SPI>(self, spi: SPI) -> BuzzKill<SpiInterface<SPI>>
    where
        SPI: embedded_hal_async::spi::SpiDevice,
    {
        #[cfg(feature = "defmt")]
        defmt::debug!("BuzzKill: SPI transport selected");

        BuzzKill {
            driver: WireDriver::new(SpiInterface::new(spi)),
            shadow: self.shadow,
        }
    }

    /// Talk to the board over I2C at a 7-bit `address`
    /// (factory default [`DEFAULT_ADDRESS`](crate::DEFAULT_ADDRESS)).
    pub fn begin_i2c<I2C>(self, i2c: I2C, address: u8) -> BuzzKill<I2cInterface<I2C>>
    where
        I2C: embedded_hal_async::i2c::I2c,
    {
        #[cfg(feature = "defmt")]
        defmt::debug!("BuzzKill: I2C transport selected, address {=u8:#x}", address);

        BuzzKill {
            driver: WireDriver::new(I2cInterface::new(i2c, address)),
            shadow: self.shadow,
        }
    }
}

impl<IF> BuzzKill<IF>
where
    IF: Interface,
{
    /// Create a driver over any [`Interface`] implementation.
    pub fn with_interface(interface: IF) -> Self {
        Self {
            driver: WireDriver::new(interface),
            shadow: ShadowRegisters::new(),
        }
    }

    /// Give back the transport.
    pub fn release(self) -> IF {
        self.driver.release()
    }

    pub fn interface(&self) -> &IF {
        self.driver.interface()
    }

    pub fn interface_mut(&mut self) -> &mut IF {
        self.driver.interface_mut()
    }

    /// The shadow register table. No bus traffic.
    pub fn shadow(&self) -> &ShadowRegisters {
        &self.shadow
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Return `InvalidArgument` unless `valid`, logging the rejected operation.
    fn ensure(valid: bool, _operation: &'static str) -> Result<(), BuzzKillError<IF::Error>> {
        if valid {
            Ok(())
        } else {
            #[cfg(feature = "defmt")]
            defmt::warn!("{}: argument out of range, nothing sent", _operation);
            Err(BuzzKillError::InvalidArgument)
        }
    }

    async fn write(&mut self, register: u8, payload: &[u8]) -> Result<(), BuzzKillError<IF::Error>> {
        self.driver.write(register, payload).await
    }

    /// Store `byte` in shadow slot `index` and send it to the register that
    /// owns that slot.
    async fn commit(&mut self, index: usize, byte: u8) -> Result<(), BuzzKillError<IF::Error>> {
        self.shadow.set(index, byte);
        self.write(owning_register(index), &[byte]).await
    }

    async fn modify_oscillator<F>(
        &mut self,
        osc: Oscillator,
        operation: &'static str,
        f: F,
    ) -> Result<(), BuzzKillError<IF::Error>>
    where
        F: FnOnce(&mut OscControl),
    {
        Self::ensure(osc.is_valid(), operation)?;
        let index = osc.shadow_index();
        let mut control = OscControl::unpack(self.shadow.byte(index));
        f(&mut control);
        self.commit(index, control.pack()).await
    }

    async fn modify_master<F>(&mut self, f: F) -> Result<(), BuzzKillError<IF::Error>>
    where
        F: FnOnce(&mut MasterControl),
    {
        let mut master = MasterControl::unpack(self.shadow.byte(SHADOW_MASTER));
        f(&mut master);
        self.commit(SHADOW_MASTER, master.pack()).await
    }

    // -----------------------------------------------------------------------
    // Oscillators
    // -----------------------------------------------------------------------

    /// Set an oscillator's frequency in hertz (`0.0 <= hz < 4096.0`).
    ///
    /// The board works in 1/16 Hz steps; the value is truncated to the step
    /// below.
    pub async fn set_frequency(
        &mut self,
        osc: Oscillator,
        hz: f32,
    ) -> Result<(), BuzzKillError<IF::Error>> {
        let word = frequency_word(hz);
        Self::ensure(osc.is_valid() && word.is_some(), "set_frequency")?;
        let word = word.unwrap_or_default();
        self.write(osc.register(OSC_FREQUENCY), &word.to_le_bytes()).await
    }

    /// Set an oscillator's midpoint (0–255).
    pub async fn set_midpoint(
        &mut self,
        osc: Oscillator,
        midpoint: u8,
    ) -> Result<(), BuzzKillError<IF::Error>> {
        Self::ensure(osc.is_valid(), "set_midpoint")?;
        self.write(osc.register(OSC_MIDPOINT), &[midpoint]).await
    }

    pub async fn set_shape(
        &mut self,
        osc: Oscillator,
        shape: Shape,
    ) -> Result<(), BuzzKillError<IF::Error>> {
        self.modify_oscillator(osc, "set_shape", |c| c.shape = shape)
            .await
    }

    pub async fn set_invert(
        &mut self,
        osc: Oscillator,
        invert: bool,
    ) -> Result<(), BuzzKillError<IF::Error>> {
        self.modify_oscillator(osc, "set_invert", |c| c.invert = invert)
            .await
    }

    pub async fn set_reverse(
        &mut self,
        osc: Oscillator,
        reverse: bool,
    ) -> Result<(), BuzzKillError<IF::Error>> {
        self.modify_oscillator(osc, "set_reverse", |c| c.reverse = reverse)
            .await
    }

    /// Set an oscillator's step size (0–7).
    pub async fn set_step(
        &mut self,
        osc: Oscillator,
        step: u8,
    ) -> Result<(), BuzzKillError<IF::Error>> {
        Self::ensure(step <= 7, "set_step")?;
        self.modify_oscillator(osc, "set_step", |c| c.step = step)
            .await
    }

    /// Write frequency, midpoint and control byte in one 4-byte burst.
    pub async fn configure_oscillator(
        &mut self,
        osc: Oscillator,
        config: &OscillatorConfig,
    ) -> Result<(), BuzzKillError<IF::Error>> {
        let word = frequency_word(config.frequency);
        Self::ensure(
            osc.is_valid() && config.step <= 7 && word.is_some(),
            "configure_oscillator",
        )?;
        let [lo, hi] = word.unwrap_or_default().to_le_bytes();
        let control = config.control().pack();
        self.shadow.set(osc.shadow_index(), control);
        self.write(osc.register(OSC_FREQUENCY), &[lo, hi, config.midpoint, control])
            .await
    }

    /// Restart oscillators whose bit is set: bits 0–3 are modulation
    /// oscillators 0–3, bits 4–7 voice oscillators 0–3.
    pub async fn restart_oscillators(&mut self, mask: u8) -> Result<(), BuzzKillError<IF::Error>> {
        self.write(CMD_RESTART_OSCILLATORS, &[mask]).await
    }

    /// Hold oscillators whose bit is set at their starting value. Same bit
    /// layout as [`restart_oscillators`](Self::restart_oscillators).
    pub async fn halt_oscillators(&mut self, mask: u8) -> Result<(), BuzzKillError<IF::Error>> {
        self.write(REG_HALT, &[mask]).await
    }

    // -----------------------------------------------------------------------
    // Envelopes
    // -----------------------------------------------------------------------

    pub async fn set_curve(
        &mut self,
        env: u8,
        curve: Curve,
    ) -> Result<(), BuzzKillError<IF::Error>> {
        Self::ensure(env < ENVELOPE_COUNT, "set_curve")?;
        let index = envelope_index(env);
        let mut ranges = EnvRanges::unpack(self.shadow.byte(index));
        ranges.curve = curve;
        self.commit(index, ranges.pack()).await
    }

    /// Set the attack rate. Sends the ranges byte and the rate values byte
    /// together.
    pub async fn set_attack(
        &mut self,
        env: u8,
        rate: RateSetting,
    ) -> Result<(), BuzzKillError<IF::Error>> {
        Self::ensure(env < ENVELOPE_COUNT && rate.is_valid(), "set_attack")?;
        let index = envelope_index(env);
        let mut ranges = EnvRanges::unpack(self.shadow.byte(index));
        let mut rates = EnvRates::unpack(self.shadow.byte(index + 1));
        ranges.attack_range = rate.range;
        rates.attack_value = rate.value;
        self.write_range_pair(env, ranges, rates).await
    }

    /// Set the attack rate closest to `ms` milliseconds.
    pub async fn set_attack_ms(&mut self, env: u8, ms: u16) -> Result<(), BuzzKillError<IF::Error>> {
        self.set_attack(env, RateSetting::from_millis(ms)).await
    }

    pub async fn set_decay(
        &mut self,
        env: u8,
        rate: RateSetting,
    ) -> Result<(), BuzzKillError<IF::Error>> {
        Self::ensure(env < ENVELOPE_COUNT && rate.is_valid(), "set_decay")?;
        let index = envelope_index(env);
        let mut ranges = EnvRanges::unpack(self.shadow.byte(index));
        let mut rates = EnvRates::unpack(self.shadow.byte(index + 1));
        ranges.decay_range = rate.range;
        rates.decay_value = rate.value;
        self.write_range_pair(env, ranges, rates).await
    }

    /// Set the decay rate closest to `ms` milliseconds.
    pub async fn set_decay_ms(&mut self, env: u8, ms: u16) -> Result<(), BuzzKillError<IF::Error>> {
        self.set_decay(env, RateSetting::from_millis(ms)).await
    }

    async fn write_range_pair(
        &mut self,
        env: u8,
        ranges: EnvRanges,
        rates: EnvRates,
    ) -> Result<(), BuzzKillError<IF::Error>> {
        let index = envelope_index(env);
        self.shadow.set(index, ranges.pack());
        self.shadow.set(index + 1, rates.pack());
        let bytes = self.shadow.slice::<2>(index);
        self.write(envelope_register(env, ENV_CURVE), &bytes).await
    }

    /// Set the sustain level (0–127).
    pub async fn set_sustain(&mut self, env: u8, sustain: u8) -> Result<(), BuzzKillError<IF::Error>> {
        Self::ensure(env < ENVELOPE_COUNT && sustain <= 127, "set_sustain")?;
        let index = envelope_index(env) + ENV_GATE_SUSTAIN as usize;
        let mut gate = EnvGate::unpack(self.shadow.byte(index));
        gate.sustain = sustain;
        self.commit(index, gate.pack()).await
    }

    /// Set the release rate.
    ///
    /// The release range lives in the curve/ranges byte and the release
    /// value in the mix/release byte, so this sends two frames: the ranges
    /// byte through the curve register, then the mix/release byte.
    pub async fn set_release(
        &mut self,
        env: u8,
        rate: RateSetting,
    ) -> Result<(), BuzzKillError<IF::Error>> {
        Self::ensure(env < ENVELOPE_COUNT && rate.is_valid(), "set_release")?;
        let index = envelope_index(env);
        let mut ranges = EnvRanges::unpack(self.shadow.byte(index));
        let mut mix = EnvMix::unpack(self.shadow.byte(index + 3));
        ranges.release_range = rate.range;
        mix.release_value = rate.value;
        self.shadow.set(index + 3, mix.pack());
        self.commit(index, ranges.pack()).await?;
        self.write(envelope_register(env, ENV_MIX_RELEASE), &[mix.pack()])
            .await
    }

    /// Set the release rate closest to `ms` milliseconds.
    pub async fn set_release_ms(&mut self, env: u8, ms: u16) -> Result<(), BuzzKillError<IF::Error>> {
        self.set_release(env, RateSetting::from_millis(ms)).await
    }

    /// Set an envelope's mix volume (0–15).
    pub async fn set_mix_volume(&mut self, env: u8, volume: u8) -> Result<(), BuzzKillError<IF::Error>> {
        Self::ensure(env < ENVELOPE_COUNT && volume <= 15, "set_mix_volume")?;
        let index = envelope_index(env) + ENV_MIX_RELEASE as usize;
        let mut mix = EnvMix::unpack(self.shadow.byte(index));
        mix.mix_volume = volume;
        self.commit(index, mix.pack()).await
    }

    /// Set or clear an envelope's gate bit.
    pub async fn set_gate(&mut self, env: u8, gate: bool) -> Result<(), BuzzKillError<IF::Error>> {
        Self::ensure(env < ENVELOPE_COUNT, "set_gate")?;
        let index = envelope_index(env) + ENV_GATE_SUSTAIN as usize;
        let mut byte = EnvGate::unpack(self.shadow.byte(index));
        byte.gate = gate;
        self.commit(index, byte.pack()).await
    }

    pub async fn note_on(&mut self, env: u8) -> Result<(), BuzzKillError<IF::Error>> {
        self.set_gate(env, true).await
    }

    pub async fn note_off(&mut self, env: u8) -> Result<(), BuzzKillError<IF::Error>> {
        self.set_gate(env, false).await
    }

    /// Set all four gates at once. Only envelopes whose gate actually
    /// changes are written.
    pub async fn set_gates(&mut self, gates: [bool; 4]) -> Result<(), BuzzKillError<IF::Error>> {
        for (env, &gate) in (0..ENVELOPE_COUNT).zip(gates.iter()) {
            let index = envelope_index(env) + ENV_GATE_SUSTAIN as usize;
            let mut byte = EnvGate::unpack(self.shadow.byte(index));
            if byte.gate != gate {
                byte.gate = gate;
                self.commit(index, byte.pack()).await?;
            }
        }
        Ok(())
    }

    /// Write all four envelope registers in one burst.
    ///
    /// The shadow quad is replaced before the single write, so the board
    /// never sees a mix of old and new fields.
    pub async fn configure_envelope(
        &mut self,
        env: u8,
        config: &EnvelopeConfig,
    ) -> Result<(), BuzzKillError<IF::Error>> {
        Self::ensure(env < ENVELOPE_COUNT && config.is_valid(), "configure_envelope")?;
        let bytes = config.pack();
        let index = envelope_index(env);
        for (offset, &byte) in bytes.iter().enumerate() {
            self.shadow.set(index + offset, byte);
        }
        self.write(envelope_register(env, ENV_CURVE), &bytes).await
    }

    // -----------------------------------------------------------------------
    // Patches
    // -----------------------------------------------------------------------

    /// Route modulation oscillator `src_mod` into voice `dest_voice`.
    ///
    /// Takes the lowest free slot, so on a clean board successive calls
    /// return 0, 1, 2, 3, 4. `param` is patch-type specific.
    ///
    /// # Errors
    /// * [`BuzzKillError::InvalidArgument`] if `src_mod` or `dest_voice` > 3
    /// * [`BuzzKillError::NoFreePatchSlot`] if all five slots are in use
    pub async fn add_patch(
        &mut self,
        src_mod: u8,
        dest_voice: u8,
        patch_type: PatchType,
        param: u8,
    ) -> Result<u8, BuzzKillError<IF::Error>> {
        Self::ensure(
            src_mod < OSCILLATOR_COUNT && dest_voice < OSCILLATOR_COUNT,
            "add_patch",
        )?;
        let Some((slot, control)) =
            patch::allocate(&mut self.shadow, src_mod, dest_voice, patch_type)
        else {
            #[cfg(feature = "defmt")]
            defmt::warn!("add_patch: all patch slots in use");
            return Err(BuzzKillError::NoFreePatchSlot);
        };

        #[cfg(feature = "defmt")]
        defmt::debug!("patch slot {}: mod {} -> voice {}", slot, src_mod, dest_voice);

        self.write(patch::slot_register(slot), &[control, param])
            .await?;
        Ok(slot)
    }

    /// Free a patch slot (0–4), whatever it holds.
    pub async fn remove_patch(&mut self, slot: u8) -> Result<(), BuzzKillError<IF::Error>> {
        let Some(byte) = patch::release(&mut self.shadow, slot) else {
            return Self::ensure(false, "remove_patch");
        };
        self.write(patch::slot_register(slot), &[byte]).await
    }

    /// Free all five patch slots.
    pub async fn clear_patches(&mut self) -> Result<(), BuzzKillError<IF::Error>> {
        self.reset_registers(REG_PATCH_BASE).await
    }

    // -----------------------------------------------------------------------
    // Speech
    // -----------------------------------------------------------------------

    /// Append raw phoneme values to the speech buffer.
    ///
    /// Input stops at the first `0xFF`, if any. Between 1 and 254 phonemes
    /// must remain.
    pub async fn add_speech_phonemes(&mut self, phonemes: &[u8]) -> Result<(), BuzzKillError<IF::Error>> {
        let end = phonemes
            .iter()
            .position(|&p| p == 0xFF)
            .unwrap_or(phonemes.len());
        let phonemes = &phonemes[..end];
        Self::ensure(
            !phonemes.is_empty() && phonemes.len() <= SPEECH_APPEND_MAX,
            "add_speech_phonemes",
        )?;
        self.write(REG_SPEECH_BUFFER, phonemes).await
    }

    /// Append phonemes given as two-letter tags, e.g. `"H*EH LX OW."`.
    ///
    /// See [`parse_tags`](crate::phonemes::parse_tags) for the accepted
    /// syntax. Nothing is sent if any tag is unknown.
    pub async fn add_speech_tags(&mut self, tags: &str) -> Result<(), BuzzKillError<IF::Error>> {
        let phonemes = match parse_tags(tags) {
            Ok(phonemes) => phonemes,
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("add_speech_tags: {}", _e);
                return Err(BuzzKillError::InvalidArgument);
            }
        };
        self.write(REG_SPEECH_BUFFER, &phonemes).await
    }

    /// Empty the speech buffer.
    pub async fn clear_speech_buffer(&mut self) -> Result<(), BuzzKillError<IF::Error>> {
        self.write(REG_SPEECH_BUFFER, &[]).await
    }

    /// Set articulation speed (0–253); higher is faster.
    pub async fn set_speech_speed(&mut self, speed: u8) -> Result<(), BuzzKillError<IF::Error>> {
        Self::ensure(speed <= SPEECH_SPEED_MAX, "set_speech_speed")?;
        self.write(CMD_SPEECH_SPEED, &[speed]).await
    }

    pub async fn set_speech_factors(
        &mut self,
        factors: &SpeechFactors,
    ) -> Result<(), BuzzKillError<IF::Error>> {
        self.write(CMD_SPEECH_FACTORS, &factors.to_bytes()).await
    }

    /// Put the oscillators, mixer and patches into the standard speech
    /// configuration.
    ///
    /// - Voices 0–2: sine at 0 Hz; voice 3: noise at 0 Hz.
    /// - Modulation oscillator 0: hilltop at `pitch` Hz.
    /// - Mix volumes 5, 5, 5, 3.
    /// - All patches cleared, then mod 0 → voice 0 with `patch_type` and
    ///   parameter 255.
    /// - All voice outputs enabled.
    ///
    /// Master volume, speech speed and speech factors are left alone.
    pub async fn prepare_speech_mode(
        &mut self,
        pitch: f32,
        patch_type: PatchType,
    ) -> Result<(), BuzzKillError<IF::Error>> {
        Self::ensure(frequency_word(pitch).is_some(), "prepare_speech_mode")?;

        for voice in 0..3 {
            self.configure_oscillator(Oscillator::voice(voice), &OscillatorConfig::new(0.0, Shape::Sine))
                .await?;
        }
        self.configure_oscillator(Oscillator::voice(3), &OscillatorConfig::new(0.0, Shape::Noise))
            .await?;
        self.configure_oscillator(
            Oscillator::modulation(0),
            &OscillatorConfig::new(pitch, Shape::Hilltop),
        )
        .await?;

        for (env, volume) in [(0, 5), (1, 5), (2, 5), (3, 3)] {
            self.set_mix_volume(env, volume).await?;
        }

        self.clear_patches().await?;
        self.add_patch(0, 0, patch_type, 255).await?;
        self.enable_voices([true; 4]).await
    }

    /// Start speaking the buffered phonemes.
    pub async fn start_speaking(&mut self) -> Result<(), BuzzKillError<IF::Error>> {
        self.write(CMD_START_SPEAKING, &[]).await
    }

    /// Stop speaking before the end of the buffer.
    pub async fn stop_speaking(&mut self) -> Result<(), BuzzKillError<IF::Error>> {
        self.write(CMD_STOP_SPEAKING, &[]).await
    }

    // -----------------------------------------------------------------------
    // Mixer
    // -----------------------------------------------------------------------

    /// Enable or disable the audio output of voice oscillator `voice` (0–3).
    pub async fn enable_voice(&mut self, voice: u8, enable: bool) -> Result<(), BuzzKillError<IF::Error>> {
        Self::ensure(voice < VOICE_COUNT, "enable_voice")?;
        self.modify_master(|m| {
            if enable {
                m.voice_enable |= 1 << voice;
            } else {
                m.voice_enable &= !(1 << voice);
            }
        })
        .await
    }

    pub async fn disable_voice(&mut self, voice: u8) -> Result<(), BuzzKillError<IF::Error>> {
        self.enable_voice(voice, false).await
    }

    /// Set all four voice outputs at once.
    pub async fn enable_voices(&mut self, enable: [bool; 4]) -> Result<(), BuzzKillError<IF::Error>> {
        let mask = enable
            .iter()
            .enumerate()
            .fold(0u8, |mask, (voice, &on)| mask | (u8::from(on) << voice));
        self.modify_master(|m| m.voice_enable = mask).await
    }

    /// Set the master volume (0–15).
    pub async fn set_master_volume(&mut self, volume: u8) -> Result<(), BuzzKillError<IF::Error>> {
        Self::ensure(volume <= 15, "set_master_volume")?;
        self.modify_master(|m| m.volume = volume).await
    }

    // -----------------------------------------------------------------------
    // Raw registers
    // -----------------------------------------------------------------------

    /// Reset registers `from..=59` to their power-up values.
    ///
    /// Silences all output and clears patches when `from` is 0. The speech
    /// buffer, speech speed and speech factors are not affected.
    pub async fn reset_registers(&mut self, from: u8) -> Result<(), BuzzKillError<IF::Error>> {
        Self::ensure(from <= REG_LAST, "reset_registers")?;
        self.shadow.reset_from(from);
        self.write(from, &[]).await
    }

    /// Write consecutive registers starting at `start`.
    ///
    /// `values` must be non-empty and end at or before register 59. Values
    /// that land on shadowed registers update the shadow table.
    pub async fn write_registers(
        &mut self,
        start: u8,
        values: &[u8],
    ) -> Result<(), BuzzKillError<IF::Error>> {
        Self::ensure(
            !values.is_empty() && start as usize + values.len() <= REG_LAST as usize + 1,
            "write_registers",
        )?;
        for (register, &value) in (start..).zip(values.iter()) {
            self.shadow.record_register(register, value);
        }
        self.write(start, values).await
    }

    /// Write a single register.
    pub async fn set_register(&mut self, register: u8, value: u8) -> Result<(), BuzzKillError<IF::Error>> {
        self.write_registers(register, &[value]).await
    }

    /// Write up to ten consecutive registers, stopping at the first `None`.
    /// Entries after the first `None` are ignored and do not count toward
    /// the limit.
    ///
    /// ```no_run
    /// # use buzzkill_driver::BuzzKill;
    /// # async fn example(mut board: BuzzKill<buzzkill_driver::NoInterface>) {
    /// // Writes registers 32 and 33 only.
    /// board.set_registers(32, &[Some(0x05), Some(0x35), None, Some(0xFF)]).await.unwrap();
    /// # }
    /// ```
    pub async fn set_registers(
        &mut self,
        start: u8,
        values: &[Option<u8>],
    ) -> Result<(), BuzzKillError<IF::Error>> {
        let mut present: heapless::Vec<u8, SET_REGISTERS_MAX> = heapless::Vec::new();
        for value in values.iter().map_while(|value| *value) {
            if present.push(value).is_err() {
                return Self::ensure(false, "set_registers");
            }
        }
        self.write_registers(start, &present).await
    }

    // -----------------------------------------------------------------------
    // Board control
    // -----------------------------------------------------------------------

    /// Put the board into low-power sleep.
    pub async fn sleep(&mut self) -> Result<(), BuzzKillError<IF::Error>> {
        self.write(CMD_SLEEP, &[]).await
    }

    /// Wake the board from sleep.
    ///
    /// Over SPI this holds chip select low for 1 ms; over I2C it writes a
    /// single `0xFF` byte.
    pub async fn wake(&mut self) -> Result<(), BuzzKillError<IF::Error>> {
        self.driver.wake().await
    }

    /// Upload the 256-entry custom waveform used by [`Shape::Custom`].
    ///
    /// Sent as two 128-byte frames; the second carries no command byte.
    pub async fn store_custom_wave(
        &mut self,
        wave: &[u8; CUSTOM_WAVE_LEN],
    ) -> Result<(), BuzzKillError<IF::Error>> {
        let (first, second) = wave.split_at(CUSTOM_WAVE_LEN / 2);
        self.write(CMD_CUSTOM_WAVE, first).await?;
        self.write(CMD_CONTINUE, second).await
    }

    /// Permanently change the board's I2C address (8–119).
    ///
    /// The payload repeats the address XORed with `0x55` and `0xAA` so the
    /// board can reject a corrupted command. The driver switches to the new
    /// address immediately.
    pub async fn change_i2c_address(&mut self, address: u8) -> Result<(), BuzzKillError<IF::Error>> {
        Self::ensure(
            (ADDRESS_MIN..=ADDRESS_MAX).contains(&address),
            "change_i2c_address",
        )?;
        self.write(CMD_CHANGE_ADDRESS, &[address, address ^ 0x55, address ^ 0xAA])
            .await?;
        self.driver.set_address(address);
        Ok(())
    }
}
