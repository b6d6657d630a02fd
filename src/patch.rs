//! Modulation patch slot allocation.
//!
//! The board has five patch slots stored in shadow bytes 25–29. A slot is
//! free when its patch type nibble is zero; anything else, including a
//! half-written byte, counts as occupied. Allocation is first fit with no
//! eviction.

use crate::fields::{PatchControl, PatchType};
use crate::registers::{OSCILLATOR_COUNT, PATCH_SLOT_COUNT, REG_PATCH_BASE, SHADOW_PATCH_BASE};
use crate::shadow::ShadowRegisters;

/// Slot number that stands for "no slot available", for callers that keep
/// slot numbers in a plain byte.
///
/// ```
/// use buzzkill_driver::patch::{allocate, PATCH_FAILED};
/// use buzzkill_driver::{PatchType, ShadowRegisters};
///
/// let mut shadow = ShadowRegisters::new();
/// let slot = allocate(&mut shadow, 0, 4, PatchType::FreqScale)
///     .map_or(PATCH_FAILED, |(slot, _)| slot);
/// assert_eq!(slot, PATCH_FAILED);
/// ```
pub const PATCH_FAILED: u8 = 255;

/// Compact register of patch slot `slot`.
pub const fn slot_register(slot: u8) -> u8 {
    REG_PATCH_BASE + (slot << 1)
}

/// Lowest free slot, if any.
pub fn find_free(shadow: &ShadowRegisters) -> Option<u8> {
    (0..PATCH_SLOT_COUNT)
        .find(|&slot| PatchControl::is_free(shadow.byte(SHADOW_PATCH_BASE + slot)))
        .map(|slot| slot as u8)
}

/// Claim the lowest free slot for a patch and return `(slot, control byte)`.
///
/// The caller is responsible for sending the control byte (and the patch
/// parameter) to [`slot_register`]. Returns `None`, leaving the shadow
/// untouched, when `src_mod` or `dest_voice` is above 3 or all slots are
/// taken.
pub fn allocate(
    shadow: &mut ShadowRegisters,
    src_mod: u8,
    dest_voice: u8,
    patch_type: PatchType,
) -> Option<(u8, u8)> {
    if src_mod >= OSCILLATOR_COUNT || dest_voice >= OSCILLATOR_COUNT {
        return None;
    }
    let slot = find_free(shadow)?;
    let control = PatchControl {
        dest_voice,
        src_mod,
        patch_type,
    }
    .pack();
    shadow.set(SHADOW_PATCH_BASE + slot as usize, control);
    Some((slot, control))
}

/// Mark `slot` free regardless of its contents and return the byte to send.
///
/// Returns `None` for slots above 4.
pub fn release(shadow: &mut ShadowRegisters, slot: u8) -> Option<u8> {
    if slot as usize >= PATCH_SLOT_COUNT {
        return None;
    }
    shadow.set(SHADOW_PATCH_BASE + slot as usize, 0);
    Some(0)
}
