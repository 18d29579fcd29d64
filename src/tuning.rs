//! # Tuning Map
//!
//! Computes the pitch, in cents, of each of the 128 keys of a MIDI instrument
//! so that consecutive keys are one step of an `n`-step equal temperament.
//!
//! ## Formula
//! ```text
//! anchor   = 6900 + 1200 * log2(base_pitch / 440)
//! cents(k) = (k - 69) * (1200 / n) + anchor        clamped to 0..=12700
//! ```
//! Key 69 is the reference in both the tuning and the register/degree slot
//! numbering, which is why `4K10` in 12 steps lands on A440.
//!
//! ## Example
//! ```rust
//! use monure::tuning::retune;
//!
//! let table = retune(24, 440.0);
//! assert_eq!(table.cents(69), Some(6900.0));
//! assert_eq!(table.cents(70), Some(6950.0)); // quarter tone
//! ```

use serde::Serialize;

use crate::config::Config;

pub const KEY_COUNT: usize = 128;
pub const REFERENCE_KEY: u8 = 69;
pub const REFERENCE_HZ: f64 = 440.0;
pub const MAX_CENTS: f64 = 12700.0;

/// One key of the retuning table
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RetuneEntry {
    pub key: u8,
    pub cents: f64,
    /// The computed pitch fell outside 0..=12700 and was clamped
    pub saturated: bool,
}

/// Pitch in cents for every key 0..=127
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetuningTable {
    entries: Vec<RetuneEntry>,
}

impl RetuningTable {
    pub fn entries(&self) -> &[RetuneEntry] {
        &self.entries
    }

    /// Cents for `key`, or `None` above 127
    pub fn cents(&self, key: u8) -> Option<f64> {
        self.entries.get(usize::from(key)).map(|entry| entry.cents)
    }
}

/// Cents assigned to key 69 for a given reference frequency
pub fn anchor_cents(base_pitch: f64) -> f64 {
    6900.0 + 1200.0 * (base_pitch / REFERENCE_HZ).log2()
}

/// Build the retuning table for `steps` equal divisions of the octave.
///
/// `steps` below 1 is treated as 1.
pub fn retune(steps: u32, base_pitch: f64) -> RetuningTable {
    let step_cents = 1200.0 / f64::from(steps.max(1));
    let anchor = anchor_cents(base_pitch);

    let entries = (0..KEY_COUNT as u8)
        .map(|key| {
            let raw = (f64::from(key) - f64::from(REFERENCE_KEY)) * step_cents + anchor;
            let cents = raw.clamp(0.0, MAX_CENTS);
            RetuneEntry {
                key,
                cents,
                saturated: cents != raw,
            }
        })
        .collect();

    RetuningTable { entries }
}

/// Retuning table for a pattern configuration
pub fn retune_config(config: &Config) -> RetuningTable {
    retune(config.tuning.steps, config.base_pitch)
}
