//! # Pitch Resolution
//!
//! Turns a single pitch token into a virtual slot number.
//!
//! ## Register/degree notation (`rKd`)
//! `4K1` is degree 1 of register 4 in the current tuning. With `n` steps per
//! octave the slot is `(r + 1) * n + (d - 1)`, so under 12 steps `4K1` is 60
//! (middle C) and under 6 steps it is 30. The slot is only bookkeeping: it
//! gets a frequency from the retuning table (see [`crate::tuning`]).
//!
//! ## Letter notation
//! `C`, `F#3`, `Bb`, `A-1`. The octave defaults to 5 and the slot is always
//! computed as if the tuning were 12 steps: `(octave + 1) * 12 + ordinal`.
//!
//! ## Rests
//! `R` and `REST` resolve to [`Pitch::Rest`].

use thiserror::Error;

/// Semitone names in ordinal order; flats are normalized before lookup
const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

const FLAT_TO_SHARP: [(&str, &str); 5] = [
    ("Db", "C#"),
    ("Eb", "D#"),
    ("Gb", "F#"),
    ("Ab", "G#"),
    ("Bb", "A#"),
];

const DEFAULT_OCTAVE: i32 = 5;

/// A resolved pitch token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pitch {
    Slot(i32),
    Rest,
}

/// Why a token is not a pitch
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvedPitch {
    #[error("not a pitch")]
    Unrecognized,

    #[error("flat has no sharp equivalent")]
    UnsupportedFlat,

    #[error("slot out of range")]
    Overflow,
}

/// Resolve a pitch token under a tuning with `steps` divisions per octave
pub fn resolve_pitch(token: &str, steps: u32) -> Result<Pitch, UnresolvedPitch> {
    if token == "R" || token == "REST" {
        return Ok(Pitch::Rest);
    }
    if let Some((register, degree)) = parse_register_degree(token) {
        return register_degree_slot(register, degree, steps).map(Pitch::Slot);
    }
    resolve_letter(token).map(Pitch::Slot)
}

/// Virtual slot for register `r`, degree `d` with `steps` divisions per octave
pub fn register_degree_slot(register: u32, degree: u32, steps: u32) -> Result<i32, UnresolvedPitch> {
    let r = i64::from(register);
    let d = i64::from(degree);
    let n = i64::from(steps);
    let slot = (r + 1)
        .checked_mul(n)
        .and_then(|base| base.checked_add(d - 1))
        .ok_or(UnresolvedPitch::Overflow)?;
    i32::try_from(slot).map_err(|_| UnresolvedPitch::Overflow)
}

/// Recover `(register, degree)` from a slot; inverse of [`register_degree_slot`]
/// for degrees in `1..=steps`. `steps` below 1 is treated as 1.
pub fn slot_to_register_degree(slot: i32, steps: u32) -> (i32, i32) {
    let n = i32::try_from(steps.max(1)).unwrap_or(i32::MAX);
    (slot.div_euclid(n) - 1, slot.rem_euclid(n) + 1)
}

/// Match `<digits>K<digits>`
fn parse_register_degree(token: &str) -> Option<(u32, u32)> {
    let (register, degree) = token.split_once('K')?;
    if !all_digits(register) || !all_digits(degree) {
        return None;
    }
    Some((register.parse().ok()?, degree.parse().ok()?))
}

fn resolve_letter(token: &str) -> Result<i32, UnresolvedPitch> {
    let letter = token.chars().next().ok_or(UnresolvedPitch::Unrecognized)?;
    if !('A'..='G').contains(&letter) {
        return Err(UnresolvedPitch::Unrecognized);
    }

    let name_len = match token[1..].chars().next() {
        Some('#') | Some('b') => 2,
        _ => 1,
    };
    let (name, octave) = token.split_at(name_len);

    let name = match name.strip_suffix('b') {
        Some(_) => FLAT_TO_SHARP
            .iter()
            .find(|(flat, _)| *flat == name)
            .map(|(_, sharp)| *sharp)
            .ok_or(UnresolvedPitch::UnsupportedFlat)?,
        None => name,
    };
    let ordinal = NOTE_NAMES
        .iter()
        .position(|n| *n == name)
        .ok_or(UnresolvedPitch::Unrecognized)? as i32;

    let octave = if octave.is_empty() {
        DEFAULT_OCTAVE
    } else {
        let magnitude = octave.strip_prefix('-').unwrap_or(octave);
        if !all_digits(magnitude) {
            return Err(UnresolvedPitch::Unrecognized);
        }
        octave.parse::<i32>().map_err(|_| UnresolvedPitch::Overflow)?
    };

    octave
        .checked_add(1)
        .and_then(|o| o.checked_mul(12))
        .and_then(|base| base.checked_add(ordinal))
        .ok_or(UnresolvedPitch::Overflow)
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
