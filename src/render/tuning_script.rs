//! FluidSynth tuning script
//!
//! FluidSynth reads this file with `-f` and executes it as shell commands:
//! one `tune` line per key, then `settuning` to activate the bank/program on
//! all 16 channels.

use std::fmt::Write;

use crate::tuning::{RetuneEntry, RetuningTable};

pub const TUNING_NAME: &str = "monure_nkm";
pub const BANK: u8 = 0;
pub const PROGRAM: u8 = 0;
pub const CHANNELS: u8 = 16;

/// Cents as written in a `tune` line: rounded to 4 decimals, shortest
/// round-trip form with `.0` on whole numbers; clamped keys print as the
/// bare bound (`0`, `12700`)
///
/// Rounding goes through fixed-precision formatting, which rounds the exact
/// binary value half to even (`6907.03125` becomes `6907.0312`).
pub fn format_cents(entry: &RetuneEntry) -> String {
    if entry.saturated {
        return format!("{}", entry.cents as i64);
    }
    let fixed = format!("{:.4}", entry.cents);
    match fixed.parse::<f64>() {
        Ok(rounded) => format!("{:?}", rounded),
        Err(_) => fixed,
    }
}

/// Render the full script for a table
pub fn render(table: &RetuningTable) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = writeln!(out, "tuning {} {} {}", TUNING_NAME, BANK, PROGRAM);
    for entry in table.entries() {
        let _ = writeln!(
            out,
            "tune {} {} {} {}",
            BANK,
            PROGRAM,
            entry.key,
            format_cents(entry)
        );
    }
    for channel in 0..CHANNELS {
        let _ = writeln!(out, "settuning {} {} {}", channel, BANK, PROGRAM);
    }
    out
}
