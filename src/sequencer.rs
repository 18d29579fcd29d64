//! # Event Sequencer
//!
//! Turns the tokens of one note line into note events.
//!
//! ## Token Grammar
//! ```text
//! [position] pitch-group [duration [velocity-scale]]
//! ```
//! - `position` - bare integer, ticks from the pattern start (default: cursor)
//! - `pitch-group` - pitch tokens joined by `_`, played as a chord
//! - `duration` - ticks, replaces `DEF_LEN`
//! - `velocity-scale` - percent of `VOL`, capped at 100
//!
//! ## Example
//! ```text
//! C4 E4 8 G4 8 50     # three notes, the last at half volume
//! 0 C4_E4_G4 16       # chord at the start of the pattern
//! ```
//!
//! A pitch group that does not resolve only drops that one token. The
//! numbers after it are read again from the top of the loop, so a stray
//! duration after a typo is taken as a position for the next group.

use crate::config::Config;
use crate::error::SkipReason;
use crate::pitch::{resolve_pitch, Pitch};
use crate::score::{Diagnostic, NoteEvent};

/// Overrides allowed after a pitch group: duration, then velocity scale
const MAX_OVERRIDES: usize = 2;

/// Notes and skipped tokens produced by one line
#[derive(Debug, Default)]
pub struct LineEvents {
    pub notes: Vec<NoteEvent>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Per-line sequencing state
pub struct Sequencer<'a> {
    config: &'a Config,
    start_offset: u32,
    line: usize,
}

impl<'a> Sequencer<'a> {
    pub fn new(config: &'a Config, start_offset: u32, line: usize) -> Self {
        Self {
            config,
            start_offset,
            line,
        }
    }

    /// Sequence `tokens`, advancing `cursor` (local ticks) as notes are placed.
    pub fn run(&self, tokens: &[String], cursor: &mut u32) -> LineEvents {
        let mut out = LineEvents::default();
        let mut i = 0;

        while i < tokens.len() {
            let mut position = None;
            if let Some(pos) = parse_position(&tokens[i]) {
                position = Some(pos);
                i += 1;
                if i >= tokens.len() {
                    out.diagnostics
                        .push(self.diagnostic(&tokens[i - 1], SkipReason::DanglingPosition));
                    break;
                }
            }

            let group = &tokens[i];
            let overrides: Vec<f64> = tokens[i + 1..]
                .iter()
                .take(MAX_OVERRIDES)
                .map_while(|t| parse_number(t))
                .collect();

            let members: Vec<&str> = group.split('_').collect();
            let steps = self.config.tuning.steps;
            if resolve_pitch(members[0], steps).is_err() {
                out.diagnostics
                    .push(self.diagnostic(group, SkipReason::UnrecognizedPitch));
                i += 1;
                continue;
            }

            let length = overrides
                .first()
                .map(|d| *d as u32)
                .unwrap_or(self.config.def_len)
                .max(1);
            let velocity = match overrides.get(1) {
                Some(scale) => scale_velocity(*scale, self.config.vol),
                None => self.config.velocity(),
            };

            let local = position.unwrap_or(*cursor);
            let abs_tick = self.start_offset.saturating_add(local);

            for member in &members {
                match resolve_pitch(member, steps) {
                    Ok(Pitch::Slot(pitch)) => out.notes.push(NoteEvent {
                        abs_tick,
                        pitch,
                        length,
                        velocity,
                    }),
                    Ok(Pitch::Rest) => {}
                    Err(_) => out
                        .diagnostics
                        .push(self.diagnostic(member, SkipReason::InvalidChordMember)),
                }
            }

            *cursor = local.saturating_add(length);
            i += 1 + overrides.len();
        }

        out
    }

    fn diagnostic(&self, token: &str, reason: SkipReason) -> Diagnostic {
        Diagnostic {
            line: self.line,
            token: token.to_string(),
            reason,
        }
    }
}

/// `min(scale * vol / 100, 100)`, truncated into 0..=100
pub fn scale_velocity(scale: f64, vol: u32) -> u8 {
    let scaled = (scale * f64::from(vol) * 0.01).min(100.0);
    scaled.clamp(0.0, 100.0) as u8
}

/// Bare unsigned integer, e.g. `16`; saturates at `u32::MAX`
fn parse_position(token: &str) -> Option<u32> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // All digits, so the only failure left is overflow
    Some(token.parse().unwrap_or(u32::MAX))
}

/// Digits with at most one decimal point, e.g. `8`, `12.5`, `.5`
fn parse_number(token: &str) -> Option<f64> {
    let digits = token.bytes().filter(u8::is_ascii_digit).count();
    let dots = token.bytes().filter(|b| *b == b'.').count();
    if digits == 0 || dots > 1 || digits + dots != token.len() {
        return None;
    }
    token.parse().ok()
}
