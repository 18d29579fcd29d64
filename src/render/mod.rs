//! # Render Module
//!
//! Everything downstream of a parsed [`Score`](crate::Score): MIDI bytes, the
//! tuning script, and the call to the external synthesizer.
//!
//! ## Sub-modules
//! - `midi` - Standard MIDI File writer (via `midly`)
//! - `tuning_script` - FluidSynth tuning commands for a retuning table
//! - `synth` - FluidSynth command line
//! - `work_files` - uniquely named scratch files for a synthesizer run
//!
//! ## Output Contract
//!
//! ### MIDI
//! - One track per track name, merged across patterns
//! - Resolution (`ticks per beat`) and tempo come from the first pattern
//! - Slots clamp into 0..=127, velocities scale from 0..=100 to 0..=127
//! - At equal ticks note-offs come before note-ons, so a note that starts
//!   exactly when another ends on the same key is not cut off
//!
//! ### Tuning script
//! ```text
//! tuning monure_nkm 0 0
//! tune 0 0 0 0.0
//! ...
//! tune 0 0 127 12700.0
//! settuning 0 0 0
//! ...
//! settuning 15 0 0
//! ```
//! FluidSynth runs this file verbatim, so the text is byte-exact.
//!
//! ## Example
//! ```rust
//! use monure::{parse, render};
//!
//! let score = parse("TUNING: 19TET\n4K1 4K2 4K3").unwrap();
//! let smf = render::midi::to_smf(&score);
//! assert_eq!(smf.tracks.len(), 1);
//!
//! let script = render::tuning_script_for_score(&score);
//! assert!(script.starts_with("tuning monure_nkm 0 0\n"));
//! ```

pub mod midi;
pub mod synth;
pub mod tuning_script;
pub mod work_files;


use std::path::Path;

use crate::error::MonureError;
use crate::score::Score;
use crate::tuning::retune_config;

pub use midi::{to_midi_bytes, to_smf, write_midi};
pub use synth::FluidSynth;
pub use work_files::WorkFiles;

/// Tuning script for the configuration the score renders with
pub fn tuning_script_for_score(score: &Score) -> String {
    tuning_script::render(&retune_config(&score.render_config()))
}

/// Write the MIDI file and tuning script, then run the synthesizer.
///
/// `midi` and `script` are working files, usually a [`WorkFiles`] pair that
/// the caller drops afterwards.
pub fn render_audio(
    score: &Score,
    synth: &FluidSynth,
    soundfont: &Path,
    midi: &Path,
    script: &Path,
    output: &Path,
) -> Result<(), MonureError> {
    write_midi(score, midi)?;
    std::fs::write(script, tuning_script_for_score(score))?;
    synth.render(script, soundfont, midi, output)
}
