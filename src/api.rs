//! # Public API
//!
//! Main entry points for the Monure compiler library.
//!
//! ## Compilation Functions
//!
//! - [`compile()`] - source to Standard MIDI File bytes
//! - [`tuning_script()`] - source to the FluidSynth tuning script
//! - [`parse()`](crate::parse) - source to a [`Score`](crate::Score) for inspection
//!
//! ## Typical Usage
//!
//! ```rust
//! use monure::{compile, tuning_script};
//!
//! let source = r#"
//! BPM: 120
//! TUNING: 6TET
//! [0:Lead]
//! 4K1 4K2 4K3 4K4 16
//! "#;
//!
//! let midi = compile(source)?;
//! let script = tuning_script(source)?;
//! // Write both out and hand them to a synthesizer
//! # assert_eq!(&midi[..4], b"MThd");
//! # assert!(script.contains("tune 0 0 69 6900.0"));
//! # Ok::<(), monure::MonureError>(())
//! ```

use crate::{parse, render, MonureError};

/// Compile Monure source to Standard MIDI File bytes.
///
/// # Pipeline
/// 1. Classify lines with the lexer
/// 2. Build patterns and note events
/// 3. Merge tracks and encode as SMF format 1
///
/// Skipped tokens are dropped silently here; use [`parse()`](crate::parse)
/// to see them.
///
/// # Errors
/// Returns [`MonureError::InvalidConfigValue`] for a configuration value that
/// does not fit its key.
pub fn compile(source: &str) -> Result<Vec<u8>, MonureError> {
    let score = parse(source)?;
    render::to_midi_bytes(&score)
}

/// Build the FluidSynth tuning script for the tuning of the first pattern.
///
/// # Example
/// ```rust
/// use monure::tuning_script;
///
/// let script = tuning_script("BASE_PITCH: 220\nC4")?;
/// assert!(script.contains("tune 0 0 69 5700.0\n"));
/// # Ok::<(), monure::MonureError>(())
/// ```
pub fn tuning_script(source: &str) -> Result<String, MonureError> {
    let score = parse(source)?;
    Ok(render::tuning_script_for_score(&score))
}
