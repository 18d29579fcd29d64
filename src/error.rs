//! # Error Types
//!
//! This module defines all error types for the Monure compiler.
//!
//! The only thing that stops a parse is a configuration assignment whose value
//! does not fit the key's type. Everything else in the notation degrades token
//! by token and is reported through [`Diagnostic`](crate::Diagnostic)s instead
//! (see [`SkipReason`]).
//!
//! ## Error Types
//! - `InvalidConfigValue` - a `KEY: VALUE` line whose value cannot be converted
//! - `Io` - reading or writing files in the render stage
//! - `Synth` - the external synthesizer exited unsuccessfully
//!
//! ## Usage
//! ```rust
//! use monure::{parse, MonureError};
//!
//! match parse("BPM: fast\nC D E") {
//!     Ok(score) => println!("{} patterns", score.patterns.len()),
//!     Err(MonureError::InvalidConfigValue { line, key, value }) => {
//!         eprintln!("line {}: {} cannot be {}", line, key, value);
//!     }
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonureError {
    /// A configuration value that does not convert to the key's declared type.
    ///
    /// # Example
    /// ```
    /// # use monure::MonureError;
    /// let err = MonureError::InvalidConfigValue {
    ///     line: 3,
    ///     key: "BPM".to_string(),
    ///     value: "FAST".to_string(),
    /// };
    /// assert_eq!(err.to_string(), "Invalid configuration value at line 3: BPM: FAST");
    /// ```
    #[error("Invalid configuration value at line {line}: {key}: {value}")]
    InvalidConfigValue {
        line: usize,
        key: String,
        value: String,
    },

    /// File system or encoding failure while writing render artifacts.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The external synthesizer could not be started or exited with a failure.
    #[error("Synthesizer failed: {0}")]
    Synth(String),
}

/// Why a piece of input was skipped instead of producing events.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SkipReason {
    #[error("unrecognized pitch token")]
    UnrecognizedPitch,

    #[error("chord member does not resolve to a pitch")]
    InvalidChordMember,

    #[error("position is not followed by a pitch group")]
    DanglingPosition,
}
