pub mod api;
pub mod config;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod pitch;
pub mod render;
pub mod score;
pub mod sequencer;
pub mod tuning;

pub use api::{compile, tuning_script};
pub use config::{Config, Tuning};
pub use error::*;
pub use parser::parse;
pub use pitch::{resolve_pitch, Pitch};
pub use score::*;
pub use tuning::{retune, RetuningTable};
