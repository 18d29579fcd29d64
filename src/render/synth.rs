//! FluidSynth invocation
//!
//! Renders a MIDI file to audio with a soundfont, applying a tuning script
//! first. Building the command is separate from running it so the argument
//! list can be checked without FluidSynth installed.

use std::path::Path;
use std::process::Command;

use crate::error::MonureError;

/// Output gain passed with `-g`
pub const DEFAULT_GAIN: f32 = 1.2;

/// How to call the external synthesizer
#[derive(Debug, Clone)]
pub struct FluidSynth {
    pub program: String,
    pub gain: f32,
}

impl Default for FluidSynth {
    fn default() -> Self {
        Self {
            program: "fluidsynth".to_string(),
            gain: DEFAULT_GAIN,
        }
    }
}

impl FluidSynth {
    /// `fluidsynth -ni -g <gain> -f <script> -F <output> <soundfont> <midi>`
    pub fn command(&self, script: &Path, soundfont: &Path, midi: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-ni")
            .arg("-g")
            .arg(self.gain.to_string())
            .arg("-f")
            .arg(script)
            .arg("-F")
            .arg(output)
            .arg(soundfont)
            .arg(midi);
        cmd
    }

    /// Run the synthesizer and wait for it
    pub fn render(
        &self,
        script: &Path,
        soundfont: &Path,
        midi: &Path,
        output: &Path,
    ) -> Result<(), MonureError> {
        let result = self
            .command(script, soundfont, midi, output)
            .output()
            .map_err(|e| MonureError::Synth(format!("could not start '{}': {}", self.program, e)))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(MonureError::Synth(format!(
                "'{}' exited with {}: {}",
                self.program,
                result.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}
