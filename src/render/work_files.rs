//! Working files for a synthesizer run
//!
//! The MIDI file and tuning script only exist while FluidSynth runs. They get
//! fresh names in a scratch directory, reserved with `create_new`, so a run
//! never overwrites or deletes a file it did not create.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::time::{SystemTime, UNIX_EPOCH};

const ATTEMPTS: u32 = 16;

/// Reserved MIDI and tuning script paths, removed on drop
#[derive(Debug)]
pub struct WorkFiles {
    pub midi: PathBuf,
    pub script: PathBuf,
}

impl WorkFiles {
    /// Reserve a pair in the system temp directory
    pub fn create() -> io::Result<Self> {
        Self::create_in(&std::env::temp_dir())
    }

    /// Reserve a pair of new files in `dir`
    pub fn create_in(dir: &Path) -> io::Result<Self> {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);

        for attempt in 0..ATTEMPTS {
            let tag = format!("monure-{}-{:x}-{}", process::id(), stamp, attempt);
            let midi = dir.join(format!("{}.mid", tag));
            let script = dir.join(format!("{}.tuning.txt", tag));

            match reserve(&midi) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            }
            match reserve(&script) {
                Ok(()) => return Ok(Self { midi, script }),
                Err(e) => {
                    let _ = fs::remove_file(&midi);
                    if e.kind() != io::ErrorKind::AlreadyExists {
                        return Err(e);
                    }
                }
            }
        }

        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free working file name in {}", dir.display()),
        ))
    }
}

fn reserve(path: &Path) -> io::Result<()> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map(|_| ())
}

impl Drop for WorkFiles {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.midi);
        let _ = fs::remove_file(&self.script);
    }
}
