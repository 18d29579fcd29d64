//! # Score Types
//!
//! This module defines the parsed form of a Monure document.
//!
//! ## Type Hierarchy
//! ```text
//! Score
//!   ├── Vec<Pattern>
//!   │     ├── index, start_offset
//!   │     ├── config: Config (snapshot, see `config`)
//!   │     └── Vec<Track> (+ name -> index lookup)
//!   │           ├── name
//!   │           ├── meta: BTreeMap<String, String>
//!   │           └── Vec<NoteEvent> (append order, not sorted)
//!   │                 └── abs_tick, pitch, length, velocity
//!   └── Vec<Diagnostic> (tokens that were skipped)
//! ```
//!
//! ## Timeline
//! All ticks are absolute. Pattern `k` starts where pattern `k - 1` started
//! plus that pattern's `DIV`, so patterns sit on one shared axis and the
//! MIDI writer can merge same-named tracks without re-offsetting anything.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::config::Config;
use crate::error::SkipReason;

/// A single sounding note
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NoteEvent {
    pub abs_tick: u32,
    pub pitch: i32, // virtual slot
    pub length: u32,
    pub velocity: u8, // 0-100
}

/// A named voice inside a pattern
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    pub name: String,
    pub meta: BTreeMap<String, String>,
    pub notes: Vec<NoteEvent>,
}

impl Track {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            meta: BTreeMap::new(),
            notes: Vec::new(),
        }
    }
}

/// Handle to a track within its pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackId(usize);

/// A block of tracks sharing one configuration snapshot
#[derive(Debug, Clone, Serialize)]
pub struct Pattern {
    pub index: usize,
    pub start_offset: u32,
    pub config: Config,
    tracks: Vec<Track>,
    #[serde(skip)]
    by_name: HashMap<String, TrackId>,
}

impl Pattern {
    pub fn new(index: usize, start_offset: u32, config: Config) -> Self {
        Self {
            index,
            start_offset,
            config,
            tracks: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Get the track with this name, creating it if needed
    pub fn ensure_track(&mut self, name: &str) -> TrackId {
        if let Some(id) = self.by_name.get(name) {
            return *id;
        }
        let id = TrackId(self.tracks.len());
        self.tracks.push(Track::new(name));
        self.by_name.insert(name.to_string(), id);
        id
    }

    pub fn track_mut(&mut self, id: TrackId) -> &mut Track {
        &mut self.tracks[id.0]
    }

    /// Tracks in the order they were first referenced
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track(&self, name: &str) -> Option<&Track> {
        self.by_name.get(name).map(|id| &self.tracks[id.0])
    }
}

/// A token that was skipped during parsing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub line: usize,
    pub token: String,
    #[serde(serialize_with = "reason_text")]
    pub reason: SkipReason,
}

fn reason_text<S: serde::Serializer>(reason: &SkipReason, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(reason)
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: '{}': {}", self.line, self.token, self.reason)
    }
}

/// Parsed Monure document
#[derive(Debug, Clone, Default, Serialize)]
pub struct Score {
    pub patterns: Vec<Pattern>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Score {
    /// Configuration used for tempo, resolution and tuning on output.
    ///
    /// The first pattern decides; an empty score uses the defaults.
    pub fn render_config(&self) -> Config {
        self.patterns
            .first()
            .map(|p| p.config.clone())
            .unwrap_or_default()
    }

    /// Total number of note events across all patterns
    pub fn note_count(&self) -> usize {
        self.patterns
            .iter()
            .flat_map(|p| p.tracks())
            .map(|t| t.notes.len())
            .sum()
    }

    /// Dump the full structure as YAML
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

/// Short human-readable overview: each non-empty pattern with the first
/// three notes of every track
impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(60);
        for (i, pattern) in self.patterns.iter().enumerate() {
            if pattern.tracks.is_empty() {
                continue;
            }
            let config = &pattern.config;
            writeln!(f)?;
            writeln!(f, "{}", rule)?;
            writeln!(
                f,
                " [Monure Pattern {}] Start: {} | Tuning: {} | A4: {:?}Hz",
                i + 1,
                pattern.start_offset,
                config.tuning.label,
                config.base_pitch
            )?;
            writeln!(f, "{}", rule)?;
            for track in &pattern.tracks {
                writeln!(f)?;
                writeln!(f, "  >> Track: [{}]", track.name)?;
                for note in track.notes.iter().take(3) {
                    writeln!(
                        f,
                        "     Tick: {:<5} | MidiKey: {:<4} | Vol: {}",
                        note.abs_tick, note.pitch, note.velocity
                    )?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(abs_tick: u32, pitch: i32) -> NoteEvent {
        NoteEvent {
            abs_tick,
            pitch,
            length: 8,
            velocity: 80,
        }
    }

    #[test]
    fn test_ensure_track_reuses_by_name() {
        let mut pattern = Pattern::new(0, 0, Config::default());
        let a = pattern.ensure_track("Lead");
        let b = pattern.ensure_track("Bass");
        let again = pattern.ensure_track("Lead");
        assert_eq!(a, again);
        assert_ne!(a, b);
        let names: Vec<_> = pattern.tracks().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Lead", "Bass"]);
    }

    #[test]
    fn test_render_config_empty_score() {
        let score = Score::default();
        assert_eq!(score.render_config(), Config::default());
    }

    #[test]
    fn test_summary_skips_empty_patterns() {
        let mut score = Score::default();
        score.patterns.push(Pattern::new(0, 0, Config::default()));
        let mut second = Pattern::new(1, 8, Config::default());
        let id = second.ensure_track("Default");
        for tick in [8, 16, 24, 32] {
            second.track_mut(id).notes.push(note(tick, 60));
        }
        score.patterns.push(second);

        let summary = score.to_string();
        assert!(!summary.contains("[Monure Pattern 1]"));
        assert!(summary.contains(" [Monure Pattern 2] Start: 8 | Tuning: 12TET | A4: 440.0Hz"));
        assert!(summary.contains("  >> Track: [Default]"));
        assert!(summary.contains("     Tick: 8     | MidiKey: 60   | Vol: 80"));
        // Only the first three notes are listed
        assert!(!summary.contains("Tick: 32"));
    }

    #[test]
    fn test_yaml_dump() {
        let mut score = Score::default();
        let mut pattern = Pattern::new(0, 0, Config::default());
        let id = pattern.ensure_track("Default");
        pattern.track_mut(id).notes.push(note(0, 60));
        score.patterns.push(pattern);
        score.diagnostics.push(Diagnostic {
            line: 2,
            token: "X".to_string(),
            reason: SkipReason::UnrecognizedPitch,
        });

        let yaml = score.to_yaml().unwrap();
        assert!(yaml.contains("start_offset: 0"));
        assert!(yaml.contains("name: Default"));
        assert!(yaml.contains("abs_tick: 0"));
        assert!(yaml.contains("reason: unrecognized pitch token"));
        assert!(!yaml.contains("by_name"));
    }
}
