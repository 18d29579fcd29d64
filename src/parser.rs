//! # Parser Module
//!
//! This module builds a [`Score`] from classified lines.
//!
//! ## Purpose
//! The parser is the second stage of the pipeline. The lexer has already
//! decided what every line is; the parser only keeps the state that spans
//! lines:
//! - the default configuration for patterns not opened yet
//! - the open pattern and the selected track name
//! - the cursor (local tick where the next un-positioned note starts)
//! - the running tick total where the next pattern will start
//!
//! ## Patterns
//! The first content line opens pattern 0 at tick 0. Every `[pattern]`
//! marker after that closes the open pattern and starts the next one at
//! `start_offset + DIV` of the closed one.
//!
//! ## Configuration
//! `KEY: VALUE` lines update the default *and* the open pattern. Notes already
//! appended keep what they were built with.
//!
//! ## Example
//! ```rust
//! use monure::parse;
//!
//! let source = r#"
//! TUNING: 19TET
//! [0:Lead]
//! 4K1 4K4 4K7
//! "#;
//!
//! let score = parse(source).unwrap();
//! let lead = score.patterns[0].track("Lead").unwrap();
//! assert_eq!(lead.notes.len(), 3);
//! assert_eq!(lead.notes[0].pitch, 95); // (4 + 1) * 19
//! ```

use crate::config::{Config, ConfigKey, Setting};
use crate::error::MonureError;
use crate::lexer::{Lexer, Line, LocatedLine};
use crate::score::{Diagnostic, Pattern, Score};
use crate::sequencer::Sequencer;

/// Track used for notes that appear before any track marker
pub const DEFAULT_TRACK: &str = "Default";

/// Parser for Monure source
pub struct Parser {
    lines: Vec<LocatedLine>,
    defaults: Config,
    patterns: Vec<Pattern>,
    diagnostics: Vec<Diagnostic>,
    track_name: String,
    cursor: u32,
    total_ticks: u32,
}

impl Parser {
    pub fn new(lines: Vec<LocatedLine>) -> Self {
        Self {
            lines,
            defaults: Config::default(),
            patterns: Vec::new(),
            diagnostics: Vec::new(),
            track_name: DEFAULT_TRACK.to_string(),
            cursor: 0,
            total_ticks: 0,
        }
    }

    pub fn parse_score(mut self) -> Result<Score, MonureError> {
        let lines = std::mem::take(&mut self.lines);
        for located in lines {
            self.parse_line(located)?;
        }
        Ok(Score {
            patterns: self.patterns,
            diagnostics: self.diagnostics,
        })
    }

    fn parse_line(&mut self, located: LocatedLine) -> Result<(), MonureError> {
        let number = located.number;
        match located.line {
            Line::Comment | Line::MetaOpen | Line::MetaClose => {}
            Line::MetaEntry { key, value } => {
                let name = self.track_name.clone();
                let pattern = self.current_pattern();
                let id = pattern.ensure_track(&name);
                pattern.track_mut(id).meta.insert(key, value);
            }
            Line::PatternMarker => self.next_pattern(),
            Line::Assign { key, value } => self.assign(key, &value, number)?,
            Line::TrackMarker { name, .. } => {
                self.current_pattern().ensure_track(&name);
                self.track_name = name;
                self.cursor = 0;
            }
            Line::Notes(tokens) => self.sequence(&tokens, number),
        }
        Ok(())
    }

    fn assign(&mut self, key: ConfigKey, value: &str, line: usize) -> Result<(), MonureError> {
        let setting = Setting::parse(key, value, line)?;
        self.defaults = self.defaults.with(&setting);
        if let Some(pattern) = self.patterns.last_mut() {
            pattern.config = pattern.config.with(&setting);
        }
        Ok(())
    }

    fn sequence(&mut self, tokens: &[String], line: usize) {
        let name = self.track_name.clone();
        let mut cursor = self.cursor;
        let pattern = self.current_pattern();
        let id = pattern.ensure_track(&name);

        let events = Sequencer::new(&pattern.config, pattern.start_offset, line)
            .run(tokens, &mut cursor);
        pattern.track_mut(id).notes.extend(events.notes);

        self.cursor = cursor;
        self.diagnostics.extend(events.diagnostics);
    }

    /// The open pattern, opening the first one if needed
    fn current_pattern(&mut self) -> &mut Pattern {
        if self.patterns.is_empty() {
            self.open_pattern(0);
        }
        let last = self.patterns.len() - 1;
        &mut self.patterns[last]
    }

    /// Close the open pattern (if any) and start the next one after it
    fn next_pattern(&mut self) {
        let Some(open) = self.patterns.last() else {
            self.open_pattern(0);
            return;
        };
        self.total_ticks = self.total_ticks.saturating_add(open.config.div);
        self.open_pattern(self.total_ticks);
    }

    fn open_pattern(&mut self, start_offset: u32) {
        let index = self.patterns.len();
        self.patterns
            .push(Pattern::new(index, start_offset, self.defaults.clone()));
        self.cursor = 0;
    }
}

/// Parse Monure source into a score.
///
/// Whitespace-only input gives an empty score. The only error is a
/// configuration value that does not fit its key.
pub fn parse(source: &str) -> Result<Score, MonureError> {
    let lines = Lexer::new(source).tokenize();
    Parser::new(lines).parse_score()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SkipReason;

    #[test]
    fn test_empty_input() {
        let score = parse("").unwrap();
        assert!(score.patterns.is_empty());
        let score = parse("  \n\t\n").unwrap();
        assert!(score.patterns.is_empty());
    }

    #[test]
    fn test_comments_only() {
        let score = parse("# nothing\n# here").unwrap();
        assert!(score.patterns.is_empty());
    }

    #[test]
    fn test_notes_open_default_track() {
        let score = parse("C4 D4").unwrap();
        assert_eq!(score.patterns.len(), 1);
        let track = score.patterns[0].track(DEFAULT_TRACK).unwrap();
        assert_eq!(track.notes.len(), 2);
    }

    #[test]
    fn test_config_before_first_pattern() {
        let score = parse("BPM: 90\nDIV: 4\nC4").unwrap();
        assert_eq!(score.patterns[0].config.bpm, 90);
        assert_eq!(score.patterns[0].config.div, 4);
    }

    #[test]
    fn test_config_alone_opens_no_pattern() {
        let score = parse("BPM: 90").unwrap();
        assert!(score.patterns.is_empty());
    }

    #[test]
    fn test_config_is_not_retroactive() {
        let score = parse("C4\nVOL: 50\nD4").unwrap();
        let notes = &score.patterns[0].tracks()[0].notes;
        assert_eq!(notes[0].velocity, 80);
        assert_eq!(notes[1].velocity, 50);
    }

    #[test]
    fn test_config_carries_to_later_patterns() {
        let score = parse("C4\nVOL: 50\n[pattern]\nD4").unwrap();
        assert_eq!(score.patterns[1].config.vol, 50);
    }

    #[test]
    fn test_pattern_snapshots_are_independent() {
        let score = parse("C4\n[pattern]\nBPM: 60\nC4").unwrap();
        assert_eq!(score.patterns[0].config.bpm, 130);
        assert_eq!(score.patterns[1].config.bpm, 60);
    }

    #[test]
    fn test_empty_patterns_chain_by_div() {
        let score = parse("DIV: 8\n[pattern]\n[pattern]").unwrap();
        assert_eq!(score.patterns.len(), 2);
        assert_eq!(score.patterns[0].start_offset, 0);
        assert_eq!(score.patterns[1].start_offset, 8);
    }

    #[test]
    fn test_offset_uses_closed_pattern_div() {
        let score = parse("C4\nDIV: 32\n[pattern]\nDIV: 4\nC4\n[pattern]\nC4").unwrap();
        let offsets: Vec<_> = score.patterns.iter().map(|p| p.start_offset).collect();
        assert_eq!(offsets, vec![0, 32, 36]);
    }

    #[test]
    fn test_pattern_notes_are_absolute() {
        let score = parse("DIV: 16\nC4 D4\n[pattern]\nE4").unwrap();
        let second = &score.patterns[1];
        assert_eq!(second.tracks()[0].notes[0].abs_tick, 16);
    }

    #[test]
    fn test_track_marker_resets_cursor() {
        let score = parse("[0:Lead]\nC4 D4\n[1:Bass]\nC3\n[0:Lead]\nE4").unwrap();
        let pattern = &score.patterns[0];
        let lead = pattern.track("Lead").unwrap();
        let bass = pattern.track("Bass").unwrap();
        assert_eq!(bass.notes[0].abs_tick, 0);
        // Reselecting Lead starts over at 0
        let ticks: Vec<_> = lead.notes.iter().map(|n| n.abs_tick).collect();
        assert_eq!(ticks, vec![0, 8, 0]);
    }

    #[test]
    fn test_cursor_continues_across_lines() {
        let score = parse("C4 D4\nE4").unwrap();
        let ticks: Vec<_> = score.patterns[0].tracks()[0]
            .notes
            .iter()
            .map(|n| n.abs_tick)
            .collect();
        assert_eq!(ticks, vec![0, 8, 16]);
    }

    #[test]
    fn test_track_name_survives_pattern_change() {
        let score = parse("[0:Lead]\nC4\n[pattern]\nD4").unwrap();
        assert!(score.patterns[1].track("Lead").is_some());
        assert!(score.patterns[1].track(DEFAULT_TRACK).is_none());
    }

    #[test]
    fn test_meta_block() {
        let source = "[0:Piano]\n<\nProgram: 0\nChannel: Left Hand\n>\nC4";
        let score = parse(source).unwrap();
        let piano = score.patterns[0].track("Piano").unwrap();
        assert_eq!(piano.meta.get("Program"), Some(&"0".to_string()));
        assert_eq!(piano.meta.get("Channel"), Some(&"Left Hand".to_string()));
        assert_eq!(piano.notes.len(), 1);
    }

    #[test]
    fn test_meta_block_before_any_pattern() {
        let score = parse("<\nsynth: pad\n>").unwrap();
        let track = score.patterns[0].track(DEFAULT_TRACK).unwrap();
        assert_eq!(track.meta.get("synth"), Some(&"pad".to_string()));
    }

    #[test]
    fn test_tuning_label_uppercased() {
        let score = parse("tuning: 19edo\nC4").unwrap();
        assert_eq!(score.patterns[0].config.tuning.label, "19EDO");
        assert_eq!(score.patterns[0].config.tuning.steps, 19);
    }

    #[test]
    fn test_unknown_key_is_sequenced_as_notes() {
        let score = parse("SWING: 60\nC4").unwrap();
        assert_eq!(score.patterns[0].config, Config::default());
        // "SWING:" is an unknown pitch, "60" a position with nothing after it
        let reasons: Vec<_> = score.diagnostics.iter().map(|d| d.reason.clone()).collect();
        assert_eq!(
            reasons,
            vec![SkipReason::UnrecognizedPitch, SkipReason::DanglingPosition]
        );
        assert_eq!(score.note_count(), 1);
    }

    #[test]
    fn test_colon_in_note_line_keeps_other_notes() {
        let score = parse("C4 D4 E4:").unwrap();
        let notes = &score.patterns[0].tracks()[0].notes;
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[1].abs_tick, 8);
        assert_eq!(score.diagnostics.len(), 1);
        assert_eq!(score.diagnostics[0].token, "E4:");
    }

    #[test]
    fn test_invalid_config_value_is_fatal() {
        let result = parse("C4\nBPM: fast\nD4");
        match result {
            Err(MonureError::InvalidConfigValue { line, key, value }) => {
                assert_eq!(line, 2);
                assert_eq!(key, "BPM");
                assert_eq!(value, "FAST");
            }
            _ => panic!("Expected InvalidConfigValue"),
        }
    }

    #[test]
    fn test_diagnostics_carry_line_numbers() {
        let score = parse("C4\n\nC4 Z9 D4").unwrap();
        assert_eq!(score.diagnostics.len(), 1);
        assert_eq!(score.diagnostics[0].line, 3);
        assert_eq!(score.diagnostics[0].token, "Z9");
    }

    #[test]
    fn test_pattern_indices() {
        let score = parse("C4\n[pattern]\nC4\n[pattern]\nC4").unwrap();
        let indices: Vec<_> = score.patterns.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }
}
