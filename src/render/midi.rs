//! Standard MIDI File output
//!
//! Tracks with the same name are merged across patterns (their ticks are
//! already absolute). Every track gets a name event, the tempo of the first
//! pattern, and its notes as on/off pairs on channel 0.

use midly::{
    num::{u15, u24, u28, u4, u7},
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
};
use std::path::Path;

use crate::error::MonureError;
use crate::score::{NoteEvent, Score};

const CHANNEL: u8 = 0;

/// Largest delta time a variable-length quantity can hold
const MAX_DELTA: u32 = 0x0FFF_FFFF;

/// Clamp a virtual slot onto the MIDI key range
pub fn midi_key(pitch: i32) -> u8 {
    pitch.clamp(0, 127) as u8
}

/// Scale a 0-100 velocity onto 0-127
pub fn midi_velocity(velocity: u8) -> u8 {
    ((f64::from(velocity) * 1.27) as u8).min(127)
}

/// Microseconds per beat, as stored in the tempo meta event
pub fn tempo_micros(bpm: u32) -> u32 {
    let micros = (60_000_000.0 / f64::from(bpm.max(1))).round() as u32;
    micros.clamp(1, 0x00FF_FFFF)
}

/// Notes of every track, merged by name in order of first appearance
pub fn merge_tracks(score: &Score) -> Vec<(&str, Vec<NoteEvent>)> {
    let mut merged: Vec<(&str, Vec<NoteEvent>)> = Vec::new();
    for pattern in &score.patterns {
        for track in pattern.tracks() {
            match merged.iter_mut().find(|(name, _)| *name == track.name) {
                Some((_, notes)) => notes.extend_from_slice(&track.notes),
                None => merged.push((track.name.as_str(), track.notes.clone())),
            }
        }
    }
    merged
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct NoteSwitch {
    tick: u32,
    on: bool,
    key: u8,
    vel: u8,
}

/// On/off switches for a track, note-offs first when ticks tie
fn switches(notes: &[NoteEvent]) -> Vec<NoteSwitch> {
    let mut events = Vec::with_capacity(notes.len() * 2);
    for note in notes {
        let key = midi_key(note.pitch);
        events.push(NoteSwitch {
            tick: note.abs_tick,
            on: true,
            key,
            vel: midi_velocity(note.velocity),
        });
        events.push(NoteSwitch {
            tick: note.abs_tick.saturating_add(note.length),
            on: false,
            key,
            vel: 0,
        });
    }
    events.sort_by_key(|e| (e.tick, e.on));
    events
}

/// Convert a Score to an in-memory SMF
pub fn to_smf(score: &Score) -> Smf<'_> {
    let config = score.render_config();
    let ticks_per_beat = config.div.clamp(1, 0x7FFF) as u16;
    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(ticks_per_beat)),
    ));
    let tempo = tempo_micros(config.bpm);

    for (name, notes) in merge_tracks(score) {
        let mut track: Track<'_> = Vec::new();
        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::TrackName(name.as_bytes())),
        });
        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(tempo))),
        });

        let mut last_tick = 0;
        for switch in switches(&notes) {
            let delta = (switch.tick - last_tick).min(MAX_DELTA);
            let message = if switch.on {
                MidiMessage::NoteOn {
                    key: u7::new(switch.key),
                    vel: u7::new(switch.vel),
                }
            } else {
                MidiMessage::NoteOff {
                    key: u7::new(switch.key),
                    vel: u7::new(0),
                }
            };
            track.push(TrackEvent {
                delta: u28::new(delta),
                kind: TrackEventKind::Midi {
                    channel: u4::new(CHANNEL),
                    message,
                },
            });
            last_tick = switch.tick;
        }

        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        });
        smf.tracks.push(track);
    }

    smf
}

/// Encode a Score as SMF bytes
pub fn to_midi_bytes(score: &Score) -> Result<Vec<u8>, MonureError> {
    let mut buf = Vec::new();
    to_smf(score).write_std(&mut buf)?;
    Ok(buf)
}

/// Convert a Score to MIDI and write it to a file
pub fn write_midi(score: &Score, path: &Path) -> Result<(), MonureError> {
    let bytes = to_midi_bytes(score)?;
    std::fs::write(path, bytes)?;
    Ok(())
}
