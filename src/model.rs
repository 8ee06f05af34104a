//! Data model for the musical sequence being printed.
//!
//! These structures capture the in-memory view the layout engine needs:
//! a shared measure timeline (tick boundaries, time signatures) and one
//! or more tracks of notes on that timeline.  The interactive editors,
//! MIDI transport and file I/O that normally populate them live outside
//! this crate.

use serde::{Deserialize, Serialize};

/// A time signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    /// Numerator (e.g., 3 in 3/4)
    pub numerator: i32,
    /// Denominator (e.g., 4 in 3/4)
    pub denominator: i32,
}

impl TimeSignature {
    pub fn new(numerator: i32, denominator: i32) -> Self {
        Self { numerator, denominator }
    }

    /// Length of one measure in this signature, in ticks.
    /// `ticks_per_beat` is the resolution of a quarter note.
    pub fn measure_ticks(&self, ticks_per_beat: i32) -> i32 {
        self.numerator * ticks_per_beat * 4 / self.denominator
    }
}

/// Read-only view over the sequence's measure boundaries.
///
/// Built once from the tick resolution, the measure count and the ordered
/// list of time-signature changes; all tracks in a sequence share it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasureTimeline {
    ticks_per_beat: i32,
    /// Tick at which each measure starts; one extra entry holds the end
    /// of the final measure.
    measure_starts: Vec<i32>,
    /// Effective time signature for each measure.
    signatures: Vec<TimeSignature>,
}

impl MeasureTimeline {
    /// Build the timeline.  `signature_changes` is an ordered list of
    /// `(measure_index, signature)` pairs; a 4/4 signature is assumed
    /// before the first change.
    pub fn new(
        ticks_per_beat: i32,
        measure_count: usize,
        signature_changes: &[(usize, TimeSignature)],
    ) -> Self {
        let mut measure_starts = Vec::with_capacity(measure_count + 1);
        let mut signatures = Vec::with_capacity(measure_count);

        let mut current = TimeSignature::new(4, 4);
        let mut change_idx = 0;
        let mut tick = 0;

        for measure in 0..measure_count {
            while change_idx < signature_changes.len()
                && signature_changes[change_idx].0 <= measure
            {
                current = signature_changes[change_idx].1;
                change_idx += 1;
            }
            measure_starts.push(tick);
            signatures.push(current);
            tick += current.measure_ticks(ticks_per_beat);
        }
        measure_starts.push(tick);

        Self { ticks_per_beat, measure_starts, signatures }
    }

    pub fn ticks_per_beat(&self) -> i32 {
        self.ticks_per_beat
    }

    pub fn measure_count(&self) -> usize {
        self.signatures.len()
    }

    /// First tick of measure `i` (inclusive).
    pub fn first_tick(&self, i: usize) -> i32 {
        self.measure_starts[i]
    }

    /// Last tick of measure `i` (exclusive).
    pub fn last_tick(&self, i: usize) -> i32 {
        self.measure_starts[i + 1]
    }

    pub fn time_signature_at(&self, i: usize) -> TimeSignature {
        self.signatures[i]
    }

    /// Whether the time signature differs from the previous measure's.
    /// The initial signature at measure 0 is not a change.
    pub fn signature_changes_at(&self, i: usize) -> bool {
        i > 0 && self.signatures[i] != self.signatures[i - 1]
    }

    /// Whether every measure in the piece has the same tick length.
    pub fn is_measure_length_constant(&self) -> bool {
        let tpb = self.ticks_per_beat;
        self.signatures
            .iter()
            .all(|s| s.measure_ticks(tpb) == self.signatures[0].measure_ticks(tpb))
    }
}

/// The notation mode a track is edited (and printed) in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotationType {
    Tablature,
    Score,
    Drum,
    Controller,
}

/// A single note on the shared tick timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Onset tick (inclusive)
    pub start_tick: i32,
    /// End tick (exclusive)
    pub end_tick: i32,
    /// MIDI pitch (middle C = 60)
    pub pitch: i32,
    /// Fret number for tablature tracks; -1 when not applicable
    pub fret: i32,
    /// String number for tablature tracks (0 = highest); -1 when not applicable
    pub string: i32,
}

impl Note {
    pub fn new(start_tick: i32, end_tick: i32, pitch: i32) -> Self {
        Self { start_tick, end_tick, pitch, fret: -1, string: -1 }
    }

    pub fn with_fret(start_tick: i32, end_tick: i32, pitch: i32, fret: i32, string: i32) -> Self {
        Self { start_tick, end_tick, pitch, fret, string }
    }
}

/// A controller event (volume, pan, pitch bend...).  Carried on tracks for
/// interface completeness; the layout engine itself only looks at notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerEvent {
    pub tick: i32,
    pub controller: i32,
    pub value: i32,
}

/// Standard six-string guitar tuning (E4 B3 G3 D3 A2 E2).
pub const STANDARD_TUNING: [i32; 6] = [64, 59, 55, 50, 45, 40];

/// One track of the sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    /// Track name (shown in diagnostics and headers)
    pub name: String,
    /// Notation mode this track is rendered in
    pub notation: NotationType,
    /// Notes, kept sorted by start tick
    notes: Vec<Note>,
    /// Controller events on this track
    pub controller_events: Vec<ControllerEvent>,
    /// Open-string pitches for tablature tracks, highest string first.
    /// Empty for non-tablature tracks.
    pub tuning: Vec<i32>,
}

impl Track {
    pub fn new(name: impl Into<String>, notation: NotationType, mut notes: Vec<Note>) -> Self {
        notes.sort_by_key(|n| n.start_tick);
        let tuning = if notation == NotationType::Tablature {
            STANDARD_TUNING.to_vec()
        } else {
            Vec::new()
        };
        Self {
            name: name.into(),
            notation,
            notes,
            controller_events: Vec::new(),
            tuning,
        }
    }

    pub fn note_count(&self) -> usize {
        self.notes.len()
    }

    pub fn note_start_tick(&self, i: usize) -> i32 {
        self.notes[i].start_tick
    }

    pub fn note_end_tick(&self, i: usize) -> i32 {
        self.notes[i].end_tick
    }

    pub fn note_pitch(&self, i: usize) -> i32 {
        self.notes[i].pitch
    }

    pub fn note_fret(&self, i: usize) -> i32 {
        self.notes[i].fret
    }

    pub fn note_string(&self, i: usize) -> i32 {
        self.notes[i].string
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Number of strings drawn for this track's tablature.
    pub fn string_count(&self) -> usize {
        if self.tuning.is_empty() { 6 } else { self.tuning.len() }
    }

    /// First and last note index whose onset lies in `[from, to)`,
    /// or None if the range is silent on this track.
    pub fn notes_in_range(&self, from: i32, to: i32) -> Option<(usize, usize)> {
        let first = self.notes.partition_point(|n| n.start_tick < from);
        let last = self.notes.partition_point(|n| n.start_tick < to);
        if first == last {
            None
        } else {
            Some((first, last - 1))
        }
    }
}

/// A complete sequence: the shared timeline plus its tracks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sequence {
    /// Title of the piece, used for the printed page header
    pub title: Option<String>,
    /// Tick resolution of a quarter note
    pub ticks_per_beat: i32,
    /// Shared measure timeline
    pub timeline: MeasureTimeline,
    /// Tracks on the timeline
    pub tracks: Vec<Track>,
}

impl Sequence {
    pub fn new(ticks_per_beat: i32, timeline: MeasureTimeline, tracks: Vec<Track>) -> Self {
        Self { title: None, ticks_per_beat, timeline, tracks }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}
