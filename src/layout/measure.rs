//! Measure-for-print — one record per measure index, holding its tick
//! bounds, the per-track note ranges inside it, the repetition
//! back-reference and the owned tick-placement solver.

use serde::Serialize;

use crate::model::{Sequence, Track};

use super::placement::TickPlacementSolver;

/// Per-track note range inside one measure.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MeasureTrackRef {
    /// Index into the sequence's track list
    pub track: usize,
    /// First/last note of the track whose onset falls in the measure
    pub first_note: Option<usize>,
    pub last_note: Option<usize>,
}

impl MeasureTrackRef {
    fn new(track_id: usize, track: &Track, first_tick: i32, last_tick: i32) -> Self {
        let range = track.notes_in_range(first_tick, last_tick);
        Self {
            track: track_id,
            first_note: range.map(|(f, _)| f),
            last_note: range.map(|(_, l)| l),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.first_note.is_none()
    }
}

/// One measure as prepared for printing.
#[derive(Debug, Clone, Serialize)]
pub struct PrintMeasure {
    /// Measure index in the shared timeline
    pub id: usize,
    /// First tick (inclusive)
    pub first_tick: i32,
    /// Last tick (exclusive)
    pub last_tick: i32,
    /// Earliest prior measure with identical note content across all
    /// printed tracks, if repetition detection found one.
    pub first_similar_measure: Option<usize>,
    /// Note ranges per printed track
    pub track_refs: Vec<MeasureTrackRef>,
    /// Relative placement of every distinguishable tick in this measure
    pub placement: TickPlacementSolver,
}

impl PrintMeasure {
    pub(super) fn new(
        id: usize,
        first_tick: i32,
        last_tick: i32,
        ticks_per_beat: i32,
        sequence: &Sequence,
        track_ids: &[usize],
    ) -> Self {
        let track_refs = track_ids
            .iter()
            .map(|&t| MeasureTrackRef::new(t, &sequence.tracks[t], first_tick, last_tick))
            .collect();
        Self {
            id,
            first_tick,
            last_tick,
            first_similar_measure: None,
            track_refs,
            placement: TickPlacementSolver::new(first_tick, last_tick, ticks_per_beat),
        }
    }

    /// No notes in any printed track.
    pub fn is_empty(&self) -> bool {
        self.track_refs.iter().all(|r| r.is_empty())
    }

    /// The note range of `track` inside this measure.
    pub fn track_ref(&self, track: usize) -> Option<&MeasureTrackRef> {
        self.track_refs.iter().find(|r| r.track == track)
    }

    /// Whether this measure's note content is identical to `other`'s
    /// across every printed track: same note count, same tick offsets
    /// relative to the measure start, same pitch, fret and string.
    ///
    /// Empty measures never compare equal to anything; they are tagged
    /// as empty, not as repeats.
    pub fn same_content_as(&self, other: &PrintMeasure, sequence: &Sequence) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }

        for (a, b) in self.track_refs.iter().zip(&other.track_refs) {
            debug_assert_eq!(a.track, b.track);
            let track = &sequence.tracks[a.track];

            let (a_first, a_last, b_first, b_last) =
                match (a.first_note, a.last_note, b.first_note, b.last_note) {
                    (None, _, None, _) => continue,
                    (Some(af), Some(al), Some(bf), Some(bl)) => (af, al, bf, bl),
                    _ => return false,
                };
            if a_last - a_first != b_last - b_first {
                return false;
            }

            for offset in 0..=(a_last - a_first) {
                let na = track.notes()[a_first + offset];
                let nb = track.notes()[b_first + offset];
                if na.start_tick - self.first_tick != nb.start_tick - other.first_tick
                    || na.end_tick - self.first_tick != nb.end_tick - other.first_tick
                    || na.pitch != nb.pitch
                    || na.fret != nb.fret
                    || na.string != nb.string
                {
                    return false;
                }
            }
        }
        true
    }
}
