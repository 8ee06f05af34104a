//! Standard-notation renderer — a five-line staff with filled noteheads
//! placed by diatonic pitch step.  Drum tracks print through this
//! renderer as well; their pitches map onto staff positions the same way.

use crate::model::Track;

use super::constants::*;
use super::element::{ElementKind, LayoutLine, LineTrackRef};
use super::measure::{MeasureTrackRef, PrintMeasure};
use super::placement::TickPlacementSolver;
use super::printable::{
    continue_with_next_element, draw_vertical_divider, get_note_print_x, EditorPrintable,
};
use super::surface::{PrintSurface, TextAnchor};

/// Horizontal room one notehead needs.
const NOTEHEAD_SYMBOL_WIDTH: f64 = 11.0;

/// Diatonic step per pitch class (C..B); accidentals land on the
/// natural's line.
const STEP_OF_PITCH_CLASS: [i32; 12] = [0, 0, 1, 1, 2, 3, 3, 4, 4, 5, 5, 6];

/// Diatonic step of E4, the bottom line of the treble staff.
const BOTTOM_LINE_STEP: i32 = 4 * 7 + 2;

pub(super) struct ScorePrintable;

impl EditorPrintable for ScorePrintable {
    fn add_used_ticks(
        &self,
        track_id: usize,
        track: &Track,
        measure_ref: &MeasureTrackRef,
        solver: &mut TickPlacementSolver,
    ) {
        let (Some(first), Some(last)) = (measure_ref.first_note, measure_ref.last_note) else {
            return;
        };
        for i in first..=last {
            solver.add_symbol(
                track.note_start_tick(i),
                track.note_end_tick(i),
                NOTEHEAD_SYMBOL_WIDTH,
                track_id,
            );
        }
    }

    fn nominal_height(&self, _track: &Track) -> i32 {
        SCORE_LEVEL_HEIGHT
    }

    fn draw_track(
        &self,
        track: &Track,
        line: &LayoutLine,
        track_ref: &LineTrackRef,
        measures: &[PrintMeasure],
        surface: &mut dyn PrintSurface,
    ) {
        // The staff occupies the middle of the band; pitches above and
        // below spill into the rest.
        let band = track_ref.y1 - track_ref.y0;
        let staff_height = band * 0.5;
        let staff_top = track_ref.y0 + (band - staff_height) / 2.0;
        let line_spacing = staff_height / 4.0;
        let bottom_line_y = staff_top + staff_height;

        for s in 0..5 {
            let y = staff_top + s as f64 * line_spacing;
            surface.draw_line(track_ref.x0, y, track_ref.x1, y, INK_COLOR, STAFF_LINE_WIDTH);
        }

        for idx in 0..line.elements.len() {
            let Some(element) =
                continue_with_next_element(line, track_ref, measures, idx, surface)
            else {
                break;
            };
            draw_vertical_divider(element, staff_top, bottom_line_y, surface);

            if element.kind != ElementKind::SingleMeasure {
                continue;
            }
            let Some(m) = element.measure else { continue };
            let Some(range) = measures[m].track_ref(track_ref.track).copied() else {
                continue;
            };
            let (Some(first), Some(last)) = (range.first_note, range.last_note) else {
                continue;
            };

            for i in first..=last {
                let Some((x_from, x_to)) = get_note_print_x(track, line, measures, i) else {
                    continue;
                };
                let x = (x_from + x_to) / 2.0;
                let step = diatonic_step(track.note_pitch(i));
                let y = bottom_line_y
                    - (step - BOTTOM_LINE_STEP) as f64 * line_spacing / 2.0;
                draw_notehead(x, y, line_spacing, surface);
            }
        }

        surface.draw_line(
            track_ref.x1,
            staff_top,
            track_ref.x1,
            bottom_line_y,
            INK_COLOR,
            DIVIDER_WIDTH,
        );

        if let Some(header) = line.elements.iter().find(|e| e.kind == ElementKind::LineHeader) {
            surface.draw_text(
                header.x_from + 6.0,
                staff_top + staff_height * 0.7,
                &track.name,
                BODY_TEXT_SIZE,
                false,
                INK_COLOR,
                TextAnchor::Start,
            );
        }
    }
}

/// Diatonic staff step of a MIDI pitch (octaves of 7 steps).
fn diatonic_step(pitch: i32) -> i32 {
    let octave = pitch.div_euclid(12) - 1;
    octave * 7 + STEP_OF_PITCH_CLASS[pitch.rem_euclid(12) as usize]
}

/// A filled notehead, slightly wider than tall.
fn draw_notehead(x: f64, y: f64, line_spacing: f64, surface: &mut dyn PrintSurface) {
    let h = line_spacing * 0.9;
    let w = h * 1.3;
    surface.draw_rect(x - w / 2.0, y - h / 2.0, w, h, INK_COLOR);
}
