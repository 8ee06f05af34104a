//! Tablature renderer — guitar-style string lines with fret numbers.

use crate::model::Track;

use super::constants::*;
use super::element::{ElementKind, LayoutLine, LineTrackRef};
use super::measure::{MeasureTrackRef, PrintMeasure};
use super::placement::TickPlacementSolver;
use super::printable::{
    continue_with_next_element, draw_vertical_divider, get_note_print_x, EditorPrintable,
};
use super::surface::{PrintSurface, TextAnchor};

/// Horizontal room one fret number needs.
const FRET_SYMBOL_WIDTH: f64 = 14.0;
/// Two-digit frets take a wider symbol.
const WIDE_FRET_SYMBOL_WIDTH: f64 = 20.0;

const NOTE_NAMES: [&str; 12] =
    ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

pub(super) struct TablaturePrintable;

impl EditorPrintable for TablaturePrintable {
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
            let width = if track.note_fret(i) > 9 {
                WIDE_FRET_SYMBOL_WIDTH
            } else {
                FRET_SYMBOL_WIDTH
            };
            solver.add_symbol(track.note_start_tick(i), track.note_end_tick(i), width, track_id);
        }
    }

    fn nominal_height(&self, track: &Track) -> i32 {
        track.string_count() as i32
    }

    fn draw_track(
        &self,
        track: &Track,
        line: &LayoutLine,
        track_ref: &LineTrackRef,
        measures: &[PrintMeasure],
        surface: &mut dyn PrintSurface,
    ) {
        let strings = track.string_count();
        let spacing = (track_ref.y1 - track_ref.y0) / (strings.max(2) - 1) as f64;
        let string_y = |s: usize| track_ref.y0 + s as f64 * spacing;

        for s in 0..strings {
            surface.draw_line(
                track_ref.x0,
                string_y(s),
                track_ref.x1,
                string_y(s),
                STRING_COLOR,
                STRING_LINE_WIDTH,
            );
        }

        for idx in 0..line.elements.len() {
            let Some(element) =
                continue_with_next_element(line, track_ref, measures, idx, surface)
            else {
                break;
            };
            draw_vertical_divider(element, track_ref.y0, track_ref.y1, surface);

            match element.kind {
                ElementKind::LineHeader => {
                    self.draw_header(track, element.x_from, element.x_to, track_ref, surface);
                }
                ElementKind::SingleMeasure => {
                    let Some(m) = element.measure else { continue };
                    self.draw_measure(
                        track, line, track_ref, measures, m, &string_y, surface,
                    );
                }
                _ => {}
            }
        }

        // Closing barline at the right edge.
        surface.draw_line(
            track_ref.x1,
            track_ref.y0,
            track_ref.x1,
            track_ref.y1,
            INK_COLOR,
            DIVIDER_WIDTH,
        );
    }
}

impl TablaturePrintable {
    /// "T A B" stacked at the left plus the tuning letters per string.
    fn draw_header(
        &self,
        track: &Track,
        x_from: f64,
        x_to: f64,
        track_ref: &LineTrackRef,
        surface: &mut dyn PrintSurface,
    ) {
        let band = track_ref.y1 - track_ref.y0;
        let label_x = x_from + 6.0;
        for (i, letter) in ["T", "A", "B"].iter().enumerate() {
            surface.draw_text(
                label_x,
                track_ref.y0 + band * (0.3 + 0.3 * i as f64),
                letter,
                TEXT_HEIGHT,
                true,
                INK_COLOR,
                TextAnchor::Start,
            );
        }

        let strings = track.string_count();
        let spacing = band / (strings.max(2) - 1) as f64;
        for (s, &pitch) in track.tuning.iter().enumerate() {
            let name = NOTE_NAMES[pitch.rem_euclid(12) as usize];
            surface.draw_text(
                x_to - 4.0,
                track_ref.y0 + s as f64 * spacing + 3.0,
                name,
                BODY_TEXT_SIZE * 0.8,
                false,
                STRING_COLOR,
                TextAnchor::End,
            );
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_measure(
        &self,
        track: &Track,
        line: &LayoutLine,
        track_ref: &LineTrackRef,
        measures: &[PrintMeasure],
        measure: usize,
        string_y: &dyn Fn(usize) -> f64,
        surface: &mut dyn PrintSurface,
    ) {
        let Some(range) = measures[measure].track_ref(track_ref.track).copied() else {
            return;
        };
        let (Some(first), Some(last)) = (range.first_note, range.last_note) else {
            return;
        };

        for i in first..=last {
            let string = track.note_string(i);
            let fret = track.note_fret(i);
            if string < 0 || fret < 0 {
                continue;
            }
            let Some((x_from, x_to)) = get_note_print_x(track, line, measures, i) else {
                continue;
            };
            let x = (x_from + x_to) / 2.0;
            let y = string_y(string as usize);

            let label = format!("{fret}");
            let (w, h) = surface.text_extent(&label, BODY_TEXT_SIZE);
            // Blank out the string behind the number.
            surface.draw_rect(x - w / 2.0 - 1.0, y - h / 2.0, w + 2.0, h, "#ffffff");
            surface.draw_text(
                x,
                y + BODY_TEXT_SIZE * 0.35,
                &label,
                BODY_TEXT_SIZE,
                false,
                INK_COLOR,
                TextAnchor::Middle,
            );
        }
    }
}
