//! The per-notation renderer seam and the shared drawing logic every
//! renderer goes through: tick-to-coordinate queries, element iteration
//! with its marker furniture, vertical dividers, signature changes.

use log::warn;

use crate::model::{NotationType, Track};

use super::constants::*;
use super::element::{ElementKind, LayoutElement, LayoutLine, LineTrackRef};
use super::measure::{MeasureTrackRef, PrintMeasure};
use super::placement::TickPlacementSolver;
use super::score::ScorePrintable;
use super::surface::{PrintSurface, TextAnchor};
use super::tab::TablaturePrintable;

// ═══════════════════════════════════════════════════════════════════════
// EditorPrintable
// ═══════════════════════════════════════════════════════════════════════

/// One renderer per printable notation type.
///
/// Renderers register their symbols during layout (`add_used_ticks`),
/// report vertical demand (`calculate_height`) and draw one track band of
/// one line (`draw_track`).  They never mutate layout state.
pub trait EditorPrintable {
    /// Register every symbol of `track` inside one measure with the
    /// measure's placement solver.
    fn add_used_ticks(
        &self,
        track_id: usize,
        track: &Track,
        measure_ref: &MeasureTrackRef,
        solver: &mut TickPlacementSolver,
    );

    /// Vertical demand of this track in abstract levels, assuming it has
    /// notes to print.
    fn nominal_height(&self, track: &Track) -> i32;

    /// Vertical demand of this track on one line.  A track with nothing
    /// on the line takes no space.
    fn calculate_height(&self, track: &Track, track_ref: &LineTrackRef) -> i32 {
        if track_ref.first_note.is_none() {
            0
        } else {
            self.nominal_height(track)
        }
    }

    /// Draw this track's band of one line onto the surface.
    fn draw_track(
        &self,
        track: &Track,
        line: &LayoutLine,
        track_ref: &LineTrackRef,
        measures: &[PrintMeasure],
        surface: &mut dyn PrintSurface,
    );
}

/// The renderer for a notation type, or None when the type cannot be
/// printed.  Drum tracks print through the standard-notation renderer.
pub fn printable_for(notation: NotationType) -> Option<Box<dyn EditorPrintable>> {
    match notation {
        NotationType::Tablature => Some(Box::new(TablaturePrintable)),
        NotationType::Score | NotationType::Drum => Some(Box::new(ScorePrintable)),
        NotationType::Controller => {
            warn!("controller tracks have no print renderer");
            None
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Tick-to-coordinate queries
// ═══════════════════════════════════════════════════════════════════════

/// Horizontal pixel range of `tick` on `line`.
///
/// Scans the line's measure-bearing elements in order.  Inside a printed
/// measure the measure's relative placement is scaled by the element's
/// pixel width, with the span clamped so one long note cannot claim an
/// absurd stretch.  A tick before the line's first measure yields None;
/// a tick at or past the end of the line's last measure yields the pinned
/// right-edge coordinate a tie continuing on the next line hangs from.
///
/// Side-effect-free; repeated calls return identical results.
pub fn tick_to_x(line: &LayoutLine, measures: &[PrintMeasure], tick: i32) -> Option<(f64, f64)> {
    let mut last_measure_end: Option<(i32, f64)> = None;

    for element in &line.elements {
        let Some((first, last)) = element.measure_span() else {
            continue;
        };
        let span_start = measures[first].first_tick;
        let span_end = measures[last].last_tick;

        if last_measure_end.is_none() && tick < span_start {
            return None;
        }
        last_measure_end = Some((span_end, element.x_to));

        if tick < span_start || tick >= span_end {
            continue;
        }
        if element.kind != ElementKind::SingleMeasure {
            // Collapsed repeats print no symbols; their ticks have no
            // meaningful x position.
            return None;
        }

        let (rel_from, rel_to) = measures[first].placement.symbol_area(tick)?;
        let width = element.x_to - element.x_from;
        let x_from = element.x_from + rel_from * width;
        let mut x_to = element.x_from + rel_to * width;
        if x_to - x_from > MAX_SYMBOL_SPAN {
            x_to = x_from + MAX_SYMBOL_SPAN;
        }
        return Some((x_from, x_to));
    }

    // Past every measure on the line: the tie-continuation pin just
    // beyond the right edge.
    match last_measure_end {
        Some((end, x_to)) if tick >= end => {
            let pin = x_to + TIE_CONTINUATION_MARGIN;
            Some((pin, pin))
        }
        _ => None,
    }
}

/// Horizontal pixel range of note `note` of `track` on `line`.
pub fn get_note_print_x(
    track: &Track,
    line: &LayoutLine,
    measures: &[PrintMeasure],
    note: usize,
) -> Option<(f64, f64)> {
    tick_to_x(line, measures, track.note_start_tick(note))
}

// ═══════════════════════════════════════════════════════════════════════
// Element iteration & shared furniture
// ═══════════════════════════════════════════════════════════════════════

/// Advance to element `idx` of the line, drawing the furniture every
/// notation type shares: repeat back-references, riff ranges, "X n"
/// labels, signature changes and (for the top track) measure numbers.
/// Returns the element so the caller can draw its own content.
pub fn continue_with_next_element<'a>(
    line: &'a LayoutLine,
    track_ref: &LineTrackRef,
    measures: &[PrintMeasure],
    idx: usize,
    surface: &mut dyn PrintSurface,
) -> Option<&'a LayoutElement> {
    let element = line.elements.get(idx)?;
    let center_x = (element.x_from + element.x_to) / 2.0;
    let center_y = (track_ref.y0 + track_ref.y1) / 2.0;

    match element.kind {
        ElementKind::SingleRepeatedMeasure => {
            surface.draw_text(
                center_x,
                center_y,
                "%",
                BODY_TEXT_SIZE * 1.5,
                false,
                MARKER_COLOR,
                TextAnchor::Middle,
            );
        }
        ElementKind::RepeatedRiff { first_measure_to_repeat, last_measure_to_repeat } => {
            let label =
                format!("{} - {}", first_measure_to_repeat + 1, last_measure_to_repeat + 1);
            surface.draw_text(
                center_x,
                center_y,
                &label,
                BODY_TEXT_SIZE,
                false,
                MARKER_COLOR,
                TextAnchor::Middle,
            );
        }
        ElementKind::PlayManyTimes { repeat_count } => {
            let label = format!("X{}", repeat_count + 1);
            surface.draw_text(
                center_x,
                center_y,
                &label,
                BODY_TEXT_SIZE * 1.3,
                false,
                MARKER_COLOR,
                TextAnchor::Middle,
            );
        }
        ElementKind::TimeSignatureChange { numerator, denominator } => {
            render_time_signature_change(element, numerator, denominator, track_ref, surface);
        }
        ElementKind::SingleMeasure
        | ElementKind::EmptyMeasure
        | ElementKind::LineHeader => {}
    }

    if track_ref.show_measure_number {
        if let Some(m) = element.measure {
            surface.draw_text(
                element.x_from,
                track_ref.y0 - 2.0,
                &format!("{}", measures[m].id + 1),
                BODY_TEXT_SIZE * 0.9,
                false,
                INK_COLOR,
                TextAnchor::Start,
            );
        }
    }

    Some(element)
}

/// Vertical divider at the left edge of an element.  Headers and
/// signature changes carry no barline.
pub fn draw_vertical_divider(
    element: &LayoutElement,
    y0: f64,
    y1: f64,
    surface: &mut dyn PrintSurface,
) {
    if matches!(
        element.kind,
        ElementKind::LineHeader | ElementKind::TimeSignatureChange { .. }
    ) {
        return;
    }
    surface.draw_line(element.x_from, y0, element.x_from, y1, INK_COLOR, DIVIDER_WIDTH);
}

/// Numerator over denominator, centered in the element.
pub fn render_time_signature_change(
    element: &LayoutElement,
    numerator: i32,
    denominator: i32,
    track_ref: &LineTrackRef,
    surface: &mut dyn PrintSurface,
) {
    let x = (element.x_from + element.x_to) / 2.0;
    let band = track_ref.y1 - track_ref.y0;
    surface.draw_text(
        x,
        track_ref.y0 + band * 0.4,
        &format!("{numerator}"),
        TEXT_HEIGHT,
        true,
        INK_COLOR,
        TextAnchor::Middle,
    );
    surface.draw_text(
        x,
        track_ref.y0 + band * 0.85,
        &format!("{denominator}"),
        TEXT_HEIGHT,
        true,
        INK_COLOR,
        TextAnchor::Middle,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MeasureTimeline, Note, Sequence};

    const TPB: i32 = 960;

    fn sequence(measure_count: usize, notes: Vec<Note>) -> Sequence {
        let timeline = MeasureTimeline::new(TPB, measure_count, &[]);
        let track = Track::new("guitar", NotationType::Tablature, notes);
        Sequence::new(TPB, timeline, vec![track])
    }

    /// Two positioned measures, quarter notes throughout, on one line
    /// spanning x 100..500.
    fn positioned_line(seq: &Sequence) -> (Vec<PrintMeasure>, LayoutLine) {
        let timeline = &seq.timeline;
        let mut measures: Vec<PrintMeasure> = (0..timeline.measure_count())
            .map(|i| {
                let mut m = PrintMeasure::new(
                    i,
                    timeline.first_tick(i),
                    timeline.last_tick(i),
                    TPB,
                    seq,
                    &[0],
                );
                for note in seq.tracks[0].notes() {
                    if note.start_tick >= m.first_tick && note.start_tick < m.last_tick {
                        m.placement.add_symbol(note.start_tick, note.end_tick, 14.0, 0);
                    }
                }
                m.placement.solve();
                m
            })
            .collect();

        let mut elements = vec![
            LayoutElement::new(ElementKind::LineHeader, None).with_width(2, 48.0),
        ];
        for (i, m) in measures.iter().enumerate() {
            elements.push(
                LayoutElement::new(ElementKind::SingleMeasure, Some(i))
                    .with_width(m.placement.width_units(), m.placement.needed_width()),
            );
        }
        // Hand-positioned: header 100..150, then equal shares to 500.
        elements[0].x_from = 100.0;
        elements[0].x_to = 150.0;
        let per = (500.0 - 150.0) / measures.len() as f64;
        for (i, e) in elements.iter_mut().skip(1).enumerate() {
            e.x_from = 150.0 + per * i as f64;
            e.x_to = 150.0 + per * (i + 1) as f64;
        }

        let line = LayoutLine {
            elements,
            width_in_units: 0,
            level_height: 6,
            track_refs: Vec::new(),
            first_measure: Some(0),
            last_measure: Some(measures.len() - 1),
        };
        (measures, line)
    }

    #[test]
    fn tick_inside_a_measure_lands_inside_its_element() {
        let notes = (0..8)
            .map(|i| Note::new(i * TPB, (i + 1) * TPB, 60))
            .collect();
        let seq = sequence(2, notes);
        let (measures, line) = positioned_line(&seq);

        let (from, to) = tick_to_x(&line, &measures, TPB).expect("registered tick");
        let element = &line.elements[1];
        assert!(from >= element.x_from && to <= element.x_to + 1e-9);
        assert!(to > from);
    }

    #[test]
    fn queries_are_idempotent_and_monotone() {
        let notes = (0..8)
            .map(|i| Note::new(i * TPB, (i + 1) * TPB, 60))
            .collect();
        let seq = sequence(2, notes);
        let (measures, line) = positioned_line(&seq);

        let mut prev = f64::MIN;
        for i in 0..8 {
            let tick = i * TPB;
            let a = tick_to_x(&line, &measures, tick);
            let b = tick_to_x(&line, &measures, tick);
            assert_eq!(a, b, "query for tick {tick} is not idempotent");
            let (from, _) = a.expect("registered tick");
            assert!(from > prev, "tick {tick} placed left of its predecessor");
            prev = from;
        }
    }

    #[test]
    fn tick_before_the_line_is_absent() {
        let notes = vec![Note::new(4 * TPB, 5 * TPB, 60)];
        let seq = sequence(2, notes);
        let timeline = &seq.timeline;
        // Line holding only measure 1; a tick in measure 0 precedes it.
        let mut m = PrintMeasure::new(
            1,
            timeline.first_tick(1),
            timeline.last_tick(1),
            TPB,
            &seq,
            &[0],
        );
        m.placement.add_symbol(4 * TPB, 5 * TPB, 14.0, 0);
        m.placement.solve();

        let mut element = LayoutElement::new(ElementKind::SingleMeasure, Some(0))
            .with_width(m.placement.width_units(), m.placement.needed_width());
        element.x_from = 100.0;
        element.x_to = 300.0;
        let line = LayoutLine {
            elements: vec![element],
            width_in_units: 0,
            level_height: 6,
            track_refs: Vec::new(),
            first_measure: Some(1),
            last_measure: Some(1),
        };

        assert_eq!(tick_to_x(&line, &[m], 0), None);
    }

    #[test]
    fn tick_past_the_line_pins_to_the_right_edge() {
        let notes = (0..8)
            .map(|i| Note::new(i * TPB, (i + 1) * TPB, 60))
            .collect();
        let seq = sequence(2, notes);
        let (measures, line) = positioned_line(&seq);

        let last = line.elements.last().unwrap();
        let end_tick = measures[1].last_tick;
        let pinned = tick_to_x(&line, &measures, end_tick).expect("pinned coordinate");
        assert_eq!(pinned, (last.x_to + 10.0, last.x_to + 10.0));
    }

    #[test]
    fn long_symbol_span_is_clamped() {
        // One whole-measure note stretched over a very wide element.
        let notes = vec![Note::new(0, 4 * TPB, 60)];
        let seq = sequence(1, notes);
        let (mut measures, mut line) = positioned_line(&seq);
        line.elements[1].x_from = 0.0;
        line.elements[1].x_to = 600.0;
        measures.truncate(1);

        let (from, to) = tick_to_x(&line, &measures, 0).expect("registered tick");
        assert!(to - from <= 175.0 + 1e-9, "span {} exceeds the cap", to - from);
    }

    #[test]
    fn controller_tracks_have_no_renderer() {
        assert!(printable_for(NotationType::Controller).is_none());
        assert!(printable_for(NotationType::Drum).is_some());
        assert!(printable_for(NotationType::Tablature).is_some());
    }
}
