//! Layout engine integration tests: packing, pagination, repetition
//! detection and the tick-to-coordinate queries, all through the public
//! API.

use pretty_assertions::assert_eq;
use printlib::{
    tick_to_x, ElementKind, LayoutResult, MeasureTimeline, NotationType, Note, PageFormat,
    Sequence, SequencePrintable, Track,
};

const TPB: i32 = 960;

/// A sequence of `measure_count` 4/4 measures; `pitch_of` decides the
/// quarter-note pitches per measure (None leaves the measure silent).
fn quarter_note_sequence(
    measure_count: usize,
    pitch_of: impl Fn(usize) -> Option<i32>,
) -> Sequence {
    let timeline = MeasureTimeline::new(TPB, measure_count, &[]);
    let mut notes = Vec::new();
    for m in 0..measure_count {
        let Some(pitch) = pitch_of(m) else { continue };
        let start = timeline.first_tick(m);
        for beat in 0..4 {
            let t = start + beat * TPB;
            notes.push(Note::with_fret(t, t + TPB, pitch, pitch % 12, 0));
        }
    }
    let track = Track::new("guitar", NotationType::Tablature, notes);
    Sequence::new(TPB, timeline, vec![track])
}

fn computed_layout(sequence: &Sequence, format: PageFormat, detect: bool) -> LayoutResult {
    let mut printable = SequencePrintable::new(sequence, format);
    printable.add_track(0);
    printable.calculate_layout(detect).clone()
}

// ─── Properties ─────────────────────────────────────────────────────

#[test]
fn elements_on_a_line_are_monotone_and_contiguous() {
    let seq = quarter_note_sequence(20, |m| Some(40 + m as i32));
    let layout = computed_layout(&seq, PageFormat::default(), false);
    assert!(layout.lines.len() > 1, "expected a multi-line layout");

    for (li, line) in layout.lines.iter().enumerate() {
        for (i, element) in line.elements.iter().enumerate() {
            assert!(
                element.x_from < element.x_to,
                "line {li} element {i} has a degenerate span"
            );
            if let Some(next) = line.elements.get(i + 1) {
                assert!(
                    element.x_to <= next.x_from + 1e-9,
                    "line {li} elements {i} and {} overlap",
                    i + 1
                );
            }
        }
    }
}

#[test]
fn every_measure_appears_exactly_once() {
    let seq = quarter_note_sequence(17, |m| if m % 5 == 3 { None } else { Some(40 + m as i32) });
    let layout = computed_layout(&seq, PageFormat::default(), true);

    let mut covered = Vec::new();
    for line in &layout.lines {
        for element in &line.elements {
            if let Some((first, last)) = element.measure_span() {
                covered.extend(first..=last);
            }
        }
    }
    let expected: Vec<usize> = (0..17).collect();
    assert_eq!(covered, expected, "measure coverage has gaps or duplicates");
}

#[test]
fn packed_lines_stay_within_the_usable_width() {
    let format = PageFormat::default();
    let seq = quarter_note_sequence(30, |m| Some(40 + (m % 20) as i32));
    let layout = computed_layout(&seq, format, false);

    let left = format.margin_x;
    let right = format.width - format.margin_x;
    for (li, line) in layout.lines.iter().enumerate() {
        for element in &line.elements {
            assert!(
                element.x_from >= left - 1e-9 && element.x_to <= right + 1e-9,
                "line {li} spills outside the margins"
            );
        }
        let span: f64 = line.elements.iter().map(|e| e.x_to - e.x_from).sum();
        assert!(span <= format.usable_width() + 1e-9);
    }
}

#[test]
fn pages_stay_within_the_usable_height() {
    let format = PageFormat::default();
    let seq = quarter_note_sequence(40, |m| Some(40 + (m % 25) as i32));
    let layout = computed_layout(&seq, format, false);
    assert!(layout.pages.len() > 1, "expected a multi-page layout");

    for (pi, page) in layout.pages.iter().enumerate() {
        let mut total = 0.0;
        for line in &layout.lines[page.first_line..=page.last_line] {
            let top = line.track_refs.iter().map(|r| r.y0).fold(f64::MAX, f64::min);
            let bottom = line.track_refs.iter().map(|r| r.y1).fold(f64::MIN, f64::max);
            assert!(bottom > top, "page {pi} has a line with no height");
            total += bottom - top;
        }
        assert!(
            total <= format.usable_height() + 1e-9,
            "page {pi} overflows: {total} of {}",
            format.usable_height()
        );
    }
}

#[test]
fn repeats_are_only_flagged_when_detection_is_on() {
    let seq = quarter_note_sequence(8, |m| Some(if m % 2 == 0 { 45 } else { 50 }));

    let plain = computed_layout(&seq, PageFormat::default(), false);
    for line in &plain.lines {
        for element in &line.elements {
            assert!(
                !matches!(
                    element.kind,
                    ElementKind::SingleRepeatedMeasure
                        | ElementKind::RepeatedRiff { .. }
                        | ElementKind::PlayManyTimes { .. }
                ),
                "repeat element produced with detection off"
            );
        }
    }
}

#[test]
fn flagged_repeats_reference_identical_content() {
    let seq = quarter_note_sequence(8, |m| Some(if m % 2 == 0 { 45 } else { 50 }));
    let layout = computed_layout(&seq, PageFormat::default(), true);
    let track = &seq.tracks[0];

    let mut found_repeat = false;
    for measure in &layout.measures {
        let Some(r) = measure.first_similar_measure else { continue };
        found_repeat = true;
        let source = &layout.measures[r];
        let a = measure.track_ref(0).unwrap();
        let b = source.track_ref(0).unwrap();
        let (af, bf) = (a.first_note.unwrap(), b.first_note.unwrap());
        assert_eq!(a.last_note.unwrap() - af, b.last_note.unwrap() - bf);
        for i in 0..=(a.last_note.unwrap() - af) {
            let na = track.notes()[af + i];
            let nb = track.notes()[bf + i];
            assert_eq!(na.pitch, nb.pitch);
            assert_eq!(
                na.start_tick - measure.first_tick,
                nb.start_tick - source.first_tick
            );
        }
    }
    assert!(found_repeat, "alternating pattern should contain repeats");
}

#[test]
fn tick_queries_are_idempotent() {
    let seq = quarter_note_sequence(6, |m| Some(40 + m as i32));
    let layout = computed_layout(&seq, PageFormat::default(), false);

    for line in &layout.lines {
        let (Some(first), Some(last)) = (line.first_measure, line.last_measure) else {
            continue;
        };
        for m in first..=last {
            for beat in 0..4 {
                let tick = layout.measures[m].first_tick + beat * TPB;
                let a = tick_to_x(line, &layout.measures, tick);
                let b = tick_to_x(line, &layout.measures, tick);
                assert_eq!(a, b, "tick {tick} query is not stable");
                assert!(a.is_some(), "tick {tick} should be placed on its line");
            }
        }
    }
}

// ─── Scenarios ──────────────────────────────────────────────────────

#[test]
fn four_identical_measures_collapse_to_back_references() {
    let seq = quarter_note_sequence(4, |_| Some(45));
    let layout = computed_layout(&seq, PageFormat::default(), true);

    let kinds: Vec<ElementKind> = layout.lines[0]
        .elements
        .iter()
        .filter(|e| e.kind != ElementKind::LineHeader)
        .map(|e| e.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            ElementKind::SingleMeasure,
            ElementKind::SingleRepeatedMeasure,
            ElementKind::SingleRepeatedMeasure,
            ElementKind::SingleRepeatedMeasure,
        ]
    );
    for m in 1..4 {
        assert_eq!(
            layout.measures[m].first_similar_measure,
            Some(0),
            "measure {m} should reference measure 0"
        );
    }
}

#[test]
fn an_empty_measure_is_never_a_repeat() {
    let seq = quarter_note_sequence(4, |m| if m == 2 { None } else { Some(45) });

    for detect in [false, true] {
        let layout = computed_layout(&seq, PageFormat::default(), detect);
        let kind_of_measure_2 = layout
            .lines
            .iter()
            .flat_map(|l| &l.elements)
            .find(|e| e.measure_span() == Some((2, 2)))
            .map(|e| e.kind);
        assert_eq!(kind_of_measure_2, Some(ElementKind::EmptyMeasure));
    }
}

#[test]
fn lines_fill_the_page_and_underfilled_lines_stretch() {
    // Five dense measures on paper sized so the header plus exactly
    // three of them fill the first line edge to edge.
    let format = PageFormat {
        width: 816.0,
        height: 880.0,
        margin_x: 30.0,
        margin_y: 30.0,
    };
    let seq = quarter_note_sequence(5, |m| Some(40 + m as i32));
    let layout = computed_layout(&seq, format, false);

    assert_eq!(layout.lines.len(), 2);
    assert_eq!(layout.lines[0].first_measure, Some(0));
    assert_eq!(layout.lines[0].last_measure, Some(2));
    assert_eq!(layout.lines[1].first_measure, Some(3));
    assert_eq!(layout.lines[1].last_measure, Some(4));

    let right = format.width - format.margin_x;
    for line in &layout.lines {
        let last = line.elements.last().unwrap();
        assert!(
            (last.x_to - right).abs() < 1e-6,
            "line does not reach the right edge"
        );
    }

    // The under-filled second line stretches its measures wider than the
    // exactly-filled first line prints them.
    let width_of = |line: usize, idx: usize| {
        let e = &layout.lines[line].elements[idx];
        e.x_to - e.x_from
    };
    assert!(width_of(1, 0) > width_of(0, 1));
}

#[test]
fn a_tick_at_the_line_end_pins_to_the_right_edge() {
    let format = PageFormat::default();
    let seq = quarter_note_sequence(6, |m| Some(40 + m as i32));
    let layout = computed_layout(&seq, format, false);
    assert!(layout.lines.len() > 1);

    let line = &layout.lines[0];
    let end_tick = layout.measures[line.last_measure.unwrap()].last_tick;
    let pinned = tick_to_x(line, &layout.measures, end_tick)
        .expect("tick at the line end must pin, not vanish");
    let right = format.width - format.margin_x;
    assert_eq!(pinned, (right + 10.0, right + 10.0));

    // A tick before the line has no coordinate on it.
    let line2 = &layout.lines[1];
    assert_eq!(tick_to_x(line2, &layout.measures, 0), None);
}

#[test]
fn signature_changes_get_their_own_marker() {
    use printlib::TimeSignature;
    let timeline = MeasureTimeline::new(TPB, 4, &[(2, TimeSignature::new(3, 4))]);
    let mut notes = Vec::new();
    for m in 0..4 {
        let start = timeline.first_tick(m);
        notes.push(Note::with_fret(start, start + TPB, 45, 0, 1));
    }
    let track = Track::new("guitar", NotationType::Tablature, notes);
    let seq = Sequence::new(TPB, timeline, vec![track]);
    let layout = computed_layout(&seq, PageFormat::default(), false);

    let markers: Vec<ElementKind> = layout
        .lines
        .iter()
        .flat_map(|l| &l.elements)
        .filter(|e| matches!(e.kind, ElementKind::TimeSignatureChange { .. }))
        .map(|e| e.kind)
        .collect();
    assert_eq!(
        markers,
        vec![ElementKind::TimeSignatureChange { numerator: 3, denominator: 4 }]
    );
}

#[test]
fn unprintable_tracks_are_skipped_not_fatal() {
    let timeline = MeasureTimeline::new(TPB, 2, &[]);
    let guitar = Track::new(
        "guitar",
        NotationType::Tablature,
        vec![Note::with_fret(0, TPB, 45, 0, 1)],
    );
    let knobs = Track::new("volume", NotationType::Controller, Vec::new());
    let seq = Sequence::new(TPB, timeline, vec![guitar, knobs]);

    let mut printable = SequencePrintable::new(&seq, PageFormat::default());
    printable.add_track(0);
    printable.add_track(1); // skipped with a diagnostic
    printable.add_track(7); // nonexistent, also skipped
    assert_eq!(printable.track_amount(), 1);

    let layout = printable.calculate_layout(false);
    assert_eq!(layout.pages.len(), 1);
}

#[test]
fn an_empty_job_yields_zero_pages() {
    let timeline = MeasureTimeline::new(TPB, 0, &[]);
    let seq = Sequence::new(TPB, timeline, Vec::new());
    let mut printable = SequencePrintable::new(&seq, PageFormat::default());
    let layout = printable.calculate_layout(true);
    assert!(layout.pages.is_empty());
    assert_eq!(printable.page_amount(), 0);
}

#[test]
fn two_tracks_share_the_same_element_grid() {
    let timeline = MeasureTimeline::new(TPB, 4, &[]);
    let guitar_notes: Vec<Note> = (0..16)
        .map(|i| Note::with_fret(i * TPB, (i + 1) * TPB, 45 + (i % 7), 3, 1))
        .collect();
    let piano_notes: Vec<Note> = (0..8)
        .map(|i| Note::new(i * 2 * TPB, (i * 2 + 1) * TPB, 60 + (i % 5)))
        .collect();
    let seq = Sequence::new(
        TPB,
        timeline,
        vec![
            Track::new("guitar", NotationType::Tablature, guitar_notes),
            Track::new("piano", NotationType::Score, piano_notes),
        ],
    );

    let mut printable = SequencePrintable::new(&seq, PageFormat::default());
    printable.add_track(0);
    printable.add_track(1);
    let layout = printable.calculate_layout(false).clone();

    for line in &layout.lines {
        assert_eq!(line.track_refs.len(), 2);
        // Only the top track prints measure numbers.
        assert!(line.track_refs[0].show_measure_number);
        assert!(!line.track_refs[1].show_measure_number);
        // Both tracks see the same x grid, so a shared onset aligns.
        let Some(first) = line.first_measure else { continue };
        let tick = layout.measures[first].first_tick;
        let placed = tick_to_x(line, &layout.measures, tick);
        assert!(placed.is_some());
    }
}
