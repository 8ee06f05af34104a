//! Repetition detection and layout-element stream construction.
//!
//! Pass 1 annotates every measure with the earliest prior measure whose
//! note content is identical across all printed tracks.  Pass 2 walks the
//! annotated measures in order and emits one layout element per measure
//! or per collapsed run: a back-reference for an isolated repeat, a riff
//! marker for a repeated multi-measure passage, a "play N times" marker
//! for a single measure hammered out many times in a row.

use crate::model::{MeasureTimeline, Sequence};

use super::constants::*;
use super::element::{ElementKind, LayoutElement};
use super::measure::PrintMeasure;

/// Annotate each measure with its earliest identical predecessor.
/// Pure comparison; finding no repeats is a normal outcome.
pub(super) fn detect_repetitions(measures: &mut [PrintMeasure], sequence: &Sequence) {
    for i in 1..measures.len() {
        if measures[i].is_empty() {
            continue;
        }
        for j in 0..i {
            if measures[i].same_content_as(&measures[j], sequence) {
                measures[i].first_similar_measure = Some(j);
                break;
            }
        }
    }
}

/// Build the full element stream from the annotated measures.
///
/// The stream opens with a line header; a time-signature marker precedes
/// every measure where the timeline records a change.  With
/// `detect_repetitions` off, only SingleMeasure/EmptyMeasure appear.
pub(super) fn build_elements(
    measures: &[PrintMeasure],
    timeline: &MeasureTimeline,
    detect_repetitions: bool,
) -> Vec<LayoutElement> {
    let mut elements = Vec::with_capacity(measures.len() + 2);

    elements.push(
        LayoutElement::new(ElementKind::LineHeader, None).with_width(2, LINE_HEADER_WIDTH),
    );

    let count = measures.len();
    let mut m = 0;
    while m < count {
        if timeline.signature_changes_at(m) {
            let sig = timeline.time_signature_at(m);
            elements.push(
                LayoutElement::new(
                    ElementKind::TimeSignatureChange {
                        numerator: sig.numerator,
                        denominator: sig.denominator,
                    },
                    None,
                )
                .with_width(1, TIME_SIG_WIDTH),
            );
        }

        let measure = &measures[m];

        if measure.is_empty() {
            elements.push(
                LayoutElement::new(ElementKind::EmptyMeasure, Some(m))
                    .with_width(1, EMPTY_MEASURE_WIDTH),
            );
            m += 1;
            continue;
        }

        let back_ref = if detect_repetitions { measure.first_similar_measure } else { None };

        let Some(r) = back_ref else {
            elements.push(single_measure_element(measure, m));
            m += 1;
            continue;
        };

        // A single measure repeated over and over right after its source
        // collapses into one "play N times" marker once the run is long
        // enough to be worth it.
        if r == m - 1 {
            let run = repeat_run_length(measures, m, r);
            if run >= MIN_PLAY_MANY_TIMES_RUN {
                elements.push(
                    LayoutElement::new(ElementKind::PlayManyTimes { repeat_count: run }, Some(m))
                        .with_width(1, PLAY_MANY_TIMES_WIDTH),
                );
                m += run;
                continue;
            }
        }

        // Consecutive correspondence with an earlier passage: measure m+j
        // repeats measure r+j for every j in the run.
        let riff = riff_run_length(measures, m, r);
        if riff >= 2 {
            elements.push(
                LayoutElement::new(
                    ElementKind::RepeatedRiff {
                        first_measure_to_repeat: r,
                        last_measure_to_repeat: r + riff - 1,
                    },
                    Some(m),
                )
                .with_width(1, RIFF_MARKER_WIDTH),
            );
            m += riff;
            continue;
        }

        elements.push(
            LayoutElement::new(ElementKind::SingleRepeatedMeasure, Some(m))
                .with_width(1, REPEAT_MARKER_WIDTH),
        );
        m += 1;
    }

    elements
}

fn single_measure_element(measure: &PrintMeasure, m: usize) -> LayoutElement {
    LayoutElement::new(ElementKind::SingleMeasure, Some(m)).with_width(
        measure.placement.width_units(),
        measure.placement.needed_width(),
    )
}

/// Length of the run of measures starting at `m` that all back-reference
/// the same single source measure `r`.
fn repeat_run_length(measures: &[PrintMeasure], m: usize, r: usize) -> usize {
    let mut run = 0;
    while m + run < measures.len()
        && measures[m + run].first_similar_measure == Some(r)
        && !measures[m + run].is_empty()
    {
        run += 1;
    }
    run
}

/// Length of the run with consecutive correspondence: measure `m + j`
/// back-references exactly `r + j`.
fn riff_run_length(measures: &[PrintMeasure], m: usize, r: usize) -> usize {
    let mut run = 0;
    while m + run < measures.len()
        && r + run < m
        && measures[m + run].first_similar_measure == Some(r + run)
    {
        run += 1;
    }
    run
}
