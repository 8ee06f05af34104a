//! Layout structures — the atomic printable elements, the lines that
//! pack them horizontally and the pages that stack lines vertically.

use serde::Serialize;

/// What one layout element stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ElementKind {
    /// A measure printed in full.
    SingleMeasure,
    /// A measure with no notes in any printed track.
    EmptyMeasure,
    /// A measure printed as a back-reference to an earlier identical one.
    SingleRepeatedMeasure,
    /// A run of measures printed as a reference to an earlier passage.
    RepeatedRiff {
        /// First measure of the referenced passage
        first_measure_to_repeat: usize,
        /// Last measure of the referenced passage
        last_measure_to_repeat: usize,
    },
    /// The same measure repeated many times, collapsed to one "X n" marker.
    PlayManyTimes { repeat_count: usize },
    /// A time-signature change marker.
    TimeSignatureChange { numerator: i32, denominator: i32 },
    /// The header opening the element stream (e.g. "T A B" + tuning).
    LineHeader,
}

/// The atomic printable unit.
///
/// Constructed once per layout pass; kind and measure range are immutable
/// after construction, `x_from`/`x_to` are assigned exactly once when the
/// owning line is positioned.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutElement {
    pub kind: ElementKind,
    /// Index into the measure-for-print arena, for elements that stand at
    /// a measure.  None for markers with no measure (header, signature).
    pub measure: Option<usize>,
    /// Abstract layout width (number of symbol slots).
    pub width_units: i32,
    /// Concrete minimum print width, excluding the leading margin.
    pub width_print_units: f64,
    /// Absolute horizontal bounds, assigned during placement.
    pub x_from: f64,
    pub x_to: f64,
}

impl LayoutElement {
    pub(super) fn new(kind: ElementKind, measure: Option<usize>) -> Self {
        Self {
            kind,
            measure,
            width_units: 1,
            width_print_units: 0.0,
            x_from: 0.0,
            x_to: 0.0,
        }
    }

    pub(super) fn with_width(mut self, width_units: i32, width_print_units: f64) -> Self {
        self.width_units = width_units;
        self.width_print_units = width_print_units;
        self
    }

    /// Measure indices this element consumes from the timeline, inclusive.
    /// Marker elements that stand at no measure consume none.
    pub fn measure_span(&self) -> Option<(usize, usize)> {
        let m = self.measure?;
        match self.kind {
            ElementKind::RepeatedRiff { first_measure_to_repeat, last_measure_to_repeat } => {
                Some((m, m + (last_measure_to_repeat - first_measure_to_repeat)))
            }
            ElementKind::PlayManyTimes { repeat_count } => Some((m, m + repeat_count - 1)),
            _ => Some((m, m)),
        }
    }
}

/// Per-track bookkeeping for one line: pixel bounds, the note range
/// visible on the line and whether measure numbers are printed.
#[derive(Debug, Clone, Serialize)]
pub struct LineTrackRef {
    /// Index into the sequence's track list
    pub track: usize,
    /// Number of layout elements on the owning line
    pub layout_elements_amount: usize,
    /// Measure numbers are printed above this track's line
    pub show_measure_number: bool,
    /// First/last note of this track whose onset falls on the line
    pub first_note: Option<usize>,
    pub last_note: Option<usize>,
    /// Absolute pixel bounds of this track's band within the line
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

/// An ordered run of layout elements that fit within one printed line,
/// plus the per-track render info.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutLine {
    pub elements: Vec<LayoutElement>,
    /// Sum of the constituent elements' abstract widths.
    pub width_in_units: i32,
    /// Vertical space demand in abstract levels (sum over tracks).
    pub level_height: i32,
    pub track_refs: Vec<LineTrackRef>,
    /// First/last measure index consumed by this line's elements.
    pub first_measure: Option<usize>,
    pub last_measure: Option<usize>,
}

impl LayoutLine {
    /// The measure arena index behind element `idx`, if it has one.
    pub fn measure_for_element(&self, idx: usize) -> Option<usize> {
        self.elements.get(idx).and_then(|e| e.measure)
    }
}

/// A contiguous range of lines that fit within one printed page.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LayoutPage {
    /// Index of the first line on the page (inclusive)
    pub first_line: usize,
    /// Index of the last line on the page (inclusive)
    pub last_line: usize,
}

impl LayoutPage {
    pub fn line_count(&self) -> usize {
        self.last_line - self.first_line + 1
    }
}
