//! Print-layout engine — turns a sequence plus a chosen set of tracks
//! into positioned lines and pages, then renders pages one at a time.
//!
//! The pipeline runs once per `calculate_layout` call:
//!
//! 1. build one measure-for-print record per timeline measure,
//! 2. optionally detect repeated content,
//! 3. let every printed track register its symbols with each measure's
//!    placement solver,
//! 4. build the layout-element stream (measures, collapsed repeats,
//!    markers),
//! 5. pack elements into lines, lines into pages, and assign absolute
//!    coordinates.
//!
//! After that the result is read-only; `print_page` can be called any
//! number of times, in any order, one page per call.

use log::warn;
use serde::Serialize;
use thiserror::Error;

use crate::model::Sequence;

mod constants;
mod element;
mod measure;
mod placement;
mod printable;
mod repetition;
mod score;
mod surface;
mod tab;

pub use element::{ElementKind, LayoutElement, LayoutLine, LayoutPage, LineTrackRef};
pub use measure::{MeasureTrackRef, PrintMeasure};
pub use placement::TickPlacementSolver;
pub use printable::{
    continue_with_next_element, draw_vertical_divider, get_note_print_x, printable_for,
    render_time_signature_change, tick_to_x, EditorPrintable,
};
pub use surface::{PrintSurface, SvgSurface, TextAnchor};

use constants::*;

// ═══════════════════════════════════════════════════════════════════════
// Page format & results
// ═══════════════════════════════════════════════════════════════════════

/// Paper geometry in print user units.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PageFormat {
    pub width: f64,
    pub height: f64,
    pub margin_x: f64,
    pub margin_y: f64,
}

impl Default for PageFormat {
    fn default() -> Self {
        Self {
            width: DEFAULT_PAGE_WIDTH,
            height: DEFAULT_PAGE_HEIGHT,
            margin_x: PAGE_MARGIN_X,
            margin_y: PAGE_MARGIN_Y,
        }
    }
}

impl PageFormat {
    /// Horizontal space available to one line.
    pub fn usable_width(&self) -> f64 {
        self.width - 2.0 * self.margin_x
    }

    /// Vertical space available to notation, below the header area.
    pub fn usable_height(&self) -> f64 {
        self.height - 2.0 * self.margin_y - HEADER_RESERVED
    }
}

/// Everything one layout pass produces.  Read-only afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutResult {
    pub measures: Vec<PrintMeasure>,
    pub lines: Vec<LayoutLine>,
    pub pages: Vec<LayoutPage>,
}

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("page {page} requested but the layout has {pages} page(s)")]
    PageOutOfRange { page: usize, pages: usize },
    #[error("nothing to print: no layout was computed or it produced no pages")]
    NothingToPrint,
}

// ═══════════════════════════════════════════════════════════════════════
// SequencePrintable
// ═══════════════════════════════════════════════════════════════════════

/// The print job for one sequence: which tracks to print, on what paper,
/// and (after `calculate_layout`) where everything goes.
pub struct SequencePrintable<'a> {
    sequence: &'a Sequence,
    format: PageFormat,
    tracks: Vec<(usize, Box<dyn EditorPrintable>)>,
    layout: Option<LayoutResult>,
}

impl<'a> SequencePrintable<'a> {
    pub fn new(sequence: &'a Sequence, format: PageFormat) -> Self {
        Self {
            sequence,
            format,
            tracks: Vec::new(),
            layout: None,
        }
    }

    /// Queue a track for printing.  Tracks whose notation type has no
    /// print renderer are reported and skipped; the job continues with
    /// the remaining tracks.
    pub fn add_track(&mut self, track_id: usize) {
        let Some(track) = self.sequence.tracks.get(track_id) else {
            warn!("track {track_id} does not exist, skipping");
            return;
        };
        match printable_for(track.notation) {
            Some(printable) => self.tracks.push((track_id, printable)),
            None => warn!("track '{}' cannot be printed, skipping", track.name),
        }
    }

    /// Number of tracks that will actually print.
    pub fn track_amount(&self) -> usize {
        self.tracks.len()
    }

    /// Run the full layout pass.  Deterministic; an empty job yields a
    /// result with zero pages rather than an error.
    pub fn calculate_layout(&mut self, detect_repetitions: bool) -> &LayoutResult {
        let timeline = &self.sequence.timeline;
        let track_ids: Vec<usize> = self.tracks.iter().map(|(id, _)| *id).collect();

        let mut measures: Vec<PrintMeasure> = (0..timeline.measure_count())
            .map(|i| {
                PrintMeasure::new(
                    i,
                    timeline.first_tick(i),
                    timeline.last_tick(i),
                    timeline.ticks_per_beat(),
                    self.sequence,
                    &track_ids,
                )
            })
            .collect();

        if track_ids.is_empty() || measures.is_empty() {
            return self.layout.insert(LayoutResult {
                measures,
                lines: Vec::new(),
                pages: Vec::new(),
            });
        }

        if detect_repetitions {
            repetition::detect_repetitions(&mut measures, self.sequence);
        }

        for m in &mut measures {
            for (track_id, printable) in &self.tracks {
                let track = &self.sequence.tracks[*track_id];
                if let Some(track_ref) = m.track_ref(*track_id).copied() {
                    printable.add_used_ticks(*track_id, track, &track_ref, &mut m.placement);
                }
            }
            m.placement.solve();
        }

        let elements = repetition::build_elements(&measures, timeline, detect_repetitions);
        let mut lines = self.pack_lines(elements, &measures);
        for line in &mut lines {
            self.place_line_elements(line);
        }
        let pages = self.paginate(&lines);
        self.assign_vertical(&mut lines, &pages);

        self.layout.insert(LayoutResult { measures, lines, pages })
    }

    /// The computed layout, if `calculate_layout` ran.
    pub fn layout(&self) -> Option<&LayoutResult> {
        self.layout.as_ref()
    }

    pub fn page_amount(&self) -> usize {
        self.layout.as_ref().map_or(0, |l| l.pages.len())
    }

    // ── Line packing ────────────────────────────────────────────────

    /// Greedy packing: each element takes its minimum width plus the
    /// leading margin; a line flushes when the next element would not
    /// fit.  Every line holds at least one element.
    fn pack_lines(
        &self,
        elements: Vec<LayoutElement>,
        measures: &[PrintMeasure],
    ) -> Vec<LayoutLine> {
        let usable = self.format.usable_width();
        let mut lines = Vec::new();
        let mut current: Vec<LayoutElement> = Vec::new();
        let mut current_width = 0.0;

        for element in elements {
            let need = MARGIN_AT_MEASURE_BEGINNING + element.width_print_units;
            if !current.is_empty() && current_width + need > usable {
                lines.push(self.finish_line(std::mem::take(&mut current), measures));
                current_width = 0.0;
            }
            current_width += need;
            current.push(element);
        }
        if !current.is_empty() {
            lines.push(self.finish_line(current, measures));
        }
        lines
    }

    fn finish_line(&self, elements: Vec<LayoutElement>, measures: &[PrintMeasure]) -> LayoutLine {
        let mut first_measure = None;
        let mut last_measure = None;
        for element in &elements {
            if let Some((a, b)) = element.measure_span() {
                first_measure = Some(first_measure.map_or(a, |f: usize| f.min(a)));
                last_measure = Some(last_measure.map_or(b, |l: usize| l.max(b)));
            }
        }
        let width_in_units = elements.iter().map(|e| e.width_units).sum();
        let element_count = elements.len();

        let mut track_refs = Vec::with_capacity(self.tracks.len());
        for (pos, (track_id, _)) in self.tracks.iter().enumerate() {
            let (first_note, last_note) =
                line_note_range(*track_id, first_measure, last_measure, measures);
            track_refs.push(LineTrackRef {
                track: *track_id,
                layout_elements_amount: element_count,
                show_measure_number: pos == 0,
                first_note,
                last_note,
                x0: 0.0,
                y0: 0.0,
                x1: 0.0,
                y1: 0.0,
            });
        }

        // Vertical demand: tracks silent on this line take no space; a
        // line silent in every track still gets the nominal heights so
        // empty measures stay visible.
        let mut level_height: i32 = self
            .tracks
            .iter()
            .zip(&track_refs)
            .map(|((id, p), r)| p.calculate_height(&self.sequence.tracks[*id], r))
            .sum();
        if level_height == 0 {
            level_height = self
                .tracks
                .iter()
                .map(|(id, p)| p.nominal_height(&self.sequence.tracks[*id]))
                .sum();
        }

        LayoutLine {
            elements,
            width_in_units,
            level_height,
            track_refs,
            first_measure,
            last_measure,
        }
    }

    // ── Horizontal placement ────────────────────────────────────────

    /// Stretch the line's elements to fill the usable width and assign
    /// absolute x bounds.  Spans are contiguous: each element ends where
    /// the next begins (the leading margin is absorbed into the previous
    /// span) and the last one ends at the right edge.
    fn place_line_elements(&self, line: &mut LayoutLine) {
        let x0 = self.format.margin_x;
        let x1 = self.format.width - self.format.margin_x;
        let available = x1 - x0;

        let needed: f64 = line
            .elements
            .iter()
            .map(|e| MARGIN_AT_MEASURE_BEGINNING + e.width_print_units)
            .sum();
        debug_assert!(needed > 0.0);
        if line.elements.len() > 1 {
            debug_assert!(
                needed <= available + 1e-6,
                "packed line wider ({needed}) than the page ({available})"
            );
        }
        let zoom = available / needed;

        let mut x = x0;
        for element in &mut line.elements {
            x += MARGIN_AT_MEASURE_BEGINNING * zoom;
            element.x_from = x;
            x += element.width_print_units * zoom;
            element.x_to = x;
        }
        // Close the gaps so every pixel of the line belongs to a span.
        for i in 0..line.elements.len() {
            let next_from = line.elements.get(i + 1).map(|e| e.x_from);
            line.elements[i].x_to = next_from.unwrap_or(x1);
        }
    }

    // ── Vertical placement ──────────────────────────────────────────

    /// Group lines into pages so each page's level total stays printable
    /// at the minimum legible level height.  Every page holds at least
    /// one line.
    fn paginate(&self, lines: &[LayoutLine]) -> Vec<LayoutPage> {
        let max_levels = (self.format.usable_height() / MIN_LEVEL_HEIGHT).floor() as i32;
        let mut pages = Vec::new();
        let mut first = 0;
        let mut levels = 0;

        for (i, line) in lines.iter().enumerate() {
            if i > first && levels + line.level_height > max_levels {
                pages.push(LayoutPage { first_line: first, last_line: i - 1 });
                first = i;
                levels = 0;
            }
            levels += line.level_height;
        }
        if first < lines.len() {
            pages.push(LayoutPage { first_line: first, last_line: lines.len() - 1 });
        }
        pages
    }

    /// Assign each line its vertical band and split it among the tracks
    /// in proportion to their level heights.
    fn assign_vertical(&self, lines: &mut [LayoutLine], pages: &[LayoutPage]) {
        let x0 = self.format.margin_x;
        let x1 = self.format.width - self.format.margin_x;
        let usable = self.format.usable_height();

        for page in pages {
            let total_levels: i32 = lines[page.first_line..=page.last_line]
                .iter()
                .map(|l| l.level_height)
                .sum();
            debug_assert!(total_levels > 0);
            // The inter-line gaps come out of the same budget.
            let line_count = (page.last_line - page.first_line + 1) as f64;
            let per_level = (usable - TEXT_HEIGHT * line_count).max(0.0) / total_levels as f64;

            let mut y = self.format.margin_y + HEADER_RESERVED;
            for line in &mut lines[page.first_line..=page.last_line] {
                let mut height = line.level_height as f64 * per_level;
                // A sparse page would otherwise blow each line up to fill
                // it; shrink until the per-level height is reasonable.
                while height / line.level_height as f64 > MAX_HEIGHT_PER_LEVEL {
                    height *= 0.95;
                }

                let all_empty = line.track_refs.iter().all(|r| r.first_note.is_none());
                let mut track_y = y;
                for i in 0..line.track_refs.len() {
                    let (track_id, printable) = &self.tracks[i];
                    let track = &self.sequence.tracks[*track_id];
                    // An all-empty line was budgeted at nominal heights.
                    let track_levels = if all_empty {
                        printable.nominal_height(track)
                    } else {
                        printable.calculate_height(track, &line.track_refs[i])
                    };
                    let band = height * track_levels as f64 / line.level_height as f64;
                    let track_ref = &mut line.track_refs[i];
                    track_ref.x0 = x0;
                    track_ref.x1 = x1;
                    track_ref.y0 = track_y;
                    track_ref.y1 = track_y + band;
                    track_y += band;
                }
                y += height + TEXT_HEIGHT;
            }
        }
    }

    // ── Rendering ───────────────────────────────────────────────────

    /// Render one page.  Pure with respect to the layout: rendering the
    /// same page twice produces identical draw calls, and pages can be
    /// rendered in any order.
    pub fn print_page(
        &self,
        page_index: usize,
        surface: &mut dyn PrintSurface,
    ) -> Result<(), LayoutError> {
        let layout = self.layout.as_ref().ok_or(LayoutError::NothingToPrint)?;
        if layout.pages.is_empty() {
            return Err(LayoutError::NothingToPrint);
        }
        let page = *layout
            .pages
            .get(page_index)
            .ok_or(LayoutError::PageOutOfRange {
                page: page_index,
                pages: layout.pages.len(),
            })?;

        self.draw_title(page_index, surface);

        for line in &layout.lines[page.first_line..=page.last_line] {
            for (i, (track_id, printable)) in self.tracks.iter().enumerate() {
                let track_ref = &line.track_refs[i];
                if track_ref.y1 - track_ref.y0 <= 0.0 {
                    continue;
                }
                let track = &self.sequence.tracks[*track_id];
                printable.draw_track(track, line, track_ref, &layout.measures, surface);
            }
        }
        Ok(())
    }

    /// Big centered title on the first page; a small "title, page N"
    /// header on the rest.
    fn draw_title(&self, page_index: usize, surface: &mut dyn PrintSurface) {
        let title = self.sequence.title.as_deref().unwrap_or("Untitled");
        let y = self.format.margin_y + TEXT_HEIGHT;
        if page_index == 0 {
            surface.draw_text(
                self.format.width / 2.0,
                y,
                title,
                TITLE_TEXT_SIZE,
                true,
                INK_COLOR,
                TextAnchor::Middle,
            );
        } else {
            surface.draw_text(
                self.format.margin_x,
                y,
                &format!("{}, page {}", title, page_index + 1),
                BODY_TEXT_SIZE,
                false,
                INK_COLOR,
                TextAnchor::Start,
            );
        }
    }
}

/// First/last note of `track` across the line's measure range.
fn line_note_range(
    track: usize,
    first_measure: Option<usize>,
    last_measure: Option<usize>,
    measures: &[PrintMeasure],
) -> (Option<usize>, Option<usize>) {
    let (Some(first), Some(last)) = (first_measure, last_measure) else {
        return (None, None);
    };
    let mut first_note = None;
    let mut last_note = None;
    for m in &measures[first..=last] {
        if let Some(r) = m.track_ref(track) {
            if let Some(f) = r.first_note {
                first_note = Some(first_note.map_or(f, |cur: usize| cur.min(f)));
            }
            if let Some(l) = r.last_note {
                last_note = Some(last_note.map_or(l, |cur: usize| cur.max(l)));
            }
        }
    }
    (first_note, last_note)
}
