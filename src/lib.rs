//! printlib — print-layout engine for tablature and standard notation.
//!
//! Takes an in-memory sequence (tracks of notes on a shared measure
//! timeline), computes a paginated layout with optional repetition
//! collapsing, and renders each page to a drawing surface (SVG bundled).
//!
//! # Example
//! ```no_run
//! use printlib::{print_to_svg, MeasureTimeline, NotationType, Note, Sequence, Track};
//!
//! let timeline = MeasureTimeline::new(960, 4, &[]);
//! let track = Track::new("guitar", NotationType::Tablature, vec![
//!     Note::with_fret(0, 960, 64, 0, 0),
//! ]);
//! let sequence = Sequence::new(960, timeline, vec![track]).with_title("Riff");
//!
//! let pages = print_to_svg(&sequence, &[0], true).unwrap();
//! println!("{} page(s)", pages.len());
//! ```

pub mod layout;
pub mod model;

pub use layout::{
    get_note_print_x, tick_to_x, EditorPrintable, ElementKind, LayoutElement, LayoutError,
    LayoutLine, LayoutPage, LayoutResult, LineTrackRef, PageFormat, PrintMeasure, PrintSurface,
    SequencePrintable, SvgSurface, TickPlacementSolver,
};
pub use model::{
    ControllerEvent, MeasureTimeline, NotationType, Note, Sequence, TimeSignature, Track,
};

/// Lay out the given tracks of a sequence and render every page to SVG,
/// one string per page.  Convenience wrapper around [`SequencePrintable`]
/// with the default page format.
pub fn print_to_svg(
    sequence: &Sequence,
    tracks: &[usize],
    detect_repetitions: bool,
) -> Result<Vec<String>, LayoutError> {
    let format = PageFormat::default();
    let mut printable = SequencePrintable::new(sequence, format);
    for &track in tracks {
        printable.add_track(track);
    }
    printable.calculate_layout(detect_repetitions);

    if printable.page_amount() == 0 {
        return Err(LayoutError::NothingToPrint);
    }

    let mut pages = Vec::with_capacity(printable.page_amount());
    for page in 0..printable.page_amount() {
        let mut surface = SvgSurface::new(format.width, format.height);
        printable.print_page(page, &mut surface)?;
        pages.push(surface.build());
    }
    Ok(pages)
}

/// Serialize a computed layout to a JSON string.
/// Useful for inspecting placement decisions in tooling.
pub fn layout_to_json(layout: &LayoutResult) -> Result<String, String> {
    serde_json::to_string_pretty(layout).map_err(|e| format!("JSON serialization error: {e}"))
}
