//! Shared constants for the print-layout engine (all in print user units).

// ── Page & margins ──────────────────────────────────────────────────
pub(super) const DEFAULT_PAGE_WIDTH: f64 = 680.0;
pub(super) const DEFAULT_PAGE_HEIGHT: f64 = 880.0;
pub(super) const PAGE_MARGIN_X: f64 = 30.0;
pub(super) const PAGE_MARGIN_Y: f64 = 30.0;

// ── Header ──────────────────────────────────────────────────────────
pub(super) const TEXT_HEIGHT: f64 = 12.0;
/// Vertical space not printed with notation: title at the top, two
/// blank text rows below it, one below the last line.
pub(super) const HEADER_RESERVED: f64 = TEXT_HEIGHT * 4.0;
pub(super) const TITLE_TEXT_SIZE: f64 = 13.0;
pub(super) const BODY_TEXT_SIZE: f64 = 9.0;

// ── Measure packing ─────────────────────────────────────────────────
/// Leading margin added before every element when packing a line.
pub(super) const MARGIN_AT_MEASURE_BEGINNING: f64 = 12.0;
pub(super) const MIN_MEASURE_WIDTH: f64 = 38.0;
pub(super) const PER_BEAT_MIN_WIDTH: f64 = 55.0;
/// Minimum horizontal slot for one symbol, so short notes stay legible.
pub(super) const MIN_SYMBOL_SLOT_WIDTH: f64 = 12.0;
/// Hard cap on the pixel span handed out for a single symbol.  Known
/// limitation inherited from the reference behavior: the space reclaimed
/// by the clamp is not redistributed to neighboring symbols.
pub(super) const MAX_SYMBOL_SPAN: f64 = 175.0;
/// X offset past the line's right edge for ties continuing on the next line.
pub(super) const TIE_CONTINUATION_MARGIN: f64 = 10.0;

// ── Marker element widths ───────────────────────────────────────────
pub(super) const EMPTY_MEASURE_WIDTH: f64 = 40.0;
pub(super) const REPEAT_MARKER_WIDTH: f64 = 40.0;
pub(super) const RIFF_MARKER_WIDTH: f64 = 60.0;
pub(super) const PLAY_MANY_TIMES_WIDTH: f64 = 40.0;
pub(super) const TIME_SIG_WIDTH: f64 = 24.0;
pub(super) const LINE_HEADER_WIDTH: f64 = 48.0;

// ── Repetition detection ────────────────────────────────────────────
/// How many consecutive repeats of the same single measure it takes to
/// collapse them into one "play N times" marker instead of printing a
/// back-reference per measure.
pub(super) const MIN_PLAY_MANY_TIMES_RUN: usize = 4;

// ── Vertical packing ────────────────────────────────────────────────
/// Minimum legible pixel height of one level; drives how many levels
/// fit on a page.
pub(super) const MIN_LEVEL_HEIGHT: f64 = 14.0;
/// A line whose pixel height per level exceeds this ratio is shrunk
/// iteratively so a single sparse track cannot stretch absurdly.
pub(super) const MAX_HEIGHT_PER_LEVEL: f64 = 10.0;
/// Abstract vertical demand of a standard-notation staff.
pub(super) const SCORE_LEVEL_HEIGHT: i32 = 10;

// ── Colors & pens ───────────────────────────────────────────────────
pub(super) const INK_COLOR: &str = "#000000";
pub(super) const MARKER_COLOR: &str = "#0000ff";
pub(super) const STRING_COLOR: &str = "#7d7d7d";
pub(super) const DIVIDER_WIDTH: f64 = 1.6;
pub(super) const STRING_LINE_WIDTH: f64 = 0.8;
pub(super) const STAFF_LINE_WIDTH: f64 = 0.8;
