//! Per-measure proportional placement — converts the discrete ticks that
//! must be visually distinguishable inside one measure into fractional
//! `[from, to)` spans of the measure's allotted width.
//!
//! This is the core of cross-track horizontal alignment: every printed
//! track registers its symbols here, ties on the same onset merge into
//! one slot, and renderers later ask "where is this tick" through the
//! solved table.

use serde::Serialize;

use super::constants::*;

/// One symbol registered for placement.
#[derive(Debug, Clone, Copy, Serialize)]
struct Symbol {
    tick_from: i32,
    tick_to: i32,
    width: f64,
    track: usize,
}

/// A solved slot: the fractional area one distinguishable tick occupies.
#[derive(Debug, Clone, Copy, Serialize)]
struct Slot {
    tick: i32,
    from: f64,
    to: f64,
}

/// Computes, for one measure, the relative horizontal placement of every
/// distinguishable tick.  Written once during layout, read many times
/// during rendering.
#[derive(Debug, Clone, Serialize)]
pub struct TickPlacementSolver {
    first_tick: i32,
    last_tick: i32,
    ticks_per_beat: i32,
    symbols: Vec<Symbol>,
    slots: Vec<Slot>,
    needed_width: f64,
    solved: bool,
}

impl TickPlacementSolver {
    pub(super) fn new(first_tick: i32, last_tick: i32, ticks_per_beat: i32) -> Self {
        Self {
            first_tick,
            last_tick,
            ticks_per_beat,
            symbols: Vec::new(),
            slots: Vec::new(),
            needed_width: MIN_MEASURE_WIDTH,
            solved: false,
        }
    }

    /// Register one symbol that must be visually distinguishable.
    /// Symbols sharing an onset tick (across tracks) merge into one slot.
    pub fn add_symbol(&mut self, tick_from: i32, tick_to: i32, width: f64, track: usize) {
        debug_assert!(!self.solved, "symbols must be added before solving");
        self.symbols.push(Symbol { tick_from, tick_to, width, track });
    }

    /// Compute the relative placement table.
    ///
    /// Each interval between consecutive distinguishable ticks gets the
    /// larger of its duration-proportional share and the widest symbol
    /// registered at its start (with a minimum slot so nothing collapses
    /// to zero width); leading silence gets its proportional share only.
    pub(super) fn solve(&mut self) {
        let beat = self.ticks_per_beat.max(1) as f64;

        // Unique onset ticks, ascending.
        let mut onsets: Vec<i32> = self
            .symbols
            .iter()
            .map(|s| s.tick_from)
            .filter(|&t| t >= self.first_tick && t < self.last_tick)
            .collect();
        onsets.sort_unstable();
        onsets.dedup();

        if onsets.is_empty() {
            self.needed_width = EMPTY_MEASURE_WIDTH;
            self.solved = true;
            return;
        }

        // Interval boundaries: measure start, every onset, measure end.
        // The leading interval (silence before the first onset) has no
        // symbol and takes only its proportional width.
        let mut widths: Vec<f64> = Vec::with_capacity(onsets.len() + 1);
        let leading = onsets[0] - self.first_tick;
        if leading > 0 {
            widths.push(leading as f64 / beat * PER_BEAT_MIN_WIDTH);
        }

        for (i, &tick) in onsets.iter().enumerate() {
            let next = if i + 1 < onsets.len() { onsets[i + 1] } else { self.last_tick };
            let duration = (next - tick).max(1);
            let proportional = duration as f64 / beat * PER_BEAT_MIN_WIDTH;
            let widest = self
                .symbols
                .iter()
                .filter(|s| s.tick_from == tick)
                .fold(0.0f64, |acc, s| acc.max(s.width));
            widths.push(proportional.max(widest).max(MIN_SYMBOL_SLOT_WIDTH));
        }

        let total: f64 = widths.iter().sum();
        debug_assert!(total > 0.0);

        let mut slots = Vec::with_capacity(onsets.len());
        let mut cursor = 0.0;
        let mut width_idx = 0;
        if leading > 0 {
            cursor += widths[0] / total;
            width_idx = 1;
        }
        for &tick in &onsets {
            let share = widths[width_idx] / total;
            slots.push(Slot { tick, from: cursor, to: cursor + share });
            cursor += share;
            width_idx += 1;
        }

        self.slots = slots;
        self.needed_width = total.max(MIN_MEASURE_WIDTH);
        self.solved = true;
    }

    /// Fractional `[from, to)` area of `tick`, or None if the tick was
    /// never registered in this measure.
    pub fn symbol_area(&self, tick: i32) -> Option<(f64, f64)> {
        debug_assert!(self.solved, "placement queried before solving");
        self.slots
            .binary_search_by_key(&tick, |s| s.tick)
            .ok()
            .map(|i| (self.slots[i].from, self.slots[i].to))
    }

    /// Number of distinguishable slots (abstract width units), at least 1.
    pub fn width_units(&self) -> i32 {
        (self.slots.len() as i32).max(1)
    }

    /// Minimum concrete print width of the measure.
    pub fn needed_width(&self) -> f64 {
        self.needed_width
    }

    /// Whether any symbol in `track` was registered at `tick`.
    pub fn appears_in_track(&self, tick: i32, track: usize) -> bool {
        self.symbols.iter().any(|s| s.tick_from == tick && s.track == track)
    }

    pub fn first_tick(&self) -> i32 {
        self.first_tick
    }

    pub fn last_tick(&self) -> i32 {
        self.last_tick
    }
}
