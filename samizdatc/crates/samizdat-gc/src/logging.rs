//! `tracing` integration for the collector.
//!
//! Reworked from the teacher's standalone log-level/format module into a
//! set of `tracing` spans and events: one span per collection cycle,
//! matching the chatty-diagnostic style the reference's `LookupCache.c`
//! hook implies, reborn here as `tracing` counters instead of a private
//! logging facility.

use tracing::{debug, trace};

/// Opens a span for one collection cycle. Dropped (via `_guard`) when
/// the cycle finishes; callers should hold the guard for the cycle's
/// duration.
pub fn gc_cycle_span() -> tracing::span::EnteredSpan {
    tracing::debug_span!("gc_cycle").entered()
}

pub fn log_cycle_start(live_before: usize, alloc_count: usize) {
    debug!(live_before, alloc_count, "collection starting");
}

pub fn log_cycle_end(live_after: usize, freed: usize) {
    debug!(live_after, freed, "collection finished");
}

pub fn log_mark(class: samizdat_util::ClassId) {
    trace!(class = class.0, "marking value");
}

pub fn log_immortalize(class: samizdat_util::ClassId) {
    debug!(class = class.0, "registered immortal");
}

pub fn log_threshold_trip(alloc_count: usize, threshold: usize) {
    debug!(alloc_count, threshold, "allocation threshold tripped");
}
