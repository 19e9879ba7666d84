// Copyright 2026 the Timeslice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for capacity, demand, admission, and ordering.
//!
//! This module provides a [`TraceSink`] trait with one method per event the
//! engine emits. All method bodies default to no-ops, so implementing only
//! the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

use crate::admission::Admission;
use crate::capacity::{DisplayId, PoolKey};
use crate::demand::DemandBreakdown;
use crate::ordering::{CandidateUnit, LoadCounters, OrderingMode, UnitId};
use crate::source::{SourceKind, UnitSlot};
use crate::table::DisplayRole;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted once per display and pool after capacity initialization.
#[derive(Clone, Copy, Debug)]
pub struct CapacityEvent {
    /// The display.
    pub display: DisplayId,
    /// Its role.
    pub role: DisplayRole,
    /// Whether it is enabled.
    pub enabled: bool,
    /// The pool.
    pub pool: PoolKey,
    /// Available amount after initialization.
    pub available: u32,
    /// Whether the amount was reduced because another display borrows.
    pub lent: bool,
}

/// Emitted after a source's demand is computed.
#[derive(Clone, Copy, Debug)]
pub struct DemandEvent<'a> {
    /// The source.
    pub source: SourceKind,
    /// Demand and the buffer lookups behind it.
    pub breakdown: &'a DemandBreakdown,
}

/// Emitted after an admission check.
#[derive(Clone, Copy, Debug)]
pub struct AdmissionEvent {
    /// The display being planned.
    pub display: DisplayId,
    /// The source asking for a unit.
    pub source: SourceKind,
    /// The unit asked for.
    pub unit: UnitId,
    /// The unit's slot.
    pub slot: UnitSlot,
    /// The verdict.
    pub verdict: Admission,
}

/// Emitted after candidate units are ordered.
#[derive(Clone, Copy, Debug)]
pub struct OrderingEvent<'a> {
    /// Mode chosen from the source being placed.
    pub mode: OrderingMode,
    /// Counters seeded from already-assigned units.
    pub counters: &'a LoadCounters,
    /// Units in their new order.
    pub order: &'a [CandidateUnit],
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the engine.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called per display and pool after capacity initialization.
    fn on_capacity(&mut self, e: &CapacityEvent) {
        _ = e;
    }

    /// Called after a demand computation.
    fn on_demand(&mut self, e: &DemandEvent<'_>) {
        _ = e;
    }

    /// Called after an admission check.
    fn on_admission(&mut self, e: &AdmissionEvent) {
        _ = e;
    }

    /// Called after units are ordered.
    fn on_ordering(&mut self, e: &OrderingEvent<'_>) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Returns `true` if events are delivered somewhere.
    ///
    /// Lets callers skip building event payloads nobody will see.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        #[cfg(feature = "trace")]
        {
            self.sink.is_some()
        }
        #[cfg(not(feature = "trace"))]
        {
            false
        }
    }

    /// Emits a [`CapacityEvent`].
    #[inline]
    pub fn capacity(&mut self, e: &CapacityEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_capacity(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`DemandEvent`].
    #[inline]
    pub fn demand(&mut self, e: &DemandEvent<'_>) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_demand(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`AdmissionEvent`].
    #[inline]
    pub fn admission(&mut self, e: &AdmissionEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_admission(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`OrderingEvent`].
    #[inline]
    pub fn ordering(&mut self, e: &OrderingEvent<'_>) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_ordering(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::ResourceKind;
    use crate::table::{BlockId, PortSelector};

    fn sample_capacity() -> CapacityEvent {
        CapacityEvent {
            display: DisplayId(0),
            role: DisplayRole::Primary,
            enabled: true,
            pool: PoolKey {
                kind: ResourceKind::Buffer,
                block: BlockId(0),
                port: PortSelector::Any,
            },
            available: 100,
            lent: false,
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_capacity(&sample_capacity());
        sink.on_demand(&DemandEvent {
            source: SourceKind::ClientTarget,
            breakdown: &DemandBreakdown::default(),
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        assert!(!tracer.is_active());
        tracer.capacity(&sample_capacity());
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            available: Vec<u32>,
        }
        impl TraceSink for RecordingSink {
            fn on_capacity(&mut self, e: &CapacityEvent) {
                self.available.push(e.available);
            }
        }

        let mut sink = RecordingSink {
            available: Vec::new(),
        };
        let mut tracer = Tracer::new(&mut sink);
        assert!(tracer.is_active());
        tracer.capacity(&sample_capacity());
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.available, &[100]);
    }
}
