// Copyright 2026 the Timeslice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory event recording.
//!
//! [`RecorderSink`] implements [`TraceSink`] and keeps an owned copy of every
//! event as a [`RecordedEvent`]. Borrowed payloads (demand breakdowns, unit
//! orders) are cloned.

use timeslice_core::admission::Admission;
use timeslice_core::demand::DemandBreakdown;
use timeslice_core::ordering::{CandidateUnit, LoadCounters, OrderingMode};
use timeslice_core::source::SourceKind;
use timeslice_core::trace::{AdmissionEvent, CapacityEvent, DemandEvent, OrderingEvent, TraceSink};

// ---------------------------------------------------------------------------
// Recorded events
// ---------------------------------------------------------------------------

/// A recorded demand computation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DemandRecord {
    /// The source.
    pub source: SourceKind,
    /// Demand and lookups.
    pub breakdown: DemandBreakdown,
}

/// A recorded unit ordering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderingRecord {
    /// Mode used.
    pub mode: OrderingMode,
    /// Counters seeded from assigned units.
    pub counters: LoadCounters,
    /// Units in the order produced.
    pub order: Vec<CandidateUnit>,
}

/// An owned copy of an event.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`CapacityEvent`].
    Capacity(CapacityEvent),
    /// A [`DemandEvent`].
    Demand(DemandRecord),
    /// An [`AdmissionEvent`].
    Admission(AdmissionEvent),
    /// An [`OrderingEvent`].
    Ordering(OrderingRecord),
}

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecorderSink {
    events: Vec<RecordedEvent>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded events.
    #[must_use]
    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    /// Consumes the recorder and returns the recorded events.
    #[must_use]
    pub fn into_events(self) -> Vec<RecordedEvent> {
        self.events
    }

    /// Drops everything recorded so far.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Admission events that were rejected, in order.
    pub fn rejections(&self) -> impl Iterator<Item = &AdmissionEvent> + '_ {
        self.events.iter().filter_map(|e| match e {
            RecordedEvent::Admission(a) if matches!(a.verdict, Admission::Rejected(_)) => Some(a),
            _ => None,
        })
    }
}

impl TraceSink for RecorderSink {
    fn on_capacity(&mut self, e: &CapacityEvent) {
        self.events.push(RecordedEvent::Capacity(*e));
    }

    fn on_demand(&mut self, e: &DemandEvent<'_>) {
        self.events.push(RecordedEvent::Demand(DemandRecord {
            source: e.source,
            breakdown: e.breakdown.clone(),
        }));
    }

    fn on_admission(&mut self, e: &AdmissionEvent) {
        self.events.push(RecordedEvent::Admission(*e));
    }

    fn on_ordering(&mut self, e: &OrderingEvent<'_>) {
        self.events.push(RecordedEvent::Ordering(OrderingRecord {
            mode: e.mode,
            counters: e.counters.clone(),
            order: e.order.to_vec(),
        }));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use timeslice_core::admission::Rejection;
    use timeslice_core::capacity::DisplayId;
    use timeslice_core::image::{Image, ImageRect, PixelFormat};
    use timeslice_core::kind::ResourceKind;
    use timeslice_core::ordering::{self, PhysicalType, UnitCaps, UnitId};
    use timeslice_core::policy::StandardPolicy;
    use timeslice_core::source::{LayerId, UnitSlot};
    use timeslice_core::table::{BlockId, PortId, PortSelector};

    fn admission(verdict: Admission) -> AdmissionEvent {
        AdmissionEvent {
            display: DisplayId(0),
            source: SourceKind::Layer(LayerId(4)),
            unit: UnitId::new(PhysicalType(0), 1),
            slot: UnitSlot::new(BlockId(0), PortId(0)),
            verdict,
        }
    }

    #[test]
    fn records_admissions_and_filters_rejections() {
        let rejected = Admission::Rejected(Rejection {
            source: SourceKind::Layer(LayerId(4)),
            kind: ResourceKind::Buffer,
            block: BlockId(0),
            port: PortSelector::Any,
            needed: 10,
            available: 5,
        });
        let mut rec = RecorderSink::new();
        rec.on_admission(&admission(Admission::Admitted));
        rec.on_admission(&admission(rejected));

        assert_eq!(rec.events().len(), 2);
        let rejections: Vec<_> = rec.rejections().collect();
        assert_eq!(rejections.len(), 1);
        assert_eq!(rejections[0].verdict, rejected);
    }

    #[test]
    fn ordering_record_owns_the_order() {
        let mut units = [
            CandidateUnit::new(
                UnitId::new(PhysicalType(0), 1),
                UnitSlot::new(BlockId(0), PortId(1)),
                UnitCaps::default(),
            ),
            CandidateUnit::new(
                UnitId::new(PhysicalType(0), 0),
                UnitSlot::new(BlockId(0), PortId(0)),
                UnitCaps::default(),
            ),
        ];
        let r = ImageRect::new(0, 0, 64, 64);
        let image = Image::new(r, r, PixelFormat::RGBA_8888);
        let outcome = ordering::order_units(&mut units, &image, &StandardPolicy);

        let mut rec = RecorderSink::new();
        rec.on_ordering(&OrderingEvent {
            mode: outcome.mode,
            counters: &outcome.counters,
            order: &units,
        });
        match &rec.into_events()[..] {
            [RecordedEvent::Ordering(o)] => {
                assert_eq!(o.mode, OrderingMode::AxiBalance);
                assert_eq!(o.order[0].id.physical_index, 0);
                assert_eq!(o.order.len(), 2);
            }
            other => panic!("expected one ordering, got {other:?}"),
        }
    }

    #[test]
    fn clear_drops_events() {
        let mut rec = RecorderSink::new();
        rec.on_admission(&admission(Admission::Admitted));
        rec.clear();
        assert!(rec.events().is_empty());
    }
}
