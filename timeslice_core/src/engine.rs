// Copyright 2026 the Timeslice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The engine facade.
//!
//! [`Engine`] bundles the configuration, the two immutable tables, the
//! resource policy, and the capacity state it owns. The binder drives it:
//!
//! ```text
//!   topology change ──► configure_displays ──► CapacityState
//!                                                   │
//!   per frame, per source:                          ▼
//!     compute_demand ──► order_units ──► can_assign (per unit, in order)
//! ```
//!
//! Only [`Engine::configure_displays`] mutates the engine. Everything else
//! takes `&self`, so a frame can be planned against a shared reference.

use crate::admission::{Admission, AdmissionChecker, DisplayFrame};
use crate::buffer::BufferTable;
use crate::capacity::{CapacityState, DisplayDesc};
use crate::config::EngineConfig;
use crate::demand::{self, Demand};
use crate::image::Image;
use crate::ordering::{self, CandidateUnit, OrderingOutcome};
use crate::policy::{ResourcePolicy, StandardPolicy};
use crate::source::{PlacedSource, SourceKind};
use crate::table::ResourceTable;
use crate::trace::{AdmissionEvent, DemandEvent, OrderingEvent, Tracer};

/// Admission and ordering engine for one set of hardware tables.
#[derive(Debug)]
pub struct Engine<'t, P = StandardPolicy> {
    config: EngineConfig,
    resources: &'t ResourceTable,
    buffers: &'t BufferTable,
    policy: P,
    capacity: CapacityState,
}

impl<'t> Engine<'t> {
    /// Creates an engine with the [`StandardPolicy`].
    #[must_use]
    pub fn new(
        config: EngineConfig,
        resources: &'t ResourceTable,
        buffers: &'t BufferTable,
    ) -> Self {
        Self::with_policy(config, resources, buffers, StandardPolicy)
    }
}

impl<'t, P: ResourcePolicy> Engine<'t, P> {
    /// Creates an engine with a custom policy.
    ///
    /// No display has capacity until [`configure_displays`] runs.
    ///
    /// [`configure_displays`]: Self::configure_displays
    #[must_use]
    pub fn with_policy(
        config: EngineConfig,
        resources: &'t ResourceTable,
        buffers: &'t BufferTable,
        policy: P,
    ) -> Self {
        Self {
            config,
            resources,
            buffers,
            policy,
            capacity: CapacityState::new(),
        }
    }

    /// Rebuilds per-display capacity for a new display topology.
    pub fn configure_displays(&mut self, displays: &[DisplayDesc], tracer: &mut Tracer<'_>) {
        self.capacity
            .initialize(displays, self.resources, &self.config, tracer);
    }

    /// Computes the demand of `source` with image `image`.
    pub fn compute_demand(
        &self,
        source: SourceKind,
        image: &Image,
        tracer: &mut Tracer<'_>,
    ) -> Demand {
        let alignment = &self.config.alignment;
        if !tracer.is_active() {
            return demand::compute_demand(image, self.buffers, alignment, &self.policy);
        }
        let breakdown = demand::breakdown(image, self.buffers, alignment, &self.policy);
        tracer.demand(&DemandEvent {
            source,
            breakdown: &breakdown,
        });
        breakdown.demand
    }

    /// Computes the demand of `source` and returns it as an unbound
    /// [`PlacedSource`].
    pub fn place(&self, source: SourceKind, image: Image, tracer: &mut Tracer<'_>) -> PlacedSource {
        let demand = self.compute_demand(source, &image, tracer);
        PlacedSource::new(source, image, demand)
    }

    /// Tests whether `candidate` may be bound to `unit` on `frame`'s display.
    pub fn can_assign(
        &self,
        frame: &DisplayFrame,
        unit: &CandidateUnit,
        candidate: &PlacedSource,
        tracer: &mut Tracer<'_>,
    ) -> Admission {
        let checker = AdmissionChecker::new(self.capacity.display(frame.display), &self.config);
        let verdict = checker.check(frame, unit.slot, candidate);
        tracer.admission(&AdmissionEvent {
            display: frame.display,
            source: candidate.source,
            unit: unit.id,
            slot: unit.slot,
            verdict,
        });
        verdict
    }

    /// Sorts `units` into the trial order for a source with image `image`.
    pub fn order_units(
        &self,
        units: &mut [CandidateUnit],
        image: &Image,
        tracer: &mut Tracer<'_>,
    ) -> OrderingOutcome {
        let outcome = ordering::order_units(units, image, &self.policy);
        tracer.ordering(&OrderingEvent {
            mode: outcome.mode,
            counters: &outcome.counters,
            order: units,
        });
        outcome
    }

    /// The capacity state.
    #[must_use]
    pub fn capacity(&self) -> &CapacityState {
        &self.capacity
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
