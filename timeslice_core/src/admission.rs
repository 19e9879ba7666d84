// Copyright 2026 the Timeslice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Admission of a source onto a unit.
//!
//! A block's shared resources are time-multiplexed along the scan, so a unit
//! only competes with sources whose destination rectangles
//! [overlap](crate::overlap::overlaps) its own. For a candidate source and a
//! unit slot, [`AdmissionChecker::check`]:
//!
//! 1. Sums the demand of every other bound source in the same block that
//!    overlaps the candidate. For per-port kinds only sources on the same
//!    port count.
//! 2. Rejects if, for any kind, that sum plus the candidate's own demand
//!    exceeds the display's available capacity for the pool.
//! 3. Repeats the test for every bound source in the same block that overlaps
//!    the candidate, this time counting the candidate as if it were bound, so
//!    that accepting it cannot over-subscribe a neighbor.
//!
//! Checks are read-only; binding is up to the caller.

use alloc::vec::Vec;

use crate::capacity::{DisplayCapacity, DisplayId};
use crate::config::EngineConfig;
use crate::kind::{KindMap, ResourceKind};
use crate::overlap::overlaps;
use crate::source::{PlacedSource, SourceKind, UnitSlot};
use crate::table::{BlockId, PortSelector};

/// The sources of one display for the frame being planned.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DisplayFrame {
    /// The display.
    pub display: DisplayId,
    /// Display height in pixel rows; bounds the overlap margin.
    pub height: u32,
    /// Layers and composition targets, bound or not.
    pub sources: Vec<PlacedSource>,
}

impl DisplayFrame {
    /// Creates a frame with no sources.
    #[must_use]
    pub fn new(display: DisplayId, height: u32) -> Self {
        Self {
            display,
            height,
            sources: Vec::new(),
        }
    }

    /// Returns the source with identity `source`, if present.
    #[must_use]
    pub fn source(&self, source: SourceKind) -> Option<&PlacedSource> {
        self.sources.iter().find(|s| s.source == source)
    }

    /// Binds `source` to `slot`, adding it if absent.
    pub fn bind(&mut self, placed: PlacedSource, slot: UnitSlot) {
        let placed = placed.bound_to(slot);
        match self.sources.iter_mut().find(|s| s.source == placed.source) {
            Some(existing) => *existing = placed,
            None => self.sources.push(placed),
        }
    }

    /// Sources currently bound to a unit.
    pub fn bound(&self) -> impl Iterator<Item = (&PlacedSource, UnitSlot)> + '_ {
        self.sources
            .iter()
            .filter_map(|s| s.slot.map(|slot| (s, slot)))
    }
}

/// Why a source was not admitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rejection {
    /// The source that would be over-subscribed: the candidate itself or one
    /// of its overlapping neighbors.
    pub source: SourceKind,
    /// The kind that would be exceeded.
    pub kind: ResourceKind,
    /// The block of the exceeded pool.
    pub block: BlockId,
    /// The port of the exceeded pool.
    pub port: PortSelector,
    /// Accumulated plus own demand.
    pub needed: u32,
    /// What the display has available in the pool.
    pub available: u32,
}

/// Verdict of an admission check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Admission {
    /// The source fits.
    Admitted,
    /// The source does not fit.
    Rejected(Rejection),
}

impl Admission {
    /// Returns `true` if the source fits.
    #[inline]
    #[must_use]
    pub const fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted)
    }
}

/// Read-only admission test against one display's capacity.
#[derive(Clone, Copy, Debug)]
pub struct AdmissionChecker<'a> {
    capacity: Option<&'a DisplayCapacity>,
    config: &'a EngineConfig,
}

impl<'a> AdmissionChecker<'a> {
    /// Creates a checker. A display without capacity admits only sources
    /// with zero demand.
    #[must_use]
    pub fn new(capacity: Option<&'a DisplayCapacity>, config: &'a EngineConfig) -> Self {
        Self { capacity, config }
    }

    /// Tests whether `candidate` may be bound to a unit at `slot`.
    #[must_use]
    pub fn check(
        &self,
        frame: &DisplayFrame,
        slot: UnitSlot,
        candidate: &PlacedSource,
    ) -> Admission {
        let others: Vec<(&PlacedSource, UnitSlot)> = frame
            .bound()
            .filter(|(s, _)| s.source != candidate.source)
            .collect();

        let acc = self.accumulate(frame.height, candidate, slot, &others, None);
        if let Err(rejection) = self.fits(candidate, slot, &acc) {
            return Admission::Rejected(rejection);
        }

        for &(neighbor, neighbor_slot) in &others {
            if neighbor_slot.block != slot.block
                || !overlaps(
                    &neighbor.image.dst,
                    &candidate.image.dst,
                    self.config.overlap_margin,
                    frame.height,
                )
            {
                continue;
            }
            let acc = self.accumulate(
                frame.height,
                neighbor,
                neighbor_slot,
                &others,
                Some((candidate, slot)),
            );
            if let Err(rejection) = self.fits(neighbor, neighbor_slot, &acc) {
                return Admission::Rejected(rejection);
            }
        }

        Admission::Admitted
    }

    /// Sums the demand of every source in `others` (plus `extra`) that shares
    /// `slot`'s pool and overlaps `target`, excluding `target` itself.
    fn accumulate<'s>(
        &self,
        height: u32,
        target: &PlacedSource,
        slot: UnitSlot,
        others: &[(&'s PlacedSource, UnitSlot)],
        extra: Option<(&'s PlacedSource, UnitSlot)>,
    ) -> KindMap<u32> {
        let mut acc = KindMap::<u32>::default();
        for (other, other_slot) in others.iter().copied().chain(extra) {
            if other.source == target.source
                || other_slot.block != slot.block
                || !overlaps(
                    &other.image.dst,
                    &target.image.dst,
                    self.config.overlap_margin,
                    height,
                )
            {
                continue;
            }
            for kind in ResourceKind::ALL {
                if self.config.selector(kind, slot.port)
                    != self.config.selector(kind, other_slot.port)
                {
                    continue;
                }
                acc[kind] = acc[kind].saturating_add(other.demand.get(kind));
            }
        }
        acc
    }

    fn fits(
        &self,
        source: &PlacedSource,
        slot: UnitSlot,
        acc: &KindMap<u32>,
    ) -> Result<(), Rejection> {
        for kind in ResourceKind::ALL {
            let port = self.config.selector(kind, slot.port);
            let available = self
                .capacity
                .map_or(0, |c| c.available(kind, slot.block, port));
            let needed = acc[kind].saturating_add(source.demand.get(kind));
            if needed > available {
                return Err(Rejection {
                    source: source.source,
                    kind,
                    block: slot.block,
                    port,
                    needed,
                    available,
                });
            }
        }
        Ok(())
    }
}
