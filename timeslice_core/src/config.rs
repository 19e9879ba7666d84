// Copyright 2026 the Timeslice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine configuration.
//!
//! Everything that differs between hardware generations and is not a table
//! value lives in [`EngineConfig`]: which blocks and ports exist, how each
//! resource kind is shared, the overlap margin, the width alignment rules for
//! compressed sources, and the hardware revision used to select table rows.

use alloc::vec::Vec;

use crate::kind::{KindMap, ResourceKind};
use crate::table::{BlockId, HwRevision, PortId, PortSelector};

/// Pixel rows added above and below a destination rectangle before testing
/// for overlap.
pub const DEFAULT_OVERLAP_MARGIN: u32 = 68;

/// Granularity at which a resource kind's capacity is shared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sharing {
    /// One pool per hardware block; the port is irrelevant.
    #[default]
    PerBlock,
    /// One pool per (block, port) pair.
    PerPort,
}

/// Width alignment applied to compressed sources before bucketing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WidthAlignment {
    /// Sub-sampled compressed, not rotated.
    pub subsampled: u32,
    /// Sub-sampled compressed, rotated. Each plane also gets one extra
    /// alignment unit of guard width.
    pub subsampled_rotated: u32,
    /// Block-compressed with more than 16 bits per pixel.
    pub block_wide: u32,
    /// Block-compressed with 16 bits per pixel or less.
    pub block_narrow: u32,
}

impl Default for WidthAlignment {
    fn default() -> Self {
        Self {
            subsampled: 32,
            subsampled_rotated: 4,
            block_wide: 8,
            block_narrow: 16,
        }
    }
}

/// Configuration for the [`Engine`](crate::engine::Engine).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    /// Selects which [`ResourceTable`](crate::table::ResourceTable) rows apply.
    pub revision: HwRevision,
    /// Overlap margin in pixel rows.
    pub overlap_margin: u32,
    /// Sharing granularity per resource kind.
    pub sharing: KindMap<Sharing>,
    /// Hardware blocks present.
    pub blocks: Vec<BlockId>,
    /// Memory ports present.
    pub ports: Vec<PortId>,
    /// Width alignment rules.
    pub alignment: WidthAlignment,
}

impl EngineConfig {
    /// Two blocks and two ports with every kind shared per block.
    #[must_use]
    pub fn two_block_two_port() -> Self {
        Self {
            revision: HwRevision(0),
            overlap_margin: DEFAULT_OVERLAP_MARGIN,
            sharing: KindMap::splat(Sharing::PerBlock),
            blocks: alloc::vec![BlockId(0), BlockId(1)],
            ports: alloc::vec![PortId(0), PortId(1)],
            alignment: WidthAlignment::default(),
        }
    }

    /// Returns the config with `kind` shared at the given granularity.
    #[must_use]
    pub fn with_sharing(mut self, kind: ResourceKind, sharing: Sharing) -> Self {
        self.sharing.set(kind, sharing);
        self
    }

    /// Returns the config with a different overlap margin.
    #[must_use]
    pub fn with_overlap_margin(mut self, margin: u32) -> Self {
        self.overlap_margin = margin;
        self
    }

    /// Returns the port selector under which `kind`'s capacity is pooled for
    /// a unit on `port`.
    #[inline]
    #[must_use]
    pub fn selector(&self, kind: ResourceKind, port: PortId) -> PortSelector {
        match self.sharing[kind] {
            Sharing::PerBlock => PortSelector::Any,
            Sharing::PerPort => PortSelector::Port(port),
        }
    }

    /// Returns the port selectors that carry separate pools for `kind`.
    pub fn selectors(&self, kind: ResourceKind) -> impl Iterator<Item = PortSelector> + '_ {
        let per_port = self.sharing[kind] == Sharing::PerPort;
        let ports = self
            .ports
            .iter()
            .filter(move |_| per_port)
            .map(|&p| PortSelector::Port(p));
        let any = (!per_port).then_some(PortSelector::Any);
        any.into_iter().chain(ports)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::two_block_two_port()
    }
}
