// Copyright 2026 the Timeslice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sources that occupy hardware units.
//!
//! Besides ordinary layers, a display may route one of two composition
//! targets through a hardware unit: the buffer produced by device-side
//! (hardware) composition and the buffer produced by client (GPU) composition.
//! The engine treats all three alike; [`SourceKind`] only says which one a
//! [`PlacedSource`] is.

use core::fmt;

use crate::demand::Demand;
use crate::image::Image;
use crate::table::{BlockId, PortId};

/// Identifies a layer within one display's frame.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayerId(pub u32);

impl fmt::Debug for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LayerId({})", self.0)
    }
}

/// What a [`PlacedSource`] is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SourceKind {
    /// An application layer.
    Layer(LayerId),
    /// The output of device-side composition.
    DeviceTarget,
    /// The output of client (GPU) composition.
    ClientTarget,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Layer(id) => write!(f, "layer#{}", id.0),
            Self::DeviceTarget => f.write_str("device-target"),
            Self::ClientTarget => f.write_str("client-target"),
        }
    }
}

/// Where a unit sits: its block and memory port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitSlot {
    /// Hardware block.
    pub block: BlockId,
    /// Memory port.
    pub port: PortId,
}

impl UnitSlot {
    /// Creates a slot.
    #[must_use]
    pub const fn new(block: BlockId, port: PortId) -> Self {
        Self { block, port }
    }
}

/// A source with its image, demand, and (if bound) the slot of its unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacedSource {
    /// What the source is.
    pub source: SourceKind,
    /// Its image for this frame.
    pub image: Image,
    /// Its demand for this frame.
    pub demand: Demand,
    /// The slot of the unit it is bound to, if any.
    pub slot: Option<UnitSlot>,
}

impl PlacedSource {
    /// Creates an unbound source.
    #[must_use]
    pub const fn new(source: SourceKind, image: Image, demand: Demand) -> Self {
        Self {
            source,
            image,
            demand,
            slot: None,
        }
    }

    /// Returns the source bound to `slot`.
    #[must_use]
    pub const fn bound_to(mut self, slot: UnitSlot) -> Self {
        self.slot = Some(slot);
        self
    }
}
