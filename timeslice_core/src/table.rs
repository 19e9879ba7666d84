// Copyright 2026 the Timeslice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Static capacity table.
//!
//! A [`ResourceTable`] maps a [`ResourceIndex`] to a [`Capacity`] pair. The
//! index names a resource kind, hardware block, port or the
//! [`PortSelector::Any`] wildcard, display role, and hardware revision. The
//! table is built once from configuration and then only read.
//!
//! # Wildcard ports
//!
//! Kinds that are shared per block are stored with [`PortSelector::Any`].
//! Kinds that are shared per port are stored once per concrete port. A lookup
//! for a concrete port falls back to the wildcard row, but storage never mixes
//! the two for the same (kind, block, role, revision): [`ResourceTable::insert`]
//! rejects any row that would make a lookup ambiguous.

use alloc::collections::BTreeMap;
use core::fmt;

use crate::kind::ResourceKind;

/// Identifies a hardware block (a cluster of units sharing a capacity pool).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockId(pub u8);

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockId({})", self.0)
    }
}

/// Identifies a shared memory-access (AXI) port.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PortId(pub u8);

impl fmt::Debug for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PortId({})", self.0)
    }
}

/// Hardware revision selector; picks which set of table rows applies.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HwRevision(pub u16);

impl fmt::Debug for HwRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HwRevision({})", self.0)
    }
}

/// Classification of a display output used to size its capacity share.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DisplayRole {
    /// The built-in panel; owns whatever the others do not borrow.
    Primary,
    /// A secondary built-in or externally connected display.
    External,
    /// A virtual (write-back) display.
    Virtual,
}

/// Port part of a [`ResourceIndex`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PortSelector {
    /// Applies to every port of the block.
    Any,
    /// Applies to one port only.
    Port(PortId),
}

impl fmt::Display for PortSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("*"),
            Self::Port(p) => write!(f, "{}", p.0),
        }
    }
}

/// Composite key of a [`ResourceTable`] row.
///
/// Field order is also the sort order; keeping `port` last makes all rows of
/// one (kind, block, role, revision) contiguous.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceIndex {
    /// Resource kind.
    pub kind: ResourceKind,
    /// Hardware block.
    pub block: BlockId,
    /// Display role.
    pub role: DisplayRole,
    /// Hardware revision.
    pub revision: HwRevision,
    /// Port, or the wildcard.
    pub port: PortSelector,
}

impl ResourceIndex {
    /// Creates a block-wide (wildcard port) index.
    #[must_use]
    pub const fn block_wide(
        kind: ResourceKind,
        block: BlockId,
        role: DisplayRole,
        revision: HwRevision,
    ) -> Self {
        Self {
            kind,
            block,
            role,
            revision,
            port: PortSelector::Any,
        }
    }

    /// Returns this index with a concrete port.
    #[must_use]
    pub const fn on_port(mut self, port: PortId) -> Self {
        self.port = PortSelector::Port(port);
        self
    }

    /// Returns this index with the wildcard port.
    #[must_use]
    const fn wildcard(mut self) -> Self {
        self.port = PortSelector::Any;
        self
    }

    /// Returns this index with the highest possible port, for range scans.
    #[must_use]
    const fn last_port(mut self) -> Self {
        self.port = PortSelector::Port(PortId(u8::MAX));
        self
    }
}

/// Capacity of one table row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Capacity {
    /// What a single display may use on its own.
    pub max_per_display: u32,
    /// What all displays together may use.
    pub total: u32,
}

impl Capacity {
    /// Creates a capacity pair.
    #[must_use]
    pub const fn new(max_per_display: u32, total: u32) -> Self {
        Self {
            max_per_display,
            total,
        }
    }
}

/// Reasons a row cannot be added to a [`ResourceTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    /// The exact key is already present.
    #[error("duplicate resource row {0:?}")]
    Duplicate(ResourceIndex),
    /// A wildcard row and a concrete-port row would cover the same port.
    #[error("resource row {new:?} aliases existing row {existing:?}")]
    Aliasing {
        /// The row being inserted.
        new: ResourceIndex,
        /// The row it conflicts with.
        existing: ResourceIndex,
    },
    /// The per-display share is larger than the shared total.
    #[error("resource row {index:?} has max_per_display {max_per_display} above total {total}")]
    ShareExceedsTotal {
        /// The offending row.
        index: ResourceIndex,
        /// Its per-display share.
        max_per_display: u32,
        /// Its total.
        total: u32,
    },
}

/// Immutable-after-construction mapping from [`ResourceIndex`] to [`Capacity`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResourceTable {
    rows: BTreeMap<ResourceIndex, Capacity>,
}

impl ResourceTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a row.
    ///
    /// Fails if the key is already present, if the row would alias a
    /// wildcard/concrete row for the same (kind, block, role, revision), or if
    /// `max_per_display` exceeds `total`.
    pub fn insert(&mut self, index: ResourceIndex, capacity: Capacity) -> Result<(), TableError> {
        if capacity.max_per_display > capacity.total {
            return Err(TableError::ShareExceedsTotal {
                index,
                max_per_display: capacity.max_per_display,
                total: capacity.total,
            });
        }
        if self.rows.contains_key(&index) {
            return Err(TableError::Duplicate(index));
        }
        let conflict = match index.port {
            PortSelector::Any => self
                .rows
                .range(index.wildcard()..=index.last_port())
                .map(|(k, _)| *k)
                .next(),
            PortSelector::Port(_) => {
                let wildcard = index.wildcard();
                self.rows.contains_key(&wildcard).then_some(wildcard)
            }
        };
        if let Some(existing) = conflict {
            return Err(TableError::Aliasing {
                new: index,
                existing,
            });
        }
        self.rows.insert(index, capacity);
        Ok(())
    }

    /// Builds a table from rows, stopping at the first invalid one.
    pub fn from_rows(
        rows: impl IntoIterator<Item = (ResourceIndex, Capacity)>,
    ) -> Result<Self, TableError> {
        let mut table = Self::new();
        for (index, capacity) in rows {
            table.insert(index, capacity)?;
        }
        Ok(table)
    }

    /// Returns the row stored under exactly `index` (no wildcard matching).
    #[must_use]
    pub fn get(&self, index: &ResourceIndex) -> Option<Capacity> {
        self.rows.get(index).copied()
    }

    /// Looks up the capacity that applies to `index`.
    ///
    /// A concrete port matches its own row or, failing that, the wildcard row.
    /// The wildcard only matches the wildcard row.
    #[must_use]
    pub fn lookup(&self, index: &ResourceIndex) -> Option<Capacity> {
        match index.port {
            PortSelector::Any => self.get(index),
            PortSelector::Port(_) => self.get(index).or_else(|| self.get(&index.wildcard())),
        }
    }

    /// Iterates over all rows in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&ResourceIndex, &Capacity)> + '_ {
        self.rows.iter()
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
