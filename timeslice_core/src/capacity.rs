// Copyright 2026 the Timeslice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-display available capacity.
//!
//! [`CapacityState`] owns the capacity every display may use, per resource
//! kind, hardware block, and (for per-port kinds) port. It is rebuilt by
//! [`CapacityState::initialize`] whenever the display topology changes and is
//! only read while frames are planned.
//!
//! Initialization has two steps:
//!
//! 1. Every display gets its role's `max_per_display` from the
//!    [`ResourceTable`].
//! 2. If a non-primary display is enabled it borrows from the shared pool:
//!    the primary display's capacity becomes `total` minus what the borrower
//!    holds. With no borrower the primary display gets the whole `total`.
//!
//! At most one non-primary display is expected to be enabled at a time. If
//! several are, the first one in the input order is the borrower.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::fmt;

use crate::config::EngineConfig;
use crate::kind::ResourceKind;
use crate::table::{BlockId, DisplayRole, PortSelector, ResourceIndex, ResourceTable};
use crate::trace::{CapacityEvent, Tracer};

/// Identifies a display output.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DisplayId(pub u32);

impl fmt::Debug for DisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DisplayId({})", self.0)
    }
}

/// A display as seen by capacity initialization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DisplayDesc {
    /// Display identity.
    pub id: DisplayId,
    /// Display role.
    pub role: DisplayRole,
    /// Whether the display is currently enabled.
    pub enabled: bool,
}

/// One capacity pool: a kind on a block, optionally narrowed to a port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolKey {
    /// Resource kind.
    pub kind: ResourceKind,
    /// Hardware block.
    pub block: BlockId,
    /// Port, or the wildcard for per-block kinds.
    pub port: PortSelector,
}

/// Available capacity of one display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayCapacity {
    desc: DisplayDesc,
    available: BTreeMap<PoolKey, u32>,
}

impl DisplayCapacity {
    /// The display this capacity belongs to.
    #[must_use]
    pub fn desc(&self) -> &DisplayDesc {
        &self.desc
    }

    /// Returns the available amount of a pool, or zero if the table had no
    /// row for it.
    #[must_use]
    pub fn available(&self, kind: ResourceKind, block: BlockId, port: PortSelector) -> u32 {
        self.get(&PoolKey { kind, block, port }).unwrap_or(0)
    }

    /// Returns the available amount of a pool, or `None` if the table had no
    /// row for it.
    #[must_use]
    pub fn get(&self, key: &PoolKey) -> Option<u32> {
        self.available.get(key).copied()
    }

    /// Iterates over all pools in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&PoolKey, &u32)> + '_ {
        self.available.iter()
    }
}

/// Available capacity of every display.
#[derive(Clone, Debug, Default)]
pub struct CapacityState {
    displays: Vec<DisplayCapacity>,
    borrower: Option<DisplayId>,
}

impl CapacityState {
    /// Creates an empty state; every lookup yields zero until initialized.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds capacity for `displays` from `table`.
    pub fn initialize(
        &mut self,
        displays: &[DisplayDesc],
        table: &ResourceTable,
        config: &EngineConfig,
        tracer: &mut Tracer<'_>,
    ) {
        self.displays.clear();
        self.borrower = None;

        for desc in displays {
            let mut available = BTreeMap::new();
            for_each_pool(config, |key| {
                if let Some(cap) = table.lookup(&index_for(key, desc.role, config)) {
                    available.insert(key, cap.max_per_display);
                }
            });
            self.displays.push(DisplayCapacity {
                desc: *desc,
                available,
            });
        }

        let borrower = self
            .displays
            .iter()
            .position(|d| d.desc.role != DisplayRole::Primary && d.desc.enabled);
        self.borrower = borrower.map(|i| self.displays[i].desc.id);

        if let Some(primary) = self
            .displays
            .iter()
            .position(|d| d.desc.role == DisplayRole::Primary)
        {
            let mut updates = Vec::new();
            for_each_pool(config, |key| {
                let index = index_for(key, DisplayRole::Primary, config);
                if let Some(cap) = table.lookup(&index) {
                    let lent = borrower.map_or(0, |b| {
                        self.displays[b].available(key.kind, key.block, key.port)
                    });
                    updates.push((key, cap.total.saturating_sub(lent)));
                }
            });
            self.displays[primary].available.extend(updates);
        }

        for display in &self.displays {
            let lent = display.desc.role == DisplayRole::Primary && self.borrower.is_some();
            for (pool, &available) in &display.available {
                tracer.capacity(&CapacityEvent {
                    display: display.desc.id,
                    role: display.desc.role,
                    enabled: display.desc.enabled,
                    pool: *pool,
                    available,
                    lent,
                });
            }
        }
    }

    /// Returns the capacity of display `id`.
    #[must_use]
    pub fn display(&self, id: DisplayId) -> Option<&DisplayCapacity> {
        self.displays.iter().find(|d| d.desc.id == id)
    }

    /// All displays, in initialization order.
    #[must_use]
    pub fn displays(&self) -> &[DisplayCapacity] {
        &self.displays
    }

    /// The non-primary display borrowing from the shared pool, if any.
    #[must_use]
    pub fn borrower(&self) -> Option<DisplayId> {
        self.borrower
    }
}

fn for_each_pool(config: &EngineConfig, mut f: impl FnMut(PoolKey)) {
    for kind in ResourceKind::ALL {
        for &block in &config.blocks {
            for port in config.selectors(kind) {
                f(PoolKey { kind, block, port });
            }
        }
    }
}

fn index_for(key: PoolKey, role: DisplayRole, config: &EngineConfig) -> ResourceIndex {
    ResourceIndex {
        kind: key.kind,
        block: key.block,
        role,
        revision: config.revision,
        port: key.port,
    }
}
