// Copyright 2026 the Timeslice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Load-balanced ordering of candidate units.
//!
//! Before a binder tries units for a source it asks for a trial order. The
//! order is a stable sort over these keys, first to last:
//!
//! 1. Unassigned units before assigned ones.
//! 2. Physical type, ascending.
//! 3. Depending on [`OrderingMode`]: capable units first, and among capable
//!    units the one whose block (compression) or block and port (wide gamut)
//!    has serviced fewer such sources.
//! 4. The memory port with fewer assigned units.
//! 5. The block with fewer assigned units.
//! 6. Physical index, ascending.
//!
//! The counters behind keys 3 to 5 are seeded from the input on every call;
//! nothing is retained between calls.

use alloc::collections::BTreeMap;
use core::cmp::Ordering;
use core::fmt;

use crate::image::{Compression, Image};
use crate::policy::ResourcePolicy;
use crate::source::{SourceKind, UnitSlot};
use crate::table::{BlockId, PortId};

/// Hardware type of a unit (for example a graphics-only or a video-capable
/// channel). Lower values sort first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhysicalType(pub u8);

/// Identity of a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitId {
    /// Hardware type.
    pub physical_type: PhysicalType,
    /// Index among units of the same type.
    pub physical_index: u32,
}

impl UnitId {
    /// Creates a unit id.
    #[must_use]
    pub const fn new(physical_type: PhysicalType, physical_index: u32) -> Self {
        Self {
            physical_type,
            physical_index,
        }
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit{}.{}", self.physical_type.0, self.physical_index)
    }
}

/// Capability flags of a unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitCaps {
    /// Can read block-compressed sources.
    pub block_compression: bool,
    /// Can do wide-gamut processing.
    pub wide_gamut: bool,
}

/// The source a unit is currently bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bound {
    /// Which source.
    pub source: SourceKind,
    /// Its image.
    pub image: Image,
}

/// A hardware unit being considered for binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CandidateUnit {
    /// Identity.
    pub id: UnitId,
    /// Block and memory port.
    pub slot: UnitSlot,
    /// Capability flags.
    pub caps: UnitCaps,
    /// Current binding, if assigned.
    pub bound: Option<Bound>,
}

impl CandidateUnit {
    /// Creates an unassigned unit.
    #[must_use]
    pub const fn new(id: UnitId, slot: UnitSlot, caps: UnitCaps) -> Self {
        Self {
            id,
            slot,
            caps,
            bound: None,
        }
    }

    /// Returns `true` if the unit is bound to a source.
    #[inline]
    #[must_use]
    pub const fn is_assigned(&self) -> bool {
        self.bound.is_some()
    }
}

/// Which capability the ordering balances for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OrderingMode {
    /// The source is block-compressed.
    BlockCompression,
    /// The source needs wide-gamut processing.
    WideGamut,
    /// Neither; balance memory ports only.
    AxiBalance,
}

impl OrderingMode {
    /// Picks the mode for `image`. Compression wins over wide gamut.
    #[must_use]
    pub fn for_image<P: ResourcePolicy + ?Sized>(image: &Image, policy: &P) -> Self {
        if image.compression == Compression::Block {
            Self::BlockCompression
        } else if policy.needs_wide_gamut(image) {
            Self::WideGamut
        } else {
            Self::AxiBalance
        }
    }

    /// Short name for traces.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::BlockCompression => "compressed",
            Self::WideGamut => "wide-gamut",
            Self::AxiBalance => "axi",
        }
    }
}

/// Per-call load counters seeded from assigned units.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadCounters {
    compressed: BTreeMap<BlockId, u32>,
    wide_gamut: BTreeMap<UnitSlot, u32>,
    blocks: BTreeMap<BlockId, u32>,
    ports: BTreeMap<PortId, u32>,
}

impl LoadCounters {
    /// Counts every assigned unit once.
    ///
    /// An assigned unit also counts towards its block's compressed load if it
    /// is compression-capable and its source is block-compressed, or
    /// otherwise towards its slot's wide-gamut load if it is wide-gamut
    /// capable and its source needs wide gamut.
    pub fn seed<P: ResourcePolicy + ?Sized>(units: &[CandidateUnit], policy: &P) -> Self {
        let mut counters = Self::default();
        for unit in units {
            let Some(bound) = &unit.bound else {
                continue;
            };
            let UnitSlot { block, port } = unit.slot;
            if unit.caps.block_compression && bound.image.compression == Compression::Block {
                *counters.compressed.entry(block).or_default() += 1;
            } else if unit.caps.wide_gamut && policy.needs_wide_gamut(&bound.image) {
                *counters.wide_gamut.entry(unit.slot).or_default() += 1;
            }
            *counters.blocks.entry(block).or_default() += 1;
            *counters.ports.entry(port).or_default() += 1;
        }
        counters
    }

    /// Compressed sources serviced by `block`.
    #[must_use]
    pub fn compressed(&self, block: BlockId) -> u32 {
        self.compressed.get(&block).copied().unwrap_or(0)
    }

    /// Wide-gamut sources serviced at `slot`.
    #[must_use]
    pub fn wide_gamut(&self, slot: UnitSlot) -> u32 {
        self.wide_gamut.get(&slot).copied().unwrap_or(0)
    }

    /// Assigned units in `block`.
    #[must_use]
    pub fn block(&self, block: BlockId) -> u32 {
        self.blocks.get(&block).copied().unwrap_or(0)
    }

    /// Assigned units on `port`.
    #[must_use]
    pub fn port(&self, port: PortId) -> u32 {
        self.ports.get(&port).copied().unwrap_or(0)
    }

    /// Non-zero port counts, by port.
    pub fn ports(&self) -> impl Iterator<Item = (PortId, u32)> + '_ {
        self.ports.iter().map(|(&p, &n)| (p, n))
    }

    /// Non-zero block counts, by block.
    pub fn blocks(&self) -> impl Iterator<Item = (BlockId, u32)> + '_ {
        self.blocks.iter().map(|(&b, &n)| (b, n))
    }

    fn compare(&self, mode: OrderingMode, l: &CandidateUnit, r: &CandidateUnit) -> Ordering {
        l.is_assigned()
            .cmp(&r.is_assigned())
            .then_with(|| l.id.physical_type.cmp(&r.id.physical_type))
            .then_with(|| self.compare_capability(mode, l, r))
            .then_with(|| self.port(l.slot.port).cmp(&self.port(r.slot.port)))
            .then_with(|| self.block(l.slot.block).cmp(&self.block(r.slot.block)))
            .then_with(|| l.id.physical_index.cmp(&r.id.physical_index))
    }

    fn compare_capability(
        &self,
        mode: OrderingMode,
        l: &CandidateUnit,
        r: &CandidateUnit,
    ) -> Ordering {
        match mode {
            OrderingMode::BlockCompression => {
                capable_first(l.caps.block_compression, r.caps.block_compression).then_with(|| {
                    if l.caps.block_compression {
                        self.compressed(l.slot.block)
                            .cmp(&self.compressed(r.slot.block))
                    } else {
                        Ordering::Equal
                    }
                })
            }
            OrderingMode::WideGamut => {
                capable_first(l.caps.wide_gamut, r.caps.wide_gamut).then_with(|| {
                    if l.caps.wide_gamut {
                        self.wide_gamut(l.slot).cmp(&self.wide_gamut(r.slot))
                    } else {
                        Ordering::Equal
                    }
                })
            }
            OrderingMode::AxiBalance => Ordering::Equal,
        }
    }
}

fn capable_first(l: bool, r: bool) -> Ordering {
    r.cmp(&l)
}

/// Mode and counters an ordering was computed with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderingOutcome {
    /// Mode chosen for the source.
    pub mode: OrderingMode,
    /// Counters seeded from the input.
    pub counters: LoadCounters,
}

/// Sorts `units` into the trial order for a source with image `image`.
///
/// The sort is stable and the keys end in the physical index, so the result
/// does not depend on the input order of distinct units.
pub fn order_units<P: ResourcePolicy + ?Sized>(
    units: &mut [CandidateUnit],
    image: &Image,
    policy: &P,
) -> OrderingOutcome {
    let mode = OrderingMode::for_image(image, policy);
    let counters = LoadCounters::seed(units, policy);
    units.sort_by(|l, r| counters.compare(mode, l, r));
    OrderingOutcome { mode, counters }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{ImageRect, PixelFormat};
    use crate::policy::StandardPolicy;
    use crate::source::LayerId;
    use alloc::vec::Vec;

    const GF: PhysicalType = PhysicalType(0);
    const VGRF: PhysicalType = PhysicalType(1);

    fn image() -> Image {
        let r = ImageRect::new(0, 0, 1080, 2400);
        Image::new(r, r, PixelFormat::RGBA_8888)
    }

    fn unit(ty: PhysicalType, index: u32, block: u8, port: u8, caps: UnitCaps) -> CandidateUnit {
        CandidateUnit::new(
            UnitId::new(ty, index),
            UnitSlot::new(BlockId(block), PortId(port)),
            caps,
        )
    }

    fn bind(mut u: CandidateUnit, image: Image) -> CandidateUnit {
        u.bound = Some(Bound {
            source: SourceKind::Layer(LayerId(u.id.physical_index)),
            image,
        });
        u
    }

    fn ids(units: &[CandidateUnit]) -> Vec<(u8, u32)> {
        units
            .iter()
            .map(|u| (u.id.physical_type.0, u.id.physical_index))
            .collect()
    }

    #[test]
    fn mode_prefers_compression_over_wide_gamut() {
        let policy = StandardPolicy;
        let both = image()
            .with_compression(Compression::Block)
            .with_wide_gamut(true);
        assert_eq!(OrderingMode::for_image(&both, &policy), OrderingMode::BlockCompression);
        let wide = image().with_wide_gamut(true);
        assert_eq!(OrderingMode::for_image(&wide, &policy), OrderingMode::WideGamut);
        assert_eq!(OrderingMode::for_image(&image(), &policy), OrderingMode::AxiBalance);
        let subsampled = image().with_compression(Compression::Subsampled);
        assert_eq!(
            OrderingMode::for_image(&subsampled, &policy),
            OrderingMode::AxiBalance
        );
    }

    #[test]
    fn unassigned_before_assigned_then_type() {
        let caps = UnitCaps::default();
        let mut units = [
            bind(unit(GF, 0, 0, 0, caps), image()),
            unit(VGRF, 0, 0, 0, caps),
            unit(GF, 1, 0, 0, caps),
        ];
        order_units(&mut units, &image(), &StandardPolicy);
        assert_eq!(ids(&units), [(0, 1), (1, 0), (0, 0)]);
    }

    #[test]
    fn ordering_is_deterministic_regardless_of_input_order() {
        let caps = UnitCaps::default();
        let base = [
            unit(GF, 3, 1, 1, caps),
            unit(GF, 0, 0, 0, caps),
            unit(VGRF, 1, 1, 0, caps),
            unit(GF, 2, 1, 0, caps),
            unit(VGRF, 0, 0, 1, caps),
            unit(GF, 1, 0, 1, caps),
        ];
        let mut a = base;
        let mut b = base;
        b.reverse();
        order_units(&mut a, &image(), &StandardPolicy);
        order_units(&mut b, &image(), &StandardPolicy);
        assert_eq!(a, b);

        let mut again = a;
        order_units(&mut again, &image(), &StandardPolicy);
        assert_eq!(a, again);
    }

    #[test]
    fn compressed_mode_puts_capable_units_first() {
        let plain = UnitCaps::default();
        let afbc = UnitCaps {
            block_compression: true,
            ..UnitCaps::default()
        };
        let mut units = [
            unit(GF, 0, 0, 0, plain),
            unit(GF, 1, 0, 0, afbc),
            unit(GF, 2, 1, 1, plain),
            unit(GF, 3, 1, 1, afbc),
        ];
        let source = image().with_compression(Compression::Block);
        let outcome = order_units(&mut units, &source, &StandardPolicy);
        assert_eq!(outcome.mode, OrderingMode::BlockCompression);
        assert_eq!(ids(&units), [(0, 1), (0, 3), (0, 0), (0, 2)]);
    }

    #[test]
    fn compressed_mode_prefers_less_loaded_block() {
        let afbc = UnitCaps {
            block_compression: true,
            ..UnitCaps::default()
        };
        let compressed = image().with_compression(Compression::Block);
        let mut units = [
            bind(unit(VGRF, 0, 0, 0, afbc), compressed),
            unit(GF, 0, 0, 1, afbc),
            unit(GF, 1, 1, 1, afbc),
        ];
        let outcome = order_units(&mut units, &compressed, &StandardPolicy);
        assert_eq!(outcome.counters.compressed(BlockId(0)), 1);
        assert_eq!(outcome.counters.compressed(BlockId(1)), 0);
        assert_eq!(ids(&units), [(0, 1), (0, 0), (1, 0)]);
    }

    #[test]
    fn wide_gamut_counts_per_block_and_port() {
        let wcg = UnitCaps {
            wide_gamut: true,
            ..UnitCaps::default()
        };
        let wide = image().with_wide_gamut(true);
        // Both free units sit on port 0; the wide-gamut counter of their
        // slots decides before block load is looked at.
        let mut units = [
            bind(unit(VGRF, 0, 0, 0, wcg), wide),
            bind(unit(VGRF, 1, 1, 1, UnitCaps::default()), image()),
            bind(unit(VGRF, 2, 0, 1, UnitCaps::default()), image()),
            unit(GF, 0, 0, 0, wcg),
            unit(GF, 1, 1, 0, wcg),
        ];
        let outcome = order_units(&mut units, &wide, &StandardPolicy);
        assert_eq!(outcome.mode, OrderingMode::WideGamut);
        let slot = UnitSlot::new(BlockId(0), PortId(0));
        assert_eq!(outcome.counters.wide_gamut(slot), 1);
        assert_eq!(outcome.counters.wide_gamut(UnitSlot::new(BlockId(0), PortId(1))), 0);
        assert_eq!(ids(&units[..2]), [(0, 1), (0, 0)]);
    }

    #[test]
    fn seeding_counts_each_assigned_unit_once() {
        let afbc = UnitCaps {
            block_compression: true,
            wide_gamut: true,
        };
        let both = image()
            .with_compression(Compression::Block)
            .with_wide_gamut(true);
        let units = [
            bind(unit(GF, 0, 0, 0, afbc), both),
            bind(unit(GF, 1, 0, 1, UnitCaps::default()), both),
            unit(GF, 2, 1, 1, afbc),
        ];
        let counters = LoadCounters::seed(&units, &StandardPolicy);
        assert_eq!(counters.compressed(BlockId(0)), 1);
        assert_eq!(counters.wide_gamut(UnitSlot::new(BlockId(0), PortId(0))), 0);
        assert_eq!(counters.block(BlockId(0)), 2);
        assert_eq!(counters.block(BlockId(1)), 0);
        assert_eq!(counters.port(PortId(0)), 1);
        assert_eq!(counters.port(PortId(1)), 1);
    }

    #[test]
    fn repeated_assignment_balances_ports() {
        let caps = UnitCaps::default();
        let mut units: Vec<CandidateUnit> = (0_u8..8)
            .map(|i| unit(GF, u32::from(i), i % 2, (i / 2) % 2, caps))
            .collect();
        for _ in 0..units.len() {
            order_units(&mut units, &image(), &StandardPolicy);
            let first = units
                .iter_mut()
                .find(|u| !u.is_assigned())
                .expect("a free unit remains");
            *first = bind(*first, image());

            let counters = LoadCounters::seed(&units, &StandardPolicy);
            let p0 = counters.port(PortId(0));
            let p1 = counters.port(PortId(1));
            assert!(p0.abs_diff(p1) <= 1, "ports diverged: {p0} vs {p1}");
        }
    }
}
