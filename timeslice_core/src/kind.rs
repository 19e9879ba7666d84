// Copyright 2026 the Timeslice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resource kinds and dense per-kind storage.
//!
//! Every shared hardware capability that the admission engine accounts for is
//! one [`ResourceKind`]. The set is closed and known at compile time, so
//! per-kind values are kept in a fixed-size [`KindMap`] indexed by the kind's
//! discriminant instead of a hash map.

use core::fmt;
use core::ops::{Index, IndexMut};

/// One dimension of shared hardware capability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResourceKind {
    /// Line-buffer memory shared by the units of a block.
    Buffer,
    /// Scaler.
    Scale,
    /// Block-compressed source decoder.
    BlockCompression,
    /// YUV to RGB color-space converter.
    ColorConversion,
    /// Lossless sub-sampled compressed source decoder.
    SubsampledCompression,
    /// Wide-color-gamut processing.
    WideGamut,
    /// 90° rotator.
    Rotation,
}

impl ResourceKind {
    /// Number of resource kinds.
    pub const COUNT: usize = 7;

    /// All kinds, in discriminant order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Buffer,
        Self::Scale,
        Self::BlockCompression,
        Self::ColorConversion,
        Self::SubsampledCompression,
        Self::WideGamut,
        Self::Rotation,
    ];

    /// Returns the dense index of this kind.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Short uppercase label used in diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Buffer => "BUFFER",
            Self::Scale => "SCALE",
            Self::BlockCompression => "BLOCK_COMP",
            Self::ColorConversion => "CSC",
            Self::SubsampledCompression => "SUBSAMPLED_COMP",
            Self::WideGamut => "WCG",
            Self::Rotation => "ROT_90",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A value of type `T` for every [`ResourceKind`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KindMap<T>([T; ResourceKind::COUNT]);

impl<T> KindMap<T> {
    /// Builds a map by calling `f` once per kind.
    #[must_use]
    pub fn from_fn(mut f: impl FnMut(ResourceKind) -> T) -> Self {
        Self(ResourceKind::ALL.map(&mut f))
    }

    /// Returns the value for `kind`.
    #[inline]
    #[must_use]
    pub fn get(&self, kind: ResourceKind) -> &T {
        &self.0[kind.index()]
    }

    /// Replaces the value for `kind`.
    #[inline]
    pub fn set(&mut self, kind: ResourceKind, value: T) {
        self.0[kind.index()] = value;
    }

    /// Iterates over `(kind, value)` pairs in discriminant order.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, &T)> + '_ {
        ResourceKind::ALL.into_iter().zip(self.0.iter())
    }
}

impl<T: Copy> KindMap<T> {
    /// Builds a map holding `value` for every kind.
    #[must_use]
    pub const fn splat(value: T) -> Self {
        Self([value; ResourceKind::COUNT])
    }
}

impl KindMap<u32> {
    /// Returns `true` if every amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&v| v == 0)
    }
}

impl<T> Index<ResourceKind> for KindMap<T> {
    type Output = T;

    fn index(&self, kind: ResourceKind) -> &T {
        &self.0[kind.index()]
    }
}

impl<T> IndexMut<ResourceKind> for KindMap<T> {
    fn index_mut(&mut self, kind: ResourceKind) -> &mut T {
        &mut self.0[kind.index()]
    }
}
