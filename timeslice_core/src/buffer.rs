// Copyright 2026 the Timeslice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Line-buffer amount table.
//!
//! How much line-buffer memory a source needs depends on which processing
//! stage consumes it (rotation, decompression, color conversion, scaling, or
//! plain fetch), on a coarse class of the pixel format, and on the source
//! width. [`BufferTable`] stores those amounts keyed by [`BufferKey`]; widths
//! are quantized into eight [`WidthBucket`]s first.

use alloc::collections::BTreeMap;

use crate::image::BitDepth;
use crate::kind::ResourceKind;

/// Coarse format class used as part of a [`BufferKey`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FormatClass {
    /// Luma plane of a sub-sampled compressed source.
    SubsampledLuma,
    /// Chroma plane of a sub-sampled compressed source.
    SubsampledChroma,
    /// Luma plane of a linear YUV source.
    Luma(BitDepth),
    /// Chroma plane of a linear YUV source.
    Chroma(BitDepth),
    /// Any RGB source of the given depth.
    Rgb(BitDepth),
    /// Any YUV source of the given depth.
    Yuv(BitDepth),
    /// Scaled source with an alpha channel.
    Alpha,
    /// Scaled source without an alpha channel.
    Opaque,
}

/// Quantized source width.
///
/// Buckets are closed ranges; the last one is unbounded. Widths below the
/// first bucket's lower bound are not covered by any range and are placed in
/// the unbounded bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WidthBucket {
    /// 8..=512
    W8To512,
    /// 513..=1024
    W513To1024,
    /// 1025..=1536
    W1025To1536,
    /// 1537..=2048
    W1537To2048,
    /// 2049..=2304
    W2049To2304,
    /// 2305..=2560
    W2305To2560,
    /// 2561..=3072
    W2561To3072,
    /// 3073 and up.
    W3073Up,
}

impl WidthBucket {
    /// All buckets in ascending order.
    pub const ALL: [Self; 8] = [
        Self::W8To512,
        Self::W513To1024,
        Self::W1025To1536,
        Self::W1537To2048,
        Self::W2049To2304,
        Self::W2305To2560,
        Self::W2561To3072,
        Self::W3073Up,
    ];

    /// The bucket used by width-independent lookups.
    pub const UNBOUNDED: Self = Self::W3073Up;

    /// Inclusive bounds of the bucket; `None` as the upper bound means
    /// unbounded.
    #[must_use]
    pub const fn bounds(self) -> (i64, Option<i64>) {
        match self {
            Self::W8To512 => (8, Some(512)),
            Self::W513To1024 => (513, Some(1024)),
            Self::W1025To1536 => (1025, Some(1536)),
            Self::W1537To2048 => (1537, Some(2048)),
            Self::W2049To2304 => (2049, Some(2304)),
            Self::W2305To2560 => (2305, Some(2560)),
            Self::W2561To3072 => (2561, Some(3072)),
            Self::W3073Up => (3073, None),
        }
    }

    /// Finds the bucket containing `width`.
    #[must_use]
    pub fn for_width(width: i64) -> Self {
        Self::ALL
            .into_iter()
            .find(|b| {
                let (lo, hi) = b.bounds();
                width >= lo && hi.is_none_or(|hi| width <= hi)
            })
            .unwrap_or(Self::UNBOUNDED)
    }
}

/// Key of a [`BufferTable`] entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BufferKey {
    /// The stage consuming the buffer.
    pub kind: ResourceKind,
    /// Format class.
    pub class: FormatClass,
    /// Width bucket.
    pub bucket: WidthBucket,
}

impl BufferKey {
    /// Creates a key.
    #[must_use]
    pub const fn new(kind: ResourceKind, class: FormatClass, bucket: WidthBucket) -> Self {
        Self {
            kind,
            class,
            bucket,
        }
    }
}

/// Line-buffer amounts keyed by [`BufferKey`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BufferTable {
    amounts: BTreeMap<BufferKey, u32>,
}

impl BufferTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the amount for `key`, returning the previous one.
    pub fn insert(&mut self, key: BufferKey, amount: u32) -> Option<u32> {
        self.amounts.insert(key, amount)
    }

    /// Sets the same amount for `kind`/`class` in every width bucket.
    pub fn insert_all_widths(&mut self, kind: ResourceKind, class: FormatClass, amount: u32) {
        for bucket in WidthBucket::ALL {
            self.amounts.insert(BufferKey::new(kind, class, bucket), amount);
        }
    }

    /// Returns the amount for `key`, or `None` if the table has no entry.
    #[must_use]
    pub fn lookup(&self, key: &BufferKey) -> Option<u32> {
        self.amounts.get(key).copied()
    }

    /// Iterates over all entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&BufferKey, &u32)> + '_ {
        self.amounts.iter()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.amounts.len()
    }

    /// Returns `true` if the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }
}

impl FromIterator<(BufferKey, u32)> for BufferTable {
    fn from_iter<I: IntoIterator<Item = (BufferKey, u32)>>(iter: I) -> Self {
        Self {
            amounts: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_edges() {
        assert_eq!(WidthBucket::for_width(8), WidthBucket::W8To512);
        assert_eq!(WidthBucket::for_width(512), WidthBucket::W8To512);
        assert_eq!(WidthBucket::for_width(513), WidthBucket::W513To1024);
        assert_eq!(WidthBucket::for_width(3072), WidthBucket::W2561To3072);
        assert_eq!(WidthBucket::for_width(3073), WidthBucket::W3073Up);
        assert_eq!(WidthBucket::for_width(1 << 20), WidthBucket::W3073Up);
    }

    #[test]
    fn narrow_widths_land_in_unbounded_bucket() {
        assert_eq!(WidthBucket::for_width(7), WidthBucket::UNBOUNDED);
        assert_eq!(WidthBucket::for_width(0), WidthBucket::UNBOUNDED);
    }

    #[test]
    fn buckets_are_contiguous() {
        for pair in WidthBucket::ALL.windows(2) {
            let (_, hi) = pair[0].bounds();
            let (lo, _) = pair[1].bounds();
            assert_eq!(hi.map(|h| h + 1), Some(lo));
        }
    }

    #[test]
    fn missing_entry_is_none() {
        let mut table = BufferTable::new();
        let key = BufferKey::new(
            ResourceKind::Scale,
            FormatClass::Alpha,
            WidthBucket::UNBOUNDED,
        );
        assert_eq!(table.lookup(&key), None);
        table.insert(key, 0);
        assert_eq!(table.lookup(&key), Some(0));
    }
}
