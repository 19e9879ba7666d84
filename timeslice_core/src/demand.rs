// Copyright 2026 the Timeslice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-source resource demand.
//!
//! [`compute_demand`] turns one [`Image`] into a [`Demand`]: the amount of
//! each [`ResourceKind`] the source occupies on whatever unit it is bound to.
//! The line-buffer amount is summed from [`BufferTable`] lookups; every other
//! kind comes from the injected [`ResourcePolicy`].
//!
//! # Line-buffer lookups
//!
//! The buffer width is the source width, or the source height when the source
//! is rotated by 90°. Then:
//!
//! - **Rotated, sub-sampled compressed**: luma and chroma are looked up
//!   separately. Each plane width is aligned up and padded by one alignment
//!   unit; the chroma plane is half width and its bucket is chosen from twice
//!   its aligned width.
//! - **Rotated, other**: one bucket, separate luma and chroma lookups.
//! - **Not rotated**: compressed widths are aligned up first. Block-compressed
//!   sources do one lookup keyed by RGB-or-YUV and depth; sub-sampled
//!   compressed sources do one lookup per plane; uncompressed sources do one
//!   combined lookup.
//! - **YUV** adds one width-independent color-conversion lookup keyed by
//!   depth.
//! - **Scaled** adds one width-independent scaler lookup keyed by alpha.
//!
//! Missing table entries contribute nothing. Each lookup is recorded in the
//! [`DemandBreakdown`] together with whether the table had an entry, so a
//! sparse table can be told apart from a zero amount in diagnostics.

use alloc::vec::Vec;

use crate::buffer::{BufferKey, BufferTable, FormatClass, WidthBucket};
use crate::config::WidthAlignment;
use crate::image::{Compression, Image};
use crate::kind::{KindMap, ResourceKind};
use crate::policy::ResourcePolicy;

/// Amount of each resource kind one source needs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Demand(pub KindMap<u32>);

impl Demand {
    /// Returns the amount of `kind`.
    #[inline]
    #[must_use]
    pub fn get(&self, kind: ResourceKind) -> u32 {
        self.0[kind]
    }

    /// Returns `true` if the source needs nothing.
    #[must_use]
    pub fn is_none(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns a demand with `amount` of `kind` and nothing else.
    #[must_use]
    pub fn only(kind: ResourceKind, amount: u32) -> Self {
        let mut map = KindMap::<u32>::default();
        map[kind] = amount;
        Self(map)
    }
}

/// One line-buffer table lookup made while computing a [`Demand`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BufferLookup {
    /// The key looked up.
    pub key: BufferKey,
    /// The amount found, or `None` if the table had no entry.
    pub amount: Option<u32>,
}

/// A [`Demand`] plus the lookups that produced its buffer amount.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DemandBreakdown {
    /// The resulting demand.
    pub demand: Demand,
    /// Buffer lookups in the order they were made.
    pub lookups: Vec<BufferLookup>,
}

impl DemandBreakdown {
    /// Number of lookups that found no table entry.
    #[must_use]
    pub fn misses(&self) -> usize {
        self.lookups.iter().filter(|l| l.amount.is_none()).count()
    }
}

/// Computes the demand of `image`.
#[must_use]
pub fn compute_demand<P: ResourcePolicy + ?Sized>(
    image: &Image,
    buffers: &BufferTable,
    alignment: &WidthAlignment,
    policy: &P,
) -> Demand {
    breakdown(image, buffers, alignment, policy).demand
}

/// Computes the demand of `image`, keeping every buffer lookup.
#[must_use]
pub fn breakdown<P: ResourcePolicy + ?Sized>(
    image: &Image,
    buffers: &BufferTable,
    alignment: &WidthAlignment,
    policy: &P,
) -> DemandBreakdown {
    let mut tally = Tally {
        table: buffers,
        lookups: Vec::new(),
        total: 0,
    };
    let format = image.format;
    let depth = format.depth;
    let color_class = if format.is_rgb() {
        FormatClass::Rgb(depth)
    } else {
        FormatClass::Yuv(depth)
    };

    if image.is_rotated() {
        let width = i64::from(image.src.height);
        if image.compression == Compression::Subsampled {
            let a = i64::from(alignment.subsampled_rotated);
            let luma = align_up(width, a) + a;
            let chroma = align_up(width / 2, a) + a;
            tally.add(
                ResourceKind::Rotation,
                FormatClass::SubsampledLuma,
                WidthBucket::for_width(luma),
            );
            tally.add(
                ResourceKind::Rotation,
                FormatClass::SubsampledChroma,
                WidthBucket::for_width(chroma * 2),
            );
        } else {
            let bucket = WidthBucket::for_width(width);
            tally.add(ResourceKind::Rotation, FormatClass::Luma(depth), bucket);
            tally.add(ResourceKind::Rotation, FormatClass::Chroma(depth), bucket);
        }
    } else {
        let width = i64::from(image.src.width);
        match image.compression {
            Compression::None => {
                tally.add(ResourceKind::Buffer, color_class, WidthBucket::for_width(width));
            }
            Compression::Block => {
                let a = if format.bits_per_pixel > 16 {
                    alignment.block_wide
                } else {
                    alignment.block_narrow
                };
                let bucket = WidthBucket::for_width(align_up(width, i64::from(a)));
                tally.add(ResourceKind::BlockCompression, color_class, bucket);
            }
            Compression::Subsampled => {
                let a = i64::from(alignment.subsampled);
                let bucket = WidthBucket::for_width(align_up(width, a));
                tally.add(
                    ResourceKind::SubsampledCompression,
                    FormatClass::SubsampledLuma,
                    bucket,
                );
                tally.add(
                    ResourceKind::SubsampledCompression,
                    FormatClass::SubsampledChroma,
                    bucket,
                );
            }
        }
    }

    if format.is_yuv() {
        tally.add(
            ResourceKind::ColorConversion,
            FormatClass::Yuv(depth),
            WidthBucket::UNBOUNDED,
        );
    }

    if image.is_scaled() {
        let class = if format.alpha {
            FormatClass::Alpha
        } else {
            FormatClass::Opaque
        };
        tally.add(ResourceKind::Scale, class, WidthBucket::UNBOUNDED);
    }

    let demand = Demand(KindMap::from_fn(|kind| match kind {
        ResourceKind::Buffer => tally.total,
        _ => policy.amount(kind, image),
    }));

    DemandBreakdown {
        demand,
        lookups: tally.lookups,
    }
}

/// Rounds `value` up to a multiple of `align`. An alignment of zero leaves the
/// value unchanged.
fn align_up(value: i64, align: i64) -> i64 {
    if align <= 0 {
        return value;
    }
    (value + align - 1).div_euclid(align) * align
}

struct Tally<'a> {
    table: &'a BufferTable,
    lookups: Vec<BufferLookup>,
    total: u32,
}

impl Tally<'_> {
    fn add(&mut self, kind: ResourceKind, class: FormatClass, bucket: WidthBucket) {
        let key = BufferKey::new(kind, class, bucket);
        let amount = self.table.lookup(&key);
        self.total = self.total.saturating_add(amount.unwrap_or(0));
        self.lookups.push(BufferLookup { key, amount });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{BitDepth, ImageRect, PixelFormat, Transform};
    use crate::policy::StandardPolicy;

    fn table() -> BufferTable {
        let mut t = BufferTable::new();
        for (i, bucket) in WidthBucket::ALL.into_iter().enumerate() {
            let step = u32::try_from(i).unwrap() * 100;
            t.insert(
                BufferKey::new(ResourceKind::Buffer, FormatClass::Rgb(BitDepth::Eight), bucket),
                1000 + step,
            );
            t.insert(
                BufferKey::new(ResourceKind::Rotation, FormatClass::Luma(BitDepth::Eight), bucket),
                2000 + step,
            );
            t.insert(
                BufferKey::new(
                    ResourceKind::Rotation,
                    FormatClass::Chroma(BitDepth::Eight),
                    bucket,
                ),
                10 + step,
            );
            t.insert(
                BufferKey::new(ResourceKind::Rotation, FormatClass::SubsampledLuma, bucket),
                3000 + step,
            );
            t.insert(
                BufferKey::new(ResourceKind::Rotation, FormatClass::SubsampledChroma, bucket),
                30 + step,
            );
            t.insert(
                BufferKey::new(
                    ResourceKind::BlockCompression,
                    FormatClass::Rgb(BitDepth::Eight),
                    bucket,
                ),
                4000 + step,
            );
            t.insert(
                BufferKey::new(
                    ResourceKind::SubsampledCompression,
                    FormatClass::SubsampledLuma,
                    bucket,
                ),
                5000 + step,
            );
            t.insert(
                BufferKey::new(
                    ResourceKind::SubsampledCompression,
                    FormatClass::SubsampledChroma,
                    bucket,
                ),
                50 + step,
            );
        }
        t.insert(
            BufferKey::new(
                ResourceKind::ColorConversion,
                FormatClass::Yuv(BitDepth::Eight),
                WidthBucket::UNBOUNDED,
            ),
            7,
        );
        t.insert(
            BufferKey::new(ResourceKind::Scale, FormatClass::Alpha, WidthBucket::UNBOUNDED),
            3,
        );
        t.insert(
            BufferKey::new(ResourceKind::Scale, FormatClass::Opaque, WidthBucket::UNBOUNDED),
            1,
        );
        t
    }

    fn unscaled(w: i32, h: i32, format: PixelFormat) -> Image {
        let r = ImageRect::new(0, 0, w, h);
        Image::new(r, r, format)
    }

    fn buffer(image: &Image) -> u32 {
        compute_demand(image, &table(), &WidthAlignment::default(), &StandardPolicy)
            .get(ResourceKind::Buffer)
    }

    #[test]
    fn uncompressed_width_bucket_edges() {
        let at_512 = buffer(&unscaled(512, 100, PixelFormat::RGB_565));
        let at_513 = buffer(&unscaled(513, 100, PixelFormat::RGB_565));
        assert_eq!(at_512, 1000);
        assert_eq!(at_513, 1100);
        assert_ne!(at_512, at_513);
    }

    #[test]
    fn rotation_uses_source_height_and_both_planes() {
        // Height 600 selects the 513..=1024 bucket even though width is 100.
        let img = Image::new(
            ImageRect::new(0, 0, 100, 600),
            ImageRect::new(0, 0, 600, 100),
            PixelFormat::RGBA_8888,
        )
        .with_transform(Transform::ROT_90);
        assert_eq!(buffer(&img), 2100 + 110);
    }

    #[test]
    fn rotated_subsampled_pads_each_plane() {
        // Luma: align(508, 4) + 4 = 512 -> first bucket.
        // Chroma: (align(254, 4) + 4) * 2 = 520 -> second bucket.
        let img = Image::new(
            ImageRect::new(0, 0, 64, 508),
            ImageRect::new(0, 0, 508, 64),
            PixelFormat::NV12,
        )
        .with_transform(Transform::ROT_90)
        .with_compression(Compression::Subsampled);
        let b = breakdown(&img, &table(), &WidthAlignment::default(), &StandardPolicy);
        assert_eq!(b.lookups[0].key.bucket, WidthBucket::W8To512);
        assert_eq!(b.lookups[1].key.bucket, WidthBucket::W513To1024);
        // 3000 + 130 + color conversion 7.
        assert_eq!(b.demand.get(ResourceKind::Buffer), 3137);
    }

    #[test]
    fn rotated_block_compressed_takes_rotation_path() {
        let img = Image::new(
            ImageRect::new(0, 0, 100, 600),
            ImageRect::new(0, 0, 600, 100),
            PixelFormat::RGBA_8888,
        )
        .with_transform(Transform::ROT_90)
        .with_compression(Compression::Block);
        let b = breakdown(&img, &table(), &WidthAlignment::default(), &StandardPolicy);
        let keys: Vec<BufferKey> = b.lookups.iter().map(|l| l.key).collect();
        assert_eq!(
            keys,
            [
                BufferKey::new(
                    ResourceKind::Rotation,
                    FormatClass::Luma(BitDepth::Eight),
                    WidthBucket::W513To1024,
                ),
                BufferKey::new(
                    ResourceKind::Rotation,
                    FormatClass::Chroma(BitDepth::Eight),
                    WidthBucket::W513To1024,
                ),
            ]
        );
        assert!(b.lookups.iter().all(|l| l.key.kind != ResourceKind::BlockCompression));
        assert_eq!(b.demand.get(ResourceKind::Buffer), 2100 + 110);
    }

    #[test]
    fn block_compression_aligns_before_bucketing() {
        // 32 bpp aligns to 8: 510 -> 512 stays in the first bucket.
        let wide = unscaled(510, 10, PixelFormat::RGBA_8888).with_compression(Compression::Block);
        assert_eq!(buffer(&wide), 4000);
        // 16 bpp aligns to 16: 510 -> 512, 514 -> 528.
        let narrow = unscaled(514, 10, PixelFormat::RGB_565).with_compression(Compression::Block);
        assert_eq!(buffer(&narrow), 4100);
    }

    #[test]
    fn subsampled_sums_planes_and_color_conversion() {
        let img = unscaled(500, 10, PixelFormat::NV12).with_compression(Compression::Subsampled);
        // 500 aligns to 512: first bucket.
        assert_eq!(buffer(&img), 5000 + 50 + 7);
        let img = unscaled(490, 10, PixelFormat::NV12).with_compression(Compression::Subsampled);
        assert_eq!(buffer(&img), 5057);
        let img = unscaled(513, 10, PixelFormat::NV12).with_compression(Compression::Subsampled);
        assert_eq!(buffer(&img), 5100 + 150 + 7);
    }

    #[test]
    fn scale_keyed_by_alpha() {
        let src = ImageRect::new(0, 0, 512, 100);
        let dst = ImageRect::new(0, 0, 1024, 200);
        let alpha = Image::new(src, dst, PixelFormat::RGBA_8888);
        let opaque = Image::new(src, dst, PixelFormat::RGBX_8888);
        assert_eq!(buffer(&alpha), 1000 + 3);
        assert_eq!(buffer(&opaque), 1000 + 1);
    }

    #[test]
    fn missing_entries_contribute_zero_and_are_recorded() {
        let img = unscaled(256, 10, PixelFormat::P010);
        let b = breakdown(&img, &table(), &WidthAlignment::default(), &StandardPolicy);
        assert_eq!(b.demand.get(ResourceKind::Buffer), 0);
        assert_eq!(b.misses(), 2);
        assert_eq!(b.demand.get(ResourceKind::ColorConversion), 1);
    }

    #[test]
    fn other_kinds_come_from_policy() {
        struct Fixed;
        impl ResourcePolicy for Fixed {
            fn amount(&self, kind: ResourceKind, _: &Image) -> u32 {
                u32::try_from(kind.index()).unwrap() + 40
            }
        }
        let d = compute_demand(
            &unscaled(100, 100, PixelFormat::RGBA_8888),
            &table(),
            &WidthAlignment::default(),
            &Fixed,
        );
        assert_eq!(d.get(ResourceKind::Buffer), 1000);
        assert_eq!(d.get(ResourceKind::Scale), 41);
        assert_eq!(d.get(ResourceKind::Rotation), 46);
    }

    #[test]
    fn demand_is_deterministic() {
        let img = unscaled(1920, 1080, PixelFormat::NV12).with_compression(Compression::Subsampled);
        let t = table();
        let a = breakdown(&img, &t, &WidthAlignment::default(), &StandardPolicy);
        let b = breakdown(&img, &t, &WidthAlignment::default(), &StandardPolicy);
        assert_eq!(a, b);
    }
}
