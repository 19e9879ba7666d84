// Copyright 2026 the Timeslice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Injected per-kind resource policy.
//!
//! The line-buffer amount is computed by the engine itself from the
//! [`BufferTable`](crate::buffer::BufferTable). Every other kind is a plain
//! "how many of these units does this source occupy" question that the
//! surrounding system answers through a [`ResourcePolicy`].

use crate::image::{Compression, Image};
use crate::kind::ResourceKind;

/// Answers per-kind demand questions the engine does not compute itself.
pub trait ResourcePolicy {
    /// Amount of `kind` that `image` needs. Never called for
    /// [`ResourceKind::Buffer`].
    fn amount(&self, kind: ResourceKind, image: &Image) -> u32;

    /// Whether `image` needs wide-gamut processing.
    fn needs_wide_gamut(&self, image: &Image) -> bool {
        image.wide_gamut
    }
}

impl<P: ResourcePolicy + ?Sized> ResourcePolicy for &P {
    fn amount(&self, kind: ResourceKind, image: &Image) -> u32 {
        (**self).amount(kind, image)
    }

    fn needs_wide_gamut(&self, image: &Image) -> bool {
        (**self).needs_wide_gamut(image)
    }
}

/// One unit of each kind the image's properties call for.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardPolicy;

impl ResourcePolicy for StandardPolicy {
    fn amount(&self, kind: ResourceKind, image: &Image) -> u32 {
        let needed = match kind {
            ResourceKind::Buffer => false,
            ResourceKind::Scale => image.is_scaled(),
            ResourceKind::BlockCompression => image.compression == Compression::Block,
            ResourceKind::ColorConversion => image.format.is_yuv(),
            ResourceKind::SubsampledCompression => image.compression == Compression::Subsampled,
            ResourceKind::WideGamut => self.needs_wide_gamut(image),
            ResourceKind::Rotation => image.is_rotated(),
        };
        u32::from(needed)
    }
}
