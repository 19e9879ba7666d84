// Copyright 2026 the Timeslice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-layer image description.
//!
//! An [`Image`] is everything the engine needs to know about one source for
//! one frame: the source crop, the destination rectangle on the display, the
//! pixel format, the compression mode, and the transform. Images are supplied
//! fresh every frame by the layer-management code and are never retained.

/// Color model of a pixel format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColorModel {
    /// Packed RGB(A).
    Rgb,
    /// Luma/chroma, usually two-plane.
    Yuv,
}

/// Per-component bit depth class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BitDepth {
    /// 8 bits (or less) per component.
    Eight,
    /// 10 bits per component.
    Ten,
    /// Anything else (e.g. half-float).
    Other,
}

/// A pixel format as seen by the resource engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PixelFormat {
    /// RGB or YUV.
    pub color: ColorModel,
    /// Component bit depth class.
    pub depth: BitDepth,
    /// Storage bits per pixel.
    pub bits_per_pixel: u16,
    /// Whether the format carries an alpha channel.
    pub alpha: bool,
}

impl PixelFormat {
    /// 32-bit RGBA, 8 bits per component.
    pub const RGBA_8888: Self = Self::rgb(BitDepth::Eight, 32, true);
    /// 32-bit RGB with an unused byte.
    pub const RGBX_8888: Self = Self::rgb(BitDepth::Eight, 32, false);
    /// 16-bit RGB.
    pub const RGB_565: Self = Self::rgb(BitDepth::Eight, 16, false);
    /// 32-bit RGBA, 10 bits per color component.
    pub const RGBA_1010102: Self = Self::rgb(BitDepth::Ten, 32, true);
    /// 64-bit half-float RGBA.
    pub const RGBA_FP16: Self = Self::rgb(BitDepth::Other, 64, true);
    /// Two-plane 4:2:0 YUV, 8 bits.
    pub const NV12: Self = Self::yuv(BitDepth::Eight, 12);
    /// Two-plane 4:2:0 YUV, 10 bits in 16-bit containers.
    pub const P010: Self = Self::yuv(BitDepth::Ten, 24);

    const fn rgb(depth: BitDepth, bits_per_pixel: u16, alpha: bool) -> Self {
        Self {
            color: ColorModel::Rgb,
            depth,
            bits_per_pixel,
            alpha,
        }
    }

    const fn yuv(depth: BitDepth, bits_per_pixel: u16) -> Self {
        Self {
            color: ColorModel::Yuv,
            depth,
            bits_per_pixel,
            alpha: false,
        }
    }

    /// Returns `true` for YUV formats.
    #[inline]
    #[must_use]
    pub const fn is_yuv(&self) -> bool {
        matches!(self.color, ColorModel::Yuv)
    }

    /// Returns `true` for RGB formats.
    #[inline]
    #[must_use]
    pub const fn is_rgb(&self) -> bool {
        matches!(self.color, ColorModel::Rgb)
    }
}

/// How the source buffer is compressed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Compression {
    /// Linear, uncompressed.
    #[default]
    None,
    /// Block-compressed (AFBC-style).
    Block,
    /// Lossless sub-sampled, two planes (SBWC-style).
    Subsampled,
}

/// Source transform flags.
///
/// Rotations are expressed the usual way: 180° is both flips, 270° is 90° plus
/// both flips.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform(u8);

impl Transform {
    /// No transform.
    pub const IDENTITY: Self = Self(0);
    /// Horizontal flip.
    pub const FLIP_H: Self = Self(0b001);
    /// Vertical flip.
    pub const FLIP_V: Self = Self(0b010);
    /// 90° clockwise rotation.
    pub const ROT_90: Self = Self(0b100);
    /// 180° rotation.
    pub const ROT_180: Self = Self(0b011);
    /// 270° clockwise rotation.
    pub const ROT_270: Self = Self(0b111);

    /// Returns the union of two transforms' flags.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns `true` if every flag of `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` if the transform swaps the horizontal and vertical axes.
    #[inline]
    #[must_use]
    pub const fn swaps_axes(self) -> bool {
        self.contains(Self::ROT_90)
    }
}

/// An integer pixel rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageRect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl ImageRect {
    /// Creates a rectangle.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Top edge, as a wide integer.
    #[inline]
    #[must_use]
    pub const fn top(&self) -> i64 {
        self.y as i64
    }

    /// Bottom edge (`y + height`), as a wide integer.
    #[inline]
    #[must_use]
    pub const fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }
}

/// One source's geometry, format, and transform for the current frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Image {
    /// Source crop within the buffer.
    pub src: ImageRect,
    /// Destination rectangle on the display.
    pub dst: ImageRect,
    /// Pixel format of the source buffer.
    pub format: PixelFormat,
    /// Compression mode of the source buffer.
    pub compression: Compression,
    /// Transform applied on the way to the destination.
    pub transform: Transform,
    /// Whether the caller's color pipeline wants wide-gamut processing.
    pub wide_gamut: bool,
}

impl Default for PixelFormat {
    fn default() -> Self {
        Self::RGBA_8888
    }
}

impl Image {
    /// Creates an uncompressed, untransformed image.
    #[must_use]
    pub fn new(src: ImageRect, dst: ImageRect, format: PixelFormat) -> Self {
        Self {
            src,
            dst,
            format,
            ..Self::default()
        }
    }

    /// Returns the image with `compression` set.
    #[must_use]
    pub const fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Returns the image with `transform` set.
    #[must_use]
    pub const fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Returns the image with the wide-gamut request set.
    #[must_use]
    pub const fn with_wide_gamut(mut self, wide_gamut: bool) -> Self {
        self.wide_gamut = wide_gamut;
        self
    }

    /// Returns `true` if the source is rotated by 90° (or 270°).
    #[inline]
    #[must_use]
    pub const fn is_rotated(&self) -> bool {
        self.transform.swaps_axes()
    }

    /// Returns `true` if the destination size differs from the source size
    /// once the rotation swap is applied to the destination.
    #[must_use]
    pub const fn is_scaled(&self) -> bool {
        let (dst_w, dst_h) = if self.is_rotated() {
            (self.dst.height, self.dst.width)
        } else {
            (self.dst.width, self.dst.height)
        };
        self.src.width != dst_w || self.src.height != dst_h
    }
}
