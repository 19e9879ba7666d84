// Copyright 2026 the Timeslice Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Time-slot contention between destination rectangles.
//!
//! Units in one block are time-multiplexed along the display's scan. Two
//! sources contend when their destination rectangles are fetched at roughly
//! the same time, which only depends on their vertical spans. Horizontal
//! position is irrelevant.
//!
//! A span is widened by a margin of pixel rows on both edges (clamped to the
//! display) because neighboring scan regions are still fetched close enough
//! in time to share the hardware.

use crate::image::ImageRect;

/// Returns `true` if `a` and `b` contend for the same time slot.
///
/// One rectangle's vertical span is widened by `margin` rows on both edges and
/// clamped to `[0, display_height]`, then tested against the other's span as
/// closed intervals. The test is made in both directions so the result is
/// symmetric even when clamping makes the two widenings differ.
///
/// Zero-height and inverted rectangles are accepted; they simply produce
/// empty or single-row spans.
#[must_use]
pub fn overlaps(a: &ImageRect, b: &ImageRect, margin: u32, display_height: u32) -> bool {
    widened_hits(a, b, margin, display_height) || widened_hits(b, a, margin, display_height)
}

fn widened_hits(widened: &ImageRect, other: &ImageRect, margin: u32, display_height: u32) -> bool {
    let margin = i64::from(margin);
    let top = (widened.top() - margin).max(0);
    let bottom = (widened.bottom() + margin).min(i64::from(display_height));
    top <= other.bottom() && other.top() <= bottom
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEIGHT: u32 = 2400;

    fn span(top: i32, bottom: i32) -> ImageRect {
        ImageRect::new(0, top, 1080, bottom - top)
    }

    #[test]
    fn margin_bridges_gap() {
        let a = span(0, 100);
        let b = span(150, 250);
        assert!(overlaps(&a, &b, 68, HEIGHT));
        assert!(!overlaps(&a, &b, 40, HEIGHT));
    }

    #[test]
    fn gap_equal_to_margin_overlaps() {
        let a = span(0, 100);
        assert!(overlaps(&a, &span(168, 300), 68, HEIGHT));
        assert!(!overlaps(&a, &span(169, 300), 68, HEIGHT));
    }

    #[test]
    fn symmetric() {
        let cases = [
            (span(0, 100), span(150, 250)),
            (span(0, 100), span(168, 200)),
            (span(2300, 2400), span(0, 2232)),
            (span(10, 10), span(50, 60)),
            (span(500, 400), span(380, 390)),
            (span(0, 0), span(0, 0)),
        ];
        for margin in [0, 1, 40, 68, 500] {
            for (a, b) in &cases {
                assert_eq!(
                    overlaps(a, b, margin, HEIGHT),
                    overlaps(b, a, margin, HEIGHT)
                );
            }
        }
    }

    #[test]
    fn containment_overlaps_without_margin() {
        assert!(overlaps(&span(0, 1000), &span(100, 200), 0, HEIGHT));
        assert!(overlaps(&span(100, 200), &span(0, 1000), 0, HEIGHT));
    }

    #[test]
    fn touching_edges_overlap_without_margin() {
        assert!(overlaps(&span(0, 100), &span(100, 200), 0, HEIGHT));
        assert!(!overlaps(&span(0, 100), &span(101, 200), 0, HEIGHT));
    }

    #[test]
    fn widening_is_clamped_to_display() {
        // Below the display: clamped widening cannot reach it from above.
        let on_screen = span(2300, 2400);
        let off_screen = span(2420, 2500);
        assert!(!widened_hits(&on_screen, &off_screen, 68, HEIGHT));
        // The other direction still sees the gap of 20 rows.
        assert!(overlaps(&on_screen, &off_screen, 68, HEIGHT));
    }

    #[test]
    fn degenerate_rects_terminate() {
        let zero = ImageRect::default();
        assert!(overlaps(&zero, &zero, 0, 0));
        assert!(!overlaps(&span(500, 500), &span(0, 10), 0, HEIGHT));
    }
}
