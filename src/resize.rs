//! Aspect-locked correction of interactive resize proposals.
//!
//! While the user drags a resize handle the platform proposes candidate
//! rectangles one at a time; each proposal is corrected here before it is
//! committed, so the window never leaves the image's aspect ratio.

use crate::geom::{Rect, Size};

/// The eight resize handles of a window, by the edge or corner being dragged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResizeEdge {
    Left,
    Right,
    Top,
    Bottom,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Which dimension gets recomputed from the other.
#[derive(Clone, Copy)]
enum Adapt {
    Width,
    Height,
}

/// Which side of the rectangle stays put while the opposite side moves.
#[derive(Clone, Copy)]
enum Anchor {
    TopLeft,
    BottomRight,
}

impl ResizeEdge {
    // The edge-to-axis/anchor table is deliberate and tuned for drag feel;
    // it is not the geometrically obvious mapping. Do not re-derive it.
    fn policy(self) -> (Adapt, Anchor) {
        match self {
            ResizeEdge::Bottom => (Adapt::Width, Anchor::TopLeft),
            ResizeEdge::BottomLeft | ResizeEdge::BottomRight => (Adapt::Height, Anchor::TopLeft),
            ResizeEdge::Left => (Adapt::Width, Anchor::BottomRight),
            ResizeEdge::Right | ResizeEdge::Top => (Adapt::Width, Anchor::TopLeft),
            ResizeEdge::TopLeft | ResizeEdge::TopRight => (Adapt::Height, Anchor::BottomRight),
        }
    }
}

/// Correct a proposed drag rectangle so its aspect matches `original`.
///
/// Exactly one coordinate of `rect` is rewritten per call: the adapted
/// dimension is recomputed from the other by integer division (truncating),
/// and the anchor decides whether the leading or trailing side absorbs the
/// change. Pure function of (edge, rect, original); applying it to an already
/// conforming rectangle is a no-op. Degenerate (zero-sized) proposals produce
/// zero-sized output and are not trapped.
pub fn adjust_for_aspect(edge: ResizeEdge, rect: &mut Rect, original: Size) {
    let (adapt, anchor) = edge.policy();
    match adapt {
        Adapt::Width => {
            let width =
                (original.width as i64 * rect.height() as i64 / original.height as i64) as i32;
            match anchor {
                Anchor::TopLeft => rect.right = rect.left + width,
                Anchor::BottomRight => rect.left = rect.right - width,
            }
        }
        Adapt::Height => {
            let height =
                (original.height as i64 * rect.width() as i64 / original.width as i64) as i32;
            match anchor {
                Anchor::TopLeft => rect.bottom = rect.top + height,
                Anchor::BottomRight => rect.top = rect.bottom - height,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_EDGES: [ResizeEdge; 8] = [
        ResizeEdge::Left,
        ResizeEdge::Right,
        ResizeEdge::Top,
        ResizeEdge::Bottom,
        ResizeEdge::TopLeft,
        ResizeEdge::TopRight,
        ResizeEdge::BottomLeft,
        ResizeEdge::BottomRight,
    ];

    fn adjusted(edge: ResizeEdge, rect: Rect, original: Size) -> Rect {
        let mut out = rect;
        adjust_for_aspect(edge, &mut out, original);
        out
    }

    #[test]
    fn bottom_drag_recomputes_width_anchored_top_left() {
        // 400x300 image, bottom edge dragged down to height 600.
        let out = adjusted(
            ResizeEdge::Bottom,
            Rect::new(0, 0, 400, 600),
            Size::new(400, 300),
        );
        assert_eq!(out, Rect::new(0, 0, 800, 600));
    }

    #[test]
    fn left_drag_recomputes_width_from_height_anchored_right() {
        // The left edge adapts width from the (unchanged) height, holding the
        // right/bottom corner; a pure horizontal pull therefore snaps back.
        let out = adjusted(
            ResizeEdge::Left,
            Rect::new(200, 0, 400, 300),
            Size::new(400, 300),
        );
        assert_eq!(out, Rect::new(0, 0, 400, 300));
    }

    #[test]
    fn top_drag_recomputes_width_anchored_top_left() {
        let out = adjusted(
            ResizeEdge::Top,
            Rect::new(0, -100, 400, 300),
            Size::new(400, 300),
        );
        // Height 400 -> width 400 * 400 / 300 = 533, truncating.
        assert_eq!(out, Rect::new(0, -100, 533, 300));
    }

    #[test]
    fn bottom_right_corner_recomputes_height_anchored_top_left() {
        let out = adjusted(
            ResizeEdge::BottomRight,
            Rect::new(0, 0, 800, 500),
            Size::new(400, 300),
        );
        assert_eq!(out, Rect::new(0, 0, 800, 600));
    }

    #[test]
    fn top_left_corner_recomputes_height_anchored_bottom_right() {
        let out = adjusted(
            ResizeEdge::TopLeft,
            Rect::new(-200, -50, 400, 300),
            Size::new(400, 300),
        );
        // Width 600 -> height 450, hung from the bottom edge.
        assert_eq!(out, Rect::new(-200, -150, 400, 300));
    }

    #[test]
    fn every_edge_mutates_exactly_one_coordinate() {
        let original = Size::new(640, 480);
        let rect = Rect::new(10, 20, 410, 620);
        for edge in ALL_EDGES {
            let out = adjusted(edge, rect, original);
            let changed = [
                out.left != rect.left,
                out.top != rect.top,
                out.right != rect.right,
                out.bottom != rect.bottom,
            ]
            .iter()
            .filter(|&&c| c)
            .count();
            assert_eq!(changed, 1, "edge {edge:?} changed {changed} coordinates");
        }
    }

    #[test]
    fn every_edge_restores_the_aspect_ratio() {
        let original = Size::new(400, 300);
        let rect = Rect::new(-30, 40, 570, 1000);
        for edge in ALL_EDGES {
            let out = adjusted(edge, rect, original);
            // The adapted dimension matches the truncating integer formula
            // exactly; verify via cross multiplication with truncation slack.
            let w = out.width() as i64;
            let h = out.height() as i64;
            let ow = original.width as i64;
            let oh = original.height as i64;
            let diff = (w * oh - h * ow).abs();
            assert!(
                diff < ow.max(oh),
                "edge {edge:?}: {w}x{h} too far from {ow}:{oh} (diff {diff})"
            );
        }
    }

    #[test]
    fn conforming_rectangle_is_a_fixed_point() {
        let original = Size::new(400, 300);
        let rect = Rect::new(100, 100, 900, 700); // exactly 4:3
        for edge in ALL_EDGES {
            let once = adjusted(edge, rect, original);
            let twice = adjusted(edge, once, original);
            assert_eq!(once, rect, "edge {edge:?} moved a conforming rect");
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn zero_sized_proposal_collapses_without_panicking() {
        let out = adjusted(
            ResizeEdge::Bottom,
            Rect::new(50, 50, 50, 50),
            Size::new(400, 300),
        );
        assert_eq!(out.width(), 0);
        assert_eq!(out.height(), 0);
    }
}
