//! Fixed placement formulas
//!
//! Coordinates come straight from the reference rect and the content's layout
//! size (not its transformed bounds, so a running scale animation doesn't skew
//! the result). Flip only swaps to the opposite side when the preferred side
//! leaves the viewport.

use kestrel_core::{Point, Rect, Size};

use super::ComputedPosition;
use crate::types::{Alignment, Placement, Side};

/// Top-left corner of the content for `placement`
pub fn place(reference: Rect, content: Size, placement: Placement, offset: f32) -> Point {
    let main = match placement.side() {
        Side::Top => reference.top() - content.height - offset,
        Side::Bottom => reference.bottom() + offset,
        Side::Left => reference.left() - content.width - offset,
        Side::Right => reference.right() + offset,
    };

    if placement.side().is_vertical() {
        let left = match placement.alignment() {
            Alignment::Center => reference.left() + (reference.width() - content.width) / 2.0,
            Alignment::Start => reference.left(),
            Alignment::End => reference.right() - content.width,
        };
        Point::new(left, main)
    } else {
        let top = match placement.alignment() {
            Alignment::Center => reference.top() + (reference.height() - content.height) / 2.0,
            Alignment::Start => reference.top(),
            Alignment::End => reference.bottom() - content.height,
        };
        Point::new(main, top)
    }
}

/// Whether content at `origin` crosses the viewport edge on `side`
fn overflows(origin: Point, content: Size, side: Side, viewport: Rect) -> bool {
    let rect = Rect::from_origin_size(origin, content);
    match side {
        Side::Top => rect.top() < viewport.top(),
        Side::Bottom => rect.bottom() > viewport.bottom(),
        Side::Left => rect.left() < viewport.left(),
        Side::Right => rect.right() > viewport.right(),
    }
}

/// Manual strategy: formula position, optionally flipped to the opposite side
pub fn compute(
    reference: Rect,
    content: Size,
    placement: Placement,
    offset: f32,
    flip: bool,
    viewport: Rect,
) -> ComputedPosition {
    let origin = place(reference, content, placement, offset);

    if flip && overflows(origin, content, placement.side(), viewport) {
        let flipped = placement.opposite();
        tracing::debug!("manual::compute - {} overflows, flipping to {}", placement, flipped);
        return ComputedPosition::new(place(reference, content, flipped, offset), flipped);
    }

    ComputedPosition::new(origin, placement)
}
