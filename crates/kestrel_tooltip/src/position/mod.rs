//! Position calculator
//!
//! Two strategies produce a [`ComputedPosition`] for a reference rect and a
//! content size:
//!
//! - [`manual`]: per-placement formulas with an optional viewport flip
//! - [`middleware`]: offset → flip → shift passes against a boundary rect

pub mod manual;
pub mod middleware;

use kestrel_core::{Point, Rect, Size};

use crate::types::{Offset, Placement, Strategy};

pub use middleware::{Middleware, MiddlewareState, Pipeline, Step};

/// Viewport coordinates for the content plus the placement actually used
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ComputedPosition {
    pub top: f32,
    pub left: f32,
    pub placement: Placement,
}

impl ComputedPosition {
    pub fn new(origin: Point, placement: Placement) -> Self {
        Self {
            top: origin.y,
            left: origin.x,
            placement,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }
}

/// Everything one computation needs
#[derive(Clone, Copy, Debug)]
pub struct PositionRequest {
    pub reference: Rect,
    /// Untransformed layout size of the content
    pub content: Size,
    pub placement: Placement,
    pub offset: Offset,
    pub flip: bool,
    pub shift: bool,
    pub viewport: Rect,
    /// Clipping region for the middleware strategy
    pub boundary: Rect,
}

/// Run `strategy` on `request`
pub fn compute(strategy: Strategy, request: &PositionRequest) -> ComputedPosition {
    match strategy {
        Strategy::Manual => manual::compute(
            request.reference,
            request.content,
            request.placement,
            request.offset.main_axis(),
            request.flip,
            request.viewport,
        ),
        Strategy::Middleware => Pipeline::standard(request.offset, request.flip, request.shift)
            .compute(
                request.reference,
                request.content,
                request.placement,
                request.boundary,
            ),
    }
}
