//! Middleware positioning pipeline
//!
//! Coordinates start at the bare placement (no offset) and pass through each
//! [`Middleware`] in order. A middleware may nudge `x`/`y` or ask for a reset
//! with a different placement, which restarts the pipeline from the first pass.
//! The stock order is offset → flip → shift.

use kestrel_core::{Rect, Size};
use smallvec::SmallVec;

use super::{manual, ComputedPosition};
use crate::types::{Offset, Placement, Side};

/// Restarts allowed before the current result is accepted
const MAX_RESETS: usize = 4;

/// Mutable state threaded through the pipeline
#[derive(Clone, Debug)]
pub struct MiddlewareState {
    pub x: f32,
    pub y: f32,
    pub placement: Placement,
    /// The placement originally asked for
    pub initial_placement: Placement,
    pub reference: Rect,
    pub floating: Size,
    pub boundary: Rect,
    /// Main-axis distance applied by the offset pass
    pub main_offset: f32,
    /// Placements already attempted by flip, in order
    pub tried: SmallVec<[Placement; 4]>,
}

impl MiddlewareState {
    pub fn floating_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.floating.width, self.floating.height)
    }

    /// Amount the floating rect spills past each boundary edge (positive = outside)
    pub fn overflow(&self) -> SideOverflow {
        overflow_of(self.floating_rect(), self.boundary)
    }
}

fn overflow_of(rect: Rect, boundary: Rect) -> SideOverflow {
    SideOverflow {
        top: boundary.top() - rect.top(),
        bottom: rect.bottom() - boundary.bottom(),
        left: boundary.left() - rect.left(),
        right: rect.right() - boundary.right(),
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SideOverflow {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl SideOverflow {
    pub fn on(&self, side: Side) -> f32 {
        match side {
            Side::Top => self.top,
            Side::Bottom => self.bottom,
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }
}

/// What a middleware pass decided
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Continue,
    /// Restart the pipeline with a new placement
    Reset(Placement),
}

/// One positioning pass
pub trait Middleware: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, state: &mut MiddlewareState) -> Step;
}

// =============================================================================
// Offset
// =============================================================================

/// Push away from the reference along the main axis, slide along the cross axis
#[derive(Clone, Copy, Debug)]
pub struct OffsetMiddleware(pub Offset);

impl Middleware for OffsetMiddleware {
    fn name(&self) -> &'static str {
        "offset"
    }

    fn apply(&self, state: &mut MiddlewareState) -> Step {
        let main = self.0.main_axis();
        let cross = self.0.cross_axis();
        state.main_offset = main;
        match state.placement.side() {
            Side::Top => {
                state.y -= main;
                state.x += cross;
            }
            Side::Bottom => {
                state.y += main;
                state.x += cross;
            }
            Side::Left => {
                state.x -= main;
                state.y += cross;
            }
            Side::Right => {
                state.x += main;
                state.y += cross;
            }
        }
        Step::Continue
    }
}

// =============================================================================
// Flip
// =============================================================================

/// Swap to the opposite side when the current one overflows
///
/// If every candidate overflows, settles on the one that overflows least.
#[derive(Clone, Copy, Debug, Default)]
pub struct FlipMiddleware;

impl FlipMiddleware {
    fn candidates(initial: Placement) -> [Placement; 2] {
        [initial, initial.opposite()]
    }

    /// Main-side overflow `placement` would have with the same main offset
    fn main_overflow(state: &MiddlewareState, placement: Placement) -> f32 {
        let origin = manual::place(state.reference, state.floating, placement, state.main_offset);
        overflow_of(Rect::from_origin_size(origin, state.floating), state.boundary)
            .on(placement.side())
    }
}

impl Middleware for FlipMiddleware {
    fn name(&self) -> &'static str {
        "flip"
    }

    fn apply(&self, state: &mut MiddlewareState) -> Step {
        if !state.tried.contains(&state.placement) {
            state.tried.push(state.placement);
        }

        if state.overflow().on(state.placement.side()) <= 0.0 {
            return Step::Continue;
        }

        let candidates = Self::candidates(state.initial_placement);
        if let Some(next) = candidates.iter().copied().find(|p| !state.tried.contains(p)) {
            return Step::Reset(next);
        }

        // Everything overflows: pick the least bad
        let best = candidates
            .iter()
            .copied()
            .min_by(|a, b| {
                Self::main_overflow(state, *a).total_cmp(&Self::main_overflow(state, *b))
            })
            .unwrap_or(state.placement);

        if best != state.placement {
            Step::Reset(best)
        } else {
            Step::Continue
        }
    }
}

// =============================================================================
// Shift
// =============================================================================

/// Clamp along the cross axis so the content stays inside the boundary
#[derive(Clone, Copy, Debug, Default)]
pub struct ShiftMiddleware;

fn clamp_span(start: f32, len: f32, min: f32, max: f32) -> f32 {
    if len >= max - min {
        return min;
    }
    start.clamp(min, max - len)
}

impl Middleware for ShiftMiddleware {
    fn name(&self) -> &'static str {
        "shift"
    }

    fn apply(&self, state: &mut MiddlewareState) -> Step {
        if state.placement.side().is_vertical() {
            state.x = clamp_span(
                state.x,
                state.floating.width,
                state.boundary.left(),
                state.boundary.right(),
            );
        } else {
            state.y = clamp_span(
                state.y,
                state.floating.height,
                state.boundary.top(),
                state.boundary.bottom(),
            );
        }
        Step::Continue
    }
}

// =============================================================================
// Pipeline
// =============================================================================

/// Ordered middleware passes
#[derive(Default)]
pub struct Pipeline {
    passes: Vec<Box<dyn Middleware>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset, then flip and shift when enabled
    pub fn standard(offset: Offset, flip: bool, shift: bool) -> Self {
        let mut pipeline = Self::new().with(OffsetMiddleware(offset));
        if flip {
            pipeline = pipeline.with(FlipMiddleware);
        }
        if shift {
            pipeline = pipeline.with(ShiftMiddleware);
        }
        pipeline
    }

    pub fn with(mut self, middleware: impl Middleware + 'static) -> Self {
        self.passes.push(Box::new(middleware));
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|m| m.name()).collect()
    }

    pub fn compute(
        &self,
        reference: Rect,
        floating: Size,
        placement: Placement,
        boundary: Rect,
    ) -> ComputedPosition {
        let mut state = MiddlewareState {
            x: 0.0,
            y: 0.0,
            placement,
            initial_placement: placement,
            reference,
            floating,
            boundary,
            main_offset: 0.0,
            tried: SmallVec::new(),
        };

        let mut resets = 0;
        'pipeline: loop {
            let origin = manual::place(reference, floating, state.placement, 0.0);
            state.x = origin.x;
            state.y = origin.y;
            state.main_offset = 0.0;

            for pass in &self.passes {
                if let Step::Reset(next) = pass.apply(&mut state) {
                    if resets < MAX_RESETS && next != state.placement {
                        resets += 1;
                        tracing::debug!(
                            "Pipeline::compute - {} reset {} -> {}",
                            pass.name(),
                            state.placement,
                            next
                        );
                        state.placement = next;
                        continue 'pipeline;
                    }
                }
            }
            break;
        }

        ComputedPosition {
            left: state.x,
            top: state.y,
            placement: state.placement,
        }
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline").field("passes", &self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Rect = Rect::new(0.0, 0.0, 400.0, 300.0);
    const CONTENT: Size = Size::new(100.0, 40.0);

    #[test]
    fn test_offset_only() {
        let pipeline = Pipeline::new().with(OffsetMiddleware(Offset::Axes([8.0, 5.0])));
        let reference = Rect::new(150.0, 150.0, 100.0, 20.0);
        let position = pipeline.compute(reference, CONTENT, Placement::Bottom, VIEWPORT);
        assert_eq!(position.top, 178.0);
        assert_eq!(position.left, 155.0);
    }

    #[test]
    fn test_flip_to_opposite() {
        let pipeline = Pipeline::standard(Offset::Main(8.0), true, true);
        let reference = Rect::new(150.0, 10.0, 100.0, 20.0);
        let position = pipeline.compute(reference, CONTENT, Placement::Top, VIEWPORT);
        assert_eq!(position.placement, Placement::Bottom);
        assert_eq!(position.top, 38.0);
    }

    #[test]
    fn test_flip_keeps_least_overflowing_side() {
        let pipeline = Pipeline::standard(Offset::Main(8.0), true, false);
        // 30px above, 220px below but content is 250px tall: both overflow, bottom less
        let reference = Rect::new(150.0, 30.0, 100.0, 50.0);
        let tall = Size::new(100.0, 250.0);
        let position = pipeline.compute(reference, tall, Placement::Top, VIEWPORT);
        assert_eq!(position.placement, Placement::Bottom);
    }

    #[test]
    fn test_shift_clamps_cross_axis() {
        let pipeline = Pipeline::standard(Offset::Main(8.0), true, true);
        let reference = Rect::new(360.0, 150.0, 30.0, 20.0);
        let position = pipeline.compute(reference, CONTENT, Placement::Bottom, VIEWPORT);
        assert_eq!(position.placement, Placement::Bottom);
        assert_eq!(position.left, 300.0);
    }

    #[test]
    fn test_standard_order() {
        let pipeline = Pipeline::standard(Offset::Main(8.0), true, true);
        assert_eq!(pipeline.names(), vec!["offset", "flip", "shift"]);
    }
}
