//! Events broadcast by the tooltip manager

use crate::manager::TooltipId;
use crate::position::ComputedPosition;
use crate::types::Placement;

/// Notifications for renderers and listeners
///
/// Dispatched after the manager's lock is released, in the order they happened.
#[derive(Clone, Debug, PartialEq)]
pub enum TooltipEvent {
    /// A show was accepted (delay may still be running)
    BeforeShow { id: TooltipId },
    Show { id: TooltipId },
    /// A hide was accepted (delay may still be running)
    BeforeHide { id: TooltipId },
    Hide { id: TooltipId },
    /// Controlled open state changed
    ModelValue { id: TooltipId, open: bool },
    /// The placement in use differs from the last one reported
    PlacementChanged { id: TooltipId, placement: Placement },
    PositionUpdated {
        id: TooltipId,
        position: ComputedPosition,
    },
}

impl TooltipEvent {
    pub fn id(&self) -> TooltipId {
        match self {
            TooltipEvent::BeforeShow { id }
            | TooltipEvent::Show { id }
            | TooltipEvent::BeforeHide { id }
            | TooltipEvent::Hide { id }
            | TooltipEvent::ModelValue { id, .. }
            | TooltipEvent::PlacementChanged { id, .. }
            | TooltipEvent::PositionUpdated { id, .. } => *id,
        }
    }
}
