//! Pointer picking and camera focus.

pub mod focus;
pub mod picking;

pub use focus::{FocusController, FocusEvent, FocusPhase, FocusTarget, FocusTargets};
pub use picking::{PickHit, PickingService, Ray};
