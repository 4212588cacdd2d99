//! Camera focus on a body: an explicit state machine ticked once per frame.
//!
//! `Idle -> Transitioning -> Locked`, and back to `Idle` on cancel or when the
//! target disappears. The controller only holds the target's `EntityId`;
//! positions are looked up fresh every tick through `FocusTargets`.

use glam::Vec3;

use crate::api::config::FocusConfig;
use crate::api::types::EntityId;
use crate::extensions::easing::{ease_vec3, Easing};
use crate::renderer::camera::OrbitCamera;

/// Lock distance in multiples of the target's largest bounding dimension.
pub const LOCK_DISTANCE_FACTOR: f32 = 3.0;
pub const MIN_APPROACH_FACTOR: f32 = 0.8;
pub const MAX_APPROACH_FACTOR: f32 = 5.0;
/// While locked the camera never gets closer than this many bounding sizes.
pub const SAFE_DISTANCE_FACTOR: f32 = 2.0;

/// Where a focusable entity is right now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusTarget {
    pub position: Vec3,
    /// Largest dimension of the body's bounding box.
    pub size: f32,
}

/// Lookup of live focus targets. Returns `None` once an entity is gone.
pub trait FocusTargets {
    fn locate(&self, entity: EntityId) -> Option<FocusTarget>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPhase {
    Idle,
    Transitioning,
    Locked,
}

/// What changed this call, for the host UI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FocusEvent {
    Started(EntityId),
    Locked { entity: EntityId, min_distance: f32, max_distance: f32 },
    Released(EntityId),
    Lost(EntityId),
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    target: EntityId,
    from_position: Vec3,
    from_target: Vec3,
    /// Camera offset from the body at the end of the move, fixed at request time.
    offset: Vec3,
    distance: f32,
    elapsed: f32,
}

#[derive(Debug, Clone, Copy)]
enum FocusState {
    Idle,
    Transitioning(Transition),
    /// `size` is the bounding size the current band was derived from.
    Locked { target: EntityId, size: f32 },
}

pub struct FocusController {
    state: FocusState,
    duration: f32,
    easing: Easing,
}

impl FocusController {
    pub fn new(config: &FocusConfig) -> Self {
        Self {
            state: FocusState::Idle,
            duration: config.transition_ticks.max(1.0),
            easing: Easing::QuadInOut,
        }
    }

    pub fn phase(&self) -> FocusPhase {
        match self.state {
            FocusState::Idle => FocusPhase::Idle,
            FocusState::Transitioning(_) => FocusPhase::Transitioning,
            FocusState::Locked { .. } => FocusPhase::Locked,
        }
    }

    pub fn target(&self) -> Option<EntityId> {
        match self.state {
            FocusState::Idle => None,
            FocusState::Transitioning(t) => Some(t.target),
            FocusState::Locked { target, .. } => Some(target),
        }
    }

    /// Start moving toward `entity`. Ignored while a transition is in flight,
    /// when `entity` is already locked, or when it cannot be located.
    pub fn request(
        &mut self,
        entity: EntityId,
        targets: &impl FocusTargets,
        camera: &mut OrbitCamera,
    ) -> Option<FocusEvent> {
        match self.state {
            FocusState::Transitioning(t) => {
                log::debug!("focus request for {:?} ignored while moving to {:?}", entity, t.target);
                return None;
            }
            FocusState::Locked { target, .. } if target == entity => return None,
            _ => {}
        }
        let Some(found) = targets.locate(entity) else {
            log::debug!("focus request for unknown entity {:?}", entity);
            return None;
        };

        let distance = found.size * LOCK_DISTANCE_FACTOR;
        let direction = (camera.position() - found.position).try_normalize().unwrap_or(Vec3::Z);
        self.state = FocusState::Transitioning(Transition {
            target: entity,
            from_position: camera.position(),
            from_target: camera.target(),
            offset: direction * distance,
            distance,
            elapsed: 0.0,
        });
        camera.reset_distance_limits();
        log::info!("focus transition to {:?} started", entity);
        Some(FocusEvent::Started(entity))
    }

    /// Drop any focus and restore the free-orbit zoom band.
    pub fn cancel(&mut self, camera: &mut OrbitCamera) -> Option<FocusEvent> {
        let target = self.target()?;
        self.state = FocusState::Idle;
        camera.release_distance_limits();
        log::info!("focus on {:?} released", target);
        Some(FocusEvent::Released(target))
    }

    /// Advance by `dt` ticks and move the camera.
    pub fn tick(&mut self, dt: f32, targets: &impl FocusTargets, camera: &mut OrbitCamera) -> Option<FocusEvent> {
        let entity = self.target()?;
        let Some(found) = targets.locate(entity) else {
            log::warn!("focus target {:?} disappeared", entity);
            self.state = FocusState::Idle;
            camera.release_distance_limits();
            return Some(FocusEvent::Lost(entity));
        };

        match &mut self.state {
            FocusState::Idle => None,
            FocusState::Transitioning(t) => {
                t.elapsed += dt.max(0.0);
                let progress = (t.elapsed / self.duration).min(1.0);
                // The end point follows the body, which keeps moving during the transition.
                let end_position = found.position + t.offset;
                camera.set_pose(
                    ease_vec3(t.from_position, end_position, progress, self.easing),
                    ease_vec3(t.from_target, found.position, progress, self.easing),
                );
                if progress < 1.0 {
                    return None;
                }
                log::info!("focus locked on {:?} at distance {:.2}", entity, t.distance);
                self.state = FocusState::Locked { target: entity, size: found.size };
                Some(Self::lock_band(entity, found.size, camera))
            }
            FocusState::Locked { size, .. } => {
                // The body can grow or shrink under a locked camera (size setting).
                let mut event = None;
                if (found.size - *size).abs() > f32::EPSILON * size.max(1.0) {
                    log::info!("focus band on {:?} follows size {:.3} -> {:.3}", entity, size, found.size);
                    *size = found.size;
                    event = Some(Self::lock_band(entity, found.size, camera));
                }
                Self::follow(camera, found);
                event
            }
        }
    }

    /// Derive the approach band from a bounding size and apply it.
    fn lock_band(entity: EntityId, size: f32, camera: &mut OrbitCamera) -> FocusEvent {
        let distance = size * LOCK_DISTANCE_FACTOR;
        let (min_distance, max_distance) = (distance * MIN_APPROACH_FACTOR, distance * MAX_APPROACH_FACTOR);
        camera.set_distance_limits(min_distance, max_distance);
        FocusEvent::Locked { entity, min_distance, max_distance }
    }

    /// Glue the rig to the moving body, keeping the user's current offset,
    /// clamp into the approach band, then push out of the body. The push
    /// runs last so it always wins.
    fn follow(camera: &mut OrbitCamera, found: FocusTarget) {
        let offset = camera.position() - camera.target();
        camera.set_pose(found.position + offset, found.position);
        camera.clamp_distance();

        let safe = found.size * SAFE_DISTANCE_FACTOR;
        let offset = camera.position() - found.position;
        if offset.length() < safe {
            let pushed = offset.try_normalize().unwrap_or(Vec3::Z) * safe;
            camera.set_pose(found.position + pushed, found.position);
        }
    }
}
