use glam::{DVec3, Quat, Vec3};

use crate::api::types::EntityId;
use crate::core::scale::ScaleSnapshot;

use super::elements::OrbitalElement;
use super::solver::orbit_position;

/// Mutable motion state. Angles accumulate forever and are never wrapped.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrbitState {
    pub revolution_angle: f64,
    pub rotation_angle: f64,
}

/// How the semi-major axis maps to scene units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrbitFrame {
    /// Axis in AU, multiplied by the global orbit scale.
    Scaled,
    /// Axis already in scene units (satellites hugging their parent).
    Absolute,
}

/// One orbiting body: elements, motion state and the derived transform.
#[derive(Debug, Clone)]
pub struct BodyController {
    id: EntityId,
    name: String,
    elements: OrbitalElement,
    state: OrbitState,
    frame: OrbitFrame,
    /// Index of the parent body in the scene's declaration order.
    parent: Option<usize>,
    axial_tilt: Quat,
    rotation_speed: f64,
    /// Bounding size relative to the body's diameter (rings widen it).
    extent: f32,
    orbit_scale: f64,
    relative: DVec3,
    world: DVec3,
}

impl BodyController {
    /// Elements are validated when built, so a controller always starts finite.
    pub fn new(id: EntityId, name: impl Into<String>, elements: OrbitalElement) -> Self {
        let state = OrbitState { revolution_angle: elements.initial_phase(), rotation_angle: 0.0 };
        Self {
            id,
            name: name.into(),
            rotation_speed: elements.rotation_speed(),
            elements,
            state,
            frame: OrbitFrame::Scaled,
            parent: None,
            axial_tilt: Quat::IDENTITY,
            extent: 1.0,
            orbit_scale: 1.0,
            relative: DVec3::ZERO,
            world: DVec3::ZERO,
        }
    }

    pub fn with_parent(mut self, parent: usize) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_frame(mut self, frame: OrbitFrame) -> Self {
        self.frame = frame;
        self
    }

    /// Fixed tilt of the spin axis, as a rotation about z.
    pub fn with_axial_tilt(mut self, tilt_rad: f32) -> Self {
        self.axial_tilt = Quat::from_rotation_z(tilt_rad);
        self
    }

    pub fn with_extent(mut self, extent: f32) -> Self {
        self.extent = extent.max(1.0);
        self
    }

    /// Advance one step of `dt` ticks and recompute the position.
    ///
    /// Satellites take the parent's world position of this same tick, so the
    /// parent must have advanced first.
    pub fn advance(&mut self, dt: f64, scale: &ScaleSnapshot, parent_world: Option<DVec3>) {
        self.state.revolution_angle += self.elements.revolution_speed() * dt;
        self.state.rotation_angle += self.rotation_speed * dt;
        self.orbit_scale = scale.orbit_scale;
        self.solve(parent_world);
    }

    /// Apply a new orbit scale immediately, without advancing time.
    pub fn set_orbit_scale(&mut self, orbit_scale: f64, parent_world: Option<DVec3>) {
        self.orbit_scale = orbit_scale;
        self.solve(parent_world);
    }

    fn solve(&mut self, parent_world: Option<DVec3>) {
        let scale = match self.frame {
            OrbitFrame::Scaled => self.orbit_scale,
            OrbitFrame::Absolute => 1.0,
        };
        self.relative = orbit_position(&self.elements, self.state.revolution_angle, scale);
        self.world = self.relative + parent_world.unwrap_or(DVec3::ZERO);
    }

    pub fn set_rotation_speed(&mut self, speed: f64) {
        self.rotation_speed = speed;
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn elements(&self) -> &OrbitalElement {
        &self.elements
    }

    pub fn state(&self) -> OrbitState {
        self.state
    }

    pub fn frame(&self) -> OrbitFrame {
        self.frame
    }

    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    pub fn rotation_speed(&self) -> f64 {
        self.rotation_speed
    }

    /// Offset from the parent (or from the focus for top-level bodies).
    pub fn relative_position(&self) -> DVec3 {
        self.relative
    }

    pub fn world_position(&self) -> DVec3 {
        self.world
    }

    /// World position narrowed for the render side.
    pub fn position(&self) -> Vec3 {
        self.world.as_vec3()
    }

    /// Effective semi-major axis at the last applied scale.
    pub fn effective_semi_major_axis(&self) -> f64 {
        match self.frame {
            OrbitFrame::Scaled => self.elements.semi_major_axis_au() * self.orbit_scale,
            OrbitFrame::Absolute => self.elements.semi_major_axis_au(),
        }
    }

    /// Spin about the tilted local up axis.
    pub fn rotation(&self) -> Quat {
        self.axial_tilt * Quat::from_rotation_y(self.state.rotation_angle as f32)
    }

    pub fn rendered_radius(&self, body_size_scale: f32) -> f32 {
        self.elements.mean_radius() as f32 * body_size_scale
    }

    /// Largest dimension of the body's bounding box.
    pub fn bounding_size(&self, body_size_scale: f32) -> f32 {
        2.0 * self.rendered_radius(body_size_scale) * self.extent
    }
}
