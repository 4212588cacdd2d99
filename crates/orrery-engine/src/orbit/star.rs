use glam::Quat;

use crate::api::types::EntityId;

/// Shader clock increment per tick for the star surface.
pub const SURFACE_TIME_STEP: f32 = 0.05;

/// The central emissive body. It sits at the focus of every orbit and only spins.
#[derive(Debug, Clone)]
pub struct Star {
    id: EntityId,
    name: String,
    mean_radius: f32,
    rotation_speed: f64,
    rotation_angle: f64,
    surface_time: f32,
}

impl Star {
    pub fn new(id: EntityId, name: impl Into<String>, mean_radius: f32, rotation_speed: f64) -> Self {
        Self {
            id,
            name: name.into(),
            mean_radius: mean_radius.max(0.0),
            rotation_speed,
            rotation_angle: 0.0,
            surface_time: 0.0,
        }
    }

    pub fn advance(&mut self, dt: f64) {
        self.rotation_angle += self.rotation_speed * dt;
        self.surface_time += SURFACE_TIME_STEP * dt as f32;
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

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.rotation_angle as f32)
    }

    pub fn rotation_angle(&self) -> f64 {
        self.rotation_angle
    }

    pub fn surface_time(&self) -> f32 {
        self.surface_time
    }

    pub fn rendered_radius(&self, body_size_scale: f32) -> f32 {
        self.mean_radius * body_size_scale
    }

    pub fn bounding_size(&self, body_size_scale: f32) -> f32 {
        2.0 * self.rendered_radius(body_size_scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spins_and_runs_surface_clock() {
        let mut sun = Star::new(EntityId(0), "Sun", 1.0, 0.001);
        for _ in 0..10 {
            sun.advance(1.0);
        }
        assert!((sun.rotation_angle() - 0.01).abs() < 1e-12);
        assert!((sun.surface_time() - 0.5).abs() < 1e-5);
        assert_eq!(sun.bounding_size(5.0), 10.0);
    }
}
