//! Debris belt between the inner and outer planets.
//!
//! Thousands of rocks, each on its own fixed ellipse, all solved with the same
//! orbit solver and scale snapshot as the planets.

use glam::{Mat4, Quat, Vec3};

use crate::core::scale::ScaleSnapshot;
use crate::orbit::elements::OrbitalElement;
use crate::orbit::solver::orbit_position;
use crate::renderer::instance::{DrawInstance, DrawKind, DrawList};
use crate::renderer::layer::LayerMask;

use super::rng::Rng;

pub const BELT_INNER_AU: f64 = 2.2;
pub const BELT_OUTER_AU: f64 = 3.4;
pub const BELT_INCLINATION_DEG: f64 = 1.67;
pub const BELT_MAX_ECCENTRICITY: f64 = 0.1;
pub const ROCK_MIN_SIZE: f32 = 0.05;
pub const ROCK_MAX_SIZE: f32 = 0.2;
const ORBIT_SPEED: (f64, f64) = (1e-8, 2e-8);
const SPIN_SPEED: (f32, f32) = (1e-7, 5e-7);
const ROCK_COLOR: [f32; 4] = [0.5, 0.5, 0.5, 1.0];

#[derive(Debug, Clone)]
struct Rock {
    elements: OrbitalElement,
    angle: f64,
    size: f32,
    orientation: Quat,
    spin: f32,
    spin_speed: f32,
}

pub struct DebrisBelt {
    rocks: Vec<Rock>,
    positions: Vec<Vec3>,
    orbit_scale: f64,
}

impl DebrisBelt {
    pub fn generate(count: usize, orbit_scale: f64, rng: &mut Rng) -> Self {
        let rocks: Vec<Rock> = (0..count)
            .filter_map(|_| {
                let axis = rng.range_f64(BELT_INNER_AU, BELT_OUTER_AU);
                let eccentricity = rng.range_f64(0.0, BELT_MAX_ECCENTRICITY);
                let speed = rng.range_f64(ORBIT_SPEED.0, ORBIT_SPEED.1);
                let elements = OrbitalElement::new(axis, eccentricity, BELT_INCLINATION_DEG)
                    .and_then(|e| e.with_motion(0.0, speed, 0.0))
                    .ok()?;
                let pi = std::f32::consts::PI;
                Some(Rock {
                    elements,
                    angle: rng.range_f64(0.0, std::f64::consts::TAU),
                    size: rng.range(ROCK_MIN_SIZE, ROCK_MAX_SIZE),
                    orientation: Quat::from_euler(
                        glam::EulerRot::XYZ,
                        rng.range(0.0, pi),
                        rng.range(0.0, pi),
                        rng.range(0.0, pi),
                    ),
                    spin: 0.0,
                    spin_speed: rng.range(SPIN_SPEED.0, SPIN_SPEED.1),
                })
            })
            .collect();
        let mut belt = Self { positions: Vec::with_capacity(rocks.len()), rocks, orbit_scale };
        belt.solve();
        belt
    }

    fn solve(&mut self) {
        let scale = self.orbit_scale;
        self.positions.clear();
        self.positions
            .extend(self.rocks.iter().map(|r| orbit_position(&r.elements, r.angle, scale).as_vec3()));
    }

    pub fn advance(&mut self, dt: f64, snapshot: &ScaleSnapshot) {
        for rock in &mut self.rocks {
            rock.angle += rock.elements.revolution_speed() * dt;
            rock.spin += rock.spin_speed * dt as f32;
        }
        self.orbit_scale = snapshot.orbit_scale;
        self.solve();
    }

    /// Re-solve every rock at a new scale without advancing time.
    pub fn rescale(&mut self, orbit_scale: f64) {
        self.orbit_scale = orbit_scale;
        self.solve();
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.rocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rocks.is_empty()
    }

    pub fn emit(&self, draw: &mut DrawList) {
        for (rock, pos) in self.rocks.iter().zip(&self.positions) {
            let rotation = Quat::from_rotation_y(rock.spin) * rock.orientation;
            let model = Mat4::from_scale_rotation_translation(Vec3::splat(rock.size), rotation, *pos);
            draw.push(LayerMask::ENTIRE, DrawInstance::new(model, DrawKind::Point).with_color(ROCK_COLOR));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(orbit_scale: f64) -> ScaleSnapshot {
        ScaleSnapshot { orbit_scale, body_size_scale: 5.0 }
    }

    #[test]
    fn rocks_sit_inside_the_belt() {
        let mut rng = Rng::new(42);
        let belt = DebrisBelt::generate(500, 70.0, &mut rng);
        assert_eq!(belt.len(), 500);
        let inner = BELT_INNER_AU * 70.0 * (1.0 - BELT_MAX_ECCENTRICITY);
        let outer = BELT_OUTER_AU * 70.0 * (1.0 + BELT_MAX_ECCENTRICITY);
        for p in belt.positions() {
            let r = p.length() as f64;
            assert!(r >= inner - 1e-3 && r <= outer + 1e-3, "rock at {}", r);
        }
    }

    #[test]
    fn rescale_round_trip_is_exact() {
        let mut rng = Rng::new(1);
        let mut belt = DebrisBelt::generate(50, 70.0, &mut rng);
        belt.advance(100.0, &snap(70.0));
        let before = belt.positions().to_vec();
        belt.rescale(140.0);
        assert_ne!(belt.positions(), &before[..]);
        belt.rescale(70.0);
        assert_eq!(belt.positions(), &before[..]);
    }

    #[test]
    fn same_seed_same_belt() {
        let a = DebrisBelt::generate(20, 70.0, &mut Rng::new(9));
        let b = DebrisBelt::generate(20, 70.0, &mut Rng::new(9));
        assert_eq!(a.positions(), b.positions());
    }

    #[test]
    fn emits_one_instance_per_rock() {
        let belt = DebrisBelt::generate(12, 70.0, &mut Rng::new(3));
        let mut draw = DrawList::new();
        belt.emit(&mut draw);
        assert_eq!(draw.items().len(), 12);
        assert!(draw.items().iter().all(|i| !i.layers.intersects(LayerMask::BLOOM)));
    }
}
