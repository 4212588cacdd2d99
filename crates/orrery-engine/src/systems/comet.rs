//! Comet tail: a particle stream that always points away from the star.
//!
//! Particles live in a tail-local frame where `along` is the distance behind
//! the nucleus (anti-sunward) and `(side, up)` is the lateral offset. The
//! frame is oriented every frame from the nucleus and star positions.

use glam::{Mat4, Quat, Vec3};

use crate::renderer::instance::{DrawInstance, DrawKind, DrawList};
use crate::renderer::layer::LayerMask;

use super::rng::Rng;

pub const TAIL_LENGTH: f32 = 6.0;
/// Per-tick drift range along the tail.
const DRIFT: (f32, f32) = (0.02, 0.03);
const RESPAWN_DEPTH: f32 = 0.1;
const RESPAWN_RADIUS: f32 = 0.1;
const LATERAL_JITTER: f32 = 0.001;
const MAX_SIZE: f32 = 0.4;
const MAX_ALPHA: f32 = 0.8;
const TAIL_COLOR: [f32; 3] = [0.53, 0.67, 1.0];

#[derive(Debug, Clone, Copy, PartialEq)]
struct TailParticle {
    along: f32,
    side: f32,
    up: f32,
}

impl TailParticle {
    fn respawn(rng: &mut Rng) -> Self {
        let angle = rng.range(0.0, std::f32::consts::TAU);
        let radius = rng.range(0.0, RESPAWN_RADIUS);
        Self {
            along: rng.range(0.0, RESPAWN_DEPTH),
            side: angle.cos() * radius,
            up: angle.sin() * radius,
        }
    }

    fn depth(&self) -> f32 {
        (self.along / TAIL_LENGTH).clamp(0.0, 1.0)
    }

    /// Sprite size, shrinking toward the end of the tail.
    fn size(&self) -> f32 {
        (1.0 - self.depth().powf(1.2)) * MAX_SIZE
    }

    fn alpha(&self) -> f32 {
        (1.0 - self.depth().powf(1.5)) * MAX_ALPHA
    }
}

pub struct CometTail {
    particles: Vec<TailParticle>,
    rng: Rng,
}

impl CometTail {
    /// Particles start spread over the whole tail so it does not grow in
    /// from nothing on the first frames.
    pub fn new(count: usize, mut rng: Rng) -> Self {
        let particles = (0..count)
            .map(|_| {
                let mut p = TailParticle::respawn(&mut rng);
                p.along = rng.range(0.0, TAIL_LENGTH);
                p
            })
            .collect();
        Self { particles, rng }
    }

    /// Advance by `dt` ticks.
    pub fn advance(&mut self, dt: f32) {
        for p in &mut self.particles {
            p.along += self.rng.range(DRIFT.0, DRIFT.1) * dt;
            p.side += self.rng.spread(LATERAL_JITTER) * dt;
            p.up += self.rng.spread(LATERAL_JITTER) * dt;
            if p.along > TAIL_LENGTH {
                *p = TailParticle::respawn(&mut self.rng);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Orientation that maps the tail frame's +x onto the anti-sunward axis.
    pub fn orientation(nucleus: Vec3, star: Vec3) -> Quat {
        let away = (nucleus - star).normalize_or_zero();
        if away == Vec3::ZERO {
            return Quat::IDENTITY;
        }
        Quat::from_rotation_arc(Vec3::X, away)
    }

    /// World position of every particle for a nucleus at `nucleus`.
    pub fn positions(&self, nucleus: Vec3, star: Vec3) -> impl Iterator<Item = Vec3> + '_ {
        let rotation = Self::orientation(nucleus, star);
        self.particles
            .iter()
            .map(move |p| nucleus + rotation * Vec3::new(p.along, p.up, p.side))
    }

    pub fn emit(&self, draw: &mut DrawList, nucleus: Vec3, star: Vec3) {
        let [r, g, b] = TAIL_COLOR;
        for (p, pos) in self.particles.iter().zip(self.positions(nucleus, star)) {
            let size = p.size();
            if size <= 0.0 {
                continue;
            }
            let model = Mat4::from_scale_rotation_translation(Vec3::splat(size), Quat::IDENTITY, pos);
            draw.push(
                LayerMask::EMISSIVE,
                DrawInstance::new(model, DrawKind::Point).with_color([r, g, b, p.alpha()]),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tail_points_away_from_the_star() {
        let tail = CometTail::new(200, Rng::new(11));
        let nucleus = Vec3::new(100.0, 0.0, 0.0);
        for pos in tail.positions(nucleus, Vec3::ZERO) {
            assert!(pos.x >= nucleus.x - 1e-3);
            assert!(pos.x <= nucleus.x + TAIL_LENGTH + 1e-3);
        }

        let nucleus = Vec3::new(0.0, 0.0, -50.0);
        for pos in tail.positions(nucleus, Vec3::ZERO) {
            assert!(pos.z <= nucleus.z + 1e-3);
        }
    }

    #[test]
    fn particles_recycle_at_the_tail_end() {
        let mut tail = CometTail::new(100, Rng::new(5));
        for _ in 0..1000 {
            tail.advance(1.0);
        }
        assert_eq!(tail.len(), 100);
        for p in &tail.particles {
            assert!(p.along <= TAIL_LENGTH);
        }
    }

    #[test]
    fn particles_fade_and_shrink_with_depth() {
        let head = TailParticle { along: 0.0, side: 0.0, up: 0.0 };
        let end = TailParticle { along: TAIL_LENGTH, side: 0.0, up: 0.0 };
        assert_eq!(head.size(), MAX_SIZE);
        assert_eq!(head.alpha(), MAX_ALPHA);
        assert_eq!(end.size(), 0.0);
        assert_eq!(end.alpha(), 0.0);
    }

    #[test]
    fn emit_skips_dead_particles() {
        let mut tail = CometTail::new(3, Rng::new(1));
        tail.particles[0].along = TAIL_LENGTH;
        let mut draw = DrawList::new();
        tail.emit(&mut draw, Vec3::X * 10.0, Vec3::ZERO);
        assert_eq!(draw.items().len(), 2);
        assert!(draw.items().iter().all(|i| i.layers == LayerMask::EMISSIVE));
    }

    #[test]
    fn degenerate_orientation_is_identity() {
        assert_eq!(CometTail::orientation(Vec3::ZERO, Vec3::ZERO), Quat::IDENTITY);
    }
}
