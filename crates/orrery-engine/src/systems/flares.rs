//! Sun flares: a fixed ring of additive sprites around the star that switch
//! on at random, fade in, hold and fade back out.

use glam::{Mat4, Quat, Vec3};

use crate::renderer::instance::{DrawInstance, DrawKind, DrawList};
use crate::renderer::layer::LayerMask;

use super::rng::Rng;

pub const FLARE_COUNT: usize = 5;
/// Chance per tick that an idle flare ignites.
pub const FLARE_FREQUENCY: f32 = 0.0002;
pub const FLARE_MAX_OPACITY: f32 = 0.4;
const FLARE_DURATION: (f32, f32) = (2.0, 4.0);
const FLARE_SIZE: (f32, f32) = (1.0, 2.0);
/// Remaining duration at which the fade-out starts.
const FADE_OUT_AT: f32 = 0.8;
/// Distance from the star center, in unscaled star radii.
const RING_RADIUS: f32 = 5.0;
const FLARE_COLOR: [f32; 3] = [1.0, 0.85, 0.6];

#[derive(Debug, Clone, Copy, PartialEq)]
enum FlarePhase {
    Idle,
    FadeIn,
    Hold,
    FadeOut,
}

#[derive(Debug, Clone)]
pub struct Flare {
    angle: f32,
    size: f32,
    opacity: f32,
    duration: f32,
    phase: FlarePhase,
}

impl Flare {
    pub fn is_active(&self) -> bool {
        self.phase != FlarePhase::Idle
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    fn ignite(&mut self, rng: &mut Rng) {
        self.duration = rng.range(FLARE_DURATION.0, FLARE_DURATION.1);
        self.phase = FlarePhase::FadeIn;
    }

    fn advance(&mut self, dt: f32) {
        if self.phase == FlarePhase::Idle {
            return;
        }
        if self.phase == FlarePhase::FadeIn {
            self.opacity += dt;
            if self.opacity >= FLARE_MAX_OPACITY {
                self.opacity = FLARE_MAX_OPACITY;
                self.phase = FlarePhase::Hold;
            }
        }
        self.duration -= dt;
        if self.duration <= FADE_OUT_AT {
            self.phase = FlarePhase::FadeOut;
        }
        if self.phase == FlarePhase::FadeOut {
            self.opacity -= dt * 0.5;
            if self.opacity <= 0.0 {
                self.opacity = 0.0;
                self.phase = FlarePhase::Idle;
            }
        }
    }
}

pub struct SunFlares {
    flares: Vec<Flare>,
    rng: Rng,
}

impl SunFlares {
    pub fn new(mut rng: Rng) -> Self {
        let flares = (0..FLARE_COUNT)
            .map(|i| Flare {
                angle: i as f32 / FLARE_COUNT as f32 * std::f32::consts::TAU,
                size: rng.range(FLARE_SIZE.0, FLARE_SIZE.1),
                opacity: 0.0,
                duration: 0.0,
                phase: FlarePhase::Idle,
            })
            .collect();
        Self { flares, rng }
    }

    /// One tick. `dt` is in seconds.
    pub fn advance(&mut self, dt: f32) {
        for flare in &mut self.flares {
            if !flare.is_active() && self.rng.chance(FLARE_FREQUENCY) {
                flare.ignite(&mut self.rng);
            }
            flare.advance(dt);
        }
    }

    /// Force a flare on (host effects, tests).
    pub fn ignite(&mut self, index: usize) {
        if let Some(flare) = self.flares.get_mut(index) {
            if !flare.is_active() {
                flare.ignite(&mut self.rng);
            }
        }
    }

    pub fn flares(&self) -> &[Flare] {
        &self.flares
    }

    /// Sprites for every visible flare, placed around the star's world
    /// transform so they spin and scale with it.
    pub fn emit(&self, draw: &mut DrawList, star: Mat4) {
        for flare in self.flares.iter().filter(|f| f.opacity > 0.0) {
            let local = Mat4::from_scale_rotation_translation(
                Vec3::splat(flare.size),
                Quat::IDENTITY,
                Vec3::new(flare.angle.cos(), flare.angle.sin(), 0.0) * RING_RADIUS,
            );
            let [r, g, b] = FLARE_COLOR;
            draw.push(
                LayerMask::EMISSIVE,
                DrawInstance::new(star * local, DrawKind::Sprite)
                    .with_color([r, g, b, flare.opacity])
                    .with_emissive(1.0),
            );
        }
    }
}
