// extensions/easing.rs
//
// Easing curves for camera transitions. Pure math over a normalized t.

use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    /// Constant velocity.
    Linear,
    QuadIn,
    QuadOut,
    /// Slow start and end; the focus transition curve.
    #[default]
    QuadInOut,
    CubicInOut,
    SineInOut,
}

impl Easing {
    /// Apply the curve to `t`, clamped to [0, 1].
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadIn => t * t,
            Easing::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::SineInOut => -((std::f32::consts::PI * t).cos() - 1.0) / 2.0,
        }
    }
}

#[inline]
pub fn ease_vec3(a: Vec3, b: Vec3, t: f32, easing: Easing) -> Vec3 {
    a.lerp(b, easing.apply(t))
}
