//! Pure ellipse evaluation. The central body sits at the focus, not the center.

use glam::DVec3;

use super::elements::OrbitalElement;

/// Ellipse dimensions in scene units for one orbit at one scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse {
    /// Semi-major axis.
    pub a: f64,
    /// Semi-minor axis.
    pub b: f64,
    /// Focal offset from the center.
    pub c: f64,
}

impl Ellipse {
    pub fn new(semi_major_axis: f64, eccentricity: f64) -> Self {
        let a = semi_major_axis;
        let c = a * eccentricity;
        let b = (a * a - c * c).sqrt();
        Self { a, b, c }
    }

    pub fn of(elements: &OrbitalElement, orbit_scale: f64) -> Self {
        Self::new(elements.semi_major_axis_au() * orbit_scale, elements.eccentricity())
    }

    /// Point in the orbital plane, focus at the origin.
    pub fn in_plane(&self, angle: f64) -> (f64, f64) {
        (self.a * angle.cos() - self.c, self.b * angle.sin())
    }

    pub fn periapsis(&self) -> f64 {
        self.a - self.c
    }

    pub fn apoapsis(&self) -> f64 {
        self.a + self.c
    }
}

/// Tilt an orbital-plane point about the x axis.
#[inline]
pub fn incline(x: f64, z: f64, inclination_rad: f64) -> DVec3 {
    let (sin, cos) = inclination_rad.sin_cos();
    DVec3::new(x, -z * sin, z * cos)
}

/// Position on the orbit for a given revolution angle and scale.
pub fn orbit_position(elements: &OrbitalElement, angle: f64, orbit_scale: f64) -> DVec3 {
    let (x, z) = Ellipse::of(elements, orbit_scale).in_plane(angle);
    incline(x, z, elements.inclination_rad())
}
