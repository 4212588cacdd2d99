use crate::api::error::OrbitError;

/// Fixed orbital parameters of one body. Validated on construction and
/// immutable afterwards; motion lives in `OrbitState`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalElement {
    semi_major_axis_au: f64,
    eccentricity: f64,
    inclination_deg: f64,
    initial_phase: f64,
    revolution_speed: f64,
    rotation_speed: f64,
    mean_radius: f64,
}

fn finite(name: &'static str, v: f64) -> Result<f64, OrbitError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(OrbitError::NonFinite(name))
    }
}

impl OrbitalElement {
    /// Shape of the orbit. Eccentricity must lie in [0, 1) and the axis must be positive.
    pub fn new(semi_major_axis_au: f64, eccentricity: f64, inclination_deg: f64) -> Result<Self, OrbitError> {
        let a = finite("semi_major_axis", semi_major_axis_au)?;
        let e = finite("eccentricity", eccentricity)?;
        let inc = finite("inclination", inclination_deg)?;
        if a <= 0.0 {
            return Err(OrbitError::SemiMajorAxis(a));
        }
        if !(0.0..1.0).contains(&e) {
            return Err(OrbitError::Eccentricity(e));
        }
        Ok(Self {
            semi_major_axis_au: a,
            eccentricity: e,
            inclination_deg: inc,
            initial_phase: 0.0,
            revolution_speed: 0.0,
            rotation_speed: 0.0,
            mean_radius: 1.0,
        })
    }

    /// Starting angle and per-tick angular speeds.
    pub fn with_motion(self, initial_phase: f64, revolution_speed: f64, rotation_speed: f64) -> Result<Self, OrbitError> {
        Ok(Self {
            initial_phase: finite("initial_phase", initial_phase)?,
            revolution_speed: finite("revolution_speed", revolution_speed)?,
            rotation_speed: finite("rotation_speed", rotation_speed)?,
            ..self
        })
    }

    /// Rendered radius before the global body-size multiplier.
    pub fn with_mean_radius(self, mean_radius: f64) -> Result<Self, OrbitError> {
        let r = finite("mean_radius", mean_radius)?;
        if r < 0.0 {
            return Err(OrbitError::Radius(r));
        }
        Ok(Self { mean_radius: r, ..self })
    }

    pub fn semi_major_axis_au(&self) -> f64 {
        self.semi_major_axis_au
    }

    pub fn eccentricity(&self) -> f64 {
        self.eccentricity
    }

    pub fn inclination_deg(&self) -> f64 {
        self.inclination_deg
    }

    pub fn inclination_rad(&self) -> f64 {
        self.inclination_deg.to_radians()
    }

    pub fn initial_phase(&self) -> f64 {
        self.initial_phase
    }

    pub fn revolution_speed(&self) -> f64 {
        self.revolution_speed
    }

    pub fn rotation_speed(&self) -> f64 {
        self.rotation_speed
    }

    pub fn mean_radius(&self) -> f64 {
        self.mean_radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_shapes() {
        assert!(OrbitalElement::new(1.0, 0.0, 0.0).is_ok());
        assert!(OrbitalElement::new(30.069, 0.999, 179.0).is_ok());
    }

    #[test]
    fn rejects_parabolic_and_hyperbolic() {
        assert_eq!(OrbitalElement::new(1.0, 1.0, 0.0), Err(OrbitError::Eccentricity(1.0)));
        assert_eq!(OrbitalElement::new(1.0, 1.5, 0.0), Err(OrbitError::Eccentricity(1.5)));
        assert_eq!(OrbitalElement::new(1.0, -0.1, 0.0), Err(OrbitError::Eccentricity(-0.1)));
    }

    #[test]
    fn rejects_bad_axis() {
        assert_eq!(OrbitalElement::new(-2.0, 0.1, 0.0), Err(OrbitError::SemiMajorAxis(-2.0)));
        assert_eq!(OrbitalElement::new(0.0, 0.1, 0.0), Err(OrbitError::SemiMajorAxis(0.0)));
    }

    #[test]
    fn rejects_non_finite_motion() {
        let el = OrbitalElement::new(1.0, 0.1, 0.0).unwrap();
        assert_eq!(
            el.with_motion(0.0, f64::NAN, 0.0),
            Err(OrbitError::NonFinite("revolution_speed"))
        );
        assert_eq!(el.with_mean_radius(-1.0), Err(OrbitError::Radius(-1.0)));
    }
}
