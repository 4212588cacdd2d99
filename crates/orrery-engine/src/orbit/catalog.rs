//! Static description of the system: the star, eight planets, the moon and
//! the comet. Bodies are listed in declaration order; a satellite always
//! comes after the body it orbits.

use std::f64::consts::PI;

use crate::api::error::{OrbitError, SceneError};

use super::body::OrbitFrame;
use super::elements::OrbitalElement;

/// Ring around a body, in multiples of the body's radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingDef {
    pub inner: f32,
    pub outer: f32,
    /// Tilt about the body's local x axis.
    pub tilt_x: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Fixed(f64),
    /// Drawn from the scene's seeded generator at build time.
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDef {
    /// Stable lookup key, also used by the asset manifest.
    pub key: &'static str,
    pub name: &'static str,
    pub parent: Option<&'static str>,
    pub frame: OrbitFrame,
    pub semi_major_axis: f64,
    pub eccentricity: f64,
    pub inclination_deg: f64,
    pub phase: Phase,
    pub revolution_speed: f64,
    pub rotation_speed: f64,
    pub mean_radius: f64,
    pub axial_tilt: f32,
    /// Orbit path and label color; `None` for bodies without a drawn path.
    pub path_color: Option<u32>,
    pub label_factor: Option<f32>,
    pub ring: Option<RingDef>,
    pub clouds: bool,
    /// Untagged bodies can never be picked or focused.
    pub tagged: bool,
}

impl BodyDef {
    const fn planet(
        key: &'static str,
        name: &'static str,
        orbit: (f64, f64, f64),
        phase: f64,
        speeds: (f64, f64),
        mean_radius: f64,
        axial_tilt: f32,
        path_color: u32,
        label_factor: f32,
    ) -> Self {
        Self {
            key,
            name,
            parent: None,
            frame: OrbitFrame::Scaled,
            semi_major_axis: orbit.0,
            eccentricity: orbit.1,
            inclination_deg: orbit.2,
            phase: Phase::Fixed(phase),
            revolution_speed: speeds.0,
            rotation_speed: speeds.1,
            mean_radius,
            axial_tilt,
            path_color: Some(path_color),
            label_factor: Some(label_factor),
            ring: None,
            clouds: false,
            tagged: true,
        }
    }

    /// Validated elements; `phase` resolves a `Phase::Random` start angle.
    pub fn elements(&self, phase: f64) -> Result<OrbitalElement, SceneError> {
        let build = || -> Result<OrbitalElement, OrbitError> {
            OrbitalElement::new(self.semi_major_axis, self.eccentricity, self.inclination_deg)?
                .with_motion(phase, self.revolution_speed, self.rotation_speed)?
                .with_mean_radius(self.mean_radius)
        };
        build().map_err(|source| SceneError::InvalidBody { name: self.name.to_string(), source })
    }

    /// Bounding size relative to the body's diameter.
    pub fn extent(&self) -> f32 {
        self.ring.map(|r| r.outer).unwrap_or(1.0)
    }

    pub fn path_rgb(&self) -> Option<[f32; 3]> {
        self.path_color.map(rgb)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarDef {
    pub key: &'static str,
    pub name: &'static str,
    pub mean_radius: f32,
    pub rotation_speed: f64,
    pub halo_factor: f32,
    pub label_factor: f32,
    pub label_color: u32,
}

pub const SUN: StarDef = StarDef {
    key: "sun",
    name: "Sun",
    mean_radius: 1.0,
    rotation_speed: 0.001,
    halo_factor: 1.2,
    label_factor: 0.6,
    label_color: 0xffdd66,
};

/// Earth's cloud shell spins this much faster than the surface.
pub const CLOUD_SPIN_FACTOR: f64 = 1.1;
/// Cloud shell radius relative to the planet.
pub const CLOUD_SHELL: f32 = 1.01;

pub const PLANETS: [BodyDef; 8] = [
    BodyDef::planet("mercury", "Mercury", (0.387, 0.206, 7.0), 0.0, (0.0047, 0.001), 0.191, 0.0, 0xcccccc, 1.2),
    BodyDef::planet("venus", "Venus", (0.723, 0.007, 3.4), PI / 2.0, (0.0035, 0.001), 0.475, 0.0, 0xffb6c1, 0.7),
    BodyDef {
        clouds: true,
        ..BodyDef::planet(
            "earth",
            "Earth",
            (1.0, 0.017, 0.0),
            PI,
            (0.0017, 0.001),
            0.5,
            0.1305 * std::f32::consts::PI,
            0x4169e1,
            0.6,
        )
    },
    BodyDef::planet("mars", "Mars", (1.524, 0.093, 1.9), 1.5 * PI, (0.0024, 0.001), 0.266, 0.0, 0xff4500, 1.1),
    BodyDef::planet("jupiter", "Jupiter", (5.203, 0.048, 1.3), 0.25 * PI, (0.00038, 0.001), 5.59, 0.0, 0xff9966, 0.6),
    BodyDef {
        ring: Some(RingDef { inner: 1.2, outer: 2.0, tilt_x: std::f32::consts::PI / 2.5 }),
        ..BodyDef::planet("saturn", "Saturn", (9.537, 0.054, 2.5), 0.0, (0.000024, 0.0001), 9.449, 0.0, 0xffcc66, 0.6)
    },
    BodyDef::planet(
        "uranus",
        "Uranus",
        (19.191, 0.047, 0.8),
        1.25 * PI,
        (0.00014, 0.001),
        2.02,
        std::f32::consts::FRAC_PI_2 + 0.0874 * std::f32::consts::PI,
        0x66ffff,
        -0.5,
    ),
    BodyDef::planet("neptune", "Neptune", (30.069, 0.009, 1.8), 1.75 * PI, (0.00007, 0.001), 1.94, 0.157 * std::f32::consts::PI, 0x6699ff, 1.1),
];

/// The satellite. Its axis is in scene units around Earth.
pub const MOON: BodyDef = BodyDef {
    key: "moon",
    name: "Moon",
    parent: Some("earth"),
    frame: OrbitFrame::Absolute,
    semi_major_axis: 5.0,
    eccentricity: 0.0549,
    inclination_deg: 5.145,
    phase: Phase::Fixed(0.0),
    revolution_speed: 0.005,
    rotation_speed: 0.0001,
    mean_radius: 0.136,
    axial_tilt: 0.0,
    path_color: None,
    label_factor: None,
    ring: None,
    clouds: false,
    tagged: true,
};

pub const COMET: BodyDef = BodyDef {
    key: "comet",
    name: "Comet",
    parent: None,
    frame: OrbitFrame::Scaled,
    semi_major_axis: 8.0,
    eccentricity: 0.8,
    inclination_deg: 0.0,
    phase: Phase::Random,
    revolution_speed: 0.0005,
    rotation_speed: 0.0,
    mean_radius: 0.3 / 5.0,
    axial_tilt: 0.0,
    path_color: None,
    label_factor: None,
    ring: None,
    clouds: false,
    tagged: false,
};

pub const COMET_COLOR: [f32; 4] = [0.53, 0.67, 1.0, 1.0];

/// Every orbiting body in declaration order.
pub fn bodies(with_comet: bool) -> Vec<BodyDef> {
    let mut defs = PLANETS.to_vec();
    defs.push(MOON);
    if with_comet {
        defs.push(COMET);
    }
    defs
}

/// Index of `def`'s parent among the bodies declared before it.
pub fn resolve_parent(declared: &[BodyDef], def: &BodyDef) -> Result<Option<usize>, SceneError> {
    let Some(parent) = def.parent else {
        return Ok(None);
    };
    declared
        .iter()
        .position(|d| d.key == parent)
        .map(Some)
        .ok_or_else(|| SceneError::UnknownParent { child: def.name.to_string(), parent: parent.to_string() })
}

/// `0xRRGGBB` to linear-ish float RGB.
pub fn rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}
