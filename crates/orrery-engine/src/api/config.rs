use serde::{Deserialize, Serialize};

use crate::renderer::compositor::BloomSettings;

/// Scene configuration supplied by the host at startup.
///
/// Every field has a default, so `{}` is a valid configuration and hosts
/// only spell out what they change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// AU to scene-units multiplier.
    pub orbit_scale: f64,
    /// Multiplier on rendered body radii (positions are unaffected).
    pub body_size_scale: f32,
    /// Seed for every procedural system (belt, links, flares, comet).
    pub seed: u64,
    pub bloom: BloomSettings,
    pub camera: CameraConfig,
    pub focus: FocusConfig,
    pub links: LinkConfig,
    pub belt: BeltConfig,
    pub comet: CometConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            orbit_scale: 70.0,
            body_size_scale: 5.0,
            seed: 42,
            bloom: BloomSettings::default(),
            camera: CameraConfig::default(),
            focus: FocusConfig::default(),
            links: LinkConfig::default(),
            belt: BeltConfig::default(),
            comet: CometConfig::default(),
        }
    }
}

impl SceneConfig {
    /// Parse a configuration from JSON. Missing fields fall back to defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Small deterministic scene for tests and previews.
    pub fn lightweight() -> Self {
        Self {
            links: LinkConfig { max_links: 16, ..LinkConfig::default() },
            belt: BeltConfig { count: 64 },
            comet: CometConfig { tail_particles: 32, ..CometConfig::default() },
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    /// Initial viewport, replaced by the first resize.
    pub width: u32,
    pub height: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_deg: 60.0,
            near: 0.1,
            far: 100_000.0,
            position: [0.0, 0.0, 50.0],
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusConfig {
    /// Length of the lock transition in ticks.
    pub transition_ticks: f32,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self { transition_ticks: 120.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    pub max_links: usize,
    /// Chance per tick of spawning one more link while below capacity.
    pub spawn_chance: f32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self { max_links: 2000, spawn_chance: 0.5 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeltConfig {
    pub count: usize,
}

impl Default for BeltConfig {
    fn default() -> Self {
        Self { count: 20_000 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CometConfig {
    pub enabled: bool,
    pub tail_particles: usize,
}

impl Default for CometConfig {
    fn default() -> Self {
        Self { enabled: true, tail_particles: 1000 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_is_default() {
        let cfg = SceneConfig::from_json("{}").unwrap();
        assert_eq!(cfg, SceneConfig::default());
        assert_eq!(cfg.orbit_scale, 70.0);
        assert_eq!(cfg.body_size_scale, 5.0);
    }

    #[test]
    fn partial_json_overrides_fields() {
        let cfg = SceneConfig::from_json(
            r#"{ "orbit_scale": 90.0, "bloom": { "strength": 2.0 }, "belt": { "count": 10 } }"#,
        )
        .unwrap();
        assert_eq!(cfg.orbit_scale, 90.0);
        assert_eq!(cfg.bloom.strength, 2.0);
        assert_eq!(cfg.bloom.radius, 0.5);
        assert_eq!(cfg.belt.count, 10);
        assert_eq!(cfg.links.max_links, 2000);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(SceneConfig::from_json("{ orbit_scale: }").is_err());
    }
}
