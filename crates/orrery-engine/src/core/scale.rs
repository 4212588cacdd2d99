//! Runtime settings: the single writer of scale, bloom and visibility values,
//! and the immutable per-frame snapshot every consumer reads instead.

use std::collections::{HashMap, HashSet};

use crate::api::config::SceneConfig;
use crate::api::types::EntityId;
use crate::renderer::compositor::BloomSettings;

pub const ORBIT_SCALE_RANGE: (f64, f64) = (10.0, 200.0);
pub const BODY_SIZE_SCALE_RANGE: (f32, f32) = (0.1, 20.0);
pub const ROTATION_SPEED_RANGE: (f64, f64) = (0.0, 0.05);
pub const BLOOM_STRENGTH_RANGE: (f32, f32) = (0.0, 5.0);
pub const BLOOM_RADIUS_RANGE: (f32, f32) = (0.0, 1.0);
pub const BLOOM_THRESHOLD_RANGE: (f32, f32) = (0.0, 1.0);

/// Scale values frozen at the start of a tick. Bodies, orbit paths and the
/// belt all read the same snapshot, so they never disagree within a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleSnapshot {
    pub orbit_scale: f64,
    pub body_size_scale: f32,
}

/// Scene-wide layers that can be toggled as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecorLayer {
    Belt,
    Links,
    Labels,
    Comet,
    Flares,
}

/// A single write from the configuration surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingWrite {
    OrbitScale(f64),
    BodySizeScale(f32),
    RotationSpeed { body: EntityId, speed: f64 },
    BloomStrength(f32),
    BloomRadius(f32),
    BloomThreshold(f32),
    BodyVisible { body: EntityId, visible: bool },
    PathVisible { body: EntityId, visible: bool },
    LayerVisible { layer: DecorLayer, visible: bool },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Visibility {
    hidden_bodies: HashSet<EntityId>,
    hidden_paths: HashSet<EntityId>,
    hidden_layers: HashSet<DecorLayer>,
}

impl Visibility {
    pub fn body(&self, id: EntityId) -> bool {
        !self.hidden_bodies.contains(&id)
    }

    pub fn path(&self, id: EntityId) -> bool {
        !self.hidden_paths.contains(&id)
    }

    pub fn layer(&self, layer: DecorLayer) -> bool {
        !self.hidden_layers.contains(&layer)
    }
}

fn toggle<T: std::hash::Hash + Eq>(hidden: &mut HashSet<T>, key: T, visible: bool) {
    if visible {
        hidden.remove(&key);
    } else {
        hidden.insert(key);
    }
}

fn clamp_f64(name: &str, value: f64, (min, max): (f64, f64)) -> f64 {
    let clamped = if value.is_nan() { min } else { value.clamp(min, max) };
    if clamped != value {
        log::warn!("{} = {} out of range [{}, {}], clamped to {}", name, value, min, max, clamped);
    }
    clamped
}

fn clamp_f32(name: &str, value: f32, (min, max): (f32, f32)) -> f32 {
    clamp_f64(name, value as f64, (min as f64, max as f64)) as f32
}

/// Holds the live settings. Out-of-range writes are clamped, never rejected.
/// Every accepted write bumps `revision` so readers can resync cheaply.
#[derive(Debug, Clone)]
pub struct SettingsSurface {
    orbit_scale: f64,
    body_size_scale: f32,
    rotation_speeds: HashMap<EntityId, f64>,
    bloom: BloomSettings,
    visibility: Visibility,
    revision: u64,
}

impl SettingsSurface {
    pub fn from_config(config: &SceneConfig) -> Self {
        let mut surface = Self {
            orbit_scale: 0.0,
            body_size_scale: 0.0,
            rotation_speeds: HashMap::new(),
            bloom: BloomSettings::default(),
            visibility: Visibility::default(),
            revision: 0,
        };
        surface.set_orbit_scale(config.orbit_scale);
        surface.set_body_size_scale(config.body_size_scale);
        surface.set_bloom(config.bloom);
        surface
    }

    pub fn set_orbit_scale(&mut self, value: f64) -> f64 {
        self.orbit_scale = clamp_f64("orbit_scale", value, ORBIT_SCALE_RANGE);
        self.revision += 1;
        self.orbit_scale
    }

    pub fn set_body_size_scale(&mut self, value: f32) -> f32 {
        self.body_size_scale = clamp_f32("body_size_scale", value, BODY_SIZE_SCALE_RANGE);
        self.revision += 1;
        self.body_size_scale
    }

    pub fn set_rotation_speed(&mut self, body: EntityId, speed: f64) -> f64 {
        let speed = clamp_f64("rotation_speed", speed, ROTATION_SPEED_RANGE);
        self.rotation_speeds.insert(body, speed);
        self.revision += 1;
        speed
    }

    pub fn set_bloom(&mut self, bloom: BloomSettings) -> BloomSettings {
        self.bloom = BloomSettings {
            strength: clamp_f32("bloom.strength", bloom.strength, BLOOM_STRENGTH_RANGE),
            radius: clamp_f32("bloom.radius", bloom.radius, BLOOM_RADIUS_RANGE),
            threshold: clamp_f32("bloom.threshold", bloom.threshold, BLOOM_THRESHOLD_RANGE),
        };
        self.revision += 1;
        self.bloom
    }

    /// Apply one write from the host.
    pub fn apply(&mut self, write: SettingWrite) {
        match write {
            SettingWrite::OrbitScale(v) => {
                self.set_orbit_scale(v);
            }
            SettingWrite::BodySizeScale(v) => {
                self.set_body_size_scale(v);
            }
            SettingWrite::RotationSpeed { body, speed } => {
                self.set_rotation_speed(body, speed);
            }
            SettingWrite::BloomStrength(v) => {
                self.set_bloom(BloomSettings { strength: v, ..self.bloom });
            }
            SettingWrite::BloomRadius(v) => {
                self.set_bloom(BloomSettings { radius: v, ..self.bloom });
            }
            SettingWrite::BloomThreshold(v) => {
                self.set_bloom(BloomSettings { threshold: v, ..self.bloom });
            }
            SettingWrite::BodyVisible { body, visible } => {
                toggle(&mut self.visibility.hidden_bodies, body, visible);
                self.revision += 1;
            }
            SettingWrite::PathVisible { body, visible } => {
                toggle(&mut self.visibility.hidden_paths, body, visible);
                self.revision += 1;
            }
            SettingWrite::LayerVisible { layer, visible } => {
                toggle(&mut self.visibility.hidden_layers, layer, visible);
                self.revision += 1;
            }
        }
    }

    pub fn snapshot(&self) -> ScaleSnapshot {
        ScaleSnapshot { orbit_scale: self.orbit_scale, body_size_scale: self.body_size_scale }
    }

    pub fn rotation_speed(&self, body: EntityId) -> Option<f64> {
        self.rotation_speeds.get(&body).copied()
    }

    pub fn bloom(&self) -> BloomSettings {
        self.bloom
    }

    pub fn visibility(&self) -> &Visibility {
        &self.visibility
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface() -> SettingsSurface {
        SettingsSurface::from_config(&SceneConfig::default())
    }

    #[test]
    fn defaults_come_from_config() {
        let s = surface().snapshot();
        assert_eq!(s.orbit_scale, 70.0);
        assert_eq!(s.body_size_scale, 5.0);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let mut s = surface();
        assert_eq!(s.set_orbit_scale(5000.0), ORBIT_SCALE_RANGE.1);
        assert_eq!(s.set_orbit_scale(-3.0), ORBIT_SCALE_RANGE.0);
        assert_eq!(s.set_orbit_scale(f64::NAN), ORBIT_SCALE_RANGE.0);
        s.apply(SettingWrite::BloomStrength(12.0));
        assert_eq!(s.bloom().strength, 5.0);
        s.apply(SettingWrite::BloomThreshold(-1.0));
        assert_eq!(s.bloom().threshold, 0.0);
        assert_eq!(s.set_rotation_speed(EntityId(1), 1.0), 0.05);
    }

    #[test]
    fn snapshot_is_detached_from_later_writes() {
        let mut s = surface();
        let before = s.snapshot();
        s.apply(SettingWrite::OrbitScale(100.0));
        assert_eq!(before.orbit_scale, 70.0);
        assert_eq!(s.snapshot().orbit_scale, 100.0);
    }

    #[test]
    fn visibility_toggles_round_trip() {
        let mut s = surface();
        let rev = s.revision();
        s.apply(SettingWrite::BodyVisible { body: EntityId(4), visible: false });
        assert!(!s.visibility().body(EntityId(4)));
        assert!(s.revision() > rev);
        s.apply(SettingWrite::BodyVisible { body: EntityId(4), visible: true });
        assert!(s.visibility().body(EntityId(4)));
        s.apply(SettingWrite::LayerVisible { layer: DecorLayer::Belt, visible: false });
        assert!(!s.visibility().layer(DecorLayer::Belt));
        assert!(s.visibility().layer(DecorLayer::Links));
    }
}
