//! Screen-space name labels anchored above bodies.
//!
//! Labels are re-projected after the camera has settled for the frame and
//! handed to the overlay pass as flat records; the host draws the text.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

use crate::api::types::EntityId;
use crate::renderer::camera::OrbitCamera;

pub const LABEL_OPACITY: f32 = 0.8;
pub const HIGHLIGHT_OPACITY: f32 = 1.0;
pub const HIGHLIGHT_SCALE: f32 = 1.2;
/// Anchor height factor for bodies without their own.
pub const DEFAULT_ANCHOR_FACTOR: f32 = 1.1;

/// Approximate glyph box used for label hit-testing, in pixels at scale 1.
const GLYPH_WIDTH: f32 = 8.0;
const GLYPH_HEIGHT: f32 = 16.0;

/// Per-label overlay record.
/// 8 floats = 32 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct LabelInstance {
    /// Pixel position of the label's anchor (origin top-left).
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub opacity: f32,
    /// Entity id; the host looks the text up once via `OverlayLabelSystem::text`.
    pub entity: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl LabelInstance {
    pub const FLOATS: usize = 8;
}

/// Where a label should sit this frame. `None` from the anchor lookup means
/// the body is hidden and its label is skipped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelAnchor {
    pub position: Vec3,
    pub bounding_size: f32,
}

#[derive(Debug, Clone)]
pub struct Label {
    pub entity: EntityId,
    pub text: String,
    pub color: [f32; 3],
    pub anchor_factor: f32,
}

pub struct OverlayLabelSystem {
    labels: Vec<Label>,
    instances: Vec<LabelInstance>,
    highlighted: Option<EntityId>,
    enabled: bool,
}

impl Default for OverlayLabelSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayLabelSystem {
    pub fn new() -> Self {
        Self {
            labels: Vec::new(),
            instances: Vec::new(),
            highlighted: None,
            enabled: true,
        }
    }

    pub fn add(&mut self, entity: EntityId, text: impl Into<String>, color: [f32; 3], anchor_factor: f32) {
        self.labels.push(Label { entity, text: text.into(), color, anchor_factor });
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn text(&self, entity: EntityId) -> Option<&str> {
        self.labels.iter().find(|l| l.entity == entity).map(|l| l.text.as_str())
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.instances.clear();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns true when the highlight actually moved.
    pub fn set_highlight(&mut self, entity: Option<EntityId>) -> bool {
        let entity = entity.filter(|id| self.labels.iter().any(|l| l.entity == *id));
        if entity == self.highlighted {
            return false;
        }
        self.highlighted = entity;
        true
    }

    pub fn highlighted(&self) -> Option<EntityId> {
        self.highlighted
    }

    /// Re-project every label through the final camera of the frame.
    pub fn update(&mut self, camera: &OrbitCamera, anchor: impl Fn(EntityId) -> Option<LabelAnchor>) {
        self.instances.clear();
        if !self.enabled {
            return;
        }
        for label in &self.labels {
            let Some(a) = anchor(label.entity) else {
                continue;
            };
            let world = a.position + Vec3::Y * (a.bounding_size * label.anchor_factor);
            let Some(screen) = camera.project(world) else {
                continue;
            };
            let lit = self.highlighted == Some(label.entity);
            let [r, g, b] = label.color;
            self.instances.push(LabelInstance {
                x: screen.x,
                y: screen.y,
                scale: if lit { HIGHLIGHT_SCALE } else { 1.0 },
                opacity: if lit { HIGHLIGHT_OPACITY } else { LABEL_OPACITY },
                entity: label.entity.as_f32(),
                r,
                g,
                b,
            });
        }
    }

    pub fn instances(&self) -> &[LabelInstance] {
        &self.instances
    }

    /// Topmost label whose text box contains the pixel, if any. Later labels
    /// are drawn over earlier ones, so the search runs back to front.
    pub fn label_at(&self, x: f32, y: f32) -> Option<EntityId> {
        let p = Vec2::new(x, y);
        self.instances.iter().rev().find_map(|inst| {
            let entity = EntityId(inst.entity as u32);
            let chars = self.text(entity).map(|t| t.chars().count()).unwrap_or(0) as f32;
            let half = Vec2::new(chars * GLYPH_WIDTH, GLYPH_HEIGHT) * inst.scale * 0.5;
            let d = (p - Vec2::new(inst.x, inst.y)).abs();
            (d.x <= half.x && d.y <= half.y).then_some(entity)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::CameraConfig;

    fn camera() -> OrbitCamera {
        let mut cam = OrbitCamera::new(&CameraConfig::default());
        cam.set_pose(Vec3::new(0.0, 0.0, 50.0), Vec3::ZERO);
        cam
    }

    fn system() -> OverlayLabelSystem {
        let mut labels = OverlayLabelSystem::new();
        labels.add(EntityId(1), "Sun", [1.0, 1.0, 0.0], 0.6);
        labels.add(EntityId(2), "Earth", [0.25, 0.41, 0.88], 0.6);
        labels
    }

    fn anchors(id: EntityId) -> Option<LabelAnchor> {
        match id.0 {
            1 => Some(LabelAnchor { position: Vec3::ZERO, bounding_size: 10.0 }),
            2 => Some(LabelAnchor { position: Vec3::new(10.0, 0.0, 0.0), bounding_size: 2.0 }),
            _ => None,
        }
    }

    #[test]
    fn labels_sit_above_their_body() {
        let cam = camera();
        let mut labels = system();
        labels.update(&cam, anchors);
        assert_eq!(labels.instances().len(), 2);
        let sun = labels.instances()[0];
        let center = cam.project(Vec3::ZERO).unwrap();
        assert!((sun.x - center.x).abs() < 1e-3);
        // Pixel y grows downward.
        assert!(sun.y < center.y);
        assert_eq!(sun.opacity, LABEL_OPACITY);
        assert_eq!(sun.scale, 1.0);
    }

    #[test]
    fn hidden_bodies_have_no_label() {
        let cam = camera();
        let mut labels = system();
        labels.update(&cam, |id| if id == EntityId(2) { None } else { anchors(id) });
        assert_eq!(labels.instances().len(), 1);
        assert_eq!(labels.instances()[0].entity, 1.0);
    }

    #[test]
    fn labels_behind_the_camera_are_dropped() {
        let cam = camera();
        let mut labels = system();
        labels.update(&cam, |id| {
            anchors(id).map(|mut a| {
                a.position.z = 100.0;
                a
            })
        });
        assert!(labels.instances().is_empty());
    }

    #[test]
    fn highlight_enlarges_one_label() {
        let cam = camera();
        let mut labels = system();
        assert!(labels.set_highlight(Some(EntityId(2))));
        assert!(!labels.set_highlight(Some(EntityId(2))));
        // Unknown entities clear the highlight.
        assert!(labels.set_highlight(Some(EntityId(99))));
        assert_eq!(labels.highlighted(), None);
        labels.set_highlight(Some(EntityId(2)));
        labels.update(&cam, anchors);
        let earth = labels.instances()[1];
        assert_eq!(earth.opacity, HIGHLIGHT_OPACITY);
        assert_eq!(earth.scale, HIGHLIGHT_SCALE);
        assert_eq!(labels.instances()[0].opacity, LABEL_OPACITY);
    }

    #[test]
    fn disabled_system_emits_nothing() {
        let cam = camera();
        let mut labels = system();
        labels.set_enabled(false);
        labels.update(&cam, anchors);
        assert!(labels.instances().is_empty());
    }

    #[test]
    fn label_hit_test() {
        let cam = camera();
        let mut labels = system();
        labels.update(&cam, anchors);
        let earth = labels.instances()[1];
        assert_eq!(labels.label_at(earth.x + 1.0, earth.y), Some(EntityId(2)));
        assert_eq!(labels.label_at(earth.x, earth.y + 100.0), None);
        assert_eq!(labels.text(EntityId(2)), Some("Earth"));
    }
}
