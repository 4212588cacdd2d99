//! Decorative link network: short-lived poly-lines that drift far outside the
//! planetary system, fade in, wobble, fade out and hand their GPU resource
//! back to the backend when they expire.

use glam::{Mat4, Quat, Vec3};

use crate::api::config::LinkConfig;
use crate::core::arena::{HitShape, MeshSource, Node, NodeArena, NodeHandle};
use crate::renderer::instance::{DrawInstance, DrawKind, DrawList, StripStyle};
use crate::renderer::layer::LayerMask;
use crate::renderer::traits::ResourceHandle;

use super::rng::Rng;

/// Seconds a link lives.
pub const LINK_LIFETIME: f32 = 10.0;
/// Remaining life at which fade-out begins.
pub const FADE_OUT_START: f32 = 2.0;
pub const NODE_MAX_OPACITY: f32 = 0.8;
pub const LINE_MAX_OPACITY: f32 = 0.6;
pub const LINE_WIDTH_PX: f32 = 3.0;

const POINT_COUNT: (u32, u32) = (4, 7);
const FIELD_HALF_WIDTH: f32 = 2000.0;
const FIELD_HALF_HEIGHT: f32 = 100.0;
const POINT_SPREAD: f32 = 10.0;
const ARC_HEIGHT: f32 = 15.0;
const ARC_JITTER: f32 = 4.0;
const WOBBLE_SPEED: f32 = 0.5;
const WOBBLE_RANGE: f32 = 0.3;
const GLOW_SIZE: f32 = 30.0;
const GLOW_FACTOR: f32 = 0.6;
const NODE_SIZE: f32 = 2.0;
const HIT_RADIUS: f32 = 1.0;

const NODE_FADE_IN: f32 = 0.5;
const LINE_FADE_IN: f32 = 0.4;
const NODE_FADE_OUT: f32 = 0.4;
const LINE_FADE_OUT: f32 = 0.3;

/// One ephemeral link. Owned by `LinkNetwork`; its arena node and resource
/// handle are released together when `remaining_life` runs out.
#[derive(Debug, Clone)]
pub struct LinkEntity {
    node: NodeHandle,
    resource: ResourceHandle,
    anchors: Vec<Vec3>,
    phases: Vec<Vec3>,
    colors: Vec<[f32; 4]>,
    positions: Vec<Vec3>,
    remaining_life: f32,
    node_opacity: f32,
    line_opacity: f32,
    fading_in: bool,
}

impl LinkEntity {
    fn generate(node: NodeHandle, resource: ResourceHandle, rng: &mut Rng) -> Self {
        let count = POINT_COUNT.0 + rng.next_int(POINT_COUNT.1 - POINT_COUNT.0 + 1);
        let center = Vec3::new(
            rng.spread(FIELD_HALF_WIDTH),
            rng.spread(FIELD_HALF_HEIGHT),
            rng.spread(FIELD_HALF_WIDTH),
        );
        let tau = std::f32::consts::TAU;

        let mut anchors = Vec::with_capacity(count as usize);
        let mut phases = Vec::with_capacity(count as usize);
        let mut colors = Vec::with_capacity(count as usize);
        for i in 0..count {
            let t = i as f32 / (count - 1) as f32;
            let arc = (t * std::f32::consts::PI).sin();
            anchors.push(Vec3::new(
                center.x + rng.spread(POINT_SPREAD),
                center.y + arc * ARC_HEIGHT + rng.spread(ARC_JITTER),
                center.z + rng.spread(POINT_SPREAD),
            ));
            phases.push(Vec3::new(rng.range(0.0, tau), rng.range(0.0, tau), rng.range(0.0, tau)));
            colors.push(arc_color(arc));
        }

        Self {
            node,
            resource,
            positions: anchors.clone(),
            anchors,
            phases,
            colors,
            remaining_life: LINK_LIFETIME,
            node_opacity: 0.0,
            line_opacity: 0.0,
            fading_in: true,
        }
    }

    fn advance(&mut self, dt: f32, time: f32) {
        self.remaining_life -= dt;

        if self.fading_in {
            self.node_opacity += dt * NODE_FADE_IN;
            self.line_opacity += dt * LINE_FADE_IN;
            if self.node_opacity >= NODE_MAX_OPACITY {
                self.node_opacity = NODE_MAX_OPACITY;
                self.line_opacity = LINE_MAX_OPACITY;
                self.fading_in = false;
            }
        }
        if self.remaining_life < FADE_OUT_START {
            self.fading_in = false;
            self.node_opacity = (self.node_opacity - dt * NODE_FADE_OUT).max(0.0);
            self.line_opacity = (self.line_opacity - dt * LINE_FADE_OUT).max(0.0);
        }
        self.line_opacity = self.line_opacity.min(LINE_MAX_OPACITY);

        let swing = time * WOBBLE_SPEED;
        for ((pos, anchor), phase) in self.positions.iter_mut().zip(&self.anchors).zip(&self.phases) {
            *pos = *anchor
                + Vec3::new(
                    (phase.x + swing).sin(),
                    (phase.y + swing).sin(),
                    (phase.z + swing).sin(),
                ) * WOBBLE_RANGE;
        }
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_life <= 0.0
    }

    pub fn node(&self) -> NodeHandle {
        self.node
    }

    pub fn resource(&self) -> ResourceHandle {
        self.resource
    }

    pub fn remaining_life(&self) -> f32 {
        self.remaining_life
    }

    pub fn node_opacity(&self) -> f32 {
        self.node_opacity
    }

    pub fn line_opacity(&self) -> f32 {
        self.line_opacity
    }

    pub fn glow_opacity(&self) -> f32 {
        self.node_opacity * GLOW_FACTOR
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }
}

/// Brighter and whiter toward the top of the arc.
fn arc_color(arc: f32) -> [f32; 4] {
    let i = arc.max(0.0).sqrt();
    [0.4 + 0.6 * i, 0.7 + 0.3 * i, 1.0, 1.0]
}

pub struct LinkNetwork {
    links: Vec<LinkEntity>,
    max_links: usize,
    spawn_chance: f32,
    time: f32,
    next_resource: u32,
    rng: Rng,
}

impl LinkNetwork {
    pub fn new(config: &LinkConfig, rng: Rng) -> Self {
        Self {
            links: Vec::with_capacity(config.max_links.min(256)),
            max_links: config.max_links,
            spawn_chance: config.spawn_chance,
            time: 0.0,
            next_resource: 1,
            rng,
        }
    }

    /// Advance every link by `dt` seconds, spawning at most one new link when
    /// `spawn` is set and the network is below capacity. Expired links leave
    /// the arena immediately; their resource handles are appended to `released`.
    pub fn advance(
        &mut self,
        dt: f32,
        spawn: bool,
        nodes: &mut NodeArena,
        container: NodeHandle,
        released: &mut Vec<ResourceHandle>,
    ) {
        self.time += dt;

        if spawn && self.links.len() < self.max_links && self.rng.chance(self.spawn_chance) {
            self.spawn(nodes, container);
        }

        let time = self.time;
        let mut i = 0;
        while i < self.links.len() {
            let link = &mut self.links[i];
            link.advance(dt, time);
            if link.is_expired() {
                let link = self.links.swap_remove(i);
                nodes.remove(link.node);
                released.push(link.resource);
                continue;
            }
            if let Some(node) = nodes.get_mut(link.node) {
                node.shape.set_cloud_points(link.positions.iter().copied());
            }
            i += 1;
        }
    }

    fn spawn(&mut self, nodes: &mut NodeArena, container: NodeHandle) {
        let resource = ResourceHandle(self.next_resource);
        self.next_resource = self.next_resource.wrapping_add(1).max(1);
        let node = nodes.insert(
            Node::new()
                .with_parent(container)
                .with_mesh(MeshSource::Procedural)
                .with_layers(LayerMask::EMISSIVE)
                .with_shape(HitShape::Cloud { radius: HIT_RADIUS, points: Vec::new() }),
        );
        let link = LinkEntity::generate(node, resource, &mut self.rng);
        if let Some(n) = nodes.get_mut(node) {
            n.shape.set_cloud_points(link.positions.iter().copied());
        }
        self.links.push(link);
    }

    /// Drop every link at once (scene teardown).
    pub fn clear(&mut self, nodes: &mut NodeArena, released: &mut Vec<ResourceHandle>) {
        for link in self.links.drain(..) {
            nodes.remove(link.node);
            released.push(link.resource);
        }
    }

    pub fn links(&self) -> &[LinkEntity] {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn emit(&self, draw: &mut DrawList) {
        for link in &self.links {
            let style = StripStyle {
                width: LINE_WIDTH_PX,
                opacity: link.line_opacity,
                screen_space: true,
                closed: false,
                resource: link.resource.0,
            };
            draw.push_strip(
                LayerMask::EMISSIVE,
                link.positions.iter().copied().zip(link.colors.iter().copied()),
                style,
            );

            let glow = link.glow_opacity();
            for (pos, color) in link.positions.iter().zip(&link.colors) {
                let [r, g, b, _] = *color;
                draw.push(
                    LayerMask::BLOOM,
                    DrawInstance::new(billboard(*pos, GLOW_SIZE), DrawKind::Sprite).with_color([r, g, b, glow]),
                );
                draw.push(
                    LayerMask::EMISSIVE,
                    DrawInstance::new(billboard(*pos, NODE_SIZE), DrawKind::Point)
                        .with_color([r, g, b, link.node_opacity]),
                );
            }
        }
    }
}

fn billboard(pos: Vec3, size: f32) -> Mat4 {
    Mat4::from_scale_rotation_translation(Vec3::splat(size), Quat::IDENTITY, pos)
}
