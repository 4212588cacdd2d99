//! The scene graph: owns every body, system and node, and runs them in a
//! fixed order each tick.
//!
//! Tick order: settings snapshot, kinematics (parents before satellites),
//! procedural systems, node sync, focus. Render order: pending GPU releases,
//! draw-list build, label projection, compositor.

use std::f64::consts::TAU;

use glam::{Mat4, Quat, Vec2, Vec3};

use crate::api::config::SceneConfig;
use crate::api::error::SceneError;
use crate::api::types::{EntityId, SceneEvent};
use crate::assets::manifest::{AssetHandle, AssetHandles};
use crate::input::queue::{InputEvent, KEY_ESCAPE};
use crate::interaction::focus::{FocusController, FocusEvent, FocusPhase, FocusTarget, FocusTargets};
use crate::interaction::picking::PickingService;
use crate::orbit::body::BodyController;
use crate::orbit::catalog::{self, BodyDef, Phase, CLOUD_SHELL, CLOUD_SPIN_FACTOR, COMET, COMET_COLOR, SUN};
use crate::orbit::path::{OrbitPathRenderer, PathStyle};
use crate::orbit::star::Star;
use crate::renderer::camera::{OrbitCamera, Viewport};
use crate::renderer::compositor::LayerCompositor;
use crate::renderer::instance::{DrawInstance, DrawKind, DrawList};
use crate::renderer::layer::LayerMask;
use crate::renderer::traits::{FrameData, RenderBackend, ResourceHandle};
use crate::systems::belt::{DebrisBelt, ROCK_MAX_SIZE};
use crate::systems::comet::CometTail;
use crate::systems::flares::SunFlares;
use crate::systems::labels::{LabelAnchor, OverlayLabelSystem, DEFAULT_ANCHOR_FACTOR};
use crate::systems::links::LinkNetwork;
use crate::systems::rng::Rng;

use super::arena::{HitShape, LocalTransform, MeshSource, Node, NodeArena, NodeHandle, NodeTag};
use super::scale::{DecorLayer, ScaleSnapshot, SettingsSurface, Visibility};
use super::time::TICK_SECONDS;

/// The star is always entity 1; orbiting bodies follow in declaration order.
pub const SUN_ID: EntityId = EntityId(1);

/// Pixels of pointer travel before a press becomes a drag instead of a click.
const DRAG_THRESHOLD: f32 = 5.0;
const ORBIT_RADIANS_PER_PIXEL: f32 = 0.005;
const ZOOM_STEP: f32 = 1.1;
const WHITE: [f32; 4] = [1.0; 4];
const HALO_COLOR: [f32; 4] = [1.0, 0.8, 0.4, 1.0];

/// Node handles that exist once the scene has been built.
#[derive(Debug, Clone, Copy)]
struct Layout {
    root: NodeHandle,
    star: NodeHandle,
    halo: NodeHandle,
    belt: NodeHandle,
    links: NodeHandle,
}

/// Scene-side half of a body; parallel to `SceneGraph::bodies`.
#[derive(Debug, Clone)]
struct BodyParts {
    node: NodeHandle,
    ring: Option<NodeHandle>,
    clouds: Option<NodeHandle>,
    tagged: bool,
    kind: DrawKind,
    color: [f32; 4],
    emissive: f32,
}

struct Comet {
    index: usize,
    tail: CometTail,
}

#[derive(Debug, Default, Clone, Copy)]
struct PointerState {
    dragging: bool,
    drag_moved: bool,
    drag_start: Vec2,
    last: Vec2,
}

pub struct SceneGraph {
    config: SceneConfig,
    settings: SettingsSurface,
    snapshot: ScaleSnapshot,
    /// Visibility as of the last tick; render reads this, never the live surface.
    visibility: Visibility,
    applied_revision: u64,

    nodes: NodeArena,
    layout: Option<Layout>,

    star: Star,
    flares: SunFlares,
    bodies: Vec<BodyController>,
    parts: Vec<BodyParts>,
    paths: OrbitPathRenderer,
    belt: DebrisBelt,
    links: LinkNetwork,
    comet: Option<Comet>,

    camera: OrbitCamera,
    compositor: LayerCompositor,
    labels: OverlayLabelSystem,
    picking: PickingService,
    focus: FocusController,
    pointer: PointerState,

    draw: DrawList,
    events: Vec<SceneEvent>,
    pending_release: Vec<ResourceHandle>,
    next_entity: u32,
    elapsed_ticks: f64,
}

impl SceneGraph {
    /// An empty scene. Nothing is drawn or simulated until `initialize`.
    pub fn new(config: SceneConfig) -> Self {
        let settings = SettingsSurface::from_config(&config);
        let snapshot = settings.snapshot();
        let camera = OrbitCamera::new(&config.camera);
        let mut rng = Rng::new(config.seed);
        Self {
            applied_revision: settings.revision(),
            nodes: NodeArena::new(),
            layout: None,
            star: Star::new(SUN_ID, SUN.name, SUN.mean_radius, SUN.rotation_speed),
            flares: SunFlares::new(rng.fork(3)),
            bodies: Vec::new(),
            parts: Vec::new(),
            paths: OrbitPathRenderer::new(PathStyle::default(), snapshot.orbit_scale),
            belt: DebrisBelt::generate(0, snapshot.orbit_scale, &mut rng),
            links: LinkNetwork::new(&config.links, rng.fork(2)),
            comet: None,
            compositor: LayerCompositor::new(camera.viewport(), settings.bloom()),
            camera,
            labels: OverlayLabelSystem::new(),
            picking: PickingService::new(),
            focus: FocusController::new(&config.focus),
            pointer: PointerState::default(),
            draw: DrawList::new(),
            events: Vec::new(),
            pending_release: Vec::new(),
            next_entity: SUN_ID.0 + 1,
            elapsed_ticks: 0.0,
            snapshot,
            visibility: settings.visibility().clone(),
            settings,
            config,
        }
    }

    /// Build the star, every catalog body and the decorative systems.
    ///
    /// Element validation runs before anything is torn down, so a failure
    /// leaves the previous scene intact. Missing assets are not errors: the
    /// body is built without a mesh and keeps orbiting.
    pub fn initialize(&mut self, assets: &AssetHandles) -> Result<NodeHandle, SceneError> {
        let mut rng = Rng::new(self.config.seed);
        let defs = catalog::bodies(self.config.comet.enabled);
        let mut planned = Vec::with_capacity(defs.len());
        for (i, def) in defs.iter().enumerate() {
            let parent = catalog::resolve_parent(&defs[..i], def)?;
            let phase = match def.phase {
                Phase::Fixed(p) => p,
                Phase::Random => rng.range_f64(0.0, TAU),
            };
            planned.push((*def, parent, def.elements(phase)?));
        }

        self.teardown();
        let snapshot = self.snapshot;
        let root = self.nodes.insert(Node::new());

        self.star = Star::new(SUN_ID, SUN.name, SUN.mean_radius, SUN.rotation_speed);
        let star = self.nodes.insert(
            Node::new()
                .with_parent(root)
                .with_tag(NodeTag::entity(SUN_ID))
                .with_layers(LayerMask::EMISSIVE)
                .with_mesh(mesh_or_warn(assets.body(SUN.key), SUN.key))
                .with_shape(HitShape::Sphere { radius: 1.0 }),
        );
        let halo = self.nodes.insert(
            Node::new()
                .with_parent(star)
                .with_layers(LayerMask::BLOOM)
                .with_mesh(mesh_or_warn(assets.sprite("sun_halo"), "sun_halo"))
                .with_local(LocalTransform { scale: Vec3::splat(2.0 * SUN.halo_factor), ..Default::default() }),
        );
        self.labels.add(SUN_ID, SUN.name, catalog::rgb(SUN.label_color), SUN.label_factor);

        for (def, parent, elements) in planned {
            let id = self.next_entity();
            let mut body = BodyController::new(id, def.name, elements)
                .with_frame(def.frame)
                .with_axial_tilt(def.axial_tilt)
                .with_extent(def.extent());
            if let Some(p) = parent {
                body = body.with_parent(p);
            }
            let parent_world = parent.map(|p| self.bodies[p].world_position());
            body.set_orbit_scale(snapshot.orbit_scale, parent_world);

            if let Some(color) = def.path_rgb() {
                self.paths.add(id, color, elements);
                let factor = def.label_factor.unwrap_or(DEFAULT_ANCHOR_FACTOR);
                self.labels.add(id, def.name, color, factor);
            }
            let parts = self.build_body_nodes(root, id, &def, assets);
            if def.key == COMET.key {
                self.comet = Some(Comet {
                    index: self.bodies.len(),
                    tail: CometTail::new(self.config.comet.tail_particles, rng.fork(4)),
                });
            }
            self.bodies.push(body);
            self.parts.push(parts);
        }

        self.belt = DebrisBelt::generate(self.config.belt.count, snapshot.orbit_scale, &mut rng.fork(1));
        let belt_id = self.next_entity();
        let belt = self.nodes.insert(
            Node::new()
                .with_parent(root)
                .with_tag(NodeTag::decorative(belt_id))
                .with_mesh(MeshSource::Procedural)
                .with_shape(HitShape::Cloud { radius: ROCK_MAX_SIZE, points: self.belt.positions().to_vec() }),
        );

        self.links = LinkNetwork::new(&self.config.links, rng.fork(2));
        let links_id = self.next_entity();
        let links = self
            .nodes
            .insert(Node::new().with_parent(root).with_tag(NodeTag::decorative(links_id)));
        self.flares = SunFlares::new(rng.fork(3));

        self.layout = Some(Layout { root, star, halo, belt, links });
        self.sync_settings(true);
        self.sync_nodes();
        log::info!(
            "scene initialized: {} bodies, {} belt rocks, {} nodes",
            self.bodies.len() + 1,
            self.belt.len(),
            self.nodes.len()
        );
        Ok(root)
    }

    fn next_entity(&mut self) -> EntityId {
        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        id
    }

    fn build_body_nodes(&mut self, root: NodeHandle, id: EntityId, def: &BodyDef, assets: &AssetHandles) -> BodyParts {
        let is_comet = def.key == COMET.key;
        // The nucleus is generated, never loaded.
        let mesh = if is_comet { MeshSource::Procedural } else { mesh_or_warn(assets.body(def.key), def.key) };
        let layers = if is_comet { LayerMask::EMISSIVE } else { LayerMask::ENTIRE };
        let mut node = Node::new()
            .with_parent(root)
            .with_layers(layers)
            .with_mesh(mesh)
            .with_shape(HitShape::Sphere { radius: 1.0 });
        if def.tagged {
            node = node.with_tag(NodeTag::entity(id));
        }
        let node = self.nodes.insert(node);

        let ring = def.ring.map(|ring| {
            let key = format!("{}_ring", def.key);
            self.nodes.insert(
                Node::new()
                    .with_parent(node)
                    .with_mesh(mesh_or_warn(assets.body(&key), &key))
                    .with_shape(HitShape::Annulus { inner: ring.inner, outer: ring.outer })
                    .with_local(LocalTransform { rotation: Quat::from_rotation_x(ring.tilt_x), ..Default::default() }),
            )
        });
        let clouds = def.clouds.then(|| {
            let key = format!("{}_clouds", def.key);
            self.nodes.insert(
                Node::new()
                    .with_parent(node)
                    .with_mesh(mesh_or_warn(assets.body(&key), &key))
                    .with_local(LocalTransform { scale: Vec3::splat(CLOUD_SHELL), ..Default::default() }),
            )
        });

        BodyParts {
            node,
            ring,
            clouds,
            tagged: def.tagged,
            kind: if is_comet { DrawKind::Point } else { DrawKind::Mesh },
            color: if is_comet { COMET_COLOR } else { WHITE },
            emissive: if is_comet { 1.0 } else { 0.0 },
        }
    }

    /// Remove everything built by `initialize`. Link resources are queued
    /// for release on the next render.
    fn teardown(&mut self) {
        if let Some(event) = self.focus.cancel(&mut self.camera) {
            self.events.push(scene_event(event));
        }
        self.links.clear(&mut self.nodes, &mut self.pending_release);
        self.nodes.clear();
        self.layout = None;
        self.bodies.clear();
        self.parts.clear();
        self.comet = None;
        self.labels = OverlayLabelSystem::new();
        self.paths.clear();
        self.next_entity = SUN_ID.0 + 1;
    }

    /// Advance the simulation by `dt` ticks. `dt == 0` only applies pending settings.
    pub fn tick(&mut self, dt: f32) {
        if !dt.is_finite() || dt < 0.0 {
            log::warn!("ignoring tick with dt {}", dt);
            return;
        }
        let Some(layout) = self.layout else {
            return;
        };
        self.sync_settings(false);
        let snapshot = self.snapshot;
        let dt_ticks = dt as f64;

        for i in 0..self.bodies.len() {
            let parent_world = self.bodies[i].parent().map(|p| self.bodies[p].world_position());
            self.bodies[i].advance(dt_ticks, &snapshot, parent_world);
        }
        self.star.advance(dt_ticks);

        let seconds = dt * TICK_SECONDS;
        self.flares.advance(seconds);
        self.belt.advance(dt_ticks, &snapshot);
        let spawn = self.visibility.layer(DecorLayer::Links);
        self.links.advance(seconds, spawn, &mut self.nodes, layout.links, &mut self.pending_release);
        if let Some(comet) = &mut self.comet {
            comet.tail.advance(dt);
        }
        self.sync_nodes();

        let targets = TargetView {
            star: &self.star,
            bodies: &self.bodies,
            parts: &self.parts,
            body_size_scale: snapshot.body_size_scale,
        };
        if let Some(event) = self.focus.tick(dt, &targets, &mut self.camera) {
            self.events.push(scene_event(event));
        }
        self.elapsed_ticks += dt_ticks;
    }

    /// Apply whatever changed on the settings surface since the last tick.
    fn sync_settings(&mut self, force: bool) {
        let revision = self.settings.revision();
        if !force && revision == self.applied_revision {
            return;
        }
        self.applied_revision = revision;

        let snapshot = self.settings.snapshot();
        if snapshot.orbit_scale != self.snapshot.orbit_scale {
            log::info!("orbit scale {} -> {}", self.snapshot.orbit_scale, snapshot.orbit_scale);
            for i in 0..self.bodies.len() {
                let parent_world = self.bodies[i].parent().map(|p| self.bodies[p].world_position());
                self.bodies[i].set_orbit_scale(snapshot.orbit_scale, parent_world);
            }
            self.belt.rescale(snapshot.orbit_scale);
        }
        self.paths.sync(&snapshot);
        self.snapshot = snapshot;

        if let Some(speed) = self.settings.rotation_speed(SUN_ID) {
            self.star.set_rotation_speed(speed);
        }
        for body in &mut self.bodies {
            if let Some(speed) = self.settings.rotation_speed(body.id()) {
                body.set_rotation_speed(speed);
            }
        }
        self.compositor.set_bloom(self.settings.bloom());

        self.visibility = self.settings.visibility().clone();
        let visibility = &self.visibility;
        self.labels.set_enabled(visibility.layer(DecorLayer::Labels));
        let Some(layout) = self.layout else {
            return;
        };
        set_visible(&mut self.nodes, layout.star, visibility.body(SUN_ID));
        set_visible(&mut self.nodes, layout.belt, visibility.layer(DecorLayer::Belt));
        set_visible(&mut self.nodes, layout.links, visibility.layer(DecorLayer::Links));
        for (i, (body, parts)) in self.bodies.iter().zip(&self.parts).enumerate() {
            let mut visible = visibility.body(body.id());
            if self.comet.as_ref().is_some_and(|c| c.index == i) {
                visible &= visibility.layer(DecorLayer::Comet);
            }
            set_visible(&mut self.nodes, parts.node, visible);
        }
    }

    /// Copy kinematic state into node transforms for picking and drawing.
    fn sync_nodes(&mut self) {
        let Some(layout) = self.layout else {
            return;
        };
        let bss = self.snapshot.body_size_scale;
        if let Some(node) = self.nodes.get_mut(layout.star) {
            node.local.rotation = self.star.rotation();
            node.local.scale = Vec3::splat(self.star.rendered_radius(bss));
        }
        for (body, parts) in self.bodies.iter().zip(&self.parts) {
            if let Some(node) = self.nodes.get_mut(parts.node) {
                node.local.translation = body.position();
                node.local.rotation = body.rotation();
                node.local.scale = Vec3::splat(body.rendered_radius(bss));
            }
            if let Some(node) = parts.clouds.and_then(|c| self.nodes.get_mut(c)) {
                let extra = body.state().rotation_angle * (CLOUD_SPIN_FACTOR - 1.0);
                node.local.rotation = Quat::from_rotation_y(extra as f32);
            }
        }
        if let Some(node) = self.nodes.get_mut(layout.belt) {
            node.shape.set_cloud_points(self.belt.positions().iter().copied());
        }
    }

    /// Draw the current state through `backend`.
    pub fn render<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) {
        for handle in self.pending_release.drain(..) {
            if let Err(err) = backend.release(handle) {
                log::warn!("failed to release {:?}: {}", handle, err);
            }
        }

        self.build_draw_list();
        let bss = self.snapshot.body_size_scale;
        let visibility = &self.visibility;
        let (star, bodies) = (&self.star, &self.bodies);
        self.labels.update(&self.camera, |entity| label_anchor(entity, star, bodies, visibility, bss));

        let frame = FrameData {
            camera: self.camera.uniform(self.star.surface_time()),
            vertices: self.draw.vertices(),
            ribbons: self.paths.ribbons(),
        };
        self.compositor.render(backend, &frame, &self.draw, self.labels.instances());
    }

    fn build_draw_list(&mut self) {
        self.draw.clear();
        let Some(layout) = self.layout else {
            return;
        };
        let draw = &mut self.draw;
        let nodes = &self.nodes;
        let visibility = &self.visibility;

        push_node(draw, nodes, layout.star, DrawKind::Mesh, WHITE, 1.0);
        push_node(draw, nodes, layout.halo, DrawKind::Sprite, HALO_COLOR, 1.0);
        if visibility.layer(DecorLayer::Flares) && nodes.is_visible(layout.star) {
            self.flares.emit(draw, Mat4::from_quat(self.star.rotation()));
        }

        for parts in &self.parts {
            push_node(draw, nodes, parts.node, parts.kind, parts.color, parts.emissive);
            if let Some(ring) = parts.ring {
                push_node(draw, nodes, ring, DrawKind::Mesh, WHITE, 0.0);
            }
            if let Some(clouds) = parts.clouds {
                push_node(draw, nodes, clouds, DrawKind::Mesh, WHITE, 0.0);
            }
        }

        let camera_distance = self.camera.position().length();
        self.paths.emit(draw, camera_distance, |id| visibility.path(id));

        if nodes.is_visible(layout.belt) {
            self.belt.emit(draw);
        }
        if nodes.is_visible(layout.links) {
            self.links.emit(draw);
        }
        if let Some(comet) = &self.comet {
            let nucleus = &self.parts[comet.index];
            if nodes.is_visible(nucleus.node) {
                comet.tail.emit(draw, self.bodies[comet.index].position(), Vec3::ZERO);
            }
        }
    }

    /// Clamped to at least 1x1.
    pub fn on_resize(&mut self, width: u32, height: u32) {
        let viewport = Viewport::new(width, height);
        log::debug!("resize to {}x{}", viewport.width, viewport.height);
        self.camera.set_viewport(viewport);
        self.compositor.resize(viewport);
    }

    /// Entity under a pixel. Decorative geometry never answers, even when it
    /// is in front.
    pub fn pick(&mut self, x: f32, y: f32) -> Option<EntityId> {
        let layout = self.layout?;
        self.picking.pick(x, y, &self.camera, &self.nodes, layout.root)
    }

    /// Start a focus transition. Returns false when the request was ignored.
    pub fn request_focus(&mut self, entity: EntityId) -> bool {
        let targets = TargetView {
            star: &self.star,
            bodies: &self.bodies,
            parts: &self.parts,
            body_size_scale: self.snapshot.body_size_scale,
        };
        match self.focus.request(entity, &targets, &mut self.camera) {
            Some(event) => {
                self.events.push(scene_event(event));
                true
            }
            None => false,
        }
    }

    pub fn cancel_focus(&mut self) {
        if let Some(event) = self.focus.cancel(&mut self.camera) {
            self.events.push(scene_event(event));
        }
    }

    /// Feed a batch of host input through the scene.
    pub fn apply_input(&mut self, events: impl IntoIterator<Item = InputEvent>) {
        for event in events {
            match event {
                InputEvent::PointerDown { x, y } => {
                    let at = Vec2::new(x, y);
                    self.pointer = PointerState { dragging: true, drag_moved: false, drag_start: at, last: at };
                }
                InputEvent::PointerMove { x, y } => self.pointer_move(Vec2::new(x, y)),
                InputEvent::PointerUp { x, y } => {
                    if self.pointer.dragging && !self.pointer.drag_moved {
                        self.click(x, y);
                    }
                    self.pointer.dragging = false;
                    self.pointer.drag_moved = false;
                }
                InputEvent::Wheel { delta } => {
                    if delta != 0.0 && delta.is_finite() && !self.camera_locked_out() {
                        self.camera.zoom(if delta > 0.0 { ZOOM_STEP } else { 1.0 / ZOOM_STEP });
                    }
                }
                InputEvent::KeyDown { key_code } => {
                    if key_code == KEY_ESCAPE {
                        self.cancel_focus();
                    }
                }
                InputEvent::Resize { width, height } => self.on_resize(width, height),
                InputEvent::Setting(write) => self.settings.apply(write),
            }
        }
    }

    /// The camera belongs to the focus controller while it is moving.
    fn camera_locked_out(&self) -> bool {
        self.focus.phase() == FocusPhase::Transitioning
    }

    fn pointer_move(&mut self, at: Vec2) {
        if !self.pointer.dragging {
            let hovered = self.labels.label_at(at.x, at.y).or_else(|| self.pick(at.x, at.y));
            if self.labels.set_highlight(hovered) {
                self.events.push(SceneEvent::highlight(self.labels.highlighted()));
            }
            return;
        }
        if !self.pointer.drag_moved && at.distance(self.pointer.drag_start) > DRAG_THRESHOLD {
            self.pointer.drag_moved = true;
        }
        if self.pointer.drag_moved && !self.camera_locked_out() {
            let delta = at - self.pointer.last;
            self.camera
                .orbit(-delta.x * ORBIT_RADIANS_PER_PIXEL, delta.y * ORBIT_RADIANS_PER_PIXEL);
        }
        self.pointer.last = at;
    }

    fn click(&mut self, x: f32, y: f32) {
        let Some(entity) = self.labels.label_at(x, y).or_else(|| self.pick(x, y)) else {
            return;
        };
        self.request_focus(entity);
    }

    pub fn settings(&self) -> &SettingsSurface {
        &self.settings
    }

    /// Writes land on the next tick.
    pub fn settings_mut(&mut self) -> &mut SettingsSurface {
        &mut self.settings
    }

    pub fn snapshot(&self) -> ScaleSnapshot {
        self.snapshot
    }

    /// Drain events produced since the last call.
    pub fn take_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_initialized(&self) -> bool {
        self.layout.is_some()
    }

    pub fn root(&self) -> Option<NodeHandle> {
        self.layout.map(|l| l.root)
    }

    pub fn nodes(&self) -> &NodeArena {
        &self.nodes
    }

    pub fn star(&self) -> &Star {
        &self.star
    }

    pub fn bodies(&self) -> &[BodyController] {
        &self.bodies
    }

    pub fn body(&self, entity: EntityId) -> Option<&BodyController> {
        self.bodies.iter().find(|b| b.id() == entity)
    }

    pub fn body_by_name(&self, name: &str) -> Option<&BodyController> {
        self.bodies.iter().find(|b| b.name() == name)
    }

    pub fn paths(&self) -> &OrbitPathRenderer {
        &self.paths
    }

    pub fn belt(&self) -> &DebrisBelt {
        &self.belt
    }

    pub fn links(&self) -> &LinkNetwork {
        &self.links
    }

    pub fn labels(&self) -> &OverlayLabelSystem {
        &self.labels
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }

    pub fn compositor(&self) -> &LayerCompositor {
        &self.compositor
    }

    pub fn focus_phase(&self) -> FocusPhase {
        self.focus.phase()
    }

    pub fn focus_target(&self) -> Option<EntityId> {
        self.focus.target()
    }

    /// Draw list built by the last `render`.
    pub fn draw_list(&self) -> &DrawList {
        &self.draw
    }

    pub fn elapsed_ticks(&self) -> f64 {
        self.elapsed_ticks
    }
}

fn mesh_or_warn(asset: Option<AssetHandle>, key: &str) -> MeshSource {
    match asset {
        Some(handle) => MeshSource::Asset(handle),
        None => {
            log::warn!("asset '{}' is missing; drawing without it", key);
            MeshSource::None
        }
    }
}

fn set_visible(nodes: &mut NodeArena, handle: NodeHandle, visible: bool) {
    if let Some(node) = nodes.get_mut(handle) {
        node.visible = visible;
    }
}

/// Push one instance for a drawable, visible node.
fn push_node(draw: &mut DrawList, nodes: &NodeArena, handle: NodeHandle, kind: DrawKind, color: [f32; 4], emissive: f32) {
    let Some(node) = nodes.get(handle) else {
        return;
    };
    if node.mesh == MeshSource::None || !nodes.is_visible(handle) {
        return;
    }
    let asset = match node.mesh {
        MeshSource::Asset(handle) => Some(handle),
        _ => None,
    };
    let mut instance = DrawInstance::new(nodes.world_transform(handle), kind)
        .with_color(color)
        .with_asset(asset)
        .with_emissive(emissive);
    if let Some(tag) = node.tag {
        instance = instance.with_entity(tag.entity);
    }
    draw.push(node.layers, instance);
}

fn label_anchor(
    entity: EntityId,
    star: &Star,
    bodies: &[BodyController],
    visibility: &Visibility,
    body_size_scale: f32,
) -> Option<LabelAnchor> {
    if !visibility.body(entity) {
        return None;
    }
    if entity == star.id() {
        return Some(LabelAnchor { position: Vec3::ZERO, bounding_size: star.bounding_size(body_size_scale) });
    }
    bodies
        .iter()
        .find(|b| b.id() == entity)
        .map(|b| LabelAnchor { position: b.position(), bounding_size: b.bounding_size(body_size_scale) })
}

fn scene_event(event: FocusEvent) -> SceneEvent {
    match event {
        FocusEvent::Started(entity) => SceneEvent::focus_started(entity),
        FocusEvent::Locked { entity, min_distance, max_distance } => {
            SceneEvent::focus_locked(entity, min_distance, max_distance)
        }
        FocusEvent::Released(entity) => SceneEvent::focus_released(entity),
        FocusEvent::Lost(entity) => SceneEvent::focus_lost(entity),
    }
}

/// Focus lookup over the star and every tagged body.
struct TargetView<'a> {
    star: &'a Star,
    bodies: &'a [BodyController],
    parts: &'a [BodyParts],
    body_size_scale: f32,
}

impl FocusTargets for TargetView<'_> {
    fn locate(&self, entity: EntityId) -> Option<FocusTarget> {
        if entity == self.star.id() {
            return Some(FocusTarget { position: Vec3::ZERO, size: self.star.bounding_size(self.body_size_scale) });
        }
        self.bodies
            .iter()
            .zip(self.parts)
            .find(|(body, parts)| parts.tagged && body.id() == entity)
            .map(|(body, _)| FocusTarget {
                position: body.position(),
                size: body.bounding_size(self.body_size_scale),
            })
    }
}
