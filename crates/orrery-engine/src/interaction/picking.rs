//! Pointer picking: cast a ray into the node arena, sort hits nearest first
//! and walk each hit up its parent chain to the first identity tag.

use glam::{Mat4, Vec3};

use crate::api::types::EntityId;
use crate::core::arena::{HitShape, MeshSource, NodeArena, NodeHandle};
use crate::renderer::camera::OrbitCamera;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length.
    pub direction: Vec3,
}

impl Ray {
    /// A zero direction falls back to looking down -z.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction: direction.try_normalize().unwrap_or(Vec3::NEG_Z) }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Nearest non-negative hit distance against a sphere.
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let b = oc.dot(self.direction);
        let c = oc.length_squared() - radius * radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }
        let root = disc.sqrt();
        let near = -b - root;
        if near >= 0.0 {
            return Some(near);
        }
        let far = -b + root;
        (far >= 0.0).then_some(far)
    }

    /// Hit distance against a flat ring with the given plane normal.
    pub fn intersect_annulus(&self, center: Vec3, normal: Vec3, inner: f32, outer: f32) -> Option<f32> {
        let denom = normal.dot(self.direction);
        if denom.abs() < 1e-6 {
            return None;
        }
        let t = (center - self.origin).dot(normal) / denom;
        if t < 0.0 {
            return None;
        }
        let r = (self.at(t) - center).length();
        (r >= inner && r <= outer).then_some(t)
    }
}

/// One ray intersection, before tag resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub node: NodeHandle,
    pub distance: f32,
}

/// Largest axis scale of a world matrix, used to scale hit radii.
fn max_scale(m: &Mat4) -> f32 {
    let (scale, _, _) = m.to_scale_rotation_translation();
    scale.abs().max_element()
}

fn intersect(ray: &Ray, shape: &HitShape, world: &Mat4) -> Option<f32> {
    let center = world.transform_point3(Vec3::ZERO);
    match shape {
        HitShape::None => None,
        HitShape::Sphere { radius } => ray.intersect_sphere(center, radius * max_scale(world)),
        HitShape::Annulus { inner, outer } => {
            let s = max_scale(world);
            let normal = world.transform_vector3(Vec3::Y).try_normalize()?;
            ray.intersect_annulus(center, normal, inner * s, outer * s)
        }
        HitShape::Cloud { radius, points } => {
            let r = radius * max_scale(world);
            points
                .iter()
                .filter_map(|p| ray.intersect_sphere(world.transform_point3(*p), r))
                .min_by(|a, b| a.total_cmp(b))
        }
    }
}

/// Stateless apart from a reusable hit buffer.
#[derive(Debug, Default)]
pub struct PickingService {
    hits: Vec<PickHit>,
}

impl PickingService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every drawable, visible node under `root` that the ray crosses,
    /// nearest first.
    pub fn cast(&mut self, ray: &Ray, nodes: &NodeArena, root: NodeHandle) -> &[PickHit] {
        self.hits.clear();
        for (handle, node) in nodes.iter() {
            if node.mesh == MeshSource::None || node.shape == HitShape::None {
                continue;
            }
            if !nodes.descends_from(handle, root) || !nodes.is_visible(handle) {
                continue;
            }
            let world = nodes.world_transform(handle);
            if let Some(distance) = intersect(ray, &node.shape, &world) {
                self.hits.push(PickHit { node: handle, distance });
            }
        }
        self.hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        &self.hits
    }

    /// First hit, nearest first, whose nearest tagged ancestor is pickable.
    /// Decorative and untagged hits are skipped, never returned.
    pub fn pick_ray(&mut self, ray: &Ray, nodes: &NodeArena, root: NodeHandle) -> Option<EntityId> {
        self.cast(ray, nodes, root)
            .iter()
            .find_map(|hit| nodes.nearest_tag(hit.node).filter(|tag| tag.pickable).map(|tag| tag.entity))
    }

    /// Pick through a pixel coordinate of the camera's viewport.
    pub fn pick(
        &mut self,
        x: f32,
        y: f32,
        camera: &OrbitCamera,
        nodes: &NodeArena,
        root: NodeHandle,
    ) -> Option<EntityId> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let ray = camera.ray_through(x, y);
        self.pick_ray(&ray, nodes, root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::arena::{LocalTransform, Node, NodeTag};

    fn ray_down_z() -> Ray {
        Ray::new(Vec3::new(0.0, 0.0, 50.0), Vec3::NEG_Z)
    }

    fn at(translation: Vec3) -> LocalTransform {
        LocalTransform { translation, ..Default::default() }
    }

    fn sphere(radius: f32) -> HitShape {
        HitShape::Sphere { radius }
    }

    #[test]
    fn sphere_hit_distances() {
        let ray = ray_down_z();
        assert_eq!(ray.intersect_sphere(Vec3::ZERO, 1.0), Some(49.0));
        assert_eq!(ray.intersect_sphere(Vec3::new(5.0, 0.0, 0.0), 1.0), None);
        // Origin inside: far side.
        let inside = Ray::new(Vec3::ZERO, Vec3::X);
        assert_eq!(inside.intersect_sphere(Vec3::ZERO, 2.0), Some(2.0));
        // Behind the origin.
        assert_eq!(ray.intersect_sphere(Vec3::new(0.0, 0.0, 100.0), 1.0), None);
    }

    #[test]
    fn annulus_hits_only_between_radii() {
        let ray = Ray::new(Vec3::new(1.5, 10.0, 0.0), Vec3::NEG_Y);
        assert_eq!(ray.intersect_annulus(Vec3::ZERO, Vec3::Y, 1.2, 2.0), Some(10.0));
        let through_hole = Ray::new(Vec3::new(0.5, 10.0, 0.0), Vec3::NEG_Y);
        assert_eq!(through_hole.intersect_annulus(Vec3::ZERO, Vec3::Y, 1.2, 2.0), None);
        let edge_on = Ray::new(Vec3::new(-10.0, 0.0, 0.0), Vec3::X);
        assert_eq!(edge_on.intersect_annulus(Vec3::ZERO, Vec3::Y, 1.2, 2.0), None);
    }

    #[test]
    fn child_hit_resolves_to_tagged_parent() {
        let mut nodes = NodeArena::new();
        let root = nodes.insert(Node::new());
        let saturn = nodes.insert(
            Node::new()
                .with_parent(root)
                .with_tag(NodeTag::entity(EntityId(6)))
                .with_mesh(MeshSource::Procedural)
                .with_shape(sphere(1.0))
                .with_local(at(Vec3::new(0.0, 0.0, 0.0))),
        );
        nodes.insert(
            Node::new()
                .with_parent(saturn)
                .with_mesh(MeshSource::Procedural)
                .with_shape(HitShape::Annulus { inner: 1.2, outer: 2.0 }),
        );
        let mut picking = PickingService::new();
        // Straight down through the ring, outside the sphere.
        let ray = Ray::new(Vec3::new(1.5, 10.0, 0.0), Vec3::NEG_Y);
        assert_eq!(picking.pick_ray(&ray, &nodes, root), Some(EntityId(6)));
    }

    #[test]
    fn decorative_occluder_never_wins() {
        let mut nodes = NodeArena::new();
        let root = nodes.insert(Node::new());
        let belt = nodes.insert(
            Node::new()
                .with_parent(root)
                .with_tag(NodeTag::decorative(EntityId(100)))
                .with_mesh(MeshSource::Procedural)
                .with_shape(HitShape::Cloud { radius: 2.0, points: vec![Vec3::new(0.0, 0.0, 10.0)] }),
        );
        let mut picking = PickingService::new();
        let ray = ray_down_z();
        // Only the decorative container is in the way: nothing.
        assert_eq!(picking.pick_ray(&ray, &nodes, root), None);
        assert_eq!(picking.cast(&ray, &nodes, root).len(), 1);

        nodes.insert(
            Node::new()
                .with_parent(root)
                .with_tag(NodeTag::entity(EntityId(3)))
                .with_mesh(MeshSource::Procedural)
                .with_shape(sphere(1.0)),
        );
        let hits = picking.cast(&ray, &nodes, root).to_vec();
        assert_eq!(hits[0].node, belt);
        assert_eq!(picking.pick_ray(&ray, &nodes, root), Some(EntityId(3)));
    }

    #[test]
    fn children_of_decorative_containers_are_excluded() {
        let mut nodes = NodeArena::new();
        let root = nodes.insert(Node::new());
        let links = nodes.insert(Node::new().with_parent(root).with_tag(NodeTag::decorative(EntityId(101))));
        nodes.insert(
            Node::new()
                .with_parent(links)
                .with_mesh(MeshSource::Procedural)
                .with_shape(sphere(5.0)),
        );
        let mut picking = PickingService::new();
        assert_eq!(picking.pick_ray(&ray_down_z(), &nodes, root), None);
    }

    #[test]
    fn nearest_tagged_hit_wins() {
        let mut nodes = NodeArena::new();
        let root = nodes.insert(Node::new());
        for (id, z) in [(1, -10.0), (2, 10.0), (3, 0.0)] {
            nodes.insert(
                Node::new()
                    .with_parent(root)
                    .with_tag(NodeTag::entity(EntityId(id)))
                    .with_mesh(MeshSource::Procedural)
                    .with_shape(sphere(1.0))
                    .with_local(at(Vec3::new(0.0, 0.0, z))),
            );
        }
        let mut picking = PickingService::new();
        assert_eq!(picking.pick_ray(&ray_down_z(), &nodes, root), Some(EntityId(2)));
    }

    #[test]
    fn meshless_hidden_and_untagged_nodes_are_skipped() {
        let mut nodes = NodeArena::new();
        let root = nodes.insert(Node::new());
        // Missing asset: no mesh.
        nodes.insert(
            Node::new()
                .with_parent(root)
                .with_tag(NodeTag::entity(EntityId(1)))
                .with_shape(sphere(1.0))
                .with_local(at(Vec3::new(0.0, 0.0, 20.0))),
        );
        // Hidden.
        let mut hidden = Node::new()
            .with_parent(root)
            .with_tag(NodeTag::entity(EntityId(2)))
            .with_mesh(MeshSource::Procedural)
            .with_shape(sphere(1.0))
            .with_local(at(Vec3::new(0.0, 0.0, 10.0)));
        hidden.visible = false;
        nodes.insert(hidden);
        // Untagged (comet).
        nodes.insert(
            Node::new()
                .with_parent(root)
                .with_mesh(MeshSource::Procedural)
                .with_shape(sphere(1.0))
                .with_local(at(Vec3::new(0.0, 0.0, 5.0))),
        );
        let mut picking = PickingService::new();
        assert_eq!(picking.pick_ray(&ray_down_z(), &nodes, root), None);
    }

    #[test]
    fn scaled_nodes_scale_their_shape() {
        let mut nodes = NodeArena::new();
        let root = nodes.insert(Node::new());
        nodes.insert(
            Node::new()
                .with_parent(root)
                .with_tag(NodeTag::entity(EntityId(9)))
                .with_mesh(MeshSource::Procedural)
                .with_shape(sphere(1.0))
                .with_local(LocalTransform {
                    translation: Vec3::new(3.0, 0.0, 0.0),
                    scale: Vec3::splat(5.0),
                    ..Default::default()
                }),
        );
        let mut picking = PickingService::new();
        assert_eq!(picking.pick_ray(&ray_down_z(), &nodes, root), Some(EntityId(9)));
    }

    #[test]
    fn pick_through_camera_center() {
        let mut nodes = NodeArena::new();
        let root = nodes.insert(Node::new());
        nodes.insert(
            Node::new()
                .with_parent(root)
                .with_tag(NodeTag::entity(EntityId(4)))
                .with_mesh(MeshSource::Procedural)
                .with_shape(sphere(1.0)),
        );
        let camera = OrbitCamera::new(&crate::api::config::CameraConfig::default());
        let vp = camera.viewport();
        let mut picking = PickingService::new();
        let hit = picking.pick(vp.width as f32 / 2.0, vp.height as f32 / 2.0, &camera, &nodes, root);
        assert_eq!(hit, Some(EntityId(4)));
        assert_eq!(picking.pick(0.0, 0.0, &camera, &nodes, root), None);
        assert_eq!(picking.pick(f32::NAN, 0.0, &camera, &nodes, root), None);
    }
}
