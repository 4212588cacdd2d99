//! Node arena: the renderable hierarchy as a flat slot vector plus parent indices.
//!
//! Nodes never hold references to each other. A node names its parent by
//! `NodeHandle`, and identity lives in an explicit `NodeTag` attached at
//! construction. Upward walks (picking) follow the parent index chain.

use glam::{Mat4, Quat, Vec3};

use crate::api::types::EntityId;
use crate::assets::manifest::AssetHandle;
use crate::renderer::layer::LayerMask;

/// Generational index into the arena. Stale handles resolve to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    index: u32,
    generation: u32,
}

impl NodeHandle {
    pub fn index(self) -> u32 {
        self.index
    }
}

/// Identity attached to a node.
///
/// `pickable = false` marks decorative containers (belt, link network):
/// their geometry still intersects rays but never yields a pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeTag {
    pub entity: EntityId,
    pub pickable: bool,
}

impl NodeTag {
    pub fn entity(entity: EntityId) -> Self {
        Self { entity, pickable: true }
    }

    pub fn decorative(entity: EntityId) -> Self {
        Self { entity, pickable: false }
    }
}

/// Where a node's drawable geometry comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshSource {
    /// Nothing to draw (container, or the asset failed to load).
    None,
    /// Host-supplied mesh/texture.
    Asset(AssetHandle),
    /// Generated by the engine (sprites, point clouds).
    Procedural,
}

/// Ray-intersection shape in node-local space.
#[derive(Debug, Clone, PartialEq)]
pub enum HitShape {
    None,
    Sphere { radius: f32 },
    /// Flat ring in the local XZ plane.
    Annulus { inner: f32, outer: f32 },
    /// Many small spheres sharing one radius (belt rocks, link nodes).
    Cloud { radius: f32, points: Vec<Vec3> },
}

impl HitShape {
    /// Replace the points of a cloud shape in place.
    pub fn set_cloud_points(&mut self, src: impl IntoIterator<Item = Vec3>) {
        if let HitShape::Cloud { points, .. } = self {
            points.clear();
            points.extend(src);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self { translation: Vec3::ZERO, rotation: Quat::IDENTITY, scale: Vec3::ONE }
    }
}

impl LocalTransform {
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub parent: Option<NodeHandle>,
    pub tag: Option<NodeTag>,
    pub layers: LayerMask,
    pub local: LocalTransform,
    pub mesh: MeshSource,
    pub shape: HitShape,
    pub visible: bool,
}

impl Node {
    pub fn new() -> Self {
        Self {
            parent: None,
            tag: None,
            layers: LayerMask::ENTIRE,
            local: LocalTransform::default(),
            mesh: MeshSource::None,
            shape: HitShape::None,
            visible: true,
        }
    }

    pub fn with_parent(mut self, parent: NodeHandle) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_tag(mut self, tag: NodeTag) -> Self {
        self.tag = Some(tag);
        self
    }

    pub fn with_layers(mut self, layers: LayerMask) -> Self {
        self.layers = layers;
        self
    }

    pub fn with_mesh(mut self, mesh: MeshSource) -> Self {
        self.mesh = mesh;
        self
    }

    pub fn with_shape(mut self, shape: HitShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_local(mut self, local: LocalTransform) -> Self {
        self.local = local;
        self
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}

struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Slot arena of scene nodes with free-list reuse.
pub struct NodeArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl NodeArena {
    pub fn new() -> Self {
        Self { slots: Vec::with_capacity(64), free: Vec::new(), live: 0 }
    }

    pub fn insert(&mut self, node: Node) -> NodeHandle {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeHandle { index, generation: slot.generation };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot { generation: 0, node: Some(node) });
        NodeHandle { index, generation: 0 }
    }

    /// Remove a node and its whole subtree. Returns the removed node itself.
    pub fn remove(&mut self, handle: NodeHandle) -> Option<Node> {
        self.get(handle)?;
        let children: Vec<NodeHandle> = self
            .iter()
            .filter(|(_, n)| n.parent == Some(handle))
            .map(|(h, _)| h)
            .collect();
        for child in children {
            self.remove(child);
        }
        let slot = &mut self.slots[handle.index as usize];
        let node = slot.node.take();
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.live -= 1;
        node
    }

    pub fn get(&self, handle: NodeHandle) -> Option<&Node> {
        self.slots
            .get(handle.index as usize)
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.node.as_ref())
    }

    pub fn get_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.node.as_mut())
    }

    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.get(handle).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeHandle, &Node)> {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            s.node
                .as_ref()
                .map(|n| (NodeHandle { index: i as u32, generation: s.generation }, n))
        })
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Compose local transforms up the parent chain.
    pub fn world_transform(&self, handle: NodeHandle) -> Mat4 {
        let mut m = Mat4::IDENTITY;
        let mut cursor = Some(handle);
        while let Some(h) = cursor {
            match self.get(h) {
                Some(node) => {
                    m = node.local.matrix() * m;
                    cursor = node.parent;
                }
                None => break,
            }
        }
        m
    }

    /// A node is effectively visible only when it and all its ancestors are.
    pub fn is_visible(&self, handle: NodeHandle) -> bool {
        let mut cursor = Some(handle);
        while let Some(h) = cursor {
            match self.get(h) {
                Some(node) if node.visible => cursor = node.parent,
                _ => return false,
            }
        }
        true
    }

    /// Whether `handle` is `ancestor` or lives somewhere below it.
    pub fn descends_from(&self, handle: NodeHandle, ancestor: NodeHandle) -> bool {
        let mut cursor = Some(handle);
        while let Some(h) = cursor {
            if h == ancestor {
                return true;
            }
            cursor = self.get(h).and_then(|n| n.parent);
        }
        false
    }

    /// Walk from `handle` toward the root and return the first tag found.
    pub fn nearest_tag(&self, handle: NodeHandle) -> Option<NodeTag> {
        let mut cursor = Some(handle);
        while let Some(h) = cursor {
            let node = self.get(h)?;
            if let Some(tag) = node.tag {
                return Some(tag);
            }
            cursor = node.parent;
        }
        None
    }

    /// Remove every node. Slots are kept and their generations bumped, so
    /// handles from before the clear stay stale.
    pub fn clear(&mut self) {
        self.free.clear();
        for (index, slot) in self.slots.iter_mut().enumerate().rev() {
            if slot.node.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            self.free.push(index as u32);
        }
        self.live = 0;
    }
}

impl Default for NodeArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let mut arena = NodeArena::new();
        let h = arena.insert(Node::new().with_tag(NodeTag::entity(EntityId(3))));
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.get(h).and_then(|n| n.tag).map(|t| t.entity), Some(EntityId(3)));
    }

    #[test]
    fn removed_handle_goes_stale_after_reuse() {
        let mut arena = NodeArena::new();
        let a = arena.insert(Node::new());
        arena.remove(a);
        let b = arena.insert(Node::new());
        assert_eq!(a.index(), b.index());
        assert!(arena.get(a).is_none());
        assert!(arena.get(b).is_some());
    }

    #[test]
    fn clear_leaves_old_handles_stale() {
        let mut arena = NodeArena::new();
        let a = arena.insert(Node::new());
        let b = arena.insert(Node::new().with_parent(a));
        arena.clear();
        assert!(arena.is_empty());
        assert!(arena.get(a).is_none() && arena.get(b).is_none());

        let c = arena.insert(Node::new());
        assert_eq!(c.index(), a.index());
        assert_ne!(c, a);
        assert!(arena.get(a).is_none());
        assert!(arena.get(c).is_some());
    }

    #[test]
    fn remove_takes_subtree() {
        let mut arena = NodeArena::new();
        let root = arena.insert(Node::new());
        let parent = arena.insert(Node::new().with_parent(root));
        let child = arena.insert(Node::new().with_parent(parent));
        arena.remove(parent);
        assert!(arena.contains(root));
        assert!(!arena.contains(child));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn nearest_tag_walks_parents() {
        let mut arena = NodeArena::new();
        let root = arena.insert(Node::new());
        let body = arena.insert(Node::new().with_parent(root).with_tag(NodeTag::entity(EntityId(9))));
        let ring = arena.insert(Node::new().with_parent(body));
        assert_eq!(arena.nearest_tag(ring).map(|t| t.entity), Some(EntityId(9)));
        assert_eq!(arena.nearest_tag(root), None);
    }

    #[test]
    fn world_transform_composes_parent_first() {
        let mut arena = NodeArena::new();
        let parent = arena.insert(Node::new().with_local(LocalTransform {
            translation: Vec3::new(10.0, 0.0, 0.0),
            scale: Vec3::splat(2.0),
            ..LocalTransform::default()
        }));
        let child = arena.insert(Node::new().with_parent(parent).with_local(LocalTransform {
            translation: Vec3::new(1.0, 0.0, 0.0),
            ..LocalTransform::default()
        }));
        let p = arena.world_transform(child).transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(12.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn hidden_ancestor_hides_child() {
        let mut arena = NodeArena::new();
        let parent = arena.insert(Node::new());
        let child = arena.insert(Node::new().with_parent(parent));
        assert!(arena.is_visible(child));
        if let Some(n) = arena.get_mut(parent) {
            n.visible = false;
        }
        assert!(!arena.is_visible(child));
    }
}
