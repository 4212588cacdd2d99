use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::api::types::EntityId;
use crate::assets::manifest::AssetHandle;

use super::layer::LayerMask;

/// What a `DrawInstance` represents to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum DrawKind {
    /// Host-supplied mesh (`asset` names it).
    Mesh = 0,
    /// Camera-facing additive quad (halo, flares, link glows).
    Sprite = 1,
    /// Small instanced rock or particle.
    Point = 2,
}

/// Per-instance record handed to the backend.
/// 24 floats = 96 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct DrawInstance {
    /// Column-major model matrix.
    pub model: [[f32; 4]; 4],
    /// Linear RGBA; alpha is opacity.
    pub color: [f32; 4],
    /// Raw asset handle, 0 when procedural.
    pub asset: u32,
    pub kind: u32,
    /// Entity id for host-side debugging, 0 when untagged.
    pub entity: u32,
    /// Emissive intensity (>1.0 for HDR glow).
    pub emissive: f32,
}

impl DrawInstance {
    pub const FLOATS: usize = 24;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;

    pub fn new(model: Mat4, kind: DrawKind) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color: [1.0; 4],
            asset: 0,
            kind: kind as u32,
            entity: 0,
            emissive: 0.0,
        }
    }

    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }

    pub fn with_asset(mut self, asset: Option<AssetHandle>) -> Self {
        self.asset = asset.map(|a| a.0).unwrap_or(0);
        self
    }

    pub fn with_entity(mut self, entity: EntityId) -> Self {
        self.entity = entity.0;
        self
    }

    pub fn with_emissive(mut self, emissive: f32) -> Self {
        self.emissive = emissive;
        self
    }

    pub fn translation(&self) -> Vec3 {
        Vec3::new(self.model[3][0], self.model[3][1], self.model[3][2])
    }
}

/// Instance plus the layers it belongs to. The mask never leaves the engine;
/// the compositor filters on it per pass.
#[derive(Debug, Clone, Copy)]
pub struct DrawItem {
    pub layers: LayerMask,
    pub instance: DrawInstance,
}

/// Line vertex: position then RGBA. 7 floats = 28 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl LineVertex {
    pub const FLOATS: usize = 7;
}

/// How a strip is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StripStyle {
    /// World units, or pixels when `screen_space`.
    pub width: f32,
    pub opacity: f32,
    /// Width is in pixels and needs the resolution uniform.
    pub screen_space: bool,
    pub closed: bool,
    /// GPU resource backing this strip, 0 for transient geometry.
    pub resource: u32,
}

/// A run of `count` vertices starting at `first` in the frame's vertex list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStrip {
    pub first: u32,
    pub count: u32,
    pub layers: LayerMask,
    pub width: f32,
    pub opacity: f32,
    pub screen_space: bool,
    pub closed: bool,
    pub resource: u32,
}

/// Everything the scene wants drawn this frame, before pass filtering.
#[derive(Debug, Default)]
pub struct DrawList {
    items: Vec<DrawItem>,
    vertices: Vec<LineVertex>,
    strips: Vec<LineStrip>,
}

impl DrawList {
    pub fn new() -> Self {
        Self {
            items: Vec::with_capacity(1024),
            vertices: Vec::with_capacity(4096),
            strips: Vec::with_capacity(64),
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.vertices.clear();
        self.strips.clear();
    }

    pub fn push(&mut self, layers: LayerMask, instance: DrawInstance) {
        self.items.push(DrawItem { layers, instance });
    }

    pub fn push_strip(
        &mut self,
        layers: LayerMask,
        points: impl IntoIterator<Item = (Vec3, [f32; 4])>,
        style: StripStyle,
    ) {
        let first = self.vertices.len() as u32;
        self.vertices.extend(
            points
                .into_iter()
                .map(|(p, color)| LineVertex { position: p.to_array(), color }),
        );
        let count = self.vertices.len() as u32 - first;
        if count < 2 {
            self.vertices.truncate(first as usize);
            return;
        }
        self.strips.push(LineStrip {
            first,
            count,
            layers,
            width: style.width,
            opacity: style.opacity,
            screen_space: style.screen_space,
            closed: style.closed,
            resource: style.resource,
        });
    }

    pub fn items(&self) -> &[DrawItem] {
        &self.items
    }

    pub fn vertices(&self) -> &[LineVertex] {
        &self.vertices
    }

    pub fn strips(&self) -> &[LineStrip] {
        &self.strips
    }
}

/// Index range of one orbit's ribbon inside `RibbonGeometry`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RibbonRange {
    pub entity: EntityId,
    pub first_index: u32,
    pub index_count: u32,
}

/// Triangulated orbit ribbons. Static between scale changes; `revision`
/// tells the backend when to upload again.
#[derive(Debug, Clone, Default)]
pub struct RibbonGeometry {
    pub vertices: Vec<LineVertex>,
    pub indices: Vec<u32>,
    pub ranges: Vec<RibbonRange>,
    pub revision: u64,
}
