//! Backend that flattens the pass stream into one `f32` buffer for the host.

use std::collections::HashSet;

use bytemuck::{Pod, Zeroable};

use crate::api::error::ResourceError;
use crate::bridge::protocol::*;
use crate::systems::labels::LabelInstance;

use super::camera::{CameraUniform, Viewport};
use super::compositor::BloomSettings;
use super::instance::{DrawInstance, LineStrip, LineVertex};
use super::traits::{FrameData, PassDesc, PassKind, RenderBackend, RenderTarget, ResourceHandle};

/// One pass, as the host replays it. 16 floats.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct PassCommand {
    pub kind: f32,
    pub target: f32,
    pub clear_color: f32,
    pub clear_depth: f32,
    pub first_instance: f32,
    pub instance_count: f32,
    pub first_strip: f32,
    pub strip_count: f32,
    pub first_label: f32,
    pub label_count: f32,
    pub bloom_strength: f32,
    pub bloom_radius: f32,
    pub bloom_threshold: f32,
    pub _pad: [f32; 3],
}

impl PassCommand {
    fn new(pass: &PassDesc) -> Self {
        Self {
            kind: match pass.kind {
                PassKind::Emissive => 0.0,
                PassKind::Bloom => 1.0,
                PassKind::Full => 2.0,
                PassKind::Overlay => 3.0,
            },
            target: match pass.target {
                RenderTarget::Screen => 0.0,
                RenderTarget::Emissive => 1.0,
            },
            clear_color: pass.clear.color as u8 as f32,
            clear_depth: pass.clear.depth as u8 as f32,
            ..Self::default()
        }
    }
}

/// Strip record as the host reads it. 8 floats.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct StripRecord {
    pub first: f32,
    pub count: f32,
    pub width: f32,
    pub opacity: f32,
    pub screen_space: f32,
    pub closed: f32,
    pub resource: f32,
    pub _pad: f32,
}

impl From<&LineStrip> for StripRecord {
    fn from(s: &LineStrip) -> Self {
        Self {
            first: s.first as f32,
            count: s.count as f32,
            width: s.width,
            opacity: s.opacity,
            screen_space: s.screen_space as u8 as f32,
            closed: s.closed as u8 as f32,
            resource: s.resource as f32,
            _pad: 0.0,
        }
    }
}

#[derive(Default)]
pub struct PackedFrame {
    viewport: Option<Viewport>,
    frame: u64,
    camera: CameraUniform,
    commands: Vec<PassCommand>,
    instances: Vec<DrawInstance>,
    strips: Vec<StripRecord>,
    vertices: Vec<LineVertex>,
    labels: Vec<LabelInstance>,
    ribbon_revision: u64,
    ribbon_vertices: Vec<LineVertex>,
    ribbon_indices: Vec<u32>,
    live_resources: HashSet<u32>,
    released: usize,
    layout: FrameLayout,
    buffer: Vec<f32>,
}

impl PackedFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &[f32] {
        &self.buffer
    }

    /// Raw pointer for the host's typed-array view.
    pub fn buffer_ptr(&self) -> *const f32 {
        self.buffer.as_ptr()
    }

    pub fn buffer_len(&self) -> u32 {
        self.buffer.len() as u32
    }

    pub fn layout(&self) -> FrameLayout {
        self.layout
    }

    pub fn commands(&self) -> &[PassCommand] {
        &self.commands
    }

    pub fn ribbon_vertices_ptr(&self) -> *const f32 {
        self.ribbon_vertices.as_ptr() as *const f32
    }

    pub fn ribbon_vertex_count(&self) -> u32 {
        self.ribbon_vertices.len() as u32
    }

    pub fn ribbon_indices_ptr(&self) -> *const u32 {
        self.ribbon_indices.as_ptr()
    }

    pub fn ribbon_index_count(&self) -> u32 {
        self.ribbon_indices.len() as u32
    }

    pub fn ribbon_revision(&self) -> u64 {
        self.ribbon_revision
    }

    pub fn live_resources(&self) -> usize {
        self.live_resources.len()
    }

    fn flatten(&mut self) {
        self.layout = FrameLayout::new(FrameCounts {
            commands: self.commands.len(),
            instances: self.instances.len(),
            strips: self.strips.len(),
            vertices: self.vertices.len(),
            labels: self.labels.len(),
        });
        let viewport = self.viewport.unwrap_or(Viewport::new(1, 1));

        let mut header = [0.0f32; HEADER_FLOATS];
        header[HEADER_FRAME_COUNTER] = self.frame as f32;
        header[HEADER_PROTOCOL_VERSION] = PROTOCOL_VERSION;
        header[HEADER_VIEWPORT_WIDTH] = viewport.width as f32;
        header[HEADER_VIEWPORT_HEIGHT] = viewport.height as f32;
        header[HEADER_COMMAND_COUNT] = self.commands.len() as f32;
        header[HEADER_INSTANCE_COUNT] = self.instances.len() as f32;
        header[HEADER_STRIP_COUNT] = self.strips.len() as f32;
        header[HEADER_VERTEX_COUNT] = self.vertices.len() as f32;
        header[HEADER_LABEL_COUNT] = self.labels.len() as f32;
        header[HEADER_RIBBON_REVISION] = self.ribbon_revision as f32;
        header[HEADER_RIBBON_VERTEX_COUNT] = self.ribbon_vertices.len() as f32;
        header[HEADER_RIBBON_INDEX_COUNT] = self.ribbon_indices.len() as f32;
        header[HEADER_RELEASED_COUNT] = self.released as f32;

        self.buffer.clear();
        self.buffer.reserve(self.layout.total_floats);
        self.buffer.extend_from_slice(&header);
        self.buffer.extend_from_slice(bytemuck::cast_slice(std::slice::from_ref(&self.camera)));
        self.buffer.extend_from_slice(bytemuck::cast_slice(&self.commands));
        self.buffer.extend_from_slice(bytemuck::cast_slice(&self.instances));
        self.buffer.extend_from_slice(bytemuck::cast_slice(&self.strips));
        self.buffer.extend_from_slice(bytemuck::cast_slice(&self.vertices));
        self.buffer.extend_from_slice(bytemuck::cast_slice(&self.labels));
    }
}

impl RenderBackend for PackedFrame {
    fn resize(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
    }

    fn begin_frame(&mut self, frame: &FrameData<'_>) {
        self.frame += 1;
        self.camera = frame.camera;
        self.commands.clear();
        self.instances.clear();
        self.strips.clear();
        self.labels.clear();
        self.vertices.clear();
        self.vertices.extend_from_slice(frame.vertices);
        if frame.ribbons.revision != self.ribbon_revision {
            self.ribbon_revision = frame.ribbons.revision;
            self.ribbon_vertices.clear();
            self.ribbon_vertices.extend_from_slice(&frame.ribbons.vertices);
            self.ribbon_indices.clear();
            self.ribbon_indices.extend_from_slice(&frame.ribbons.indices);
        }
    }

    fn geometry_pass(&mut self, pass: &PassDesc, instances: &[DrawInstance], strips: &[LineStrip]) {
        let mut cmd = PassCommand::new(pass);
        cmd.first_instance = self.instances.len() as f32;
        cmd.instance_count = instances.len() as f32;
        cmd.first_strip = self.strips.len() as f32;
        cmd.strip_count = strips.len() as f32;
        self.instances.extend_from_slice(instances);
        for strip in strips {
            if strip.resource != 0 {
                self.live_resources.insert(strip.resource);
            }
            self.strips.push(strip.into());
        }
        self.commands.push(cmd);
    }

    fn bloom_pass(&mut self, pass: &PassDesc, settings: &BloomSettings) {
        let mut cmd = PassCommand::new(pass);
        cmd.bloom_strength = settings.strength;
        cmd.bloom_radius = settings.radius;
        cmd.bloom_threshold = settings.threshold;
        self.commands.push(cmd);
    }

    fn overlay_pass(&mut self, pass: &PassDesc, labels: &[LabelInstance]) {
        let mut cmd = PassCommand::new(pass);
        cmd.first_label = self.labels.len() as f32;
        cmd.label_count = labels.len() as f32;
        self.labels.extend_from_slice(labels);
        self.commands.push(cmd);
    }

    fn end_frame(&mut self) {
        self.flatten();
        // Releases arrive before the next begin_frame and count toward that frame.
        self.released = 0;
    }

    fn release(&mut self, handle: ResourceHandle) -> Result<(), ResourceError> {
        if self.live_resources.remove(&handle.0) {
            self.released += 1;
            Ok(())
        } else {
            Err(ResourceError::UnknownHandle(handle))
        }
    }
}
