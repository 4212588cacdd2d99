use crate::api::error::ResourceError;
use crate::systems::labels::LabelInstance;

use super::camera::{CameraUniform, Viewport};
use super::compositor::BloomSettings;
use super::instance::{DrawInstance, LineStrip, LineVertex, RibbonGeometry};
use super::layer::LayerMask;

/// Opaque handle to a backend-side GPU resource owned by an ephemeral entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Bloom-eligible geometry only, into the offscreen target.
    Emissive,
    /// Blur/intensify the offscreen target and add it onto the screen.
    Bloom,
    /// Everything, on top of the bloom result.
    Full,
    /// Screen-space labels, never bloomed.
    Overlay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTarget {
    Screen,
    Emissive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearFlags {
    pub color: bool,
    pub depth: bool,
}

impl ClearFlags {
    pub const ALL: Self = Self { color: true, depth: true };
    pub const DEPTH: Self = Self { color: false, depth: true };
    pub const NONE: Self = Self { color: false, depth: false };
}

/// One step of the frame, as planned by the compositor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassDesc {
    pub kind: PassKind,
    /// Camera layer mask for geometry passes.
    pub mask: LayerMask,
    pub target: RenderTarget,
    pub clear: ClearFlags,
    pub viewport: Viewport,
}

/// Per-frame data shared by every pass.
pub struct FrameData<'a> {
    pub camera: CameraUniform,
    pub vertices: &'a [LineVertex],
    /// Orbit ribbons; backends re-upload when `revision` moves.
    pub ribbons: &'a RibbonGeometry,
}

/// Backend seam. The compositor decides order and filtering; the backend
/// only executes what it is handed.
pub trait RenderBackend {
    /// New drawable size. Called before any pass of the next frame.
    fn resize(&mut self, viewport: Viewport);

    fn begin_frame(&mut self, frame: &FrameData<'_>);

    /// Draw instances and strips. Strips index into `FrameData::vertices`.
    fn geometry_pass(&mut self, pass: &PassDesc, instances: &[DrawInstance], strips: &[LineStrip]);

    fn bloom_pass(&mut self, pass: &PassDesc, settings: &BloomSettings);

    fn overlay_pass(&mut self, pass: &PassDesc, labels: &[LabelInstance]);

    fn end_frame(&mut self);

    /// Free a resource whose owner has been removed.
    fn release(&mut self, handle: ResourceHandle) -> Result<(), ResourceError>;
}
