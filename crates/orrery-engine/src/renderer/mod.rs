pub mod camera;
pub mod compositor;
pub mod instance;
pub mod layer;
pub mod packed;
pub mod traits;

// Re-export key types for convenient access
pub use camera::{CameraUniform, OrbitCamera, Viewport};
pub use compositor::{BloomSettings, CompositorPhase, LayerCompositor};
pub use instance::{DrawInstance, DrawKind, DrawList, LineStrip, LineVertex, RibbonGeometry};
pub use layer::{LayerMask, RenderLayer};
pub use packed::PackedFrame;
pub use traits::{FrameData, PassDesc, PassKind, RenderBackend, RenderTarget, ResourceHandle};
