pub mod api;
pub mod core;
pub mod orbit;
pub mod systems;
pub mod renderer;
pub mod bridge;
pub mod input;
pub mod interaction;
pub mod assets;
pub mod extensions;

// Re-export key types at crate root for convenience
pub use api::config::{SceneConfig, CameraConfig, FocusConfig, LinkConfig, BeltConfig, CometConfig};
pub use api::error::{OrbitError, SceneError, ResourceError};
pub use api::types::{EntityId, SceneEvent};
pub use core::arena::{NodeArena, NodeHandle, NodeTag, Node, HitShape, MeshSource, LocalTransform};
pub use core::scale::{ScaleSnapshot, SettingsSurface, SettingWrite, DecorLayer, Visibility};
pub use core::scene::{SceneGraph, SUN_ID};
pub use core::time::{TickClock, TICK_SECONDS};
pub use orbit::{OrbitalElement, OrbitFrame, BodyController, Star, OrbitPathRenderer, PathStyle};
pub use renderer::{
    OrbitCamera, Viewport, CameraUniform,
    LayerCompositor, BloomSettings, CompositorPhase,
    DrawInstance, DrawKind, DrawList, LayerMask, RenderLayer,
    PackedFrame, RenderBackend, FrameData, PassDesc, PassKind, ResourceHandle,
};
pub use bridge::protocol::FrameLayout;
pub use input::queue::{InputEvent, InputQueue, KEY_ESCAPE};
pub use interaction::{FocusController, FocusPhase, FocusEvent, PickingService, Ray};
pub use assets::manifest::{AssetHandle, AssetHandles};
pub use systems::{DebrisBelt, LinkNetwork, LinkEntity, SunFlares, CometTail, OverlayLabelSystem, LabelInstance};

// Extensions: decoupled optional helpers
pub use extensions::{Easing, ease_vec3};
