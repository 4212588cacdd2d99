//! Selective-bloom frame orchestration.
//!
//! Per frame, in this order and never interleaved:
//! 1. emissive pass: bloom-layer geometry only, into the offscreen target;
//! 2. bloom: blur/intensify the offscreen target onto the screen;
//! 3. full pass: everything, clearing depth but keeping color so the glow
//!    ends up underneath the lit scene;
//! 4. overlay: labels, after the final camera state is known.

use serde::{Deserialize, Serialize};

use crate::systems::labels::LabelInstance;

use super::camera::Viewport;
use super::instance::{DrawInstance, DrawList, LineStrip};
use super::layer::LayerMask;
use super::traits::{ClearFlags, FrameData, PassDesc, PassKind, RenderBackend, RenderTarget};

/// Tunables of the blur/intensify step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BloomSettings {
    /// Intensity multiplier, [0, 5].
    pub strength: f32,
    /// Blur spread, [0, 1].
    pub radius: f32,
    /// Luminance cutoff, [0, 1].
    pub threshold: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self { strength: 5.0, radius: 0.5, threshold: 0.0 }
    }
}

/// Which step the compositor is executing. `Idle` between frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositorPhase {
    Idle,
    Emissive,
    Bloom,
    Full,
    Overlay,
}

impl From<PassKind> for CompositorPhase {
    fn from(kind: PassKind) -> Self {
        match kind {
            PassKind::Emissive => Self::Emissive,
            PassKind::Bloom => Self::Bloom,
            PassKind::Full => Self::Full,
            PassKind::Overlay => Self::Overlay,
        }
    }
}

pub struct LayerCompositor {
    viewport: Viewport,
    bloom: BloomSettings,
    phase: CompositorPhase,
    resize_pending: bool,
    frames: u64,
    instances: Vec<DrawInstance>,
    strips: Vec<LineStrip>,
}

impl LayerCompositor {
    pub fn new(viewport: Viewport, bloom: BloomSettings) -> Self {
        Self {
            viewport,
            bloom,
            phase: CompositorPhase::Idle,
            resize_pending: true,
            frames: 0,
            instances: Vec::with_capacity(1024),
            strips: Vec::with_capacity(64),
        }
    }

    /// Retarget all passes. The backend sees the new size before the next
    /// frame's first pass.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.resize_pending = true;
    }

    pub fn set_bloom(&mut self, bloom: BloomSettings) {
        self.bloom = bloom;
    }

    pub fn bloom(&self) -> BloomSettings {
        self.bloom
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn phase(&self) -> CompositorPhase {
        self.phase
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// The fixed pass sequence at the current size.
    pub fn plan(&self) -> [PassDesc; 4] {
        let viewport = self.viewport;
        [
            PassDesc {
                kind: PassKind::Emissive,
                mask: LayerMask::BLOOM,
                target: RenderTarget::Emissive,
                clear: ClearFlags::ALL,
                viewport,
            },
            PassDesc {
                kind: PassKind::Bloom,
                mask: LayerMask::NONE,
                target: RenderTarget::Screen,
                clear: ClearFlags::ALL,
                viewport,
            },
            PassDesc {
                kind: PassKind::Full,
                mask: LayerMask::ALL,
                target: RenderTarget::Screen,
                clear: ClearFlags::DEPTH,
                viewport,
            },
            PassDesc {
                kind: PassKind::Overlay,
                mask: LayerMask::NONE,
                target: RenderTarget::Screen,
                clear: ClearFlags::NONE,
                viewport,
            },
        ]
    }

    fn filter(&mut self, draw: &DrawList, mask: LayerMask) {
        self.instances.clear();
        self.instances.extend(
            draw.items()
                .iter()
                .filter(|item| item.layers.intersects(mask))
                .map(|item| item.instance),
        );
        self.strips.clear();
        self.strips.extend(draw.strips().iter().filter(|s| s.layers.intersects(mask)).copied());
    }

    /// Run one frame through `backend`.
    pub fn render<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        frame: &FrameData<'_>,
        draw: &DrawList,
        labels: &[LabelInstance],
    ) {
        if self.resize_pending {
            backend.resize(self.viewport);
            self.resize_pending = false;
        }
        backend.begin_frame(frame);
        for pass in self.plan() {
            self.phase = pass.kind.into();
            match pass.kind {
                PassKind::Emissive | PassKind::Full => {
                    self.filter(draw, pass.mask);
                    backend.geometry_pass(&pass, &self.instances, &self.strips);
                }
                PassKind::Bloom => backend.bloom_pass(&pass, &self.bloom),
                PassKind::Overlay => backend.overlay_pass(&pass, labels),
            }
        }
        backend.end_frame();
        self.phase = CompositorPhase::Idle;
        self.frames += 1;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::error::ResourceError;
    use crate::renderer::camera::CameraUniform;
    use crate::renderer::instance::{DrawKind, RibbonGeometry, StripStyle};
    use crate::renderer::traits::ResourceHandle;
    use glam::{Mat4, Vec3};

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum Call {
        Resize(Viewport),
        Begin,
        Geometry { kind: PassKind, clear: ClearFlags, instances: usize, strips: usize },
        Bloom(BloomSettings),
        Overlay(usize),
        End,
        Release(ResourceHandle),
    }

    /// Backend that records what it is asked to do.
    #[derive(Default)]
    pub(crate) struct Recorder {
        pub calls: Vec<Call>,
        pub fail_release: bool,
    }

    impl RenderBackend for Recorder {
        fn resize(&mut self, viewport: Viewport) {
            self.calls.push(Call::Resize(viewport));
        }
        fn begin_frame(&mut self, _frame: &FrameData<'_>) {
            self.calls.push(Call::Begin);
        }
        fn geometry_pass(&mut self, pass: &PassDesc, instances: &[DrawInstance], strips: &[LineStrip]) {
            self.calls.push(Call::Geometry {
                kind: pass.kind,
                clear: pass.clear,
                instances: instances.len(),
                strips: strips.len(),
            });
        }
        fn bloom_pass(&mut self, _pass: &PassDesc, settings: &BloomSettings) {
            self.calls.push(Call::Bloom(*settings));
        }
        fn overlay_pass(&mut self, _pass: &PassDesc, labels: &[LabelInstance]) {
            self.calls.push(Call::Overlay(labels.len()));
        }
        fn end_frame(&mut self) {
            self.calls.push(Call::End);
        }
        fn release(&mut self, handle: ResourceHandle) -> Result<(), ResourceError> {
            self.calls.push(Call::Release(handle));
            if self.fail_release {
                Err(ResourceError::Backend("device lost".into()))
            } else {
                Ok(())
            }
        }
    }

    fn sample_draw() -> DrawList {
        let mut draw = DrawList::new();
        draw.push(LayerMask::EMISSIVE, DrawInstance::new(Mat4::IDENTITY, DrawKind::Mesh));
        draw.push(LayerMask::BLOOM, DrawInstance::new(Mat4::IDENTITY, DrawKind::Sprite));
        draw.push(LayerMask::ENTIRE, DrawInstance::new(Mat4::IDENTITY, DrawKind::Mesh));
        draw.push(LayerMask::ENTIRE, DrawInstance::new(Mat4::IDENTITY, DrawKind::Mesh));
        let style = StripStyle { width: 1.0, opacity: 1.0, screen_space: false, closed: true, resource: 0 };
        draw.push_strip(LayerMask::ENTIRE, [(Vec3::ZERO, [1.0; 4]), (Vec3::X, [1.0; 4])], style);
        draw
    }

    fn run(compositor: &mut LayerCompositor, backend: &mut Recorder, draw: &DrawList) {
        let ribbons = RibbonGeometry::default();
        let frame = FrameData { camera: CameraUniform::default(), vertices: draw.vertices(), ribbons: &ribbons };
        compositor.render(backend, &frame, draw, &[]);
    }

    #[test]
    fn passes_run_in_strict_order() {
        let mut compositor = LayerCompositor::new(Viewport::new(800, 600), BloomSettings::default());
        let mut backend = Recorder::default();
        let draw = sample_draw();
        run(&mut compositor, &mut backend, &draw);
        assert_eq!(
            backend.calls,
            vec![
                Call::Resize(Viewport::new(800, 600)),
                Call::Begin,
                Call::Geometry { kind: PassKind::Emissive, clear: ClearFlags::ALL, instances: 2, strips: 0 },
                Call::Bloom(BloomSettings::default()),
                Call::Geometry { kind: PassKind::Full, clear: ClearFlags::DEPTH, instances: 4, strips: 1 },
                Call::Overlay(0),
                Call::End,
            ]
        );
        assert_eq!(compositor.phase(), CompositorPhase::Idle);
        assert_eq!(compositor.frames(), 1);
    }

    #[test]
    fn resize_lands_before_next_frame_only_once() {
        let mut compositor = LayerCompositor::new(Viewport::new(800, 600), BloomSettings::default());
        let mut backend = Recorder::default();
        let draw = sample_draw();
        run(&mut compositor, &mut backend, &draw);
        compositor.resize(Viewport::new(0, 300));
        backend.calls.clear();
        run(&mut compositor, &mut backend, &draw);
        assert_eq!(backend.calls[0], Call::Resize(Viewport { width: 1, height: 300 }));
        assert!(compositor.plan().iter().all(|p| p.viewport == Viewport::new(1, 300)));
        backend.calls.clear();
        run(&mut compositor, &mut backend, &draw);
        assert_eq!(backend.calls[0], Call::Begin);
    }

    #[test]
    fn bloom_settings_flow_to_backend() {
        let mut compositor = LayerCompositor::new(Viewport::new(10, 10), BloomSettings::default());
        let tuned = BloomSettings { strength: 1.5, radius: 0.2, threshold: 0.1 };
        compositor.set_bloom(tuned);
        let mut backend = Recorder::default();
        run(&mut compositor, &mut backend, &DrawList::new());
        assert!(backend.calls.contains(&Call::Bloom(tuned)));
    }
}
