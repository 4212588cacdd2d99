use orrery_engine::{
    AssetHandles, InputEvent, InputQueue, PackedFrame,
    SceneConfig, SceneError, SceneEvent, SceneGraph, TickClock,
};

/// Scene runner that wires the engine to the host loop.
///
/// The bridge keeps one of these in a `thread_local!` and exports free
/// functions via `#[wasm_bindgen]`. Input is buffered between frames and
/// applied before the frame's ticks run.
pub struct SceneRunner {
    scene: SceneGraph,
    input: InputQueue,
    clock: TickClock,
    frame: PackedFrame,
    /// Events from the last frame, flat for the host to read by pointer.
    events: Vec<SceneEvent>,
}

impl SceneRunner {
    /// Build and initialize a scene.
    pub fn new(config: SceneConfig, assets: &AssetHandles) -> Result<Self, SceneError> {
        let mut scene = SceneGraph::new(config);
        scene.initialize(assets)?;
        Ok(Self {
            scene,
            input: InputQueue::new(),
            clock: TickClock::default(),
            frame: PackedFrame::new(),
            events: Vec::with_capacity(16),
        })
    }

    /// Same as `new`, from the host's JSON. An empty config string means defaults.
    pub fn from_json(config_json: &str, assets_json: &str) -> Result<Self, SceneError> {
        let config = if config_json.trim().is_empty() {
            SceneConfig::default()
        } else {
            SceneConfig::from_json(config_json)?
        };
        let assets = if assets_json.trim().is_empty() {
            AssetHandles::default()
        } else {
            AssetHandles::from_json(assets_json)?
        };
        Self::new(config, &assets)
    }

    /// Push an input event into the queue.
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Run one host frame: apply input, step the fixed clock, render.
    pub fn frame(&mut self, dt_seconds: f32) {
        self.scene.apply_input(self.input.drain());

        let steps = self.clock.accumulate(dt_seconds);
        for _ in 0..steps {
            self.scene.tick(1.0);
        }

        self.scene.render(&mut self.frame);

        self.events.clear();
        self.events.extend(self.scene.take_events());
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneGraph {
        &mut self.scene
    }

    pub fn packed(&self) -> &PackedFrame {
        &self.frame
    }

    // ---- Pointer accessors for typed-array reads ----

    pub fn frame_ptr(&self) -> *const f32 {
        self.frame.buffer_ptr()
    }

    pub fn frame_len(&self) -> u32 {
        self.frame.buffer_len()
    }

    pub fn ribbon_vertices_ptr(&self) -> *const f32 {
        self.frame.ribbon_vertices_ptr()
    }

    pub fn ribbon_vertex_count(&self) -> u32 {
        self.frame.ribbon_vertex_count()
    }

    pub fn ribbon_indices_ptr(&self) -> *const u32 {
        self.frame.ribbon_indices_ptr()
    }

    pub fn ribbon_index_count(&self) -> u32 {
        self.frame.ribbon_index_count()
    }

    pub fn ribbon_revision(&self) -> u64 {
        self.frame.ribbon_revision()
    }

    pub fn events(&self) -> &[SceneEvent] {
        &self.events
    }

    pub fn events_ptr(&self) -> *const f32 {
        self.events.as_ptr() as *const f32
    }

    pub fn events_len(&self) -> u32 {
        self.events.len() as u32
    }

    /// `(entity, text)` for every label, looked up once by the host.
    pub fn label_texts(&self) -> impl Iterator<Item = (u32, &str)> {
        self.scene.labels().labels().iter().map(|l| (l.entity.0, l.text.as_str()))
    }
}
