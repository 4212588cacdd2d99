//! Orbit-path geometry. Derived purely from each body's elements and the
//! current orbit scale, and rebuilt from scratch whenever the scale changes:
//! an eccentric ellipse does not scale isotropically about its focus.

use glam::Vec3;

use crate::api::types::EntityId;
use crate::core::scale::ScaleSnapshot;
use crate::renderer::instance::{DrawList, RibbonGeometry, StripStyle};
use crate::renderer::layer::LayerMask;

use super::elements::OrbitalElement;
use super::solver::{orbit_position, Ellipse};

/// Tessellation of every orbit ellipse.
pub const PATH_SEGMENTS: usize = 256;

/// Per-orbit visual weight. Outer orbits draw heavier so they keep contrast
/// against the bright backdrop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathStyle {
    pub base_width: f32,
    pub width_step: f32,
    pub base_opacity: f32,
    pub opacity_step: f32,
    pub opacity_cap: f32,
}

impl Default for PathStyle {
    fn default() -> Self {
        Self {
            base_width: 0.03,
            width_step: 0.01,
            base_opacity: 0.6,
            opacity_step: 0.08,
            opacity_cap: 0.8,
        }
    }
}

impl PathStyle {
    /// `clamp(base + i·step, 0, cap)`
    pub fn opacity(&self, index: usize) -> f32 {
        (self.base_opacity + index as f32 * self.opacity_step).clamp(0.0, self.opacity_cap)
    }

    pub fn width(&self, index: usize) -> f32 {
        self.base_width + index as f32 * self.width_step
    }

    /// Opacity after the camera-distance response, still under the cap.
    pub fn opacity_at(&self, index: usize, camera_distance: f32) -> f32 {
        let response = (camera_distance / 200.0).clamp(1.0, 1.5);
        ((self.base_opacity + index as f32 * self.opacity_step) * response).clamp(0.0, self.opacity_cap)
    }

    /// Width grows with distance so far orbits stay visible.
    pub fn width_at(&self, index: usize, camera_distance: f32) -> f32 {
        self.width(index) * (camera_distance / 100.0).clamp(1.0, 10.0)
    }
}

/// Sample a closed ellipse. The last point is not repeated; strips are drawn closed.
pub fn ellipse_points(elements: &OrbitalElement, orbit_scale: f64, segments: usize) -> Vec<Vec3> {
    let segments = segments.max(3);
    (0..segments)
        .map(|k| {
            let angle = k as f64 / segments as f64 * std::f64::consts::TAU;
            orbit_position(elements, angle, orbit_scale).as_vec3()
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct OrbitPath {
    body: EntityId,
    index: usize,
    color: [f32; 3],
    elements: OrbitalElement,
    points: Vec<Vec3>,
}

impl OrbitPath {
    pub fn body(&self) -> EntityId {
        self.body
    }

    /// Orbital index used by the visual-weight policy.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn color(&self) -> [f32; 3] {
        self.color
    }

    pub fn elements(&self) -> &OrbitalElement {
        &self.elements
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }
}

/// Owns one path per orbiting body and keeps all of them at one scale.
pub struct OrbitPathRenderer {
    paths: Vec<OrbitPath>,
    style: PathStyle,
    segments: usize,
    orbit_scale: f64,
    revision: u64,
    ribbons: RibbonGeometry,
}

impl OrbitPathRenderer {
    pub fn new(style: PathStyle, orbit_scale: f64) -> Self {
        Self {
            paths: Vec::with_capacity(9),
            style,
            segments: PATH_SEGMENTS,
            orbit_scale,
            revision: 0,
            ribbons: RibbonGeometry::default(),
        }
    }

    pub fn with_segments(mut self, segments: usize) -> Self {
        self.segments = segments.max(3);
        self
    }

    /// Register a path. Geometry is built at the current scale right away.
    pub fn add(&mut self, body: EntityId, color: [f32; 3], elements: OrbitalElement) -> usize {
        let index = self.paths.len();
        self.paths.push(OrbitPath {
            body,
            index,
            color,
            elements,
            points: ellipse_points(&elements, self.orbit_scale, self.segments),
        });
        self.rebuild_ribbons();
        index
    }

    /// Drop every path. The revision keeps counting so hosts re-upload.
    pub fn clear(&mut self) {
        self.paths.clear();
        self.rebuild_ribbons();
    }

    /// Regenerate when the frame's snapshot carries a new scale.
    /// Returns whether anything was rebuilt.
    pub fn sync(&mut self, snapshot: &ScaleSnapshot) -> bool {
        if snapshot.orbit_scale == self.orbit_scale {
            return false;
        }
        self.regenerate(snapshot.orbit_scale);
        true
    }

    /// Rebuild every path at `orbit_scale`.
    pub fn regenerate(&mut self, orbit_scale: f64) {
        self.orbit_scale = orbit_scale;
        for path in &mut self.paths {
            path.points = ellipse_points(&path.elements, orbit_scale, self.segments);
        }
        self.rebuild_ribbons();
        log::debug!("orbit paths regenerated at scale {} (rev {})", orbit_scale, self.revision);
    }

    fn rebuild_ribbons(&mut self) {
        self.revision += 1;
        #[cfg(feature = "vectors")]
        {
            self.ribbons = ribbon::tessellate(&self.paths, &self.style, self.orbit_scale);
        }
        self.ribbons.revision = self.revision;
    }

    /// Append one strip per visible path to the frame's draw list.
    pub fn emit(&self, draw: &mut DrawList, camera_distance: f32, visible: impl Fn(EntityId) -> bool) {
        for path in self.paths.iter().filter(|p| visible(p.body)) {
            let [r, g, b] = path.color;
            draw.push_strip(
                LayerMask::ENTIRE,
                path.points.iter().map(|p| (*p, [r, g, b, 1.0])),
                StripStyle {
                    width: self.style.width_at(path.index, camera_distance),
                    opacity: self.style.opacity_at(path.index, camera_distance),
                    screen_space: false,
                    closed: true,
                    resource: 0,
                },
            );
        }
    }

    pub fn path(&self, body: EntityId) -> Option<&OrbitPath> {
        self.paths.iter().find(|p| p.body == body)
    }

    pub fn paths(&self) -> &[OrbitPath] {
        &self.paths
    }

    pub fn style(&self) -> &PathStyle {
        &self.style
    }

    pub fn orbit_scale(&self) -> f64 {
        self.orbit_scale
    }

    pub fn ellipse(&self, body: EntityId) -> Option<Ellipse> {
        self.path(body).map(|p| Ellipse::of(&p.elements, self.orbit_scale))
    }

    /// Bumped on every regeneration; backends re-upload static geometry on change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn ribbons(&self) -> &RibbonGeometry {
        &self.ribbons
    }
}

#[cfg(feature = "vectors")]
mod ribbon {
    use lyon::math::point;
    use lyon::path::Path;
    use lyon::tessellation::{
        BuffersBuilder, StrokeOptions, StrokeTessellator, StrokeVertex, StrokeVertexConstructor,
        VertexBuffers,
    };

    use crate::orbit::solver::{incline, Ellipse};
    use crate::renderer::instance::{LineVertex, RibbonGeometry, RibbonRange};

    use super::{OrbitPath, PathStyle};

    /// Lifts orbital-plane stroke vertices into the inclined 3D plane.
    struct PlaneVertexCtor {
        inclination: f64,
        color: [f32; 4],
    }

    impl StrokeVertexConstructor<LineVertex> for PlaneVertexCtor {
        fn new_vertex(&mut self, vertex: StrokeVertex) -> LineVertex {
            let p = vertex.position();
            let world = incline(p.x as f64, p.y as f64, self.inclination).as_vec3();
            LineVertex { position: world.to_array(), color: self.color }
        }
    }

    pub(super) fn tessellate(paths: &[OrbitPath], style: &PathStyle, orbit_scale: f64) -> RibbonGeometry {
        let mut tess = StrokeTessellator::new();
        let mut geometry: VertexBuffers<LineVertex, u32> = VertexBuffers::new();
        let mut ranges = Vec::with_capacity(paths.len());

        for path in paths {
            let ellipse = Ellipse::of(path.elements(), orbit_scale);
            let n = path.points().len().max(3);
            let mut builder = Path::builder();
            for k in 0..n {
                let angle = k as f64 / n as f64 * std::f64::consts::TAU;
                let (x, z) = ellipse.in_plane(angle);
                let p = point(x as f32, z as f32);
                if k == 0 {
                    builder.begin(p);
                } else {
                    builder.line_to(p);
                }
            }
            builder.close();
            let outline = builder.build();

            let [r, g, b] = path.color();
            let ctor = PlaneVertexCtor {
                inclination: path.elements().inclination_rad(),
                color: [r, g, b, style.opacity(path.index())],
            };
            let first_index = geometry.indices.len() as u32;
            let options = StrokeOptions::tolerance(0.5).with_line_width(style.width(path.index()));
            if let Err(e) = tess.tessellate_path(&outline, &options, &mut BuffersBuilder::new(&mut geometry, ctor)) {
                log::warn!("orbit ribbon for {:?} failed to tessellate: {:?}", path.body(), e);
                continue;
            }
            ranges.push(RibbonRange {
                entity: path.body(),
                first_index,
                index_count: geometry.indices.len() as u32 - first_index,
            });
        }

        RibbonGeometry {
            vertices: geometry.vertices,
            indices: geometry.indices,
            ranges,
            revision: 0,
        }
    }
}
