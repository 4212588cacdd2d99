use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};

use crate::api::config::CameraConfig;
use crate::interaction::picking::Ray;

/// Zoom band when nothing is locked.
pub const DEFAULT_MIN_DISTANCE: f32 = 0.1;
pub const DEFAULT_MAX_DISTANCE: f32 = f32::INFINITY;
/// Zoom-out limit once a focus lock is released.
pub const RELEASED_MAX_DISTANCE: f32 = 1000.0;

/// Keeps the orbit rig away from the poles so `look_at` never degenerates.
const POLAR_MARGIN: f32 = 0.01;

/// Drawable size in physical pixels. Never zero in either dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Zero dimensions are clamped to 1 so the aspect ratio stays finite.
    pub fn new(width: u32, height: u32) -> Self {
        if width == 0 || height == 0 {
            log::warn!("viewport {}x{} clamped to at least 1x1", width, height);
        }
        Self { width: width.max(1), height: height.max(1) }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

/// Camera data uploaded once per frame.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_projection: [[f32; 4]; 4],
    pub position: [f32; 3],
    pub time: f32,
    /// Drawable size in pixels, for screen-space line widths.
    pub resolution: [f32; 2],
    pub _pad: [f32; 2],
}

impl CameraUniform {
    pub const FLOATS: usize = 24;
}

/// Perspective camera orbiting a look-at target, with a clamped distance band.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    position: Vec3,
    target: Vec3,
    fov_y: f32,
    near: f32,
    far: f32,
    viewport: Viewport,
    min_distance: f32,
    max_distance: f32,
}

impl OrbitCamera {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            position: Vec3::from_array(config.position),
            target: Vec3::ZERO,
            fov_y: config.fov_deg.clamp(1.0, 179.0).to_radians(),
            near: config.near.max(1e-4),
            far: config.far.max(config.near.max(1e-4) * 2.0),
            viewport: Viewport::new(config.width, config.height),
            min_distance: DEFAULT_MIN_DISTANCE,
            max_distance: DEFAULT_MAX_DISTANCE,
        }
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn aspect(&self) -> f32 {
        self.viewport.aspect()
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn set_pose(&mut self, position: Vec3, target: Vec3) {
        self.position = position;
        self.target = target;
    }

    pub fn distance(&self) -> f32 {
        (self.position - self.target).length()
    }

    pub fn distance_limits(&self) -> (f32, f32) {
        (self.min_distance, self.max_distance)
    }

    pub fn set_distance_limits(&mut self, min: f32, max: f32) {
        self.min_distance = min.max(0.0);
        self.max_distance = max.max(self.min_distance);
    }

    pub fn reset_distance_limits(&mut self) {
        self.min_distance = DEFAULT_MIN_DISTANCE;
        self.max_distance = DEFAULT_MAX_DISTANCE;
    }

    /// Free orbit after leaving a body: open at the near end, bounded far out.
    pub fn release_distance_limits(&mut self) {
        self.min_distance = DEFAULT_MIN_DISTANCE;
        self.max_distance = RELEASED_MAX_DISTANCE;
    }

    /// Pull or push the camera along its view axis into the distance band.
    pub fn clamp_distance(&mut self) {
        let offset = self.position - self.target;
        let d = offset.length();
        let clamped = d.clamp(self.min_distance, self.max_distance);
        if clamped != d {
            let dir = offset.try_normalize().unwrap_or(Vec3::Z);
            self.position = self.target + dir * clamped;
        }
    }

    /// Multiplicative zoom, clamped to the band.
    pub fn zoom(&mut self, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let offset = self.position - self.target;
        self.position = self.target + offset * factor;
        self.clamp_distance();
    }

    /// Rotate the camera around the target by azimuth/elevation deltas (radians).
    pub fn orbit(&mut self, d_azimuth: f32, d_elevation: f32) {
        let offset = self.position - self.target;
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return;
        }
        let mut azimuth = offset.x.atan2(offset.z);
        let mut polar = (offset.y / radius).clamp(-1.0, 1.0).acos();
        azimuth -= d_azimuth;
        polar = (polar - d_elevation).clamp(POLAR_MARGIN, std::f32::consts::PI - POLAR_MARGIN);
        let (sp, cp) = polar.sin_cos();
        let (sa, ca) = azimuth.sin_cos();
        self.position = self.target + Vec3::new(radius * sp * sa, radius * cp, radius * sp * ca);
    }

    fn forward(&self) -> Vec3 {
        (self.target - self.position).try_normalize().unwrap_or(Vec3::NEG_Z)
    }

    fn up_hint(&self) -> Vec3 {
        if self.forward().cross(Vec3::Y).length_squared() < 1e-8 {
            Vec3::Z
        } else {
            Vec3::Y
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward(), self.up_hint())
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect(), self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// World point to pixel coordinates (origin top-left). `None` behind the camera.
    pub fn project(&self, world: Vec3) -> Option<Vec2> {
        let clip = self.view_projection() * world.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        let size = self.viewport.size();
        Some(Vec2::new((ndc.x + 1.0) * 0.5 * size.x, (1.0 - ndc.y) * 0.5 * size.y))
    }

    /// Ray from the eye through a pixel coordinate.
    pub fn ray_through(&self, x: f32, y: f32) -> Ray {
        let size = self.viewport.size();
        let ndc_x = 2.0 * x / size.x - 1.0;
        let ndc_y = 1.0 - 2.0 * y / size.y;
        let forward = self.forward();
        let right = forward.cross(self.up_hint()).normalize();
        let up = right.cross(forward);
        let half = (self.fov_y * 0.5).tan();
        let dir = forward + right * (ndc_x * half * self.aspect()) + up * (ndc_y * half);
        Ray::new(self.position, dir)
    }

    pub fn uniform(&self, time: f32) -> CameraUniform {
        CameraUniform {
            view_projection: self.view_projection().to_cols_array_2d(),
            position: self.position.to_array(),
            time,
            resolution: self.viewport.size().to_array(),
            _pad: [0.0; 2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> OrbitCamera {
        OrbitCamera::new(&CameraConfig::default())
    }

    #[test]
    fn zero_width_is_clamped() {
        let vp = Viewport::new(0, 600);
        assert_eq!(vp.width, 1);
        assert!(vp.aspect().is_finite());
        let mut cam = camera();
        cam.set_viewport(Viewport::new(0, 0));
        assert_eq!(cam.aspect(), 1.0);
        assert!(cam.projection().is_finite());
    }

    #[test]
    fn center_pixel_ray_hits_target() {
        let cam = camera();
        let vp = cam.viewport();
        let ray = cam.ray_through(vp.width as f32 / 2.0, vp.height as f32 / 2.0);
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-5);
        assert_eq!(ray.origin, Vec3::new(0.0, 0.0, 50.0));
    }

    #[test]
    fn project_then_ray_round_trips() {
        let cam = camera();
        let world = Vec3::new(8.0, -3.0, 0.0);
        let px = cam.project(world).unwrap();
        let ray = cam.ray_through(px.x, px.y);
        let t = (world - ray.origin).dot(ray.direction);
        let closest = ray.at(t);
        assert!((closest - world).length() < 1e-2, "{:?} vs {:?}", closest, world);
    }

    #[test]
    fn points_behind_camera_do_not_project() {
        let cam = camera();
        assert!(cam.project(Vec3::new(0.0, 0.0, 100.0)).is_none());
    }

    #[test]
    fn zoom_respects_band() {
        let mut cam = camera();
        cam.set_distance_limits(10.0, 60.0);
        cam.zoom(0.01);
        assert!((cam.distance() - 10.0).abs() < 1e-4);
        cam.zoom(100.0);
        assert!((cam.distance() - 60.0).abs() < 1e-3);
        cam.reset_distance_limits();
        assert_eq!(cam.distance_limits(), (DEFAULT_MIN_DISTANCE, DEFAULT_MAX_DISTANCE));
    }

    #[test]
    fn released_band_bounds_zoom_out() {
        let mut cam = camera();
        cam.release_distance_limits();
        for _ in 0..200 {
            cam.zoom(1.1);
        }
        assert!((cam.distance() - RELEASED_MAX_DISTANCE).abs() < 1e-2);
    }

    #[test]
    fn orbit_keeps_radius() {
        let mut cam = camera();
        cam.orbit(0.7, 0.3);
        assert!((cam.distance() - 50.0).abs() < 1e-3);
        cam.orbit(0.0, 10.0);
        assert!(cam.position().y < 50.0);
    }
}
