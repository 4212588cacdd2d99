/// Packed frame layout shared with the host renderer.
/// Must stay in sync with the TypeScript reader.
///
/// Layout (all values f32 / 4 bytes):
/// ```text
/// [Header:    16 floats]
/// [Camera:    24 floats]
/// [Commands:  command_count × 16 floats]
/// [Instances: instance_count × 24 floats]
/// [Strips:    strip_count × 8 floats]
/// [Vertices:  vertex_count × 7 floats]
/// [Labels:    label_count × 8 floats]
/// ```
///
/// Counts are written into the header every frame; the reader recomputes
/// offsets with the same arithmetic as `FrameLayout::new`.
/// Orbit ribbons travel in their own buffers and only change with
/// `HEADER_RIBBON_REVISION`.

use crate::renderer::camera::CameraUniform;
use crate::renderer::instance::{DrawInstance, LineVertex};
use crate::systems::labels::LabelInstance;

/// Number of floats in the header section.
pub const HEADER_FLOATS: usize = 16;

/// Header field indices.
pub const HEADER_FRAME_COUNTER: usize = 0;
pub const HEADER_PROTOCOL_VERSION: usize = 1;
pub const HEADER_VIEWPORT_WIDTH: usize = 2;
pub const HEADER_VIEWPORT_HEIGHT: usize = 3;
pub const HEADER_COMMAND_COUNT: usize = 4;
pub const HEADER_INSTANCE_COUNT: usize = 5;
pub const HEADER_STRIP_COUNT: usize = 6;
pub const HEADER_VERTEX_COUNT: usize = 7;
pub const HEADER_LABEL_COUNT: usize = 8;
pub const HEADER_RIBBON_REVISION: usize = 9;
pub const HEADER_RIBBON_VERTEX_COUNT: usize = 10;
pub const HEADER_RIBBON_INDEX_COUNT: usize = 11;
pub const HEADER_RELEASED_COUNT: usize = 12;

/// Protocol version written into the header.
pub const PROTOCOL_VERSION: f32 = 1.0;

/// Floats per pass command (wire format).
pub const COMMAND_FLOATS: usize = 16;

/// Floats per strip record (wire format).
pub const STRIP_FLOATS: usize = 8;

/// Section offsets for one packed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameLayout {
    pub camera_offset: usize,
    pub command_offset: usize,
    pub instance_offset: usize,
    pub strip_offset: usize,
    pub vertex_offset: usize,
    pub label_offset: usize,
    pub total_floats: usize,
}

/// Record counts of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameCounts {
    pub commands: usize,
    pub instances: usize,
    pub strips: usize,
    pub vertices: usize,
    pub labels: usize,
}

impl FrameLayout {
    pub fn new(counts: FrameCounts) -> Self {
        let camera_offset = HEADER_FLOATS;
        let command_offset = camera_offset + CameraUniform::FLOATS;
        let instance_offset = command_offset + counts.commands * COMMAND_FLOATS;
        let strip_offset = instance_offset + counts.instances * DrawInstance::FLOATS;
        let vertex_offset = strip_offset + counts.strips * STRIP_FLOATS;
        let label_offset = vertex_offset + counts.vertices * LineVertex::FLOATS;
        let total_floats = label_offset + counts.labels * LabelInstance::FLOATS;
        Self {
            camera_offset,
            command_offset,
            instance_offset,
            strip_offset,
            vertex_offset,
            label_offset,
            total_floats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_frame_is_header_plus_camera() {
        let layout = FrameLayout::new(FrameCounts::default());
        assert_eq!(layout.camera_offset, 16);
        assert_eq!(layout.command_offset, 40);
        assert_eq!(layout.total_floats, 40);
    }

    #[test]
    fn sections_are_contiguous() {
        let layout = FrameLayout::new(FrameCounts {
            commands: 4,
            instances: 10,
            strips: 2,
            vertices: 100,
            labels: 3,
        });
        assert_eq!(layout.instance_offset, 40 + 4 * 16);
        assert_eq!(layout.strip_offset, layout.instance_offset + 240);
        assert_eq!(layout.vertex_offset, layout.strip_offset + 16);
        assert_eq!(layout.label_offset, layout.vertex_offset + 700);
        assert_eq!(layout.total_floats, layout.label_offset + 24);
    }
}
