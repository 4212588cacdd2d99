use bytemuck::{Pod, Zeroable};

/// Stable identifier attached to every pickable or focusable scene entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Raw value as a float, for the flat event and label buffers.
    pub fn as_f32(self) -> f32 {
        self.0 as f32
    }
}

/// Event emitted by the scene for the host UI (focus hints, highlight changes).
/// 4 floats = 16 bytes, same wire shape as every other flat buffer record.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct SceneEvent {
    /// Event kind, one of the `SceneEvent::*` kind constants.
    pub kind: f32,
    /// Entity the event refers to.
    pub entity: f32,
    pub a: f32,
    pub b: f32,
}

impl SceneEvent {
    pub const FLOATS: usize = 4;

    /// A camera transition toward `entity` started.
    pub const FOCUS_STARTED: f32 = 1.0;
    /// The camera locked onto `entity`; `a`/`b` carry the approach band.
    pub const FOCUS_LOCKED: f32 = 2.0;
    /// Focus was cancelled by the user.
    pub const FOCUS_RELEASED: f32 = 3.0;
    /// The focused entity disappeared and focus fell back to idle.
    pub const FOCUS_LOST: f32 = 4.0;
    /// Hover highlight moved; `entity` is 0 with `a = 0.0` when nothing is highlighted.
    pub const HIGHLIGHT: f32 = 5.0;

    pub fn focus_started(entity: EntityId) -> Self {
        Self { kind: Self::FOCUS_STARTED, entity: entity.as_f32(), a: 0.0, b: 0.0 }
    }

    pub fn focus_locked(entity: EntityId, min_distance: f32, max_distance: f32) -> Self {
        Self { kind: Self::FOCUS_LOCKED, entity: entity.as_f32(), a: min_distance, b: max_distance }
    }

    pub fn focus_released(entity: EntityId) -> Self {
        Self { kind: Self::FOCUS_RELEASED, entity: entity.as_f32(), a: 0.0, b: 0.0 }
    }

    pub fn focus_lost(entity: EntityId) -> Self {
        Self { kind: Self::FOCUS_LOST, entity: entity.as_f32(), a: 0.0, b: 0.0 }
    }

    pub fn highlight(entity: Option<EntityId>) -> Self {
        match entity {
            Some(id) => Self { kind: Self::HIGHLIGHT, entity: id.as_f32(), a: 1.0, b: 0.0 },
            None => Self { kind: Self::HIGHLIGHT, entity: 0.0, a: 0.0, b: 0.0 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_event_is_four_floats() {
        assert_eq!(std::mem::size_of::<SceneEvent>(), SceneEvent::FLOATS * 4);
    }

    #[test]
    fn highlight_none_clears_flag() {
        let ev = SceneEvent::highlight(None);
        assert_eq!(ev.kind, SceneEvent::HIGHLIGHT);
        assert_eq!(ev.a, 0.0);
        let ev = SceneEvent::highlight(Some(EntityId(7)));
        assert_eq!(ev.entity, 7.0);
        assert_eq!(ev.a, 1.0);
    }
}
