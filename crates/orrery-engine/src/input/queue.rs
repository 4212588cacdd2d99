use crate::core::scale::SettingWrite;

/// Key code that releases a focus lock.
pub const KEY_ESCAPE: u32 = 27;

/// Input event types the scene understands. Pointer coordinates are in
/// drawable pixels with the origin at the top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown { x: f32, y: f32 },
    PointerUp { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    /// Wheel or pinch; positive zooms out.
    Wheel { delta: f32 },
    KeyDown { key_code: u32 },
    /// The drawable was resized.
    Resize { width: u32, height: u32 },
    /// A write from the settings panel.
    Setting(SettingWrite),
}

/// Events buffered between ticks, applied in arrival order.
///
/// Browsers fire pointer moves and resizes far faster than the tick rate.
/// A move directly following another move replaces it, and the same holds
/// for resizes; anything in between (a press, a key) keeps both.
pub struct InputQueue {
    events: Vec<InputEvent>,
    coalesced: u64,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
            coalesced: 0,
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        if let Some(last) = self.events.last_mut() {
            let replaces = matches!(
                (&*last, &event),
                (InputEvent::PointerMove { .. }, InputEvent::PointerMove { .. })
                    | (InputEvent::Resize { .. }, InputEvent::Resize { .. })
            );
            if replaces {
                *last = event;
                self.coalesced += 1;
                return;
            }
        }
        self.events.push(event);
    }

    /// Take every pending event, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Events folded into a later one since creation.
    pub fn coalesced(&self) -> u64 {
        self.coalesced
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::EntityId;

    #[test]
    fn drain_empties_the_queue() {
        let mut q = InputQueue::new();
        q.push(InputEvent::PointerDown { x: 10.0, y: 20.0 });
        q.push(InputEvent::KeyDown { key_code: KEY_ESCAPE });
        assert_eq!(q.drain().len(), 2);
        assert!(q.is_empty());
    }

    #[test]
    fn drain_keeps_arrival_order() {
        let mut q = InputQueue::new();
        q.push(InputEvent::Setting(SettingWrite::OrbitScale(90.0)));
        q.push(InputEvent::Resize { width: 800, height: 600 });
        q.push(InputEvent::Setting(SettingWrite::RotationSpeed { body: EntityId(3), speed: 0.01 }));
        let events = q.drain();
        assert_eq!(events[0], InputEvent::Setting(SettingWrite::OrbitScale(90.0)));
        assert_eq!(events[1], InputEvent::Resize { width: 800, height: 600 });
        assert!(matches!(events[2], InputEvent::Setting(SettingWrite::RotationSpeed { .. })));
    }

    #[test]
    fn back_to_back_moves_collapse_to_the_latest() {
        let mut q = InputQueue::new();
        q.push(InputEvent::PointerMove { x: 1.0, y: 1.0 });
        q.push(InputEvent::PointerMove { x: 2.0, y: 2.0 });
        q.push(InputEvent::PointerMove { x: 3.0, y: 3.0 });
        assert_eq!(q.len(), 1);
        assert_eq!(q.coalesced(), 2);
        assert_eq!(q.drain()[0], InputEvent::PointerMove { x: 3.0, y: 3.0 });
    }

    #[test]
    fn presses_split_move_runs() {
        let mut q = InputQueue::new();
        q.push(InputEvent::PointerMove { x: 1.0, y: 1.0 });
        q.push(InputEvent::PointerDown { x: 1.0, y: 1.0 });
        q.push(InputEvent::PointerMove { x: 9.0, y: 1.0 });
        q.push(InputEvent::PointerUp { x: 9.0, y: 1.0 });
        assert_eq!(q.len(), 4);
        assert_eq!(q.coalesced(), 0);
    }

    #[test]
    fn only_the_last_resize_survives() {
        let mut q = InputQueue::new();
        q.push(InputEvent::Resize { width: 0, height: 0 });
        q.push(InputEvent::Resize { width: 640, height: 480 });
        assert_eq!(q.drain(), vec![InputEvent::Resize { width: 640, height: 480 }]);
    }
}
