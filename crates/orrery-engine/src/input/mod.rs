pub mod queue;

pub use queue::{InputEvent, InputQueue, KEY_ESCAPE};
