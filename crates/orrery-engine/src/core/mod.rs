pub mod arena;
pub mod scale;
pub mod scene;
pub mod time;
