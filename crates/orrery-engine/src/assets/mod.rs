pub mod manifest;

pub use manifest::{AssetHandle, AssetHandles};
