use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Opaque handle to a mesh or texture the host has already loaded.
/// 0 is reserved for "no asset".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetHandle(pub u32);

/// Handles the host supplies at initialization, keyed by body or sprite name.
/// A key that is absent (or maps to 0) means that asset failed to load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetHandles {
    /// Body meshes: "sun", "earth", "saturn_ring", "earth_clouds", ...
    #[serde(default)]
    pub bodies: HashMap<String, u32>,
    /// Sprite textures: "sun_halo", "sun_flare", "link_glow", ...
    #[serde(default)]
    pub sprites: HashMap<String, u32>,
}

impl AssetHandles {
    /// Parse a handle table from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_body(mut self, key: &str, handle: u32) -> Self {
        self.bodies.insert(key.to_string(), handle);
        self
    }

    pub fn with_sprite(mut self, key: &str, handle: u32) -> Self {
        self.sprites.insert(key.to_string(), handle);
        self
    }

    pub fn body(&self, key: &str) -> Option<AssetHandle> {
        lookup(&self.bodies, key)
    }

    pub fn sprite(&self, key: &str) -> Option<AssetHandle> {
        lookup(&self.sprites, key)
    }
}

fn lookup(map: &HashMap<String, u32>, key: &str) -> Option<AssetHandle> {
    map.get(key).copied().filter(|&h| h != 0).map(AssetHandle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_handles() {
        let json = r#"{
            "bodies": { "sun": 1, "earth": 4, "mars": 0 },
            "sprites": { "sun_halo": 20 }
        }"#;
        let handles = AssetHandles::from_json(json).unwrap();
        assert_eq!(handles.body("earth"), Some(AssetHandle(4)));
        assert_eq!(handles.body("mars"), None);
        assert_eq!(handles.body("pluto"), None);
        assert_eq!(handles.sprite("sun_halo"), Some(AssetHandle(20)));
    }

    #[test]
    fn empty_manifest_is_valid() {
        let handles = AssetHandles::from_json("{}").unwrap();
        assert!(handles.bodies.is_empty());
        assert!(handles.sprites.is_empty());
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(AssetHandles::from_json(r#"{ "bodies": [1, 2] }"#).is_err());
    }
}
