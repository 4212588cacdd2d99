//! Browser bridge: one `SceneRunner` per page, driven through free
//! `#[wasm_bindgen]` functions because wasm-bindgen cannot export the
//! runner itself.

pub mod runner;

pub use runner::SceneRunner;

use std::cell::RefCell;

use orrery_engine::bridge::protocol::PROTOCOL_VERSION;
use orrery_engine::{DecorLayer, EntityId, InputEvent, SettingWrite};
use wasm_bindgen::prelude::*;

thread_local! {
    static RUNNER: RefCell<Option<SceneRunner>> = const { RefCell::new(None) };
}

/// Run `f` against the live runner. Calls before `orrery_init` are dropped
/// with a warning rather than trapping the page.
fn with_runner<R>(f: impl FnOnce(&mut SceneRunner) -> R) -> Option<R> {
    RUNNER.with(|cell| {
        let mut borrow = cell.borrow_mut();
        match borrow.as_mut() {
            Some(runner) => Some(f(runner)),
            None => {
                log::warn!("orrery: scene not initialized, call orrery_init() first");
                None
            }
        }
    })
}

fn push(event: InputEvent) {
    with_runner(|r| r.push_input(event));
}

fn decor_layer(layer: u32) -> Option<DecorLayer> {
    match layer {
        0 => Some(DecorLayer::Belt),
        1 => Some(DecorLayer::Links),
        2 => Some(DecorLayer::Labels),
        3 => Some(DecorLayer::Comet),
        4 => Some(DecorLayer::Flares),
        _ => None,
    }
}

#[wasm_bindgen]
pub fn orrery_init(config_json: &str, assets_json: &str) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&JsValue::from_str("orrery: logger already installed"));
    }

    let runner = SceneRunner::from_json(config_json, assets_json).map_err(|e| {
        log::error!("orrery: init failed: {}", e);
        JsValue::from_str(&e.to_string())
    })?;
    RUNNER.with(|cell| {
        *cell.borrow_mut() = Some(runner);
    });
    log::info!("orrery: initialized");
    Ok(())
}

#[wasm_bindgen]
pub fn orrery_frame(dt_seconds: f32) {
    with_runner(|r| r.frame(dt_seconds));
}

// ---- Input ----

#[wasm_bindgen]
pub fn orrery_pointer_down(x: f32, y: f32) {
    push(InputEvent::PointerDown { x, y });
}

#[wasm_bindgen]
pub fn orrery_pointer_up(x: f32, y: f32) {
    push(InputEvent::PointerUp { x, y });
}

#[wasm_bindgen]
pub fn orrery_pointer_move(x: f32, y: f32) {
    push(InputEvent::PointerMove { x, y });
}

#[wasm_bindgen]
pub fn orrery_wheel(delta: f32) {
    push(InputEvent::Wheel { delta });
}

#[wasm_bindgen]
pub fn orrery_key_down(key_code: u32) {
    push(InputEvent::KeyDown { key_code });
}

#[wasm_bindgen]
pub fn orrery_resize(width: u32, height: u32) {
    push(InputEvent::Resize { width, height });
}

// ---- Focus ----

/// Returns false when the request was ignored.
#[wasm_bindgen]
pub fn orrery_focus(entity: u32) -> bool {
    with_runner(|r| r.scene_mut().request_focus(EntityId(entity))).unwrap_or(false)
}

#[wasm_bindgen]
pub fn orrery_release_focus() {
    with_runner(|r| r.scene_mut().cancel_focus());
}

// ---- Settings (applied on the next tick) ----

#[wasm_bindgen]
pub fn orrery_set_orbit_scale(value: f64) {
    push(InputEvent::Setting(SettingWrite::OrbitScale(value)));
}

#[wasm_bindgen]
pub fn orrery_set_body_size_scale(value: f32) {
    push(InputEvent::Setting(SettingWrite::BodySizeScale(value)));
}

#[wasm_bindgen]
pub fn orrery_set_rotation_speed(body: u32, speed: f64) {
    push(InputEvent::Setting(SettingWrite::RotationSpeed { body: EntityId(body), speed }));
}

#[wasm_bindgen]
pub fn orrery_set_bloom(strength: f32, radius: f32, threshold: f32) {
    push(InputEvent::Setting(SettingWrite::BloomStrength(strength)));
    push(InputEvent::Setting(SettingWrite::BloomRadius(radius)));
    push(InputEvent::Setting(SettingWrite::BloomThreshold(threshold)));
}

#[wasm_bindgen]
pub fn orrery_set_body_visible(body: u32, visible: bool) {
    push(InputEvent::Setting(SettingWrite::BodyVisible { body: EntityId(body), visible }));
}

#[wasm_bindgen]
pub fn orrery_set_path_visible(body: u32, visible: bool) {
    push(InputEvent::Setting(SettingWrite::PathVisible { body: EntityId(body), visible }));
}

/// `layer`: 0 belt, 1 links, 2 labels, 3 comet, 4 flares.
#[wasm_bindgen]
pub fn orrery_set_layer_visible(layer: u32, visible: bool) {
    match decor_layer(layer) {
        Some(layer) => push(InputEvent::Setting(SettingWrite::LayerVisible { layer, visible })),
        None => log::warn!("orrery: unknown layer {}", layer),
    }
}

// ---- Data accessors ----

#[wasm_bindgen]
pub fn get_protocol_version() -> f32 {
    PROTOCOL_VERSION
}

#[wasm_bindgen]
pub fn get_frame_ptr() -> *const f32 {
    with_runner(|r| r.frame_ptr()).unwrap_or(std::ptr::null())
}

#[wasm_bindgen]
pub fn get_frame_len() -> u32 {
    with_runner(|r| r.frame_len()).unwrap_or(0)
}

#[wasm_bindgen]
pub fn get_ribbon_vertices_ptr() -> *const f32 {
    with_runner(|r| r.ribbon_vertices_ptr()).unwrap_or(std::ptr::null())
}

#[wasm_bindgen]
pub fn get_ribbon_vertex_count() -> u32 {
    with_runner(|r| r.ribbon_vertex_count()).unwrap_or(0)
}

#[wasm_bindgen]
pub fn get_ribbon_indices_ptr() -> *const u32 {
    with_runner(|r| r.ribbon_indices_ptr()).unwrap_or(std::ptr::null())
}

#[wasm_bindgen]
pub fn get_ribbon_index_count() -> u32 {
    with_runner(|r| r.ribbon_index_count()).unwrap_or(0)
}

/// As f64 so the host sees every revision exactly.
#[wasm_bindgen]
pub fn get_ribbon_revision() -> f64 {
    with_runner(|r| r.ribbon_revision() as f64).unwrap_or(0.0)
}

#[wasm_bindgen]
pub fn get_events_ptr() -> *const f32 {
    with_runner(|r| r.events_ptr()).unwrap_or(std::ptr::null())
}

#[wasm_bindgen]
pub fn get_events_len() -> u32 {
    with_runner(|r| r.events_len()).unwrap_or(0)
}

/// `[[entity, text], ...]` for every label.
#[wasm_bindgen]
pub fn get_label_texts() -> js_sys::Array {
    let out = js_sys::Array::new();
    with_runner(|r| {
        for (entity, text) in r.label_texts() {
            let pair = js_sys::Array::new();
            pair.push(&JsValue::from(entity));
            pair.push(&JsValue::from_str(text));
            out.push(&pair);
        }
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_codes() {
        assert_eq!(decor_layer(0), Some(DecorLayer::Belt));
        assert_eq!(decor_layer(4), Some(DecorLayer::Flares));
        assert_eq!(decor_layer(5), None);
    }

    #[test]
    fn calls_before_init_are_dropped() {
        assert_eq!(with_runner(|r| r.frame_len()), None);
    }
}
